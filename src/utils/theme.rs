use colored::Colorize;

pub struct Theme {
    pub error_symbol: String,
    pub welcome_message: String,
    pub exit_message: String,
    pub interrupt_message: String,
    pub prompt_style: Box<dyn Fn(String) -> String>,
    pub error_style: Box<dyn Fn(String) -> String>,
    pub warning_style: Box<dyn Fn(String) -> String>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            error_symbol: "✗".red().to_string(),
            welcome_message: "Welcome to forksh. Type `quit` to leave."
                .bright_cyan()
                .to_string(),
            exit_message: "Bye from forksh.".bright_blue().to_string(),
            interrupt_message: "^C (type `quit` to leave)".to_string(),
            prompt_style: Box::new(|s| s.bright_cyan().to_string()),
            error_style: Box::new(|s| s.bright_red().to_string()),
            warning_style: Box::new(|s| s.yellow().to_string()),
        }
    }
}

impl Theme {
    pub fn load_theme(theme_name: &str) -> Theme {
        match theme_name {
            "dark" => Theme {
                error_symbol: "✗".red().to_string(),
                welcome_message: "forksh ready.".bright_purple().to_string(),
                exit_message: "forksh out.".bright_purple().to_string(),
                interrupt_message: "^C".to_string(),
                prompt_style: Box::new(|s| s.bright_purple().to_string()),
                error_style: Box::new(|s| s.red().to_string()),
                warning_style: Box::new(|s| s.bright_yellow().to_string()),
            },
            _ => Theme::default(),
        }
    }
}
