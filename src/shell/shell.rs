use log::{debug, error, warn};
use std::error::Error;
use std::io::Write;

use crate::shell::executor::{ChildStatus, NixOps};
use crate::shell::line::{evaluate, LineOutcome};
use crate::shell::parser::lexer::trim;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::shell::session::Session;
use crate::shell::signals;
use crate::utils::config::Config;
use crate::utils::prompt::prompt;
use crate::utils::theme::Theme;

enum Flow {
    Continue,
    Quit,
}

pub struct Shell<'a> {
    theme: &'a Theme,
    readline: ReadlineManager<'a>,
    session: Session,
    ops: NixOps,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config, theme: &'a Theme) -> Result<Self, ReadlineError> {
        Ok(Self {
            theme,
            readline: ReadlineManager::new(config)?,
            session: Session::from_config(config),
            ops: NixOps,
        })
    }

    pub fn run(mut self) -> Result<(), Box<dyn Error>> {
        debug!("初始化 forksh...");

        // 忽略 Ctrl-C 等中断信号，只让子进程响应
        signals::ignore_interrupts()?;

        self.readline.load_history()?;

        println!("{}", self.theme.welcome_message);
        debug!("forksh 准备就绪...");

        self.run_loop()?;
        self.readline.save_history()?;

        println!("{}", self.theme.exit_message);
        debug!("退出 forksh...");
        Ok(())
    }

    fn run_loop(&mut self) -> Result<(), Box<dyn Error>> {
        loop {
            std::io::stdout().flush()?;
            let prompt = prompt(self.theme, &self.session.home_dir);

            match self.readline.readline(&prompt) {
                Ok(line) => {
                    if let Flow::Quit = self.handle_input(&line)? {
                        debug!("收到 quit，退出 forksh...");
                        break;
                    }
                }
                Err(err) => match err {
                    ReadlineError::Eof => {
                        warn!("接收到 EOF 信号，退出 forksh...");
                        println!();
                        break;
                    }
                    ReadlineError::Interrupted => {
                        println!(
                            "{}",
                            (self.theme.warning_style)(self.theme.interrupt_message.clone())
                        );
                    }
                    err => {
                        error!("发生错误: {}", err);
                        eprintln!("{}: {}", (self.theme.error_style)("error".to_string()), err);
                    }
                },
            }
        }
        Ok(())
    }

    fn handle_input(&mut self, line: &str) -> Result<Flow, Box<dyn Error>> {
        let line = trim(line);
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        self.readline.add_history(line)?;

        // 刷新后再 fork，避免子进程重复输出缓冲区内容
        std::io::stdout().flush()?;
        match evaluate(line, &mut self.ops, &self.session) {
            LineOutcome::Quit => return Ok(Flow::Quit),
            LineOutcome::Blank | LineOutcome::Handled => {}
            LineOutcome::BuiltinFailed(e) => self.report_error(&e.to_string()),
            LineOutcome::ParseFailed(e) => self.report_error(&format!("parse error: {}", e)),
            LineOutcome::SpawnFailed(e) => self.report_error(&e.to_string()),
            LineOutcome::Finished(status) => self.report_status(&status),
        }
        Ok(Flow::Continue)
    }

    fn report_status(&self, status: &ChildStatus) {
        if status.is_success() {
            return;
        }
        eprintln!(
            "{} {}",
            self.theme.error_symbol,
            (self.theme.error_style)(status.to_string())
        );
    }

    fn report_error(&self, message: &str) {
        eprintln!(
            "{} {}",
            self.theme.error_symbol,
            (self.theme.error_style)(message.to_string())
        );
    }
}
