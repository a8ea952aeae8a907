use std::borrow::Cow;
use std::fmt;

/// Which standard stream a redirect rebinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,  // <
    Out, // >
}

impl Direction {
    pub fn symbol(&self) -> char {
        match self {
            Direction::In => '<',
            Direction::Out => '>',
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Direction::In => "reading",
            Direction::Out => "writing",
        }
    }
}

/// One parsed input line. Built fresh per line and dropped after it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exec {
        argv: Vec<String>,
    },
    Pipe {
        left: Box<Command>,
        right: Box<Command>,
    },
    Redirect {
        inner: Box<Command>,
        direction: Direction,
        path: String,
    },
}

impl Command {
    pub fn exec<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Command::Exec {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    pub fn pipe(left: Command, right: Command) -> Self {
        Command::Pipe {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn redirect(inner: Command, direction: Direction, path: impl Into<String>) -> Self {
        Command::Redirect {
            inner: Box::new(inner),
            direction,
            path: path.into(),
        }
    }

    /// True only for an `Exec` with no words, i.e. a blank line.
    pub fn is_empty(&self) -> bool {
        matches!(self, Command::Exec { argv } if argv.is_empty())
    }
}

/// Wraps `word` in quotes when it would not read back as a single word.
fn quoted(word: &str) -> Cow<'_, str> {
    let needs_quotes =
        word.is_empty() || word.chars().any(|c| c.is_whitespace() || "|<>".contains(c));
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", word))
    } else {
        Cow::Borrowed(word)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Exec { argv } => {
                let words = argv.iter().map(|word| quoted(word)).collect::<Vec<_>>();
                write!(f, "{}", words.join(" "))
            }
            Command::Pipe { left, right } => write!(f, "{} | {}", left, right),
            Command::Redirect {
                inner,
                direction,
                path,
            } => write!(f, "{} {} {}", inner, direction.symbol(), quoted(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_shape() {
        let cmd = Command::pipe(
            Command::redirect(Command::exec(["ls", "-a"]), Direction::In, "in.txt"),
            Command::redirect(
                Command::exec(["grep", "hello world"]),
                Direction::Out,
                "out.txt",
            ),
        );
        assert_eq!(
            cmd.to_string(),
            r#"ls -a < in.txt | grep "hello world" > out.txt"#
        );
    }

    #[test]
    fn test_display_quotes_spaced_path() {
        let cmd = Command::redirect(Command::exec(["cat"]), Direction::Out, "out file");
        assert_eq!(cmd.to_string(), r#"cat > "out file""#);
    }

    #[test]
    fn test_is_empty() {
        assert!(Command::exec(Vec::<String>::new()).is_empty());
        assert!(!Command::exec(["true"]).is_empty());
        let redirect = Command::redirect(Command::exec(Vec::<String>::new()), Direction::Out, "x");
        assert!(!redirect.is_empty());
    }
}
