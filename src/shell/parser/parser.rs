use super::ast::{Command, Direction};
use super::lexer::{
    char_column, classify, closing_quote, is_whitespace, trim, unquote, CharClass, Lexer,
    Operator, QUOTE,
};
use crate::shell::error::ParseError;

/// Builds a [`Command`] tree out of one input line.
///
/// The line is scanned once from the left. Redirects wrap whatever was built
/// so far in the current segment, and a `|` hands the rest of the line to a
/// recursive parse, so pipelines nest to the right.
pub struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    pub fn parse_command(&self) -> Result<Command, ParseError> {
        parse_segment(self.input, 0)
    }
}

fn unterminated(full: &str, byte: usize) -> ParseError {
    ParseError::UnterminatedQuote {
        column: char_column(full, byte),
    }
}

/// Parses `full[start..]`. The whole line is kept for error columns.
fn parse_segment(full: &str, start: usize) -> Result<Command, ParseError> {
    let raw = &full[start..];
    let offset = start + (raw.len() - raw.trim_start_matches(is_whitespace).len());
    let line = trim(raw);

    let mut pending = String::new();
    let mut current: Option<Command> = None;
    let mut i = 0;

    while let Some(c) = line[i..].chars().next() {
        match classify(c) {
            CharClass::Quote => {
                let close =
                    closing_quote(line, i).ok_or_else(|| unterminated(full, offset + i))?;
                pending.push_str(&line[i..close + QUOTE.len_utf8()]);
                i = close + QUOTE.len_utf8();
            }
            CharClass::Operator(Operator::Redirect(direction)) => {
                let lhs = match current.take() {
                    Some(cmd) => cmd,
                    None => exec_before(&pending, c)?,
                };
                let target_start = i + c.len_utf8();
                let end = next_operator(line, target_start)
                    .map_err(|quote| unterminated(full, offset + quote))?;
                let path = redirect_target(&line[target_start..end], direction)?;
                current = Some(Command::redirect(lhs, direction, path));
                pending.clear();
                i = end;
            }
            CharClass::Operator(Operator::Pipe) => {
                let left = match current.take() {
                    Some(cmd) => cmd,
                    None => exec_before(&pending, c)?,
                };
                let right = parse_segment(full, offset + i + c.len_utf8())?;
                if right.is_empty() {
                    return Err(ParseError::MissingPipeTarget);
                }
                return Ok(Command::pipe(left, right));
            }
            CharClass::Whitespace | CharClass::Literal => {
                pending.push(c);
                i += c.len_utf8();
            }
        }
    }

    match current {
        Some(cmd) => Ok(cmd),
        None => Ok(Command::exec(Lexer::new(&pending).words()?)),
    }
}

/// The words collected in front of `operator`, which must name a program.
fn exec_before(pending: &str, operator: char) -> Result<Command, ParseError> {
    let argv = Lexer::new(pending).words()?;
    if argv.is_empty() {
        return Err(ParseError::MissingCommand(operator));
    }
    Ok(Command::exec(argv))
}

/// Index of the next structural character at or after `start`, skipping
/// quoted runs, or the end of the line. Fails with the index of an
/// unterminated quote.
fn next_operator(line: &str, start: usize) -> Result<usize, usize> {
    let mut j = start;
    while let Some(c) = line[j..].chars().next() {
        match classify(c) {
            CharClass::Operator(_) => return Ok(j),
            CharClass::Quote => {
                let close = closing_quote(line, j).ok_or(j)?;
                j = close + QUOTE.len_utf8();
            }
            CharClass::Whitespace | CharClass::Literal => j += c.len_utf8(),
        }
    }
    Ok(line.len())
}

/// The trimmed run after a redirect operator, spaces kept and quote
/// characters dropped.
fn redirect_target(raw: &str, direction: Direction) -> Result<String, ParseError> {
    let target = unquote(trim(raw));
    if target.is_empty() {
        return Err(ParseError::MissingRedirectTarget { direction });
    }
    Ok(target)
}
