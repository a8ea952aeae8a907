use std::iter::Peekable;
use std::str::CharIndices;

use super::ast::Direction;
use crate::shell::error::ParseError;

pub const QUOTE: char = '"';

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Pipe,                 // |
    Redirect(Direction), // < or >
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CharClass {
    Whitespace,
    Operator(Operator),
    Quote,
    Literal,
}

pub fn classify(c: char) -> CharClass {
    match c {
        ' ' | '\t' | '\r' | '\n' => CharClass::Whitespace,
        '|' => CharClass::Operator(Operator::Pipe),
        '<' => CharClass::Operator(Operator::Redirect(Direction::In)),
        '>' => CharClass::Operator(Operator::Redirect(Direction::Out)),
        QUOTE => CharClass::Quote,
        _ => CharClass::Literal,
    }
}

pub fn is_whitespace(c: char) -> bool {
    classify(c) == CharClass::Whitespace
}

/// Strips the shell's whitespace set from both ends.
pub fn trim(s: &str) -> &str {
    s.trim_matches(is_whitespace)
}

/// Character column of byte index `byte` in `s`.
pub fn char_column(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

/// Drops the quote characters of a run whose quotes are balanced, keeping
/// everything between them.
pub fn unquote(s: &str) -> String {
    s.chars().filter(|&c| c != QUOTE).collect()
}

/// Byte index of the quote closing the run opened at `open`, if any.
pub fn closing_quote(line: &str, open: usize) -> Option<usize> {
    line[open + QUOTE.len_utf8()..]
        .find(QUOTE)
        .map(|rel| open + QUOTE.len_utf8() + rel)
}

/// Splits one operator-free segment into words.
///
/// Whitespace separates words, a double-quoted run is copied verbatim into
/// the current word, and empty words never reach the output.
pub struct Lexer<'a> {
    source: &'a str,
    input: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            source: input,
            input: input.char_indices().peekable(),
        }
    }

    pub fn next_word(&mut self) -> Result<Option<String>, ParseError> {
        self.skip_whitespace();

        let mut word = String::new();
        let mut started = false;
        while let Some(&(pos, c)) = self.input.peek() {
            match classify(c) {
                CharClass::Whitespace => break,
                CharClass::Quote => {
                    self.read_char();
                    self.read_quoted(pos, &mut word)?;
                }
                CharClass::Operator(_) | CharClass::Literal => {
                    self.read_char();
                    word.push(c);
                }
            }
            started = true;
        }

        if started && !word.is_empty() {
            Ok(Some(word))
        } else if started {
            // a bare `""` contributes nothing
            self.next_word()
        } else {
            Ok(None)
        }
    }

    pub fn words(mut self) -> Result<Vec<String>, ParseError> {
        let mut words = Vec::new();
        while let Some(word) = self.next_word()? {
            words.push(word);
        }
        Ok(words)
    }

    fn read_char(&mut self) -> Option<char> {
        self.input.next().map(|(_, c)| c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.input.peek() {
            if !is_whitespace(c) {
                break;
            }
            self.read_char();
        }
    }

    fn read_quoted(&mut self, open: usize, word: &mut String) -> Result<(), ParseError> {
        while let Some(c) = self.read_char() {
            if c == QUOTE {
                return Ok(());
            }
            word.push(c);
        }
        Err(ParseError::UnterminatedQuote {
            column: char_column(self.source, open),
        })
    }
}
