//! ANSI escape sequence helpers.
//!
//! This module knows two things: how to recognize an escape sequence inside
//! a printed value, and how to build the short color sequences that are
//! usually passed as the first value of a colored line.

use std::fmt;

/// The escape control character that starts every ANSI sequence.
pub const ESCAPE: char = '\x1B';

/// The sequence that restores the default terminal style.
///
/// A printer writes this after the terminator of any line that contained an
/// escape character.
pub const RESET: &str = "\x1B[0m";

/// A leading escape sequence must be strictly shorter than this many
/// characters to be treated as a bare color/style code.
pub const SHORT_ESCAPE_LEN: usize = 7;

/// Selects how `is_escape` looks for an escape sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EscapeTest {
    /// The text is a short code on its own: it starts with `ESCAPE` and has
    /// fewer than `SHORT_ESCAPE_LEN` characters.
    First,
    /// The text contains `ESCAPE` anywhere.
    Generic,
}

/// Returns true if `text` passes the given escape test.
pub fn is_escape(text: &str, test: EscapeTest) -> bool {
    match test {
        EscapeTest::First => {
            text.starts_with(ESCAPE)
                && text.chars().count() < SHORT_ESCAPE_LEN
        }
        EscapeTest::Generic => text.contains(ESCAPE),
    }
}

/// The set of colors that `fg` and `bg` can build sequences for.
///
/// `Ansi256` and `Rgb` produce sequences longer than `SHORT_ESCAPE_LEN`, so a
/// line starting with one of them is laid out like any other line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Ansi256(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    fn write_code(
        &self,
        f: &mut fmt::Formatter<'_>,
        bg: bool,
    ) -> fmt::Result {
        let base = if bg { 4 } else { 3 };
        match *self {
            Color::Black => write!(f, "\x1B[{base}0m"),
            Color::Red => write!(f, "\x1B[{base}1m"),
            Color::Green => write!(f, "\x1B[{base}2m"),
            Color::Yellow => write!(f, "\x1B[{base}3m"),
            Color::Blue => write!(f, "\x1B[{base}4m"),
            Color::Magenta => write!(f, "\x1B[{base}5m"),
            Color::Cyan => write!(f, "\x1B[{base}6m"),
            Color::White => write!(f, "\x1B[{base}7m"),
            Color::Ansi256(n) => write!(f, "\x1B[{base}8;5;{n}m"),
            Color::Rgb(r, g, b) => write!(f, "\x1B[{base}8;2;{r};{g};{b}m"),
        }
    }
}

/// A color sequence that can be formatted or printed directly.
///
/// This is created by `fg` and `bg`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnsiColor {
    color: Color,
    bg: bool,
}

impl fmt::Display for AnsiColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.color.write_code(f, self.bg)
    }
}

/// Returns the sequence that sets the foreground color.
pub fn fg(color: Color) -> AnsiColor {
    AnsiColor { color, bg: false }
}

/// Returns the sequence that sets the background color.
pub fn bg(color: Color) -> AnsiColor {
    AnsiColor { color, bg: true }
}
