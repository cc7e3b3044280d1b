//! A configurable, thread safe `print` for terminals, files and memory.
//!
//! Values are written separated by a separator and followed by a
//! terminator, optionally wrapped in a pattern. Lines carrying ANSI escape
//! sequences are followed by a reset so colors never leak into the next
//! line.
//!
//! ```
//! let mut out = Vec::new();
//! ptc::ptc_fprint!(out, ptc::ansi::fg(ptc::ansi::Color::Green), "ok", 3)?;
//! assert_eq!(out, b"\x1B[32mok 3 \n\x1B[0m");
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io;
use std::sync::LazyLock;

pub mod ansi;
mod config;
mod macros;
mod printer;
mod text;
mod traits;
pub mod tuning;
mod value;
mod writers;

// Re-export core traits and types
pub use ansi::{AnsiColor, Color, EscapeTest};
pub use config::{CONFIG_ENV, ConfigParseError, PrintConfig};
pub use printer::{Printer, WidePrinter};
pub use text::{TextUnit, WChar, convert};
pub use traits::PrintSink;
pub use value::{Displayed, Render, Span, TimeUnit, Value, display};
pub use writers::{Plain, StandardStream, StandardStreamLock, TextBuffer};

static PRINTER: LazyLock<Printer> = LazyLock::new(Printer::new);
static WPRINTER: LazyLock<WidePrinter> = LazyLock::new(WidePrinter::new);
static PRINTER16: LazyLock<Printer<u16>> = LazyLock::new(Printer::new);
static PRINTER32: LazyLock<Printer<char>> = LazyLock::new(Printer::new);

/// The process-wide default printer, used by the macros.
pub fn printer() -> &'static Printer {
    &PRINTER
}

/// The process-wide default wide printer.
pub fn wprinter() -> &'static WidePrinter {
    &WPRINTER
}

/// The process-wide default UTF-16 printer.
pub fn printer16() -> &'static Printer<u16> {
    &PRINTER16
}

/// The process-wide default UTF-32 printer.
pub fn printer32() -> &'static Printer<char> {
    &PRINTER32
}

/// Print to standard output with the default printer.
pub fn print(values: &[&dyn Render]) -> io::Result<()> {
    printer().print(values)
}

/// Print to the given sink with the default printer.
pub fn print_to<S: PrintSink + ?Sized>(
    sink: &mut S,
    values: &[&dyn Render],
) -> io::Result<()> {
    printer().print_to(sink, values)
}

/// Format with the default printer.
pub fn format(values: &[&dyn Render]) -> String {
    printer().format(values)
}
