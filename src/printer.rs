use std::io;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::trace;

use crate::PrintSink;
use crate::ansi::{self, EscapeTest};
use crate::config::{CONFIG_ENV, ConfigParseError, PrintConfig};
use crate::text::{TextUnit, WChar};
use crate::value::{Render, Value};
use crate::writers::{StandardStream, TextBuffer};

/// A printer producing wide text: UTF-16 on Windows, UTF-32 elsewhere.
pub type WidePrinter = Printer<WChar>;

/// A configurable, thread safe `print`.
///
/// A printer writes its values separated by `separator`, then `terminator`.
/// When `pattern` is not empty every value except a leading escape code is
/// written between two copies of it. When any value carries an ANSI escape sequence the line is followed
/// by `ansi::RESET`, and when the first value is a bare escape code (such as
/// a color) each following value is written before its separator instead of
/// after it, so the code stays glued to the text it colors.
///
/// The unit `U` only matters for `format`, which returns text of that width.
/// Sinks always receive UTF-8.
///
/// Every call takes the printer's lock for its whole duration, so calls on
/// the same printer from different threads never interleave, and setting
/// the configuration waits for an in-flight call to finish.
///
/// ```
/// use ptc::{Printer, ptc_args};
///
/// let printer: Printer = Printer::new();
/// printer.set_separator(", ").set_terminator("!");
/// let mut out = Vec::new();
/// printer.print_to(&mut out, ptc_args!("a", 1, 'c'))?;
/// assert_eq!(out, b"a, 1, c!");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct Printer<U: TextUnit = u8> {
    config: Mutex<PrintConfig>,
    _unit: PhantomData<fn() -> U>,
}

impl<U: TextUnit> Default for Printer<U> {
    fn default() -> Self {
        Printer::new()
    }
}

impl<U: TextUnit> Printer<U> {
    /// Create a printer with the default configuration.
    pub fn new() -> Self {
        Printer::with_config(PrintConfig::default())
    }

    /// Create a printer with the given configuration.
    pub fn with_config(config: PrintConfig) -> Self {
        Printer { config: Mutex::new(config), _unit: PhantomData }
    }

    /// Create a printer configured from the `PTC_PRINT` environment
    /// variable, or with the default configuration if it is not set.
    pub fn from_env() -> Result<Self, ConfigParseError> {
        let config = PrintConfig::from_env(CONFIG_ENV)?.unwrap_or_default();
        Ok(Printer::with_config(config))
    }

    fn lock(&self) -> MutexGuard<'_, PrintConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the current configuration.
    pub fn config(&self) -> PrintConfig {
        self.lock().clone()
    }

    /// Replace the whole configuration.
    pub fn set_config(&self, config: PrintConfig) -> &Self {
        *self.lock() = config;
        self
    }

    /// Get the text written after the last value.
    pub fn terminator(&self) -> String {
        self.lock().terminator.clone()
    }

    /// Set the text written after the last value.
    pub fn set_terminator(&self, terminator: impl Into<String>) -> &Self {
        self.lock().set_terminator(terminator);
        self
    }

    /// Get the text written between two values.
    pub fn separator(&self) -> String {
        self.lock().separator.clone()
    }

    /// Set the text written between two values.
    pub fn set_separator(&self, separator: impl Into<String>) -> &Self {
        self.lock().set_separator(separator);
        self
    }

    /// Get the text written before and after every value.
    pub fn pattern(&self) -> String {
        self.lock().pattern.clone()
    }

    /// Set the text written before and after every value. An empty pattern
    /// disables wrapping.
    pub fn set_pattern(&self, pattern: impl Into<String>) -> &Self {
        self.lock().set_pattern(pattern);
        self
    }

    /// Whether non-memory sinks are flushed after every call.
    pub fn flush_enabled(&self) -> bool {
        self.lock().flush
    }

    /// Set whether non-memory sinks are flushed after every call.
    pub fn set_flush(&self, yes: bool) -> &Self {
        self.lock().set_flush(yes);
        self
    }

    /// Print to standard output.
    ///
    /// With no values only the terminator is written.
    pub fn print(&self, values: &[&dyn Render]) -> io::Result<()> {
        let values = render_all(values);
        let config = self.lock();
        let stdout = StandardStream::stdout();
        emit(&config, &mut stdout.lock(), &values)
    }

    /// Print to standard error.
    ///
    /// With no values only the terminator is written.
    pub fn eprint(&self, values: &[&dyn Render]) -> io::Result<()> {
        let values = render_all(values);
        let config = self.lock();
        let stderr = StandardStream::stderr();
        emit(&config, &mut stderr.lock(), &values)
    }

    /// Print to the given sink.
    ///
    /// The whole line is handed to the sink in one `write_all`. Errors from
    /// the sink are returned unchanged.
    pub fn print_to<S: PrintSink + ?Sized>(
        &self,
        sink: &mut S,
        values: &[&dyn Render],
    ) -> io::Result<()> {
        let values = render_all(values);
        let config = self.lock();
        emit(&config, sink, &values)
    }

    /// Format the values exactly like `print_to` would, and return the text
    /// instead of writing it anywhere.
    ///
    /// With no values the result is empty: not even the terminator is
    /// produced.
    pub fn format(&self, values: &[&dyn Render]) -> U::Text {
        if values.is_empty() {
            return U::Text::default();
        }
        let mut buf = TextBuffer::<U>::new();
        // A TextBuffer only fails on invalid UTF-8, and layout only produces
        // valid UTF-8.
        if let Err(err) = self.print_to(&mut buf, values) {
            log::error!("formatting into memory failed: {err}");
        }
        buf.into_text()
    }
}

fn render_all<'a>(values: &[&'a dyn Render]) -> Vec<Value<'a>> {
    values.iter().map(|&v| v.render()).collect()
}

/// Writes one line. The printer lock is held by the caller, and is always
/// taken before any stream lock.
fn emit<S: PrintSink + ?Sized>(
    config: &PrintConfig,
    sink: &mut S,
    values: &[Value<'_>],
) -> io::Result<()> {
    let mut line = String::new();
    layout(config, values, &mut line);
    trace!("printing {} values ({} bytes)", values.len(), line.len());
    sink.write_all(line.as_bytes())?;
    if config.flush && !sink.is_in_memory() {
        sink.flush()?;
    }
    Ok(())
}

/// Lays out one line.
fn layout(config: &PrintConfig, values: &[Value<'_>], out: &mut String) {
    let Some((first, rest)) = values.split_first() else {
        out.push_str(&config.terminator);
        return;
    };

    // Only a leading escape code escapes the pattern.
    let escape_first = first.is_escape(EscapeTest::First);
    if escape_first {
        first.push_to(out);
    } else {
        push_wrapped(config, first, out);
    }
    for value in rest {
        if escape_first {
            push_wrapped(config, value, out);
            out.push_str(&config.separator);
        } else {
            out.push_str(&config.separator);
            push_wrapped(config, value, out);
        }
    }
    out.push_str(&config.terminator);

    if values.iter().any(|v| v.is_escape(EscapeTest::Generic)) {
        out.push_str(ansi::RESET);
    }
}

fn push_wrapped(config: &PrintConfig, value: &Value<'_>, out: &mut String) {
    if config.pattern.is_empty() {
        value.push_to(out);
    } else {
        out.push_str(&config.pattern);
        value.push_to(out);
        out.push_str(&config.pattern);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::ansi::{Color, fg};
    use crate::ptc_args;
    use crate::writers::Plain;

    /// Records every write and flush it receives.
    #[derive(Debug, Default)]
    struct Recorder {
        out: Vec<u8>,
        writes: usize,
        flushes: usize,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    impl PrintSink for Recorder {}

    /// A sink that refuses every write.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl PrintSink for Broken {}

    fn printed(printer: &Printer, values: &[&dyn Render]) -> String {
        let mut out = Vec::new();
        printer.print_to(&mut out, values).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn defaults() {
        let printer = Printer::<u8>::new();
        assert_eq!(printer.terminator(), "\n");
        assert_eq!(printer.separator(), " ");
        assert_eq!(printer.pattern(), "");
        assert!(!printer.flush_enabled());
    }

    #[test]
    fn values_are_separated_and_terminated() {
        let printer = Printer::<u8>::new();
        assert_eq!(printed(&printer, ptc_args!("a", "b", "c")), "a b c\n");
        assert_eq!(
            printed(&printer, ptc_args!("Test passes", 123, "(ignore this)", '.')),
            "Test passes 123 (ignore this) .\n"
        );
    }

    #[test]
    fn no_values_print_the_terminator() {
        let printer = Printer::<u8>::new();
        assert_eq!(printed(&printer, &[]), "\n");
        printer.set_terminator('.');
        assert_eq!(printed(&printer, &[]), ".");
    }

    #[test]
    fn custom_terminator() {
        let printer = Printer::<u8>::new();
        printer.set_terminator('.');
        assert_eq!(printed(&printer, ptc_args!("Test")), "Test.");
        assert_eq!(printer.terminator(), ".");
    }

    #[test]
    fn custom_separator() {
        let printer = Printer::<u8>::new();
        printer.set_separator('*');
        assert_eq!(
            printed(&printer, ptc_args!("Test", "the", "new", "sep.")),
            "Test*the*new*sep.\n"
        );
    }

    #[test]
    fn pattern_wraps_every_value() {
        let printer = Printer::<u8>::new();
        printer.set_pattern("|");
        assert_eq!(printed(&printer, ptc_args!("a", "b")), "|a| |b|\n");
        assert_eq!(
            printed(&printer, ptc_args!("Testing", "this", "pattern", 123)),
            "|Testing| |this| |pattern| |123|\n"
        );
    }

    #[test]
    fn leading_escape_code_keeps_its_text() {
        let printer = Printer::<u8>::new();
        assert_eq!(
            printed(&printer, ptc_args!("\x1B[31m", "Red string!")),
            "\x1B[31mRed string! \n\x1B[0m"
        );
        let red = fg(Color::Red);
        assert_eq!(
            printed(&printer, ptc_args!(red, "a", "b")),
            "\x1B[31ma b \n\x1B[0m"
        );
    }

    #[test]
    fn only_the_leading_escape_code_is_unwrapped() {
        let printer = Printer::<u8>::new();
        printer.set_pattern("|");
        assert_eq!(
            printed(&printer, ptc_args!("\x1B[31m", "a", "\x1B[0m")),
            "\x1B[31m|a| |\x1B[0m| \n\x1B[0m"
        );
    }

    #[test]
    fn later_escape_codes_are_wrapped() {
        let printer = Printer::<u8>::new();
        printer.set_pattern("|");
        assert_eq!(
            printed(&printer, ptc_args!("a", "\x1B[31m", "b")),
            "|a| |\x1B[31m| |b|\n\x1B[0m"
        );
        assert_eq!(
            printed(&printer, ptc_args!("\x1B[31m", "Red string!", "\x1B[0m")),
            "\x1B[31m|Red string!| |\x1B[0m| \n\x1B[0m"
        );
    }

    #[test_case(ptc_args!("\x1B[31mTesting colors", "now"), "\x1B[31mTesting colors now\n\x1B[0m" ; "long first value")]
    #[test_case(ptc_args!("Testing", "\x1B[31mcolors", "now"), "Testing \x1B[31mcolors now\n\x1B[0m" ; "later value")]
    #[test_case(ptc_args!("Testing", "the \x1B[31mcolors"), "Testing the \x1B[31mcolors\n\x1B[0m" ; "embedded")]
    #[test_case(ptc_args!(1, "Number"), "1 Number\n" ; "no escape")]
    #[test_case(ptc_args!('\x1B', vec!["\x1B"]), "\x1B [\x1B]\n" ; "non text values")]
    fn reset_follows_any_escape(values: &[&dyn Render], expected: &str) {
        assert_eq!(printed(&Printer::<u8>::new(), values), expected);
    }

    #[test]
    fn empty_first_value_still_gets_a_separator() {
        let printer = Printer::<u8>::new();
        assert_eq!(printed(&printer, ptc_args!("", "text")), " text\n");
    }

    #[test]
    fn containers() {
        let printer = Printer::<u8>::new();
        let map = BTreeMap::from([(1, "one"), (2, "two")]);
        assert_eq!(
            printed(&printer, ptc_args!(vec![1, 2, 3], map, Some(3), None::<u8>)),
            "[1, 2, 3] [[1, one], [2, two]] 3 None\n"
        );
    }

    #[test]
    fn flush_only_when_enabled() {
        let printer = Printer::<u8>::new();
        let mut sink = Recorder::default();
        printer.print_to(&mut sink, ptc_args!("a", "b")).unwrap();
        printer.print_to(&mut sink, &[]).unwrap();
        assert_eq!(sink.flushes, 0);

        printer.set_flush(true);
        printer.print_to(&mut sink, ptc_args!("a", "b")).unwrap();
        printer.print_to(&mut sink, &[]).unwrap();
        assert_eq!(sink.flushes, 2);
        assert_eq!(sink.out, b"a b\n\na b\n\n");
    }

    #[test]
    fn memory_sinks_are_never_flushed() {
        let printer = Printer::<u8>::new();
        printer.set_flush(true);
        let mut plain = Plain::new(Recorder::default());
        printer.print_to(&mut plain, ptc_args!("x")).unwrap();
        assert_eq!(plain.get_ref().flushes, 1);

        let mut out = Vec::new();
        printer.print_to(&mut out, ptc_args!("x")).unwrap();
        assert_eq!(out, b"x\n");
    }

    #[test]
    fn one_write_per_call() {
        let printer = Printer::<u8>::new();
        printer.set_pattern("'");
        let mut sink = Recorder::default();
        printer.print_to(&mut sink, ptc_args!("a", 2, 3.5, true)).unwrap();
        assert_eq!(sink.writes, 1);
        assert_eq!(sink.out, b"'a' '2' '3.5' 'true'\n");
    }

    #[test]
    fn sink_errors_propagate() {
        let printer = Printer::<u8>::new();
        let err = printer.print_to(&mut Broken, ptc_args!("a")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn format_matches_print_to() {
        let printer = Printer::<u8>::new();
        let mut direct = Vec::new();
        printer.print_to(&mut direct, ptc_args!("v1", 2)).unwrap();

        printer.set_terminator("");
        let text = printer.format(ptc_args!("v1", 2));
        printer.set_terminator("\n");
        let replayed = printed(&printer, ptc_args!(text));

        assert_eq!(replayed.as_bytes(), direct.as_slice());
    }

    #[test]
    fn format_keeps_terminator_and_reset() {
        let printer = Printer::<u8>::new();
        printer.set_terminator("");
        assert_eq!(printer.format(ptc_args!("Test", "this!")), "Test this!");
        assert_eq!(
            printer.format(ptc_args!("\x1B[31m", "Testing")),
            "\x1B[31mTesting \x1B[0m"
        );
        assert_eq!(printer.format(ptc_args!("")), "");
        assert_eq!(printer.format(&[]), "");
    }

    #[test]
    fn format_without_values_ignores_the_terminator() {
        let printer = Printer::<u8>::new();
        assert_eq!(printer.format(&[]), "");
    }

    #[test]
    fn wide_format() {
        let printer = Printer::<u16>::new();
        assert_eq!(
            printer.format(ptc_args!("h€", 1)),
            "h€ 1\n".encode_utf16().collect::<Vec<_>>()
        );
        let printer = Printer::<char>::new();
        assert_eq!(printer.format(ptc_args!("🦀")), vec!['🦀', '\n']);
    }

    #[test]
    fn text_buffer_sinks() {
        let printer = Printer::<u8>::new();
        let mut buf = TextBuffer::<u16>::new();
        printer.print_to(&mut buf, ptc_args!("Hello")).unwrap();
        assert_eq!(
            buf.into_text(),
            "Hello\n".encode_utf16().collect::<Vec<_>>()
        );
    }

    #[test]
    fn config_round_trip() {
        let printer = Printer::<u8>::new();
        let mut config = PrintConfig::new();
        config.set_separator(", ").set_flush(true);
        printer.set_config(config.clone());
        assert_eq!(printer.config(), config);
        assert_eq!(printer.separator(), ", ");
        assert!(printer.flush_enabled());
    }

    #[test]
    fn configuration_is_read_at_call_time() {
        let printer = Printer::<u8>::new();
        assert_eq!(printed(&printer, ptc_args!("a", "b")), "a b\n");
        printer.set_separator("-").set_terminator(";");
        assert_eq!(printed(&printer, ptc_args!("a", "b")), "a-b;");
    }
}
