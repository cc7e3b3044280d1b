use std::io::{self, BufWriter, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::PrintSink;
use crate::text::TextUnit;
use crate::tuning;

#[cfg(windows)]
use winapi_util::console as wincon;

/// `std::io` implements `Stdout` and `Stderr` (and their `Lock` variants) as
/// separate types, and tuned stdout is a third kind of writer. We use some
/// simple internal enum types to work around this.
#[derive(Debug)]
enum IoStandardStream {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    StdoutTuned(&'static Mutex<BufWriter<io::Stdout>>),
}

impl IoStandardStream {
    fn lock(&self) -> IoStandardStreamLock<'_> {
        match *self {
            IoStandardStream::Stdout(ref s) => {
                IoStandardStreamLock::StdoutLock(s.lock())
            }
            IoStandardStream::Stderr(ref s) => {
                IoStandardStreamLock::StderrLock(s.lock())
            }
            IoStandardStream::StdoutTuned(tuned) => {
                IoStandardStreamLock::StdoutTuned(
                    tuned.lock().unwrap_or_else(PoisonError::into_inner),
                )
            }
        }
    }
}

impl io::Write for IoStandardStream {
    #[inline(always)]
    fn write(&mut self, b: &[u8]) -> io::Result<usize> {
        match *self {
            IoStandardStream::Stdout(ref mut s) => s.write(b),
            IoStandardStream::Stderr(ref mut s) => s.write(b),
            IoStandardStream::StdoutTuned(tuned) => tuned
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write(b),
        }
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        match *self {
            IoStandardStream::Stdout(ref mut s) => s.flush(),
            IoStandardStream::Stderr(ref mut s) => s.flush(),
            IoStandardStream::StdoutTuned(tuned) => tuned
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .flush(),
        }
    }
}

// Same rigmarole for the locked variants of the standard streams.

#[derive(Debug)]
enum IoStandardStreamLock<'a> {
    StdoutLock(io::StdoutLock<'a>),
    StderrLock(io::StderrLock<'a>),
    StdoutTuned(MutexGuard<'a, BufWriter<io::Stdout>>),
}

impl<'a> io::Write for IoStandardStreamLock<'a> {
    #[inline(always)]
    fn write(&mut self, b: &[u8]) -> io::Result<usize> {
        match *self {
            IoStandardStreamLock::StdoutLock(ref mut s) => s.write(b),
            IoStandardStreamLock::StderrLock(ref mut s) => s.write(b),
            IoStandardStreamLock::StdoutTuned(ref mut s) => s.write(b),
        }
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        match *self {
            IoStandardStreamLock::StdoutLock(ref mut s) => s.flush(),
            IoStandardStreamLock::StderrLock(ref mut s) => s.flush(),
            IoStandardStreamLock::StdoutTuned(ref mut s) => s.flush(),
        }
    }
}

/// A standard stream for writing to stdout or stderr.
///
/// When `tuning::tune_standard_streams` has been called, stdout writes go
/// through the process-wide buffered writer it installed.
#[derive(Debug)]
pub struct StandardStream {
    wtr: IoStandardStream,
}

/// `StandardStreamLock` is a locked reference to a `StandardStream`.
///
/// Nothing else in the process can write to the same stream while the lock
/// is alive.
///
/// The lifetime `'a` refers to the lifetime of the corresponding
/// `StandardStream`.
#[derive(Debug)]
pub struct StandardStreamLock<'a> {
    wtr: IoStandardStreamLock<'a>,
}

impl StandardStream {
    /// Create a new `StandardStream` that writes to standard output.
    pub fn stdout() -> StandardStream {
        enable_virtual_terminal();
        let wtr = match tuning::tuned_stdout() {
            Some(tuned) => IoStandardStream::StdoutTuned(tuned),
            None => IoStandardStream::Stdout(io::stdout()),
        };
        StandardStream { wtr }
    }

    /// Create a new `StandardStream` that writes to standard error.
    pub fn stderr() -> StandardStream {
        enable_virtual_terminal();
        StandardStream { wtr: IoStandardStream::Stderr(io::stderr()) }
    }

    /// Lock the underlying writer.
    ///
    /// The lock guard returned also satisfies `io::Write` and `PrintSink`.
    ///
    /// This method is **not reentrant**. Locking tuned stdout twice from the
    /// same thread deadlocks.
    pub fn lock(&self) -> StandardStreamLock<'_> {
        StandardStreamLock { wtr: self.wtr.lock() }
    }
}

impl io::Write for StandardStream {
    #[inline]
    fn write(&mut self, b: &[u8]) -> io::Result<usize> {
        self.wtr.write(b)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.wtr.flush()
    }
}

impl PrintSink for StandardStream {}

impl<'a> io::Write for StandardStreamLock<'a> {
    #[inline]
    fn write(&mut self, b: &[u8]) -> io::Result<usize> {
        self.wtr.write(b)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.wtr.flush()
    }
}

impl<'a> PrintSink for StandardStreamLock<'a> {}

/// Turns on ANSI sequence processing for the Windows console, once.
#[cfg(windows)]
fn enable_virtual_terminal() {
    use std::sync::Once;

    static ENABLE: Once = Once::new();
    ENABLE.call_once(|| {
        for con in [wincon::Console::stdout(), wincon::Console::stderr()] {
            let enabled = con.and_then(|mut con| {
                con.set_virtual_terminal_processing(true)
            });
            if let Err(err) = enabled {
                log::debug!("virtual terminal processing unavailable: {err}");
            }
        }
    });
}

#[cfg(not(windows))]
#[inline(always)]
fn enable_virtual_terminal() {}

/// Satisfies `PrintSink` for any writer, as a device that is flushed when
/// the printer asks for it.
#[derive(Clone, Debug)]
pub struct Plain<W>(pub W);

impl<W: Write> Plain<W> {
    /// Create a new sink around the given writer.
    pub fn new(wtr: W) -> Plain<W> {
        Plain(wtr)
    }

    /// Consume this `Plain` value and return the inner writer.
    pub fn into_inner(self) -> W {
        self.0
    }

    /// Return a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.0
    }

    /// Return a mutable reference to the inner writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.0
    }
}

impl<W: io::Write> io::Write for Plain<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.write_all(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: io::Write> PrintSink for Plain<W> {}

/// Write text to memory, in any character width.
///
/// Bytes written to a `TextBuffer` must be UTF-8. They are converted to `U`
/// as they arrive; a multi-byte character split across two writes is held
/// back until it is complete. `TextBuffer<u8>` collects a `String`,
/// `TextBuffer<u16>` a `Vec<u16>` and `TextBuffer<char>` a `Vec<char>`.
///
/// Printers never flush a `TextBuffer`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TextBuffer<U: TextUnit = u8> {
    text: U::Text,
    pending: Vec<u8>,
}

impl<U: TextUnit> TextBuffer<U> {
    /// Creates a new empty buffer.
    pub fn new() -> Self {
        TextBuffer { text: U::Text::default(), pending: Vec::new() }
    }

    /// Returns the text collected so far.
    pub fn as_text(&self) -> &U::Text {
        &self.text
    }

    /// Consumes the buffer and returns the collected text.
    pub fn into_text(self) -> U::Text {
        self.text
    }

    /// Returns the number of units collected so far.
    pub fn len(&self) -> usize {
        U::len(&self.text)
    }

    /// Returns true if and only if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.pending.is_empty()
    }

    /// Clears this buffer.
    pub fn clear(&mut self) {
        self.text = U::Text::default();
        self.pending.clear();
    }
}

impl TextBuffer<u8> {
    /// Returns a string slice of the collected text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl<U: TextUnit> io::Write for TextBuffer<U> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let held = self.pending.len();
        self.pending.extend_from_slice(buf);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(s) => {
                U::push_str(&mut self.text, s);
                self.pending.len()
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                if let Ok(s) = std::str::from_utf8(&self.pending[..valid]) {
                    U::push_str(&mut self.text, s);
                }
                valid
            }
            Err(_) => {
                self.pending.truncate(held);
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Invalid UTF-8",
                ));
            }
        };
        self.pending = self.pending.split_off(valid);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<U: TextUnit> PrintSink for TextBuffer<U> {
    fn is_in_memory(&self) -> bool {
        true
    }
}
