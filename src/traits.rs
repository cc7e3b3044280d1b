use std::fs::File;
use std::io::{self, BufWriter, Cursor, LineWriter};

/// This trait describes a destination a printer can write a line to.
///
/// A sink is any `io::Write`. The only extra thing a printer needs to know
/// is whether the sink keeps its data in memory: flushing is skipped for
/// in-memory sinks even when the printer is configured to flush.
///
/// Types that are not covered by an implementation here can be wrapped in
/// `Plain` (for devices) or written through a `TextBuffer` (for memory).
pub trait PrintSink: io::Write {
    /// Returns true if and only if this sink is an in-memory buffer.
    ///
    /// This defaults to `false`.
    fn is_in_memory(&self) -> bool {
        false
    }
}

impl<T: ?Sized + PrintSink> PrintSink for &mut T {
    fn is_in_memory(&self) -> bool {
        (**self).is_in_memory()
    }
}

impl<T: ?Sized + PrintSink> PrintSink for Box<T> {
    fn is_in_memory(&self) -> bool {
        (**self).is_in_memory()
    }
}

impl PrintSink for io::Stdout {}

impl PrintSink for io::Stderr {}

impl PrintSink for io::StdoutLock<'_> {}

impl PrintSink for io::StderrLock<'_> {}

impl PrintSink for io::Sink {}

impl PrintSink for File {}

impl<W: io::Write> PrintSink for BufWriter<W> {}

impl<W: io::Write> PrintSink for LineWriter<W> {}

impl PrintSink for Vec<u8> {
    fn is_in_memory(&self) -> bool {
        true
    }
}

impl PrintSink for Cursor<Vec<u8>> {
    fn is_in_memory(&self) -> bool {
        true
    }
}

impl PrintSink for Cursor<&mut Vec<u8>> {
    fn is_in_memory(&self) -> bool {
        true
    }
}

impl PrintSink for Cursor<&mut [u8]> {
    fn is_in_memory(&self) -> bool {
        true
    }
}
