//! Opt-in tuning of the standard streams.
//!
//! By default stdout is line buffered, so every printed line costs a write
//! system call. Programs that print a lot can call `tune_standard_streams`
//! once at startup: from then on every `StandardStream::stdout` (and so
//! every default-sink print) goes through one process-wide `BufWriter` that
//! is only flushed when it fills up, when a printer with `flush` enabled
//! writes to it, or when the returned guard is dropped.
//!
//! ```no_run
//! fn main() -> std::io::Result<()> {
//!     let _tuning = ptc::tuning::tune_standard_streams();
//!     for i in 0..10_000 {
//!         ptc::ptc_print!("line", i)?;
//!     }
//!     Ok(())
//! }
//! ```

use std::io::{self, BufWriter, Write};
use std::sync::{Mutex, OnceLock, PoisonError};

use log::{debug, warn};

const TUNED_CAPACITY: usize = 64 * 1024;

static TUNED_STDOUT: OnceLock<Mutex<BufWriter<io::Stdout>>> = OnceLock::new();

/// Flushes tuned stdout when dropped.
///
/// Keep it alive for as long as the program prints, typically by binding it
/// in `main`.
#[must_use = "tuned stdout is only flushed at exit if the guard is kept alive"]
#[derive(Debug)]
pub struct StreamTuning {
    _priv: (),
}

impl Drop for StreamTuning {
    fn drop(&mut self) {
        if let Err(err) = flush() {
            warn!("failed to flush tuned stdout: {err}");
        }
    }
}

/// Switches stdout to a process-wide buffered writer.
///
/// Calling this more than once is harmless; every call returns a guard that
/// flushes the same writer.
pub fn tune_standard_streams() -> StreamTuning {
    let mut installed = false;
    TUNED_STDOUT.get_or_init(|| {
        installed = true;
        Mutex::new(BufWriter::with_capacity(TUNED_CAPACITY, io::stdout()))
    });
    if installed {
        debug!("stdout tuned: {TUNED_CAPACITY} byte buffer installed");
    }
    StreamTuning { _priv: () }
}

/// Returns true if `tune_standard_streams` has been called.
pub fn is_tuned() -> bool {
    TUNED_STDOUT.get().is_some()
}

/// Flushes tuned stdout. Does nothing if stdout is not tuned.
pub fn flush() -> io::Result<()> {
    match TUNED_STDOUT.get() {
        Some(tuned) => {
            debug!("flushing tuned stdout");
            tuned.lock().unwrap_or_else(PoisonError::into_inner).flush()
        }
        None => Ok(()),
    }
}

pub(crate) fn tuned_stdout() -> Option<&'static Mutex<BufWriter<io::Stdout>>> {
    TUNED_STDOUT.get()
}
