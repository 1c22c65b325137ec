//! User-facing output.
//!
//! Everything a command prints goes through a [`Reporter`]. Informational
//! lines go to stdout and are dropped when the reporter is silent; errors go
//! to stderr and are always shown. Diagnostics for developers use `tracing`
//! instead.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Prefix on every reported line.
pub const PREFIX: &str = "logctl: ";

/// Output sink for command results and errors.
pub struct Reporter {
    silent: bool,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl Reporter {
    /// Report to the process's stdout and stderr.
    pub fn stdio(silent: bool) -> Self {
        Self::new(silent, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn new(silent: bool, out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self { silent, out, err }
    }

    /// Report into in-memory buffers, returning a handle to read them back.
    pub fn capture(silent: bool) -> (Self, Captured) {
        let captured = Captured::default();
        let reporter = Self::new(
            silent,
            Box::new(SharedBuf(Rc::clone(&captured.out))),
            Box::new(SharedBuf(Rc::clone(&captured.err))),
        );
        (reporter, captured)
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// An informational line (suppressed when silent).
    pub fn info(&mut self, msg: impl fmt::Display) {
        if self.silent {
            return;
        }
        // A closed stdout is not worth failing the command over.
        let _ = writeln!(self.out, "{PREFIX}{msg}");
    }

    /// An error line (always shown).
    pub fn error(&mut self, msg: impl fmt::Display) {
        let _ = writeln!(self.err, "{PREFIX}{msg}");
    }

    pub fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("silent", &self.silent)
            .finish_non_exhaustive()
    }
}

/// Read side of [`Reporter::capture`].
#[derive(Debug, Clone, Default)]
pub struct Captured {
    out: Rc<RefCell<Vec<u8>>>,
    err: Rc<RefCell<Vec<u8>>>,
}

impl Captured {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.out.borrow()).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.err.borrow()).into_owned()
    }
}

struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_and_error_streams() {
        let (mut reporter, captured) = Reporter::capture(false);
        reporter.info("Context 'ui' = err");
        reporter.error(format_args!("Invalid level '{}'.", "loud"));

        assert_eq!(captured.stdout(), "logctl: Context 'ui' = err\n");
        assert_eq!(captured.stderr(), "logctl: Invalid level 'loud'.\n");
    }

    #[test]
    fn test_silent_drops_info_only() {
        let (mut reporter, captured) = Reporter::capture(true);
        assert!(reporter.is_silent());
        reporter.info("hidden");
        reporter.error("shown");
        reporter.flush();

        assert_eq!(captured.stdout(), "");
        assert_eq!(captured.stderr(), "logctl: shown\n");
    }
}
