//! ReaderSource - line source over any buffered reader

use std::borrow::Cow;
use std::io::{self, BufRead, StdinLock};

use contracts::{ContractError, LineSource};
use tracing::warn;

/// Reads newline-terminated lines, stripping `\n` and `\r\n`.
///
/// Lines are taken as raw bytes; invalid UTF-8 is replaced with U+FFFD
/// rather than failing the stream.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    buf: Vec<u8>,
    lines: u64,
}

impl ReaderSource<StdinLock<'static>> {
    /// Line source over standard input
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            lines: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> Result<Option<String>, ContractError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(ContractError::input)?;
        if read == 0 {
            return Ok(None);
        }
        self.lines += 1;

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        let line = match String::from_utf8_lossy(&self.buf) {
            Cow::Borrowed(line) => line.to_owned(),
            Cow::Owned(line) => {
                warn!(line = self.lines, "Invalid UTF-8 replaced");
                line
            }
        };
        Ok(Some(line))
    }
}
