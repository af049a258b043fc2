//! Reassembles protocol lines from arbitrary socket reads.

use crate::error::{ChatMorseError, Result};

/// Incremental line splitter.
///
/// Bytes go in through [`feed`](LineFramer::feed); complete lines come out of
/// [`next_line`](LineFramer::next_line) with their `\n` / `\r\n` terminator
/// stripped. An unterminated tail stays buffered until the rest arrives, so
/// a terminator split across reads is handled naturally.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
    /// Bytes at the front of `buffer` already scanned without finding `\n`.
    scanned: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes from the connection.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Take the next complete line.
    ///
    /// Returns `None` when only a partial line (or nothing) is buffered.
    /// Empty lines are skipped. A line that is not valid UTF-8 yields
    /// `Some(Err(LineDecode))`; the lines after it are unaffected.
    pub fn next_line(&mut self) -> Option<Result<String>> {
        loop {
            let offset = self.buffer[self.scanned..]
                .iter()
                .position(|&b| b == b'\n');
            let Some(offset) = offset else {
                self.scanned = self.buffer.len();
                return None;
            };

            let end = self.scanned + offset;
            let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
            self.scanned = 0;

            line.pop(); // '\n'
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }

            let length = line.len();
            return Some(
                String::from_utf8(line).map_err(|e| ChatMorseError::LineDecode {
                    length,
                    message: e.utf8_error().to_string(),
                }),
            );
        }
    }

    /// Feed bytes and collect every line they complete.
    pub fn feed_and_drain(&mut self, bytes: &[u8]) -> Vec<Result<String>> {
        self.feed(bytes);
        std::iter::from_fn(|| self.next_line()).collect()
    }

    /// Number of buffered bytes not yet part of a complete line.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
