//! Output window for LZ77 back-references.
//!
//! The window holds the most recent decompressed bytes. Once the live region
//! grows past [`FLUSH_THRESHOLD`], everything older than the last
//! [`HISTORY_SIZE`] bytes is moved into a list of committed chunks and the
//! window is rebased. The chunks are joined once, when the stream ends.
//!
//! ```text
//!   committed chunks          window (<= 64 KB)
//! ┌────┬────┬────┐   ┌──────────────────────┬──────────┐
//! │    │    │    │   │  history (32 KB)     │  recent  │
//! └────┴────┴────┘   └──────────────────────┴──────────┘
//! ```

use oxibin_core::error::{OxiBinError, Result};

/// Capacity of the live window (64 KB).
pub const WINDOW_SIZE: usize = 65536;

/// Window length above which older bytes are committed.
pub const FLUSH_THRESHOLD: usize = 62464;

/// Back-reference history DEFLATE requires (32 KB).
pub const HISTORY_SIZE: usize = 32768;

/// Sliding output window with a committed chunk list.
#[derive(Debug)]
pub struct OutputWindow {
    /// Live bytes: retained history plus output not yet committed.
    window: Vec<u8>,
    /// Output moved out of the window, oldest first.
    chunks: Vec<Vec<u8>>,
    /// Total bytes in `chunks`.
    committed: usize,
    /// Maximum total output, if bounded.
    limit: Option<u64>,
}

impl OutputWindow {
    /// Create an unbounded window.
    pub fn new() -> Self {
        Self {
            window: Vec::with_capacity(WINDOW_SIZE),
            chunks: Vec::new(),
            committed: 0,
            limit: None,
        }
    }

    /// Create a window that fails once total output exceeds `limit` bytes.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Total bytes produced so far.
    #[inline]
    pub fn total_len(&self) -> usize {
        self.committed + self.window.len()
    }

    /// Bytes currently reachable by a back-reference.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.window.len()
    }

    /// Append one literal byte.
    #[inline]
    pub fn write_literal(&mut self, byte: u8) {
        self.window.push(byte);
    }

    /// Append raw bytes from a stored block.
    pub fn write_slice(&mut self, bytes: &[u8]) -> Result<()> {
        for piece in bytes.chunks(WINDOW_SIZE - FLUSH_THRESHOLD) {
            self.window.extend_from_slice(piece);
            self.maybe_flush()?;
        }
        Ok(())
    }

    /// Copy `length` bytes starting `distance` bytes back.
    ///
    /// Overlapping runs (`distance < length`) repeat the source pattern.
    #[inline]
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        let available = self.window.len();
        if distance == 0 || distance > available {
            return Err(OxiBinError::invalid_distance(distance, available));
        }

        let start = available - distance;
        if distance >= length {
            self.window.extend_from_within(start..start + length);
        } else {
            self.window.reserve(length);
            for i in 0..length {
                let byte = self.window[start + i];
                self.window.push(byte);
            }
        }
        Ok(())
    }

    /// Commit old bytes once the window passes the flush threshold.
    ///
    /// Also enforces the output limit.
    #[inline]
    pub fn maybe_flush(&mut self) -> Result<()> {
        if let Some(limit) = self.limit {
            let total = self.total_len() as u64;
            if total > limit {
                return Err(OxiBinError::size_mismatch(limit, total));
            }
        }

        if self.window.len() > FLUSH_THRESHOLD {
            let cut = self.window.len() - HISTORY_SIZE;
            let mut history = Vec::with_capacity(WINDOW_SIZE);
            history.extend_from_slice(&self.window[cut..]);

            let mut committed = std::mem::replace(&mut self.window, history);
            committed.truncate(cut);
            self.committed += cut;
            self.chunks.push(committed);
        }
        Ok(())
    }

    /// Join the committed chunks and the live window into the final output.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.maybe_flush()?;
        if self.chunks.is_empty() {
            return Ok(self.window);
        }

        let mut output = Vec::with_capacity(self.total_len());
        for chunk in &self.chunks {
            output.extend_from_slice(chunk);
        }
        output.extend_from_slice(&self.window);
        Ok(output)
    }
}

impl Default for OutputWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_match() {
        let mut window = OutputWindow::new();
        window.write_literal(b'a');
        window.write_literal(b'b');
        window.copy_match(2, 7).unwrap();
        assert_eq!(window.finish().unwrap(), b"ababababa");
    }

    #[test]
    fn test_distance_beyond_history() {
        let mut window = OutputWindow::new();
        window.write_literal(b'x');
        assert!(matches!(
            window.copy_match(2, 3),
            Err(OxiBinError::InvalidDistance {
                distance: 2,
                history_size: 1
            })
        ));
        assert!(window.copy_match(0, 3).is_err());
    }

    #[test]
    fn test_flush_keeps_history() {
        let mut window = OutputWindow::new();
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        for &byte in &data[..FLUSH_THRESHOLD + 10] {
            window.write_literal(byte);
        }
        window.maybe_flush().unwrap();
        assert_eq!(window.history_len(), HISTORY_SIZE);
        assert_eq!(window.total_len(), FLUSH_THRESHOLD + 10);

        // The oldest reachable byte is exactly 32 KB back.
        window.copy_match(HISTORY_SIZE, 1).unwrap();
        assert!(window.copy_match(HISTORY_SIZE + 2, 1).is_err());

        let mut expected = data[..FLUSH_THRESHOLD + 10].to_vec();
        expected.push(expected[expected.len() - HISTORY_SIZE]);

        window.write_slice(&data[FLUSH_THRESHOLD + 10..]).unwrap();
        expected.extend_from_slice(&data[FLUSH_THRESHOLD + 10..]);
        assert_eq!(window.finish().unwrap(), expected);
    }

    #[test]
    fn test_limit() {
        let mut window = OutputWindow::with_limit(3);
        window.write_slice(b"abc").unwrap();
        window.write_literal(b'd');
        assert!(matches!(
            window.maybe_flush(),
            Err(OxiBinError::SizeMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }
}
