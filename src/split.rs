//! Splitting the input into one line-aligned byte range per worker.

use std::fmt;

/// `[start, end)` offsets into the input.
/// Both ends sit at 0, just after a newline, or at the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Cuts `input` into `workers` contiguous ranges of roughly equal size,
/// moving every internal cut forward to the start of the next line.
/// Long lines can swallow later cuts, leaving empty trailing ranges.
/// Returns an empty vec for `workers == 0`.
pub fn compute_ranges(input: &[u8], workers: usize) -> Vec<ByteRange> {
    let len = input.len();
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for worker in 0..workers {
        let end = if worker + 1 == workers {
            len
        } else {
            // widen to avoid overflow on very large inputs
            let approx = (len as u128 * (worker as u128 + 1) / workers as u128) as usize;
            snap_to_line_start(input, approx).max(start)
        };
        ranges.push(ByteRange {
            start: start as u64,
            end: end as u64,
        });
        start = end;
    }
    debug_assert!(ranges.iter().all(|r| r.start <= r.end));
    ranges
}

/// `workers` empty ranges, for a zero-byte input
pub fn empty_ranges(workers: usize) -> Vec<ByteRange> {
    vec![ByteRange { start: 0, end: 0 }; workers]
}

/// Returns the first line start at or after `offset`.
/// An offset that already starts a line is returned unchanged; one past the
/// last newline (or past the end) snaps to `input.len()`.
pub fn snap_to_line_start(input: &[u8], offset: usize) -> usize {
    if offset == 0 {
        return 0;
    }
    if offset >= input.len() {
        return input.len();
    }
    // look from offset - 1 so an aligned offset finds its own preceding newline
    match input[offset - 1..].iter().position(|b| *b == b'\n') {
        Some(num_bytes_to_newline) => offset + num_bytes_to_newline,
        None => input.len(),
    }
}
