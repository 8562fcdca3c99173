//! The fixed-width record layout and per-line field extraction.
//!
//! A record looks like `https://stitcher.io/blog/foo,2024-01-01T10:00:00+00:00`:
//! a fixed-width domain prefix, a variable-length path, a comma, and a
//! fixed-width timestamp whose first 10 bytes are the `YYYY-MM-DD` date.
//! Nothing in a line is validated beyond its length, so a log written with
//! different field widths misparses instead of failing. [LineFormat] pins the
//! widths down as an explicit, versioned contract.

use std::fmt;

/// Width of the date prefix of a timestamp, `YYYY-MM-DD`
pub const DATE_LEN: usize = 10;

/// Field widths of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat {
    /// Bytes before the path, e.g. `https://stitcher.io`
    pub prefix_len: usize,
    /// Bytes after the separating comma
    pub timestamp_len: usize,
}

impl LineFormat {
    /// 19-byte domain prefix, 25-byte RFC 3339 timestamp with offset
    pub const V1: LineFormat = LineFormat {
        prefix_len: 19,
        timestamp_len: 25,
    };

    /// Shortest line that still carries a one-byte path.
    /// Anything shorter is noise and gets skipped.
    pub const fn min_line_len(&self) -> usize {
        self.prefix_len + 1 + 1 + self.timestamp_len
    }

    /// Returns `(path, date)` for a line without its terminating newline,
    /// or `None` if the line is too short to hold a record.
    #[inline]
    pub fn fields<'a>(&self, line: &'a [u8]) -> Option<(&'a [u8], Date)> {
        let len = line.len();
        if len < self.min_line_len() {
            return None;
        }
        let timestamp_start = len - self.timestamp_len;
        // path stops right before the comma
        let path = &line[self.prefix_len..timestamp_start - 1];
        let date = line
            .get(timestamp_start..timestamp_start + DATE_LEN)?
            .try_into()
            .ok()?;
        Some((path, Date(date)))
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self::V1
    }
}

/// The `YYYY-MM-DD` part of a timestamp, kept as raw bytes.
/// Byte order equals chronological order for this layout.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(pub [u8; DATE_LEN]);

impl Date {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Date({self})")
    }
}

impl std::str::FromStr for Date {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.as_bytes().try_into().map(Date).map_err(|_| ())
    }
}
