//! Tunables for a scan.

use crate::{
    error::{Error, Result},
    record::{LineFormat, DATE_LEN},
};

/// Bytes read per syscall by each worker, 32 MiB
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024 * 1024;

/// Two workers, as the log is usually scanned on small machines
pub const DEFAULT_WORKERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Number of byte ranges, and threads, the input is split into
    pub workers: usize,
    /// Size of each worker's read buffer. Any size is correct; small sizes
    /// only cost more reads and more stitching of split lines.
    pub buffer_size: usize,
    pub format: LineFormat,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            format: LineFormat::default(),
        }
    }
}

impl ScanConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("worker count must be at least 1".into()));
        }
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer size must be at least 1 byte".into()));
        }
        if self.format.timestamp_len < DATE_LEN {
            return Err(Error::Config(format!(
                "timestamp width {} cannot hold a {DATE_LEN} byte date",
                self.format.timestamp_len
            )));
        }
        Ok(())
    }
}
