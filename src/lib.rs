//! Counts requests per URL path per day in a large access log.
//!
//! The log is cut into one line-aligned byte range per worker
//! ([split::compute_ranges]), every range is tallied on its own thread with
//! large buffered reads ([aggregate::aggregate]), and the per-worker tallies
//! are folded together in worker order ([merge::merge]). Workers share
//! nothing, so counting needs no locks.
//!
//! ```no_run
//! use hitcount::{process, ScanConfig};
//!
//! let result = process("access.log".as_ref(), &ScanConfig::default())?;
//! println!("{}", hitcount::output::to_json_string(&result)?);
//! # Ok::<(), hitcount::Error>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod merge;
pub mod output;
mod process;
pub mod record;
pub mod split;
pub mod tally;

pub use config::ScanConfig;
pub use error::{Error, Result};
pub use process::process;
pub use record::{Date, LineFormat};
pub use split::ByteRange;
pub use tally::AggregateMap;
