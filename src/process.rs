//! Running one scan: split the input, tally each range on its own thread, merge.

use std::{fs::File, io, path::Path, thread, time::Instant};

use memmap2::MmapOptions;
use tracing::{debug, info};

use crate::{
    aggregate::aggregate,
    config::ScanConfig,
    error::{Error, Result},
    merge::merge,
    split::{compute_ranges, empty_ranges, ByteRange},
    tally::AggregateMap,
};

/// Counts requests per path per date in the log at `input`,
/// scanning it with `config.workers` threads.
///
/// Fails before any worker starts if the input can't be opened. Any worker
/// failure fails the whole scan; there is no partial result.
pub fn process(input: &Path, config: &ScanConfig) -> Result<AggregateMap> {
    config.validate()?;
    let started = Instant::now();

    let ranges = split_input(input, config.workers)?;
    debug!(?ranges, "input split");

    // scope ends only once every worker was joined
    let maps = thread::scope(|s| {
        let handles = ranges
            .iter()
            .map(|&range| {
                s.spawn(move || {
                    aggregate(input, range, &config.format, config.buffer_size)
                })
            })
            .collect::<Vec<_>>();

        // join in rank order, whatever order the workers finish in
        handles
            .into_iter()
            .zip(&ranges)
            .enumerate()
            .map(|(worker, (handle, &range))| worker_outcome(worker, range, handle.join()))
            .collect::<Vec<_>>()
    })
    .into_iter()
    .collect::<Result<Vec<_>>>()?;

    let result = merge(maps);
    info!(
        paths = result.len(),
        records = result.total(),
        workers = config.workers,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scan finished"
    );
    Ok(result)
}

/// Turns a joined worker into its map, or the error that fails the scan
fn worker_outcome(
    worker: usize,
    range: ByteRange,
    joined: thread::Result<io::Result<AggregateMap>>,
) -> Result<AggregateMap> {
    match joined {
        Ok(Ok(map)) => Ok(map),
        Ok(Err(source)) => Err(Error::WorkerIo {
            worker,
            range,
            source,
        }),
        Err(_) => Err(Error::WorkerPanicked { worker }),
    }
}

/// Opens `input` once to find its size and line-aligned cut points.
/// Workers open their own handles later.
fn split_input(input: &Path, workers: usize) -> Result<Vec<ByteRange>> {
    let file = File::open(input).map_err(|e| Error::input(input, e))?;
    let metadata = file.metadata().map_err(|e| Error::input(input, e))?;
    if !metadata.is_file() {
        return Err(Error::InputUnreadable {
            path: input.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    let file_size = metadata.len();
    if file_size == 0 {
        return Ok(empty_ranges(workers));
    }
    // SAFETY: the log is append-only; only pages around the cut points are
    // read through the map, and it is dropped before the workers start.
    let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|e| Error::input(input, e))?;
    Ok(compute_ranges(&mmap, workers))
}
