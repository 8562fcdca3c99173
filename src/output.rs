//! Writing the result as pretty-printed JSON.

use std::{
    io::{BufWriter, Write},
    path::Path,
};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    error::{Error, Result},
    tally::AggregateMap,
};

/// Writes `result` to `path` as a pretty-printed JSON object.
///
/// The document is written to a temporary file next to `path` and renamed
/// over it once complete, so a failure never leaves a truncated file and
/// never clobbers an earlier output.
pub fn write_json(result: &AggregateMap, path: &Path) -> Result<()> {
    let output_err = |source| Error::Output {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir).map_err(output_err)?;

    let mut out = BufWriter::with_capacity(2 * 1024 * 1024, tmp);
    write_pretty(result, &mut out, path)?;
    out.flush().map_err(output_err)?;
    let tmp = out.into_inner().map_err(|e| output_err(e.into_error()))?;

    tmp.persist(path).map_err(|e| output_err(e.error))?;
    debug!(path = %path.display(), paths = result.len(), "output written");
    Ok(())
}

/// Streams `result` into `writer`. Write failures are reported against `path`;
/// only a map that can't be represented is a serialization error.
fn write_pretty<W: Write>(result: &AggregateMap, writer: W, path: &Path) -> Result<()> {
    serde_json::to_writer_pretty(writer, result).map_err(|e| {
        if e.is_io() {
            Error::Output {
                path: path.to_path_buf(),
                source: e.into(),
            }
        } else {
            Error::Serialize(e)
        }
    })
}

/// Renders `result` the same way [write_json] does
pub fn to_json_string(result: &AggregateMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
