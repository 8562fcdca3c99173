//! Counting the records of one byte range.

use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};

use tracing::{debug, trace};

use crate::{record::LineFormat, split::ByteRange, tally::AggregateMap};

/// Opens a private handle on `path` and tallies exactly the bytes in `range`.
/// The handle is dropped on every exit path.
pub fn aggregate(
    path: &Path,
    range: ByteRange,
    format: &LineFormat,
    buffer_size: usize,
) -> io::Result<AggregateMap> {
    if range.is_empty() {
        return Ok(AggregateMap::new());
    }
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(range.start))?;
    let map = aggregate_reader(file.take(range.len()), format, buffer_size)?;
    debug!(
        %range,
        paths = map.len(),
        records = map.total(),
        "range aggregated"
    );
    Ok(map)
}

/// Tallies every line `reader` yields, reading `buffer_size` bytes at a time.
///
/// Lines are sliced straight out of the read buffer. Only a line cut by a
/// buffer boundary is copied, into `remaining`, and stitched back together
/// with the head of the next buffer. Whatever is left when the reader runs
/// dry is the final line, which may lack a newline.
pub fn aggregate_reader<R: Read>(
    mut reader: R,
    format: &LineFormat,
    buffer_size: usize,
) -> io::Result<AggregateMap> {
    let mut result = AggregateMap::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut remaining: Vec<u8> = Vec::new();

    loop {
        let filled = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let mut chunk = &buffer[..filled];

        if !remaining.is_empty() {
            let Some(newline_pos) = chunk.iter().position(|b| *b == b'\n') else {
                // the pending line spans this whole buffer too
                remaining.extend_from_slice(chunk);
                trace!(pending = remaining.len(), "line spans another buffer");
                continue;
            };
            remaining.extend_from_slice(&chunk[..newline_pos]);
            result.record_line(&remaining, format);
            remaining.clear();
            chunk = &chunk[newline_pos + 1..];
        }

        while let Some(newline_pos) = chunk.iter().position(|b| *b == b'\n') {
            result.record_line(&chunk[..newline_pos], format);
            chunk = &chunk[newline_pos + 1..];
        }
        remaining.extend_from_slice(chunk);
    }

    if !remaining.is_empty() {
        let line_len = remaining
            .iter()
            .rposition(|b| *b != b'\r' && *b != b'\n')
            .map_or(0, |last| last + 1);
        result.record_line(&remaining[..line_len], format);
    }

    Ok(result)
}

#[cfg(test)]
mod test {
    use std::io::{self, Read, Write};

    use super::{aggregate, aggregate_reader};
    use crate::{record::LineFormat, split::ByteRange};

    const FOO_1: &str = "https://stitcher.io/blog/foo,2024-01-01T10:00:00+00:00";
    const FOO_2: &str = "https://stitcher.io/blog/foo,2024-01-01T11:00:00+00:00";
    const BAR: &str = "https://stitcher.io/blog/bar,2024-01-02T09:00:00+00:00";

    fn tally(input: &str, buffer_size: usize) -> crate::AggregateMap {
        match aggregate_reader(input.as_bytes(), &LineFormat::V1, buffer_size) {
            Ok(map) => map,
            Err(e) => panic!("reading from a slice failed: {e}"),
        }
    }

    #[test]
    fn counts_with_any_buffer_size() {
        let input = format!("{FOO_1}\n{FOO_2}\nnoise\n{BAR}\n");
        for buffer_size in [1, 2, 7, 45, 46, 54, 55, 56, 100, input.len(), 1 << 20] {
            let map = tally(&input, buffer_size);
            assert_eq!(map.total(), 3, "buffer_size: {buffer_size}");
            assert_eq!(
                map.count("/blog/foo", "2024-01-01"),
                2,
                "buffer_size: {buffer_size}"
            );
            assert_eq!(
                map.count("/blog/bar", "2024-01-02"),
                1,
                "buffer_size: {buffer_size}"
            );
            let paths: Vec<&[u8]> = map.paths().collect();
            assert_eq!(paths, [b"/blog/foo" as &[u8], b"/blog/bar"]);
        }
    }

    #[test]
    fn line_straddling_buffer_boundary_counts_once() {
        // 20 bytes in, the buffer boundary falls inside the domain prefix
        // of the only record.
        let input = format!("{BAR}\n");
        let map = tally(&input, 20);
        assert_eq!(map.total(), 1);
        assert_eq!(map.count("/blog/bar", "2024-01-02"), 1);
    }

    #[test]
    fn final_line_without_newline() {
        for (input, expected) in [
            (format!("{FOO_1}\n{BAR}"), 2),
            (format!("{FOO_1}\n{BAR}\r"), 2),
            (FOO_1.to_string(), 1),
            (format!("{FOO_1}\n{}", &BAR[..45]), 1),
        ] {
            for buffer_size in [3, 64, 4096] {
                assert_eq!(
                    tally(&input, buffer_size).total(),
                    expected,
                    "input: {input:?}, buffer_size: {buffer_size}"
                );
            }
        }
    }

    #[test]
    fn empty_and_noise_only_inputs() {
        for input in ["", "\n", "\n\n\n", "short\nlines\nonly", "\r\n"] {
            let map = tally(input, 8);
            assert!(map.is_empty(), "input: {input:?}");
        }
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("disk on fire"));
            }
            self.served = true;
            let line = format!("{FOO_1}\n");
            let n = line.len().min(buf.len());
            buf[..n].copy_from_slice(&line.as_bytes()[..n]);
            Ok(n)
        }
    }

    #[test]
    fn read_errors_propagate() {
        let result = aggregate_reader(FailingReader { served: false }, &LineFormat::V1, 1024);
        assert!(result.is_err(), "a failing reader must not yield a partial map");
    }

    #[test]
    fn aggregates_only_its_range() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{FOO_1}\n{BAR}\n{FOO_2}\n").unwrap();
        let second_line = ByteRange {
            start: FOO_1.len() as u64 + 1,
            end: (FOO_1.len() + BAR.len()) as u64 + 2,
        };
        let map = aggregate(file.path(), second_line, &LineFormat::V1, 16).unwrap();
        assert_eq!(map.total(), 1);
        assert_eq!(map.count("/blog/bar", "2024-01-02"), 1);

        let nothing = ByteRange { start: 5, end: 5 };
        assert!(aggregate(file.path(), nothing, &LineFormat::V1, 16)
            .unwrap()
            .is_empty());
    }
}
