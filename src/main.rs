use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, trace};

use hitcount::{config, output, process, ScanConfig};

/// Counts requests per URL path per day in an access log and writes the
/// result as JSON
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Access log, one `<domain><path>,<timestamp>` record per line
    input: PathBuf,

    /// Where to write the JSON result; replaced only on success
    output: PathBuf,

    /// Number of threads, each scanning its own slice of the log
    #[arg(short, long, default_value_t = config::DEFAULT_WORKERS)]
    workers: usize,

    /// Read buffer size per thread, in bytes
    #[arg(long, default_value_t = config::DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .init();

    debug!("hitcount started with verbosity level: {}", cli.verbose);
    trace!(?cli, "parsed arguments");

    let config = ScanConfig::default()
        .with_workers(cli.workers)
        .with_buffer_size(cli.buffer_size);

    let result = process(&cli.input, &config)
        .with_context(|| format!("failed to scan {}", cli.input.display()))?;
    output::write_json(&result, &cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    Ok(())
}
