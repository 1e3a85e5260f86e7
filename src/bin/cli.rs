use std::path::PathBuf;

use clap::Parser;
use mpegrecover::constants::{DEFAULT_BLOCKSIZE, DEFAULT_DISCARDSIZE, DEFAULT_GAPSIZE};
use mpegrecover::recover::{run, Options, RecoverConfig, TimestampSource};
use mpegrecover::report::Reporter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mpegrecover", version, about = "Recover time-continuous fragments from a damaged MPEG stream")]
struct Opt {
    /// Enable verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Block size in bytes
    #[arg(short = 'b', long, default_value_t = DEFAULT_BLOCKSIZE)]
    blocksize: usize,

    /// Largest tolerated clock jump between blocks (90 kHz ticks)
    #[arg(short = 'g', long, default_value_t = DEFAULT_GAPSIZE)]
    gapsize: u64,

    /// Minimum span of a kept fragment (90 kHz ticks)
    #[arg(short = 'd', long, default_value_t = DEFAULT_DISCARDSIZE)]
    discardsize: u64,

    /// Where timestamps are looked for in each block
    #[arg(long, value_enum, default_value_t = TimestampSource::Pack)]
    source: TimestampSource,

    /// Cut fragments at blocks without a timestamp
    #[arg(long)]
    split_untimed: bool,

    /// Cut fragments where the clock runs backwards
    #[arg(long)]
    split_backward: bool,

    /// Export fragments whose clocks continue within N ticks as one file
    #[arg(long, value_name = "N")]
    chain_gap: Option<u64>,

    /// Print the JSON report instead of the table
    #[arg(long)]
    json: bool,

    /// Analyse only, write nothing
    #[arg(long)]
    dry_run: bool,

    /// Damaged recording to scan; several files are read back to back as one image
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Directory the recovered recordings are written to
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    let default_filter = if opt.verbose { "mpegrecover=trace" } else { "mpegrecover=info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let opts = Options {
        inputs: opt.inputs,
        output: opt.output,
        config: RecoverConfig {
            blocksize: opt.blocksize,
            gapsize: opt.gapsize,
            discardsize: opt.discardsize,
            split_on_untimed: opt.split_untimed,
            split_on_backward: opt.split_backward,
            chain_gap: opt.chain_gap,
            source: opt.source,
        },
        dry_run: opt.dry_run,
    };
    let inputs = opts.inputs.clone();
    let config = opts.config.clone();

    let outcome = run(opts).await?;

    if opt.json {
        println!("{}", Reporter::generate_json_report(&inputs, &config, &outcome));
    } else {
        print!("{}", Reporter::render_table(&outcome.fragments, config.blocksize_u64()));
        println!("{}", Reporter::summary_line(&outcome.summary));
    }
    Ok(())
}
