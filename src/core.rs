use anyhow::Context;
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use crate::assembler::{assess, Assembler};
use crate::error::Result;
use crate::reader::{BlockReader, SplitImage};
use crate::recording::chain_recordings;
use crate::types::{AssessedFragment, Fragment, Options, RecoverConfig, RecoveryOutcome, RunSummary};
use crate::writer::FragmentWriter;

/// Scan `input` block by block and judge every fragment found.
///
/// Any error ends the scan; a fragment still open at that point is dropped.
pub async fn scan<R>(input: R, config: &RecoverConfig) -> Result<(Vec<AssessedFragment>, RunSummary)>
where
    R: AsyncRead + Unpin,
{
    scan_blocks(BlockReader::new(input, config)?, config).await
}

async fn scan_blocks<R>(
    mut reader: BlockReader<R>,
    config: &RecoverConfig,
) -> Result<(Vec<AssessedFragment>, RunSummary)>
where
    R: AsyncRead + Unpin,
{
    let mut assembler = Assembler::new(config)?;
    let mut fragments = Vec::new();

    while let Some(block) = reader.next_block().await? {
        if let Some(fragment) = assembler.push(&block)? {
            fragments.push(judged(fragment, config));
        }
    }
    if let Some(fragment) = assembler.finish() {
        fragments.push(judged(fragment, config));
    }

    let kept = fragments.iter().filter(|a| a.verdict.is_keep()).count() as u64;
    let summary = RunSummary {
        blocks: assembler.blocks_seen(),
        timestamped_blocks: assembler.timestamped_blocks(),
        fragments: fragments.len() as u64,
        kept,
        discarded: fragments.len() as u64 - kept,
        ..RunSummary::default()
    };
    Ok((fragments, summary))
}

fn judged(fragment: Fragment, config: &RecoverConfig) -> AssessedFragment {
    let assessed = assess(fragment, config);
    if assessed.verdict.is_keep() {
        info!(
            start = fragment.start,
            end = fragment.end,
            span = %fragment.time_diff(),
            "fragment kept"
        );
    } else {
        debug!(
            start = fragment.start,
            end = fragment.end,
            span = %fragment.time_diff(),
            "fragment discarded, shorter than discard size"
        );
    }
    assessed
}

/// Full run: scan the input, chain kept fragments, export them.
pub async fn recover(opts: &Options) -> anyhow::Result<RecoveryOutcome> {
    let config = &opts.config;
    config.validate()?;
    let inputs = opts
        .inputs
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    info!(
        input = %inputs,
        output = %opts.output.display(),
        blocksize = config.blocksize,
        gapsize = config.gapsize,
        discardsize = config.discardsize,
        source = ?config.source,
        "starting recovery"
    );

    let image = SplitImage::open(&opts.inputs)
        .await
        .with_context(|| format!("cannot open input {inputs}"))?;
    let reader = BlockReader::open(&image, config)
        .await
        .with_context(|| format!("cannot open input {inputs}"))?;
    let (fragments, mut summary) = scan_blocks(reader, config)
        .await
        .with_context(|| format!("scan of {inputs} failed"))?;

    if summary.no_timestamps() {
        warn!(
            blocks = summary.blocks,
            "no timestamps found in input, nothing to recover"
        );
    }

    let kept: Vec<Fragment> = fragments
        .iter()
        .filter(|a| a.verdict.is_keep())
        .map(|a| a.fragment)
        .collect();
    let recordings = chain_recordings(&kept, config.chain_gap);
    summary.recordings = recordings.len() as u64;

    let mut files = Vec::new();
    if opts.dry_run {
        info!(recordings = recordings.len(), "dry run, nothing written");
    } else if !recordings.is_empty() {
        let writer = FragmentWriter::create(&image, &opts.output)
            .await
            .with_context(|| format!("cannot prepare output {}", opts.output.display()))?;
        for recording in &recordings {
            summary.bytes_written += writer
                .write(recording)
                .await
                .with_context(|| format!("export of recording {} failed", recording.index))?;
            files.push(writer.path_for(recording));
        }
    }

    info!(
        fragments = summary.fragments,
        kept = summary.kept,
        discarded = summary.discarded,
        bytes = summary.bytes_written,
        "recovery finished"
    );

    Ok(RecoveryOutcome {
        fragments,
        recordings,
        files,
        summary,
    })
}
