//! The `run` command: batch in, transcript out.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use parley_core::config::ParleyConfig;
use parley_core::error::ParleyError;
use parley_core::gateway::GeneratorClient;
use parley_core::ingest;
use parley_core::session::{SessionPipeline, SessionReport};
use parley_core::transcript::{ConsoleSink, JsonFileSink, TranscriptSink};
use parley_core::types::Mood;

use crate::bridge::LlmGenerator;

/// Label reported when the console report cannot be written.
const STDOUT_LABEL: &str = "<stdout>";

/// Replay `input` against the configured LLM backend.
///
/// # Errors
///
/// Fails if the generator cannot be configured, the batch is malformed,
/// or a transcript sink cannot be written.
pub async fn run<W: Write>(
    config: &ParleyConfig,
    input: &Path,
    console: Option<W>,
) -> Result<SessionReport> {
    let generator = LlmGenerator::from_config(&config.llm).context("configuring LLM backend")?;
    if !generator.client().is_available() {
        info!("No LLM provider configured; every reply will be the fallback line");
    }
    run_with(generator, config, input, console).await
}

/// Replay `input` with any generator.
///
/// When a console writer is given, each turn's block is written as soon as
/// the turn completes. If the console fails, the failure is logged, the rest
/// of the batch is still replayed and the JSON file is still written; the
/// console error is returned afterwards. Nothing is written if the batch is
/// malformed.
///
/// # Errors
///
/// Fails if the batch is malformed or a transcript sink cannot be written.
pub async fn run_with<G: GeneratorClient, W: Write>(
    client: G,
    config: &ParleyConfig,
    input: &Path,
    console: Option<W>,
) -> Result<SessionReport> {
    let pipeline = SessionPipeline::from_config(client, config);
    let session = pipeline.id();
    debug!(%session, input = %input.display(), "Reading batch");

    let messages =
        ingest::read_batch(input).with_context(|| format!("replaying {}", input.display()))?;

    let mut console = console.map(|out| ConsoleSink::new(out).with_label(STDOUT_LABEL));
    let mut console_error = None;
    let report = pipeline
        .run_observed(messages, |index, turn| {
            if let Some(sink) = console.as_mut() {
                if let Err(source) = sink.write_turn(index, turn).and_then(|()| sink.flush()) {
                    warn!(%session, error = %source, "Console report failed; continuing without it");
                    console_error = Some(ParleyError::SinkWrite {
                        path: PathBuf::from(sink.label()),
                        source,
                    });
                    console = None;
                }
            }
        })
        .await;

    JsonFileSink::new(&config.transcript.output_path)
        .export(&report.turns)
        .context("writing transcript")?;

    info!(
        %session,
        output = %config.transcript.output_path.display(),
        neutral = report.stats.mood_count(Mood::Neutral),
        friendly = report.stats.mood_count(Mood::Friendly),
        angry = report.stats.mood_count(Mood::Angry),
        "Run complete"
    );

    if let Some(err) = console_error {
        return Err(err).context("writing console report");
    }
    Ok(report)
}
