//! Implementations of the CLI subcommands over in-memory text.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use forge_markdown_stream::{IncrementalRenderer, MessageStream, RenderConfig, ThinkSplitter};
use serde::Serialize;
use tracing::{debug, info};

/// Summary of a replayed stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamReport {
    pub chunks: usize,
    /// Chunks that replaced previously emitted lines.
    pub retracted: usize,
    /// Replaying every update yields the final render.
    pub converged: bool,
}

#[derive(Serialize)]
struct ChunkLine<'a> {
    index: usize,
    chunk: &'a str,
    html_delta: &'a str,
    thinking_html: &'a str,
    retract: usize,
}

/// Splits `text` into pieces of at most `size` characters.
fn chunks(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut out = Vec::new();
    let mut start = 0;
    for (count, (pos, _)) in text.char_indices().enumerate() {
        if count > 0 && count % size == 0 {
            out.push(&text[start..pos]);
            start = pos;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

pub fn render(config: &RenderConfig, input: &str, out: &mut impl Write) -> Result<()> {
    let renderer = IncrementalRenderer::new(config)?;
    let visible = renderer.splitter().split(input).visible_text;
    out.write_all(renderer.render_message(&visible).as_bytes())?;
    Ok(())
}

/// Replays `input` through a [`MessageStream`] in fixed-size chunks.
pub fn stream(
    config: &RenderConfig,
    input: &str,
    chunk_size: usize,
    json: bool,
    out: &mut impl Write,
) -> Result<StreamReport> {
    let renderer = Arc::new(IncrementalRenderer::new(config)?);
    let mut stream = MessageStream::new(renderer);
    let mut emitted = String::new();
    let mut retracted = 0;

    let pieces = chunks(input, chunk_size);
    for (index, chunk) in pieces.iter().enumerate() {
        let update = stream.push(chunk);
        debug!(
            index,
            cursor = stream.cursor(),
            retract = update.retract,
            delta_len = update.html_delta.len(),
            "Chunk pushed"
        );
        if update.retract > 0 {
            retracted += 1;
        }

        if json {
            let line = ChunkLine {
                index,
                chunk,
                html_delta: &update.html_delta,
                thinking_html: &update.thinking_html,
                retract: update.retract,
            };
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
        update.apply(&mut emitted);
    }
    if !json {
        out.write_all(emitted.as_bytes())?;
    }

    let report = StreamReport {
        chunks: pieces.len(),
        retracted,
        converged: emitted == stream.finish(),
    };
    info!(chunks = report.chunks, retracted = report.retracted, converged = report.converged, "Stream replayed");
    Ok(report)
}

pub fn think(config: &RenderConfig, input: &str, out: &mut impl Write) -> Result<()> {
    let split = ThinkSplitter::new(&config.think_tag)?.split(input);
    writeln!(out, "{}", serde_json::to_string_pretty(&split)?)?;
    Ok(())
}
