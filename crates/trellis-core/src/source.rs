use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::interval::Interval;

/// Reads intervals from a file, or from stdin when `path` is `-`.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_intervals(path: &Path) -> anyhow::Result<Vec<Interval>> {
    let (text, origin) = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed reading intervals from stdin")?;
        (buf, "stdin".to_string())
    } else {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        (text, path.display().to_string())
    };

    let intervals = parse_intervals(&text, &origin)?;
    info!(origin = %origin, count = intervals.len(), "loaded intervals");
    Ok(intervals)
}

/// Accepts either one JSON array or JSON Lines.
pub fn parse_intervals(text: &str, origin: &str) -> anyhow::Result<Vec<Interval>> {
    if text.trim_start().starts_with('[') {
        debug!(origin, "parsing interval array");
        return serde_json::from_str(text).with_context(|| format!("failed parsing {origin} as a JSON array"));
    }

    debug!(origin, "parsing interval jsonl");
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let interval: Interval = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {origin} line {}", idx + 1))?;
        out.push(interval);
    }
    Ok(out)
}

/// Replaces `path` with `contents` via a temp file in the same directory.
#[tracing::instrument(skip(path, contents), fields(path = %path.display(), bytes = contents.len()))]
pub fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;
    debug!("wrote output atomically");
    Ok(())
}
