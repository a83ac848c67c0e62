//! Streaming output helpers (made by FontLab https://www.fontlab.com/)

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::attrs::{FontStretch, FontStyle};
use crate::registry::CacheEntry;

/// Serializable view of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSummary {
    pub family: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub sub_index: u32,
    pub weight: u16,
    pub style: FontStyle,
    pub stretch: FontStretch,
}

impl<F> From<&CacheEntry<F>> for FontSummary {
    fn from(entry: &CacheEntry<F>) -> Self {
        Self {
            family: entry.family().to_string(),
            path: entry.filename().map(PathBuf::from),
            sub_index: entry.sub_index(),
            weight: entry.weight().value(),
            style: entry.style(),
            stretch: entry.stretch(),
        }
    }
}

/// Write summaries as a prettified JSON array.
pub fn write_json_pretty(results: &[FontSummary], mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write summaries as newline-delimited JSON (NDJSON).
pub fn write_ndjson(results: &[FontSummary], mut w: impl Write) -> Result<()> {
    for item in results {
        let line = serde_json::to_string(item)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
