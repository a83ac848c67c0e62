//! Scripted decoder shared by the integration tests.
//!
//! A "font" here is a small text file of `key=value` lines:
//!
//! ```text
//! family=Arial
//! weight=700
//! style=italic
//! stretch=condensed
//! fonts=3
//! family.1=Arial Narrow
//! fail.2
//! ```
//!
//! `family.N` overrides the family of sub-font N and `fail.N` makes it
//! undecodable. A file containing `corrupt` fails outright.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use anyhow::{anyhow, bail, Context, Result};
use fontcache_core::{FontDecoder, FontFace, FontSource, FontStretch, FontStyle, FontWeight};

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedFace {
    pub family: Option<String>,
    pub style: FontStyle,
    pub weight: FontWeight,
    pub stretch: FontStretch,
    pub fonts: u32,
    pub index: u32,
}

impl FontFace for ScriptedFace {
    fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }
    fn style(&self) -> FontStyle {
        self.style
    }
    fn weight(&self) -> FontWeight {
        self.weight
    }
    fn stretch(&self) -> FontStretch {
        self.stretch
    }
    fn num_fonts(&self) -> u32 {
        self.fonts
    }
}

/// Counts every `open` so tests can tell a cache hit from a rescan.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecoder {
    opens: Rc<Cell<usize>>,
}

impl ScriptedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opens(&self) -> usize {
        self.opens.get()
    }
}

impl FontDecoder for ScriptedDecoder {
    type Face = ScriptedFace;

    fn open(&self, source: FontSource<'_>, index: u32) -> Result<ScriptedFace> {
        self.opens.set(self.opens.get() + 1);
        let text = match source {
            FontSource::Path(path) => {
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
            }
            FontSource::Bytes(bytes) => String::from_utf8(bytes.to_vec())?,
        };
        parse(&text, index)
    }
}

fn parse(text: &str, index: u32) -> Result<ScriptedFace> {
    let mut keys: HashMap<&str, &str> = HashMap::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (key, value) = line.split_once('=').unwrap_or((line, ""));
        keys.insert(key, value);
    }
    if keys.contains_key("corrupt") {
        bail!("not a font file");
    }
    if keys.contains_key(format!("fail.{index}").as_str()) {
        bail!("broken sub-font");
    }

    let fonts: u32 = keys.get("fonts").map_or(Ok(1), |v| v.parse())?;
    if index >= fonts {
        return Err(anyhow!("sub-font {index} out of range"));
    }
    let family = keys
        .get(format!("family.{index}").as_str())
        .or_else(|| keys.get("family"))
        .map(|f| f.to_string());

    Ok(ScriptedFace {
        family,
        style: keys.get("style").map_or(Ok(FontStyle::Normal), |v| v.parse())?,
        weight: keys.get("weight").map_or(Ok(FontWeight::Normal), |v| v.parse())?,
        stretch: keys
            .get("stretch")
            .map_or(Ok(FontStretch::Normal), |v| v.parse())?,
        fonts,
        index,
    })
}

/// Write a scripted font file, creating parent directories.
pub fn write_font(path: &Path, script: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create font dir");
    }
    fs::write(path, script).expect("write font");
    path.to_path_buf()
}

/// Move a file's modification time by `offset_secs` relative to now.
pub fn touch(path: &Path, offset_secs: i64) {
    let now = SystemTime::now();
    let delta = Duration::from_secs(offset_secs.unsigned_abs());
    let when = if offset_secs >= 0 { now + delta } else { now - delta };
    fs::File::options()
        .write(true)
        .open(path)
        .expect("open for touch")
        .set_modified(when)
        .expect("set mtime");
}
