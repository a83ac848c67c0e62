//! On-disk cache file format (made by FontLab https://www.fontlab.com/)
//!
//! ```text
//! ttf-cache0 <count>
//! <subIndex> <filename>
//! <stretch> <style> <weight> <family>
//! ```
//!
//! Two lines per entry, `<count>` entries. Filename and family run to the end
//! of their line and may contain spaces. Loading is all-or-nothing.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::attrs::{FontStretch, FontStyle, FontWeight};

/// Format revision understood by this codec.
pub const CACHE_VERSION: u32 = 0;

/// Largest entry count a cache file may declare.
pub const MAX_ENTRIES: usize = 65536;

const MAGIC: &str = "ttf-cache";

/// Everything the cache file remembers about one sub-font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFont {
    pub sub_index: u32,
    pub filename: PathBuf,
    pub stretch: FontStretch,
    pub style: FontStyle,
    pub weight: FontWeight,
    pub family: String,
}

#[derive(Debug, Error)]
pub enum CacheFileError {
    #[error("cache file I/O: {0}")]
    Io(#[from] io::Error),

    #[error("bad cache header: {0:?}")]
    BadHeader(String),

    #[error("unsupported cache version {0}")]
    UnsupportedVersion(u32),

    #[error("entry count {0} outside 1..=65536")]
    CountOutOfRange(usize),

    #[error("cache ends after {found} of {expected} entries")]
    Truncated { expected: usize, found: usize },

    #[error("line {line}: malformed {field}")]
    Malformed { line: usize, field: &'static str },

    #[error("line {line}: {field} value {value:?} out of range")]
    OutOfRange {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("referenced font {} is not readable", .0.display())]
    Inaccessible(PathBuf),

    #[error("unexpected data after {0} entries")]
    TrailingData(usize),
}

/// Parse a cache file body without touching the fonts it references.
pub fn read_cache(reader: impl BufRead) -> Result<Vec<CachedFont>, CacheFileError> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| CacheFileError::BadHeader(String::new()))?;
    let count = parse_header(&header)?;

    let mut entries = Vec::with_capacity(count);
    let mut line_no = 1;
    while entries.len() < count {
        let truncated = || CacheFileError::Truncated {
            expected: count,
            found: entries.len(),
        };
        let location = lines.next().transpose()?.ok_or_else(truncated)?;
        let attributes = lines.next().transpose()?.ok_or_else(truncated)?;
        line_no += 2;

        let (sub_index, filename) = parse_location(&location, line_no - 1)?;
        let (stretch, style, weight, family) = parse_attributes(&attributes, line_no)?;
        entries.push(CachedFont {
            sub_index,
            filename,
            stretch,
            style,
            weight,
            family,
        });
    }

    for line in lines {
        if !line?.trim().is_empty() {
            return Err(CacheFileError::TrailingData(count));
        }
    }

    Ok(entries)
}

/// Load and validate a cache file, including readability of every
/// referenced font file.
pub fn load_cache(path: &Path) -> Result<Vec<CachedFont>, CacheFileError> {
    let file = File::open(path)?;
    let entries = read_cache(BufReader::new(file))?;

    if let Some(missing) = entries
        .iter()
        .find(|entry| File::open(&entry.filename).is_err())
    {
        return Err(CacheFileError::Inaccessible(missing.filename.clone()));
    }

    debug!(path = %path.display(), entries = entries.len(), "loaded font cache");
    Ok(entries)
}

/// Serialize the representable entries; returns how many were written.
///
/// Entries whose filename or family cannot survive the line format
/// (non-UTF-8 path, embedded newline, empty family) are skipped.
pub fn write_cache<'a, I>(entries: I, mut w: impl Write) -> Result<usize, CacheFileError>
where
    I: IntoIterator<Item = &'a CachedFont>,
{
    let eligible: Vec<(&CachedFont, &str)> = entries
        .into_iter()
        .filter_map(|entry| representable(entry).map(|name| (entry, name)))
        .collect();
    if eligible.len() > MAX_ENTRIES {
        return Err(CacheFileError::CountOutOfRange(eligible.len()));
    }

    writeln!(w, "{MAGIC}{CACHE_VERSION} {}", eligible.len())?;
    for (entry, filename) in &eligible {
        writeln!(w, "{} {filename}", entry.sub_index)?;
        writeln!(
            w,
            "{} {} {} {}",
            entry.stretch.code(),
            entry.style.code(),
            entry.weight.value(),
            entry.family
        )?;
    }
    w.flush()?;
    Ok(eligible.len())
}

/// Write the cache file via a temporary sibling and rename.
///
/// Returns `Ok(false)` without touching the disk when nothing is eligible.
pub fn save_cache(path: &Path, entries: &[CachedFont]) -> Result<bool, CacheFileError> {
    if !entries.iter().any(|e| representable(e).is_some()) {
        debug!(path = %path.display(), "no cacheable fonts, skipping save");
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let written = write_cache(entries, BufWriter::new(File::create(&temp_path)?));
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(true)
}

fn representable(entry: &CachedFont) -> Option<&str> {
    let filename = entry.filename.to_str()?;
    let clean = |s: &str| !s.is_empty() && !s.contains(['\n', '\r']);
    (clean(filename) && clean(&entry.family)).then_some(filename)
}

fn parse_header(line: &str) -> Result<usize, CacheFileError> {
    let bad = || CacheFileError::BadHeader(line.to_string());
    let rest = line.strip_prefix(MAGIC).ok_or_else(bad)?;
    let (version, count) = rest.split_once(' ').ok_or_else(bad)?;

    let version: u32 = version.parse().map_err(|_| bad())?;
    if version != CACHE_VERSION {
        return Err(CacheFileError::UnsupportedVersion(version));
    }

    let count: usize = count.trim().parse().map_err(|_| bad())?;
    if !(1..=MAX_ENTRIES).contains(&count) {
        return Err(CacheFileError::CountOutOfRange(count));
    }
    Ok(count)
}

fn parse_location(line: &str, line_no: usize) -> Result<(u32, PathBuf), CacheFileError> {
    let malformed = |field| CacheFileError::Malformed {
        line: line_no,
        field,
    };
    let (index, filename) = line.split_once(' ').ok_or_else(|| malformed("location"))?;
    let index = index.parse().map_err(|_| malformed("sub-font index"))?;
    if filename.is_empty() {
        return Err(malformed("filename"));
    }
    Ok((index, PathBuf::from(filename)))
}

fn parse_attributes(
    line: &str,
    line_no: usize,
) -> Result<(FontStretch, FontStyle, FontWeight, String), CacheFileError> {
    let malformed = |field| CacheFileError::Malformed {
        line: line_no,
        field,
    };
    let out_of_range = |field, value: &str| CacheFileError::OutOfRange {
        line: line_no,
        field,
        value: value.to_string(),
    };

    let mut fields = line.splitn(4, ' ');
    let mut next = |field| fields.next().ok_or_else(|| malformed(field));
    let (stretch, style, weight, family) =
        (next("stretch")?, next("style")?, next("weight")?, next("family")?);

    let stretch = stretch
        .parse::<u8>()
        .map_err(|_| malformed("stretch"))
        .and_then(|code| {
            FontStretch::from_code(code).ok_or_else(|| out_of_range("stretch", stretch))
        })?;
    let style = style
        .parse::<u8>()
        .map_err(|_| malformed("style"))
        .and_then(|code| FontStyle::from_code(code).ok_or_else(|| out_of_range("style", style)))?;
    let weight = weight
        .parse::<u16>()
        .map_err(|_| malformed("weight"))
        .and_then(|value| {
            FontWeight::from_value(value).ok_or_else(|| out_of_range("weight", weight))
        })?;
    if family.is_empty() {
        return Err(malformed("family"));
    }

    Ok((stretch, style, weight, family.to_string()))
}
