//! Sorted font registry with a first-letter index (made by FontLab https://www.fontlab.com/)

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::attrs::{FontStretch, FontStyle, FontWeight};
use crate::codec::CachedFont;
use crate::decoder::{FontDecoder, FontFace, FontSource};
use crate::report::Reporter;

/// One discoverable font.
///
/// The face is memoized: it is decoded on first use from
/// `(filename, sub_index)` and kept until the registry is dropped. Reading a
/// face may therefore fill the cell, but never changes the entry's family or
/// attributes, so the sort order is unaffected.
#[derive(Debug)]
pub struct CacheEntry<F> {
    filename: Option<PathBuf>,
    family: String,
    sub_index: u32,
    stretch: FontStretch,
    style: FontStyle,
    weight: FontWeight,
    face: OnceCell<F>,
}

impl<F> CacheEntry<F> {
    /// Snapshot a decoded face's attributes. Returns `None` when the face has
    /// no usable family name.
    pub fn describe<G: FontFace>(
        face: &G,
        filename: Option<&Path>,
        sub_index: u32,
    ) -> Option<Self> {
        let family = face.family()?.trim();
        if family.is_empty() {
            return None;
        }
        Some(Self {
            filename: filename.map(Path::to_path_buf),
            family: family.to_string(),
            sub_index,
            stretch: face.stretch(),
            style: face.style(),
            weight: face.weight(),
            face: OnceCell::new(),
        })
    }

    pub fn from_record(record: CachedFont) -> Option<Self> {
        if record.family.is_empty() {
            return None;
        }
        Some(Self {
            filename: Some(record.filename),
            family: record.family,
            sub_index: record.sub_index,
            stretch: record.stretch,
            style: record.style,
            weight: record.weight,
            face: OnceCell::new(),
        })
    }

    /// Attach an already decoded face.
    pub fn with_face(self, face: F) -> Self {
        Self {
            face: OnceCell::from(face),
            ..self
        }
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn sub_index(&self) -> u32 {
        self.sub_index
    }

    pub fn stretch(&self) -> FontStretch {
        self.stretch
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    /// The face, if it has been decoded or was supplied at insertion.
    pub fn loaded_face(&self) -> Option<&F> {
        self.face.get()
    }

    /// Return the face, decoding it on first access. Entries without a
    /// filename only ever have the face they were inserted with.
    pub fn face<D>(&self, decoder: &D, reporter: &Reporter) -> Option<&F>
    where
        D: FontDecoder<Face = F>,
    {
        if let Some(face) = self.face.get() {
            return Some(face);
        }

        let path = self.filename.as_deref()?;
        match decoder.open(FontSource::Path(path), self.sub_index) {
            Ok(face) => Some(self.face.get_or_init(|| face)),
            Err(err) => {
                reporter
                    .for_file(path, self.sub_index)
                    .report(&format!("{err:#}"));
                None
            }
        }
    }

    /// Persistable form; `None` for in-memory entries.
    pub fn to_record(&self) -> Option<CachedFont> {
        Some(CachedFont {
            sub_index: self.sub_index,
            filename: self.filename.clone()?,
            stretch: self.stretch,
            style: self.style,
            weight: self.weight,
            family: self.family.clone(),
        })
    }
}

/// Case-insensitive (ASCII) byte-wise comparison.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    let a = a.bytes().map(|b| b.to_ascii_lowercase());
    let b = b.bytes().map(|b| b.to_ascii_lowercase());
    a.cmp(b)
}

/// Registry order: family (case-insensitive), stretch, style, weight, then
/// filename with in-memory entries last.
pub fn compare_entries<F>(a: &CacheEntry<F>, b: &CacheEntry<F>) -> Ordering {
    cmp_ignore_case(&a.family, &b.family)
        .then(a.stretch.cmp(&b.stretch))
        .then(a.style.cmp(&b.style))
        .then(a.weight.cmp(&b.weight))
        .then_with(|| match (&a.filename, &b.filename) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

fn initial(family: &str) -> Option<u8> {
    family.as_bytes().first().map(u8::to_ascii_lowercase)
}

/// Ordered entries plus a 256-slot table mapping each lowercased first byte
/// to the first entry whose family starts with it (or `len()` if none).
pub struct FontRegistry<F> {
    entries: Vec<CacheEntry<F>>,
    font_index: [usize; 256],
}

impl<F> Default for FontRegistry<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            font_index: [0; 256],
        }
    }
}

impl<F> FontRegistry<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&CacheEntry<F>> {
        self.entries.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry<F>> {
        self.entries.iter()
    }

    /// Append without re-sorting. Returns `false` if the entry could not be
    /// stored; existing entries are untouched either way.
    pub fn push(&mut self, entry: CacheEntry<F>) -> bool {
        if self.entries.try_reserve(1).is_err() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Stable sort followed by a full index rebuild.
    pub fn sort(&mut self) {
        self.entries.sort_by(compare_entries);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        let len = self.entries.len();
        self.font_index = [len; 256];
        for (position, entry) in self.entries.iter().enumerate() {
            if let Some(c) = initial(&entry.family) {
                let slot = &mut self.font_index[usize::from(c)];
                if *slot == len {
                    *slot = position;
                }
            }
        }
    }

    /// Position of the first entry whose family starts with `byte`
    /// (case-insensitively), or `len()` when there is none.
    pub fn first_with_initial(&self, byte: u8) -> usize {
        self.font_index[usize::from(byte.to_ascii_lowercase())]
    }

    /// Entries that can be written to the cache file.
    pub fn records(&self) -> Vec<CachedFont> {
        self.entries.iter().filter_map(CacheEntry::to_record).collect()
    }
}
