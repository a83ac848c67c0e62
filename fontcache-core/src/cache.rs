//! Font cache lifecycle (made by FontLab https://www.fontlab.com/)
//!
//! Construction decides between the saved cache file and a full rescan:
//!
//! ```text
//! no cache file                      -> rescan -> save -> sort
//! any root newer than the cache file -> rescan -> save -> sort
//! cache file fails validation        -> rescan -> save -> sort
//! otherwise                          -> load          -> sort
//! ```

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::attrs::{FontStretch, FontStyle, FontWeight};
use crate::codec::{load_cache, save_cache};
use crate::config::CacheConfig;
use crate::decoder::{FontDecoder, FontFace, FontSource};
use crate::matching::{best_match, FontQuery};
use crate::registry::{CacheEntry, FontRegistry};
use crate::report::Reporter;
use crate::scan::{DirectoryScanner, ScanMode};

/// Outcome of comparing the cache file against the font roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Missing,
    Stale,
    Fresh,
}

/// How the registry was populated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Entries came from the saved cache file.
    Loaded,
    /// The font roots were walked and every candidate decoded.
    Rescanned,
}

/// Registry of every usable font on the machine, persisted per application.
///
/// Not thread-safe: lookups memoize decoded faces inside the registry.
pub struct FontCache<D: FontDecoder> {
    config: CacheConfig,
    decoder: D,
    reporter: Reporter,
    registry: FontRegistry<D::Face>,
    source: CacheSource,
}

impl<D: FontDecoder> FontCache<D> {
    /// Build the cache, reporting problems through `tracing`.
    pub fn open(config: CacheConfig, decoder: D) -> Self {
        Self::with_reporter(config, decoder, Reporter::default())
    }

    pub fn with_reporter(config: CacheConfig, decoder: D, reporter: Reporter) -> Self {
        let mut cache = Self {
            config,
            decoder,
            reporter,
            registry: FontRegistry::new(),
            source: CacheSource::Rescanned,
        };
        cache.populate();
        cache
    }

    fn populate(&mut self) {
        let scanner = DirectoryScanner::new().max_depth(self.config.max_depth());

        if let Some(path) = self.config.cache_file().map(Path::to_path_buf) {
            match self.freshness(&path, &scanner) {
                Freshness::Fresh => {
                    if self.load(&path) {
                        info!(path = %path.display(), fonts = self.registry.len(), "font cache hit");
                        self.source = CacheSource::Loaded;
                        self.registry.sort();
                        return;
                    }
                }
                Freshness::Stale => info!(path = %path.display(), "font cache is stale"),
                Freshness::Missing => debug!(path = %path.display(), "no font cache yet"),
            }
        }

        self.rescan(&scanner);
        self.persist();
        self.registry.sort();
    }

    fn freshness(&self, path: &Path, scanner: &DirectoryScanner) -> Freshness {
        let saved = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(_) => return Freshness::Missing,
        };

        let newest: Option<SystemTime> = self
            .config
            .font_dirs()
            .iter()
            .filter_map(|root| scanner.newest_mtime(root))
            .max();

        match newest {
            Some(newest) if newest > saved => Freshness::Stale,
            _ => Freshness::Fresh,
        }
    }

    /// Replace the registry with the cache file's entries, or leave it
    /// untouched and return `false`.
    fn load(&mut self, path: &Path) -> bool {
        let records = match load_cache(path) {
            Ok(records) => records,
            Err(err) => {
                self.reporter.for_file(path, 0).report(&err.to_string());
                return false;
            }
        };

        let mut registry: FontRegistry<D::Face> = FontRegistry::new();
        for record in records {
            let stored = CacheEntry::from_record(record).is_some_and(|e| registry.push(e));
            if !stored {
                return false;
            }
        }
        self.registry = registry;
        true
    }

    fn rescan(&mut self, scanner: &DirectoryScanner) {
        let roots = self.config.font_dirs().to_vec();
        info!(roots = roots.len(), "scanning font directories");

        for root in &roots {
            scanner.scan(root, ScanMode::Full, |path| self.add_discovered(path));
        }
        self.source = CacheSource::Rescanned;
    }

    fn add_discovered(&mut self, path: &Path) {
        match self.decoder.open(FontSource::Path(path), 0) {
            Ok(face) => {
                let count = face.num_fonts();
                if self.insert_discovered(&face, path, 0) {
                    self.add_companions(path, count);
                }
            }
            Err(err) => self.reporter.for_file(path, 0).report(&format!("{err:#}")),
        }
    }

    /// Sub-fonts `1..count` of a collection, each decoded on its own.
    fn add_companions(&mut self, path: &Path, count: u32) {
        for index in 1..count {
            match self.decoder.open(FontSource::Path(path), index) {
                Ok(face) => {
                    self.insert_discovered(&face, path, index);
                }
                Err(err) => self
                    .reporter
                    .for_file(path, index)
                    .report(&format!("{err:#}")),
            }
        }
    }

    /// Record a scanned face, dropping the face itself. Families starting
    /// with `.` are hidden system fonts and never listed. Returns whether an
    /// entry was stored.
    fn insert_discovered(&mut self, face: &D::Face, path: &Path, index: u32) -> bool {
        if face.family().is_some_and(|f| f.trim_start().starts_with('.')) {
            debug!(path = %path.display(), index, "skipping hidden family");
            return false;
        }
        match CacheEntry::describe(face, Some(path), index) {
            Some(entry) => self.registry.push(entry),
            None => {
                debug!(path = %path.display(), index, "skipping font without family");
                false
            }
        }
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            self.reporter.report(&format!("{err:#}"));
        }
    }

    /// Add a font the caller already decoded.
    ///
    /// With a rooted `filename` the entry is reopenable from disk and any
    /// other sub-fonts in the same file are added too. Anything else is kept
    /// as an in-memory font that owns `face`. Not written to disk until
    /// [`save`](Self::save).
    pub fn add(&mut self, face: D::Face, filename: Option<&Path>) {
        let rooted = filename.filter(|p| p.has_root());
        let count = face.num_fonts();

        match CacheEntry::describe(&face, rooted, 0) {
            Some(entry) => {
                self.registry.push(entry.with_face(face));
            }
            None => {
                debug!("ignoring font without family");
                return;
            }
        }
        if let Some(path) = rooted {
            self.add_companions(path, count);
        }
        self.registry.sort();
    }

    /// Write every disk-backed entry to the cache file. Returns `Ok(false)`
    /// when persistence is disabled or there was nothing to write.
    pub fn save(&self) -> Result<bool> {
        let Some(path) = self.config.cache_file() else {
            return Ok(false);
        };
        let saved = save_cache(path, &self.registry.records())
            .with_context(|| format!("saving font cache {}", path.display()))?;
        if saved {
            info!(path = %path.display(), "font cache saved");
        }
        Ok(saved)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn source(&self) -> CacheSource {
        self.source
    }

    pub fn app_name(&self) -> &str {
        self.config.app_name()
    }

    pub fn cache_file(&self) -> Option<&Path> {
        self.config.cache_file()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn entry(&self, position: usize) -> Option<&CacheEntry<D::Face>> {
        self.registry.get(position)
    }

    /// Entries in registry order.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry<D::Face>> {
        self.registry.iter()
    }

    pub fn filename(&self, position: usize) -> Option<&Path> {
        self.entry(position)?.filename()
    }

    pub fn family(&self, position: usize) -> Option<&str> {
        self.entry(position).map(CacheEntry::family)
    }

    pub fn stretch(&self, position: usize) -> Option<FontStretch> {
        self.entry(position).map(CacheEntry::stretch)
    }

    pub fn style(&self, position: usize) -> Option<FontStyle> {
        self.entry(position).map(CacheEntry::style)
    }

    pub fn weight(&self, position: usize) -> Option<FontWeight> {
        self.entry(position).map(CacheEntry::weight)
    }

    pub fn sub_index(&self, position: usize) -> Option<u32> {
        self.entry(position).map(CacheEntry::sub_index)
    }

    /// The face at `position`, decoded on first access.
    pub fn get(&self, position: usize) -> Option<&D::Face> {
        self.entry(position)?.face(&self.decoder, &self.reporter)
    }

    /// Position of the best entry for `query`.
    pub fn best_match(&self, query: &FontQuery) -> Option<usize> {
        best_match(&self.registry, query)
    }

    /// Best-matching face for `query`, decoded on first access.
    pub fn find(&self, query: &FontQuery) -> Option<&D::Face> {
        self.get(self.best_match(query)?)
    }
}
