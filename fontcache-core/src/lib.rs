//! fontcache-core: remembers every font on the machine so you don't have to
//!
//! Opening a font by family name should not mean walking `/usr/share/fonts`
//! on every launch. This library walks the platform font directories once,
//! notes each font's family, weight, style and stretch, and keeps that list
//! in a small per-application text file. Later runs only check timestamps.
//!
//! ## How It Fits Together
//!
//! **Discovery** ([`scan`]): a bounded walk over each font root that skips
//! hidden names and does not follow directory symlinks.
//!
//! **Decoding** ([`decoder`]): the cache never parses font binaries itself.
//! A [`FontDecoder`] opens `(file, sub-font)` pairs; the default one is built
//! on read-fonts and skrifa.
//!
//! **Persistence** ([`codec`]): a line-oriented cache file that is validated
//! in full before anything in it is trusted.
//!
//! **Lookup** ([`registry`], [`matching`]): a case-insensitively sorted list
//! with a first-letter index, scored against the requested weight, style and
//! stretch.
//!
//! ## A Quick Lookup
//!
//! ```rust,no_run
//! use fontcache_core::{CacheConfig, FontCache, FontQuery, FontWeight, SkrifaDecoder};
//!
//! let config = CacheConfig::new("my-viewer")?;
//! let cache = FontCache::open(config, SkrifaDecoder);
//!
//! let query = FontQuery::new("Arial").with_weight(Some(FontWeight::Bold));
//! if let Some(position) = cache.best_match(&query) {
//!     println!("{:?}", cache.filename(position));
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod attrs;
pub mod cache;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod matching;
pub mod output;
pub mod registry;
pub mod report;
pub mod scan;

pub use attrs::{FontStretch, FontStyle, FontWeight};
pub use cache::{CacheSource, FontCache};
pub use config::CacheConfig;
#[cfg(feature = "fontations")]
pub use decoder::{SkrifaDecoder, SkrifaFace};
pub use decoder::{FontDecoder, FontFace, FontSource};
pub use matching::FontQuery;
pub use report::Reporter;
