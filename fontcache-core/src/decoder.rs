//! Font decoder capability (made by FontLab https://www.fontlab.com/)
//!
//! The cache never parses font binaries itself. It asks a [`FontDecoder`] to
//! open `(source, sub-font index)` and reads a handful of attributes off the
//! resulting [`FontFace`].

use std::path::Path;

use anyhow::Result;

use crate::attrs::{FontStretch, FontStyle, FontWeight};

/// Where a font's bytes come from.
#[derive(Debug, Clone, Copy)]
pub enum FontSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

/// Read-only view of a decoded font.
pub trait FontFace {
    fn family(&self) -> Option<&str>;
    fn style(&self) -> FontStyle;
    fn weight(&self) -> FontWeight;
    fn stretch(&self) -> FontStretch;
    /// Number of sub-fonts in the file this face came from (1 for plain fonts).
    fn num_fonts(&self) -> u32;
}

/// Opens fonts for the cache.
pub trait FontDecoder {
    type Face: FontFace;

    fn open(&self, source: FontSource<'_>, index: u32) -> Result<Self::Face>;
}

#[cfg(feature = "fontations")]
pub use self::fontations::{SkrifaDecoder, SkrifaFace};

#[cfg(feature = "fontations")]
mod fontations {
    use std::fs;
    use std::sync::Arc;

    use anyhow::{bail, Context, Result};
    use read_fonts::CollectionRef;
    use skrifa::attribute::{Stretch, Style};
    use skrifa::string::StringId;
    use skrifa::{FontRef, MetadataProvider};

    use super::{FontDecoder, FontFace, FontSource};
    use crate::attrs::{FontStretch, FontStyle, FontWeight};

    /// Decoder backed by read-fonts/skrifa.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SkrifaDecoder;

    impl FontDecoder for SkrifaDecoder {
        type Face = SkrifaFace;

        fn open(&self, source: FontSource<'_>, index: u32) -> Result<SkrifaFace> {
            let data: Arc<[u8]> = match source {
                FontSource::Path(path) => fs::read(path)
                    .with_context(|| format!("reading font {}", path.display()))?
                    .into(),
                FontSource::Bytes(bytes) => Arc::from(bytes),
            };
            SkrifaFace::from_data(data, index)
        }
    }

    /// A decoded font. Keeps the file bytes so callers can re-borrow a
    /// [`FontRef`] for outlines, metrics and the like.
    #[derive(Debug, Clone)]
    pub struct SkrifaFace {
        data: Arc<[u8]>,
        index: u32,
        num_fonts: u32,
        family: Option<String>,
        style: FontStyle,
        weight: FontWeight,
        stretch: FontStretch,
    }

    impl SkrifaFace {
        pub fn from_data(data: impl Into<Arc<[u8]>>, index: u32) -> Result<Self> {
            let data = data.into();
            let num_fonts = match CollectionRef::new(&data) {
                Ok(collection) => collection.len(),
                Err(_) => 1,
            };
            if index >= num_fonts {
                bail!("sub-font {index} out of range ({num_fonts} available)");
            }

            let font = FontRef::from_index(&data, index).context("parsing font tables")?;
            let family = read_family(&font);
            let attrs = font.attributes();
            let style = match attrs.style {
                Style::Normal => FontStyle::Normal,
                Style::Italic => FontStyle::Italic,
                Style::Oblique(_) => FontStyle::Oblique,
            };
            let weight = FontWeight::nearest(attrs.weight.value());
            let stretch = nearest_stretch(attrs.stretch);

            Ok(Self {
                data,
                index,
                num_fonts,
                family,
                style,
                weight,
                stretch,
            })
        }

        pub fn index(&self) -> u32 {
            self.index
        }

        pub fn data(&self) -> &[u8] {
            &self.data
        }

        pub fn font_ref(&self) -> Result<FontRef<'_>> {
            Ok(FontRef::from_index(&self.data, self.index)?)
        }
    }

    impl FontFace for SkrifaFace {
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
            self.num_fonts
        }
    }

    /// Typographic family (name ID 16) wins over the legacy RIBBI family (ID 1).
    fn read_family(font: &FontRef) -> Option<String> {
        [StringId::TYPOGRAPHIC_FAMILY_NAME, StringId::FAMILY_NAME]
            .into_iter()
            .filter_map(|id| font.localized_strings(id).english_or_first())
            .map(|s| s.to_string().trim().to_string())
            .find(|s| !s.is_empty())
    }

    fn nearest_stretch(stretch: Stretch) -> FontStretch {
        const RATIOS: [(Stretch, FontStretch); 9] = [
            (Stretch::ULTRA_CONDENSED, FontStretch::UltraCondensed),
            (Stretch::EXTRA_CONDENSED, FontStretch::ExtraCondensed),
            (Stretch::CONDENSED, FontStretch::Condensed),
            (Stretch::SEMI_CONDENSED, FontStretch::SemiCondensed),
            (Stretch::NORMAL, FontStretch::Normal),
            (Stretch::SEMI_EXPANDED, FontStretch::SemiExpanded),
            (Stretch::EXPANDED, FontStretch::Expanded),
            (Stretch::EXTRA_EXPANDED, FontStretch::ExtraExpanded),
            (Stretch::ULTRA_EXPANDED, FontStretch::UltraExpanded),
        ];

        let ratio = stretch.ratio();
        RATIOS
            .iter()
            .min_by(|(a, _), (b, _)| {
                (a.ratio() - ratio)
                    .abs()
                    .total_cmp(&(b.ratio() - ratio).abs())
            })
            .map(|(_, named)| *named)
            .unwrap_or_default()
    }

}
