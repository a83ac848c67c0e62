//! Attribute matching (made by FontLab https://www.fontlab.com/)

use std::cmp::Ordering;

use crate::attrs::{FontStretch, FontStyle, FontWeight};
use crate::registry::{cmp_ignore_case, CacheEntry, FontRegistry};

/// Stretch mismatches cost ten times a weight step, so the right width wins
/// over the right boldness.
const STRETCH_FACTOR: u32 = 10;

/// A family plus optional style, weight and stretch preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontQuery {
    family: String,
    style: Option<FontStyle>,
    weight: Option<FontWeight>,
    stretch: Option<FontStretch>,
}

impl FontQuery {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: Option<FontStyle>) -> Self {
        self.style = style;
        self
    }

    pub fn with_weight(mut self, weight: Option<FontWeight>) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_stretch(mut self, stretch: Option<FontStretch>) -> Self {
        self.stretch = stretch;
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Weighted distance between this query and an entry of the same family;
    /// 0 is a perfect match. Unspecified attributes cost nothing.
    ///
    /// The stretch term is measured along the visual width order
    /// (ultra-condensed .. ultra-expanded), not between stored codes, where
    /// `normal` is 0 and would sit next to ultra-condensed.
    pub fn score<F>(&self, entry: &CacheEntry<F>) -> u32 {
        let weight = self
            .weight
            .map_or(0, |wanted| entry.weight().distance(wanted));
        let stretch = self
            .stretch
            .map_or(0, |wanted| STRETCH_FACTOR * entry.stretch().distance(wanted));
        let style = self.style.map_or(0, |wanted| {
            u32::from(entry.style().is_slanted() != wanted.is_slanted())
        });
        weight + stretch + style
    }
}

/// Position of the best entry for `query`, or `None` if the family is absent.
///
/// Starts at the first-letter index and stops at the first family that sorts
/// after the query. Ties keep the earliest entry; a zero score ends the scan.
pub fn best_match<F>(registry: &FontRegistry<F>, query: &FontQuery) -> Option<usize> {
    let first = *query.family.as_bytes().first()?;
    let mut best: Option<(usize, u32)> = None;

    for position in registry.first_with_initial(first)..registry.len() {
        let entry = registry.get(position)?;
        match cmp_ignore_case(entry.family(), &query.family) {
            Ordering::Less => continue,
            Ordering::Greater => break,
            Ordering::Equal => {}
        }

        let score = query.score(entry);
        if best.map_or(true, |(_, lowest)| score < lowest) {
            best = Some((position, score));
            if score == 0 {
                break;
            }
        }
    }

    best.map(|(position, _)| position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CachedFont;
    use std::path::PathBuf;

    fn record(family: &str, weight: FontWeight, style: FontStyle, file: &str) -> CachedFont {
        CachedFont {
            sub_index: 0,
            filename: PathBuf::from(file),
            stretch: FontStretch::Normal,
            style,
            weight,
            family: family.to_string(),
        }
    }

    fn registry(records: Vec<CachedFont>) -> FontRegistry<()> {
        let mut registry = FontRegistry::new();
        for r in records {
            registry.push(CacheEntry::from_record(r).expect("family"));
        }
        registry.sort();
        registry
    }

    fn arial() -> FontRegistry<()> {
        registry(vec![
            record("Arial", FontWeight::Normal, FontStyle::Normal, "/a400.ttf"),
            record("Arial", FontWeight::Bold, FontStyle::Normal, "/a700.ttf"),
        ])
    }

    fn filename_at(registry: &FontRegistry<()>, position: Option<usize>) -> Option<PathBuf> {
        position
            .and_then(|p| registry.get(p))
            .and_then(|e| e.filename().map(|f| f.to_path_buf()))
    }

    #[test]
    fn nearest_weight_wins() {
        let registry = arial();
        let query = FontQuery::new("Arial").with_weight(Some(FontWeight::SemiBold));

        assert_eq!(
            filename_at(&registry, best_match(&registry, &query)),
            Some(PathBuf::from("/a700.ttf"))
        );
    }

    #[test]
    fn style_mismatch_ties_keep_first_entry() {
        let registry = arial();
        let query = FontQuery::new("Arial").with_style(Some(FontStyle::Italic));

        assert_eq!(best_match(&registry, &query), Some(0));
    }

    #[test]
    fn oblique_satisfies_italic() {
        let registry = registry(vec![
            record("Serif", FontWeight::Normal, FontStyle::Normal, "/r.ttf"),
            record("Serif", FontWeight::Normal, FontStyle::Oblique, "/o.ttf"),
        ]);
        let query = FontQuery::new("serif").with_style(Some(FontStyle::Italic));

        assert_eq!(
            filename_at(&registry, best_match(&registry, &query)),
            Some(PathBuf::from("/o.ttf"))
        );
    }

    #[test]
    fn stretch_outweighs_weight() {
        let mut condensed_regular =
            record("Sans", FontWeight::Normal, FontStyle::Normal, "/cr.ttf");
        condensed_regular.stretch = FontStretch::Condensed;
        let registry = registry(vec![
            condensed_regular,
            record("Sans", FontWeight::Black, FontStyle::Normal, "/nb.ttf"),
        ]);
        let query = FontQuery::new("Sans")
            .with_weight(Some(FontWeight::Normal))
            .with_stretch(Some(FontStretch::Normal));

        // condensed costs 10 * 2 = 20, black costs 500
        assert_eq!(
            filename_at(&registry, best_match(&registry, &query)),
            Some(PathBuf::from("/cr.ttf"))
        );
    }

    #[test]
    fn stretch_distance_follows_visual_width() {
        let mut normal = record("Sans", FontWeight::Normal, FontStyle::Normal, "/n.ttf");
        normal.stretch = FontStretch::Normal;
        let mut condensed = record("Sans", FontWeight::Normal, FontStyle::Normal, "/c.ttf");
        condensed.stretch = FontStretch::Condensed;
        let registry = registry(vec![normal, condensed]);
        let query = FontQuery::new("Sans").with_stretch(Some(FontStretch::UltraCondensed));

        assert_eq!(
            filename_at(&registry, best_match(&registry, &query)),
            Some(PathBuf::from("/c.ttf"))
        );
    }

    #[test]
    fn unknown_or_empty_family_has_no_match() {
        let registry = arial();
        assert_eq!(best_match(&registry, &FontQuery::new("Helvetica")), None);
        assert_eq!(best_match(&registry, &FontQuery::new("Ar")), None);
        assert_eq!(best_match(&registry, &FontQuery::new("")), None);
    }

    #[test]
    fn family_match_ignores_case() {
        let registry = arial();
        assert_eq!(best_match(&registry, &FontQuery::new("ARIAL")), Some(0));
    }

    #[test]
    fn unspecified_query_scores_zero() {
        let registry = arial();
        let entry = registry.get(1).expect("entry");
        assert_eq!(FontQuery::new("Arial").score(entry), 0);
    }
}
