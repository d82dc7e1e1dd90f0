//! Font metrics backed by fontdue, with family fallback.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! A [`FontBook`] holds loaded faces by family name. Lookup falls back
//! through the requested family list, then any loaded face, and finally
//! the ratio-based approximation, so a missing font never breaks layout.

use fontdue::Font;
use willow_css::layout::{ApproximateFontMetrics, FontMetrics, FontQuery};

/// The engine's font provider.
pub struct FontBook {
    faces: Vec<(String, Font)>,
    fallback: ApproximateFontMetrics,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    /// An empty book (everything measures through the approximation).
    #[must_use]
    pub fn new() -> Self {
        Self {
            faces: Vec::new(),
            fallback: ApproximateFontMetrics,
        }
    }

    /// Load a face from font file bytes under a family name.
    ///
    /// # Errors
    ///
    /// Returns fontdue's error string when the bytes are not a parseable
    /// font.
    pub fn load(&mut self, family: &str, bytes: &[u8]) -> Result<(), String> {
        let font = Font::from_bytes(bytes, fontdue::FontSettings::default())?;
        self.faces.push((family.to_string(), font));
        Ok(())
    }

    /// Find the face for a query: first requested family that is loaded,
    /// else the first loaded face.
    fn face_for(&self, query: &FontQuery) -> Option<&Font> {
        for family in query.families {
            if let Some((_, font)) = self
                .faces
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(family))
            {
                return Some(font);
            }
        }
        self.faces.first().map(|(_, font)| font)
    }
}

impl FontMetrics for FontBook {
    fn text_width(&self, query: &FontQuery, text: &str) -> f32 {
        match self.face_for(query) {
            Some(font) => text
                .chars()
                .filter(|ch| !ch.is_control())
                .map(|ch| font.metrics(ch, query.size).advance_width)
                .sum(),
            None => self.fallback.text_width(query, text),
        }
    }

    fn line_height(&self, query: &FontQuery) -> f32 {
        match self.face_for(query).and_then(|font| {
            font.horizontal_line_metrics(query.size)
                .map(|m| m.new_line_size)
        }) {
            Some(line_size) => line_size,
            None => self.fallback.line_height(query),
        }
    }
}
