//! TrueType font embedding for PDF documents

use crate::metrics::FontMetrics;
use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Font data structure for embedded fonts
///
/// The raw bytes are shared, so cloning a `FontData` (or building one per
/// document from the same download) never copies the font program.
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF/OTF data
    pub ttf_data: Arc<Vec<u8>>,
    /// Characters used (for widths and ToUnicode)
    pub used_chars: BTreeSet<char>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// Fails when the bytes are not a parseable font.
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: Arc<Vec<u8>>) -> Result<Self> {
        ttf_parser::Face::parse(&ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data,
            used_chars: BTreeSet::new(),
        })
    }

    /// Parsed face, borrowed from the shared bytes
    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0).ok()
    }

    /// Add characters to the used set
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.face()
            .and_then(|face| face.glyph_index(c).map(|id| id.0))
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyph_id(c).map(|id| id != 0).unwrap_or(false)
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        self.face().map(|face| face.units_per_em()).unwrap_or(1000)
    }

    /// Get font ascender
    pub fn ascender(&self) -> i16 {
        self.face().map(|face| face.ascender()).unwrap_or(800)
    }

    /// Get font descender
    pub fn descender(&self) -> i16 {
        self.face().map(|face| face.descender()).unwrap_or(-200)
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        let Some(face) = self.face() else {
            return 0;
        };

        text.chars()
            .filter_map(|c| face.glyph_index(c))
            .filter_map(|gid| face.glyph_hor_advance(gid))
            .map(|w| w as u32)
            .sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f64) -> f64 {
        let width = self.text_width(text) as f64;
        width / self.units_per_em() as f64 * font_size
    }

    /// Encode text as hex string for PDF Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let face = self.face();
        let mut result = String::new();
        for c in text.chars() {
            let gid = face
                .as_ref()
                .and_then(|face| face.glyph_index(c))
                .map(|id| id.0)
                .unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        format!("<{result}>")
    }

    /// Generate all PDF objects needed to embed this font
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let font_name = Object::Name(self.name.clone().into_bytes());

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(
            Dictionary::from_iter(vec![
                ("Type", Object::Name(b"CMap".to_vec())),
                ("Length", (tounicode_content.len() as i64).into()),
            ]),
            tounicode_content.into_bytes(),
        );

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.as_ref().clone(),
        );

        let units_per_em = self.units_per_em() as f64;
        let scale = |v: i16| ((v as f64) * 1000.0 / units_per_em).round() as i64;
        let ascender = scale(self.ascender());
        let descender = scale(self.descender());

        let font_bbox = vec![
            0.into(),
            descender.into(),
            1000.into(),
            ascender.into(),
        ];

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()), // Symbolic font
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascender.into()),
            ("Descent", descender.into()),
            ("CapHeight", ascender.into()),
            ("StemV", 80.into()),
            ("FontFile2", Object::Reference((0, 0))), // Set when embedding
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Reference((0, 0))), // Set when embedding
            ("W", self.generate_widths_array().into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type0".to_vec())),
            ("BaseFont", font_name),
            ("Encoding", Object::Name(b"Identity-H".to_vec())),
            ("DescendantFonts", vec![Object::Reference((0, 0))].into()), // Set when embedding
            ("ToUnicode", Object::Reference((0, 0))), // Set when embedding
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Generate /W array for glyph widths, in 1/1000 em
    fn generate_widths_array(&self) -> Vec<Object> {
        let mut widths = Vec::new();
        let Some(face) = self.face() else {
            return widths;
        };
        let units_per_em = face.units_per_em() as f64;

        let mut gids: Vec<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| face.glyph_index(c).map(|id| id.0))
            .collect();
        gids.sort();
        gids.dedup();

        // Individual mapping format: [gid1 [width1] gid2 [width2] ...]
        for gid in gids {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(gid))
                .map(|a| (a as f64 * 1000.0 / units_per_em).round() as i64)
                .unwrap_or(1000);
            widths.push((gid as i64).into());
            widths.push(vec![advance.into()].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");

        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let face = self.face();
        let chars: Vec<char> = self.used_chars.iter().copied().collect();

        // At most 100 entries per bfchar section
        for chunk in chars.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for c in chunk {
                let gid = face
                    .as_ref()
                    .and_then(|face| face.glyph_index(*c))
                    .map(|id| id.0)
                    .unwrap_or(0);
                let mut utf16 = [0u16; 2];
                let unicode: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{unicode}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

impl FontMetrics for FontData {
    fn width_of_text_at_size(&self, text: &str, size: f64) -> f64 {
        self.text_width_points(text, size)
    }

    fn height_at_size(&self, size: f64) -> f64 {
        let extent = self.ascender() as f64 - self.descender() as f64;
        extent / self.units_per_em() as f64 * size
    }

    fn size_at_height(&self, height: f64) -> f64 {
        let extent = self.ascender() as f64 - self.descender() as f64;
        height * self.units_per_em() as f64 / extent
    }
}
