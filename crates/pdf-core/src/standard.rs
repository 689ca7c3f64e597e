//! The 14 standard PDF fonts
//!
//! These fonts are available in every conforming reader and are never
//! embedded. Widths are Adobe AFM advances (1/1000 em) for every glyph
//! WinAnsiEncoding reaches; vertical metrics use the AFM Ascender/Descender pair,
//! falling back to the FontBBox for the symbolic faces.

use crate::metrics::FontMetrics;
use lopdf::{Dictionary, Object};

/// One of the 14 standard Type1 fonts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Courier,
    CourierBold,
    CourierBoldOblique,
    CourierOblique,
    Helvetica,
    HelveticaBold,
    HelveticaBoldOblique,
    HelveticaOblique,
    Symbol,
    TimesRoman,
    TimesRomanBold,
    TimesRomanBoldItalic,
    TimesRomanItalic,
    ZapfDingbats,
}

/// Courier is monospaced.
const COURIER_WIDTH: u16 = 600;

/// Printable ASCII starts at the space character.
const FIRST_CHAR: u32 = 32;

const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

const TIMES_BOLD_ITALIC: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500,
    333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500,
    556, 556, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];

/// Bytes 0x80 to 0xFF; zero where WinAnsi leaves the code undefined.
const HELVETICA_HIGH: [u16; 128] = [
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

const HELVETICA_BOLD_HIGH: [u16; 128] = [
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

const TIMES_ROMAN_HIGH: [u16; 128] = [
    500, 0, 333, 500, 444, 1000, 500, 500, 333, 1000, 556, 333, 889, 0, 611, 0,
    0, 333, 333, 444, 444, 350, 500, 1000, 333, 980, 389, 333, 722, 0, 444, 722,
    250, 333, 500, 500, 500, 500, 200, 500, 333, 760, 276, 500, 564, 333, 760, 333,
    400, 564, 300, 300, 333, 500, 453, 250, 333, 300, 310, 500, 750, 750, 750, 444,
    722, 722, 722, 722, 722, 722, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333,
    722, 722, 722, 722, 722, 722, 722, 564, 722, 722, 722, 722, 722, 722, 556, 500,
    444, 444, 444, 444, 444, 444, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    500, 500, 500, 500, 500, 500, 500, 564, 500, 500, 500, 500, 500, 500, 500, 500,
];

const TIMES_BOLD_HIGH: [u16; 128] = [
    500, 0, 333, 500, 500, 1000, 500, 500, 333, 1000, 556, 333, 1000, 0, 667, 0,
    0, 333, 333, 500, 500, 350, 500, 1000, 333, 1000, 389, 333, 722, 0, 444, 722,
    250, 333, 500, 500, 500, 500, 220, 500, 333, 747, 300, 500, 570, 333, 747, 333,
    400, 570, 300, 300, 333, 556, 540, 250, 333, 300, 330, 500, 750, 750, 750, 500,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 389, 389, 389, 389,
    722, 722, 778, 778, 778, 778, 778, 570, 778, 722, 722, 722, 722, 722, 611, 556,
    500, 500, 500, 500, 500, 500, 722, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    500, 556, 500, 500, 500, 500, 500, 570, 500, 556, 556, 556, 556, 500, 556, 500,
];

const TIMES_ITALIC_HIGH: [u16; 128] = [
    500, 0, 333, 500, 556, 889, 500, 500, 333, 1000, 500, 333, 944, 0, 556, 0,
    0, 333, 333, 556, 556, 350, 500, 889, 333, 980, 389, 333, 667, 0, 389, 556,
    250, 389, 500, 500, 500, 500, 275, 500, 333, 760, 276, 500, 675, 333, 760, 333,
    400, 675, 300, 300, 333, 500, 523, 250, 333, 300, 310, 500, 750, 750, 750, 500,
    611, 611, 611, 611, 611, 611, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333,
    722, 667, 722, 722, 722, 722, 722, 675, 722, 722, 722, 722, 722, 556, 611, 500,
    500, 500, 500, 500, 500, 500, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    500, 500, 500, 500, 500, 500, 500, 675, 500, 500, 500, 500, 500, 444, 500, 444,
];

const TIMES_BOLD_ITALIC_HIGH: [u16; 128] = [
    500, 0, 333, 500, 500, 1000, 500, 500, 333, 1000, 556, 333, 944, 0, 611, 0,
    0, 333, 333, 500, 500, 350, 500, 1000, 333, 1000, 389, 333, 722, 0, 389, 611,
    250, 389, 500, 500, 500, 500, 220, 500, 333, 747, 266, 500, 606, 333, 747, 333,
    400, 570, 300, 300, 333, 576, 500, 250, 333, 300, 300, 500, 750, 750, 750, 500,
    667, 667, 667, 667, 667, 667, 944, 667, 667, 667, 667, 667, 389, 389, 389, 389,
    722, 722, 722, 722, 722, 722, 722, 570, 722, 722, 722, 722, 722, 611, 611, 500,
    500, 500, 500, 500, 500, 500, 722, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    500, 556, 500, 500, 500, 500, 500, 570, 500, 556, 556, 556, 556, 444, 500, 444,
];

impl StandardFont {
    /// Every standard font, in catalog order
    pub const ALL: [StandardFont; 14] = [
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierBoldOblique,
        StandardFont::CourierOblique,
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaBoldOblique,
        StandardFont::HelveticaOblique,
        StandardFont::Symbol,
        StandardFont::TimesRoman,
        StandardFont::TimesRomanBold,
        StandardFont::TimesRomanBoldItalic,
        StandardFont::TimesRomanItalic,
        StandardFont::ZapfDingbats,
    ];

    /// Catalog name (e.g. "HelveticaBold")
    pub fn name(&self) -> &'static str {
        match self {
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "CourierBold",
            StandardFont::CourierBoldOblique => "CourierBoldOblique",
            StandardFont::CourierOblique => "CourierOblique",
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "HelveticaBold",
            StandardFont::HelveticaBoldOblique => "HelveticaBoldOblique",
            StandardFont::HelveticaOblique => "HelveticaOblique",
            StandardFont::Symbol => "Symbol",
            StandardFont::TimesRoman => "TimesRoman",
            StandardFont::TimesRomanBold => "TimesRomanBold",
            StandardFont::TimesRomanBoldItalic => "TimesRomanBoldItalic",
            StandardFont::TimesRomanItalic => "TimesRomanItalic",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// PDF BaseFont name (e.g. "Helvetica-Bold")
    pub fn base_name(&self) -> &'static str {
        match self {
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::Symbol => "Symbol",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesRomanBold => "Times-Bold",
            StandardFont::TimesRomanBoldItalic => "Times-BoldItalic",
            StandardFont::TimesRomanItalic => "Times-Italic",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Look up a standard font by catalog name or PDF base name
    pub fn from_name(name: &str) -> Option<StandardFont> {
        Self::ALL
            .into_iter()
            .find(|font| font.name() == name || font.base_name() == name)
    }

    /// Whether the font uses a built-in symbolic encoding instead of WinAnsi
    pub fn is_symbolic(&self) -> bool {
        matches!(self, StandardFont::Symbol | StandardFont::ZapfDingbats)
    }

    /// (ascender, descender) in 1/1000 em
    fn vertical_metrics(&self) -> (i16, i16) {
        match self {
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierBoldOblique
            | StandardFont::CourierOblique => (629, -157),
            StandardFont::Helvetica
            | StandardFont::HelveticaBold
            | StandardFont::HelveticaBoldOblique
            | StandardFont::HelveticaOblique => (718, -207),
            StandardFont::TimesRoman
            | StandardFont::TimesRomanBold
            | StandardFont::TimesRomanBoldItalic
            | StandardFont::TimesRomanItalic => (683, -217),
            // No Ascender/Descender in the AFM, FontBBox y-range instead
            StandardFont::Symbol => (1010, -293),
            StandardFont::ZapfDingbats => (820, -143),
        }
    }

    /// (ASCII, 0x80-0xFF) width tables
    fn width_tables(&self) -> Option<(&'static [u16; 95], &'static [u16; 128])> {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => {
                Some((&HELVETICA, &HELVETICA_HIGH))
            }
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => {
                Some((&HELVETICA_BOLD, &HELVETICA_BOLD_HIGH))
            }
            StandardFont::TimesRoman => Some((&TIMES_ROMAN, &TIMES_ROMAN_HIGH)),
            StandardFont::TimesRomanBold => Some((&TIMES_BOLD, &TIMES_BOLD_HIGH)),
            StandardFont::TimesRomanItalic => Some((&TIMES_ITALIC, &TIMES_ITALIC_HIGH)),
            StandardFont::TimesRomanBoldItalic => {
                Some((&TIMES_BOLD_ITALIC, &TIMES_BOLD_ITALIC_HIGH))
            }
            _ => None,
        }
    }

    /// Advance width of a character in 1/1000 em
    ///
    /// Characters are measured by the WinAnsi byte they encode to, so
    /// anything outside the encoding is measured as the `?` it becomes.
    pub fn char_width(&self, c: char) -> u16 {
        let (ascii, high) = match self.width_tables() {
            Some(tables) => tables,
            None if self.is_symbolic() => return DEFAULT_SYMBOLIC_WIDTH,
            None => return COURIER_WIDTH,
        };

        let byte = win_ansi_byte(c).unwrap_or(b'?') as u32;
        if byte >= 0x80 {
            high[(byte - 0x80) as usize]
        } else {
            ascii[(byte - FIRST_CHAR) as usize]
        }
    }

    /// Encode text as a hex string for the Tj operator
    ///
    /// Standard fonts use single-byte WinAnsiEncoding; characters it
    /// cannot represent become `?`.
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 2 + 2);
        result.push('<');
        for c in text.chars() {
            let byte = win_ansi_byte(c).unwrap_or(b'?');
            result.push_str(&format!("{byte:02X}"));
        }
        result.push('>');
        result
    }

    /// Font dictionary for the page Resources
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(self.base_name().as_bytes().to_vec())),
        ]);
        if !self.is_symbolic() {
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        }
        dict
    }
}

/// Symbol and ZapfDingbats glyphs are not mapped; use a typical advance.
const DEFAULT_SYMBOLIC_WIDTH: u16 = 500;

impl FontMetrics for StandardFont {
    fn width_of_text_at_size(&self, text: &str, size: f64) -> f64 {
        let total: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        total as f64 * size / 1000.0
    }

    fn height_at_size(&self, size: f64) -> f64 {
        let (ascender, descender) = self.vertical_metrics();
        (ascender as f64 - descender as f64) / 1000.0 * size
    }

    fn size_at_height(&self, height: f64) -> f64 {
        let (ascender, descender) = self.vertical_metrics();
        height * 1000.0 / (ascender as f64 - descender as f64)
    }
}

/// Map a character to its WinAnsiEncoding byte
fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8A),
            '‹' => Some(0x8B),
            'Œ' => Some(0x8C),
            'Ž' => Some(0x8E),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9A),
            '›' => Some(0x9B),
            'œ' => Some(0x9C),
            'ž' => Some(0x9E),
            'Ÿ' => Some(0x9F),
            _ => None,
        },
    }
}
