//! Text rendering utilities

use crate::document::Color;
use crate::Align;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// X offset that moves an anchor to the left edge of aligned text
///
/// The anchor is the left edge, the midpoint or the right edge of the
/// text depending on `align`.
pub fn align_offset(text_width: f64, align: Align) -> f64 {
    match align {
        Align::Left => 0.0,
        Align::Center => -text_width / 2.0,
        Align::Right => -text_width,
    }
}

/// Generate PDF operators for text insertion
///
/// Creates the proper PDF text operators (BT, rg, Tf, Td, Tj, ET) to render
/// text with its baseline starting at a specific position.
///
/// # Arguments
/// * `text_hex` - Hex-encoded text (e.g., "<0041004200>")
/// * `x` - Left edge in points (PDF coordinates, from left)
/// * `y` - Baseline in points (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(
    text_hex: &str,
    x: f64,
    y: f64,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("BT\n");

    // Non-stroking fill color
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));

    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{x} {y} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(font_name: &str, font_size: f64) -> TextRenderContext {
        TextRenderContext {
            font_name: font_name.to_string(),
            font_size,
            color: Color::black(),
        }
    }

    #[test]
    fn test_align_offset() {
        assert_eq!(align_offset(40.0, Align::Left), 0.0);
        assert_eq!(align_offset(40.0, Align::Center), -20.0);
        assert_eq!(align_offset(40.0, Align::Right), -40.0);
    }

    #[test]
    fn test_generate_text_operators() {
        let ctx = context("F1", 12.0);

        let ops = generate_text_operators("<48656C6C6F>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("BT\n"));
        assert!(ops_str.contains("/F1 12 Tf"));
        assert!(ops_str.contains("100 700 Td"));
        assert!(ops_str.contains("<48656C6C6F> Tj"));
        assert!(ops_str.ends_with("ET\n"));
    }

    #[test]
    fn test_generate_text_operators_empty_text() {
        let ctx = context("F1", 12.0);

        let ops = generate_text_operators("<>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("100 700 Td"));
        assert!(ops_str.contains("<> Tj"));
    }

    #[test]
    fn test_generate_text_operators_fractional_size() {
        let ctx = context("F1", 23.4);

        let ops = generate_text_operators("<41>", 10.5, 20.25, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("/F1 23.4 Tf"));
        assert!(ops_str.contains("10.5 20.25 Td"));
    }

    #[test]
    fn test_generate_text_operators_with_color() {
        let ctx = TextRenderContext {
            color: Color::red(),
            ..context("F1", 12.0)
        };

        let ops = generate_text_operators("<41>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("1 0 0 rg"));
    }
}
