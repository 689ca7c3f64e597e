//! Font metrics contract shared by standard and embedded fonts

/// Measurements a font must provide for text layout.
///
/// All values are in PDF points (1/72 inch).
pub trait FontMetrics {
    /// Advance width of `text` set at `size` points.
    fn width_of_text_at_size(&self, text: &str, size: f64) -> f64;

    /// Line height (ascent to descent) at `size` points.
    fn height_at_size(&self, size: f64) -> f64;

    /// The size at which the line height equals `height`.
    ///
    /// Inverse of [`FontMetrics::height_at_size`].
    fn size_at_height(&self, height: f64) -> f64;
}

impl<T: FontMetrics + ?Sized> FontMetrics for &T {
    fn width_of_text_at_size(&self, text: &str, size: f64) -> f64 {
        (**self).width_of_text_at_size(text, size)
    }

    fn height_at_size(&self, size: f64) -> f64 {
        (**self).height_at_size(size)
    }

    fn size_at_height(&self, height: f64) -> f64 {
        (**self).size_at_height(height)
    }
}
