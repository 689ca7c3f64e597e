//! PDF Document wrapper

use crate::metrics::FontMetrics;
use crate::standard::StandardFont;
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{FontData, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A buffered text operation for deferred encoding
///
/// Text is buffered while drawing and encoded during save, once every
/// character that each embedded font has to cover is known.
#[derive(Debug, Clone)]
struct BufferedTextOp {
    text: String,
    font: FontId,
    /// Font resource name (e.g., "F1")
    font_resource_name: String,
    /// Page number (1-indexed)
    page: usize,
    /// X coordinate (PDF space, left edge of the text)
    x: f64,
    /// Y coordinate (PDF space, baseline)
    y: f64,
    font_size: f64,
    color: Color,
}

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Handle to a font registered with a [`PdfDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(usize);

/// Page dimensions in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// A font usable for drawing
#[derive(Debug, Clone)]
enum LoadedFont {
    Standard(StandardFont),
    Embedded(FontData),
}

impl LoadedFont {
    fn metrics(&self) -> &dyn FontMetrics {
        match self {
            LoadedFont::Standard(font) => font,
            LoadedFont::Embedded(font) => font,
        }
    }

    fn encode_text_hex(&self, text: &str) -> String {
        match self {
            LoadedFont::Standard(font) => font.encode_text_hex(text),
            LoadedFont::Embedded(font) => font.encode_text_hex(text),
        }
    }
}

/// PDF Document wrapper providing the drawing operations a template needs
///
/// Drawing is buffered; nothing in the underlying document changes until
/// [`PdfDocument::to_bytes`].
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Registered fonts, indexed by `FontId`
    fonts: Vec<LoadedFont>,
    /// Font objects written at save time (font index -> PDF object ID)
    embedded_fonts: HashMap<usize, ObjectId>,
    /// Page font resources (page number -> font index -> resource name)
    page_font_resources: HashMap<usize, HashMap<usize, String>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
    /// Buffered text operations (encoded during save)
    buffered_text_ops: Vec<BufferedTextOp>,
}

impl PdfDocument {
    /// Open a PDF document from bytes
    ///
    /// The input bytes are only read; every change happens on a parsed copy.
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        if inner.get_pages().is_empty() {
            return Err(PdfError::OpenError("document has no pages".to_string()));
        }

        Ok(Self {
            inner,
            fonts: Vec::new(),
            embedded_fonts: HashMap::new(),
            page_font_resources: HashMap::new(),
            next_font_resource: 1,
            page_content_buffer: HashMap::new(),
            buffered_text_ops: Vec::new(),
        })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Width and height of a page (1-indexed), from its MediaBox
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;
        extract_size_from_media_box(&media_box)
    }

    /// Register one of the standard fonts
    ///
    /// Registering the same standard font twice returns the same handle.
    pub fn add_standard_font(&mut self, font: StandardFont) -> FontId {
        let existing = self
            .fonts
            .iter()
            .position(|loaded| matches!(loaded, LoadedFont::Standard(f) if *f == font));

        match existing {
            Some(index) => FontId(index),
            None => {
                self.fonts.push(LoadedFont::Standard(font));
                FontId(self.fonts.len() - 1)
            }
        }
    }

    /// Register a TrueType font for embedding
    ///
    /// # Arguments
    /// * `name` - PDF BaseFont name for the embedded font
    /// * `ttf_data` - TrueType font file bytes
    pub fn add_truetype_font(&mut self, name: &str, ttf_data: Arc<Vec<u8>>) -> Result<FontId> {
        let font_data = FontData::from_ttf(&pdf_font_name(name), ttf_data)?;
        self.fonts.push(LoadedFont::Embedded(font_data));
        Ok(FontId(self.fonts.len() - 1))
    }

    /// Metrics of a registered font
    pub fn font_metrics(&self, font: FontId) -> Result<&dyn FontMetrics> {
        Ok(self.loaded_font(font)?.metrics())
    }

    /// Draw a single line of text
    ///
    /// `x` is the left edge of the text and `y` its baseline, both in PDF
    /// space (origin bottom-left).
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        page: usize,
        font: FontId,
        text: &str,
        x: f64,
        y: f64,
        size: f64,
        color: Color,
    ) -> Result<()> {
        self.page_id(page)?;
        self.loaded_font(font)?;

        if let Some(LoadedFont::Embedded(font_data)) = self.fonts.get_mut(font.0) {
            font_data.add_chars(text);
        }

        let font_resource_name = self.get_or_create_font_ref(font, page)?;

        self.buffered_text_ops.push(BufferedTextOp {
            text: text.to_string(),
            font,
            font_resource_name,
            page,
            x,
            y,
            font_size: size,
            color,
        });

        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        // 1. Encode buffered text now that every used character is known
        self.encode_buffered_text()?;

        // 2. Flush buffered content streams to pages
        self.flush_content_buffers()?;

        // 3. Write font objects and hook them into page resources
        self.embed_fonts()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    fn loaded_font(&self, font: FontId) -> Result<&LoadedFont> {
        self.fonts
            .get(font.0)
            .ok_or_else(|| PdfError::FontNotFound(format!("font #{}", font.0)))
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Encode buffered text operations and add them to the content buffers
    fn encode_buffered_text(&mut self) -> Result<()> {
        let text_ops: Vec<BufferedTextOp> = std::mem::take(&mut self.buffered_text_ops);

        for op in text_ops {
            let text_hex = self.loaded_font(op.font)?.encode_text_hex(&op.text);

            let ctx = TextRenderContext {
                font_name: op.font_resource_name,
                font_size: op.font_size,
                color: op.color,
            };

            // Position is already the left edge
            let operators = generate_text_operators(&text_hex, op.x, op.y, &ctx);
            self.buffer_content(op.page, &operators);
        }

        Ok(())
    }

    /// Write every font referenced from a page into the PDF
    fn embed_fonts(&mut self) -> Result<()> {
        self.embedded_fonts.clear();

        let used: BTreeSet<usize> = self
            .page_font_resources
            .values()
            .flat_map(|fonts| fonts.keys().copied())
            .collect();

        for index in used {
            self.embed_font_object(index)?;
        }

        self.finalize_page_font_resources()
    }

    /// Embed a single font object into the PDF
    fn embed_font_object(&mut self, index: usize) -> Result<ObjectId> {
        let font = self.loaded_font(FontId(index))?.clone();

        let font_id = match font {
            LoadedFont::Standard(standard) => self.inner.add_object(standard.to_pdf_dictionary()),
            LoadedFont::Embedded(font_data) => {
                let font_objects = font_data.to_pdf_objects()?;

                let font_file_id = self.inner.add_object(font_objects.font_file_stream);

                let mut font_descriptor = font_objects.font_descriptor;
                font_descriptor.set("FontFile2", Object::Reference(font_file_id));
                let font_descriptor_id = self.inner.add_object(font_descriptor);

                let mut cid_font = font_objects.cid_font;
                cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
                let cid_font_id = self.inner.add_object(cid_font);

                let tounicode_id = self.inner.add_object(font_objects.tounicode_stream);

                let mut type0_font = font_objects.type0_font;
                type0_font.set(
                    "DescendantFonts",
                    Object::Array(vec![Object::Reference(cid_font_id)]),
                );
                type0_font.set("ToUnicode", Object::Reference(tounicode_id));

                self.inner.add_object(type0_font)
            }
        };

        self.embedded_fonts.insert(index, font_id);
        Ok(font_id)
    }

    /// Get or create a font resource name for a specific page
    ///
    /// Names already used by the page's own resources are skipped so that
    /// the template's fonts stay reachable from its content stream.
    fn get_or_create_font_ref(&mut self, font: FontId, page: usize) -> Result<String> {
        if let Some(name) = self
            .page_font_resources
            .get(&page)
            .and_then(|fonts| fonts.get(&font.0))
        {
            return Ok(name.clone());
        }

        let page_id = self.page_id(page)?;
        let taken = self
            .resolve_dict(self.get_inherited_resources(page_id)?.get(b"Font").ok())
            .unwrap_or_else(Dictionary::new);

        let resource_name = loop {
            let candidate = format!("F{}", self.next_font_resource);
            self.next_font_resource += 1;
            if !taken.has(candidate.as_bytes()) {
                break candidate;
            }
        };

        self.page_font_resources
            .entry(page)
            .or_default()
            .insert(font.0, resource_name.clone());

        Ok(resource_name)
    }

    /// Add font references to page resources after all fonts are embedded
    fn finalize_page_font_resources(&mut self) -> Result<()> {
        let page_resources: Vec<(usize, Vec<(usize, String)>)> = self
            .page_font_resources
            .iter()
            .map(|(&page, fonts)| {
                let font_list: Vec<_> = fonts
                    .iter()
                    .map(|(&index, resource_name)| (index, resource_name.clone()))
                    .collect();
                (page, font_list)
            })
            .collect();

        for (page, fonts) in page_resources {
            if !fonts.is_empty() {
                self.add_fonts_to_page_resources(page, &fonts)?;
            }
        }

        Ok(())
    }

    /// Add multiple fonts to a page's Resources dictionary in a single operation
    ///
    /// The page gets its own Resources dictionary, seeded from whatever it
    /// inherited or referenced, so shared resource objects are never mutated.
    fn add_fonts_to_page_resources(&mut self, page: usize, fonts: &[(usize, String)]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::SaveError("Page object is not a dictionary".to_string()))?
            .clone();

        let mut resources_dict = self.get_inherited_resources(page_id)?;
        let mut font_dict = self
            .resolve_dict(resources_dict.get(b"Font").ok())
            .unwrap_or_else(Dictionary::new);

        for (index, resource_name) in fonts {
            let font_ref = self
                .embedded_fonts
                .get(index)
                .ok_or_else(|| PdfError::FontNotFound(resource_name.clone()))?;
            font_dict.set(resource_name.as_bytes(), Object::Reference(*font_ref));
        }

        resources_dict.set("Font", Object::Dictionary(font_dict));

        let mut new_page_dict = page_dict;
        new_page_dict.set("Resources", Object::Dictionary(resources_dict));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Inline copy of a dictionary that may be stored by reference
    fn resolve_dict(&self, object: Option<&Object>) -> Option<Dictionary> {
        match object? {
            Object::Dictionary(dict) => Some(dict.clone()),
            Object::Reference(id) => self
                .inner
                .get_object(*id)
                .ok()
                .and_then(|obj| obj.as_dict().ok())
                .cloned(),
            _ => None,
        }
    }

    /// Get the page's Resources, following the parent inheritance chain
    fn get_inherited_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Some(resources) = self.resolve_dict(dict.get(b"Resources").ok()) {
                return Ok(resources);
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(Dictionary::new())
    }

    /// Get MediaBox, following parent inheritance chain if needed
    fn get_inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let obj = self.inner.get_object(current_id)?;
            let dict = obj
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
                let media_box_array = match media_box {
                    Object::Array(arr) => arr.clone(),
                    Object::Reference(ref_id) => self
                        .inner
                        .get_object(*ref_id)?
                        .as_array()
                        .map_err(|_| {
                            PdfError::ParseError("MediaBox reference is not an array".to_string())
                        })?
                        .clone(),
                    _ => return Err(PdfError::ParseError("MediaBox is not an array".to_string())),
                };
                return Ok(media_box_array);
            }

            if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
                current_id = *parent_id;
                continue;
            }

            break;
        }

        // Fallback: assume A4 page size
        Ok(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.28),
            Object::Real(841.89),
        ])
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// The existing content is wrapped in `q`/`Q` so graphics state it leaves
    /// behind (transforms, colors) does not leak into the appended text.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let (existing_content, page_dict) = {
            let page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

            let existing_content = match page_dict.get(b"Contents") {
                Ok(Object::Array(arr)) => {
                    let mut combined = Vec::new();
                    for obj in arr {
                        combined.extend_from_slice(&self.stream_content(obj)?);
                        combined.push(b'\n');
                    }
                    combined
                }
                Ok(contents) => self.stream_content(contents)?,
                Err(_) => Vec::new(),
            };

            (existing_content, page_dict.clone())
        };

        let mut new_content = Vec::with_capacity(existing_content.len() + content.len() + 8);
        new_content.extend_from_slice(b"q\n");
        new_content.extend_from_slice(&existing_content);
        new_content.extend_from_slice(b"\nQ\n");
        new_content.extend_from_slice(content);

        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), new_content));

        let mut new_page_dict = page_dict;
        new_page_dict.set("Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Decompressed bytes of a content stream given inline or by reference
    ///
    /// A filtered stream that cannot be decoded is an error; re-wrapping its
    /// encoded bytes would corrupt the page.
    fn stream_content(&self, object: &Object) -> Result<Vec<u8>> {
        let stream = match object {
            Object::Stream(stream) => stream,
            Object::Reference(ref_id) => match self.inner.get_object(*ref_id) {
                Ok(Object::Stream(stream)) => stream,
                _ => return Ok(Vec::new()),
            },
            _ => return Ok(Vec::new()),
        };

        if !stream.dict.has(b"Filter") {
            return Ok(stream.content.clone());
        }

        stream.decompressed_content().map_err(|e| {
            PdfError::ParseError(format!("cannot decode page content stream: {e}"))
        })
    }
}

/// Extract width and height from a MediaBox array
fn extract_size_from_media_box(media_box: &[Object]) -> Result<PageSize> {
    if media_box.len() < 4 {
        return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
    }

    let coord = |i: usize| -> Result<f64> {
        media_box[i]
            .as_f32()
            .map(|v| v as f64)
            .ok()
            .or_else(|| media_box[i].as_i64().ok().map(|v| v as f64))
            .ok_or_else(|| PdfError::ParseError(format!("Invalid MediaBox entry {i}")))
    };

    Ok(PageSize {
        width: (coord(2)? - coord(0)?).abs(),
        height: (coord(3)? - coord(1)?).abs(),
    })
}

/// PDF names cannot hold whitespace or delimiters
fn pdf_font_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
        .collect();

    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_invalid_bytes() {
        let result = PdfDocument::open_from_bytes(b"not a pdf");
        assert!(matches!(result, Err(PdfError::OpenError(_))));
    }

    #[test]
    fn test_extract_size_from_media_box() {
        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(612.0),
            Object::Integer(792),
        ];
        let size = extract_size_from_media_box(&media_box).unwrap();
        assert_eq!(size, PageSize { width: 612.0, height: 792.0 });

        let offset = vec![
            Object::Integer(10),
            Object::Integer(20),
            Object::Integer(110),
            Object::Integer(220),
        ];
        let size = extract_size_from_media_box(&offset).unwrap();
        assert_eq!(size, PageSize { width: 100.0, height: 200.0 });

        assert!(extract_size_from_media_box(&[Object::Integer(0)]).is_err());
    }

    #[test]
    fn test_pdf_font_name() {
        assert_eq!(pdf_font_name("Open Sans"), "OpenSans");
        assert_eq!(pdf_font_name("Roboto-Bold"), "Roboto-Bold");
        assert_eq!(pdf_font_name("()"), "EmbeddedFont");
    }

    #[test]
    fn test_color_from_rgb() {
        assert_eq!(Color::from_rgb(255, 0, 0), Color::red());
        assert_eq!(Color::default(), Color::black());
    }
}
