//! Rendering text substitutions onto a template's first page

use crate::coords::Point;
use crate::fonts::{default_standard_font, FontCatalog, ResolvedFont};
use crate::layout::{check_bounds, layout_variable, SkipReason};
use crate::preview::CancelToken;
use crate::{DrawnVariable, Result, TemplateDocument, TextSubstitution};
use async_trait::async_trait;
use log::{debug, warn};
use pdf_core::{FontId, PdfDocument};
use std::collections::HashMap;
use std::sync::Arc;

/// Only the first page of a template is drawn on
const TARGET_PAGE: usize = 1;

/// What happened to one substitution during a render
#[derive(Debug, Clone, PartialEq)]
pub struct VariableOutcome {
    /// Key of the substitution's variable
    pub key: String,
    pub outcome: std::result::Result<DrawnVariable, SkipReason>,
}

/// A rendered document and the boxes its text occupies
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    /// One entry per substitution, in input order
    pub outcomes: Vec<VariableOutcome>,
}

impl RenderedDocument {
    /// Drawn boxes in input order, skipped variables omitted
    pub fn drawn(&self) -> Vec<(&str, DrawnVariable)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.outcome.as_ref().ok().map(|d| (o.key.as_str(), *d)))
            .collect()
    }

    /// Drawn boxes keyed by variable key
    pub fn drawn_map(&self) -> HashMap<String, DrawnVariable> {
        self.drawn()
            .into_iter()
            .map(|(key, drawn)| (key.to_string(), drawn))
            .collect()
    }

    /// Variables that were left out, with the reason
    pub fn skipped(&self) -> Vec<(&str, &SkipReason)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.outcome.as_ref().err().map(|r| (o.key.as_str(), r)))
            .collect()
    }
}

/// Renders substitutions onto a template
///
/// Batch generation and preview go through this trait so either can be
/// driven by any renderer.
#[async_trait]
pub trait DocumentRender: Send + Sync {
    async fn render(
        &self,
        template: &TemplateDocument,
        substitutions: &[TextSubstitution],
    ) -> Result<RenderedDocument>;
}

/// Draws substitutions with fonts from a shared [`FontCatalog`]
///
/// Embedded font handles are cached per call since they belong to one
/// loaded document; downloaded font bytes are cached by the catalog.
#[derive(Clone)]
pub struct DocumentRenderer {
    fonts: Arc<FontCatalog>,
}

impl DocumentRenderer {
    pub fn new(fonts: Arc<FontCatalog>) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &Arc<FontCatalog> {
        &self.fonts
    }

    /// Render, giving up with [`BulkError::Cancelled`](crate::BulkError::Cancelled)
    /// as soon as `cancel` is set
    ///
    /// The token is checked on entry and after every suspension point.
    pub async fn render_cancellable(
        &self,
        template: &TemplateDocument,
        substitutions: &[TextSubstitution],
        cancel: &CancelToken,
    ) -> Result<RenderedDocument> {
        cancel.check()?;

        let mut doc = PdfDocument::open_from_bytes(template.bytes())?;
        let page = doc.page_size(TARGET_PAGE)?;

        let mut embedded: HashMap<String, FontId> = HashMap::new();
        let mut outcomes = Vec::with_capacity(substitutions.len());

        for substitution in substitutions {
            let variable = &substitution.variable;

            // Skip before resolving so a misplaced variable never triggers a download
            if let Err(reason) = check_bounds(Point::new(variable.x, variable.y), page) {
                warn!("Skipping variable {}: {reason}", variable.key);
                outcomes.push(VariableOutcome {
                    key: variable.key.clone(),
                    outcome: Err(reason),
                });
                continue;
            }

            let font = match embedded.get(&variable.font) {
                Some(font) => *font,
                None => {
                    let resolved = self.fonts.resolve(&variable.font).await;
                    cancel.check()?;

                    let font = embed_font(&mut doc, resolved);
                    embedded.insert(variable.font.clone(), font);
                    font
                }
            };

            let layout = {
                let metrics = doc.font_metrics(font)?;
                layout_variable(metrics, variable, &substitution.text, page)
            };

            let outcome = match layout {
                Ok(layout) => {
                    doc.draw_text(
                        TARGET_PAGE,
                        font,
                        &substitution.text,
                        layout.draw_x,
                        layout.draw_y,
                        layout.size,
                        variable.color.into(),
                    )?;
                    Ok(layout.drawn)
                }
                Err(reason) => {
                    warn!("Skipping variable {}: {reason}", variable.key);
                    Err(reason)
                }
            };

            outcomes.push(VariableOutcome {
                key: variable.key.clone(),
                outcome,
            });
        }

        cancel.check()?;
        let bytes = doc.to_bytes()?;
        debug!(
            "Rendered {} of {} substitutions",
            outcomes.iter().filter(|o| o.outcome.is_ok()).count(),
            outcomes.len()
        );

        Ok(RenderedDocument { bytes, outcomes })
    }
}

#[async_trait]
impl DocumentRender for DocumentRenderer {
    async fn render(
        &self,
        template: &TemplateDocument,
        substitutions: &[TextSubstitution],
    ) -> Result<RenderedDocument> {
        self.render_cancellable(template, substitutions, &CancelToken::new())
            .await
    }
}

/// Register a resolved font with the document, falling back to the
/// default font when the bytes cannot be embedded
fn embed_font(doc: &mut PdfDocument, font: ResolvedFont) -> FontId {
    match font {
        ResolvedFont::Standard(standard) => doc.add_standard_font(standard),
        ResolvedFont::TrueType { name, data } => match doc.add_truetype_font(&name, data) {
            Ok(font) => font,
            Err(e) => {
                warn!("Cannot embed font '{name}': {e}; using default font");
                doc.add_standard_font(default_standard_font())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(key: &str, outcome: std::result::Result<DrawnVariable, SkipReason>) -> VariableOutcome {
        VariableOutcome {
            key: key.to_string(),
            outcome,
        }
    }

    #[test]
    fn test_drawn_skips_failures() {
        let drawn = DrawnVariable {
            x: 1.0,
            y: 2.0,
            w: 3.0,
            h: 4.0,
        };
        let rendered = RenderedDocument {
            bytes: Vec::new(),
            outcomes: vec![
                outcome("a", Ok(drawn)),
                outcome("b", Err(SkipReason::InvalidSize(0.0))),
                outcome("c", Ok(drawn)),
            ],
        };

        let keys: Vec<&str> = rendered.drawn().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(rendered.drawn_map().len(), 2);
        assert_eq!(rendered.skipped(), vec![("b", &SkipReason::InvalidSize(0.0))]);
    }

    #[tokio::test]
    async fn test_invalid_template_fails() {
        let renderer = DocumentRenderer::new(Arc::new(FontCatalog::builtin()));
        let template = TemplateDocument::new(None, b"definitely not a pdf".to_vec());

        let result = renderer.render(&template, &[]).await;
        assert!(matches!(result, Err(crate::BulkError::PdfError(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let renderer = DocumentRenderer::new(Arc::new(FontCatalog::builtin()));
        let template = TemplateDocument::new(None, b"irrelevant".to_vec());
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = renderer.render_cancellable(&template, &[], &cancel).await;
        assert!(matches!(result, Err(crate::BulkError::Cancelled)));
    }
}
