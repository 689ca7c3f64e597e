//! Labelled preview rendering, debounced and cancellable

use crate::renderer::{DocumentRenderer, RenderedDocument};
use crate::{BulkError, Result, TemplateDocument, TextSubstitution, Variable};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Quiet period after the last edit before a preview is rendered
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(250);

/// Cancellation flag owned by one render
///
/// Clones share the flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(BulkError::Cancelled)` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(BulkError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Placeholder text for the variable at 1-based `ordinal`
pub fn preview_label(ordinal: usize) -> String {
    format!("Variable {ordinal}")
}

/// Substitutions for a preview: every active variable labelled with its
/// declaration ordinal
pub fn preview_substitutions(variables: &[Variable]) -> Vec<TextSubstitution> {
    variables
        .iter()
        .enumerate()
        .filter(|(_, variable)| variable.is_active())
        .map(|(i, variable)| TextSubstitution::new(variable.clone(), preview_label(i + 1)))
        .collect()
}

/// Result of one scheduled preview
#[derive(Debug)]
pub struct PreviewUpdate {
    /// Increases with every call to [`PreviewScheduler::schedule`]
    pub generation: u64,
    pub result: Result<RenderedDocument>,
}

/// Re-renders the preview after edits settle
///
/// Each [`schedule`](PreviewScheduler::schedule) cancels the pending or
/// running render and starts a new one after the debounce delay. Only
/// renders that were not superseded reach the output channel.
///
/// Must be used from within a tokio runtime.
pub struct PreviewScheduler {
    renderer: Arc<DocumentRenderer>,
    delay: Duration,
    output: mpsc::UnboundedSender<PreviewUpdate>,
    pending: Option<CancelToken>,
    generation: u64,
}

impl PreviewScheduler {
    /// Scheduler with the default [`PREVIEW_DEBOUNCE`] delay
    pub fn new(renderer: Arc<DocumentRenderer>) -> (Self, mpsc::UnboundedReceiver<PreviewUpdate>) {
        Self::with_delay(renderer, PREVIEW_DEBOUNCE)
    }

    pub fn with_delay(
        renderer: Arc<DocumentRenderer>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<PreviewUpdate>) {
        let (output, receiver) = mpsc::unbounded_channel();
        let scheduler = Self {
            renderer,
            delay,
            output,
            pending: None,
            generation: 0,
        };
        (scheduler, receiver)
    }

    /// Schedule a preview of `variables` on `template`, superseding any
    /// earlier one; returns its generation
    pub fn schedule(&mut self, template: TemplateDocument, variables: &[Variable]) -> u64 {
        self.cancel();

        self.generation += 1;
        let generation = self.generation;
        let token = CancelToken::new();
        self.pending = Some(token.clone());

        let renderer = self.renderer.clone();
        let output = self.output.clone();
        let delay = self.delay;
        let substitutions = preview_substitutions(variables);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if token.is_cancelled() {
                debug!("Preview {generation} superseded before rendering");
                return;
            }

            let result = renderer
                .render_cancellable(&template, &substitutions, &token)
                .await;

            match result {
                Err(BulkError::Cancelled) => {
                    debug!("Preview {generation} cancelled while rendering");
                }
                _ if token.is_cancelled() => {
                    debug!("Discarding stale preview {generation}");
                }
                result => {
                    if let Err(e) = &result {
                        warn!("Preview {generation} failed: {e}");
                    }
                    // Receiver gone means nobody wants previews any more
                    let _ = output.send(PreviewUpdate { generation, result });
                }
            }
        });

        generation
    }

    /// Cancel the pending or running preview, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for PreviewScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn variable(key: &str, x: f64, y: f64) -> Variable {
        Variable {
            x,
            y,
            ..Variable::new(key)
        }
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(token.check().is_ok());

        shared.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(BulkError::Cancelled)));
    }

    #[test]
    fn test_preview_substitutions_label_by_ordinal() {
        let variables = vec![
            variable("a", 10.0, 10.0),
            variable("unplaced", 0.0, 0.0),
            variable("c", 30.0, 30.0),
        ];

        let subs = preview_substitutions(&variables);
        let labels: Vec<(&str, &str)> = subs
            .iter()
            .map(|s| (s.variable.key.as_str(), s.text.as_str()))
            .collect();

        assert_eq!(labels, vec![("a", "Variable 1"), ("c", "Variable 3")]);
    }

    #[test]
    fn test_preview_label() {
        assert_eq!(preview_label(12), "Variable 12");
    }
}
