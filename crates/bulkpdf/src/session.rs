//! Editing state for a template: the variable list and click-to-place

use crate::coords::{Bounds, Point, ViewportMapping};
use crate::{BulkError, Result, Variable, VariableUpdate};
use log::debug;
use uuid::Uuid;

/// The variables being edited against one template
///
/// Variables keep their creation order, which is also the order data
/// columns bind to them in a batch.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    variables: Vec<Variable>,
    placing: Option<String>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing variables, e.g. a loaded project
    pub fn with_variables(variables: Vec<Variable>) -> Self {
        Self {
            variables,
            placing: None,
        }
    }

    /// Create an unplaced variable with a fresh key; returns the key
    pub fn add(&mut self) -> String {
        let key = Uuid::new_v4().to_string();
        self.variables.push(Variable::new(key.clone()));
        key
    }

    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.key == key)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn into_variables(self) -> Vec<Variable> {
        self.variables
    }

    /// Apply a validated change to one variable
    pub fn update(&mut self, key: &str, update: VariableUpdate) -> Result<()> {
        let variable = self
            .variables
            .iter_mut()
            .find(|v| v.key == key)
            .ok_or_else(|| BulkError::UnknownVariable(key.to_string()))?;
        update.apply(variable)
    }

    /// Remove a variable, cancelling placement if it was being placed
    pub fn remove(&mut self, key: &str) -> Option<Variable> {
        let index = self.variables.iter().position(|v| v.key == key)?;
        if self.placing.as_deref() == Some(key) {
            self.placing = None;
        }
        Some(self.variables.remove(index))
    }

    /// Wait for a click to position `key`
    pub fn begin_placing(&mut self, key: &str) -> Result<()> {
        if self.get(key).is_none() {
            return Err(BulkError::UnknownVariable(key.to_string()));
        }
        self.placing = Some(key.to_string());
        Ok(())
    }

    /// Key of the variable waiting for a click, if any
    pub fn placing(&self) -> Option<&str> {
        self.placing.as_deref()
    }

    pub fn cancel_placing(&mut self) {
        self.placing = None;
    }

    /// Position the pending variable at a click in display pixels
    ///
    /// Returns `false`, keeping the placement pending, when nothing is being
    /// placed or the click lands outside the page.
    pub fn place_at(&mut self, mapping: &ViewportMapping, click: Point) -> Result<bool> {
        let Some(key) = self.placing.clone() else {
            return Ok(false);
        };

        let Some(point) = mapping.to_document(click, Bounds::Checked) else {
            debug!("Click at ({}, {}) is off the page", click.x, click.y);
            return Ok(false);
        };

        self.update(&key, VariableUpdate::Position { x: point.x, y: point.y })?;
        self.placing = None;
        Ok(true)
    }
}
