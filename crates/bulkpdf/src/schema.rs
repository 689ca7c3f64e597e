//! Variable, project and render data types

use crate::{BulkError, Result};
use pdf_core::Align;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Font used when a variable names none, or names one that cannot be used
pub const DEFAULT_FONT: &str = "Helvetica";

/// Point size of a freshly created variable
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Output file name pattern when none is given
pub const DEFAULT_FILENAME_PATTERN: &str = "{variable-1}.pdf";

/// RGB Color for text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    /// Red component (0.0 - 1.0)
    pub r: f64,
    /// Green component (0.0 - 1.0)
    pub g: f64,
    /// Blue component (0.0 - 1.0)
    pub b: f64,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for pdf_core::Color {
    fn from(color: Color) -> Self {
        pdf_core::Color::rgb(color.r as f32, color.g as f32, color.b as f32)
    }
}

/// Horizontal alignment of text relative to its anchor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl From<Alignment> for Align {
    fn from(alignment: Alignment) -> Self {
        match alignment {
            Alignment::Left => Align::Left,
            Alignment::Center => Align::Center,
            Alignment::Right => Align::Right,
        }
    }
}

fn default_font() -> String {
    DEFAULT_FONT.to_string()
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

/// A named, positioned text placeholder on the template's first page
///
/// `x`/`y` is the anchor in PDF space; `0` on either axis means the
/// variable has not been placed yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Stable identity across edits
    pub key: String,

    #[serde(default)]
    pub x: f64,

    #[serde(default)]
    pub y: f64,

    /// Box width, set by the first boxed placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,

    /// Box height, set by the first boxed placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,

    #[serde(default = "default_font")]
    pub font: String,

    /// Point size; ignored while `contain` applies
    #[serde(default = "default_font_size")]
    pub size: f64,

    /// Fit the text into the box instead of using `size`
    #[serde(default)]
    pub contain: bool,

    #[serde(default)]
    pub alignment: Alignment,

    #[serde(default)]
    pub color: Color,
}

impl Variable {
    /// A new, unplaced variable with default styling
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            x: 0.0,
            y: 0.0,
            w: None,
            h: None,
            font: default_font(),
            size: DEFAULT_FONT_SIZE,
            contain: false,
            alignment: Alignment::default(),
            color: Color::default(),
        }
    }

    /// The `(w, h)` box text must fit into, when fit-to-box applies
    pub fn fit_box(&self) -> Option<(f64, f64)> {
        if !self.contain {
            return None;
        }
        match (self.w, self.h) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some((w, h)),
            _ => None,
        }
    }

    /// Whether the variable takes part in rendering
    pub fn is_active(&self) -> bool {
        let placed = self.x != 0.0 && self.y != 0.0 && self.x.is_finite() && self.y.is_finite();
        let sized = self.fit_box().is_some() || (self.size > 0.0 && self.size.is_finite());
        placed && sized
    }
}

/// A typed, validated change to one field of a [`Variable`]
#[derive(Debug, Clone, PartialEq)]
pub enum VariableUpdate {
    /// Move the anchor
    Position { x: f64, y: f64 },
    /// Move the anchor and set the box, as a drag or resize does
    Placement { x: f64, y: f64, w: f64, h: f64 },
    /// Set or clear the box
    Box { w: Option<f64>, h: Option<f64> },
    Font(String),
    Size(f64),
    Contain(bool),
    Alignment(Alignment),
    Color(Color),
}

impl VariableUpdate {
    /// Apply the update, leaving the variable untouched if it is invalid
    pub fn apply(&self, variable: &mut Variable) -> Result<()> {
        match self {
            VariableUpdate::Position { x, y } => {
                check_finite("x", *x)?;
                check_finite("y", *y)?;
                variable.x = *x;
                variable.y = *y;
            }
            VariableUpdate::Placement { x, y, w, h } => {
                check_finite("x", *x)?;
                check_finite("y", *y)?;
                check_positive("w", *w)?;
                check_positive("h", *h)?;
                variable.x = *x;
                variable.y = *y;
                variable.w = Some(*w);
                variable.h = Some(*h);
            }
            VariableUpdate::Box { w, h } => {
                if let Some(w) = w {
                    check_positive("w", *w)?;
                }
                if let Some(h) = h {
                    check_positive("h", *h)?;
                }
                variable.w = *w;
                variable.h = *h;
            }
            VariableUpdate::Font(font) => {
                if font.trim().is_empty() {
                    return Err(BulkError::InvalidField {
                        field: "font",
                        reason: "must not be empty".to_string(),
                    });
                }
                variable.font = font.clone();
            }
            VariableUpdate::Size(size) => {
                check_positive("size", *size)?;
                variable.size = *size;
            }
            VariableUpdate::Contain(contain) => variable.contain = *contain,
            VariableUpdate::Alignment(alignment) => variable.alignment = *alignment,
            VariableUpdate::Color(color) => {
                if !color.is_valid() {
                    return Err(BulkError::InvalidField {
                        field: "color",
                        reason: format!("channels must be within 0..=1, got {color:?}"),
                    });
                }
                variable.color = *color;
            }
        }
        Ok(())
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BulkError::InvalidField {
            field,
            reason: format!("{value} is not a finite number"),
        })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(BulkError::InvalidField {
            field,
            reason: format!("must be positive, got {value}"),
        })
    }
}

/// The PDF-space box rendered text actually occupies
///
/// `y` is the baseline; the box extends `h` upwards from it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DrawnVariable {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// A variable together with the text to draw for it
#[derive(Debug, Clone, PartialEq)]
pub struct TextSubstitution {
    pub variable: Variable,
    pub text: String,
}

impl TextSubstitution {
    pub fn new(variable: Variable, text: impl Into<String>) -> Self {
        Self {
            variable,
            text: text.into(),
        }
    }
}

/// The uploaded template, never modified once loaded
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    name: Option<String>,
    bytes: Arc<[u8]>,
}

impl TemplateDocument {
    pub fn new(name: Option<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name,
            bytes: bytes.into(),
        }
    }

    /// Read a template from disk, named after its file name
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(Self::new(name, bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Original file name, if known
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// File name without its extension
    pub fn stem(&self) -> Option<&str> {
        let name = self.name.as_deref()?;
        let stem = match name.rfind('.') {
            Some(0) | None => name,
            Some(dot) => &name[..dot],
        };
        Some(stem)
    }
}

fn default_filename_pattern() -> String {
    DEFAULT_FILENAME_PATTERN.to_string()
}

/// Project file: a template, its variables and output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Template PDF, relative to the project file
    pub template: PathBuf,

    /// Output file name pattern
    #[serde(default = "default_filename_pattern")]
    pub filename: String,

    /// Font catalog file (name -> URL), relative to the project file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<PathBuf>,

    #[serde(default)]
    pub variables: Vec<Variable>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn placed(x: f64, y: f64) -> Variable {
        Variable {
            x,
            y,
            ..Variable::new("v")
        }
    }

    #[test]
    fn test_new_variable_defaults() {
        let v = Variable::new("k1");
        assert_eq!(v.font, "Helvetica");
        assert_eq!(v.size, 24.0);
        assert_eq!(v.alignment, Alignment::Left);
        assert_eq!(v.color, Color::black());
        assert!(!v.is_active());
    }

    #[test]
    fn test_is_active() {
        assert!(placed(10.0, 20.0).is_active());
        assert!(!placed(0.0, 20.0).is_active());
        assert!(!placed(10.0, 0.0).is_active());

        let mut no_size = placed(10.0, 20.0);
        no_size.size = 0.0;
        assert!(!no_size.is_active());

        // A fit box stands in for the size
        no_size.contain = true;
        no_size.w = Some(100.0);
        no_size.h = Some(20.0);
        assert!(no_size.is_active());
    }

    #[test]
    fn test_fit_box_requires_both_dimensions() {
        let mut v = placed(10.0, 10.0);
        v.contain = true;
        v.w = Some(100.0);
        assert_eq!(v.fit_box(), None);

        v.h = Some(0.0);
        assert_eq!(v.fit_box(), None);

        v.h = Some(12.0);
        assert_eq!(v.fit_box(), Some((100.0, 12.0)));

        v.contain = false;
        assert_eq!(v.fit_box(), None);
    }

    #[test]
    fn test_variable_update_apply() {
        let mut v = Variable::new("k");
        VariableUpdate::Position { x: 50.0, y: 60.0 }.apply(&mut v).unwrap();
        VariableUpdate::Font("TimesRoman".to_string())
            .apply(&mut v)
            .unwrap();
        VariableUpdate::Alignment(Alignment::Center)
            .apply(&mut v)
            .unwrap();
        VariableUpdate::Placement {
            x: 70.0,
            y: 80.0,
            w: 90.0,
            h: 10.0,
        }
        .apply(&mut v)
        .unwrap();

        assert_eq!((v.x, v.y, v.w, v.h), (70.0, 80.0, Some(90.0), Some(10.0)));
        assert_eq!(v.font, "TimesRoman");
        assert_eq!(v.alignment, Alignment::Center);
    }

    #[test]
    fn test_variable_update_rejects_invalid() {
        let mut v = Variable::new("k");
        let before = v.clone();

        assert!(VariableUpdate::Size(0.0).apply(&mut v).is_err());
        assert!(VariableUpdate::Size(f64::NAN).apply(&mut v).is_err());
        assert!(VariableUpdate::Font("  ".to_string()).apply(&mut v).is_err());
        assert!(VariableUpdate::Color(Color::rgb(1.5, 0.0, 0.0))
            .apply(&mut v)
            .is_err());
        assert!(VariableUpdate::Box {
            w: Some(-1.0),
            h: None
        }
        .apply(&mut v)
        .is_err());
        assert!(VariableUpdate::Position {
            x: f64::INFINITY,
            y: 1.0
        }
        .apply(&mut v)
        .is_err());

        assert_eq!(v, before);
    }

    #[test]
    fn test_variable_serde_defaults() {
        let v: Variable = serde_json::from_str(r#"{ "key": "a" }"#).unwrap();
        assert_eq!(v, Variable::new("a"));

        let v: Variable = serde_json::from_str(
            r#"{ "key": "b", "x": 1, "y": 2, "w": 30, "h": 4,
                 "alignment": "right", "contain": true,
                 "color": { "r": 1, "g": 0, "b": 0 } }"#,
        )
        .unwrap();
        assert_eq!(v.alignment, Alignment::Right);
        assert_eq!(v.fit_box(), Some((30.0, 4.0)));
        assert_eq!(v.color, Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_template_stem() {
        let t = TemplateDocument::new(Some("certificate.final.pdf".to_string()), vec![1u8]);
        assert_eq!(t.stem(), Some("certificate.final"));

        let t = TemplateDocument::new(Some(".pdf".to_string()), vec![1u8]);
        assert_eq!(t.stem(), Some(".pdf"));

        let t = TemplateDocument::new(None, vec![1u8]);
        assert_eq!(t.stem(), None);
    }

    #[test]
    fn test_color_conversion() {
        let c: pdf_core::Color = Color::from_rgb(255, 0, 0).into();
        assert_eq!(c, pdf_core::Color::red());
    }
}
