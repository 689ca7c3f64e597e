//! Project file parsing

use crate::{BulkError, Project, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Parse a project from JSON string
///
/// Variable keys must be unique.
pub fn parse_project(json: &str) -> Result<Project> {
    let project: Project =
        serde_json::from_str(json).map_err(|e| BulkError::ParseError(e.to_string()))?;

    let mut keys = HashSet::new();
    for variable in &project.variables {
        if !keys.insert(variable.key.as_str()) {
            return Err(BulkError::InvalidField {
                field: "key",
                reason: format!("duplicate variable key '{}'", variable.key),
            });
        }
    }

    Ok(project)
}

/// Read and parse a project file
pub fn load_project(path: &Path) -> Result<Project> {
    let json = std::fs::read_to_string(path)?;
    parse_project(&json)
}

/// Resolve a path from a project file against the file's directory
pub fn resolve_relative(project_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match project_path.parent() {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Alignment, DEFAULT_FILENAME_PATTERN};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_project() {
        let project = parse_project(
            r#"{
                "template": "certificate.pdf",
                "fonts": "fonts.json",
                "variables": [
                    { "key": "name", "x": 120, "y": 300, "alignment": "center" },
                    { "key": "org" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(project.template, PathBuf::from("certificate.pdf"));
        assert_eq!(project.filename, DEFAULT_FILENAME_PATTERN);
        assert_eq!(project.fonts, Some(PathBuf::from("fonts.json")));
        assert_eq!(project.variables.len(), 2);
        assert_eq!(project.variables[0].alignment, Alignment::Center);
        assert!(project.variables[0].is_active());
        assert!(!project.variables[1].is_active());
    }

    #[test]
    fn test_parse_project_invalid_json() {
        let result = parse_project("{ not json");
        assert!(matches!(result, Err(BulkError::ParseError(_))));
    }

    #[test]
    fn test_parse_project_missing_template() {
        let result = parse_project(r#"{ "variables": [] }"#);
        assert!(matches!(result, Err(BulkError::ParseError(_))));
    }

    #[test]
    fn test_parse_project_duplicate_keys() {
        let result = parse_project(
            r#"{ "template": "t.pdf", "variables": [ { "key": "a" }, { "key": "a" } ] }"#,
        );
        assert!(matches!(result, Err(BulkError::InvalidField { field: "key", .. })));
    }

    #[test]
    fn test_resolve_relative() {
        let project = Path::new("/work/jobs/project.json");
        assert_eq!(
            resolve_relative(project, Path::new("cert.pdf")),
            PathBuf::from("/work/jobs/cert.pdf")
        );
        assert_eq!(
            resolve_relative(project, Path::new("/abs/cert.pdf")),
            PathBuf::from("/abs/cert.pdf")
        );
    }
}
