//! Batch generation: one document per data row, packed into a zip archive

use crate::renderer::DocumentRender;
use crate::{Result, TemplateDocument, TextSubstitution, Variable};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use unicode_normalization::UnicodeNormalization;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive name used when the template has no usable name
pub const DEFAULT_ARCHIVE_NAME: &str = "files.zip";

/// A row that could not be rendered
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    /// 1-based row number
    pub row: usize,
    pub error: String,
}

/// Everything a batch produced
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// Zip archive holding one PDF per successful row
    pub archive: Vec<u8>,
    pub archive_name: String,
    /// Entry names in the archive, in row order
    pub files: Vec<String>,
    pub failures: Vec<RowFailure>,
}

/// Split pasted spreadsheet text into rows of cells
///
/// Rows are separated by newlines and cells by tabs. Cells are trimmed;
/// blank rows are dropped.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(|cell| cell.trim().to_string()).collect())
        .collect()
}

/// Make `value` safe to use in a file name
///
/// Diacritics are stripped, whitespace runs become a single `-`, and only
/// ASCII letters, digits, `-` and `_` are kept.
pub fn sanitize_filename_part(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_whitespace = false;

    for c in value.nfd() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
            in_whitespace = false;
        }
        // Dropped characters such as combining marks do not end a run
    }

    out
}

/// Expand a file name pattern for one row
///
/// `{index}` becomes the 1-based row number and `{variable-N}` the
/// sanitized cell of the N-th variable (empty when the row is short).
/// Other braces are copied as-is.
pub fn output_filename(pattern: &str, index: usize, row: &[String]) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];

        let Some(close) = after.find('}') else {
            out.push_str(after);
            return out;
        };

        let token = &after[1..close];
        match expand_token(token, index, row) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&after[..=close]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn expand_token(token: &str, index: usize, row: &[String]) -> Option<String> {
    if token == "index" {
        return Some(index.to_string());
    }

    let ordinal: usize = token.strip_prefix("variable-")?.parse().ok()?;
    if ordinal == 0 {
        return None;
    }
    let cell = row.get(ordinal - 1).map(String::as_str).unwrap_or_default();
    Some(sanitize_filename_part(cell))
}

/// Pair variables with a row's cells by position
///
/// A variable is left out when its cell is missing or empty, or when it is
/// not active.
pub fn row_substitutions(variables: &[Variable], row: &[String]) -> Vec<TextSubstitution> {
    variables
        .iter()
        .zip(row)
        .filter(|(variable, cell)| !cell.is_empty() && variable.is_active())
        .map(|(variable, cell)| TextSubstitution::new(variable.clone(), cell.as_str()))
        .collect()
}

/// Name of the archive for a template
pub fn archive_name(template: &TemplateDocument) -> String {
    match template.stem().map(sanitize_filename_part) {
        Some(stem) if !stem.is_empty() => format!("{stem}.zip"),
        _ => DEFAULT_ARCHIVE_NAME.to_string(),
    }
}

/// Render every row and pack the results into one archive
///
/// Rows are rendered one after another. A row that fails is logged and
/// reported in [`BatchOutput::failures`]; the rest of the batch carries on.
/// Only archive writing can fail the whole batch.
pub async fn generate<R: DocumentRender + ?Sized>(
    renderer: &R,
    template: &TemplateDocument,
    variables: &[Variable],
    rows: &[Vec<String>],
    pattern: &str,
) -> Result<BatchOutput> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    let mut names = UniqueNames::default();
    let mut files = Vec::with_capacity(rows.len());
    let mut failures = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let index = i + 1;
        let substitutions = row_substitutions(variables, row);

        let rendered = match renderer.render(template, &substitutions).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("Row {index} failed: {e}");
                failures.push(RowFailure {
                    row: index,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let name = names.claim(output_filename(pattern, index, row));
        debug!("Row {index} -> {name}");

        writer.start_file(name.as_str(), options)?;
        writer.write_all(&rendered.bytes)?;
        files.push(name);
    }

    let archive = writer.finish()?.into_inner();
    let archive_name = archive_name(template);

    info!(
        "Generated {} of {} documents into {archive_name}",
        files.len(),
        rows.len()
    );

    Ok(BatchOutput {
        archive,
        archive_name,
        files,
        failures,
    })
}

/// Hands out archive entry names, numbering repeats
#[derive(Default)]
struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    /// `name`, or `name-2`, `name-3`, ... (before the extension) if taken
    fn claim(&mut self, name: String) -> String {
        if self.taken.insert(name.clone()) {
            return name;
        }

        let (stem, ext) = match name.rfind('.') {
            Some(dot) if dot > 0 => name.split_at(dot),
            _ => (name.as_str(), ""),
        };

        let mut n = 2;
        loop {
            let candidate = format!("{stem}-{n}{ext}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
