//! # bulkpdf
//!
//! Fill one PDF template with many rows of text.
//!
//! ## Usage
//!
//! ```bash
//! # Render the labelled preview and print where each variable landed
//! bulkpdf preview project.json -o preview.pdf
//!
//! # One PDF per row of tab-separated data, zipped
//! bulkpdf generate project.json --data rows.tsv
//! pbpaste | bulkpdf generate project.json --pattern "{index}-{variable-1}.pdf"
//!
//! # List the font names a project can use
//! bulkpdf fonts project.json
//! ```

use anyhow::{Context, Result};
use bulkpdf::parser::{load_project, resolve_relative};
use bulkpdf::preview::preview_substitutions;
use bulkpdf::{
    batch, DocumentRender, DocumentRenderer, FontCatalog, HttpFontFetcher, Project,
    TemplateDocument,
};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// bulkpdf - fill a PDF template from spreadsheet rows
#[derive(Parser, Debug)]
#[command(name = "bulkpdf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every placed variable with its "Variable N" label
    Preview {
        /// Project file
        project: PathBuf,

        /// Where to write the preview PDF
        #[arg(short, long, default_value = "preview.pdf")]
        output: PathBuf,
    },

    /// Render one document per data row into a zip archive
    Generate {
        /// Project file
        project: PathBuf,

        /// Tab-separated rows; read from stdin when omitted
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Archive path, or a directory to place it in
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// File name pattern, overriding the project's
        #[arg(long)]
        pattern: Option<String>,
    },

    /// List font names usable by a project
    Fonts {
        /// Project file
        project: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli.command)) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Preview { project, output } => preview(&project, &output).await,
        Commands::Generate {
            project,
            data,
            output,
            pattern,
        } => generate(&project, data.as_deref(), &output, pattern).await,
        Commands::Fonts { project } => {
            let loaded = Loaded::open(&project)?;
            for name in loaded.fonts.names().await {
                println!("{name}");
            }
            Ok(())
        }
    }
}

/// A project with its template and font catalog loaded
struct Loaded {
    project: Project,
    template: TemplateDocument,
    fonts: Arc<FontCatalog>,
}

impl Loaded {
    fn open(path: &Path) -> Result<Self> {
        let project =
            load_project(path).with_context(|| format!("loading project {}", path.display()))?;

        let template_path = resolve_relative(path, &project.template);
        let template = TemplateDocument::from_path(&template_path)
            .with_context(|| format!("reading template {}", template_path.display()))?;

        let fonts = match &project.fonts {
            Some(catalog) => {
                let catalog_path = resolve_relative(path, catalog);
                let json = std::fs::read_to_string(&catalog_path)
                    .with_context(|| format!("reading font catalog {}", catalog_path.display()))?;
                let fetcher = Arc::new(HttpFontFetcher::new()?);
                FontCatalog::from_json(&json, fetcher)
                    .with_context(|| format!("parsing font catalog {}", catalog_path.display()))?
            }
            None => FontCatalog::builtin(),
        };

        Ok(Self {
            project,
            template,
            fonts: Arc::new(fonts),
        })
    }

    fn renderer(&self) -> DocumentRenderer {
        DocumentRenderer::new(self.fonts.clone())
    }
}

async fn preview(project: &Path, output: &Path) -> Result<()> {
    let loaded = Loaded::open(project)?;
    let substitutions = preview_substitutions(&loaded.project.variables);

    let rendered = loaded
        .renderer()
        .render(&loaded.template, &substitutions)
        .await?;

    std::fs::write(output, &rendered.bytes)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("Preview written to {}", output.display());

    let skipped: serde_json::Map<String, serde_json::Value> = rendered
        .skipped()
        .into_iter()
        .map(|(key, reason)| (key.to_string(), reason.to_string().into()))
        .collect();
    let report = serde_json::json!({
        "drawn": rendered.drawn_map(),
        "skipped": skipped,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn generate(
    project: &Path,
    data: Option<&Path>,
    output: &Path,
    pattern: Option<String>,
) -> Result<()> {
    let loaded = Loaded::open(project)?;

    let text = match data {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading data {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading data from stdin")?;
            text
        }
    };
    let rows = batch::parse_rows(&text);
    if rows.is_empty() {
        warn!("No data rows; the archive will be empty");
    }

    let pattern = pattern.unwrap_or_else(|| loaded.project.filename.clone());
    let result = batch::generate(
        &loaded.renderer(),
        &loaded.template,
        &loaded.project.variables,
        &rows,
        &pattern,
    )
    .await?;

    let archive_path = if output.is_dir() {
        output.join(&result.archive_name)
    } else {
        output.to_path_buf()
    };
    std::fs::write(&archive_path, &result.archive)
        .with_context(|| format!("writing {}", archive_path.display()))?;

    println!(
        "Wrote {} file(s) to {}",
        result.files.len(),
        archive_path.display()
    );
    for failure in &result.failures {
        eprintln!("Row {} failed: {}", failure.row, failure.error);
    }

    Ok(())
}
