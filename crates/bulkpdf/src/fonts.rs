//! Font catalog: builtin fonts plus named fonts downloaded on first use
//!
//! Downloaded bytes are kept for the life of the catalog and shared by
//! every render that uses it. Lookups never fail: anything that cannot be
//! resolved falls back to [`DEFAULT_FONT`](crate::DEFAULT_FONT).

use crate::{BulkError, Result, DEFAULT_FONT};
use async_trait::async_trait;
use log::{debug, warn};
use pdf_core::StandardFont;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A font ready to be embedded into a document
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedFont {
    Standard(StandardFont),
    TrueType { name: String, data: Arc<Vec<u8>> },
}

impl ResolvedFont {
    /// The font used whenever a requested one is unavailable
    pub fn fallback() -> Self {
        ResolvedFont::Standard(default_standard_font())
    }
}

/// The standard font named by [`DEFAULT_FONT`]
pub fn default_standard_font() -> StandardFont {
    StandardFont::from_name(DEFAULT_FONT).unwrap_or(StandardFont::Helvetica)
}

/// Where a catalog entry's bytes come from
#[derive(Debug, Clone)]
enum FontSource {
    /// Not downloaded yet
    Remote(String),
    Loaded(Arc<Vec<u8>>),
}

/// Downloads font files
#[async_trait]
pub trait FontFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`FontFetcher`] over HTTP(S)
pub struct HttpFontFetcher {
    client: reqwest::Client,
}

impl HttpFontFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bulkpdf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BulkError::FontError(format!("HTTP client error: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FontFetcher for HttpFontFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_error = |e: reqwest::Error| BulkError::FetchError {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;

        let bytes = response.bytes().await.map_err(fetch_error)?;
        Ok(bytes.to_vec())
    }
}

/// Named fonts: the standard fonts plus catalog entries
///
/// Construct once and share (e.g. in an `Arc`) between preview and batch
/// rendering so each remote font is downloaded at most a few times.
pub struct FontCatalog {
    entries: RwLock<HashMap<String, FontSource>>,
    fetcher: Option<Arc<dyn FontFetcher>>,
}

impl FontCatalog {
    /// Standard fonts only
    pub fn builtin() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fetcher: None,
        }
    }

    /// Standard fonts plus remote entries fetched through `fetcher`
    pub fn with_fetcher(fetcher: Arc<dyn FontFetcher>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fetcher: Some(fetcher),
        }
    }

    /// Load a catalog file: a JSON object mapping font name to URL
    pub fn from_json(json: &str, fetcher: Arc<dyn FontFetcher>) -> Result<Self> {
        let urls: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| BulkError::ParseError(e.to_string()))?;

        let entries = urls
            .into_iter()
            .map(|(name, url)| (name, FontSource::Remote(url)))
            .collect();

        Ok(Self {
            entries: RwLock::new(entries),
            fetcher: Some(fetcher),
        })
    }

    /// Register a font to download on first use
    pub async fn add_remote(&self, name: impl Into<String>, url: impl Into<String>) {
        self.entries
            .write()
            .await
            .insert(name.into(), FontSource::Remote(url.into()));
    }

    /// Register a font whose bytes are already at hand
    pub async fn add_font_data(&self, name: impl Into<String>, data: Vec<u8>) {
        self.entries
            .write()
            .await
            .insert(name.into(), FontSource::Loaded(Arc::new(data)));
    }

    /// Every name the catalog answers to, sorted
    pub async fn names(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut names: Vec<String> = StandardFont::ALL
            .iter()
            .map(|font| font.name().to_string())
            .chain(entries.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Resolve a font name, downloading it if needed
    ///
    /// Unknown names and failed downloads resolve to the default font. A
    /// failed download is not cached, so the next lookup tries again.
    pub async fn resolve(&self, name: &str) -> ResolvedFont {
        if let Some(standard) = StandardFont::from_name(name) {
            return ResolvedFont::Standard(standard);
        }

        // Check cache
        let url = {
            let entries = self.entries.read().await;
            match entries.get(name) {
                Some(FontSource::Loaded(data)) => {
                    debug!("Font '{name}' served from cache");
                    return ResolvedFont::TrueType {
                        name: name.to_string(),
                        data: data.clone(),
                    };
                }
                Some(FontSource::Remote(url)) => url.clone(),
                None => {
                    warn!("Unknown font '{name}', using {DEFAULT_FONT}");
                    return ResolvedFont::fallback();
                }
            }
        };

        let Some(fetcher) = &self.fetcher else {
            warn!("No font fetcher configured for '{name}', using {DEFAULT_FONT}");
            return ResolvedFont::fallback();
        };

        // Cache miss - download without holding the lock; a concurrent
        // lookup may download the same font, and the first write wins
        let data = match fetcher.fetch(&url).await {
            Ok(bytes) => Arc::new(bytes),
            Err(e) => {
                warn!("Failed to fetch font '{name}': {e}; using {DEFAULT_FONT}");
                return ResolvedFont::fallback();
            }
        };

        let data = {
            let mut entries = self.entries.write().await;
            match entries.get(name) {
                Some(FontSource::Loaded(existing)) => existing.clone(),
                _ => {
                    entries.insert(name.to_string(), FontSource::Loaded(data.clone()));
                    data
                }
            }
        };

        ResolvedFont::TrueType {
            name: name.to_string(),
            data,
        }
    }
}
