// src/app/source.rs
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use itertools::Itertools;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, info};

use super::data::CatalogPage;
use super::profile::UserProfile;
use super::types::{OrderBy, Region, ServiceName};
use crate::config::{AppConfig, CatalogSourceKind};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("invalid catalog response: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Everything a source may use to narrow or page its answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogQuery {
    pub region: Region,
    pub services: Vec<ServiceName>,
    pub page: u32,
    pub genres: Vec<String>,
    pub order_by: OrderBy,
}

impl CatalogQuery {
    pub fn for_profile(profile: &UserProfile, genres: &[String], order_by: OrderBy) -> Self {
        Self {
            region: profile.region,
            services: profile.services.iter().copied().collect(),
            page: 1,
            genres: genres.to_vec(),
            order_by,
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// Where catalog records come from. Any error means the source is unavailable.
pub trait CatalogSource {
    fn fetch_page(&self, query: &CatalogQuery) -> Result<CatalogPage, SourceError>;

    fn describe(&self) -> String;
}

// ---- bundled sample file ----

/// Static stand-in for the catalog service. Ignores the query; always one page.
pub struct SampleFileSource {
    path: PathBuf,
}

impl SampleFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for SampleFileSource {
    fn fetch_page(&self, query: &CatalogQuery) -> Result<CatalogPage, SourceError> {
        let bytes = fs::read(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })?;
        let mut page: CatalogPage = serde_json::from_slice(&bytes)?;
        if query.page > 1 {
            page.results.clear();
        }
        page.total_pages = 1;
        debug!("{}: {} records", self.path.display(), page.results.len());
        Ok(page)
    }

    fn describe(&self) -> String {
        format!("sample file {}", self.path.display())
    }
}

// ---- catalog service ----

pub struct ServiceSource {
    client: Client,
    base_url: String,
}

impl ServiceSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// `country`, repeated `service`, `page`, repeated `genre`, `orderBy`.
    pub fn request_url(&self, query: &CatalogQuery) -> String {
        let mut params = vec![
            ("country", query.region.api_name()),
            ("page", query.page.to_string()),
            ("orderBy", query.order_by.as_str().to_string()),
        ];
        params.extend(query.services.iter().map(|s| ("service", s.api_name())));
        params.extend(query.genres.iter().map(|g| ("genre", g.clone())));
        let qs = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .join("&");
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{sep}{qs}", self.base_url)
    }
}

impl CatalogSource for ServiceSource {
    fn fetch_page(&self, query: &CatalogQuery) -> Result<CatalogPage, SourceError> {
        let url = self.request_url(query);
        debug!("GET {url}");
        let resp = self.client.get(&url).send()?;
        if !resp.status().is_success() {
            return Err(SourceError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }
        let body = resp.bytes()?;
        let page: CatalogPage = serde_json::from_slice(&body)?;
        Ok(page)
    }

    fn describe(&self) -> String {
        format!("catalog service {}", self.base_url)
    }
}

/// Pick the source named in the config.
pub fn source_from_config(cfg: &AppConfig) -> Result<Box<dyn CatalogSource>, SourceError> {
    let source: Box<dyn CatalogSource> = match cfg.catalog_source {
        CatalogSourceKind::SampleFile => Box::new(SampleFileSource::new(&cfg.sample_path)),
        CatalogSourceKind::Service => Box::new(ServiceSource::new(
            cfg.service_url.clone(),
            Duration::from_secs(cfg.request_timeout_secs),
        )?),
    };
    info!("Catalog source: {}", source.describe());
    Ok(source)
}
