use std::{env, fs, path::Path, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::app::types::OrderBy;

pub const CONFIG_FILE: &str = "config.json";
pub const CONFIG_ENV: &str = "MOVIEFINDER_CONFIG";
pub const DEFAULT_DATA_DIR: &str = ".moviefinder";
pub const DEFAULT_SAMPLE_PATH: &str = "data/sample_movies.json";
pub const DEFAULT_SERVICE_URL: &str = "https://chuadevs.com:1587/v1/movie/";
pub const PROFILE_FILE: &str = "user_profile.txt";
pub const VERDICT_DB_FILE: &str = "verdicts.db";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogSourceKind {
    SampleFile,
    Service,
}

impl CatalogSourceKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "sample" | "sample_file" | "file" => Some(Self::SampleFile),
            "service" | "network" | "http" => Some(Self::Service),
            _ => None,
        }
    }
}

impl Default for CatalogSourceKind {
    fn default() -> Self {
        Self::SampleFile
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub catalog_source: CatalogSourceKind,
    pub sample_path: PathBuf,
    pub service_url: String,
    pub genres: Vec<String>,
    pub order_by: OrderBy,
    pub max_pages: u32,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            catalog_source: CatalogSourceKind::default(),
            sample_path: PathBuf::from(DEFAULT_SAMPLE_PATH),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            genres: Vec::new(),
            order_by: OrderBy::default(),
            max_pages: 1,
            request_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join(PROFILE_FILE)
    }

    pub fn verdict_db_path(&self) -> PathBuf {
        self.data_dir.join(VERDICT_DB_FILE)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    data_dir: Option<String>,
    catalog_source: Option<String>,
    #[serde(alias = "sample_movies_path")]
    sample_path: Option<String>,
    service_url: Option<String>,
    genres: Option<Vec<String>>,
    order_by: Option<String>,
    max_pages: Option<u32>,
    request_timeout_secs: Option<u64>,
}

/// Reads `config.json` (or the file named by `MOVIEFINDER_CONFIG`).
pub fn load_config() -> AppConfig {
    let cfg_path = env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    load_config_from(&cfg_path)
}

pub fn load_config_from(cfg_path: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();

    let raw = match fs::read_to_string(cfg_path) {
        Ok(raw) => raw,
        Err(_) => {
            info!("No {} found; using defaults", cfg_path.display());
            return cfg;
        }
    };

    let parsed = match serde_json::from_str::<RawConfig>(&raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Failed to parse {} ({err}). Using defaults.", cfg_path.display());
            return cfg;
        }
    };

    if let Some(dir) = parsed.data_dir {
        cfg.data_dir = PathBuf::from(dir);
    }
    if let Some(mode) = parsed.catalog_source {
        match CatalogSourceKind::from_str(&mode) {
            Some(kind) => cfg.catalog_source = kind,
            None => warn!("Unknown catalog_source `{mode}`; falling back to the sample file."),
        }
    }
    if let Some(path) = parsed.sample_path {
        cfg.sample_path = PathBuf::from(path);
    }
    if let Some(url) = parsed.service_url {
        cfg.service_url = url;
    }
    if let Some(genres) = parsed.genres {
        cfg.genres = genres
            .into_iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
    }
    if let Some(order) = parsed.order_by {
        match OrderBy::from_str(&order) {
            Some(o) => cfg.order_by = o,
            None => warn!("Unknown order_by `{order}`; using `{}`.", cfg.order_by.as_str()),
        }
    }
    if let Some(n) = parsed.max_pages {
        cfg.max_pages = n.clamp(1, 50);
    }
    if let Some(secs) = parsed.request_timeout_secs {
        cfg.request_timeout_secs = secs.clamp(1, 120);
    }
    info!("Loaded config from {}", cfg_path.display());

    cfg
}
