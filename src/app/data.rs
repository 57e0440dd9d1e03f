use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::debug;

use super::types::{Region, ServiceName};

/// One movie or show as the catalog store holds it.
#[derive(Debug, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub poster_url: String,
    pub regions: BTreeSet<Region>,
    pub services: BTreeSet<ServiceName>,
    pub year: Option<i32>,
}

/// Record shape shared by the sample file and the catalog service.
#[derive(Clone, Debug, Deserialize)]
pub struct ItemRecord {
    pub id: RecordId,
    pub title: String,
    #[serde(default, alias = "poster")]
    pub poster_url: String,
    #[serde(default, alias = "countries")]
    pub regions: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(i64),
}

impl RecordId {
    pub fn into_key(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// A page of records: `{"results": [...], "total_pages": n}` from the service,
/// `{"movies": [...]}` from the sample file.
#[derive(Debug, Deserialize)]
pub struct CatalogPage {
    #[serde(alias = "movies")]
    pub results: Vec<ItemRecord>,
    #[serde(default = "one_page")]
    pub total_pages: u32,
}

const fn one_page() -> u32 {
    1
}

impl From<ItemRecord> for Item {
    fn from(rec: ItemRecord) -> Self {
        let id = rec.id.into_key();
        let mut regions = BTreeSet::new();
        for raw in &rec.regions {
            match Region::from_str(raw) {
                Some(r) => {
                    regions.insert(r);
                }
                None => debug!("{id}: ignoring unsupported region `{raw}`"),
            }
        }
        let mut services = BTreeSet::new();
        for raw in &rec.services {
            match ServiceName::from_str(raw) {
                Some(s) => {
                    services.insert(s);
                }
                None => debug!("{id}: ignoring unsupported service `{raw}`"),
            }
        }
        Self {
            id,
            title: rec.title.trim().to_string(),
            poster_url: rec.poster_url,
            regions,
            services,
            year: rec.year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accepts_aliases_and_numeric_ids() {
        let page: CatalogPage = serde_json::from_str(
            r#"{"movies": [
                {"id": 42, "title": " Heat ", "poster": "http://img/heat.jpg",
                 "countries": ["us", "fr"], "services": ["Netflix", "peacock"], "year": 1995}
            ]}"#,
        )
        .unwrap();
        assert_eq!(page.total_pages, 1);
        let item = Item::from(page.results[0].clone());
        assert_eq!(item.id, "42");
        assert_eq!(item.title, "Heat");
        assert_eq!(item.poster_url, "http://img/heat.jpg");
        assert_eq!(item.regions, BTreeSet::from([Region::Us]));
        assert_eq!(item.services, BTreeSet::from([ServiceName::Netflix]));
        assert_eq!(item.year, Some(1995));
    }

    #[test]
    fn service_page_shape() {
        let page: CatalogPage = serde_json::from_str(
            r#"{"results": [{"id": "tt1", "title": "A"}], "total_pages": 7}"#,
        )
        .unwrap();
        assert_eq!(page.total_pages, 7);
        let item = Item::from(page.results.into_iter().next().unwrap());
        assert!(item.regions.is_empty());
        assert!(item.services.is_empty());
        assert_eq!(item.year, None);
    }
}
