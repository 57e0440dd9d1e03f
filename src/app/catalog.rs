// src/app/catalog.rs
use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::data::Item;
use super::filters::{compare_items, region_and_service_match, Mismatch};
use super::profile::UserProfile;
use super::source::{CatalogQuery, CatalogSource};
use super::types::{LoadOutcome, OrderBy};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("cannot load items when they are already loaded ({count} items); clear the catalog first")]
    AlreadyLoaded { count: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StoreState {
    Empty,
    Loaded,
}

/// Working set of browsable items for the current profile.
///
/// Either empty or fully loaded for one profile: `load` never merges into an
/// existing set and a failed fetch commits nothing. Deliberately not `Clone`;
/// the application state owns the only instance.
#[derive(Debug)]
pub struct Catalog {
    items: HashMap<String, Item>,
    state: StoreState,
    genres: Vec<String>,
    order_by: OrderBy,
    max_pages: u32,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Vec::new(), OrderBy::default(), 1)
    }
}

impl Catalog {
    pub fn new(genres: Vec<String>, order_by: OrderBy, max_pages: u32) -> Self {
        Self {
            items: HashMap::new(),
            state: StoreState::Empty,
            genres,
            order_by,
            max_pages: max_pages.max(1),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state == StoreState::Loaded
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Items in the configured display order.
    pub fn sorted(&self) -> Vec<&Item> {
        let mut out: Vec<&Item> = self.items.values().collect();
        out.sort_by(|a, b| compare_items(a, b, self.order_by));
        out
    }

    pub fn clear(&mut self) {
        if self.is_loaded() {
            debug!("Clearing catalog ({} items)", self.items.len());
        }
        self.items.clear();
        self.state = StoreState::Empty;
    }

    /// Fetch up to `max_pages` pages from `source` and keep the items that
    /// match `profile`. Must be called on an empty catalog.
    pub fn load(
        &mut self,
        profile: &UserProfile,
        source: &dyn CatalogSource,
    ) -> Result<LoadOutcome, CatalogError> {
        if self.is_loaded() {
            return Err(CatalogError::AlreadyLoaded {
                count: self.items.len(),
            });
        }

        info!("Loading items from {}...", source.describe());
        let base = CatalogQuery::for_profile(profile, &self.genres, self.order_by);
        let mut staged: HashMap<String, Item> = HashMap::new();
        let mut seen = 0usize;
        let mut page_no = 1u32;
        let mut last_page = 1u32;

        while page_no <= last_page {
            let page = match source.fetch_page(&base.with_page(page_no)) {
                Ok(p) => p,
                Err(err) => {
                    warn!("Catalog unavailable (page {page_no}): {err}");
                    return Ok(LoadOutcome::Unavailable);
                }
            };
            if page_no == 1 {
                last_page = page.total_pages.clamp(1, self.max_pages);
                if page.total_pages > self.max_pages {
                    debug!(
                        "Source has {} pages; fetching the first {}",
                        page.total_pages, self.max_pages
                    );
                }
            }
            for rec in page.results {
                seen += 1;
                let item = Item::from(rec);
                match region_and_service_match(profile, &item) {
                    Ok(()) => {
                        staged.insert(item.id.clone(), item);
                    }
                    Err(Mismatch::Region) => debug!(
                        "{} not added because {} not in {:?}",
                        item.title, profile.region, item.regions
                    ),
                    Err(Mismatch::Services) => debug!(
                        "{} not added because {:?} and {:?} share no service",
                        item.title, profile.services, item.services
                    ),
                }
            }
            page_no += 1;
        }

        self.items = staged;
        self.state = StoreState::Loaded;
        let count = self.items.len();
        info!("Catalog loaded: {count} of {seen} items match {}", profile.region);
        if count == 0 {
            Ok(LoadOutcome::LoadedEmpty)
        } else {
            Ok(LoadOutcome::Loaded(count))
        }
    }
}
