// src/app/mod.rs — application state: profile, catalog, verdicts and the settings flow

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

// ---- Local modules ----
pub mod catalog;
pub mod data;
pub mod filters;
pub mod profile;
pub mod source;
pub mod types;
pub mod verdicts;

pub use catalog::{Catalog, CatalogError};
pub use data::Item;
pub use profile::{ProfileError, ProfileUpdate, UserProfile};
pub use source::{CatalogSource, SourceError};
pub use types::{LoadOutcome, OrderBy, Region, ServiceName, Verdict, View};
pub use verdicts::{VerdictError, VerdictLog};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Verdict(#[from] VerdictError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("no profile saved yet; run settings first")]
    NoProfile,
}

/// What saving the settings screen did to the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsOutcome {
    /// Region and services unchanged; catalog kept as is.
    Unchanged,
    Reloaded(usize),
    ReloadedEmpty,
    /// Profile saved but the catalog could not be fetched.
    Unavailable,
}

/// Single owner of everything the screens read.
pub struct MovieFinder {
    profile: Option<UserProfile>,
    catalog: Catalog,
    verdicts: VerdictLog,
    source: Box<dyn CatalogSource>,
    profile_path: PathBuf,
    view: View,
}

impl MovieFinder {
    /// Open the data directory named in `cfg` and pick the configured source.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let source = source::source_from_config(cfg)?;
        let verdicts = VerdictLog::open(&cfg.verdict_db_path())?;
        let profile = UserProfile::load(&cfg.profile_path())?;
        let catalog = Catalog::new(cfg.genres.clone(), cfg.order_by, cfg.max_pages);
        Ok(Self::new(profile, catalog, verdicts, source, cfg.profile_path()))
    }

    pub fn new(
        profile: Option<UserProfile>,
        catalog: Catalog,
        verdicts: VerdictLog,
        source: Box<dyn CatalogSource>,
        profile_path: PathBuf,
    ) -> Self {
        let view = if profile.is_some() {
            View::Browse
        } else {
            View::Settings
        };
        Self {
            profile,
            catalog,
            verdicts,
            source,
            profile_path,
            view,
        }
    }

    pub const fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub const fn verdicts(&self) -> &VerdictLog {
        &self.verdicts
    }

    pub const fn view(&self) -> View {
        self.view
    }

    /// Startup load for an existing profile. Stays on the settings view when
    /// the source is unavailable.
    pub fn load_catalog(&mut self) -> Result<LoadOutcome, AppError> {
        let profile = self.profile.as_ref().ok_or(AppError::NoProfile)?;
        let outcome = self.catalog.load(profile, self.source.as_ref())?;
        self.view = match outcome {
            LoadOutcome::Unavailable => View::Settings,
            LoadOutcome::Loaded(_) | LoadOutcome::LoadedEmpty => View::Browse,
        };
        Ok(outcome)
    }

    /// Save the settings screen. The profile is persisted before any reload;
    /// region or service changes clear and reload the catalog.
    pub fn save_settings(&mut self, update: ProfileUpdate) -> Result<SettingsOutcome, AppError> {
        let must_reload = match self.profile.as_mut() {
            Some(profile) => profile.update_and_save(update, &self.profile_path)?,
            None => {
                let profile = UserProfile::from_update(update)?;
                profile.save(&self.profile_path)?;
                self.profile = Some(profile);
                true
            }
        };

        if !must_reload && self.catalog.is_loaded() {
            self.view = View::Browse;
            return Ok(SettingsOutcome::Unchanged);
        }

        self.catalog.clear();
        let outcome = match self.load_catalog()? {
            LoadOutcome::Loaded(n) => SettingsOutcome::Reloaded(n),
            LoadOutcome::LoadedEmpty => SettingsOutcome::ReloadedEmpty,
            LoadOutcome::Unavailable => {
                warn!("Settings saved but the catalog service is unreachable");
                SettingsOutcome::Unavailable
            }
        };
        info!("Settings saved: {outcome:?}");
        Ok(outcome)
    }

    /// Catalog items without a verdict, in display order.
    pub fn browse(&self) -> Result<Vec<&Item>, AppError> {
        let decided = self.verdicts.decided_ids()?;
        Ok(self
            .catalog
            .sorted()
            .into_iter()
            .filter(|item| !decided.contains(&item.id))
            .collect())
    }

    pub fn like(&self, item_id: &str) -> Result<(), AppError> {
        self.decide(item_id, Verdict::Liked)
    }

    pub fn reject(&self, item_id: &str) -> Result<(), AppError> {
        self.decide(item_id, Verdict::Rejected)
    }

    fn decide(&self, item_id: &str, verdict: Verdict) -> Result<(), AppError> {
        if !self.catalog.contains(item_id) {
            return Err(VerdictError::UnknownItem(item_id.to_string()).into());
        }
        self.verdicts.record(item_id, verdict)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::data::CatalogPage;
    use crate::app::source::CatalogQuery;
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    /// Sample-shaped JSON served from memory; `down` makes it unreachable.
    struct MemorySource {
        body: &'static str,
        down: Rc<Cell<bool>>,
        fetches: Rc<Cell<usize>>,
    }

    impl CatalogSource for MemorySource {
        fn fetch_page(&self, _query: &CatalogQuery) -> Result<CatalogPage, SourceError> {
            self.fetches.set(self.fetches.get() + 1);
            if self.down.get() {
                return Err(SourceError::Status {
                    status: 503,
                    url: "memory://".into(),
                });
            }
            Ok(serde_json::from_str(self.body)?)
        }
        fn describe(&self) -> String {
            "memory".into()
        }
    }

    const BODY: &str = r#"{"movies": [
        {"id": "a", "title": "Arrival", "regions": ["US"], "services": ["netflix"], "year": 2016},
        {"id": "b", "title": "Brooklyn", "regions": ["US"], "services": ["hulu"], "year": 2015},
        {"id": "c", "title": "Coda", "regions": ["CA"], "services": ["netflix"], "year": 2021},
        {"id": "d", "title": "Dune", "regions": ["US", "CA"], "services": ["netflix", "hbo max"], "year": 2021}
    ]}"#;

    struct Harness {
        app: MovieFinder,
        down: Rc<Cell<bool>>,
        fetches: Rc<Cell<usize>>,
        _dir: tempfile::TempDir,
        profile_path: PathBuf,
    }

    fn harness(profile: Option<UserProfile>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let profile_path = dir.path().join("user_profile.txt");
        let down = Rc::new(Cell::new(false));
        let fetches = Rc::new(Cell::new(0));
        let source = MemorySource {
            body: BODY,
            down: down.clone(),
            fetches: fetches.clone(),
        };
        let app = MovieFinder::new(
            profile,
            Catalog::default(),
            VerdictLog::in_memory().unwrap(),
            Box::new(source),
            profile_path.clone(),
        );
        Harness {
            app,
            down,
            fetches,
            _dir: dir,
            profile_path,
        }
    }

    fn update(region: Region, services: &[ServiceName]) -> ProfileUpdate {
        ProfileUpdate {
            name: "Ada".into(),
            region,
            services: services.iter().copied().collect(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }

    fn browse_ids(app: &MovieFinder) -> Vec<String> {
        app.browse().unwrap().into_iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn first_run_starts_on_settings_and_saves_profile() {
        let mut h = harness(None);
        assert_eq!(h.app.view(), View::Settings);
        assert!(matches!(h.app.load_catalog(), Err(AppError::NoProfile)));

        let out = h.app.save_settings(update(Region::Us, &[ServiceName::Netflix])).unwrap();
        assert_eq!(out, SettingsOutcome::Reloaded(2));
        assert_eq!(h.app.view(), View::Browse);
        assert_eq!(browse_ids(&h.app), vec!["a".to_string(), "d".to_string()]);
        assert!(UserProfile::load(&h.profile_path).unwrap().is_some());
    }

    #[test]
    fn name_only_change_does_not_refetch() {
        let profile = UserProfile::new("Ada", Region::Us, BTreeSet::from([ServiceName::Netflix]));
        let mut h = harness(Some(profile));
        h.app.load_catalog().unwrap();
        assert_eq!(h.fetches.get(), 1);

        let mut u = update(Region::Us, &[ServiceName::Netflix]);
        u.name = "Ada L.".into();
        assert_eq!(h.app.save_settings(u).unwrap(), SettingsOutcome::Unchanged);
        assert_eq!(h.fetches.get(), 1);
        assert_eq!(h.app.profile().unwrap().name, "Ada L.");
    }

    #[test]
    fn service_change_reloads() {
        let profile = UserProfile::new("Ada", Region::Us, BTreeSet::from([ServiceName::Netflix]));
        let mut h = harness(Some(profile));
        h.app.load_catalog().unwrap();
        let out = h
            .app
            .save_settings(update(Region::Us, &[ServiceName::Hulu]))
            .unwrap();
        assert_eq!(out, SettingsOutcome::Reloaded(1));
        assert_eq!(browse_ids(&h.app), vec!["b".to_string()]);

        let out = h
            .app
            .save_settings(update(Region::Au, &[ServiceName::Hulu]))
            .unwrap();
        assert_eq!(out, SettingsOutcome::ReloadedEmpty);
        assert_eq!(h.app.view(), View::Browse);
        assert!(browse_ids(&h.app).is_empty());
    }

    #[test]
    fn unavailable_keeps_profile_and_stays_on_settings() {
        let profile = UserProfile::new("Ada", Region::Us, BTreeSet::from([ServiceName::Netflix]));
        let mut h = harness(Some(profile));
        h.app.load_catalog().unwrap();
        h.down.set(true);

        let out = h
            .app
            .save_settings(update(Region::Ca, &[ServiceName::Netflix]))
            .unwrap();
        assert_eq!(out, SettingsOutcome::Unavailable);
        assert_eq!(h.app.view(), View::Settings);
        assert!(h.app.catalog().is_empty());
        let saved = UserProfile::load(&h.profile_path).unwrap().unwrap();
        assert_eq!(saved.region, Region::Ca);

        // resubmitting the same settings retries because nothing is loaded
        h.down.set(false);
        let out = h
            .app
            .save_settings(update(Region::Ca, &[ServiceName::Netflix]))
            .unwrap();
        assert_eq!(out, SettingsOutcome::Reloaded(2));
    }

    #[test]
    fn invalid_settings_change_nothing() {
        let profile = UserProfile::new("Ada", Region::Us, BTreeSet::from([ServiceName::Netflix]));
        let mut h = harness(Some(profile));
        h.app.load_catalog().unwrap();
        let err = h.app.save_settings(update(Region::Ca, &[])).unwrap_err();
        assert!(matches!(err, AppError::Profile(ProfileError::NoServices)));
        assert_eq!(h.app.catalog().len(), 2);
        assert!(!h.profile_path.exists());
    }

    #[test]
    fn verdicts_hide_items_from_browse() {
        let profile = UserProfile::new("Ada", Region::Us, BTreeSet::from([ServiceName::Netflix]));
        let mut h = harness(Some(profile));
        h.app.load_catalog().unwrap();
        h.app.like("d").unwrap();
        assert_eq!(browse_ids(&h.app), vec!["a".to_string()]);
        h.app.reject("a").unwrap();
        assert!(browse_ids(&h.app).is_empty());
        assert!(matches!(
            h.app.like("c"),
            Err(AppError::Verdict(VerdictError::UnknownItem(_)))
        ));
        let liked: Vec<String> = h.app.verdicts().liked().unwrap().into_iter().map(|e| e.item_id).collect();
        assert_eq!(liked, vec!["d".to_string()]);
    }
}
