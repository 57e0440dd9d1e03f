// src/app/profile.rs
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::{fs, io};

use chrono::Utc;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{Region, ServiceName};

pub const NAME_MAX_CHARS: usize = 100;
pub const PASSWORD_MIN_CHARS: usize = 9;
pub const PASSWORD_MAX_CHARS: usize = 50;

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^[^\p{{Cc}}]{{1,{NAME_MAX_CHARS}}}$")).expect("name pattern is valid")
});

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Please enter a name up to 100 characters long.")]
    InvalidName,
    #[error("Invalid password. The password must have 9 to 50 characters.")]
    InvalidPassword,
    #[error("The passwords do not match.")]
    PasswordMismatch,
    #[error("Please select at least one streaming service.")]
    NoServices,
    #[error("profile file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("profile file {} is missing `{key}`", path.display())]
    Incomplete { path: PathBuf, key: &'static str },
}

/// In-memory credentials. Never written to the profile file.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    password: Option<String>,
}

impl Credentials {
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub region: Region,
    pub services: BTreeSet<ServiceName>,
    credentials: Credentials,
}

/// What the settings screen submits.
#[derive(Clone, Debug)]
pub struct ProfileUpdate {
    pub name: String,
    pub region: Region,
    pub services: BTreeSet<ServiceName>,
    pub password: String,
    pub confirm_password: String,
}

impl ProfileUpdate {
    /// The name as it will be stored: surrounding whitespace dropped.
    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if !NAME_RE.is_match(self.trimmed_name()) {
            return Err(ProfileError::InvalidName);
        }
        if !self.password.is_empty() {
            let n = self.password.chars().count();
            if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&n) {
                return Err(ProfileError::InvalidPassword);
            }
        }
        if self.password != self.confirm_password {
            return Err(ProfileError::PasswordMismatch);
        }
        if self.services.is_empty() {
            return Err(ProfileError::NoServices);
        }
        Ok(())
    }
}

impl UserProfile {
    pub fn new(name: impl Into<String>, region: Region, services: BTreeSet<ServiceName>) -> Self {
        Self {
            name: name.into(),
            region,
            services,
            credentials: Credentials::default(),
        }
    }

    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// True when `update` changes anything the catalog filter reads.
    pub fn affects_catalog(&self, update: &ProfileUpdate) -> bool {
        self.region != update.region || self.services != update.services
    }

    /// Validates, applies and persists `update`. Returns whether the catalog
    /// must be reloaded. An empty password keeps the current one.
    pub fn update_and_save(&mut self, update: ProfileUpdate, path: &Path) -> Result<bool, ProfileError> {
        update.validate()?;
        let must_reload = self.affects_catalog(&update);
        match backup_existing(path) {
            Ok(Some(dest)) => debug!("profile backed up to {}", dest.display()),
            Ok(None) => {}
            Err(err) => warn!("profile backup failed for {}: {err}", path.display()),
        }
        self.name = update.trimmed_name().to_string();
        self.region = update.region;
        self.services = update.services;
        if !update.password.is_empty() {
            self.credentials.password = Some(update.password);
        }
        self.save(path)?;
        Ok(must_reload)
    }

    /// Builds a first-run profile straight from a settings submission.
    pub fn from_update(update: ProfileUpdate) -> Result<Self, ProfileError> {
        update.validate()?;
        let name = update.trimmed_name().to_string();
        let mut profile = Self::new(name, update.region, update.services);
        if !update.password.is_empty() {
            profile.credentials.password = Some(update.password);
        }
        Ok(profile)
    }

    // ---- load/save ----

    /// `Ok(None)` when no profile has been saved yet.
    pub fn load(path: &Path) -> Result<Option<Self>, ProfileError> {
        let txt = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProfileError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut name = None;
        let mut region = None;
        let mut services = BTreeSet::new();
        for line in txt.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((k, v)) = line.split_once('=') else {
                continue;
            };
            let v = v.trim();
            match k.trim() {
                "name" => name = Some(v.to_string()),
                "region" => region = Region::from_str(v),
                "services" => {
                    for s in v.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                        match ServiceName::from_str(s) {
                            Some(svc) => {
                                services.insert(svc);
                            }
                            None => debug!("profile: skipping unknown service `{s}`"),
                        }
                    }
                }
                _ => {}
            }
        }

        let name = name.ok_or_else(|| ProfileError::Incomplete {
            path: path.to_path_buf(),
            key: "name",
        })?;
        let region = region.ok_or_else(|| ProfileError::Incomplete {
            path: path.to_path_buf(),
            key: "region",
        })?;
        info!("Loaded profile for {name} ({region}, {} services)", services.len());
        Ok(Some(Self::new(name, region, services)))
    }

    pub fn save(&self, path: &Path) -> Result<(), ProfileError> {
        let io_err = |source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let txt = format!(
            "# moviefinder user profile\n\
             name={}\n\
             region={}\n\
             services={}\n",
            self.name.replace('\n', " "),
            self.region.as_str(),
            self.services.iter().map(|s| s.as_str()).join(","),
        );
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, txt).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}

/// Copies an existing profile file to `<file>.<utc stamp>.bak` in the same
/// directory. `Ok(None)` when there is nothing to back up yet.
fn backup_existing(path: &Path) -> io::Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("user_profile.txt");
    let dest = path.with_file_name(format!(
        "{file_name}.{}.bak",
        Utc::now().format("%Y%m%dT%H%M%S")
    ));
    fs::copy(path, &dest)?;
    Ok(Some(dest))
}
