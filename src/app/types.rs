// src/app/types.rs
use std::fmt;

// ---- closed enumerations read by the filter ----
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Us,
    Ca,
    Gb,
    Au,
    Ie,
    Nz,
}

impl Region {
    pub const ALL: [Self; 6] = [Self::Us, Self::Ca, Self::Gb, Self::Au, Self::Ie, Self::Nz];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Ca => "CA",
            Self::Gb => "GB",
            Self::Au => "AU",
            Self::Ie => "IE",
            Self::Nz => "NZ",
        }
    }

    /// Lower-case form the catalog service expects in `country=`.
    pub fn api_name(self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .or_else(|| match s.to_ascii_lowercase().as_str() {
                "uk" => Some(Self::Gb),
                _ => None,
            })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceName {
    AppleTvPlus,
    DisneyPlus,
    HboMax,
    Hulu,
    Netflix,
}

impl ServiceName {
    pub const ALL: [Self; 5] = [
        Self::AppleTvPlus,
        Self::DisneyPlus,
        Self::HboMax,
        Self::Hulu,
        Self::Netflix,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AppleTvPlus => "Apple TV+",
            Self::DisneyPlus => "Disney+",
            Self::HboMax => "HBO Max",
            Self::Hulu => "Hulu",
            Self::Netflix => "Netflix",
        }
    }

    const fn slug(self) -> &'static str {
        match self {
            Self::AppleTvPlus => "apple",
            Self::DisneyPlus => "disney",
            Self::HboMax => "hbo",
            Self::Hulu => "hulu",
            Self::Netflix => "netflix",
        }
    }

    /// Lower-case form the catalog service expects in `service=`.
    pub fn api_name(self) -> String {
        self.as_str().to_lowercase()
    }

    /// Accepts display names ("Disney+"), lower-case api names and short
    /// slugs ("disney", "hbo_max"), case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect();
        Self::ALL.into_iter().find(|svc| {
            let display: String = svc
                .as_str()
                .to_ascii_lowercase()
                .chars()
                .filter(|c| *c != ' ')
                .collect();
            key == display
                || key == svc.slug()
                || key == display.replace('+', "plus")
        })
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderBy {
    #[default]
    OriginalTitle,
    Year,
}

impl OrderBy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OriginalTitle => "original_title",
            Self::Year => "year",
        }
    }
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "original_title" | "title" => Some(Self::OriginalTitle),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

// ---- load / flow outcomes ----

/// Result of a catalog load that did not violate the store's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Source reachable, `count` items passed the filter.
    Loaded(usize),
    /// Source unreachable or its response was not valid.
    Unavailable,
    /// Source reachable, nothing passed the filter.
    LoadedEmpty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Settings,
    Browse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Liked,
    Rejected,
}

impl Verdict {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Rejected => "rejected",
        }
    }
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "liked" => Some(Self::Liked),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_names_parse_loosely() {
        assert_eq!(ServiceName::from_str("Disney+"), Some(ServiceName::DisneyPlus));
        assert_eq!(ServiceName::from_str("disney+"), Some(ServiceName::DisneyPlus));
        assert_eq!(ServiceName::from_str("DISNEY_PLUS"), Some(ServiceName::DisneyPlus));
        assert_eq!(ServiceName::from_str("apple tv+"), Some(ServiceName::AppleTvPlus));
        assert_eq!(ServiceName::from_str("hbo_max"), Some(ServiceName::HboMax));
        assert_eq!(ServiceName::from_str("hbo"), Some(ServiceName::HboMax));
        assert_eq!(ServiceName::from_str(" Netflix "), Some(ServiceName::Netflix));
        assert_eq!(ServiceName::from_str("peacock"), None);
    }

    #[test]
    fn api_names_are_lower_case() {
        assert_eq!(ServiceName::AppleTvPlus.api_name(), "apple tv+");
        assert_eq!(Region::Us.api_name(), "us");
    }

    #[test]
    fn regions_parse_codes() {
        assert_eq!(Region::from_str("us"), Some(Region::Us));
        assert_eq!(Region::from_str("UK"), Some(Region::Gb));
        assert_eq!(Region::from_str("FR"), None);
        for r in Region::ALL {
            assert_eq!(Region::from_str(r.as_str()), Some(r));
        }
    }
}
