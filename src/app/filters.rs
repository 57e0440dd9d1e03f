use std::cmp::Ordering;

use super::data::Item;
use super::profile::UserProfile;
use super::types::OrderBy;

/// Why an item was left out of the catalog. Only ever logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mismatch {
    Region,
    Services,
}

/// Region must be one of the item's regions and at least one subscribed
/// service must carry the item.
pub fn region_and_service_match(profile: &UserProfile, item: &Item) -> Result<(), Mismatch> {
    if !item.regions.contains(&profile.region) {
        return Err(Mismatch::Region);
    }
    if profile.services.is_disjoint(&item.services) {
        return Err(Mismatch::Services);
    }
    Ok(())
}

pub fn normalize_title(s: &str) -> String {
    s.trim().to_lowercase()
}

pub fn compare_items(a: &Item, b: &Item, order: OrderBy) -> Ordering {
    let by_title = || {
        normalize_title(&a.title)
            .cmp(&normalize_title(&b.title))
            .then_with(|| a.id.cmp(&b.id))
    };
    match order {
        OrderBy::OriginalTitle => by_title(),
        // undated items sort last
        OrderBy::Year => match (a.year, b.year) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(by_title),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => by_title(),
        },
    }
}
