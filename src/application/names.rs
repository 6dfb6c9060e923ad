//! Display-name lookups attached to listings.

use std::collections::{HashMap, HashSet};

use crate::domain::{DomainResult, RepositoryProvider, Station};

pub const UNKNOWN_USER: &str = "Unknown User";
pub const UNKNOWN_STATION: &str = "Unknown Station";
pub const UNKNOWN_OPERATOR: &str = "Unknown Operator";

fn unique(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let set: HashSet<String> = ids.into_iter().collect();
    set.into_iter().collect()
}

/// user id -> name (or email when the name is blank)
pub async fn user_names(
    repos: &dyn RepositoryProvider,
    ids: impl IntoIterator<Item = String>,
) -> DomainResult<HashMap<String, String>> {
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(repos
        .users()
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id.clone(), u.display_name().to_string()))
        .collect())
}

/// station id -> station
pub async fn stations_by_id(
    repos: &dyn RepositoryProvider,
    ids: impl IntoIterator<Item = String>,
) -> DomainResult<HashMap<String, Station>> {
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(repos
        .stations()
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect())
}

/// station id -> station name
pub async fn station_names(
    repos: &dyn RepositoryProvider,
    ids: impl IntoIterator<Item = String>,
) -> DomainResult<HashMap<String, String>> {
    Ok(stations_by_id(repos, ids)
        .await?
        .into_iter()
        .map(|(id, s)| (id, s.name))
        .collect())
}

pub fn name_or(map: &HashMap<String, String>, id: &str, fallback: &str) -> String {
    map.get(id).cloned().unwrap_or_else(|| fallback.to_string())
}
