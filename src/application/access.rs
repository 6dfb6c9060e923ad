//! Ownership and visibility rules shared by the use-cases.

use crate::domain::{Actor, DomainError, DomainResult, RecordScope, RepositoryProvider, Station, UserRole};

/// Self-or-admin check used by every `/{userId}` route.
pub fn ensure_self_or_admin(actor: &Actor, user_id: &str) -> DomainResult<()> {
    if actor.can_act_for(user_id) {
        Ok(())
    } else {
        Err(DomainError::forbidden())
    }
}

/// Admins manage every station; operators only their own.
pub fn ensure_can_manage(actor: &Actor, station: &Station) -> DomainResult<()> {
    match actor.role {
        UserRole::Admin => Ok(()),
        UserRole::Operator if station.is_operated_by(&actor.user_id) => Ok(()),
        _ => Err(DomainError::forbidden()),
    }
}

pub async fn operator_station_ids(
    repos: &dyn RepositoryProvider,
    operator_id: &str,
) -> DomainResult<Vec<String>> {
    Ok(repos
        .stations()
        .find_by_operator(operator_id)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect())
}

/// Rows a role may list: drivers see their own, operators what happened at
/// their stations, admins everything.
pub async fn station_scope(repos: &dyn RepositoryProvider, actor: &Actor) -> DomainResult<RecordScope> {
    Ok(match actor.role {
        UserRole::Admin => RecordScope::All,
        UserRole::Operator => {
            RecordScope::Stations(operator_station_ids(repos, &actor.user_id).await?)
        }
        UserRole::User => RecordScope::User(actor.user_id.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_manage_only_their_stations() {
        let station = Station::new("S", "Pune", "Baner", "op-1");
        assert!(ensure_can_manage(&Actor::new("op-1", UserRole::Operator), &station).is_ok());
        assert!(ensure_can_manage(&Actor::new("op-2", UserRole::Operator), &station).is_err());
        assert!(ensure_can_manage(&Actor::new("admin", UserRole::Admin), &station).is_ok());
        // A driver id that happens to match never grants management rights.
        assert!(ensure_can_manage(&Actor::new("op-1", UserRole::User), &station).is_err());
    }

    #[test]
    fn self_or_admin() {
        assert!(ensure_self_or_admin(&Actor::new("u", UserRole::User), "u").is_ok());
        assert!(matches!(
            ensure_self_or_admin(&Actor::new("u", UserRole::User), "v"),
            Err(DomainError::Forbidden(_))
        ));
        assert!(ensure_self_or_admin(&Actor::new("a", UserRole::Admin), "v").is_ok());
    }
}
