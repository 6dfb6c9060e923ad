//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use super::{conflict_or_db_err, contains_ci, db_err};
use crate::domain::user::{User, UserRepository, UserRole};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Operator => UserRole::Operator,
        user::UserRole::User => UserRole::User,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Operator => user::UserRole::Operator,
        UserRole::User => user::UserRole::User,
    }
}

fn model_to_domain(m: user::Model) -> User {
    User {
        id: m.id,
        email: m.email,
        password_hash: m.password_hash,
        name: m.name,
        role: entity_role_to_domain(m.role),
        phone: m.phone,
        avatar: m.avatar,
        profile_image: m.profile_image,
        vehicle: m.vehicle,
        company: m.company,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

// ── UserRepository impl ─────────────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, u: User) -> DomainResult<()> {
        debug!(user_id = %u.id, "Creating user");

        let model = user::ActiveModel {
            id: Set(u.id),
            email: Set(u.email),
            password_hash: Set(u.password_hash),
            name: Set(u.name),
            role: Set(domain_role_to_entity(u.role)),
            phone: Set(u.phone),
            avatar: Set(u.avatar),
            profile_image: Set(u.profile_image),
            vehicle: Set(u.vehicle),
            company: Set(u.company),
            is_active: Set(u.is_active),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_db_err(e, "Email already registered"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list(&self, role: Option<UserRole>) -> DomainResult<Vec<User>> {
        let mut query = user::Entity::find();
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(domain_role_to_entity(role)));
        }
        let models = query
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn search(&self, q: &str, role: Option<UserRole>) -> DomainResult<Vec<User>> {
        let mut query = user::Entity::find().filter(
            Condition::any()
                .add(contains_ci(user::Column::Name, q))
                .add(contains_ci(user::Column::Email, q)),
        );
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(domain_role_to_entity(role)));
        }
        let models = query
            .order_by_asc(user::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, u: &User) -> DomainResult<()> {
        debug!(user_id = %u.id, "Updating user profile");

        user::Entity::update_many()
            .col_expr(user::Column::Name, Expr::value(u.name.clone()))
            .col_expr(user::Column::Phone, Expr::value(u.phone.clone()))
            .col_expr(user::Column::Avatar, Expr::value(u.avatar.clone()))
            .col_expr(user::Column::ProfileImage, Expr::value(u.profile_image.clone()))
            .col_expr(user::Column::Vehicle, Expr::value(u.vehicle.clone()))
            .col_expr(user::Column::Company, Expr::value(u.company.clone()))
            .col_expr(user::Column::UpdatedAt, Expr::value(u.updated_at))
            .filter(user::Column::Id.eq(u.id.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> DomainResult<()> {
        user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_active(&self, id: &str, active: bool) -> DomainResult<bool> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::IsActive, Expr::value(active))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn count_by_role(&self, role: UserRole) -> DomainResult<u64> {
        user::Entity::find()
            .filter(user::Column::Role.eq(domain_role_to_entity(role)))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn count_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<u64> {
        user::Entity::find()
            .filter(user::Column::CreatedAt.gte(from))
            .filter(user::Column::CreatedAt.lt(to))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn latest(&self, limit: u64) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::database::testing::test_db;
    use chrono::Duration;

    fn user(email: &str, name: &str, role: UserRole) -> User {
        User::new(email, "hash", name, role)
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = SeaOrmUserRepository::new(test_db().await);
        repo.create(user("a@x.io", "A", UserRole::User)).await.unwrap();

        let err = repo
            .create(user("a@x.io", "Other", UserRole::User))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_on_name_and_email() {
        let repo = SeaOrmUserRepository::new(test_db().await);
        repo.create(user("alice@x.io", "Alice Smith", UserRole::User))
            .await
            .unwrap();
        repo.create(user("bob@x.io", "Bob", UserRole::Operator))
            .await
            .unwrap();

        let found = repo.search("SMITH", None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "alice@x.io");

        let found = repo.search("x.io", Some(UserRole::Operator)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bob");
    }

    #[tokio::test]
    async fn search_matches_wildcards_literally() {
        let repo = SeaOrmUserRepository::new(test_db().await);
        repo.create(user("alice@x.io", "Alice Smith", UserRole::User))
            .await
            .unwrap();
        repo.create(user("dev_ops@x.io", "Dev Ops", UserRole::Operator))
            .await
            .unwrap();

        assert!(repo.search("%", None).await.unwrap().is_empty());
        assert!(repo.search("Al_ce", None).await.unwrap().is_empty());

        let found = repo.search("v_o", None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "dev_ops@x.io");
    }

    #[tokio::test]
    async fn profile_update_and_json_columns_persist() {
        let repo = SeaOrmUserRepository::new(test_db().await);
        let mut u = user("c@x.io", "Carol", UserRole::User);
        let id = u.id.clone();
        repo.create(u.clone()).await.unwrap();

        u.phone = Some("+1 555".into());
        u.vehicle = Some(serde_json::json!({"make": "Tesla", "batteryCapacity": 75}));
        repo.update(&u).await.unwrap();

        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.phone.as_deref(), Some("+1 555"));
        assert_eq!(stored.vehicle.unwrap()["batteryCapacity"], 75);
        assert_eq!(stored.role, UserRole::User);
    }

    #[tokio::test]
    async fn set_active_reports_missing_users() {
        let repo = SeaOrmUserRepository::new(test_db().await);
        let u = user("d@x.io", "D", UserRole::User);
        let id = u.id.clone();
        repo.create(u).await.unwrap();

        assert!(repo.set_active(&id, false).await.unwrap());
        assert!(!repo.find_by_id(&id).await.unwrap().unwrap().is_active);
        assert!(!repo.set_active("missing", false).await.unwrap());
    }

    #[tokio::test]
    async fn counts_by_role_and_creation_window() {
        let repo = SeaOrmUserRepository::new(test_db().await);
        let mut old = user("old@x.io", "Old", UserRole::User);
        old.created_at = Utc::now() - Duration::days(45);
        repo.create(old).await.unwrap();
        repo.create(user("new@x.io", "New", UserRole::User))
            .await
            .unwrap();
        repo.create(user("op@x.io", "Op", UserRole::Operator))
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.count_by_role(UserRole::User).await.unwrap(), 2);

        let now = Utc::now() + Duration::seconds(1);
        let recent = repo
            .count_created_between(now - Duration::days(30), now)
            .await
            .unwrap();
        assert_eq!(recent, 2);

        let latest = repo.latest(1).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_ne!(latest[0].email, "old@x.io");
    }
}
