//! SeaORM implementation of NotificationRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::db_err;
use crate::domain::notification::{Notification, NotificationRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::notification;

pub struct SeaOrmNotificationRepository {
    db: DatabaseConnection,
}

impl SeaOrmNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: notification::Model) -> Notification {
    Notification {
        id: m.id,
        user_id: m.user_id,
        kind: m.kind,
        title: m.title,
        message: m.message,
        action_url: m.action_url,
        read: m.is_read,
        timestamp: m.timestamp,
    }
}

pub(crate) fn notification_to_active(n: &Notification) -> notification::ActiveModel {
    notification::ActiveModel {
        id: Set(n.id.clone()),
        user_id: Set(n.user_id.clone()),
        kind: Set(n.kind.clone()),
        title: Set(n.title.clone()),
        message: Set(n.message.clone()),
        action_url: Set(n.action_url.clone()),
        is_read: Set(n.read),
        timestamp: Set(n.timestamp),
    }
}

#[async_trait]
impl NotificationRepository for SeaOrmNotificationRepository {
    async fn create(&self, n: &Notification) -> DomainResult<()> {
        notification_to_active(n)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Notification>> {
        let model = notification::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<Notification>> {
        let models = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::Timestamp)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn mark_read(&self, id: &str) -> DomainResult<()> {
        notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn mark_all_read(&self, user_id: &str) -> DomainResult<u64> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        notification::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn count_unread(&self, user_id: &str) -> DomainResult<u64> {
        notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;
    use crate::infrastructure::database::testing::{create_user, test_repos};

    #[tokio::test]
    async fn read_state_and_counts() {
        let repos = test_repos().await;
        let u = create_user(repos.as_ref(), "u@x.io", UserRole::User).await;
        let a = Notification::charging_complete(&u.id, 3.0);
        let b = Notification::booking_confirmed(&u.id, "Hub", "2025-03-01", "08:00 - 09:00");
        repos.notifications().create(&a).await.unwrap();
        repos.notifications().create(&b).await.unwrap();

        assert_eq!(repos.notifications().count_unread(&u.id).await.unwrap(), 2);
        repos.notifications().mark_read(&a.id).await.unwrap();
        assert_eq!(repos.notifications().count_unread(&u.id).await.unwrap(), 1);
        assert_eq!(repos.notifications().mark_all_read(&u.id).await.unwrap(), 1);
        assert_eq!(repos.notifications().mark_all_read(&u.id).await.unwrap(), 0);

        repos.notifications().delete(&b.id).await.unwrap();
        let left = repos.notifications().list_for_user(&u.id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert!(left[0].read);
    }
}
