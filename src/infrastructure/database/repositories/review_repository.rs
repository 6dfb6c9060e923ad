//! SeaORM implementation of ReviewRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::{conflict_or_db_err, db_err};
use crate::domain::review::{Review, ReviewFilter, ReviewRepository, ALREADY_REVIEWED};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::review;

pub struct SeaOrmReviewRepository {
    db: DatabaseConnection,
}

impl SeaOrmReviewRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: review::Model) -> Review {
    Review {
        id: m.id,
        station_id: m.station_id,
        user_id: m.user_id,
        session_id: m.session_id,
        rating: m.rating,
        comment: m.comment,
        helpful: m.helpful,
        timestamp: m.timestamp,
    }
}

#[async_trait]
impl ReviewRepository for SeaOrmReviewRepository {
    async fn create(&self, r: &Review) -> DomainResult<()> {
        let model = review::ActiveModel {
            id: Set(r.id.clone()),
            station_id: Set(r.station_id.clone()),
            user_id: Set(r.user_id.clone()),
            session_id: Set(r.session_id.clone()),
            rating: Set(r.rating),
            comment: Set(r.comment.clone()),
            helpful: Set(r.helpful),
            timestamp: Set(r.timestamp),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_db_err(e, ALREADY_REVIEWED))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Review>> {
        let model = review::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(&self, filter: &ReviewFilter, limit: Option<u64>) -> DomainResult<Vec<Review>> {
        let mut query = review::Entity::find();
        if let Some(rating) = filter.rating {
            query = query.filter(review::Column::Rating.eq(rating));
        }
        if let Some(station_id) = filter.station_id.as_deref() {
            query = query.filter(review::Column::StationId.eq(station_id));
        }
        if let Some(user_id) = filter.user_id.as_deref() {
            query = query.filter(review::Column::UserId.eq(user_id));
        }
        let models = query
            .order_by_desc(review::Column::Timestamp)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn ratings_for_station(&self, station_id: &str) -> DomainResult<Vec<i32>> {
        review::Entity::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::StationId.eq(station_id))
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn increment_helpful(&self, id: &str) -> DomainResult<bool> {
        let result = review::Entity::update_many()
            .col_expr(
                review::Column::Helpful,
                Expr::col(review::Column::Helpful).add(1),
            )
            .filter(review::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;
    use crate::domain::DomainError;
    use crate::infrastructure::database::testing::{create_station, create_user, test_repos};

    #[tokio::test]
    async fn one_review_per_user_and_station() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        let u = create_user(repos.as_ref(), "u@x.io", UserRole::User).await;
        let s = create_station(repos.as_ref(), &op.id).await;

        repos
            .reviews()
            .create(&Review::new(&s.id, &u.id, 4, "Good"))
            .await
            .unwrap();
        let err = repos
            .reviews()
            .create(&Review::new(&s.id, &u.id, 1, "Changed my mind"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repos.reviews().ratings_for_station(&s.id).await.unwrap(), vec![4]);
    }

    #[tokio::test]
    async fn filters_limit_and_helpful_counter() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        let u1 = create_user(repos.as_ref(), "u1@x.io", UserRole::User).await;
        let u2 = create_user(repos.as_ref(), "u2@x.io", UserRole::User).await;
        let s = create_station(repos.as_ref(), &op.id).await;

        let r1 = Review::new(&s.id, &u1.id, 5, "Great");
        let r2 = Review::new(&s.id, &u2.id, 2, "Slow");
        repos.reviews().create(&r1).await.unwrap();
        repos.reviews().create(&r2).await.unwrap();

        let fives = repos
            .reviews()
            .list(
                &ReviewFilter {
                    rating: Some(5),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(fives.len(), 1);
        assert_eq!(fives[0].id, r1.id);

        let capped = repos
            .reviews()
            .list(&ReviewFilter::default(), Some(1))
            .await
            .unwrap();
        assert_eq!(capped.len(), 1);

        assert!(repos.reviews().increment_helpful(&r2.id).await.unwrap());
        assert!(repos.reviews().increment_helpful(&r2.id).await.unwrap());
        assert!(!repos.reviews().increment_helpful("missing").await.unwrap());
        let stored = repos.reviews().find_by_id(&r2.id).await.unwrap().unwrap();
        assert_eq!(stored.helpful, 2);
    }
}
