use std::sync::Arc;

use tracing::info;

use crate::application::names::{name_or, user_names, UNKNOWN_USER};
use crate::domain::review::{average_rating, is_valid_rating};
use crate::domain::{
    Actor, DomainError, DomainResult, RepositoryProvider, Review, ReviewFilter,
};

#[derive(Debug, Clone)]
pub struct ReviewView {
    pub review: Review,
    pub user_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewReview {
    pub station_id: Option<String>,
    pub session_id: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

pub struct ReviewService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ReviewService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    async fn with_user_names(&self, reviews: Vec<Review>) -> DomainResult<Vec<ReviewView>> {
        let names = user_names(self.repos.as_ref(), reviews.iter().map(|r| r.user_id.clone())).await?;
        Ok(reviews
            .into_iter()
            .map(|review| ReviewView {
                user_name: name_or(&names, &review.user_id, UNKNOWN_USER),
                review,
            })
            .collect())
    }

    /// Newest first, optionally filtered by rating and station.
    pub async fn list(&self, filter: ReviewFilter) -> DomainResult<Vec<ReviewView>> {
        let reviews = self.repos.reviews().list(&filter, None).await?;
        self.with_user_names(reviews).await
    }

    pub async fn for_station(&self, station_id: &str) -> DomainResult<Vec<ReviewView>> {
        self.list(ReviewFilter {
            station_id: Some(station_id.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn for_user(&self, user_id: &str) -> DomainResult<Vec<ReviewView>> {
        self.list(ReviewFilter {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        })
        .await
    }

    /// Store a review and refresh the station's average rating.
    pub async fn create(&self, actor: &Actor, input: NewReview) -> DomainResult<Review> {
        let station_id = input
            .station_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DomainError::Validation("stationId is required".into()))?;
        let rating = input
            .rating
            .filter(|r| is_valid_rating(*r))
            .ok_or_else(|| DomainError::Validation("Rating must be between 1 and 5".into()))?;

        let station = self
            .repos
            .stations()
            .find_by_id(&station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", &station_id))?;

        let mut review = Review::new(
            &station.id,
            &actor.user_id,
            rating,
            input.comment.unwrap_or_default().trim(),
        );
        review.session_id = input.session_id.filter(|s| !s.trim().is_empty());

        // Conflict on a second review of the same station
        self.repos.reviews().create(&review).await?;

        let ratings = self.repos.reviews().ratings_for_station(&station.id).await?;
        let average = average_rating(&ratings);
        self.repos
            .stations()
            .update_rating(&station.id, average, ratings.len() as i32)
            .await?;

        info!(
            review_id = %review.id,
            station_id = %station.id,
            rating,
            station_rating = average,
            "Review added"
        );
        Ok(review)
    }

    pub async fn mark_helpful(&self, id: &str) -> DomainResult<()> {
        if !self.repos.reviews().increment_helpful(id).await? {
            return Err(DomainError::not_found("Review", id));
        }
        Ok(())
    }
}
