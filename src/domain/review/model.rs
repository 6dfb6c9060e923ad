//! Station review domain entity

use chrono::{DateTime, Utc};

use crate::shared::round_to;

pub const ALREADY_REVIEWED: &str = "You have already reviewed this station";

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone)]
pub struct Review {
    pub id: String,
    pub station_id: String,
    pub user_id: String,
    pub session_id: Option<String>,
    /// 1..=5 stars
    pub rating: i32,
    pub comment: String,
    /// How many readers marked the review helpful
    pub helpful: i32,
    pub timestamp: DateTime<Utc>,
}

impl Review {
    pub fn new(
        station_id: impl Into<String>,
        user_id: impl Into<String>,
        rating: i32,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            station_id: station_id.into(),
            user_id: user_id.into(),
            session_id: None,
            rating,
            comment: comment.into(),
            helpful: 0,
            timestamp: Utc::now(),
        }
    }
}

pub fn is_valid_rating(rating: i32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// Mean rating to one decimal place; 0 when there are no ratings.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    round_to(sum as f64 / ratings.len() as f64, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_ratings() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[5, 4, 4]), 4.3);
        assert_eq!(average_rating(&[1]), 1.0);
    }

    #[test]
    fn rating_bounds() {
        assert!(is_valid_rating(1));
        assert!(is_valid_rating(5));
        assert!(!is_valid_rating(0));
        assert!(!is_valid_rating(6));
    }
}
