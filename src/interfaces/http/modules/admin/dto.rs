use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::dashboards::{
    Activity, AdminSessionView, AdminStats, CityCount, FeedbackStats, MonthRevenue,
    MonthlyGrowth, StationRating, TransactionView,
};
use crate::domain::ReviewFilter;
use crate::interfaces::http::modules::sessions::SessionDto;
use crate::interfaces::http::modules::transactions::TransactionDto;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlyGrowthDto {
    pub users: f64,
    pub revenue: f64,
    pub stations: f64,
    pub energy: f64,
}

impl From<MonthlyGrowth> for MonthlyGrowthDto {
    fn from(g: MonthlyGrowth) -> Self {
        Self {
            users: g.users,
            revenue: g.revenue,
            stations: g.stations,
            energy: g.energy,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthRevenueDto {
    /// Short month name of the window start, e.g. `Mar`
    pub month: String,
    pub revenue: f64,
}

impl From<MonthRevenue> for MonthRevenueDto {
    fn from(m: MonthRevenue) -> Self {
        Self {
            month: m.month,
            revenue: m.revenue,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CityCountDto {
    pub city: String,
    pub count: u64,
}

impl From<CityCount> for CityCountDto {
    fn from(c: CityCount) -> Self {
        Self {
            city: c.city,
            count: c.count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityDto {
    pub id: String,
    pub action: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Activity> for ActivityDto {
    fn from(a: Activity) -> Self {
        Self {
            id: a.id,
            action: a.action,
            user: a.user,
            timestamp: a.timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsDto {
    pub total_users: u64,
    pub total_operators: u64,
    pub total_stations: u64,
    pub total_revenue: f64,
    pub active_chargers: u64,
    pub total_energy: f64,
    pub monthly_growth: MonthlyGrowthDto,
    pub revenue_by_month: Vec<MonthRevenueDto>,
    pub stations_by_city: Vec<CityCountDto>,
    pub recent_activity: Vec<ActivityDto>,
}

impl From<AdminStats> for AdminStatsDto {
    fn from(s: AdminStats) -> Self {
        Self {
            total_users: s.total_users,
            total_operators: s.total_operators,
            total_stations: s.total_stations,
            total_revenue: s.total_revenue,
            active_chargers: s.active_chargers,
            total_energy: s.total_energy,
            monthly_growth: s.monthly_growth.into(),
            revenue_by_month: s.revenue_by_month.into_iter().map(Into::into).collect(),
            stations_by_city: s.stations_by_city.into_iter().map(Into::into).collect(),
            recent_activity: s.recent_activity.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionDto {
    #[serde(flatten)]
    pub session: SessionDto,
    pub user_name: String,
    pub operator_id: Option<String>,
    pub operator_name: String,
}

impl From<AdminSessionView> for AdminSessionDto {
    fn from(v: AdminSessionView) -> Self {
        let mut session = SessionDto::from(v.session);
        session.station_name = Some(v.station_name);
        Self {
            session,
            user_name: v.user_name,
            operator_id: v.operator_id,
            operator_name: v.operator_name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminTransactionDto {
    #[serde(flatten)]
    pub transaction: TransactionDto,
    pub user_name: String,
}

impl From<TransactionView> for AdminTransactionDto {
    fn from(v: TransactionView) -> Self {
        Self {
            transaction: v.transaction.into(),
            user_name: v.user_name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StationRatingDto {
    pub id: String,
    pub name: String,
    pub rating: f64,
    pub reviews: i32,
}

impl From<StationRating> for StationRatingDto {
    fn from(r: StationRating) -> Self {
        Self {
            id: r.id,
            name: r.name,
            rating: r.rating,
            reviews: r.reviews,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStatsDto {
    pub total_reviews: u64,
    pub average_rating: f64,
    pub reviews_this_month: u64,
    pub rating_trend: String,
    pub top_rated_stations: Vec<StationRatingDto>,
    pub low_rated_stations: Vec<StationRatingDto>,
}

impl From<FeedbackStats> for FeedbackStatsDto {
    fn from(s: FeedbackStats) -> Self {
        Self {
            total_reviews: s.total_reviews,
            average_rating: s.average_rating,
            reviews_this_month: s.reviews_this_month,
            rating_trend: s.rating_trend,
            top_rated_stations: s.top_rated_stations.into_iter().map(Into::into).collect(),
            low_rated_stations: s.low_rated_stations.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    /// `user`, `operator` or `admin`
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReviewListParams {
    pub rating: Option<i32>,
    pub station_id: Option<String>,
}

impl From<ReviewListParams> for ReviewFilter {
    fn from(p: ReviewListParams) -> Self {
        Self {
            rating: p.rating,
            station_id: p.station_id.filter(|s| !s.is_empty()),
            user_id: None,
        }
    }
}
