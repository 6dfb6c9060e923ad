//! Platform-wide statistics and listings for administrators.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::application::names::{
    name_or, stations_by_id, user_names, UNKNOWN_OPERATOR, UNKNOWN_STATION, UNKNOWN_USER,
};
use crate::domain::review::average_rating;
use crate::domain::{
    ChargingSession, DomainResult, RecordScope, RepositoryProvider, ReviewFilter, Station,
    Transaction, TransactionType, UserRole,
};
use crate::shared::{round_energy, round_money, round_to};

/// Growth figures the dashboard shows but the platform does not track yet.
const REVENUE_GROWTH: f64 = 18.3;
const STATION_GROWTH: f64 = 8.7;
const ENERGY_GROWTH: f64 = 15.2;
const RATING_TREND: &str = "+0.2";

const WINDOW_DAYS: i64 = 30;
const REVENUE_WINDOWS: i64 = 6;
const TOP_CITIES: u64 = 6;
const RECENT_PER_KIND: u64 = 3;
const RECENT_TOTAL: usize = 8;
const LOW_RATING: f64 = 3.5;
const FEEDBACK_STATIONS: u64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyGrowth {
    pub users: f64,
    pub revenue: f64,
    pub stations: f64,
    pub energy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthRevenue {
    pub month: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityCount {
    pub city: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: String,
    pub action: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_operators: u64,
    pub total_stations: u64,
    pub total_revenue: f64,
    pub active_chargers: u64,
    pub total_energy: f64,
    pub monthly_growth: MonthlyGrowth,
    pub revenue_by_month: Vec<MonthRevenue>,
    pub stations_by_city: Vec<CityCount>,
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationRating {
    pub id: String,
    pub name: String,
    pub rating: f64,
    pub reviews: i32,
}

impl From<Station> for StationRating {
    fn from(s: Station) -> Self {
        Self {
            id: s.id,
            name: s.name,
            rating: s.rating,
            reviews: s.total_reviews,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackStats {
    pub total_reviews: u64,
    pub average_rating: f64,
    pub reviews_this_month: u64,
    pub rating_trend: String,
    pub top_rated_stations: Vec<StationRating>,
    pub low_rated_stations: Vec<StationRating>,
}

#[derive(Debug, Clone)]
pub struct AdminSessionView {
    pub session: ChargingSession,
    pub user_name: String,
    pub station_name: String,
    pub operator_id: Option<String>,
    pub operator_name: String,
}

#[derive(Debug, Clone)]
pub struct TransactionView {
    pub transaction: Transaction,
    pub user_name: String,
}

/// `(current - previous) / max(previous, 1) * 100`, to one decimal.
pub fn growth_percent(current: u64, previous: u64) -> f64 {
    round_to(
        (current as f64 - previous as f64) / previous.max(1) as f64 * 100.0,
        1,
    )
}

/// Charging revenue in consecutive 30-day windows ending at `now`, oldest
/// first, labelled with the abbreviated month of each window's start.
pub fn revenue_by_window(charges: &[Transaction], now: DateTime<Utc>) -> Vec<MonthRevenue> {
    (0..REVENUE_WINDOWS)
        .map(|i| {
            let start = now - Duration::days(WINDOW_DAYS * (REVENUE_WINDOWS - i));
            let end = now - Duration::days(WINDOW_DAYS * (REVENUE_WINDOWS - 1 - i));
            let revenue: f64 = charges
                .iter()
                .filter(|t| t.transaction_type == TransactionType::Charging)
                .filter(|t| t.timestamp >= start && t.timestamp < end)
                .map(|t| t.amount)
                .sum();
            MonthRevenue {
                month: start.format("%b").to_string(),
                revenue: round_money(revenue),
            }
        })
        .collect()
}

pub struct AdminService {
    repos: Arc<dyn RepositoryProvider>,
}

impl AdminService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn stats(&self) -> DomainResult<AdminStats> {
        let repos = self.repos.as_ref();
        let now = Utc::now();

        let charges = repos.transactions().list_by_type(TransactionType::Charging).await?;
        let total_revenue: f64 = charges
            .iter()
            .filter(|t| t.is_completed())
            .map(|t| t.amount)
            .sum();
        let total_energy: f64 = repos
            .sessions()
            .list_completed()
            .await?
            .iter()
            .map(|s| s.energy_delivered)
            .sum();

        let month_ago = now - Duration::days(WINDOW_DAYS);
        let two_months_ago = now - Duration::days(2 * WINDOW_DAYS);
        let recent_users = repos.users().count_created_between(month_ago, now).await?;
        let previous_users = repos
            .users()
            .count_created_between(two_months_ago, month_ago)
            .await?;

        let stations_by_city = repos
            .stations()
            .count_by_city(TOP_CITIES)
            .await?
            .into_iter()
            .map(|(city, count)| CityCount { city, count })
            .collect();

        Ok(AdminStats {
            total_users: repos.users().count_by_role(UserRole::User).await?,
            total_operators: repos.users().count_by_role(UserRole::Operator).await?,
            total_stations: repos.stations().count().await?,
            total_revenue: round_money(total_revenue),
            active_chargers: repos.stations().count_active_ports().await?,
            total_energy: round_energy(total_energy),
            monthly_growth: MonthlyGrowth {
                users: growth_percent(recent_users, previous_users),
                revenue: REVENUE_GROWTH,
                stations: STATION_GROWTH,
                energy: ENERGY_GROWTH,
            },
            revenue_by_month: revenue_by_window(&charges, now),
            stations_by_city,
            recent_activity: self.recent_activity().await?,
        })
    }

    /// Newest sign-ups, stations and payments, merged newest first.
    async fn recent_activity(&self) -> DomainResult<Vec<Activity>> {
        let repos = self.repos.as_ref();
        let mut activity = Vec::new();

        for user in repos.users().latest(RECENT_PER_KIND).await? {
            activity.push(Activity {
                id: format!("user-{}", user.id),
                action: "New user registered".into(),
                user: user.display_name().to_string(),
                timestamp: user.created_at,
            });
        }
        for station in repos.stations().latest(RECENT_PER_KIND).await? {
            activity.push(Activity {
                id: format!("station-{}", station.id),
                action: "New station registered".into(),
                user: station.name,
                timestamp: station.created_at,
            });
        }
        for tx in repos.transactions().latest(RECENT_PER_KIND).await? {
            activity.push(Activity {
                id: format!("transaction-{}", tx.id),
                action: "Payment processed".into(),
                user: "System".into(),
                timestamp: tx.timestamp,
            });
        }

        activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        activity.truncate(RECENT_TOTAL);
        Ok(activity)
    }

    /// Every session with driver, station and operator names attached.
    pub async fn sessions(&self) -> DomainResult<Vec<AdminSessionView>> {
        let repos = self.repos.as_ref();
        let sessions = repos.sessions().list(&RecordScope::All).await?;
        let stations = stations_by_id(repos, sessions.iter().map(|s| s.station_id.clone())).await?;
        let users = user_names(
            repos,
            sessions
                .iter()
                .map(|s| s.user_id.clone())
                .chain(stations.values().map(|s| s.operator_id.clone())),
        )
        .await?;

        Ok(sessions
            .into_iter()
            .map(|session| {
                let station = stations.get(&session.station_id);
                let operator_id = station.map(|s| s.operator_id.clone());
                AdminSessionView {
                    user_name: name_or(&users, &session.user_id, UNKNOWN_USER),
                    station_name: station
                        .map(|s| s.name.clone())
                        .unwrap_or_else(|| UNKNOWN_STATION.to_string()),
                    operator_name: operator_id
                        .as_deref()
                        .map(|id| name_or(&users, id, UNKNOWN_OPERATOR))
                        .unwrap_or_else(|| UNKNOWN_OPERATOR.to_string()),
                    operator_id,
                    session,
                }
            })
            .collect())
    }

    pub async fn transactions(&self) -> DomainResult<Vec<TransactionView>> {
        let repos = self.repos.as_ref();
        let transactions = repos.transactions().list(&RecordScope::All).await?;
        let users = user_names(repos, transactions.iter().map(|t| t.user_id.clone())).await?;
        Ok(transactions
            .into_iter()
            .map(|transaction| TransactionView {
                user_name: name_or(&users, &transaction.user_id, UNKNOWN_USER),
                transaction,
            })
            .collect())
    }

    pub async fn feedback_stats(&self) -> DomainResult<FeedbackStats> {
        let repos = self.repos.as_ref();
        let reviews = repos.reviews().list(&ReviewFilter::default(), None).await?;
        let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
        let month_ago = Utc::now() - Duration::days(WINDOW_DAYS);

        Ok(FeedbackStats {
            total_reviews: reviews.len() as u64,
            average_rating: average_rating(&ratings),
            reviews_this_month: reviews.iter().filter(|r| r.timestamp >= month_ago).count() as u64,
            rating_trend: RATING_TREND.to_string(),
            top_rated_stations: repos
                .stations()
                .top_rated(FEEDBACK_STATIONS)
                .await?
                .into_iter()
                .map(StationRating::from)
                .collect(),
            low_rated_stations: repos
                .stations()
                .rated_below(LOW_RATING, FEEDBACK_STATIONS)
                .await?
                .into_iter()
                .map(StationRating::from)
                .collect(),
        })
    }
}
