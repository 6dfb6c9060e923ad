//! Station entity
//!
//! Coordinates, amenities and pricing are stored as JSON text; ports live in
//! `station_ports`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub address: String,
    pub nearby_landmark: String,
    pub city: String,
    /// `{"lat": .., "lng": ..}`
    #[sea_orm(column_type = "Json", nullable)]
    pub coordinates: Option<Json>,
    pub operator_id: String,
    /// available / busy / offline
    pub status: String,
    pub rating: f64,
    pub total_reviews: i32,
    #[sea_orm(column_type = "Json")]
    pub amenities: Json,
    pub operating_hours: String,
    #[sea_orm(column_type = "Json")]
    pub pricing: Json,
    pub peak_hours: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::station_port::Entity")]
    Ports,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OperatorId",
        to = "super::user::Column::Id"
    )]
    Operator,
}

impl Related<super::station_port::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ports.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
