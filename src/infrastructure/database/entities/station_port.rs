//! Station port entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "station_ports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub station_id: String,

    /// Port number, unique within the station
    #[sea_orm(primary_key, auto_increment = false)]
    pub port_id: i32,

    /// e.g. "Fast DC", "CCS2", "Normal AC"
    pub port_type: String,

    /// kW
    pub power: f64,

    /// available / busy / offline
    pub status: String,

    /// Price per kWh
    pub price: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::StationId",
        to = "super::station::Column::Id"
    )]
    Station,
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Station.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
