//! Create station_ports table

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_stations::Stations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StationPorts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StationPorts::StationId).string().not_null())
                    .col(ColumnDef::new(StationPorts::PortId).integer().not_null())
                    .col(ColumnDef::new(StationPorts::PortType).string().not_null())
                    .col(
                        ColumnDef::new(StationPorts::Power)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(StationPorts::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(StationPorts::Price)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .primary_key(
                        Index::create()
                            .col(StationPorts::StationId)
                            .col(StationPorts::PortId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_station_ports_station")
                            .from(StationPorts::Table, StationPorts::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StationPorts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum StationPorts {
    Table,
    StationId,
    PortId,
    PortType,
    Power,
    Status,
    Price,
}
