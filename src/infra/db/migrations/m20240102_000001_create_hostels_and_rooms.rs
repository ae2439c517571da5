//! Migration: Create hostels and rooms tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hostels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Hostels::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Hostels::Name).string().not_null())
                    .col(ColumnDef::new(Hostels::AddressLine).string().not_null())
                    .col(ColumnDef::new(Hostels::City).string().not_null())
                    .col(ColumnDef::new(Hostels::State).string().not_null())
                    .col(ColumnDef::new(Hostels::Pincode).string_len(6).not_null())
                    .col(ColumnDef::new(Hostels::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(Hostels::CurrentOccupancy)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Hostels::Amenities).json_binary().not_null())
                    .col(ColumnDef::new(Hostels::Rules).json_binary().not_null())
                    .col(ColumnDef::new(Hostels::RoomTypes).text().not_null())
                    .col(
                        ColumnDef::new(Hostels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Hostels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rooms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Rooms::HostelId).uuid().not_null())
                    .col(ColumnDef::new(Rooms::RoomNumber).string_len(16).not_null())
                    .col(ColumnDef::new(Rooms::Floor).integer().not_null())
                    .col(ColumnDef::new(Rooms::RoomType).string_len(32).not_null())
                    .col(ColumnDef::new(Rooms::Capacity).integer().not_null())
                    .col(ColumnDef::new(Rooms::Occupied).integer().not_null().default(0))
                    .col(ColumnDef::new(Rooms::Price).double().not_null())
                    .col(ColumnDef::new(Rooms::Amenities).json_binary().not_null())
                    .col(
                        ColumnDef::new(Rooms::Status)
                            .string_len(16)
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rooms_hostel")
                            .from(Rooms::Table, Rooms::HostelId)
                            .to(Hostels::Table, Hostels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .check(Expr::col(Rooms::Occupied).gte(0))
                    .check(Expr::col(Rooms::Occupied).lte(Expr::col(Rooms::Capacity)))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_hostel_number")
                    .table(Rooms::Table)
                    .col(Rooms::HostelId)
                    .col(Rooms::RoomNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_status")
                    .table(Rooms::Table)
                    .col(Rooms::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hostels::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Hostels {
    Table,
    Id,
    Name,
    AddressLine,
    City,
    State,
    Pincode,
    Capacity,
    CurrentOccupancy,
    Amenities,
    Rules,
    RoomTypes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Rooms {
    Table,
    Id,
    HostelId,
    RoomNumber,
    Floor,
    RoomType,
    Capacity,
    Occupied,
    Price,
    Amenities,
    Status,
    CreatedAt,
    UpdatedAt,
}
