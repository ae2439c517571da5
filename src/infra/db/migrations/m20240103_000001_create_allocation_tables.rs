//! Migration: Create room_requests and room_allocations tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240102_000001_create_hostels_and_rooms::Rooms;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoomRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoomRequests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RoomRequests::UserId).uuid().not_null())
                    .col(ColumnDef::new(RoomRequests::PreferredRoomType).string_len(32).null())
                    .col(ColumnDef::new(RoomRequests::PreferredFloor).integer().null())
                    .col(
                        ColumnDef::new(RoomRequests::PriorityScore)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RoomRequests::Notes).text().null())
                    .col(
                        ColumnDef::new(RoomRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(RoomRequests::RequestedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoomRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_requests_user")
                            .from(RoomRequests::Table, RoomRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_requests_status")
                    .table(RoomRequests::Table)
                    .col(RoomRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoomAllocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomAllocations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomAllocations::UserId).uuid().not_null())
                    .col(ColumnDef::new(RoomAllocations::RoomId).uuid().not_null())
                    .col(ColumnDef::new(RoomAllocations::RequestId).uuid().null())
                    .col(ColumnDef::new(RoomAllocations::AllocatedBy).uuid().null())
                    .col(
                        ColumnDef::new(RoomAllocations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoomAllocations::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_allocations_user")
                            .from(RoomAllocations::Table, RoomAllocations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_allocations_room")
                            .from(RoomAllocations::Table, RoomAllocations::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_allocations_request")
                            .from(RoomAllocations::Table, RoomAllocations::RequestId)
                            .to(RoomRequests::Table, RoomRequests::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_allocations_room")
                    .table(RoomAllocations::Table)
                    .col(RoomAllocations::RoomId)
                    .col(RoomAllocations::EndDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoomAllocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoomRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RoomRequests {
    Table,
    Id,
    UserId,
    PreferredRoomType,
    PreferredFloor,
    PriorityScore,
    Notes,
    Status,
    RequestedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RoomAllocations {
    Table,
    Id,
    UserId,
    RoomId,
    RequestId,
    AllocatedBy,
    CreatedAt,
    EndDate,
}
