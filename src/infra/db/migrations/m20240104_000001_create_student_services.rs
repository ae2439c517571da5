//! Migration: Create complaints, leave_requests, payments and notifications tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Foreign key from `table.user_id` to `users.id`, removed with the user.
fn user_fk<T: Iden + 'static>(name: &str, table: T, column: T) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn timestamp<T: Iden + 'static>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaints::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Complaints::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Complaints::UserId).uuid().not_null())
                    .col(ColumnDef::new(Complaints::Title).string().not_null())
                    .col(ColumnDef::new(Complaints::Description).text().not_null())
                    .col(ColumnDef::new(Complaints::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Complaints::Priority).string_len(16).not_null())
                    .col(ColumnDef::new(Complaints::Status).string_len(16).not_null())
                    .col(&mut timestamp(Complaints::CreatedAt))
                    .col(&mut timestamp(Complaints::UpdatedAt))
                    .col(
                        ColumnDef::new(Complaints::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_complaints_user",
                        Complaints::Table,
                        Complaints::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeaveRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LeaveRequests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LeaveRequests::UserId).uuid().not_null())
                    .col(ColumnDef::new(LeaveRequests::Reason).text().not_null())
                    .col(ColumnDef::new(LeaveRequests::StartDate).date().not_null())
                    .col(ColumnDef::new(LeaveRequests::EndDate).date().not_null())
                    .col(ColumnDef::new(LeaveRequests::Status).string_len(16).not_null())
                    .col(ColumnDef::new(LeaveRequests::ReviewedBy).uuid().null())
                    .col(&mut timestamp(LeaveRequests::CreatedAt))
                    .col(&mut timestamp(LeaveRequests::UpdatedAt))
                    .foreign_key(&mut user_fk(
                        "fk_leave_requests_user",
                        LeaveRequests::Table,
                        LeaveRequests::UserId,
                    ))
                    .check(Expr::col(LeaveRequests::EndDate).gte(Expr::col(LeaveRequests::StartDate)))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payments::UserId).uuid().not_null())
                    .col(ColumnDef::new(Payments::Amount).double().not_null())
                    .col(ColumnDef::new(Payments::Description).string().null())
                    .col(ColumnDef::new(Payments::DueDate).date().not_null())
                    .col(ColumnDef::new(Payments::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Payments::PaidDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Payments::Reference).string().null())
                    .col(&mut timestamp(Payments::CreatedAt))
                    .col(&mut timestamp(Payments::UpdatedAt))
                    .foreign_key(&mut user_fk(
                        "fk_payments_user",
                        Payments::Table,
                        Payments::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notifications::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notifications::UserId).uuid().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(&mut timestamp(Notifications::CreatedAt))
                    .foreign_key(&mut user_fk(
                        "fk_notifications_user",
                        Notifications::Table,
                        Notifications::UserId,
                    ))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Notifications::Table.into_iden(),
            Payments::Table.into_iden(),
            LeaveRequests::Table.into_iden(),
            Complaints::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Complaints {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Category,
    Priority,
    Status,
    CreatedAt,
    UpdatedAt,
    ResolvedAt,
}

#[derive(Iden)]
enum LeaveRequests {
    Table,
    Id,
    UserId,
    Reason,
    StartDate,
    EndDate,
    Status,
    ReviewedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    UserId,
    Amount,
    Description,
    DueDate,
    Status,
    PaidDate,
    Reference,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Kind,
    Title,
    Message,
    Read,
    CreatedAt,
}
