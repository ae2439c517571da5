//! Migration: One open room request and one active allocation per student.
//!
//! Partial unique indexes, so the database rejects the second insert when
//! two submissions or two approvals race past the service checks.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const OPEN_REQUEST_INDEX: &str = "uq_room_requests_open_per_user";
const ACTIVE_ALLOCATION_INDEX: &str = "uq_room_allocations_active_per_user";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {OPEN_REQUEST_INDEX} \
             ON room_requests (user_id) WHERE status IN ('pending', 'waitlisted')"
        ))
        .await?;

        db.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {ACTIVE_ALLOCATION_INDEX} \
             ON room_allocations (user_id) WHERE end_date IS NULL"
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for index in [ACTIVE_ALLOCATION_INDEX, OPEN_REQUEST_INDEX] {
            db.execute_unprepared(&format!("DROP INDEX IF EXISTS {index}"))
                .await?;
        }
        Ok(())
    }
}
