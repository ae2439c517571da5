//! Database migrations.
//!
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240102_000001_create_hostels_and_rooms;
mod m20240103_000001_create_allocation_tables;
mod m20240104_000001_create_student_services;
mod m20240105_000001_add_single_open_request_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240102_000001_create_hostels_and_rooms::Migration),
            Box::new(m20240103_000001_create_allocation_tables::Migration),
            Box::new(m20240104_000001_create_student_services::Migration),
            Box::new(m20240105_000001_add_single_open_request_indexes::Migration),
        ]
    }
}
