//! Database configuration module for the scheduling engine.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{
    BreakSchedule, GenerationLog, Room, SchoolTiming, TeacherAvailability, Timetable,
    TimetableConflict, TimetablePeriod,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/timetabler.sqlite".to_string())
}

/// Establishes a connection to the database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
/// This function handles connection errors and provides a clean interface for database access
/// throughout the engine.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct
/// definitions. The unique index on `timetable_conflicts.dedup_key` is part of the entity
/// definition and is what makes conflict re-scans idempotent.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let school_timing_table = schema.create_table_from_entity(SchoolTiming);
    let break_schedule_table = schema.create_table_from_entity(BreakSchedule);
    let room_table = schema.create_table_from_entity(Room);
    let availability_table = schema.create_table_from_entity(TeacherAvailability);
    let timetable_table = schema.create_table_from_entity(Timetable);
    let period_table = schema.create_table_from_entity(TimetablePeriod);
    let conflict_table = schema.create_table_from_entity(TimetableConflict);
    let generation_log_table = schema.create_table_from_entity(GenerationLog);

    db.execute(builder.build(&school_timing_table)).await?;
    db.execute(builder.build(&break_schedule_table)).await?;
    db.execute(builder.build(&room_table)).await?;
    db.execute(builder.build(&availability_table)).await?;
    db.execute(builder.build(&timetable_table)).await?;
    db.execute(builder.build(&period_table)).await?;
    db.execute(builder.build(&conflict_table)).await?;
    db.execute(builder.build(&generation_log_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        room::Model as RoomModel, timetable::Model as TimetableModel,
        timetable_conflict::Model as ConflictModel, timetable_period::Model as PeriodModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<RoomModel> = Room::find().limit(1).all(&db).await?;
        let _: Vec<TimetableModel> = Timetable::find().limit(1).all(&db).await?;
        let _: Vec<PeriodModel> = TimetablePeriod::find().limit(1).all(&db).await?;
        let _: Vec<ConflictModel> = TimetableConflict::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_database_url_default() {
        // Without DATABASE_URL the default local path is used
        if std::env::var("DATABASE_URL").is_err() {
            assert!(get_database_url().starts_with("sqlite://"));
        }
    }
}
