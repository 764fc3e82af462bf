//! # TutorSync Store
//!
//! Store implementations for the booking engine's
//! [`AppointmentStore`](tutorsync_core::engine::AppointmentStore)
//! contract:
//!
//! - [`postgres::PgStore`] — production store on PostgreSQL via sqlx.
//!   Occupancy mutations are guarded UPDATEs whose predicates re-check
//!   the booking preconditions, giving per-appointment compare-and-swap.
//! - [`memory::MemoryStore`] — in-process store with version-checked
//!   compare-and-swap, used by the test suites and for local development
//!   without a database.

pub mod memory;
pub mod models;
pub mod postgres;
pub mod repositories;
pub mod schema;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
