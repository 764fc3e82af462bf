use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use tutorsync_api::config::ApiConfig;
use tutorsync_core::engine::AppointmentStore;
use tutorsync_store::memory::MemoryStore;
use tutorsync_store::postgres::PgStore;
use tutorsync_store::{create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Select the appointment store
    let store: Arc<dyn AppointmentStore> = match &config.database_url {
        Some(database_url) => {
            let db_pool = create_pool(database_url).await?;
            initialize_database(&db_pool).await?;
            Arc::new(PgStore::new(db_pool))
        }
        None => {
            eprintln!("DATABASE_URL not set; using the in-memory store (state is not persisted)");
            Arc::new(MemoryStore::new())
        }
    };

    // Start API server
    tutorsync_api::start_server(config, store).await?;

    Ok(())
}
