//! Persistence layer for the Hero-Wars server.
//!
//! Saves are awaited in place: a player is only dropped from memory after
//! their rows have been written.

mod database;

pub use database::{Database, HeroRow, PlayerRow, StoredPlayer};

use log::info;

/// Connect to the database and make sure the schema exists
pub async fn init(database_url: &str) -> Result<Database, sqlx::Error> {
    let db = Database::connect(database_url).await?;
    info!("Connected to database at {}", database_url);

    db.setup().await?;
    info!("Database schema ready");

    Ok(db)
}
