use std::env;

use anyhow::Result;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
/// Only the database path matters for this tool; analysis parameters
/// come from CLI flags, not the environment.
pub struct Config {
    pub db_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// WEFT_DB_PATH defaults to ./weft.db in the working directory.
    pub fn load() -> Result<Self> {
        Ok(Self {
            db_path: env::var("WEFT_DB_PATH").unwrap_or_else(|_| "./weft.db".to_string()),
        })
    }
}
