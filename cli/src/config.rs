use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use meal_max_core::db::{BUNDLED_SCHEMA, StoreConfig};

const DB_PATH_ENV: &str = "MEAL_MAX_DB_PATH";
const SCHEMA_PATH_ENV: &str = "SQL_CREATE_TABLE_PATH";
const SCHEMA_FILE_NAME: &str = "create_meal_table.sql";

pub struct Config {
    pub db_path: PathBuf,
    pub schema_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "meal-max").context("Could not determine home directory")?;

        Self::resolve(
            proj_dirs.data_dir(),
            std::env::var_os(DB_PATH_ENV).map(PathBuf::from),
            std::env::var_os(SCHEMA_PATH_ENV).map(PathBuf::from),
        )
    }

    /// Fill in defaults under `data_dir` for anything not overridden. When no
    /// schema script is configured, the bundled one is written to the data dir.
    pub fn resolve(
        data_dir: &Path,
        db_override: Option<PathBuf>,
        schema_override: Option<PathBuf>,
    ) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = db_override.unwrap_or_else(|| data_dir.join("meal_max.db"));

        let schema_path = if let Some(path) = schema_override {
            path
        } else {
            let path = data_dir.join(SCHEMA_FILE_NAME);
            if !path.exists() {
                std::fs::write(&path, BUNDLED_SCHEMA).with_context(|| {
                    format!("Failed to write schema script: {}", path.display())
                })?;
                tracing::debug!(path = %path.display(), "wrote bundled schema script");
            }
            path
        };

        Ok(Config {
            db_path,
            schema_path,
        })
    }

    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            db_path: self.db_path.clone(),
            schema_path: self.schema_path.clone(),
        }
    }
}
