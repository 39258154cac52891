use std::path::{Path, PathBuf};

use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior, params};
use tracing::{debug, info, warn};

use crate::db::{
    ConnectionProvider, FileConnections, SharedConnection, StoreConfig, ensure_schema,
    provision_schema,
};
use crate::error::{MealError, MealKey, Result};
use crate::models::{
    Difficulty, LeaderboardEntry, Meal, Outcome, SortBy, validate_price, win_pct_from_fraction,
};

/// Record manager for the `meals` table.
///
/// Every operation acquires its own connection from the provider and runs
/// as one transaction; nothing is cached between calls.
pub struct MealStore<P = FileConnections> {
    provider: P,
    schema_path: PathBuf,
}

impl MealStore<FileConnections> {
    /// Open the database file named in `config`, creating the table from the
    /// schema script if it is not there yet.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let store = Self::new(
            FileConnections::new(&config.db_path),
            config.schema_path.clone(),
        );
        store.ensure_schema()?;
        Ok(store)
    }
}

impl MealStore<SharedConnection> {
    pub fn open_in_memory(schema_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(SharedConnection::open_in_memory()?, schema_path);
        store.ensure_schema()?;
        Ok(store)
    }
}

impl<P: ConnectionProvider> MealStore<P> {
    #[must_use]
    pub fn new(provider: P, schema_path: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            schema_path: schema_path.into(),
        }
    }

    #[must_use]
    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    fn ensure_schema(&self) -> Result<()> {
        let conn = self.provider.acquire()?;
        ensure_schema(&conn, &self.schema_path)
    }

    // --- Row mapping helpers ---

    // Expects columns: 0: id, 1: meal, 2: cuisine, 3: price, 4: difficulty, 5: deleted
    fn meal_from_row(row: &rusqlite::Row) -> rusqlite::Result<(Meal, bool)> {
        let meal = Meal {
            id: row.get(0)?,
            meal: row.get(1)?,
            cuisine: row.get(2)?,
            price: row.get(3)?,
            difficulty: row.get(4)?,
        };
        Ok((meal, row.get(5)?))
    }

    fn leaderboard_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<LeaderboardEntry> {
        let fraction: f64 = row.get(7)?;
        Ok(LeaderboardEntry {
            id: row.get(0)?,
            meal: row.get(1)?,
            cuisine: row.get(2)?,
            price: row.get(3)?,
            difficulty: row.get(4)?,
            battles: row.get(5)?,
            wins: row.get(6)?,
            win_pct: win_pct_from_fraction(fraction),
        })
    }

    /// Fail unless a row with `id` exists and is not tombstoned.
    fn ensure_live(conn: &Connection, id: i64) -> Result<()> {
        let deleted: Option<bool> = conn
            .query_row(
                "SELECT deleted FROM meals WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match deleted {
            None => {
                warn!(id, "meal not found");
                Err(MealError::NotFound(MealKey::Id(id)))
            }
            Some(true) => {
                warn!(id, "meal has been deleted");
                Err(MealError::AlreadyDeleted(MealKey::Id(id)))
            }
            Some(false) => Ok(()),
        }
    }

    fn unpack_lookup(found: Option<(Meal, bool)>, key: MealKey) -> Result<Meal> {
        match found {
            None => {
                warn!(%key, "meal not found");
                Err(MealError::NotFound(key))
            }
            Some((_, true)) => {
                warn!(%key, "meal has been deleted");
                Err(MealError::AlreadyDeleted(key))
            }
            Some((meal, false)) => Ok(meal),
        }
    }

    // --- Lifecycle ---

    /// Insert a new meal with zeroed stats and return its id.
    pub fn create(&self, meal: &str, cuisine: &str, price: f64, difficulty: &str) -> Result<i64> {
        let price = validate_price(price).inspect_err(|e| warn!(%e, "rejected meal"))?;
        let difficulty: Difficulty = difficulty
            .parse()
            .inspect_err(|e: &MealError| warn!(%e, "rejected meal"))?;

        let conn = self.provider.acquire()?;
        match conn.execute(
            "INSERT INTO meals (meal, cuisine, price, difficulty) VALUES (?1, ?2, ?3, ?4)",
            params![meal, cuisine, price, difficulty],
        ) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _)) if is_unique_violation(&err) => {
                warn!(meal, "duplicate meal");
                return Err(MealError::AlreadyExists(meal.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        let id = conn.last_insert_rowid();
        info!(id, meal, cuisine, price, %difficulty, "created meal");
        Ok(id)
    }

    /// Soft-delete a meal. The row stays in storage but disappears from every
    /// lookup, stat update and leaderboard.
    pub fn delete(&self, id: i64) -> Result<()> {
        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Self::ensure_live(&tx, id)?;
        tx.execute("UPDATE meals SET deleted = TRUE WHERE id = ?1", params![id])?;
        tx.commit()?;
        info!(id, "deleted meal");
        Ok(())
    }

    /// Drop and recreate the table from the schema script. Removes every row,
    /// tombstoned ones included.
    ///
    /// The script runs inside a single IMMEDIATE transaction, so it must not
    /// contain its own `BEGIN`/`COMMIT`. SQLite rejects such a script with
    /// "cannot start a transaction within a transaction" and the table is left
    /// as it was.
    pub fn clear(&self) -> Result<()> {
        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        provision_schema(&tx, &self.schema_path)?;
        tx.commit()?;
        info!("cleared all meals");
        Ok(())
    }

    // --- Lookups ---

    pub fn get_by_id(&self, id: i64) -> Result<Meal> {
        let conn = self.provider.acquire()?;
        let found = conn
            .query_row(
                "SELECT id, meal, cuisine, price, difficulty, deleted FROM meals WHERE id = ?1",
                params![id],
                Self::meal_from_row,
            )
            .optional()?;
        Self::unpack_lookup(found, MealKey::Id(id))
    }

    /// Look a meal up by name. If a name was deleted and later reused, the
    /// live row wins over the tombstoned one.
    pub fn get_by_name(&self, name: &str) -> Result<Meal> {
        let conn = self.provider.acquire()?;
        let found = conn
            .query_row(
                "SELECT id, meal, cuisine, price, difficulty, deleted FROM meals WHERE meal = ?1
                 ORDER BY deleted ASC, id DESC LIMIT 1",
                params![name],
                Self::meal_from_row,
            )
            .optional()?;
        Self::unpack_lookup(found, MealKey::Name(name.to_string()))
    }

    // --- Stats ---

    /// Record a battle result given as text (`"win"` or `"loss"`).
    pub fn update_stats(&self, id: i64, outcome: &str) -> Result<()> {
        let outcome: Outcome = outcome
            .parse()
            .inspect_err(|e: &MealError| warn!(id, %e, "rejected stat update"))?;
        self.record_outcome(id, outcome)
    }

    /// Bump `battles`, and `wins` on a win, in a single UPDATE so concurrent
    /// callers never lose an increment.
    pub fn record_outcome(&self, id: i64, outcome: Outcome) -> Result<()> {
        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Self::ensure_live(&tx, id)?;
        let sql = match outcome {
            Outcome::Win => "UPDATE meals SET battles = battles + 1, wins = wins + 1 WHERE id = ?1",
            Outcome::Loss => "UPDATE meals SET battles = battles + 1 WHERE id = ?1",
        };
        tx.execute(sql, params![id])?;
        tx.commit()?;
        info!(id, %outcome, "updated meal stats");
        Ok(())
    }

    // --- Leaderboard ---

    /// Leaderboard with the sort key given as text (`"wins"` or `"win_pct"`).
    pub fn leaderboard(&self, sort_by: &str) -> Result<Vec<LeaderboardEntry>> {
        let sort_by: SortBy = sort_by
            .parse()
            .inspect_err(|e: &MealError| warn!(%e, "rejected leaderboard request"))?;
        self.leaderboard_by(sort_by)
    }

    /// All live meals, best first. Ties on the chosen metric fall back to
    /// ascending id so the order is stable.
    pub fn leaderboard_by(&self, sort_by: SortBy) -> Result<Vec<LeaderboardEntry>> {
        let order = match sort_by {
            SortBy::Wins => "wins DESC",
            SortBy::WinPct => "win_pct DESC",
        };
        let sql = format!(
            "SELECT id, meal, cuisine, price, difficulty, battles, wins,
                    CASE WHEN battles > 0 THEN wins * 1.0 / battles ELSE 0.0 END AS win_pct
             FROM meals WHERE deleted = FALSE
             ORDER BY {order}, id ASC"
        );
        let conn = self.provider.acquire()?;
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], Self::leaderboard_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(%sort_by, count = entries.len(), "built leaderboard");
        Ok(entries)
    }
}

/// Only UNIQUE and PRIMARY KEY failures mean the name is taken. CHECK,
/// NOT NULL and foreign-key failures from a custom schema are storage errors.
fn is_unique_violation(err: &rusqlite::ffi::Error) -> bool {
    err.code == ErrorCode::ConstraintViolation
        && matches!(
            err.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
}
