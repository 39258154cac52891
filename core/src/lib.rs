//! Meal catalog with soft deletes, battle statistics and leaderboards,
//! backed by a single SQLite table.

pub mod battle;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

pub use battle::{BattleError, BattleModel, RandomSource, ThreadRandom};
pub use db::{ConnectionProvider, FileConnections, SharedConnection, StoreConfig};
pub use error::{MealError, MealKey};
pub use models::{Difficulty, LeaderboardEntry, Meal, Outcome, SortBy};
pub use store::MealStore;
