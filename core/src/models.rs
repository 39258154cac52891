use std::fmt;
use std::str::FromStr;

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::MealError;

/// How hard a meal is to prepare. Stored as `LOW`, `MED` or `HIGH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Low,
    Med,
    High,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Low => "LOW",
            Difficulty::Med => "MED",
            Difficulty::High => "HIGH",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Difficulty::Low),
            "MED" => Ok(Difficulty::Med),
            "HIGH" => Ok(Difficulty::High),
            _ => Err(MealError::InvalidInput(format!(
                "Invalid difficulty level: {s}. Must be 'LOW', 'MED', or 'HIGH'."
            ))),
        }
    }
}

impl ToSql for Difficulty {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Difficulty {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: MealError| FromSqlError::Other(Box::new(e)))
    }
}

/// Result of a single battle from one meal's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Outcome::Win),
            "loss" => Ok(Outcome::Loss),
            _ => Err(MealError::InvalidInput(format!(
                "Invalid result: {s}. Expected 'win' or 'loss'."
            ))),
        }
    }
}

/// Leaderboard ordering metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Wins,
    WinPct,
}

impl SortBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Wins => "wins",
            SortBy::WinPct => "win_pct",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wins" => Ok(SortBy::Wins),
            "win_pct" => Ok(SortBy::WinPct),
            _ => Err(MealError::InvalidInput(format!(
                "Invalid sort_by parameter: {s}"
            ))),
        }
    }
}

/// A live (non-deleted) catalog entry. The storage tombstone never leaves the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub meal: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub meal: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
    pub battles: i64,
    pub wins: i64,
    /// Percentage in `[0, 100]`, one decimal place.
    pub win_pct: f64,
}

/// Reject zero, negative and non-finite prices.
pub fn validate_price(price: f64) -> Result<f64, MealError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(invalid_price(price))
    }
}

/// Parse a textual price, rejecting anything that is not a positive number.
pub fn parse_price(s: &str) -> Result<f64, MealError> {
    let value: f64 = s.trim().parse().map_err(|_| invalid_price(s))?;
    validate_price(value).map_err(|_| invalid_price(s))
}

fn invalid_price(value: impl fmt::Display) -> MealError {
    MealError::InvalidInput(format!(
        "Invalid price: {value}. Price must be a positive number."
    ))
}

/// Turn a stored `wins / battles` fraction into a percentage rounded to one decimal.
#[must_use]
pub fn win_pct_from_fraction(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}
