use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// How a caller addressed a meal. Rendered into `NotFound`/`AlreadyDeleted` messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealKey {
    Id(i64),
    Name(String),
}

impl fmt::Display for MealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealKey::Id(id) => write!(f, "ID {id}"),
            MealKey::Name(name) => write!(f, "name {name}"),
        }
    }
}

/// Errors from the meal store.
#[derive(Debug, Error)]
pub enum MealError {
    /// Caller supplied a bad price, difficulty, outcome or sort key.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Meal with {0} not found")]
    NotFound(MealKey),

    #[error("Meal with {0} has been deleted")]
    AlreadyDeleted(MealKey),

    #[error("Meal with name '{0}' already exists")]
    AlreadyExists(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to read schema script {}: {source}", .path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MealError {
    /// True for the "record missing or tombstoned" family of errors.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, MealError::NotFound(_) | MealError::AlreadyDeleted(_))
    }
}

pub type Result<T, E = MealError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_embed_key() {
        assert_eq!(
            MealError::NotFound(MealKey::Id(2)).to_string(),
            "Meal with ID 2 not found"
        );
        assert_eq!(
            MealError::AlreadyDeleted(MealKey::Name("pasta".to_string())).to_string(),
            "Meal with name pasta has been deleted"
        );
        assert_eq!(
            MealError::AlreadyExists("fried chicken".to_string()).to_string(),
            "Meal with name 'fried chicken' already exists"
        );
    }

    #[test]
    fn test_is_missing() {
        assert!(MealError::NotFound(MealKey::Id(1)).is_missing());
        assert!(MealError::AlreadyDeleted(MealKey::Id(1)).is_missing());
        assert!(!MealError::InvalidInput("x".to_string()).is_missing());
    }
}
