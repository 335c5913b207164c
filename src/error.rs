use thiserror::Error;
use uuid::Uuid;

use crate::model::PlantStage;

/// Errors surfaced by the garden core.
#[derive(Debug, Error)]
pub enum GardenError {
    /// A row addressed by id does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    /// No weather snapshot has been generated yet.
    #[error("no weather data available")]
    NoWeather,

    /// The plant row changed between read and write.
    #[error("write conflict on plant {0}")]
    Conflict(Uuid),

    #[error("plant is not ready for harvest (stage: {stage})")]
    NotHarvestable { stage: PlantStage },

    #[error("position {position} already occupied")]
    PositionOccupied { position: i32 },

    #[error("position {position} outside garden of size {size}")]
    InvalidPosition { position: i32, size: i32 },

    #[error("amount must be between 1 and 100, got {0}")]
    InvalidAmount(i32),

    /// A persisted value could not be mapped back into the model.
    #[error("corrupt {column} value: {value:?}")]
    Corrupt { column: &'static str, value: String },

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl GardenError {
    pub fn not_found(kind: &'static str, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// True for failures a caller may retry against a fresh read.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, GardenError>;
