use thiserror::Error;

#[derive(Error, Debug)]
pub enum NpsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Score distribution must have {expected} entries, got {actual}")]
    ScoreLength { expected: usize, actual: usize },

    #[error("Score count at rating {index} is negative: {value}")]
    NegativeScore { index: usize, value: i64 },

    #[error("Score count at rating {index} is {value}, above the limit of {max}")]
    ScoreTooLarge { index: usize, value: i64, max: u32 },

    #[error("Invalid month '{value}': expected zero-padded YYYY-MM")]
    InvalidMonth { value: String },

    #[error("No advisor selected")]
    NoAdvisorSelected,

    #[error("Rating {rating} is outside 0..=10")]
    RatingOutOfRange { rating: usize },

    #[error("Session not authenticated")]
    NotAuthenticated,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type NpsResult<T> = Result<T, NpsError>;
