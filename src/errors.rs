use axum::http::StatusCode;
use chrono::NaiveDateTime;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write state file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum WirdError {
    #[error("anchor time {anchor} is more than a day away from {now}")]
    StaleAnchor {
        anchor: NaiveDateTime,
        now: NaiveDateTime,
    },

    #[error("stored progress record is corrupt: {0}")]
    CorruptProgress(String),

    #[error("slot {0} is out of range")]
    InvalidSlot(usize),

    #[error("repetition count must be between 1 and {max}, got {count}")]
    InvalidRepetitionCount { count: u32, max: u32 },

    #[error("the plan is complete and must be restarted")]
    PlanComplete,

    #[error("this change discards progress and needs confirmation")]
    ConfirmationRequired,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::internal(err)
    }
}

impl From<WirdError> for AppError {
    fn from(err: WirdError) -> Self {
        match err {
            WirdError::InvalidSlot(_) | WirdError::InvalidRepetitionCount { .. } => {
                Self::bad_request(err.to_string())
            }
            WirdError::PlanComplete | WirdError::ConfirmationRequired => {
                Self::conflict(err.to_string())
            }
            WirdError::StaleAnchor { .. } => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: err.to_string(),
            },
            WirdError::CorruptProgress(_) | WirdError::Store(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
