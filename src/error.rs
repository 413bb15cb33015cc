use thiserror::Error;

use crate::scoring::SkillComponent;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("unknown skill component: {0}")]
    UnknownComponent(String),

    #[error("invalid {component} mark {value}: {reason}")]
    InvalidRawMark {
        component: SkillComponent,
        value: f64,
        reason: String,
    },

    #[error("note is {0} characters, limit is 500")]
    NoteTooLong(usize),

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
