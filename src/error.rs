//! Error type shared by the simulation core
//!
//! Nothing in here is fatal to a running frame: the tick loop logs these and
//! moves on. They surface as `Err` only from explicit API calls made by
//! gameplay code (spawning, applying actions, loading settings).

use thiserror::Error;

use crate::sim::ObjectId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("no live object with id {0}")]
    UnknownObject(ObjectId),

    #[error("object {id} has no {capability} capability")]
    MissingCapability {
        id: ObjectId,
        capability: &'static str,
    },

    #[error("motion duration must be positive, got {0}")]
    InvalidDuration(f32),

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("event handler failed: {0}")]
    Handler(String),
}

pub type SimResult<T> = Result<T, SimError>;
