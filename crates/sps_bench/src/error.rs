use crate::operation::OperationError;
use crate::stage::Stage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("invalid benchmark configuration: {0}")]
    InvalidConfiguration(String),
    #[error("unsupported benchmark mode `{0}`; expected one of: time, counting")]
    UnsupportedMode(String),
    #[error(transparent)]
    OperationFailure(#[from] OperationError),
    #[error("{stage} stage read slot {slot} before it was written")]
    MissingSlot { stage: Stage, slot: usize },
    #[error("{stage} stage addressed slot {slot} of an arena with {len} slots")]
    SlotOutOfRange { stage: Stage, slot: usize, len: usize },
}
