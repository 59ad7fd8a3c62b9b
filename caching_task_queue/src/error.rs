use thiserror::Error;

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error("computation for {key} panicked")]
    ComputationPanicked { key: String },
    #[error("computation for {key} was cancelled before completing")]
    ComputationCancelled { key: String },
}
