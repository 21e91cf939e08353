use thiserror::Error;

/// Failures raised by the seating core.
///
/// Both variants abort a run before anything is persisted. An empty attendee
/// list is not an error; it produces an empty plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeatingError {
    /// The run was configured with values that cannot produce a plan
    /// (non-positive capacity, zero grid columns, an impossible table hint).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An internal invariant was broken: a unit larger than a table, an
    /// affiliation scattered without having been split, a person lost or
    /// duplicated between input and output.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

impl SeatingError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        SeatingError::Configuration(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        SeatingError::DataIntegrity(msg.into())
    }
}
