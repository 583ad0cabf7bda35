use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Empty semver constraint")]
    EmptyConstraint,

    #[error("Dangling operator '{0}' in semver constraint")]
    DanglingOperator(String),

    #[error("Invalid semver constraint '{expression}': {source}")]
    InvalidConstraint {
        expression: String,
        #[source]
        source: semver::Error,
    },
}
