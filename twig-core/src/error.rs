//! Error types for Twig

use thiserror::Error;

/// Result type alias for Twig operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Twig operations
#[derive(Error, Debug)]
pub enum Error {
    /// `--branch` named a branch that is not in the inventory
    #[error("The branch \"{0}\" could not be found.")]
    UnknownBranch(String),

    /// No `--branch` given and HEAD is not on a branch
    #[error("No branch is checked out. Use --branch to choose one.")]
    NoCurrentBranch,

    /// A numeric option received a value that does not parse as a number
    #[error("The value `--{flag}={value}` is invalid.")]
    InvalidNumericOption { flag: String, value: String },

    /// A name filter failed to compile
    #[error("The pattern `{pattern}` is invalid: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Property name that cannot be stored as a branch config key
    #[error("The property name \"{0}\" is invalid.")]
    InvalidProperty(String),

    /// Property name reserved by git for branch tracking
    #[error("The property \"{0}\" is reserved by git and cannot be changed here.")]
    ReservedProperty(String),

    /// Repository returned something the inventory could not use
    #[error("Repository error: {0}")]
    Gateway(String),

    /// Underlying libgit2 failure
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
