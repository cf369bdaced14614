use thiserror::Error;

/// Errors that can occur while registering a system.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SystemRegistrationError {
    #[error("system '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("system name must not be empty")]
    EmptyName,
}
