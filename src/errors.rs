//! Error types for the halpnotes application.
//!
//! This module defines custom error types that categorize the failures that
//! can surface from note management, persistence, and the command line.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the halpnotes application.
#[derive(Error, Debug)]
pub enum NotesError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// A history index did not point at a stored version.
    #[error("Note {id} has no version at index {index}")]
    VersionNotFound { id: String, index: usize },

    /// Title or content rejected at the edit boundary.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// The persistence slot could not be reached.
    #[error("Persistence unavailable: {message}")]
    PersistenceUnavailable { message: String },

    #[error("{message}")]
    EditorError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
