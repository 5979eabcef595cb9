//! Shared types for the halpnotes application.
//!
//! This module contains the crate-wide `Result` alias, the history step
//! direction, and the command-line subcommands.
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::NotesError;

/// A specialized Result type for halpnotes operations.
pub type Result<T> = std::result::Result<T, NotesError>;

/// Direction of one step through a note's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum StepDirection {
    /// Toward older versions
    Prev,
    /// Toward the live note
    Next,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands for the halpnotes application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new note
    New {
        /// Title of the note
        #[clap(short = 'T', long)]
        title: String,

        /// Content of the note
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the note's content
        #[clap(short, long, conflicts_with = "content")]
        file: Option<PathBuf>,

        /// Open content in editor before saving
        #[clap(short, long, conflicts_with_all = ["content", "file"])]
        edit: bool,

        /// Tags to associate with the note (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,
    },

    /// Replace a note's title, content or tags, keeping the old state as a version
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the new content
        #[clap(short, long, conflicts_with = "content")]
        file: Option<PathBuf>,

        /// Open the current content in an editor
        #[clap(short, long, conflicts_with_all = ["content", "file"])]
        edit: bool,

        /// Replacement tags (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,
    },

    /// Show a note, or one of its stored versions
    Show {
        /// ID of the note
        id: String,

        /// Version index to show (0 is the oldest)
        #[clap(long)]
        version: Option<usize>,

        /// Show the version one step from --version (or from the live note)
        #[clap(long, value_enum)]
        step: Option<StepDirection>,

        /// Output format
        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List every stored version of a note, newest first
    History {
        /// ID of the note
        id: String,
    },

    /// Make an old version the live state again (the current state is kept)
    Revert {
        /// ID of the note
        id: String,

        /// Version index to restore (0 is the oldest)
        version: usize,
    },

    /// Delete a note and its history
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// List notes, optionally filtered by search text and tags
    List {
        /// Case-insensitive text to look for, including in older versions
        #[clap(short, long)]
        search: Option<String>,

        /// Only notes carrying all of these tags (repeatable or comma-separated)
        #[clap(short = 't', long = "tag", value_delimiter = ',')]
        tags: Vec<String>,

        /// Limit the number of notes returned (0 for no limit)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Output format
        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Print full content instead of a preview
        #[clap(short, long)]
        detailed: bool,
    },

    /// List every tag in use
    Tags,

    /// Pick a few random notes
    Random {
        /// Only pick notes carrying all of these tags
        #[clap(short = 't', long = "tag", value_delimiter = ',')]
        tags: Vec<String>,

        /// How many notes to pick
        #[clap(short = 'n', long, default_value_t = crate::DEFAULT_RANDOM_PICKS)]
        count: usize,
    },

    /// Replace the tutorial notes with a fresh copy
    RestoreDefaults {
        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Show or write the configuration
    Config {
        /// Write the effective configuration to the config file
        #[clap(long)]
        write: bool,
    },
}
