use std::{
    env, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{NotesError, Result, DEFAULT_RESERVED_TAG};

/// Environment variable overriding [`Config::data_dir`].
pub const DATA_DIR_ENV: &str = "HALPNOTES_DATA_DIR";

/// Name of the storage slot the notes live under.
pub const DEFAULT_STORAGE_KEY: &str = "notes-app-data";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the notes slot
    pub data_dir: PathBuf,

    /// Slot name; the notes are stored in `<data_dir>/<storage_key>.json`
    pub storage_key: String,

    /// Tag marking notes that `restore-defaults` replaces
    pub reserved_tag: String,

    /// Whether an empty slot gets the tutorial and sample notes
    pub seed_defaults_on_first_run: bool,

    /// Whether saves happen on a background task
    pub background_save: bool,

    /// Editor used for `--edit`
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".halpnotes"));

        Self {
            data_dir,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            reserved_tag: DEFAULT_RESERVED_TAG.to_string(),
            seed_defaults_on_first_run: true,
            background_save: true,
            editor_command: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "halpnotes")
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads configuration from `path` (or the default location), falling
    /// back to defaults when no file exists, then applies the environment
    /// override for the data directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                debug!("Reading config from {}", path.display());
                let raw = fs::read_to_string(&path)?;
                serde_json::from_str(&raw).map_err(|e| NotesError::ConfigError {
                    message: format!("{}: {}", path.display(), e),
                })?
            }
            Some(path) => {
                debug!("No config at {}, using defaults", path.display());
                Config::default()
            }
            None => Config::default(),
        };

        if let Some(dir) = env::var_os(DATA_DIR_ENV) {
            info!("Using data directory from {}", DATA_DIR_ENV);
            config.data_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_| NotesError::DirectoryError {
                path: parent.to_path_buf(),
            })?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Configuration written to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(NotesError::ConfigError {
                message: "storage_key must not be empty".to_string(),
            });
        }
        if self.reserved_tag.trim().is_empty() {
            return Err(NotesError::ConfigError {
                message: "reserved_tag must not be empty".to_string(),
            });
        }
        Ok(())
    }

    // Configured editor, then $EDITOR, then a platform default
    pub fn get_editor_command(&self) -> String {
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        if let Ok(editor) = env::var("EDITOR") {
            return editor;
        }

        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -W -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}
