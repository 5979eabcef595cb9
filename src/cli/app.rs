//! CLI module for the halpnotes application
//!
//! This module turns parsed subcommands into calls on the note store and
//! renders the results.
use std::{
    fs::{read_to_string, OpenOptions},
    io::{self, stdin, Write},
    path::{Path, PathBuf},
    process::Command,
};

use chrono::{DateTime, Utc};
use log::{info, warn};
use shell_words::split;
use tempfile::Builder;

use crate::{
    content_preview, parse_tags, pick_random, resolve, step, timeline, Commands, Config,
    HistoryPosition, Note, NoteDraft, NoteStore, NotesError, OutputFormat, Result, Revision,
};

const PREVIEW_CHARS: usize = 100;

/// CLI Application handler - processes CLI commands and interfaces with NoteStore
pub struct App {
    /// The note store
    store: NoteStore,

    /// Application configuration
    config: Config,

    /// Where `config --write` puts the configuration
    config_path: Option<PathBuf>,

    /// Whether to display verbose output
    verbose: bool,

    /// Destination for command output
    out: Box<dyn Write>,
}

impl App {
    /// Create a new CLI application printing to stdout
    pub fn new(store: NoteStore, config: Config, config_path: Option<PathBuf>, verbose: bool) -> Self {
        Self::with_output(store, config, config_path, verbose, Box::new(io::stdout()))
    }

    pub fn with_output(
        store: NoteStore,
        config: Config,
        config_path: Option<PathBuf>,
        verbose: bool,
        out: Box<dyn Write>,
    ) -> Self {
        Self {
            store,
            config,
            config_path,
            verbose,
            out,
        }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Hands the store back for shutdown
    pub fn into_store(self) -> NoteStore {
        self.store
    }

    /// Run the CLI application with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::New {
                title,
                content,
                file,
                edit,
                tags,
            } => self.create_note(title, content, file, edit, tags)?,

            Commands::Edit {
                id,
                title,
                content,
                file,
                edit,
                tags,
            } => self.handle_edit(id, title, content, file, edit, tags)?,

            Commands::Show {
                id,
                version,
                step,
                format,
            } => self.handle_show(&id, version, step, format)?,

            Commands::History { id } => self.handle_history(&id)?,

            Commands::Revert { id, version } => {
                let note = self.store.revert_to_version(&id, version)?;
                let message = format!(
                    "Note {} restored from version {} ({} versions kept)",
                    note.id,
                    version,
                    note.versions.len()
                );
                writeln!(self.out, "{}", message)?;
            }

            Commands::Delete { id, force } => self.handle_delete(&id, force)?,

            Commands::List {
                search,
                tags,
                limit,
                format,
                detailed,
            } => self.list_notes(search.as_deref().unwrap_or(""), &tags, limit, format, detailed)?,

            Commands::Tags => {
                let tags = self.store.tags().to_vec();
                if tags.is_empty() {
                    writeln!(self.out, "No tags in use.")?;
                }
                for tag in tags {
                    writeln!(self.out, "#{}", tag)?;
                }
            }

            Commands::Random { tags, count } => {
                let picks: Vec<Note> =
                    pick_random(self.store.notes(), &tags, count, &mut rand::thread_rng())
                        .into_iter()
                        .cloned()
                        .collect();
                self.display_notes(&picks, OutputFormat::Text, true)?;
            }

            Commands::RestoreDefaults { force } => self.handle_restore_defaults(force)?,

            Commands::Config { write } => self.handle_config(write)?,
        }

        if let Some(e) = self.store.take_persistence_error() {
            warn!("Change kept in memory but not saved: {}", e);
            eprintln!("warning: change not saved: {}", e);
        }

        Ok(())
    }

    fn create_note(
        &mut self,
        title: String,
        content: Option<String>,
        file: Option<PathBuf>,
        edit: bool,
        tags: Option<String>,
    ) -> Result<()> {
        let body = match (content, file) {
            (Some(c), _) => c,
            (_, Some(path)) => self.read_content_from_file(&path)?,
            (None, None) if edit => self.open_editor_with_content(&title, "")?,
            (None, None) => {
                return Err(NotesError::InvalidInput {
                    message: "provide --content, --file or --edit".to_string(),
                })
            }
        };

        let draft = NoteDraft::new(&title, &body, parse_tags(tags))?;
        let collection = self.store.add_note(draft.title, draft.content, draft.tags);
        let id = collection.notes()[0].id.clone();

        writeln!(self.out, "Note created with ID: {}", id)?;
        Ok(())
    }

    fn handle_edit(
        &mut self,
        id: String,
        title: Option<String>,
        content: Option<String>,
        file: Option<PathBuf>,
        edit: bool,
        tags: Option<String>,
    ) -> Result<()> {
        let current = self
            .store
            .get_note(&id)
            .cloned()
            .ok_or_else(|| NotesError::NoteNotFound { id: id.clone() })?;

        let new_title = title.unwrap_or_else(|| current.title.clone());
        let new_content = match (content, file) {
            (Some(c), _) => c,
            (_, Some(path)) => self.read_content_from_file(&path)?,
            (None, None) if edit => self.open_editor_with_content(&new_title, &current.content)?,
            (None, None) => current.content.clone(),
        };
        let new_tags = match tags {
            Some(raw) => parse_tags(Some(raw)),
            None => current.tags.clone(),
        };

        let draft = NoteDraft::new(&new_title, &new_content, new_tags)?;
        let note = self
            .store
            .try_update_note(&id, draft.title, draft.content, draft.tags)?;
        let message = format!(
            "Note {} updated ({} prior versions)",
            note.id,
            note.versions.len()
        );
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    fn handle_show(
        &mut self,
        id: &str,
        version: Option<usize>,
        direction: Option<crate::StepDirection>,
        format: OutputFormat,
    ) -> Result<()> {
        let note = self
            .store
            .get_note(id)
            .ok_or_else(|| NotesError::NoteNotFound { id: id.to_string() })?;

        let mut position = version.map_or(HistoryPosition::Live, HistoryPosition::Version);
        if let Some(index) = version.filter(|index| *index >= note.versions.len()) {
            return Err(NotesError::VersionNotFound {
                id: id.to_string(),
                index,
            });
        }
        if let Some(direction) = direction {
            position = step(note, position, direction);
        }
        let revision = resolve(note, position).ok_or_else(|| NotesError::VersionNotFound {
            id: id.to_string(),
            index: version.unwrap_or_default(),
        })?;

        let rendered = match format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "id": note.id,
                "position": position.as_index(),
                "versions": note.versions.len(),
                "title": revision.title,
                "content": revision.content,
                "tags": revision.tags,
                "createdAt": note.created_at.timestamp_millis(),
                "updatedAt": revision.updated_at.timestamp_millis(),
            }))?,
            OutputFormat::Text => render_revision(note, position, &revision),
        };
        writeln!(self.out, "{}", rendered)?;
        Ok(())
    }

    fn handle_history(&mut self, id: &str) -> Result<()> {
        let note = self
            .store
            .get_note(id)
            .ok_or_else(|| NotesError::NoteNotFound { id: id.to_string() })?;

        let lines: Vec<String> = timeline(note)
            .iter()
            .map(|(position, revision)| {
                let label = match position {
                    HistoryPosition::Live => "live".to_string(),
                    HistoryPosition::Version(index) => format!("v{index}"),
                };
                format!(
                    "{:>5}  {}  {}",
                    label,
                    format_time(revision.updated_at),
                    revision.title
                )
            })
            .collect();

        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn handle_delete(&mut self, id: &str, force: bool) -> Result<()> {
        let note = self
            .store
            .get_note(id)
            .cloned()
            .ok_or_else(|| NotesError::NoteNotFound { id: id.to_string() })?;

        if !force {
            writeln!(self.out, "You are about to delete the following note:")?;
            writeln!(self.out, "ID:       {}", note.id)?;
            writeln!(self.out, "Title:    {}", note.title)?;
            writeln!(self.out, "Tags:     {}", note.tags.join(", "))?;
            writeln!(self.out, "Versions: {}", note.versions.len())?;
            if !self.confirm("Delete this note and all of its versions?")? {
                writeln!(self.out, "Deletion cancelled.")?;
                return Ok(());
            }
        }

        self.store.try_delete_note(id)?;
        writeln!(
            self.out,
            "Note '{}' ({}) has been permanently deleted.",
            note.title, note.id
        )?;
        Ok(())
    }

    fn handle_restore_defaults(&mut self, force: bool) -> Result<()> {
        let reserved = self.store.reserved_tag().to_string();
        let affected = self.store.notes().iter().filter(|n| n.has_tag(&reserved)).count();

        if !force && affected > 0 {
            writeln!(
                self.out,
                "{} note(s) tagged '{}' will be replaced, including their history.",
                affected, reserved
            )?;
            if !self.confirm("Continue?")? {
                writeln!(self.out, "Restore cancelled.")?;
                return Ok(());
            }
        }

        let restored = self
            .store
            .restore_defaults()
            .notes()
            .iter()
            .filter(|n| n.has_tag(&reserved))
            .count();
        writeln!(self.out, "Restored {} default notes.", restored)?;
        Ok(())
    }

    fn handle_config(&mut self, write: bool) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string_pretty(&self.config)?)?;

        if write {
            let path = self
                .config_path
                .clone()
                .or_else(Config::default_path)
                .ok_or_else(|| NotesError::ConfigError {
                    message: "no location for the config file".to_string(),
                })?;
            self.config.save(&path)?;
            writeln!(self.out, "Configuration written to {}", path.display())?;
        }
        Ok(())
    }

    /// List notes matching the search text and tags
    fn list_notes(
        &mut self,
        search: &str,
        tags: &[String],
        limit: usize,
        format: OutputFormat,
        detailed: bool,
    ) -> Result<()> {
        let mut notes: Vec<Note> = self
            .store
            .filter(search, tags)
            .into_iter()
            .cloned()
            .collect();

        if limit > 0 && notes.len() > limit {
            notes.truncate(limit);
        }
        if self.verbose {
            info!("Listing {} notes", notes.len());
        }

        self.display_notes(&notes, format, detailed)
    }

    /// Display notes in the requested format
    fn display_notes(&mut self, notes: &[Note], format: OutputFormat, detailed: bool) -> Result<()> {
        if notes.is_empty() {
            writeln!(self.out, "No notes found matching the criteria.")?;
            return Ok(());
        }

        match format {
            OutputFormat::Json => self.display_notes_json(notes, detailed)?,
            OutputFormat::Text => self.display_notes_text(notes, detailed)?,
        }

        writeln!(
            self.out,
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        )?;
        Ok(())
    }

    fn display_notes_json(&mut self, notes: &[Note], detailed: bool) -> Result<()> {
        if detailed {
            writeln!(self.out, "{}", serde_json::to_string_pretty(notes)?)?;
        } else {
            let simplified: Vec<serde_json::Value> = notes
                .iter()
                .map(|note| {
                    serde_json::json!({
                        "id": note.id,
                        "title": note.title,
                        "tags": note.tags,
                        "versions": note.versions.len(),
                        "updatedAt": note.updated_at.timestamp_millis(),
                    })
                })
                .collect();
            writeln!(self.out, "{}", serde_json::to_string_pretty(&simplified)?)?;
        }
        Ok(())
    }

    fn display_notes_text(&mut self, notes: &[Note], detailed: bool) -> Result<()> {
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                writeln!(self.out, "{}", "-".repeat(term_width.min(50)))?;
            }

            writeln!(
                self.out,
                "ID: {} | Updated: {} | Versions: {}",
                note.id,
                format_time(note.updated_at),
                note.versions.len()
            )?;
            writeln!(self.out, "Title: {}", console::style(&note.title).bold())?;

            if !note.tags.is_empty() {
                writeln!(self.out, "Tags: {}", console::style(hashtags(&note.tags)).cyan())?;
            }

            if detailed {
                writeln!(self.out, "\n{}", note.content)?;
            } else {
                let preview = content_preview(&note.content, PREVIEW_CHARS);
                if !preview.is_empty() {
                    writeln!(self.out, "\n{}", preview)?;
                }
            }
        }
        Ok(())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.out, "{} [y/N]: ", question)?;
        self.out.flush()?;

        let mut input = String::new();
        stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }

    fn read_content_from_file(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(NotesError::InvalidInput {
                message: format!("not a readable file: {}", path.display()),
            });
        }
        read_to_string(path).map_err(NotesError::Io)
    }

    fn open_editor_with_content(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).open(&temp_path)?;
            writeln!(file, "<!-- {} -->", title)?;
            writeln!(file, "<!-- Lines wrapped in HTML comments are ignored. -->")?;
            write!(file, "{}", existing_content)?;
        }

        let editor_cmd = self.config.get_editor_command();
        info!("Opening {} to edit note content", editor_cmd);
        launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(strip_editor_comments(&content))
    }
}

fn launch_editor(editor_cmd: &str, file_path: &Path) -> Result<()> {
    let args = split(editor_cmd).map_err(|e| NotesError::EditorError {
        message: format!("Failed to parse editor command: {}", e),
    })?;

    let Some((program, rest)) = args.split_first() else {
        return Err(NotesError::EditorError {
            message: "Empty editor command".to_string(),
        });
    };

    let status = Command::new(program).args(rest).arg(file_path).status()?;
    if !status.success() {
        return Err(NotesError::EditorError {
            message: "Editor exited with non-zero status".to_string(),
        });
    }
    Ok(())
}

fn strip_editor_comments(content: &str) -> String {
    content
        .lines()
        .filter(|line| {
            let line = line.trim();
            !(line.starts_with("<!--") && line.ends_with("-->"))
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_revision(note: &Note, position: HistoryPosition, revision: &Revision<'_>) -> String {
    let label = match position {
        HistoryPosition::Live => format!("live ({} prior versions)", note.versions.len()),
        HistoryPosition::Version(index) => {
            format!("version {} of {}", index, note.versions.len())
        }
    };

    let mut rendered = format!(
        "ID: {} | {} | Updated: {}\nTitle: {}\n",
        note.id,
        label,
        format_time(revision.updated_at),
        revision.title
    );
    if !revision.tags.is_empty() {
        rendered.push_str(&format!("Tags: {}\n", hashtags(revision.tags)));
    }
    rendered.push('\n');
    rendered.push_str(revision.content);
    rendered
}
