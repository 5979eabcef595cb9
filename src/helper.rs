use crate::{NotesError, Result};

/// Title, content and tags that passed the edit-boundary checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NoteDraft {
    /// Trims title and content and rejects either being blank.
    ///
    /// Tags are passed through; the store normalizes them.
    pub fn new(title: &str, content: &str, tags: Vec<String>) -> Result<Self> {
        let title = title.trim();
        let content = content.trim();

        if title.is_empty() {
            return Err(NotesError::InvalidInput {
                message: "title must not be empty".to_string(),
            });
        }
        if content.is_empty() {
            return Err(NotesError::InvalidInput {
                message: "content must not be empty".to_string(),
            });
        }

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            tags,
        })
    }
}

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// First non-empty line of `content`, cut to `max_chars` characters.
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim();

    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_trims_fields() {
        let draft = NoteDraft::new("  Trip ", "\nPacking list\n", vec!["Travel".into()])
            .expect("valid draft");
        assert_eq!(draft.title, "Trip");
        assert_eq!(draft.content, "Packing list");
        assert_eq!(draft.tags, vec!["Travel"]);
    }

    #[test]
    fn draft_rejects_blank_title_or_content() {
        assert!(matches!(
            NoteDraft::new("   ", "body", vec![]),
            Err(NotesError::InvalidInput { .. })
        ));
        assert!(matches!(
            NoteDraft::new("title", "\t\n", vec![]),
            Err(NotesError::InvalidInput { .. })
        ));
    }

    #[test]
    fn parse_tags_splits_on_commas() {
        assert_eq!(
            parse_tags(Some("work, Home ,,  ".to_string())),
            vec!["work", "Home"]
        );
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(content_preview("\n\n  first line\nsecond", 50), "first line");
        assert_eq!(content_preview("héllo wörld", 5), "héllo...");
        assert_eq!(content_preview("", 10), "");
    }
}
