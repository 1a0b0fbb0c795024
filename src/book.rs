//! Project data model and canonical JSON serialization
//!
//! A `Book` is the full document tree: metadata, ordered chapters,
//! characters, world-building entries and story notes, plus free-form
//! narrative fields. The tree serializes to pretty-printed JSON; every
//! field carries a serde default so files written by older or newer
//! releases of the same major format read back with missing fields empty
//! rather than failing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BookvaultError, ErrorCategory, ErrorKind, Result};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Count the characters of `text` that contribute to the word count.
///
/// The counting rule is simple character classification: letters (including
/// CJK ideographs) and digits count; whitespace, punctuation and markup
/// marker characters do not. Markup markers (`#`, `*`, `` ` ``, `_`,
/// brackets) are punctuation, so no separate stripping pass is needed.
pub fn count_content_chars(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphanumeric()).count()
}

/// A chapter of the manuscript. `order` is the zero-based position in the
/// book and is renumbered when chapters are removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: usize,
    #[serde(default)]
    pub word_count: usize,
    #[serde(default = "now")]
    pub created: DateTime<Utc>,
    #[serde(default = "now")]
    pub modified: DateTime<Utc>,
}

impl Chapter {
    pub fn new(title: impl Into<String>, content: impl Into<String>, order: usize) -> Self {
        let mut chapter = Self {
            id: new_id(),
            title: title.into(),
            content: content.into(),
            order,
            word_count: 0,
            created: now(),
            modified: now(),
        };
        chapter.word_count = count_content_chars(&chapter.content);
        chapter
    }

    /// Recompute the word count from the current content and touch the
    /// modification timestamp.
    pub fn update_word_count(&mut self) {
        self.word_count = count_content_chars(&self.content);
        self.modified = now();
    }
}

/// A character sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub image_path: String,
    #[serde(default = "now")]
    pub created: DateTime<Utc>,
    #[serde(default = "now")]
    pub modified: DateTime<Utc>,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: String::new(),
            background: String::new(),
            attributes: BTreeMap::new(),
            image_path: String::new(),
            created: now(),
            modified: now(),
        }
    }
}

/// A world-building entry: a place, a system of rules, a piece of history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldBuilding {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub locations: BTreeMap<String, String>,
    #[serde(default)]
    pub rules: BTreeMap<String, String>,
    #[serde(default)]
    pub history: String,
    #[serde(default = "now")]
    pub created: DateTime<Utc>,
    #[serde(default = "now")]
    pub modified: DateTime<Utc>,
}

impl WorldBuilding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: String::new(),
            locations: BTreeMap::new(),
            rules: BTreeMap::new(),
            history: String::new(),
            created: now(),
            modified: now(),
        }
    }
}

/// A free-form story note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryNote {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "now")]
    pub created: DateTime<Utc>,
    #[serde(default = "now")]
    pub modified: DateTime<Utc>,
}

impl StoryNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            content: content.into(),
            created: now(),
            modified: now(),
        }
    }
}

fn default_metadata() -> BTreeMap<String, serde_json::Value> {
    let mut metadata = BTreeMap::new();
    metadata.insert("language".to_string(), serde_json::json!("en"));
    metadata.insert("target_audience".to_string(), serde_json::json!(""));
    metadata.insert("estimated_pages".to_string(), serde_json::json!(0));
    metadata.insert("status".to_string(), serde_json::json!("draft"));
    metadata.insert("tags".to_string(), serde_json::json!([]));
    metadata
}

/// The full project document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default = "now")]
    pub created: DateTime<Utc>,
    #[serde(default = "now")]
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub world_building: Vec<WorldBuilding>,
    #[serde(default)]
    pub story_notes: Vec<StoryNote>,
    #[serde(default)]
    pub story_background: String,
    #[serde(default)]
    pub plot_outline: String,
    #[serde(default)]
    pub research_notes: String,
    #[serde(default)]
    pub timeline: String,
    #[serde(default = "default_metadata")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Default for Book {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            created: now(),
            modified: now(),
            chapters: Vec::new(),
            characters: Vec::new(),
            world_building: Vec::new(),
            story_notes: Vec::new(),
            story_background: String::new(),
            plot_outline: String::new(),
            research_notes: String::new(),
            timeline: String::new(),
            metadata: default_metadata(),
        }
    }

    /// Append a new chapter at the end of the book and return a mutable
    /// reference to it.
    pub fn add_chapter(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> &mut Chapter {
        let chapter = Chapter::new(title, content, self.chapters.len());
        self.chapters.push(chapter);
        self.modified = now();
        self.chapters.last_mut().expect("chapter was just pushed")
    }

    /// Remove a chapter by id, renumbering the chapters that follow it.
    /// Returns false if no chapter has that id.
    pub fn remove_chapter(&mut self, chapter_id: &str) -> bool {
        let Some(index) = self.chapters.iter().position(|c| c.id == chapter_id) else {
            return false;
        };
        self.chapters.remove(index);
        for (order, chapter) in self.chapters.iter_mut().enumerate().skip(index) {
            chapter.order = order;
        }
        self.modified = now();
        true
    }

    pub fn add_character(&mut self, name: impl Into<String>) -> &mut Character {
        self.characters.push(Character::new(name));
        self.modified = now();
        self.characters.last_mut().expect("character was just pushed")
    }

    pub fn remove_character(&mut self, character_id: &str) -> bool {
        let Some(index) = self.characters.iter().position(|c| c.id == character_id) else {
            return false;
        };
        self.characters.remove(index);
        self.modified = now();
        true
    }

    pub fn add_world_building(&mut self, name: impl Into<String>) -> &mut WorldBuilding {
        self.world_building.push(WorldBuilding::new(name));
        self.modified = now();
        self.world_building
            .last_mut()
            .expect("world-building entry was just pushed")
    }

    pub fn remove_world_building(&mut self, world_id: &str) -> bool {
        let Some(index) = self.world_building.iter().position(|w| w.id == world_id) else {
            return false;
        };
        self.world_building.remove(index);
        self.modified = now();
        true
    }

    pub fn add_story_note(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> &mut StoryNote {
        self.story_notes.push(StoryNote::new(title, content));
        self.modified = now();
        self.story_notes.last_mut().expect("note was just pushed")
    }

    pub fn remove_story_note(&mut self, note_id: &str) -> bool {
        let Some(index) = self.story_notes.iter().position(|n| n.id == note_id) else {
            return false;
        };
        self.story_notes.remove(index);
        self.modified = now();
        true
    }

    /// Total word count over all chapters, using the stored per-chapter
    /// counts.
    pub fn total_word_count(&self) -> usize {
        self.chapters.iter().map(|c| c.word_count).sum()
    }

    /// Recompute every chapter's word count from its current content.
    pub fn refresh_word_counts(&mut self) {
        for chapter in &mut self.chapters {
            chapter.update_word_count();
        }
        self.modified = now();
    }

    /// Serialize the book to its canonical pretty-printed JSON form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            BookvaultError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Serialization,
                "failed to serialize project",
                e,
            )
        })
    }

    /// Parse a book from its JSON form. Missing fields default to empty;
    /// unknown fields are ignored.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            BookvaultError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Serialization,
                "failed to parse project file",
                e,
            )
        })
    }

    /// Render the book as a markdown manuscript: metadata header, narrative
    /// fields, chapters in order, characters and world-building sections.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        let title = if self.title.is_empty() {
            "Untitled Book"
        } else {
            self.title.as_str()
        };
        out.push_str(&format!("# {title}\n\n"));
        out.push_str(&format!("**Author:** {}\n", self.author));
        out.push_str(&format!("**Genre:** {}\n", self.genre));
        out.push_str(&format!("**Created:** {}\n\n", self.created.to_rfc3339()));

        if !self.story_background.is_empty() {
            out.push_str("## Story Background\n\n");
            out.push_str(&self.story_background);
            out.push_str("\n\n");
        }

        if !self.plot_outline.is_empty() {
            out.push_str("## Plot Outline\n\n");
            out.push_str(&self.plot_outline);
            out.push_str("\n\n");
        }

        if !self.chapters.is_empty() {
            out.push_str("## Chapters\n\n");
            let mut chapters: Vec<&Chapter> = self.chapters.iter().collect();
            chapters.sort_by_key(|c| c.order);
            for chapter in chapters {
                let title = if chapter.title.is_empty() {
                    "Untitled Chapter"
                } else {
                    chapter.title.as_str()
                };
                out.push_str(&format!("### {title}\n\n"));
                out.push_str(&chapter.content);
                out.push_str("\n\n");
            }
        }

        if !self.characters.is_empty() {
            out.push_str("## Characters\n\n");
            for character in &self.characters {
                let name = if character.name.is_empty() {
                    "Unnamed Character"
                } else {
                    character.name.as_str()
                };
                out.push_str(&format!("### {name}\n\n"));
                if !character.description.is_empty() {
                    out.push_str(&format!("**Description:** {}\n\n", character.description));
                }
                if !character.background.is_empty() {
                    out.push_str(&format!("**Background:** {}\n\n", character.background));
                }
            }
        }

        if !self.world_building.is_empty() {
            out.push_str("## World Building\n\n");
            for entry in &self.world_building {
                let name = if entry.name.is_empty() {
                    "Unnamed Element"
                } else {
                    entry.name.as_str()
                };
                out.push_str(&format!("### {name}\n\n"));
                if !entry.description.is_empty() {
                    out.push_str(&entry.description);
                    out.push_str("\n\n");
                }
            }
        }

        out
    }
}
