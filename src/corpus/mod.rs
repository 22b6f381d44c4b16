//! Document corpus access.
//!
//! The index reads notes through [`CorpusSource`]: a paginated note listing,
//! single-note lookup, and folder lookup. [`JoplinClient`] implements it over
//! the Joplin Data API.

pub mod joplin;

use std::future::Future;

use serde::Deserialize;

use crate::error::Result;

pub use joplin::{DEFAULT_JOPLIN_ENDPOINT, JoplinClient, JoplinSettings};

/// Note fields that can be requested from the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Id,
    Title,
    Body,
    UpdatedTime,
    ParentId,
}

impl NoteField {
    /// Fields needed to index a note.
    pub const INDEXED: &'static [Self] = &[
        Self::Id,
        Self::Title,
        Self::Body,
        Self::UpdatedTime,
        Self::ParentId,
    ];

    /// Fields needed to detect deletions and changes.
    pub const SCAN: &'static [Self] = &[Self::Id, Self::UpdatedTime];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Body => "body",
            Self::UpdatedTime => "updated_time",
            Self::ParentId => "parent_id",
        }
    }
}

/// Join fields into the comma-separated form the Data API expects.
#[must_use]
pub fn field_list(fields: &[NoteField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// A note as returned by the corpus. Fields not requested are defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoteMeta {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Modification time in milliseconds since the epoch.
    #[serde(default)]
    pub updated_time: i64,
    /// Containing folder id; empty for notes outside any folder.
    #[serde(default)]
    pub parent_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FolderMeta {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Read access to the note corpus.
pub trait CorpusSource: Send + Sync {
    /// One page of notes (1-based). An empty page marks the end.
    fn list_notes(
        &self,
        page: usize,
        limit: usize,
        fields: &[NoteField],
    ) -> impl Future<Output = Result<Vec<NoteMeta>>> + Send;

    /// A single note. Fails with `Error::NoteNotFound` if it does not exist.
    fn get_note(&self, id: &str, fields: &[NoteField]) -> impl Future<Output = Result<NoteMeta>> + Send;

    /// A folder by id.
    fn get_folder(&self, id: &str) -> impl Future<Output = Result<FolderMeta>> + Send;
}

/// The text stored and embedded for a note: `"<folder> > <title>\n\n<body>"`.
#[must_use]
pub fn compose_text(folder_title: &str, note: &NoteMeta) -> String {
    format!("{folder_title} > {}\n\n{}", note.title, note.body)
}
