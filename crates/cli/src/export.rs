//! Note export to a local Markdown document.
//!
//! Mirrors what the export action on the notes screen produces: a header
//! identifying the patient, practitioner and date, followed by the note
//! title and body. This is a purely local operation — it never touches the
//! network — but its failures are reported to the user the same way as any
//! other action failure.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Fallback file stem for notes whose title yields no usable characters.
const DEFAULT_FILE_STEM: &str = "clinical-note";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write document to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Everything needed to render one note as a document.
#[derive(Debug)]
pub struct NoteDocument {
    pub title: String,
    pub body: String,
    pub patient_name: String,
    pub practitioner_name: String,
    pub exported_at: DateTime<Utc>,
}

impl NoteDocument {
    /// Render the document as Markdown text.
    pub fn render(&self) -> String {
        format!(
            "# Clinical Note\n\n\
             **Patient:** {patient}\n\
             **Practitioner:** {practitioner}\n\
             **Date:** {date}\n\n\
             ## {title}\n\n\
             {body}\n",
            patient = self.patient_name,
            practitioner = self.practitioner_name,
            date = self.exported_at.format("%Y-%m-%d"),
            title = self.title,
            body = self.body,
        )
    }

    /// Write the rendered document to the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Write`] if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        fs::write(path, self.render()).map_err(|source| ExportError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Derive a file name from a note title: whitespace runs become hyphens.
pub fn default_file_name(title: &str) -> String {
    let stem: Vec<&str> = title.split_whitespace().collect();
    if stem.is_empty() {
        format!("{DEFAULT_FILE_STEM}.md")
    } else {
        format!("{}.md", stem.join("-"))
    }
}
