//! DocumentReference wire model — the transport shape of a clinical note.
//!
//! Responsibilities:
//! - Define the note resource with exactly one subject, author and
//!   attachment at creation time
//! - Encode/decode the note body, which travels base64-encoded inside
//!   `content[0].attachment.data`
//!
//! Notes:
//! - Notes are the only resource this application updates in place
//! - Recency ordering is driven by the server's lastUpdated metadata

use crate::types::{Meta, Reference};
use crate::{FhirError, Resource};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type of note bodies written by this application.
pub const NOTE_CONTENT_TYPE: &str = "text/plain";

/// Free-text type label attached to every note.
pub const NOTE_TYPE_TEXT: &str = "Clinical Note";

/// Lifecycle status of a note.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NoteStatus {
    Current,
    Superseded,
    EnteredInError,
}

/// Free-text coding wrapper (`type.text`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TypeText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The base64 text payload embedded in a note.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Attachment {
    #[serde(
        rename = "contentType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Note body, base64-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Attachment {
    /// Build a plain-text attachment from a note body.
    pub fn from_text(title: &str, body: &str) -> Self {
        Self {
            content_type: Some(NOTE_CONTENT_TYPE.to_string()),
            title: Some(title.to_string()),
            data: Some(general_purpose::STANDARD.encode(body)),
        }
    }

    /// Decode the attachment data back to display text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the data is not valid base64 or the decoded
    /// bytes are not valid UTF-8. An absent data field decodes to `None`.
    pub fn to_text(&self) -> Result<Option<String>, FhirError> {
        let Some(data) = &self.data else {
            return Ok(None);
        };
        let bytes = general_purpose::STANDARD
            .decode(data)
            .map_err(FhirError::AttachmentDecode)?;
        let text = String::from_utf8(bytes).map_err(FhirError::AttachmentText)?;
        Ok(Some(text))
    }
}

/// One content entry wrapping an attachment.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Content {
    pub attachment: Attachment,
}

/// A FHIR DocumentReference resource carrying one clinical note.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DocumentReference {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NoteStatus>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_text: Option<TypeText>,

    /// The one subject patient, `Patient/{id}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    /// Author practitioners; this application writes exactly one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<Reference>,

    /// Human title of the note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Default for DocumentReference {
    /// An empty note shell with only the resource-type tag set; used as the
    /// base for partial update bodies.
    fn default() -> Self {
        Self {
            resource_type: Self::TYPE.to_string(),
            id: None,
            status: None,
            type_text: None,
            subject: None,
            author: Vec::new(),
            description: None,
            content: Vec::new(),
            meta: None,
        }
    }
}

impl DocumentReference {
    /// Build a new `current` note for a patient, authored by a practitioner.
    ///
    /// Exactly one subject, one author and one plain-text attachment are
    /// attached. An empty title falls back to "Untitled Note".
    pub fn new_note(patient_id: &str, practitioner_id: &str, title: &str, body: &str) -> Self {
        let title = if title.trim().is_empty() {
            "Untitled Note"
        } else {
            title
        };
        Self {
            resource_type: Self::TYPE.to_string(),
            id: None,
            status: Some(NoteStatus::Current),
            type_text: Some(TypeText {
                text: Some(NOTE_TYPE_TEXT.to_string()),
            }),
            subject: Some(Reference::patient(patient_id)),
            author: vec![Reference::practitioner(practitioner_id)],
            description: Some(title.to_string()),
            content: vec![Content {
                attachment: Attachment::from_text(title, body),
            }],
            meta: None,
        }
    }

    /// Decoded body text from the first content attachment.
    ///
    /// Notes without an attachment, or with undecodable data, yield `None`;
    /// display code treats both as an empty note.
    pub fn body_text(&self) -> Option<String> {
        self.content
            .first()
            .and_then(|c| c.attachment.to_text().ok().flatten())
    }
}

impl Resource for DocumentReference {
    const TYPE: &'static str = "DocumentReference";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.meta.as_ref().and_then(|m| m.last_updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_body_round_trips_exactly() {
        let note = DocumentReference::new_note("p1", "42", "Visit", "Hello world");
        assert_eq!(note.body_text().as_deref(), Some("Hello world"));
    }

    #[test]
    fn multi_byte_body_round_trips() {
        let body = "Blutdruck erhöht — контроль через 2 недели 🩺";
        let note = DocumentReference::new_note("p1", "42", "Visit", body);
        assert_eq!(note.body_text().as_deref(), Some(body));
    }

    #[test]
    fn new_note_carries_one_subject_author_and_attachment() {
        let note = DocumentReference::new_note("p1", "42", "Visit", "text");
        assert_eq!(
            note.subject.as_ref().map(|s| s.reference.as_str()),
            Some("Patient/p1")
        );
        assert_eq!(note.author.len(), 1);
        assert_eq!(note.author[0].reference, "Practitioner/42");
        assert_eq!(note.content.len(), 1);
        assert_eq!(
            note.content[0].attachment.content_type.as_deref(),
            Some(NOTE_CONTENT_TYPE)
        );
        assert_eq!(note.status, Some(NoteStatus::Current));
    }

    #[test]
    fn blank_title_falls_back_to_untitled() {
        let note = DocumentReference::new_note("p1", "42", "   ", "text");
        assert_eq!(note.description.as_deref(), Some("Untitled Note"));
    }

    #[test]
    fn status_uses_kebab_case_wire_strings() {
        assert_eq!(
            serde_json::to_value(NoteStatus::EnteredInError).unwrap(),
            serde_json::json!("entered-in-error")
        );
        let status: NoteStatus = serde_json::from_str("\"superseded\"").unwrap();
        assert_eq!(status, NoteStatus::Superseded);
    }

    #[test]
    fn invalid_base64_reports_decode_error() {
        let attachment = Attachment {
            data: Some("not//valid@@base64".into()),
            ..Default::default()
        };
        let err = attachment.to_text().expect_err("should reject bad base64");
        assert!(matches!(err, FhirError::AttachmentDecode(_)));
    }

    #[test]
    fn absent_data_decodes_to_none() {
        let attachment = Attachment::default();
        assert_eq!(attachment.to_text().expect("decode"), None);
    }
}
