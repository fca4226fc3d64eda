//! FHIR R4 wire models for the clinical notes client.
//!
//! This crate provides **wire models** and **translation helpers** for the
//! three resources the application works with over a FHIR REST endpoint:
//! - Practitioner
//! - Patient
//! - DocumentReference (clinical notes)
//!
//! This crate focuses on:
//! - serialisation/deserialisation of resource JSON
//! - extracting resources from searchset bundles
//! - encoding/decoding note text attachments
//!
//! Unlike resource schemas owned locally, these schemas are owned by the
//! remote server: parsing is deliberately permissive (unknown fields are
//! ignored, absent fields default), and serialisation omits empty fields so
//! partial resources can be sent for creates and updates. Resource ids are
//! opaque strings assigned by the server and never generated here.

pub mod bundle;
pub mod document_reference;
pub mod patient;
pub mod practitioner;
pub mod types;

// Re-export facades
pub use bundle::collect_resources;
pub use document_reference::{Attachment, Content, DocumentReference, NoteStatus, TypeText};
pub use patient::Patient;
pub use practitioner::Practitioner;
pub use types::{HumanName, Meta, Reference};

/// Errors arising from wire-format translation.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("attachment data is not valid base64: {0}")]
    AttachmentDecode(base64::DecodeError),
    #[error("attachment data is not valid UTF-8: {0}")]
    AttachmentText(std::string::FromUtf8Error),
}

/// A FHIR resource type this client reads and writes.
///
/// Implemented by [`Practitioner`], [`Patient`] and [`DocumentReference`].
/// The associated `TYPE` is the wire `resourceType` tag used on request
/// paths and when filtering searchset bundle entries.
pub trait Resource: serde::de::DeserializeOwned + serde::Serialize {
    /// Wire `resourceType` value, also the REST path segment.
    const TYPE: &'static str;

    /// Server-assigned id, if this instance has been persisted.
    fn id(&self) -> Option<&str>;

    /// Last-updated timestamp from resource metadata, if present.
    fn last_updated(&self) -> Option<chrono::DateTime<chrono::Utc>>;
}
