//! Typed async client for the FHIR REST endpoint.
//!
//! This crate is the only place the application touches the network. It
//! translates the logical operations of the notes workflow — list/create
//! practitioners and patients, list/create/update clinical notes — into
//! HTTP requests against a configured FHIR base URL, normalises responses,
//! and converts transport failures into domain-level errors.
//!
//! Responsibilities:
//! - Build search/create/update requests with FHIR JSON content types
//! - Normalise searchset responses (missing results become empty lists)
//! - Enforce that persisted resources come back with a server-assigned id
//! - Keep raw transport errors out of caller-visible failures
//!
//! Notes:
//! - Every call is one awaited round trip; no retries, caching or request
//!   deduplication
//! - The target is an open shared test server, so search is permissive and
//!   mutation is strict

pub mod client;
pub mod error;
pub mod preview;

pub use client::{FhirClient, PatientFilter, DEFAULT_BASE_URL};
pub use error::{ClientError, ResourceKind};
pub use preview::latest_note_previews;
