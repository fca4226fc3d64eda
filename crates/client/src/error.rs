//! Caller-visible failure taxonomy for client operations.
//!
//! The client never propagates `reqwest` errors: transport failures are
//! logged at the call site and surfaced as one of these resource-specific
//! variants, which screens render verbatim as a dismissible banner. No
//! failure here is fatal — the user retries the action.

use std::fmt;

/// The resource family an operation was acting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Practitioner,
    Patient,
    Note,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Practitioner => "practitioner",
            ResourceKind::Patient => "patient",
            ResourceKind::Note => "note",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by [`crate::FhirClient`] operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClientError {
    /// A search or read failed in transport; callers degrade to an empty
    /// display and offer a retry.
    #[error("failed to load {0}s, please try again")]
    Load(ResourceKind),

    /// A create failed in transport; surfaced as a blocking message.
    #[error("failed to create {0}, please try again")]
    Create(ResourceKind),

    /// An update failed in transport; surfaced as a blocking message.
    #[error("failed to update {0}, please try again")]
    Update(ResourceKind),

    /// A 2xx mutation reply arrived without a server-assigned id. Silent
    /// failure to persist clinical data is unacceptable, so this is treated
    /// exactly like a transport failure by callers.
    #[error("invalid response from server")]
    InvalidServerResponse,

    /// The client could not be constructed from the given configuration.
    #[error("invalid client configuration: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_resource_family() {
        assert_eq!(
            ClientError::Load(ResourceKind::Practitioner).to_string(),
            "failed to load practitioners, please try again"
        );
        assert_eq!(
            ClientError::Create(ResourceKind::Patient).to_string(),
            "failed to create patient, please try again"
        );
        assert_eq!(
            ClientError::Update(ResourceKind::Note).to_string(),
            "failed to update note, please try again"
        );
    }
}
