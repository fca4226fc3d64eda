//! Practitioner wire model.
//!
//! Practitioners are the first selection a user makes; patients and notes
//! are scoped under the active practitioner. The wire shape is read back
//! exactly as the server sends it, so only the fields this application
//! renders are modelled.

use crate::types::{HumanName, Meta};
use crate::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A FHIR Practitioner resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Practitioner {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Practitioner {
    /// Build a new active practitioner ready to be created on the server.
    ///
    /// The id is left absent; the server assigns one at creation.
    pub fn new(name: HumanName) -> Self {
        Self {
            resource_type: Self::TYPE.to_string(),
            id: None,
            active: Some(true),
            name: vec![name],
            meta: None,
        }
    }

    /// Primary display name, falling back for unnamed records.
    pub fn display_name(&self) -> String {
        crate::types::primary_name(&self.name, "Unnamed practitioner")
    }
}

impl Resource for Practitioner {
    const TYPE: &'static str = "Practitioner";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.meta.as_ref().and_then(|m| m.last_updated)
    }
}
