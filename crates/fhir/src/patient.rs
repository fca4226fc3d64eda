//! Patient wire model.
//!
//! Patients are owned by a practitioner through the `generalPractitioner`
//! reference list. The schema allows many owners, but this application
//! creates patients with exactly one and only ever reads the first.

use crate::types::{HumanName, Meta, Reference};
use crate::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A FHIR Patient resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Patient {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(
        rename = "generalPractitioner",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub general_practitioner: Vec<Reference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Patient {
    /// Build a new active patient owned by the given practitioner.
    ///
    /// Every patient created by this application carries exactly one
    /// generalPractitioner reference. The id is server-assigned.
    pub fn new(name: HumanName, practitioner_id: &str) -> Self {
        Self {
            resource_type: Self::TYPE.to_string(),
            id: None,
            active: Some(true),
            name: vec![name],
            general_practitioner: vec![Reference::practitioner(practitioner_id)],
            meta: None,
        }
    }

    /// Primary display name, falling back for unnamed records.
    pub fn display_name(&self) -> String {
        crate::types::primary_name(&self.name, "Unnamed patient")
    }

    /// Id of the owning practitioner, from the first reference.
    pub fn practitioner_id(&self) -> Option<&str> {
        self.general_practitioner.first().map(Reference::id)
    }
}

impl Resource for Patient {
    const TYPE: &'static str = "Patient";

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
    fn new_patient_references_its_practitioner() {
        let p = Patient::new(
            HumanName {
                given: vec!["Sarah".into()],
                family: Some("Williams".into()),
                ..Default::default()
            },
            "42",
        );
        assert_eq!(p.general_practitioner.len(), 1);
        assert_eq!(p.general_practitioner[0].reference, "Practitioner/42");
        assert_eq!(p.practitioner_id(), Some("42"));
    }

    #[test]
    fn create_body_carries_general_practitioner_reference() {
        let p = Patient::new(
            HumanName {
                family: Some("Williams".into()),
                ..Default::default()
            },
            "42",
        );
        let json = serde_json::to_value(&p).expect("serialise patient");
        assert_eq!(
            json["generalPractitioner"][0]["reference"],
            serde_json::json!("Practitioner/42")
        );
        assert!(json.get("id").is_none());
    }
}
