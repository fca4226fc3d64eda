//! Wire types shared by every resource.
//!
//! Responsibilities:
//! - Human names as the server sends them, with a display helper
//! - `Type/{id}` reference strings with typed constructors
//! - Resource metadata (last-updated timestamp)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A human name entry as carried on Practitioner and Patient resources.
///
/// The server may send any number of name entries; this application only
/// ever renders the first one.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct HumanName {
    /// Name prefixes, e.g. "Dr".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,

    /// Given names in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    /// Family name (surname).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl HumanName {
    /// Render as a single display string: prefixes, given names, family.
    ///
    /// Empty components are skipped; an entirely empty name renders as "".
    pub fn display(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.prefix.iter().map(String::as_str));
        parts.extend(self.given.iter().map(String::as_str));
        if let Some(family) = &self.family {
            parts.push(family);
        }
        parts.join(" ").trim().to_string()
    }
}

/// Render the primary (first) name of a resource's name list.
///
/// Resources with no name entries render as the given fallback.
pub fn primary_name(names: &[HumanName], fallback: &str) -> String {
    match names.first() {
        Some(name) => {
            let display = name.display();
            if display.is_empty() {
                fallback.to_string()
            } else {
                display
            }
        }
        None => fallback.to_string(),
    }
}

/// A reference to another resource, e.g. `Practitioner/42`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Reference {
    pub reference: String,
}

impl Reference {
    /// Reference to a practitioner by id.
    pub fn practitioner(id: &str) -> Self {
        Self {
            reference: format!("Practitioner/{id}"),
        }
    }

    /// Reference to a patient by id.
    pub fn patient(id: &str) -> Self {
        Self {
            reference: format!("Patient/{id}"),
        }
    }

    /// The local id portion of the reference, after the final `/`.
    pub fn id(&self) -> &str {
        match self.reference.rsplit_once('/') {
            Some((_, id)) => id,
            None => &self.reference,
        }
    }
}

/// Resource metadata maintained by the server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Meta {
    #[serde(
        rename = "lastUpdated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_full_name_in_order() {
        let name = HumanName {
            prefix: vec!["Dr".into()],
            given: vec!["Sarah".into(), "Jane".into()],
            family: Some("Williams".into()),
        };
        assert_eq!(name.display(), "Dr Sarah Jane Williams");
    }

    #[test]
    fn displays_partial_names_without_stray_spaces() {
        let name = HumanName {
            family: Some("Williams".into()),
            ..Default::default()
        };
        assert_eq!(name.display(), "Williams");

        let name = HumanName {
            given: vec!["Sarah".into()],
            ..Default::default()
        };
        assert_eq!(name.display(), "Sarah");
    }

    #[test]
    fn primary_name_falls_back_when_unnamed() {
        assert_eq!(primary_name(&[], "Unnamed"), "Unnamed");
        assert_eq!(primary_name(&[HumanName::default()], "Unnamed"), "Unnamed");
    }

    #[test]
    fn reference_round_trips_local_id() {
        let r = Reference::practitioner("42");
        assert_eq!(r.reference, "Practitioner/42");
        assert_eq!(r.id(), "42");

        let r = Reference::patient("abc-123");
        assert_eq!(r.reference, "Patient/abc-123");
        assert_eq!(r.id(), "abc-123");
    }
}
