//! Searchset bundle handling.
//!
//! Search responses arrive as a Bundle wrapping `entry[].resource` objects.
//! Shared public test servers return bundles of uneven quality: entries may
//! be missing their resource, carry an OperationOutcome, or fail to match
//! the expected shape. Extraction therefore filters rather than fails — a
//! bundle with no usable entries is an empty result, never an error.

use crate::Resource;
use serde_json::Value;

/// Extract all resources of type `T` from a searchset bundle body.
///
/// Entries are kept in bundle order (the client always requests
/// `-_lastUpdated`, so the first entry is the most recent). Entries that
/// are absent, tagged with a different `resourceType`, or undeserialisable
/// are skipped. A body without an `entry` array yields an empty vec.
pub fn collect_resources<T: Resource>(bundle: &Value) -> Vec<T> {
    let Some(entries) = bundle.get("entry").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| entry.get("resource"))
        .filter(|resource| {
            resource.get("resourceType").and_then(Value::as_str) == Some(T::TYPE)
        })
        .filter_map(|resource| serde_json::from_value(resource.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Patient;
    use serde_json::json;

    #[test]
    fn missing_entry_collection_yields_empty_list() {
        let bundle = json!({ "resourceType": "Bundle", "total": 0 });
        let patients: Vec<Patient> = collect_resources(&bundle);
        assert!(patients.is_empty());
    }

    #[test]
    fn non_object_body_yields_empty_list() {
        let patients: Vec<Patient> = collect_resources(&json!(null));
        assert!(patients.is_empty());
    }

    #[test]
    fn skips_entries_of_other_resource_types() {
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [
                { "resource": { "resourceType": "Patient", "id": "p1" } },
                { "resource": { "resourceType": "OperationOutcome" } },
                { "search": { "mode": "match" } },
                { "resource": { "resourceType": "Patient", "id": "p2" } },
            ]
        });
        let patients: Vec<Patient> = collect_resources(&bundle);
        let ids: Vec<_> = patients.iter().filter_map(|p| p.id.as_deref()).collect();
        assert_eq!(ids, ["p1", "p2"]);
    }

    #[test]
    fn preserves_bundle_order() {
        let bundle = json!({
            "entry": [
                { "resource": { "resourceType": "Patient", "id": "newest" } },
                { "resource": { "resourceType": "Patient", "id": "older" } },
            ]
        });
        let patients: Vec<Patient> = collect_resources(&bundle);
        assert_eq!(patients[0].id.as_deref(), Some("newest"));
    }
}
