//! Latest-note previews for patient listings.
//!
//! The patients screen shows a one-line excerpt of each patient's most
//! recent note. Lookups for the whole page are issued concurrently and
//! awaited jointly; a single failing lookup degrades to no preview for
//! that one patient and never fails the batch.

use crate::client::FhirClient;
use futures::future::join_all;
use std::collections::HashMap;

/// Fetch the newest note body for each patient, truncated for display.
///
/// Returns a map from patient id to preview text. Patients with no notes,
/// an empty or undecodable note body, or a failed lookup are absent from
/// the map. No ordering is guaranteed between the underlying requests.
pub async fn latest_note_previews(
    client: &FhirClient,
    patient_ids: &[String],
    max_chars: usize,
) -> HashMap<String, String> {
    let lookups = patient_ids.iter().map(|patient_id| async move {
        let notes = client.search_notes(patient_id).await.unwrap_or_default();
        let text = notes.first().and_then(|note| note.body_text())?;
        if text.is_empty() {
            return None;
        }
        Some((patient_id.clone(), truncate_preview(&text, max_chars)))
    });

    join_all(lookups).await.into_iter().flatten().collect()
}

/// Truncate on a character boundary, marking elided text with an ellipsis.
fn truncate_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(max_chars).collect();
    preview.push_str("...");
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_preview("Hello world", 80), "Hello world");
    }

    #[test]
    fn long_text_is_cut_at_a_character_boundary() {
        let text = "ä".repeat(100);
        let preview = truncate_preview(&text, 80);
        assert_eq!(preview.chars().count(), 83);
        assert!(preview.ends_with("..."));
    }

    #[tokio::test]
    async fn failing_lookups_degrade_to_no_preview() {
        // Nothing listens on port 1, so every lookup fails; the batch
        // itself must still succeed with an empty map.
        let client = FhirClient::with_base_url("http://127.0.0.1:1").expect("client");
        let ids = vec!["p1".to_string(), "p2".to_string()];
        let previews = latest_note_previews(&client, &ids, 80).await;
        assert!(previews.is_empty());
    }
}
