//! The FHIR REST client.
//!
//! One `FhirClient` is constructed per session and shared by reference.
//! Each operation is a single awaited HTTP round trip; the underlying
//! connection pool is managed by `reqwest`.
//!
//! Search operations are deliberately permissive: a well-formed reply with
//! no result collection is an empty list, because screens must render "no
//! results" gracefully against an unreliable shared test server. Create
//! and update are strict: a reply without a server-assigned id is a hard
//! error, because silently failing to persist clinical data is not
//! acceptable.

use crate::error::{ClientError, ResourceKind};
use fhir::{DocumentReference, Patient, Practitioner, Resource};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::warn;

/// Open public HAPI R4 endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://hapi.fhir.org/baseR4";

const FHIR_JSON: &str = "application/fhir+json";

/// Every search asks the server for newest-first ordering; call sites rely
/// on `result[0]` being the latest resource.
const SORT_NEWEST_FIRST: (&str, &str) = ("_sort", "-_lastUpdated");

/// Optional filters for patient searches.
#[derive(Clone, Debug, Default)]
pub struct PatientFilter {
    /// Free-text name filter.
    pub name: Option<String>,
    /// Restrict to patients owned by this practitioner.
    pub practitioner_id: Option<String>,
}

/// Typed client for the four resource-operation families.
#[derive(Clone, Debug)]
pub struct FhirClient {
    http: reqwest::Client,
    base_url: String,
}

impl FhirClient {
    /// Client against the default public endpoint.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against a specific FHIR base URL.
    ///
    /// Trailing slashes are trimmed so resource paths can be appended
    /// uniformly.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the URL is empty or the
    /// HTTP client cannot be initialised.
    pub fn with_base_url(base_url: &str) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration(
                "FHIR base URL cannot be empty".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FHIR_JSON));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| ClientError::Configuration(err.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------
    // Practitioner operations
    // ------------------------------------------------------------------

    /// Search practitioners, newest first, optionally filtered by name.
    pub async fn search_practitioners(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<Practitioner>, ClientError> {
        self.search(ResourceKind::Practitioner, &practitioner_query(name))
            .await
    }

    /// Create a practitioner and return it with its server-assigned id.
    pub async fn create_practitioner(
        &self,
        practitioner: &Practitioner,
    ) -> Result<Practitioner, ClientError> {
        self.create(ResourceKind::Practitioner, practitioner).await
    }

    /// Read a single practitioner by id.
    pub async fn read_practitioner(&self, id: &str) -> Result<Practitioner, ClientError> {
        self.read(ResourceKind::Practitioner, id).await
    }

    // ------------------------------------------------------------------
    // Patient operations
    // ------------------------------------------------------------------

    /// Search patients, newest first, by name and/or owning practitioner.
    pub async fn search_patients(&self, filter: &PatientFilter) -> Result<Vec<Patient>, ClientError> {
        self.search(ResourceKind::Patient, &patient_query(filter))
            .await
    }

    /// Create a patient and return it with its server-assigned id.
    pub async fn create_patient(&self, patient: &Patient) -> Result<Patient, ClientError> {
        self.create(ResourceKind::Patient, patient).await
    }

    /// Read a single patient by id.
    pub async fn read_patient(&self, id: &str) -> Result<Patient, ClientError> {
        self.read(ResourceKind::Patient, id).await
    }

    // ------------------------------------------------------------------
    // Note operations
    // ------------------------------------------------------------------

    /// Search a patient's notes, newest first.
    pub async fn search_notes(&self, patient_id: &str) -> Result<Vec<DocumentReference>, ClientError> {
        self.search(ResourceKind::Note, &note_query(patient_id))
            .await
    }

    /// Create a note and return it with its server-assigned id.
    pub async fn create_note(
        &self,
        note: &DocumentReference,
    ) -> Result<DocumentReference, ClientError> {
        self.create(ResourceKind::Note, note).await
    }

    /// Replace the note at `id` with the given fields.
    ///
    /// The note's `resourceType` and `id` are injected into the body before
    /// sending, so partial field sets can be passed through as-is.
    pub async fn update_note(
        &self,
        id: &str,
        note: &DocumentReference,
    ) -> Result<DocumentReference, ClientError> {
        let body = note_update_body(id, note)?;
        let outcome = async {
            self.update_request(id, &body)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;

        match outcome {
            Ok(reply) => persisted_resource(reply),
            Err(err) => {
                warn!(resource = DocumentReference::TYPE, id, error = %err, "update request failed");
                Err(ClientError::Update(ResourceKind::Note))
            }
        }
    }

    // ------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------

    fn resource_url(&self, resource_type: &str) -> String {
        format!("{}/{}", self.base_url, resource_type)
    }

    fn instance_url(&self, resource_type: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, resource_type, id)
    }

    fn search_request(
        &self,
        resource_type: &str,
        query: &[(&str, String)],
    ) -> reqwest::RequestBuilder {
        self.http.get(self.resource_url(resource_type)).query(query)
    }

    fn create_request<T: Resource>(&self, resource: &T) -> reqwest::RequestBuilder {
        self.http.post(self.resource_url(T::TYPE)).json(resource)
    }

    fn update_request(&self, id: &str, body: &Value) -> reqwest::RequestBuilder {
        self.http
            .put(self.instance_url(DocumentReference::TYPE, id))
            .json(body)
    }

    async fn search<T: Resource>(
        &self,
        kind: ResourceKind,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ClientError> {
        let outcome = async {
            self.search_request(T::TYPE, query)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;

        match outcome {
            Ok(body) => Ok(fhir::collect_resources(&body)),
            Err(err) => {
                warn!(resource = T::TYPE, error = %err, "search request failed");
                Err(ClientError::Load(kind))
            }
        }
    }

    async fn read<T: Resource>(&self, kind: ResourceKind, id: &str) -> Result<T, ClientError> {
        let outcome = async {
            self.http
                .get(self.instance_url(T::TYPE, id))
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;

        match outcome {
            Ok(body) => instance_resource(kind, id, body),
            Err(err) => {
                warn!(resource = T::TYPE, id, error = %err, "read request failed");
                Err(ClientError::Load(kind))
            }
        }
    }

    async fn create<T: Resource>(&self, kind: ResourceKind, resource: &T) -> Result<T, ClientError> {
        let outcome = async {
            self.create_request(resource)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;

        match outcome {
            Ok(reply) => persisted_resource(reply),
            Err(err) => {
                warn!(resource = T::TYPE, error = %err, "create request failed");
                Err(ClientError::Create(kind))
            }
        }
    }
}

/// Accept a mutation reply only if the server assigned an id.
fn persisted_resource<T: Resource>(reply: Value) -> Result<T, ClientError> {
    match reply.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => {
            serde_json::from_value(reply).map_err(|_| ClientError::InvalidServerResponse)
        }
        _ => Err(ClientError::InvalidServerResponse),
    }
}

/// Parse an id-addressed read reply into the expected resource shape.
///
/// Reads share the search failure mode: a reply that is not the requested
/// resource degrades to [`ClientError::Load`], never a raw parse error.
fn instance_resource<T: Resource>(kind: ResourceKind, id: &str, reply: Value) -> Result<T, ClientError> {
    serde_json::from_value(reply).map_err(|err| {
        warn!(resource = T::TYPE, id, error = %err, "read reply did not match resource shape");
        ClientError::Load(kind)
    })
}

/// Full-replace body for a note update: the partial fields with the
/// resource-type tag and id overwritten.
fn note_update_body(id: &str, note: &DocumentReference) -> Result<Value, ClientError> {
    let mut body = serde_json::to_value(note).map_err(|err| {
        warn!(id, error = %err, "failed to serialise note update");
        ClientError::Update(ResourceKind::Note)
    })?;
    if let Value::Object(fields) = &mut body {
        fields.insert("resourceType".into(), DocumentReference::TYPE.into());
        fields.insert("id".into(), id.into());
    }
    Ok(body)
}

fn practitioner_query(name: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![(SORT_NEWEST_FIRST.0, SORT_NEWEST_FIRST.1.to_string())];
    if let Some(name) = name {
        query.push(("name", name.to_string()));
    }
    query
}

fn patient_query(filter: &PatientFilter) -> Vec<(&'static str, String)> {
    let mut query = vec![(SORT_NEWEST_FIRST.0, SORT_NEWEST_FIRST.1.to_string())];
    if let Some(name) = &filter.name {
        query.push(("name", name.clone()));
    }
    if let Some(practitioner_id) = &filter.practitioner_id {
        query.push((
            "general-practitioner",
            format!("Practitioner/{practitioner_id}"),
        ));
    }
    query
}

fn note_query(patient_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("subject", format!("Patient/{patient_id}")),
        (SORT_NEWEST_FIRST.0, SORT_NEWEST_FIRST.1.to_string()),
    ]
}
