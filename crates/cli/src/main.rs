//! Terminal front-end for the clinical notes workflow.
//!
//! Subcommands mirror the three screens of the application: pick a
//! practitioner, pick one of their patients, then author, read and export
//! that patient's notes. Selection state persists between invocations via
//! the session store, so the workflow spans processes the way the original
//! screens span page loads.
//!
//! # Environment Variables
//! - `FHIR_BASE_URL`: FHIR endpoint (default: the public HAPI R4 server)
//! - `NOTES_SESSION_FILE`: session state file (default: ".notes-session.json")

mod export;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use export::NoteDocument;
use fhir::{DocumentReference, HumanName, Patient, Practitioner, Resource};
use notes_client::{latest_note_previews, FhirClient, PatientFilter, DEFAULT_BASE_URL};
use notes_session::{FileStorage, SessionStore};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SESSION_FILE: &str = ".notes-session.json";

/// Preview length for the latest note shown against each patient.
const PREVIEW_CHARS: usize = 80;

#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "Clinical notes against a FHIR server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List practitioners, newest first
    Practitioners {
        /// Filter by name
        #[arg(long)]
        name: Option<String>,
    },
    /// Create a practitioner and make them the active selection
    AddPractitioner {
        /// Given name
        given: String,
        /// Family name
        family: String,
        /// Name prefix, e.g. "Dr"
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Make a practitioner the active selection
    SelectPractitioner {
        /// Practitioner id
        id: String,
    },
    /// List the active practitioner's patients with latest-note previews
    Patients {
        /// Filter by name
        #[arg(long)]
        name: Option<String>,
    },
    /// Create a patient under the active practitioner and select them
    AddPatient {
        /// Given name
        given: String,
        /// Family name
        family: String,
    },
    /// Make a patient the active selection
    SelectPatient {
        /// Patient id
        id: String,
    },
    /// List the active patient's notes, newest first
    Notes,
    /// Create a note for the active patient
    AddNote {
        /// Note title
        title: String,
        /// Note body
        #[arg(long)]
        text: String,
    },
    /// Overwrite an existing note of the active patient
    EditNote {
        /// Note id
        id: String,
        /// New title (keeps the old one if omitted)
        #[arg(long)]
        title: Option<String>,
        /// New body (keeps the old one if omitted)
        #[arg(long)]
        text: Option<String>,
    },
    /// Export a note of the active patient to a Markdown document
    ExportNote {
        /// Note id
        id: String,
        /// Output path (derived from the note title if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the active practitioner and patient
    Status,
    /// Clear the active selection
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("notes_cli=info".parse()?)
                .add_directive("notes_client=info".parse()?)
                .add_directive("notes_session=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("FHIR_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let client = FhirClient::with_base_url(&base_url)?;
    info!(base_url = client.base_url(), "using FHIR endpoint");

    let session_file =
        std::env::var("NOTES_SESSION_FILE").unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
    let mut store = SessionStore::new(Box::new(FileStorage::new(session_file.as_str())));
    info!(
        session_file = %session_file,
        practitioner = store.active_practitioner_id().unwrap_or("none"),
        patient = store.active_patient_id().unwrap_or("none"),
        "session state restored"
    );

    match Cli::parse().command {
        Commands::Practitioners { name } => {
            list_practitioners(&client, &store, name.as_deref()).await?;
        }
        Commands::AddPractitioner {
            given,
            family,
            prefix,
        } => {
            let name = HumanName {
                prefix: prefix.into_iter().collect(),
                given: vec![given],
                family: Some(family),
            };
            let created = client.create_practitioner(&Practitioner::new(name)).await?;
            let id = created
                .id
                .clone()
                .context("created practitioner has no id")?;
            store.set_active_practitioner_id(Some(id.clone()));
            println!("Created practitioner {} ({id}), now active.", created.display_name());
        }
        Commands::SelectPractitioner { id } => {
            store.set_active_practitioner_id(Some(id.clone()));
            println!("Active practitioner: {id}");
        }
        Commands::Patients { name } => {
            list_patients(&client, &store, name).await?;
        }
        Commands::AddPatient { given, family } => {
            let practitioner_id = require_practitioner(&store)?;
            let name = HumanName {
                given: vec![given],
                family: Some(family),
                ..Default::default()
            };
            let created = client
                .create_patient(&Patient::new(name, &practitioner_id))
                .await?;
            let id = created.id.clone().context("created patient has no id")?;
            store.set_active_patient_id(Some(id.clone()));
            println!("Created patient {} ({id}), now active.", created.display_name());
        }
        Commands::SelectPatient { id } => {
            require_practitioner(&store)?;
            store.set_active_patient_id(Some(id.clone()));
            println!("Active patient: {id}");
        }
        Commands::Notes => {
            list_notes(&client, &store).await?;
        }
        Commands::AddNote { title, text } => {
            let (practitioner_id, patient_id) = require_selection(&store)?;
            let note = DocumentReference::new_note(&patient_id, &practitioner_id, &title, &text);
            let created = client.create_note(&note).await?;
            println!(
                "Saved note {} ({}).",
                created.description.as_deref().unwrap_or("Untitled"),
                created.id.as_deref().unwrap_or("?"),
            );
        }
        Commands::EditNote { id, title, text } => {
            edit_note(&client, &store, &id, title, text).await?;
        }
        Commands::ExportNote { id, out } => {
            export_note(&client, &store, &id, out).await?;
        }
        Commands::Status => {
            show_status(&client, &store).await;
        }
        Commands::Clear => {
            store.set_active_practitioner_id(None);
            println!("Selection cleared.");
        }
    }

    Ok(())
}

/// The active practitioner id, or a user-facing error telling them to pick one.
fn require_practitioner(store: &SessionStore) -> anyhow::Result<String> {
    match store.active_practitioner_id() {
        Some(id) => Ok(id.to_string()),
        None => bail!("no active practitioner; run `notes select-practitioner <id>` first"),
    }
}

/// Both active ids, for note operations.
fn require_selection(store: &SessionStore) -> anyhow::Result<(String, String)> {
    let practitioner_id = require_practitioner(store)?;
    match store.active_patient_id() {
        Some(id) => Ok((practitioner_id, id.to_string())),
        None => bail!("no active patient; run `notes select-patient <id>` first"),
    }
}

async fn list_practitioners(
    client: &FhirClient,
    store: &SessionStore,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let practitioners = client.search_practitioners(name).await?;
    if practitioners.is_empty() {
        println!("No practitioners found.");
        return Ok(());
    }
    for practitioner in &practitioners {
        let id = practitioner.id.as_deref().unwrap_or("?");
        let marker = if store.active_practitioner_id() == practitioner.id.as_deref() {
            " *"
        } else {
            ""
        };
        println!(
            "{id}  {}  {}{marker}",
            practitioner.display_name(),
            format_last_updated(practitioner),
        );
    }
    Ok(())
}

async fn list_patients(
    client: &FhirClient,
    store: &SessionStore,
    name: Option<String>,
) -> anyhow::Result<()> {
    let practitioner_id = require_practitioner(store)?;
    let filter = PatientFilter {
        name,
        practitioner_id: Some(practitioner_id),
    };
    let patients = client.search_patients(&filter).await?;
    if patients.is_empty() {
        println!("No patients found.");
        return Ok(());
    }

    let patient_ids: Vec<String> = patients.iter().filter_map(|p| p.id.clone()).collect();
    let previews = latest_note_previews(client, &patient_ids, PREVIEW_CHARS).await;

    for patient in &patients {
        let id = patient.id.as_deref().unwrap_or("?");
        let marker = if store.active_patient_id() == patient.id.as_deref() {
            " *"
        } else {
            ""
        };
        println!(
            "{id}  {}  {}{marker}",
            patient.display_name(),
            format_last_updated(patient),
        );
        if let Some(preview) = patient.id.as_deref().and_then(|id| previews.get(id)) {
            println!("      {preview}");
        }
    }
    Ok(())
}

async fn list_notes(client: &FhirClient, store: &SessionStore) -> anyhow::Result<()> {
    let (practitioner_id, patient_id) = require_selection(store)?;

    // Header details and the note list are independent lookups; a failed
    // detail read only costs the header its names.
    let (practitioner, patient, notes) = tokio::join!(
        client.read_practitioner(&practitioner_id),
        client.read_patient(&patient_id),
        client.search_notes(&patient_id),
    );
    let notes = notes?;

    let patient_name = patient
        .map(|p| p.display_name())
        .unwrap_or_else(|_| patient_id.clone());
    let practitioner_name = practitioner
        .map(|p| p.display_name())
        .unwrap_or_else(|_| practitioner_id.clone());
    println!("Patient: {patient_name} | Practitioner: {practitioner_name}");

    if notes.is_empty() {
        println!("No clinical notes yet.");
        return Ok(());
    }
    for note in &notes {
        println!(
            "{}  {}  {}",
            note.id.as_deref().unwrap_or("?"),
            note.description.as_deref().unwrap_or("Untitled"),
            format_last_updated(note),
        );
        if let Some(body) = note.body_text() {
            for line in body.lines() {
                println!("      {line}");
            }
        }
    }
    Ok(())
}

async fn edit_note(
    client: &FhirClient,
    store: &SessionStore,
    id: &str,
    title: Option<String>,
    text: Option<String>,
) -> anyhow::Result<()> {
    let (practitioner_id, patient_id) = require_selection(store)?;
    let notes = client.search_notes(&patient_id).await?;
    let existing = notes
        .iter()
        .find(|note| note.id.as_deref() == Some(id))
        .with_context(|| format!("note {id} not found for the active patient"))?;

    let title = title
        .or_else(|| existing.description.clone())
        .unwrap_or_default();
    let text = text.or_else(|| existing.body_text()).unwrap_or_default();

    let replacement = DocumentReference::new_note(&patient_id, &practitioner_id, &title, &text);
    let updated = client.update_note(id, &replacement).await?;
    println!(
        "Updated note {} ({}).",
        updated.description.as_deref().unwrap_or("Untitled"),
        id,
    );
    Ok(())
}

async fn export_note(
    client: &FhirClient,
    store: &SessionStore,
    id: &str,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (practitioner_id, patient_id) = require_selection(store)?;
    let notes = client.search_notes(&patient_id).await?;
    let note = notes
        .iter()
        .find(|note| note.id.as_deref() == Some(id))
        .with_context(|| format!("note {id} not found for the active patient"))?;

    let (practitioner, patient) = tokio::join!(
        client.read_practitioner(&practitioner_id),
        client.read_patient(&patient_id),
    );

    let title = note.description.clone().unwrap_or_else(|| "Untitled".into());
    let document = NoteDocument {
        body: note.body_text().unwrap_or_default(),
        patient_name: patient
            .map(|p| p.display_name())
            .unwrap_or_else(|_| patient_id.clone()),
        practitioner_name: practitioner
            .map(|p| p.display_name())
            .unwrap_or_else(|_| practitioner_id.clone()),
        exported_at: chrono::Utc::now(),
        title,
    };

    let path = out.unwrap_or_else(|| PathBuf::from(export::default_file_name(&document.title)));
    document.write_to(&path)?;
    println!("Exported note to {}.", path.display());
    Ok(())
}

async fn show_status(client: &FhirClient, store: &SessionStore) {
    match store.active_practitioner_id() {
        Some(id) => {
            let name = match client.read_practitioner(id).await {
                Ok(practitioner) => practitioner.display_name(),
                Err(_) => "<unavailable>".to_string(),
            };
            println!("Active practitioner: {name} ({id})");
        }
        None => println!("Active practitioner: none"),
    }
    match store.active_patient_id() {
        Some(id) => {
            let name = match client.read_patient(id).await {
                Ok(patient) => patient.display_name(),
                Err(_) => "<unavailable>".to_string(),
            };
            println!("Active patient: {name} ({id})");
        }
        None => println!("Active patient: none"),
    }
}

/// Format a resource's last-updated timestamp for list output.
fn format_last_updated<T: Resource>(resource: &T) -> String {
    match resource.last_updated() {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}
