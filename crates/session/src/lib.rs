//! Cross-screen session selection state.
//!
//! This crate is the single source of truth for "which practitioner and
//! which patient are currently being worked on". The two ids survive
//! process restarts through a small durable key/value store, and every
//! screen observes changes through a subscription on the store.
//!
//! Responsibilities:
//! - Hold the active practitioner/patient ids in memory
//! - Synchronise them to durable storage under fixed keys, best-effort
//! - Enforce that a selected patient never outlives a cleared practitioner
//!
//! Notes:
//! - No network calls and no blocking work beyond storage I/O
//! - Mutation happens from a single thread; there is no internal locking

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::{SessionChange, SessionStore, PATIENT_KEY, PRACTITIONER_KEY};
