//! # Academy Scheduling Backend
//!
//! Backend for a tutoring academy's teacher/student relationship and
//! scheduling lifecycle. Each teacher exposes a weekly grid of bookable time
//! slots; students acquire a fixed quota of slots per subscription; slots are
//! exclusively assigned, released deterministically on archival or
//! trial-rejection, and re-validated whenever a student changes teacher or
//! subscription. A REST API via axum fronts the whole thing.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Domain types (slot grids, students, sessions, finance)
//! - [`db`]: Repository pattern and storage backends
//! - [`services`]: Business logic — booking engine, trial conversion,
//!   archival, session ledger, settlement engine
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Concurrency
//!
//! Booking and release on one teacher's slot grid are serialized through a
//! per-teacher lock registry, so two concurrent reservations cannot both
//! observe a slot as free. Cross-teacher rebooks take both locks in
//! ascending teacher-id order. The settlement engine is self-excluding and
//! idempotent per period.

pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
