//! # TutorSync Core
//!
//! Domain types and booking rules for the TutorSync tutoring-session
//! platform. This crate holds everything the rest of the workspace agrees
//! on: the appointment model, the error taxonomy, the pure state
//! transitions that guard capacity and occupancy, and the
//! [`engine::AppointmentStore`] contract that store implementations
//! provide.
//!
//! The crate is deliberately free of I/O so the booking rules can be
//! tested without a database or an HTTP server.

pub mod engine;
pub mod errors;
pub mod models;
