//! Peruvian labour benefits and tax engine
//!
//! This crate prorates labour benefits (CTS, gratificaciones, vacaciones
//! truncas and the liquidación on cessation) over their statutory semesters,
//! computes common tax figures (IGV, detracciones, intereses moratorios,
//! work income tax, regime comparison and fines), generates journal
//! entries from templates, builds loan schedules and writes amounts in
//! words. Every calculation returns an audit trace.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
