//! Medical compliance and return-to-play decision engine.
//!
//! Tracks an athlete's injury status and converts it into actionable
//! training constraints: which exercises are unsafe and what to do
//! instead, how much load to cut, whether a live session must stop, and
//! when an injured athlete may progress through the return-to-play
//! protocol. All scoring is a deterministic, explainable rule engine over
//! caller-supplied structured inputs; persistence and HTTP plumbing live
//! behind the [`store::MedicalRecordStore`] and [`cache::MedicalCache`]
//! seams.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::EngineConfig;
pub use engine::ComplianceEngine;
pub use error::ComplianceError;
