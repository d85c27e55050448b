//! Late-return risk classification for library items.
//!
//! A fixed catalog of borrowing-behavior rules grades each return; anything the
//! catalog cannot grade is handed to an external risk predictor.

pub mod config;
pub mod error;
pub mod risk;
pub mod telemetry;
