// Weft: Cross-group theme analysis for interview research
//
// This is the library root. Each module corresponds to a major subsystem
// of the analysis pipeline.

pub mod classify;
pub mod compare;
pub mod config;
pub mod corpus;
pub mod db;
pub mod error;
pub mod output;
pub mod params;
pub mod pipeline;
pub mod status;
pub mod themes;
