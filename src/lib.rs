//! Checks the latest activities of a fitness tracking account against the archives downloaded to
//! a local folder, then extracts the matching archives and gives each activity file a sortable,
//! readable name: `20230704-081530-activity_12345678_Morning_Ride.fit`.
//!

pub mod activity;
pub mod archive;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod source;
pub mod utils;
