pub mod annotate;
pub mod cli;
pub mod config;
pub mod diff;
pub mod event;
pub mod github;
pub mod report;
pub mod rule;
pub mod types;
pub mod workflow;
