// Planner library surface: configuration for the preview binary.

pub mod config;
