pub mod attention;
pub mod cohort;
pub mod error;
pub mod import;
pub mod models;
pub mod report;
pub mod scoring;
pub mod seed;
pub mod telemetry;
pub mod validation;
