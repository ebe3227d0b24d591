//! Domain types for the rolling-mean signal job.

pub mod bar;

pub use bar::{bars_from_closes, Bar};
