//! Surveillance HUD back end.

pub mod dashboard;
