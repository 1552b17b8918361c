//! Evacuation Simulation Library
//!
//! A crowd evacuation engine for multi-floor buildings that can be driven
//! headlessly or embedded behind an interactive front end.

pub mod simulation;
