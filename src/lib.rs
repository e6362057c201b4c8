// src/lib.rs

#[macro_use]
pub mod macros;

pub mod config;
pub mod core;
pub mod error;
pub mod logger;
pub mod model;

pub mod adapters;
pub mod duplicates;
pub mod import;
pub mod qualification;
pub mod resolver;
pub mod standings;

pub mod csv;
pub mod file;
pub mod progress;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;
