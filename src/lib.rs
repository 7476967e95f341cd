//! Pocketlink - a local URL shortener
//!
//! This library turns long URLs into short codes with a limited validity,
//! keeps them in a key-value record store, and records clicks when a code
//! is resolved.
//!
//! # Architecture
//! - `services`: code registry, click recorder, batch shortener, redirect and stats
//! - `storage`: record store trait with memory and JSON file backends
//! - `logging`: domain event log, its sinks and `tracing` initialization
//! - `config`: TOML and environment configuration
//! - `interfaces`: command-line front end
//! - `runtime`: wiring of services from a configuration
//! - `utils`: URL validation, code alphabet and clocks

pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod logging;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
