//! `SmartPlate` - a meal-tracking application core
//!
//! This crate provides the data and aggregation layer behind SmartPlate:
//! user accounts, per-user meal logs with free-form nutrient strings, daily
//! nutrient analytics, and clients for the recipe lookup and chat completion
//! services. The interactive surface is a thin line-based shell; all visual
//! presentation lives outside this crate.

#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
#![warn(
    missing_docs,

    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,       // Will add gradually
    clippy::missing_panics_doc,       // Will add gradually
)]

/// External service clients - recipe lookup and chat completion
pub mod api;
/// Interactive session loop (presentation only)
pub mod cli;
/// Application configuration from config.toml and environment
pub mod config;
/// Core business logic - nutrient normalization, BMI, daily analytics
pub mod core;
/// SQLite persistence - users, profiles, meal logs
pub mod db;
/// Unified error types and result handling
pub mod errors;
/// Domain types shared across the crate
pub mod models;
/// Persisted user settings (theme and API credentials)
pub mod settings;
