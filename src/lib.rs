//! OSINT Lead Enrichment API Library
//!
//! Raw text describing a sales lead is sent to a generative-AI service that
//! infers contact and company details; the result is stored in an embedded
//! SQLite table and served over HTTP with CSV import and export.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `data`: Data access layer.
//! - `integrations`: External service integrations.
//! - `batch`: Batch import orchestration with progress reporting.
//! - `config`: Configuration management.
//! - `csv_io`: CSV import and export.
//! - `db`: Database connection, pool and migrations.
//! - `db_storage`: Lead store operations.
//! - `enrichment`: Enrichment prompt, schema, response parsing and pipeline.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and routes.
//! - `models`: Lead and enrichment data models.
//! - `services`: Gemini client.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod batch;
pub mod config;
pub mod csv_io;
pub mod db;
pub mod db_storage;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
