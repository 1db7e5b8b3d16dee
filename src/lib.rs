//! Gamified habit tracking — quests, XP, streaks, and insights.
//!
//! questlog is a small self-hosted backend where habits are quests: each
//! completion earns (or costs) XP, days aggregate toward a daily goal, and a
//! lifetime profile tracks level and streaks. Analytics and notification
//! content derive from the aggregate history.
//!
//! # Architecture
//!
//! - **Storage**: SQLite. The completion ledger is the source of truth;
//!   daily aggregates and the profile are cached views maintained in the
//!   same transaction as every ledger write, and recomputable from the
//!   ledger for repair.
//! - **Surface**: an axum HTTP API plus a clap CLI for reports and
//!   maintenance.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite initialization, schema, and migrations
//! - [`ledger`] — Quest catalog, completion ledger, daily aggregates, profile
//! - [`insights`] — Read-only analytics over the aggregate history
//! - [`notify`] — Notification content generation for an external dispatcher

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod insights;
pub mod ledger;
pub mod notify;
pub mod server;
