// SPDX-License-Identifier: MIT

//! Pulseboard: personal productivity backend.
//!
//! This crate provides the REST API for todos, kanban boards, health
//! logging, daily streak tracking, and project collaboration with
//! owner/admin/editor/viewer roles.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
}
