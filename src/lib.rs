//! Course administration: a panel that keeps a client-side course list in
//! step with a remote API, plus a small reference server for that API.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod grid;
pub mod models;
pub mod panel;
pub mod state;
pub mod store;
pub mod validation;
