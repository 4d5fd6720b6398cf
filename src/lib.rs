//! Server-authoritative cooperative garden session server.
//!
//! Two players share a short-lived room identified by a human-shareable
//! code, move around a garden, collect spawned resources and grow flowers
//! through staged nurture actions. The server owns all state and pushes it
//! to clients over WebSocket; rendering is a client concern.

// layers
pub mod domain;
pub mod infrastructure;
pub mod protocol;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
