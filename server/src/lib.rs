//! Hero-Wars server: player registry, persistence, configuration and the
//! event router that drives the shared progression core.

pub mod commands;
pub mod config;
pub mod entities;
pub mod host;
pub mod menus;
pub mod messages;
pub mod persistence;
pub mod registry;
pub mod router;
