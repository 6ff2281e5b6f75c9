//! HTTP request handlers.

pub mod clients;
pub mod health;
pub mod rooms;
