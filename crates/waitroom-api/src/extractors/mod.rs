//! Request extractors.

pub mod secret;

pub use secret::SharedSecret;
