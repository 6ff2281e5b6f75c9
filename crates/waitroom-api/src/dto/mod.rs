//! Request and response data shapes.

pub mod request;
pub mod response;
