//! Chat platform data contracts.
//!
//! Typed shapes shared between the access service and its clients: resource
//! permissions and principals, endpoint settings, conversations, presets,
//! messages and feedback.

pub mod convo;
pub mod endpoints;
pub mod error;
pub mod feedback;
pub mod message;
pub mod permissions;

pub use error::{Error, Result};
