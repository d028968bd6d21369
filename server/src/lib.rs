//! Resource Access Server
//!
//! Sharing, principal search, and data-contract validation for a
//! multi-provider chat platform.

pub mod acl;
pub mod api;
pub mod auth;
pub mod config;
pub mod convos;
pub mod messages;
pub mod presets;
pub mod principals;
