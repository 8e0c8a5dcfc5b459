//! Data models for the WeCom API.
//!
//! This module contains the response envelope and error-code
//! normalization, the access token payload, and the directory and
//! messaging models used by the endpoint operations.

mod agent;
mod common;
mod department;
mod message;
mod token;
mod user;

pub use agent::*;
pub use common::*;
pub use department::*;
pub use message::*;
pub use token::*;
pub use user::*;
