//! # WeCom
//!
//! Async client for the WeCom (Enterprise WeChat) server API: access
//! tokens, directory lookups (departments, users, applications) and
//! application text messages.
//!
//! ## Architecture
//!
//! - [`config`] - Credentials, base URL, timeout ceiling and token policy
//! - [`error`] - Error types covering transport, decode and API failures
//! - [`transport`] - The HTTP boundary and its `reqwest` implementation
//! - [`token`] - Optional access token cache
//! - [`wecom_client`] - Request engine and endpoint operations
//! - [`models`] - Response envelope, error-code normalization and payloads
//!
//! ## Error codes
//!
//! WeCom reports failures inside a 200 response through `errcode`, which
//! may arrive as `0`, `0.0` or `"0"`. Every operation normalizes it the
//! same way and returns [`WecomError::Api`](error::WecomError::Api) for
//! anything other than zero.
//!
//! ## Tokens
//!
//! By default every authenticated call fetches a fresh access token.
//! [`TokenPolicy::Cached`](config::TokenPolicy::Cached) reuses a token
//! until shortly before it expires.
//!
//! ## Example
//!
//! ```ignore
//! use wecom::config::{Config, Credentials};
//! use wecom::wecom_client::WecomClient;
//!
//! async fn example() -> Result<(), wecom::error::WecomError> {
//!     let config = Config::new(Credentials::new("ww1234", "secret", "1000002"));
//!     let client = WecomClient::new(config)?;
//!
//!     let agent = client.get_agent().await?;
//!     for user_id in agent.user_ids() {
//!         println!("{}", client.get_user(user_id).await?);
//!     }
//!
//!     client.send_text_message("alice|bob", "deploy finished").await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod token;
pub mod transport;
pub mod wecom_client;

pub use config::{Config, Credentials, TokenPolicy};
pub use error::WecomError;
pub use wecom_client::{ApiRequest, WecomClient};
