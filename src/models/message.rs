//! Application message models.

use serde::{Deserialize, Serialize};

/// Body of a text notification sent through `message/send`.
#[derive(Debug, Clone, Serialize)]
pub struct TextMessage {
    /// Recipients, user IDs joined with `|` (or `@all`).
    pub touser: String,

    /// Always `"text"`.
    pub msgtype: &'static str,

    /// Sending application ID.
    pub agentid: String,

    /// Message content.
    pub text: TextContent,
}

/// Content block of a [`TextMessage`].
#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    /// The text shown to recipients.
    pub content: String,
}

impl TextMessage {
    /// Creates a text message from `agent_id` to `to_user`.
    pub fn new(
        to_user: impl Into<String>,
        agent_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            touser: to_user.into(),
            msgtype: "text",
            agentid: agent_id.into(),
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

/// Delivery report returned by `message/send`.
///
/// WeCom accepts a message even when some recipients are invalid; those
/// are listed here, joined with `|`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageReceipt {
    /// Recipients that do not exist or are out of scope.
    #[serde(default, rename = "invaliduser")]
    pub invalid_user: Option<String>,

    /// Departments that do not exist or are out of scope.
    #[serde(default, rename = "invalidparty")]
    pub invalid_party: Option<String>,

    /// Tags that do not exist or are out of scope.
    #[serde(default, rename = "invalidtag")]
    pub invalid_tag: Option<String>,

    /// Message ID, usable for recall.
    #[serde(default, rename = "msgid")]
    pub msg_id: Option<String>,
}

impl MessageReceipt {
    /// Returns true if every recipient was accepted.
    pub fn all_delivered(&self) -> bool {
        [&self.invalid_user, &self.invalid_party, &self.invalid_tag]
            .iter()
            .all(|field| field.as_deref().is_none_or(str::is_empty))
    }
}
