use crate::domain::notification::{PushNotification, PushType};
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

/// Sender name shown in place of the real one when content is id-loaded.
pub const HIDDEN_SENDER_NAME: &str = "Someone";

static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-zA-Z0-9_+\-]+):").expect("shortcode pattern is valid"));

/// Replaces `:shortcode:` tokens with their emoji glyph. Unknown shortcodes are left untouched.
#[must_use]
pub fn expand_emoji(text: &str) -> String {
    SHORTCODE
        .replace_all(text, |caps: &Captures<'_>| match emojis::get_by_shortcode(&caps[1]) {
            Some(emoji) => emoji.as_str().to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Backend-neutral data record delivered alongside every push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushData {
    pub ack_id: String,
    #[serde(rename = "type")]
    pub push_type: PushType,
    pub badge: i32,
    pub version: String,
    pub channel_id: String,
    #[serde(flatten)]
    pub content: Option<PushContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PushContent {
    IdLoaded(IdLoadedContent),
    Full(FullContent),
}

/// Content sent when the client fetches the post itself. The sender is never revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdLoadedContent {
    pub post_id: String,
    pub message: String,
    pub id_loaded: bool,
    pub sender_id: String,
    pub sender_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullContent {
    pub team_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
    pub channel_name: String,
    pub post_id: String,
    pub root_id: String,
    pub override_username: String,
    pub override_icon_url: String,
    pub from_webhook: String,
}

impl PushData {
    #[must_use]
    pub fn from_notification(msg: &PushNotification) -> Self {
        let content = if msg.is_id_loaded {
            Some(PushContent::IdLoaded(IdLoadedContent {
                post_id: msg.post_id.clone(),
                message: msg.message.clone(),
                id_loaded: true,
                sender_id: msg.sender_id.clone(),
                sender_name: HIDDEN_SENDER_NAME.to_string(),
            }))
        } else if msg.push_type.carries_content() {
            Some(PushContent::Full(FullContent {
                team_id: msg.team_id.clone(),
                sender_id: msg.sender_id.clone(),
                sender_name: msg.sender_name.clone(),
                message: expand_emoji(&msg.message),
                channel_name: msg.channel_name.clone(),
                post_id: msg.post_id.clone(),
                root_id: msg.root_id.clone(),
                override_username: msg.override_username.clone(),
                override_icon_url: msg.override_icon_url.clone(),
                from_webhook: msg.from_webhook.clone(),
            }))
        } else {
            None
        };

        Self {
            ack_id: msg.ack_id.clone(),
            push_type: msg.push_type.clone(),
            badge: msg.badge,
            version: msg.version.clone(),
            channel_id: msg.channel_id.clone(),
            content,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match &self.content {
            Some(PushContent::IdLoaded(c)) => Some(&c.message),
            Some(PushContent::Full(c)) => Some(&c.message),
            None => None,
        }
    }

    #[must_use]
    pub fn sender_name(&self) -> Option<&str> {
        match &self.content {
            Some(PushContent::IdLoaded(c)) => Some(&c.sender_name),
            Some(PushContent::Full(c)) => Some(&c.sender_name),
            None => None,
        }
    }
}

/// Sender name safe to display for `msg`, honoring id-loaded privacy.
#[must_use]
pub fn display_sender(msg: &PushNotification) -> &str {
    if msg.is_id_loaded { HIDDEN_SENDER_NAME } else { &msg.sender_name }
}
