//! Data model parsed from the platform's JSON: [`Group`], [`Member`], [`Attachment`], [`Callback`].
//!
//! Parsers project fields one-to-one. An absent or `null` field becomes `None`; a field that is
//! present with the wrong JSON type is a [`ParseError`], so no record is ever built with a
//! silently-wrong value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ParseError;

type Object = Map<String, Value>;

/// A file or media reference attached to a message. `kind` is free-form (e.g. "image").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
}

/// Per-group identity of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Platform-wide user id.
    pub user_id: Option<String>,
    /// Group-local membership id.
    pub id: Option<String>,
    /// Group-scoped display name.
    pub nickname: Option<String>,
    /// Platform default name.
    pub name: Option<String>,
    pub muted: Option<bool>,
    pub autokicked: Option<bool>,
    /// Role tags such as "admin", "owner", "user". Not exclusive.
    pub roles: Option<Vec<String>>,
}

impl Member {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles
            .as_ref()
            .map(|roles| roles.iter().any(|r| r == role))
            .unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }
}

/// Group metadata as returned by the groups index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Option<String>,
    pub group_id: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    /// "public" or "private".
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub creator_user_id: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub max_members: Option<i64>,
    pub theme_name: Option<String>,
    pub requires_approval: Option<bool>,
    pub show_join_question: Option<bool>,
    pub share_url: Option<String>,
    pub member_count: Option<i64>,
    pub message_count: Option<i64>,
}

impl Group {
    /// `id` and `group_id` carry the same identifier; prefers `id`.
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().or(self.group_id.as_deref())
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.and_then(|s| DateTime::from_timestamp(s, 0))
    }

    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        self.updated_at.and_then(|s| DateTime::from_timestamp(s, 0))
    }
}

/// Origin of a [`Callback`]. Unknown values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SenderType {
    User,
    System,
    Bot,
    Other(String),
}

impl SenderType {
    pub fn as_str(&self) -> &str {
        match self {
            SenderType::User => "user",
            SenderType::System => "system",
            SenderType::Bot => "bot",
            SenderType::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for SenderType {
    fn from(s: &str) -> Self {
        match s {
            "user" => SenderType::User,
            "system" => SenderType::System,
            "bot" => SenderType::Bot,
            other => SenderType::Other(other.to_string()),
        }
    }
}

impl From<String> for SenderType {
    fn from(s: String) -> Self {
        SenderType::from(s.as_str())
    }
}

impl From<SenderType> for String {
    fn from(t: SenderType) -> Self {
        t.as_str().to_string()
    }
}

/// One inbound webhook payload: a message or system notification in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callback {
    /// Always present; may be empty.
    pub attachments: Vec<Attachment>,
    pub avatar_url: Option<String>,
    pub created_at: Option<i64>,
    pub group_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub sender_id: Option<String>,
    pub sender_type: Option<SenderType>,
    pub source_guid: Option<String>,
    pub system: Option<bool>,
    pub text: Option<String>,
    pub user_id: Option<String>,
}

impl Callback {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.and_then(|s| DateTime::from_timestamp(s, 0))
    }
}

fn root_object(value: &Value) -> Result<&Object, ParseError> {
    value.as_object().ok_or(ParseError::InvalidType {
        field: "<root>",
        expected: "an object",
    })
}

fn opt_str(obj: &Object, field: &'static str) -> Result<Option<String>, ParseError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParseError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

fn opt_i64(obj: &Object, field: &'static str) -> Result<Option<i64>, ParseError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or(ParseError::InvalidType {
            field,
            expected: "an integer",
        }),
    }
}

fn opt_bool(obj: &Object, field: &'static str) -> Result<Option<bool>, ParseError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ParseError::InvalidType {
            field,
            expected: "a boolean",
        }),
    }
}

fn opt_str_list(obj: &Object, field: &'static str) -> Result<Option<Vec<String>>, ParseError> {
    let invalid = ParseError::InvalidType {
        field,
        expected: "an array of strings",
    };
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or(invalid.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(invalid),
    }
}

pub fn parse_attachment(value: &Value) -> Result<Attachment, ParseError> {
    let obj = root_object(value)?;
    Ok(Attachment {
        kind: opt_str(obj, "type")?,
        url: opt_str(obj, "url")?,
    })
}

pub fn parse_member(value: &Value) -> Result<Member, ParseError> {
    let obj = root_object(value)?;
    Ok(Member {
        user_id: opt_str(obj, "user_id")?,
        id: opt_str(obj, "id")?,
        nickname: opt_str(obj, "nickname")?,
        name: opt_str(obj, "name")?,
        muted: opt_bool(obj, "muted")?,
        autokicked: opt_bool(obj, "autokicked")?,
        roles: opt_str_list(obj, "roles")?,
    })
}

/// Maps a group object field by field. The `members` list is not parsed here; use
/// [`parse_member`] on its elements when needed.
pub fn parse_group(value: &Value) -> Result<Group, ParseError> {
    let obj = root_object(value)?;
    Ok(Group {
        id: opt_str(obj, "id")?,
        group_id: opt_str(obj, "group_id")?,
        name: opt_str(obj, "name")?,
        phone_number: opt_str(obj, "phone_number")?,
        group_type: opt_str(obj, "type")?,
        description: opt_str(obj, "description")?,
        image_url: opt_str(obj, "image_url")?,
        creator_user_id: opt_str(obj, "creator_user_id")?,
        created_at: opt_i64(obj, "created_at")?,
        updated_at: opt_i64(obj, "updated_at")?,
        max_members: opt_i64(obj, "max_members")?,
        theme_name: opt_str(obj, "theme_name")?,
        requires_approval: opt_bool(obj, "requires_approval")?,
        show_join_question: opt_bool(obj, "show_join_question")?,
        share_url: opt_str(obj, "share_url")?,
        member_count: opt_i64(obj, "member_count")?,
        message_count: opt_i64(obj, "message_count")?,
    })
}

/// Maps a webhook body. Fails if `attachments` is missing or not an array; every element goes
/// through [`parse_attachment`] in order.
pub fn parse_callback(value: &Value) -> Result<Callback, ParseError> {
    let callback = callback_fields(value).map_err(|e| {
        debug!(error = %e, "step: callback rejected");
        e
    })?;
    debug!(
        id = callback.id.as_deref().unwrap_or(""),
        attachment_count = callback.attachments.len(),
        "step: callback parsed"
    );
    Ok(callback)
}

fn callback_fields(value: &Value) -> Result<Callback, ParseError> {
    let obj = root_object(value)?;
    let attachments = match obj.get("attachments") {
        None => {
            return Err(ParseError::MissingField {
                field: "attachments",
            })
        }
        Some(Value::Array(items)) => items
            .iter()
            .map(parse_attachment)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ParseError::InvalidType {
                field: "attachments",
                expected: "an array",
            })
        }
    };

    Ok(Callback {
        attachments,
        avatar_url: opt_str(obj, "avatar_url")?,
        created_at: opt_i64(obj, "created_at")?,
        group_id: opt_str(obj, "group_id")?,
        id: opt_str(obj, "id")?,
        name: opt_str(obj, "name")?,
        sender_id: opt_str(obj, "sender_id")?,
        sender_type: opt_str(obj, "sender_type")?.map(SenderType::from),
        source_guid: opt_str(obj, "source_guid")?,
        system: opt_bool(obj, "system")?,
        text: opt_str(obj, "text")?,
        user_id: opt_str(obj, "user_id")?,
    })
}
