//! Integration tests for the shape parsers.
//!
//! Covers: group field-exact projection, callback attachment mapping (length and order),
//! missing/invalid `attachments`, tolerance of missing optional fields, and serde re-encoding.

use gbot_core::{
    parse_attachment, parse_callback, parse_group, Callback, Group, ParseError, SenderType,
};
use serde_json::{json, Value};

fn sample_group_json() -> Value {
    json!({
        "id": "1234567",
        "group_id": "1234567",
        "name": "Family",
        "phone_number": "+1 2123001234",
        "type": "private",
        "description": "Coolest Family Ever",
        "image_url": "https://i.groupme.com/123456789",
        "creator_user_id": "1234567890",
        "created_at": 1302623328,
        "updated_at": 1302623328,
        "max_members": 500,
        "theme_name": "blue",
        "requires_approval": false,
        "show_join_question": true,
        "share_url": "https://groupme.com/join_group/1234567/SHARE_TOKEN",
        "member_count": 3,
        "message_count": 100,
        "members": [{"user_id": "1", "nickname": "Mom"}]
    })
}

fn sample_callback_json(sender_type: &str) -> Value {
    json!({
        "attachments": [
            {"type": "image", "url": "https://i.groupme.com/a.png"},
            {"type": "video", "url": "https://v.groupme.com/b.mp4"},
            {"type": "image", "url": "https://i.groupme.com/c.png"}
        ],
        "avatar_url": "https://i.groupme.com/123456789",
        "created_at": 1302623328,
        "group_id": "1234567890",
        "id": "1234567890",
        "name": "John",
        "sender_id": "12345",
        "sender_type": sender_type,
        "source_guid": "GUID",
        "system": false,
        "text": "Hello world",
        "user_id": "1234567890"
    })
}

/// **Test: parse_group copies every documented field unchanged.**
///
/// **Setup:** A group object with all 17 fields plus an unparsed `members` list.
/// **Action:** `parse_group`.
/// **Expected:** each output field equals the same-named input field.
#[test]
fn test_parse_group_is_field_exact() {
    let input = sample_group_json();
    let group = parse_group(&input).unwrap();

    assert_eq!(
        group,
        Group {
            id: Some("1234567".to_string()),
            group_id: Some("1234567".to_string()),
            name: Some("Family".to_string()),
            phone_number: Some("+1 2123001234".to_string()),
            group_type: Some("private".to_string()),
            description: Some("Coolest Family Ever".to_string()),
            image_url: Some("https://i.groupme.com/123456789".to_string()),
            creator_user_id: Some("1234567890".to_string()),
            created_at: Some(1302623328),
            updated_at: Some(1302623328),
            max_members: Some(500),
            theme_name: Some("blue".to_string()),
            requires_approval: Some(false),
            show_join_question: Some(true),
            share_url: Some("https://groupme.com/join_group/1234567/SHARE_TOKEN".to_string()),
            member_count: Some(3),
            message_count: Some(100),
        }
    );
}

/// **Test: serialising a parsed group yields the same field values under the same names.**
#[test]
fn test_group_serializes_with_input_names() {
    let input = sample_group_json();
    let group = parse_group(&input).unwrap();
    let out = serde_json::to_value(&group).unwrap();

    for field in [
        "id",
        "group_id",
        "name",
        "phone_number",
        "type",
        "description",
        "image_url",
        "creator_user_id",
        "created_at",
        "updated_at",
        "max_members",
        "theme_name",
        "requires_approval",
        "show_join_question",
        "share_url",
        "member_count",
        "message_count",
    ] {
        assert_eq!(out[field], input[field], "field {}", field);
    }
}

/// **Test: a group with only a name parses; the rest are None.**
#[test]
fn test_parse_group_partial() {
    let group = parse_group(&json!({"name": "G"})).unwrap();
    assert_eq!(group.name.as_deref(), Some("G"));
    assert!(group.id.is_none());
    assert!(group.member_count.is_none());
    assert!(group.requires_approval.is_none());
}

/// **Test: a present field of the wrong type is rejected rather than coerced.**
#[test]
fn test_parse_group_rejects_wrong_type() {
    let err = parse_group(&json!({"id": 1234567})).unwrap_err();
    assert_eq!(
        err,
        ParseError::InvalidType {
            field: "id",
            expected: "a string"
        }
    );
}

/// **Test: callback attachments keep length and order and match parse_attachment per element.**
#[test]
fn test_parse_callback_maps_attachments_in_order() {
    let input = sample_callback_json("user");
    let callback = parse_callback(&input).unwrap();

    let raw = input["attachments"].as_array().unwrap();
    assert_eq!(callback.attachments.len(), raw.len());
    for (parsed, raw) in callback.attachments.iter().zip(raw) {
        assert_eq!(parsed, &parse_attachment(raw).unwrap());
    }
    assert_eq!(callback.attachments[1].kind.as_deref(), Some("video"));
}

/// **Test: all callback fields are projected.**
#[test]
fn test_parse_callback_fields() {
    let callback = parse_callback(&sample_callback_json("bot")).unwrap();

    assert_eq!(callback.avatar_url.as_deref(), Some("https://i.groupme.com/123456789"));
    assert_eq!(callback.created_at, Some(1302623328));
    assert_eq!(callback.group_id.as_deref(), Some("1234567890"));
    assert_eq!(callback.id.as_deref(), Some("1234567890"));
    assert_eq!(callback.name.as_deref(), Some("John"));
    assert_eq!(callback.sender_id.as_deref(), Some("12345"));
    assert_eq!(callback.sender_type, Some(SenderType::Bot));
    assert_eq!(callback.source_guid.as_deref(), Some("GUID"));
    assert_eq!(callback.system, Some(false));
    assert_eq!(callback.text.as_deref(), Some("Hello world"));
    assert_eq!(callback.user_id.as_deref(), Some("1234567890"));
}

/// **Test: a callback with an empty attachments array and no avatar_url parses.**
#[test]
fn test_parse_callback_tolerates_missing_optional_fields() {
    let callback =
        parse_callback(&json!({"attachments": [], "sender_type": "system", "text": "x joined"}))
            .unwrap();
    assert!(callback.attachments.is_empty());
    assert!(callback.avatar_url.is_none());
    assert_eq!(callback.sender_type, Some(SenderType::System));
}

/// **Test: unknown sender types are kept verbatim.**
#[test]
fn test_parse_callback_unknown_sender_type() {
    let callback = parse_callback(&sample_callback_json("service")).unwrap();
    assert_eq!(
        callback.sender_type,
        Some(SenderType::Other("service".to_string()))
    );
}

/// **Test: missing attachments is a parse failure, not an empty list.**
#[test]
fn test_parse_callback_missing_attachments_fails() {
    let mut input = sample_callback_json("user");
    input.as_object_mut().unwrap().remove("attachments");

    let err = parse_callback(&input).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingField {
            field: "attachments"
        }
    );
}

/// **Test: attachments that is not an array (including null) is a parse failure.**
#[test]
fn test_parse_callback_non_array_attachments_fails() {
    for bad in [json!("none"), json!(null), json!({"type": "image"})] {
        let err = parse_callback(&json!({"attachments": bad})).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidType {
                field: "attachments",
                ..
            }
        ));
    }
}

/// **Test: a callback re-encodes to JSON and decodes back to an equal record.**
#[test]
fn test_callback_serde_matches_parser() {
    let input = sample_callback_json("user");
    let parsed = parse_callback(&input).unwrap();
    let encoded = serde_json::to_value(&parsed).unwrap();

    assert_eq!(encoded["sender_type"], json!("user"));
    assert_eq!(encoded["attachments"][0]["type"], json!("image"));
    let decoded: Callback = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, parsed);
}
