//! [`GroupMeClient`]: credentials plus a reqwest client, one method per REST operation.

use std::fmt;

use async_trait::async_trait;
use gbot_core::{parse_group, Bot, GbotError, Group, ParseError, ProtocolError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::mask_token;

/// Public API host.
pub const GROUPME_API_BASE: &str = "https://api.groupme.com";

/// Meta code the groups index reports on success.
const META_OK: i64 = 200;

/// GroupMe REST client. The access token authorises account-scoped calls (sent as the `token`
/// query parameter); the bot id is only used when posting as the bot.
#[derive(Clone)]
pub struct GroupMeClient {
    client: Client,
    base_url: String,
    access_token: String,
    bot_id: String,
}

#[derive(Debug, Serialize)]
struct BotPost<'a> {
    text: &'a str,
    bot_id: &'a str,
}

#[derive(Debug, Serialize)]
struct MembershipUpdate<'a> {
    membership: Nickname<'a>,
}

#[derive(Debug, Serialize)]
struct Nickname<'a> {
    nickname: &'a str,
}

fn http_error(e: reqwest::Error) -> GbotError {
    GbotError::Http(e.to_string())
}

/// Fails with [`ProtocolError::Status`] unless the response has exactly `expected`.
fn expect_status(response: &Response, expected: StatusCode) -> Result<()> {
    let actual = response.status();
    if actual != expected {
        warn!(
            expected = expected.as_u16(),
            actual = actual.as_u16(),
            url = %response.url().path(),
            "Unexpected status from GroupMe API"
        );
        return Err(ProtocolError::Status {
            expected: expected.as_u16(),
            actual: actual.as_u16(),
        }
        .into());
    }
    Ok(())
}

impl GroupMeClient {
    /// Builds a client against the public API host.
    pub fn new(access_token: String, bot_id: String) -> Self {
        Self::with_base_url(access_token, bot_id, GROUPME_API_BASE.to_string())
    }

    /// Builds a client against a custom host (e.g. a stub server in tests).
    pub fn with_base_url(access_token: String, bot_id: String, base_url: String) -> Self {
        Self::with_client(Client::new(), access_token, bot_id, base_url)
    }

    /// Builds from an existing reqwest client. reqwest reports 4xx/5xx as ordinary responses,
    /// which is what the status checks below rely on.
    pub fn with_client(
        client: Client,
        access_token: String,
        bot_id: String,
        base_url: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            bot_id,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Lists the groups the token's user belongs to.
    ///
    /// `GET /v3/groups?token=...` must answer HTTP 200 and an envelope whose `meta.code` is 200;
    /// each element of `response` is mapped with [`parse_group`].
    #[instrument(skip(self))]
    pub async fn find_groups(&self) -> Result<Vec<Group>> {
        info!(token = %mask_token(&self.access_token), "step: GroupMe find_groups request");

        let response = self
            .client
            .get(self.url("/v3/groups"))
            .query(&[("token", self.access_token.as_str())])
            .send()
            .await
            .map_err(http_error)?;
        expect_status(&response, StatusCode::OK)?;

        let envelope: Value = response.json().await.map_err(http_error)?;
        let meta_code = envelope
            .pointer("/meta/code")
            .and_then(Value::as_i64)
            .ok_or(ParseError::MissingField { field: "meta.code" })?;
        if meta_code != META_OK {
            warn!(meta_code, "Unexpected meta code from GroupMe API");
            return Err(ProtocolError::MetaCode {
                expected: META_OK,
                actual: meta_code,
            }
            .into());
        }

        let groups = envelope
            .get("response")
            .and_then(Value::as_array)
            .ok_or(ParseError::InvalidType {
                field: "response",
                expected: "an array",
            })?
            .iter()
            .map(parse_group)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        info!(group_count = groups.len(), "step: GroupMe find_groups done");
        Ok(groups)
    }

    /// Posts `text` as the bot. `POST /v3/bots/post` with `{text, bot_id}` must answer 202.
    /// This is the one call authorised by the bot id in the body instead of the token.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn send_message(&self, text: &str) -> Result<bool> {
        info!(bot_id = %self.bot_id, "step: GroupMe send_message request");

        let body = BotPost {
            text,
            bot_id: &self.bot_id,
        };
        let response = self
            .client
            .post(self.url("/v3/bots/post"))
            .json(&body)
            .send()
            .await
            .map_err(http_error)?;
        expect_status(&response, StatusCode::ACCEPTED)?;

        info!("step: GroupMe send_message accepted");
        Ok(true)
    }

    /// `DELETE /v3/conversations/{group_id}/messages/{message_id}` must answer 204.
    #[instrument(skip(self))]
    pub async fn delete_message(&self, group_id: &str, message_id: &str) -> Result<bool> {
        let response = self
            .client
            .delete(self.url(&format!(
                "/v3/conversations/{}/messages/{}",
                group_id, message_id
            )))
            .query(&[("token", self.access_token.as_str())])
            .send()
            .await
            .map_err(http_error)?;
        expect_status(&response, StatusCode::NO_CONTENT)?;

        info!("step: GroupMe delete_message done");
        Ok(true)
    }

    /// `POST /v3/messages/{conversation_id}/{message_id}/like` must answer 200.
    #[instrument(skip(self))]
    pub async fn like_message(&self, conversation_id: &str, message_id: &str) -> Result<bool> {
        self.post_reaction(conversation_id, message_id, "like").await
    }

    /// `POST /v3/messages/{conversation_id}/{message_id}/unlike` must answer 200.
    #[instrument(skip(self))]
    pub async fn unlike_message(&self, conversation_id: &str, message_id: &str) -> Result<bool> {
        self.post_reaction(conversation_id, message_id, "unlike").await
    }

    async fn post_reaction(
        &self,
        conversation_id: &str,
        message_id: &str,
        action: &str,
    ) -> Result<bool> {
        let response = self
            .client
            .post(self.url(&format!(
                "/v3/messages/{}/{}/{}",
                conversation_id, message_id, action
            )))
            .query(&[("token", self.access_token.as_str())])
            .send()
            .await
            .map_err(http_error)?;
        expect_status(&response, StatusCode::OK)?;

        info!(action, "step: GroupMe reaction done");
        Ok(true)
    }

    /// Sets the caller's nickname in a group.
    /// `POST /v3/groups/{group_id}/memberships/update` with `{membership: {nickname}}` must answer 200.
    #[instrument(skip(self))]
    pub async fn update_nickname(&self, group_id: &str, nickname: &str) -> Result<bool> {
        let body = MembershipUpdate {
            membership: Nickname { nickname },
        };
        let response = self
            .client
            .post(self.url(&format!("/v3/groups/{}/memberships/update", group_id)))
            .query(&[("token", self.access_token.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(http_error)?;
        expect_status(&response, StatusCode::OK)?;

        info!("step: GroupMe update_nickname done");
        Ok(true)
    }
}

impl fmt::Debug for GroupMeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupMeClient")
            .field("base_url", &self.base_url)
            .field("access_token", &mask_token(&self.access_token))
            .field("bot_id", &self.bot_id)
            .finish()
    }
}

#[async_trait]
impl Bot for GroupMeClient {
    async fn send_message(&self, text: &str) -> Result<bool> {
        GroupMeClient::send_message(self, text).await
    }

    async fn delete_message(&self, group_id: &str, message_id: &str) -> Result<bool> {
        GroupMeClient::delete_message(self, group_id, message_id).await
    }

    async fn like_message(&self, conversation_id: &str, message_id: &str) -> Result<bool> {
        GroupMeClient::like_message(self, conversation_id, message_id).await
    }

    async fn unlike_message(&self, conversation_id: &str, message_id: &str) -> Result<bool> {
        GroupMeClient::unlike_message(self, conversation_id, message_id).await
    }
}
