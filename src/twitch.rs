use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TwitchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(
        "failed to retrieve access token{}",
        .0.as_ref().map(|e| format!(": {}", e)).unwrap_or_default()
    )]
    MissingToken(#[source] Option<serde_json::Error>),

    #[error("no data found for channel")]
    NoChannelData(String),

    #[error("invalid data format for channel")]
    InvalidChannelFormat,

    #[error("unable to retrieve channel ID")]
    MissingChannelId,

    #[error("invalid data format for streams")]
    InvalidStreamFormat,
}

#[derive(Deserialize)]
struct TwitchAuthorization {
    access_token: Option<String>,
}

#[derive(Serialize)]
struct TwitchConfiguration {
    client_id: String,
    client_secret: String,
    grant_type: &'static str,
}

/// `data` is kept untyped so a wrong shape maps to a specific error instead of a decode failure.
#[derive(Deserialize)]
struct TwitchDataResponse {
    data: Option<Value>,
}

/// A Helix user record. Only `id` is required; the rest of the payload is carried along untouched.
#[derive(Debug, Clone)]
pub struct ChannelRecord {
    pub id: String,
    pub login: Option<String>,
    pub display_name: Option<String>,
    pub other: Map<String, Value>,
}

impl PartialEq for ChannelRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl ChannelRecord {
    fn from_value(value: Value) -> Result<ChannelRecord, TwitchError> {
        let Value::Object(mut fields) = value else {
            return Err(TwitchError::InvalidChannelFormat);
        };

        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            _ => return Err(TwitchError::MissingChannelId),
        };
        let mut text = |key: &str| match fields.remove(key) {
            Some(Value::String(value)) => Some(value),
            _ => None,
        };
        let login = text("login");
        let display_name = text("display_name");

        Ok(ChannelRecord {
            id,
            login,
            display_name,
            other: fields,
        })
    }
}

pub struct TwitchHelixAPI {
    client: reqwest::Client,
    config: TwitchConfiguration,
    token_url: String,
    helix_url: String,
}

impl TwitchHelixAPI {
    pub fn new(
        client_id: String,
        client_secret: String,
        token_url: String,
        helix_url: String,
        timeout: Duration,
    ) -> Result<TwitchHelixAPI, TwitchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(TwitchHelixAPI {
            client,
            config: TwitchConfiguration {
                client_id,
                client_secret,
                grant_type: "client_credentials",
            },
            token_url,
            helix_url: helix_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchanges the client credentials for a fresh app access token.
    pub async fn get_access_token(&self) -> Result<String, TwitchError> {
        let res = self
            .client
            .post(&self.token_url)
            .form(&self.config)
            .send()
            .await?;
        debug!(status = %res.status(), "token endpoint responded");

        let text = res.text().await?;

        let authorization: TwitchAuthorization =
            serde_json::from_str(&text).map_err(|e| TwitchError::MissingToken(Some(e)))?;

        authorization
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(TwitchError::MissingToken(None))
    }

    pub async fn retrieve_channel(
        &self,
        access_token: &str,
        login: &str,
    ) -> Result<ChannelRecord, TwitchError> {
        let parse = self.helix_get("users", access_token, &[("login", login)]).await?;

        let first = match parse.data {
            Some(Value::Array(entries)) => entries.into_iter().next(),
            _ => None,
        }
        .ok_or_else(|| TwitchError::NoChannelData(login.to_string()))?;

        ChannelRecord::from_value(first)
    }

    /// True when Helix lists at least one active stream for the user.
    pub async fn is_live(&self, access_token: &str, user_id: &str) -> Result<bool, TwitchError> {
        let parse = self
            .helix_get("streams", access_token, &[("user_id", user_id)])
            .await?;

        match parse.data {
            Some(Value::Array(streams)) => Ok(!streams.is_empty()),
            _ => Err(TwitchError::InvalidStreamFormat),
        }
    }

    async fn helix_get(
        &self,
        resource: &str,
        access_token: &str,
        query: &[(&str, &str)],
    ) -> Result<TwitchDataResponse, TwitchError> {
        let res = self
            .client
            .get(format!("{}/{}", self.helix_url, resource))
            .header("Client-ID", &self.config.client_id)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;
        debug!(resource, status = %res.status(), "helix responded");

        let text = res.text().await?;

        Ok(serde_json::from_str(&text)?)
    }
}
