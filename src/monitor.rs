use std::fmt;
use std::io::Write;

use thiserror::Error;
use tracing::{debug, error};

use super::twitch::{TwitchError, TwitchHelixAPI};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveStatus {
    Live,
    Offline,
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveStatus::Live => write!(f, "The channel is live!"),
            LiveStatus::Offline => write!(f, "The channel is not live."),
        }
    }
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to fetch token: {0}")]
    Token(#[source] TwitchError),

    #[error("failed to resolve channel {channel}: {source}")]
    Channel {
        channel: String,
        #[source]
        source: TwitchError,
    },

    #[error("failed to query live status: {0}")]
    Status(#[source] TwitchError),
}

pub struct Monitor {
    api: TwitchHelixAPI,
    channel_name: String,
}

impl Monitor {
    pub fn new(api: TwitchHelixAPI, channel_name: String) -> Monitor {
        Monitor { api, channel_name }
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// One token, lookup, status round trip. Nothing is kept between calls.
    pub async fn poll(&self) -> Result<LiveStatus, MonitorError> {
        let access_token = self
            .api
            .get_access_token()
            .await
            .map_err(MonitorError::Token)?;

        let channel = self
            .api
            .retrieve_channel(&access_token, &self.channel_name)
            .await
            .map_err(|source| MonitorError::Channel {
                channel: self.channel_name.clone(),
                source,
            })?;
        debug!(
            user_id = %channel.id,
            login = ?channel.login,
            display_name = ?channel.display_name,
            extra_fields = channel.other.len(),
            "resolved channel"
        );

        let live = self
            .api
            .is_live(&access_token, &channel.id)
            .await
            .map_err(MonitorError::Status)?;

        Ok(if live { LiveStatus::Live } else { LiveStatus::Offline })
    }

    /// Polls once and writes the status line to `out`. Failures are logged and end the cycle quietly.
    pub async fn run_cycle<W: Write>(&self, out: &mut W) -> Option<LiveStatus> {
        match self.poll().await {
            Ok(status) => {
                if let Err(e) = writeln!(out, "{}", status) {
                    error!("failed to write status: {}", e);
                }
                Some(status)
            }
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }
}
