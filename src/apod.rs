use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub const DEFAULT_FEED_URL: &str = "https://cdn.jsdelivr.net/gh/GCA-Classroom/apod/data.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Other(String),
}

impl MediaType {
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Other(raw) => raw,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaType::Video)
    }
}

impl From<String> for MediaType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "image" => MediaType::Image,
            "video" => MediaType::Video,
            _ => MediaType::Other(raw),
        }
    }
}

impl From<MediaType> for String {
    fn from(media: MediaType) -> Self {
        media.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_media_type")]
    pub media_type: MediaType,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_option")]
    pub hdurl: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub explanation: String,
}

impl Record {
    // Non-objects become blank records; a mistyped field only blanks itself.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Record::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }
}

fn lenient_option<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(raw) => Ok(Some(raw)),
        _ => Ok(None),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_option(deserializer)?.unwrap_or_default())
}

fn lenient_media_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MediaType, D::Error> {
    Ok(lenient_option(deserializer)?
        .map(MediaType::from)
        .unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    Records(Vec<Record>),
    Unexpected,
}

impl Feed {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Feed::Records(items.into_iter().map(Record::from_value).collect()),
            _ => Feed::Unexpected,
        }
    }

    pub fn parse(body: &str) -> Result<Self, FetchError> {
        let value: Value = serde_json::from_str(body).map_err(FetchError::Decode)?;
        Ok(Feed::from_value(value))
    }

    pub fn records(&self) -> &[Record] {
        match self {
            Feed::Records(records) => records,
            Feed::Unexpected => &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("fetch failed: {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("response body is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub feed_url: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub http_client: Option<HttpClient>,
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    feed_url: Url,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("apod client user agent required");
        }
        let feed_url = Url::parse(config.feed_url.trim())
            .with_context(|| format!("parse feed url {:?}", config.feed_url))?;
        if !matches!(feed_url.scheme(), "http" | "https") {
            bail!("feed url must be http(s), got {}", feed_url.scheme());
        }

        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(config.timeout)
                .build()
                .context("build feed HTTP client")?,
        };

        Ok(Client {
            http,
            user_agent: config.user_agent,
            feed_url,
        })
    }

    pub fn feed_url(&self) -> &str {
        self.feed_url.as_str()
    }

    pub fn fetch(&self) -> Result<Feed, FetchError> {
        let response = self
            .http
            .get(self.feed_url.clone())
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|err| FetchError::Network(err.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .text()
            .map_err(|err| FetchError::Network(err.into()))?;
        Feed::parse(&body)
    }
}
