use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::apod::{self, Feed, FetchError};

pub trait FeedService: Send + Sync {
    fn load_feed(&self) -> Result<Feed, FetchError>;
}

pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

pub struct ApodFeedService {
    client: Arc<apod::Client>,
}

impl ApodFeedService {
    pub fn new(client: Arc<apod::Client>) -> Self {
        Self { client }
    }
}

impl FeedService for ApodFeedService {
    fn load_feed(&self) -> Result<Feed, FetchError> {
        self.client.fetch()
    }
}

#[derive(Default)]
pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(anyhow!("no link to open"));
        }
        webbrowser::open(url).map_err(|err| anyhow!("open {url}: {err}"))
    }
}

#[derive(Debug, Clone)]
pub enum MockResponse {
    Body(String),
    Status(u16),
    Offline,
}

#[derive(Default)]
pub struct MockFeedService {
    responses: Mutex<VecDeque<MockResponse>>,
    calls: Mutex<usize>,
}

impl MockFeedService {
    pub fn new<I: IntoIterator<Item = MockResponse>>(responses: I) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(0),
        }
    }

    pub fn body<S: Into<String>>(body: S) -> Self {
        Self::new([MockResponse::Body(body.into())])
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().map(|calls| *calls).unwrap_or_default()
    }
}

impl FeedService for MockFeedService {
    fn load_feed(&self) -> Result<Feed, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        let next = match self.responses.lock() {
            Ok(mut queue) if queue.len() > 1 => queue.pop_front(),
            Ok(queue) => queue.front().cloned(),
            Err(_) => None,
        };
        match next.unwrap_or(MockResponse::Offline) {
            MockResponse::Body(body) => Feed::parse(&body),
            MockResponse::Status(status) => Err(FetchError::Status {
                status,
                reason: "Mock".into(),
            }),
            MockResponse::Offline => Err(FetchError::Network(Box::new(io::Error::new(
                io::ErrorKind::NotConnected,
                "mock feed is offline",
            )))),
        }
    }
}

#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .map(|opened| opened.clone())
            .unwrap_or_default()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.opened
            .lock()
            .map_err(|_| anyhow!("recording opener poisoned"))?
            .push(url.to_string());
        Ok(())
    }
}
