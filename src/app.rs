use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::apod;
use crate::config;
use crate::data::{self, FeedService, LinkOpener};
use crate::fetch::{FetchOutcome, Orchestrator};
use crate::gallery::Card;
use crate::logging;
use crate::page::Page;
use crate::ui;

pub fn run(config_file: Option<PathBuf>) -> Result<()> {
    let cfg = load_config(config_file)?;
    let log_path = logging::init(&cfg.log);
    tracing::info!(version = crate::VERSION, feed = %cfg.feed.url, "starting apod-tui");

    let client = feed_client(&cfg)?;
    let feed_label = feed_label(client.feed_url());
    let feed_service: Arc<dyn FeedService + Send + Sync> =
        Arc::new(data::ApodFeedService::new(Arc::new(client)));
    let link_opener: Arc<dyn LinkOpener + Send + Sync> = Arc::new(data::SystemBrowser);

    let config_path = friendly_path(config::default_path().as_ref());
    let status_message = match log_path {
        Some(path) => format!(
            "Press f to fetch space images. Config: {config_path} · Log: {}",
            path.display()
        ),
        None => format!("Press f to fetch space images. Config: {config_path}"),
    };

    let mut model = ui::Model::new(ui::Options {
        status_message,
        feed_service: Some(feed_service),
        link_opener,
        columns: cfg.ui.columns,
        feed_label,
    });
    model.run()?;
    tracing::info!("apod-tui exited");
    Ok(())
}

pub fn dump<W: Write>(config_file: Option<PathBuf>, out: &mut W) -> Result<()> {
    let cfg = load_config(config_file)?;
    logging::init(&cfg.log);
    let service = data::ApodFeedService::new(Arc::new(feed_client(&cfg)?));
    dump_with(&service, cfg.ui.columns, out)
}

pub fn dump_with<W: Write>(service: &dyn FeedService, columns: usize, out: &mut W) -> Result<()> {
    let mut page = Page::new(columns);
    let mut orchestrator = Orchestrator::default();
    let mut rng = StdRng::from_entropy();

    match orchestrator.run_blocking(&mut page, service, &mut rng) {
        Some(FetchOutcome::Rendered { .. }) => {
            if let Some(fact) = &page.fact_box {
                writeln!(out, "{} {}", fact.heading, fact.fact)?;
            }
            for (index, card) in page.gallery.cards().iter().enumerate() {
                writeln!(out, "{}", dump_line(index, card))?;
            }
            Ok(())
        }
        Some(FetchOutcome::NoImages) => {
            writeln!(out, "{}", crate::gallery::NO_IMAGES_MESSAGE)?;
            Ok(())
        }
        Some(FetchOutcome::Failed) => bail!(crate::fetch::FETCH_ERROR_MESSAGE),
        None => bail!("a fetch is already in progress"),
    }
}

fn dump_line(index: usize, card: &Card) -> String {
    let kind = if card.has_play_overlay() {
        "video"
    } else {
        "image"
    };
    format!(
        "{:>3}. [{kind}] {} ({}) {} -> {}",
        index + 1,
        card.title,
        card.date_label,
        card.display_src,
        card.modal.src
    )
}

fn load_config(config_file: Option<PathBuf>) -> Result<config::Config> {
    config::load(config::LoadOptions {
        config_file,
        env_prefix: None,
    })
    .context("load config")
}

fn feed_client(cfg: &config::Config) -> Result<apod::Client> {
    apod::Client::new(apod::ClientConfig {
        feed_url: cfg.feed.url.clone(),
        user_agent: cfg.feed.user_agent.clone(),
        timeout: cfg.feed.timeout,
        http_client: None,
    })
    .context("create feed client")
}

fn feed_label(feed_url: &str) -> String {
    url::Url::parse(feed_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| feed_url.to_string())
}

fn friendly_path(path: Option<&PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/apod-tui/config.yaml".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MockFeedService, MockResponse};

    #[test]
    fn dump_lists_cards_in_feed_order() {
        let service = MockFeedService::body(
            r#"[{"title":"M1","date":"2024-01-05","media_type":"image","url":"a.jpg","hdurl":"a_hd.jpg"},
                {"title":"Clip","date":"2024-01-06","media_type":"video","url":"https://youtu.be/dQw4w9WgXcQ"}]"#,
        );
        let mut out = Vec::new();
        dump_with(&service, 3, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Did you know?"));
        assert_eq!(lines[1], "  1. [image] M1 (January 5, 2024) a.jpg -> a_hd.jpg");
        assert!(lines[2].contains("[video] Clip (January 6, 2024)"));
    }

    #[test]
    fn dump_reports_failures() {
        let service = MockFeedService::new([MockResponse::Offline]);
        let mut out = Vec::new();
        let err = dump_with(&service, 3, &mut out).unwrap_err();
        assert_eq!(err.to_string(), crate::fetch::FETCH_ERROR_MESSAGE);
        assert!(out.is_empty());
    }

    #[test]
    fn feed_label_prefers_host() {
        assert_eq!(feed_label(apod::DEFAULT_FEED_URL), "cdn.jsdelivr.net");
        assert_eq!(feed_label("not a url"), "not a url");
    }
}
