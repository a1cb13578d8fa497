use rand::Rng;

use crate::apod::{Feed, FetchError};
use crate::data::FeedService;
use crate::gallery::Content;
use crate::page::Page;

pub const FETCH_ERROR_MESSAGE: &str = "Unable to load images. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading { request_id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    request_id: u64,
}

impl FetchTicket {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Rendered { cards: usize },
    NoImages,
    Failed,
}

#[derive(Debug)]
pub struct Orchestrator {
    state: FetchState,
    next_request_id: u64,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self {
            state: FetchState::Idle,
            next_request_id: 1,
        }
    }
}

impl Orchestrator {
    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading { .. })
    }

    pub fn begin(&mut self, page: &mut Page) -> Option<FetchTicket> {
        if !page.trigger.is_enabled() || self.is_loading() {
            return None;
        }
        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.state = FetchState::Loading { request_id };
        page.trigger.disable();
        page.gallery.show_loading();
        tracing::info!(request_id, "fetching feed");
        Some(FetchTicket { request_id })
    }

    /// Applies a finished fetch. Tickets that do not match the in-flight
    /// request are ignored.
    pub fn complete<R: Rng + ?Sized>(
        &mut self,
        page: &mut Page,
        ticket: FetchTicket,
        result: Result<Feed, FetchError>,
        rng: &mut R,
    ) -> Option<FetchOutcome> {
        match self.state {
            FetchState::Loading { request_id } if request_id == ticket.request_id => {}
            _ => {
                tracing::debug!(request_id = ticket.request_id, "dropping stale feed response");
                return None;
            }
        }

        let outcome = match result {
            Ok(feed) => {
                page.show_random_fact(rng);
                page.gallery.render(&feed);
                match page.gallery.content() {
                    Content::Cards(cards) => {
                        tracing::info!(request_id = ticket.request_id, cards = cards.len(), "feed rendered");
                        FetchOutcome::Rendered { cards: cards.len() }
                    }
                    _ => {
                        tracing::info!(request_id = ticket.request_id, "feed had no images");
                        FetchOutcome::NoImages
                    }
                }
            }
            Err(err) => {
                tracing::error!(request_id = ticket.request_id, error = ?err, "feed fetch failed: {err}");
                page.gallery.show_error(FETCH_ERROR_MESSAGE);
                FetchOutcome::Failed
            }
        };

        self.state = FetchState::Idle;
        page.trigger.enable();
        Some(outcome)
    }

    pub fn run_blocking<R: Rng + ?Sized>(
        &mut self,
        page: &mut Page,
        service: &dyn FeedService,
        rng: &mut R,
    ) -> Option<FetchOutcome> {
        let ticket = self.begin(page)?;
        let result = service.load_feed();
        self.complete(page, ticket, result, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MockFeedService, MockResponse};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn trigger_is_disabled_only_while_loading() {
        let mut page = Page::new(3);
        let mut orchestrator = Orchestrator::default();
        let mut rng = StdRng::seed_from_u64(3);

        let ticket = orchestrator.begin(&mut page).unwrap();
        assert!(!page.trigger.is_enabled());
        assert_eq!(page.gallery.content(), &Content::Loading);
        assert!(orchestrator.begin(&mut page).is_none());

        let outcome = orchestrator.complete(&mut page, ticket, Feed::parse("[]"), &mut rng);
        assert_eq!(outcome, Some(FetchOutcome::NoImages));
        assert!(page.trigger.is_enabled());
        assert_eq!(orchestrator.state(), FetchState::Idle);
    }

    #[test]
    fn failures_show_generic_message() {
        for response in [
            MockResponse::Offline,
            MockResponse::Status(404),
            MockResponse::Body("not json".into()),
        ] {
            let service = MockFeedService::new([response]);
            let mut page = Page::new(3);
            let mut orchestrator = Orchestrator::default();
            let mut rng = StdRng::seed_from_u64(3);
            let outcome = orchestrator.run_blocking(&mut page, &service, &mut rng);
            assert_eq!(outcome, Some(FetchOutcome::Failed));
            assert_eq!(
                page.gallery.content(),
                &Content::Error(FETCH_ERROR_MESSAGE.to_string())
            );
            assert!(page.trigger.is_enabled());
            assert!(page.fact_box.is_none());
        }
    }

    #[test]
    fn success_injects_fact_then_renders() {
        let service = MockFeedService::body(r#"[{"title":"A","url":"a.jpg"},{"title":"B","url":"b.jpg"}]"#);
        let mut page = Page::new(3);
        let mut orchestrator = Orchestrator::default();
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = orchestrator.run_blocking(&mut page, &service, &mut rng);
        assert_eq!(outcome, Some(FetchOutcome::Rendered { cards: 2 }));
        assert!(page.fact_box.is_some());
        let first_fact = page.fact_box.clone();

        orchestrator.run_blocking(&mut page, &service, &mut rng);
        assert_eq!(page.fact_box, first_fact);
    }

    #[test]
    fn stale_tickets_are_ignored() {
        let mut page = Page::new(3);
        let mut orchestrator = Orchestrator::default();
        let mut rng = StdRng::seed_from_u64(3);
        let ticket = orchestrator.begin(&mut page).unwrap();
        orchestrator.complete(&mut page, ticket, Feed::parse("[]"), &mut rng);

        let fresh = orchestrator.begin(&mut page).unwrap();
        assert_ne!(fresh.request_id(), ticket.request_id());
        assert_eq!(
            orchestrator.complete(&mut page, ticket, Feed::parse("[]"), &mut rng),
            None
        );
        assert!(orchestrator.is_loading());
        assert!(!page.trigger.is_enabled());
    }

    #[test]
    fn disabled_trigger_blocks_a_new_cycle() {
        let service = MockFeedService::body("[]");
        let mut page = Page::new(3);
        page.trigger.disable();
        let mut orchestrator = Orchestrator::default();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(orchestrator.run_blocking(&mut page, &service, &mut rng), None);
        assert_eq!(service.calls(), 0);
    }
}
