use rand::Rng;

use crate::facts::{self, FactBox};
use crate::gallery::Gallery;
use crate::modal::{CloseTrigger, EscapeHandlers, Modal, ModalDescriptor};

pub const TRIGGER_LABEL: &str = "Fetch Space Images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerControl {
    enabled: bool,
}

impl Default for TriggerControl {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl TriggerControl {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn label(&self) -> &'static str {
        TRIGGER_LABEL
    }
}

#[derive(Debug)]
pub struct Page {
    pub trigger: TriggerControl,
    pub fact_box: Option<FactBox>,
    pub gallery: Gallery,
    modal: Option<Modal>,
    escape: EscapeHandlers,
}

impl Page {
    pub fn new(columns: usize) -> Self {
        Self {
            trigger: TriggerControl::default(),
            fact_box: None,
            gallery: Gallery::new(columns),
            modal: None,
            escape: EscapeHandlers::default(),
        }
    }

    pub fn show_random_fact<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        facts::inject(&mut self.fact_box, rng)
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn modal_mut(&mut self) -> Option<&mut Modal> {
        self.modal.as_mut()
    }

    pub fn has_modal(&self) -> bool {
        self.modal.is_some()
    }

    pub fn escape_handlers(&self) -> usize {
        self.escape.active()
    }

    /// Shows the overlay for `descriptor`. An already-open modal is replaced.
    pub fn open_modal(&mut self, descriptor: &ModalDescriptor) {
        // Drop the old modal first so its Escape subscription is released
        // before the new one registers.
        self.modal = None;
        self.modal = Some(Modal::open(descriptor, &self.escape));
    }

    pub fn open_card(&mut self, index: usize) -> bool {
        let Some(descriptor) = self.gallery.card(index).map(|card| card.modal.clone()) else {
            return false;
        };
        self.gallery.select(index);
        self.open_modal(&descriptor);
        true
    }

    pub fn open_selected(&mut self) -> bool {
        match self.gallery.selected_index() {
            Some(index) => self.open_card(index),
            None => false,
        }
    }

    pub fn close_modal(&mut self, trigger: CloseTrigger) -> bool {
        match self.modal.take() {
            Some(modal) => {
                tracing::debug!(title = %modal.title, ?trigger, "close modal");
                true
            }
            None => false,
        }
    }

    pub fn handle_escape(&mut self) -> bool {
        if self.escape.active() == 0 {
            return false;
        }
        self.close_modal(CloseTrigger::Escape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apod::{Feed, MediaType, Record};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn page_with_cards(count: usize) -> Page {
        let records = (0..count)
            .map(|i| Record {
                title: format!("T{i}"),
                date: "2024-01-05".into(),
                media_type: MediaType::Image,
                url: format!("{i}.jpg"),
                ..Default::default()
            })
            .collect();
        let mut page = Page::new(3);
        page.gallery.render(&Feed::Records(records));
        page
    }

    #[test]
    fn every_close_path_removes_the_modal() {
        for trigger in [
            CloseTrigger::CloseButton,
            CloseTrigger::Backdrop,
            CloseTrigger::Escape,
        ] {
            let mut page = page_with_cards(2);
            assert!(page.open_card(1));
            assert_eq!(page.modal().map(|m| m.title.as_str()), Some("T1"));
            assert_eq!(page.escape_handlers(), 1);
            if trigger == CloseTrigger::Escape {
                assert!(page.handle_escape());
            } else {
                assert!(page.close_modal(trigger));
            }
            assert!(!page.has_modal());
            assert_eq!(page.escape_handlers(), 0);
            assert!(!page.handle_escape());
        }
    }

    #[test]
    fn repeated_opens_keep_a_single_escape_handler() {
        let mut page = page_with_cards(3);
        for index in [0, 1, 2, 0] {
            assert!(page.open_card(index));
            assert_eq!(page.escape_handlers(), 1);
        }
        assert_eq!(page.modal().map(|m| m.title.as_str()), Some("T0"));
        assert!(page.handle_escape());
        assert_eq!(page.escape_handlers(), 0);
    }

    #[test]
    fn open_card_out_of_range_is_ignored() {
        let mut page = page_with_cards(1);
        assert!(!page.open_card(4));
        assert!(!page.has_modal());
        assert!(page.open_selected());
    }

    #[test]
    fn fact_box_is_inserted_once() {
        let mut page = Page::new(3);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(page.show_random_fact(&mut rng));
        assert!(!page.show_random_fact(&mut rng));
        assert!(page.fact_box.is_some());
    }
}
