use crate::apod::{Feed, Record};
use crate::format::format_date;
use crate::modal::{ModalDescriptor, ModalMediaType};

pub const PROMPT_MESSAGE: &str = "Press f to fetch space images.";
pub const LOADING_MESSAGE: &str = "Loading space photos…";
pub const NO_IMAGES_MESSAGE: &str = "No images found.";

const ICON_PROMPT: &str = "🔭";
const ICON_LOADING: &str = "🔄";
const ICON_WARNING: &str = "⚠️";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub date_label: String,
    pub media_type: ModalMediaType,
    pub display_src: String,
    pub modal: ModalDescriptor,
}

impl Card {
    pub fn from_record(record: &Record) -> Self {
        if record.media_type.is_video() {
            let display_src = non_empty(record.thumbnail_url.as_deref())
                .or_else(|| non_empty(Some(record.url.as_str())))
                .unwrap_or_default()
                .to_string();
            Card {
                title: record.title.clone(),
                date_label: format_date(&record.date),
                media_type: ModalMediaType::Video,
                display_src,
                modal: ModalDescriptor {
                    media_type: ModalMediaType::Video,
                    src: record.url.clone(),
                    thumbnail: record.thumbnail_url.clone(),
                    title: record.title.clone(),
                    date: record.date.clone(),
                    explanation: record.explanation.clone(),
                },
            }
        } else {
            let display_src = non_empty(Some(record.url.as_str()))
                .or_else(|| non_empty(record.hdurl.as_deref()))
                .unwrap_or_default()
                .to_string();
            let modal_src = non_empty(record.hdurl.as_deref())
                .unwrap_or(record.url.as_str())
                .to_string();
            Card {
                title: record.title.clone(),
                date_label: format_date(&record.date),
                media_type: ModalMediaType::Image,
                display_src,
                modal: ModalDescriptor {
                    media_type: ModalMediaType::Image,
                    src: modal_src,
                    thumbnail: None,
                    title: record.title.clone(),
                    date: record.date.clone(),
                    explanation: record.explanation.clone(),
                },
            }
        }
    }

    pub fn has_play_overlay(&self) -> bool {
        self.media_type == ModalMediaType::Video
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|raw| !raw.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Prompt,
    Loading,
    Error(String),
    NoImages,
    Cards(Vec<Card>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub icon: &'static str,
    pub message: &'a str,
}

#[derive(Debug, Clone)]
pub struct Gallery {
    content: Content,
    selected: usize,
    columns: usize,
}

impl Gallery {
    pub fn new(columns: usize) -> Self {
        Self {
            content: Content::Prompt,
            selected: 0,
            columns: columns.max(1),
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn show_loading(&mut self) {
        self.replace(Content::Loading);
    }

    pub fn show_error<S: Into<String>>(&mut self, message: S) {
        self.replace(Content::Error(message.into()));
    }

    pub fn render(&mut self, feed: &Feed) {
        let records = match feed {
            Feed::Records(records) if !records.is_empty() => records,
            _ => {
                self.replace(Content::NoImages);
                return;
            }
        };
        let cards = records.iter().map(Card::from_record).collect();
        self.replace(Content::Cards(cards));
    }

    fn replace(&mut self, content: Content) {
        self.content = content;
        self.selected = 0;
    }

    pub fn cards(&self) -> &[Card] {
        match &self.content {
            Content::Cards(cards) => cards,
            _ => &[],
        }
    }

    pub fn placeholder(&self) -> Option<Placeholder<'_>> {
        match &self.content {
            Content::Prompt => Some(Placeholder {
                icon: ICON_PROMPT,
                message: PROMPT_MESSAGE,
            }),
            Content::Loading => Some(Placeholder {
                icon: ICON_LOADING,
                message: LOADING_MESSAGE,
            }),
            Content::Error(message) => Some(Placeholder {
                icon: ICON_WARNING,
                message: message.as_str(),
            }),
            Content::NoImages => Some(Placeholder {
                icon: ICON_WARNING,
                message: NO_IMAGES_MESSAGE,
            }),
            Content::Cards(_) => None,
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.cards().is_empty() {
            None
        } else {
            Some(self.selected.min(self.cards().len() - 1))
        }
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.selected_index().and_then(|index| self.cards().get(index))
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards().get(index)
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.cards().len() && index != self.selected {
            self.selected = index;
            true
        } else {
            false
        }
    }

    pub fn move_selection(&mut self, delta: i64) -> bool {
        let len = self.cards().len();
        if len == 0 {
            return false;
        }
        let current = self.selected.min(len - 1) as i64;
        let target = (current + delta).clamp(0, len as i64 - 1) as usize;
        self.select(target)
    }

    pub fn move_row(&mut self, rows: i64) -> bool {
        let len = self.cards().len() as i64;
        let current = self.selected as i64;
        let target = current + rows * self.columns as i64;
        if len == 0 || target < 0 || target >= len {
            return false;
        }
        self.select(target as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apod::MediaType;

    fn image(title: &str, url: &str, hdurl: Option<&str>) -> Record {
        Record {
            title: title.into(),
            date: "2024-01-05".into(),
            media_type: MediaType::Image,
            url: url.into(),
            hdurl: hdurl.map(str::to_string),
            thumbnail_url: None,
            explanation: format!("{title} explained"),
        }
    }

    fn video(url: &str, thumbnail: Option<&str>) -> Record {
        Record {
            title: "Clip".into(),
            date: "2024-01-06".into(),
            media_type: MediaType::Video,
            url: url.into(),
            hdurl: None,
            thumbnail_url: thumbnail.map(str::to_string),
            explanation: String::new(),
        }
    }

    #[test]
    fn renders_one_card_per_record_in_order() {
        let records: Vec<Record> = (0..5)
            .map(|i| image(&format!("T{i}"), &format!("{i}.jpg"), None))
            .collect();
        let mut gallery = Gallery::new(3);
        gallery.render(&Feed::Records(records));
        let titles: Vec<&str> = gallery.cards().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["T0", "T1", "T2", "T3", "T4"]);
        assert_eq!(gallery.placeholder(), None);
    }

    #[test]
    fn empty_or_unexpected_feed_shows_no_images() {
        let mut gallery = Gallery::new(3);
        for feed in [Feed::Records(Vec::new()), Feed::Unexpected] {
            gallery.render(&Feed::Records(vec![image("a", "a.jpg", None)]));
            gallery.render(&feed);
            assert!(gallery.cards().is_empty());
            assert_eq!(gallery.content(), &Content::NoImages);
            assert_eq!(
                gallery.placeholder().map(|p| p.message),
                Some(NO_IMAGES_MESSAGE)
            );
        }
    }

    #[test]
    fn image_card_shows_url_but_modal_prefers_hdurl() {
        let card = Card::from_record(&image("M1", "a.jpg", Some("a_hd.jpg")));
        assert_eq!(card.display_src, "a.jpg");
        assert_eq!(card.modal.src, "a_hd.jpg");
        assert_eq!(card.date_label, "January 5, 2024");
        assert!(!card.has_play_overlay());

        let hd_only = Card::from_record(&image("M2", "", Some("b_hd.jpg")));
        assert_eq!(hd_only.display_src, "b_hd.jpg");
        let plain = Card::from_record(&image("M3", "c.jpg", None));
        assert_eq!(plain.modal.src, "c.jpg");
    }

    #[test]
    fn video_card_prefers_thumbnail_then_url() {
        let with_thumb = Card::from_record(&video("https://youtu.be/dQw4w9WgXcQ", Some("t.jpg")));
        assert_eq!(with_thumb.display_src, "t.jpg");
        assert!(with_thumb.has_play_overlay());
        assert_eq!(with_thumb.modal.src, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(with_thumb.modal.thumbnail.as_deref(), Some("t.jpg"));

        let bare = Card::from_record(&video("https://youtu.be/dQw4w9WgXcQ", None));
        assert_eq!(bare.display_src, "https://youtu.be/dQw4w9WgXcQ");
        let nothing = Card::from_record(&video("", None));
        assert_eq!(nothing.display_src, "");
    }

    #[test]
    fn other_media_types_render_as_images() {
        let mut record = image("odd", "odd.gif", None);
        record.media_type = MediaType::Other("gif".into());
        let card = Card::from_record(&record);
        assert_eq!(card.media_type, ModalMediaType::Image);
    }

    #[test]
    fn selection_moves_across_grid_and_resets() {
        let records: Vec<Record> = (0..7)
            .map(|i| image(&format!("T{i}"), "x.jpg", None))
            .collect();
        let mut gallery = Gallery::new(3);
        gallery.render(&Feed::Records(records.clone()));
        assert_eq!(gallery.selected_index(), Some(0));
        assert!(gallery.move_row(1));
        assert_eq!(gallery.selected_index(), Some(3));
        assert!(gallery.move_row(1));
        assert_eq!(gallery.selected_index(), Some(6));
        assert!(!gallery.move_row(1));
        assert!(!gallery.move_selection(1));
        assert!(gallery.move_selection(-5));
        assert_eq!(gallery.selected_index(), Some(1));
        assert!(gallery.move_selection(-4));
        assert_eq!(gallery.selected_index(), Some(0));
        assert!(!gallery.move_selection(-1));

        gallery.render(&Feed::Records(records));
        assert_eq!(gallery.selected_index(), Some(0));
        gallery.show_loading();
        assert_eq!(gallery.selected_card(), None);
    }
}
