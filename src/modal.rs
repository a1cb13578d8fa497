use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ratatui::layout::Rect;

use crate::format::format_date;
use crate::video;

pub const WATCH_LABEL: &str = "Watch on YouTube";
pub const PLAY_GLYPH: &str = "▶";
pub const CLOSE_GLYPH: &str = "[x]";

const MEDIA_ROWS: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMediaType {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalDescriptor {
    pub media_type: ModalMediaType,
    pub src: String,
    pub thumbnail: Option<String>,
    pub title: String,
    pub date: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalMedia {
    Image { src: String },
    Video { thumbnail: String, watch_url: String },
}

impl ModalMedia {
    fn build(descriptor: &ModalDescriptor) -> Self {
        match descriptor.media_type {
            ModalMediaType::Image => ModalMedia::Image {
                src: descriptor.src.clone(),
            },
            ModalMediaType::Video => ModalMedia::Video {
                thumbnail: video::resolve_thumbnail(
                    descriptor.thumbnail.as_deref(),
                    &descriptor.src,
                ),
                watch_url: video::watch_url(&descriptor.src),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EscapeHandlers {
    active: Arc<AtomicUsize>,
}

impl EscapeHandlers {
    pub fn subscribe(&self) -> EscapeSubscription {
        self.active.fetch_add(1, Ordering::SeqCst);
        EscapeSubscription {
            active: self.active.clone(),
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Deregisters itself on drop.
#[derive(Debug)]
pub struct EscapeSubscription {
    active: Arc<AtomicUsize>,
}

impl Drop for EscapeSubscription {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    CloseButton,
    Backdrop,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalHit {
    CloseButton,
    Media,
    Details,
    Backdrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalLayout {
    pub backdrop: Rect,
    pub content: Rect,
    pub close_button: Rect,
    pub media: Rect,
    pub details: Rect,
}

impl ModalLayout {
    pub fn compute(area: Rect) -> Self {
        let content = centered_rect(80, 80, area);
        let close_width = CLOSE_GLYPH.len() as u16;
        let close_button = Rect {
            x: content
                .x
                .saturating_add(content.width.saturating_sub(close_width + 2)),
            y: content.y,
            width: close_width.min(content.width),
            height: content.height.min(1),
        };
        let inner = Rect {
            x: content.x.saturating_add(2),
            y: content.y.saturating_add(1),
            width: content.width.saturating_sub(4),
            height: content.height.saturating_sub(2),
        };
        let media_height = MEDIA_ROWS.min(inner.height);
        let media = Rect {
            height: media_height,
            ..inner
        };
        let details = Rect {
            y: inner.y.saturating_add(media_height + 1),
            height: inner.height.saturating_sub(media_height + 1),
            ..inner
        };
        Self {
            backdrop: area,
            content,
            close_button,
            media,
            details,
        }
    }

    pub fn hit(&self, column: u16, row: u16) -> ModalHit {
        if contains(self.close_button, column, row) {
            ModalHit::CloseButton
        } else if contains(self.media, column, row) {
            ModalHit::Media
        } else if contains(self.content, column, row) {
            ModalHit::Details
        } else {
            ModalHit::Backdrop
        }
    }
}

pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[derive(Debug)]
pub struct Modal {
    pub title: String,
    pub date_label: String,
    pub explanation: String,
    pub media: ModalMedia,
    pub scroll: u16,
    _escape: EscapeSubscription,
}

impl Modal {
    pub fn open(descriptor: &ModalDescriptor, escape: &EscapeHandlers) -> Self {
        tracing::debug!(title = %descriptor.title, media = ?descriptor.media_type, "open modal");
        Self {
            title: descriptor.title.clone(),
            date_label: format_date(&descriptor.date),
            explanation: descriptor.explanation.clone(),
            media: ModalMedia::build(descriptor),
            scroll: 0,
            _escape: escape.subscribe(),
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self.media, ModalMedia::Video { .. })
    }

    pub fn external_link(&self) -> &str {
        match &self.media {
            ModalMedia::Image { src } => src,
            ModalMedia::Video { watch_url, .. } => watch_url,
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let next = i32::from(self.scroll) + delta;
        self.scroll = next.clamp(0, i32::from(u16::MAX)) as u16;
    }

    pub fn close_trigger_for(hit: ModalHit) -> Option<CloseTrigger> {
        match hit {
            ModalHit::CloseButton => Some(CloseTrigger::CloseButton),
            ModalHit::Backdrop => Some(CloseTrigger::Backdrop),
            ModalHit::Media | ModalHit::Details => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_descriptor(src: &str, thumbnail: Option<&str>) -> ModalDescriptor {
        ModalDescriptor {
            media_type: ModalMediaType::Video,
            src: src.into(),
            thumbnail: thumbnail.map(str::to_string),
            title: "Clip".into(),
            date: "2024-02-10".into(),
            explanation: "A video.".into(),
        }
    }

    #[test]
    fn video_modal_derives_thumbnail_and_watch_link() {
        let escape = EscapeHandlers::default();
        let modal = Modal::open(
            &video_descriptor("https://www.youtube.com/embed/dQw4w9WgXcQ", None),
            &escape,
        );
        assert_eq!(
            modal.media,
            ModalMedia::Video {
                thumbnail: "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg".into(),
                watch_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
            }
        );
        assert_eq!(modal.external_link(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(modal.date_label, "February 10, 2024");
    }

    #[test]
    fn unrecognized_video_uses_src_and_empty_thumbnail() {
        let escape = EscapeHandlers::default();
        let src = "https://example.org/movie.mp4";
        let modal = Modal::open(&video_descriptor(src, None), &escape);
        assert_eq!(
            modal.media,
            ModalMedia::Video {
                thumbnail: String::new(),
                watch_url: src.into(),
            }
        );
        let with_thumb = Modal::open(&video_descriptor(src, Some("t.jpg")), &escape);
        assert!(matches!(with_thumb.media, ModalMedia::Video { ref thumbnail, .. } if thumbnail == "t.jpg"));
    }

    #[test]
    fn escape_subscription_is_released_on_drop() {
        let escape = EscapeHandlers::default();
        for _ in 0..3 {
            let modal = Modal::open(&video_descriptor("x", None), &escape);
            assert_eq!(escape.active(), 1);
            drop(modal);
            assert_eq!(escape.active(), 0);
        }
    }

    #[test]
    fn layout_hit_testing() {
        let layout = ModalLayout::compute(Rect::new(0, 0, 100, 40));
        assert_eq!(layout.content, Rect::new(10, 4, 80, 32));
        assert_eq!(layout.hit(0, 0), ModalHit::Backdrop);
        assert_eq!(
            layout.hit(layout.close_button.x, layout.close_button.y),
            ModalHit::CloseButton
        );
        assert_eq!(layout.hit(layout.media.x, layout.media.y), ModalHit::Media);
        assert_eq!(
            layout.hit(layout.details.x, layout.details.y),
            ModalHit::Details
        );
        assert_eq!(
            Modal::close_trigger_for(layout.hit(99, 39)),
            Some(CloseTrigger::Backdrop)
        );
        assert_eq!(Modal::close_trigger_for(ModalHit::Details), None);
    }

    #[test]
    fn scroll_never_goes_negative() {
        let escape = EscapeHandlers::default();
        let mut modal = Modal::open(&video_descriptor("x", None), &escape);
        modal.scroll_by(-3);
        assert_eq!(modal.scroll, 0);
        modal.scroll_by(5);
        assert_eq!(modal.scroll, 5);
    }
}
