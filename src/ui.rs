use std::io::{self, Stdout};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use textwrap::{wrap, Options as WrapOptions};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::apod::{Feed, FetchError};
use crate::data::{FeedService, LinkOpener};
use crate::fetch::{FetchOutcome, FetchTicket, Orchestrator};
use crate::gallery::{Card, Content};
use crate::modal::{self, CloseTrigger, Modal, ModalLayout, ModalMedia};
use crate::page::Page;

const COLOR_BG: Color = Color::Rgb(30, 30, 46);
const COLOR_BACKDROP: Color = Color::Rgb(17, 17, 27);
const COLOR_PANEL_BG: Color = Color::Rgb(24, 24, 36);
const COLOR_PANEL_FOCUSED_BG: Color = Color::Rgb(49, 50, 68);
const COLOR_BORDER_IDLE: Color = Color::Rgb(49, 50, 68);
const COLOR_BORDER_FOCUSED: Color = Color::Rgb(137, 180, 250);
const COLOR_TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
const COLOR_TEXT_SECONDARY: Color = Color::Rgb(166, 173, 200);
const COLOR_ACCENT: Color = Color::Rgb(137, 180, 250);
const COLOR_FACT: Color = Color::Rgb(249, 226, 175);
const COLOR_ERROR: Color = Color::Rgb(243, 139, 168);

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const CARD_HEIGHT: u16 = 6;
const TRIGGER_HEIGHT: u16 = 3;
const FACT_HEIGHT: u16 = 3;
const ICON_IMAGE: &str = "🖼";

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= Duration::from_millis(120) {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_tick = Instant::now();
    }
}

enum AsyncResponse {
    Feed {
        ticket: FetchTicket,
        result: Result<Feed, FetchError>,
    },
}

#[derive(Default)]
struct ScreenLayout {
    trigger: Rect,
    cards: Vec<(usize, Rect)>,
    modal: Option<ModalLayout>,
}

#[derive(Clone)]
pub struct Options {
    pub status_message: String,
    pub feed_service: Option<Arc<dyn FeedService + Send + Sync>>,
    pub link_opener: Arc<dyn LinkOpener + Send + Sync>,
    pub columns: usize,
    pub feed_label: String,
}

pub struct Model {
    page: Page,
    orchestrator: Orchestrator,
    feed_service: Option<Arc<dyn FeedService + Send + Sync>>,
    link_opener: Arc<dyn LinkOpener + Send + Sync>,
    feed_label: String,
    status_message: String,
    spinner: Spinner,
    rng: StdRng,
    needs_redraw: bool,
    gallery_row_offset: usize,
    screen: ScreenLayout,
    response_tx: Sender<AsyncResponse>,
    response_rx: Receiver<AsyncResponse>,
}

impl Model {
    pub fn new(opts: Options) -> Self {
        let (response_tx, response_rx) = unbounded();
        let mut model = Self {
            page: Page::new(opts.columns),
            orchestrator: Orchestrator::default(),
            feed_service: opts.feed_service,
            link_opener: opts.link_opener,
            feed_label: opts.feed_label,
            status_message: opts.status_message,
            spinner: Spinner::new(),
            rng: StdRng::from_entropy(),
            needs_redraw: true,
            gallery_row_offset: 0,
            screen: ScreenLayout::default(),
            response_tx,
            response_rx,
        };
        model.page.show_random_fact(&mut model.rng);
        model
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(120);

        loop {
            if self.poll_async() {
                self.mark_dirty();
            }

            if self.needs_redraw {
                self.render(terminal)?;
            }

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key.code) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(err) => {
                                self.status_message = format!("Error: {}", err);
                                self.mark_dirty();
                            }
                        }
                    }
                    Event::Mouse(mouse) => {
                        if let Err(err) = self.handle_mouse(mouse) {
                            self.status_message = format!("Error: {}", err);
                            self.mark_dirty();
                        }
                    }
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
                if self.is_loading() {
                    if self.spinner.advance() {
                        self.mark_dirty();
                    }
                } else {
                    self.spinner.reset();
                }
            }
        }

        Ok(())
    }

    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        self.needs_redraw = false;
        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    pub fn poll_async(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.response_rx.try_recv() {
            self.handle_async_response(message);
            changed = true;
        }
        changed
    }

    fn handle_async_response(&mut self, message: AsyncResponse) {
        match message {
            AsyncResponse::Feed { ticket, result } => {
                let Some(outcome) =
                    self.orchestrator
                        .complete(&mut self.page, ticket, result, &mut self.rng)
                else {
                    return;
                };
                self.gallery_row_offset = 0;
                self.status_message = match outcome {
                    FetchOutcome::Rendered { cards } => format!(
                        "Loaded {cards} space {}. Enter opens details, f fetches again.",
                        if cards == 1 { "image" } else { "images" }
                    ),
                    FetchOutcome::NoImages => "The feed did not contain any images.".to_string(),
                    FetchOutcome::Failed => {
                        "Unable to load images. Press f to try again.".to_string()
                    }
                };
            }
        }
    }

    pub fn activate_trigger(&mut self) -> bool {
        let Some(service) = self.feed_service.clone() else {
            self.status_message = "No feed source configured.".to_string();
            self.mark_dirty();
            return false;
        };
        let Some(ticket) = self.orchestrator.begin(&mut self.page) else {
            return false;
        };
        self.status_message = format!("Loading space photos from {}…", self.feed_label);
        self.spinner.reset();
        self.mark_dirty();

        let tx = self.response_tx.clone();
        thread::spawn(move || {
            let result = service.load_feed();
            let _ = tx.send(AsyncResponse::Feed { ticket, result });
        });
        true
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if self.page.has_modal() {
            return self.handle_modal_key(code);
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('f') | KeyCode::Char(' ') => {
                self.activate_trigger();
            }
            KeyCode::Enter => {
                if self.page.open_selected() {
                    self.status_message = modal_status(self.page.modal());
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.page.gallery.move_selection(-1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.page.gallery.move_selection(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.page.gallery.move_row(-1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.page.gallery.move_row(1);
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.page.gallery.select(0);
            }
            KeyCode::End | KeyCode::Char('G') => {
                let last = self.page.gallery.cards().len().saturating_sub(1);
                self.page.gallery.select(last);
            }
            _ => return Ok(false),
        }
        self.mark_dirty();
        Ok(false)
    }

    fn handle_modal_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Esc => {
                self.page.handle_escape();
                self.status_message = "Closed details.".to_string();
            }
            KeyCode::Char('x') => {
                self.close_modal(CloseTrigger::CloseButton);
            }
            KeyCode::Enter | KeyCode::Char('w') | KeyCode::Char('o') => {
                self.open_modal_link()?;
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll_modal(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_modal(-1),
            KeyCode::PageDown => self.scroll_modal(10),
            KeyCode::PageUp => self.scroll_modal(-10),
            _ => return Ok(false),
        }
        self.mark_dirty();
        Ok(false)
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) -> Result<()> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_click(event.column, event.row)?;
            }
            MouseEventKind::ScrollDown => {
                if self.page.has_modal() {
                    self.scroll_modal(3);
                } else {
                    self.page.gallery.move_row(1);
                }
            }
            MouseEventKind::ScrollUp => {
                if self.page.has_modal() {
                    self.scroll_modal(-3);
                } else {
                    self.page.gallery.move_row(-1);
                }
            }
            _ => return Ok(()),
        }
        self.mark_dirty();
        Ok(())
    }

    fn handle_click(&mut self, column: u16, row: u16) -> Result<()> {
        if self.page.has_modal() {
            let Some(layout) = self.screen.modal else {
                return Ok(());
            };
            let hit = layout.hit(column, row);
            if let Some(trigger) = Modal::close_trigger_for(hit) {
                self.close_modal(trigger);
            } else if hit == modal::ModalHit::Media
                && self.page.modal().is_some_and(Modal::is_video)
            {
                self.open_modal_link()?;
            }
            return Ok(());
        }

        if modal::contains(self.screen.trigger, column, row) {
            self.activate_trigger();
            return Ok(());
        }

        let clicked = self
            .screen
            .cards
            .iter()
            .find(|(_, rect)| modal::contains(*rect, column, row))
            .map(|(index, _)| *index);
        if let Some(index) = clicked {
            if self.page.open_card(index) {
                self.status_message = modal_status(self.page.modal());
            }
        }
        Ok(())
    }

    fn close_modal(&mut self, trigger: CloseTrigger) {
        if self.page.close_modal(trigger) {
            self.status_message = "Closed details.".to_string();
        }
    }

    fn scroll_modal(&mut self, delta: i32) {
        if let Some(modal) = self.page.modal_mut() {
            modal.scroll_by(delta);
        }
    }

    fn open_modal_link(&mut self) -> Result<()> {
        let Some(url) = self.page.modal().map(|modal| modal.external_link().to_string()) else {
            return Ok(());
        };
        tracing::debug!(%url, "opening external link");
        match self.link_opener.open(&url) {
            Ok(()) => {
                self.status_message = format!("Opened {url} in your browser.");
            }
            Err(err) => {
                tracing::warn!(%url, error = %err, "failed to open link");
                self.status_message = format!("Failed to open link: {err}");
            }
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let full = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(COLOR_BG)), full);

        let fact_height = if self.page.fact_box.is_some() {
            FACT_HEIGHT
        } else {
            0
        };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(TRIGGER_HEIGHT),
                Constraint::Length(fact_height),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(full);

        let status_text = if self.is_loading() {
            format!("{} {}", self.spinner.frame(), self.status_message)
                .trim()
                .to_string()
        } else {
            self.status_message.clone()
        };
        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .bg(COLOR_PANEL_FOCUSED_BG)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, layout[0]);

        self.draw_trigger(frame, layout[1]);
        self.draw_fact_box(frame, layout[2]);
        self.draw_gallery(frame, layout[3]);

        let footer = Paragraph::new(self.footer_text())
            .style(
                Style::default()
                    .fg(COLOR_TEXT_SECONDARY)
                    .bg(COLOR_PANEL_BG)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center);
        frame.render_widget(footer, layout[4]);

        self.screen.modal = None;
        if self.page.has_modal() {
            self.draw_modal(frame, full);
        }
    }

    fn draw_trigger(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let label = self.page.trigger.label();
        let enabled = self.page.trigger.is_enabled();
        let text = if enabled {
            format!("▶ {label}")
        } else {
            format!("{} {label}", self.spinner.frame())
        };
        let width = (UnicodeWidthStr::width(text.as_str()) as u16 + 4).min(area.width);
        let button = Rect { width, ..area };
        let (fg, border) = if enabled {
            (COLOR_TEXT_PRIMARY, COLOR_BORDER_FOCUSED)
        } else {
            (COLOR_TEXT_SECONDARY, COLOR_BORDER_IDLE)
        };
        let widget = Paragraph::new(Span::styled(
            text,
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .style(Style::default().bg(COLOR_PANEL_BG)),
        );
        frame.render_widget(widget, button);
        self.screen.trigger = button;
    }

    fn draw_fact_box(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(fact) = &self.page.fact_box else {
            return;
        };
        if area.height == 0 {
            return;
        }
        let line = Line::from(vec![
            Span::styled(
                format!("{} ", fact.heading),
                Style::default()
                    .fg(COLOR_FACT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(fact.fact, Style::default().fg(COLOR_TEXT_PRIMARY)),
        ]);
        let widget = Paragraph::new(line).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_FACT))
                .style(Style::default().bg(COLOR_PANEL_BG)),
        );
        frame.render_widget(widget, area);
    }

    fn draw_gallery(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(Span::styled(
                "Gallery",
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_IDLE))
            .style(Style::default().bg(COLOR_PANEL_BG))
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.screen.cards.clear();

        if let Some(placeholder) = self.page.gallery.placeholder() {
            let color = if matches!(
                self.page.gallery.content(),
                Content::Error(_) | Content::NoImages
            ) {
                COLOR_ERROR
            } else {
                COLOR_TEXT_SECONDARY
            };
            let top = inner.height.saturating_sub(2) / 2;
            let mut lines = vec![Line::default(); top as usize];
            lines.push(Line::from(placeholder.icon));
            lines.push(Line::from(Span::styled(
                placeholder.message.to_string(),
                Style::default().fg(color),
            )));
            let widget = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
            frame.render_widget(widget, inner);
            return;
        }

        let columns = grid_columns(inner, self.page.gallery.columns());
        let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
        if let Some(selected) = self.page.gallery.selected_index() {
            self.gallery_row_offset =
                scroll_to_row(self.gallery_row_offset, selected / columns, visible_rows);
        }
        let selected = self.page.gallery.selected_index();
        let rects = grid_rects(
            inner,
            columns,
            self.page.gallery.cards().len(),
            self.gallery_row_offset,
        );
        for (index, rect) in &rects {
            if let Some(card) = self.page.gallery.card(*index) {
                draw_card(frame, *rect, card, selected == Some(*index));
            }
        }
        self.screen.cards = rects;
    }

    fn draw_modal(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let Some(modal) = self.page.modal() else {
            return;
        };
        let layout = ModalLayout::compute(area);
        frame.render_widget(
            Block::default().style(Style::default().bg(COLOR_BACKDROP)),
            layout.backdrop,
        );
        frame.render_widget(Clear, layout.content);
        frame.render_widget(
            Block::default()
                .title(Span::styled(
                    truncate_to_width(&modal.title, layout.content.width.saturating_sub(10) as usize),
                    Style::default()
                        .fg(COLOR_ACCENT)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_ACCENT))
                .style(Style::default().bg(COLOR_PANEL_BG)),
            layout.content,
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                modal::CLOSE_GLYPH,
                Style::default()
                    .fg(COLOR_ERROR)
                    .add_modifier(Modifier::BOLD),
            )),
            layout.close_button,
        );

        let media_width = layout.media.width as usize;
        frame.render_widget(
            Paragraph::new(Text::from(media_lines(&modal.media, media_width))),
            layout.media,
        );

        let details = detail_lines(modal, layout.details.width as usize);
        let max_scroll = details.len().saturating_sub(layout.details.height as usize) as u16;
        let scroll = modal.scroll.min(max_scroll);
        frame.render_widget(
            Paragraph::new(Text::from(details)).scroll((scroll, 0)),
            layout.details,
        );
        self.screen.modal = Some(layout);
    }

    fn footer_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(modal) = self.page.modal() {
            if modal.is_video() {
                parts.push("Enter/w watch video".to_string());
            } else {
                parts.push("o open image".to_string());
            }
            parts.push("j/k scroll".to_string());
            parts.push("x or Esc close".to_string());
            return parts.join(" · ");
        }

        if self.page.trigger.is_enabled() {
            parts.push("f fetch images".to_string());
        } else {
            parts.push("Fetching…".to_string());
        }
        if !self.page.gallery.cards().is_empty() {
            parts.push("h/j/k/l move".to_string());
            parts.push("Enter details".to_string());
        }
        parts.push("q quit".to_string());
        parts.join(" · ")
    }
}

fn modal_status(modal: Option<&Modal>) -> String {
    match modal {
        Some(modal) if modal.is_video() => {
            format!("Viewing {}. Press w to watch, Esc to close.", display_title(&modal.title))
        }
        Some(modal) => format!("Viewing {}. Press Esc to close.", display_title(&modal.title)),
        None => String::new(),
    }
}

fn display_title(title: &str) -> &str {
    if title.trim().is_empty() {
        "untitled entry"
    } else {
        title
    }
}

fn draw_card(frame: &mut Frame<'_>, area: Rect, card: &Card, selected: bool) {
    let border = if selected {
        COLOR_BORDER_FOCUSED
    } else {
        COLOR_BORDER_IDLE
    };
    let bg = if selected {
        COLOR_PANEL_FOCUSED_BG
    } else {
        COLOR_PANEL_BG
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let (icon, icon_style) = if card.has_play_overlay() {
        (modal::PLAY_GLYPH, Style::default().fg(COLOR_ERROR))
    } else {
        (ICON_IMAGE, Style::default().fg(COLOR_ACCENT))
    };
    let media = truncate_to_width(&card.display_src, width.saturating_sub(3));
    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{icon} "), icon_style),
            Span::styled(media, Style::default().fg(COLOR_TEXT_SECONDARY)),
        ]),
        Line::from(Span::styled(
            truncate_to_width(&card.title, width),
            Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_to_width(&card.date_label, width),
            Style::default().fg(COLOR_TEXT_SECONDARY),
        )),
    ];
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn media_lines(media: &ModalMedia, width: usize) -> Vec<Line<'static>> {
    let label = Style::default()
        .fg(COLOR_TEXT_SECONDARY)
        .add_modifier(Modifier::ITALIC);
    match media {
        ModalMedia::Image { src } => vec![
            Line::from(vec![
                Span::styled(format!("{ICON_IMAGE} Image "), label),
                Span::styled(
                    truncate_to_width(src, width.saturating_sub(9)),
                    Style::default().fg(COLOR_ACCENT),
                ),
            ]),
            Line::from(Span::styled("o opens the full image in your browser", label)),
        ],
        ModalMedia::Video {
            thumbnail,
            watch_url,
        } => {
            let thumb = if thumbnail.is_empty() {
                "(no thumbnail)".to_string()
            } else {
                truncate_to_width(thumbnail, width.saturating_sub(12))
            };
            vec![
                Line::from(vec![
                    Span::styled("Thumbnail ", label),
                    Span::styled(thumb, Style::default().fg(COLOR_TEXT_SECONDARY)),
                ]),
                Line::from(Span::styled(
                    format!("{}  Play", modal::PLAY_GLYPH),
                    Style::default()
                        .fg(COLOR_ERROR)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::styled(
                        format!("{} ", modal::WATCH_LABEL),
                        Style::default()
                            .fg(COLOR_TEXT_PRIMARY)
                            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    ),
                    Span::styled(
                        truncate_to_width(
                            watch_url,
                            width.saturating_sub(modal::WATCH_LABEL.len() + 1),
                        ),
                        Style::default().fg(COLOR_ACCENT),
                    ),
                ]),
            ]
        }
    }
}

fn detail_lines(modal: &Modal, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            modal.title.clone(),
            Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            modal.date_label.clone(),
            Style::default().fg(COLOR_TEXT_SECONDARY),
        )),
        Line::default(),
    ];
    let style = Style::default().fg(COLOR_TEXT_PRIMARY);
    if width == 0 {
        lines.push(Line::from(Span::styled(modal.explanation.clone(), style)));
        return lines;
    }
    lines.extend(
        wrap(&modal.explanation, WrapOptions::new(width))
            .into_iter()
            .map(|cow| Line::from(Span::styled(cow.into_owned(), style))),
    );
    lines
}

fn grid_rects(area: Rect, columns: usize, count: usize, first_row: usize) -> Vec<(usize, Rect)> {
    if area.width == 0 || area.height == 0 {
        return Vec::new();
    }
    let columns = grid_columns(area, columns);
    let card_width = (area.width / columns as u16).max(1);
    let visible_rows = (area.height / CARD_HEIGHT) as usize;
    let mut rects = Vec::new();
    for row in 0..visible_rows {
        for column in 0..columns {
            let index = (first_row + row) * columns + column;
            if index >= count {
                return rects;
            }
            let x = area.x + column as u16 * card_width;
            rects.push((
                index,
                Rect {
                    x,
                    y: area.y + row as u16 * CARD_HEIGHT,
                    width: card_width.min(area.x + area.width - x),
                    height: CARD_HEIGHT,
                },
            ));
        }
    }
    rects
}

// Never more columns than cells, so every card in a visible row gets a rect.
fn grid_columns(area: Rect, columns: usize) -> usize {
    columns.clamp(1, (area.width as usize).max(1))
}

fn scroll_to_row(offset: usize, row: usize, visible_rows: usize) -> usize {
    let visible_rows = visible_rows.max(1);
    if row < offset {
        row
    } else if row >= offset + visible_rows {
        row + 1 - visible_rows
    } else {
        offset
    }
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width + 1 > width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}
