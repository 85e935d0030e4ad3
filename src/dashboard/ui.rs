//! Terminal UI for the metrics dashboard
//!
//! Draws a [`MetricsView`] with ratatui: a header with the heading and fetch
//! status, the JSON dump in a scrollable body, and a footer that carries the
//! error indicator or the key help.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::dashboard::view::{FetchStatus, MetricsView, HEADING};

const PAGE: u16 = 10;

/// Application state for the dashboard screen
pub struct DashboardApp {
    pub view: MetricsView,
    pub scroll: u16,
    pub last_update: Option<DateTime<Local>>,
}

impl DashboardApp {
    pub fn new(view: MetricsView) -> Self {
        Self {
            view,
            scroll: 0,
            last_update: None,
        }
    }

    /// Pick up a finished fetch; returns `true` when a redraw is needed
    pub fn tick(&mut self) -> bool {
        let changed = self.view.poll_update();
        if changed {
            self.last_update = Some(Local::now());
        }
        changed
    }

    /// Handle keyboard input, returning `true` to quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(PAGE as i32),
            KeyCode::PageUp => self.scroll_by(-(PAGE as i32)),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
        false
    }

    fn scroll_by(&mut self, delta: i32) {
        let max = self.line_count().saturating_sub(1);
        let next = (self.scroll as i32 + delta).clamp(0, max as i32);
        self.scroll = next as u16;
    }

    fn line_count(&self) -> u16 {
        let lines = self.view.collection_text().lines().count();
        u16::try_from(lines).unwrap_or(u16::MAX)
    }

    /// Render the UI
    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(5),    // Collection
                Constraint::Length(3), // Footer
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_body(f, chunks[1]);
        self.render_footer(f, chunks[2]);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let (status, color) = match self.view.status() {
            FetchStatus::Idle => ("idle".to_string(), Color::DarkGray),
            FetchStatus::Loading => ("loading...".to_string(), Color::Yellow),
            FetchStatus::Loaded => (
                format!("{} metrics", self.view.metrics().len()),
                Color::Green,
            ),
            FetchStatus::Failed(_) => ("failed".to_string(), Color::Red),
        };

        let last_update = self
            .last_update
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "Never".to_string());

        let title = Line::from(vec![
            Span::styled(
                HEADING,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  "),
            Span::styled(status, Style::default().fg(color)),
            Span::raw("  |  Last update: "),
            Span::styled(last_update, Style::default().fg(Color::Green)),
        ]);

        let paragraph = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_body(&self, f: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(self.view.collection_text())
            .block(Block::default().borders(Borders::ALL).title("Metrics"))
            .scroll((self.scroll, 0));
        f.render_widget(paragraph, area);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let line = match self.view.status() {
            FetchStatus::Failed(reason) => Line::from(Span::styled(
                format!("Error: {}", reason),
                Style::default().fg(Color::Red),
            )),
            _ => Line::from(Span::styled(
                "Press 'q' to quit | arrows / PgUp / PgDn to scroll",
                Style::default().fg(Color::DarkGray),
            )),
        };

        let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}
