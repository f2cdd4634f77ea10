//! UI widgets for the hike browser.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{centered_rect, Theme};
use crate::data::{Hike, Observation};

fn panel_block<'b>(title: String, focused: bool, theme: &Theme) -> Block<'b> {
    let (border_style, title_style) = theme.panel_styles(focused);
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(if focused {
            BorderType::Double
        } else {
            BorderType::Plain
        })
        .border_style(border_style)
        .title_style(title_style)
}

/// Hike list panel widget
pub struct HikeList<'a> {
    hikes: &'a [Hike],
    selected: usize,
    search: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> HikeList<'a> {
    pub fn new(hikes: &'a [Hike], selected: usize, search: Option<&'a str>, theme: &'a Theme) -> Self {
        HikeList {
            hikes,
            selected,
            search,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let title = match self.search {
            Some(text) => format!(" Hikes ({}) matching \"{text}\" ", self.hikes.len()),
            None => format!(" Hikes ({}) ", self.hikes.len()),
        };
        let block = panel_block(title, focused, self.theme);

        if self.hikes.is_empty() {
            let message = if self.search.is_some() {
                "No hikes match the search."
            } else {
                "No hikes yet. Add one with `hikelog hike add`."
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self
            .hikes
            .iter()
            .map(|h| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        h.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(vec![
                        Span::raw(format!("  {} · {} · ", h.date, h.length_label())),
                        Span::styled(
                            h.difficulty.to_string(),
                            self.theme.difficulty_style(h.difficulty),
                        ),
                    ]),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(self.theme.highlight_style())
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

/// Detail panel showing every field of the selected hike
pub struct HikeDetail<'a> {
    hike: Option<&'a Hike>,
    theme: &'a Theme,
}

impl<'a> HikeDetail<'a> {
    pub fn new(hike: Option<&'a Hike>, theme: &'a Theme) -> Self {
        HikeDetail { hike, theme }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel_block(" Details ".to_string(), false, self.theme);

        let Some(hike) = self.hike else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let label = |text: &'static str| Span::styled(format!("{text:<18}"), self.theme.label_style());
        let length = hike.length_label();
        let rows = [
            ("Name", Span::styled(hike.name.as_str(), self.theme.title_style())),
            ("Location", Span::raw(hike.location.as_str())),
            ("Date", Span::raw(hike.date.as_str())),
            ("Parking available", Span::raw(hike.parking.as_str())),
            ("Length", Span::raw(length.as_str())),
            (
                "Difficulty",
                Span::styled(hike.difficulty.as_str(), self.theme.difficulty_style(hike.difficulty)),
            ),
            ("Description", Span::raw(hike.description_or_na())),
            ("Weather", Span::raw(hike.weather_or_na())),
            ("Recommended gear", Span::raw(hike.recommended_gear_or_na())),
        ];
        let lines: Vec<Line> = rows
            .into_iter()
            .map(|(name, value)| Line::from(vec![label(name), value]))
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .style(self.theme.surface_style());
        frame.render_widget(paragraph, area);
    }
}

/// Observations recorded on the selected hike
pub struct ObservationList<'a> {
    observations: &'a [Observation],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> ObservationList<'a> {
    pub fn new(observations: &'a [Observation], selected: usize, theme: &'a Theme) -> Self {
        ObservationList {
            observations,
            selected,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let block = panel_block(
            format!(" Observations ({}) ", self.observations.len()),
            focused,
            self.theme,
        );

        if self.observations.is_empty() {
            let paragraph = Paragraph::new("No observations yet.")
                .block(block)
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self
            .observations
            .iter()
            .map(|o| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("{}  ", o.time), self.theme.label_style()),
                        Span::raw(o.observation.clone()),
                    ]),
                    Line::from(Span::styled(
                        format!("  {}", o.comments_or_na()),
                        Style::default().add_modifier(Modifier::ITALIC),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(self.theme.highlight_style())
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if focused {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}

/// Centered yes/no prompt
pub struct ConfirmDialog<'a> {
    message: &'a str,
    theme: &'a Theme,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(message: &'a str, theme: &'a Theme) -> Self {
        ConfirmDialog { message, theme }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup_area);

        let lines = vec![
            Line::from(""),
            Line::from(self.message),
            Line::from(""),
            Line::from(Span::styled("[y] Yes   [n] No", self.theme.title_style())),
        ];
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Confirm ")
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_style(self.theme.focused_border_style())
                    .style(self.theme.surface_style()),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    search: Option<&'a str>,
    message: Option<&'a str>,
    error: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        search: Option<&'a str>,
        message: Option<&'a str>,
        error: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        StatusBar {
            search,
            message,
            error,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(e) = self.error {
            Line::from(Span::styled(format!("Error: {e}"), self.theme.error_style()))
        } else if let Some(text) = self.search {
            Line::from(vec![
                Span::styled("Search: ", self.theme.title_style()),
                Span::raw(format!("{text}_")),
            ])
        } else {
            let hint = "[/] Search [d] Delete [h] Help [q] Quit";
            match self.message {
                Some(m) => Line::from(format!("hikelog: {m} | {hint}")),
                None => Line::from(format!("hikelog | {hint}")),
            }
        };

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(self.theme.border_style()),
        );

        frame.render_widget(paragraph, area);
    }
}
