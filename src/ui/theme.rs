//! Theme configuration for the TUI.

use ratatui::style::{Color, Modifier, Style};

use crate::data::Difficulty;

/// Color theme for the application
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub border: Color,
    pub title: Color,
    pub label: Color,
    pub error: Color,
    pub easy: Color,
    pub medium: Color,
    pub hard: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            bg: Color::Reset,
            fg: Color::White,
            highlight_bg: Color::Rgb(60, 60, 80),
            highlight_fg: Color::White,
            border: Color::Rgb(100, 100, 120),
            title: Color::Cyan,
            label: Color::Gray,
            error: Color::Red,
            // Named colors for terminal compatibility
            easy: Color::Green,
            medium: Color::Yellow,
            hard: Color::LightRed,
        }
    }
}

impl Theme {
    /// Base surface style used to paint widget backgrounds
    pub fn surface_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// (border_style, title_style) for a panel's focus state
    pub fn panel_styles(&self, focused: bool) -> (Style, Style) {
        if focused {
            (self.focused_border_style(), self.focused_border_style())
        } else {
            (self.border_style(), self.dimmed_title_style())
        }
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed_title_style(&self) -> Style {
        Style::default()
            .fg(self.border)
            .add_modifier(Modifier::DIM)
    }

    /// Style for field labels in the detail panel
    pub fn label_style(&self) -> Style {
        Style::default().fg(self.label)
    }

    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    pub fn difficulty_style(&self, difficulty: Difficulty) -> Style {
        let color = match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        };
        Style::default().fg(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_colors_are_distinct() {
        let theme = Theme::default();
        let easy = theme.difficulty_style(Difficulty::Easy);
        let medium = theme.difficulty_style(Difficulty::Medium);
        let hard = theme.difficulty_style(Difficulty::Hard);
        assert_ne!(easy, medium);
        assert_ne!(medium, hard);
        assert_ne!(easy, hard);
    }

    #[test]
    fn test_focus_changes_panel_styles() {
        let theme = Theme::default();
        assert_ne!(theme.panel_styles(true), theme.panel_styles(false));
    }
}
