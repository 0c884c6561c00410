use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

/// Light/dark appearance. The choice is the one piece of state that
/// survives a restart (see `config`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn base(self) -> Style {
        match self {
            Theme::Light => Style::default().fg(Color::Black).bg(Color::White),
            Theme::Dark => Style::default().fg(Color::Gray).bg(Color::Reset),
        }
    }

    pub fn tab_active(self) -> Style {
        Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn tab_inactive(self) -> Style {
        match self {
            Theme::Light => Style::default().fg(Color::DarkGray),
            Theme::Dark => Style::default().fg(Color::Gray),
        }
    }

    pub fn grid_header(self) -> Style {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    }

    pub fn sorted_header(self) -> Style {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    }

    pub fn selected_row(self) -> Style {
        match self {
            Theme::Light => Style::default().bg(Color::LightBlue).fg(Color::Black),
            Theme::Dark => Style::default().bg(Color::Blue).fg(Color::White),
        }
    }

    pub fn sidebar_selected(self) -> Style {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    }

    pub fn status_bar(self) -> Style {
        match self {
            Theme::Light => Style::default().bg(Color::Gray).fg(Color::Black),
            Theme::Dark => Style::default().bg(Color::DarkGray).fg(Color::White),
        }
    }

    pub fn dim(self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn error(self) -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn accent(self) -> Style {
        Style::default().fg(Color::Magenta)
    }
}
