//! Color theme for the service dashboard.

use ratatui::style::{Color, Modifier, Style};

use svcwatch_core::types::service::ServiceStatus;


/// Colors for each part of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub header: Color,
    pub name: Color,
    pub port: Color,
    pub running: Color,
    pub down: Color,
    pub branch: Color,
    pub border: Color,
    pub footer: Color,
}


impl Theme {
    /// Dark terminal theme, the default.
    pub fn default_dark() -> Self {
        Theme {
            header: Color::Blue,
            name: Color::White,
            port: Color::Yellow,
            running: Color::Green,
            down: Color::Red,
            branch: Color::White,
            border: Color::Blue,
            footer: Color::DarkGray,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default().fg(self.header).add_modifier(Modifier::BOLD)
    }

    pub fn status_style(&self, status: ServiceStatus) -> Style {
        match status {
            ServiceStatus::Running => Style::default().fg(self.running),
            ServiceStatus::Down => Style::default().fg(self.down).add_modifier(Modifier::BOLD),
        }
    }
}


impl Default for Theme {
    fn default() -> Self {
        Self::default_dark()
    }
}
