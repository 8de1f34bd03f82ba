//! Semantic style builders.

use parley_app::state::ConnectionStatus;
use parley_core::Role;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

use super::palette;

// --- Text styles ---
pub fn text_primary() -> Style {
    Style::default().fg(palette::TEXT_PRIMARY)
}

pub fn text_secondary() -> Style {
    Style::default().fg(palette::TEXT_SECONDARY)
}

pub fn text_muted() -> Style {
    Style::default().fg(palette::TEXT_MUTED)
}

// --- Border styles ---
pub fn border_inactive() -> Style {
    Style::default().fg(palette::BORDER_DIM)
}

pub fn border_active() -> Style {
    Style::default().fg(palette::BORDER_ACTIVE)
}

pub fn accent_bold() -> Style {
    Style::default()
        .fg(palette::ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn keybinding() -> Style {
    Style::default().fg(palette::STATUS_YELLOW)
}

/// "Black on Cyan" for the focused+selected row
pub fn focused_selected() -> Style {
    Style::default()
        .fg(palette::CONTRAST_FG)
        .bg(palette::ACCENT)
        .add_modifier(Modifier::BOLD)
}

// --- Messages ---

/// Style of the author label above a message.
pub fn role_label(role: Role) -> Style {
    match role {
        Role::User => Style::default()
            .fg(palette::USER_LABEL)
            .add_modifier(Modifier::BOLD),
        Role::Bot => Style::default()
            .fg(palette::BOT_LABEL)
            .add_modifier(Modifier::BOLD),
        Role::System => Style::default().fg(palette::NOTICE),
    }
}

/// Style of a message body.
pub fn role_body(role: Role) -> Style {
    match role {
        Role::System => Style::default()
            .fg(palette::NOTICE)
            .add_modifier(Modifier::ITALIC),
        _ => text_primary(),
    }
}

pub fn file_chip() -> Style {
    Style::default()
        .fg(palette::FILE_CHIP)
        .add_modifier(Modifier::UNDERLINED)
}

// --- Block builders ---
pub fn glass_block(focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            border_active()
        } else {
            border_inactive()
        })
}

pub fn modal_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_active())
        .style(Style::default().bg(palette::POPUP_BG))
}

// --- Connection indicator ---

/// `(icon, Style)` for the connection status.
pub fn connection_indicator(status: &ConnectionStatus) -> (&'static str, Style) {
    match status {
        ConnectionStatus::Connected => (
            "●",
            Style::default()
                .fg(palette::STATUS_GREEN)
                .add_modifier(Modifier::BOLD),
        ),
        ConnectionStatus::Connecting => ("◌", Style::default().fg(palette::TEXT_SECONDARY)),
        ConnectionStatus::Reconnecting { .. } => (
            "↻",
            Style::default()
                .fg(palette::STATUS_YELLOW)
                .add_modifier(Modifier::BOLD),
        ),
        ConnectionStatus::Disconnected { .. } => ("○", Style::default().fg(palette::STATUS_RED)),
    }
}
