//! Main render/view function (View in TEA pattern)

#[cfg(test)]
mod tests;

use parley_app::state::{AppState, Focus, UiMode};
use parley_core::DEFAULT_CHAT_TITLE;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

use super::{layout, widgets};
use crate::theme::palette;

/// Render the complete UI (View function in TEA)
///
/// Only the log's scroll state is written, with the content size measured
/// while wrapping.
pub fn view(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    let bg_block = Block::default().style(Style::default().bg(palette::DEEPEST_BG));
    frame.render_widget(bg_block, area);

    let areas = layout::create(area, state.sidebar_visible());

    let title = state
        .chat_list
        .active()
        .and_then(|index| state.chat_list.display_title(index))
        .unwrap_or(DEFAULT_CHAT_TITLE);
    frame.render_widget(widgets::HeaderBar::new(title, state.is_http()), areas.header);

    if let Some(sidebar) = areas.sidebar {
        let focused = state.focus == Focus::ChatList && state.ui_mode == UiMode::Normal;
        frame.render_widget(widgets::ChatListView::new(&state.chat_list, focused), sidebar);
    }

    let typing = state.typing_indicator();
    let tick = state.tick;
    let ui = &state.settings.ui;
    let (messages, scroll) = state.log.view_parts();
    let log_view =
        widgets::MessageLogView::new(messages, &ui.user_label, &ui.bot_label).typing(typing, tick);
    frame.render_stateful_widget(log_view, areas.messages, scroll);

    let composer_focused = state.focus == Focus::Input && state.ui_mode == UiMode::Normal;
    let input_bar = widgets::InputBar::new(&state.input)
        .staged(state.staging.pending())
        .focused(composer_focused)
        .loading(state.loading_attachment);
    let input_cursor = input_bar.cursor_position(areas.input);
    frame.render_widget(input_bar, areas.input);

    frame.render_widget(widgets::StatusBar::new(state), areas.status);

    match state.ui_mode {
        UiMode::Normal => {
            if let (true, Some(position)) = (composer_focused, input_cursor) {
                frame.set_cursor_position(position);
            }
        }
        UiMode::AttachPrompt => {
            let dialog = widgets::AttachPromptDialog::new(&state.attach_prompt);
            let position = dialog.cursor_position(area);
            frame.render_widget(dialog, area);
            frame.set_cursor_position(position);
        }
        UiMode::ConfirmDelete { index, .. } => {
            let title = state
                .chat_list
                .display_title(index)
                .unwrap_or(DEFAULT_CHAT_TITLE);
            frame.render_widget(widgets::ConfirmDeleteDialog::new(title), area);
        }
    }
}
