//! Main TUI runner - entry point and event loop

use parley_app::config::Settings;
use parley_app::ChatSession;
use parley_core::prelude::*;
use ratatui::DefaultTerminal;

use super::{event, render, terminal};

/// Run the TUI against the backend described by `settings`.
pub async fn run(settings: Settings) -> Result<()> {
    let mut session = ChatSession::open(settings).await;
    info!(
        "Session opened ({})",
        if session.state.is_http() {
            "http"
        } else {
            "websocket"
        }
    );

    let mut term = terminal::init();
    let result = run_loop(&mut term, &mut session);

    session.shutdown().await;
    terminal::restore();

    result
}

/// Main event loop
fn run_loop(terminal: &mut DefaultTerminal, session: &mut ChatSession) -> Result<()> {
    while !session.should_quit() {
        // Transport events, background task results, signals
        session.drain_pending_messages();

        terminal.draw(|frame| render::view(frame, &mut session.state))?;

        if let Some(message) = event::poll()? {
            session.process_message(message);
        }
    }

    Ok(())
}
