//! Terminal setup and restoration

use ratatui::DefaultTerminal;

/// Enter raw mode on the alternate screen.
///
/// The terminal is restored on panic as well as by [`restore`].
pub fn init() -> DefaultTerminal {
    install_panic_hook();
    ratatui::init()
}

pub fn restore() {
    ratatui::restore();
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));
}
