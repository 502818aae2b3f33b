use std::io;
use std::sync::Once;

use crossterm::terminal;

static RESTORE_HOOK: Once = Once::new();

/// Raw mode for the duration of one line read. Children are always launched
/// with the terminal back in cooked mode, so Ctrl-C reaches them as SIGINT.
pub struct RawTerminal {
    _private: (),
}

impl RawTerminal {
    pub fn enable() -> io::Result<Self> {
        RESTORE_HOOK.call_once(restore_on_panic);
        terminal::enable_raw_mode()?;
        Ok(RawTerminal { _private: () })
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn restore_on_panic() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = terminal::disable_raw_mode();
        previous(info);
    }));
}
