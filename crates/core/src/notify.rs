//! Notification sink for user-facing messages (toasts).
//!
//! The core fires notices and never waits for anything in return.

use crate::types::Notice;

pub const MSG_RESTARTED: &str = "Level restarted";
pub const MSG_GAME_OVER: &str = "No more moves left. Game is over!";
pub const MSG_COMPLETE: &str = "Level complete!";
pub const MSG_NO_SWAPS: &str = "No more swaps left";
pub const MSG_NO_UNDOS: &str = "No more undos left";

/// Receives notices fired by the game.
pub trait Notifier: Send {
    fn notify(&mut self, notice: Notice);
}

impl<F> Notifier for F
where
    F: FnMut(Notice) + Send,
{
    fn notify(&mut self, notice: Notice) {
        self(notice)
    }
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&mut self, _notice: Notice) {}
}
