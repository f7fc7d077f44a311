//! Client-side pages and the dialogs they raise.

pub mod workers_table;
pub mod workers_view;

pub use workers_view::{EditSession, FetchTicket, WorkersView};

/// Blocking dialogs a page can raise.
pub trait Prompter {
    /// Asks a yes/no question; `true` means the user accepted.
    fn confirm(&self, message: &str) -> bool;

    /// Shows a message the user has to dismiss.
    fn alert(&self, message: &str);

    /// Shows a transient status line, such as a pending request. Ignored by default.
    fn show_status(&self, _status: &str) {}
}

impl<P: Prompter + ?Sized> Prompter for &P {
    fn confirm(&self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn alert(&self, message: &str) {
        (**self).alert(message)
    }

    fn show_status(&self, status: &str) {
        (**self).show_status(status)
    }
}
