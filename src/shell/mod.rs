//! Presentation of a form engine: inline in the page flow or as a modal overlay.

mod focus;
mod presentation;
mod scroll_lock;
mod text_edit;
mod tokens;
mod view;

pub use focus::FocusTrap;
pub use presentation::{
    CloseHandler, CloseReason, FormShell, ModalBehavior, PresentationMode, ShellContent,
    SuccessLayer, SuccessMessage,
};
pub use scroll_lock::{ScrollLock, ScrollLockGuard};
pub use text_edit::{EditBuffer, EditCommand};
pub use tokens::ShellTokens;
pub use view::FormView;
