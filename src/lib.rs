pub mod assets;
pub mod config;
pub mod form;
pub mod i18n;
pub mod leads;
pub mod shell;
pub mod submit;

pub use i18n::{I18nManager, Locale};
