use std::borrow::Cow;

use gpui::{AssetSource, Result, SharedString};
use rust_embed::RustEmbed;

pub const CHECK_ICON: &str = "icons/check.svg";
pub const CLOSE_ICON: &str = "icons/x.svg";
pub const ALERT_ICON: &str = "icons/alert.svg";

#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

/// Asset source for the icons drawn by the form shell. Register it with
/// `Application::new().with_assets(Assets)`.
pub struct Assets;

impl AssetSource for Assets {
    fn load(&self, path: &str) -> Result<Option<Cow<'static, [u8]>>> {
        if path.is_empty() {
            return Ok(None);
        }
        Ok(EmbeddedAssets::get(path).map(|file| file.data))
    }

    fn list(&self, path: &str) -> Result<Vec<SharedString>> {
        let mut entries = EmbeddedAssets::iter()
            .filter(|entry| entry.starts_with(path))
            .map(|entry| entry.into())
            .collect::<Vec<SharedString>>();
        entries.sort();
        Ok(entries)
    }
}
