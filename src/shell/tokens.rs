use gpui::{Hsla, Pixels, px, rgb, rgba};

/// Colors and metrics of the rendered form shell.
#[derive(Clone, Debug, PartialEq)]
pub struct ShellTokens {
    pub backdrop: Hsla,
    pub panel_bg: Hsla,
    pub panel_border: Hsla,
    pub panel_width: Pixels,
    pub panel_radius: Pixels,
    pub title: Hsla,
    pub body: Hsla,
    pub muted: Hsla,
    pub input_bg: Hsla,
    pub input_border: Hsla,
    pub input_focus_border: Hsla,
    pub input_error_border: Hsla,
    pub error_text: Hsla,
    pub banner_bg: Hsla,
    pub banner_fg: Hsla,
    pub accent: Hsla,
    pub accent_fg: Hsla,
    pub accent_disabled: Hsla,
    pub success_icon: Hsla,
    pub success_overlay_bg: Hsla,
}

impl Default for ShellTokens {
    fn default() -> Self {
        Self {
            backdrop: rgba(0x0b0d1299).into(),
            panel_bg: rgb(0xffffff).into(),
            panel_border: rgb(0xdee2e6).into(),
            panel_width: px(520.0),
            panel_radius: px(12.0),
            title: rgb(0x1a1b1e).into(),
            body: rgb(0x495057).into(),
            muted: rgb(0x868e96).into(),
            input_bg: rgb(0xffffff).into(),
            input_border: rgb(0xced4da).into(),
            input_focus_border: rgb(0x228be6).into(),
            input_error_border: rgb(0xfa5252).into(),
            error_text: rgb(0xe03131).into(),
            banner_bg: rgb(0xfff5f5).into(),
            banner_fg: rgb(0xc92a2a).into(),
            accent: rgb(0x1a1b1e).into(),
            accent_fg: rgb(0xffffff).into(),
            accent_disabled: rgb(0xadb5bd).into(),
            success_icon: rgb(0x2f9e44).into(),
            success_overlay_bg: rgba(0xffffffee).into(),
        }
    }
}
