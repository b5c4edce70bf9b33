use std::process;

use gpui::{
    App, AppContext, Application, Bounds, ClickEvent, Context, Entity, FontWeight,
    InteractiveElement, IntoElement, ParentElement, Render, StatefulInteractiveElement, Styled,
    Window, WindowBounds, WindowOptions, div, px, rgb, size,
};
use leadform::assets::Assets;
use leadform::config::SiteConfig;
use leadform::leads::{LeadKind, lead_adapter, lead_shell};
use leadform::shell::{FormView, ScrollLock};
use leadform::submit::{WebhookSubmitter, transport_runtime};

const DEFAULT_CONFIG: &str = "demos/leadform.toml";

struct LeadPage {
    waitlist: Option<Entity<FormView>>,
    modals: Vec<(LeadKind, Entity<FormView>)>,
    scroll_lock: ScrollLock,
}

impl LeadPage {
    fn new(
        config: &SiteConfig,
        adapters: Vec<(LeadKind, WebhookSubmitter)>,
        cx: &mut Context<Self>,
    ) -> Self {
        let scroll_lock = ScrollLock::global(cx);
        let mut waitlist = None;
        let mut modals = Vec::new();

        for (kind, adapter) in adapters {
            let shell = lead_shell(kind, config)
                .scroll_lock(scroll_lock.clone())
                .on_close(move |reason| log::info!("{kind:?} form closed: {reason:?}"));
            let view = cx.new(|cx| FormView::new(shell, adapter, cx));
            cx.observe(&view, |_, _, cx| cx.notify()).detach();
            if kind.presentation().is_modal() {
                modals.push((kind, view));
            } else {
                waitlist = Some(view);
            }
        }

        Self {
            waitlist,
            modals,
            scroll_lock,
        }
    }
}

impl Render for LeadPage {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let buttons = self.modals.iter().map(|(kind, view)| {
            let view = view.clone();
            div()
                .id(kind.endpoint_name())
                .px_4()
                .py_2()
                .rounded_md()
                .cursor_pointer()
                .bg(rgb(0x1a1b1e))
                .text_color(rgb(0xffffff))
                .text_sm()
                .child(format!("Open {} form", kind.endpoint_name()))
                .on_click(cx.listener(move |_, _: &ClickEvent, window, cx| {
                    view.update(cx, |view, cx| view.open(window, cx));
                    cx.notify();
                }))
        });

        let mut page = div()
            .id("lead-page")
            .size_full()
            .flex()
            .flex_col()
            .gap_6()
            .p_8()
            .bg(rgb(0xf8f9fa))
            .child(
                div()
                    .text_xl()
                    .font_weight(FontWeight::BOLD)
                    .child("Lead forms"),
            )
            .child(div().flex().gap_3().children(buttons))
            .children(self.waitlist.clone())
            .children(self.modals.iter().map(|(_, view)| view.clone()));

        if !self.scroll_lock.is_locked() {
            page = page.overflow_y_scroll();
        }
        page
    }
}

fn main() {
    env_logger::init();

    let path = std::env::var("LEADFORM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let config = match SiteConfig::load(&path) {
        Ok(config) => config,
        Err(error) => {
            log::error!("{error}");
            process::exit(1);
        }
    };
    let runtime = match transport_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            log::error!("{error}");
            process::exit(1);
        }
    };

    let mut adapters = Vec::new();
    for kind in LeadKind::ALL {
        match lead_adapter(kind, &config, runtime.clone()) {
            Ok(adapter) => adapters.push((kind, adapter)),
            Err(error) => log::warn!("skipping {kind:?} form: {error}"),
        }
    }

    Application::new().with_assets(Assets).run(move |cx: &mut App| {
        let bounds = Bounds::centered(None, size(px(960.0), px(720.0)), cx);
        let opened = cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                ..Default::default()
            },
            move |window, cx| {
                window.on_window_should_close(cx, |_window, cx| {
                    cx.quit();
                    true
                });
                cx.new(|cx| LeadPage::new(&config, adapters, cx))
            },
        );
        if let Err(error) = opened {
            log::error!("failed to open window: {error}");
            cx.quit();
        }
    });
}
