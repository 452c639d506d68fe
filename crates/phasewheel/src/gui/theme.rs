use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

const CSS: &str = "
.phasewheel-drawing-area {
    background: none;
}
";

/// Window colours taken from the GTK theme. Diagram colours come from the config instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub caption: Srgba<f64>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: Srgba::new(0.12, 0.12, 0.14, 1.0),
            caption: Srgba::new(0.85, 0.85, 0.85, 0.6),
        }
    }
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let fallback = Self::default();
        let caption = theme_color(context, "theme_fg_color")
            .map(|c| Srgba::new(c.red, c.green, c.blue, fallback.caption.alpha))
            .unwrap_or(fallback.caption);

        Self {
            background: theme_color(context, "theme_bg_color").unwrap_or(fallback.background),
            caption,
        }
    }
}

fn theme_color(context: &gtk::StyleContext, name: &str) -> Option<Srgba<f64>> {
    context.lookup_color(name).map(|c| {
        Srgba::new(
            c.red() as f64,
            c.green() as f64,
            c.blue() as f64,
            c.alpha() as f64,
        )
    })
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    provider.load_from_data(CSS);

    match gdk::Display::default() {
        Some(display) => gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => log::warn!("No display to attach the stylesheet to"),
    }
}
