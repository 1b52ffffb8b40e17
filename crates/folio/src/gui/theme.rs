use gtk::gdk;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub heading: Srgba<f64>,
    pub caption: Srgba<f64>,
    pub placeholder: Srgba<f64>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: Self::gray(0x11),
            heading: Self::gray(0xFF),
            caption: Self::gray(0x8F),
            placeholder: Srgba::new(0.25, 0.25, 0.25, 1.0),
        }
    }
}

impl ThemeColors {
    fn gray(level: u8) -> Srgba<f64> {
        Srgba::<u8>::new(level, level, level, 0xFF).into_format()
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.folio-window, .folio-hero {
    background-color: #111111;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
