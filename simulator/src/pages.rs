//! Demo pages shown by the simulator.
//!
//! Each page keeps a [`PageLabel`] in its attribute user data; the renderer
//! reads it back through the manager to paint the page root.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use heapless::String;
use page_manager::{Easing, LoadAnim, Page, PageAttrs, PageFactory, PageView};

use crate::render::{BLUE, DARK_GRAY, GREEN, PURPLE, TEAL};

/// Pages installed at start-up as `(class, name)`.
pub const DEMO_PAGES: [(&str, &str); 5] = [
    ("Home", "Home"),
    ("Gauges", "Gauges"),
    ("Settings", "Settings"),
    ("About", "About"),
    ("Trip", "Trip"),
];

/// Order in which `P` pushes pages on top of `Home`.
pub const PUSH_ORDER: [&str; 4] = ["Gauges", "Settings", "Trip", "About"];

/// What the renderer paints for a page.
pub struct PageLabel {
    pub title: &'static str,
    pub subtitle: String<32>,
    pub color: Rgb565,
    pub visits: u32,
}

impl PageLabel {
    fn new(
        title: &'static str,
        color: Rgb565,
    ) -> Self {
        Self {
            title,
            subtitle: String::new(),
            color,
            visits: 0,
        }
    }
}

// =============================================================================
// Pages
// =============================================================================

/// Start page. Stays cached so overlays above it can be dragged away.
struct HomePage;

impl Page for HomePage {
    fn on_custom_attr_config(
        &mut self,
        attrs: &mut PageAttrs,
    ) {
        attrs.set_custom_cache_enable(true);
    }

    fn on_view_load(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        let mut label = PageLabel::new("HOME", DARK_GRAY);
        label.subtitle.push_str("P push  O pop").ok();
        view.attrs().set_user_data(label);
    }
}

/// Gauge page. The stash selects the preset shown.
struct GaugesPage {
    color: Rgb565,
}

impl Page for GaugesPage {
    fn on_view_load(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        let preset = view.stash_array::<1>().map_or(0, |[p]| p);
        let mut label = PageLabel::new("GAUGES", self.color);
        let _ = write!(label.subtitle, "{} preset {}", view.name(), preset);
        view.attrs().set_user_data(label);
    }

    fn on_view_did_appear(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        if let Some(label) = view.attrs().user_data_mut::<PageLabel>() {
            label.visits += 1;
        }
    }
}

/// Settings slide in with both pages moving and are never cached.
struct SettingsPage;

impl Page for SettingsPage {
    fn on_custom_attr_config(
        &mut self,
        attrs: &mut PageAttrs,
    ) {
        attrs.set_custom_cache_enable(false);
        attrs.set_custom_load_anim(LoadAnim::MoveLeft, 400, Easing::EaseInOut);
    }

    fn on_view_load(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        let mut label = PageLabel::new("SETTINGS", BLUE);
        label.subtitle.push_str("not cached").ok();
        view.attrs().set_user_data(label);
    }
}

struct AboutPage;

impl Page for AboutPage {
    fn on_custom_attr_config(
        &mut self,
        attrs: &mut PageAttrs,
    ) {
        attrs.set_custom_load_anim(LoadAnim::FadeOn, 300, Easing::Linear);
    }

    fn on_view_load(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        let mut label = PageLabel::new("ABOUT", PURPLE);
        label.subtitle.push_str("page-manager demo").ok();
        view.attrs().set_user_data(label);
    }
}

// =============================================================================
// Factory
// =============================================================================

pub struct DemoFactory;

impl PageFactory for DemoFactory {
    fn create_page(
        &self,
        class_name: &str,
    ) -> Option<Box<dyn Page>> {
        match class_name {
            "Home" => Some(Box::new(HomePage)),
            "Gauges" => Some(Box::new(GaugesPage { color: GREEN })),
            "Settings" => Some(Box::new(SettingsPage)),
            "About" => Some(Box::new(AboutPage)),
            "Trip" => Some(Box::new(GaugesPage { color: TEAL })),
            _ => None,
        }
    }
}
