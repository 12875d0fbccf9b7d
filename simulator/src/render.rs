//! Paint the manager's scene graph onto the simulator display.
//!
//! Every visible root is drawn back to front as a full-screen card offset by
//! its X/Y channels and dimmed by its opacity channel.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Text};
use embedded_graphics_simulator::SimulatorDisplay;
use heapless::String;
use page_manager::config::OPA_COVER;
use page_manager::scene::SceneNode;
use page_manager::{PageManager, SceneGraph, TweenAnimator};
use profont::{PROFONT_10_POINT, PROFONT_18_POINT};

use crate::pages::{DEMO_PAGES, PageLabel};

pub const BLACK: Rgb565 = Rgb565::BLACK;
pub const WHITE: Rgb565 = Rgb565::WHITE;
pub const DARK_GRAY: Rgb565 = Rgb565::new(6, 12, 6);
pub const GREEN: Rgb565 = Rgb565::new(2, 40, 6);
pub const TEAL: Rgb565 = Rgb565::new(2, 32, 20);
pub const BLUE: Rgb565 = Rgb565::new(4, 16, 24);
pub const PURPLE: Rgb565 = Rgb565::new(18, 8, 22);
const STATUS_COLOR: Rgb565 = Rgb565::new(31, 40, 0);

const STATUS_HEIGHT: u32 = 14;

pub type Manager = PageManager<SceneGraph, TweenAnimator>;

/// Redraw the whole frame.
pub fn draw_frame(
    display: &mut SimulatorDisplay<Rgb565>,
    manager: &Manager,
    status: &str,
) {
    display.clear(BLACK).ok();

    for node in manager.scene().nodes() {
        if node.hidden {
            continue;
        }
        if let Some(label) = label_for(manager, node) {
            draw_card(display, manager.screen(), node, label);
        }
    }

    draw_status_bar(display, manager, status);
}

fn label_for<'a>(
    manager: &'a Manager,
    node: &SceneNode,
) -> Option<&'a PageLabel> {
    let (_, name) = DEMO_PAGES
        .iter()
        .find(|(_, name)| manager.page_root(name) == Some(node.id))?;
    manager.page_attrs(name)?.user_data::<PageLabel>()
}

fn draw_card(
    display: &mut SimulatorDisplay<Rgb565>,
    screen: Size,
    node: &SceneNode,
    label: &PageLabel,
) {
    let origin = Point::new(node.x, node.y);
    let background = dim(label.color, node.opacity);
    let foreground = dim(WHITE, node.opacity);

    Rectangle::new(origin, screen)
        .into_styled(PrimitiveStyle::with_fill(background))
        .draw(display)
        .ok();

    let center = origin + Point::new(screen.width as i32 / 2, screen.height as i32 / 2);
    Text::with_alignment(
        label.title,
        center,
        MonoTextStyle::new(&PROFONT_18_POINT, foreground),
        Alignment::Center,
    )
    .draw(display)
    .ok();

    let small = MonoTextStyle::new(&PROFONT_10_POINT, foreground);
    Text::with_alignment(&label.subtitle, center + Point::new(0, 20), small, Alignment::Center)
        .draw(display)
        .ok();

    if label.visits > 0 {
        let mut visits: String<16> = String::new();
        let _ = write!(visits, "visits {}", label.visits);
        Text::with_alignment(&visits, center + Point::new(0, 34), small, Alignment::Center)
            .draw(display)
            .ok();
    }
}

/// Stack on the left, newest log line on the right.
fn draw_status_bar(
    display: &mut SimulatorDisplay<Rgb565>,
    manager: &Manager,
    status: &str,
) {
    let screen = manager.screen();
    let top = screen.height.saturating_sub(STATUS_HEIGHT) as i32;
    Rectangle::new(Point::new(0, top), Size::new(screen.width, STATUS_HEIGHT))
        .into_styled(PrimitiveStyle::with_fill(BLACK))
        .draw(display)
        .ok();

    let style = MonoTextStyle::new(&PROFONT_10_POINT, STATUS_COLOR);
    let baseline = top + STATUS_HEIGHT as i32 - 3;

    let mut stack: String<64> = String::new();
    for (i, name) in manager.stack_names().enumerate() {
        let _ = write!(stack, "{}{}", if i == 0 { "" } else { ">" }, name);
    }
    Text::new(&stack, Point::new(2, baseline), style).draw(display).ok();

    let mut line: String<40> = String::new();
    for c in status.chars() {
        if line.push(c).is_err() {
            break;
        }
    }
    Text::with_alignment(&line, Point::new(screen.width as i32 - 2, baseline), style, Alignment::Right)
        .draw(display)
        .ok();
}

fn dim(
    color: Rgb565,
    opacity: i32,
) -> Rgb565 {
    let opa = opacity.clamp(0, OPA_COVER) as u32;
    let scale = |c: u8| (u32::from(c) * opa / OPA_COVER as u32) as u8;
    Rgb565::new(scale(color.r()), scale(color.g()), scale(color.b()))
}
