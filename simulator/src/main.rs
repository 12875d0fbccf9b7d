//! Page manager simulator for desktop platforms.
//!
//! Drives the navigation core with the in-memory scene graph and tween
//! animator, and paints the result with embedded-graphics-simulator.
//!
//! # Controls
//!
//! - `P`: push the next demo page (Gauges carries a stash)
//! - `O`: pop
//! - `R`: replace the top page with About
//! - `H`: back to Home
//! - `C`: clear the stack down to Home
//! - `G`: cycle the global transition
//! - Mouse: drag an overlay page away to reveal the page beneath

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod input;
mod pages;
mod render;
mod timing;

use std::thread;
use std::time::Instant;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use heapless::String;
use page_manager::config::{DEFAULT_ANIM_DURATION_MS, SCREEN_HEIGHT, SCREEN_WIDTH};
use page_manager::log::LOG_MSG_LEN;
use page_manager::{Easing, LoadAnim, ManagerConfig, PageError, PageManager, SceneGraph, TweenAnimator};

use crate::input::DragTracker;
use crate::pages::{DEMO_PAGES, DemoFactory, PUSH_ORDER};
use crate::render::{Manager, draw_frame};
use crate::timing::{FRAME_TIME, MAX_TICK_MS};

/// Transitions cycled by `G`.
const GLOBAL_ANIMS: [LoadAnim; 5] = [
    LoadAnim::OverLeft,
    LoadAnim::OverTop,
    LoadAnim::MoveLeft,
    LoadAnim::FadeOn,
    LoadAnim::None,
];

fn main() {
    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("Page Manager Sim", &output_settings);

    let mut manager = PageManager::new(SceneGraph::new(), TweenAnimator::new(), ManagerConfig::default());
    manager.set_factory(Box::new(DemoFactory));
    for (class, name) in DEMO_PAGES {
        report(manager.install(class, name).map(|_| ()));
    }
    report(manager.push("Home", None));

    let mut drag = DragTracker::new();
    let mut global_idx = 0usize;
    let mut gauge_preset = 0u8;
    let mut status: String<LOG_MSG_LEN> = String::new();
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();

        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => return,
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    if repeat {
                        continue;
                    }
                    match keycode {
                        Keycode::P => {
                            gauge_preset = gauge_preset.wrapping_add(1);
                            report(push_next(&mut manager, gauge_preset));
                        }
                        Keycode::O => report(manager.pop()),
                        Keycode::R => report(manager.replace("About", None)),
                        Keycode::H => report(manager.back_home()),
                        Keycode::C => report(manager.clear_stack(true)),
                        Keycode::G => {
                            global_idx = (global_idx + 1) % GLOBAL_ANIMS.len();
                            manager.set_global_load_anim(
                                GLOBAL_ANIMS[global_idx],
                                DEFAULT_ANIM_DURATION_MS,
                                Easing::EaseOut,
                            );
                        }
                        _ => {}
                    }
                }
                SimulatorEvent::MouseButtonDown { point, .. } => manager.on_gesture(drag.press(point)),
                SimulatorEvent::MouseMove { point } => {
                    if let Some(gesture) = drag.motion(point) {
                        manager.on_gesture(gesture);
                    }
                }
                SimulatorEvent::MouseButtonUp { .. } => {
                    if let Some(gesture) = drag.release() {
                        manager.on_gesture(gesture);
                    }
                }
                _ => {}
            }
        }
        drag.end_frame();

        let elapsed_ms = (last_frame.elapsed().as_millis() as u32).min(MAX_TICK_MS);
        last_frame = Instant::now();
        manager.tick(elapsed_ms);

        flush_log(&mut manager, &mut status);
        draw_frame(&mut display, &manager, &status);
        window.update(&display);

        if let Some(rest) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }
}

/// Push the first demo page not already on the stack.
fn push_next(
    manager: &mut Manager,
    preset: u8,
) -> Result<(), PageError> {
    let Some(name) = PUSH_ORDER
        .iter()
        .find(|name| !manager.stack_names().any(|s| s == **name))
    else {
        return Err(PageError::AlreadyOnStack);
    };
    let stash = [preset];
    let stash = if *name == "Gauges" { Some(&stash[..]) } else { None };
    manager.push(name, stash)
}

/// Print new manager log lines and keep the newest for the status bar.
fn flush_log(
    manager: &mut Manager,
    status: &mut String<LOG_MSG_LEN>,
) {
    for entry in manager.log().iter() {
        println!("[{}] {}", entry.level.prefix(), entry.message);
        status.clear();
        status.push_str(&entry.message).ok();
    }
    manager.log_mut().clear();
}

fn report(result: Result<(), PageError>) {
    if let Err(e) = result {
        println!("[!] {}", e);
    }
}
