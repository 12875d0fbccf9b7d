//! Capacity, display and animation configuration.
//!
//! Compile-time constants size the fixed-capacity containers (page pool,
//! navigation stack, event queue, log ring). [`ManagerConfig`] carries the
//! values a host picks at start-up.

use embedded_graphics::geometry::Size;

use crate::anim::{AnimSpec, Easing, LoadAnim};
use crate::log::LogLevel;

// =============================================================================
// Capacities
// =============================================================================

/// Maximum number of installed pages.
pub const MAX_PAGES: usize = 16;

/// Maximum depth of the navigation stack.
pub const STACK_DEPTH: usize = 16;

/// Maximum length of a page name in bytes.
pub const PAGE_NAME_LEN: usize = 24;

/// Pending animation completions and drag-leave signals.
pub const EVENT_QUEUE_LEN: usize = 16;

/// Name reported when there is no previous page.
pub const EMPTY_PAGE_NAME: &str = "EMPTY_PAGE";

// =============================================================================
// Display
// =============================================================================

/// Default horizontal resolution (ST7789 panel in landscape).
pub const SCREEN_WIDTH: u32 = 320;

/// Default vertical resolution.
pub const SCREEN_HEIGHT: u32 = 170;

/// Fully transparent opacity value.
pub const OPA_TRANSP: i32 = 0;

/// Fully opaque opacity value.
pub const OPA_COVER: i32 = 255;

// =============================================================================
// Animation
// =============================================================================

/// Default duration of a page transition in milliseconds.
pub const DEFAULT_ANIM_DURATION_MS: u32 = 500;

/// Per-step decay of the release velocity when predicting drag inertia (percent).
pub const DRAG_THROW_PERCENT: i32 = 20;

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Start-up configuration of a [`PageManager`](crate::PageManager).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ManagerConfig {
    /// Screen extents used for transition geometry.
    pub screen: Size,
    /// Manager-wide default transition.
    pub global_anim: AnimSpec,
    /// Log lines below this level are dropped.
    pub log_level: LogLevel,
}

impl ManagerConfig {
    /// Default configuration: landscape panel, `OverLeft` overlay, 500 ms ease-out.
    pub const fn new() -> Self {
        Self {
            screen: Size::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            global_anim: AnimSpec::new(LoadAnim::OverLeft, DEFAULT_ANIM_DURATION_MS, Easing::EaseOut),
            log_level: LogLevel::Info,
        }
    }

    /// Override the screen extents.
    pub const fn with_screen(
        mut self,
        screen: Size,
    ) -> Self {
        self.screen = screen;
        self
    }

    /// Override the manager-wide default transition.
    pub const fn with_global_anim(
        mut self,
        anim: AnimSpec,
    ) -> Self {
        self.global_anim = anim;
        self
    }

    /// Override the minimum log level.
    pub const fn with_log_level(
        mut self,
        level: LogLevel,
    ) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Tests
// =============================================================================
