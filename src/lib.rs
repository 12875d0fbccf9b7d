//! Page manager - navigation, lifecycle and transition choreography for
//! full-screen pages on embedded displays.
//!
//! This crate contains the platform-agnostic navigation core. Rendering and
//! timed interpolation are external collaborators reached through the
//! [`SceneBackend`] and [`Animator`] traits; the crate ships an in-memory
//! [`SceneGraph`] and a time-based [`TweenAnimator`] used by the simulator
//! and the tests.
//!
//! - [`config`]: Capacities, default screen and animation constants
//! - [`log`]: Leveled ring buffer of manager log lines
//! - [`error`]: [`PageError`] taxonomy
//! - [`page`]: The [`Page`] hook trait and per-page attributes
//! - [`anim`]: Transition presets, geometry and drag inertia prediction
//! - [`scene`]: Rendering backend trait and the reference [`SceneGraph`]
//! - [`tween`]: Animation engine trait and the reference [`TweenAnimator`]
//! - [`manager`]: The [`PageManager`] router facade
//! - [`resource`]: Name-keyed resource lookup with default fallback
//!
//! # Event Loop
//!
//! All entry points run synchronously until they hand off to the animation
//! engine. The host then calls [`PageManager::tick`] from its main loop; that
//! is the only place where animation completions and drag-leave signals are
//! processed.
//!
//! ```ignore
//! let mut manager = PageManager::new(SceneGraph::new(), TweenAnimator::new(), ManagerConfig::default());
//! manager.set_factory(Box::new(AppFactory));
//! manager.install("Home", "Home")?;
//! manager.push("Home", None)?;
//!
//! loop {
//!     manager.tick(FRAME_MS);
//!     render(manager.scene());
//! }
//! ```
//!
//! # no_std Compatibility
//!
//! The library is `no_std` and needs an allocator for boxed pages and stash
//! buffers. Tests run with `std` enabled (via `cfg_attr`).

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

pub mod anim;
pub mod config;
pub mod error;
pub mod log;
pub mod manager;
pub mod page;
pub mod resource;
pub mod scene;
pub mod tween;

mod drag;
mod entity;
mod lifecycle;
mod registry;
mod router;
mod stack;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use anim::{AnimSpec, Channel, DragDir, Easing, LoadAnim, LoadAnimAttr};
pub use config::ManagerConfig;
pub use error::PageError;
pub use manager::{Gesture, NavEvent, PageManager};
pub use page::{LeaveAction, Page, PageAttrs, PageFactory, PageState, PageView};
pub use registry::PageHandle;
pub use resource::ResourcePool;
pub use scene::{SceneBackend, SceneGraph, SceneId};
pub use tween::{AnimHandle, AnimTag, Animation, Animator, TweenAnimator};
