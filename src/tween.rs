//! Animation engine interface and a time-based tween animator.
//!
//! The page manager starts value animations on scene channels and learns
//! about their completion through typed [`AnimTag`]s reported by
//! [`Animator::advance`]. The host drives time; nothing completes inside
//! the call that started it.
//!
//! [`TweenAnimator`] interpolates with wall-clock milliseconds supplied by the
//! host, so animation speed is independent of the frame rate.

use alloc::vec::Vec;

use crate::anim::{Channel, Easing};
use crate::registry::PageHandle;
use crate::scene::{SceneBackend, SceneId};

/// Handle to a started animation, used to cancel it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimHandle(pub u32);

/// What a finished animation was for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimTag {
    /// Appear/disappear animation of a page switch.
    Switch(PageHandle),
    /// Snap-back of a released drag on a page.
    DragSettle(PageHandle),
}

/// One timed value interpolation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Animation {
    pub scene: SceneId,
    /// Channel to write; `None` only times the animation.
    pub channel: Option<Channel>,
    pub start: i32,
    pub end: i32,
    pub duration_ms: u32,
    pub easing: Easing,
    pub tag: AnimTag,
}

impl Animation {
    /// Value at `elapsed_ms` into the animation.
    pub fn value_at(
        &self,
        elapsed_ms: u32,
    ) -> i32 {
        if self.duration_ms == 0 || elapsed_ms >= self.duration_ms {
            return self.end;
        }
        let t = elapsed_ms as f32 / self.duration_ms as f32;
        let delta = (self.end - self.start) as f32;
        self.start + (delta * self.easing.apply(t)) as i32
    }
}

/// Operations the page manager needs from an animation engine.
pub trait Animator {
    /// Start an animation, applying its start value immediately.
    fn start(
        &mut self,
        anim: Animation,
        scene: &mut dyn SceneBackend,
    ) -> AnimHandle;

    /// Cancel a running animation without reporting completion.
    ///
    /// Returns `false` if the animation already finished.
    fn cancel(
        &mut self,
        handle: AnimHandle,
    ) -> bool;

    /// Whether any running animation targets `scene`.
    fn is_animating(
        &self,
        scene: SceneId,
    ) -> bool;

    /// Advance time, write channel values and report finished animations
    /// in start order.
    fn advance(
        &mut self,
        elapsed_ms: u32,
        scene: &mut dyn SceneBackend,
        finished: &mut dyn FnMut(AnimTag),
    );
}

// =============================================================================
// Tween Animator
// =============================================================================

struct Running {
    handle: AnimHandle,
    anim: Animation,
    elapsed_ms: u32,
}

/// Reference animator interpolating channel values over host-supplied time.
#[derive(Default)]
pub struct TweenAnimator {
    running: Vec<Running>,
    next_handle: u32,
}

impl TweenAnimator {
    pub const fn new() -> Self {
        Self {
            running: Vec::new(),
            next_handle: 0,
        }
    }

    /// Number of running animations.
    #[inline]
    pub fn active_count(&self) -> usize { self.running.len() }

    /// Whether `handle` is still running.
    pub fn is_running(
        &self,
        handle: AnimHandle,
    ) -> bool {
        self.running.iter().any(|r| r.handle == handle)
    }

    /// Running animations, oldest first.
    pub fn animations(&self) -> impl Iterator<Item = &Animation> { self.running.iter().map(|r| &r.anim) }
}

impl Animator for TweenAnimator {
    fn start(
        &mut self,
        anim: Animation,
        scene: &mut dyn SceneBackend,
    ) -> AnimHandle {
        let handle = AnimHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);

        if let Some(channel) = anim.channel {
            scene.set_value(anim.scene, channel, anim.start);
        }
        self.running.push(Running {
            handle,
            anim,
            elapsed_ms: 0,
        });
        handle
    }

    fn cancel(
        &mut self,
        handle: AnimHandle,
    ) -> bool {
        let before = self.running.len();
        self.running.retain(|r| r.handle != handle);
        self.running.len() != before
    }

    fn is_animating(
        &self,
        scene: SceneId,
    ) -> bool {
        self.running.iter().any(|r| r.anim.scene == scene)
    }

    fn advance(
        &mut self,
        elapsed_ms: u32,
        scene: &mut dyn SceneBackend,
        finished: &mut dyn FnMut(AnimTag),
    ) {
        // Finished animations are removed before reporting, so a completion
        // handler never sees its own animation as running.
        let mut done: Vec<AnimTag> = Vec::new();
        self.running.retain_mut(|r| {
            r.elapsed_ms = r.elapsed_ms.saturating_add(elapsed_ms);
            if let Some(channel) = r.anim.channel {
                scene.set_value(r.anim.scene, channel, r.anim.value_at(r.elapsed_ms));
            }
            let complete = r.elapsed_ms >= r.anim.duration_ms;
            if complete {
                done.push(r.anim.tag);
            }
            !complete
        });

        for tag in done {
            finished(tag);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
