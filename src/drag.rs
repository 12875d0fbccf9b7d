//! Interactive drag of an overlay page back towards the page beneath.
//!
//! Drag is enabled at load time on a page entered with an overlay preset
//! whose drag axis is not `None`, and only when the page beneath is cached.
//!
//! # Gestures
//!
//! - `Pressed`: interrupts a running snap-back and reveals the page beneath.
//! - `Dragging`: moves the page along the axis, clamped to the pop-exit range.
//! - `Released`: predicts the resting position from the release velocity.
//!   Past half the push-enter travel a leave event is queued; otherwise the
//!   page snaps back to its fully entered position and the page beneath is
//!   hidden again once the snap-back finishes.
//!
//! A press that interrupts a snap-back leaves the page beneath visible until
//! the next snap-back completes.

use embedded_graphics::geometry::Point;

use crate::anim::{Channel, LoadAnimAttr, predict_drag};
use crate::log::{pm_debug, pm_error, pm_info, pm_warn};
use crate::manager::{Gesture, NavEvent, PageManager};
use crate::page::LeaveAction;
use crate::registry::PageHandle;
use crate::scene::{SceneBackend, SceneId};
use crate::tween::{AnimTag, Animation, Animator};

impl<S: SceneBackend, A: Animator> PageManager<S, A> {
    /// Feed a pointer gesture to the active page.
    ///
    /// Ignored unless drag is enabled on the active page.
    pub fn on_gesture(
        &mut self,
        gesture: Gesture,
    ) {
        let Some(handle) = self.current else {
            return;
        };
        let Some(root) = self
            .registry
            .get(handle)
            .filter(|p| p.drag_enabled)
            .and_then(|p| p.root)
        else {
            return;
        };

        let attr = self.current_anim_attr();
        let Some(channel) = attr.channel else {
            pm_error!(self.log, "Can't get current anim attr");
            return;
        };

        match gesture {
            Gesture::Pressed => self.drag_pressed(),
            Gesture::Dragging { delta } => self.drag_moved(root, channel, &attr, delta),
            Gesture::Released { velocity } => self.drag_released(handle, root, channel, &attr, velocity),
        }
    }

    fn drag_pressed(&mut self) {
        if self.anim_state.is_switch_req || !self.anim_state.is_busy {
            return;
        }

        pm_info!(self.log, "Root anim interrupted");
        if let Some(anim) = self.anim_state.drag_anim.take() {
            self.animator.cancel(anim);
        }
        self.anim_state.is_busy = false;

        if let Some(root) = self.beneath_root() {
            self.scene.set_hidden(root, false);
        }
    }

    fn drag_moved(
        &mut self,
        root: SceneId,
        channel: Channel,
        attr: &LoadAnimAttr,
        delta: Point,
    ) {
        let cur = self.scene.value(root, channel).saturating_add(attr.along_axis(delta));
        let range = attr.pop.exit;
        self.scene.set_value(root, channel, cur.clamp(range.min(), range.max()));
    }

    fn drag_released(
        &mut self,
        handle: PageHandle,
        root: SceneId,
        channel: Channel,
        attr: &LoadAnimAttr,
        velocity: Point,
    ) {
        if self.anim_state.is_switch_req {
            return;
        }

        let offset_sum = attr.push.enter.travel();
        let start = self.scene.value(root, channel);
        let end = start.saturating_add(attr.along_axis(predict_drag(velocity)));
        pm_debug!(self.log, "Root drag predict = {}", end);

        if end.unsigned_abs() > offset_sum.unsigned_abs() / 2 {
            self.queue_event(NavEvent::Leave(handle));
        } else if end != attr.push.enter.end {
            self.anim_state.is_busy = true;
            let spec = self.anim_state.current;
            let anim = Animation {
                scene: root,
                channel: Some(channel),
                start,
                end: attr.push.enter.end,
                duration_ms: spec.effective_duration_ms(),
                easing: spec.easing,
                tag: AnimTag::DragSettle(handle),
            };
            self.anim_state.drag_anim = Some(self.animator.start(anim, &mut self.scene));
            pm_info!(self.log, "Root drag anim start");
        }
    }

    /// Completion of a drag snap-back.
    pub(crate) fn on_drag_anim_finish(&mut self) {
        pm_info!(self.log, "Root drag anim finish");
        self.anim_state.is_busy = false;
        self.anim_state.drag_anim = None;

        if let Some(root) = self.beneath_root() {
            self.scene.set_hidden(root, true);
        }
    }

    /// Deliver a queued leave event to the page.
    pub(crate) fn dispatch_leave(
        &mut self,
        handle: PageHandle,
    ) {
        let name = self.page_name(handle);
        pm_info!(self.log, "Page({}) send event: LEAVE", name);

        let Some(page) = self.registry.get_mut(handle) else {
            return;
        };
        let action = page.with_view(&mut self.scene, |page, view| page.on_drag_leave(view));

        if action == LeaveAction::Pop {
            if self.stack.top() != Some(handle) {
                pm_info!(self.log, "Page({}) is not stack top, leave ignored", name);
            } else if let Err(e) = self.pop() {
                pm_warn!(self.log, "Page({}) leave pop failed: {}", name, e);
            }
        }
    }

    fn beneath_root(&self) -> Option<SceneId> {
        self.stack
            .top_after()
            .and_then(|h| self.registry.get(h))
            .and_then(|p| p.root)
    }
}
