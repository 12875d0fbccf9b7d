//! Per-page lifecycle state machine.
//!
//! The driver executes the entry action of a page's state and keeps
//! advancing until a state has to wait:
//!
//! | State | Entry action | Next |
//! |-------|--------------|------|
//! | `Load` | create root, load hooks, enable drag, resolve cache | `WillAppear` |
//! | `WillAppear` | hook, unhide, start appear animation | waits |
//! | `DidAppear` | hook | `Activity` (rests) |
//! | `Activity` | none | `WillDisappear` |
//! | `WillDisappear` | hook, start disappear animation | waits |
//! | `DidDisappear` | hide, hook | `WillAppear` (rests) if cached, else `Unload` |
//! | `Unload` | hooks, free stash, defer root deletion | `Idle` (rests) |
//!
//! A waiting page stays in `WillAppear`/`WillDisappear` until its animation
//! completion arrives through the event queue, which moves it on to
//! `DidAppear`/`DidDisappear` and resumes the driver.

use crate::anim::DragDir;
use crate::log::{pm_error, pm_info, pm_trace, pm_warn};
use crate::manager::PageManager;
use crate::page::{Page, PageState, PageView};
use crate::registry::PageHandle;
use crate::scene::SceneBackend;
use crate::tween::Animator;

/// What the driver does after an entry action.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Flow {
    /// Execute the next state right away.
    Continue,
    /// Wait for an animation completion.
    Suspend,
    /// Quiescent until the router drives the page again.
    Rest,
}

impl<S: SceneBackend, A: Animator> PageManager<S, A> {
    /// Drive the state machine of `handle` until it waits or rests.
    pub(crate) fn state_update(
        &mut self,
        handle: Option<PageHandle>,
    ) {
        let Some(handle) = handle else {
            return;
        };

        loop {
            let Some(state) = self.registry.get(handle).map(|p| p.state) else {
                return;
            };
            let (next, flow) = self.state_execute(handle, state);
            if let Some(page) = self.registry.get_mut(handle) {
                page.state = next;
            }
            if flow != Flow::Continue {
                break;
            }
        }
    }

    fn state_execute(
        &mut self,
        handle: PageHandle,
        state: PageState,
    ) -> (PageState, Flow) {
        match state {
            PageState::Idle => {
                pm_trace!(self.log, "Page({}) state idle", self.page_name(handle));
                (PageState::Idle, Flow::Rest)
            }
            PageState::Load => (self.state_load_execute(handle), Flow::Continue),
            PageState::WillAppear => (self.state_will_appear_execute(handle), Flow::Suspend),
            PageState::DidAppear => (self.state_did_appear_execute(handle), Flow::Rest),
            PageState::Activity => {
                pm_info!(self.log, "Page({}) state active break", self.page_name(handle));
                (PageState::WillDisappear, Flow::Continue)
            }
            PageState::WillDisappear => (self.state_will_disappear_execute(handle), Flow::Suspend),
            PageState::DidDisappear => match self.state_did_disappear_execute(handle) {
                PageState::Unload => (PageState::Unload, Flow::Continue),
                next => (next, Flow::Rest),
            },
            PageState::Unload => (self.state_unload_execute(handle), Flow::Rest),
        }
    }

    /// Completion of a switch animation on `handle`.
    pub(crate) fn on_switch_anim_finish(
        &mut self,
        handle: PageHandle,
    ) {
        let name = self.page_name(handle);
        let Some(page) = self.registry.get_mut(handle) else {
            pm_warn!(self.log, "Anim finish for uninstalled page");
            return;
        };
        if !page.is_busy {
            pm_warn!(self.log, "Page({}) stale anim finish ignored", name);
            return;
        }

        pm_info!(self.log, "Page({}) Anim finish", name);
        page.state = match page.state {
            PageState::WillAppear => PageState::DidAppear,
            PageState::WillDisappear => PageState::DidDisappear,
            other => other,
        };

        self.state_update(Some(handle));
        if let Some(page) = self.registry.get_mut(handle) {
            page.is_busy = false;
        }

        let finished = self.switch_req_check();
        if !self.anim_state.is_entering && finished {
            if let Some(current) = self.current {
                self.switch_anim_type_update(current);
            }
        }
    }

    /// End the lifecycle of `handle` at once, without animation.
    pub(crate) fn force_unload(
        &mut self,
        handle: PageHandle,
    ) {
        let Some(state) = self.registry.get(handle).map(|p| p.state) else {
            pm_error!(self.log, "Page is not installed, unload failed");
            return;
        };
        pm_info!(self.log, "Page({}) force unloading...", self.page_name(handle));

        if state == PageState::Activity {
            pm_info!(self.log, "Page state is ACTIVITY, disappearing...");
            self.call_hook(handle, |page, view| page.on_view_will_disappear(view));
            self.call_hook(handle, |page, view| page.on_view_did_disappear(view));
        }

        let next = self.state_unload_execute(handle);
        if let Some(page) = self.registry.get_mut(handle) {
            page.state = next;
            page.is_busy = false;
        }
    }

    fn call_hook(
        &mut self,
        handle: PageHandle,
        hook: impl FnOnce(&mut dyn Page, &mut PageView<'_>),
    ) {
        if let Some(page) = self.registry.get_mut(handle) {
            page.with_view(&mut self.scene, hook);
        }
    }

    // =========================================================================
    // State Entry Actions
    // =========================================================================

    fn state_load_execute(
        &mut self,
        handle: PageHandle,
    ) -> PageState {
        let name = self.page_name(handle);
        pm_info!(self.log, "Page({}) state load", name);

        let root = self.scene.create_root();
        let stale = self.registry.get_mut(handle).and_then(|p| p.root.replace(root));
        if let Some(stale) = stale {
            pm_error!(self.log, "Page({}) root must be empty", name);
            self.scene.delete_deferred(stale);
        }

        self.call_hook(handle, |page, view| page.on_view_load(view));

        if self.anim_state.current.anim.is_overlay() {
            let beneath_cached = self
                .stack
                .top_after()
                .and_then(|h| self.registry.get(h))
                .is_some_and(|p| p.is_cached);
            if beneath_cached && self.current_anim_attr().drag_dir != DragDir::None {
                if let Some(page) = self.registry.get_mut(handle) {
                    page.drag_enabled = true;
                }
                pm_info!(self.log, "Page({}) root drag enabled", name);
            }
        }

        self.call_hook(handle, |page, view| page.on_view_did_load(view));

        if let Some(page) = self.registry.get_mut(handle) {
            page.is_cached = if page.is_disable_auto_cache {
                pm_info!(
                    self.log,
                    "Page({}) disable auto cache, ReqEnableCache = {}",
                    name,
                    page.attrs.req_enable_cache()
                );
                page.attrs.req_enable_cache()
            } else {
                pm_info!(self.log, "Page({}) AUTO cached", name);
                true
            };
        }
        PageState::WillAppear
    }

    fn state_will_appear_execute(
        &mut self,
        handle: PageHandle,
    ) -> PageState {
        pm_info!(self.log, "Page({}) state will appear", self.page_name(handle));
        self.call_hook(handle, |page, view| page.on_view_will_appear(view));
        if let Some(root) = self.registry.get(handle).and_then(|p| p.root) {
            self.scene.set_hidden(root, false);
        }
        self.switch_anim_create(handle);
        PageState::WillAppear
    }

    fn state_did_appear_execute(
        &mut self,
        handle: PageHandle,
    ) -> PageState {
        pm_info!(self.log, "Page({}) state did appear", self.page_name(handle));
        self.call_hook(handle, |page, view| page.on_view_did_appear(view));
        PageState::Activity
    }

    fn state_will_disappear_execute(
        &mut self,
        handle: PageHandle,
    ) -> PageState {
        pm_info!(self.log, "Page({}) state will disappear", self.page_name(handle));
        self.call_hook(handle, |page, view| page.on_view_will_disappear(view));
        self.switch_anim_create(handle);
        PageState::WillDisappear
    }

    fn state_did_disappear_execute(
        &mut self,
        handle: PageHandle,
    ) -> PageState {
        let name = self.page_name(handle);
        pm_info!(self.log, "Page({}) state did disappear", name);
        if let Some(root) = self.registry.get(handle).and_then(|p| p.root) {
            self.scene.set_hidden(root, true);
        }
        self.call_hook(handle, |page, view| page.on_view_did_disappear(view));

        if self.registry.get(handle).is_some_and(|p| p.is_cached) {
            pm_info!(self.log, "Page({}) has cached", name);
            PageState::WillAppear
        } else {
            PageState::Unload
        }
    }

    fn state_unload_execute(
        &mut self,
        handle: PageHandle,
    ) -> PageState {
        let name = self.page_name(handle);
        pm_info!(self.log, "Page({}) state unload", name);

        if self.registry.get(handle).and_then(|p| p.root).is_none() {
            pm_warn!(self.log, "Page({}) is not loaded", name);
            return PageState::Idle;
        }

        self.call_hook(handle, |page, view| page.on_view_unload(view));

        if let Some(page) = self.registry.get_mut(handle) {
            let freed = page.stash.free();
            if freed != 0 {
                pm_info!(self.log, "Page({}) free stash[{}]", name, freed);
            }
            if let Some(root) = page.root.take() {
                self.scene.delete_deferred(root);
            }
            page.is_cached = false;
            page.drag_enabled = false;
        }

        self.call_hook(handle, |page, view| page.on_view_did_unload(view));
        PageState::Idle
    }
}
