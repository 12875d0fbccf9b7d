//! Stack navigation and the shared switch protocol.
//!
//! Every navigation call runs synchronously until the participating pages
//! hand off to the animator. From then on the transition is "in flight" and
//! further navigation is rejected with [`PageError::TransitionBusy`] until
//! both pages report their animations finished (see `switch_req_check`).
//!
//! # Draw Order
//!
//! On enter the outgoing page is raised first and the incoming page ends on
//! top. On exit the revealed page is raised first and the leaving page stays
//! on top while it animates away.

use crate::anim::{AnimRange, AnimSpec, Easing, LoadAnim, LoadAnimAttr};
use crate::entity::StashStore;
use crate::error::PageError;
use crate::log::{pm_debug, pm_error, pm_info, pm_warn};
use crate::manager::PageManager;
use crate::page::PageState;
use crate::registry::PageHandle;
use crate::scene::SceneBackend;
use crate::tween::{AnimHandle, AnimTag, Animation, Animator};

/// Manager-wide transition state.
pub(crate) struct AnimState {
    pub global: AnimSpec,
    /// Preset of the transition in flight (or the last one).
    pub current: AnimSpec,
    /// A transition is in flight.
    pub is_switch_req: bool,
    /// A drag snap-back animation is in flight.
    pub is_busy: bool,
    /// The transition in flight is a push (enter) rather than a pop (exit).
    pub is_entering: bool,
    pub drag_anim: Option<AnimHandle>,
}

impl AnimState {
    pub const fn new(global: AnimSpec) -> Self {
        Self {
            global,
            current: global,
            is_switch_req: false,
            is_busy: false,
            is_entering: false,
            drag_anim: None,
        }
    }
}

impl<S: SceneBackend, A: Animator> PageManager<S, A> {
    // =========================================================================
    // Navigation
    // =========================================================================

    /// Enter page `name`, keeping the current page on the stack beneath it.
    ///
    /// `stash` is copied into the page and readable from its hooks.
    pub fn push(
        &mut self,
        name: &str,
        stash: Option<&[u8]>,
    ) -> Result<(), PageError> {
        self.switch_anim_state_check()?;
        let handle = self.navigation_target(name)?;
        if self.stack.is_full() {
            pm_error!(self.log, "Page({}) push failed, stack full", name);
            return Err(PageError::StackFull);
        }

        if let Some(page) = self.registry.get_mut(handle) {
            page.is_disable_auto_cache = page.attrs.req_disable_auto_cache();
        }
        self.stack.push(handle)?;

        pm_info!(self.log, "Page({}) push >> [Screen]", name);
        self.switch_to(handle, true, stash)
    }

    /// Enter page `name` in place of the current top, which is torn down.
    pub fn replace(
        &mut self,
        name: &str,
        stash: Option<&[u8]>,
    ) -> Result<(), PageError> {
        self.switch_anim_state_check()?;
        let handle = self.navigation_target(name)?;

        let Some(top) = self.stack.top() else {
            pm_error!(self.log, "Stack top is empty, can't replace");
            return Err(PageError::StackEmpty);
        };

        if let Some(page) = self.registry.get_mut(top) {
            page.is_cached = false;
        }
        if let Some(page) = self.registry.get_mut(handle) {
            page.is_disable_auto_cache = page.attrs.req_disable_auto_cache();
        }

        self.stack.pop();
        self.stack.push(handle)?;

        pm_info!(self.log, "Page({}) replace Page({})", name, self.page_name(top));
        self.switch_to(handle, true, stash)
    }

    /// Leave the top page and return to the one beneath it.
    pub fn pop(&mut self) -> Result<(), PageError> {
        self.switch_anim_state_check()?;

        let (Some(top), true) = (self.stack.top(), self.stack.len() > 1) else {
            pm_warn!(self.log, "Page stack is empty, can't pop");
            return Err(PageError::StackEmpty);
        };

        let name = self.page_name(top);
        if let Some(page) = self.registry.get_mut(top) {
            if !page.is_disable_auto_cache {
                pm_info!(self.log, "Page({}) has auto cache, cache disabled", name);
                page.is_cached = false;
            }
        }

        pm_info!(self.log, "Page({}) pop << [Screen]", name);
        self.stack.pop();

        let Some(next) = self.stack.top() else {
            return Err(PageError::StackEmpty);
        };
        self.switch_to(next, false, None)
    }

    /// Return to the bottom page, force-unloading everything above it.
    ///
    /// A stack holding only the bottom page is left untouched.
    pub fn back_home(&mut self) -> Result<(), PageError> {
        self.switch_anim_state_check()?;

        let Some(home) = self.stack.bottom() else {
            pm_warn!(self.log, "Page stack is empty, no home page");
            return Err(PageError::StackEmpty);
        };
        if self.stack.len() == 1 {
            pm_info!(self.log, "Page({}) is already home", self.page_name(home));
            return Ok(());
        }

        self.set_stack_clear(true);
        self.prev = None;
        self.switch_to(home, false, None)
    }

    /// Force-unload pages from the top of the stack without animation.
    ///
    /// With `keep_bottom` the bottom page stays on the stack as it was: a
    /// cached page covered by the cleared ones remains hidden in
    /// [`PageState::WillAppear`] and nothing is shown until the next
    /// navigation brings it back.
    pub fn clear_stack(
        &mut self,
        keep_bottom: bool,
    ) -> Result<(), PageError> {
        self.switch_anim_state_check()?;
        self.set_stack_clear(keep_bottom);
        Ok(())
    }

    /// Set the manager-wide default transition.
    ///
    /// [`LoadAnim::Global`] cannot be the global default and becomes [`LoadAnim::None`].
    pub fn set_global_load_anim(
        &mut self,
        anim: LoadAnim,
        duration_ms: u32,
        easing: Easing,
    ) {
        let anim = if anim == LoadAnim::Global { LoadAnim::None } else { anim };
        self.anim_state.global = AnimSpec::new(anim, duration_ms, easing);
        pm_info!(self.log, "Set global load anim type = {}", anim.id());
    }

    // =========================================================================
    // Switch Protocol
    // =========================================================================

    /// Reject while a transition or a drag snap-back is in flight.
    pub(crate) fn switch_anim_state_check(&mut self) -> Result<(), PageError> {
        if self.anim_state.is_switch_req || self.anim_state.is_busy {
            pm_warn!(
                self.log,
                "Page switch busy[req={},busy={}], ignored",
                self.anim_state.is_switch_req,
                self.anim_state.is_busy
            );
            return Err(PageError::TransitionBusy);
        }
        Ok(())
    }

    // Shared preconditions of push and replace.
    fn navigation_target(
        &mut self,
        name: &str,
    ) -> Result<PageHandle, PageError> {
        if self.find_in_stack(name).is_some() {
            pm_error!(self.log, "Page({}) was multi push", name);
            return Err(PageError::AlreadyOnStack);
        }
        let Some(handle) = self.registry.find(name) else {
            pm_error!(self.log, "Page({}) was not install", name);
            return Err(PageError::NotInstalled);
        };
        Ok(handle)
    }

    pub(crate) fn find_in_stack(
        &self,
        name: &str,
    ) -> Option<PageHandle> {
        self.stack
            .iter()
            .rev()
            .find(|h| self.registry.get(*h).is_some_and(|p| p.name.as_str() == name))
    }

    pub(crate) fn switch_to(
        &mut self,
        target: PageHandle,
        is_enter: bool,
        stash: Option<&[u8]>,
    ) -> Result<(), PageError> {
        if self.registry.get(target).is_none() {
            pm_error!(self.log, "Switch target is not installed");
            return Err(PageError::NotInstalled);
        }
        if self.anim_state.is_switch_req {
            pm_warn!(self.log, "Page switch busy, require({}) is ignored", self.page_name(target));
            return Err(PageError::TransitionBusy);
        }
        self.anim_state.is_switch_req = true;

        if let Some(data) = stash {
            pm_info!(self.log, "stash is detect, {} >> stash >> {}", self.prev_page_name(), self.page_name(target));
            if let Some(page) = self.registry.get_mut(target) {
                match page.stash.store(data) {
                    StashStore::Reused => pm_debug!(self.log, "stash is exist, copy[{}]", data.len()),
                    StashStore::Allocated => pm_debug!(self.log, "stash alloc, copy[{}]", data.len()),
                }
            }
        }

        self.current = Some(target);
        let name = self.page_name(target);
        if let Some(page) = self.registry.get_mut(target) {
            page.state = if page.is_cached {
                pm_info!(self.log, "Page({}) has cached, appear directly", name);
                PageState::WillAppear
            } else {
                PageState::Load
            };
            page.is_enter = true;
        }
        if let Some(prev) = self.prev.and_then(|h| self.registry.get_mut(h)) {
            prev.is_enter = false;
        }

        self.anim_state.is_entering = is_enter;
        if is_enter {
            self.switch_anim_type_update(target);
        }

        self.state_update(self.prev);
        self.state_update(Some(target));

        let prev_root = self.prev.and_then(|h| self.registry.get(h)).and_then(|p| p.root);
        let cur_root = self.registry.get(target).and_then(|p| p.root);
        if is_enter {
            pm_info!(self.log, "Page ENTER is detect, move Page({}) to foreground", name);
            if let Some(root) = prev_root {
                self.scene.move_foreground(root);
            }
            if let Some(root) = cur_root {
                self.scene.move_foreground(root);
            }
        } else {
            pm_info!(self.log, "Page EXIT is detect, move Page({}) to foreground", self.prev_page_name());
            if let Some(root) = cur_root {
                self.scene.move_foreground(root);
            }
            if let Some(root) = prev_root {
                self.scene.move_foreground(root);
            }
        }
        Ok(())
    }

    /// Whether both pages of the transition finished animating. Closes the
    /// transition if so.
    pub(crate) fn switch_req_check(&mut self) -> bool {
        let busy = |h: Option<PageHandle>| h.and_then(|h| self.registry.get(h)).is_some_and(|p| p.is_busy);
        let current_busy = busy(self.current);
        let prev_busy = busy(self.prev);

        if !current_busy && !prev_busy {
            pm_info!(self.log, "----Page switch was all finished----");
            self.anim_state.is_switch_req = false;
            self.prev = self.current;
            true
        } else {
            if current_busy {
                let name = self.current.map(|h| self.page_name(h)).unwrap_or_default();
                pm_debug!(self.log, "Page current({}) is busy", name);
            } else {
                pm_debug!(self.log, "Page prev({}) is busy", self.prev_page_name());
            }
            false
        }
    }

    /// Force-unload from the top of the stack, optionally keeping the bottom page.
    ///
    /// The kept bottom page is neither shown nor transitioned; it becomes
    /// `current` and the previous page of the next switch.
    pub(crate) fn set_stack_clear(
        &mut self,
        keep_bottom: bool,
    ) {
        while let Some(top) = self.stack.top() {
            if self.stack.len() == 1 {
                if keep_bottom {
                    self.prev = Some(top);
                    pm_info!(self.log, "Keep page stack bottom({}), breaking...", self.page_name(top));
                    break;
                }
                self.prev = None;
            }
            self.force_unload(top);
            self.stack.pop();
        }
        if self.current.is_some_and(|h| !self.stack.contains(h)) {
            self.current = self.stack.top();
        }
        pm_info!(self.log, "Stack clear done");
    }

    // =========================================================================
    // Transition Animation
    // =========================================================================

    /// Resolve the preset for a transition entering `handle`.
    pub(crate) fn switch_anim_type_update(
        &mut self,
        handle: PageHandle,
    ) {
        let global = self.anim_state.global;
        let Some(page) = self.registry.get_mut(handle) else {
            return;
        };

        self.anim_state.current = match page.attrs.custom_load_anim() {
            Ok(spec) if spec.anim == LoadAnim::Global => {
                pm_debug!(self.log, "Page({}) Anim.Type was not set, use global = {}", page.name, global.anim.id());
                global
            }
            Ok(spec) => {
                pm_debug!(self.log, "Page({}) custom Anim.Type set = {}", page.name, spec.anim.id());
                spec
            }
            Err(_) => {
                pm_error!(
                    self.log,
                    "Page({}) ERROR custom Anim.Type = {}, use global = {}",
                    page.name,
                    page.attrs.custom_load_anim_id(),
                    global.anim.id()
                );
                page.attrs.set_custom_load_anim(global.anim, global.duration_ms, global.easing);
                global
            }
        };
    }

    /// Geometry of the preset in effect.
    pub(crate) fn current_anim_attr(&self) -> LoadAnimAttr {
        LoadAnimAttr::new(self.anim_state.current.anim, self.screen).unwrap_or_default()
    }

    /// Start the appear/disappear animation of `handle`.
    pub(crate) fn switch_anim_create(
        &mut self,
        handle: PageHandle,
    ) {
        let attr = self.current_anim_attr();
        let spec = self.anim_state.current;
        let is_entering = self.anim_state.is_entering;

        let Some(page) = self.registry.get_mut(handle) else {
            return;
        };
        let Some(root) = page.root else {
            pm_error!(self.log, "Page({}) has no root to animate", page.name);
            return;
        };

        let now = attr.channel.map_or(0, |channel| self.scene.value(root, channel));
        let range = match (is_entering, page.is_enter) {
            (true, true) => attr.push.enter,
            (true, false) => AnimRange::new(now, attr.push.exit.end),
            (false, true) => attr.pop.enter,
            (false, false) => AnimRange::new(now, attr.pop.exit.end),
        };

        let anim = Animation {
            scene: root,
            channel: attr.channel,
            start: range.start,
            end: range.end,
            duration_ms: spec.effective_duration_ms(),
            easing: spec.easing,
            tag: AnimTag::Switch(handle),
        };
        self.animator.start(anim, &mut self.scene);
        page.is_busy = true;
    }
}
