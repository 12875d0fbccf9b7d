//! The [`PageManager`] facade.
//!
//! Owns the page registry, the navigation stack, the transition state, the
//! scene backend and the animator. Navigation lives in `router`, the page
//! state machine in `lifecycle`, and gesture handling in `drag`; this module
//! holds installation, the event loop and queries.
//!
//! # Event Loop
//!
//! [`PageManager::tick`] is the only place where animation completions and
//! drag-leave signals are handled:
//!
//! 1. advance the animator, queueing a [`NavEvent`] per finished animation
//! 2. let the scene destroy deferred nodes no animation references anymore
//! 3. drain the event queue in FIFO order

use alloc::boxed::Box;

use embedded_graphics::geometry::{Point, Size};
use heapless::Deque;

use crate::anim::{AnimSpec, LoadAnimAttr};
use crate::config::{EMPTY_PAGE_NAME, EVENT_QUEUE_LEN, ManagerConfig};
use crate::entity::PageName;
use crate::error::PageError;
use crate::log::{EventLog, pm_error, pm_info, pm_warn};
use crate::page::{PageAttrs, PageFactory, PageState};
use crate::registry::{PageHandle, Registry};
use crate::router::AnimState;
use crate::scene::{SceneBackend, SceneId};
use crate::stack::PageStack;
use crate::tween::{AnimTag, Animator};

// =============================================================================
// Events and Gestures
// =============================================================================

/// Deferred work processed by [`PageManager::tick`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavEvent {
    /// An animation started by the manager finished.
    AnimFinished(AnimTag),
    /// A drag release predicted the page is thrown out.
    Leave(PageHandle),
}

/// Pointer input for the active page.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Gesture {
    Pressed,
    /// Movement since the previous gesture event.
    Dragging { delta: Point },
    /// Instantaneous velocity at release, in pixels per input period.
    Released { velocity: Point },
}

// =============================================================================
// Page Manager
// =============================================================================

/// Navigation, lifecycle and transition manager for full-screen pages.
pub struct PageManager<S: SceneBackend, A: Animator> {
    pub(crate) scene: S,
    pub(crate) animator: A,
    pub(crate) screen: Size,
    pub(crate) factory: Option<Box<dyn PageFactory>>,
    pub(crate) registry: Registry,
    pub(crate) stack: PageStack,
    /// Page the last transition entered.
    pub(crate) current: Option<PageHandle>,
    /// Page active before the transition in flight.
    pub(crate) prev: Option<PageHandle>,
    pub(crate) anim_state: AnimState,
    pub(crate) events: Deque<NavEvent, EVENT_QUEUE_LEN>,
    pub(crate) log: EventLog,
}

impl<S: SceneBackend, A: Animator> PageManager<S, A> {
    pub fn new(
        scene: S,
        animator: A,
        config: ManagerConfig,
    ) -> Self {
        let mut manager = Self {
            scene,
            animator,
            screen: config.screen,
            factory: None,
            registry: Registry::new(),
            stack: PageStack::new(),
            current: None,
            prev: None,
            anim_state: AnimState::new(config.global_anim),
            events: Deque::new(),
            log: EventLog::new(config.log_level),
        };
        let global = config.global_anim;
        manager.set_global_load_anim(global.anim, global.duration_ms, global.easing);
        manager
    }

    /// Set the factory used by [`PageManager::install`].
    pub fn set_factory(
        &mut self,
        factory: Box<dyn PageFactory>,
    ) {
        self.factory = Some(factory);
    }

    // =========================================================================
    // Installation
    // =========================================================================

    /// Create a page of `class_name` and register it as `name`.
    ///
    /// The page's `on_custom_attr_config` hook runs before this returns.
    pub fn install(
        &mut self,
        class_name: &str,
        name: &str,
    ) -> Result<PageHandle, PageError> {
        let Some(factory) = self.factory.as_ref() else {
            pm_error!(self.log, "Factory was not registered, can't install page");
            return Err(PageError::FactoryMissing);
        };
        if self.registry.find(name).is_some() {
            pm_error!(self.log, "Page({}) was registered", name);
            return Err(PageError::DuplicateName);
        }
        let Some(page) = factory.create_page(class_name) else {
            pm_error!(self.log, "Factory has not {}", class_name);
            return Err(PageError::UnknownType);
        };

        pm_info!(self.log, "Install Page[class = {}, name = {}]", class_name, name);
        let handle = match self.registry.register(name, page) {
            Ok(handle) => handle,
            Err(e) => {
                pm_error!(self.log, "Page({}) register failed: {}", name, e);
                return Err(e);
            }
        };

        if let Some(entity) = self.registry.get_mut(handle) {
            entity.page.on_custom_attr_config(&mut entity.attrs);
        }
        Ok(handle)
    }

    /// Remove page `name`, unloading it first if it is cached.
    ///
    /// The page must not be on the stack.
    pub fn uninstall(
        &mut self,
        name: &str,
    ) -> Result<(), PageError> {
        pm_info!(self.log, "Page({}) uninstall...", name);

        let Some(handle) = self.registry.find(name) else {
            pm_error!(self.log, "Page({}) was not found", name);
            return Err(PageError::NotFound);
        };
        let in_transition = self.current == Some(handle) || self.prev == Some(handle);
        if self.anim_state.is_switch_req && in_transition {
            pm_warn!(self.log, "Page({}) is switching, can't uninstall", name);
            return Err(PageError::TransitionBusy);
        }
        if self.stack.contains(handle) {
            pm_error!(self.log, "Page({}) was in stack", name);
            return Err(PageError::StillInStack);
        }

        if self.registry.get(handle).is_some_and(|p| p.is_cached) {
            pm_warn!(self.log, "Page({}) has cached, unloading...", name);
            if let Some(page) = self.registry.get_mut(handle) {
                page.state = PageState::Unload;
            }
            self.state_update(Some(handle));
        } else {
            pm_info!(self.log, "Page({}) has not cache", name);
        }

        if self.current == Some(handle) {
            self.current = None;
        }
        if self.prev == Some(handle) {
            self.prev = None;
        }
        self.registry.unregister(handle);
        pm_info!(self.log, "Uninstall OK");
        Ok(())
    }

    // =========================================================================
    // Event Loop
    // =========================================================================

    /// Advance time by `elapsed_ms` and process pending events.
    pub fn tick(
        &mut self,
        elapsed_ms: u32,
    ) {
        let events = &mut self.events;
        let log = &mut self.log;
        self.animator.advance(elapsed_ms, &mut self.scene, &mut |tag: AnimTag| {
            if events.push_back(NavEvent::AnimFinished(tag)).is_err() {
                pm_error!(log, "Event queue full, {:?} dropped", tag);
            }
        });

        let animator = &self.animator;
        self.scene.collect_garbage(&|id: SceneId| animator.is_animating(id));

        while let Some(event) = self.events.pop_front() {
            self.dispatch(event);
        }
    }

    pub(crate) fn queue_event(
        &mut self,
        event: NavEvent,
    ) {
        if self.events.push_back(event).is_err() {
            pm_error!(self.log, "Event queue full, {:?} dropped", event);
        }
    }

    fn dispatch(
        &mut self,
        event: NavEvent,
    ) {
        match event {
            NavEvent::AnimFinished(AnimTag::Switch(handle)) => self.on_switch_anim_finish(handle),
            NavEvent::AnimFinished(AnimTag::DragSettle(_)) => self.on_drag_anim_finish(),
            NavEvent::Leave(handle) => self.dispatch_leave(handle),
        }
    }

    /// Number of events waiting for the next tick.
    #[inline]
    pub fn pending_events(&self) -> usize { self.events.len() }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn scene(&self) -> &S { &self.scene }

    pub fn scene_mut(&mut self) -> &mut S { &mut self.scene }

    pub fn animator(&self) -> &A { &self.animator }

    pub fn log(&self) -> &EventLog { &self.log }

    pub fn log_mut(&mut self) -> &mut EventLog { &mut self.log }

    /// Screen extents used for transition geometry.
    #[inline]
    pub const fn screen(&self) -> Size { self.screen }

    /// Name of the page on top of the stack.
    pub fn stack_top_name(&self) -> Option<&str> {
        self.stack
            .top()
            .and_then(|h| self.registry.get(h))
            .map(|p| p.name.as_str())
    }

    /// Name of the page active before the transition in flight, or
    /// `"EMPTY_PAGE"`.
    pub fn prev_page_name(&self) -> &str {
        self.prev
            .and_then(|h| self.registry.get(h))
            .map_or(EMPTY_PAGE_NAME, |p| p.name.as_str())
    }

    /// Stack entries from bottom to top.
    pub fn stack_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.stack
            .iter()
            .filter_map(|h| self.registry.get(h))
            .map(|p| p.name.as_str())
    }

    #[inline]
    pub fn stack_depth(&self) -> usize { self.stack.len() }

    /// Number of installed pages.
    #[inline]
    pub fn page_count(&self) -> usize { self.registry.len() }

    pub fn is_installed(
        &self,
        name: &str,
    ) -> bool {
        self.registry.find(name).is_some()
    }

    pub fn page_handle(
        &self,
        name: &str,
    ) -> Option<PageHandle> {
        self.registry.find(name)
    }

    pub fn page_state(
        &self,
        name: &str,
    ) -> Option<PageState> {
        self.entity(name).map(|p| p.state)
    }

    pub fn is_page_cached(
        &self,
        name: &str,
    ) -> Option<bool> {
        self.entity(name).map(|p| p.is_cached)
    }

    /// Whether the page's own switch animation is in flight.
    pub fn is_page_busy(
        &self,
        name: &str,
    ) -> Option<bool> {
        self.entity(name).map(|p| p.is_busy)
    }

    pub fn is_drag_enabled(
        &self,
        name: &str,
    ) -> Option<bool> {
        self.entity(name).map(|p| p.drag_enabled)
    }

    pub fn page_root(
        &self,
        name: &str,
    ) -> Option<SceneId> {
        self.entity(name).and_then(|p| p.root)
    }

    pub fn page_attrs(
        &self,
        name: &str,
    ) -> Option<&PageAttrs> {
        self.entity(name).map(|p| &p.attrs)
    }

    pub fn page_attrs_mut(
        &mut self,
        name: &str,
    ) -> Option<&mut PageAttrs> {
        let handle = self.registry.find(name)?;
        self.registry.get_mut(handle).map(|p| &mut p.attrs)
    }

    /// Stashed bytes of the page.
    pub fn page_stash(
        &self,
        name: &str,
    ) -> Option<&[u8]> {
        self.entity(name).map(|p| p.stash.as_slice())
    }

    /// A transition is in flight.
    #[inline]
    pub const fn is_switching(&self) -> bool { self.anim_state.is_switch_req }

    /// A drag snap-back is in flight.
    #[inline]
    pub const fn is_busy(&self) -> bool { self.anim_state.is_busy }

    /// Preset of the transition in flight (or the last one).
    #[inline]
    pub const fn current_anim(&self) -> AnimSpec { self.anim_state.current }

    #[inline]
    pub const fn global_anim(&self) -> AnimSpec { self.anim_state.global }

    /// Geometry of the preset in effect.
    pub fn current_anim_geometry(&self) -> LoadAnimAttr { self.current_anim_attr() }

    fn entity(
        &self,
        name: &str,
    ) -> Option<&crate::entity::PageEntity> {
        self.registry.find(name).and_then(|h| self.registry.get(h))
    }

    pub(crate) fn page_name(
        &self,
        handle: PageHandle,
    ) -> PageName {
        self.registry.get(handle).map(|p| p.name.clone()).unwrap_or_default()
    }
}

impl<S: SceneBackend, A: Animator> Drop for PageManager<S, A> {
    fn drop(&mut self) { self.set_stack_clear(false); }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{Channel, Easing, LoadAnim};
    use crate::config::{DEFAULT_ANIM_DURATION_MS, SCREEN_WIDTH};
    use crate::log::LogLevel;
    use crate::scene::SceneGraph;
    use crate::testing::{Journal, TestFactory, settle, test_manager};
    use crate::tween::TweenAnimator;

    type Manager = PageManager<SceneGraph, TweenAnimator>;

    fn installed(names: &[(&str, &str)]) -> (Manager, Journal) {
        let (mut m, journal) = test_manager();
        for (class, name) in names {
            m.install(class, name).unwrap();
        }
        journal.take();
        (m, journal)
    }

    /// `A` pushed and settled.
    fn with_home() -> (Manager, Journal) {
        let (mut m, journal) = installed(&[("Page", "A"), ("Page", "B"), ("Page", "C")]);
        m.push("A", None).unwrap();
        settle(&mut m);
        journal.take();
        (m, journal)
    }

    // -------------------------------------------------------------------------
    // Install / Uninstall
    // -------------------------------------------------------------------------

    #[test]
    fn test_install_without_factory() {
        let mut m = Manager::new(SceneGraph::new(), TweenAnimator::new(), ManagerConfig::default());
        assert_eq!(m.install("Page", "A"), Err(PageError::FactoryMissing));
        assert_eq!(m.page_count(), 0);
        assert!(m.log().contains(LogLevel::Error, "Factory was not registered"));
    }

    #[test]
    fn test_install_runs_attr_config() {
        let (mut m, journal) = test_manager();
        m.install("Page", "A").unwrap();
        assert_eq!(journal.take(), ["Page:attr"]);
        assert!(m.is_installed("A"));
        assert_eq!(m.page_state("A"), Some(PageState::Idle));
    }

    #[test]
    fn test_install_duplicate_name() {
        let (mut m, _journal) = installed(&[("Page", "A")]);
        let before = m.page_handle("A");
        assert_eq!(m.install("Sticky", "A"), Err(PageError::DuplicateName));
        assert_eq!(m.page_count(), 1);
        assert_eq!(m.page_handle("A"), before);
        assert_eq!(m.page_attrs("A").map(|a| a.req_disable_auto_cache()), Some(false));
    }

    #[test]
    fn test_install_unknown_class() {
        let (mut m, _journal) = test_manager();
        assert_eq!(m.install("Nope", "A"), Err(PageError::UnknownType));
        assert_eq!(m.page_count(), 0);
    }

    #[test]
    fn test_install_uninstall_round_trip() {
        let (mut m, _journal) = installed(&[("Page", "A")]);
        m.install("Page", "X").unwrap();
        assert_eq!(m.page_count(), 2);
        m.uninstall("X").unwrap();
        assert_eq!(m.page_count(), 1);
        assert!(!m.is_installed("X"));
        assert_eq!(m.uninstall("X"), Err(PageError::NotFound));
    }

    #[test]
    fn test_uninstall_in_stack() {
        let (mut m, _journal) = with_home();
        assert_eq!(m.uninstall("A"), Err(PageError::StillInStack));
        assert!(m.is_installed("A"));
    }

    #[test]
    fn test_uninstall_cached_page_unloads() {
        let (mut m, journal) = installed(&[("Page", "A"), ("Sticky", "S")]);
        m.push("A", None).unwrap();
        settle(&mut m);
        m.push("S", None).unwrap();
        settle(&mut m);
        m.pop().unwrap();
        settle(&mut m);
        assert_eq!(m.is_page_cached("S"), Some(true));
        let root = m.page_root("S").unwrap();
        journal.take();

        m.uninstall("S").unwrap();
        assert_eq!(journal.take(), ["S:unload", "S:did_unload"]);
        assert!(!m.scene().contains(root) || m.scene().node(root).is_some_and(|n| n.doomed));
    }

    #[test]
    fn test_uninstall_during_transition() {
        let (mut m, _journal) = with_home();
        m.push("B", None).unwrap();
        assert!(m.is_switching());
        assert_eq!(m.uninstall("B"), Err(PageError::TransitionBusy));
        assert_eq!(m.uninstall("A"), Err(PageError::TransitionBusy));
        assert_eq!(m.uninstall("C"), Ok(()));
    }

    // -------------------------------------------------------------------------
    // Push / Pop / Replace
    // -------------------------------------------------------------------------

    #[test]
    fn test_first_push_enters_directly() {
        let (mut m, journal) = installed(&[("Page", "A"), ("Page", "B")]);
        m.push("A", None).unwrap();

        assert_eq!(m.page_state("A"), Some(PageState::WillAppear));
        assert_eq!(m.is_page_busy("A"), Some(true));
        assert!(m.is_switching());
        assert_eq!(m.prev_page_name(), EMPTY_PAGE_NAME);
        assert_eq!(journal.take(), ["A:load", "A:did_load", "A:will_appear"]);

        settle(&mut m);
        assert_eq!(m.page_state("A"), Some(PageState::Activity));
        assert!(!m.is_switching());
        assert_eq!(journal.take(), ["A:did_appear"]);
        assert_eq!(m.prev_page_name(), "A");
    }

    #[test]
    fn test_push_runs_both_pages_in_parallel() {
        let (mut m, journal) = with_home();
        m.push("B", None).unwrap();

        assert_eq!(m.page_state("A"), Some(PageState::WillDisappear));
        assert_eq!(m.page_state("B"), Some(PageState::WillAppear));
        assert!(m.is_switching());
        assert_eq!(
            journal.take(),
            ["A:will_disappear", "B:load", "B:did_load", "B:will_appear"]
        );

        m.tick(DEFAULT_ANIM_DURATION_MS / 2);
        assert!(m.is_switching());

        settle(&mut m);
        assert!(!m.is_switching());
        assert_eq!(m.stack_names().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(m.page_state("A"), Some(PageState::WillAppear));
        assert_eq!(m.is_page_cached("A"), Some(true));
        assert_eq!(m.page_state("B"), Some(PageState::Activity));
        assert_eq!(journal.take(), ["A:did_disappear", "B:did_appear"]);
    }

    #[test]
    fn test_push_rejected_while_switching() {
        let (mut m, _journal) = with_home();
        m.push("B", None).unwrap();
        assert_eq!(m.push("C", None), Err(PageError::TransitionBusy));
        assert_eq!(m.pop(), Err(PageError::TransitionBusy));
        assert_eq!(m.back_home(), Err(PageError::TransitionBusy));
        assert_eq!(m.stack_depth(), 2);

        settle(&mut m);
        assert!(m.push("C", None).is_ok());
    }

    #[test]
    fn test_push_errors() {
        let (mut m, _journal) = with_home();
        assert_eq!(m.push("A", None), Err(PageError::AlreadyOnStack));
        assert_eq!(m.push("Z", None), Err(PageError::NotInstalled));
        assert_eq!(m.stack_depth(), 1);
        assert!(m.log().contains(LogLevel::Error, "was multi push"));
    }

    #[test]
    fn test_pop_clears_auto_cache() {
        let (mut m, journal) = with_home();
        m.push("B", None).unwrap();
        settle(&mut m);
        journal.take();

        m.pop().unwrap();
        assert_eq!(m.is_page_cached("B"), Some(false));
        assert_eq!(m.page_state("B"), Some(PageState::WillDisappear));
        assert_eq!(m.page_state("A"), Some(PageState::WillAppear));
        assert_eq!(journal.take(), ["B:will_disappear", "A:will_appear"]);

        settle(&mut m);
        assert_eq!(m.page_state("B"), Some(PageState::Idle));
        assert_eq!(m.page_root("B"), None);
        assert_eq!(m.page_state("A"), Some(PageState::Activity));
        assert_eq!(m.stack_names().collect::<Vec<_>>(), ["A"]);
        assert_eq!(
            journal.take(),
            ["B:did_disappear", "B:unload", "B:did_unload", "A:did_appear"]
        );
    }

    #[test]
    fn test_pop_single_page_fails() {
        let (mut m, _journal) = with_home();
        assert_eq!(m.pop(), Err(PageError::StackEmpty));
        assert_eq!(m.stack_depth(), 1);
        assert_eq!(m.page_state("A"), Some(PageState::Activity));
        assert!(!m.is_switching());

        let (mut empty, _journal) = installed(&[("Page", "A")]);
        assert_eq!(empty.pop(), Err(PageError::StackEmpty));
    }

    #[test]
    fn test_sticky_page_stays_cached_after_pop() {
        let (mut m, journal) = installed(&[("Page", "A"), ("Sticky", "S")]);
        m.push("A", None).unwrap();
        settle(&mut m);
        m.push("S", None).unwrap();
        settle(&mut m);
        m.pop().unwrap();
        settle(&mut m);
        journal.take();

        assert_eq!(m.page_state("S"), Some(PageState::WillAppear));
        assert!(m.page_root("S").is_some());

        m.push("S", None).unwrap();
        assert_eq!(journal.take(), ["A:will_disappear", "S:will_appear"]);
    }

    #[test]
    fn test_no_cache_page_unloads_when_covered() {
        let (mut m, journal) = installed(&[("NoCache", "N"), ("Page", "B")]);
        m.push("N", None).unwrap();
        settle(&mut m);
        m.push("B", None).unwrap();
        settle(&mut m);
        assert_eq!(m.page_state("N"), Some(PageState::Idle));
        journal.take();

        m.pop().unwrap();
        settle(&mut m);
        assert_eq!(
            journal.take(),
            [
                "B:will_disappear",
                "N:load",
                "N:did_load",
                "N:will_appear",
                "B:did_disappear",
                "B:unload",
                "B:did_unload",
                "N:did_appear"
            ]
        );
    }

    #[test]
    fn test_replace_tears_down_old_top() {
        let (mut m, journal) = with_home();
        m.replace("B", None).unwrap();
        assert_eq!(m.is_page_cached("A"), Some(false));
        settle(&mut m);

        assert_eq!(m.stack_names().collect::<Vec<_>>(), ["B"]);
        assert_eq!(m.page_state("A"), Some(PageState::Idle));
        assert_eq!(m.page_state("B"), Some(PageState::Activity));
        assert!(journal.take().contains(&"A:did_unload".to_string()));
    }

    #[test]
    fn test_replace_empty_stack() {
        let (mut m, _journal) = installed(&[("Page", "A")]);
        assert_eq!(m.replace("A", None), Err(PageError::StackEmpty));
        assert_eq!(m.stack_depth(), 0);
    }

    #[test]
    fn test_stack_never_holds_duplicates() {
        let (mut m, _journal) = with_home();
        let ops: [(&str, bool); 6] = [("B", true), ("A", true), ("C", true), ("B", false), ("C", true), ("A", false)];
        for (name, push) in ops {
            let _ = if push { m.push(name, None) } else { m.replace(name, None) };
            settle(&mut m);
            let names: Vec<_> = m.stack_names().collect();
            for (i, n) in names.iter().enumerate() {
                assert!(!names[i + 1..].contains(n), "duplicate {n} in {names:?}");
                assert!(m.is_installed(n));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Stash
    // -------------------------------------------------------------------------

    #[test]
    fn test_stash_reaches_page_and_is_freed() {
        let (mut m, journal) = with_home();
        m.push("B", Some(&[7, 8, 9])).unwrap();
        assert!(journal.take().contains(&"B:stash=[7, 8, 9]".to_string()));
        settle(&mut m);
        assert_eq!(m.page_stash("B"), Some(&[7u8, 8, 9][..]));

        m.pop().unwrap();
        settle(&mut m);
        assert_eq!(m.page_stash("B"), Some(&[][..]));
    }

    // -------------------------------------------------------------------------
    // Back Home / Clear
    // -------------------------------------------------------------------------

    #[test]
    fn test_back_home() {
        let (mut m, journal) = with_home();
        m.push("B", None).unwrap();
        settle(&mut m);
        m.push("C", None).unwrap();
        settle(&mut m);
        journal.take();

        m.back_home().unwrap();
        let log = journal.take();
        assert_eq!(
            &log[..6],
            [
                "C:will_disappear",
                "C:did_disappear",
                "C:unload",
                "C:did_unload",
                "B:unload",
                "B:did_unload"
            ]
        );
        assert_eq!(m.stack_names().collect::<Vec<_>>(), ["A"]);
        assert_eq!(m.page_state("A"), Some(PageState::WillAppear));

        settle(&mut m);
        assert_eq!(m.page_state("A"), Some(PageState::Activity));
        assert_eq!(m.page_state("B"), Some(PageState::Idle));
        assert_eq!(m.page_state("C"), Some(PageState::Idle));
        assert!(!m.is_switching());
    }

    #[test]
    fn test_back_home_edges() {
        let (mut m, _journal) = installed(&[("Page", "A")]);
        assert_eq!(m.back_home(), Err(PageError::StackEmpty));

        m.push("A", None).unwrap();
        settle(&mut m);
        assert_eq!(m.back_home(), Ok(()));
        assert!(!m.is_switching());
        assert_eq!(m.page_state("A"), Some(PageState::Activity));
    }

    #[test]
    fn test_clear_stack() {
        let (mut m, journal) = with_home();
        m.push("B", None).unwrap();
        settle(&mut m);
        journal.take();

        m.clear_stack(false).unwrap();
        assert_eq!(m.stack_depth(), 0);
        assert_eq!(m.page_state("A"), Some(PageState::Idle));
        assert_eq!(m.page_state("B"), Some(PageState::Idle));
        assert_eq!(m.prev_page_name(), EMPTY_PAGE_NAME);
        assert_eq!(m.stack_top_name(), None);
        assert_eq!(
            journal.take(),
            ["B:will_disappear", "B:did_disappear", "B:unload", "B:did_unload", "A:unload", "A:did_unload"]
        );
    }

    #[test]
    fn test_clear_stack_keeps_bottom_hidden() {
        let (mut m, journal) = with_home();
        m.push("B", None).unwrap();
        settle(&mut m);
        journal.take();

        m.clear_stack(true).unwrap();
        assert_eq!(m.stack_names().collect::<Vec<_>>(), ["A"]);
        assert_eq!(m.page_state("B"), Some(PageState::Idle));
        assert_eq!(m.page_state("A"), Some(PageState::WillAppear));
        assert!(!m.is_switching());

        let a = m.page_root("A").unwrap();
        assert!(m.scene().is_hidden(a));
        assert_eq!(journal.take(), ["B:will_disappear", "B:did_disappear", "B:unload", "B:did_unload"]);

        settle(&mut m);
        assert!(m.scene().is_hidden(a));
    }

    #[test]
    fn test_drop_unloads_stack() {
        let (mut m, journal) = with_home();
        drop(m);
        assert_eq!(journal.take(), ["A:will_disappear", "A:did_disappear", "A:unload", "A:did_unload"]);
    }

    // -------------------------------------------------------------------------
    // Animation
    // -------------------------------------------------------------------------

    #[test]
    fn test_push_geometry_over_left() {
        let (mut m, _journal) = with_home();
        m.push("B", None).unwrap();
        let b = m.page_root("B").unwrap();
        let a = m.page_root("A").unwrap();

        assert_eq!(m.scene().value(b, Channel::X), SCREEN_WIDTH as i32);
        assert_eq!(m.scene().z_order().last(), Some(b));

        settle(&mut m);
        assert_eq!(m.scene().value(b, Channel::X), 0);
        assert_eq!(m.scene().value(a, Channel::X), 0);
        assert!(m.scene().is_hidden(a));
        assert!(!m.scene().is_hidden(b));
    }

    #[test]
    fn test_pop_keeps_leaving_page_on_top() {
        let (mut m, _journal) = with_home();
        m.push("B", None).unwrap();
        settle(&mut m);
        let a = m.page_root("A").unwrap();
        let b = m.page_root("B").unwrap();

        m.pop().unwrap();
        let order: Vec<_> = m.scene().z_order().collect();
        let pos = |id: SceneId| order.iter().position(|n| *n == id);
        assert!(pos(b) > pos(a));
        assert!(!m.scene().is_hidden(a));

        m.tick(DEFAULT_ANIM_DURATION_MS);
        assert_eq!(m.scene().value(b, Channel::X), SCREEN_WIDTH as i32);
    }

    #[test]
    fn test_custom_anim_applies_on_enter() {
        let (mut m, _journal) = installed(&[("Page", "A"), ("Fade", "F")]);
        m.push("A", None).unwrap();
        settle(&mut m);

        m.push("F", None).unwrap();
        assert_eq!(m.current_anim().anim, LoadAnim::FadeOn);
        let f = m.page_root("F").unwrap();
        assert_eq!(m.scene().value(f, Channel::Opacity), 0);
        settle(&mut m);
        assert_eq!(m.scene().value(f, Channel::Opacity), 255);

        m.pop().unwrap();
        assert_eq!(m.current_anim().anim, LoadAnim::FadeOn);
        settle(&mut m);
        assert_eq!(m.current_anim().anim, LoadAnim::OverLeft);
    }

    #[test]
    fn test_invalid_custom_anim_falls_back_to_global() {
        let (mut m, _journal) = installed(&[("BadAnim", "X")]);
        m.push("X", None).unwrap();
        assert_eq!(m.current_anim(), m.global_anim());
        assert!(m.log().contains(LogLevel::Error, "ERROR custom Anim.Type"));
        assert_eq!(m.page_attrs("X").map(|a| a.custom_load_anim_id()), Some(LoadAnim::OverLeft.id()));
        settle(&mut m);
        assert_eq!(m.page_state("X"), Some(PageState::Activity));
    }

    #[test]
    fn test_global_anim_none_is_instant() {
        let (mut m, _journal) = installed(&[("Page", "A"), ("Page", "B")]);
        m.set_global_load_anim(LoadAnim::None, 300, Easing::Linear);
        m.push("A", None).unwrap();
        m.tick(0);
        assert_eq!(m.page_state("A"), Some(PageState::Activity));
        assert!(!m.is_switching());
    }

    #[test]
    fn test_global_anim_coerces_global() {
        let (mut m, _journal) = test_manager();
        m.set_global_load_anim(LoadAnim::Global, 100, Easing::Linear);
        assert_eq!(m.global_anim().anim, LoadAnim::None);
    }

    #[test]
    fn test_completion_only_in_tick() {
        let (mut m, _journal) = with_home();
        m.push("B", None).unwrap();
        assert_eq!(m.pending_events(), 0);
        m.tick(DEFAULT_ANIM_DURATION_MS);
        assert_eq!(m.pending_events(), 0);
        assert!(!m.is_switching());
    }

    #[test]
    fn test_unloaded_root_is_collected() {
        let (mut m, _journal) = with_home();
        m.push("B", None).unwrap();
        settle(&mut m);
        let b = m.page_root("B").unwrap();
        m.pop().unwrap();
        settle(&mut m);
        m.tick(0);
        assert!(!m.scene().contains(b));
    }

    // -------------------------------------------------------------------------
    // Drag
    // -------------------------------------------------------------------------

    /// `A` beneath `B`, pushed with the default overlay preset.
    fn dragging_setup() -> (Manager, Journal, SceneId, SceneId) {
        let (mut m, journal) = with_home();
        m.push("B", None).unwrap();
        settle(&mut m);
        journal.take();
        let a = m.page_root("A").unwrap();
        let b = m.page_root("B").unwrap();
        (m, journal, a, b)
    }

    #[test]
    fn test_drag_enabled_over_cached_page() {
        let (m, _journal, _a, _b) = dragging_setup();
        assert_eq!(m.is_drag_enabled("B"), Some(true));
        assert_eq!(m.is_drag_enabled("A"), Some(false));
    }

    #[test]
    fn test_drag_disabled_for_move_preset() {
        let (mut m, _journal) = installed(&[("Page", "A"), ("Page", "B")]);
        m.set_global_load_anim(LoadAnim::MoveLeft, 100, Easing::Linear);
        m.push("A", None).unwrap();
        settle(&mut m);
        m.push("B", None).unwrap();
        settle(&mut m);
        assert_eq!(m.is_drag_enabled("B"), Some(false));
    }

    #[test]
    fn test_drag_moves_and_clamps() {
        let (mut m, _journal, _a, b) = dragging_setup();
        m.on_gesture(Gesture::Dragging { delta: Point::new(40, 12) });
        assert_eq!(m.scene().value(b, Channel::X), 40);
        assert_eq!(m.scene().value(b, Channel::Y), 0);

        m.on_gesture(Gesture::Dragging { delta: Point::new(-100, 0) });
        assert_eq!(m.scene().value(b, Channel::X), 0);

        m.on_gesture(Gesture::Dragging { delta: Point::new(1000, 0) });
        assert_eq!(m.scene().value(b, Channel::X), SCREEN_WIDTH as i32);
    }

    #[test]
    fn test_drag_release_snaps_back() {
        let (mut m, _journal, a, b) = dragging_setup();
        m.on_gesture(Gesture::Pressed);
        m.on_gesture(Gesture::Dragging { delta: Point::new(60, 0) });
        m.on_gesture(Gesture::Released { velocity: Point::zero() });

        assert!(m.is_busy());
        assert_eq!(m.push("C", None), Err(PageError::TransitionBusy));

        settle(&mut m);
        assert!(!m.is_busy());
        assert_eq!(m.scene().value(b, Channel::X), 0);
        assert!(m.scene().is_hidden(a));
        assert_eq!(m.stack_top_name(), Some("B"));
    }

    #[test]
    fn test_drag_release_at_rest_does_nothing() {
        let (mut m, _journal, _a, _b) = dragging_setup();
        m.on_gesture(Gesture::Released { velocity: Point::zero() });
        assert!(!m.is_busy());
        assert_eq!(m.pending_events(), 0);
    }

    #[test]
    fn test_drag_throw_pops_page() {
        let (mut m, journal, _a, b) = dragging_setup();
        m.on_gesture(Gesture::Dragging { delta: Point::new(100, 0) });
        m.on_gesture(Gesture::Released { velocity: Point::new(30, 0) });
        assert_eq!(m.pending_events(), 1);
        assert_eq!(m.stack_depth(), 2);

        m.tick(0);
        assert!(journal.take().contains(&"B:leave".to_string()));
        assert!(m.is_switching());
        assert_eq!(m.scene().value(b, Channel::X), 100);

        settle(&mut m);
        assert_eq!(m.stack_names().collect::<Vec<_>>(), ["A"]);
        assert_eq!(m.page_state("B"), Some(PageState::Idle));
    }

    #[test]
    fn test_drag_extreme_throw_leaves() {
        let (mut m, _journal, _a, b) = dragging_setup();
        m.on_gesture(Gesture::Dragging { delta: Point::new(i32::MAX, i32::MAX) });
        m.on_gesture(Gesture::Dragging { delta: Point::new(i32::MAX, 0) });
        assert_eq!(m.scene().value(b, Channel::X), SCREEN_WIDTH as i32);

        m.on_gesture(Gesture::Released { velocity: Point::new(i32::MAX, i32::MIN) });
        assert_eq!(m.pending_events(), 1);

        m.tick(0);
        settle(&mut m);
        assert_eq!(m.stack_names().collect::<Vec<_>>(), ["A"]);
    }

    #[test]
    fn test_drag_extreme_negative_release() {
        let (mut m, _journal, _a, b) = dragging_setup();
        m.on_gesture(Gesture::Dragging { delta: Point::new(i32::MIN, i32::MIN) });
        assert_eq!(m.scene().value(b, Channel::X), 0);

        // Predicted rest position saturates at i32::MIN, far past half the travel
        m.on_gesture(Gesture::Released { velocity: Point::new(i32::MIN, 0) });
        assert_eq!(m.pending_events(), 1);

        m.tick(0);
        settle(&mut m);
        assert_eq!(m.stack_names().collect::<Vec<_>>(), ["A"]);
        assert!(!m.is_busy());
    }

    #[test]
    fn test_drag_leave_stay() {
        let (mut m, journal) = installed(&[("Page", "A"), ("Stay", "S")]);
        m.push("A", None).unwrap();
        settle(&mut m);
        m.push("S", None).unwrap();
        settle(&mut m);
        journal.take();

        m.on_gesture(Gesture::Dragging { delta: Point::new(200, 0) });
        m.on_gesture(Gesture::Released { velocity: Point::zero() });
        m.tick(0);
        assert_eq!(journal.take(), ["S:leave"]);
        assert_eq!(m.stack_depth(), 2);
        assert!(!m.is_switching());
    }

    #[test]
    fn test_press_interrupts_snap_back_and_reveals_beneath() {
        let (mut m, _journal, a, b) = dragging_setup();
        m.on_gesture(Gesture::Dragging { delta: Point::new(80, 0) });
        m.on_gesture(Gesture::Released { velocity: Point::zero() });
        m.tick(DEFAULT_ANIM_DURATION_MS / 5);
        assert!(m.is_busy());

        m.on_gesture(Gesture::Pressed);
        assert!(!m.is_busy());
        assert!(!m.scene().is_hidden(a));
        let x = m.scene().value(b, Channel::X);

        settle(&mut m);
        assert_eq!(m.scene().value(b, Channel::X), x);
        assert!(!m.scene().is_hidden(a));
    }

    #[test]
    fn test_gestures_ignored_without_drag() {
        let (mut m, _journal) = with_home();
        let a = m.page_root("A").unwrap();
        m.on_gesture(Gesture::Dragging { delta: Point::new(50, 0) });
        assert_eq!(m.scene().value(a, Channel::X), 0);
    }

    // -------------------------------------------------------------------------
    // Factory
    // -------------------------------------------------------------------------

    #[test]
    fn test_replace_factory() {
        let (mut m, journal) = test_manager();
        m.set_factory(Box::new(TestFactory::new(journal.clone())));
        assert!(m.install("Page", "A").is_ok());
    }
}
