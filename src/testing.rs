//! Recording pages and helpers shared by the unit tests.

use std::boxed::Box;
use std::cell::RefCell;
use std::format;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use crate::anim::{Easing, LoadAnim};
use crate::config::{DEFAULT_ANIM_DURATION_MS, ManagerConfig};
use crate::log::LogLevel;
use crate::manager::PageManager;
use crate::page::{LeaveAction, Page, PageAttrs, PageFactory, PageView};
use crate::scene::SceneGraph;
use crate::tween::TweenAnimator;

/// Page without any hooks.
pub struct Blank;

impl Page for Blank {}

/// Shared list of `"<page>:<hook>"` entries in call order.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn record(
        &self,
        entry: String,
    ) {
        self.0.borrow_mut().push(entry);
    }

    /// Drain every entry recorded so far.
    pub fn take(&self) -> Vec<String> { self.0.borrow_mut().drain(..).collect() }
}

/// Page recording each hook call into a [`Journal`].
///
/// Classes: `Page` (defaults), `NoCache` (never cached), `Sticky` (always
/// cached), `Fade` (custom fade transition), `BadAnim` (out-of-range custom
/// transition) and `Stay` (refuses to leave on drag).
pub struct RecordingPage {
    class: &'static str,
    journal: Journal,
}

impl RecordingPage {
    fn hook(
        &self,
        view: &PageView<'_>,
        hook: &str,
    ) {
        self.journal.record(format!("{}:{}", view.name(), hook));
    }
}

impl Page for RecordingPage {
    fn on_custom_attr_config(
        &mut self,
        attrs: &mut PageAttrs,
    ) {
        self.journal.record(format!("{}:attr", self.class));
        match self.class {
            "NoCache" => attrs.set_custom_cache_enable(false),
            "Sticky" => attrs.set_custom_cache_enable(true),
            "Fade" => attrs.set_custom_load_anim(LoadAnim::FadeOn, 100, Easing::Linear),
            "BadAnim" => attrs.set_custom_load_anim_id(200, 100, Easing::Linear),
            _ => {}
        }
    }

    fn on_view_load(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        self.hook(view, "load");
        if !view.stash().is_empty() {
            self.journal.record(format!("{}:stash={:?}", view.name(), view.stash()));
        }
    }

    fn on_view_did_load(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        self.hook(view, "did_load");
    }

    fn on_view_will_appear(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        self.hook(view, "will_appear");
    }

    fn on_view_did_appear(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        self.hook(view, "did_appear");
    }

    fn on_view_will_disappear(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        self.hook(view, "will_disappear");
    }

    fn on_view_did_disappear(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        self.hook(view, "did_disappear");
    }

    fn on_view_unload(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        self.hook(view, "unload");
    }

    fn on_view_did_unload(
        &mut self,
        view: &mut PageView<'_>,
    ) {
        self.hook(view, "did_unload");
    }

    fn on_drag_leave(
        &mut self,
        view: &mut PageView<'_>,
    ) -> LeaveAction {
        self.hook(view, "leave");
        if self.class == "Stay" { LeaveAction::Stay } else { LeaveAction::Pop }
    }
}

pub struct TestFactory {
    journal: Journal,
}

impl TestFactory {
    pub fn new(journal: Journal) -> Self { Self { journal } }
}

impl PageFactory for TestFactory {
    fn create_page(
        &self,
        class_name: &str,
    ) -> Option<Box<dyn Page>> {
        let class = ["Page", "NoCache", "Sticky", "Fade", "BadAnim", "Stay"]
            .into_iter()
            .find(|c| *c == class_name)?;
        Some(Box::new(RecordingPage {
            class,
            journal: self.journal.clone(),
        }))
    }
}

/// Manager on the reference scene and animator with a recording factory.
pub fn test_manager() -> (PageManager<SceneGraph, TweenAnimator>, Journal) {
    let journal = Journal::default();
    let config = ManagerConfig::default().with_log_level(LogLevel::Trace);
    let mut manager = PageManager::new(SceneGraph::new(), TweenAnimator::new(), config);
    manager.set_factory(Box::new(TestFactory::new(journal.clone())));
    (manager, journal)
}

/// Run ticks until every running animation has finished.
pub fn settle(manager: &mut PageManager<SceneGraph, TweenAnimator>) {
    for _ in 0..4 {
        manager.tick(DEFAULT_ANIM_DURATION_MS);
    }
}

#[test]
fn test_journal_take_drains() {
    let journal = Journal::default();
    journal.record("A:load".to_string());
    assert_eq!(journal.take(), ["A:load"]);
    assert!(journal.take().is_empty());
}
