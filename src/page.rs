//! Page contract: lifecycle hooks, per-page attributes and the hook view.
//!
//! A concrete page implements [`Page`] and is created by name through a
//! [`PageFactory`]. The manager owns every page behind `Box<dyn Page>` and
//! calls its hooks in lifecycle order:
//!
//! ```text
//! on_custom_attr_config            (once, at install)
//! on_view_load -> on_view_did_load
//! on_view_will_appear -> on_view_did_appear
//! on_view_will_disappear -> on_view_did_disappear
//! on_view_unload -> on_view_did_unload
//! ```
//!
//! A cached page skips the load hooks when it re-appears. All hooks default
//! to no-ops.

use alloc::boxed::Box;
use core::any::Any;

use crate::anim::{AnimSpec, Easing, LoadAnim};
use crate::error::PageError;
use crate::scene::{SceneBackend, SceneId};

// =============================================================================
// Lifecycle State
// =============================================================================

/// Lifecycle state of an installed page.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PageState {
    /// Not loaded.
    #[default]
    Idle,
    /// Building its scene.
    Load,
    /// Appearing (animation in flight), or cached and hidden waiting to re-appear.
    WillAppear,
    DidAppear,
    /// Active page on screen.
    Activity,
    /// Disappearing (animation in flight).
    WillDisappear,
    DidDisappear,
    /// Tearing down its scene.
    Unload,
}

impl PageState {
    /// Whether a page in this state owns a scene root.
    pub const fn is_loaded(self) -> bool { !matches!(self, Self::Idle | Self::Unload) }
}

/// What to do after a drag predicted the page is being thrown out.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LeaveAction {
    /// Pop the page if it is still on top of the stack.
    #[default]
    Pop,
    /// Keep the page where it was dropped.
    Stay,
}

// =============================================================================
// Page Trait
// =============================================================================

/// Lifecycle hooks of a page.
pub trait Page {
    /// Configure caching and transition attributes. Called once at install.
    fn on_custom_attr_config(
        &mut self,
        _attrs: &mut PageAttrs,
    ) {
    }

    /// Build the view under [`PageView::root`].
    fn on_view_load(
        &mut self,
        _view: &mut PageView<'_>,
    ) {
    }

    fn on_view_did_load(
        &mut self,
        _view: &mut PageView<'_>,
    ) {
    }

    fn on_view_will_appear(
        &mut self,
        _view: &mut PageView<'_>,
    ) {
    }

    fn on_view_did_appear(
        &mut self,
        _view: &mut PageView<'_>,
    ) {
    }

    fn on_view_will_disappear(
        &mut self,
        _view: &mut PageView<'_>,
    ) {
    }

    fn on_view_did_disappear(
        &mut self,
        _view: &mut PageView<'_>,
    ) {
    }

    /// Release anything built in [`Page::on_view_load`]. The root is deleted afterwards.
    fn on_view_unload(
        &mut self,
        _view: &mut PageView<'_>,
    ) {
    }

    fn on_view_did_unload(
        &mut self,
        _view: &mut PageView<'_>,
    ) {
    }

    /// The page was dragged far enough to be thrown out.
    fn on_drag_leave(
        &mut self,
        _view: &mut PageView<'_>,
    ) -> LeaveAction {
        LeaveAction::Pop
    }
}

/// Creates pages by class name.
pub trait PageFactory {
    /// Return `None` for unknown class names.
    fn create_page(
        &self,
        class_name: &str,
    ) -> Option<Box<dyn Page>>;
}

// =============================================================================
// Page Attributes
// =============================================================================

/// Per-page configuration set from the hooks.
///
/// Cache requests take effect the next time the page is pushed. The custom
/// transition is stored as a raw preset id and validated when a transition
/// resolves it; an out-of-range id falls back to the manager-wide default.
#[derive(Default)]
pub struct PageAttrs {
    anim_id: u8,
    anim_duration_ms: u32,
    anim_easing: Easing,
    req_disable_auto_cache: bool,
    req_enable_cache: bool,
    id: Option<u32>,
    user_data: Option<Box<dyn Any>>,
}

impl PageAttrs {
    pub fn new() -> Self { Self::default() }

    /// Explicitly cache (or never cache) the page, disabling auto-cache.
    pub fn set_custom_cache_enable(
        &mut self,
        enable: bool,
    ) {
        self.set_custom_auto_cache_enable(false);
        self.req_enable_cache = enable;
    }

    /// Auto-cache keeps a page loaded while it is covered and tears it down
    /// when it is popped. Enabled by default.
    pub fn set_custom_auto_cache_enable(
        &mut self,
        enable: bool,
    ) {
        self.req_disable_auto_cache = !enable;
    }

    /// Use a dedicated transition when this page is entered.
    pub fn set_custom_load_anim(
        &mut self,
        anim: LoadAnim,
        duration_ms: u32,
        easing: Easing,
    ) {
        self.set_custom_load_anim_id(anim.id(), duration_ms, easing);
    }

    /// Raw-id variant of [`PageAttrs::set_custom_load_anim`] for table-driven pages.
    pub fn set_custom_load_anim_id(
        &mut self,
        anim_id: u8,
        duration_ms: u32,
        easing: Easing,
    ) {
        self.anim_id = anim_id;
        self.anim_duration_ms = duration_ms;
        self.anim_easing = easing;
    }

    /// Configured transition. `LoadAnim::Global` means "use the manager default".
    pub fn custom_load_anim(&self) -> Result<AnimSpec, PageError> {
        let anim = LoadAnim::try_from(self.anim_id)?;
        Ok(AnimSpec::new(anim, self.anim_duration_ms, self.anim_easing))
    }

    #[inline]
    pub const fn custom_load_anim_id(&self) -> u8 { self.anim_id }

    #[inline]
    pub const fn req_disable_auto_cache(&self) -> bool { self.req_disable_auto_cache }

    #[inline]
    pub const fn req_enable_cache(&self) -> bool { self.req_enable_cache }

    pub fn set_id(
        &mut self,
        id: u32,
    ) {
        self.id = Some(id);
    }

    #[inline]
    pub const fn id(&self) -> Option<u32> { self.id }

    pub fn set_user_data<T: Any>(
        &mut self,
        data: T,
    ) {
        self.user_data = Some(Box::new(data));
    }

    /// User data, if it was set with type `T`.
    pub fn user_data<T: Any>(&self) -> Option<&T> { self.user_data.as_ref()?.downcast_ref() }

    pub fn user_data_mut<T: Any>(&mut self) -> Option<&mut T> { self.user_data.as_mut()?.downcast_mut() }
}

// =============================================================================
// Page View
// =============================================================================

/// What a hook can see and touch of its own page.
pub struct PageView<'a> {
    name: &'a str,
    root: Option<SceneId>,
    stash: &'a [u8],
    attrs: &'a mut PageAttrs,
    scene: &'a mut dyn SceneBackend,
}

impl<'a> PageView<'a> {
    pub(crate) fn new(
        name: &'a str,
        root: Option<SceneId>,
        stash: &'a [u8],
        attrs: &'a mut PageAttrs,
        scene: &'a mut dyn SceneBackend,
    ) -> Self {
        Self {
            name,
            root,
            stash,
            attrs,
            scene,
        }
    }

    /// Installed name of the page.
    #[inline]
    pub fn name(&self) -> &str { self.name }

    /// Scene root of the page. `None` only in `on_view_did_unload`.
    #[inline]
    pub const fn root(&self) -> Option<SceneId> { self.root }

    /// Bytes passed by the last navigation call that carried a stash.
    #[inline]
    pub fn stash(&self) -> &[u8] { self.stash }

    /// Stash as a fixed-size array. Fails unless the size matches exactly.
    pub fn stash_array<const N: usize>(&self) -> Option<[u8; N]> { self.stash.try_into().ok() }

    pub fn attrs(&mut self) -> &mut PageAttrs { &mut *self.attrs }

    pub fn scene(&mut self) -> &mut (dyn SceneBackend + 'a) { &mut *self.scene }
}

// =============================================================================
// Tests
// =============================================================================
