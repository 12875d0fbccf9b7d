//! Installed page record: identity, lifecycle state, cache flags and stash.

use alloc::boxed::Box;
use alloc::vec::Vec;

use heapless::String;

use crate::config::PAGE_NAME_LEN;
use crate::page::{Page, PageAttrs, PageState, PageView};
use crate::registry::PageHandle;
use crate::scene::{SceneBackend, SceneId};

/// Fixed-capacity page name.
pub(crate) type PageName = String<PAGE_NAME_LEN>;

// =============================================================================
// Stash
// =============================================================================

/// Reusable parameter buffer copied in by navigation calls.
#[derive(Default)]
pub(crate) struct Stash {
    buf: Vec<u8>,
}

/// How [`Stash::store`] placed the new bytes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum StashStore {
    /// Copied over a previous stash of the same size.
    Reused,
    /// Previous buffer (if any) freed and a new one allocated.
    Allocated,
}

impl Stash {
    pub fn store(
        &mut self,
        data: &[u8],
    ) -> StashStore {
        if !self.buf.is_empty() && self.buf.len() == data.len() {
            self.buf.copy_from_slice(data);
            StashStore::Reused
        } else {
            self.buf = data.to_vec();
            StashStore::Allocated
        }
    }

    /// Free the buffer, returning the size it had.
    pub fn free(&mut self) -> usize {
        let len = self.buf.len();
        self.buf = Vec::new();
        len
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] { &self.buf }

    #[inline]
    pub fn len(&self) -> usize { self.buf.len() }
}

// =============================================================================
// Page Entity
// =============================================================================

pub(crate) struct PageEntity {
    pub handle: PageHandle,
    pub name: PageName,
    pub page: Box<dyn Page>,
    pub attrs: PageAttrs,
    pub state: PageState,
    /// Scene root, present while the page is loaded.
    pub root: Option<SceneId>,
    pub stash: Stash,
    pub is_cached: bool,
    /// Latched from the attribute request when the page is pushed.
    pub is_disable_auto_cache: bool,
    /// Entering (vs. exiting) side of the current transition.
    pub is_enter: bool,
    /// Own switch animation in flight.
    pub is_busy: bool,
    pub drag_enabled: bool,
}

impl PageEntity {
    pub fn new(
        handle: PageHandle,
        name: PageName,
        page: Box<dyn Page>,
    ) -> Self {
        Self {
            handle,
            name,
            page,
            attrs: PageAttrs::new(),
            state: PageState::Idle,
            root: None,
            stash: Stash::default(),
            is_cached: false,
            is_disable_auto_cache: false,
            is_enter: false,
            is_busy: false,
            drag_enabled: false,
        }
    }

    /// Run a hook with a view over this page.
    pub fn with_view<R>(
        &mut self,
        scene: &mut dyn SceneBackend,
        f: impl FnOnce(&mut dyn Page, &mut PageView<'_>) -> R,
    ) -> R {
        let mut view = PageView::new(self.name.as_str(), self.root, self.stash.as_slice(), &mut self.attrs, scene);
        f(self.page.as_mut(), &mut view)
    }
}
