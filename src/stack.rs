//! Navigation stack: screen history as a LIFO of page handles.
//!
//! The stack references pages; the registry owns them.

use heapless::Vec;

use crate::config::STACK_DEPTH;
use crate::error::PageError;
use crate::registry::PageHandle;

#[derive(Default)]
pub(crate) struct PageStack {
    items: Vec<PageHandle, STACK_DEPTH>,
}

impl PageStack {
    pub const fn new() -> Self { Self { items: Vec::new() } }

    pub fn push(
        &mut self,
        handle: PageHandle,
    ) -> Result<(), PageError> {
        self.items.push(handle).map_err(|_| PageError::StackFull)
    }

    pub fn pop(&mut self) -> Option<PageHandle> { self.items.pop() }

    #[inline]
    pub fn top(&self) -> Option<PageHandle> { self.items.last().copied() }

    /// Entry directly beneath the top.
    pub fn top_after(&self) -> Option<PageHandle> {
        let len = self.items.len();
        if len < 2 { None } else { Some(self.items[len - 2]) }
    }

    #[inline]
    pub fn bottom(&self) -> Option<PageHandle> { self.items.first().copied() }

    pub fn contains(
        &self,
        handle: PageHandle,
    ) -> bool {
        self.items.contains(&handle)
    }

    /// Entries from bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = PageHandle> + '_ { self.items.iter().copied() }

    #[inline]
    pub fn len(&self) -> usize { self.items.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    #[inline]
    pub fn is_full(&self) -> bool { self.items.is_full() }
}
