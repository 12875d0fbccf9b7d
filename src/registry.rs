//! Name-keyed pool of installed pages.
//!
//! Lookup and duplicate detection are linear scans; the pool makes no
//! ordering guarantee. Entities are addressed by a [`PageHandle`] that stays
//! valid until the page is uninstalled.

use alloc::boxed::Box;

use heapless::Vec;

use crate::config::MAX_PAGES;
use crate::entity::{PageEntity, PageName};
use crate::error::PageError;
use crate::page::Page;

/// Stable handle to an installed page.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageHandle(pub(crate) u16);

impl PageHandle {
    /// Raw handle value.
    #[inline]
    pub const fn raw(self) -> u16 { self.0 }
}

pub(crate) struct Registry {
    pages: Vec<PageEntity, MAX_PAGES>,
    next_handle: u16,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            pages: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn find(
        &self,
        name: &str,
    ) -> Option<PageHandle> {
        self.pages.iter().find(|p| p.name.as_str() == name).map(|p| p.handle)
    }

    pub fn get(
        &self,
        handle: PageHandle,
    ) -> Option<&PageEntity> {
        self.pages.iter().find(|p| p.handle == handle)
    }

    pub fn get_mut(
        &mut self,
        handle: PageHandle,
    ) -> Option<&mut PageEntity> {
        self.pages.iter_mut().find(|p| p.handle == handle)
    }

    /// Add a page under `name`.
    pub fn register(
        &mut self,
        name: &str,
        page: Box<dyn Page>,
    ) -> Result<PageHandle, PageError> {
        if self.find(name).is_some() {
            return Err(PageError::DuplicateName);
        }
        if self.pages.is_full() {
            return Err(PageError::PoolFull);
        }
        let mut page_name = PageName::new();
        page_name.push_str(name).map_err(|_| PageError::NameTooLong)?;

        let handle = self.alloc_handle();
        self.pages
            .push(PageEntity::new(handle, page_name, page))
            .map_err(|_| PageError::PoolFull)?;
        Ok(handle)
    }

    /// Remove a page, handing back its entity.
    pub fn unregister(
        &mut self,
        handle: PageHandle,
    ) -> Option<PageEntity> {
        let pos = self.pages.iter().position(|p| p.handle == handle)?;
        Some(self.pages.swap_remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageEntity> { self.pages.iter() }

    #[inline]
    pub fn len(&self) -> usize { self.pages.len() }

    // Skips handles still in use after the counter wraps.
    fn alloc_handle(&mut self) -> PageHandle {
        loop {
            let handle = PageHandle(self.next_handle);
            self.next_handle = self.next_handle.wrapping_add(1);
            if self.get(handle).is_none() {
                return handle;
            }
        }
    }
}
