//! Name-keyed resource lookup with a default fallback.
//!
//! Pages use a pool to share fonts, images or other assets by name. Lookups
//! of unknown names return the configured default instead of failing, so a
//! missing asset degrades to a placeholder rather than an empty widget.

use alloc::vec::Vec;

use crate::error::PageError;

/// Named resources plus an optional default.
pub struct ResourcePool<T> {
    nodes: Vec<(&'static str, T)>,
    default: Option<T>,
}

impl<T> ResourcePool<T> {
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            default: None,
        }
    }

    /// Register `item` under `name`.
    pub fn add(
        &mut self,
        name: &'static str,
        item: T,
    ) -> Result<(), PageError> {
        if self.contains(name) {
            return Err(PageError::DuplicateName);
        }
        self.nodes.push((name, item));
        Ok(())
    }

    /// Remove and return the resource registered under `name`.
    pub fn remove(
        &mut self,
        name: &str,
    ) -> Result<T, PageError> {
        let index = self
            .nodes
            .iter()
            .position(|(n, _)| *n == name)
            .ok_or(PageError::NotFound)?;
        Ok(self.nodes.remove(index).1)
    }

    /// Resource registered under `name`, or the default when there is none.
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&T> {
        self.nodes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, item)| item)
            .or(self.default.as_ref())
    }

    /// Set the resource returned for unknown names.
    pub fn set_default(
        &mut self,
        item: T,
    ) {
        self.default = Some(item);
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.nodes.iter().any(|(n, _)| *n == name)
    }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }
}

impl<T> Default for ResourcePool<T> {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Tests
// =============================================================================
