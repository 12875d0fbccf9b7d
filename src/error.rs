//! Error taxonomy for registry and router operations.
//!
//! Every failure is reported synchronously from the call that triggered it;
//! none is raised from an animation completion. Identity and configuration
//! errors leave the manager untouched. Contention errors
//! ([`PageError::TransitionBusy`], [`PageError::StackEmpty`] on pop) are
//! expected and the caller decides whether to retry.

use thiserror::Error;

/// Reason a page manager operation was rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PageError {
    /// No page factory configured (configuration error).
    #[error("page factory not configured")]
    FactoryMissing,
    #[error("page name already installed")]
    DuplicateName,
    #[error("factory cannot create page class")]
    UnknownType,
    /// No installed page or resource has this name.
    #[error("name not found")]
    NotFound,
    /// Navigation target was never installed.
    #[error("page not installed")]
    NotInstalled,
    #[error("page already on stack")]
    AlreadyOnStack,
    /// Not enough pages on the stack for the operation.
    #[error("page stack empty")]
    StackEmpty,
    /// Page must leave the stack before it can be uninstalled.
    #[error("page still in stack")]
    StillInStack,
    /// A page transition or drag animation is in flight.
    #[error("page switch busy")]
    TransitionBusy,
    /// Animation preset id out of range.
    #[error("load anim type out of range")]
    InvalidPreset,
    #[error("page pool full")]
    PoolFull,
    #[error("page stack full")]
    StackFull,
    #[error("page name too long")]
    NameTooLong,
}

impl PageError {
    /// Whether the caller may retry the same request later.
    pub const fn is_recoverable(self) -> bool { matches!(self, Self::TransitionBusy | Self::StackEmpty) }
}
