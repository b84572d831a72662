//! Reentrancy guard for dispatch contexts that must not reshape the tree.
//!
//! While the dispatcher synthesizes enter/leave pairs or propagates renderer
//! notifications it holds a [`ForbidGuard`]. Any structural mutation that
//! intersects the active mask panics: such a call is a programming error in
//! a component, not a recoverable condition.

use std::ops::{Deref, DerefMut};

use bitflags::bitflags;

use super::Tree;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Forbid: u8 {
        const INSERT = 1 << 0;
        const REMOVE = 1 << 1;
        const GEOMETRY = 1 << 2;
        const ZORDER = 1 << 3;
        const STRUCTURE = Self::INSERT.bits() | Self::REMOVE.bits() | Self::GEOMETRY.bits();
    }
}

/// Scoped mask on a [`Tree`]; the mask is lifted when the guard drops,
/// including during unwinding.
pub struct ForbidGuard<'a> {
    tree: &'a mut Tree,
}

impl Tree {
    pub fn forbid(&mut self, mask: Forbid) -> ForbidGuard<'_> {
        self.forbidden.push(mask);
        ForbidGuard { tree: self }
    }

    /// Union of all currently active masks.
    pub fn forbidden(&self) -> Forbid {
        self.forbidden
            .iter()
            .fold(Forbid::empty(), |acc, mask| acc | *mask)
    }

    pub(crate) fn check_allowed(&self, op: Forbid, what: &str) {
        let active = self.forbidden();
        if active.intersects(op) {
            panic!("{what} is not allowed in this dispatch context (forbidden: {active:?})");
        }
    }
}

impl Deref for ForbidGuard<'_> {
    type Target = Tree;

    fn deref(&self) -> &Tree {
        self.tree
    }
}

impl DerefMut for ForbidGuard<'_> {
    fn deref_mut(&mut self) -> &mut Tree {
        self.tree
    }
}

impl Drop for ForbidGuard<'_> {
    fn drop(&mut self) {
        self.tree.forbidden.pop();
    }
}
