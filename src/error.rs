//! Error types surfaced by the engine.
//!
//! Structural misuse of the tree or the window stack is reported through
//! these enums so callers can propagate it with `?`; reentrancy violations
//! are not errors but panics (see `component::guard`).

use std::io;

use thiserror::Error;

use crate::component::ComponentId;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("component {0:?} does not exist")]
    Unknown(ComponentId),
    #[error("component {child:?} already has a parent")]
    AlreadyParented { child: ComponentId },
    #[error("component {child:?} is not a child of {parent:?}")]
    NotAChild {
        parent: ComponentId,
        child: ComponentId,
    },
    #[error("component {0:?} cannot be inserted into its own subtree")]
    Cycle(ComponentId),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    #[error("window {0:?} is already on the stack")]
    AlreadyPushed(ComponentId),
    #[error("window {0:?} is not the top of the stack")]
    NotOnTop(ComponentId),
    #[error("window {0:?} has a parent and cannot be a stack root")]
    NotARoot(ComponentId),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
