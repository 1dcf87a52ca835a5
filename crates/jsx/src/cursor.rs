//! Stack of insertion points.
//!
//! The stack is a persistent linked list: copying it is O(1) and a copy never
//! observes pushes or pops made on another copy. The async engine hands each
//! concurrent branch its own copy, so suspension cannot leak one branch's
//! position into a sibling.

use crate::error::RenderError;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

struct Frame<N> {
    node: N,
    below: Option<Rc<Frame<N>>>,
}

pub struct CursorStack<N> {
    top: Option<Rc<Frame<N>>>,
    depth: usize,
}

impl<N> Clone for CursorStack<N> {
    fn clone(&self) -> Self {
        CursorStack {
            top: self.top.clone(),
            depth: self.depth,
        }
    }
}

impl<N> Default for CursorStack<N> {
    fn default() -> Self {
        CursorStack {
            top: None,
            depth: 0,
        }
    }
}

impl<N: Copy> CursorStack<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: N) -> Self {
        let mut stack = Self::new();
        stack.push(root);
        stack
    }

    /// The insertion point for new nodes.
    pub fn current(&self) -> Result<N, RenderError> {
        self.top
            .as_ref()
            .map(|frame| frame.node)
            .ok_or(RenderError::EmptyCursorStack)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    pub fn push(&mut self, node: N) {
        let below = self.top.take();
        self.top = Some(Rc::new(Frame { node, below }));
        self.depth += 1;
    }

    pub fn pop(&mut self) -> Option<N> {
        let frame = self.top.take()?;
        self.top = frame.below.clone();
        self.depth -= 1;
        Some(frame.node)
    }

    /// A copy of this stack with `node` pushed; `self` is unchanged.
    pub fn pushed(&self, node: N) -> Self {
        let mut copy = self.clone();
        copy.push(node);
        copy
    }

    /// Nodes from the bottom of the stack to the top.
    pub fn path(&self) -> Vec<N> {
        let mut path = Vec::with_capacity(self.depth);
        let mut frame = self.top.as_deref();
        while let Some(current) = frame {
            path.push(current.node);
            frame = current.below.as_deref();
        }
        path.reverse();
        path
    }

    /// Runs `f` with `node` pushed, restoring the previous stack afterwards,
    /// including when `f` fails or unwinds.
    pub fn scoped<R>(&mut self, node: N, f: impl FnOnce(&mut CursorStack<N>) -> R) -> R {
        let saved = self.clone();
        self.push(node);
        let mut guard = Restore {
            stack: self,
            saved: Some(saved),
        };
        f(&mut *guard)
    }
}

struct Restore<'a, N> {
    stack: &'a mut CursorStack<N>,
    saved: Option<CursorStack<N>>,
}

impl<N> Deref for Restore<'_, N> {
    type Target = CursorStack<N>;

    fn deref(&self) -> &CursorStack<N> {
        &*self.stack
    }
}

impl<N> DerefMut for Restore<'_, N> {
    fn deref_mut(&mut self) -> &mut CursorStack<N> {
        &mut *self.stack
    }
}

impl<N> Drop for Restore<'_, N> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.stack = saved;
        }
    }
}
