//! LIFO used to thread values through recursive visitor traversals.
//!
//! Every visitor method pops exactly the value its caller pushed, so an out-of-order
//! traversal shows up as [`StackError::EmptyStack`] or [`StackError::TypeMismatch`]
//! instead of silently visiting the wrong value.

mod error;

pub use error::{StackError, StackErrorExt};

use std::fmt;
use tracing::trace;

/// A value that can travel on a [`TypedStack`].
pub trait StackValue {
    /// Coarse runtime kind used for push/pop assertions.
    type Kind: Copy + PartialEq + fmt::Debug;

    fn kind(&self) -> Self::Kind;

    /// Null-like values are refused by [`TypedStack::push`].
    fn is_null(&self) -> bool {
        false
    }
}

/// A sanity-checked stack of traversal values.
#[derive(Debug)]
pub struct TypedStack<T: StackValue> {
    items: Vec<T>,
}

impl<T: StackValue> Default for TypedStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StackValue> TypedStack<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates a stack holding `value`.
    ///
    /// # Errors
    /// See [`TypedStack::push`].
    pub fn with(value: T) -> Result<Self, StackError> {
        let mut stack = Self::new();
        stack.push(value)?;
        Ok(stack)
    }

    /// # Errors
    /// Returns [`StackError::InvariantViolation`] for null-like values.
    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        if value.is_null() {
            return Err(StackError::InvariantViolation {
                message: "Pushing null data!".into(),
                context: None,
            });
        }
        trace!(kind = ?value.kind(), depth = self.items.len() + 1, "push");
        self.items.push(value);
        Ok(())
    }

    /// Pushes `value`, asserting its kind.
    ///
    /// # Errors
    /// Returns [`StackError::InvariantViolation`] for null-like values or the wrong kind.
    pub fn push_expecting(&mut self, value: T, expected: T::Kind) -> Result<(), StackError> {
        let found = value.kind();
        if found != expected {
            return Err(StackError::InvariantViolation {
                message: format!(
                    "Did not find expected type {expected:?} as argument to push. Found: {found:?}"
                )
                .into(),
                context: None,
            });
        }
        self.push(value)
    }

    /// # Errors
    /// Returns [`StackError::EmptyStack`] when nothing is left.
    pub fn pop(&mut self) -> Result<T, StackError> {
        let value = self.items.pop().ok_or_else(empty)?;
        trace!(kind = ?value.kind(), depth = self.items.len(), "pop");
        Ok(value)
    }

    /// Pops the top value, asserting its kind. A mismatched value stays on the stack.
    ///
    /// # Errors
    /// Returns [`StackError::EmptyStack`] or [`StackError::TypeMismatch`].
    pub fn pop_expecting(&mut self, expected: T::Kind) -> Result<T, StackError> {
        self.peek_expecting(expected)?;
        self.pop()
    }

    /// # Errors
    /// Returns [`StackError::EmptyStack`] when nothing is left.
    pub fn peek(&self) -> Result<&T, StackError> {
        self.items.last().ok_or_else(empty)
    }

    /// # Errors
    /// Returns [`StackError::EmptyStack`] or [`StackError::TypeMismatch`].
    pub fn peek_expecting(&self, expected: T::Kind) -> Result<&T, StackError> {
        let top = self.peek()?;
        let found = top.kind();
        if found == expected {
            Ok(top)
        } else {
            Err(StackError::TypeMismatch {
                message: format!(
                    "Did not find expected type {expected:?} on the stack. Found: {found:?}"
                )
                .into(),
                context: None,
            })
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn empty() -> StackError {
    StackError::EmptyStack { message: "Stack is empty!".into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Slot {
        Null,
        Number(i32),
        Text(&'static str),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SlotKind {
        Null,
        Number,
        Text,
    }

    impl StackValue for Slot {
        type Kind = SlotKind;

        fn kind(&self) -> SlotKind {
            match self {
                Self::Null => SlotKind::Null,
                Self::Number(_) => SlotKind::Number,
                Self::Text(_) => SlotKind::Text,
            }
        }

        fn is_null(&self) -> bool {
            matches!(self, Self::Null)
        }
    }

    #[test]
    fn push_and_pop_are_symmetric() -> Result<(), StackError> {
        let mut stack = TypedStack::with(Slot::Number(1))?;
        stack.push(Slot::Text("a"))?;
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek()?, &Slot::Text("a"));
        assert_eq!(stack.pop()?, Slot::Text("a"));
        assert_eq!(stack.pop_expecting(SlotKind::Number)?, Slot::Number(1));
        assert!(stack.is_empty());
        Ok(())
    }

    #[test]
    fn null_values_are_refused() {
        let mut stack = TypedStack::new();
        let err = stack.push(Slot::Null).expect_err("null push");
        assert!(matches!(err, StackError::InvariantViolation { .. }));
        assert!(stack.is_empty());
    }

    #[test]
    fn push_asserts_the_kind() {
        let mut stack = TypedStack::new();
        let err = stack.push_expecting(Slot::Number(3), SlotKind::Text).expect_err("wrong kind");
        assert!(matches!(err, StackError::InvariantViolation { .. }));
        assert!(err.to_string().contains("Found: Number"));
    }

    #[test]
    fn pop_reports_empty_and_mismatch() -> Result<(), StackError> {
        let mut stack = TypedStack::<Slot>::new();
        assert!(matches!(stack.pop(), Err(StackError::EmptyStack { .. })));
        assert!(matches!(stack.peek(), Err(StackError::EmptyStack { .. })));

        stack.push(Slot::Text("x"))?;
        let err = stack.pop_expecting(SlotKind::Number).expect_err("mismatch");
        assert!(matches!(err, StackError::TypeMismatch { .. }));
        assert_eq!(stack.len(), 1, "a mismatched value stays on the stack");

        stack.clear();
        assert!(stack.is_empty());
        Ok(())
    }
}
