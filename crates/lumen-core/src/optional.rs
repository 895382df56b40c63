// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A value-or-nothing container with loud failure on misuse.
//!
//! [`Optional`] is used wherever an operation may legitimately produce no
//! value: a timed wait that expires, an exhausted user-event range, a
//! missing target rectangle. It is a thin layer over [`Option`] whose
//! checked accessor reports [`BadOptionalAccess`] instead of returning
//! `None`, so call sites that expect a value fail with a typed error.

use std::fmt;

/// The "no value" marker. Assigning it to an [`Optional`] disengages it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Nothing;

/// The canonical [`Nothing`] value.
pub const NOTHING: Nothing = Nothing;

/// Error returned when the value of a disengaged [`Optional`] is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bad optional access: the Optional holds no value")]
pub struct BadOptionalAccess;

/// A container holding zero or one `T`, with explicit engagement state.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Optional<T> {
    inner: Option<T>,
}

impl<T> Optional<T> {
    /// Creates a disengaged `Optional`.
    pub const fn none() -> Self {
        Self { inner: None }
    }

    /// Creates an engaged `Optional` holding `value`.
    pub const fn some(value: T) -> Self {
        Self { inner: Some(value) }
    }

    /// Returns `true` if a value is held.
    pub fn has_value(&self) -> bool {
        self.inner.is_some()
    }

    /// Returns a reference to the held value.
    ///
    /// # Errors
    /// Returns [`BadOptionalAccess`] if the `Optional` is disengaged.
    pub fn value(&self) -> Result<&T, BadOptionalAccess> {
        self.inner.as_ref().ok_or(BadOptionalAccess)
    }

    /// Returns a mutable reference to the held value.
    ///
    /// # Errors
    /// Returns [`BadOptionalAccess`] if the `Optional` is disengaged.
    pub fn value_mut(&mut self) -> Result<&mut T, BadOptionalAccess> {
        self.inner.as_mut().ok_or(BadOptionalAccess)
    }

    /// Consumes the `Optional` and returns the held value.
    ///
    /// # Errors
    /// Returns [`BadOptionalAccess`] if the `Optional` is disengaged.
    pub fn into_value(self) -> Result<T, BadOptionalAccess> {
        self.inner.ok_or(BadOptionalAccess)
    }

    /// Returns the held value, or `default` when disengaged.
    pub fn value_or(self, default: T) -> T {
        self.inner.unwrap_or(default)
    }

    /// Borrows the contents as a plain [`Option`].
    pub fn get(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    /// Engages the `Optional` with `value`, dropping any previously held value.
    pub fn set(&mut self, value: T) {
        self.inner = Some(value);
    }

    /// Engages the `Optional` with `value` and returns a reference to it.
    pub fn emplace(&mut self, value: T) -> &mut T {
        self.inner.insert(value)
    }

    /// Disengages the `Optional`, dropping the held value if any.
    pub fn reset(&mut self) {
        self.inner = None;
    }

    /// Assigns "no value", disengaging the `Optional`.
    pub fn assign(&mut self, _: Nothing) {
        self.reset();
    }

    /// Moves the held value out, leaving the `Optional` disengaged.
    pub fn take(&mut self) -> Optional<T> {
        Optional {
            inner: self.inner.take(),
        }
    }

    /// Maps the held value, preserving engagement.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Optional<U> {
        Optional {
            inner: self.inner.map(f),
        }
    }

    /// Converts into a plain [`Option`].
    pub fn into_option(self) -> Option<T> {
        self.inner
    }
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: fmt::Debug> fmt::Debug for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(value) => f.debug_tuple("Optional").field(value).finish(),
            None => f.write_str("Nothing"),
        }
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(inner: Option<T>) -> Self {
        Self { inner }
    }
}

impl<T> From<Nothing> for Optional<T> {
    fn from(_: Nothing) -> Self {
        Self::none()
    }
}

impl<T> From<Optional<T>> for Option<T> {
    fn from(optional: Optional<T>) -> Self {
        optional.inner
    }
}

impl<T> PartialEq<Nothing> for Optional<T> {
    fn eq(&self, _: &Nothing) -> bool {
        self.inner.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn default_is_disengaged_and_access_fails() {
        let opt: Optional<i32> = Optional::default();
        assert!(!opt.has_value());
        assert_eq!(opt.value(), Err(BadOptionalAccess));
        assert_eq!(opt, NOTHING);
    }

    #[test]
    fn assigning_engages_and_nothing_disengages() {
        let mut opt = Optional::none();
        opt.set(42);
        assert!(opt.has_value());
        assert_eq!(opt.value(), Ok(&42));

        opt.assign(NOTHING);
        assert!(!opt.has_value());
        assert_eq!(opt.value(), Err(BadOptionalAccess));
    }

    #[test]
    fn reset_drops_the_held_value() {
        let tracked = Rc::new(());
        let mut opt = Optional::some(Rc::clone(&tracked));
        assert_eq!(Rc::strong_count(&tracked), 2);
        opt.reset();
        assert_eq!(Rc::strong_count(&tracked), 1);
    }

    #[test]
    fn clone_is_deep_and_preserves_engagement() {
        let original = Optional::some(vec![1, 2, 3]);
        let mut copy = original.clone();
        copy.value_mut().expect("engaged").push(4);
        assert_eq!(original.value(), Ok(&vec![1, 2, 3]));
        assert_eq!(copy.value(), Ok(&vec![1, 2, 3, 4]));

        let empty: Optional<Vec<i32>> = Optional::none();
        assert!(!empty.clone().has_value());
    }

    #[test]
    fn take_moves_out_and_disengages_source() {
        let mut source = Optional::some(String::from("rect"));
        let moved = source.take();
        assert_eq!(moved.value().map(String::as_str), Ok("rect"));
        assert!(!source.has_value());
    }

    #[test]
    fn conversions_with_option() {
        let opt: Optional<u8> = Some(7).into();
        assert_eq!(opt.get(), Some(&7));
        let back: Option<u8> = opt.into();
        assert_eq!(back, Some(7));
        let none: Optional<u8> = NOTHING.into();
        assert_eq!(none.value_or(3), 3);
    }

    #[test]
    fn emplace_returns_mutable_reference() {
        let mut opt = Optional::none();
        *opt.emplace(10) += 5;
        assert_eq!(opt.into_value(), Ok(15));
    }

    #[test]
    fn debug_output_reflects_engagement() {
        assert_eq!(format!("{:?}", Optional::some(1)), "Optional(1)");
        assert_eq!(format!("{:?}", Optional::<i32>::none()), "Nothing");
    }
}
