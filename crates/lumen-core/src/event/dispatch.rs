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

//! Compile-time routing of tagged events to heterogeneous handlers.
//!
//! A handler is anything implementing [`EventHandler`]. Two shapes are
//! supported:
//!
//! * closures (or functions) taking `&S` for some [`EventSubtype`] `S`;
//! * objects implementing [`Handle<S>`] for one or more subtypes, wired up
//!   with `#[derive(EventHandler)]` and `#[handles(S1, S2, ...)]`.
//!
//! The `Marker` parameter only exists so that both shapes can be covered by
//! blanket implementations without overlapping. A value that handles no
//! registered subtype implements neither and is rejected where it is passed.

use super::registry::EventSubtype;
use super::types::Event;
use std::marker::PhantomData;

/// A single event handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not handle any known event subtype",
    label = "not an event handler",
    note = "a handler is a closure taking `&S`, or a type deriving `EventHandler` with `#[handles(S)]`, where `S` is a registered `EventSubtype`"
)]
pub trait EventHandler<Marker> {
    /// Invokes the handler if `event` matches a subtype it accepts.
    ///
    /// Returns `true` if the handler was invoked. A handler is invoked at most
    /// once per call.
    fn handle_event(&mut self, event: &Event) -> bool;
}

/// Method-style handling of one event subtype.
///
/// Implement this once per accepted subtype and derive `EventHandler` with a
/// matching `#[handles(...)]` list.
pub trait Handle<S: EventSubtype> {
    /// Handles one event of subtype `S`.
    fn handle(&mut self, event: &S);
}

/// Marker for closures accepting `&S`.
pub struct FnHandler<S>(PhantomData<fn(&S)>);

/// Marker for objects dispatching through [`Handle`].
pub struct MethodHandler;

impl<S, F> EventHandler<FnHandler<S>> for F
where
    S: EventSubtype,
    F: FnMut(&S),
{
    fn handle_event(&mut self, event: &Event) -> bool {
        match S::view(event) {
            Some(payload) => {
                self(payload);
                true
            }
            None => false,
        }
    }
}

/// Zero or more handlers that an event is routed through.
///
/// Implemented for `()`, for any single [`EventHandler`], and for tuples of
/// up to twelve handlers of arbitrary types.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a set of event handlers",
    note = "pass `()`, one handler, or a tuple of handlers"
)]
pub trait HandlerSet<Marker> {
    /// Routes `event` through every handler and returns the number invoked.
    fn dispatch(&mut self, event: &Event) -> usize;
}

/// Marker for a [`HandlerSet`] made of exactly one handler.
pub struct SingleHandler<M>(PhantomData<M>);

/// Marker for a [`HandlerSet`] made of a tuple of handlers.
pub struct HandlerTuple<M>(PhantomData<M>);

impl HandlerSet<()> for () {
    fn dispatch(&mut self, _: &Event) -> usize {
        0
    }
}

impl<M, H: EventHandler<M>> HandlerSet<SingleHandler<M>> for H {
    fn dispatch(&mut self, event: &Event) -> usize {
        usize::from(self.handle_event(event))
    }
}

macro_rules! impl_handler_tuple {
    ($(($handler:ident, $marker:ident)),+) => {
        impl<$($marker, $handler: EventHandler<$marker>),+> HandlerSet<HandlerTuple<($($marker,)+)>>
            for ($($handler,)+)
        {
            #[allow(non_snake_case)]
            fn dispatch(&mut self, event: &Event) -> usize {
                let ($($handler,)+) = self;
                let mut delivered = 0;
                $(delivered += usize::from($handler.handle_event(event));)+
                delivered
            }
        }
    };
}

impl_handler_tuple!((H0, M0));
impl_handler_tuple!((H0, M0), (H1, M1));
impl_handler_tuple!((H0, M0), (H1, M1), (H2, M2));
impl_handler_tuple!((H0, M0), (H1, M1), (H2, M2), (H3, M3));
impl_handler_tuple!((H0, M0), (H1, M1), (H2, M2), (H3, M3), (H4, M4));
impl_handler_tuple!((H0, M0), (H1, M1), (H2, M2), (H3, M3), (H4, M4), (H5, M5));
impl_handler_tuple!(
    (H0, M0),
    (H1, M1),
    (H2, M2),
    (H3, M3),
    (H4, M4),
    (H5, M5),
    (H6, M6)
);
impl_handler_tuple!(
    (H0, M0),
    (H1, M1),
    (H2, M2),
    (H3, M3),
    (H4, M4),
    (H5, M5),
    (H6, M6),
    (H7, M7)
);
impl_handler_tuple!(
    (H0, M0),
    (H1, M1),
    (H2, M2),
    (H3, M3),
    (H4, M4),
    (H5, M5),
    (H6, M6),
    (H7, M7),
    (H8, M8)
);
impl_handler_tuple!(
    (H0, M0),
    (H1, M1),
    (H2, M2),
    (H3, M3),
    (H4, M4),
    (H5, M5),
    (H6, M6),
    (H7, M7),
    (H8, M8),
    (H9, M9)
);
impl_handler_tuple!(
    (H0, M0),
    (H1, M1),
    (H2, M2),
    (H3, M3),
    (H4, M4),
    (H5, M5),
    (H6, M6),
    (H7, M7),
    (H8, M8),
    (H9, M9),
    (H10, M10)
);
impl_handler_tuple!(
    (H0, M0),
    (H1, M1),
    (H2, M2),
    (H3, M3),
    (H4, M4),
    (H5, M5),
    (H6, M6),
    (H7, M7),
    (H8, M8),
    (H9, M9),
    (H10, M10),
    (H11, M11)
);

/// Routes `event` to every handler in `handlers` whose accepted subtype matches.
///
/// Passing `()` is a no-op. Returns the number of handlers invoked.
///
/// # Example
///
/// ```
/// use lumen_core::event::{dispatch_event, Event, KeyboardEvent, QuitEvent};
///
/// let mut quit = false;
/// let mut keys = 0;
/// let delivered = dispatch_event(
///     &Event::quit(0),
///     (
///         |_: &QuitEvent| quit = true,
///         |_: &KeyboardEvent| keys += 1,
///     ),
/// );
/// assert_eq!(delivered, 1);
/// assert!(quit);
/// assert_eq!(keys, 0);
/// ```
///
/// Anything that handles no registered subtype is rejected at compile time.
/// A closure over a type outside the registry:
///
/// ```compile_fail
/// use lumen_core::event::{dispatch_event, Event};
///
/// dispatch_event(&Event::quit(0), |_: &i32| {});
/// ```
///
/// A plain value with no handler implementation:
///
/// ```compile_fail
/// use lumen_core::event::{dispatch_event, Event};
///
/// struct Unrelated;
///
/// dispatch_event(&Event::quit(0), Unrelated);
/// ```
///
/// A derived handler that lists no subtype:
///
/// ```compile_fail
/// use lumen_core::event::{dispatch_event, Event};
///
/// #[derive(lumen_macros::EventHandler)]
/// #[handles()]
/// struct Empty;
///
/// dispatch_event(&Event::quit(0), Empty);
/// ```
///
/// The same derive with a subtype listed compiles:
///
/// ```
/// use lumen_core::event::{dispatch_event, Event, Handle, QuitEvent};
///
/// #[derive(Default, lumen_macros::EventHandler)]
/// #[handles(QuitEvent)]
/// struct OnQuit(bool);
///
/// impl Handle<QuitEvent> for OnQuit {
///     fn handle(&mut self, _: &QuitEvent) {
///         self.0 = true;
///     }
/// }
///
/// let mut on_quit = OnQuit::default();
/// assert_eq!(dispatch_event(&Event::quit(0), &mut on_quit), 1);
/// assert!(on_quit.0);
/// ```
pub fn dispatch_event<M>(event: &Event, mut handlers: impl HandlerSet<M>) -> usize {
    dispatch_with(event, &mut handlers)
}

pub(crate) fn dispatch_with<M, H>(event: &Event, handlers: &mut H) -> usize
where
    H: HandlerSet<M> + ?Sized,
{
    let delivered = handlers.dispatch(event);
    log::trace!(
        "Dispatched event {:#x} to {delivered} handler(s).",
        event.event_type().raw()
    );
    delivered
}
