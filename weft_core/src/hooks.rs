// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-component state, keyed by call order.
//!
//! A component function receives a [`Hooks`] context for the duration of one
//! evaluation. Each `use_*` call appends one record to the fiber's hook list
//! and reads the record at the same ordinal from the previous render's
//! alternate fiber. Identity is therefore purely positional: hooks must be
//! called in the same order and number on every render of a component.
//! Calling a hook conditionally shifts every later ordinal and silently
//! associates state with the wrong call site — until a type mismatch or a
//! debug-build count assertion turns it into a panic.
//!
//! State updates are deferred: a [`Setter`] pushes an update function onto the
//! hook's queue and raises the renderer's update-request flag. The next render
//! of the component folds the queued updates, oldest first, into the previous
//! state. Several setter calls before one render coalesce into a single pass.
//!
//! A setter captures the queue of the render that produced it. After the next
//! commit the live queue is the new render's; a setter retained from an older
//! render pushes into an orphaned queue and its updates are lost. Re-capture
//! setters each render (event handlers rebuilt per render do this naturally).

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::marker::PhantomData;

use smallvec::SmallVec;

use crate::element::EventHandler;
use crate::fiber::{FiberStore, INVALID};
use crate::renderer::ActiveComponent;

/// Type-erased hook state.
pub(crate) type StateValue = Rc<dyn Any>;

/// A queued state transition.
pub(crate) type Update = Box<dyn FnOnce(StateValue) -> StateValue>;

/// Shared queue of pending updates for one state hook.
pub(crate) type UpdateQueue = Rc<RefCell<Vec<Update>>>;

/// A fiber's hook records, in call order. Most components use a handful.
pub(crate) type HookList = SmallVec<[Hook; 4]>;

/// One hook record.
#[derive(Clone)]
pub(crate) enum Hook {
    /// `use_state` / `use_reducer`: current value plus pending updates.
    State {
        state: StateValue,
        queue: UpdateQueue,
    },
    /// `use_effect`: the dependency list the effect last ran with.
    Effect { deps: Option<Deps> },
    /// `use_memo` and derivatives: cached value plus its dependency list.
    Memo {
        value: StateValue,
        deps: Option<Deps>,
    },
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State { queue, .. } => f
                .debug_struct("State")
                .field("pending", &queue.borrow().len())
                .finish_non_exhaustive(),
            Self::Effect { deps } => f.debug_struct("Effect").field("deps", deps).finish(),
            Self::Memo { deps, .. } => f
                .debug_struct("Memo")
                .field("deps", deps)
                .finish_non_exhaustive(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dependency lists
// ---------------------------------------------------------------------------

/// A dependency list for [`Hooks::use_effect`] and [`Hooks::use_memo`].
pub type Deps = SmallVec<[Dep; 4]>;

/// Collects dependency values into a [`Deps`] list.
///
/// ```
/// use weft_core::{Dep, deps};
///
/// let d = deps([Dep::from(3), Dep::from("label")]);
/// assert_eq!(d.len(), 2);
/// ```
#[must_use]
pub fn deps(items: impl IntoIterator<Item = Dep>) -> Deps {
    items.into_iter().collect()
}

/// One comparable dependency value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dep {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Boolean.
    Bool(bool),
    /// String.
    Text(String),
    /// Raw bits, e.g. a float's bit pattern.
    Bits(u64),
}

impl From<i64> for Dep {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Dep {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for Dep {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<u32> for Dep {
    fn from(v: u32) -> Self {
        Self::Uint(u64::from(v))
    }
}

impl From<bool> for Dep {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Dep {
    fn from(v: &str) -> Self {
        Self::Text(String::from(v))
    }
}

impl From<String> for Dep {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<f64> for Dep {
    fn from(v: f64) -> Self {
        Self::Bits(v.to_bits())
    }
}

/// Positional dependency comparison. A missing list on either side counts as
/// changed, so a hook with no dependency list fires every render.
fn deps_changed(old: Option<&Deps>, new: Option<&Deps>) -> bool {
    match (old, new) {
        (Some(a), Some(b)) => a.len() != b.len() || a.iter().zip(b.iter()).any(|(x, y)| x != y),
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Setter / Dispatch
// ---------------------------------------------------------------------------

/// Queues updates for one state hook.
///
/// Cheap to clone; safe to move into event handlers. Calling it never touches
/// the fiber tree directly — it enqueues the transition and asks the renderer
/// for a new pass.
pub struct Setter<T> {
    queue: UpdateQueue,
    request: Rc<Cell<bool>>,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            request: self.request.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("pending", &self.queue.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Setter<T> {
    /// Replaces the state with `value` on the next render.
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    /// Queues a transition computed from the previous state.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.queue.borrow_mut().push(Box::new(move |state| {
            let prev = state
                .downcast::<T>()
                .unwrap_or_else(|_| panic!("state hook type changed between renders"));
            Rc::new(f(&prev)) as StateValue
        }));
        self.request.set(true);
    }
}

/// Dispatches actions to a [`Hooks::use_reducer`] hook.
pub struct Dispatch<A> {
    inner: Rc<dyn Fn(A)>,
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch").finish_non_exhaustive()
    }
}

impl<A> Dispatch<A> {
    /// Queues `action` for the next render.
    pub fn dispatch(&self, action: A) {
        (self.inner)(action);
    }
}

// ---------------------------------------------------------------------------
// Hooks context
// ---------------------------------------------------------------------------

/// Hook context handed to a component for one evaluation.
///
/// Obtainable only while the renderer is evaluating a component; see
/// [`Renderer::hooks`](crate::Renderer::hooks).
pub struct Hooks<'a> {
    store: &'a mut FiberStore,
    active: &'a mut ActiveComponent,
    request: Rc<Cell<bool>>,
}

impl fmt::Debug for Hooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("cursor", &self.active.cursor)
            .finish_non_exhaustive()
    }
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(
        store: &'a mut FiberStore,
        active: &'a mut ActiveComponent,
        request: Rc<Cell<bool>>,
    ) -> Self {
        Self {
            store,
            active,
            request,
        }
    }

    /// The previous render's hook record at the current ordinal.
    fn previous(&self) -> Option<Hook> {
        let alt = self.active.alternate;
        if alt == INVALID {
            return None;
        }
        self.store.hooks[alt as usize].get(self.active.cursor).cloned()
    }

    /// Appends a record for the current ordinal and advances the cursor.
    fn record(&mut self, hook: Hook) {
        self.store.hooks[self.active.fiber as usize].push(hook);
        self.active.cursor += 1;
    }

    #[track_caller]
    fn kind_mismatch(&self) -> ! {
        panic!(
            "hook kind changed between renders at position {} (conditional hook call?)",
            self.active.cursor
        )
    }

    /// A state cell initialized to `initial` on the first render.
    ///
    /// Returns the current value and a [`Setter`]. Pending updates queued
    /// since the previous render are folded in, oldest first, before the
    /// value is returned.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, Setter<T>) {
        let (mut state, pending): (StateValue, Vec<Update>) = match self.previous() {
            Some(Hook::State { state, queue }) => {
                let pending = queue.borrow_mut().drain(..).collect();
                (state, pending)
            }
            Some(_) => self.kind_mismatch(),
            None => (Rc::new(initial), Vec::new()),
        };
        for update in pending {
            state = update(state);
        }
        let value = state
            .downcast_ref::<T>()
            .unwrap_or_else(|| panic!("state hook type changed between renders"))
            .clone();

        let queue: UpdateQueue = Rc::new(RefCell::new(Vec::new()));
        self.record(Hook::State {
            state,
            queue: queue.clone(),
        });
        let setter = Setter {
            queue,
            request: self.request.clone(),
            _marker: PhantomData,
        };
        (value, setter)
    }

    /// [`use_state`](Self::use_state) with transitions expressed as actions
    /// folded through `reducer`.
    pub fn use_reducer<T, A, R>(&mut self, reducer: R, initial: T) -> (T, Dispatch<A>)
    where
        T: Clone + 'static,
        A: 'static,
        R: Fn(&T, A) -> T + 'static,
    {
        let (value, setter) = self.use_state(initial);
        let reducer = Rc::new(reducer);
        let dispatch = Dispatch {
            inner: Rc::new(move |action: A| {
                let reducer = reducer.clone();
                setter.update(move |state| reducer(state, action));
            }),
        };
        (value, dispatch)
    }

    /// Runs `effect` during this render when the dependency list differs from
    /// the previous render's.
    ///
    /// `None` runs every render; `Some(deps([]))` runs once. Effects run
    /// synchronously, inline in the work unit that evaluates the component,
    /// and there is no cleanup counterpart.
    pub fn use_effect(&mut self, deps: Option<Deps>, effect: impl FnOnce()) {
        let changed = match self.previous() {
            Some(Hook::Effect { deps: old }) => deps_changed(old.as_ref(), deps.as_ref()),
            Some(_) => self.kind_mismatch(),
            None => true,
        };
        if changed {
            effect();
        }
        self.record(Hook::Effect { deps });
    }

    /// Caches `compute`'s result until the dependency list changes.
    pub fn use_memo<T: Clone + 'static>(
        &mut self,
        deps: Option<Deps>,
        compute: impl FnOnce() -> T,
    ) -> T {
        let cached = match self.previous() {
            Some(Hook::Memo { value, deps: old }) => {
                if deps_changed(old.as_ref(), deps.as_ref()) {
                    None
                } else {
                    Some(value)
                }
            }
            Some(_) => self.kind_mismatch(),
            None => None,
        };
        let value: StateValue = match cached {
            Some(v) => v,
            None => Rc::new(compute()),
        };
        let out = value
            .downcast_ref::<T>()
            .unwrap_or_else(|| panic!("memo hook type changed between renders"))
            .clone();
        self.record(Hook::Memo { value, deps });
        out
    }

    /// An [`EventHandler`] whose identity is stable until the dependency list
    /// changes, so the prop diff skips re-binding it.
    pub fn use_callback(&mut self, deps: Option<Deps>, f: impl Fn() + 'static) -> EventHandler {
        self.use_memo(deps, move || EventHandler::new(f))
    }

    /// A mutable cell created once and kept for the component's lifetime.
    pub fn use_ref<T: 'static>(&mut self, initial: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        self.use_memo(Some(Deps::new()), move || Rc::new(RefCell::new(initial())))
    }
}
