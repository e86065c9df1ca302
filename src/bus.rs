//! The event bus: named, ordered handler lists that fold application state.
//!
//! Emitting an event runs its handlers left to right, each one receiving the
//! state returned by the previous one. Handlers get the bus itself as their
//! third argument, so they may register or remove handlers and emit nested
//! events. Nested emits run to completion on the same call stack before the
//! outer fold continues.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::error::{GameError, GameResult};
use crate::events::{EventKind, Payload};

/// Result returned by a handler; an error aborts the fold it is part of.
pub type HandlerResult<S> = anyhow::Result<S>;

type HandlerFn<S> = dyn Fn(S, &Payload, &mut EventBus<S>) -> HandlerResult<S>;

/// Handler ids are unique across every bus in the process.
static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a registered handler, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// A registered handler function.
///
/// Clones share identity: registering the same `Handler` twice and removing it
/// once drops both registrations.
pub struct Handler<S> {
    id: HandlerId,
    func: Rc<HandlerFn<S>>,
}

impl<S> Handler<S> {
    pub fn id(&self) -> HandlerId {
        self.id
    }
}

impl<S> Clone for Handler<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            func: Rc::clone(&self.func),
        }
    }
}

impl<S> fmt::Debug for Handler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Registry mapping event names to ordered handler lists.
pub struct EventBus<S> {
    handlers: HashMap<EventKind, Vec<Handler<S>>>,
    depth: usize,
}

impl<S> Default for EventBus<S> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
            depth: 0,
        }
    }
}

impl<S> fmt::Debug for EventBus<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<String, usize> = self.handlers.iter().map(|(k, v)| (k.to_string(), v.len())).collect();
        f.debug_struct("EventBus")
            .field("handlers", &counts)
            .field("depth", &self.depth)
            .finish()
    }
}

impl<S> EventBus<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `func` to the handlers of `kind` and returns its handle.
    pub fn on<F>(&mut self, kind: EventKind, func: F) -> Handler<S>
    where
        F: Fn(S, &Payload, &mut EventBus<S>) -> HandlerResult<S> + 'static,
    {
        let handler = Handler {
            id: HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed)),
            func: Rc::new(func),
        };
        self.on_handler(kind, handler.clone());
        handler
    }

    /// Appends an already created handler (keeping its identity) to `kind`.
    pub fn on_handler(&mut self, kind: EventKind, handler: Handler<S>) {
        trace!(event = %kind, id = handler.id.0, "Registering handler");
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Folds `state` through every handler registered for `kind`.
    ///
    /// The handler list is captured when the fold starts; registrations made
    /// while it runs apply from the next emit of `kind` onwards.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Handler` for the first handler that fails. The
    /// remaining handlers of this event are not run.
    pub fn emit(&mut self, kind: EventKind, state: S, payload: &Payload) -> GameResult<S> {
        let handlers = match self.handlers.get(&kind) {
            Some(handlers) if !handlers.is_empty() => handlers.clone(),
            _ => return Ok(state),
        };

        trace!(event = %kind, handlers = handlers.len(), depth = self.depth, "Emitting");
        self.depth += 1;
        let result = handlers.iter().try_fold(state, |state, handler| {
            (handler.func)(state, payload, self).map_err(|source| GameError::Handler {
                event: kind.to_string(),
                source,
            })
        });
        self.depth -= 1;

        result
    }

    /// Removes every registration of `handler` under `kind`. No-op if absent.
    pub fn remove_handler(&mut self, kind: &EventKind, handler: &Handler<S>) {
        if let Some(handlers) = self.handlers.get_mut(kind) {
            handlers.retain(|h| h.id != handler.id);
        }
    }

    /// Drops the entry for `kind` entirely.
    pub fn remove_all_handlers_for(&mut self, kind: &EventKind) {
        self.handlers.remove(kind);
    }

    pub fn handler_count(&self, kind: &EventKind) -> usize {
        self.handlers.get(kind).map_or(0, Vec::len)
    }

    pub fn has_handlers(&self, kind: &EventKind) -> bool {
        self.handler_count(kind) > 0
    }

    /// How many emits are currently on the call stack.
    pub fn depth(&self) -> usize {
        self.depth
    }
}
