//! Closure-driven sink

use std::collections::HashMap;

use super::EventSink;
use crate::event::{Event, EventKind};
use crate::{Error, Result};

type Handler<'a> = Box<dyn FnMut(&Event) -> Result<()> + 'a>;

/// Dispatches each event kind to a caller-supplied closure.
///
/// Kinds without a handler are ignored.
///
/// ```
/// use sitewarden_core::{Callbacks, EventKind};
///
/// let mut unknown = Vec::new();
/// let sink = Callbacks::builder()
///     .on(EventKind::UnknownRootEntry, |event| {
///         unknown.push(event.path().to_path_buf());
///         Ok(())
///     })
///     .build();
/// assert!(sink.is_ok());
/// assert!(Callbacks::builder().build().is_err());
/// ```
pub struct Callbacks<'a> {
    handlers: HashMap<EventKind, Handler<'a>>,
}

impl<'a> Callbacks<'a> {
    pub fn builder() -> CallbacksBuilder<'a> {
        CallbacksBuilder {
            handlers: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Callbacks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&EventKind> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("Callbacks").field("kinds", &kinds).finish()
    }
}

impl EventSink for Callbacks<'_> {
    fn handle(&mut self, event: &Event) -> Result<()> {
        match self.handlers.get_mut(&event.kind()) {
            Some(handler) => handler(event),
            None => Ok(()),
        }
    }
}

/// Builder for [`Callbacks`]
pub struct CallbacksBuilder<'a> {
    handlers: HashMap<EventKind, Handler<'a>>,
}

impl<'a> CallbacksBuilder<'a> {
    /// Register the handler for one kind, replacing any earlier one.
    pub fn on(mut self, kind: EventKind, handler: impl FnMut(&Event) -> Result<()> + 'a) -> Self {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Fails with [`Error::NoHandlers`] if no handler was registered.
    pub fn build(self) -> Result<Callbacks<'a>> {
        if self.handlers.is_empty() {
            return Err(Error::NoHandlers);
        }
        Ok(Callbacks {
            handlers: self.handlers,
        })
    }
}
