//! Event consumers
//!
//! The walker, checker and reaper never act on what they find; they hand
//! every [`Event`] to an [`EventSink`]. Which sink is injected decides
//! whether a run only reports drift or corrects it.
//!
//! - [`Report`]: records one line per event, never mutates
//! - [`Enforce`]: applies the correction, then records what changed
//! - [`Callbacks`]: caller-supplied closures per event kind

mod callbacks;
mod enforce;
mod report;

pub use callbacks::{Callbacks, CallbacksBuilder};
pub use enforce::Enforce;
pub use report::Report;

use crate::Result;
use crate::event::{Event, EventKind};

/// A consumer of audit events.
///
/// Every per-kind method defaults to a no-op. [`handle`](Self::handle) is
/// what producers call; its default dispatches to the per-kind method.
pub trait EventSink {
    fn missing_optional_dir(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    fn unallocated_optional_dir(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    fn missing_required_dir(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    fn user_error(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    fn group_error(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    fn mode_error(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    fn unknown_entry(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    fn unknown_root_entry(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    fn keep_empty_deleted(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    /// Route an event to its per-kind method.
    fn handle(&mut self, event: &Event) -> Result<()> {
        match event.kind() {
            EventKind::MissingOptionalDir => self.missing_optional_dir(event),
            EventKind::UnallocatedOptionalDir => self.unallocated_optional_dir(event),
            EventKind::MissingRequiredDir => self.missing_required_dir(event),
            EventKind::UserError => self.user_error(event),
            EventKind::GroupError => self.group_error(event),
            EventKind::ModeError => self.mode_error(event),
            EventKind::UnknownEntry => self.unknown_entry(event),
            EventKind::UnknownRootEntry => self.unknown_root_entry(event),
            EventKind::KeepEmptyDeleted => self.keep_empty_deleted(event),
        }
    }
}
