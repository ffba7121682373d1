//! Create-if-absent slots for shareable infrastructure handles
//!
//! Every stack either receives a handle to a shared resource from its caller
//! or creates its own default - never both, never neither. The rule applies
//! independently per resource: a stack may share the caller's network while
//! creating its own log group.
//!
//! The slot is resolved exactly once at the start of each stack build. A
//! `Provided` handle is used as-is; the stack attaches sub-resources to it
//! but never redefines it. `CreateDefault` emits exactly one default resource
//! into the stack being built.

/// A shareable resource slot: a caller-provided handle or an instruction to
/// create the default resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Slot<H> {
    /// Use the caller's handle; the resource is owned elsewhere.
    Provided(H),
    /// No handle supplied; create the default resource and own it.
    #[default]
    CreateDefault,
}

impl<H> Slot<H> {
    /// Returns true if a caller-provided handle fills this slot
    pub fn is_provided(&self) -> bool {
        matches!(self, Self::Provided(_))
    }

    /// Resolve the slot, invoking `create` only when no handle was provided
    ///
    /// `create` is the point where the default resource is emitted into the
    /// stack under construction; it runs at most once.
    pub fn resolve(self, create: impl FnOnce() -> H) -> H {
        match self {
            Self::Provided(handle) => handle,
            Self::CreateDefault => create(),
        }
    }
}

impl<H> From<Option<H>> for Slot<H> {
    fn from(value: Option<H>) -> Self {
        match value {
            Some(handle) => Self::Provided(handle),
            None => Self::CreateDefault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Story: a provided handle is used verbatim and nothing is created
    #[test]
    fn story_provided_handle_skips_creation() {
        let created = Cell::new(false);
        let slot = Slot::Provided("shared-network");

        let handle = slot.resolve(|| {
            created.set(true);
            "fresh-network"
        });

        assert_eq!(handle, "shared-network");
        assert!(!created.get(), "resolve must not create when a handle was provided");
    }

    /// Story: an empty slot creates exactly one default resource
    #[test]
    fn story_empty_slot_creates_exactly_once() {
        let creations = Cell::new(0u32);
        let slot: Slot<&str> = Slot::CreateDefault;

        let handle = slot.resolve(|| {
            creations.set(creations.get() + 1);
            "fresh-network"
        });

        assert_eq!(handle, "fresh-network");
        assert_eq!(creations.get(), 1);
    }

    /// Story: optional caller inputs map onto slots
    #[test]
    fn story_option_conversion() {
        assert_eq!(Slot::from(Some("net")), Slot::Provided("net"));
        assert_eq!(Slot::<&str>::from(None), Slot::CreateDefault);
        assert!(Slot::Provided(1).is_provided());
        assert!(!Slot::<u32>::CreateDefault.is_provided());
    }
}
