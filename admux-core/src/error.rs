//! Error values shared across the crate.

/// Errors surfaced by registration and read operations.
///
/// Nothing in this crate is fatal. Capacity exhaustion and reads of
/// unknown channels are normal outcomes the application handles, and a
/// failed registration never modifies existing table entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// All table slots are occupied; the registration was rejected.
    CapacityExceeded,
    /// The channel was never registered, or is registered in notify
    /// mode and has no cached value to read.
    NotRegistered,
}
