//! Fixed-capacity channel table
//!
//! Authoritative store of registered channels, their reference
//! selection, and their delivery mode. Occupied slots are contiguous
//! from index 0 with no duplicate channel numbers, and the table only
//! grows: there is no unregistration, only in-place overwrites.

use heapless::Vec;

use crate::channel::{ChannelKey, Reference};
use crate::error::Error;

/// Callback invoked with `(result, full_cycle_period_us)` as each
/// conversion of a notify-mode channel completes.
///
/// Handlers run inside the conversion-complete interrupt: they must be
/// short, must not block, and must not re-enter registration.
pub type Handler = fn(u16, u16);

/// Per-slot delivery mode and payload. Exactly one payload exists at a
/// time by construction. Internal to the table; callers see only the
/// `register_*`/`cached` surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// Most recent result, cached for on-demand reads.
    Poll(u16),
    /// Result pushed to the handler as each conversion completes.
    Notify(Handler),
}

/// One occupied table entry.
#[derive(Debug, Clone, Copy)]
struct Slot {
    key: ChannelKey,
    delivery: Delivery,
}

/// Fixed table of up to `N` registered channels.
#[derive(Debug, Default)]
pub struct ChannelTable<const N: usize> {
    slots: Vec<Slot, N>,
}

impl<const N: usize> ChannelTable<N> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Number of occupied slots. Never decreases.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True while no channel has been registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot index of `channel`, or `None` if it was never registered.
    /// Linear search over occupied slots.
    pub fn find(&self, channel: u8) -> Option<usize> {
        let channel = channel & ChannelKey::CHANNEL_MASK;
        self.slots.iter().position(|slot| slot.key.channel() == channel)
    }

    /// Next slot in round-robin order after the most recently serviced
    /// index. A stale conversion (`after` is `None` because the fired
    /// channel matched no slot) restarts the cycle at slot 0 rather
    /// than stalling the sequence. Returns `None` only when the table
    /// is empty.
    pub fn next_after(&self, after: Option<usize>) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        Some(after.map_or(0, |index| (index + 1) % self.slots.len()))
    }

    /// Register `channel` for cached polling reads. An existing slot
    /// for the same channel is overwritten in place, preserving its
    /// round-robin position and consuming no capacity. A slot already
    /// in poll mode keeps its cached value across the update; a slot
    /// converted from notify mode starts the cache at 0 until the next
    /// conversion lands.
    pub fn register_poll(&mut self, channel: u8, reference: Reference) -> Result<(), Error> {
        self.upsert(channel, reference, Delivery::Poll(0))
    }

    /// Register `channel` for callback delivery. Same slot-reuse and
    /// append logic as [`register_poll`](Self::register_poll).
    pub fn register_notify(
        &mut self,
        channel: u8,
        reference: Reference,
        handler: Handler,
    ) -> Result<(), Error> {
        self.upsert(channel, reference, Delivery::Notify(handler))
    }

    fn upsert(&mut self, channel: u8, reference: Reference, delivery: Delivery) -> Result<(), Error> {
        let key = ChannelKey::new(channel, reference);
        if let Some(index) = self.find(key.channel()) {
            let slot = &mut self.slots[index];
            // A poll slot re-registered as poll keeps its last result;
            // anything else (mode switch, handler replacement) takes
            // the new payload.
            if !matches!(
                (slot.delivery, delivery),
                (Delivery::Poll(_), Delivery::Poll(_))
            ) {
                slot.delivery = delivery;
            }
            slot.key = key;
            return Ok(());
        }
        self.slots
            .push(Slot { key, delivery })
            .map_err(|_| Error::CapacityExceeded)
    }

    /// Last cached result for a poll-mode channel. Fails if the channel
    /// is unregistered or currently in notify mode.
    pub fn cached(&self, channel: u8) -> Result<u16, Error> {
        match self.find(channel).map(|index| self.slots[index].delivery) {
            Some(Delivery::Poll(value)) => Ok(value),
            _ => Err(Error::NotRegistered),
        }
    }

    /// Packed key of the slot at `index`.
    pub fn key_at(&self, index: usize) -> Option<ChannelKey> {
        self.slots.get(index).map(|slot| slot.key)
    }

    /// Route a completed conversion to the slot at `index`: invoke the
    /// handler of a notify slot synchronously, or overwrite the cached
    /// value of a poll slot. Out-of-range indices are ignored.
    pub fn deliver(&mut self, index: usize, result: u16, cycle_period_us: u16) {
        if let Some(slot) = self.slots.get_mut(index) {
            match slot.delivery {
                Delivery::Notify(handler) => handler(result, cycle_period_us),
                Delivery::Poll(_) => slot.delivery = Delivery::Poll(result),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn noop(_result: u16, _cycle_period_us: u16) {}

    #[test]
    fn test_capacity_rejected_without_mutation() {
        let mut table: ChannelTable<2> = ChannelTable::new();
        assert_eq!(table.register_poll(3, Reference::Aref), Ok(()));
        assert_eq!(table.register_notify(5, Reference::Avcc, noop), Ok(()));
        assert_eq!(table.len(), 2);

        assert_eq!(
            table.register_poll(7, Reference::Aref),
            Err(Error::CapacityExceeded)
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.find(3), Some(0));
        assert_eq!(table.find(5), Some(1));
        assert_eq!(table.find(7), None);
    }

    #[test]
    fn test_reregistration_updates_in_place() {
        let mut table: ChannelTable<2> = ChannelTable::new();
        table.register_poll(3, Reference::Aref).unwrap();
        table.register_poll(5, Reference::Aref).unwrap();

        // Same channel, different reference: slot position and count
        // are preserved.
        table.register_poll(3, Reference::Internal1V1).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.find(3), Some(0));
        assert_eq!(table.key_at(0).unwrap().reference(), Reference::Internal1V1);
    }

    #[test]
    fn test_reference_update_preserves_cached_value() {
        let mut table: ChannelTable<2> = ChannelTable::new();
        table.register_poll(3, Reference::Avcc).unwrap();
        table.deliver(0, 512, 112);
        assert_eq!(table.cached(3), Ok(512));

        // Re-registering a poll channel with a new reference keeps the
        // last conversion result available.
        table.register_poll(3, Reference::Internal1V1).unwrap();
        assert_eq!(table.cached(3), Ok(512));
        assert_eq!(table.key_at(0).unwrap().reference(), Reference::Internal1V1);
    }

    #[test]
    fn test_notify_reregistration_replaces_handler() {
        use core::sync::atomic::{AtomicU32, Ordering};

        static REPLACED_CALLS: AtomicU32 = AtomicU32::new(0);
        static REPLACEMENT_CALLS: AtomicU32 = AtomicU32::new(0);

        fn replaced(_result: u16, _cycle_period_us: u16) {
            REPLACED_CALLS.fetch_add(1, Ordering::Relaxed);
        }
        fn replacement(_result: u16, _cycle_period_us: u16) {
            REPLACEMENT_CALLS.fetch_add(1, Ordering::Relaxed);
        }

        let mut table: ChannelTable<2> = ChannelTable::new();
        table.register_notify(3, Reference::Avcc, replaced).unwrap();
        table.register_notify(3, Reference::Avcc, replacement).unwrap();
        assert_eq!(table.len(), 1);

        table.deliver(0, 700, 112);
        assert_eq!(REPLACED_CALLS.load(Ordering::Relaxed), 0);
        assert_eq!(REPLACEMENT_CALLS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_mode_switch_discards_cached_value() {
        let mut table: ChannelTable<2> = ChannelTable::new();
        table.register_poll(3, Reference::Avcc).unwrap();
        table.deliver(0, 512, 112);
        assert_eq!(table.cached(3), Ok(512));

        table.register_notify(3, Reference::Avcc, noop).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cached(3), Err(Error::NotRegistered));

        // And back: the old handler is gone, the cache restarts at 0.
        table.register_poll(3, Reference::Avcc).unwrap();
        assert_eq!(table.cached(3), Ok(0));
    }

    #[test]
    fn test_read_unregistered_fails() {
        let table: ChannelTable<2> = ChannelTable::new();
        assert_eq!(table.cached(3), Err(Error::NotRegistered));
    }

    #[test]
    fn test_next_after_wraps_round_robin() {
        let mut table: ChannelTable<4> = ChannelTable::new();
        assert_eq!(table.next_after(None), None);

        table.register_poll(3, Reference::Avcc).unwrap();
        table.register_poll(5, Reference::Avcc).unwrap();
        table.register_poll(9, Reference::Avcc).unwrap();

        assert_eq!(table.next_after(Some(0)), Some(1));
        assert_eq!(table.next_after(Some(1)), Some(2));
        assert_eq!(table.next_after(Some(2)), Some(0));
        // Stale conversion: restart at slot 0.
        assert_eq!(table.next_after(None), Some(0));
    }

    proptest! {
        #[test]
        fn registration_preserves_invariants(
            ops in proptest::collection::vec((0u8..16, any::<bool>()), 0..64)
        ) {
            let mut table: ChannelTable<4> = ChannelTable::new();
            let mut last_len = 0;

            for (channel, notify) in ops {
                let result = if notify {
                    table.register_notify(channel, Reference::Avcc, noop)
                } else {
                    table.register_poll(channel, Reference::Avcc)
                };

                // Rejections only happen at capacity, and the count
                // never shrinks or exceeds N.
                if result.is_err() {
                    prop_assert_eq!(table.len(), 4);
                }
                prop_assert!(table.len() <= 4);
                prop_assert!(table.len() >= last_len);
                last_len = table.len();
            }

            // No gaps, no duplicate channels among occupied slots.
            for i in 0..table.len() {
                let key = table.key_at(i).unwrap();
                prop_assert_eq!(table.find(key.channel()), Some(i));
            }
        }
    }
}
