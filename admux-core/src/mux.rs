//! Multiplexer instance: registration surface and conversion sequencer
//!
//! [`AdcMux`] owns the channel table and the device handle for its
//! entire lifetime. The hardware timer auto-triggers conversions; each
//! completion runs [`AdcMux::service`] exactly once from the interrupt,
//! forming a self-clocking loop with period
//! `CONVERSION_PERIOD_US * active_channels`.

use crate::channel::Reference;
use crate::device::AdcDevice;
use crate::error::Error;
use crate::table::{ChannelTable, Handler};

/// Interrupt-driven multiplexer over a single hardware converter.
///
/// Concurrency contract: the core provides no locking of its own.
/// Registration is expected to happen during a quiescent setup phase
/// before steady-state sampling, or with the conversion interrupt
/// masked by the caller — the firmware-level binding wraps every
/// main-context access in a critical section for exactly this reason.
pub struct AdcMux<D, const N: usize> {
    device: D,
    table: ChannelTable<N>,
    /// Wall-clock time to sample every registered channel once, in
    /// microseconds. Recomputed whenever the active count changes and
    /// passed to notify handlers.
    cycle_period_us: u16,
    /// Serviced-conversion count for liveness diagnostics.
    fires: u32,
}

impl<D: AdcDevice, const N: usize> AdcMux<D, N> {
    /// Create a multiplexer over `device` without touching hardware.
    pub fn new(device: D) -> Self {
        Self {
            device,
            table: ChannelTable::new(),
            cycle_period_us: 0,
            fires: 0,
        }
    }

    /// Create a multiplexer and run hardware setup immediately.
    pub fn with_init(device: D) -> Self {
        let mut mux = Self::new(device);
        mux.init();
        mux
    }

    /// One-time hardware configuration. Idempotent, see
    /// [`AdcDevice::init`].
    pub fn init(&mut self) {
        self.device.init();
    }

    /// Register `channel` for cached polling reads. Re-registering an
    /// existing channel updates its reference and mode in place without
    /// consuming capacity.
    pub fn register_poll(&mut self, channel: u8, reference: Reference) -> Result<(), Error> {
        self.table.register_poll(channel, reference)?;
        self.recompute_period();
        Ok(())
    }

    /// Register `channel` for callback delivery from interrupt context.
    /// See [`Handler`] for the constraints the handler inherits.
    pub fn register_notify(
        &mut self,
        channel: u8,
        reference: Reference,
        handler: Handler,
    ) -> Result<(), Error> {
        self.table.register_notify(channel, reference, handler)?;
        self.recompute_period();
        Ok(())
    }

    /// Last completed result for a poll-mode channel.
    pub fn read(&self, channel: u8) -> Result<u16, Error> {
        self.table.cached(channel)
    }

    /// Number of registered channels.
    pub fn active_channels(&self) -> usize {
        self.table.len()
    }

    /// Time to sample every registered channel once, in microseconds.
    pub fn cycle_period_us(&self) -> u16 {
        self.cycle_period_us
    }

    /// Monotonically increasing count of serviced conversions.
    pub fn fire_count(&self) -> u32 {
        self.fires
    }

    /// Access the underlying device, e.g. for target-specific
    /// configuration outside this crate's scope.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn recompute_period(&mut self) {
        self.cycle_period_us = D::CONVERSION_PERIOD_US.saturating_mul(self.table.len() as u16);
    }

    /// Conversion-complete sequencer. Must run exactly once per
    /// ADC-complete interrupt; never blocks, O(active channels).
    pub fn service(&mut self) {
        self.fires = self.fires.wrapping_add(1);

        // Latched by hardware at conversion completion; read both
        // before the multiplexer is reprogrammed for the next
        // conversion.
        let result = self.device.result();
        let channel = self.device.selected_channel();

        // A stale channel (no matching slot) is dropped silently and
        // the cycle restarts at slot 0.
        let index = self.table.find(channel);
        if let Some(index) = index {
            self.table.deliver(index, result, self.cycle_period_us);
        }

        if let Some(next) = self.table.next_after(index) {
            if let Some(key) = self.table.key_at(next) {
                self.device.select(key);
            }
        }

        self.device.acknowledge();
    }
}
