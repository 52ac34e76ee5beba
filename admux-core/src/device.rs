//! Conversion device abstraction
//!
//! [`AdcDevice`] is the seam between the sequencer logic and the
//! converter/timer registers, so the channel table and sequencer are
//! unit-testable against a fake device with no real hardware.

use crate::channel::ChannelKey;

/// Hardware capability consumed by the conversion sequencer.
///
/// Implementations wrap one converter peripheral and the timer that
/// auto-triggers it. The sequencer calls [`result`](Self::result) and
/// [`selected_channel`](Self::selected_channel) before
/// [`select`](Self::select): both read state the hardware latched at
/// conversion completion, and reprogramming the multiplexer first
/// would race the next conversion.
pub trait AdcDevice {
    /// Duration of one conversion in microseconds, fixed by the
    /// converter clock. The full-cycle period reported to callbacks is
    /// this value times the number of registered channels.
    const CONVERSION_PERIOD_US: u16;

    /// One-time hardware setup: converter clock prescaler, converter
    /// and completion-interrupt enable, timer auto-trigger and compare
    /// period. Idempotent. Must not unmask global interrupts; the
    /// caller does that once the instance is reachable from the
    /// interrupt vector.
    fn init(&mut self);

    /// Result of the just-completed conversion.
    fn result(&mut self) -> u16;

    /// Channel number the multiplexer was set to for the completed
    /// conversion.
    fn selected_channel(&mut self) -> u8;

    /// Program the multiplexer for the next conversion.
    fn select(&mut self, key: ChannelKey);

    /// Clear the auto-trigger compare flag, releasing the next
    /// conversion.
    fn acknowledge(&mut self);
}
