//! Board-agnostic core of the admux ADC multiplexer
//!
//! This crate contains all logic that does not depend on a specific
//! hardware implementation:
//!
//! - Channel identity and reference-voltage encoding
//! - The fixed-capacity channel table
//! - The conversion sequencer driven by the ADC-complete interrupt
//! - The device capability trait implemented by chip HALs
//!
//! Everything here is unit-testable on the host against a fake device;
//! register access lives in the chip crates (`admux-hal-avr`).

#![no_std]
#![deny(unsafe_code)]

pub mod channel;
pub mod device;
pub mod error;
pub mod mux;
pub mod table;

// Re-export key types at crate root for convenience
pub use channel::{ChannelKey, Reference};
pub use device::AdcDevice;
pub use error::Error;
pub use mux::AdcMux;
pub use table::{ChannelTable, Handler};
