//! ATmega328P implementation of the admux conversion device
//!
//! All register access for the converter and its trigger timer lives
//! here; `admux-core` stays free of unsafe code and hardware details.
//! The crate also provides the singleton plumbing: a critical-section
//! cell type for the process-wide multiplexer instance, a lazy
//! accessor, and the [`bind_adc!`] macro that wires the ADC-complete
//! interrupt vector to it.

#![no_std]

pub mod adc;
mod singleton;

pub use adc::{AvrAdc, ADC_CLOCK_PERIOD_US, CONVERSION_PERIOD_US};
pub use singleton::{mux_cell, service_isr, with_mux, Mux, MuxCell};
