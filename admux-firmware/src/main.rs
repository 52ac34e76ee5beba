//! Demo firmware: round-robin sampling of two inputs on an ATmega328P
//!
//! Channel 0 (a potentiometer) is polled on demand; channel 1 (battery
//! sense) pushes every conversion into an atomic from the interrupt.
//! All registration happens during setup, before steady-state sampling
//! begins.

#![no_std]
#![no_main]

use admux_core::Reference;
use admux_hal_avr::{bind_adc, with_mux};
use panic_halt as _;
use portable_atomic::{AtomicU16, Ordering};

// Capacity 4; the ADC-complete vector services this instance.
bind_adc!(ADC_MUX, 4);

/// Battery-sense conversions land here from interrupt context.
static BATTERY_RAW: AtomicU16 = AtomicU16::new(0);

fn battery_sample(result: u16, _cycle_period_us: u16) {
    BATTERY_RAW.store(result, Ordering::Relaxed);
}

#[avr_device::entry]
fn main() -> ! {
    // First access constructs the singleton and runs hardware setup:
    // prescaler, auto-trigger, compare period. Conversions start
    // firing as soon as this returns.
    with_mux(&ADC_MUX, true, |mux| {
        mux.register_poll(0, Reference::Avcc).ok();
        mux.register_notify(1, Reference::Avcc, battery_sample).ok();
    });

    loop {
        let knob = with_mux(&ADC_MUX, false, |mux| mux.read(0));
        let battery = BATTERY_RAW.load(Ordering::Relaxed);

        // Application logic would consume the readings here.
        let _ = (knob, battery);

        avr_device::asm::nop();
    }
}
