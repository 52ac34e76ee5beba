//! Converter and trigger-timer registers
//!
//! The ADC runs off a /128 prescaler and is auto-triggered by
//! Timer/Counter1 Compare Match B; the compare period is set to one
//! conversion so the trigger and the converter stay in lockstep.
//! Timing constants assume a 16 MHz CPU clock.

use admux_core::{AdcDevice, ChannelKey};
use avr_device::atmega328p::{ADC, TC1};

/// ADC clock period with the /128 prescaler at 16 MHz, in microseconds
/// (125 kHz ADC clock).
pub const ADC_CLOCK_PERIOD_US: u16 = 8;

/// One conversion takes 13 ADC clocks; one further clock of slack keeps
/// the auto-trigger from outrunning the converter.
pub const CONVERSION_PERIOD_US: u16 = ADC_CLOCK_PERIOD_US * 14;

/// Timer/Counter1 ticks per microsecond with the /8 prescaler at 16 MHz.
const TIMER_TICKS_PER_US: u16 = 2;

// ADCSRA: /128 prescaler, interrupt, auto-trigger, enable
const ADPS_DIV128: u8 = 0b111;
const ADIE: u8 = 1 << 3;
const ADATE: u8 = 1 << 5;
const ADEN: u8 = 1 << 7;

// ADCSRB auto-trigger source: Timer/Counter1 Compare Match B
const ADTS_TIMER1_COMPB: u8 = 0b101;

// TCCR1B: CTC mode, /8 prescaler
const WGM12: u8 = 1 << 3;
const CS11: u8 = 1 << 1;

// TIFR1: output compare B match flag
const OCF1B: u8 = 1 << 2;

/// Conversion device backed by the ATmega328P ADC and Timer/Counter1.
///
/// Register access goes through the raw peripheral pointers so the
/// instance can be constructed lazily from the interrupt binding
/// without threading peripheral ownership through the singleton.
pub struct AvrAdc {
    _private: (),
}

impl AvrAdc {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for AvrAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcDevice for AvrAdc {
    const CONVERSION_PERIOD_US: u16 = CONVERSION_PERIOD_US;

    fn init(&mut self) {
        // Global interrupts are not touched here: this arms the timer
        // auto-trigger, and the singleton accessor holds the instance
        // borrowed while it runs. The accessor enables interrupts once
        // its critical section has released the borrow.
        unsafe {
            let adc = &*ADC::ptr();
            adc.adcsra
                .write(|w| w.bits(ADPS_DIV128 | ADEN | ADIE | ADATE));
            adc.adcsrb.write(|w| w.bits(ADTS_TIMER1_COMPB));

            let tc1 = &*TC1::ptr();
            tc1.ocr1b
                .write(|w| w.bits(CONVERSION_PERIOD_US * TIMER_TICKS_PER_US));
            tc1.tccr1a.write(|w| w.bits(0));
            tc1.tccr1b.write(|w| w.bits(WGM12 | CS11));
        }
    }

    fn result(&mut self) -> u16 {
        // The combined data register read covers the required
        // ADCL-before-ADCH ordering.
        unsafe { (*ADC::ptr()).adc.read().bits() }
    }

    fn selected_channel(&mut self) -> u8 {
        unsafe { (*ADC::ptr()).admux.read().bits() & ChannelKey::CHANNEL_MASK }
    }

    fn select(&mut self, key: ChannelKey) {
        unsafe { (*ADC::ptr()).admux.write(|w| w.bits(key.mux_bits())) }
    }

    fn acknowledge(&mut self) {
        // Writing the flag bit clears it, releasing the auto-trigger
        // for the next conversion.
        unsafe { (*TC1::ptr()).tifr1.write(|w| w.bits(OCF1B)) }
    }
}
