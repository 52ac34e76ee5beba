//! Process-wide multiplexer instance and interrupt binding
//!
//! The multiplexer is shared between main context and the ADC-complete
//! interrupt, so it lives in a critical-section cell: main-context
//! access always runs with interrupts masked, which is also what makes
//! runtime registration safe against a concurrently firing sequencer.
//! On target the critical-section implementation comes from
//! `avr-device` (`critical-section-impl`); host tests use the `std`
//! implementation.

use core::cell::RefCell;

use admux_core::AdcMux;
use critical_section::Mutex;

use crate::adc::AvrAdc;

/// Multiplexer instance over the ATmega328P device with capacity `N`.
pub type Mux<const N: usize> = AdcMux<AvrAdc, N>;

/// Critical-section cell holding the lazily constructed instance.
pub type MuxCell<const N: usize> = Mutex<RefCell<Option<Mux<N>>>>;

/// Empty cell for a `static`, normally declared via [`bind_adc!`].
pub const fn mux_cell<const N: usize>() -> MuxCell<N> {
    Mutex::new(RefCell::new(None))
}

/// Run `f` against the multiplexer singleton with interrupts masked,
/// constructing it on first access. `init_hardware` selects whether
/// that first construction also performs register setup; later calls
/// ignore the flag (call [`Mux::init`] inside `f` to reinitialize).
pub fn with_mux<R, const N: usize>(
    cell: &MuxCell<N>,
    init_hardware: bool,
    f: impl FnOnce(&mut Mux<N>) -> R,
) -> R {
    let mut armed = false;
    let result = critical_section::with(|cs| {
        let mut slot = cell.borrow_ref_mut(cs);
        let mux = slot.get_or_insert_with(|| {
            if init_hardware {
                armed = true;
                Mux::with_init(AvrAdc::new())
            } else {
                Mux::new(AvrAdc::new())
            }
        });
        f(mux)
    });

    // Hardware init armed the timer auto-trigger while the cell was
    // borrowed. Interrupts stay masked until that borrow is released;
    // a conversion completing mid-setup must not re-enter the cell.
    if armed {
        unsafe { avr_device::interrupt::enable() };
    }
    result
}

/// Service one completed conversion; the body of the ADC-complete
/// vector. An unconstructed instance is a no-op, so conversions fired
/// before the first [`with_mux`] call are simply dropped.
pub fn service_isr<const N: usize>(cell: &MuxCell<N>) {
    critical_section::with(|cs| {
        if let Some(mux) = cell.borrow_ref_mut(cs).as_mut() {
            mux.service();
        }
    });
}

/// Declare the multiplexer singleton and wire the ADC-complete vector
/// to its sequencer.
///
/// ```ignore
/// bind_adc!(ADC_MUX, 4);
///
/// with_mux(&ADC_MUX, true, |mux| {
///     mux.register_poll(0, Reference::Avcc)
/// })?;
/// ```
///
/// The expanding crate must depend on `avr-device` with the `rt` and
/// `critical-section-impl` features for the interrupt attribute and
/// the critical-section implementation.
#[macro_export]
macro_rules! bind_adc {
    ($name:ident, $channels:expr) => {
        static $name: $crate::MuxCell<$channels> = $crate::mux_cell();

        #[::avr_device::interrupt(atmega328p)]
        fn ADC() {
            $crate::service_isr(&$name);
        }
    };
}
