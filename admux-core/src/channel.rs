//! Channel identity and reference-voltage encoding
//!
//! A registered channel is a physical input pin paired with a voltage
//! reference. Both are packed into a single byte per slot, and the same
//! byte layout is what the chip HAL writes to the multiplexer register
//! when it selects the next conversion.

/// Voltage-reference source for a conversion.
///
/// Values are the REFS1:0 bits of the ATmega328P ADMUX register. The
/// hardware reserves `0b10`; it decodes to [`Reference::Aref`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Reference {
    /// External voltage applied to the AREF pin.
    Aref = 0b00,
    /// Supply voltage (AVcc) with an external capacitor on AREF.
    Avcc = 0b01,
    /// Internal 1.1 V bandgap reference.
    Internal1V1 = 0b11,
}

impl Reference {
    /// Raw 2-bit selector value.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Decode a 2-bit selector, ignoring higher bits.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b01 => Reference::Avcc,
            0b11 => Reference::Internal1V1,
            _ => Reference::Aref,
        }
    }
}

/// Packed per-slot channel metadata.
///
/// Bits 0..=3 hold the physical channel number, bits 4..=5 the
/// reference selector. Channel numbers above 15 are masked to their
/// low four bits at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelKey(u8);

impl ChannelKey {
    /// Mask selecting the channel-number bits of a key or of the
    /// hardware multiplexer register.
    pub const CHANNEL_MASK: u8 = 0x0f;

    const REFERENCE_SHIFT: u8 = 4;

    /// Pack a channel number and reference selector.
    pub fn new(channel: u8, reference: Reference) -> Self {
        Self((channel & Self::CHANNEL_MASK) | (reference.bits() << Self::REFERENCE_SHIFT))
    }

    /// Physical channel number, 0..=15.
    pub fn channel(self) -> u8 {
        self.0 & Self::CHANNEL_MASK
    }

    /// Reference selector for this channel.
    pub fn reference(self) -> Reference {
        Reference::from_bits(self.0 >> Self::REFERENCE_SHIFT)
    }

    /// Multiplexer register image for this key: reference selector in
    /// the top two bits, channel number in the low four (ADMUX layout).
    pub fn mux_bits(self) -> u8 {
        self.reference().bits() << 6 | self.channel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for channel in 0..16 {
            for reference in [Reference::Aref, Reference::Avcc, Reference::Internal1V1] {
                let key = ChannelKey::new(channel, reference);
                assert_eq!(key.channel(), channel);
                assert_eq!(key.reference(), reference);
            }
        }
    }

    #[test]
    fn test_channel_masked_to_four_bits() {
        let key = ChannelKey::new(0x17, Reference::Aref);
        assert_eq!(key.channel(), 0x07);
    }

    #[test]
    fn test_mux_register_image() {
        let key = ChannelKey::new(5, Reference::Avcc);
        assert_eq!(key.mux_bits(), 0b0100_0101);

        let key = ChannelKey::new(3, Reference::Internal1V1);
        assert_eq!(key.mux_bits(), 0b1100_0011);

        let key = ChannelKey::new(0, Reference::Aref);
        assert_eq!(key.mux_bits(), 0);
    }

    #[test]
    fn test_reserved_reference_bits_decode_to_aref() {
        assert_eq!(Reference::from_bits(0b10), Reference::Aref);
    }
}
