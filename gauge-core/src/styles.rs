//! Number style flags controlling what a numeric literal may contain

use bitflags::bitflags;

bitflags! {
    /// Which parts of a numeric literal are accepted when reading.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NumberStyles: u32 {
        const ALLOW_LEADING_WHITE = 1;
        const ALLOW_TRAILING_WHITE = 1 << 1;
        const ALLOW_LEADING_SIGN = 1 << 2;
        const ALLOW_DECIMAL_POINT = 1 << 5;
        const ALLOW_THOUSANDS = 1 << 6;
        const ALLOW_EXPONENT = 1 << 7;

        const INTEGER = Self::ALLOW_LEADING_WHITE.bits()
            | Self::ALLOW_TRAILING_WHITE.bits()
            | Self::ALLOW_LEADING_SIGN.bits();
        const FLOAT = Self::INTEGER.bits()
            | Self::ALLOW_DECIMAL_POINT.bits()
            | Self::ALLOW_EXPONENT.bits();
        const NUMBER = Self::INTEGER.bits()
            | Self::ALLOW_DECIMAL_POINT.bits()
            | Self::ALLOW_THOUSANDS.bits();
        const ANY = Self::FLOAT.bits() | Self::ALLOW_THOUSANDS.bits();
    }
}

impl Default for NumberStyles {
    fn default() -> Self {
        NumberStyles::FLOAT
    }
}
