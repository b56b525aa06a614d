use crate::constants::Register;

/// Location of a bit-field inside one 8-bit register.
///
/// `offset` is the position of the field's least significant bit. Descriptors
/// are meant to be declared as constants, in which case an invalid layout is
/// rejected at compile time:
///
/// ```compile_fail
/// use isl94208::{Field, Register};
/// const BROKEN: Field = Field::new(Register::Config, 6, 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    register: Register,
    offset: u8,
    width: u8,
}

impl Field {
    /// # Panics
    ///
    /// If `width` is zero or the field does not fit in the register
    /// (`offset + width > 8`).
    pub const fn new(register: Register, offset: u8, width: u8) -> Self {
        assert!(width >= 1, "field width must be at least one bit");
        assert!(
            offset as u16 + width as u16 <= 8,
            "field does not fit in an 8-bit register"
        );

        Self {
            register,
            offset,
            width,
        }
    }

    #[inline]
    pub const fn register(&self) -> Register {
        self.register
    }

    #[inline]
    pub const fn offset(&self) -> u8 {
        self.offset
    }

    #[inline]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Bits covered by the field, in register position.
    #[inline]
    pub const fn mask(&self) -> u8 {
        mask(self.width) << self.offset
    }

    /// Replaces the field inside `reg` with `value`, leaving every other bit
    /// alone. Bits of `value` above the field width are dropped.
    #[inline]
    pub const fn insert(&self, reg: u8, value: u8) -> u8 {
        (reg & !self.mask()) | ((value & mask(self.width)) << self.offset)
    }

    #[inline]
    pub const fn extract(&self, reg: u8) -> u8 {
        (reg >> self.offset) & mask(self.width)
    }
}

/// Returns `width` ones starting at bit 0, e.g. `mask(5) == 0b11111`.
///
/// # Panics
///
/// If `width` is outside `1..=8`.
pub const fn mask(width: u8) -> u8 {
    assert!(width >= 1 && width <= 8, "mask width must be within 1..=8");
    u8::MAX >> (8 - width)
}
