use crate::field::Field;

/// 7-bit bus address of the ISL94208.
pub const DEVICE_ADDRESS: u8 = 0x28;

pub const REGISTER_COUNT: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Config = 0x00,
    Status,
    CellBalance,
    AnalogOut,
    FetControl,
    DischargeSet,
    DischargeTime,
    FeatureSet,
    WriteEnable = 0x08,
}

impl Register {
    pub const ALL: [Register; REGISTER_COUNT] = [
        Register::Config,
        Register::Status,
        Register::CellBalance,
        Register::AnalogOut,
        Register::FetControl,
        Register::DischargeSet,
        Register::DischargeTime,
        Register::FeatureSet,
        Register::WriteEnable,
    ];

    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Analog output multiplexer selector
pub const ANALOG_OUT_SELECT: Field = Field::new(Register::AnalogOut, 0, 4);

/// Cell balancing switches, one bit per cell starting at cell 1.
pub const CELL_BALANCE: Field = Field::new(Register::CellBalance, 0, 6);

pub const DFET: Field = Field::new(Register::FetControl, 0, 1);
pub const CFET: Field = Field::new(Register::FetControl, 1, 1);

/// Wake-up input polarity.
pub const WKPOL: Field = Field::new(Register::FeatureSet, 0, 1);

/// Must be set before the feature set register accepts writes.
pub const ENABLE_FEAT_SET_WRITES: Field = Field::new(Register::WriteEnable, 7, 1);

/// Node routed onto the analog output pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AnalogOut {
    Off = 0b0000,
    VCell1 = 0b0001,
    VCell2 = 0b0010,
    VCell3 = 0b0011,
    VCell4 = 0b0100,
    VCell5 = 0b0101,
    VCell6 = 0b0110,
}

pub const CELL_COUNT: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Cell {
    Cell1 = 1,
    Cell2,
    Cell3,
    Cell4,
    Cell5,
    Cell6,
}

impl Cell {
    pub const ALL: [Cell; CELL_COUNT] = [
        Cell::Cell1,
        Cell::Cell2,
        Cell::Cell3,
        Cell::Cell4,
        Cell::Cell5,
        Cell::Cell6,
    ];

    /// 1-based cell number.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn from_index(index: u8) -> Option<Cell> {
        match index {
            1 => Some(Cell::Cell1),
            2 => Some(Cell::Cell2),
            3 => Some(Cell::Cell3),
            4 => Some(Cell::Cell4),
            5 => Some(Cell::Cell5),
            6 => Some(Cell::Cell6),
            _ => None,
        }
    }

    pub const fn analog_out(self) -> AnalogOut {
        match self {
            Cell::Cell1 => AnalogOut::VCell1,
            Cell::Cell2 => AnalogOut::VCell2,
            Cell::Cell3 => AnalogOut::VCell3,
            Cell::Cell4 => AnalogOut::VCell4,
            Cell::Cell5 => AnalogOut::VCell5,
            Cell::Cell6 => AnalogOut::VCell6,
        }
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self as usize - 1
    }
}
