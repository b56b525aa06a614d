use core::ops::Index;

use crate::constants::{Cell, CELL_COUNT};

/// Voltages of all cells from one scan, in millivolts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CellVoltages([u16; CELL_COUNT]);

impl CellVoltages {
    /// `millivolts[0]` belongs to cell 1.
    pub const fn from_millivolts(millivolts: [u16; CELL_COUNT]) -> Self {
        Self(millivolts)
    }

    pub const fn as_millivolts(&self) -> &[u16; CELL_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, u16)> + '_ {
        Cell::ALL.iter().map(move |&cell| (cell, self[cell]))
    }

    /// Highest cell. Ties go to the lowest cell number.
    pub fn max_cell(&self) -> Cell {
        self.select(|candidate, best| candidate > best)
    }

    /// Lowest cell. Ties go to the lowest cell number.
    pub fn min_cell(&self) -> Cell {
        self.select(|candidate, best| candidate < best)
    }

    /// Spread between the highest and lowest cell.
    pub fn delta(&self) -> u16 {
        self[self.max_cell()] - self[self.min_cell()]
    }

    /// Sum of all cells, i.e. the stack voltage.
    pub fn total(&self) -> u32 {
        self.0.iter().map(|&mv| mv as u32).sum()
    }

    fn select(&self, replaces: impl Fn(u16, u16) -> bool) -> Cell {
        let mut best = Cell::Cell1;

        for &cell in &Cell::ALL[1..] {
            if replaces(self[cell], self[best]) {
                best = cell;
            }
        }

        best
    }
}

impl Index<Cell> for CellVoltages {
    type Output = u16;

    #[inline]
    fn index(&self, cell: Cell) -> &u16 {
        &self.0[cell.slot()]
    }
}
