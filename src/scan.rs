use core::fmt::Debug;

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::cells::CellVoltages;
use crate::constants::{AnalogOut, Cell, ANALOG_OUT_SELECT, CELL_COUNT};
use crate::{ErrorFlags, Isl94208};

/// Time to drain the ADC sample/hold capacitor through the DAC input.
const DISCHARGE_US: u32 = 1;
/// Maximum analog output stabilization time of the ISL94208.
const AO_SETTLE_US: u32 = 100;

const ADC_MAX: u16 = 1023;
const REFERENCE_MV: u32 = 2500;
/// External divider in front of the ADC input.
const GAIN: u32 = 2;
const FULL_SCALE: u32 = 1024;

/// Host ADC inputs used by the scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    /// Input wired to the host DAC, held at 0 V during a scan.
    Discharge,
    /// Input wired to the ISL94208 analog output pin.
    AnalogOut,
}

pub trait AnalogInput {
    type Error: Debug;

    fn select(&mut self, channel: AdcChannel);

    /// Starts or polls a 10-bit conversion of the selected channel.
    fn convert(&mut self) -> nb::Result<u16, Self::Error>;
}

pub trait VoltageOutput {
    fn set_output(&mut self, value: u16);
}

/// Converts a 10-bit sample to millivolts, rounding towards zero.
///
/// Samples above full scale are clamped.
pub const fn adc_to_millivolts(raw: u16) -> u16 {
    let raw = if raw > ADC_MAX { ADC_MAX } else { raw };
    (raw as u32 * REFERENCE_MV * GAIN / FULL_SCALE) as u16
}

/// Routes a node onto the analog output pin and switches the pin off again
/// when dropped.
struct AnalogOutGuard<'a, I2C: I2c> {
    afe: &'a mut Isl94208<I2C>,
    errors: &'a mut ErrorFlags,
}

impl<'a, I2C: I2c> AnalogOutGuard<'a, I2C> {
    fn select(
        afe: &'a mut Isl94208<I2C>,
        selector: AnalogOut,
        errors: &'a mut ErrorFlags,
    ) -> Self {
        afe.set_field(ANALOG_OUT_SELECT, selector as u8, errors);
        Self { afe, errors }
    }
}

impl<I2C: I2c> Drop for AnalogOutGuard<'_, I2C> {
    fn drop(&mut self) {
        self.afe
            .set_field(ANALOG_OUT_SELECT, AnalogOut::Off as u8, self.errors);
    }
}

/// Samples the ISL94208 analog output with a host ADC.
pub struct AnalogScan<ADC, DAC, D> {
    adc: ADC,
    dac: DAC,
    delay: D,
}

impl<ADC, DAC, D> AnalogScan<ADC, DAC, D>
where
    ADC: AnalogInput,
    DAC: VoltageOutput,
    D: DelayNs,
{
    pub fn new(adc: ADC, dac: DAC, delay: D) -> Self {
        Self { adc, dac, delay }
    }

    pub fn destroy(self) -> (ADC, DAC, D) {
        let Self { adc, dac, delay } = self;
        (adc, dac, delay)
    }

    /// Reads one node through the analog output pin, in millivolts.
    ///
    /// The pin is always switched off afterwards. A failed conversion is
    /// recorded as [`ErrorFlags::CONVERSION`] and reads as 0 mV.
    pub fn read_channel<I2C: I2c>(
        &mut self,
        afe: &mut Isl94208<I2C>,
        selector: AnalogOut,
        errors: &mut ErrorFlags,
    ) -> u16 {
        // Empty the sample/hold capacitor before switching to the AFE.
        self.dac.set_output(0);
        self.adc.select(AdcChannel::Discharge);
        self.delay.delay_us(DISCHARGE_US);
        self.adc.select(AdcChannel::AnalogOut);

        let raw = {
            let mut guard = AnalogOutGuard::select(afe, selector, errors);
            self.delay.delay_us(AO_SETTLE_US);

            match nb::block!(self.adc.convert()) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("conversion of {:?} failed: {:?}", selector, e);
                    *guard.errors |= ErrorFlags::CONVERSION;
                    0
                }
            }
        };

        let millivolts = adc_to_millivolts(raw);
        log::debug!("{:?}: {} ({} mV)", selector, raw, millivolts);
        millivolts
    }

    /// Reads cells 1 through 6 in order. Every cell is attempted even if
    /// earlier ones failed.
    pub fn read_all_cells<I2C: I2c>(
        &mut self,
        afe: &mut Isl94208<I2C>,
        errors: &mut ErrorFlags,
    ) -> CellVoltages {
        let mut millivolts = [0; CELL_COUNT];

        for cell in Cell::ALL {
            millivolts[cell.slot()] = self.read_channel(afe, cell.analog_out(), errors);
        }

        CellVoltages::from_millivolts(millivolts)
    }
}
