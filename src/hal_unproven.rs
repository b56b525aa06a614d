use core::{fmt::Debug, marker::PhantomData};

use embedded_hal_old::adc::{Channel, OneShot};

use crate::{AdcChannel, AnalogInput};

/// [`AnalogInput`] on top of an embedded-hal 0.2 one-shot ADC.
///
/// `discharge` is the pin wired to the host DAC, `analog_out` the pin wired to
/// the ISL94208 analog output.
pub struct OneShotInput<ADC, A, DP, AP> {
    adc: A,
    discharge: DP,
    analog_out: AP,
    selected: AdcChannel,
    _adc: PhantomData<ADC>,
}

impl<ADC, A, DP, AP> OneShotInput<ADC, A, DP, AP> {
    pub fn new(adc: A, discharge: DP, analog_out: AP) -> Self {
        Self {
            adc,
            discharge,
            analog_out,
            selected: AdcChannel::AnalogOut,
            _adc: PhantomData,
        }
    }

    pub fn destroy(self) -> (A, DP, AP) {
        let Self {
            adc,
            discharge,
            analog_out,
            ..
        } = self;
        (adc, discharge, analog_out)
    }
}

impl<ADC, A, DP, AP, E> AnalogInput for OneShotInput<ADC, A, DP, AP>
where
    A: OneShot<ADC, u16, DP, Error = E> + OneShot<ADC, u16, AP, Error = E>,
    DP: Channel<ADC>,
    AP: Channel<ADC>,
    E: Debug,
{
    type Error = E;

    fn select(&mut self, channel: AdcChannel) {
        self.selected = channel;
    }

    fn convert(&mut self) -> nb::Result<u16, E> {
        match self.selected {
            AdcChannel::Discharge => self.adc.read(&mut self.discharge),
            AdcChannel::AnalogOut => self.adc.read(&mut self.analog_out),
        }
    }
}
