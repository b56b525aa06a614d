use std::{cell::RefCell, collections::BTreeSet, rc::Rc, vec::Vec};

use embedded_hal::{
    delay::DelayNs,
    i2c::{self, ErrorKind, Operation},
};

use crate::{AdcChannel, AnalogInput, Register, VoltageOutput, REGISTER_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Read(Register),
    Write(Register, u8),
    BusFault,
    SetOutput(u16),
    Select(AdcChannel),
    DelayUs(u32),
    Convert,
}

/// Register file of the simulated chip plus everything the driver did to it
/// and to the host peripherals, in order.
#[derive(Default)]
pub struct Bench {
    pub regs: [u8; REGISTER_COUNT],
    pub events: Vec<Event>,
    pub bus_fault: Option<ErrorKind>,
    /// Raw sample per analog output selector value.
    pub raw: [u16; 16],
    /// Selectors whose conversion reports an error.
    pub conversion_faults: BTreeSet<u8>,
    pub panic_on_convert: bool,
}

pub type SharedBench = Rc<RefCell<Bench>>;

pub fn bench() -> SharedBench {
    Rc::new(RefCell::new(Bench::default()))
}

impl Bench {
    pub fn reg(&self, reg: Register) -> u8 {
        self.regs[reg as usize]
    }

    pub fn set_reg(&mut self, reg: Register, val: u8) {
        self.regs[reg as usize] = val;
    }

    pub fn writes_to(&self, reg: Register) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                Event::Write(r, val) if r == reg => Some(val),
                _ => None,
            })
            .collect()
    }

    fn selector(&self) -> u8 {
        self.reg(Register::AnalogOut) & 0x0F
    }
}

fn register(addr: u8) -> Register {
    Register::ALL
        .into_iter()
        .find(|r| r.addr() == addr)
        .unwrap_or_else(|| panic!("no register at {addr:#04x}"))
}

#[derive(Debug)]
pub struct FakeI2cError(ErrorKind);

impl i2c::Error for FakeI2cError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

pub struct FakeI2c {
    pub address: u8,
    pub bench: SharedBench,
}

impl i2c::ErrorType for FakeI2c {
    type Error = FakeI2cError;
}

impl i2c::I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        assert_eq!(address, self.address);

        let mut bench = self.bench.borrow_mut();

        if let Some(kind) = bench.bus_fault {
            bench.events.push(Event::BusFault);
            return Err(FakeI2cError(kind));
        }

        match operations {
            [Operation::Write(request), Operation::Read(buf)] => {
                assert_eq!((request.len(), buf.len()), (1, 1));

                let reg = register(request[0]);
                buf[0] = bench.reg(reg);
                bench.events.push(Event::Read(reg));
            }
            [Operation::Write(bytes)] => {
                assert_eq!(bytes.len(), 2);

                let reg = register(bytes[0]);
                bench.set_reg(reg, bytes[1]);
                bench.events.push(Event::Write(reg, bytes[1]));
            }
            _ => panic!("unexpected transaction"),
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConversionFailed;

pub struct FakeAdc {
    pub bench: SharedBench,
    selected: Option<AdcChannel>,
    busy: bool,
}

impl FakeAdc {
    pub fn new(bench: SharedBench) -> Self {
        Self {
            bench,
            selected: None,
            busy: false,
        }
    }
}

impl AnalogInput for FakeAdc {
    type Error = ConversionFailed;

    fn select(&mut self, channel: AdcChannel) {
        self.selected = Some(channel);
        self.bench.borrow_mut().events.push(Event::Select(channel));
    }

    fn convert(&mut self) -> nb::Result<u16, ConversionFailed> {
        let mut bench = self.bench.borrow_mut();
        bench.events.push(Event::Convert);

        assert_eq!(self.selected, Some(AdcChannel::AnalogOut));

        if bench.panic_on_convert {
            drop(bench);
            panic!("adc fault");
        }

        // Every conversion takes one extra poll.
        if !self.busy {
            self.busy = true;
            return Err(nb::Error::WouldBlock);
        }
        self.busy = false;

        let selector = bench.selector();
        if bench.conversion_faults.contains(&selector) {
            return Err(nb::Error::Other(ConversionFailed));
        }

        Ok(bench.raw[selector as usize])
    }
}

pub struct FakeDac(pub SharedBench);

impl VoltageOutput for FakeDac {
    fn set_output(&mut self, value: u16) {
        self.0.borrow_mut().events.push(Event::SetOutput(value));
    }
}

pub struct FakeDelay(pub SharedBench);

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns / 1_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().events.push(Event::DelayUs(us));
    }
}
