use std::thread;
use std::time::{
	Duration,
	Instant,
};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{
	Error as _,
	InputPin,
	OutputPin,
};

use crate::{
	Error,
	Result,
};

/// The four lines of the 93Cx6 serial interface plus a delay source
pub trait Hardware {
	fn set_chip_select(&mut self, high: bool) -> Result<()>;
	fn set_clock(&mut self, high: bool) -> Result<()>;
	fn set_data_in(&mut self, high: bool) -> Result<()>;
	fn read_data_out(&mut self) -> Result<bool>;

	// block for (at least) `us` microseconds
	fn delay_us(&mut self, us: u32);
}

fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// `DelayNs` for hosted targets, on top of `thread::sleep`
#[derive(Clone, Copy, Debug, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
	fn delay_ns(&mut self, ns: u32) {
		reliable_sleep(Duration::from_nanos(ns as u64));
	}
}

fn set_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<()> {
	let res = if high { pin.set_high() } else { pin.set_low() };
	res.map_err(|e| Error::Pin(e.kind()))
}

/// `Hardware` on top of embedded-hal pins
///
/// CS, SK and DI must already be configured as outputs, DO as input; the
/// pins are never reconfigured.
pub struct Lines<CS, SK, DI, DO, D> {
	chip_select: CS,
	clock: SK,
	data_in: DI,
	data_out: DO,
	delay: D,
}

impl<CS, SK, DI, DO, D> Lines<CS, SK, DI, DO, D>
where
	CS: OutputPin,
	SK: OutputPin,
	DI: OutputPin,
	DO: InputPin,
	D: DelayNs,
{
	pub fn new(chip_select: CS, clock: SK, data_in: DI, data_out: DO, delay: D) -> Self {
		Lines {
			chip_select,
			clock,
			data_in,
			data_out,
			delay,
		}
	}

	pub fn release(self) -> (CS, SK, DI, DO, D) {
		(self.chip_select, self.clock, self.data_in, self.data_out, self.delay)
	}
}

impl<CS, SK, DI, DO, D> Hardware for Lines<CS, SK, DI, DO, D>
where
	CS: OutputPin,
	SK: OutputPin,
	DI: OutputPin,
	DO: InputPin,
	D: DelayNs,
{
	fn set_chip_select(&mut self, high: bool) -> Result<()> {
		set_level(&mut self.chip_select, high)
	}

	fn set_clock(&mut self, high: bool) -> Result<()> {
		set_level(&mut self.clock, high)
	}

	fn set_data_in(&mut self, high: bool) -> Result<()> {
		set_level(&mut self.data_in, high)
	}

	fn read_data_out(&mut self) -> Result<bool> {
		self.data_out.is_high().map_err(|e| Error::Pin(e.kind()))
	}

	fn delay_us(&mut self, us: u32) {
		if us > 0 {
			self.delay.delay_us(us);
		}
	}
}

impl<H: Hardware + ?Sized> Hardware for &mut H {
	fn set_chip_select(&mut self, high: bool) -> Result<()> {
		(**self).set_chip_select(high)
	}

	fn set_clock(&mut self, high: bool) -> Result<()> {
		(**self).set_clock(high)
	}

	fn set_data_in(&mut self, high: bool) -> Result<()> {
		(**self).set_data_in(high)
	}

	fn read_data_out(&mut self) -> Result<bool> {
		(**self).read_data_out()
	}

	fn delay_us(&mut self, us: u32) {
		(**self).delay_us(us)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn std_delay_waits_at_least() {
		let start = Instant::now();
		StdDelay.delay_us(200);
		assert!(start.elapsed() >= Duration::from_micros(200));
	}
}
