use super::command::Frame;
use super::config::{
	Config,
	ReadyWait,
};
use super::hardware::Hardware;

use crate::{
	Error,
	Result,
};

/// Owns the lines and the timing configuration; hands out one transaction at a time
pub struct Bus<H> {
	hardware: H,
	config: Config,
}

impl<H: Hardware> Bus<H> {
	pub fn new(hardware: H, config: Config) -> Self {
		Bus {
			hardware,
			config,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn into_hardware(self) -> H {
		self.hardware
	}

	// SK idles low; raise CS, wait for it to settle and clock in the start bit
	pub fn start_transaction(&mut self) -> Result<Transaction<H>> {
		self.hardware.set_clock(false)?;
		self.hardware.set_chip_select(true)?;
		let mut tx = Transaction {
			bus: self,
			active: true,
		};
		let settle = tx.bus.config.delays.chip_select;
		tx.bus.hardware.delay_us(settle);
		tx.send(Frame::START)?;
		Ok(tx)
	}
}

/// Chip select is asserted for the lifetime of a transaction
///
/// Dropping it deasserts CS; use `finish` or `finish_program` to see errors.
pub struct Transaction<'a, H: Hardware> {
	bus: &'a mut Bus<H>,
	active: bool,
}

impl<'a, H: Hardware> Transaction<'a, H> {
	fn hw(&mut self) -> &mut H {
		&mut self.bus.hardware
	}

	// clock one bit out on DI; the chip latches it on the rising SK edge
	fn clock_out(&mut self, bit: bool) -> Result<()> {
		let delay = self.bus.config.delays.write;
		let hw = self.hw();
		hw.set_data_in(bit)?;
		hw.delay_us(delay);
		hw.set_clock(true)?;
		hw.delay_us(delay);
		hw.set_clock(false)?;
		hw.delay_us(delay);
		Ok(())
	}

	/// shift `frame.len` bits out, highest bit first
	pub fn send(&mut self, frame: Frame) -> Result<()> {
		for bit in (0..frame.len).rev() {
			self.clock_out(0 != frame.value & (1u32 << bit))?;
		}
		Ok(())
	}

	/// shift one bit out and sample DO once SK is low again
	pub fn send_and_sample(&mut self, bit: bool) -> Result<bool> {
		self.clock_out(bit)?;
		self.hw().read_data_out()
	}

	/// shift `len` bits in, highest bit first; DO is sampled while SK is high
	pub fn receive(&mut self, len: u8) -> Result<u32> {
		let delay = self.bus.config.delays.read;
		let hw = self.hw();
		let mut result = 0u32;
		for bit in (0..len).rev() {
			hw.set_clock(true)?;
			hw.delay_us(delay);
			let level = hw.read_data_out()?;
			hw.set_clock(false)?;
			hw.delay_us(delay);
			if level {
				result |= 1u32 << bit;
			}
		}
		Ok(result)
	}

	/// end a transaction that does not start a programming cycle
	pub fn finish(mut self) -> Result<()> {
		self.active = false;
		self.hw().set_chip_select(false)
	}

	/// end an erase/write transaction and wait for its self-timed cycle
	///
	/// Dropping CS starts the cycle; with CS raised again the chip holds DO
	/// low while busy and releases it to high once ready.
	pub fn finish_program(mut self) -> Result<()> {
		let delays = self.bus.config.delays;
		let ready_wait = self.bus.config.ready_wait;
		let trace = self.bus.config.trace_frames;

		let hw = self.hw();
		hw.set_chip_select(false)?;
		hw.delay_us(delays.chip_select);
		hw.set_chip_select(true)?;
		hw.delay_us(delays.chip_select);

		let mut polls = 0u32;
		while !self.hw().read_data_out()? {
			polls += 1;
			if let ReadyWait::Bounded { max_polls } = ready_wait {
				if polls >= max_polls {
					error!("chip still busy after {} polls, giving up", polls);
					// drop deasserts CS
					return Err(Error::HardwareTimeout { polls });
				}
			}
			self.hw().delay_us(delays.wait);
		}
		if trace {
			debug!("ready after {} busy polls", polls);
		}

		self.finish()
	}
}

impl<'a, H: Hardware> Drop for Transaction<'a, H> {
	fn drop(&mut self) {
		if self.active {
			if let Err(e) = self.hw().set_chip_select(false) {
				warn!("couldn't deassert chip select: {}", e);
			}
		}
	}
}
