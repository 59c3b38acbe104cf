use std::convert::TryFrom;
use std::ops::{
	Deref,
	DerefMut,
};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{
	InputPin,
	OutputPin,
};

use super::command::{
	Control,
	Frame,
	Opcode,
};
use super::config::Config;
use super::geometry::{
	Geometry,
	Model,
	Organization,
};
use super::hardware::{
	Hardware,
	Lines,
};
use super::low_level::{
	Bus,
	Transaction,
};

use crate::{
	Error,
	Result,
};

// longest address the dummy-zero probe clocks before giving up
const MAX_ADDRESS_WIDTH: u8 = 16;

/// A 93Cx6 EEPROM on four exclusively owned lines
///
/// Erase and write operations are silently skipped unless erase/write was
/// enabled with `enable_write` (or `programming`), mirroring the chip's own
/// write protection.
pub struct Device<H: Hardware> {
	model: Model,
	organization: Organization,
	geometry: Geometry,
	write_enabled: bool,
	bus: Bus<H>,
}

impl<CS, SK, DI, DO, D> Device<Lines<CS, SK, DI, DO, D>>
where
	CS: OutputPin,
	SK: OutputPin,
	DI: OutputPin,
	DO: InputPin,
	D: DelayNs,
{
	pub fn new(
		model: Model,
		organization: Organization,
		chip_select: CS,
		clock: SK,
		data_in: DI,
		data_out: DO,
		delay: D,
	) -> Self {
		Device::with_hardware(model, organization, Lines::new(chip_select, clock, data_in, data_out, delay), Config::default())
	}
}

impl<H: Hardware> Device<H> {
	/// No line is touched until the first operation.
	pub fn with_hardware(model: Model, organization: Organization, hardware: H, config: Config) -> Self {
		let geometry = Geometry::resolve(organization, model);
		if config.trace_frames {
			debug!("{} {}: {:?}", model, organization, geometry);
		}
		Device {
			model,
			organization,
			geometry,
			write_enabled: false,
			bus: Bus::new(hardware, config),
		}
	}

	/// Validates model number (46, 56, ...) and word width (8 or 16) first.
	pub fn from_part(model: u32, word_bits: u32, hardware: H, config: Config) -> Result<Self> {
		let model = Model::try_from(model)?;
		let organization = Organization::try_from(word_bits)?;
		Ok(Device::with_hardware(model, organization, hardware, config))
	}

	pub fn model(&self) -> Model {
		self.model
	}

	pub fn organization(&self) -> Organization {
		self.organization
	}

	pub fn geometry(&self) -> &Geometry {
		&self.geometry
	}

	pub fn config(&self) -> &Config {
		self.bus.config()
	}

	pub fn release(self) -> H {
		self.bus.into_hardware()
	}

	fn trace(&self, what: &str, frame: Frame) {
		if self.bus.config().trace_frames {
			debug!("{}: {:?} ({} bits)", what, frame, frame.len);
		}
	}

	fn skipped(&self, what: &str) -> bool {
		if !self.write_enabled {
			debug!("{} skipped: erase/write disabled", what);
			return true;
		}
		false
	}

	fn control(&mut self, what: &str, control: Control) -> Result<Transaction<H>> {
		let frame = Frame::control(&self.geometry, control);
		self.trace(what, frame);
		let mut tx = self.bus.start_transaction()?;
		tx.send(frame)?;
		Ok(tx)
	}

	fn addressed(&mut self, what: &str, opcode: Opcode, address: usize) -> Result<Transaction<H>> {
		let frame = Frame::addressed(&self.geometry, opcode, address);
		self.trace(what, frame);
		let mut tx = self.bus.start_transaction()?;
		tx.send(frame)?;
		Ok(tx)
	}

	/// EWEN
	pub fn enable_write(&mut self) -> Result<()> {
		self.control("EWEN", Control::EraseWriteEnable)?.finish()?;
		self.write_enabled = true;
		Ok(())
	}

	/// EWDS
	pub fn disable_write(&mut self) -> Result<()> {
		self.control("EWDS", Control::EraseWriteDisable)?.finish()?;
		self.write_enabled = false;
		Ok(())
	}

	pub fn is_write_enabled(&self) -> bool {
		self.write_enabled
	}

	/// Enable erase/write until the returned guard is dropped
	///
	/// If writes were already enabled the guard leaves them enabled.
	pub fn programming(&mut self) -> Result<ProgrammingEnabled<H>> {
		let restore = !self.write_enabled;
		if restore {
			self.enable_write()?;
		}
		Ok(ProgrammingEnabled {
			device: self,
			restore,
		})
	}

	/// ERAL: set every bit to 1
	pub fn erase_all(&mut self) -> Result<()> {
		if self.skipped("ERAL") {
			return Ok(());
		}
		self.control("ERAL", Control::EraseAll)?.finish_program()
	}

	/// WRAL: write `word` (masked to the word width) to every address
	pub fn write_all(&mut self, word: u32) -> Result<()> {
		if self.skipped("WRAL") {
			return Ok(());
		}
		let data = Frame::data(self.organization, word);
		let mut tx = self.control("WRAL", Control::WriteAll)?;
		tx.send(data)?;
		tx.finish_program()
	}

	/// ERASE: set every bit at `address` to 1
	pub fn erase(&mut self, address: usize) -> Result<()> {
		if self.skipped("ERASE") {
			return Ok(());
		}
		self.geometry.check_address(address)?;
		self.addressed("ERASE", Opcode::Erase, address)?.finish_program()
	}

	/// WRITE `word` (masked to the word width) at `address`
	pub fn write(&mut self, address: usize, word: u32) -> Result<()> {
		if self.skipped("WRITE") {
			return Ok(());
		}
		self.geometry.check_address(address)?;
		let data = Frame::data(self.organization, word);
		let mut tx = self.addressed("WRITE", Opcode::Write, address)?;
		tx.send(data)?;
		tx.finish_program()
	}

	pub fn read(&mut self, address: usize) -> Result<u16> {
		self.geometry.check_address(address)?;
		let word_bits = self.organization.word_bits();
		let mut tx = self.addressed("READ", Opcode::Read, address)?;
		let word = tx.receive(word_bits)? as u16;
		tx.finish()?;
		Ok(word)
	}

	/// Read up to `count` consecutive words starting at `address`
	///
	/// The chip is addressed once and advances its own pointer; the reader
	/// stops at the end of memory.
	pub fn read_iter(&mut self, address: usize, count: usize) -> Result<Reader<H>> {
		self.geometry.check_address(address)?;
		let remaining = count.min(self.geometry.word_count - address);
		let word_bits = self.organization.word_bits();
		let transaction = self.addressed("READ", Opcode::Read, address)?;
		Ok(Reader {
			remaining,
			word_bits,
			transaction: Some(transaction),
		})
	}

	pub fn read_sequential(&mut self, address: usize, count: usize) -> Result<Vec<u16>> {
		self.read_iter(address, count)?.collect()
	}

	pub fn read_all(&mut self) -> Result<Vec<u16>> {
		let word_count = self.geometry.word_count;
		self.read_sequential(0, word_count)
	}

	/// Count the address bits the wired chip expects
	///
	/// Clocks zero address bits after a READ opcode until the chip answers
	/// with its dummy zero bit.
	pub fn detect_address_width(&mut self) -> Result<u8> {
		let trace = self.bus.config().trace_frames;
		let configured = self.geometry.address_width;
		let mut tx = self.bus.start_transaction()?;
		tx.send(Frame { value: Opcode::Read as u32, len: 2 })?;
		for width in 1..=MAX_ADDRESS_WIDTH {
			if !tx.send_and_sample(false)? {
				tx.finish()?;
				if trace {
					debug!("detected {} address bits, configured {}", width, configured);
				}
				return Ok(width);
			}
		}
		Err(Error::AddressWidthNotDetected)
	}

	/// Replace the memory contents from address 0 with `image` and verify it
	///
	/// Words after the image end up erased.
	pub fn program(&mut self, image: &[u16]) -> Result<()> {
		if image.len() > self.geometry.word_count {
			return Err(Error::AddressOutOfRange {
				address: self.geometry.word_count,
				word_count: self.geometry.word_count,
			});
		}
		{
			let mut prog = self.programming()?;
			prog.erase_all()?;
			for (address, &word) in image.iter().enumerate() {
				prog.write(address, word as u32)?;
			}
		}

		let word_mask = self.organization.word_mask();
		let flash = self.read_sequential(0, image.len())?;
		for (address, (&expected, &actual)) in image.iter().zip(flash.iter()).enumerate() {
			let expected = expected & word_mask;
			if expected != actual {
				return Err(Error::VerifyFailed {
					address,
					expected,
					actual,
				});
			}
		}
		info!("programmed and verified {} words", image.len());
		Ok(())
	}
}

/// Words of a sequential read; chip select stays asserted until the reader
/// is exhausted or dropped.
pub struct Reader<'a, H: Hardware> {
	remaining: usize,
	word_bits: u8,
	transaction: Option<Transaction<'a, H>>,
}

impl<'a, H: Hardware> Iterator for Reader<'a, H> {
	type Item = Result<u16>;

	fn next(&mut self) -> Option<Self::Item> {
		let mut tx = self.transaction.take()?;
		if 0 == self.remaining {
			return match tx.finish() {
				Ok(()) => None,
				Err(e) => Some(Err(e)),
			};
		}
		self.remaining -= 1;
		match tx.receive(self.word_bits) {
			Ok(word) => {
				self.transaction = Some(tx);
				Some(Ok(word as u16))
			},
			Err(e) => Some(Err(e)),
		}
	}
}

/// Erase/write enabled device; disables erase/write again when dropped
pub struct ProgrammingEnabled<'a, H: Hardware> {
	device: &'a mut Device<H>,
	restore: bool,
}

impl<'a, H: Hardware> Drop for ProgrammingEnabled<'a, H> {
	fn drop(&mut self) {
		if self.restore {
			if let Err(e) = self.device.disable_write() {
				error!("Couldn't disable Erase/Write mode: {}", e);
			}
		}
	}
}

impl<'a, H: Hardware> Deref for ProgrammingEnabled<'a, H> {
	type Target = Device<H>;

	fn deref(&self) -> &Self::Target {
		&self.device
	}
}

impl<'a, H: Hardware> DerefMut for ProgrammingEnabled<'a, H> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.device
	}
}
