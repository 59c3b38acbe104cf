//! A simulated 93Cx6 chip driven through embedded-hal pin handles

#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{
	ErrorType,
	InputPin,
	OutputPin,
};

use eeprom_93cx6::{
	Config,
	Device,
	Geometry,
	Lines,
	Model,
	Organization,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Line {
	ChipSelect,
	Clock,
	DataIn,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
	Set(Line, bool),
	Read,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Target {
	Word(usize),
	All,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Pending {
	Write(usize, u16),
	WriteAll(u16),
	Erase(usize),
	EraseAll,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
	// waiting for a start bit
	Idle,
	Command { bits: u8, value: u32 },
	Data { target: Target, bits: u8, value: u32 },
	Reading { address: usize, remaining: u8 },
	// instruction complete, waiting for CS to drop
	Done,
}

pub struct Chip {
	pub geometry: Geometry,
	pub word_bits: u8,
	pub memory: Vec<u16>,
	pub write_enabled: bool,
	/// busy polls reported after each programming cycle
	pub busy_polls: u32,
	/// never finish a programming cycle
	pub stuck_busy: bool,
	/// drop erase/write instructions silently
	pub read_only: bool,
	pub events: Vec<Event>,
	chip_select: bool,
	clock: bool,
	data_in: bool,
	data_out: bool,
	phase: Phase,
	pending: Option<Pending>,
	busy: u32,
}

impl Chip {
	pub fn new(model: Model, organization: Organization) -> Self {
		let geometry = Geometry::resolve(organization, model);
		Chip {
			geometry,
			word_bits: organization.word_bits(),
			memory: vec![organization.word_mask(); geometry.word_count],
			write_enabled: false,
			busy_polls: 3,
			stuck_busy: false,
			read_only: false,
			events: Vec::new(),
			chip_select: false,
			clock: false,
			data_in: false,
			data_out: true,
			phase: Phase::Idle,
			pending: None,
			busy: 0,
		}
	}

	fn word_mask(&self) -> u16 {
		if self.word_bits == 16 { 0xffff } else { 0x00ff }
	}

	/// number of rising clock edges recorded
	pub fn clock_pulses(&self) -> usize {
		self.events.iter().filter(|ev| **ev == Event::Set(Line::Clock, true)).count()
	}

	/// number of transactions (rising chip select) recorded
	pub fn selects(&self) -> usize {
		self.events.iter().filter(|ev| **ev == Event::Set(Line::ChipSelect, true)).count()
	}

	fn set(&mut self, line: Line, level: bool) {
		self.events.push(Event::Set(line, level));
		match line {
			Line::ChipSelect => {
				if level && !self.chip_select {
					self.phase = Phase::Idle;
					self.data_out = true;
				} else if !level && self.chip_select {
					self.program();
					self.phase = Phase::Idle;
				}
				self.chip_select = level;
			},
			Line::Clock => {
				if level && !self.clock && self.chip_select {
					self.rising_edge();
				}
				self.clock = level;
			},
			Line::DataIn => self.data_in = level,
		}
	}

	fn program(&mut self) {
		let pending = match self.pending.take() {
			Some(p) => p,
			None => return,
		};
		if !self.write_enabled || self.read_only {
			return;
		}
		let mask = self.word_mask();
		match pending {
			Pending::Write(address, word) => self.memory[address] = word,
			Pending::WriteAll(word) => {
				for w in self.memory.iter_mut() {
					*w = word;
				}
			},
			Pending::Erase(address) => self.memory[address] = mask,
			Pending::EraseAll => {
				for w in self.memory.iter_mut() {
					*w = mask;
				}
			},
		}
		self.busy = self.busy_polls;
	}

	fn rising_edge(&mut self) {
		let bit = self.data_in as u32;
		let width = self.geometry.address_width;
		let phase = self.phase;
		self.phase = match phase {
			Phase::Idle => {
				if self.data_in {
					Phase::Command { bits: 0, value: 0 }
				} else {
					Phase::Idle
				}
			},
			Phase::Command { bits, value } => {
				let value = (value << 1) | bit;
				if bits + 1 == width + 2 {
					self.decode(value)
				} else {
					Phase::Command { bits: bits + 1, value }
				}
			},
			Phase::Data { target, bits, value } => {
				let value = (value << 1) | bit;
				if bits + 1 == self.word_bits {
					let word = value as u16;
					self.pending = Some(match target {
						Target::Word(address) => Pending::Write(address, word),
						Target::All => Pending::WriteAll(word),
					});
					Phase::Done
				} else {
					Phase::Data { target, bits: bits + 1, value }
				}
			},
			Phase::Reading { mut address, mut remaining } => {
				if 0 == remaining {
					address = (address + 1) % self.geometry.word_count;
					remaining = self.word_bits;
				}
				remaining -= 1;
				self.data_out = 0 != (self.memory[address] >> remaining) & 1;
				Phase::Reading { address, remaining }
			},
			Phase::Done => Phase::Done,
		};
	}

	fn decode(&mut self, value: u32) -> Phase {
		let width = self.geometry.address_width;
		let opcode = value >> width;
		let address = (value & self.geometry.address_mask as u32) as usize % self.geometry.word_count;
		match opcode {
			0b10 => {
				// dummy zero
				self.data_out = false;
				Phase::Reading { address, remaining: self.word_bits }
			},
			0b01 => Phase::Data { target: Target::Word(address), bits: 0, value: 0 },
			0b11 => {
				self.pending = Some(Pending::Erase(address));
				Phase::Done
			},
			_ => match (value >> (width - 2)) & 0b11 {
				0b00 => {
					self.write_enabled = false;
					Phase::Done
				},
				0b01 => Phase::Data { target: Target::All, bits: 0, value: 0 },
				0b10 => {
					self.pending = Some(Pending::EraseAll);
					Phase::Done
				},
				_ => {
					self.write_enabled = true;
					Phase::Done
				},
			},
		}
	}

	fn read(&mut self) -> bool {
		self.events.push(Event::Read);
		if !self.chip_select {
			return true;
		}
		match self.phase {
			Phase::Idle => {
				if self.stuck_busy && self.busy > 0 {
					false
				} else if self.busy > 0 {
					self.busy -= 1;
					false
				} else {
					true
				}
			},
			Phase::Reading { .. } => self.data_out,
			_ => true,
		}
	}
}

pub type SharedChip = Rc<RefCell<Chip>>;

pub struct Pin {
	chip: SharedChip,
	line: Line,
}

impl ErrorType for Pin {
	type Error = Infallible;
}

impl OutputPin for Pin {
	fn set_low(&mut self) -> Result<(), Infallible> {
		self.chip.borrow_mut().set(self.line, false);
		Ok(())
	}

	fn set_high(&mut self) -> Result<(), Infallible> {
		self.chip.borrow_mut().set(self.line, true);
		Ok(())
	}
}

pub struct DataOut {
	chip: SharedChip,
}

impl ErrorType for DataOut {
	type Error = Infallible;
}

impl InputPin for DataOut {
	fn is_high(&mut self) -> Result<bool, Infallible> {
		Ok(self.chip.borrow_mut().read())
	}

	fn is_low(&mut self) -> Result<bool, Infallible> {
		self.is_high().map(|level| !level)
	}
}

pub struct NoDelay;

impl DelayNs for NoDelay {
	fn delay_ns(&mut self, _ns: u32) {}
}

pub type SimLines = Lines<Pin, Pin, Pin, DataOut, NoDelay>;

pub fn lines(chip: &SharedChip) -> SimLines {
	Lines::new(
		Pin { chip: chip.clone(), line: Line::ChipSelect },
		Pin { chip: chip.clone(), line: Line::Clock },
		Pin { chip: chip.clone(), line: Line::DataIn },
		DataOut { chip: chip.clone() },
		NoDelay,
	)
}

pub fn chip(model: Model, organization: Organization) -> SharedChip {
	Rc::new(RefCell::new(Chip::new(model, organization)))
}

pub fn device_with_config(model: Model, organization: Organization, config: Config) -> (Device<SimLines>, SharedChip) {
	let chip = chip(model, organization);
	let device = Device::with_hardware(model, organization, lines(&chip), config);
	(device, chip)
}

pub fn device(model: Model, organization: Organization) -> (Device<SimLines>, SharedChip) {
	device_with_config(model, organization, Config::default())
}
