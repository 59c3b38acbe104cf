use std::fmt;

use super::geometry::{
	Geometry,
	Organization,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Opcode {
	Control = 0b00,
	Write = 0b01,
	Read = 0b10,
	Erase = 0b11,
}

/// Sub-commands of the CONTROL opcode, sent in the two high address bits
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Control {
	EraseWriteDisable = 0b00,
	WriteAll = 0b01,
	EraseAll = 0b10,
	EraseWriteEnable = 0b11,
}

/// A value to shift out MSB first, `len` bits wide
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
	pub value: u32,
	pub len: u8,
}

impl Frame {
	pub const START: Frame = Frame { value: 1, len: 1 };

	pub fn control(geometry: &Geometry, control: Control) -> Self {
		let width = geometry.address_width;
		Frame {
			value: ((Opcode::Control as u32) << width) | ((control as u32) << (width - 2)),
			len: width + 2,
		}
	}

	// no bounds check here; callers validate against the geometry first
	pub fn addressed(geometry: &Geometry, opcode: Opcode, address: usize) -> Self {
		let width = geometry.address_width;
		Frame {
			value: ((opcode as u32) << width) | (address as u32 & geometry.address_mask as u32),
			len: width + 2,
		}
	}

	pub fn data(organization: Organization, word: u32) -> Self {
		Frame {
			value: word & organization.word_mask() as u32,
			len: organization.word_bits(),
		}
	}
}

impl fmt::Debug for Frame {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:0width$b}", self.value, width = self.len as usize)
	}
}
