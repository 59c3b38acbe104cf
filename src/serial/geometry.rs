use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::{
	Error,
	Result,
};

/// Capacity variant of the 93Cx6 family
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Model {
	C46,
	C56,
	C66,
	C76,
	C86,
}

impl Model {
	pub const ALL: [Model; 5] = [Model::C46, Model::C56, Model::C66, Model::C76, Model::C86];

	pub fn number(self) -> u32 {
		match self {
			Model::C46 => 46,
			Model::C56 => 56,
			Model::C66 => 66,
			Model::C76 => 76,
			Model::C86 => 86,
		}
	}
}

impl TryFrom<u32> for Model {
	type Error = Error;

	fn try_from(number: u32) -> Result<Self> {
		match number {
			46 => Ok(Model::C46),
			56 => Ok(Model::C56),
			66 => Ok(Model::C66),
			76 => Ok(Model::C76),
			86 => Ok(Model::C86),
			_ => Err(Error::UnsupportedModel(number)),
		}
	}
}

impl FromStr for Model {
	type Err = Error;

	// accepts "46", "93C46" and "93c46"
	fn from_str(s: &str) -> Result<Self> {
		let digits = match s.get(..3) {
			Some(prefix) if prefix.eq_ignore_ascii_case("93c") => &s[3..],
			_ => s,
		};
		let number = digits.parse::<u32>().map_err(|_| Error::UnknownModelName(s.to_string()))?;
		Model::try_from(number)
	}
}

impl fmt::Display for Model {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "93C{}", self.number())
	}
}

/// Word width the chip is strapped to (ORG pin)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Organization {
	EightBit,
	SixteenBit,
}

impl Organization {
	pub fn word_bits(self) -> u8 {
		match self {
			Organization::EightBit => 8,
			Organization::SixteenBit => 16,
		}
	}

	pub fn word_mask(self) -> u16 {
		match self {
			Organization::EightBit => 0x00ff,
			Organization::SixteenBit => 0xffff,
		}
	}
}

impl TryFrom<u32> for Organization {
	type Error = Error;

	fn try_from(word_bits: u32) -> Result<Self> {
		match word_bits {
			8 => Ok(Organization::EightBit),
			16 => Ok(Organization::SixteenBit),
			_ => Err(Error::UnsupportedOrganization(word_bits)),
		}
	}
}

impl FromStr for Organization {
	type Err = Error;

	// accepts "8", "16", "x8" and "x16"
	fn from_str(s: &str) -> Result<Self> {
		let digits = s.trim_start_matches(|c: char| c == 'x' || c == 'X');
		let word_bits = digits.parse::<u32>().map_err(|_| Error::UnknownOrganizationName(s.to_string()))?;
		Organization::try_from(word_bits)
	}
}

impl fmt::Display for Organization {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "x{}", self.word_bits())
	}
}

/// Memory layout derived from model and organization
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Geometry {
	pub word_count: usize,
	pub address_width: u8,
	pub address_mask: u16,
}

impl Geometry {
	pub fn resolve(organization: Organization, model: Model) -> Self {
		let (base_words, base_width, base_mask) = match organization {
			Organization::EightBit => (128usize, 7u8, 0x7fu16),
			Organization::SixteenBit => (64, 6, 0x3f),
		};

		let word_count = base_words * match model {
			Model::C46 => 1,
			Model::C56 => 2,
			Model::C66 => 4,
			Model::C76 => 8,
			Model::C86 => 16,
		};

		// 56/66 share two extra address bits, 76/86 four
		let (address_width, address_mask) = match model {
			Model::C46 => (base_width, base_mask),
			Model::C56 | Model::C66 => (base_width + 2, (base_mask << 2) | 0x03),
			Model::C76 | Model::C86 => (base_width + 4, (base_mask << 4) | 0x0f),
		};

		Geometry {
			word_count,
			address_width,
			address_mask,
		}
	}

	pub fn check_address(&self, address: usize) -> Result<()> {
		if address >= self.word_count {
			return Err(Error::AddressOutOfRange {
				address,
				word_count: self.word_count,
			});
		}
		Ok(())
	}
}
