use embedded_hal::digital::ErrorKind;

#[derive(Clone, Debug, PartialEq, Eq, Fail)]
pub enum Error {
	#[fail(display = "unsupported chip model {} (supported: 46, 56, 66, 76, 86)", _0)]
	UnsupportedModel(u32),
	#[fail(display = "unsupported organization: {}-bit words (supported: 8, 16)", _0)]
	UnsupportedOrganization(u32),
	#[fail(display = "unknown chip model {:?}", _0)]
	UnknownModelName(String),
	#[fail(display = "unknown organization {:?}", _0)]
	UnknownOrganizationName(String),
	#[fail(display = "address 0x{:04x} out of range (chip has 0x{:04x} words)", address, word_count)]
	AddressOutOfRange {
		address: usize,
		word_count: usize,
	},
	#[fail(display = "chip still busy after {} ready polls", polls)]
	HardwareTimeout {
		polls: u32,
	},
	#[fail(display = "pin error: {:?}", _0)]
	Pin(ErrorKind),
	#[fail(display = "no dummy zero bit within 16 address bits")]
	AddressWidthNotDetected,
	#[fail(display = "verify failed at 0x{:04x}: expected {:04x}, read {:04x}", address, expected, actual)]
	VerifyFailed {
		address: usize,
		expected: u16,
		actual: u16,
	},
}

impl Error {
	/// Whether this error rejects the model/organization a device was asked to use.
	pub fn is_configuration(&self) -> bool {
		match self {
			Error::UnsupportedModel(_)
			| Error::UnsupportedOrganization(_)
			| Error::UnknownModelName(_)
			| Error::UnknownOrganizationName(_) => true,
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
