/// Protocol for the Microchip/Atmel 93Cx6 family: 93C46, 93C56, 93C66,
/// 93C76 and 93C86, organized as 8-bit or 16-bit words (ORG pin)
///
/// Microwire-like: separate DATA IN and DATA OUT pins plus CHIP SELECT and
/// a CLOCK driven by us. Data is latched by the chip on the rising CLK edge.
///
/// Instructions:
/// - Startbit: "1"
/// - 2-bit Opcode
/// - N-bit Address (6 for a 93C46 x16, up to 11 for a 93C86 x8)
///
/// Some instructions have a DATA phase following (send or recv) of 8 or 16
/// bits depending on the organization.
///
/// Opcodes: (@ address)
/// - 0b11: ERASE at address (set all bits to "1")
/// - 0b00 @ 0b00????: EWDS (erase/write disable), no DATA
/// - 0b00 @ 0b01????: WRAL (write all), DATA
/// - 0b00 @ 0b10????: ERAL (erase all), no DATA
/// - 0b00 @ 0b11????: EWEN (erase/write enable), no DATA
/// - 0b10: READ word from address, recv DATA; keeps going with the next
///   address as long as CLK runs
/// - 0b01: WRITE word to address, send DATA
///
/// ERASE, ERAL, WRITE and WRAL start a self-timed programming cycle when CS
/// drops; with CS raised again the chip pulls DATA OUT low until it is done.

mod command;
mod config;
mod geometry;
mod hardware;
mod low_level;
mod operations;

pub use self::command::{
	Control,
	Frame,
	Opcode,
};

pub use self::config::{
	Config,
	Delays,
	ReadyWait,
};

pub use self::geometry::{
	Geometry,
	Model,
	Organization,
};

pub use self::hardware::{
	Hardware,
	Lines,
	StdDelay,
};

pub use self::operations::{
	Device,
	ProgrammingEnabled,
	Reader,
};
