#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub type AResult<T> = std::result::Result<T, failure::Error>;

mod error;
pub mod serial;

pub use self::error::{
	Error,
	Result,
};

pub use self::serial::{
	Config,
	Delays,
	Device,
	Geometry,
	Hardware,
	Lines,
	Model,
	Organization,
	ReadyWait,
	StdDelay,
};
