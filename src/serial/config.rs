/// Microsecond delays between signal transitions
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Delays {
	/// after asserting chip select, before the start bit
	pub chip_select: u32,
	/// around each clock edge while shifting bits out
	pub write: u32,
	/// around each clock edge while shifting bits in
	pub read: u32,
	/// between two ready polls
	pub wait: u32,
}

impl Default for Delays {
	fn default() -> Self {
		Delays {
			chip_select: 0,
			write: 1,
			read: 1,
			wait: 1,
		}
	}
}

/// How long to wait for the chip to finish a self-timed erase/write cycle
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ReadyWait {
	/// poll until the chip reports ready, however long it takes
	Unbounded,
	/// give up with `Error::HardwareTimeout` after `max_polls` busy polls
	Bounded {
		max_polls: u32,
	},
}

impl Default for ReadyWait {
	fn default() -> Self {
		ReadyWait::Unbounded
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Config {
	pub delays: Delays,
	pub ready_wait: ReadyWait,
	/// log every frame sent (at debug level)
	pub trace_frames: bool,
}
