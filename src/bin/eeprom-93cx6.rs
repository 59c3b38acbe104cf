#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate eeprom_93cx6;
use eeprom_93cx6::*;

use std::process::exit;

use rppal::gpio::{
	Gpio,
	InputPin,
	OutputPin,
};

type RpiDevice = Device<Lines<OutputPin, OutputPin, OutputPin, InputPin, StdDelay>>;

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

// decimal, or hex with 0x prefix
fn get_number(matches: &clap::ArgMatches, name: &str) -> AResult<u32> {
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	let parsed = if param.starts_with("0x") || param.starts_with("0X") {
		u32::from_str_radix(&param[2..], 16)
	} else {
		param.parse::<u32>()
	};
	parsed.map_err(|e| format_err!("invalid parameter {}: {}", name, e))
}

fn open_device(matches: &clap::ArgMatches) -> AResult<RpiDevice> {
	let model: Model = get_param(matches, "model")?;
	let organization: Organization = get_param(matches, "org")?;
	let config = Config {
		trace_frames: matches.is_present("trace"),
		..Config::default()
	};

	let gpio = Gpio::new()?;
	let chip_select = gpio.get(get_param(matches, "cs")?)?.into_output_low();
	let clock = gpio.get(get_param(matches, "sk")?)?.into_output_low();
	let data_in = gpio.get(get_param(matches, "di")?)?.into_output_low();
	let data_out = gpio.get(get_param(matches, "dout")?)?.into_input_pullup();

	let dev = Device::with_hardware(
		model,
		organization,
		Lines::new(chip_select, clock, data_in, data_out, StdDelay),
		config,
	);
	info!("{} {}: {} words, {} address bits", model, organization, dev.geometry().word_count, dev.geometry().address_width);
	Ok(dev)
}

fn dump(dev: &mut RpiDevice) -> AResult<()> {
	let digits = match dev.organization() {
		Organization::EightBit => 2,
		Organization::SixteenBit => 4,
	};
	let words = dev.read_all()?;
	for (line, chunk) in words.chunks(8).enumerate() {
		print!("0x{:02X} ", line * 8);
		for word in chunk {
			print!("{:0width$X} ", word, width = digits);
		}
		println!();
	}
	Ok(())
}

fn detect(dev: &mut RpiDevice) -> AResult<()> {
	let width = dev.detect_address_width()?;
	let expected = dev.geometry().address_width;
	if width != expected {
		bail!("chip answered after {} address bits, {} {} needs {}", width, dev.model(), dev.organization(), expected);
	}
	println!("{} address bits, as expected", width);
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg model: -m --model +takes_value +required "chip model: 46, 56, 66, 76, 86 (or 93C46, ...)")
		(@arg org: -o --org +takes_value +required "word width: 8 or 16")
		(@arg cs: --cs +takes_value +required "BCM GPIO for chip select")
		(@arg sk: --sk +takes_value +required "BCM GPIO for serial clock")
		(@arg di: --di +takes_value +required "BCM GPIO for data in (chip input)")
		(@arg dout: --dout +takes_value +required "BCM GPIO for data out (chip output)")
		(@arg trace: -t --trace "log every frame sent")
		(@subcommand dump =>
			(about: "dump whole EEPROM, 8 words per line")
		)
		(@subcommand read =>
			(about: "read one word")
			(@arg ADDRESS: +required "word address")
		)
		(@subcommand write =>
			(about: "write one word")
			(@arg ADDRESS: +required "word address")
			(@arg VALUE: +required "word value")
		)
		(@subcommand erase =>
			(about: "erase one word")
			(@arg ADDRESS: +required "word address")
		)
		(@subcommand erase_all =>
			(about: "erase whole EEPROM")
		)
		(@subcommand write_all =>
			(about: "write one value to every word")
			(@arg VALUE: +required "word value")
		)
		(@subcommand detect =>
			(about: "check the address width the chip expects")
		)
	).get_matches();

	let mut dev = open_device(&matches)?;

	match matches.subcommand() {
		("dump", _) => dump(&mut dev),
		("read", Some(sub_m)) => {
			let address = get_number(sub_m, "ADDRESS")? as usize;
			println!("@{:04x}: {:04x}", address, dev.read(address)?);
			Ok(())
		},
		("write", Some(sub_m)) => {
			let address = get_number(sub_m, "ADDRESS")? as usize;
			let value = get_number(sub_m, "VALUE")?;
			dev.programming()?.write(address, value)?;
			Ok(())
		},
		("erase", Some(sub_m)) => {
			let address = get_number(sub_m, "ADDRESS")? as usize;
			dev.programming()?.erase(address)?;
			Ok(())
		},
		("erase_all", _) => {
			dev.programming()?.erase_all()?;
			Ok(())
		},
		("write_all", Some(sub_m)) => {
			let value = get_number(sub_m, "VALUE")?;
			dev.programming()?.write_all(value)?;
			Ok(())
		},
		("detect", _) => detect(&mut dev),
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
