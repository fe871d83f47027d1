use crate::prop::binary_read::read_binary;
use crate::prop::binary_write::write_binary;
use crate::prop::compat;
use crate::prop::json::{read_json, write_json, write_json_info};
use crate::prop::text_read::read_text;
use crate::prop::text_write::write_text;
use crate::prop::value::Bin;
use crate::prop::{BinError, Result};

/// One named serialization format.
///
/// The registry is a fixed, ordered table; `guess_format` walks it in
/// declaration order and returns the first entry whose heuristic accepts
/// the data or file name.
#[derive(Debug, PartialEq)]
pub struct Format {
	name: &'static str,
	opposite_name: &'static str,
	default_extension: &'static str,
	output_always_hashed: bool,
	read: fn(&[u8]) -> Result<Bin>,
	write: fn(&Bin) -> Result<Vec<u8>>,
	try_guess: fn(&[u8], &str) -> bool,
}

impl Format {
	/// Registry name (`"bin"`, `"text"`, ...).
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Name of the format conversions default to when reading this one.
	pub fn opposite_name(&self) -> &'static str {
		self.opposite_name
	}

	/// Extension used when deriving an output file name.
	pub fn default_extension(&self) -> &'static str {
		self.default_extension
	}

	/// True when output keeps raw hashes, making the unhasher pointless.
	pub fn output_always_hashed(&self) -> bool {
		self.output_always_hashed
	}

	/// Parse a buffer in this format.
	pub fn read(&self, data: &[u8]) -> Result<Bin> {
		(self.read)(data)
	}

	/// Serialize a tree in this format.
	pub fn write(&self, bin: &Bin) -> Result<Vec<u8>> {
		(self.write)(bin)
	}

	/// Content/file-name heuristic used by `guess_format`.
	pub fn try_guess(&self, data: &[u8], file_name: &str) -> bool {
		(self.try_guess)(data, file_name)
	}
}

fn read_bin_latest(data: &[u8]) -> Result<Bin> {
	read_binary(data, compat::latest())
}

fn write_bin_latest(bin: &Bin) -> Result<Vec<u8>> {
	write_binary(bin, compat::latest())
}

fn read_bin_legacy1(data: &[u8]) -> Result<Bin> {
	read_binary(data, compat::legacy1())
}

fn write_bin_legacy1(bin: &Bin) -> Result<Vec<u8>> {
	write_binary(bin, compat::legacy1())
}

fn write_text_cli(bin: &Bin) -> Result<Vec<u8>> {
	Ok(write_text(bin, 4).into_bytes())
}

fn read_info(_: &[u8]) -> Result<Bin> {
	Err(BinError::InfoNotReadable)
}

fn guess_bin(data: &[u8], file_name: &str) -> bool {
	data.starts_with(b"PTCH") || data.starts_with(b"PROP") || file_name.ends_with(".bin")
}

fn guess_text(data: &[u8], file_name: &str) -> bool {
	data.starts_with(b"#PROP_text")
		|| data.starts_with(b"#PTCH_text")
		|| file_name.ends_with(".txt")
		|| file_name.ends_with(".py")
}

fn guess_json(data: &[u8], file_name: &str) -> bool {
	data.starts_with(b"{") || file_name.ends_with(".json")
}

fn guess_never(_: &[u8], _: &str) -> bool {
	false
}

static FORMATS: [Format; 5] = [
	Format {
		name: "text",
		opposite_name: "bin",
		default_extension: ".py",
		output_always_hashed: false,
		read: read_text,
		write: write_text_cli,
		try_guess: guess_text,
	},
	Format {
		name: "json",
		opposite_name: "bin",
		default_extension: ".json",
		output_always_hashed: false,
		read: read_json,
		write: write_json,
		try_guess: guess_json,
	},
	Format {
		name: "info",
		opposite_name: "",
		default_extension: ".json",
		output_always_hashed: false,
		read: read_info,
		write: write_json_info,
		try_guess: guess_never,
	},
	Format {
		name: "bin",
		opposite_name: "text",
		default_extension: ".bin",
		output_always_hashed: true,
		read: read_bin_latest,
		write: write_bin_latest,
		try_guess: guess_bin,
	},
	Format {
		name: "bin-legacy1",
		opposite_name: "text",
		default_extension: ".bin",
		output_always_hashed: true,
		read: read_bin_legacy1,
		write: write_bin_legacy1,
		try_guess: guess_bin,
	},
];

/// All registered formats in guess order.
pub fn formats() -> &'static [Format] {
	&FORMATS
}

/// Look up a format by registry name.
pub fn format(name: &str) -> Option<&'static Format> {
	FORMATS.iter().find(|format| format.name == name)
}

/// Walk the registry in order and return the first matching format.
pub fn guess_format(data: &[u8], file_name: &str) -> Option<&'static Format> {
	FORMATS.iter().find(|format| format.try_guess(data, file_name))
}

#[cfg(test)]
mod tests {
	use super::{format, formats, guess_format};

	#[test]
	fn registry_order_is_stable() {
		let names: Vec<_> = formats().iter().map(|format| format.name()).collect();
		assert_eq!(names, ["text", "json", "info", "bin", "bin-legacy1"]);
	}

	#[test]
	fn content_prefixes_win_the_guess() {
		assert_eq!(guess_format(b"PROP\x01", "noext").map(|f| f.name()), Some("bin"));
		assert_eq!(guess_format(b"PTCH", "noext").map(|f| f.name()), Some("bin"));
		assert_eq!(guess_format(b"#PROP_text\n", "noext").map(|f| f.name()), Some("text"));
		assert_eq!(guess_format(b"{\n", "noext").map(|f| f.name()), Some("json"));
	}

	#[test]
	fn file_suffixes_guess_when_content_does_not() {
		assert_eq!(guess_format(b"", "champion.bin").map(|f| f.name()), Some("bin"));
		assert_eq!(guess_format(b"", "champion.py").map(|f| f.name()), Some("text"));
		assert_eq!(guess_format(b"", "champion.json").map(|f| f.name()), Some("json"));
		assert_eq!(guess_format(b"", "champion.dat"), None);
	}

	#[test]
	fn info_is_never_guessed_and_never_read() {
		assert!(guess_format(b"", "out.info").is_none());
		let info = format("info").expect("info format registered");
		assert!(info.read(b"{}").is_err());
	}

	#[test]
	fn opposites_pair_binary_with_text() {
		assert_eq!(format("bin").map(|f| f.opposite_name()), Some("text"));
		assert_eq!(format("text").map(|f| f.opposite_name()), Some("bin"));
		assert_eq!(format("json").map(|f| f.opposite_name()), Some("bin"));
	}
}
