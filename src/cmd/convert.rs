use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use propbin::prop::{Bin, BinError, BinUnhasher, Format, Result, format, guess_format};

/// Command-line options for a conversion run.
pub struct Options {
	pub input: PathBuf,
	pub output: Option<PathBuf>,
	pub input_format: Option<String>,
	pub output_format: Option<String>,
	pub keep_hashed: bool,
	pub recursive: bool,
	pub dir_hashes: Option<PathBuf>,
	pub verbose: bool,
}

/// Run a single-file conversion, or walk a directory with `--recursive`.
pub fn run(options: Options) -> Result<()> {
	let mut converter = Converter {
		options,
		unhasher: None,
	};
	if converter.options.recursive {
		converter.run_recursive()
	} else {
		let input = converter.options.input.clone();
		let output = converter.options.output.clone();
		converter.convert_one(&input, output)
	}
}

struct Converter {
	options: Options,
	unhasher: Option<BinUnhasher>,
}

impl Converter {
	fn log(&self, message: &str) {
		if self.options.verbose {
			eprintln!("{message}");
		}
	}

	fn run_recursive(&mut self) -> Result<()> {
		let input_dir = self.options.input.clone();
		if !input_dir.is_dir() {
			return Err(BinError::InputDirMissing {
				path: input_dir.display().to_string(),
			});
		}
		let Some(input_format_name) = self.options.input_format.clone() else {
			return Err(BinError::RecursiveNeedsFormat);
		};
		let input_format = resolve_format(&input_format_name)?;
		let extension = input_format.default_extension();

		let mut files = Vec::new();
		collect_files(&input_dir, extension, &mut files)?;

		for path in files {
			// One broken file should not stop the walk.
			if let Err(err) = self.convert_one(&path, None) {
				eprintln!("in: {}", path.display());
				eprintln!("error: {err}");
			}
		}
		Ok(())
	}

	fn convert_one(&mut self, input: &Path, output: Option<PathBuf>) -> Result<()> {
		self.log(&format!("reading: {}", input.display()));
		let data = read_input(input)?;

		let input_name = input.display().to_string();
		let input_format = match &self.options.input_format {
			Some(name) => resolve_format(name)?,
			None => guess_format(&data, &input_name).ok_or(BinError::GuessFailed { name: input_name })?,
		};

		self.log("parsing");
		let mut bin = input_format.read(&data)?;

		let output_format = self.resolve_output_format(input_format, output.as_deref())?;
		if !self.options.keep_hashed && !output_format.output_always_hashed() {
			self.unhash(&mut bin);
		}

		let output = match output {
			Some(output) => output,
			None => {
				let mut derived = derive_output_path(input, output_format);
				// Recursive runs mirror the input tree under the output dir.
				if self.options.recursive {
					if let Some(output_dir) = &self.options.output {
						let relative = derived.strip_prefix(&self.options.input).unwrap_or(&derived).to_path_buf();
						derived = output_dir.join(relative);
					}
				}
				derived
			}
		};

		self.log("serializing");
		let serialized = output_format.write(&bin)?;

		self.log(&format!("writing: {}", output.display()));
		write_output(&output, &serialized)?;
		Ok(())
	}

	fn resolve_output_format(&self, input_format: &'static Format, output: Option<&Path>) -> Result<&'static Format> {
		if let Some(name) = &self.options.output_format {
			return resolve_format(name);
		}
		if let Some(output) = output {
			let name = output.display().to_string();
			return guess_format(b"", &name).ok_or(BinError::GuessFailed { name });
		}
		resolve_format(input_format.opposite_name())
	}

	fn unhash(&mut self, bin: &mut Bin) {
		if self.unhasher.is_none() {
			self.log("loading hashes");
			let dir = self.hash_dir();
			let mut unhasher = BinUnhasher::new();
			unhasher.load_fnv1a(dir.join("hashes.binentries.txt"));
			unhasher.load_fnv1a(dir.join("hashes.binhashes.txt"));
			unhasher.load_fnv1a(dir.join("hashes.bintypes.txt"));
			unhasher.load_fnv1a(dir.join("hashes.binfields.txt"));
			unhasher.load_xxh64(dir.join("hashes.game.txt"));
			unhasher.load_xxh64(dir.join("hashes.lcu.txt"));
			self.unhasher = Some(unhasher);
		}
		self.log("unhashing");
		if let Some(unhasher) = &self.unhasher {
			unhasher.unhash_bin(bin);
		}
	}

	fn hash_dir(&self) -> PathBuf {
		if let Some(dir) = &self.options.dir_hashes {
			return dir.clone();
		}
		std::env::current_exe()
			.ok()
			.and_then(|exe| exe.parent().map(|dir| dir.join("hashes")))
			.unwrap_or_else(|| PathBuf::from("hashes"))
	}
}

fn resolve_format(name: &str) -> Result<&'static Format> {
	format(name).ok_or_else(|| BinError::UnknownFormat { name: name.to_owned() })
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
	if path.as_os_str() == "-" {
		let mut data = Vec::new();
		std::io::stdin().lock().read_to_end(&mut data)?;
		return Ok(data);
	}
	Ok(fs::read(path)?)
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
	if path.as_os_str() == "-" {
		let mut stdout = std::io::stdout().lock();
		stdout.write_all(data)?;
		stdout.flush()?;
		return Ok(());
	}
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}
	Ok(fs::write(path, data)?)
}

fn derive_output_path(input: &Path, output_format: &Format) -> PathBuf {
	if input.as_os_str() == "-" {
		return PathBuf::from("-");
	}
	let extension = output_format.default_extension().trim_start_matches('.');
	input.with_extension(extension)
}

fn collect_files(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<()> {
	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();
		if path.is_dir() {
			collect_files(&path, extension, out)?;
			continue;
		}
		if path.display().to_string().ends_with(extension) {
			out.push(path);
		}
	}
	Ok(())
}
