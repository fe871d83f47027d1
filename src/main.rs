#![allow(missing_docs)]

use std::path::PathBuf;

use clap::Parser;
use propbin::prop::{BinError, formats};

mod cmd;

#[derive(Parser)]
#[command(name = "propbin", about = "PROP/PTCH property file conversion tool")]
struct Cli {
	/// Input file or directory; `-` reads stdin.
	input: PathBuf,
	/// Output file or directory; derived from the input when omitted.
	output: Option<PathBuf>,
	/// Format of the input file; guessed from content or name when omitted.
	#[arg(short = 'i', long = "input-format")]
	input_format: Option<String>,
	/// Format of the output file.
	#[arg(short = 'o', long = "output-format")]
	output_format: Option<String>,
	/// Do not run the unhasher before writing.
	#[arg(short = 'k', long = "keep-hashed")]
	keep_hashed: bool,
	/// Walk the input directory; requires --input-format.
	#[arg(short = 'r', long)]
	recursive: bool,
	/// Directory containing the hash dictionaries.
	#[arg(short = 'd', long = "dir-hashes")]
	dir_hashes: Option<PathBuf>,
	/// Log progress to stderr.
	#[arg(short = 'v', long)]
	verbose: bool,
}

fn main() {
	let cli = Cli::parse();
	let options = cmd::convert::Options {
		input: cli.input,
		output: cli.output,
		input_format: cli.input_format,
		output_format: cli.output_format,
		keep_hashed: cli.keep_hashed,
		recursive: cli.recursive,
		dir_hashes: cli.dir_hashes,
		verbose: cli.verbose,
	};

	if let Err(err) = cmd::convert::run(options) {
		eprintln!("error: {err}");
		if matches!(err, BinError::UnknownFormat { .. } | BinError::GuessFailed { .. }) {
			eprintln!("formats:");
			for format in formats() {
				eprintln!("\t- {}", format.name());
			}
		}
		std::process::exit(-1);
	}
}
