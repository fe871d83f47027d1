use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::prop::hash::{Fnv1a, Xxh64};
use crate::prop::value::{Bin, Value};

/// Default recursion budget for tree substitution.
pub const DEFAULT_UNHASH_DEPTH: i32 = 100;

/// Hash dictionaries plus recursive pre-image substitution.
///
/// Dictionaries map raw hashes back to the strings they were computed from.
/// Loading appends; the tables are read-only during substitution, so one
/// instance can serve many trees.
#[derive(Debug, Default)]
pub struct BinUnhasher {
	fnv1a: HashMap<u32, String>,
	xxh64: HashMap<u64, String>,
}

impl BinUnhasher {
	/// Create an unhasher with empty dictionaries.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of loaded FNV-1a entries.
	pub fn fnv1a_len(&self) -> usize {
		self.fnv1a.len()
	}

	/// Number of loaded XXH64 entries.
	pub fn xxh64_len(&self) -> usize {
		self.xxh64.len()
	}

	/// Insert a single FNV-1a pre-image.
	pub fn insert_fnv1a(&mut self, hash: u32, name: impl Into<String>) {
		self.fnv1a.insert(hash, name.into());
	}

	/// Insert a single XXH64 pre-image.
	pub fn insert_xxh64(&mut self, hash: u64, name: impl Into<String>) {
		self.xxh64.insert(hash, name.into());
	}

	/// Load an FNV-1a dictionary file plus its numbered shards.
	///
	/// Tries `path` itself first, then `path.0`, `path.1`, ... until one
	/// fails to open. Returns true iff at least one file was loaded.
	pub fn load_fnv1a(&mut self, path: impl AsRef<Path>) -> bool {
		let path = path.as_ref();
		load_sharded(path, |reader| {
			load_lines(reader, |hash, name| {
				self.fnv1a.insert(hash as u32, name);
			})
		})
	}

	/// Load an XXH64 dictionary file plus its numbered shards.
	pub fn load_xxh64(&mut self, path: impl AsRef<Path>) -> bool {
		let path = path.as_ref();
		load_sharded(path, |reader| {
			load_lines(reader, |hash, name| {
				self.xxh64.insert(hash, name);
			})
		})
	}

	/// Attach a known pre-image to an FNV-1a identifier.
	///
	/// The numeric hash is kept as-is; the dictionary entry is advisory
	/// metadata, never a reason to rehash.
	pub fn unhash_fnv1a(&self, value: &mut Fnv1a) {
		if value.name().is_empty() && value.hash() != 0 {
			if let Some(name) = self.fnv1a.get(&value.hash()) {
				*value = Fnv1a::resolved(value.hash(), name.clone());
			}
		}
	}

	/// Attach a known pre-image to an XXH64 identifier.
	pub fn unhash_xxh64(&self, value: &mut Xxh64) {
		if value.name().is_empty() && value.hash() != 0 {
			if let Some(name) = self.xxh64.get(&value.hash()) {
				*value = Xxh64::resolved(value.hash(), name.clone());
			}
		}
	}

	/// Recursively substitute pre-images throughout a value.
	///
	/// `max_depth` bounds the descent; nesting below the budget is left
	/// untouched.
	pub fn unhash_value(&self, value: &mut Value, max_depth: i32) {
		if max_depth <= 0 {
			return;
		}
		match value {
			Value::Hash(hash) | Value::Link(hash) => self.unhash_fnv1a(hash),
			Value::File(hash) => self.unhash_xxh64(hash),
			Value::List(list) | Value::List2(list) => {
				for item in &mut list.items {
					self.unhash_value(item, max_depth - 1);
				}
			}
			Value::Option(option) => {
				if let Some(item) = &mut option.item {
					self.unhash_value(item, max_depth - 1);
				}
			}
			Value::Map(map) => {
				for pair in &mut map.items {
					self.unhash_value(&mut pair.key, max_depth - 1);
					self.unhash_value(&mut pair.value, max_depth - 1);
				}
			}
			Value::Embed(body) | Value::Pointer(body) => {
				self.unhash_fnv1a(&mut body.name);
				for field in &mut body.items {
					self.unhash_fnv1a(&mut field.key);
					self.unhash_value(&mut field.value, max_depth - 1);
				}
			}
			_ => {}
		}
	}

	/// Substitute pre-images in every section of a tree.
	pub fn unhash_bin(&self, bin: &mut Bin) {
		self.unhash_bin_depth(bin, DEFAULT_UNHASH_DEPTH);
	}

	/// Substitute pre-images in every section with an explicit depth budget.
	pub fn unhash_bin_depth(&self, bin: &mut Bin, max_depth: i32) {
		for (_, value) in &mut bin.sections {
			self.unhash_value(value, max_depth);
		}
	}
}

fn load_sharded(path: &Path, mut load: impl FnMut(BufReader<File>)) -> bool {
	if let Ok(file) = File::open(path) {
		load(BufReader::new(file));
		return true;
	}
	let mut had_some = false;
	for shard in 0.. {
		let shard_path = shard_name(path, shard);
		let Ok(file) = File::open(shard_path) else {
			break;
		};
		load(BufReader::new(file));
		had_some = true;
	}
	had_some
}

fn shard_name(path: &Path, shard: u32) -> std::path::PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(format!(".{shard}"));
	std::path::PathBuf::from(name)
}

/// Parse `<hex> <string>` records, one per line; a blank line ends the
/// file logically.
fn load_lines(reader: impl BufRead, mut insert: impl FnMut(u64, String)) {
	for line in reader.lines() {
		let Ok(line) = line else {
			break;
		};
		if line.is_empty() {
			break;
		}
		let Some((hex, name)) = line.split_once(' ') else {
			continue;
		};
		let Ok(hash) = u64::from_str_radix(hex, 16) else {
			continue;
		};
		insert(hash, name.to_owned());
	}
}
