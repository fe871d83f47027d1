use crate::prop::bytes::Sink;
use crate::prop::compat::TypeMap;
use crate::prop::hash::Fnv1a;
use crate::prop::value::{Bin, Kind, ListValue, MapValue, OptionValue, StructValue, Value};
use crate::prop::{BinError, Result};

/// Serialize a section tree into `PROP`/`PTCH` bytes.
///
/// Size prefixes are reserved as placeholders and backpatched once the
/// region's children have been emitted. Counts are validated against their
/// wire widths before anything is written for the region.
pub fn write_binary(bin: &Bin, map: &dyn TypeMap) -> Result<Vec<u8>> {
	let mut writer = BinaryWriter {
		sink: Sink::new(),
		map,
	};
	writer.write_sections(bin)?;
	Ok(writer.sink.into_bytes())
}

struct BinaryWriter<'a> {
	sink: Sink,
	map: &'a dyn TypeMap,
}

impl<'a> BinaryWriter<'a> {
	fn write_kind(&mut self, kind: Kind) -> Result<()> {
		let raw = self.map.kind_to_raw(kind).ok_or(BinError::UnencodableKind {
			kind,
			map: self.map.name(),
		})?;
		self.sink.write_u8(raw);
		Ok(())
	}

	fn patch_size(&mut self, slot: usize) -> Result<()> {
		let size = self.sink.pos() - slot - 4;
		let size = u32::try_from(size).map_err(|_| BinError::CountOverflow {
			what: "region size",
			count: size,
			max: u32::MAX as usize,
		})?;
		self.sink.patch_u32(slot, size);
		Ok(())
	}

	fn write_sections(&mut self, bin: &Bin) -> Result<()> {
		let file_type = match bin.section("type") {
			None => return Err(BinError::MissingSection { name: "type" }),
			Some(Value::String(value)) => value.as_str(),
			Some(other) => {
				return Err(BinError::WrongSectionKind {
					name: "type",
					expected: Kind::String,
					got: other.kind(),
				})
			}
		};
		let is_patch = match file_type {
			"PROP" => false,
			"PTCH" => true,
			other => {
				return Err(BinError::WrongFileType {
					got: other.to_owned(),
				})
			}
		};

		if is_patch {
			self.sink.write_bytes(b"PTCH");
			self.sink.write_u32_le(1);
			self.sink.write_u32_le(0);
		}
		self.sink.write_bytes(b"PROP");

		let version = match bin.section("version") {
			None => return Err(BinError::MissingSection { name: "version" }),
			Some(Value::U32(value)) => *value,
			Some(other) => {
				return Err(BinError::WrongSectionKind {
					name: "version",
					expected: Kind::U32,
					got: other.kind(),
				})
			}
		};
		self.sink.write_u32_le(version);

		if version >= 2 {
			self.write_links(bin)?;
		}
		self.write_entries(bin)?;
		if version >= 3 && is_patch {
			self.write_patches(bin)?;
		}
		Ok(())
	}

	fn write_links(&mut self, bin: &Bin) -> Result<()> {
		let linked = match bin.section("linked") {
			None => {
				self.sink.write_u32_le(0);
				return Ok(());
			}
			Some(Value::List(linked)) => linked,
			Some(other) => {
				return Err(BinError::WrongSectionKind {
					name: "linked",
					expected: Kind::List,
					got: other.kind(),
				})
			}
		};
		if linked.kind != Kind::String {
			return Err(BinError::WrongItemKind {
				what: "linked element",
				expected: Kind::String,
				got: linked.kind,
			});
		}

		let count = u32::try_from(linked.items.len()).map_err(|_| BinError::CountOverflow {
			what: "linked",
			count: linked.items.len(),
			max: u32::MAX as usize,
		})?;
		self.sink.write_u32_le(count);
		for item in &linked.items {
			let Value::String(value) = item else {
				return Err(BinError::WrongItemKind {
					what: "linked element",
					expected: Kind::String,
					got: item.kind(),
				});
			};
			self.sink.write_str16(value)?;
		}
		Ok(())
	}

	fn section_map<'b>(&self, bin: &'b Bin, name: &'static str) -> Result<Option<&'b MapValue>> {
		match bin.section(name) {
			None => Ok(None),
			Some(Value::Map(map)) => {
				if map.key_kind != Kind::Hash {
					return Err(BinError::WrongItemKind {
						what: "section key",
						expected: Kind::Hash,
						got: map.key_kind,
					});
				}
				if map.value_kind != Kind::Embed {
					return Err(BinError::WrongItemKind {
						what: "section value",
						expected: Kind::Embed,
						got: map.value_kind,
					});
				}
				Ok(Some(map))
			}
			Some(other) => Err(BinError::WrongSectionKind {
				name,
				expected: Kind::Map,
				got: other.kind(),
			}),
		}
	}

	fn write_entries(&mut self, bin: &Bin) -> Result<()> {
		let Some(entries) = self.section_map(bin, "entries")? else {
			self.sink.write_u32_le(0);
			return Ok(());
		};

		let count = u32::try_from(entries.items.len()).map_err(|_| BinError::CountOverflow {
			what: "entries",
			count: entries.items.len(),
			max: u32::MAX as usize,
		})?;
		self.sink.write_u32_le(count);

		// The per-entry type-name hash table precedes the bodies; reserve it
		// and fill it once every body has been emitted.
		let table = self.sink.reserve_zeros(entries.items.len() * 4);
		let mut name_hashes = Vec::with_capacity(entries.items.len());

		for pair in &entries.items {
			let (key, body) = entry_pair(&pair.key, &pair.value)?;
			name_hashes.push(body.name.hash());
			self.write_entry(key, body)?;
		}
		for (index, hash) in name_hashes.into_iter().enumerate() {
			self.sink.patch_u32(table + index * 4, hash);
		}
		Ok(())
	}

	fn write_entry(&mut self, key: &Fnv1a, body: &StructValue) -> Result<()> {
		let slot = self.sink.reserve_u32();
		self.sink.write_u32_le(key.hash());
		self.write_fields(body)?;
		self.patch_size(slot)
	}

	fn write_patches(&mut self, bin: &Bin) -> Result<()> {
		let Some(patches) = self.section_map(bin, "patches")? else {
			self.sink.write_u32_le(0);
			return Ok(());
		};

		let count = u32::try_from(patches.items.len()).map_err(|_| BinError::CountOverflow {
			what: "patches",
			count: patches.items.len(),
			max: u32::MAX as usize,
		})?;
		self.sink.write_u32_le(count);
		for pair in &patches.items {
			let (key, body) = entry_pair(&pair.key, &pair.value)?;
			self.write_patch(key, body)?;
		}
		Ok(())
	}

	fn write_patch(&mut self, key: &Fnv1a, body: &StructValue) -> Result<()> {
		let path = body
			.find_field(&Fnv1a::from_name("path"))
			.ok_or(BinError::MissingSection { name: "patch path" })?;
		let value = body
			.find_field(&Fnv1a::from_name("value"))
			.ok_or(BinError::MissingSection { name: "patch value" })?;
		let Value::String(path) = &path.value else {
			return Err(BinError::WrongItemKind {
				what: "patch path",
				expected: Kind::String,
				got: path.value.kind(),
			});
		};

		self.sink.write_u32_le(key.hash());
		let slot = self.sink.reserve_u32();
		self.write_kind(value.value.kind())?;
		self.sink.write_str16(path)?;
		self.write_value(&value.value)?;
		self.patch_size(slot)
	}

	fn write_fields(&mut self, body: &StructValue) -> Result<()> {
		let count = u16::try_from(body.items.len()).map_err(|_| BinError::CountOverflow {
			what: "field",
			count: body.items.len(),
			max: usize::from(u16::MAX),
		})?;
		self.sink.write_u16_le(count);
		for field in &body.items {
			self.sink.write_u32_le(field.key.hash());
			self.write_kind(field.value.kind())?;
			self.write_value(&field.value)?;
		}
		Ok(())
	}

	fn write_value_typed(&mut self, value: &Value, kind: Kind) -> Result<()> {
		if value.kind() != kind {
			return Err(BinError::WrongItemKind {
				what: "element",
				expected: kind,
				got: value.kind(),
			});
		}
		self.write_value(value)
	}

	fn write_value(&mut self, value: &Value) -> Result<()> {
		match value {
			Value::None => Ok(()),
			Value::Bool(value) | Value::Flag(value) => {
				self.sink.write_u8(u8::from(*value));
				Ok(())
			}
			Value::I8(value) => {
				self.sink.write_i8(*value);
				Ok(())
			}
			Value::U8(value) => {
				self.sink.write_u8(*value);
				Ok(())
			}
			Value::I16(value) => {
				self.sink.write_i16_le(*value);
				Ok(())
			}
			Value::U16(value) => {
				self.sink.write_u16_le(*value);
				Ok(())
			}
			Value::I32(value) => {
				self.sink.write_i32_le(*value);
				Ok(())
			}
			Value::U32(value) => {
				self.sink.write_u32_le(*value);
				Ok(())
			}
			Value::I64(value) => {
				self.sink.write_i64_le(*value);
				Ok(())
			}
			Value::U64(value) => {
				self.sink.write_u64_le(*value);
				Ok(())
			}
			Value::F32(value) => {
				self.sink.write_f32_le(*value);
				Ok(())
			}
			Value::Vec2(value) => self.write_f32_slice(value),
			Value::Vec3(value) => self.write_f32_slice(value),
			Value::Vec4(value) => self.write_f32_slice(value),
			Value::Mtx44(value) => self.write_f32_slice(value),
			Value::Rgba(value) => {
				self.sink.write_bytes(value);
				Ok(())
			}
			Value::String(value) => self.sink.write_str16(value),
			Value::Hash(value) | Value::Link(value) => {
				self.sink.write_u32_le(value.hash());
				Ok(())
			}
			Value::File(value) => {
				self.sink.write_u64_le(value.hash());
				Ok(())
			}
			Value::Embed(body) => self.write_struct(body),
			Value::Pointer(body) => {
				if body.name.hash() == 0 {
					self.sink.write_u32_le(0);
					return Ok(());
				}
				self.write_struct(body)
			}
			Value::List(list) | Value::List2(list) => self.write_list(list),
			Value::Option(option) => self.write_option(option),
			Value::Map(map) => self.write_map(map),
		}
	}

	fn write_f32_slice(&mut self, values: &[f32]) -> Result<()> {
		for value in values {
			self.sink.write_f32_le(*value);
		}
		Ok(())
	}

	fn write_struct(&mut self, body: &StructValue) -> Result<()> {
		self.sink.write_u32_le(body.name.hash());
		let slot = self.sink.reserve_u32();
		self.write_fields(body)?;
		self.patch_size(slot)
	}

	fn write_list(&mut self, list: &ListValue) -> Result<()> {
		if list.kind.is_container() {
			return Err(BinError::ContainerElement { kind: list.kind });
		}
		self.write_kind(list.kind)?;
		let slot = self.sink.reserve_u32();
		let count = u32::try_from(list.items.len()).map_err(|_| BinError::CountOverflow {
			what: "list",
			count: list.items.len(),
			max: u32::MAX as usize,
		})?;
		self.sink.write_u32_le(count);
		for item in &list.items {
			self.write_value_typed(item, list.kind)?;
		}
		self.patch_size(slot)
	}

	fn write_option(&mut self, option: &OptionValue) -> Result<()> {
		if option.kind.is_container() {
			return Err(BinError::ContainerElement { kind: option.kind });
		}
		self.write_kind(option.kind)?;
		match &option.item {
			None => {
				self.sink.write_u8(0);
				Ok(())
			}
			Some(item) => {
				self.sink.write_u8(1);
				self.write_value_typed(item, option.kind)
			}
		}
	}

	fn write_map(&mut self, map: &MapValue) -> Result<()> {
		if !map.key_kind.is_primitive() {
			return Err(BinError::NonPrimitiveKey { kind: map.key_kind });
		}
		if map.value_kind.is_container() {
			return Err(BinError::ContainerElement { kind: map.value_kind });
		}
		self.write_kind(map.key_kind)?;
		self.write_kind(map.value_kind)?;
		let slot = self.sink.reserve_u32();
		let count = u32::try_from(map.items.len()).map_err(|_| BinError::CountOverflow {
			what: "map",
			count: map.items.len(),
			max: u32::MAX as usize,
		})?;
		self.sink.write_u32_le(count);
		for pair in &map.items {
			self.write_value_typed(&pair.key, map.key_kind)?;
			self.write_value_typed(&pair.value, map.value_kind)?;
		}
		self.patch_size(slot)
	}
}

fn entry_pair<'b>(key: &'b Value, value: &'b Value) -> Result<(&'b Fnv1a, &'b StructValue)> {
	let Value::Hash(key) = key else {
		return Err(BinError::WrongItemKind {
			what: "entry key",
			expected: Kind::Hash,
			got: key.kind(),
		});
	};
	let Value::Embed(body) = value else {
		return Err(BinError::WrongItemKind {
			what: "entry value",
			expected: Kind::Embed,
			got: value.kind(),
		});
	};
	Ok((key, body))
}
