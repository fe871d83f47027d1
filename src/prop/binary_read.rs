use crate::prop::bytes::Cursor;
use crate::prop::compat::TypeMap;
use crate::prop::hash::{Fnv1a, Xxh64};
use crate::prop::value::{Bin, FieldValue, Kind, ListValue, MapValue, OptionValue, PairValue, StructValue, Value};
use crate::prop::{BinError, Result};

/// Parse a whole `PROP`/`PTCH` buffer into a section tree.
///
/// The `map` argument selects the wire generation used to decode raw type
/// tags. Every size-prefixed region is checked against the cursor and the
/// buffer must be fully consumed.
pub fn read_binary(data: &[u8], map: &dyn TypeMap) -> Result<Bin> {
	let mut reader = BinaryReader {
		cur: Cursor::new(data),
		map,
	};
	reader.read_sections()
}

struct BinaryReader<'a> {
	cur: Cursor<'a>,
	map: &'a dyn TypeMap,
}

impl<'a> BinaryReader<'a> {
	fn framed<T>(&mut self, frame: &'static str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
		let at = self.cur.pos();
		f(self).map_err(|err| err.framed(frame, at))
	}

	fn read_kind(&mut self) -> Result<Kind> {
		let at = self.cur.pos();
		let raw = self.cur.read_u8()?;
		self.map.raw_to_kind(raw).ok_or(BinError::UnknownTypeTag { raw, at })
	}

	fn read_fnv1a(&mut self) -> Result<Fnv1a> {
		Ok(Fnv1a::from_hash(self.cur.read_u32_le()?))
	}

	fn expect_end(&self, start: usize, size: usize) -> Result<()> {
		let expected = start.checked_add(size).ok_or(BinError::SizeMismatch {
			expected: usize::MAX,
			actual: self.cur.pos(),
		})?;
		if self.cur.pos() != expected {
			return Err(BinError::SizeMismatch {
				expected,
				actual: self.cur.pos(),
			});
		}
		Ok(())
	}

	fn read_sections(&mut self) -> Result<Bin> {
		let mut bin = Bin::new();

		let mut magic_at = self.cur.pos();
		let mut magic = self.cur.read_code4()?;
		let is_patch = &magic == b"PTCH";
		if is_patch {
			// Patch prelude: unused u64 between the two magics.
			let _ = self.cur.read_u64_le()?;
			magic_at = self.cur.pos();
			magic = self.cur.read_code4()?;
			bin.sections.push(("type".to_owned(), Value::String("PTCH".to_owned())));
		} else {
			bin.sections.push(("type".to_owned(), Value::String("PROP".to_owned())));
		}
		if &magic != b"PROP" {
			return Err(BinError::BadMagic { magic, at: magic_at });
		}

		let version = self.cur.read_u32_le()?;
		bin.sections.push(("version".to_owned(), Value::U32(version)));

		if version >= 2 {
			let linked = self.framed("linked", Self::read_linked)?;
			bin.sections.push(("linked".to_owned(), linked));
		}

		let entries = self.framed("entries", Self::read_entries)?;
		bin.sections.push(("entries".to_owned(), entries));

		if is_patch {
			let patches = self.framed("patches", Self::read_patches)?;
			bin.sections.push(("patches".to_owned(), patches));
		}

		if !self.cur.is_eof() {
			return Err(BinError::TrailingData {
				at: self.cur.pos(),
				rem: self.cur.remaining(),
			});
		}
		Ok(bin)
	}

	fn read_linked(&mut self) -> Result<Value> {
		let count = self.cur.read_u32_le()?;
		let mut linked = ListValue {
			kind: Kind::String,
			items: Vec::new(),
		};
		for _ in 0..count {
			linked.items.push(Value::String(self.cur.read_str16()?));
		}
		Ok(Value::List(linked))
	}

	fn read_entries(&mut self) -> Result<Value> {
		let entry_count = self.cur.read_u32_le()?;
		let mut name_hashes = Vec::new();
		for _ in 0..entry_count {
			name_hashes.push(self.cur.read_u32_le()?);
		}

		let mut entries = MapValue {
			key_kind: Kind::Hash,
			value_kind: Kind::Embed,
			items: Vec::new(),
		};
		for name_hash in name_hashes {
			let pair = self.framed("entry", |reader| reader.read_entry(name_hash))?;
			entries.items.push(pair);
		}
		Ok(Value::Map(entries))
	}

	fn read_entry(&mut self, name_hash: u32) -> Result<PairValue> {
		let entry_length = self.cur.read_u32_le()? as usize;
		let start = self.cur.pos();
		let key = self.read_fnv1a()?;
		let count = self.cur.read_u16_le()?;
		let mut body = StructValue {
			name: Fnv1a::from_hash(name_hash),
			items: Vec::with_capacity(usize::from(count)),
		};
		for _ in 0..count {
			body.items.push(self.read_field()?);
		}
		self.expect_end(start, entry_length)?;
		Ok(PairValue {
			key: Value::Hash(key),
			value: Value::Embed(body),
		})
	}

	fn read_patches(&mut self) -> Result<Value> {
		let patch_count = self.cur.read_u32_le()?;
		let mut patches = MapValue {
			key_kind: Kind::Hash,
			value_kind: Kind::Embed,
			items: Vec::new(),
		};
		for _ in 0..patch_count {
			let pair = self.framed("patch", Self::read_patch)?;
			patches.items.push(pair);
		}
		Ok(Value::Map(patches))
	}

	fn read_patch(&mut self) -> Result<PairValue> {
		let key = self.read_fnv1a()?;
		let patch_length = self.cur.read_u32_le()? as usize;
		let start = self.cur.pos();
		let kind = self.read_kind()?;
		let path = self.cur.read_str16()?;
		let value = self.read_value_of(kind)?;
		self.expect_end(start, patch_length)?;

		let body = StructValue {
			name: Fnv1a::from_name("patch"),
			items: vec![
				FieldValue {
					key: Fnv1a::from_name("path"),
					value: Value::String(path),
				},
				FieldValue {
					key: Fnv1a::from_name("value"),
					value,
				},
			],
		};
		Ok(PairValue {
			key: Value::Hash(key),
			value: Value::Embed(body),
		})
	}

	fn read_field(&mut self) -> Result<FieldValue> {
		let key = self.read_fnv1a()?;
		let kind = self.read_kind()?;
		let value = self.read_value_of(kind)?;
		Ok(FieldValue { key, value })
	}

	fn read_value_of(&mut self, kind: Kind) -> Result<Value> {
		match kind {
			Kind::None => Err(BinError::UnreadableKind {
				kind,
				at: self.cur.pos(),
			}),
			Kind::Bool => Ok(Value::Bool(self.cur.read_u8()? != 0)),
			Kind::I8 => Ok(Value::I8(self.cur.read_i8()?)),
			Kind::U8 => Ok(Value::U8(self.cur.read_u8()?)),
			Kind::I16 => Ok(Value::I16(self.cur.read_i16_le()?)),
			Kind::U16 => Ok(Value::U16(self.cur.read_u16_le()?)),
			Kind::I32 => Ok(Value::I32(self.cur.read_i32_le()?)),
			Kind::U32 => Ok(Value::U32(self.cur.read_u32_le()?)),
			Kind::I64 => Ok(Value::I64(self.cur.read_i64_le()?)),
			Kind::U64 => Ok(Value::U64(self.cur.read_u64_le()?)),
			Kind::F32 => Ok(Value::F32(self.cur.read_f32_le()?)),
			Kind::Vec2 => Ok(Value::Vec2(self.cur.read_f32_array()?)),
			Kind::Vec3 => Ok(Value::Vec3(self.cur.read_f32_array()?)),
			Kind::Vec4 => Ok(Value::Vec4(self.cur.read_f32_array()?)),
			Kind::Mtx44 => Ok(Value::Mtx44(self.cur.read_f32_array()?)),
			Kind::Rgba => Ok(Value::Rgba(self.cur.read_u8_array()?)),
			Kind::String => Ok(Value::String(self.cur.read_str16()?)),
			Kind::Hash => Ok(Value::Hash(self.read_fnv1a()?)),
			Kind::File => Ok(Value::File(Xxh64::from_hash(self.cur.read_u64_le()?))),
			Kind::Link => Ok(Value::Link(self.read_fnv1a()?)),
			Kind::Embed => self.framed("embed", |reader| {
				let name = reader.read_fnv1a()?;
				Ok(Value::Embed(reader.read_struct_body(name)?))
			}),
			Kind::Pointer => self.framed("pointer", |reader| {
				let name = reader.read_fnv1a()?;
				if name.hash() == 0 {
					return Ok(Value::Pointer(StructValue::default()));
				}
				Ok(Value::Pointer(reader.read_struct_body(name)?))
			}),
			Kind::Option => self.framed("option", Self::read_option),
			Kind::List | Kind::List2 => self.framed("list", |reader| {
				let list = reader.read_list_body()?;
				Ok(if kind == Kind::List { Value::List(list) } else { Value::List2(list) })
			}),
			Kind::Map => self.framed("map", Self::read_map),
			Kind::Flag => Ok(Value::Flag(self.cur.read_u8()? != 0)),
		}
	}

	fn read_struct_body(&mut self, name: Fnv1a) -> Result<StructValue> {
		let size = self.cur.read_u32_le()? as usize;
		let start = self.cur.pos();
		let count = self.cur.read_u16_le()?;
		let mut body = StructValue {
			name,
			items: Vec::with_capacity(usize::from(count)),
		};
		for _ in 0..count {
			body.items.push(self.read_field()?);
		}
		self.expect_end(start, size)?;
		Ok(body)
	}

	fn read_option(&mut self) -> Result<Value> {
		let kind = self.read_kind()?;
		if kind.is_container() {
			return Err(BinError::ContainerElement { kind });
		}
		let count = self.cur.read_u8()?;
		let item = if count != 0 {
			Some(Box::new(self.read_value_of(kind)?))
		} else {
			None
		};
		Ok(Value::Option(OptionValue { kind, item }))
	}

	fn read_list_body(&mut self) -> Result<ListValue> {
		let kind = self.read_kind()?;
		if kind.is_container() {
			return Err(BinError::ContainerElement { kind });
		}
		let size = self.cur.read_u32_le()? as usize;
		let start = self.cur.pos();
		let count = self.cur.read_u32_le()?;
		let mut list = ListValue {
			kind,
			items: Vec::new(),
		};
		for _ in 0..count {
			list.items.push(self.read_value_of(kind)?);
		}
		self.expect_end(start, size)?;
		Ok(list)
	}

	fn read_map(&mut self) -> Result<Value> {
		let key_kind = self.read_kind()?;
		if !key_kind.is_primitive() {
			return Err(BinError::NonPrimitiveKey { kind: key_kind });
		}
		let value_kind = self.read_kind()?;
		if value_kind.is_container() {
			return Err(BinError::ContainerElement { kind: value_kind });
		}
		let size = self.cur.read_u32_le()? as usize;
		let start = self.cur.pos();
		let count = self.cur.read_u32_le()?;
		let mut map = MapValue {
			key_kind,
			value_kind,
			items: Vec::new(),
		};
		for _ in 0..count {
			let key = self.read_value_of(key_kind)?;
			let value = self.read_value_of(value_kind)?;
			map.items.push(PairValue { key, value });
		}
		self.expect_end(start, size)?;
		Ok(Value::Map(map))
	}
}
