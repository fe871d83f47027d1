use crate::prop::hash::{Fnv1a, Xxh64};
use crate::prop::strconv::unquote_str;
use crate::prop::value::{Bin, FieldValue, Kind, ListValue, MapValue, OptionValue, PairValue, StructValue, Value};
use crate::prop::{BinError, Result};

/// Parse a whole text-format document into a section tree.
pub fn read_text(data: &[u8]) -> Result<Bin> {
	let text = String::from_utf8_lossy(data);
	let mut reader = TextReader::new(&text);
	reader.process_bin()
}

/// Parse a single value; `value` arrives default-constructed with its
/// declared kinds set and is filled in place.
pub fn read_text_value(data: &str, value: &mut Value) -> Result<()> {
	let mut reader = TextReader::new(data);
	reader.next_newline();
	reader.read_value(value)
}

/// Parse a newline/comma-separated list of `name: type = value` fields.
pub fn read_text_fields(data: &str) -> Result<Vec<FieldValue>> {
	let mut reader = TextReader::new(data);
	let mut fields = Vec::new();
	reader.next_newline();
	while !reader.is_eof() {
		fields.push(reader.read_field()?);
		if !reader.is_eof() && !reader.read_nested_separator() {
			return Err(reader.expected("separator"));
		}
	}
	Ok(fields)
}

/// Parse a separated list of bare elements of the given kind.
pub fn read_text_elements(data: &str, kind: Kind) -> Result<Vec<Value>> {
	let mut reader = TextReader::new(data);
	let mut elements = Vec::new();
	reader.next_newline();
	while !reader.is_eof() {
		let mut value = Value::from_kind(kind);
		reader.read_value(&mut value)?;
		elements.push(value);
		if !reader.is_eof() && !reader.read_nested_separator() {
			return Err(reader.expected("separator"));
		}
	}
	Ok(elements)
}

/// Parse a separated list of `key = value` pairs of the given kinds.
pub fn read_text_pairs(data: &str, key_kind: Kind, value_kind: Kind) -> Result<Vec<PairValue>> {
	let mut reader = TextReader::new(data);
	let mut pairs = Vec::new();
	reader.next_newline();
	while !reader.is_eof() {
		pairs.push(reader.read_pair(key_kind, value_kind)?);
		if !reader.is_eof() && !reader.read_nested_separator() {
			return Err(reader.expected("separator"));
		}
	}
	Ok(pairs)
}

struct TextReader<'a> {
	data: &'a str,
	pos: usize,
}

impl<'a> TextReader<'a> {
	fn new(data: &'a str) -> Self {
		Self { data, pos: 0 }
	}

	fn is_eof(&self) -> bool {
		self.pos >= self.data.len()
	}

	fn rest(&self) -> &'a str {
		&self.data[self.pos..]
	}

	fn line_column(&self, at: usize) -> (usize, usize) {
		let before = &self.data.as_bytes()[..at];
		let line = before.iter().filter(|byte| **byte == b'\n').count() + 1;
		let column = match before.iter().rposition(|byte| *byte == b'\n') {
			Some(index) => at - index,
			None => at,
		};
		(line, column)
	}

	fn expected(&self, what: &'static str) -> BinError {
		let (line, column) = self.line_column(self.pos);
		BinError::TextExpected { what, line, column }
	}

	fn framed<T>(&mut self, frame: &'static str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
		let (line, column) = self.line_column(self.pos);
		f(self).map_err(|err| err.framed_text(frame, line, column))
	}

	fn skip_space(&mut self) {
		while let Some(byte) = self.data.as_bytes().get(self.pos) {
			if matches!(byte, b' ' | b'\t' | b'\r') {
				self.pos += 1;
			} else {
				break;
			}
		}
	}

	fn read_symbol(&mut self, symbol: u8) -> bool {
		self.skip_space();
		if self.data.as_bytes().get(self.pos) == Some(&symbol) {
			self.pos += 1;
			return true;
		}
		false
	}

	/// Consume whitespace, newlines, and `#` comments; true if at least one
	/// newline was crossed.
	fn next_newline(&mut self) -> bool {
		let mut in_comment = false;
		let mut saw_newline = false;
		while let Some(byte) = self.data.as_bytes().get(self.pos) {
			match byte {
				b' ' | b'\t' | b'\r' => self.pos += 1,
				b'\n' => {
					in_comment = false;
					saw_newline = true;
					self.pos += 1;
				}
				b'#' => {
					in_comment = true;
					self.pos += 1;
				}
				_ if in_comment => self.pos += 1,
				_ => break,
			}
		}
		saw_newline
	}

	fn read_word(&mut self) -> &'a str {
		self.skip_space();
		let start = self.pos;
		while let Some(byte) = self.data.as_bytes().get(self.pos) {
			if matches!(byte, b'_' | b'+' | b'-' | b'.') || byte.is_ascii_alphanumeric() {
				self.pos += 1;
			} else {
				break;
			}
		}
		&self.data[start..self.pos]
	}

	fn read_nested_begin(&mut self) -> Option<bool> {
		if self.read_symbol(b'{') {
			self.next_newline();
			return Some(self.read_symbol(b'}'));
		}
		None
	}

	fn read_nested_separator(&mut self) -> bool {
		if self.next_newline() {
			return true;
		}
		if self.read_symbol(b',') {
			self.next_newline();
			return true;
		}
		false
	}

	fn read_nested_separator_or_end(&mut self) -> Option<bool> {
		if self.read_symbol(b'}') {
			return Some(true);
		}
		if self.read_nested_separator() {
			return Some(self.read_symbol(b'}'));
		}
		None
	}

	fn read_string(&mut self) -> Option<String> {
		self.skip_space();
		let (value, used) = unquote_str(self.rest())?;
		self.pos += used;
		Some(value)
	}

	fn read_hex_u64(&mut self) -> Option<u64> {
		let backup = self.pos;
		let word = self.read_word();
		if word.len() < 3 || !word.starts_with("0x") && !word.starts_with("0X") {
			self.pos = backup;
			return None;
		}
		match u64::from_str_radix(&word[2..], 16) {
			Ok(value) => Some(value),
			Err(_) => {
				self.pos = backup;
				None
			}
		}
	}

	fn read_name(&mut self) -> Option<String> {
		let backup = self.pos;
		let word = self.read_word();
		let mut chars = word.chars();
		let Some(first) = chars.next() else {
			self.pos = backup;
			return None;
		};
		if !first.is_ascii_alphabetic() && first != '_' {
			self.pos = backup;
			return None;
		}
		if !word.chars().all(|c| c == '_' || c.is_ascii_alphanumeric()) {
			self.pos = backup;
			return None;
		}
		Some(word.to_owned())
	}

	fn read_hash_name(&mut self) -> Option<Fnv1a> {
		let backup = self.pos;
		if let Some(raw) = self.read_hex_u64() {
			if let Ok(hash) = u32::try_from(raw) {
				return Some(Fnv1a::from_hash(hash));
			}
			self.pos = backup;
			return None;
		}
		self.read_name().map(Fnv1a::from_name)
	}

	fn read_hash_or_string_fnv(&mut self) -> Option<Fnv1a> {
		let backup = self.pos;
		if let Some(raw) = self.read_hex_u64() {
			if let Ok(hash) = u32::try_from(raw) {
				return Some(Fnv1a::from_hash(hash));
			}
			self.pos = backup;
			return None;
		}
		self.read_string().map(Fnv1a::from_name)
	}

	fn read_hash_or_string_xxh(&mut self) -> Option<Xxh64> {
		if let Some(raw) = self.read_hex_u64() {
			return Some(Xxh64::from_hash(raw));
		}
		self.read_string().map(Xxh64::from_name)
	}

	fn read_bool(&mut self) -> Option<bool> {
		let backup = self.pos;
		match self.read_word() {
			"true" => Some(true),
			"false" => Some(false),
			_ => {
				self.pos = backup;
				None
			}
		}
	}

	fn read_kind(&mut self) -> Result<Kind> {
		let backup = self.pos;
		let word = self.read_word();
		match Kind::from_name(word) {
			Some(kind) => Ok(kind),
			None => {
				self.pos = backup;
				Err(self.expected("type name"))
			}
		}
	}

	fn read_number<T: std::str::FromStr>(&mut self) -> Option<T> {
		let backup = self.pos;
		match self.read_word().parse() {
			Ok(value) => Some(value),
			Err(_) => {
				self.pos = backup;
				None
			}
		}
	}

	fn process_bin(&mut self) -> Result<Bin> {
		let mut bin = Bin::new();
		self.next_newline();
		while !self.is_eof() {
			let name = self.read_name().ok_or_else(|| self.expected("section name"))?;
			let mut value = self.framed("section type", Self::read_value_type)?;
			if !self.read_symbol(b'=') {
				return Err(self.expected("'='"));
			}
			self.read_value(&mut value)?;
			if !self.is_eof() && !self.read_nested_separator() {
				return Err(self.expected("separator"));
			}
			bin.sections.push((name, value));
		}
		Ok(bin)
	}

	/// Parse `: type` with optional `[...]` element types, yielding a
	/// default value carrying the declared kinds.
	fn read_value_type(&mut self) -> Result<Value> {
		if !self.read_symbol(b':') {
			return Err(self.expected("':'"));
		}
		let kind = self.read_kind()?;
		match kind {
			Kind::List | Kind::List2 | Kind::Option => {
				if !self.read_symbol(b'[') {
					return Err(self.expected("'['"));
				}
				let value_kind = self.read_kind()?;
				if value_kind.is_container() {
					return Err(BinError::ContainerElement { kind: value_kind });
				}
				if !self.read_symbol(b']') {
					return Err(self.expected("']'"));
				}
				Ok(match kind {
					Kind::List => Value::List(ListValue {
						kind: value_kind,
						items: Vec::new(),
					}),
					Kind::List2 => Value::List2(ListValue {
						kind: value_kind,
						items: Vec::new(),
					}),
					_ => Value::Option(OptionValue {
						kind: value_kind,
						item: None,
					}),
				})
			}
			Kind::Map => {
				if !self.read_symbol(b'[') {
					return Err(self.expected("'['"));
				}
				let key_kind = self.read_kind()?;
				if !key_kind.is_primitive() {
					return Err(BinError::NonPrimitiveKey { kind: key_kind });
				}
				if !self.read_symbol(b',') {
					return Err(self.expected("','"));
				}
				let value_kind = self.read_kind()?;
				if value_kind.is_container() {
					return Err(BinError::ContainerElement { kind: value_kind });
				}
				if !self.read_symbol(b']') {
					return Err(self.expected("']'"));
				}
				Ok(Value::Map(MapValue {
					key_kind,
					value_kind,
					items: Vec::new(),
				}))
			}
			kind => Ok(Value::from_kind(kind)),
		}
	}

	fn read_field(&mut self) -> Result<FieldValue> {
		let key = self.read_hash_name().ok_or_else(|| self.expected("field name"))?;
		let mut value = self.read_value_type()?;
		if !self.read_symbol(b'=') {
			return Err(self.expected("'='"));
		}
		self.read_value(&mut value)?;
		Ok(FieldValue { key, value })
	}

	fn read_pair(&mut self, key_kind: Kind, value_kind: Kind) -> Result<PairValue> {
		let mut key = Value::from_kind(key_kind);
		self.read_value(&mut key)?;
		if !self.read_symbol(b'=') {
			return Err(self.expected("'='"));
		}
		let mut value = Value::from_kind(value_kind);
		self.read_value(&mut value)?;
		Ok(PairValue { key, value })
	}

	fn read_value(&mut self, value: &mut Value) -> Result<()> {
		match value {
			Value::None => {
				let word = self.read_name().ok_or_else(|| self.expected("null"))?;
				if word != "null" {
					return Err(self.expected("null"));
				}
				Ok(())
			}
			Value::Bool(out) | Value::Flag(out) => {
				*out = self.read_bool().ok_or_else(|| self.expected("bool"))?;
				Ok(())
			}
			Value::I8(out) => self.fill_number(out),
			Value::U8(out) => self.fill_number(out),
			Value::I16(out) => self.fill_number(out),
			Value::U16(out) => self.fill_number(out),
			Value::I32(out) => self.fill_number(out),
			Value::U32(out) => self.fill_number(out),
			Value::I64(out) => self.fill_number(out),
			Value::U64(out) => self.fill_number(out),
			Value::F32(out) => self.fill_number(out),
			Value::Vec2(out) => self.read_float_array(out),
			Value::Vec3(out) => self.read_float_array(out),
			Value::Vec4(out) => self.read_float_array(out),
			Value::Mtx44(out) => self.read_float_array(out),
			Value::Rgba(out) => self.read_byte_array(out),
			Value::String(out) => {
				*out = self.read_string().ok_or_else(|| self.expected("string"))?;
				Ok(())
			}
			Value::Hash(out) => {
				*out = self.read_hash_or_string_fnv().ok_or_else(|| self.expected("hash or string"))?;
				Ok(())
			}
			Value::Link(out) => {
				*out = self.read_hash_or_string_fnv().ok_or_else(|| self.expected("hash or string"))?;
				Ok(())
			}
			Value::File(out) => {
				*out = self.read_hash_or_string_xxh().ok_or_else(|| self.expected("hash or string"))?;
				Ok(())
			}
			Value::List(list) | Value::List2(list) => {
				let kind = list.kind;
				let items = &mut list.items;
				self.framed("list", |reader| reader.read_elements(kind, items))
			}
			Value::Option(option) => {
				let kind = option.kind;
				let item = &mut option.item;
				self.framed("option", |reader| reader.read_option_body(kind, item))
			}
			Value::Map(map) => {
				let (key_kind, value_kind) = (map.key_kind, map.value_kind);
				let items = &mut map.items;
				self.framed("map", |reader| reader.read_pairs(key_kind, value_kind, items))
			}
			Value::Embed(body) => self.framed("embed", |reader| reader.read_struct_body(body, false)),
			Value::Pointer(body) => self.framed("pointer", |reader| reader.read_struct_body(body, true)),
		}
	}

	fn fill_number<T: std::str::FromStr>(&mut self, out: &mut T) -> Result<()> {
		*out = self.read_number().ok_or_else(|| self.expected("number"))?;
		Ok(())
	}

	fn read_elements(&mut self, kind: Kind, items: &mut Vec<Value>) -> Result<()> {
		let mut end = self.read_nested_begin().ok_or_else(|| self.expected("'{'"))?;
		while !end {
			let mut item = Value::from_kind(kind);
			self.read_value(&mut item)?;
			items.push(item);
			end = self.read_nested_separator_or_end().ok_or_else(|| self.expected("separator or '}'"))?;
		}
		Ok(())
	}

	fn read_option_body(&mut self, kind: Kind, slot: &mut Option<Box<Value>>) -> Result<()> {
		let end = self.read_nested_begin().ok_or_else(|| self.expected("'{'"))?;
		if end {
			return Ok(());
		}
		let mut item = Value::from_kind(kind);
		self.read_value(&mut item)?;
		*slot = Some(Box::new(item));
		let end = self.read_nested_separator_or_end().ok_or_else(|| self.expected("separator or '}'"))?;
		if !end {
			return Err(self.expected("'}'"));
		}
		Ok(())
	}

	fn read_pairs(&mut self, key_kind: Kind, value_kind: Kind, items: &mut Vec<PairValue>) -> Result<()> {
		let mut end = self.read_nested_begin().ok_or_else(|| self.expected("'{'"))?;
		while !end {
			items.push(self.read_pair(key_kind, value_kind)?);
			end = self.read_nested_separator_or_end().ok_or_else(|| self.expected("separator or '}'"))?;
		}
		Ok(())
	}

	fn read_struct_body(&mut self, body: &mut StructValue, nullable: bool) -> Result<()> {
		body.name = self.read_hash_name().ok_or_else(|| self.expected("struct name"))?;
		if nullable && body.name.name() == "null" {
			body.name = Fnv1a::default();
			return Ok(());
		}
		let mut end = self.read_nested_begin().ok_or_else(|| self.expected("'{'"))?;
		while !end {
			body.items.push(self.read_field()?);
			end = self.read_nested_separator_or_end().ok_or_else(|| self.expected("separator or '}'"))?;
		}
		Ok(())
	}

	fn read_float_array(&mut self, out: &mut [f32]) -> Result<()> {
		let mut end = self.read_nested_begin().ok_or_else(|| self.expected("'{'"))?;
		let mut count = 0;
		while !end {
			if count >= out.len() {
				return Err(self.expected("'}'"));
			}
			out[count] = self.read_number().ok_or_else(|| self.expected("number"))?;
			end = self.read_nested_separator_or_end().ok_or_else(|| self.expected("separator or '}'"))?;
			count += 1;
		}
		if count != out.len() {
			return Err(self.expected("number"));
		}
		Ok(())
	}

	fn read_byte_array(&mut self, out: &mut [u8]) -> Result<()> {
		let mut end = self.read_nested_begin().ok_or_else(|| self.expected("'{'"))?;
		let mut count = 0;
		while !end {
			if count >= out.len() {
				return Err(self.expected("'}'"));
			}
			out[count] = self.read_number().ok_or_else(|| self.expected("number"))?;
			end = self.read_nested_separator_or_end().ok_or_else(|| self.expected("separator or '}'"))?;
			count += 1;
		}
		if count != out.len() {
			return Err(self.expected("number"));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{read_text, read_text_elements, read_text_value};
	use crate::prop::value::{Kind, Value};

	#[test]
	fn minimal_document_parses() {
		let text = "#PROP_text\ntype: string = \"PROP\"\nversion: u32 = 1\nentries: map[hash,embed] = {}\n";
		let bin = read_text(text.as_bytes()).expect("minimal document parses");
		assert_eq!(bin.section("type"), Some(&Value::String("PROP".to_owned())));
		assert_eq!(bin.section("version"), Some(&Value::U32(1)));
		let Some(Value::Map(entries)) = bin.section("entries") else {
			panic!("entries should be a map");
		};
		assert_eq!(entries.key_kind, Kind::Hash);
		assert_eq!(entries.value_kind, Kind::Embed);
	}

	#[test]
	fn comments_and_commas_are_soft_separators() {
		let text = "list: list[u32] = { 1, 2 # trailing comment\n3 }\n";
		let bin = read_text(text.as_bytes()).expect("separators parse");
		let Some(Value::List(list)) = bin.section("list") else {
			panic!("list section expected");
		};
		assert_eq!(list.items, vec![Value::U32(1), Value::U32(2), Value::U32(3)]);
	}

	#[test]
	fn bare_names_hash_and_keep_their_spelling() {
		let text = "entry: embed = SkinCharacterDataProperties {\n  skinClassification: u32 = 1\n}\n";
		let bin = read_text(text.as_bytes()).expect("embed parses");
		let Some(Value::Embed(body)) = bin.section("entry") else {
			panic!("embed section expected");
		};
		assert_eq!(body.name.name(), "SkinCharacterDataProperties");
		assert_eq!(body.items.len(), 1);
		assert_eq!(body.items[0].key.name(), "skinClassification");
	}

	#[test]
	fn null_pointer_parses() {
		let mut value = Value::from_kind(Kind::Pointer);
		read_text_value("null", &mut value).expect("null pointer parses");
		let Value::Pointer(body) = value else {
			panic!("pointer expected");
		};
		assert_eq!(body.name.hash(), 0);
		assert!(body.items.is_empty());
	}

	#[test]
	fn vectors_require_exact_arity() {
		let mut value = Value::from_kind(Kind::Vec3);
		read_text_value("{ 1, 2, 3 }", &mut value).expect("full vector parses");
		assert_eq!(value, Value::Vec3([1.0, 2.0, 3.0]));

		let mut short = Value::from_kind(Kind::Vec3);
		assert!(read_text_value("{ 1, 2 }", &mut short).is_err());
	}

	#[test]
	fn element_fragments_parse() {
		let items = read_text_elements("1\n2, 3\n", Kind::U8).expect("fragment parses");
		assert_eq!(items, vec![Value::U8(1), Value::U8(2), Value::U8(3)]);
	}

	#[test]
	fn errors_carry_line_and_column() {
		let err = read_text(b"type string = \"PROP\"\n").expect_err("missing colon should fail");
		let text = err.to_string();
		assert!(text.contains("line 1"), "position in message: {text}");
	}
}
