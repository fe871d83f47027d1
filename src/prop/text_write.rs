use crate::prop::hash::{Fnv1a, Xxh64};
use crate::prop::strconv::quote_str;
use crate::prop::value::{Bin, FieldValue, Kind, PairValue, StructValue, Value};

/// Render a section tree as the text format with the given indent width.
pub fn write_text(bin: &Bin, indent_size: usize) -> String {
	let mut writer = TextWriter {
		out: String::new(),
		indent_size,
		indent: 0,
	};
	writer.out.push_str("#PROP_text\n");
	for (name, value) in &bin.sections {
		writer.write_section(name, value);
	}
	writer.out
}

struct TextWriter {
	out: String,
	indent_size: usize,
	indent: usize,
}

impl TextWriter {
	fn pad(&mut self) {
		for _ in 0..self.indent {
			self.out.push(' ');
		}
	}

	fn write_section(&mut self, name: &str, value: &Value) {
		self.out.push_str(name);
		self.out.push_str(": ");
		self.write_type(value);
		self.out.push_str(" = ");
		self.write_value(value);
		self.out.push('\n');
	}

	fn write_type(&mut self, value: &Value) {
		match value {
			Value::List(list) | Value::List2(list) => {
				self.out.push_str(value.type_name());
				self.out.push('[');
				self.out.push_str(list.kind.name());
				self.out.push(']');
			}
			Value::Option(option) => {
				self.out.push_str(Kind::Option.name());
				self.out.push('[');
				self.out.push_str(option.kind.name());
				self.out.push(']');
			}
			Value::Map(map) => {
				self.out.push_str(Kind::Map.name());
				self.out.push('[');
				self.out.push_str(map.key_kind.name());
				self.out.push(',');
				self.out.push_str(map.value_kind.name());
				self.out.push(']');
			}
			value => self.out.push_str(value.type_name()),
		}
	}

	fn write_value(&mut self, value: &Value) {
		match value {
			Value::None => self.out.push_str("null"),
			Value::Bool(value) | Value::Flag(value) => {
				self.out.push_str(if *value { "true" } else { "false" });
			}
			Value::I8(value) => self.write_display(value),
			Value::U8(value) => self.write_display(value),
			Value::I16(value) => self.write_display(value),
			Value::U16(value) => self.write_display(value),
			Value::I32(value) => self.write_display(value),
			Value::U32(value) => self.write_display(value),
			Value::I64(value) => self.write_display(value),
			Value::U64(value) => self.write_display(value),
			Value::F32(value) => self.write_display(value),
			Value::Vec2(value) => self.write_float_array(value),
			Value::Vec3(value) => self.write_float_array(value),
			Value::Vec4(value) => self.write_float_array(value),
			Value::Mtx44(value) => self.write_matrix(value),
			Value::Rgba(value) => self.write_byte_array(value),
			Value::String(value) => quote_str(value, &mut self.out),
			Value::Hash(value) | Value::Link(value) => self.write_fnv_string(value),
			Value::File(value) => self.write_xxh_string(value),
			Value::List(list) | Value::List2(list) => self.write_elements(&list.items),
			Value::Option(option) => match &option.item {
				Some(item) => self.write_elements(std::slice::from_ref(item.as_ref())),
				None => self.write_elements(&[]),
			},
			Value::Map(map) => self.write_pairs(&map.items),
			Value::Embed(body) => self.write_struct(body),
			Value::Pointer(body) => {
				if body.name.name().is_empty() && body.name.hash() == 0 {
					self.out.push_str("null");
					return;
				}
				self.write_struct(body);
			}
		}
	}

	fn write_display<T: std::fmt::Display>(&mut self, value: &T) {
		use std::fmt::Write;
		let _ = write!(self.out, "{value}");
	}

	fn write_name(&mut self, value: &Fnv1a) {
		use std::fmt::Write;
		if !value.name().is_empty() {
			self.out.push_str(value.name());
		} else {
			let _ = write!(self.out, "0x{:08x}", value.hash());
		}
	}

	fn write_fnv_string(&mut self, value: &Fnv1a) {
		use std::fmt::Write;
		if !value.name().is_empty() {
			quote_str(value.name(), &mut self.out);
		} else {
			let _ = write!(self.out, "0x{:08x}", value.hash());
		}
	}

	fn write_xxh_string(&mut self, value: &Xxh64) {
		use std::fmt::Write;
		if !value.name().is_empty() {
			quote_str(value.name(), &mut self.out);
		} else {
			let _ = write!(self.out, "0x{:016x}", value.hash());
		}
	}

	fn write_float_array(&mut self, values: &[f32]) {
		self.out.push_str("{ ");
		for (index, value) in values.iter().enumerate() {
			if index > 0 {
				self.out.push_str(", ");
			}
			self.write_display(value);
		}
		self.out.push_str(" }");
	}

	fn write_byte_array(&mut self, values: &[u8]) {
		self.out.push_str("{ ");
		for (index, value) in values.iter().enumerate() {
			if index > 0 {
				self.out.push_str(", ");
			}
			self.write_display(value);
		}
		self.out.push_str(" }");
	}

	fn write_matrix(&mut self, values: &[f32; 16]) {
		self.indent += self.indent_size;
		self.out.push_str("{\n");
		self.pad();
		for (index, value) in values.iter().enumerate() {
			self.write_display(value);
			if index % 4 == 3 {
				self.out.push('\n');
				if index == 15 {
					self.indent -= self.indent_size;
				}
				self.pad();
			} else {
				self.out.push_str(", ");
			}
		}
		self.out.push('}');
	}

	fn write_struct(&mut self, body: &StructValue) {
		self.write_name(&body.name);
		self.out.push(' ');
		self.write_fields(&body.items);
	}

	fn write_fields(&mut self, items: &[FieldValue]) {
		if items.is_empty() {
			self.out.push_str("{}");
			return;
		}
		self.out.push_str("{\n");
		self.indent += self.indent_size;
		for field in items {
			self.pad();
			self.write_name(&field.key);
			self.out.push_str(": ");
			self.write_type(&field.value);
			self.out.push_str(" = ");
			self.write_value(&field.value);
			self.out.push('\n');
		}
		self.indent -= self.indent_size;
		self.pad();
		self.out.push('}');
	}

	fn write_elements(&mut self, items: &[Value]) {
		if items.is_empty() {
			self.out.push_str("{}");
			return;
		}
		self.out.push_str("{\n");
		self.indent += self.indent_size;
		for item in items {
			self.pad();
			self.write_value(item);
			self.out.push('\n');
		}
		self.indent -= self.indent_size;
		self.pad();
		self.out.push('}');
	}

	fn write_pairs(&mut self, items: &[PairValue]) {
		if items.is_empty() {
			self.out.push_str("{}");
			return;
		}
		self.out.push_str("{\n");
		self.indent += self.indent_size;
		for pair in items {
			self.pad();
			self.write_value(&pair.key);
			self.out.push_str(" = ");
			self.write_value(&pair.value);
			self.out.push('\n');
		}
		self.indent -= self.indent_size;
		self.pad();
		self.out.push('}');
	}
}
