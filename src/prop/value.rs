use crate::prop::hash::{Fnv1a, Xxh64};

/// Stable 8-bit wire tag for every value variant.
///
/// Primitive tags occupy `0x00..=0x12`; complex tags carry the high bit
/// (`0x80..=0x87`). The numeric values are the on-disk encoding of the
/// current format generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Kind {
	None = 0x00,
	Bool = 0x01,
	I8 = 0x02,
	U8 = 0x03,
	I16 = 0x04,
	U16 = 0x05,
	I32 = 0x06,
	U32 = 0x07,
	I64 = 0x08,
	U64 = 0x09,
	F32 = 0x0A,
	Vec2 = 0x0B,
	Vec3 = 0x0C,
	Vec4 = 0x0D,
	Mtx44 = 0x0E,
	Rgba = 0x0F,
	String = 0x10,
	Hash = 0x11,
	File = 0x12,
	List = 0x80,
	List2 = 0x81,
	Pointer = 0x82,
	Embed = 0x83,
	Link = 0x84,
	Option = 0x85,
	Map = 0x86,
	Flag = 0x87,
}

/// Behavioral grouping used by the morpher and the codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
	None,
	Number,
	Vector,
	String,
	Hash,
	Option,
	List,
	Map,
	Class,
}

const KIND_TABLE: [(Kind, &str); 27] = [
	(Kind::None, "none"),
	(Kind::Bool, "bool"),
	(Kind::I8, "i8"),
	(Kind::U8, "u8"),
	(Kind::I16, "i16"),
	(Kind::U16, "u16"),
	(Kind::I32, "i32"),
	(Kind::U32, "u32"),
	(Kind::I64, "i64"),
	(Kind::U64, "u64"),
	(Kind::F32, "f32"),
	(Kind::Vec2, "vec2"),
	(Kind::Vec3, "vec3"),
	(Kind::Vec4, "vec4"),
	(Kind::Mtx44, "mtx44"),
	(Kind::Rgba, "rgba"),
	(Kind::String, "string"),
	(Kind::Hash, "hash"),
	(Kind::File, "file"),
	(Kind::List, "list"),
	(Kind::List2, "list2"),
	(Kind::Pointer, "pointer"),
	(Kind::Embed, "embed"),
	(Kind::Link, "link"),
	(Kind::Option, "option"),
	(Kind::Map, "map"),
	(Kind::Flag, "flag"),
];

impl Kind {
	/// Highest valid primitive tag.
	pub const MAX_PRIMITIVE: u8 = Kind::File as u8;
	/// Highest valid complex tag.
	pub const MAX_COMPLEX: u8 = Kind::Flag as u8;

	/// Validate and convert a raw tag byte of the current generation.
	pub fn from_raw(raw: u8) -> Option<Kind> {
		KIND_TABLE.iter().find(|(kind, _)| *kind as u8 == raw).map(|(kind, _)| *kind)
	}

	/// Return the textual type name (`"i8"`, `"list2"`, ...).
	pub fn name(self) -> &'static str {
		KIND_TABLE[self.index()].1
	}

	/// Look up a tag by its textual type name.
	pub fn from_name(name: &str) -> Option<Kind> {
		KIND_TABLE.iter().find(|(_, kind_name)| *kind_name == name).map(|(kind, _)| *kind)
	}

	/// Return the behavioral category of this tag.
	pub fn category(self) -> Category {
		match self {
			Kind::None => Category::None,
			Kind::Bool
			| Kind::I8
			| Kind::U8
			| Kind::I16
			| Kind::U16
			| Kind::I32
			| Kind::U32
			| Kind::I64
			| Kind::U64
			| Kind::F32
			| Kind::Flag => Category::Number,
			Kind::Vec2 | Kind::Vec3 | Kind::Vec4 | Kind::Mtx44 | Kind::Rgba => Category::Vector,
			Kind::String => Category::String,
			Kind::Hash | Kind::File | Kind::Link => Category::Hash,
			Kind::Option => Category::Option,
			Kind::List | Kind::List2 => Category::List,
			Kind::Map => Category::Map,
			Kind::Pointer | Kind::Embed => Category::Class,
		}
	}

	/// True for tags without the complex high bit.
	pub fn is_primitive(self) -> bool {
		(self as u8) & 0x80 == 0
	}

	/// True for option, list, and map tags.
	pub fn is_container(self) -> bool {
		matches!(self.category(), Category::Option | Category::List | Category::Map)
	}

	fn index(self) -> usize {
		let raw = self as u8;
		if raw & 0x80 == 0 {
			usize::from(raw)
		} else {
			usize::from(raw & 0x7F) + 19
		}
	}
}

impl Default for Kind {
	fn default() -> Self {
		Kind::None
	}
}

/// Ordered sequence of same-typed elements (`list` / `list2`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListValue {
	/// Declared element tag; never a container.
	pub kind: Kind,
	/// Elements in wire order.
	pub items: Vec<Value>,
}

/// Zero-or-one container with a declared element tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionValue {
	/// Declared element tag; never a container.
	pub kind: Kind,
	/// Present element, if any.
	pub item: Option<Box<Value>>,
}

/// Ordered key/value pairs with declared key and value tags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapValue {
	/// Declared key tag; always primitive.
	pub key_kind: Kind,
	/// Declared value tag; never a container.
	pub value_kind: Kind,
	/// Pairs in wire order.
	pub items: Vec<PairValue>,
}

/// One key/value pair inside a map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PairValue {
	pub key: Value,
	pub value: Value,
}

/// Named struct body shared by `embed` and `pointer`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
	/// Struct type name; hash 0 marks the null pointer.
	pub name: Fnv1a,
	/// Named fields in wire order.
	pub items: Vec<FieldValue>,
}

impl StructValue {
	/// Find a field by its key hash.
	pub fn find_field(&self, key: &Fnv1a) -> Option<&FieldValue> {
		self.items.iter().find(|field| field.key.hash() == key.hash())
	}

	/// Find a field by its key hash, mutably.
	pub fn find_field_mut(&mut self, key: &Fnv1a) -> Option<&mut FieldValue> {
		self.items.iter_mut().find(|field| field.key.hash() == key.hash())
	}
}

/// One named field inside a struct body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldValue {
	pub key: Fnv1a,
	pub value: Value,
}

/// Tagged property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	None,
	Bool(bool),
	I8(i8),
	U8(u8),
	I16(i16),
	U16(u16),
	I32(i32),
	U32(u32),
	I64(i64),
	U64(u64),
	F32(f32),
	Vec2([f32; 2]),
	Vec3([f32; 3]),
	Vec4([f32; 4]),
	Mtx44([f32; 16]),
	Rgba([u8; 4]),
	String(String),
	Hash(Fnv1a),
	File(Xxh64),
	List(ListValue),
	List2(ListValue),
	Pointer(StructValue),
	Embed(StructValue),
	Link(Fnv1a),
	Option(OptionValue),
	Map(MapValue),
	Flag(bool),
}

impl Default for Value {
	fn default() -> Self {
		Value::None
	}
}

impl Value {
	/// Return the wire tag of this value.
	pub fn kind(&self) -> Kind {
		match self {
			Value::None => Kind::None,
			Value::Bool(_) => Kind::Bool,
			Value::I8(_) => Kind::I8,
			Value::U8(_) => Kind::U8,
			Value::I16(_) => Kind::I16,
			Value::U16(_) => Kind::U16,
			Value::I32(_) => Kind::I32,
			Value::U32(_) => Kind::U32,
			Value::I64(_) => Kind::I64,
			Value::U64(_) => Kind::U64,
			Value::F32(_) => Kind::F32,
			Value::Vec2(_) => Kind::Vec2,
			Value::Vec3(_) => Kind::Vec3,
			Value::Vec4(_) => Kind::Vec4,
			Value::Mtx44(_) => Kind::Mtx44,
			Value::Rgba(_) => Kind::Rgba,
			Value::String(_) => Kind::String,
			Value::Hash(_) => Kind::Hash,
			Value::File(_) => Kind::File,
			Value::List(_) => Kind::List,
			Value::List2(_) => Kind::List2,
			Value::Pointer(_) => Kind::Pointer,
			Value::Embed(_) => Kind::Embed,
			Value::Link(_) => Kind::Link,
			Value::Option(_) => Kind::Option,
			Value::Map(_) => Kind::Map,
			Value::Flag(_) => Kind::Flag,
		}
	}

	/// Default-construct a value of the given tag.
	pub fn from_kind(kind: Kind) -> Value {
		match kind {
			Kind::None => Value::None,
			Kind::Bool => Value::Bool(false),
			Kind::I8 => Value::I8(0),
			Kind::U8 => Value::U8(0),
			Kind::I16 => Value::I16(0),
			Kind::U16 => Value::U16(0),
			Kind::I32 => Value::I32(0),
			Kind::U32 => Value::U32(0),
			Kind::I64 => Value::I64(0),
			Kind::U64 => Value::U64(0),
			Kind::F32 => Value::F32(0.0),
			Kind::Vec2 => Value::Vec2([0.0; 2]),
			Kind::Vec3 => Value::Vec3([0.0; 3]),
			Kind::Vec4 => Value::Vec4([0.0; 4]),
			Kind::Mtx44 => Value::Mtx44([0.0; 16]),
			Kind::Rgba => Value::Rgba([0; 4]),
			Kind::String => Value::String(String::new()),
			Kind::Hash => Value::Hash(Fnv1a::default()),
			Kind::File => Value::File(Xxh64::default()),
			Kind::List => Value::List(ListValue::default()),
			Kind::List2 => Value::List2(ListValue::default()),
			Kind::Pointer => Value::Pointer(StructValue::default()),
			Kind::Embed => Value::Embed(StructValue::default()),
			Kind::Link => Value::Link(Fnv1a::default()),
			Kind::Option => Value::Option(OptionValue::default()),
			Kind::Map => Value::Map(MapValue::default()),
			Kind::Flag => Value::Flag(false),
		}
	}

	/// Return the textual type name of this value.
	pub fn type_name(&self) -> &'static str {
		self.kind().name()
	}
}

/// Whole parsed file: named sections in insertion order.
///
/// Known sections are `type`, `version`, `linked`, `entries`, and for
/// `PTCH` files `patches`. Insertion order is preserved so every writer
/// emits sections the way they arrived.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bin {
	/// Section name/value pairs in insertion order.
	pub sections: Vec<(String, Value)>,
}

impl Bin {
	/// Create an empty tree.
	pub fn new() -> Self {
		Self::default()
	}

	/// Look up a section by name; first occurrence wins.
	pub fn section(&self, name: &str) -> Option<&Value> {
		self.sections.iter().find(|(section, _)| section == name).map(|(_, value)| value)
	}

	/// Look up a section by name, mutably.
	pub fn section_mut(&mut self, name: &str) -> Option<&mut Value> {
		self.sections.iter_mut().find(|(section, _)| section == name).map(|(_, value)| value)
	}

	/// Append or replace a section, keeping its position when it exists.
	pub fn set_section(&mut self, name: impl Into<String>, value: Value) {
		let name = name.into();
		if let Some(existing) = self.section_mut(&name) {
			*existing = value;
		} else {
			self.sections.push((name, value));
		}
	}
}
