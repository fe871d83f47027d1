use crate::prop::hash::{Fnv1a, Xxh64};
use crate::prop::value::{Category, FieldValue, Kind, ListValue, MapValue, OptionValue, PairValue, StructValue, Value};

/// Fidelity of a value coercion.
///
/// The rank ordering expresses monotonic worsening: `Fail` < `Lossy` <
/// `Ok` < `Unchanged` < `Incomplete`. Folding the worst result across a
/// container keeps the lowest rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphResult {
	/// Invalid key or value type for the requested retyping.
	Fail,
	/// New value only partially preserves the old value.
	Lossy,
	/// New value fully preserves the old value.
	Ok,
	/// New value is exactly the old value.
	Unchanged,
	/// New value is structurally valid but not fully initialized.
	Incomplete,
}

impl MorphResult {
	fn rank(self) -> i8 {
		match self {
			MorphResult::Fail => -3,
			MorphResult::Lossy => -1,
			MorphResult::Ok => 0,
			MorphResult::Unchanged => 1,
			MorphResult::Incomplete => 2,
		}
	}

	/// Keep the lower-ranked of two results.
	pub fn worst(self, other: MorphResult) -> MorphResult {
		if other.rank() < self.rank() { other } else { self }
	}

	fn is_good(self) -> bool {
		self.rank() >= MorphResult::Ok.rank()
	}
}

/// Coerce `value` into the given kind in place, reporting fidelity.
pub fn morph_value(value: &mut Value, into: Kind) -> MorphResult {
	let from = std::mem::take(value);
	let (morphed, result) = morph_move(from, into);
	*value = morphed;
	result
}

/// Retype a container's stored values, morphing every element.
///
/// Non-containers are left untouched. A container target type fails: list,
/// option, and map elements must stay non-container.
pub fn morph_type_value(value: &mut Value, new_kind: Kind) -> MorphResult {
	match value {
		Value::List(list) | Value::List2(list) => {
			if list.kind == new_kind {
				return MorphResult::Unchanged;
			}
			if new_kind.is_container() {
				return MorphResult::Fail;
			}
			list.kind = new_kind;
			let mut worst = MorphResult::Unchanged;
			for item in &mut list.items {
				worst = worst.worst(morph_value(item, new_kind));
			}
			worst
		}
		Value::Option(option) => {
			if option.kind == new_kind {
				return MorphResult::Unchanged;
			}
			if new_kind.is_container() {
				return MorphResult::Fail;
			}
			option.kind = new_kind;
			match &mut option.item {
				Some(item) => morph_value(item, new_kind).worst(MorphResult::Unchanged),
				None => MorphResult::Unchanged,
			}
		}
		Value::Map(map) => {
			if map.value_kind == new_kind {
				return MorphResult::Unchanged;
			}
			if new_kind.is_container() {
				return MorphResult::Fail;
			}
			map.value_kind = new_kind;
			let mut worst = MorphResult::Unchanged;
			for pair in &mut map.items {
				worst = worst.worst(morph_value(&mut pair.value, new_kind));
			}
			worst
		}
		_ => MorphResult::Unchanged,
	}
}

/// Retype a map's keys, morphing every stored key.
///
/// Non-maps are left untouched. The new key type must be primitive.
pub fn morph_type_key(value: &mut Value, new_kind: Kind) -> MorphResult {
	match value {
		Value::Map(map) => {
			if map.key_kind == new_kind {
				return MorphResult::Unchanged;
			}
			if !new_kind.is_primitive() {
				return MorphResult::Fail;
			}
			map.key_kind = new_kind;
			let mut worst = MorphResult::Unchanged;
			for pair in &mut map.items {
				worst = worst.worst(morph_value(&mut pair.key, new_kind));
			}
			worst
		}
		_ => MorphResult::Unchanged,
	}
}

fn morph_move(from: Value, into: Kind) -> (Value, MorphResult) {
	if from.kind() == into {
		return (from, MorphResult::Unchanged);
	}
	let from_category = from.kind().category();
	match (from_category, into.category()) {
		(Category::None, _) => (Value::from_kind(into), MorphResult::Incomplete),
		(_, Category::None) => (Value::None, MorphResult::Lossy),

		(Category::Number, Category::Number) => number_to_number(from, into),
		(Category::Number, Category::Vector) => number_to_vector(from, into),
		(Category::Number, Category::String) => (Value::String(number_text(&from)), MorphResult::Ok),
		(Category::Number, Category::Hash) => number_to_hash(from, into),
		(Category::Number, Category::Option) | (Category::Number, Category::List) => wrap_element(from, into),
		(Category::Number, Category::Map) => wrap_pair(from, MorphResult::Ok),
		(Category::Number, Category::Class) => (Value::from_kind(into), MorphResult::Incomplete),

		(Category::Vector, Category::Number) => vector_to_number(from, into),
		(Category::Vector, Category::Vector) => vector_to_vector(from, into),
		(Category::Vector, Category::String) => {
			let text = number_text(&vector_first(&from));
			(Value::String(text), MorphResult::Lossy)
		}
		(Category::Vector, Category::Hash) => {
			let (value, _) = number_to_hash(vector_first(&from), into);
			(value, MorphResult::Lossy)
		}
		(Category::Vector, Category::Option) => wrap_element(from, into),
		(Category::Vector, Category::List) => vector_to_list(from, into),
		(Category::Vector, Category::Map) => wrap_pair(from, MorphResult::Ok),
		(Category::Vector, Category::Class) => (Value::from_kind(into), MorphResult::Incomplete),

		(Category::String, Category::Number) => string_to_number(from, into),
		(Category::String, Category::Vector) => string_to_vector(from, into),
		(Category::String, Category::Hash) => string_to_hash(from, into),
		(Category::String, Category::Option) | (Category::String, Category::List) => wrap_element(from, into),
		(Category::String, Category::Map) => wrap_pair(from, MorphResult::Ok),
		(Category::String, Category::String) => (from, MorphResult::Ok),
		(Category::String, Category::Class) => (Value::from_kind(into), MorphResult::Incomplete),

		(Category::Hash, Category::Number) => hash_to_number(from, into),
		(Category::Hash, Category::Vector) => {
			let (value, _) = number_to_vector(hash_as_number(&from), into);
			(value, MorphResult::Incomplete)
		}
		(Category::Hash, Category::String) => hash_to_string(from),
		(Category::Hash, Category::Hash) => hash_to_hash(from, into),
		(Category::Hash, Category::Option) | (Category::Hash, Category::List) => wrap_element(from, into),
		(Category::Hash, Category::Map) => wrap_pair(from, MorphResult::Ok),
		(Category::Hash, Category::Class) => (Value::from_kind(into), MorphResult::Incomplete),

		(Category::Option, Category::List) => option_to_list(from, into),
		(Category::Option, Category::Map) => option_to_map(from),
		(Category::Option, _) => option_take_first(from, into),

		(Category::List, Category::Vector) => list_to_vector(from, into),
		(Category::List, Category::Option) => list_to_option(from),
		(Category::List, Category::List) => list_to_list(from, into),
		(Category::List, Category::Map) => list_to_map(from),
		(Category::List, _) => list_take_first(from, into),

		(Category::Map, Category::Option) => map_to_option(from),
		(Category::Map, Category::List) => map_to_list(from, into),
		(Category::Map, Category::Class) => map_to_class(from, into),
		(Category::Map, _) => (Value::from_kind(into), MorphResult::Incomplete),

		(Category::Class, Category::Option) | (Category::Class, Category::List) => wrap_element(from, into),
		(Category::Class, Category::Map) => wrap_pair(from, MorphResult::Lossy),
		(Category::Class, Category::Class) => class_to_class(from, into),
		(Category::Class, _) => (Value::from_kind(into), MorphResult::Incomplete),
	}
}

/// Width-agnostic view of a numeric payload.
#[derive(Debug, Clone, Copy)]
enum Num {
	Int(i128),
	Float(f32),
}

fn num_of(value: &Value) -> Num {
	match value {
		Value::Bool(value) | Value::Flag(value) => Num::Int(i128::from(*value)),
		Value::I8(value) => Num::Int(i128::from(*value)),
		Value::U8(value) => Num::Int(i128::from(*value)),
		Value::I16(value) => Num::Int(i128::from(*value)),
		Value::U16(value) => Num::Int(i128::from(*value)),
		Value::I32(value) => Num::Int(i128::from(*value)),
		Value::U32(value) => Num::Int(i128::from(*value)),
		Value::I64(value) => Num::Int(i128::from(*value)),
		Value::U64(value) => Num::Int(i128::from(*value)),
		Value::F32(value) => Num::Float(*value),
		_ => Num::Int(0),
	}
}

/// Convert a number to the target kind with wrap-around integer casts,
/// reporting whether the round trip preserves the source.
fn num_to_kind(num: Num, kind: Kind) -> (Value, bool) {
	match kind {
		Kind::Bool | Kind::Flag => {
			let (value, exact) = match num {
				Num::Int(value) => (value != 0, value == 0 || value == 1),
				Num::Float(value) => (value != 0.0, value == 0.0 || value == 1.0),
			};
			let value = if kind == Kind::Bool { Value::Bool(value) } else { Value::Flag(value) };
			(value, exact)
		}
		Kind::I8 => int_cast(num, |v| Value::I8(v as i8), |v| i128::from(v as i8)),
		Kind::U8 => int_cast(num, |v| Value::U8(v as u8), |v| i128::from(v as u8)),
		Kind::I16 => int_cast(num, |v| Value::I16(v as i16), |v| i128::from(v as i16)),
		Kind::U16 => int_cast(num, |v| Value::U16(v as u16), |v| i128::from(v as u16)),
		Kind::I32 => int_cast(num, |v| Value::I32(v as i32), |v| i128::from(v as i32)),
		Kind::U32 => int_cast(num, |v| Value::U32(v as u32), |v| i128::from(v as u32)),
		Kind::I64 => int_cast(num, |v| Value::I64(v as i64), |v| i128::from(v as i64)),
		Kind::U64 => int_cast(num, |v| Value::U64(v as u64), |v| i128::from(v as u64)),
		Kind::F32 => match num {
			Num::Int(value) => {
				let converted = value as f32;
				(Value::F32(converted), converted.is_finite() && converted as i128 == value)
			}
			Num::Float(value) => (Value::F32(value), true),
		},
		_ => (Value::from_kind(kind), false),
	}
}

fn int_cast(num: Num, build: impl Fn(i128) -> Value, back: impl Fn(i128) -> i128) -> (Value, bool) {
	match num {
		Num::Int(value) => (build(value), back(value) == value),
		Num::Float(value) => {
			let truncated = value as i128;
			let exact = back(truncated) as f32 == value;
			(build(truncated), exact)
		}
	}
}

fn number_text(value: &Value) -> String {
	match num_of(value) {
		Num::Int(value) => value.to_string(),
		Num::Float(value) => value.to_string(),
	}
}

fn number_to_number(from: Value, into: Kind) -> (Value, MorphResult) {
	let (value, exact) = num_to_kind(num_of(&from), into);
	(value, if exact { MorphResult::Ok } else { MorphResult::Lossy })
}

fn number_to_vector(from: Value, into: Kind) -> (Value, MorphResult) {
	let num = num_of(&from);
	let mut value = Value::from_kind(into);
	match &mut value {
		Value::Vec2(out) => {
			out[0] = num_to_f32(num);
		}
		Value::Vec3(out) => {
			out[0] = num_to_f32(num);
		}
		Value::Vec4(out) => {
			out[0] = num_to_f32(num);
		}
		Value::Mtx44(out) => {
			out[0] = num_to_f32(num);
		}
		Value::Rgba(out) => {
			let (converted, _) = num_to_kind(num, Kind::U8);
			if let Value::U8(byte) = converted {
				out[0] = byte;
			}
		}
		_ => {}
	}
	(value, MorphResult::Incomplete)
}

fn num_to_f32(num: Num) -> f32 {
	match num {
		Num::Int(value) => value as f32,
		Num::Float(value) => value,
	}
}

fn number_to_hash(from: Value, into: Kind) -> (Value, MorphResult) {
	match into {
		Kind::File => {
			let (converted, exact) = num_to_kind(num_of(&from), Kind::U64);
			if exact {
				let Value::U64(hash) = converted else { unreachable!() };
				(Value::File(Xxh64::from_hash(hash)), MorphResult::Ok)
			} else {
				(Value::File(Xxh64::default()), MorphResult::Lossy)
			}
		}
		_ => {
			let (converted, exact) = num_to_kind(num_of(&from), Kind::U32);
			let hash = match converted {
				Value::U32(hash) if exact => hash,
				_ => 0,
			};
			let value = if into == Kind::Link {
				Value::Link(Fnv1a::from_hash(hash))
			} else {
				Value::Hash(Fnv1a::from_hash(hash))
			};
			(value, if exact { MorphResult::Ok } else { MorphResult::Lossy })
		}
	}
}

fn vector_first(value: &Value) -> Value {
	match value {
		Value::Vec2(out) => Value::F32(out[0]),
		Value::Vec3(out) => Value::F32(out[0]),
		Value::Vec4(out) => Value::F32(out[0]),
		Value::Mtx44(out) => Value::F32(out[0]),
		Value::Rgba(out) => Value::U8(out[0]),
		_ => Value::None,
	}
}

fn vector_to_number(from: Value, into: Kind) -> (Value, MorphResult) {
	let (value, _) = num_to_kind(num_of(&vector_first(&from)), into);
	(value, MorphResult::Lossy)
}

/// Element conversion between vector storage types: integer channels scale
/// into the unit range against their maximum, rounding to nearest on the
/// way back.
fn scale_f32_to_u8(value: f32) -> (u8, bool) {
	let converted = (value * 255.0).round();
	let byte = converted.clamp(0.0, 255.0) as u8;
	(byte, f32::from(byte) / 255.0 == value)
}

fn scale_u8_to_f32(value: u8) -> f32 {
	f32::from(value) / 255.0
}

fn vector_floats(value: &Value) -> Option<&[f32]> {
	match value {
		Value::Vec2(out) => Some(out),
		Value::Vec3(out) => Some(out),
		Value::Vec4(out) => Some(out),
		Value::Mtx44(out) => Some(out),
		_ => None,
	}
}

fn vector_len(kind: Kind) -> usize {
	match kind {
		Kind::Vec2 => 2,
		Kind::Vec3 => 3,
		Kind::Vec4 => 4,
		Kind::Mtx44 => 16,
		Kind::Rgba => 4,
		_ => 0,
	}
}

fn build_float_vector(kind: Kind, values: &[f32]) -> Value {
	let mut value = Value::from_kind(kind);
	let out: &mut [f32] = match &mut value {
		Value::Vec2(out) => out,
		Value::Vec3(out) => out,
		Value::Vec4(out) => out,
		Value::Mtx44(out) => out,
		_ => return value,
	};
	for (slot, item) in out.iter_mut().zip(values) {
		*slot = *item;
	}
	value
}

fn vector_to_vector(from: Value, into: Kind) -> (Value, MorphResult) {
	let from_len = vector_len(from.kind());
	let into_len = vector_len(into);
	let min = from_len.min(into_len);
	let mut result = MorphResult::Ok;

	let value = match (vector_floats(&from), into) {
		// Float source, float target: plain copy of the shared prefix.
		(Some(floats), kind) if kind != Kind::Rgba => build_float_vector(kind, floats),
		// Float source, byte target: scale against the channel maximum.
		(Some(floats), _) => {
			let mut out = [0_u8; 4];
			for (slot, item) in out.iter_mut().zip(floats.iter()) {
				let (byte, exact) = scale_f32_to_u8(*item);
				*slot = byte;
				if !exact {
					result = MorphResult::Lossy;
				}
			}
			Value::Rgba(out)
		}
		// Byte source, float target: scaling is always exact.
		(None, kind) => {
			let Value::Rgba(bytes) = &from else {
				return (Value::from_kind(into), MorphResult::Incomplete);
			};
			let floats: Vec<f32> = bytes.iter().copied().map(scale_u8_to_f32).collect();
			build_float_vector(kind, &floats)
		}
	};

	if min < from_len {
		(value, MorphResult::Lossy)
	} else if min < into_len {
		(value, MorphResult::Incomplete)
	} else {
		(value, result)
	}
}

fn vector_to_list(from: Value, into: Kind) -> (Value, MorphResult) {
	let (kind, items): (Kind, Vec<Value>) = match &from {
		Value::Rgba(bytes) => (Kind::U8, bytes.iter().map(|byte| Value::U8(*byte)).collect()),
		value => match vector_floats(value) {
			Some(floats) => (Kind::F32, floats.iter().map(|item| Value::F32(*item)).collect()),
			None => return (Value::from_kind(into), MorphResult::Incomplete),
		},
	};
	let list = ListValue { kind, items };
	let value = if into == Kind::List2 { Value::List2(list) } else { Value::List(list) };
	(value, MorphResult::Ok)
}

fn string_to_number(from: Value, into: Kind) -> (Value, MorphResult) {
	let Value::String(text) = &from else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};
	match parse_number(text, into) {
		Some(value) => (value, MorphResult::Ok),
		None => (Value::from_kind(into), MorphResult::Incomplete),
	}
}

fn parse_number(text: &str, kind: Kind) -> Option<Value> {
	match kind {
		Kind::Bool | Kind::Flag => {
			let parsed = match text {
				"true" | "1" => true,
				"false" | "0" => false,
				_ => return None,
			};
			Some(if kind == Kind::Bool { Value::Bool(parsed) } else { Value::Flag(parsed) })
		}
		Kind::I8 => text.parse().ok().map(Value::I8),
		Kind::U8 => text.parse().ok().map(Value::U8),
		Kind::I16 => text.parse().ok().map(Value::I16),
		Kind::U16 => text.parse().ok().map(Value::U16),
		Kind::I32 => text.parse().ok().map(Value::I32),
		Kind::U32 => text.parse().ok().map(Value::U32),
		Kind::I64 => text.parse().ok().map(Value::I64),
		Kind::U64 => text.parse().ok().map(Value::U64),
		Kind::F32 => text.parse().ok().map(Value::F32),
		_ => None,
	}
}

fn string_to_vector(from: Value, into: Kind) -> (Value, MorphResult) {
	let Value::String(text) = &from else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};
	match text.parse::<f32>() {
		Ok(parsed) => number_to_vector(Value::F32(parsed), into),
		Err(_) => (Value::from_kind(into), MorphResult::Incomplete),
	}
}

fn string_to_hash(from: Value, into: Kind) -> (Value, MorphResult) {
	let Value::String(text) = from else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};
	let value = match into {
		Kind::File => {
			if text.is_empty() {
				Value::File(Xxh64::default())
			} else {
				Value::File(Xxh64::from_name(text))
			}
		}
		Kind::Link => {
			if text.is_empty() {
				Value::Link(Fnv1a::default())
			} else {
				Value::Link(Fnv1a::from_name(text))
			}
		}
		_ => {
			if text.is_empty() {
				Value::Hash(Fnv1a::default())
			} else {
				Value::Hash(Fnv1a::from_name(text))
			}
		}
	};
	(value, MorphResult::Ok)
}

fn hash_as_number(value: &Value) -> Value {
	match value {
		Value::Hash(hash) | Value::Link(hash) => Value::U32(hash.hash()),
		Value::File(hash) => Value::U64(hash.hash()),
		_ => Value::None,
	}
}

fn hash_name(value: &Value) -> &str {
	match value {
		Value::Hash(hash) | Value::Link(hash) => hash.name(),
		Value::File(hash) => hash.name(),
		_ => "",
	}
}

fn hash_is_zero(value: &Value) -> bool {
	match value {
		Value::Hash(hash) | Value::Link(hash) => hash.hash() == 0,
		Value::File(hash) => hash.hash() == 0,
		_ => false,
	}
}

fn hash_to_number(from: Value, into: Kind) -> (Value, MorphResult) {
	let (value, exact) = num_to_kind(num_of(&hash_as_number(&from)), into);
	(value, if exact { MorphResult::Ok } else { MorphResult::Lossy })
}

fn hash_to_string(from: Value) -> (Value, MorphResult) {
	if !hash_name(&from).is_empty() {
		let name = match from {
			Value::Hash(hash) | Value::Link(hash) => hash.into_name(),
			Value::File(hash) => hash.into_name(),
			_ => String::new(),
		};
		return (Value::String(name), MorphResult::Ok);
	}
	if hash_is_zero(&from) {
		return (Value::String(String::new()), MorphResult::Ok);
	}
	(Value::String(String::new()), MorphResult::Incomplete)
}

fn hash_to_hash(from: Value, into: Kind) -> (Value, MorphResult) {
	let fnv_sided = matches!(into, Kind::Hash | Kind::Link);
	// Same storage width: carry the identifier across unchanged.
	match (&from, fnv_sided) {
		(Value::Hash(hash) | Value::Link(hash), true) => {
			let value = if into == Kind::Link {
				Value::Link(hash.clone())
			} else {
				Value::Hash(hash.clone())
			};
			return (value, MorphResult::Ok);
		}
		_ => {}
	}

	let name = hash_name(&from);
	if !name.is_empty() {
		let name = name.to_owned();
		let value = match into {
			Kind::File => Value::File(Xxh64::from_name(name)),
			Kind::Link => Value::Link(Fnv1a::from_name(name)),
			_ => Value::Hash(Fnv1a::from_name(name)),
		};
		return (value, MorphResult::Ok);
	}

	let storage_kind = if fnv_sided { Kind::U32 } else { Kind::U64 };
	let (converted, exact) = num_to_kind(num_of(&hash_as_number(&from)), storage_kind);
	let value = match (converted, into) {
		(Value::U64(hash), Kind::File) => Value::File(Xxh64::from_hash(hash)),
		(Value::U32(hash), Kind::Link) => Value::Link(Fnv1a::from_hash(hash)),
		(Value::U32(hash), _) => Value::Hash(Fnv1a::from_hash(hash)),
		_ => Value::from_kind(into),
	};
	(value, if exact { MorphResult::Lossy } else { MorphResult::Incomplete })
}

fn wrap_element(from: Value, into: Kind) -> (Value, MorphResult) {
	let kind = from.kind();
	let value = match into {
		Kind::Option => Value::Option(OptionValue {
			kind,
			item: Some(Box::new(from)),
		}),
		Kind::List2 => Value::List2(ListValue {
			kind,
			items: vec![from],
		}),
		_ => Value::List(ListValue {
			kind,
			items: vec![from],
		}),
	};
	(value, MorphResult::Ok)
}

fn wrap_pair(from: Value, result: MorphResult) -> (Value, MorphResult) {
	let value_kind = from.kind();
	let value = Value::Map(MapValue {
		key_kind: Kind::U32,
		value_kind,
		items: vec![PairValue {
			key: Value::U32(0),
			value: from,
		}],
	});
	(value, result)
}

fn option_take_first(from: Value, into: Kind) -> (Value, MorphResult) {
	let Value::Option(option) = from else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};
	match option.item {
		Some(item) => {
			let (value, result) = morph_move(*item, into);
			if result.is_good() {
				(value, MorphResult::Ok)
			} else {
				(value, result)
			}
		}
		None => (Value::from_kind(into), MorphResult::Incomplete),
	}
}

fn option_to_list(from: Value, into: Kind) -> (Value, MorphResult) {
	let Value::Option(option) = from else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};
	let list = ListValue {
		kind: option.kind,
		items: option.item.into_iter().map(|item| *item).collect(),
	};
	let value = if into == Kind::List2 { Value::List2(list) } else { Value::List(list) };
	(value, MorphResult::Ok)
}

fn option_to_map(from: Value) -> (Value, MorphResult) {
	let Value::Option(option) = from else {
		return (Value::from_kind(Kind::Map), MorphResult::Incomplete);
	};
	let mut map = MapValue {
		key_kind: Kind::U32,
		value_kind: option.kind,
		items: Vec::new(),
	};
	if let Some(item) = option.item {
		map.items.push(PairValue {
			key: Value::U32(0),
			value: *item,
		});
	}
	(Value::Map(map), MorphResult::Ok)
}

fn list_items(from: Value) -> Option<ListValue> {
	match from {
		Value::List(list) | Value::List2(list) => Some(list),
		_ => None,
	}
}

fn list_take_first(from: Value, into: Kind) -> (Value, MorphResult) {
	let Some(mut list) = list_items(from) else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};
	if list.items.is_empty() {
		return (Value::from_kind(into), MorphResult::Incomplete);
	}
	let extra = list.items.len() > 1;
	let first = list.items.swap_remove(0);
	let (value, result) = morph_move(first, into);
	if result.is_good() {
		(value, if extra { MorphResult::Lossy } else { MorphResult::Ok })
	} else {
		(value, result)
	}
}

fn list_to_vector(from: Value, into: Kind) -> (Value, MorphResult) {
	let from_kind = from.kind();
	let Some(list) = list_items(from) else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};

	if list.kind.category() == Category::Number {
		let into_len = vector_len(into);
		let min = into_len.min(list.items.len());
		let mut result = MorphResult::Ok;
		let elem_kind = if into == Kind::Rgba { Kind::U8 } else { Kind::F32 };

		let mut value = Value::from_kind(into);
		for index in 0..min {
			let (converted, exact) = num_to_kind(num_of(&list.items[index]), elem_kind);
			if !exact {
				result = MorphResult::Lossy;
			}
			match (&mut value, converted) {
				(Value::Vec2(out), Value::F32(item)) => out[index] = item,
				(Value::Vec3(out), Value::F32(item)) => out[index] = item,
				(Value::Vec4(out), Value::F32(item)) => out[index] = item,
				(Value::Mtx44(out), Value::F32(item)) => out[index] = item,
				(Value::Rgba(out), Value::U8(item)) => out[index] = item,
				_ => {}
			}
		}

		if min < into_len {
			return (value, MorphResult::Incomplete);
		}
		if min < list.items.len() {
			return (value, MorphResult::Lossy);
		}
		return (value, result);
	}

	// Non-numeric elements: fall back to morphing the first element.
	let wrapped = if from_kind == Kind::List2 { Value::List2(list) } else { Value::List(list) };
	list_take_first(wrapped, into)
}

fn list_to_option(from: Value) -> (Value, MorphResult) {
	let Some(mut list) = list_items(from) else {
		return (Value::from_kind(Kind::Option), MorphResult::Incomplete);
	};
	let extra = list.items.len() > 1;
	let item = if list.items.is_empty() {
		None
	} else {
		Some(Box::new(list.items.swap_remove(0)))
	};
	let value = Value::Option(OptionValue { kind: list.kind, item });
	(value, if extra { MorphResult::Lossy } else { MorphResult::Ok })
}

fn list_to_list(from: Value, into: Kind) -> (Value, MorphResult) {
	let Some(list) = list_items(from) else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};
	let value = if into == Kind::List2 { Value::List2(list) } else { Value::List(list) };
	(value, MorphResult::Ok)
}

fn list_to_map(from: Value) -> (Value, MorphResult) {
	let Some(list) = list_items(from) else {
		return (Value::from_kind(Kind::Map), MorphResult::Incomplete);
	};
	let items = list
		.items
		.into_iter()
		.enumerate()
		.map(|(index, value)| PairValue {
			key: Value::U32(index as u32),
			value,
		})
		.collect();
	let value = Value::Map(MapValue {
		key_kind: Kind::U32,
		value_kind: list.kind,
		items,
	});
	(value, MorphResult::Ok)
}

fn map_to_option(from: Value) -> (Value, MorphResult) {
	let Value::Map(mut map) = from else {
		return (Value::from_kind(Kind::Option), MorphResult::Incomplete);
	};
	let item = if map.items.is_empty() {
		None
	} else {
		Some(Box::new(map.items.swap_remove(0).value))
	};
	let value = Value::Option(OptionValue {
		kind: map.value_kind,
		item,
	});
	(value, MorphResult::Lossy)
}

fn map_to_list(from: Value, into: Kind) -> (Value, MorphResult) {
	let Value::Map(map) = from else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};
	let list = ListValue {
		kind: map.value_kind,
		items: map.items.into_iter().map(|pair| pair.value).collect(),
	};
	let value = if into == Kind::List2 { Value::List2(list) } else { Value::List(list) };
	(value, MorphResult::Lossy)
}

fn map_to_class(from: Value, into: Kind) -> (Value, MorphResult) {
	let Value::Map(map) = from else {
		return (Value::from_kind(into), MorphResult::Incomplete);
	};
	let mut body = StructValue::default();
	for pair in map.items {
		let mut key = pair.key;
		morph_value(&mut key, Kind::Hash);
		let Value::Hash(key) = key else { continue };
		body.items.push(FieldValue {
			key,
			value: pair.value,
		});
	}
	let value = if into == Kind::Pointer { Value::Pointer(body) } else { Value::Embed(body) };
	(value, MorphResult::Incomplete)
}

fn class_to_class(from: Value, into: Kind) -> (Value, MorphResult) {
	let body = match from {
		Value::Embed(body) | Value::Pointer(body) => body,
		_ => return (Value::from_kind(into), MorphResult::Incomplete),
	};
	let value = if into == Kind::Pointer { Value::Pointer(body) } else { Value::Embed(body) };
	(value, MorphResult::Ok)
}

#[cfg(test)]
mod tests {
	use super::{MorphResult, morph_type_key, morph_type_value, morph_value};
	use crate::prop::hash::Fnv1a;
	use crate::prop::value::{Kind, ListValue, MapValue, PairValue, Value};

	#[test]
	fn same_kind_is_unchanged() {
		let mut value = Value::U32(42);
		assert_eq!(morph_value(&mut value, Kind::U32), MorphResult::Unchanged);
		assert_eq!(value, Value::U32(42));
	}

	#[test]
	fn narrowing_numbers_wraps_and_reports_lossy() {
		let mut value = Value::U32(300);
		assert_eq!(morph_value(&mut value, Kind::U8), MorphResult::Lossy);
		assert_eq!(value, Value::U8(44));
	}

	#[test]
	fn widening_numbers_is_exact() {
		let mut value = Value::U8(200);
		assert_eq!(morph_value(&mut value, Kind::U32), MorphResult::Ok);
		assert_eq!(value, Value::U32(200));
	}

	#[test]
	fn float_vector_scales_into_rgba() {
		let mut value = Value::Vec3([0.5, 0.25, 0.0]);
		assert_eq!(morph_value(&mut value, Kind::Rgba), MorphResult::Incomplete);
		assert_eq!(value, Value::Rgba([128, 64, 0, 0]));
	}

	#[test]
	fn number_into_vector_fills_slot_zero() {
		let mut value = Value::U8(3);
		assert_eq!(morph_value(&mut value, Kind::Vec2), MorphResult::Incomplete);
		assert_eq!(value, Value::Vec2([3.0, 0.0]));
	}

	#[test]
	fn string_parses_into_numbers() {
		let mut value = Value::String("37".to_owned());
		assert_eq!(morph_value(&mut value, Kind::U16), MorphResult::Ok);
		assert_eq!(value, Value::U16(37));

		let mut bad = Value::String("pizza".to_owned());
		assert_eq!(morph_value(&mut bad, Kind::U16), MorphResult::Incomplete);
		assert_eq!(bad, Value::U16(0));
	}

	#[test]
	fn hash_with_recovered_string_morphs_to_string() {
		let mut value = Value::Hash(Fnv1a::from_name("hello"));
		assert_eq!(morph_value(&mut value, Kind::String), MorphResult::Ok);
		assert_eq!(value, Value::String("hello".to_owned()));

		let mut zero = Value::Hash(Fnv1a::from_hash(0));
		assert_eq!(morph_value(&mut zero, Kind::String), MorphResult::Ok);
		assert_eq!(zero, Value::String(String::new()));

		let mut raw = Value::Hash(Fnv1a::from_hash(0x1234));
		assert_eq!(morph_value(&mut raw, Kind::String), MorphResult::Incomplete);
	}

	#[test]
	fn scalar_wraps_into_containers() {
		let mut value = Value::U32(7);
		assert_eq!(morph_value(&mut value, Kind::List), MorphResult::Ok);
		let Value::List(list) = &value else { panic!("list expected") };
		assert_eq!(list.kind, Kind::U32);
		assert_eq!(list.items, vec![Value::U32(7)]);

		let mut value = Value::String("x".to_owned());
		assert_eq!(morph_value(&mut value, Kind::Map), MorphResult::Ok);
		let Value::Map(map) = &value else { panic!("map expected") };
		assert_eq!(map.key_kind, Kind::U32);
		assert_eq!(map.items[0].key, Value::U32(0));
	}

	#[test]
	fn long_list_into_scalar_downgrades_to_lossy() {
		let mut value = Value::List(ListValue {
			kind: Kind::U32,
			items: vec![Value::U32(1), Value::U32(2)],
		});
		assert_eq!(morph_value(&mut value, Kind::U32), MorphResult::Lossy);
		assert_eq!(value, Value::U32(1));
	}

	#[test]
	fn empty_containers_into_scalar_are_incomplete() {
		let mut value = Value::List(ListValue {
			kind: Kind::U32,
			items: Vec::new(),
		});
		assert_eq!(morph_value(&mut value, Kind::U32), MorphResult::Incomplete);
	}

	#[test]
	fn anything_into_none_is_lossy() {
		let mut value = Value::U32(1);
		assert_eq!(morph_value(&mut value, Kind::None), MorphResult::Lossy);
		assert_eq!(value, Value::None);
	}

	#[test]
	fn numeric_list_fills_a_vector() {
		let mut value = Value::List(ListValue {
			kind: Kind::U8,
			items: vec![Value::U8(1), Value::U8(2), Value::U8(3), Value::U8(4)],
		});
		assert_eq!(morph_value(&mut value, Kind::Rgba), MorphResult::Ok);
		assert_eq!(value, Value::Rgba([1, 2, 3, 4]));
	}

	#[test]
	fn embed_and_pointer_interconvert() {
		let mut value = Value::Embed(crate::prop::value::StructValue {
			name: Fnv1a::from_name("Data"),
			items: Vec::new(),
		});
		assert_eq!(morph_value(&mut value, Kind::Pointer), MorphResult::Ok);
		let Value::Pointer(body) = &value else { panic!("pointer expected") };
		assert_eq!(body.name.name(), "Data");
	}

	#[test]
	fn retyping_list_elements_folds_the_worst_result() {
		let mut value = Value::List(ListValue {
			kind: Kind::U32,
			items: vec![Value::U32(1), Value::U32(300)],
		});
		assert_eq!(morph_type_value(&mut value, Kind::U8), MorphResult::Lossy);
		let Value::List(list) = &value else { panic!("list expected") };
		assert_eq!(list.kind, Kind::U8);
		assert_eq!(list.items, vec![Value::U8(1), Value::U8(44)]);
	}

	#[test]
	fn retyping_to_a_container_fails() {
		let mut value = Value::List(ListValue {
			kind: Kind::U32,
			items: Vec::new(),
		});
		assert_eq!(morph_type_value(&mut value, Kind::Map), MorphResult::Fail);
	}

	#[test]
	fn retyping_map_keys_requires_a_primitive() {
		let mut value = Value::Map(MapValue {
			key_kind: Kind::U32,
			value_kind: Kind::String,
			items: vec![PairValue {
				key: Value::U32(5),
				value: Value::String("five".to_owned()),
			}],
		});
		assert_eq!(morph_type_key(&mut value, Kind::List), MorphResult::Fail);
		assert_eq!(morph_type_key(&mut value, Kind::Hash), MorphResult::Ok);
		let Value::Map(map) = &value else { panic!("map expected") };
		assert_eq!(map.key_kind, Kind::Hash);
	}
}
