use serde_json::{Map as JsonMap, Value as Json, json};

use crate::prop::hash::{Fnv1a, Xxh64};
use crate::prop::value::{Bin, FieldValue, Kind, ListValue, MapValue, OptionValue, PairValue, StructValue, Value};
use crate::prop::{BinError, Result};

/// Parse the lossless JSON projection back into a section tree.
pub fn read_json(data: &[u8]) -> Result<Bin> {
	let json: Json = serde_json::from_slice(data).map_err(|err| BinError::JsonParse {
		message: err.to_string(),
	})?;
	let Json::Object(sections) = &json else {
		return Err(shape("bin", "object"));
	};

	let mut bin = Bin::new();
	for (name, item) in sections {
		let value = typed_from_json(item).map_err(|err| err.at_json_path(&format!("bin['{name}']")))?;
		bin.sections.push((name.clone(), value));
	}
	Ok(bin)
}

/// Render the lossless JSON projection; every container carries its type
/// metadata so the result parses back to an identical tree.
pub fn write_json(bin: &Bin) -> Result<Vec<u8>> {
	let mut sections = JsonMap::new();
	for (name, value) in &bin.sections {
		sections.insert(
			name.clone(),
			json!({
				"type": value.type_name(),
				"value": value_to_json(value),
			}),
		);
	}
	serde_json::to_vec_pretty(&Json::Object(sections)).map_err(|err| BinError::JsonParse {
		message: err.to_string(),
	})
}

/// Render the lossy inspection projection; structs flatten to objects and
/// type metadata is dropped, so the result is not meant to be parsed back.
pub fn write_json_info(bin: &Bin) -> Result<Vec<u8>> {
	let mut sections = JsonMap::new();
	for (name, value) in &bin.sections {
		sections.insert(name.clone(), value_to_json_info(value));
	}
	serde_json::to_vec_pretty(&Json::Object(sections)).map_err(|err| BinError::JsonParse {
		message: err.to_string(),
	})
}

fn shape(type_name: &'static str, expected: &'static str) -> BinError {
	BinError::JsonShape {
		type_name,
		expected,
		path: String::new(),
	}
}

fn fnv_to_json(value: &Fnv1a) -> Json {
	if value.name().is_empty() {
		json!(value.hash())
	} else {
		json!(value.name())
	}
}

fn xxh_to_json(value: &Xxh64) -> Json {
	if value.name().is_empty() {
		json!(value.hash())
	} else {
		json!(value.name())
	}
}

fn fnv_to_json_info(value: &Fnv1a) -> Json {
	if value.name().is_empty() {
		json!(format!("0x{:x}", value.hash()))
	} else {
		json!(value.name())
	}
}

fn xxh_to_json_info(value: &Xxh64) -> Json {
	if value.name().is_empty() {
		json!(format!("0x{:x}", value.hash()))
	} else {
		json!(value.name())
	}
}

fn fnv_from_json(json: &Json) -> Option<Fnv1a> {
	match json {
		Json::Number(number) => number.as_u64().map(|hash| Fnv1a::from_hash(hash as u32)),
		Json::String(name) => Some(Fnv1a::from_name(name.clone())),
		_ => None,
	}
}

fn xxh_from_json(json: &Json) -> Option<Xxh64> {
	match json {
		Json::Number(number) => number.as_u64().map(Xxh64::from_hash),
		Json::String(name) => Some(Xxh64::from_name(name.clone())),
		_ => None,
	}
}

fn value_to_json(value: &Value) -> Json {
	match value {
		Value::None => Json::Null,
		Value::Bool(value) | Value::Flag(value) => json!(value),
		Value::I8(value) => json!(value),
		Value::U8(value) => json!(value),
		Value::I16(value) => json!(value),
		Value::U16(value) => json!(value),
		Value::I32(value) => json!(value),
		Value::U32(value) => json!(value),
		Value::I64(value) => json!(value),
		Value::U64(value) => json!(value),
		Value::F32(value) => json!(value),
		Value::Vec2(value) => json!(value.to_vec()),
		Value::Vec3(value) => json!(value.to_vec()),
		Value::Vec4(value) => json!(value.to_vec()),
		Value::Mtx44(value) => json!(value.to_vec()),
		Value::Rgba(value) => json!(value.to_vec()),
		Value::String(value) => json!(value),
		Value::Hash(value) | Value::Link(value) => fnv_to_json(value),
		Value::File(value) => xxh_to_json(value),
		Value::Option(option) => {
			let items: Vec<Json> = option.item.iter().map(|item| value_to_json(item)).collect();
			json!({ "valueType": option.kind.name(), "items": items })
		}
		Value::List(list) | Value::List2(list) => {
			let items: Vec<Json> = list.items.iter().map(value_to_json).collect();
			json!({ "valueType": list.kind.name(), "items": items })
		}
		Value::Map(map) => {
			let items: Vec<Json> = map
				.items
				.iter()
				.map(|pair| json!({ "key": value_to_json(&pair.key), "value": value_to_json(&pair.value) }))
				.collect();
			json!({
				"keyType": map.key_kind.name(),
				"valueType": map.value_kind.name(),
				"items": items,
			})
		}
		Value::Embed(body) | Value::Pointer(body) => {
			let items: Vec<Json> = body
				.items
				.iter()
				.map(|field| {
					json!({
						"key": fnv_to_json(&field.key),
						"type": field.value.type_name(),
						"value": value_to_json(&field.value),
					})
				})
				.collect();
			json!({ "name": fnv_to_json(&body.name), "items": items })
		}
	}
}

fn value_to_json_info(value: &Value) -> Json {
	match value {
		Value::Hash(value) | Value::Link(value) => fnv_to_json_info(value),
		Value::File(value) => xxh_to_json_info(value),
		Value::Option(option) => match &option.item {
			None => Json::Null,
			Some(item) => value_to_json(item),
		},
		Value::List(list) | Value::List2(list) => {
			Json::Array(list.items.iter().map(value_to_json_info).collect())
		}
		Value::Map(map) => {
			let mut out = JsonMap::new();
			for pair in &map.items {
				let key_json = value_to_json_info(&pair.key);
				let key = match key_json {
					Json::String(key) => key,
					other => other.to_string(),
				};
				out.insert(key, value_to_json_info(&pair.value));
			}
			Json::Object(out)
		}
		Value::Embed(body) | Value::Pointer(body) => {
			let mut out = JsonMap::new();
			out.insert("~class".to_owned(), fnv_to_json_info(&body.name));
			for field in &body.items {
				let key_json = fnv_to_json_info(&field.key);
				let key = match key_json {
					Json::String(key) => key,
					other => other.to_string(),
				};
				out.insert(key, value_to_json_info(&field.value));
			}
			Json::Object(out)
		}
		value => value_to_json(value),
	}
}

fn typed_from_json(json: &Json) -> Result<Value> {
	let Json::Object(object) = json else {
		return Err(shape("value", "object"));
	};
	let Some(Json::String(type_name)) = object.get("type") else {
		return Err(shape("value", "string type field"));
	};
	let kind = Kind::from_name(type_name).ok_or_else(|| shape("value", "known type name"))?;
	let mut value = Value::from_kind(kind);
	let json_value = object.get("value").ok_or_else(|| shape("value", "value field"))?;
	value_from_json(&mut value, json_value).map_err(|err| err.at_json_path("['value']"))?;
	Ok(value)
}

fn field_from_json(json: &Json) -> Result<FieldValue> {
	let Json::Object(object) = json else {
		return Err(shape("field", "object"));
	};
	let key_json = object.get("key").ok_or_else(|| shape("field", "key field"))?;
	let key = fnv_from_json(key_json).ok_or_else(|| shape("field", "hash or string key"))?;
	let value = typed_from_json(json)?;
	Ok(FieldValue { key, value })
}

fn value_from_json(value: &mut Value, json: &Json) -> Result<()> {
	match value {
		Value::None => {
			if !json.is_null() {
				return Err(shape("none", "null"));
			}
			Ok(())
		}
		Value::Bool(out) | Value::Flag(out) => {
			*out = json.as_bool().ok_or_else(|| shape("bool", "boolean"))?;
			Ok(())
		}
		Value::I8(out) => {
			*out = json.as_i64().ok_or_else(|| shape("i8", "number"))? as i8;
			Ok(())
		}
		Value::U8(out) => {
			*out = json.as_u64().ok_or_else(|| shape("u8", "number"))? as u8;
			Ok(())
		}
		Value::I16(out) => {
			*out = json.as_i64().ok_or_else(|| shape("i16", "number"))? as i16;
			Ok(())
		}
		Value::U16(out) => {
			*out = json.as_u64().ok_or_else(|| shape("u16", "number"))? as u16;
			Ok(())
		}
		Value::I32(out) => {
			*out = json.as_i64().ok_or_else(|| shape("i32", "number"))? as i32;
			Ok(())
		}
		Value::U32(out) => {
			*out = json.as_u64().ok_or_else(|| shape("u32", "number"))? as u32;
			Ok(())
		}
		Value::I64(out) => {
			*out = json.as_i64().ok_or_else(|| shape("i64", "number"))?;
			Ok(())
		}
		Value::U64(out) => {
			*out = json.as_u64().ok_or_else(|| shape("u64", "number"))?;
			Ok(())
		}
		Value::F32(out) => {
			*out = json.as_f64().ok_or_else(|| shape("f32", "number"))? as f32;
			Ok(())
		}
		Value::Vec2(out) => float_array_from_json("vec2", out, json),
		Value::Vec3(out) => float_array_from_json("vec3", out, json),
		Value::Vec4(out) => float_array_from_json("vec4", out, json),
		Value::Mtx44(out) => float_array_from_json("mtx44", out, json),
		Value::Rgba(out) => {
			let Json::Array(items) = json else {
				return Err(shape("rgba", "array"));
			};
			if items.len() > out.len() {
				return Err(shape("rgba", "array of at most 4 numbers"));
			}
			for (slot, item) in out.iter_mut().zip(items) {
				*slot = item.as_u64().ok_or_else(|| shape("rgba", "number"))? as u8;
			}
			Ok(())
		}
		Value::String(out) => {
			*out = json.as_str().ok_or_else(|| shape("string", "string"))?.to_owned();
			Ok(())
		}
		Value::Hash(out) => {
			*out = fnv_from_json(json).ok_or_else(|| shape("hash", "hash or string"))?;
			Ok(())
		}
		Value::Link(out) => {
			*out = fnv_from_json(json).ok_or_else(|| shape("link", "hash or string"))?;
			Ok(())
		}
		Value::File(out) => {
			*out = xxh_from_json(json).ok_or_else(|| shape("file", "hash or string"))?;
			Ok(())
		}
		Value::Option(option) => option_from_json(option, json),
		Value::List(list) | Value::List2(list) => list_from_json(list, json),
		Value::Map(map) => map_from_json(map, json),
		Value::Embed(body) | Value::Pointer(body) => class_from_json(body, json),
	}
}

fn float_array_from_json(type_name: &'static str, out: &mut [f32], json: &Json) -> Result<()> {
	let Json::Array(items) = json else {
		return Err(shape(type_name, "array"));
	};
	if items.len() > out.len() {
		return Err(shape(type_name, "array within arity"));
	}
	for (slot, item) in out.iter_mut().zip(items) {
		*slot = item.as_f64().ok_or_else(|| shape(type_name, "number"))? as f32;
	}
	Ok(())
}

fn container_header<'a>(type_name: &'static str, json: &'a Json) -> Result<(Kind, &'a Vec<Json>)> {
	let Json::Object(object) = json else {
		return Err(shape(type_name, "object"));
	};
	let Some(Json::String(kind_name)) = object.get("valueType") else {
		return Err(shape(type_name, "string valueType field"));
	};
	let kind = Kind::from_name(kind_name).ok_or_else(|| shape(type_name, "known valueType"))?;
	let Some(Json::Array(items)) = object.get("items") else {
		return Err(shape(type_name, "items array"));
	};
	Ok((kind, items))
}

fn option_from_json(option: &mut OptionValue, json: &Json) -> Result<()> {
	let (kind, items) = container_header("option", json)?;
	option.kind = kind;
	if let Some(first) = items.first() {
		let mut item = Value::from_kind(kind);
		value_from_json(&mut item, first).map_err(|err| err.at_json_path("['items'][0]"))?;
		option.item = Some(Box::new(item));
	}
	Ok(())
}

fn list_from_json(list: &mut ListValue, json: &Json) -> Result<()> {
	let (kind, items) = container_header("list", json)?;
	list.kind = kind;
	for (index, json_item) in items.iter().enumerate() {
		let mut item = Value::from_kind(kind);
		value_from_json(&mut item, json_item).map_err(|err| err.at_json_path(&format!("['items'][{index}]")))?;
		list.items.push(item);
	}
	Ok(())
}

fn map_from_json(map: &mut MapValue, json: &Json) -> Result<()> {
	let Json::Object(object) = json else {
		return Err(shape("map", "object"));
	};
	let Some(Json::String(key_name)) = object.get("keyType") else {
		return Err(shape("map", "string keyType field"));
	};
	let Some(Json::String(value_name)) = object.get("valueType") else {
		return Err(shape("map", "string valueType field"));
	};
	map.key_kind = Kind::from_name(key_name).ok_or_else(|| shape("map", "known keyType"))?;
	map.value_kind = Kind::from_name(value_name).ok_or_else(|| shape("map", "known valueType"))?;
	let Some(Json::Array(items)) = object.get("items") else {
		return Err(shape("map", "items array"));
	};

	for (index, json_item) in items.iter().enumerate() {
		let pair = pair_from_json(map.key_kind, map.value_kind, json_item)
			.map_err(|err| err.at_json_path(&format!("['items'][{index}]")))?;
		map.items.push(pair);
	}
	Ok(())
}

fn pair_from_json(key_kind: Kind, value_kind: Kind, json: &Json) -> Result<PairValue> {
	let Json::Object(object) = json else {
		return Err(shape("pair", "object"));
	};
	let key_json = object.get("key").ok_or_else(|| shape("pair", "key field"))?;
	let value_json = object.get("value").ok_or_else(|| shape("pair", "value field"))?;

	let mut key = Value::from_kind(key_kind);
	value_from_json(&mut key, key_json).map_err(|err| err.at_json_path("['key']"))?;
	let mut value = Value::from_kind(value_kind);
	value_from_json(&mut value, value_json).map_err(|err| err.at_json_path("['value']"))?;
	Ok(PairValue { key, value })
}

fn class_from_json(body: &mut StructValue, json: &Json) -> Result<()> {
	let Json::Object(object) = json else {
		return Err(shape("embed", "object"));
	};
	let name_json = object.get("name").ok_or_else(|| shape("embed", "name field"))?;
	body.name = fnv_from_json(name_json).ok_or_else(|| shape("embed", "hash or string name"))?;
	let Some(Json::Array(items)) = object.get("items") else {
		return Err(shape("embed", "items array"));
	};
	for (index, json_item) in items.iter().enumerate() {
		let field = field_from_json(json_item).map_err(|err| err.at_json_path(&format!("['items'][{index}]")))?;
		body.items.push(field);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{read_json, write_json, write_json_info};
	use crate::prop::hash::Fnv1a;
	use crate::prop::value::{Bin, FieldValue, Kind, MapValue, PairValue, StructValue, Value};
	use crate::prop::BinError;

	fn sample_bin() -> Bin {
		let mut bin = Bin::new();
		bin.set_section("type", Value::String("PROP".to_owned()));
		bin.set_section("version", Value::U32(1));
		bin.set_section(
			"entries",
			Value::Map(MapValue {
				key_kind: Kind::Hash,
				value_kind: Kind::Embed,
				items: vec![PairValue {
					key: Value::Hash(Fnv1a::from_name("entryKey")),
					value: Value::Embed(StructValue {
						name: Fnv1a::from_name("EntryType"),
						items: vec![FieldValue {
							key: Fnv1a::from_name("field"),
							value: Value::F32(0.5),
						}],
					}),
				}],
			}),
		);
		bin
	}

	#[test]
	fn lossless_projection_round_trips() {
		let bin = sample_bin();
		let json = write_json(&bin).expect("tree serializes");
		let parsed = read_json(&json).expect("own output parses");
		assert_eq!(parsed, bin);
	}

	#[test]
	fn unresolved_hashes_serialize_as_numbers() {
		let mut bin = Bin::new();
		bin.set_section("entry", Value::Hash(Fnv1a::from_hash(0xDEAD_BEEF)));
		let json = write_json(&bin).expect("tree serializes");
		let text = String::from_utf8(json).expect("json is utf-8");
		assert!(text.contains("3735928559"), "raw hash as number: {text}");
		let parsed = read_json(text.as_bytes()).expect("numeric hash parses");
		assert_eq!(parsed, bin);
	}

	#[test]
	fn info_projection_flattens_structs() {
		let json = write_json_info(&sample_bin()).expect("info serializes");
		let text = String::from_utf8(json).expect("json is utf-8");
		assert!(text.contains("~class"), "struct marker present: {text}");
		assert!(text.contains("\"EntryType\""), "class name kept: {text}");
		assert!(!text.contains("valueType"), "type metadata dropped: {text}");
	}

	#[test]
	fn shape_errors_carry_a_path() {
		let data = br#"{"entries": {"type": "map", "value": 3}}"#;
		let err = read_json(data).expect_err("non-object map should fail");
		let BinError::JsonShape { path, .. } = &err else {
			panic!("shape error expected, got {err:?}");
		};
		assert_eq!(path, "bin['entries']['value']");
	}
}
