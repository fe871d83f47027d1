use propbin::prop::{
	Bin, FieldValue, Fnv1a, Kind, ListValue, MapValue, OptionValue, PairValue, StructValue, Value, Xxh64, read_json,
	write_json, write_json_info,
};

fn rich_bin() -> Bin {
	let mut bin = Bin::new();
	bin.set_section("type", Value::String("PROP".to_owned()));
	bin.set_section("version", Value::U32(2));
	bin.set_section(
		"linked",
		Value::List(ListValue {
			kind: Kind::String,
			items: vec![Value::String("DATA/base.bin".to_owned())],
		}),
	);
	bin.set_section(
		"entries",
		Value::Map(MapValue {
			key_kind: Kind::Hash,
			value_kind: Kind::Embed,
			items: vec![PairValue {
				key: Value::Hash(Fnv1a::from_hash(0xDDCC_BBAA)),
				value: Value::Embed(StructValue {
					name: Fnv1a::from_name("MapSkin"),
					items: vec![
						FieldValue {
							key: Fnv1a::from_name("visible"),
							value: Value::Bool(true),
						},
						FieldValue {
							key: Fnv1a::from_name("weight"),
							value: Value::F32(-0.25),
						},
						FieldValue {
							key: Fnv1a::from_name("bounds"),
							value: Value::Vec4([0.0, 1.0, 2.0, 3.0]),
						},
						FieldValue {
							key: Fnv1a::from_name("texture"),
							value: Value::File(Xxh64::from_hash(0xFFEE_DDCC_BBAA_0099)),
						},
						FieldValue {
							key: Fnv1a::from_name("children"),
							value: Value::Option(OptionValue {
								kind: Kind::Pointer,
								item: Some(Box::new(Value::Pointer(StructValue {
									name: Fnv1a::from_name("MapChild"),
									items: Vec::new(),
								}))),
							}),
						},
						FieldValue {
							key: Fnv1a::from_name("weights"),
							value: Value::Map(MapValue {
								key_kind: Kind::Hash,
								value_kind: Kind::F32,
								items: vec![PairValue {
									key: Value::Hash(Fnv1a::from_name("limb")),
									value: Value::F32(0.5),
								}],
							}),
						},
					],
				}),
			}],
		}),
	);
	bin
}

#[test]
fn lossless_json_round_trips() {
	let bin = rich_bin();
	let json = write_json(&bin).expect("tree serializes");
	let parsed = read_json(&json).expect("own output parses");
	assert_eq!(parsed, bin);
}

#[test]
fn lossless_shape_carries_type_metadata() {
	let json = write_json(&rich_bin()).expect("tree serializes");
	let doc: serde_json::Value = serde_json::from_slice(&json).expect("output is json");

	let entries = &doc["entries"];
	assert_eq!(entries["type"], "map");
	assert_eq!(entries["value"]["keyType"], "hash");
	assert_eq!(entries["value"]["valueType"], "embed");

	let entry = &entries["value"]["items"][0];
	assert_eq!(entry["key"], 0xDDCC_BBAA_u32);
	assert_eq!(entry["value"]["name"], "MapSkin");
	let field = &entry["value"]["items"][0];
	assert_eq!(field["key"], "visible");
	assert_eq!(field["type"], "bool");
	assert_eq!(field["value"], true);
}

#[test]
fn section_order_is_preserved() {
	let json = write_json(&rich_bin()).expect("tree serializes");
	let text = String::from_utf8(json).expect("output is utf-8");
	let type_at = text.find("\"type\": \"string\"").expect("type section present");
	let version_at = text.find("\"version\"").expect("version section present");
	let entries_at = text.find("\"entries\"").expect("entries section present");
	assert!(type_at < version_at && version_at < entries_at, "sections in order: {text}");
}

#[test]
fn info_shape_is_flat_and_write_only() {
	let json = write_json_info(&rich_bin()).expect("info serializes");
	let doc: serde_json::Value = serde_json::from_slice(&json).expect("output is json");

	let entry = &doc["entries"]["0xddccbbaa"];
	assert_eq!(entry["~class"], "MapSkin");
	assert_eq!(entry["visible"], true);
	assert_eq!(entry["weights"]["limb"], 0.5);
	// Unresolved file hash renders as unpadded hex text.
	assert_eq!(entry["texture"], "0xffeeddccbbaa0099");

	assert!(read_json(&json).is_err(), "info output lacks type metadata");
}

#[test]
fn numeric_and_string_hash_spellings_both_parse() {
	let with_number = br#"{"entry": {"type": "hash", "value": 3735928559}}"#;
	let with_string = br#"{"entry": {"type": "hash", "value": "hello"}}"#;

	let numeric = read_json(with_number).expect("numeric hash parses");
	assert_eq!(numeric.section("entry"), Some(&Value::Hash(Fnv1a::from_hash(0xDEAD_BEEF))));

	let named = read_json(with_string).expect("string hash parses");
	let Some(Value::Hash(hash)) = named.section("entry") else {
		panic!("hash section expected");
	};
	assert_eq!(hash.name(), "hello");
	assert_eq!(hash.hash(), Fnv1a::from_name("hello").hash());
}
