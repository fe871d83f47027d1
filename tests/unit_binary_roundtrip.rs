use propbin::prop::{
	Bin, FieldValue, Fnv1a, Kind, ListValue, MapValue, OptionValue, PairValue, StructValue, Value, Xxh64, read_binary,
	type_map, write_binary,
};

fn latest() -> &'static dyn propbin::prop::TypeMap {
	type_map("bin").expect("latest map registered")
}

fn legacy1() -> &'static dyn propbin::prop::TypeMap {
	type_map("bin-legacy1").expect("legacy map registered")
}

#[test]
fn empty_prop_v1_round_trips_byte_for_byte() {
	let data: &[u8] = b"PROP\x01\x00\x00\x00\x00\x00\x00\x00";
	let bin = read_binary(data, latest()).expect("minimal file parses");

	assert_eq!(bin.section("type"), Some(&Value::String("PROP".to_owned())));
	assert_eq!(bin.section("version"), Some(&Value::U32(1)));
	let Some(Value::Map(entries)) = bin.section("entries") else {
		panic!("entries should be a map");
	};
	assert_eq!((entries.key_kind, entries.value_kind), (Kind::Hash, Kind::Embed));
	assert!(entries.items.is_empty());

	let out = write_binary(&bin, latest()).expect("tree serializes");
	assert_eq!(out, data);
}

#[test]
fn prop_v2_reads_linked_strings() {
	let data: &[u8] = b"PROP\x02\x00\x00\x00\x01\x00\x00\x00\x03\x00abc\x00\x00\x00\x00";
	let bin = read_binary(data, latest()).expect("v2 file parses");

	let Some(Value::List(linked)) = bin.section("linked") else {
		panic!("linked should be a list");
	};
	assert_eq!(linked.kind, Kind::String);
	assert_eq!(linked.items, vec![Value::String("abc".to_owned())]);

	let out = write_binary(&bin, latest()).expect("tree serializes");
	assert_eq!(out, data);
}

fn rich_entry() -> StructValue {
	StructValue {
		name: Fnv1a::from_name("SkinCharacterDataProperties"),
		items: vec![
			FieldValue {
				key: Fnv1a::from_name("flags"),
				value: Value::U32(0xFFEE_DDCC),
			},
			FieldValue {
				key: Fnv1a::from_name("scale"),
				value: Value::Vec3([1.0, 2.5, -3.0]),
			},
			FieldValue {
				key: Fnv1a::from_name("tint"),
				value: Value::Rgba([255, 128, 0, 7]),
			},
			FieldValue {
				key: Fnv1a::from_name("name"),
				value: Value::String("garen".to_owned()),
			},
			FieldValue {
				key: Fnv1a::from_name("icon"),
				value: Value::File(Xxh64::from_name("assets/icon.dds")),
			},
			FieldValue {
				key: Fnv1a::from_name("other"),
				value: Value::Link(Fnv1a::from_hash(0x1234_5678)),
			},
			FieldValue {
				key: Fnv1a::from_name("tags"),
				value: Value::List(ListValue {
					kind: Kind::U8,
					items: vec![Value::U8(1), Value::U8(2)],
				}),
			},
			FieldValue {
				key: Fnv1a::from_name("maybe"),
				value: Value::Option(OptionValue {
					kind: Kind::F32,
					item: Some(Box::new(Value::F32(0.25))),
				}),
			},
			FieldValue {
				key: Fnv1a::from_name("lookup"),
				value: Value::Map(MapValue {
					key_kind: Kind::U32,
					value_kind: Kind::String,
					items: vec![PairValue {
						key: Value::U32(9),
						value: Value::String("nine".to_owned()),
					}],
				}),
			},
			FieldValue {
				key: Fnv1a::from_name("child"),
				value: Value::Embed(StructValue {
					name: Fnv1a::from_name("Inner"),
					items: vec![FieldValue {
						key: Fnv1a::from_name("flag"),
						value: Value::Flag(true),
					}],
				}),
			},
			FieldValue {
				key: Fnv1a::from_name("maybeChild"),
				value: Value::Pointer(StructValue::default()),
			},
		],
	}
}

fn rich_bin(file_type: &str, version: u32) -> Bin {
	let mut bin = Bin::new();
	bin.set_section("type", Value::String(file_type.to_owned()));
	bin.set_section("version", Value::U32(version));
	if version >= 2 {
		bin.set_section(
			"linked",
			Value::List(ListValue {
				kind: Kind::String,
				items: vec![Value::String("DATA/other.bin".to_owned())],
			}),
		);
	}
	bin.set_section(
		"entries",
		Value::Map(MapValue {
			key_kind: Kind::Hash,
			value_kind: Kind::Embed,
			items: vec![PairValue {
				key: Value::Hash(Fnv1a::from_name("Characters/Garen")),
				value: Value::Embed(rich_entry()),
			}],
		}),
	);
	bin
}

#[test]
fn nested_tree_survives_a_write_read_cycle() {
	let bin = rich_bin("PROP", 3);
	let bytes = write_binary(&bin, latest()).expect("tree serializes");
	let parsed = read_binary(&bytes, latest()).expect("own output parses");
	assert_eq!(parsed, bin);

	// Size prefixes are consistent: a second write is byte-identical.
	let again = write_binary(&parsed, latest()).expect("reparsed tree serializes");
	assert_eq!(again, bytes);
}

#[test]
fn ptch_v3_round_trips_with_patches() {
	let mut bin = rich_bin("PTCH", 3);
	bin.set_section(
		"patches",
		Value::Map(MapValue {
			key_kind: Kind::Hash,
			value_kind: Kind::Embed,
			items: vec![PairValue {
				key: Value::Hash(Fnv1a::from_hash(0xAABB_CCDD)),
				value: Value::Embed(StructValue {
					name: Fnv1a::from_name("patch"),
					items: vec![
						FieldValue {
							key: Fnv1a::from_name("path"),
							value: Value::String("characters/garen/health".to_owned()),
						},
						FieldValue {
							key: Fnv1a::from_name("value"),
							value: Value::F32(620.0),
						},
					],
				}),
			}],
		}),
	);

	let bytes = write_binary(&bin, latest()).expect("patch tree serializes");
	assert_eq!(&bytes[..4], b"PTCH");
	let parsed = read_binary(&bytes, latest()).expect("own output parses");
	assert_eq!(parsed, bin);

	let again = write_binary(&parsed, latest()).expect("reparsed tree serializes");
	assert_eq!(again, bytes);
}

#[test]
fn legacy1_reads_dense_complex_tags() {
	// One entry whose single field is a dense-tagged list (raw 18) of u32.
	let mut data: Vec<u8> = Vec::new();
	data.extend_from_slice(b"PROP");
	data.extend_from_slice(&1_u32.to_le_bytes());
	data.extend_from_slice(&1_u32.to_le_bytes()); // entry count
	data.extend_from_slice(&0x1111_1111_u32.to_le_bytes()); // entry type hash

	let mut entry: Vec<u8> = Vec::new();
	entry.extend_from_slice(&0x2222_2222_u32.to_le_bytes()); // entry key
	entry.extend_from_slice(&1_u16.to_le_bytes()); // field count
	entry.extend_from_slice(&0x3333_3333_u32.to_le_bytes()); // field name
	entry.push(18); // dense `list`
	entry.push(7); // element kind u32
	let body = 4_u32 + 4; // count + one u32
	entry.extend_from_slice(&body.to_le_bytes());
	entry.extend_from_slice(&1_u32.to_le_bytes()); // element count
	entry.extend_from_slice(&42_u32.to_le_bytes());

	data.extend_from_slice(&(entry.len() as u32).to_le_bytes());
	data.extend_from_slice(&entry);

	let bin = read_binary(&data, legacy1()).expect("legacy buffer parses");
	let Some(Value::Map(entries)) = bin.section("entries") else {
		panic!("entries should be a map");
	};
	let Value::Embed(embed) = &entries.items[0].value else {
		panic!("entry should be an embed");
	};
	let Value::List(list) = &embed.items[0].value else {
		panic!("field should be a list");
	};
	assert_eq!(list.kind, Kind::U32);
	assert_eq!(list.items, vec![Value::U32(42)]);

	// The same buffer is rejected by the latest mapping: raw 18 is `file`
	// and the payload does not line up.
	assert!(read_binary(&data, latest()).is_err());
}

#[test]
fn ptch_v1_reads_an_empty_patch_table() {
	// Prelude + PROP v1 + no entries + zero patches.
	let mut data: Vec<u8> = Vec::new();
	data.extend_from_slice(b"PTCH");
	data.extend_from_slice(&1_u32.to_le_bytes());
	data.extend_from_slice(&0_u32.to_le_bytes());
	data.extend_from_slice(b"PROP");
	data.extend_from_slice(&1_u32.to_le_bytes());
	data.extend_from_slice(&0_u32.to_le_bytes());
	data.extend_from_slice(&0_u32.to_le_bytes());

	let bin = read_binary(&data, latest()).expect("patch prelude parses");
	assert_eq!(bin.section("type"), Some(&Value::String("PTCH".to_owned())));
	let Some(Value::Map(patches)) = bin.section("patches") else {
		panic!("patches should be present for PTCH input");
	};
	assert!(patches.items.is_empty());
}
