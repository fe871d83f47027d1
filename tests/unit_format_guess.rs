use propbin::prop::{Bin, FieldValue, Fnv1a, Kind, MapValue, PairValue, StructValue, Value, format, formats, guess_format};

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
				key: Value::Hash(Fnv1a::from_hash(0x600D_F00D)),
				value: Value::Embed(StructValue {
					name: Fnv1a::from_hash(0x7E57_7E57),
					items: vec![FieldValue {
						key: Fnv1a::from_hash(0x0001_0001),
						value: Value::I64(-12),
					}],
				}),
			}],
		}),
	);
	bin
}

#[test]
fn guessing_prefers_content_over_name() {
	// A `.txt` name with binary magic still guesses text first: the
	// registry walks in declaration order and text matches the suffix.
	assert_eq!(guess_format(b"PROP", "x.txt").map(|f| f.name()), Some("text"));
	assert_eq!(guess_format(b"PROP", "x.weird").map(|f| f.name()), Some("bin"));
}

#[test]
fn every_format_parses_what_it_writes() {
	let bin = sample_bin();
	for name in ["bin", "bin-legacy1", "text", "json"] {
		let fmt = format(name).expect("format registered");
		let data = fmt.write(&bin).expect("tree serializes");
		let parsed = fmt.read(&data).expect("own output parses");
		assert_eq!(parsed, bin, "format {name}");
	}
}

#[test]
fn cross_format_pipeline_preserves_the_tree() {
	let bin = sample_bin();

	let binary = format("bin").expect("bin registered");
	let text = format("text").expect("text registered");
	let json = format("json").expect("json registered");

	let bin_bytes = binary.write(&bin).expect("binary serializes");
	let guessed = guess_format(&bin_bytes, "champion.unknown").expect("binary content guesses");
	assert_eq!(guessed.name(), "bin");

	let tree = guessed.read(&bin_bytes).expect("binary parses");
	let text_bytes = text.write(&tree).expect("text serializes");
	let guessed_text = guess_format(&text_bytes, "-").expect("text header guesses");
	assert_eq!(guessed_text.name(), "text");

	let tree = guessed_text.read(&text_bytes).expect("text parses");
	let json_bytes = json.write(&tree).expect("json serializes");
	let guessed_json = guess_format(&json_bytes, "-").expect("json brace guesses");
	assert_eq!(guessed_json.name(), "json");

	let tree = guessed_json.read(&json_bytes).expect("json parses");
	let final_bytes = binary.write(&tree).expect("binary serializes again");
	assert_eq!(final_bytes, bin_bytes, "pipeline is byte-stable");
}

#[test]
fn binary_formats_skip_the_unhasher() {
	for format in formats() {
		let always_hashed = format.name().starts_with("bin");
		assert_eq!(format.output_always_hashed(), always_hashed, "format {}", format.name());
	}
}
