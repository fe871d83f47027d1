use std::io::Write;

use propbin::prop::{Bin, BinUnhasher, FieldValue, Fnv1a, Kind, ListValue, MapValue, PairValue, StructValue, Value, Xxh64};

fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
	let path = dir.join(name);
	let mut file = std::fs::File::create(&path).expect("dictionary file creates");
	file.write_all(contents.as_bytes()).expect("dictionary file writes");
	path
}

#[test]
fn dictionary_attaches_strings_without_rehashing() {
	let dir = tempfile::tempdir().expect("temp dir");
	let path = write_file(dir.path(), "hashes.binhashes.txt", "deadbeef hello\n");

	let mut unhasher = BinUnhasher::new();
	assert!(unhasher.load_fnv1a(&path));

	let mut value = Value::Hash(Fnv1a::from_hash(0xDEAD_BEEF));
	unhasher.unhash_value(&mut value, 100);

	let Value::Hash(hash) = &value else { panic!("hash expected") };
	assert_eq!(hash.hash(), 0xDEAD_BEEF);
	assert_eq!(hash.name(), "hello");
}

#[test]
fn numbered_shards_load_when_the_base_file_is_missing() {
	let dir = tempfile::tempdir().expect("temp dir");
	write_file(dir.path(), "hashes.game.txt.0", "00000000000000ab file_a\n");
	write_file(dir.path(), "hashes.game.txt.1", "00000000000000cd file_b\n");

	let mut unhasher = BinUnhasher::new();
	assert!(unhasher.load_xxh64(dir.path().join("hashes.game.txt")));
	assert_eq!(unhasher.xxh64_len(), 2);

	let mut value = Value::File(Xxh64::from_hash(0xCD));
	unhasher.unhash_value(&mut value, 100);
	let Value::File(hash) = &value else { panic!("file expected") };
	assert_eq!(hash.name(), "file_b");
}

#[test]
fn missing_dictionaries_report_false() {
	let dir = tempfile::tempdir().expect("temp dir");
	let mut unhasher = BinUnhasher::new();
	assert!(!unhasher.load_fnv1a(dir.path().join("absent.txt")));
}

#[test]
fn blank_line_ends_the_file_logically() {
	let dir = tempfile::tempdir().expect("temp dir");
	let path = write_file(dir.path(), "hashes.bintypes.txt", "0000002a answer\n\n00000099 ignored\n");

	let mut unhasher = BinUnhasher::new();
	assert!(unhasher.load_fnv1a(&path));
	assert_eq!(unhasher.fnv1a_len(), 1);
}

#[test]
fn whole_tree_unhash_is_idempotent() {
	let mut unhasher = BinUnhasher::new();
	unhasher.insert_fnv1a(0x10, "TypeName");
	unhasher.insert_fnv1a(0x20, "fieldName");
	unhasher.insert_fnv1a(0x30, "keyName");
	unhasher.insert_xxh64(0x40, "path/to/asset");

	let mut bin = Bin::new();
	bin.set_section("type", Value::String("PROP".to_owned()));
	bin.set_section("version", Value::U32(1));
	bin.set_section(
		"entries",
		Value::Map(MapValue {
			key_kind: Kind::Hash,
			value_kind: Kind::Embed,
			items: vec![PairValue {
				key: Value::Hash(Fnv1a::from_hash(0x30)),
				value: Value::Embed(StructValue {
					name: Fnv1a::from_hash(0x10),
					items: vec![
						FieldValue {
							key: Fnv1a::from_hash(0x20),
							value: Value::File(Xxh64::from_hash(0x40)),
						},
						FieldValue {
							key: Fnv1a::from_hash(0x20),
							value: Value::List(ListValue {
								kind: Kind::Link,
								items: vec![Value::Link(Fnv1a::from_hash(0x30))],
							}),
						},
					],
				}),
			}],
		}),
	);

	unhasher.unhash_bin(&mut bin);
	let once = bin.clone();
	unhasher.unhash_bin(&mut bin);
	assert_eq!(bin, once);

	let Some(Value::Map(entries)) = bin.section("entries") else {
		panic!("entries should be a map");
	};
	let Value::Hash(key) = &entries.items[0].key else { panic!() };
	assert_eq!(key.name(), "keyName");
	let Value::Embed(body) = &entries.items[0].value else { panic!() };
	assert_eq!(body.name.name(), "TypeName");
	assert_eq!(body.items[0].key.name(), "fieldName");
	let Value::File(file) = &body.items[0].value else { panic!() };
	assert_eq!(file.name(), "path/to/asset");
	let Value::List(links) = &body.items[1].value else { panic!() };
	let Value::Link(link) = &links.items[0] else { panic!() };
	assert_eq!(link.name(), "keyName");
}
