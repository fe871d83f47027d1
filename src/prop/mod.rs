mod binary_read;
mod binary_write;
mod bytes;
mod compat;
mod error;
mod format;
mod hash;
mod json;
mod morph;
mod strconv;
mod text_read;
mod text_write;
mod unhash;
mod value;

/// Binary `PROP`/`PTCH` parser.
pub use binary_read::read_binary;
/// Binary `PROP`/`PTCH` serializer.
pub use binary_write::write_binary;
/// Bounded little-endian cursor and growable sink.
pub use bytes::{Cursor, Sink};
/// Wire tag translation between on-disk generations.
pub use compat::{TypeMap, type_map, type_maps};
/// Error and result aliases.
pub use error::{BinError, Result};
/// Named format registry and content/file-name guessing.
pub use format::{Format, format, formats, guess_format};
/// Case-insensitive hash identifier types.
pub use hash::{Fnv1a, Xxh64};
/// Lossless and lossy JSON projections.
pub use json::{read_json, write_json, write_json_info};
/// Value coercion with fidelity reporting.
pub use morph::{MorphResult, morph_type_key, morph_type_value, morph_value};
/// String quoting and unquoting with escape handling.
pub use strconv::{quote_str, unquote_str};
/// Text format parsers for whole files and fragments.
pub use text_read::{read_text, read_text_elements, read_text_fields, read_text_pairs, read_text_value};
/// Text format pretty-printer.
pub use text_write::write_text;
/// Hash dictionary loading and recursive substitution.
pub use unhash::BinUnhasher;
/// Tagged value tree, wire tags, and the section container.
pub use value::{Bin, Category, FieldValue, Kind, ListValue, MapValue, OptionValue, PairValue, StructValue, Value};
