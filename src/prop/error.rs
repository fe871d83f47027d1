use thiserror::Error;

use crate::prop::value::Kind;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BinError>;

/// Errors produced while reading, writing, and converting property trees.
#[derive(Debug, Error)]
pub enum BinError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Leading magic was neither `PROP` nor `PTCH`.
	#[error("bad magic {magic:?} at offset {at}")]
	BadMagic {
		/// First up-to-4 bytes of the buffer.
		magic: [u8; 4],
		/// Byte offset of the magic read.
		at: usize,
	},
	/// Raw wire tag outside the mapping accepted by the active type map.
	#[error("unknown type tag 0x{raw:02x} at offset {at}")]
	UnknownTypeTag {
		/// Raw on-disk tag byte.
		raw: u8,
		/// Byte offset of the tag.
		at: usize,
	},
	/// Tag is valid but carries no wire payload (`none` as a value type).
	#[error("type {kind:?} has no wire payload, at offset {at}")]
	UnreadableKind {
		/// Offending tag.
		kind: Kind,
		/// Byte offset of the value.
		at: usize,
	},
	/// Logical tag has no raw encoding under the active type map.
	#[error("type {kind:?} is not encodable by type map {map}")]
	UnencodableKind {
		/// Logical tag being emitted.
		kind: Kind,
		/// Active type map name.
		map: &'static str,
	},
	/// A size-prefixed region did not end where its prefix said.
	#[error("size mismatch: declared end {expected}, cursor at {actual}")]
	SizeMismatch {
		/// Offset the size prefix pointed at.
		expected: usize,
		/// Offset actually reached.
		actual: usize,
	},
	/// Bytes remained after the final section.
	#[error("trailing data: {rem} bytes left at offset {at}")]
	TrailingData {
		/// Offset where parsing stopped.
		at: usize,
		/// Unconsumed byte count.
		rem: usize,
	},
	/// Container used where only non-container element types are valid.
	#[error("container type {kind:?} is not a valid element type")]
	ContainerElement {
		/// Offending element tag.
		kind: Kind,
	},
	/// Non-primitive type used as a map key type.
	#[error("non-primitive map key type {kind:?}")]
	NonPrimitiveKey {
		/// Offending key tag.
		kind: Kind,
	},
	/// Item count exceeds its wire-field width or an option held extra items.
	#[error("{what} count {count} exceeds limit {max}")]
	CountOverflow {
		/// Which count field overflowed.
		what: &'static str,
		/// Requested count.
		count: usize,
		/// Maximum the wire field can carry.
		max: usize,
	},
	/// Stored item does not match the container's declared type.
	#[error("{what} expected {expected:?}, got {got:?}")]
	WrongItemKind {
		/// Which position was being emitted.
		what: &'static str,
		/// Declared tag.
		expected: Kind,
		/// Tag actually stored.
		got: Kind,
	},
	/// Required section is absent from the tree.
	#[error("missing section {name:?}")]
	MissingSection {
		/// Section name.
		name: &'static str,
	},
	/// Section exists but holds the wrong kind of value.
	#[error("section {name:?} expected {expected:?}, got {got:?}")]
	WrongSectionKind {
		/// Section name.
		name: &'static str,
		/// Required tag.
		expected: Kind,
		/// Actual tag.
		got: Kind,
	},
	/// `type` section is neither `PROP` nor `PTCH`.
	#[error("unsupported file type {got:?} (expected \"PROP\" or \"PTCH\")")]
	WrongFileType {
		/// Actual `type` string.
		got: String,
	},
	/// Text parser did not find what the grammar requires.
	#[error("expected {what} at line {line}, column {column}")]
	TextExpected {
		/// Grammar element that failed to match.
		what: &'static str,
		/// 1-based source line.
		line: usize,
		/// 0-based source column.
		column: usize,
	},
	/// JSON document failed to parse at all.
	#[error("bad json: {message}")]
	JsonParse {
		/// Parser message from the JSON front-end.
		message: String,
	},
	/// JSON value had the wrong shape for the target type.
	#[error("read {type_name} expected {expected} at {path}")]
	JsonShape {
		/// Logical type being deserialized.
		type_name: &'static str,
		/// Shape the reader required.
		expected: &'static str,
		/// Dotted path from the document root.
		path: String,
	},
	/// The `info` projection is write-only.
	#[error("json info files can't be read")]
	InfoNotReadable,
	/// Requested format name is not registered.
	#[error("format not found: {name}")]
	UnknownFormat {
		/// Requested name.
		name: String,
	},
	/// No registered format matched the data or file name.
	#[error("failed to guess format for file: {name}")]
	GuessFailed {
		/// File name used for the guess.
		name: String,
	},
	/// Recursive conversion was requested without an input format.
	#[error("recursive run needs an input format")]
	RecursiveNeedsFormat,
	/// Recursive input path is not a directory.
	#[error("input directory doesn't exist: {path}")]
	InputDirMissing {
		/// Requested directory path.
		path: String,
	},
	/// Binary parse frame; chains the failing assertion onto its context.
	#[error("{source}\n  in {frame} @ {at}")]
	Framed {
		/// Parse phase that was active.
		frame: &'static str,
		/// Byte offset where the phase began.
		at: usize,
		/// Inner failure.
		source: Box<BinError>,
	},
	/// Text parse frame; chains the failing assertion onto its context.
	#[error("{source}\n  in {frame} @ line {line}, column {column}")]
	FramedText {
		/// Parse phase that was active.
		frame: &'static str,
		/// 1-based line where the phase began.
		line: usize,
		/// 0-based column where the phase began.
		column: usize,
		/// Inner failure.
		source: Box<BinError>,
	},
}

impl BinError {
	/// Wrap `self` in a named binary parse frame.
	pub(crate) fn framed(self, frame: &'static str, at: usize) -> Self {
		BinError::Framed {
			frame,
			at,
			source: Box::new(self),
		}
	}

	/// Wrap `self` in a named text parse frame.
	pub(crate) fn framed_text(self, frame: &'static str, line: usize, column: usize) -> Self {
		BinError::FramedText {
			frame,
			line,
			column,
			source: Box::new(self),
		}
	}

	/// Prepend a path segment to a JSON shape error as it unwinds.
	pub(crate) fn at_json_path(mut self, segment: &str) -> Self {
		if let BinError::JsonShape { path, .. } = &mut self {
			path.insert_str(0, segment);
		}
		self
	}
}
