use crate::prop::value::Kind;

/// Translation between raw on-disk tag bytes and logical tags.
///
/// Each implementation covers one on-disk layout generation. Translation
/// failures surface as `None`; the codecs turn them into typed errors with
/// positions attached.
pub trait TypeMap: Sync {
	/// Registry name of this wire generation.
	fn name(&self) -> &'static str;

	/// Encode a logical tag as its raw byte.
	fn kind_to_raw(&self, kind: Kind) -> Option<u8>;

	/// Decode and validate a raw byte into a logical tag.
	fn raw_to_kind(&self, raw: u8) -> Option<Kind>;
}

/// Identity mapping of the current generation.
struct LatestMap;

impl TypeMap for LatestMap {
	fn name(&self) -> &'static str {
		"bin"
	}

	fn kind_to_raw(&self, kind: Kind) -> Option<u8> {
		Some(kind as u8)
	}

	fn raw_to_kind(&self, raw: u8) -> Option<Kind> {
		Kind::from_raw(raw)
	}
}

/// Dense legacy numbering that predates the `file` primitive.
///
/// Raw complex tags were packed directly after the primitives; `18..0x7F`
/// shifts into the `0x80` complex space, then everything at or above `0x81`
/// moves up one slot to make room for the inserted `file` tag. Writing folds
/// `list2` back onto `list`, which the legacy layout never had.
struct Legacy1Map;

impl TypeMap for Legacy1Map {
	fn name(&self) -> &'static str {
		"bin-legacy1"
	}

	fn kind_to_raw(&self, kind: Kind) -> Option<u8> {
		let kind = if kind == Kind::List2 { Kind::List } else { kind };
		LatestMap.kind_to_raw(kind)
	}

	fn raw_to_kind(&self, raw: u8) -> Option<Kind> {
		let mut raw = raw;
		if (18..0x80).contains(&raw) {
			raw = (raw - 18) | 0x80;
		}
		if raw >= 0x81 {
			raw += 1;
		}
		LatestMap.raw_to_kind(raw)
	}
}

static LATEST: LatestMap = LatestMap;
static LEGACY1: Legacy1Map = Legacy1Map;

static TYPE_MAPS: [&'static dyn TypeMap; 2] = [&LATEST, &LEGACY1];

/// The current wire generation.
pub(crate) fn latest() -> &'static dyn TypeMap {
	&LATEST
}

/// The dense pre-`file` wire generation.
pub(crate) fn legacy1() -> &'static dyn TypeMap {
	&LEGACY1
}

/// All wire generations, newest first.
pub fn type_maps() -> &'static [&'static dyn TypeMap] {
	&TYPE_MAPS
}

/// Look up a wire generation by registry name.
pub fn type_map(name: &str) -> Option<&'static dyn TypeMap> {
	TYPE_MAPS.iter().copied().find(|map| map.name() == name)
}
