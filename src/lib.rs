//! Public library API for the `PROP`/`PTCH` property-tree format.

/// Value model, binary/text/JSON codecs, morphing, and hash resolution.
pub mod prop;
