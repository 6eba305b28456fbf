//! Attribute extraction: normalization, translation, and aggregation.

mod aggregate;
mod normalize;
mod numeric;

pub use aggregate::{aggregate, aggregate_raw, RawField, RawListing};
pub use normalize::{normalize, EMPTY_PLACEHOLDER, OPTION_MARKER};
pub use numeric::parse_scalar;
