//! Lookup configuration: field and value dictionaries.

mod store;

pub use store::{FieldEntry, LookupStore};
