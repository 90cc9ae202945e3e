//! Contact records, the ordered in-memory store, and their CSV persistence.
//!
//! A contact book is loaded once with [`CsvCodec::load`], mutated through
//! [`ContactStore`], and written back with [`CsvCodec::save`].

mod codec;
mod store;
mod types;

pub use codec::{ColumnOrder, CsvCodec, CsvOptions, ExportFormat};
pub use store::{ContactStore, Listing, ListingIter};
pub use types::{Category, Contact, ContactUpdate};
