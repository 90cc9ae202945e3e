pub mod contacts;
pub mod error;

#[cfg(test)]
mod test_util;

pub use contacts::{
    Category, ColumnOrder, Contact, ContactStore, ContactUpdate, CsvCodec, CsvOptions,
    ExportFormat, Listing, ListingIter,
};
pub use error::CoreError;
