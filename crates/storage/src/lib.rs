pub mod csv_store;

pub use csv_store::{
    write_categorized, CategorizedRecord, CsvStore, StoreError, StoredRecord, CATEGORIZED_COLUMNS,
    COLUMNS,
};
