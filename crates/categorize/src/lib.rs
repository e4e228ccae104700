pub mod categorizer;
pub mod keyword;
pub mod run;
pub(crate) mod util;

pub use categorizer::{
    CategorizationRequest, Categorization, CategorizeError, Categorizer, MockCategorizer,
    UNCATEGORIZED,
};
pub use keyword::{CategoryConfig, CategoryType, KeywordCategorizer, DEFAULT_FUZZY_THRESHOLD};
pub use run::{categorize_records, CategorizationSummary, DEFAULT_CONFIDENCE_THRESHOLD};
