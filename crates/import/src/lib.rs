macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod amount;
pub mod detect;
pub mod document;
pub mod error;
pub mod extract;
pub mod normalize;
#[cfg(feature = "pdf")]
mod pdf;
pub mod pipeline;
pub mod tabular;
pub mod text;

pub use amount::{normalize_amount_text, parse_amount};
pub use detect::{detect_format, StatementFormat, TEXT_FORMAT_MARKER};
pub use document::{Document, RawLine, RawRow};
pub use error::{ImportError, Location, Malformed};
pub use extract::{Extraction, RejectedRecord, SourcedCandidate, StatementExtractor};
pub use normalize::{clean_description, normalize};
pub use pipeline::{import_documents, parse_document, BatchReport, ParsedDocument, SkippedItem};
pub use tabular::TabularExtractor;
pub use text::TextStreamExtractor;
