pub mod bank;
pub mod hash;
pub mod money;
pub mod set;
pub mod transaction;

pub use bank::Bank;
pub use money::{Amount, EntryKind};
pub use set::TransactionSet;
pub use transaction::{collapse_whitespace, NormalizationError, Transaction, TransactionCandidate};
