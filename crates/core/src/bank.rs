use serde::{Deserialize, Serialize};
use std::fmt;

/// The bank a statement was issued by. Each bank uses exactly one statement layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bank {
    AbnAmro,
    Ing,
}

impl Bank {
    /// Tag written to the `Bank` column and mixed into the transaction hash.
    pub fn tag(self) -> &'static str {
        match self {
            Bank::AbnAmro => "ABN_AMRO",
            Bank::Ing => "ING",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
