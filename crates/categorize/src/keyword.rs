use caterm_core::EntryKind;
use serde::{Deserialize, Serialize};

use crate::categorizer::{CategorizationRequest, Categorization, CategorizeError, Categorizer};
use crate::util::similarity;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Which transactions a category may claim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Debit,
    Credit,
    #[default]
    Any,
}

impl CategoryType {
    pub fn accepts(self, kind: EntryKind) -> bool {
        match self {
            CategoryType::Any => true,
            CategoryType::Debit => kind == EntryKind::Debit,
            CategoryType::Credit => kind == EntryKind::Credit,
        }
    }
}

/// One `[categories.<Name>]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CategoryConfig {
    #[serde(rename = "type", default)]
    pub kind: CategoryType,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone)]
struct Category {
    name: String,
    kind: CategoryType,
    /// Lowercased, whitespace-collapsed, never empty.
    keywords: Vec<String>,
}

/// Matches descriptions against per-category keyword lists.
#[derive(Debug, Clone)]
pub struct KeywordCategorizer {
    categories: Vec<Category>,
    fuzzy_threshold: f64,
}

impl KeywordCategorizer {
    /// Categories are tried in the given order; on equal confidence the earlier one wins.
    pub fn new<I>(categories: I, fuzzy_threshold: f64) -> Result<Self, CategorizeError>
    where
        I: IntoIterator<Item = (String, CategoryConfig)>,
    {
        if !(fuzzy_threshold > 0.0 && fuzzy_threshold <= 1.0) {
            return Err(CategorizeError::InvalidConfig(format!(
                "fuzzy threshold must be in (0, 1], got {fuzzy_threshold}"
            )));
        }

        let categories = categories
            .into_iter()
            .map(|(name, config)| Category {
                name,
                kind: config.kind,
                keywords: config
                    .keywords
                    .iter()
                    .map(|k| normalize_text(k))
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();

        Ok(Self {
            categories,
            fuzzy_threshold,
        })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn keyword_score(&self, keyword: &str, description: &str, words: &[&str]) -> f64 {
        if description.contains(keyword) {
            return 1.0;
        }
        let width = keyword.split(' ').count().min(words.len());
        if width == 0 {
            return 0.0;
        }
        words
            .windows(width)
            .map(|w| similarity(keyword, &w.join(" ")))
            .fold(0.0, f64::max)
    }
}

impl Categorizer for KeywordCategorizer {
    fn categorize(
        &self,
        request: &CategorizationRequest<'_>,
    ) -> Result<Categorization, CategorizeError> {
        let description = normalize_text(request.description);
        let words: Vec<&str> = description.split(' ').filter(|w| !w.is_empty()).collect();

        let mut best: Option<(&Category, f64)> = None;
        for category in self.categories.iter().filter(|c| c.kind.accepts(request.kind)) {
            let score = category
                .keywords
                .iter()
                .map(|k| self.keyword_score(k, &description, &words))
                .fold(0.0, f64::max);
            if score >= self.fuzzy_threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((category, score));
            }
        }

        Ok(match best {
            Some((category, score)) => Categorization::new(category.name.clone(), score),
            None => Categorization::uncategorized(),
        })
    }
}

fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
