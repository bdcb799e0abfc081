//! Semantic token dictionary (spec §6.3).
//!
//! A mapping `category name -> member strings`, used by the template
//! synthesizer to name variables semantically (`env`, `region`, `service`,
//! ...) instead of positionally. Lookups are case-sensitive; callers
//! normalize as needed.

use rustc_hash::FxHashMap;

/// Category membership table supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct TokenDictionary {
    categories: FxHashMap<String, Vec<String>>,
}

impl TokenDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, name: impl Into<String>, members: Vec<String>) -> Self {
        self.categories.insert(name.into(), members);
        self
    }

    /// Returns the category name whose member set contains every value in
    /// `values`, or `None` if no single category covers them all.
    ///
    /// Ties (more than one category matching) and conflicts (no category
    /// matching) both fall back to positional naming at the call site.
    pub fn category_for_all<'a>(&self, values: impl Iterator<Item = &'a str>) -> Option<&str> {
        let values: Vec<&str> = values.collect();
        if values.is_empty() {
            return None;
        }

        let mut matches = self
            .categories
            .iter()
            .filter(|(_, members)| {
                values
                    .iter()
                    .all(|v| members.iter().any(|m| m.as_str() == *v))
            })
            .map(|(name, _)| name.as_str());

        let first = matches.next()?;
        if matches.next().is_some() {
            // More than one category covers these values: ambiguous, fall
            // back to positional naming.
            None
        } else {
            Some(first)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
