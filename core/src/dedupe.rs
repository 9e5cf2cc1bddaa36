//! Duplicate detection over the existing chip store.

use crate::chip::Chip;
use std::sync::Arc;

pub type NormalizeFn<T> = Arc<dyn Fn(&T) -> T + Send + Sync>;
pub type EqualFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Decides whether a candidate value already exists in the store.
///
/// A candidate is a duplicate when any existing chip's normalized value is
/// equal (under `is_equal`) to the normalized candidate. Both functions are
/// host-replaceable; the defaults are identity and `==`.
pub struct DuplicatePolicy<T> {
    normalize: NormalizeFn<T>,
    is_equal: EqualFn<T>,
}

impl<T> Clone for DuplicatePolicy<T> {
    fn clone(&self) -> Self {
        Self {
            normalize: self.normalize.clone(),
            is_equal: self.is_equal.clone(),
        }
    }
}

impl<T> DuplicatePolicy<T> {
    pub fn new(
        normalize: impl Fn(&T) -> T + Send + Sync + 'static,
        is_equal: impl Fn(&T, &T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            normalize: Arc::new(normalize),
            is_equal: Arc::new(is_equal),
        }
    }

    pub fn with_normalize(mut self, normalize: impl Fn(&T) -> T + Send + Sync + 'static) -> Self {
        self.normalize = Arc::new(normalize);
        self
    }

    pub fn with_equality(
        mut self,
        is_equal: impl Fn(&T, &T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_equal = Arc::new(is_equal);
        self
    }

    pub fn is_duplicate(&self, candidate: &T, existing: &[Chip<T>]) -> bool {
        let candidate = (self.normalize)(candidate);
        existing
            .iter()
            .any(|chip| (self.is_equal)(&(self.normalize)(&chip.value), &candidate))
    }
}

impl<T> Default for DuplicatePolicy<T>
where
    T: Clone + PartialEq + 'static,
{
    fn default() -> Self {
        Self {
            normalize: Arc::new(T::clone),
            is_equal: Arc::new(|a, b| a == b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chips(values: &[&str]) -> Vec<Chip<String>> {
        values.iter().map(|v| Chip::new((*v).to_string())).collect()
    }

    #[test]
    fn strict_equality_by_default() {
        let policy = DuplicatePolicy::<String>::default();
        let existing = chips(&["a@b.com"]);
        assert!(policy.is_duplicate(&"a@b.com".to_string(), &existing));
        assert!(!policy.is_duplicate(&"A@B.COM".to_string(), &existing));
    }

    #[test]
    fn normalization_applies_to_both_sides() {
        let policy =
            DuplicatePolicy::<String>::default().with_normalize(|v| v.to_ascii_lowercase());
        let existing = chips(&["A@B.com"]);
        assert!(policy.is_duplicate(&"a@b.COM".to_string(), &existing));
        assert!(!policy.is_duplicate(&"c@d.com".to_string(), &existing));
    }

    #[test]
    fn empty_store_has_no_duplicates() {
        let policy = DuplicatePolicy::<String>::default();
        assert!(!policy.is_duplicate(&"x".to_string(), &[]));
    }
}
