use serde::Serialize;
use std::collections::HashMap;

/// Bijection between distinct cell labels and palette indices.
///
/// Labels are numbered in reverse order of first appearance, so the last
/// field gets index 0. A vertical legend drawn with index 0 at the bottom
/// therefore reads top-down in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct LabelIndex {
    labels: Vec<String>,
    #[serde(skip)]
    lookup: HashMap<String, usize>,
}

impl LabelIndex {
    /// Build from labels in first-seen order; repeats are ignored.
    pub fn from_labels<I, S>(labels: I) -> LabelIndex
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !seen.contains(&label) {
                seen.push(label);
            }
        }
        seen.reverse();
        let lookup = seen
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        LabelIndex {
            labels: seen,
            lookup,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.lookup.get(label).copied()
    }

    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    /// Labels ordered by index.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_first_seen_order() {
        let idx = LabelIndex::from_labels(["a: T", "a: T", "b: U", "c: V", "b: U"]);
        assert_eq!(idx.labels(), &["c: V", "b: U", "a: T"]);
        assert_eq!(idx.index_of("a: T"), Some(2));
        assert_eq!(idx.index_of("c: V"), Some(0));
        assert_eq!(idx.index_of("d: W"), None);
        assert_eq!(idx.label(1), "b: U");
    }

    #[test]
    fn empty_index() {
        let idx = LabelIndex::from_labels(Vec::<String>::new());
        assert!(idx.is_empty());
        assert_eq!(idx.len(), 0);
    }
}
