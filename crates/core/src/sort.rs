//! Ordering of tree nodes by the number embedded in their key

use crate::tree::TreeNode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How the root level of an exported tree is ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// By the first number found in each key, keys without digits last
    #[default]
    Number,
    /// Listing order, as produced by the tree builder
    Insertion,
}

impl SortOrder {
    pub fn as_str(&self) -> &str {
        match self {
            SortOrder::Number => "number",
            SortOrder::Insertion => "insertion",
        }
    }

    /// Apply this order to `nodes`
    pub fn apply(&self, nodes: &mut [TreeNode]) {
        if *self == SortOrder::Number {
            sort_by_number(nodes);
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "number" | "numeric" => Ok(SortOrder::Number),
            "insertion" | "none" => Ok(SortOrder::Insertion),
            other => Err(format!(
                "unknown sort order '{}' (expected number or insertion)",
                other
            )),
        }
    }
}

/// First run of ASCII digits in `key`, leading zeros stripped
///
/// A run made only of zeros yields `"0"`.
pub fn leading_number(key: &str) -> Option<&str> {
    let start = key.find(|c: char| c.is_ascii_digit())?;
    let rest = &key[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];

    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        Some(&digits[digits.len() - 1..])
    } else {
        Some(trimmed)
    }
}

/// Compare two keys by their embedded number; keys without digits go last
pub fn compare_by_number(a: &str, b: &str) -> Ordering {
    match (leading_number(a), leading_number(b)) {
        // Same-length digit strings compare like the integers they spell
        (Some(x), Some(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable ascending sort of `nodes` by the number embedded in their key
pub fn sort_by_number(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| compare_by_number(&a.key, &b.key));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(keys: &[&str]) -> Vec<TreeNode> {
        keys.iter()
            .map(|key| TreeNode {
                key: key.to_string(),
                details: None,
                children: Some(Vec::new()),
            })
            .collect()
    }

    fn keys(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.key.as_str()).collect()
    }

    #[test]
    fn test_sort_by_number() {
        let mut tree = nodes(&["10-x.mp4", "2-y.mp4", "1-z.mp4"]);
        sort_by_number(&mut tree);
        assert_eq!(keys(&tree), vec!["1-z.mp4", "2-y.mp4", "10-x.mp4"]);
    }

    #[test]
    fn test_number_anywhere_in_key() {
        let mut tree = nodes(&["Unit 12", "Unit 3", "Unit 07"]);
        sort_by_number(&mut tree);
        assert_eq!(keys(&tree), vec!["Unit 3", "Unit 07", "Unit 12"]);
    }

    #[test]
    fn test_keys_without_digits_go_last_in_input_order() {
        let mut tree = nodes(&["notes", "2 b", "intro", "1 a"]);
        sort_by_number(&mut tree);
        assert_eq!(keys(&tree), vec!["1 a", "2 b", "notes", "intro"]);
    }

    #[test]
    fn test_equal_numbers_keep_input_order() {
        let mut tree = nodes(&["1 b", "01 a", "1 c"]);
        sort_by_number(&mut tree);
        assert_eq!(keys(&tree), vec!["1 b", "01 a", "1 c"]);
    }

    #[test]
    fn test_numbers_wider_than_u64() {
        let mut tree = nodes(&["99999999999999999999999", "100000000000000000000000", "5"]);
        sort_by_number(&mut tree);
        assert_eq!(
            keys(&tree),
            vec!["5", "99999999999999999999999", "100000000000000000000000"]
        );
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("lesson-042-b7"), Some("42"));
        assert_eq!(leading_number("000"), Some("0"));
        assert_eq!(leading_number("no digits"), None);
    }

    #[test]
    fn test_insertion_order_is_untouched() {
        let mut tree = nodes(&["10", "2", "1"]);
        SortOrder::Insertion.apply(&mut tree);
        assert_eq!(keys(&tree), vec!["10", "2", "1"]);
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("number".parse::<SortOrder>().unwrap(), SortOrder::Number);
        assert_eq!(" Insertion ".parse::<SortOrder>().unwrap(), SortOrder::Insertion);
        assert!("alpha".parse::<SortOrder>().is_err());
    }
}
