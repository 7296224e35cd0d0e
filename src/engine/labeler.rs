use crate::engine::{CategoryNode, CategoryTree, Document};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// How `renumber` treats a label that already carries a position prefix.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum RenumberMode {
    /// Always prefix. Renumbering twice gives `1.1.Groceries`.
    #[default]
    Prefix,
    /// Replace one existing `<digits>.` prefix. Renumbering twice gives `1.Groceries`.
    ///
    /// A label that genuinely starts with `<digits>.`, such as `3.5% Savings`, loses that part
    /// the first time it is renumbered.
    Replace,
}

serde_plain::derive_display_from_serialize!(RenumberMode);
serde_plain::derive_fromstr_from_deserialize!(RenumberMode);

/// Prefixes every category label in the first tree named `tree_name` with its 1-based position,
/// e.g. `Rent` in second place becomes `2.Rent`. Returns the number of labels rewritten, which is
/// zero when the tree does not exist.
pub fn renumber<D>(doc: &mut D, tree_name: &str, mode: RenumberMode) -> usize
where
    D: Document,
{
    let tree = match doc.category_tree_mut(tree_name) {
        Some(tree) => tree,
        None => {
            debug!("No '{tree_name}' tree to renumber");
            return 0;
        }
    };

    let nodes = tree.nodes_mut();
    for (ix, node) in nodes.iter_mut().enumerate() {
        let label = match mode {
            RenumberMode::Prefix => node.label(),
            RenumberMode::Replace => strip_position(node.label()),
        };
        let numbered = format!("{}.{}", ix + 1, label);
        trace!("Renumbered '{}' to '{numbered}'", node.label());
        node.set_label(numbered);
    }
    debug!("Renumbered {} labels in the '{tree_name}' tree", nodes.len());
    nodes.len()
}

/// Removes a single leading `<digits>.` from `label`, if present.
fn strip_position(label: &str) -> &str {
    let rest = label.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == label.len() {
        return label;
    }
    rest.strip_prefix('.').unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{cat, labels, page};

    #[test]
    fn test_renumber_prefixes_position() {
        let mut doc = page().tree("imported", [cat("Groceries", &[]), cat("Rent", &[])]);
        assert_eq!(renumber(&mut doc, "imported", RenumberMode::Prefix), 2);
        assert_eq!(labels(&doc, "imported"), vec!["1.Groceries", "2.Rent"]);
    }

    #[test]
    fn test_renumber_prefix_is_not_idempotent() {
        let mut doc = page().tree("imported", [cat("Groceries", &[]), cat("Rent", &[])]);
        renumber(&mut doc, "imported", RenumberMode::Prefix);
        renumber(&mut doc, "imported", RenumberMode::Prefix);
        assert_eq!(labels(&doc, "imported"), vec!["1.1.Groceries", "2.2.Rent"]);
    }

    #[test]
    fn test_renumber_replace_is_idempotent() {
        let mut doc = page().tree("imported", [cat("Groceries", &[]), cat("Rent", &[])]);
        renumber(&mut doc, "imported", RenumberMode::Replace);
        renumber(&mut doc, "imported", RenumberMode::Replace);
        assert_eq!(labels(&doc, "imported"), vec!["1.Groceries", "2.Rent"]);
    }

    #[test]
    fn test_renumber_replace_fixes_stale_positions() {
        let mut doc = page().tree("assigned", [cat("2.Rent", &[]), cat("1.Groceries", &[])]);
        renumber(&mut doc, "assigned", RenumberMode::Replace);
        assert_eq!(labels(&doc, "assigned"), vec!["1.Rent", "2.Groceries"]);
    }

    #[test]
    fn test_renumber_keeps_existing_label_text() {
        let mut doc = page().tree("assigned", [cat("4000 - Groceries", &[])]);
        renumber(&mut doc, "assigned", RenumberMode::Replace);
        assert_eq!(labels(&doc, "assigned"), vec!["1.4000 - Groceries"]);
    }

    #[test]
    fn test_renumber_only_first_tree_with_name() {
        let mut doc = page()
            .tree("imported", [cat("A", &[])])
            .tree("imported", [cat("B", &[])]);
        renumber(&mut doc, "imported", RenumberMode::Prefix);
        assert_eq!(doc.trees()[0].categories()[0].label(), "1.A");
        assert_eq!(doc.trees()[1].categories()[0].label(), "B");
    }

    #[test]
    fn test_renumber_missing_tree() {
        let mut doc = page().tree("imported", [cat("A", &[])]);
        assert_eq!(renumber(&mut doc, "assigned", RenumberMode::Prefix), 0);
        assert_eq!(labels(&doc, "imported"), vec!["A"]);
    }

    #[test]
    fn test_strip_position() {
        assert_eq!(strip_position("12.Rent"), "Rent");
        assert_eq!(strip_position("1.1.Rent"), "1.Rent");
        assert_eq!(strip_position("Rent"), "Rent");
        assert_eq!(strip_position("12 Rent"), "12 Rent");
        assert_eq!(strip_position(".Rent"), ".Rent");
        assert_eq!(strip_position(""), "");
    }

    #[test]
    fn test_mode_strings() {
        assert_eq!(RenumberMode::Replace.to_string(), "replace");
        assert_eq!(
            "prefix".parse::<RenumberMode>().unwrap(),
            RenumberMode::Prefix
        );
    }
}
