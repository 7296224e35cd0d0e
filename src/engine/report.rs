use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Something that went wrong during a pass but did not stop it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// No tree with this name exists on the page.
    MissingTree { tree: String },
    /// An amount could not be read as a number.
    MalformedAmount {
        tree: String,
        category: String,
        text: String,
    },
    /// Adding a category's amounts would push a total beyond the range of a decimal. The category
    /// is left out of the totals.
    Overflow { tree: String, category: String },
    /// There was nowhere to display a total. When `category` is `None` the sinks belong to the tree
    /// itself, and when `tree` is also `None` they belong to the grand total.
    MissingSink {
        tree: Option<String>,
        category: Option<String>,
    },
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::MissingTree { tree } => write!(f, "There is no '{tree}' tree on the page"),
            Issue::MalformedAmount {
                tree,
                category,
                text,
            } => write!(
                f,
                "The amount '{text}' in category '{category}' of the '{tree}' tree is not a number"
            ),
            Issue::Overflow { tree, category } => write!(
                f,
                "Category '{category}' of the '{tree}' tree is too large to add to the totals"
            ),
            Issue::MissingSink { tree, category } => match (tree, category) {
                (Some(tree), Some(category)) => write!(
                    f,
                    "Category '{category}' of the '{tree}' tree has nowhere to display its totals"
                ),
                (Some(tree), None) => {
                    write!(f, "The '{tree}' tree has nowhere to display its total")
                }
                (None, _) => write!(f, "The page has nowhere to display the grand total"),
            },
        }
    }
}

/// A summary of a renumber and roll-up pass.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Report {
    pub trees_processed: usize,
    pub nodes_rendered: usize,
    pub amounts_added: usize,
    pub issues: Vec<Issue>,
}

impl Report {
    pub(crate) fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Folds `other` into this report.
    pub fn merge(&mut self, other: Report) {
        self.trees_processed += other.trees_processed;
        self.nodes_rendered += other.nodes_rendered;
        self.amounts_added += other.amounts_added;
        self.issues.extend(other.issues);
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// A one-line description suitable for a command's output message.
    pub fn summary(&self) -> String {
        format!(
            "Rendered {} categories in {} trees from {} amounts with {} issues",
            self.nodes_rendered,
            self.trees_processed,
            self.amounts_added,
            self.issues.len()
        )
    }
}
