//! The renumbering and roll-up engine that runs over a rendered results page.
//!
//! The engine does not know what a results page looks like. It reads and writes through the
//! `Document`, `CategoryTree` and `CategoryNode` traits. `crate::model::ResultsPage` is the
//! in-memory implementation used by the CLI.

mod accumulator;
mod aggregator;
mod labeler;
mod options;
mod report;

pub use accumulator::{Accumulator, TotalOverflow};
pub use aggregator::{aggregate, render_page};
pub use labeler::{renumber, RenumberMode};
pub use options::{MalformedPolicy, Options};
pub use report::{Issue, Report};

use serde::{Deserialize, Serialize};

/// The name of the tree that holds transactions which have not been assigned to an account.
pub const IMPORTED: &str = "imported";

/// The name of the tree that holds transactions which have been assigned to an account.
pub const ASSIGNED: &str = "assigned";

/// A rendered page holding any number of named category trees and a grand total.
pub trait Document {
    type Tree: CategoryTree;

    /// Returns the first tree named `name`, if there is one.
    fn category_tree_mut(&mut self, name: &str) -> Option<&mut Self::Tree>;

    /// The sinks that display the grand total of all trees.
    fn grand_total_mut(&mut self) -> Option<&mut DisplaySinks>;
}

/// One named tree of category nodes, e.g. "imported".
pub trait CategoryTree {
    type Node: CategoryNode;

    /// The category nodes in document order.
    fn nodes_mut(&mut self) -> &mut [Self::Node];

    /// The sinks that display the total of this tree.
    fn total_mut(&mut self) -> Option<&mut DisplaySinks>;
}

/// One category within a tree, along with the transaction amounts filed under it.
pub trait CategoryNode {
    fn label(&self) -> &str;

    fn set_label(&mut self, label: String);

    /// The transaction amounts as they are displayed, in document order.
    fn amount_texts(&self) -> Vec<&str>;

    /// `None` when the node has nowhere to display its totals.
    fn sinks_mut(&mut self) -> Option<&mut DisplaySinks>;
}

/// The three text fields that an `Accumulator` renders into.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DisplaySinks {
    #[serde(default)]
    debit: String,
    #[serde(default)]
    credit: String,
    #[serde(default)]
    total: String,
}

impl DisplaySinks {
    pub fn new(
        debit: impl Into<String>,
        credit: impl Into<String>,
        total: impl Into<String>,
    ) -> Self {
        Self {
            debit: debit.into(),
            credit: credit.into(),
            total: total.into(),
        }
    }

    pub fn debit(&self) -> &str {
        &self.debit
    }

    pub fn credit(&self) -> &str {
        &self.credit
    }

    pub fn total(&self) -> &str {
        &self.total
    }

    pub(crate) fn set(&mut self, debit: String, credit: String, total: String) {
        self.debit = debit;
        self.credit = credit;
        self.total = total;
    }
}
