use crate::engine::{CategoryNode, CategoryTree, DisplaySinks, Document};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An upload results page: named category trees plus the grand total of all of them.
///
/// Any sink that is missing from the JSON stays missing; the engine skips rendering into it.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResultsPage {
    #[serde(default)]
    trees: Vec<PageTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grand_total: Option<DisplaySinks>,
}

impl ResultsPage {
    /// Creates a page with no trees and an empty grand total.
    pub fn new() -> Self {
        Self {
            trees: Vec::new(),
            grand_total: Some(DisplaySinks::default()),
        }
    }

    /// Appends a tree, with a tree total, holding `categories`.
    pub fn tree(
        mut self,
        name: impl Into<String>,
        categories: impl IntoIterator<Item = PageCategory>,
    ) -> Self {
        self.push_tree(PageTree::new(name, categories));
        self
    }

    pub fn push_tree(&mut self, tree: PageTree) {
        self.trees.push(tree);
    }

    pub fn trees(&self) -> &[PageTree] {
        &self.trees
    }

    pub fn trees_mut(&mut self) -> &mut [PageTree] {
        &mut self.trees
    }

    /// Returns the first tree named `name`.
    pub fn find_tree(&self, name: &str) -> Option<&PageTree> {
        self.trees.iter().find(|tree| tree.name == name)
    }

    pub fn grand_total(&self) -> Option<&DisplaySinks> {
        self.grand_total.as_ref()
    }

    pub fn set_grand_total(&mut self, sinks: Option<DisplaySinks>) {
        self.grand_total = sinks;
    }
}

impl Document for ResultsPage {
    type Tree = PageTree;

    fn category_tree_mut(&mut self, name: &str) -> Option<&mut PageTree> {
        self.trees.iter_mut().find(|tree| tree.name == name)
    }

    fn grand_total_mut(&mut self) -> Option<&mut DisplaySinks> {
        self.grand_total.as_mut()
    }
}

/// One named tree of categories.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageTree {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<DisplaySinks>,
    #[serde(default)]
    categories: Vec<PageCategory>,
}

impl PageTree {
    pub fn new(
        name: impl Into<String>,
        categories: impl IntoIterator<Item = PageCategory>,
    ) -> Self {
        Self {
            name: name.into(),
            total: Some(DisplaySinks::default()),
            categories: categories.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total(&self) -> Option<&DisplaySinks> {
        self.total.as_ref()
    }

    pub fn set_total(&mut self, sinks: Option<DisplaySinks>) {
        self.total = sinks;
    }

    pub fn categories(&self) -> &[PageCategory] {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut [PageCategory] {
        &mut self.categories
    }
}

impl CategoryTree for PageTree {
    type Node = PageCategory;

    fn nodes_mut(&mut self) -> &mut [PageCategory] {
        &mut self.categories
    }

    fn total_mut(&mut self) -> Option<&mut DisplaySinks> {
        self.total.as_mut()
    }
}

/// A category header and the transaction rows listed under it.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageCategory {
    label: String,
    #[serde(default)]
    rows: Vec<PageRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    totals: Option<DisplaySinks>,
}

impl PageCategory {
    /// Creates a category with empty totals sinks.
    pub fn new(label: impl Into<String>, rows: impl IntoIterator<Item = PageRow>) -> Self {
        Self {
            label: label.into(),
            rows: rows.into_iter().collect(),
            totals: Some(DisplaySinks::default()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rows(&self) -> &[PageRow] {
        &self.rows
    }

    pub fn totals(&self) -> Option<&DisplaySinks> {
        self.totals.as_ref()
    }

    pub fn set_totals(&mut self, sinks: Option<DisplaySinks>) {
        self.totals = sinks;
    }
}

impl CategoryNode for PageCategory {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }

    fn amount_texts(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.amount.as_str()).collect()
    }

    fn sinks_mut(&mut self) -> Option<&mut DisplaySinks> {
        self.totals.as_mut()
    }
}

/// A single transaction as it is displayed on the page. Only `amount` takes part in the totals.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    amount: String,
}

impl PageRow {
    /// A row with nothing but an amount.
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn with_details(
        id: impl Into<String>,
        date: NaiveDate,
        description: Option<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            date: Some(date),
            description,
            amount: amount.into(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }
}
