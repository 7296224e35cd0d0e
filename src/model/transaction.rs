use crate::engine::{ASSIGNED, IMPORTED};
use crate::error::Res;
use crate::model::{Amount, PageCategory, PageRow, ResultsPage};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use tracing::{debug, warn};

/// The category used for unassigned transactions that have no relation name.
pub const UNKNOWN_RELATION: &str = "[Unknown]";

/// A bank transaction that has already been read from a statement and, possibly, assigned to an
/// account.
///
/// Example CSV:
/// ```text
/// id,date,description,amount,relation_name,account_code,account_description
/// t1,2022-01-03,Weekly shop,-40.00,Supermarket,,
/// t2,2022-01-04,January rent,-950.00,Landlord,4100,Housing
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BankTransaction {
    id: String,
    date: NaiveDate,
    #[serde(default)]
    description: Option<String>,
    amount: Amount,
    #[serde(default)]
    relation_name: Option<String>,
    #[serde(default)]
    account_code: Option<String>,
    #[serde(default)]
    account_description: Option<String>,
}

impl BankTransaction {
    pub fn new(id: impl Into<String>, date: NaiveDate, amount: Amount) -> Self {
        Self {
            id: id.into(),
            date,
            description: None,
            amount,
            relation_name: None,
            account_code: None,
            account_description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_relation(mut self, relation_name: impl Into<String>) -> Self {
        self.relation_name = Some(relation_name.into());
        self
    }

    pub fn with_account(mut self, code: impl Into<String>, description: Option<String>) -> Self {
        self.account_code = Some(code.into());
        self.account_description = description;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The tree and the category label this transaction is listed under.
    ///
    /// Assigned transactions are grouped by account (`"4100 - Housing"`), the others by the name of
    /// the counterparty.
    pub fn placement(&self) -> (&'static str, String) {
        match &self.account_code {
            Some(code) => {
                let label = match &self.account_description {
                    Some(description) => format!("{code} - {description}"),
                    None => code.clone(),
                };
                (ASSIGNED, label)
            }
            None => {
                let label = self
                    .relation_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_RELATION.to_string());
                (IMPORTED, label)
            }
        }
    }

    fn to_row(&self) -> PageRow {
        // Keep every digit; rounding is for totals only
        PageRow::with_details(
            &self.id,
            self.date,
            self.description.clone(),
            self.amount.value().to_string(),
        )
    }
}

/// The transactions read from a CSV file, along with the rows that could not be read.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Transactions {
    data: Vec<BankTransaction>,
    failures: Vec<String>,
}

impl Transactions {
    pub fn new(data: Vec<BankTransaction>) -> Self {
        Self {
            data,
            failures: Vec::new(),
        }
    }

    /// Reads transactions from CSV with a header row. A row that cannot be read is recorded in
    /// `failures` and skipped; only an unreadable header row is an error.
    pub fn from_csv(reader: impl Read) -> Res<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let _ = rdr
            .headers()
            .context("Unable to read the header row of the transactions")?;

        let mut transactions = Self::default();
        for (ix, result) in rdr.deserialize::<BankTransaction>().enumerate() {
            match result {
                Ok(transaction) => transactions.data.push(transaction),
                Err(e) => {
                    // +2 for the header row and 1-based numbering
                    let failure = format!("Row {}: {e}", ix + 2);
                    warn!("Skipping transaction. {failure}");
                    transactions.failures.push(failure);
                }
            }
        }
        debug!(
            "Read {} transactions with {} failures",
            transactions.data.len(),
            transactions.failures.len()
        );
        Ok(transactions)
    }

    pub fn data(&self) -> &[BankTransaction] {
        &self.data
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Builds a results page with an `imported` and an `assigned` tree. Both trees are always
    /// present. Categories are sorted by label and keep the transactions in their original order.
    pub fn to_page(&self) -> ResultsPage {
        let mut imported: BTreeMap<String, Vec<PageRow>> = BTreeMap::new();
        let mut assigned: BTreeMap<String, Vec<PageRow>> = BTreeMap::new();

        for transaction in &self.data {
            let (tree, label) = transaction.placement();
            let categories = if tree == ASSIGNED {
                &mut assigned
            } else {
                &mut imported
            };
            categories
                .entry(label)
                .or_default()
                .push(transaction.to_row());
        }

        let into_categories = |categories: BTreeMap<String, Vec<PageRow>>| {
            categories
                .into_iter()
                .map(|(label, rows)| PageCategory::new(label, rows))
                .collect::<Vec<_>>()
        };

        ResultsPage::new()
            .tree(IMPORTED, into_categories(imported))
            .tree(ASSIGNED, into_categories(assigned))
    }
}
