use crate::commands::{write_page, Out};
use crate::engine::{self, Report};
use crate::error::{ErrorType, IntoResult};
use crate::model::Transactions;
use crate::{utils, Config, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// What the `group` command did.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupSummary {
    /// The number of transactions listed on the page.
    pub transactions: usize,
    /// The CSV rows that could not be read.
    pub failures: Vec<String>,
    /// The roll-up report, when the page was rendered.
    pub report: Option<Report>,
}

/// Builds a results page from a CSV file of bank transactions.
///
/// Transactions with an account code are listed in the `assigned` tree under their account, the
/// others in the `imported` tree under their relation name. When `render` is true the page is
/// renumbered and rolled up as by `render` before it is written.
///
/// # Errors
/// - Returns an error if the CSV cannot be read or has no header row.
/// - Returns an error if the output cannot be written.
pub async fn group(
    config: &Config,
    transactions: &Path,
    output: Option<&Path>,
    render: bool,
) -> Result<Out<GroupSummary>> {
    info!("Grouping the transactions in {}", transactions.display());
    let csv = utils::read(transactions)
        .await
        .pub_result(ErrorType::Input)?;
    let transactions = Transactions::from_csv(csv.as_bytes()).pub_result(ErrorType::Input)?;

    let mut page = transactions.to_page();
    let report = if render {
        let report = engine::render_page(&mut page, config.trees(), &config.options());
        for issue in &report.issues {
            warn!("{issue}");
        }
        Some(report)
    } else {
        None
    };

    write_page(&page, output)
        .await
        .pub_result(ErrorType::Output)?;

    let summary = GroupSummary {
        transactions: transactions.data().len(),
        failures: transactions.failures().to_vec(),
        report,
    };
    let mut message = format!(
        "Grouped {} transactions, {} rows could not be read",
        summary.transactions,
        summary.failures.len()
    );
    if let Some(report) = &summary.report {
        message = format!("{message}. {}", report.summary());
    }
    Ok(Out::new(message, summary))
}
