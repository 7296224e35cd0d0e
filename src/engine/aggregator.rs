use crate::engine::{
    renumber, Accumulator, CategoryNode, CategoryTree, Document, Issue, MalformedPolicy, Options,
    Report,
};
use crate::model::Amount;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Rolls up the amounts of every category in the first tree named `tree_name`.
///
/// Each category gets a fresh `Accumulator` whose parent is `parent`, is fed its amounts in
/// document order, and is then rendered into the category's sinks. `parent` is never rendered
/// here, see `render_page`.
///
/// A missing tree is not an error. Nothing is added to `parent` and the returned report says so.
/// Neither is a category whose amounts would overflow a total: it is left out, as with
/// `MalformedPolicy::Reject`, and its siblings continue.
pub fn aggregate<D>(
    doc: &mut D,
    tree_name: &str,
    parent: &Accumulator<'_>,
    options: &Options,
) -> Report
where
    D: Document,
{
    let mut report = Report::default();
    let tree = match doc.category_tree_mut(tree_name) {
        Some(tree) => tree,
        None => {
            debug!("No '{tree_name}' tree to aggregate");
            report.push(Issue::MissingTree {
                tree: tree_name.to_string(),
            });
            return report;
        }
    };
    report.trees_processed += 1;

    for node in tree.nodes_mut().iter_mut() {
        let policy = options.malformed_amounts;
        let amounts = match read_amounts(node, tree_name, policy, &mut report) {
            Some(amounts) => amounts,
            None => continue,
        };

        let accumulator = Accumulator::with_parent(parent);
        let count = amounts.len();
        if let Err(e) = accumulator.add_all(amounts) {
            warn!(
                "Leaving category '{}' of the '{tree_name}' tree out of the totals: {e}",
                node.label()
            );
            report.push(Issue::Overflow {
                tree: tree_name.to_string(),
                category: node.label().to_string(),
            });
            continue;
        }
        report.amounts_added += count;
        trace!("Category '{}': {accumulator:?}", node.label());

        match node.sinks_mut() {
            Some(sinks) => {
                accumulator.update(sinks, options.format);
                report.nodes_rendered += 1;
            }
            None => {
                warn!(
                    "Category '{}' of the '{tree_name}' tree has no totals to render into",
                    node.label()
                );
                report.push(Issue::MissingSink {
                    tree: Some(tree_name.to_string()),
                    category: Some(node.label().to_string()),
                });
            }
        }
    }
    report
}

/// Parses the amounts of `node`. Returns `None` when the node must be left out entirely.
fn read_amounts<N>(
    node: &N,
    tree_name: &str,
    policy: MalformedPolicy,
    report: &mut Report,
) -> Option<Vec<Decimal>>
where
    N: CategoryNode,
{
    let mut amounts = Vec::new();
    let mut rejected = false;
    for text in node.amount_texts() {
        match Amount::from_str(text) {
            Ok(amount) => amounts.push(amount.value()),
            Err(e) => {
                report.push(Issue::MalformedAmount {
                    tree: tree_name.to_string(),
                    category: node.label().to_string(),
                    text: text.to_string(),
                });
                match policy {
                    MalformedPolicy::Zero => {
                        warn!(
                            "Counting '{text}' in category '{}' as zero: {e}",
                            node.label()
                        );
                        amounts.push(Decimal::ZERO);
                    }
                    MalformedPolicy::Reject => {
                        warn!(
                            "Leaving category '{}' out of the totals because of '{text}': {e}",
                            node.label()
                        );
                        rejected = true;
                    }
                }
            }
        }
    }
    if rejected {
        None
    } else {
        Some(amounts)
    }
}

/// Renumbers and rolls up the whole page, the way the upload results page does on load.
///
/// All trees in `tree_names` are renumbered first. Then each tree gets its own accumulator under
/// a single grand total, is aggregated, and has its tree total rendered. The grand total is
/// rendered last.
pub fn render_page<D, S>(doc: &mut D, tree_names: &[S], options: &Options) -> Report
where
    D: Document,
    S: AsRef<str>,
{
    for name in tree_names {
        renumber(doc, name.as_ref(), options.renumber);
    }

    let mut report = Report::default();
    let grand_total = Accumulator::root();
    for name in tree_names {
        let name = name.as_ref();
        let tree_total = Accumulator::with_parent(&grand_total);
        report.merge(aggregate(doc, name, &tree_total, options));

        if let Some(tree) = doc.category_tree_mut(name) {
            match tree.total_mut() {
                Some(sinks) => tree_total.update(sinks, options.format),
                None => {
                    warn!("The '{name}' tree has no total to render into");
                    report.push(Issue::MissingSink {
                        tree: Some(name.to_string()),
                        category: None,
                    });
                }
            }
        }
    }

    match doc.grand_total_mut() {
        Some(sinks) => grand_total.update(sinks, options.format),
        None => {
            warn!("The page has no grand total to render into");
            report.push(Issue::MissingSink {
                tree: None,
                category: None,
            });
        }
    }
    debug!("Grand total: {grand_total:?}");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RenumberMode;
    use crate::model::{AmountFormat, ResultsPage};
    use crate::test::{cat, labels, page, sinks_of, totals_of};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn two_imported() -> ResultsPage {
        page().tree(
            "imported",
            [cat("Groceries", &["50", "-10"]), cat("Rent", &["-5", "20"])],
        )
    }

    #[test]
    fn test_aggregate_single_node() {
        let mut doc = page().tree("imported", [cat("Groceries", &["100.00", "-40.00", "5.00"])]);
        let grand_total = Accumulator::root();
        let report = aggregate(&mut doc, "imported", &grand_total, &Options::default());

        assert_eq!(
            totals_of(&doc, "imported", 0),
            ("105.00", "40.00", "65.00")
        );
        assert_eq!(grand_total.total(), dec("65"));
        assert_eq!(report.trees_processed, 1);
        assert_eq!(report.nodes_rendered, 1);
        assert_eq!(report.amounts_added, 3);
        assert!(report.is_clean());
    }

    #[test]
    fn test_aggregate_does_not_render_parent() {
        let mut doc = two_imported();
        let grand_total = Accumulator::root();
        aggregate(&mut doc, "imported", &grand_total, &Options::default());

        assert_eq!(totals_of(&doc, "imported", 0), ("50.00", "10.00", "40.00"));
        assert_eq!(totals_of(&doc, "imported", 1), ("20.00", "5.00", "15.00"));
        assert_eq!(grand_total.debit(), dec("70"));
        assert_eq!(grand_total.credit(), dec("15"));
        assert_eq!(grand_total.total(), dec("55"));
        assert_eq!(sinks_of(&doc, "imported").unwrap().total(), "");
        assert_eq!(doc.grand_total().unwrap().total(), "");
    }

    #[test]
    fn test_aggregate_missing_tree_is_a_no_op() {
        let mut doc = two_imported();
        let grand_total = Accumulator::root();
        grand_total.add(dec("3")).unwrap();
        let report = aggregate(&mut doc, "assigned", &grand_total, &Options::default());

        assert_eq!(grand_total.debit(), dec("3"));
        assert_eq!(grand_total.credit(), Decimal::ZERO);
        assert_eq!(report.trees_processed, 0);
        assert_eq!(
            report.issues,
            vec![Issue::MissingTree {
                tree: "assigned".into()
            }]
        );
    }

    #[test]
    fn test_aggregate_order_does_not_matter() {
        let categories = [
            ("a", vec!["12.34", "-0.01"]),
            ("b", vec!["-99.99"]),
            ("c", vec!["0", "7.5", "-3.25"]),
        ];
        let forward = Accumulator::root();
        let backward = Accumulator::root();

        let mut doc = page().tree(
            "imported",
            categories.iter().map(|(label, amounts)| cat(label, amounts)),
        );
        aggregate(&mut doc, "imported", &forward, &Options::default());

        let mut doc = page().tree(
            "imported",
            categories
                .iter()
                .rev()
                .map(|(label, amounts)| cat(label, amounts)),
        );
        aggregate(&mut doc, "imported", &backward, &Options::default());

        assert_eq!(forward.debit(), backward.debit());
        assert_eq!(forward.credit(), backward.credit());
        assert_eq!(forward.total(), dec("-83.41"));
    }

    #[test]
    fn test_aggregate_missing_sink_still_rolls_up() {
        let mut doc = two_imported();
        doc.trees_mut()[0].categories_mut()[0].set_totals(None);
        let grand_total = Accumulator::root();
        let report = aggregate(&mut doc, "imported", &grand_total, &Options::default());

        assert_eq!(grand_total.total(), dec("55"));
        assert_eq!(report.nodes_rendered, 1);
        assert_eq!(totals_of(&doc, "imported", 1), ("20.00", "5.00", "15.00"));
        assert_eq!(
            report.issues,
            vec![Issue::MissingSink {
                tree: Some("imported".into()),
                category: Some("Groceries".into()),
            }]
        );
    }

    #[test]
    fn test_malformed_amount_counts_as_zero() {
        let mut doc = page().tree(
            "imported",
            [cat("Groceries", &["10", "ten", "-2"]), cat("Rent", &["-1"])],
        );
        let grand_total = Accumulator::root();
        let report = aggregate(&mut doc, "imported", &grand_total, &Options::default());

        assert_eq!(totals_of(&doc, "imported", 0), ("10.00", "2.00", "8.00"));
        assert_eq!(grand_total.total(), dec("7"));
        assert_eq!(report.nodes_rendered, 2);
        assert_eq!(
            report.issues,
            vec![Issue::MalformedAmount {
                tree: "imported".into(),
                category: "Groceries".into(),
                text: "ten".into(),
            }]
        );
    }

    #[test]
    fn test_malformed_amount_rejects_node() {
        let mut doc = page().tree(
            "imported",
            [cat("Groceries", &["10", "ten", "-2"]), cat("Rent", &["-1"])],
        );
        let options = Options {
            malformed_amounts: MalformedPolicy::Reject,
            ..Options::default()
        };
        let grand_total = Accumulator::root();
        let report = aggregate(&mut doc, "imported", &grand_total, &options);

        assert_eq!(totals_of(&doc, "imported", 0), ("", "", ""));
        assert_eq!(totals_of(&doc, "imported", 1), ("0.00", "1.00", "-1.00"));
        assert_eq!(grand_total.total(), dec("-1"));
        assert_eq!(report.nodes_rendered, 1);
        assert_eq!(report.amounts_added, 1);
        assert_eq!(report.issues.len(), 1);
    }

    const DECIMAL_MAX: &str = "79228162514264337593543950335";

    #[test]
    fn test_overflowing_node_is_left_out() {
        let mut doc = page().tree(
            "imported",
            [
                cat("Huge", &[DECIMAL_MAX, DECIMAL_MAX]),
                cat("Rent", &["-5", "20"]),
            ],
        );
        let grand_total = Accumulator::root();
        let report = aggregate(&mut doc, "imported", &grand_total, &Options::default());

        assert_eq!(totals_of(&doc, "imported", 0), ("", "", ""));
        assert_eq!(totals_of(&doc, "imported", 1), ("20.00", "5.00", "15.00"));
        assert_eq!(grand_total.total(), dec("15"));
        assert_eq!(report.nodes_rendered, 1);
        assert_eq!(report.amounts_added, 2);
        assert_eq!(
            report.issues,
            vec![Issue::Overflow {
                tree: "imported".into(),
                category: "Huge".into(),
            }]
        );
    }

    #[test]
    fn test_render_page_overflow_in_ancestor_skips_node() {
        let mut doc = page().tree(
            "imported",
            [cat("A", &[DECIMAL_MAX]), cat("B", &[DECIMAL_MAX]), cat("C", &["-1"])],
        );
        let report = render_page(&mut doc, &["imported"], &Options::default());

        let max = format!("{DECIMAL_MAX}.00");
        assert_eq!(
            totals_of(&doc, "imported", 0),
            (max.as_str(), "0.00", max.as_str())
        );
        assert_eq!(totals_of(&doc, "imported", 1), ("", "", ""));
        assert_eq!(totals_of(&doc, "imported", 2), ("0.00", "1.00", "-1.00"));
        let grand_total = doc.grand_total().unwrap();
        assert_eq!(grand_total.debit(), max);
        assert_eq!(grand_total.credit(), "1.00");
        assert_eq!(
            report.issues,
            vec![Issue::Overflow {
                tree: "imported".into(),
                category: "2.B".into(),
            }]
        );
    }

    #[test]
    fn test_render_page() {
        let mut doc = two_imported().tree("assigned", []);
        let report = render_page(&mut doc, &["imported", "assigned"], &Options::default());

        assert_eq!(labels(&doc, "imported"), vec!["1.Groceries", "2.Rent"]);
        let imported = sinks_of(&doc, "imported").unwrap();
        assert_eq!(
            (imported.debit(), imported.credit(), imported.total()),
            ("70.00", "15.00", "55.00")
        );
        let assigned = sinks_of(&doc, "assigned").unwrap();
        assert_eq!(
            (assigned.debit(), assigned.credit(), assigned.total()),
            ("0.00", "0.00", "0.00")
        );
        let grand_total = doc.grand_total().unwrap();
        assert_eq!(
            (grand_total.debit(), grand_total.credit(), grand_total.total()),
            ("70.00", "15.00", "55.00")
        );
        assert_eq!(report.trees_processed, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn test_render_page_without_assigned_tree() {
        let mut doc = two_imported();
        let report = render_page(&mut doc, &["imported", "assigned"], &Options::default());

        let grand_total = doc.grand_total().unwrap();
        assert_eq!(
            (grand_total.debit(), grand_total.credit(), grand_total.total()),
            ("70.00", "15.00", "55.00")
        );
        assert_eq!(
            report.issues,
            vec![Issue::MissingTree {
                tree: "assigned".into()
            }]
        );
    }

    #[test]
    fn test_render_page_grand_total_sums_all_trees() {
        let mut doc = page()
            .tree("imported", [cat("A", &["1.10", "-2.20"]), cat("B", &["3.30"])])
            .tree("assigned", [cat("C", &["-4.40", "1000"])]);
        render_page(&mut doc, &["imported", "assigned"], &Options::default());

        assert_eq!(doc.grand_total().unwrap().total(), "997.80");
        assert_eq!(doc.grand_total().unwrap().debit(), "1004.40");
        assert_eq!(doc.grand_total().unwrap().credit(), "6.60");
    }

    #[test]
    fn test_render_page_missing_tree_and_grand_total_sinks() {
        let mut doc = two_imported();
        doc.trees_mut()[0].set_total(None);
        doc.set_grand_total(None);
        let report = render_page(&mut doc, &["imported"], &Options::default());

        assert_eq!(totals_of(&doc, "imported", 1), ("20.00", "5.00", "15.00"));
        assert_eq!(
            report.issues,
            vec![
                Issue::MissingSink {
                    tree: Some("imported".into()),
                    category: None,
                },
                Issue::MissingSink {
                    tree: None,
                    category: None,
                },
            ]
        );
    }

    #[test]
    fn test_render_page_options() {
        let mut doc = page().tree("imported", [cat("1.Salary", &["-12,000.00", "$250"])]);
        let options = Options {
            renumber: RenumberMode::Replace,
            malformed_amounts: MalformedPolicy::Zero,
            format: AmountFormat::with_commas(true),
        };
        render_page(&mut doc, &["imported"], &options);

        assert_eq!(labels(&doc, "imported"), vec!["1.Salary"]);
        assert_eq!(
            totals_of(&doc, "imported", 0),
            ("250.00", "12,000.00", "-11,750.00")
        );
    }
}
