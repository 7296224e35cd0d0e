use crate::commands::{write_page, Out};
use crate::engine::{self, Report};
use crate::error::{ErrorType, IntoResult};
use crate::model::ResultsPage;
use crate::{utils, Config, Result};
use std::path::Path;
use tracing::{info, warn};

/// Reads a results page, renumbers its trees, rolls up their totals and writes it back out.
///
/// The trees named in the config are processed in order. Every problem that did not stop the pass,
/// such as an amount that is not a number, is logged and listed in the returned `Report`.
///
/// # Arguments
/// - `config` - Supplies the trees to process and the renumber and roll-up policies.
/// - `input` - The results page JSON.
/// - `output` - Where to write the rendered page. It is printed to stdout when `None`.
///
/// # Errors
/// - Returns an error if the input cannot be read or is not a results page.
/// - Returns an error if the output cannot be written.
pub async fn render(config: &Config, input: &Path, output: Option<&Path>) -> Result<Out<Report>> {
    info!("Rendering the results page at {}", input.display());
    let mut page: ResultsPage = utils::deserialize(input)
        .await
        .pub_result(ErrorType::Input)?;

    let report = engine::render_page(&mut page, config.trees(), &config.options());
    for issue in &report.issues {
        warn!("{issue}");
    }

    write_page(&page, output)
        .await
        .pub_result(ErrorType::Output)?;
    Ok(Out::new(report.summary(), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Issue, MalformedPolicy, RenumberMode};
    use crate::test::{labels, totals_of, write_file, PAGE_JSON};
    use tempfile::TempDir;

    async fn rendered(output: &Path) -> ResultsPage {
        utils::deserialize(output).await.unwrap()
    }

    #[tokio::test]
    async fn test_render() {
        let dir = TempDir::new().unwrap();
        let input = write_file(dir.path(), "page.json", PAGE_JSON);
        let output = dir.path().join("out.json");

        let out = render(&Config::default(), &input, Some(output.as_path()))
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.trees_processed, 2);
        assert_eq!(report.nodes_rendered, 2);
        assert_eq!(report.amounts_added, 4);
        assert_eq!(out.message(), report.summary());

        let page = rendered(&output).await;
        assert_eq!(labels(&page, "imported"), vec!["1.Groceries", "2.Rent"]);
        assert_eq!(totals_of(&page, "imported", 0), ("50.00", "10.00", "40.00"));
        assert_eq!(totals_of(&page, "imported", 1), ("20.00", "5.00", "15.00"));

        let tree_total = page.find_tree("imported").unwrap().total().unwrap();
        assert_eq!(tree_total.total(), "55.00");
        let empty_total = page.find_tree("assigned").unwrap().total().unwrap();
        assert_eq!(empty_total.total(), "0.00");
        let grand_total = page.grand_total().unwrap();
        assert_eq!(
            (grand_total.debit(), grand_total.credit(), grand_total.total()),
            ("70.00", "15.00", "55.00")
        );

        // The input is left alone
        let original: ResultsPage = utils::deserialize(&input).await.unwrap();
        assert_eq!(labels(&original, "imported"), vec!["Groceries", "Rent"]);
    }

    #[tokio::test]
    async fn test_render_twice_with_replace() {
        let dir = TempDir::new().unwrap();
        let input = write_file(dir.path(), "page.json", PAGE_JSON);
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        let config = Config::default().with_overrides(Some(RenumberMode::Replace), None);

        render(&config, &input, Some(first.as_path())).await.unwrap();
        render(&config, &first, Some(second.as_path())).await.unwrap();

        let page = rendered(&second).await;
        assert_eq!(labels(&page, "imported"), vec!["1.Groceries", "2.Rent"]);
    }

    #[tokio::test]
    async fn test_render_malformed_amount() {
        let dir = TempDir::new().unwrap();
        let json = PAGE_JSON.replace(r#""amount": "-10""#, r#""amount": "ten""#);
        let input = write_file(dir.path(), "page.json", &json);
        let output = dir.path().join("out.json");

        let out = render(&Config::default(), &input, Some(output.as_path()))
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(
            report.issues,
            vec![Issue::MalformedAmount {
                tree: "imported".into(),
                category: "1.Groceries".into(),
                text: "ten".into(),
            }]
        );
        let page = rendered(&output).await;
        assert_eq!(totals_of(&page, "imported", 0), ("50.00", "0.00", "50.00"));

        let config = Config::default().with_overrides(None, Some(MalformedPolicy::Reject));
        render(&config, &input, Some(output.as_path())).await.unwrap();
        let page = rendered(&output).await;
        assert_eq!(totals_of(&page, "imported", 0), ("", "", ""));
        let grand_total = page.grand_total().unwrap();
        assert_eq!(grand_total.total(), "15.00");
    }

    #[tokio::test]
    async fn test_render_bad_input() {
        let dir = TempDir::new().unwrap();
        let input = write_file(dir.path(), "page.json", "[1, 2, 3]");
        let err = render(&Config::default(), &input, None).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Input);

        let missing = dir.path().join("missing.json");
        let err = render(&Config::default(), &missing, None).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Input);
    }

    #[tokio::test]
    async fn test_render_bad_output() {
        let dir = TempDir::new().unwrap();
        let input = write_file(dir.path(), "page.json", PAGE_JSON);
        let output = dir.path().join("no").join("such").join("dir.json");
        let err = render(&Config::default(), &input, Some(output.as_path()))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Output);
    }
}
