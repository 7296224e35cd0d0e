//! These structs provide the CLI interface for the rollup CLI.

use crate::engine::{MalformedPolicy, RenumberMode};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// rollup: Renumbers categories and rolls up totals of a bank transaction results page.
///
/// A results page lists imported bank transactions in two category trees: "imported" holds the
/// transactions that were not assigned to an account yet, grouped by counterparty, and "assigned"
/// holds the ones that were, grouped by account. rollup numbers the categories of each tree and
/// fills in the debit, credit and total of every category, of every tree and of the whole page.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a config file with the default settings.
    ///
    /// The file is written to --config if given, otherwise to the default location, which is
    /// `rollup/config.json` inside your platform's config directory.
    Init(InitArgs),
    /// Renumber and roll up a results page given as JSON.
    Render(RenderArgs),
    /// Build a results page from a CSV file of transactions.
    ///
    /// Transactions with an account code go to the "assigned" tree, grouped by account. The others
    /// go to the "imported" tree, grouped by relation name.
    Group(GroupArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The config file. Defaults to rollup/config.json in your platform's config directory, and
    /// to built-in settings if that does not exist.
    #[arg(long, env = "ROLLUP_CONFIG")]
    config: Option<PathBuf>,
}

impl Common {
    pub fn new(log_level: LevelFilter, config: Option<PathBuf>) -> Self {
        Self { log_level, config }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }
}

/// Command line settings that take precedence over the config file.
#[derive(Debug, Default, Parser, Clone)]
pub struct Overrides {
    /// How to renumber category labels: "prefix" always adds a position, "replace" replaces an
    /// existing one.
    #[arg(long)]
    renumber: Option<RenumberMode>,

    /// What to do with an amount that is not a number: "zero" counts it as zero, "reject" leaves
    /// its category out of the totals.
    #[arg(long)]
    malformed_amounts: Option<MalformedPolicy>,
}

impl Overrides {
    pub fn new(renumber: Option<RenumberMode>, malformed_amounts: Option<MalformedPolicy>) -> Self {
        Self {
            renumber,
            malformed_amounts,
        }
    }

    pub fn renumber(&self) -> Option<RenumberMode> {
        self.renumber
    }

    pub fn malformed_amounts(&self) -> Option<MalformedPolicy> {
        self.malformed_amounts
    }
}

/// (Not shown): Args for the `rollup init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

impl InitArgs {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn force(&self) -> bool {
        self.force
    }
}

/// (Not shown): Args for the `rollup render` command.
#[derive(Debug, Parser, Clone)]
pub struct RenderArgs {
    /// The results page JSON to render.
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Where to write the rendered page. Printed to stdout if not given.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    #[clap(flatten)]
    overrides: Overrides,
}

impl RenderArgs {
    pub fn new(input: impl Into<PathBuf>, output: Option<PathBuf>, overrides: Overrides) -> Self {
        Self {
            input: input.into(),
            output,
            overrides,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }
}

/// (Not shown): Args for the `rollup group` command.
#[derive(Debug, Parser, Clone)]
pub struct GroupArgs {
    /// The CSV file of transactions. Columns: id, date, description, amount, relation_name,
    /// account_code, account_description
    #[arg(long, short = 't')]
    transactions: PathBuf,

    /// Where to write the results page. Printed to stdout if not given.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Also renumber and roll up the page before writing it.
    #[arg(long)]
    render: bool,

    #[clap(flatten)]
    overrides: Overrides,
}

impl GroupArgs {
    pub fn new(
        transactions: impl Into<PathBuf>,
        output: Option<PathBuf>,
        render: bool,
        overrides: Overrides,
    ) -> Self {
        Self {
            transactions: transactions.into(),
            output,
            render,
            overrides,
        }
    }

    pub fn transactions(&self) -> &Path {
        &self.transactions
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn render(&self) -> bool {
        self.render
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }
}
