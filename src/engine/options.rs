use crate::engine::RenumberMode;
use crate::model::AmountFormat;
use serde::{Deserialize, Serialize};

/// What to do with amount text that is not a number.
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
pub enum MalformedPolicy {
    /// Count the amount as zero and keep going.
    #[default]
    Zero,
    /// Leave the whole category out of every total and do not render it.
    Reject,
}

serde_plain::derive_display_from_serialize!(MalformedPolicy);
serde_plain::derive_fromstr_from_deserialize!(MalformedPolicy);

/// Settings for one renumber and roll-up pass.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Options {
    pub renumber: RenumberMode,
    pub malformed_amounts: MalformedPolicy,
    pub format: AmountFormat,
}
