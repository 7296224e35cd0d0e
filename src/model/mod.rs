//! Types that represent the data model, such as `ResultsPage` and `BankTransaction`.
mod amount;
mod page;
mod transaction;

pub use amount::{Amount, AmountError, AmountFormat};
pub use page::{PageCategory, PageRow, PageTree, ResultsPage};
pub use transaction::{BankTransaction, Transactions, UNKNOWN_RELATION};
