use crate::engine::DisplaySinks;
use crate::model::{Amount, AmountFormat};
use rust_decimal::Decimal;
use std::cell::Cell;
use std::fmt::{Debug, Display, Formatter};

/// Running debit and credit totals for one node of a category tree.
///
/// An `Accumulator` may borrow a parent. Every amount added to it is forwarded, unchanged, to the
/// parent, which forwards it to its own parent, and so on. This way each ancestor sees each leaf
/// amount exactly once, regardless of how deep the chain is.
///
/// The totals live in `Cell`s so that a parent can be shared by any number of children for the
/// duration of one pass.
///
/// ```
/// # use ledger_rollup::engine::Accumulator;
/// # use rust_decimal::Decimal;
/// let grand_total = Accumulator::root();
/// let groceries = Accumulator::with_parent(&grand_total);
/// groceries.add(Decimal::from(100)).unwrap();
/// groceries.add(Decimal::from(-40)).unwrap();
/// assert_eq!(groceries.total(), Decimal::from(60));
/// assert_eq!(grand_total.credit(), Decimal::from(40));
/// ```
#[derive(Default)]
pub struct Accumulator<'p> {
    debit: Cell<Decimal>,
    credit: Cell<Decimal>,
    parent: Option<&'p Accumulator<'p>>,
}

impl<'p> Accumulator<'p> {
    /// Creates an accumulator with no parent, e.g. the page's grand total.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates an accumulator that forwards everything it receives to `parent`.
    pub fn with_parent(parent: &'p Accumulator<'p>) -> Self {
        Self {
            debit: Cell::new(Decimal::ZERO),
            credit: Cell::new(Decimal::ZERO),
            parent: Some(parent),
        }
    }

    /// Adds `amount` here and then to every ancestor.
    ///
    /// A negative amount is a credit of its absolute value. Anything else, zero included, is a
    /// debit.
    ///
    /// # Errors
    /// Returns `TotalOverflow`, and changes nothing, if any total in the chain would exceed the
    /// range of `Decimal`.
    pub fn add(&self, amount: Decimal) -> Result<(), TotalOverflow> {
        self.add_all([amount])
    }

    /// Adds every amount in `amounts` here and to every ancestor, or none of them.
    ///
    /// # Errors
    /// Returns `TotalOverflow`, and changes nothing, if any total in the chain would exceed the
    /// range of `Decimal`.
    pub fn add_all<I>(&self, amounts: I) -> Result<(), TotalOverflow>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let mut debit = Decimal::ZERO;
        let mut credit = Decimal::ZERO;
        for amount in amounts {
            if amount < Decimal::ZERO {
                credit = credit.checked_add(amount.abs()).ok_or(TotalOverflow)?;
            } else {
                debit = debit.checked_add(amount).ok_or(TotalOverflow)?;
            }
        }

        let mut updates = Vec::new();
        let mut next = Some(self);
        while let Some(acc) = next {
            let new_debit = acc.debit.get().checked_add(debit).ok_or(TotalOverflow)?;
            let new_credit = acc.credit.get().checked_add(credit).ok_or(TotalOverflow)?;
            updates.push((acc, new_debit, new_credit));
            next = acc.parent;
        }
        for (acc, new_debit, new_credit) in updates {
            acc.debit.set(new_debit);
            acc.credit.set(new_credit);
        }
        Ok(())
    }

    pub fn debit(&self) -> Decimal {
        self.debit.get()
    }

    pub fn credit(&self) -> Decimal {
        self.credit.get()
    }

    /// `debit - credit`, computed from the current figures.
    pub fn total(&self) -> Decimal {
        self.debit() - self.credit()
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Writes debit, credit and total into `sinks`, rounded to two places.
    pub fn update(&self, sinks: &mut DisplaySinks, format: AmountFormat) {
        sinks.set(
            Amount::new_with_format(self.debit(), format).to_string(),
            Amount::new_with_format(self.credit(), format).to_string(),
            Amount::new_with_format(self.total(), format).to_string(),
        );
    }
}

/// A debit or credit total grew beyond the range of `Decimal`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TotalOverflow;

impl Display for TotalOverflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "The totals are too large to be represented")
    }
}

impl std::error::Error for TotalOverflow {}

impl Debug for Accumulator<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accumulator")
            .field("debit", &self.debit())
            .field("credit", &self.credit())
            .field("has_parent", &self.has_parent())
            .finish()
    }
}
