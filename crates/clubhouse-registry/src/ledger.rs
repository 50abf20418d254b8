//! Creation fee and accumulated balance.
//!
//! Policy: a creation call keeps exactly the fee in effect at that moment;
//! anything paid above it is handed back as [`Charge::refund`] for the
//! transport to reimburse. The balance therefore only ever grows by fees
//! actually charged, and only shrinks through [`FeeLedger::withdraw_all`].

use clubhouse_protocol::Amount;

use crate::RegistryError;

/// Result of a successful [`FeeLedger::charge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charge {
    /// Amount added to the ledger balance.
    pub fee: Amount,
    /// Overpayment the caller is owed back.
    pub refund: Amount,
}

/// The registry-wide fee scalar and withdrawable accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeLedger {
    fee: Amount,
    balance: Amount,
}

impl FeeLedger {
    /// Creates a ledger with the given fee and an empty balance.
    pub fn new(fee: Amount) -> Self {
        Self { fee, balance: 0 }
    }

    /// The fee a creation call must pay right now.
    pub fn fee(&self) -> Amount {
        self.fee
    }

    /// Fees accumulated since the last withdrawal.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Replaces the fee, returning the previous one. Past charges are
    /// unaffected.
    pub fn set_fee(&mut self, fee: Amount) -> Amount {
        std::mem::replace(&mut self.fee, fee)
    }

    /// Charges a creation payment.
    ///
    /// # Errors
    /// Returns [`RegistryError::InsufficientPayment`] when `payment` is
    /// below the current fee. The balance is untouched in that case.
    pub fn charge(&mut self, payment: Amount) -> Result<Charge, RegistryError> {
        if payment < self.fee {
            return Err(RegistryError::InsufficientPayment {
                required: self.fee,
                paid: payment,
            });
        }
        // The balance never wraps.
        self.balance = self.balance.saturating_add(self.fee);
        Ok(Charge {
            fee: self.fee,
            refund: payment - self.fee,
        })
    }

    /// Takes the whole balance, leaving zero. Returns 0 when empty.
    pub fn withdraw_all(&mut self) -> Amount {
        std::mem::take(&mut self.balance)
    }
}
