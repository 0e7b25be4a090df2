//! # BalanceChange
//!
//! The unit of transfer intent. A validated transaction becomes an ordered
//! list of these; they live for exactly one [`TransferLogic`] invocation and
//! are never persisted.
//!
//! [`TransferLogic`]: crate::domain::TransferLogic

use ledger_types::EntityNum;

/// What kind of value a change moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Units {
    Hbar,
    Fungible { token: EntityNum },
    Nft { token: EntityNum, serial: u64 },
}

/// One signed adjustment against one account.
///
/// For NFT changes `account` is the sender, `counterparty` the receiver and
/// `amount` is unused. An approval-flagged change spends `payer`'s allowance
/// granted by `account` rather than `account`'s own authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceChange {
    pub account: EntityNum,
    pub counterparty: Option<EntityNum>,
    pub units: Units,
    pub amount: i64,
    pub is_approval: bool,
    pub payer: EntityNum,
    /// Alias bytes for a target not yet bound to an account id. Present only
    /// until auto-creation rewrites `account`.
    pub alias: Option<Vec<u8>>,
}

impl BalanceChange {
    pub fn hbar(account: EntityNum, amount: i64) -> Self {
        Self {
            account,
            counterparty: None,
            units: Units::Hbar,
            amount,
            is_approval: false,
            payer: account,
            alias: None,
        }
    }

    /// Hbar debit spending an allowance `account` granted to `payer`.
    pub fn hbar_approved(account: EntityNum, amount: i64, payer: EntityNum) -> Self {
        Self {
            is_approval: true,
            payer,
            ..Self::hbar(account, amount)
        }
    }

    /// Hbar credit to an alias not yet bound to an account.
    pub fn hbar_to_alias(alias: Vec<u8>, amount: i64) -> Self {
        Self {
            alias: Some(alias),
            ..Self::hbar(0, amount)
        }
    }

    pub fn fungible(token: EntityNum, account: EntityNum, amount: i64) -> Self {
        Self {
            units: Units::Fungible { token },
            ..Self::hbar(account, amount)
        }
    }

    pub fn fungible_approved(
        token: EntityNum,
        account: EntityNum,
        amount: i64,
        payer: EntityNum,
    ) -> Self {
        Self {
            is_approval: true,
            payer,
            ..Self::fungible(token, account, amount)
        }
    }

    pub fn nft(token: EntityNum, serial: u64, from: EntityNum, to: EntityNum) -> Self {
        Self {
            account: from,
            counterparty: Some(to),
            units: Units::Nft { token, serial },
            amount: 0,
            is_approval: false,
            payer: from,
            alias: None,
        }
    }

    pub fn nft_approved(
        token: EntityNum,
        serial: u64,
        from: EntityNum,
        to: EntityNum,
        payer: EntityNum,
    ) -> Self {
        Self {
            is_approval: true,
            payer,
            ..Self::nft(token, serial, from, to)
        }
    }

    pub fn is_hbar(&self) -> bool {
        self.units == Units::Hbar
    }

    /// Bind an auto-created account id and drop the alias.
    pub fn resolve_alias_to(&mut self, account: EntityNum) {
        self.account = account;
        self.alias = None;
    }

    /// Deduct a charged fee from the aggregated credit amount.
    pub fn deduct_fee(&mut self, fee: i64) {
        self.amount -= fee;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_resolution_rewrites_target() {
        let mut change = BalanceChange::hbar_to_alias(vec![0xAB, 0xCD], 500);
        assert!(change.alias.is_some());

        change.resolve_alias_to(1234);
        assert_eq!(change.account, 1234);
        assert!(change.alias.is_none());
    }

    #[test]
    fn test_fee_deduction_shrinks_credit() {
        let mut change = BalanceChange::hbar_to_alias(vec![0x01], 500);
        change.deduct_fee(75);
        assert_eq!(change.amount, 425);
    }

    #[test]
    fn test_approved_change_carries_spender() {
        let change = BalanceChange::hbar_approved(10, -100, 77);
        assert!(change.is_approval);
        assert_eq!(change.payer, 77);
        assert_eq!(change.account, 10);
    }
}
