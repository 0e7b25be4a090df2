//! Token-level validation backed directly by the relationship and NFT
//! stores.

use crate::domain::{BalanceChange, NftStore, TokenRelStore, Units};
use crate::ports::TokenValidity;
use ledger_types::{EntityNumPair, NftId, ValidityCode};

/// Applies accepted fungible/NFT changes straight into the open
/// relationship and NFT transactions. A fuller deployment would also gate
/// on token-level pause, KYC, and supply state.
pub struct LocalTokenValidity;

impl TokenValidity for LocalTokenValidity {
    fn try_token_change(
        &mut self,
        change: &BalanceChange,
        token_rels: &mut TokenRelStore,
        nfts: &mut NftStore,
    ) -> ValidityCode {
        match change.units {
            Units::Fungible { token } => {
                let key = EntityNumPair::account_token(change.account, token);
                let Some(mut rel) = token_rels.get_for_mutation(&key) else {
                    return ValidityCode::TokenNotAssociated;
                };
                if rel.frozen {
                    return ValidityCode::FailInvalid;
                }
                let new_balance = rel.balance + change.amount;
                if new_balance < 0 {
                    return ValidityCode::InsufficientTokenBalance;
                }
                rel.balance = new_balance;
                token_rels.put(key, rel);
                ValidityCode::Ok
            }
            Units::Nft { token, serial } => {
                let id = NftId::new(token, serial);
                let Some(mut nft) = nfts.get_for_mutation(&id) else {
                    return ValidityCode::InvalidNftId;
                };
                if nft.owner != change.account {
                    return ValidityCode::SenderDoesNotOwnNft;
                }
                let Some(receiver) = change.counterparty else {
                    return ValidityCode::FailInvalid;
                };
                nft.owner = receiver;
                // Any per-serial spender approval dies with the transfer.
                nft.spender = 0;
                nfts.put(id, nft);
                ValidityCode::Ok
            }
            // Hbar changes never route here.
            Units::Hbar => ValidityCode::FailInvalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_store::adapters::InMemoryStore;
    use ledger_store::TransactionalStore;
    use ledger_types::{Nft, TokenRelationship};

    fn open_stores() -> (TokenRelStore, NftStore) {
        let mut rels_backing = InMemoryStore::new();
        rels_backing.put_direct(
            EntityNumPair::account_token(1, 7),
            TokenRelationship::with_balance(40),
        );
        let mut nfts_backing = InMemoryStore::new();
        let mut nft = Nft::owned_by(1);
        nft.spender = 77;
        nfts_backing.put_direct(NftId::new(9, 5), nft);

        let mut token_rels = TransactionalStore::new("token-rels", Box::new(rels_backing));
        let mut nfts = TransactionalStore::new("nfts", Box::new(nfts_backing));
        token_rels.begin();
        nfts.begin();
        (token_rels, nfts)
    }

    #[test]
    fn test_fungible_change_applied_in_transaction() {
        let (mut token_rels, mut nfts) = open_stores();
        let mut validity = LocalTokenValidity;

        let code =
            validity.try_token_change(&BalanceChange::fungible(7, 1, -15), &mut token_rels, &mut nfts);
        assert!(code.is_ok());
        let key = EntityNumPair::account_token(1, 7);
        assert_eq!(token_rels.get(&key).unwrap().balance, 25);
        // Nothing committed yet.
        assert_eq!(token_rels.committed(&key).unwrap().balance, 40);
    }

    #[test]
    fn test_fungible_rejections() {
        let (mut token_rels, mut nfts) = open_stores();
        let mut validity = LocalTokenValidity;

        assert_eq!(
            validity.try_token_change(&BalanceChange::fungible(7, 2, -5), &mut token_rels, &mut nfts),
            ValidityCode::TokenNotAssociated
        );
        assert_eq!(
            validity.try_token_change(&BalanceChange::fungible(7, 1, -41), &mut token_rels, &mut nfts),
            ValidityCode::InsufficientTokenBalance
        );
    }

    #[test]
    fn test_nft_transfer_moves_owner_and_clears_spender() {
        let (mut token_rels, mut nfts) = open_stores();
        let mut validity = LocalTokenValidity;

        let code =
            validity.try_token_change(&BalanceChange::nft(9, 5, 1, 2), &mut token_rels, &mut nfts);
        assert!(code.is_ok());
        let moved = nfts.get(&NftId::new(9, 5)).unwrap();
        assert_eq!(moved.owner, 2);
        assert_eq!(moved.spender, 0);
    }

    #[test]
    fn test_nft_rejections() {
        let (mut token_rels, mut nfts) = open_stores();
        let mut validity = LocalTokenValidity;

        assert_eq!(
            validity.try_token_change(&BalanceChange::nft(9, 6, 1, 2), &mut token_rels, &mut nfts),
            ValidityCode::InvalidNftId
        );
        assert_eq!(
            validity.try_token_change(&BalanceChange::nft(9, 5, 3, 2), &mut token_rels, &mut nfts),
            ValidityCode::SenderDoesNotOwnNft
        );
    }
}
