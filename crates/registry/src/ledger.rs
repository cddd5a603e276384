//! External ledgers the registry moves assets and value through.
//!
//! The NFT contract and the native-value ledger are collaborators, not part of
//! the registry. Both are `Clone` so the registry can snapshot them and roll a
//! failed operation back.

use std::collections::HashMap;

use thiserror::Error;

use crate::address::{Address, TokenRef};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("token {0:?} does not exist")]
    UnknownToken(TokenRef),
    #[error("{from} does not own the token")]
    NotOwner { from: Address },
    #[error("{operator} is not approved for the token")]
    NotApproved { operator: Address },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FundsError {
    #[error("insufficient funds: {account} holds {available}, needs {required}")]
    InsufficientFunds {
        account: Address,
        available: u128,
        required: u128,
    },
    #[error("balance overflow for {0}")]
    Overflow(Address),
}

/// Non-fungible token ownership (ERC-721 style).
pub trait AssetLedger: Clone {
    fn owner_of(&self, token: &TokenRef) -> Option<Address>;

    /// Whether `operator` may move `token` on its owner's behalf.
    fn is_approved(&self, token: &TokenRef, operator: &Address) -> bool;

    /// Move `token` from `from` to `to`, acting as `operator`.
    fn transfer_from(
        &mut self,
        operator: &Address,
        from: &Address,
        to: &Address,
        token: &TokenRef,
    ) -> Result<(), AssetError>;
}

/// Native value balances.
pub trait ValueLedger: Clone {
    fn balance_of(&self, account: &Address) -> u128;

    fn transfer_value(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), FundsError>;
}

#[derive(Clone, Debug)]
struct TokenState {
    owner: Address,
    approved: Option<Address>,
}

/// In-memory NFT collection.
#[derive(Clone, Debug, Default)]
pub struct InMemoryNfts {
    tokens: HashMap<TokenRef, TokenState>,
}

impl InMemoryNfts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, token: TokenRef, owner: Address) {
        self.tokens.insert(
            token,
            TokenState {
                owner,
                approved: None,
            },
        );
    }

    /// Approve `operator` for a single token. Only the owner may approve.
    pub fn approve(
        &mut self,
        owner: &Address,
        operator: &Address,
        token: &TokenRef,
    ) -> Result<(), AssetError> {
        let state = self
            .tokens
            .get_mut(token)
            .ok_or(AssetError::UnknownToken(*token))?;
        if state.owner != *owner {
            return Err(AssetError::NotOwner { from: *owner });
        }
        state.approved = Some(*operator);
        Ok(())
    }
}

impl AssetLedger for InMemoryNfts {
    fn owner_of(&self, token: &TokenRef) -> Option<Address> {
        self.tokens.get(token).map(|state| state.owner)
    }

    fn is_approved(&self, token: &TokenRef, operator: &Address) -> bool {
        self.tokens
            .get(token)
            .map(|state| state.owner == *operator || state.approved == Some(*operator))
            .unwrap_or(false)
    }

    fn transfer_from(
        &mut self,
        operator: &Address,
        from: &Address,
        to: &Address,
        token: &TokenRef,
    ) -> Result<(), AssetError> {
        let state = self
            .tokens
            .get_mut(token)
            .ok_or(AssetError::UnknownToken(*token))?;
        if state.owner != *from {
            return Err(AssetError::NotOwner { from: *from });
        }
        if state.owner != *operator && state.approved != Some(*operator) {
            return Err(AssetError::NotApproved {
                operator: *operator,
            });
        }
        state.owner = *to;
        state.approved = None;
        Ok(())
    }
}

/// In-memory value balances.
#[derive(Clone, Debug, Default)]
pub struct InMemoryFunds {
    balances: HashMap<Address, u128>,
}

impl InMemoryFunds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&mut self, account: Address, amount: u128) -> Result<(), FundsError> {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(FundsError::Overflow(account))?;
        Ok(())
    }
}

impl ValueLedger for InMemoryFunds {
    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer_value(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), FundsError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(FundsError::InsufficientFunds {
                account: *from,
                available,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(FundsError::Overflow(*to))?;

        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}
