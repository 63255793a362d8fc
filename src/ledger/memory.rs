use std::collections::HashMap;

use log::trace;

use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::{Address, Amount, AssetId, AssetLedger};

/// In-memory multi-asset ledger with ERC-20 style allowances.
///
/// Cloning produces an independent snapshot, which is what the host runtime
/// relies on to roll back a failed transaction.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: HashMap<(AssetId, Address), Amount>,
    allowances: HashMap<(AssetId, Address, Address), Amount>, // asset, owner, spender
    supply: HashMap<AssetId, Amount>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new units of `asset` in `to`'s balance
    pub fn mint(&mut self, asset: &AssetId, to: &Address, amount: Amount) -> LedgerResult<()> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let supply = self.supply.get(asset).copied().unwrap_or(0);
        let new_supply = supply.checked_add(amount).ok_or(LedgerError::Overflow)?;
        let new_balance = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.supply.insert(asset.clone(), new_supply);
        self.balances.insert((asset.clone(), *to), new_balance);
        trace!("Minted {} {} to {}", amount, asset, to);
        Ok(())
    }

    /// Allow `spender` to pull up to `amount` of `owner`'s `asset`. Replaces any
    /// previous allowance.
    pub fn approve(&mut self, asset: &AssetId, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances
            .insert((asset.clone(), *owner, *spender), amount);
    }

    pub fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(asset.clone(), *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self, asset: &AssetId) -> Amount {
        self.supply.get(asset).copied().unwrap_or(0)
    }

    fn move_balance(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        let from_balance = self.balance_of(asset, from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.clone(),
                have: from_balance,
                need: amount,
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }

        let to_balance = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        // Both checks passed, apply together
        self.balances
            .insert((asset.clone(), *from), from_balance - amount);
        self.balances.insert((asset.clone(), *to), to_balance);
        trace!("Moved {} {} from {} to {}", amount, asset, from, to);
        Ok(())
    }
}

impl AssetLedger for MemoryLedger {
    fn balance_of(&self, asset: &AssetId, holder: &Address) -> Amount {
        self.balances
            .get(&(asset.clone(), *holder))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.move_balance(asset, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        let allowed = self.allowance(asset, from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset: asset.clone(),
                have: allowed,
                need: amount,
            });
        }

        self.move_balance(asset, from, to, amount)?;
        if amount > 0 {
            self.allowances
                .insert((asset.clone(), *from, *spender), allowed - amount);
        }
        Ok(())
    }
}
