use common_structs::{AccountState, ActorRole, NotFound};

use crate::{cache::Cache, storage};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait PositionAccountModule: storage::Storage {
    /// Loads the account of `address`, registering it on first sight.
    ///
    /// A new account counts as a new unique user of the protocol.
    fn get_or_create_account(
        &self,
        cache: &mut Cache<Self>,
        address: &ManagedAddress,
    ) -> AccountState {
        let mapper = self.account(address);
        if mapper.is_empty() {
            cache.protocol.cumulative_unique_users += 1;
            return AccountState::default();
        }

        mapper.get()
    }

    fn require_account(&self, address: &ManagedAddress) -> Result<AccountState, NotFound> {
        let mapper = self.account(address);
        if mapper.is_empty() {
            return Err(NotFound::Account);
        }

        Ok(mapper.get())
    }

    fn store_account(&self, address: &ManagedAddress, account: &AccountState) {
        self.account(address).set(account);
    }

    /// Records `address` as having acted in `role`; the matching protocol
    /// counter moves only the first time.
    fn record_unique_actor(&self, cache: &mut Cache<Self>, role: ActorRole, address: &ManagedAddress) {
        if !self.actors(role).insert(address.clone()) {
            return;
        }

        let protocol = &mut cache.protocol;
        match role {
            ActorRole::Depositor => protocol.cumulative_unique_depositors += 1,
            ActorRole::Borrower => protocol.cumulative_unique_borrowers += 1,
            ActorRole::Liquidator => protocol.cumulative_unique_liquidators += 1,
            ActorRole::Liquidatee => protocol.cumulative_unique_liquidatees += 1,
        }
    }
}
