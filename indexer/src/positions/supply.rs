use common_structs::{EventKind, NotFound, PositionSide, Updated};

use crate::{accrual, cache::Cache, helpers, snapshots, storage};

use super::{account, update};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait PositionSupplyModule:
    storage::Storage
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + helpers::LedgerMathModule
    + snapshots::SnapshotModule
    + accrual::MarketSyncModule
    + account::PositionAccountModule
    + update::PositionUpdateModule
{
    /// Records a supply of `amount` underlying by `account`.
    ///
    /// `balance_on_pool` and `balance_in_p2p` are the account's scaled supply
    /// balances after the supply, as reported by the event.
    fn process_supplied(
        &self,
        cache: &mut Cache<Self>,
        market: &ManagedAddress,
        account: &ManagedAddress,
        amount: &BigUint,
        balance_on_pool: &BigUint,
        balance_in_p2p: &BigUint,
    ) -> Result<Updated, NotFound> {
        self.increase_position(
            cache,
            EventKind::Deposit,
            PositionSide::Collateral,
            market,
            account,
            amount,
            balance_on_pool,
            balance_in_p2p,
        )
    }

    fn process_supplier_position_updated(
        &self,
        cache: &mut Cache<Self>,
        market: &ManagedAddress,
        account: &ManagedAddress,
        balance_on_pool: &BigUint,
        balance_in_p2p: &BigUint,
    ) -> Result<Updated, NotFound> {
        self.sync_position(
            cache,
            EventKind::SupplierPositionUpdate,
            PositionSide::Collateral,
            market,
            account,
            balance_on_pool,
            balance_in_p2p,
        )
    }
}
