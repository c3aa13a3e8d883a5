use common_structs::{EventKind, NotFound, PositionSide, Updated};

use crate::{accrual, cache::Cache, helpers, snapshots, storage};

use super::{account, update};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait PositionWithdrawModule:
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
    /// Records a withdrawal of `amount` underlying from the open supply position
    /// of `account`. The position closes when nothing is left.
    fn process_withdrawn(
        &self,
        cache: &mut Cache<Self>,
        market: &ManagedAddress,
        account: &ManagedAddress,
        amount: &BigUint,
        balance_on_pool: &BigUint,
        balance_in_p2p: &BigUint,
    ) -> Result<Updated, NotFound> {
        self.decrease_position(
            cache,
            EventKind::Withdraw,
            PositionSide::Collateral,
            market,
            account,
            amount,
            balance_on_pool,
            balance_in_p2p,
        )
    }
}
