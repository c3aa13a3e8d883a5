use common_structs::{EventKind, NotFound, PositionSide, Updated};

use crate::{accrual, cache::Cache, helpers, snapshots, storage};

use super::{account, update};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait PositionRepayModule:
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
    fn process_repaid(
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
            EventKind::Repay,
            PositionSide::Borrower,
            market,
            account,
            amount,
            balance_on_pool,
            balance_in_p2p,
        )
    }
}
