use common_structs::{ActorRole, EventKind, NotFound, PositionSide, Updated};

use crate::{
    accrual,
    cache::{Cache, MarketCache},
    helpers, snapshots, storage,
};

use super::{account, update};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait PositionLiquidationModule:
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
    /// Records a liquidation of `borrower` by `liquidator`.
    ///
    /// Volumes are booked on the collateral market. Balances are left to the
    /// Withdrawn and Repaid events that accompany every liquidation.
    ///
    /// # Arguments
    /// - `collateral_market`: Market the collateral was seized from.
    /// - `debt_market`: Market the debt was repaid to.
    /// - `amount_seized`: Collateral seized, at the collateral asset decimals.
    /// - `amount_repaid`: Debt repaid, at the debt asset decimals.
    ///
    /// # Errors
    /// - `NotFound::Market` if either market is unknown.
    #[allow(clippy::too_many_arguments)]
    fn process_liquidated(
        &self,
        cache: &mut Cache<Self>,
        collateral_market: &ManagedAddress,
        debt_market: &ManagedAddress,
        liquidator: &ManagedAddress,
        borrower: &ManagedAddress,
        amount_seized: &BigUint,
        amount_repaid: &BigUint,
    ) -> Result<Updated, NotFound> {
        if self.market(debt_market).is_empty() {
            return Err(NotFound::Market);
        }

        let debt = self.market(debt_market).get();
        let repaid = self.to_decimal(amount_repaid.clone(), debt.asset_decimals);
        let repaid_usd = self.to_usd(&repaid, &debt.price_usd);

        let mut market = MarketCache::load(self, collateral_market)?;
        let seized = self.to_decimal(amount_seized.clone(), market.asset_decimals);
        let seized_usd = self.to_usd(&seized, &market.price_usd);
        let profit_usd = self.signed_difference(&seized_usd, &repaid_usd);

        market.cumulative_liquidate_usd += &seized_usd;
        market.counters.liquidation_count += 1;
        cache.protocol.cumulative_liquidate_usd += &seized_usd;
        cache.protocol.liquidation_count += 1;

        let mut liquidator_state = self.get_or_create_account(cache, liquidator);
        liquidator_state.liquidate_count += 1;
        self.store_account(liquidator, &liquidator_state);
        self.record_unique_actor(cache, ActorRole::Liquidator, liquidator);

        let mut borrower_state = self.get_or_create_account(cache, borrower);
        borrower_state.liquidation_count += 1;
        self.store_account(borrower, &borrower_state);
        self.record_unique_actor(cache, ActorRole::Liquidatee, borrower);

        self.mark_liquidated_position(borrower, collateral_market, PositionSide::Collateral);
        self.mark_liquidated_position(borrower, debt_market, PositionSide::Borrower);

        self.finalize_market(cache, &mut market);
        self.record_market_volume(&market, &cache.event, EventKind::Liquidator, &seized, &seized_usd);
        self.record_financials_volume(&cache.protocol, &cache.event, EventKind::Liquidator, &seized_usd);
        self.record_usage(&cache.protocol, &cache.event, EventKind::Liquidator, liquidator);
        self.record_passive_usage(&cache.protocol, &cache.event, EventKind::Liquidatee, borrower);

        self.liquidation_event(
            collateral_market,
            debt_market,
            liquidator,
            borrower,
            &seized_usd,
            &profit_usd,
        );

        Ok(Updated::Market)
    }

    // positions already closed by the accompanying events are left alone
    fn mark_liquidated_position(
        &self,
        borrower: &ManagedAddress,
        market: &ManagedAddress,
        side: PositionSide,
    ) {
        if let Ok(mut position) = self.find_open_position(borrower, market, side) {
            self.bump_position_event_count(&mut position, EventKind::Liquidatee);
            self.store_position(&position);
        }
    }
}
