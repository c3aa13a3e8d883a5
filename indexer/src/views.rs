use common_structs::{MarketSnapshot, Period, Position, PositionSide, UsageSnapshot};

use crate::{accrual, helpers, positions, snapshots, storage};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait ViewsModule:
    storage::Storage
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + helpers::LedgerMathModule
    + snapshots::SnapshotModule
    + accrual::MarketSyncModule
    + positions::account::PositionAccountModule
    + positions::update::PositionUpdateModule
{
    /// Market snapshot of day `day` (`timestamp / 86400`), if any event touched it.
    #[view(getMarketDailySnapshot)]
    fn get_market_daily_snapshot(
        &self,
        market: ManagedAddress,
        day: u64,
    ) -> OptionalValue<MarketSnapshot<Self::Api>> {
        self.stored_market_snapshot(Period::Daily, &market, day)
    }

    /// Market snapshot of hour `hour` (`timestamp / 3600`).
    #[view(getMarketHourlySnapshot)]
    fn get_market_hourly_snapshot(
        &self,
        market: ManagedAddress,
        hour: u64,
    ) -> OptionalValue<MarketSnapshot<Self::Api>> {
        self.stored_market_snapshot(Period::Hourly, &market, hour)
    }

    #[view(getUsageDailySnapshot)]
    fn get_usage_daily_snapshot(&self, day: u64) -> OptionalValue<UsageSnapshot> {
        self.stored_usage_snapshot(Period::Daily, day)
    }

    #[view(getUsageHourlySnapshot)]
    fn get_usage_hourly_snapshot(&self, hour: u64) -> OptionalValue<UsageSnapshot> {
        self.stored_usage_snapshot(Period::Hourly, hour)
    }

    /// Open position of `(account, market, side)`, empty when there is none.
    #[view(getOpenPosition)]
    fn get_open_position(
        &self,
        account: ManagedAddress,
        market: ManagedAddress,
        side: PositionSide,
    ) -> OptionalValue<Position<Self::Api>> {
        match self.find_open_position(&account, &market, side) {
            Ok(position) => OptionalValue::Some(position),
            Err(_) => OptionalValue::None,
        }
    }

    /// USD value (WAD) of the open position of `(account, market, side)`: its
    /// scaled balances at the market's current pool and P2P indexes of the side,
    /// valued at the current price. Zero when there is no open position.
    #[view(getPositionBalanceUsd)]
    fn get_position_balance_usd(
        &self,
        account: ManagedAddress,
        market: ManagedAddress,
        side: PositionSide,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let position = match self.find_open_position(&account, &market, side) {
            Ok(position) => position,
            Err(_) => return self.wad_zero(),
        };

        let state = self.market(&market).get();
        let decimals = state.asset_decimals;
        let balance = self.scaled_to_underlying(&position.balance_on_pool, state.last_pool_index(side), decimals)
            + self.scaled_to_underlying(&position.balance_in_p2p, state.p2p_index(side), decimals);

        self.to_usd(&balance, &state.price_usd)
    }

    fn stored_market_snapshot(
        &self,
        period: Period,
        market: &ManagedAddress,
        bucket: u64,
    ) -> OptionalValue<MarketSnapshot<Self::Api>> {
        let mapper = self.market_snapshot(period, market, bucket);
        if mapper.is_empty() {
            return OptionalValue::None;
        }

        OptionalValue::Some(mapper.get())
    }

    fn stored_usage_snapshot(&self, period: Period, bucket: u64) -> OptionalValue<UsageSnapshot> {
        let mapper = self.usage_snapshot(period, bucket);
        if mapper.is_empty() {
            return OptionalValue::None;
        }

        OptionalValue::Some(mapper.get())
    }
}
