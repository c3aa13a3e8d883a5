use common_structs::{
    MarketState, NotFound, P2PIndexParams, P2PRateParams, PositionSide, ProtocolState,
    ReserveUpdateParams, Updated,
};

use crate::{
    cache::{Cache, MarketCache},
    helpers, snapshots, storage,
};

multiversx_sc::imports!();

/// Index synchronisation of a market with its underlying pool.
///
/// Every path that moves the pool or P2P indexes funnels through
/// `accrue_interests`, so revenue and interest improvements are booked exactly
/// once per index move.
#[multiversx_sc::module]
pub trait MarketSyncModule:
    storage::Storage
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + helpers::LedgerMathModule
    + snapshots::SnapshotModule
{
    /// Books the interest generated between the stored indexes and the new ones,
    /// then advances the stored indexes.
    ///
    /// Index differences saturate at zero, so a lower index books no interest;
    /// the new indexes are stored as given.
    ///
    /// # Arguments
    /// - `cache`: Protocol state and the event being processed.
    /// - `market`: Market being synchronised.
    /// - `new_pool_supply_index`, `new_pool_borrow_index`: Pool indexes at the event.
    /// - `new_p2p_supply_index`, `new_p2p_borrow_index`: P2P indexes at the event.
    fn accrue_interests(
        &self,
        cache: &mut Cache<Self>,
        market: &mut MarketState<Self::Api>,
        new_pool_supply_index: &ManagedDecimal<Self::Api, NumDecimals>,
        new_pool_borrow_index: &ManagedDecimal<Self::Api, NumDecimals>,
        new_p2p_supply_index: &ManagedDecimal<Self::Api, NumDecimals>,
        new_p2p_borrow_index: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let decimals = market.asset_decimals;

        let pool_supply_growth =
            self.saturating_sub(new_pool_supply_index, &market.last_pool_supply_index);
        let pool_borrow_growth =
            self.saturating_sub(new_pool_borrow_index, &market.last_pool_borrow_index);
        let p2p_supply_growth =
            self.saturating_sub(new_p2p_supply_index, &market.p2p_supply_index);
        let p2p_borrow_growth =
            self.saturating_sub(new_p2p_borrow_index, &market.p2p_borrow_index);

        let pool_supply_interest =
            self.scaled_to_underlying(&market.scaled_supply_on_pool, &pool_supply_growth, decimals);
        let virtual_supply_interest =
            self.scaled_to_underlying(&market.virtual_scaled_supply, &pool_supply_growth, decimals);
        let p2p_supply_interest =
            self.scaled_to_underlying(&market.scaled_supply_in_p2p, &p2p_supply_growth, decimals);

        let pool_borrow_interest =
            self.scaled_to_underlying(&market.scaled_borrow_on_pool, &pool_borrow_growth, decimals);
        let virtual_borrow_interest =
            self.scaled_to_underlying(&market.virtual_scaled_borrow, &pool_borrow_growth, decimals);
        let p2p_borrow_interest =
            self.scaled_to_underlying(&market.scaled_borrow_in_p2p, &p2p_borrow_growth, decimals);

        let total_revenue = pool_supply_interest.clone() + p2p_supply_interest.clone();
        let protocol_revenue = self.percent_mul(&total_revenue, &market.reserve_factor);

        let price = market.price_usd.clone();
        let total_revenue_usd = self.to_usd(&total_revenue, &price);
        let protocol_revenue_usd = self.to_usd(&protocol_revenue, &price);
        let supply_revenue_usd = self.saturating_sub(&total_revenue_usd, &protocol_revenue_usd);

        let supply_improvement = self.signed_difference(&p2p_supply_interest, &virtual_supply_interest);
        let borrow_improvement = self.signed_difference(&virtual_borrow_interest, &p2p_borrow_interest);

        let interests = &mut market.interests;
        interests.pool_supply_usd += &self.to_usd(&pool_supply_interest, &price);
        interests.p2p_supply_usd += &self.to_usd(&p2p_supply_interest, &price);
        interests.pool_borrow_usd += &self.to_usd(&pool_borrow_interest, &price);
        interests.p2p_borrow_usd += &self.to_usd(&p2p_borrow_interest, &price);
        interests.pool_supply += &pool_supply_interest;
        interests.p2p_supply += &p2p_supply_interest;
        interests.pool_borrow += &pool_borrow_interest;
        interests.p2p_borrow += &p2p_borrow_interest;
        interests.p2p_supply_improvement_usd +=
            self.signed_to_usd(&supply_improvement, decimals, &price);
        interests.p2p_borrow_improvement_usd +=
            self.signed_to_usd(&borrow_improvement, decimals, &price);
        interests.p2p_supply_improvement += supply_improvement;
        interests.p2p_borrow_improvement += borrow_improvement;

        market.cumulative_total_revenue_usd += &total_revenue_usd;
        market.cumulative_supply_side_revenue_usd += &supply_revenue_usd;
        market.cumulative_protocol_side_revenue_usd += &protocol_revenue_usd;

        let protocol = &mut cache.protocol;
        protocol.cumulative_total_revenue_usd += &total_revenue_usd;
        protocol.cumulative_supply_side_revenue_usd += &supply_revenue_usd;
        protocol.cumulative_protocol_side_revenue_usd += &protocol_revenue_usd;

        market.last_pool_supply_index = new_pool_supply_index.clone();
        market.last_pool_borrow_index = new_pool_borrow_index.clone();
        market.p2p_supply_index = new_p2p_supply_index.clone();
        market.p2p_borrow_index = new_p2p_borrow_index.clone();

        self.record_market_revenue(
            market,
            &cache.event,
            &total_revenue_usd,
            &supply_revenue_usd,
            &protocol_revenue_usd,
        );
        self.record_financials_revenue(
            &cache.protocol,
            &cache.event,
            &total_revenue_usd,
            &supply_revenue_usd,
            &protocol_revenue_usd,
        );

        self.revenue_event(
            &market.market,
            &total_revenue_usd,
            &supply_revenue_usd,
            &protocol_revenue_usd,
        );
        self.p2p_indexes_updated_event(
            &market.market,
            &market.p2p_supply_index,
            &market.p2p_borrow_index,
            &market.last_pool_supply_index,
            &market.last_pool_borrow_index,
        );
    }

    /// Re-derives the reported P2P rates from the current pool rates and
    /// market parameters.
    fn update_p2p_rates(&self, market: &mut MarketState<Self::Api>) {
        let flavor = market.flavor;
        let proportion_idle = self.compute_proportion_idle(
            &market.idle_supply,
            &market.p2p_supply_amount,
            &market.p2p_supply_index,
            flavor,
        );

        let supply_params = P2PRateParams {
            pool_supply_rate: market.pool_supply_rate.clone(),
            pool_borrow_rate: market.pool_borrow_rate.clone(),
            pool_index: market.reserve_supply_index.clone(),
            p2p_index: market.p2p_supply_index.clone(),
            p2p_index_cursor: market.p2p_index_cursor.clone(),
            reserve_factor: market.reserve_factor.clone(),
            p2p_delta: market.p2p_supply_delta.clone(),
            p2p_amount: market.p2p_supply_amount.clone(),
            proportion_idle,
        };
        // idle supply never sits on the borrow side
        let borrow_params = P2PRateParams {
            pool_index: market.reserve_borrow_index.clone(),
            p2p_index: market.p2p_borrow_index.clone(),
            p2p_delta: market.p2p_borrow_delta.clone(),
            p2p_amount: market.p2p_borrow_amount.clone(),
            proportion_idle: self.index_zero(flavor.precision()),
            ..supply_params.clone()
        };

        market.p2p_supply_rate = self.compute_p2p_supply_rate(&supply_params, flavor);
        market.p2p_borrow_rate = self.compute_p2p_borrow_rate(&borrow_params, flavor);

        self.p2p_rates_updated_event(
            &market.market,
            &market.p2p_supply_rate,
            &market.p2p_borrow_rate,
        );
    }

    /// Recomputes the underlying and USD totals of a market from its scaled
    /// aggregates and moves the protocol totals by the difference.
    fn refresh_market_totals(
        &self,
        market: &mut MarketState<Self::Api>,
        protocol: &mut ProtocolState<Self::Api>,
    ) {
        let decimals = market.asset_decimals;
        market.total_supply_on_pool = self.scaled_to_underlying(
            &market.scaled_supply_on_pool,
            &market.last_pool_supply_index,
            decimals,
        );
        market.total_supply_in_p2p = self.scaled_to_underlying(
            &market.scaled_supply_in_p2p,
            &market.p2p_supply_index,
            decimals,
        );
        market.total_borrow_on_pool = self.scaled_to_underlying(
            &market.scaled_borrow_on_pool,
            &market.last_pool_borrow_index,
            decimals,
        );
        market.total_borrow_in_p2p = self.scaled_to_underlying(
            &market.scaled_borrow_in_p2p,
            &market.p2p_borrow_index,
            decimals,
        );

        let total_supply = market.total_supply_on_pool.clone() + market.total_supply_in_p2p.clone();
        let total_borrow = market.total_borrow_on_pool.clone() + market.total_borrow_in_p2p.clone();
        let deposit_usd = self.to_usd(&total_supply, &market.price_usd);
        let borrow_usd = self.to_usd(&total_borrow, &market.price_usd);

        protocol.total_deposit_balance_usd = self.saturating_sub(
            &protocol.total_deposit_balance_usd,
            &market.total_deposit_balance_usd,
        ) + deposit_usd.clone();
        protocol.total_borrow_balance_usd = self.saturating_sub(
            &protocol.total_borrow_balance_usd,
            &market.total_borrow_balance_usd,
        ) + borrow_usd.clone();
        protocol.total_value_locked_usd = protocol.total_deposit_balance_usd.clone();

        market.total_deposit_balance_usd = deposit_usd;
        market.total_borrow_balance_usd = borrow_usd;
    }

    /// Totals, then the market and financials snapshots of the event's buckets.
    fn finalize_market(&self, cache: &mut Cache<Self>, market: &mut MarketState<Self::Api>) {
        self.refresh_market_totals(market, &mut cache.protocol);
        self.refresh_market_snapshots(market, &cache.event);
        self.refresh_financials_snapshot(&cache.protocol, &cache.event);
    }

    /// Applies a pool reserve update: stores the pool indexes and rates, derives
    /// the P2P indexes from the growth since the last accrual and books the
    /// interest accrued in between.
    fn process_reserve_update(
        &self,
        cache: &mut Cache<Self>,
        params: &ReserveUpdateParams<Self::Api>,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, &params.market)?;
        let flavor = market.flavor;
        let precision = flavor.precision();

        market.reserve_supply_index = self.to_decimal(params.reserve_supply_index.clone(), precision);
        market.reserve_borrow_index = self.to_decimal(params.reserve_borrow_index.clone(), precision);
        market.pool_supply_rate = self.to_decimal(params.pool_supply_rate.clone(), precision);
        market.pool_borrow_rate = self.to_decimal(params.pool_borrow_rate.clone(), precision);
        market.last_reserve_update = cache.timestamp();

        let factors = self.compute_growth_factors(
            &market.reserve_supply_index,
            &market.reserve_borrow_index,
            &market.last_pool_supply_index,
            &market.last_pool_borrow_index,
            &market.p2p_index_cursor,
            &market.reserve_factor,
            flavor,
        );
        let proportion_idle = self.compute_proportion_idle(
            &market.idle_supply,
            &market.p2p_supply_amount,
            &market.p2p_supply_index,
            flavor,
        );

        let new_p2p_supply_index = self.compute_p2p_index(
            &P2PIndexParams {
                last_pool_index: market.last_pool_supply_index.clone(),
                last_p2p_index: market.p2p_supply_index.clone(),
                p2p_growth_factor: factors.p2p_supply,
                pool_growth_factor: factors.pool_supply,
                p2p_delta: market.p2p_supply_delta.clone(),
                p2p_amount: market.p2p_supply_amount.clone(),
                proportion_idle,
            },
            flavor,
        );
        let new_p2p_borrow_index = self.compute_p2p_index(
            &P2PIndexParams {
                last_pool_index: market.last_pool_borrow_index.clone(),
                last_p2p_index: market.p2p_borrow_index.clone(),
                p2p_growth_factor: factors.p2p_borrow,
                pool_growth_factor: factors.pool_borrow,
                p2p_delta: market.p2p_borrow_delta.clone(),
                p2p_amount: market.p2p_borrow_amount.clone(),
                proportion_idle: self.index_zero(precision),
            },
            flavor,
        );

        // locally derived P2P indexes never move backwards
        let new_p2p_supply_index = self.get_max(market.p2p_supply_index.clone(), new_p2p_supply_index);
        let new_p2p_borrow_index = self.get_max(market.p2p_borrow_index.clone(), new_p2p_borrow_index);

        let new_pool_supply_index = market.reserve_supply_index.clone();
        let new_pool_borrow_index = market.reserve_borrow_index.clone();
        self.accrue_interests(
            cache,
            &mut market,
            &new_pool_supply_index,
            &new_pool_borrow_index,
            &new_p2p_supply_index,
            &new_p2p_borrow_index,
        );
        self.update_p2p_rates(&mut market);
        self.finalize_market(cache, &mut market);

        self.reserve_update_event(
            &market.market,
            &market.reserve_supply_index,
            &market.reserve_borrow_index,
            &market.pool_supply_rate,
            &market.pool_borrow_rate,
            market.last_reserve_update,
        );

        Ok(Updated::Market)
    }

    /// Applies indexes reported by the P2P protocol itself. They replace the
    /// locally derived ones as published, even when lower; interest is only
    /// booked for the part above the stored indexes.
    fn process_p2p_indexes_updated(
        &self,
        cache: &mut Cache<Self>,
        market: &ManagedAddress,
        pool_supply_index: &BigUint,
        p2p_supply_index: &BigUint,
        pool_borrow_index: &BigUint,
        p2p_borrow_index: &BigUint,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, market)?;
        let precision = market.index_precision();

        let pool_supply_index = self.to_decimal(pool_supply_index.clone(), precision);
        let pool_borrow_index = self.to_decimal(pool_borrow_index.clone(), precision);
        let p2p_supply_index = self.to_decimal(p2p_supply_index.clone(), precision);
        let p2p_borrow_index = self.to_decimal(p2p_borrow_index.clone(), precision);

        self.accrue_interests(
            cache,
            &mut market,
            &pool_supply_index,
            &pool_borrow_index,
            &p2p_supply_index,
            &p2p_borrow_index,
        );
        self.update_p2p_rates(&mut market);
        self.finalize_market(cache, &mut market);

        Ok(Updated::Market)
    }

    fn process_p2p_delta_updated(
        &self,
        cache: &mut Cache<Self>,
        market: &ManagedAddress,
        side: PositionSide,
        p2p_delta: &BigUint,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, market)?;
        let delta = self.to_decimal(p2p_delta.clone(), market.asset_decimals);
        match side {
            PositionSide::Collateral => market.p2p_supply_delta = delta,
            PositionSide::Borrower => market.p2p_borrow_delta = delta,
        }

        self.update_p2p_rates(&mut market);
        self.refresh_market_snapshots(&market, &cache.event);

        let delta = match side {
            PositionSide::Collateral => &market.p2p_supply_delta,
            PositionSide::Borrower => &market.p2p_borrow_delta,
        };
        self.p2p_delta_updated_event(&market.market, side, delta);

        Ok(Updated::Market)
    }

    fn process_p2p_amounts_updated(
        &self,
        cache: &mut Cache<Self>,
        market: &ManagedAddress,
        p2p_supply_amount: &BigUint,
        p2p_borrow_amount: &BigUint,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, market)?;
        market.p2p_supply_amount = self.to_decimal(p2p_supply_amount.clone(), market.asset_decimals);
        market.p2p_borrow_amount = self.to_decimal(p2p_borrow_amount.clone(), market.asset_decimals);

        self.update_p2p_rates(&mut market);
        self.refresh_market_snapshots(&market, &cache.event);
        self.p2p_amounts_updated_event(
            &market.market,
            &market.p2p_supply_amount,
            &market.p2p_borrow_amount,
        );

        Ok(Updated::Market)
    }

    fn process_idle_supply_updated(
        &self,
        cache: &mut Cache<Self>,
        market: &ManagedAddress,
        idle_supply: &BigUint,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, market)?;
        market.idle_supply = self.to_decimal(idle_supply.clone(), market.asset_decimals);

        self.update_p2p_rates(&mut market);
        self.refresh_market_snapshots(&market, &cache.event);
        self.idle_supply_updated_event(&market.market, &market.idle_supply);

        Ok(Updated::Market)
    }
}
