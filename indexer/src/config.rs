multiversx_sc::imports!();

use crate::accrual;
use crate::cache::{Cache, MarketCache};
use crate::helpers;
use crate::snapshots;
use crate::storage;
use crate::validation;
use common_errors::*;
pub use common_events::*;

/// Market registry and parameters of the ledger.
///
/// Markets are created from the P2P protocol's market-creation events and carry
/// the parameters the rate engine needs: index flavor, asset decimals, reserve
/// factor and P2P index cursor. Parameter and pause-flag changes are relayed
/// events as well and go through the same ordering guard as balance events.
///
/// The USD price of a market is an input of the ledger, set by a relayer
/// outside the event stream.
#[multiversx_sc::module]
pub trait ConfigModule:
    storage::Storage
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + helpers::LedgerMathModule
    + snapshots::SnapshotModule
    + accrual::MarketSyncModule
    + validation::ValidationModule
    + multiversx_sc_modules::only_admin::OnlyAdminModule
{
    /// Registers a market of the P2P protocol.
    ///
    /// P2P indexes start at one index unit, the last pool indexes at the given
    /// pool indexes.
    ///
    /// # Arguments
    /// - `event`: Market-creation event.
    /// - `market`: Pool-token address identifying the market.
    /// - `underlying`: Underlying token address.
    /// - `flavor`: Index scale of the underlying pool (WAD or RAY).
    /// - `token_name`, `token_symbol`: Underlying token metadata.
    /// - `asset_decimals`: Decimals of the underlying token.
    /// - `pool_supply_index`, `pool_borrow_index`: Pool indexes at creation, raw at the flavor precision.
    /// - `reserve_factor`: Reserve share of the pool spread (BPS).
    /// - `p2p_index_cursor`: Position of the P2P rate inside the pool spread (BPS).
    ///
    /// # Errors
    /// - `ERROR_MARKET_ALREADY_EXISTS`: If the market is already registered.
    /// - `ERROR_INVALID_ASSET_DECIMALS`, `ERROR_INVALID_POOL_INDEX`,
    ///   `ERROR_INVALID_RESERVE_FACTOR`, `ERROR_INVALID_P2P_INDEX_CURSOR`: On invalid parameters.
    #[allow(clippy::too_many_arguments)]
    #[endpoint(createMarket)]
    fn create_market(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        underlying: ManagedAddress,
        flavor: IndexFlavor,
        token_name: ManagedBuffer,
        token_symbol: ManagedBuffer,
        asset_decimals: NumDecimals,
        pool_supply_index: BigUint,
        pool_borrow_index: BigUint,
        reserve_factor: BigUint,
        p2p_index_cursor: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);
        require!(!self.markets().contains(&market), ERROR_MARKET_ALREADY_EXISTS);
        self.require_asset_decimals(asset_decimals);
        self.require_positive_index(&pool_supply_index);
        self.require_positive_index(&pool_borrow_index);
        let reserve_factor = self.validate_reserve_factor(&reserve_factor);
        let p2p_index_cursor = self.validate_p2p_index_cursor(&p2p_index_cursor);

        let mut cache = Cache::new(self, event);
        let precision = flavor.precision();
        let state = MarketState::new(
            market.clone(),
            underlying.clone(),
            flavor,
            asset_decimals,
            self.to_decimal(pool_supply_index, precision),
            self.to_decimal(pool_borrow_index, precision),
            reserve_factor,
            p2p_index_cursor,
            cache.event.stamp(),
        );

        self.markets().insert(market.clone());
        self.token_metadata(&underlying).set(TokenMetadata {
            name: token_name,
            symbol: token_symbol,
            decimals: asset_decimals,
        });
        cache.protocol.total_pool_count += 1;

        self.market(&market).set(&state);
        self.refresh_market_snapshots(&state, &cache.event);

        self.market_created_event(
            &market,
            &underlying,
            flavor,
            asset_decimals,
            &state.last_pool_supply_index,
            &state.last_pool_borrow_index,
        );
    }

    #[endpoint(reserveFactorSet)]
    fn reserve_factor_set(&self, event: EventMeta<Self::Api>, market: ManagedAddress, reserve_factor: BigUint) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);
        let reserve_factor = self.validate_reserve_factor(&reserve_factor);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_market_params(&mut cache, &market, Some(reserve_factor), None);
        self.report_outcome(outcome, &cache.event, &market, &ManagedAddress::zero());
    }

    #[endpoint(p2pIndexCursorSet)]
    fn p2p_index_cursor_set(&self, event: EventMeta<Self::Api>, market: ManagedAddress, p2p_index_cursor: BigUint) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);
        let p2p_index_cursor = self.validate_p2p_index_cursor(&p2p_index_cursor);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_market_params(&mut cache, &market, None, Some(p2p_index_cursor));
        self.report_outcome(outcome, &cache.event, &market, &ManagedAddress::zero());
    }

    /// Pause and status flags of a market. They are recorded, never enforced:
    /// the ledger mirrors what the P2P protocol already accepted.
    #[endpoint(marketFlagSet)]
    fn market_flag_set(&self, event: EventMeta<Self::Api>, market: ManagedAddress, flag: MarketFlag, value: bool) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_market_flag(&mut cache, &market, flag, value);
        self.report_outcome(outcome, &cache.event, &market, &ManagedAddress::zero());
    }

    /// Sets the USD price of a market's underlying token (WAD) and revalues
    /// the market and protocol totals.
    ///
    /// # Errors
    /// - `ERROR_MARKET_NOT_FOUND`: If the market is not registered.
    /// - `ERROR_INVALID_PRICE`: If the price is zero.
    #[endpoint(setPrice)]
    fn set_price(&self, market: ManagedAddress, price_usd: BigUint) {
        self.require_caller_is_admin();
        require!(self.markets().contains(&market), ERROR_MARKET_NOT_FOUND);
        require!(price_usd > BigUint::zero(), ERROR_INVALID_PRICE);

        let mut protocol = self.protocol().get();
        let mut state = self.market(&market).get();
        state.price_usd = self.to_decimal_wad(price_usd);
        self.refresh_market_totals(&mut state, &mut protocol);

        self.market(&market).set(&state);
        self.protocol().set(&protocol);
        self.price_updated_event(&market, &state.price_usd);
    }

    fn process_market_params(
        &self,
        cache: &mut Cache<Self>,
        market: &ManagedAddress,
        reserve_factor: Option<ManagedDecimal<Self::Api, NumDecimals>>,
        p2p_index_cursor: Option<ManagedDecimal<Self::Api, NumDecimals>>,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, market)?;
        if let Some(reserve_factor) = reserve_factor {
            market.reserve_factor = reserve_factor;
        }
        if let Some(p2p_index_cursor) = p2p_index_cursor {
            market.p2p_index_cursor = p2p_index_cursor;
        }

        self.update_p2p_rates(&mut market);
        self.refresh_market_snapshots(&market, &cache.event);
        self.market_params_updated_event(
            &market.market,
            &market.reserve_factor,
            &market.p2p_index_cursor,
        );

        Ok(Updated::Market)
    }

    fn process_market_flag(
        &self,
        cache: &mut Cache<Self>,
        market: &ManagedAddress,
        flag: MarketFlag,
        value: bool,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, market)?;
        market.flags.set(flag, value);

        self.refresh_market_snapshots(&market, &cache.event);
        self.market_flags_updated_event(&market.market, flag, value);

        Ok(Updated::Market)
    }
}
