#![no_std]

multiversx_sc::imports!();
multiversx_sc::derive_imports!();

pub mod accrual;
pub mod cache;
pub mod config;
pub mod helpers;
pub mod positions;
pub mod snapshots;
pub mod storage;
pub mod validation;
pub mod views;

use cache::Cache;
pub use common_errors::*;
pub use common_structs::*;

/// Ledger of a peer-to-peer lending layer built on top of an underlying pool.
///
/// A relayer feeds the decoded events of the P2P protocol, one per transaction,
/// strictly in `(block, log index)` order. The ledger keeps per-market indexes,
/// rates, scaled aggregates and revenue, per-account positions, and daily and
/// hourly snapshots derived from them.
#[multiversx_sc::contract]
pub trait Indexer:
    positions::account::PositionAccountModule
    + positions::supply::PositionSupplyModule
    + positions::withdraw::PositionWithdrawModule
    + positions::borrow::PositionBorrowModule
    + positions::repay::PositionRepayModule
    + positions::liquidation::PositionLiquidationModule
    + positions::update::PositionUpdateModule
    + accrual::MarketSyncModule
    + config::ConfigModule
    + common_events::EventsModule
    + storage::Storage
    + validation::ValidationModule
    + views::ViewsModule
    + snapshots::SnapshotModule
    + helpers::LedgerMathModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + multiversx_sc_modules::only_admin::OnlyAdminModule
{
    /// Initializes the ledger.
    ///
    /// # Arguments
    /// - `protocol_name`: Name of the tracked protocol.
    ///
    /// The deployer becomes the first relayer; further relayers are managed
    /// through `addAdmin` / `removeAdmin`.
    #[init]
    fn init(&self, protocol_name: ManagedBuffer) {
        require!(!protocol_name.is_empty(), ERROR_INVALID_PROTOCOL_NAME);

        self.protocol().set(ProtocolState::new(protocol_name));
        self.last_event_cursor().set(EventCursor::default());
        self.admins().insert(self.blockchain().get_caller());
    }

    #[upgrade]
    fn upgrade(&self) {}

    /// A pool reserve was updated: new pool indexes and rates for `market`.
    ///
    /// # Arguments
    /// - `reserve_supply_index`, `reserve_borrow_index`: Pool indexes, raw at the market's index precision.
    /// - `pool_supply_rate`, `pool_borrow_rate`: Pool rates, raw at the market's index precision.
    #[endpoint(reserveUpdate)]
    fn reserve_update(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        reserve_supply_index: BigUint,
        reserve_borrow_index: BigUint,
        pool_supply_rate: BigUint,
        pool_borrow_rate: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);
        self.require_positive_index(&reserve_supply_index);
        self.require_positive_index(&reserve_borrow_index);

        let params = ReserveUpdateParams {
            event: event.clone(),
            market: market.clone(),
            reserve_supply_index,
            reserve_borrow_index,
            pool_supply_rate,
            pool_borrow_rate,
        };

        let mut cache = Cache::new(self, event);
        let outcome = self.process_reserve_update(&mut cache, &params);
        self.report_outcome(outcome, &cache.event, &market, &ManagedAddress::zero());
    }

    /// The P2P protocol published its own indexes for `market`.
    #[endpoint(p2pIndexesUpdated)]
    fn p2p_indexes_updated(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        pool_supply_index: BigUint,
        p2p_supply_index: BigUint,
        pool_borrow_index: BigUint,
        p2p_borrow_index: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);
        self.require_positive_index(&pool_supply_index);
        self.require_positive_index(&pool_borrow_index);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_p2p_indexes_updated(
            &mut cache,
            &market,
            &pool_supply_index,
            &p2p_supply_index,
            &pool_borrow_index,
            &p2p_borrow_index,
        );
        self.report_outcome(outcome, &cache.event, &market, &ManagedAddress::zero());
    }

    #[endpoint(p2pSupplyDeltaUpdated)]
    fn p2p_supply_delta_updated(&self, event: EventMeta<Self::Api>, market: ManagedAddress, p2p_supply_delta: BigUint) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_p2p_delta_updated(
            &mut cache,
            &market,
            PositionSide::Collateral,
            &p2p_supply_delta,
        );
        self.report_outcome(outcome, &cache.event, &market, &ManagedAddress::zero());
    }

    #[endpoint(p2pBorrowDeltaUpdated)]
    fn p2p_borrow_delta_updated(&self, event: EventMeta<Self::Api>, market: ManagedAddress, p2p_borrow_delta: BigUint) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_p2p_delta_updated(
            &mut cache,
            &market,
            PositionSide::Borrower,
            &p2p_borrow_delta,
        );
        self.report_outcome(outcome, &cache.event, &market, &ManagedAddress::zero());
    }

    /// Also relayed for the protocol's `P2PTotalsUpdated` event.
    #[endpoint(p2pAmountsUpdated)]
    fn p2p_amounts_updated(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        p2p_supply_amount: BigUint,
        p2p_borrow_amount: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome =
            self.process_p2p_amounts_updated(&mut cache, &market, &p2p_supply_amount, &p2p_borrow_amount);
        self.report_outcome(outcome, &cache.event, &market, &ManagedAddress::zero());
    }

    #[endpoint(idleSupplyUpdated)]
    fn idle_supply_updated(&self, event: EventMeta<Self::Api>, market: ManagedAddress, idle_supply: BigUint) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_idle_supply_updated(&mut cache, &market, &idle_supply);
        self.report_outcome(outcome, &cache.event, &market, &ManagedAddress::zero());
    }

    /// `account` supplied `amount` underlying to `market`.
    ///
    /// # Arguments
    /// - `amount`: Underlying supplied, raw at the asset decimals.
    /// - `balance_on_pool`, `balance_in_p2p`: Scaled supply balances of the account after the event.
    #[endpoint(supplied)]
    fn supplied(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        account: ManagedAddress,
        amount: BigUint,
        balance_on_pool: BigUint,
        balance_in_p2p: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_supplied(
            &mut cache,
            &market,
            &account,
            &amount,
            &balance_on_pool,
            &balance_in_p2p,
        );
        self.report_outcome(outcome, &cache.event, &market, &account);
    }

    #[endpoint(withdrawn)]
    fn withdrawn(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        account: ManagedAddress,
        amount: BigUint,
        balance_on_pool: BigUint,
        balance_in_p2p: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_withdrawn(
            &mut cache,
            &market,
            &account,
            &amount,
            &balance_on_pool,
            &balance_in_p2p,
        );
        self.report_outcome(outcome, &cache.event, &market, &account);
    }

    #[endpoint(borrowed)]
    fn borrowed(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        account: ManagedAddress,
        amount: BigUint,
        balance_on_pool: BigUint,
        balance_in_p2p: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_borrowed(
            &mut cache,
            &market,
            &account,
            &amount,
            &balance_on_pool,
            &balance_in_p2p,
        );
        self.report_outcome(outcome, &cache.event, &market, &account);
    }

    #[endpoint(repaid)]
    fn repaid(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        account: ManagedAddress,
        amount: BigUint,
        balance_on_pool: BigUint,
        balance_in_p2p: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_repaid(
            &mut cache,
            &market,
            &account,
            &amount,
            &balance_on_pool,
            &balance_in_p2p,
        );
        self.report_outcome(outcome, &cache.event, &market, &account);
    }

    /// `liquidator` repaid `amount_repaid` of `borrower`'s debt in `debt_market`
    /// and seized `amount_seized` of collateral in `collateral_market`.
    #[allow(clippy::too_many_arguments)]
    #[endpoint(liquidated)]
    fn liquidated(
        &self,
        event: EventMeta<Self::Api>,
        liquidator: ManagedAddress,
        borrower: ManagedAddress,
        debt_market: ManagedAddress,
        amount_repaid: BigUint,
        collateral_market: ManagedAddress,
        amount_seized: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_liquidated(
            &mut cache,
            &collateral_market,
            &debt_market,
            &liquidator,
            &borrower,
            &amount_seized,
            &amount_repaid,
        );
        self.report_outcome(outcome, &cache.event, &collateral_market, &borrower);
    }

    #[endpoint(supplierPositionUpdated)]
    fn supplier_position_updated(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        account: ManagedAddress,
        balance_on_pool: BigUint,
        balance_in_p2p: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_supplier_position_updated(
            &mut cache,
            &market,
            &account,
            &balance_on_pool,
            &balance_in_p2p,
        );
        self.report_outcome(outcome, &cache.event, &market, &account);
    }

    #[endpoint(borrowerPositionUpdated)]
    fn borrower_position_updated(
        &self,
        event: EventMeta<Self::Api>,
        market: ManagedAddress,
        account: ManagedAddress,
        balance_on_pool: BigUint,
        balance_in_p2p: BigUint,
    ) {
        self.require_caller_is_admin();
        self.require_event_in_order(&event);

        let mut cache = Cache::new(self, event);
        let outcome = self.process_borrower_position_updated(
            &mut cache,
            &market,
            &account,
            &balance_on_pool,
            &balance_in_p2p,
        );
        self.report_outcome(outcome, &cache.event, &market, &account);
    }
}
