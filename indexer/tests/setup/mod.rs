#![allow(dead_code)]

use crate::constants::*;

use indexer::{config::ConfigModule, storage::Storage, *};
use multiversx_sc::api::ManagedTypeApi;
use multiversx_sc::types::{
    BigUint, ManagedAddress, ManagedBuffer, ManagedDecimal, NumDecimals, TestAddress,
};
use multiversx_sc_modules::only_admin::OnlyAdminModule;
use multiversx_sc_scenario::{imports::{ExpectMessage, ExpectStatus}, DebugApi, ScenarioTxWhitebox, ScenarioWorld};

pub fn world() -> ScenarioWorld {
    let mut blockchain = ScenarioWorld::new();

    blockchain.register_contract(INDEXER_PATH, indexer::ContractBuilder);

    blockchain
}

pub fn big<M: ManagedTypeApi>(value: u128) -> BigUint<M> {
    BigUint::from(value)
}

pub fn assert_raw(value: &ManagedDecimal<DebugApi, NumDecimals>, expected: u128, what: &str) {
    assert_eq!(value.into_raw_units(), &big::<DebugApi>(expected), "{what}");
}

fn event_meta<M: ManagedTypeApi>(block_number: u64, timestamp: u64, log_index: u64) -> EventMeta<M> {
    let mut tx_hash = [0u8; 16];
    tx_hash[..8].copy_from_slice(&block_number.to_be_bytes());
    tx_hash[8..].copy_from_slice(&log_index.to_be_bytes());

    EventMeta::new(ManagedBuffer::from(&tx_hash[..]), block_number, timestamp, log_index)
}

/// Relays events to a freshly deployed ledger, advancing `(block, log index)`
/// on every call.
pub struct IndexerTestState {
    pub world: ScenarioWorld,
    pub block_number: u64,
    pub timestamp: u64,
    pub log_index: u64,
}

impl IndexerTestState {
    pub fn new() -> Self {
        let mut world = world();
        world.account(OWNER_ADDRESS).nonce(1);
        world.account(RELAYER_ADDRESS).nonce(1);
        world.account(STRANGER_ADDRESS).nonce(1);
        world.current_block().block_timestamp(START_TIMESTAMP);

        world
            .tx()
            .from(OWNER_ADDRESS)
            .raw_deploy()
            .code(INDEXER_PATH)
            .new_address(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.init(ManagedBuffer::from(PROTOCOL_NAME));
            });

        world
            .tx()
            .from(OWNER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.add_admin(RELAYER_ADDRESS.to_managed_address());
            });

        Self {
            world,
            block_number: 1,
            timestamp: START_TIMESTAMP,
            log_index: 0,
        }
    }

    /// New state with a WAD-indexed USDC market at pool indexes of one and a
    /// USDC price of one dollar.
    pub fn with_usdc_market() -> Self {
        let mut state = Self::new();
        state.create_market(
            USDC_MARKET,
            USDC_UNDERLYING,
            IndexFlavor::Wad,
            USDC_DECIMALS,
            WAD,
            WAD,
        );
        state.set_price(USDC_MARKET, WAD);
        state
    }

    /// Moves to the next block, `seconds` later.
    pub fn advance_time(&mut self, seconds: u64) {
        self.block_number += 1;
        self.timestamp += seconds;
        self.log_index = 0;
        self.world.current_block().block_timestamp(self.timestamp);
    }

    fn next_event(&mut self) -> (u64, u64, u64) {
        self.log_index += 1;
        (self.block_number, self.timestamp, self.log_index)
    }

    pub fn create_market(
        &mut self,
        market: TestAddress,
        underlying: TestAddress,
        flavor: IndexFlavor,
        asset_decimals: usize,
        pool_supply_index: u128,
        pool_borrow_index: u128,
    ) {
        self.create_market_with_params(
            market,
            underlying,
            flavor,
            asset_decimals,
            pool_supply_index,
            pool_borrow_index,
            RESERVE_FACTOR_BPS,
            P2P_INDEX_CURSOR_BPS,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_market_with_params(
        &mut self,
        market: TestAddress,
        underlying: TestAddress,
        flavor: IndexFlavor,
        asset_decimals: usize,
        pool_supply_index: u128,
        pool_borrow_index: u128,
        reserve_factor: u64,
        p2p_index_cursor: u64,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.create_market(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    underlying.to_managed_address(),
                    flavor,
                    ManagedBuffer::from(b"Token"),
                    ManagedBuffer::from(b"TKN"),
                    asset_decimals,
                    big(pool_supply_index),
                    big(pool_borrow_index),
                    BigUint::from(reserve_factor),
                    BigUint::from(p2p_index_cursor),
                );
            });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_market_expect_error(
        &mut self,
        market: TestAddress,
        flavor: IndexFlavor,
        asset_decimals: usize,
        pool_supply_index: u128,
        reserve_factor: u64,
        p2p_index_cursor: u64,
        message: &str,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .returns(ExpectMessage(message))
            .whitebox(indexer::contract_obj, |sc| {
                sc.create_market(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    USDC_UNDERLYING.to_managed_address(),
                    flavor,
                    ManagedBuffer::from(b"Token"),
                    ManagedBuffer::from(b"TKN"),
                    asset_decimals,
                    big(pool_supply_index),
                    big(pool_supply_index),
                    BigUint::from(reserve_factor),
                    BigUint::from(p2p_index_cursor),
                );
            });
    }

    pub fn set_price(&mut self, market: TestAddress, price_wad: u128) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.set_price(market.to_managed_address(), big(price_wad));
            });
    }

    pub fn set_reserve_factor(&mut self, market: TestAddress, reserve_factor: u64) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.reserve_factor_set(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    BigUint::from(reserve_factor),
                );
            });
    }

    pub fn set_market_flag(&mut self, market: TestAddress, flag: MarketFlag, value: bool) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.market_flag_set(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    flag,
                    value,
                );
            });
    }

    pub fn reserve_update(
        &mut self,
        market: TestAddress,
        pool_supply_index: u128,
        pool_borrow_index: u128,
        pool_supply_rate: u128,
        pool_borrow_rate: u128,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.reserve_update(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    big(pool_supply_index),
                    big(pool_borrow_index),
                    big(pool_supply_rate),
                    big(pool_borrow_rate),
                );
            });
    }

    pub fn p2p_indexes_updated(
        &mut self,
        market: TestAddress,
        pool_supply_index: u128,
        p2p_supply_index: u128,
        pool_borrow_index: u128,
        p2p_borrow_index: u128,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.p2p_indexes_updated(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    big(pool_supply_index),
                    big(p2p_supply_index),
                    big(pool_borrow_index),
                    big(p2p_borrow_index),
                );
            });
    }

    pub fn p2p_supply_delta_updated(&mut self, market: TestAddress, delta: u128) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.p2p_supply_delta_updated(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    big(delta),
                );
            });
    }

    pub fn p2p_borrow_delta_updated(&mut self, market: TestAddress, delta: u128) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.p2p_borrow_delta_updated(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    big(delta),
                );
            });
    }

    pub fn p2p_amounts_updated(&mut self, market: TestAddress, supply_amount: u128, borrow_amount: u128) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.p2p_amounts_updated(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    big(supply_amount),
                    big(borrow_amount),
                );
            });
    }

    pub fn idle_supply_updated(&mut self, market: TestAddress, idle_supply: u128) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.idle_supply_updated(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    big(idle_supply),
                );
            });
    }

    pub fn supplied(
        &mut self,
        account: TestAddress,
        market: TestAddress,
        amount: u128,
        balance_on_pool: u128,
        balance_in_p2p: u128,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.supplied(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    account.to_managed_address(),
                    big(amount),
                    big(balance_on_pool),
                    big(balance_in_p2p),
                );
            });
    }

    pub fn withdrawn(
        &mut self,
        account: TestAddress,
        market: TestAddress,
        amount: u128,
        balance_on_pool: u128,
        balance_in_p2p: u128,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.withdrawn(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    account.to_managed_address(),
                    big(amount),
                    big(balance_on_pool),
                    big(balance_in_p2p),
                );
            });
    }

    pub fn borrowed(
        &mut self,
        account: TestAddress,
        market: TestAddress,
        amount: u128,
        balance_on_pool: u128,
        balance_in_p2p: u128,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.borrowed(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    account.to_managed_address(),
                    big(amount),
                    big(balance_on_pool),
                    big(balance_in_p2p),
                );
            });
    }

    pub fn repaid(
        &mut self,
        account: TestAddress,
        market: TestAddress,
        amount: u128,
        balance_on_pool: u128,
        balance_in_p2p: u128,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.repaid(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    account.to_managed_address(),
                    big(amount),
                    big(balance_on_pool),
                    big(balance_in_p2p),
                );
            });
    }

    pub fn supplier_position_updated(
        &mut self,
        account: TestAddress,
        market: TestAddress,
        balance_on_pool: u128,
        balance_in_p2p: u128,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.supplier_position_updated(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    account.to_managed_address(),
                    big(balance_on_pool),
                    big(balance_in_p2p),
                );
            });
    }

    pub fn borrower_position_updated(
        &mut self,
        account: TestAddress,
        market: TestAddress,
        balance_on_pool: u128,
        balance_in_p2p: u128,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.borrower_position_updated(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    account.to_managed_address(),
                    big(balance_on_pool),
                    big(balance_in_p2p),
                );
            });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn liquidated(
        &mut self,
        liquidator: TestAddress,
        borrower: TestAddress,
        debt_market: TestAddress,
        amount_repaid: u128,
        collateral_market: TestAddress,
        amount_seized: u128,
    ) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.liquidated(
                    event_meta(block, timestamp, log),
                    liquidator.to_managed_address(),
                    borrower.to_managed_address(),
                    debt_market.to_managed_address(),
                    big(amount_repaid),
                    collateral_market.to_managed_address(),
                    big(amount_seized),
                );
            });
    }

    /// Relays a Supplied event at an explicit `(block, log index)`, expecting a rejection.
    pub fn supplied_at_expect_error(
        &mut self,
        block_number: u64,
        log_index: u64,
        account: TestAddress,
        market: TestAddress,
        amount: u128,
        message: &str,
    ) {
        let timestamp = self.timestamp;
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .returns(ExpectMessage(message))
            .whitebox(indexer::contract_obj, |sc| {
                sc.supplied(
                    event_meta(block_number, timestamp, log_index),
                    market.to_managed_address(),
                    account.to_managed_address(),
                    big(amount),
                    big(amount),
                    BigUint::zero(),
                );
            });
    }

    /// Relays a Supplied event from an address that is not a relayer.
    pub fn supplied_from_stranger_expect_error(&mut self, account: TestAddress, market: TestAddress, amount: u128) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(STRANGER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .returns(ExpectStatus(4))
            .whitebox(indexer::contract_obj, |sc| {
                sc.supplied(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    account.to_managed_address(),
                    big(amount),
                    big(amount),
                    BigUint::zero(),
                );
            });
    }

    /// Relays a Supplied event with an empty transaction hash.
    pub fn supplied_without_tx_hash_expect_error(&mut self, account: TestAddress, market: TestAddress, message: &str) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .returns(ExpectMessage(message))
            .whitebox(indexer::contract_obj, |sc| {
                sc.supplied(
                    EventMeta::new(ManagedBuffer::new(), block, timestamp, log),
                    market.to_managed_address(),
                    account.to_managed_address(),
                    big(1),
                    big(1),
                    BigUint::zero(),
                );
            });
    }

    /// Sets a price from an address that is not a relayer.
    pub fn set_price_from_stranger_expect_error(&mut self, market: TestAddress, price_wad: u128) {
        self.world
            .tx()
            .from(STRANGER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .returns(ExpectStatus(4))
            .whitebox(indexer::contract_obj, |sc| {
                sc.set_price(market.to_managed_address(), big(price_wad));
            });
    }

    pub fn set_price_expect_error(&mut self, market: TestAddress, price_wad: u128, message: &str) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .returns(ExpectMessage(message))
            .whitebox(indexer::contract_obj, |sc| {
                sc.set_price(market.to_managed_address(), big(price_wad));
            });
    }

    pub fn reserve_factor_set_expect_error(&mut self, market: TestAddress, reserve_factor: u64, message: &str) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .returns(ExpectMessage(message))
            .whitebox(indexer::contract_obj, |sc| {
                sc.reserve_factor_set(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    BigUint::from(reserve_factor),
                );
            });
    }

    pub fn set_p2p_index_cursor(&mut self, market: TestAddress, p2p_index_cursor: u64) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                sc.p2p_index_cursor_set(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    BigUint::from(p2p_index_cursor),
                );
            });
    }

    pub fn reserve_update_expect_error(&mut self, market: TestAddress, pool_supply_index: u128, message: &str) {
        let (block, timestamp, log) = self.next_event();
        self.world
            .tx()
            .from(RELAYER_ADDRESS)
            .to(INDEXER_ADDRESS)
            .returns(ExpectMessage(message))
            .whitebox(indexer::contract_obj, |sc| {
                sc.reserve_update(
                    event_meta(block, timestamp, log),
                    market.to_managed_address(),
                    big(pool_supply_index),
                    big(WAD),
                    BigUint::zero(),
                    BigUint::zero(),
                );
            });
    }

    pub fn check_market(&mut self, market: TestAddress, check: impl FnOnce(&MarketState<DebugApi>)) {
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                let state = sc.market(&market.to_managed_address()).get();
                check(&state);
            });
    }

    pub fn check_protocol(&mut self, check: impl FnOnce(&ProtocolState<DebugApi>)) {
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                check(&sc.protocol().get());
            });
    }

    pub fn check_contract(&mut self, check: impl FnOnce(&indexer::ContractObj<DebugApi>)) {
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                check(&sc);
            });
    }

    pub fn account_state(&mut self, account: TestAddress) -> AccountState {
        let mut result = AccountState::default();
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                result = sc.account(&account.to_managed_address()).get();
            });
        result
    }

    pub fn position_counter(&mut self, account: TestAddress, market: TestAddress, side: PositionSide) -> PositionCounter {
        let mut result = PositionCounter::default();
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                result = sc
                    .position_counter(&account.to_managed_address(), &market.to_managed_address(), side)
                    .get();
            });
        result
    }

    /// `(protocol open positions, cumulative positions, unique users)`
    pub fn protocol_counts(&mut self) -> (u64, u64, u64) {
        let mut result = (0, 0, 0);
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                let protocol = sc.protocol().get();
                result = (
                    protocol.open_position_count,
                    protocol.cumulative_position_count,
                    protocol.cumulative_unique_users,
                );
            });
        result
    }

    pub fn market_counters(&mut self, market: TestAddress) -> MarketCounters {
        let mut result = MarketCounters::default();
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                result = sc.market(&market.to_managed_address()).get().counters;
            });
        result
    }

    /// P2P supply and borrow indexes of a WAD market, as raw units.
    pub fn p2p_indexes(&mut self, market: TestAddress) -> (u64, u64) {
        let mut result = (0, 0);
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                let state = sc.market(&market.to_managed_address()).get();
                result = (
                    state.p2p_supply_index.into_raw_units().to_u64().unwrap(),
                    state.p2p_borrow_index.into_raw_units().to_u64().unwrap(),
                );
            });
        result
    }

    pub fn last_event_cursor(&mut self) -> EventCursor {
        let mut result = EventCursor::default();
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                result = sc.last_event_cursor().get();
            });
        result
    }

    pub fn open_position(
        &mut self,
        account: TestAddress,
        market: TestAddress,
        side: PositionSide,
        check: impl FnOnce(&Position<DebugApi>),
    ) {
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                let account = account.to_managed_address();
                let market = market.to_managed_address();
                let counter = sc.position_counter(&account, &market, side).get();
                let position = sc.position(&account, &market, side, counter.next_count).get();
                check(&position);
            });
    }

    pub fn has_market(&mut self, market: TestAddress) -> bool {
        let mut result = false;
        self.world
            .query()
            .to(INDEXER_ADDRESS)
            .whitebox(indexer::contract_obj, |sc| {
                let market: ManagedAddress<DebugApi> = market.to_managed_address();
                result = sc.markets().contains(&market);
            });
        result
    }
}
