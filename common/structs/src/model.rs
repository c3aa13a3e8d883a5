#![no_std]

use common_constants::{
    BPS_PRECISION, RAY_PRECISION, SECONDS_PER_DAY, SECONDS_PER_HOUR, WAD_PRECISION,
};

multiversx_sc::imports!();
multiversx_sc::derive_imports!();

/// Index scale of a market: 1e18 for Compound-style pools, 1e27 for Aave-style pools.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum IndexFlavor {
    Wad,
    Ray,
}

impl IndexFlavor {
    pub fn precision(&self) -> NumDecimals {
        match self {
            IndexFlavor::Wad => WAD_PRECISION,
            IndexFlavor::Ray => RAY_PRECISION,
        }
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PositionSide {
    Collateral,
    Borrower,
}

/// Activity class of a relayed event, drives counters and usage buckets.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum EventKind {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
    Liquidator,
    Liquidatee,
    SupplierPositionUpdate,
    BorrowerPositionUpdate,
}

impl EventKind {
    pub fn side(&self) -> Option<PositionSide> {
        match self {
            EventKind::Deposit | EventKind::Withdraw | EventKind::SupplierPositionUpdate => {
                Some(PositionSide::Collateral)
            },
            EventKind::Borrow
            | EventKind::Repay
            | EventKind::Liquidatee
            | EventKind::BorrowerPositionUpdate => Some(PositionSide::Borrower),
            EventKind::Liquidator => None,
        }
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Period {
    Daily,
    Hourly,
}

impl Period {
    pub fn bucket(&self, timestamp: u64) -> u64 {
        match self {
            Period::Daily => timestamp / SECONDS_PER_DAY,
            Period::Hourly => timestamp / SECONDS_PER_HOUR,
        }
    }
}

/// Deduplication tag for "active" usage counters within one bucket.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActivityTag {
    User,
    Actor(EventKind),
}

/// Unique-actor tag at protocol scope.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorRole {
    Depositor,
    Borrower,
    Liquidator,
    Liquidatee,
}

/// Where a relayed event comes from on the indexed chain.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Eq, Debug)]
pub struct EventMeta<M: ManagedTypeApi> {
    pub tx_hash: ManagedBuffer<M>,
    pub block_number: u64,
    pub timestamp: u64,
    pub log_index: u64,
}

impl<M: ManagedTypeApi> EventMeta<M> {
    pub fn new(tx_hash: ManagedBuffer<M>, block_number: u64, timestamp: u64, log_index: u64) -> Self {
        EventMeta {
            tx_hash,
            block_number,
            timestamp,
            log_index,
        }
    }

    pub fn stamp(&self) -> BlockStamp<M> {
        BlockStamp {
            tx_hash: self.tx_hash.clone(),
            block_number: self.block_number,
            timestamp: self.timestamp,
        }
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Eq, Debug)]
pub struct BlockStamp<M: ManagedTypeApi> {
    pub tx_hash: ManagedBuffer<M>,
    pub block_number: u64,
    pub timestamp: u64,
}

/// Last processed `(block, log index)` pair.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EventCursor {
    pub block_number: u64,
    pub log_index: u64,
}

impl EventCursor {
    pub fn is_before(&self, block_number: u64, log_index: u64) -> bool {
        self.block_number < block_number
            || (self.block_number == block_number && self.log_index < log_index)
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct TokenMetadata<M: ManagedTypeApi> {
    pub name: ManagedBuffer<M>,
    pub symbol: ManagedBuffer<M>,
    pub decimals: NumDecimals,
}

/// Growth of each side of a market over one accrual period, at index precision.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthFactors<M: ManagedTypeApi> {
    pub pool_supply: ManagedDecimal<M, NumDecimals>,
    pub pool_borrow: ManagedDecimal<M, NumDecimals>,
    pub p2p_supply: ManagedDecimal<M, NumDecimals>,
    pub p2p_borrow: ManagedDecimal<M, NumDecimals>,
}

/// Inputs of one side's P2P index derivation.
#[derive(Clone)]
pub struct P2PIndexParams<M: ManagedTypeApi> {
    pub last_pool_index: ManagedDecimal<M, NumDecimals>,
    pub last_p2p_index: ManagedDecimal<M, NumDecimals>,
    pub p2p_growth_factor: ManagedDecimal<M, NumDecimals>,
    pub pool_growth_factor: ManagedDecimal<M, NumDecimals>,
    pub p2p_delta: ManagedDecimal<M, NumDecimals>,
    pub p2p_amount: ManagedDecimal<M, NumDecimals>,
    pub proportion_idle: ManagedDecimal<M, NumDecimals>,
}

/// Inputs of one side's P2P rate derivation.
#[derive(Clone)]
pub struct P2PRateParams<M: ManagedTypeApi> {
    pub pool_supply_rate: ManagedDecimal<M, NumDecimals>,
    pub pool_borrow_rate: ManagedDecimal<M, NumDecimals>,
    pub pool_index: ManagedDecimal<M, NumDecimals>,
    pub p2p_index: ManagedDecimal<M, NumDecimals>,
    pub p2p_index_cursor: ManagedDecimal<M, NumDecimals>,
    pub reserve_factor: ManagedDecimal<M, NumDecimals>,
    pub p2p_delta: ManagedDecimal<M, NumDecimals>,
    pub p2p_amount: ManagedDecimal<M, NumDecimals>,
    pub proportion_idle: ManagedDecimal<M, NumDecimals>,
}

/// Freshly observed pool-side values of one accrual tick.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct ReserveUpdateParams<M: ManagedTypeApi> {
    pub event: EventMeta<M>,
    pub market: ManagedAddress<M>,
    pub reserve_supply_index: BigUint<M>,
    pub reserve_borrow_index: BigUint<M>,
    pub pool_supply_rate: BigUint<M>,
    pub pool_borrow_rate: BigUint<M>,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum MarketFlag {
    SupplyPaused,
    BorrowPaused,
    WithdrawPaused,
    RepayPaused,
    LiquidateCollateralPaused,
    LiquidateBorrowPaused,
    P2PDisabled,
    Deprecated,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MarketFlags {
    pub is_supply_paused: bool,
    pub is_borrow_paused: bool,
    pub is_withdraw_paused: bool,
    pub is_repay_paused: bool,
    pub is_liquidate_collateral_paused: bool,
    pub is_liquidate_borrow_paused: bool,
    pub is_p2p_disabled: bool,
    pub is_deprecated: bool,
}

impl MarketFlags {
    pub fn set(&mut self, flag: MarketFlag, value: bool) {
        match flag {
            MarketFlag::SupplyPaused => self.is_supply_paused = value,
            MarketFlag::BorrowPaused => self.is_borrow_paused = value,
            MarketFlag::WithdrawPaused => self.is_withdraw_paused = value,
            MarketFlag::RepayPaused => self.is_repay_paused = value,
            MarketFlag::LiquidateCollateralPaused => self.is_liquidate_collateral_paused = value,
            MarketFlag::LiquidateBorrowPaused => self.is_liquidate_borrow_paused = value,
            MarketFlag::P2PDisabled => self.is_p2p_disabled = value,
            MarketFlag::Deprecated => self.is_deprecated = value,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_deprecated
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MarketCounters {
    pub position_count: u64,
    pub open_position_count: u64,
    pub closed_position_count: u64,
    pub lending_position_count: u64,
    pub borrowing_position_count: u64,
    pub deposit_count: u64,
    pub withdraw_count: u64,
    pub borrow_count: u64,
    pub repay_count: u64,
    pub liquidation_count: u64,
}

/// Interest generated on the market by suppliers and borrowers, matched or not.
///
/// Token amounts use the asset decimals, USD amounts use WAD precision.
/// Improvements are signed raw units of the same precisions.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct MarketInterests<M: ManagedTypeApi> {
    pub pool_supply: ManagedDecimal<M, NumDecimals>,
    pub p2p_supply: ManagedDecimal<M, NumDecimals>,
    pub pool_borrow: ManagedDecimal<M, NumDecimals>,
    pub p2p_borrow: ManagedDecimal<M, NumDecimals>,
    pub pool_supply_usd: ManagedDecimal<M, NumDecimals>,
    pub p2p_supply_usd: ManagedDecimal<M, NumDecimals>,
    pub pool_borrow_usd: ManagedDecimal<M, NumDecimals>,
    pub p2p_borrow_usd: ManagedDecimal<M, NumDecimals>,
    pub p2p_supply_improvement: BigInt<M>,
    pub p2p_borrow_improvement: BigInt<M>,
    pub p2p_supply_improvement_usd: BigInt<M>,
    pub p2p_borrow_improvement_usd: BigInt<M>,
}

impl<M: ManagedTypeApi> MarketInterests<M> {
    pub fn new(asset_decimals: NumDecimals) -> Self {
        MarketInterests {
            pool_supply: zero_decimal(asset_decimals),
            p2p_supply: zero_decimal(asset_decimals),
            pool_borrow: zero_decimal(asset_decimals),
            p2p_borrow: zero_decimal(asset_decimals),
            pool_supply_usd: zero_decimal(WAD_PRECISION),
            p2p_supply_usd: zero_decimal(WAD_PRECISION),
            pool_borrow_usd: zero_decimal(WAD_PRECISION),
            p2p_borrow_usd: zero_decimal(WAD_PRECISION),
            p2p_supply_improvement: BigInt::zero(),
            p2p_borrow_improvement: BigInt::zero(),
            p2p_supply_improvement_usd: BigInt::zero(),
            p2p_borrow_improvement_usd: BigInt::zero(),
        }
    }
}

/// Full reconciliation state of one P2P market.
///
/// Every field the engine reads is set at creation, so no read site has to deal
/// with a partially initialized market.
///
/// Precisions:
/// - indexes and rates: `flavor.precision()`
/// - deltas, amounts, idle supply, scaled and underlying balances: `asset_decimals`
/// - reserve factor and cursor: BPS
/// - USD values: WAD
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct MarketState<M: ManagedTypeApi> {
    pub market: ManagedAddress<M>,
    pub underlying: ManagedAddress<M>,
    pub flavor: IndexFlavor,
    pub asset_decimals: NumDecimals,

    pub reserve_supply_index: ManagedDecimal<M, NumDecimals>,
    pub reserve_borrow_index: ManagedDecimal<M, NumDecimals>,
    pub last_pool_supply_index: ManagedDecimal<M, NumDecimals>,
    pub last_pool_borrow_index: ManagedDecimal<M, NumDecimals>,
    pub p2p_supply_index: ManagedDecimal<M, NumDecimals>,
    pub p2p_borrow_index: ManagedDecimal<M, NumDecimals>,

    pub pool_supply_rate: ManagedDecimal<M, NumDecimals>,
    pub pool_borrow_rate: ManagedDecimal<M, NumDecimals>,
    pub p2p_supply_rate: ManagedDecimal<M, NumDecimals>,
    pub p2p_borrow_rate: ManagedDecimal<M, NumDecimals>,

    pub p2p_supply_delta: ManagedDecimal<M, NumDecimals>,
    pub p2p_borrow_delta: ManagedDecimal<M, NumDecimals>,
    pub p2p_supply_amount: ManagedDecimal<M, NumDecimals>,
    pub p2p_borrow_amount: ManagedDecimal<M, NumDecimals>,
    pub idle_supply: ManagedDecimal<M, NumDecimals>,

    pub reserve_factor: ManagedDecimal<M, NumDecimals>,
    pub p2p_index_cursor: ManagedDecimal<M, NumDecimals>,

    pub scaled_supply_on_pool: ManagedDecimal<M, NumDecimals>,
    pub scaled_supply_in_p2p: ManagedDecimal<M, NumDecimals>,
    pub scaled_borrow_on_pool: ManagedDecimal<M, NumDecimals>,
    pub scaled_borrow_in_p2p: ManagedDecimal<M, NumDecimals>,
    pub virtual_scaled_supply: ManagedDecimal<M, NumDecimals>,
    pub virtual_scaled_borrow: ManagedDecimal<M, NumDecimals>,

    pub total_supply_on_pool: ManagedDecimal<M, NumDecimals>,
    pub total_supply_in_p2p: ManagedDecimal<M, NumDecimals>,
    pub total_borrow_on_pool: ManagedDecimal<M, NumDecimals>,
    pub total_borrow_in_p2p: ManagedDecimal<M, NumDecimals>,

    pub price_usd: ManagedDecimal<M, NumDecimals>,
    pub total_deposit_balance_usd: ManagedDecimal<M, NumDecimals>,
    pub total_borrow_balance_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_deposit_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_borrow_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_liquidate_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_total_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_supply_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_protocol_side_revenue_usd: ManagedDecimal<M, NumDecimals>,

    pub interests: MarketInterests<M>,
    pub counters: MarketCounters,
    pub flags: MarketFlags,
    pub created_at: BlockStamp<M>,
    pub last_reserve_update: u64,
}

impl<M: ManagedTypeApi> MarketState<M> {
    /// Builds a market whose indexes start at the given pool indexes.
    ///
    /// P2P indexes start at one index unit; deltas, balances and totals start at zero.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market: ManagedAddress<M>,
        underlying: ManagedAddress<M>,
        flavor: IndexFlavor,
        asset_decimals: NumDecimals,
        pool_supply_index: ManagedDecimal<M, NumDecimals>,
        pool_borrow_index: ManagedDecimal<M, NumDecimals>,
        reserve_factor: ManagedDecimal<M, NumDecimals>,
        p2p_index_cursor: ManagedDecimal<M, NumDecimals>,
        created_at: BlockStamp<M>,
    ) -> Self {
        let precision = flavor.precision();
        let one = ManagedDecimal::from_raw_units(BigUint::from(10u64).pow(precision as u32), precision);
        let amount_zero = zero_decimal(asset_decimals);
        let usd_zero = zero_decimal(WAD_PRECISION);
        let rate_zero = zero_decimal(precision);

        MarketState {
            market,
            underlying,
            flavor,
            asset_decimals,
            reserve_supply_index: pool_supply_index.clone(),
            reserve_borrow_index: pool_borrow_index.clone(),
            last_pool_supply_index: pool_supply_index,
            last_pool_borrow_index: pool_borrow_index,
            p2p_supply_index: one.clone(),
            p2p_borrow_index: one,
            pool_supply_rate: rate_zero.clone(),
            pool_borrow_rate: rate_zero.clone(),
            p2p_supply_rate: rate_zero.clone(),
            p2p_borrow_rate: rate_zero,
            p2p_supply_delta: amount_zero.clone(),
            p2p_borrow_delta: amount_zero.clone(),
            p2p_supply_amount: amount_zero.clone(),
            p2p_borrow_amount: amount_zero.clone(),
            idle_supply: amount_zero.clone(),
            reserve_factor: reserve_factor.rescale(BPS_PRECISION),
            p2p_index_cursor: p2p_index_cursor.rescale(BPS_PRECISION),
            scaled_supply_on_pool: amount_zero.clone(),
            scaled_supply_in_p2p: amount_zero.clone(),
            scaled_borrow_on_pool: amount_zero.clone(),
            scaled_borrow_in_p2p: amount_zero.clone(),
            virtual_scaled_supply: amount_zero.clone(),
            virtual_scaled_borrow: amount_zero.clone(),
            total_supply_on_pool: amount_zero.clone(),
            total_supply_in_p2p: amount_zero.clone(),
            total_borrow_on_pool: amount_zero.clone(),
            total_borrow_in_p2p: amount_zero,
            price_usd: usd_zero.clone(),
            total_deposit_balance_usd: usd_zero.clone(),
            total_borrow_balance_usd: usd_zero.clone(),
            cumulative_deposit_usd: usd_zero.clone(),
            cumulative_borrow_usd: usd_zero.clone(),
            cumulative_liquidate_usd: usd_zero.clone(),
            cumulative_total_revenue_usd: usd_zero.clone(),
            cumulative_supply_side_revenue_usd: usd_zero.clone(),
            cumulative_protocol_side_revenue_usd: usd_zero,
            interests: MarketInterests::new(asset_decimals),
            counters: MarketCounters::default(),
            flags: MarketFlags::default(),
            created_at,
            last_reserve_update: 0,
        }
    }

    pub fn index_precision(&self) -> NumDecimals {
        self.flavor.precision()
    }

    pub fn last_pool_index(&self, side: PositionSide) -> &ManagedDecimal<M, NumDecimals> {
        match side {
            PositionSide::Collateral => &self.last_pool_supply_index,
            PositionSide::Borrower => &self.last_pool_borrow_index,
        }
    }

    pub fn p2p_index(&self, side: PositionSide) -> &ManagedDecimal<M, NumDecimals> {
        match side {
            PositionSide::Collateral => &self.p2p_supply_index,
            PositionSide::Borrower => &self.p2p_borrow_index,
        }
    }

    /// Mutable `(on pool, in P2P, virtual)` scaled aggregates of one side.
    pub fn scaled_aggregates_mut(
        &mut self,
        side: PositionSide,
    ) -> (
        &mut ManagedDecimal<M, NumDecimals>,
        &mut ManagedDecimal<M, NumDecimals>,
        &mut ManagedDecimal<M, NumDecimals>,
    ) {
        match side {
            PositionSide::Collateral => (
                &mut self.scaled_supply_on_pool,
                &mut self.scaled_supply_in_p2p,
                &mut self.virtual_scaled_supply,
            ),
            PositionSide::Borrower => (
                &mut self.scaled_borrow_on_pool,
                &mut self.scaled_borrow_in_p2p,
                &mut self.virtual_scaled_borrow,
            ),
        }
    }

    pub fn zero_amount(&self) -> ManagedDecimal<M, NumDecimals> {
        zero_decimal(self.asset_decimals)
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PositionCounter {
    pub next_count: u64,
    pub last_timestamp: u64,
}

/// One account's stake in one market on one side.
///
/// Scaled balances use the asset decimals; `balance` is the underlying amount
/// recomputed from them on every event.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct Position<M: ManagedTypeApi> {
    pub account: ManagedAddress<M>,
    pub market: ManagedAddress<M>,
    pub side: PositionSide,
    pub counter: u64,
    pub balance: ManagedDecimal<M, NumDecimals>,
    pub balance_on_pool: ManagedDecimal<M, NumDecimals>,
    pub balance_in_p2p: ManagedDecimal<M, NumDecimals>,
    pub virtual_p2p: ManagedDecimal<M, NumDecimals>,
    pub is_collateral: bool,
    pub opened: BlockStamp<M>,
    pub closed: Option<BlockStamp<M>>,
    pub deposit_count: u64,
    pub withdraw_count: u64,
    pub borrow_count: u64,
    pub repay_count: u64,
    pub liquidation_count: u64,
}

impl<M: ManagedTypeApi> Position<M> {
    pub fn new(
        account: ManagedAddress<M>,
        market: ManagedAddress<M>,
        side: PositionSide,
        counter: u64,
        asset_decimals: NumDecimals,
        opened: BlockStamp<M>,
    ) -> Self {
        let zero = zero_decimal(asset_decimals);
        Position {
            account,
            market,
            side,
            counter,
            balance: zero.clone(),
            balance_on_pool: zero.clone(),
            balance_in_p2p: zero.clone(),
            virtual_p2p: zero,
            is_collateral: side == PositionSide::Collateral,
            opened,
            closed: None,
            deposit_count: 0,
            withdraw_count: 0,
            borrow_count: 0,
            repay_count: 0,
            liquidation_count: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.closed.is_none()
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct PositionSnapshot<M: ManagedTypeApi> {
    pub stamp: BlockStamp<M>,
    pub log_index: u64,
    pub balance: ManagedDecimal<M, NumDecimals>,
    pub balance_usd: ManagedDecimal<M, NumDecimals>,
    pub balance_on_pool: ManagedDecimal<M, NumDecimals>,
    pub balance_in_p2p: ManagedDecimal<M, NumDecimals>,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct AccountState {
    pub position_count: u64,
    pub open_position_count: u64,
    pub closed_position_count: u64,
    pub deposit_count: u64,
    pub withdraw_count: u64,
    pub borrow_count: u64,
    pub repay_count: u64,
    pub liquidate_count: u64,
    pub liquidation_count: u64,
}

/// Protocol-wide aggregates. USD values at WAD precision.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct ProtocolState<M: ManagedTypeApi> {
    pub name: ManagedBuffer<M>,
    pub total_value_locked_usd: ManagedDecimal<M, NumDecimals>,
    pub total_deposit_balance_usd: ManagedDecimal<M, NumDecimals>,
    pub total_borrow_balance_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_deposit_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_borrow_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_liquidate_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_total_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_supply_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_protocol_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_unique_users: u64,
    pub cumulative_unique_depositors: u64,
    pub cumulative_unique_borrowers: u64,
    pub cumulative_unique_liquidators: u64,
    pub cumulative_unique_liquidatees: u64,
    pub cumulative_position_count: u64,
    pub open_position_count: u64,
    pub total_pool_count: u64,
    pub deposit_count: u64,
    pub withdraw_count: u64,
    pub borrow_count: u64,
    pub repay_count: u64,
    pub liquidation_count: u64,
}

impl<M: ManagedTypeApi> ProtocolState<M> {
    pub fn new(name: ManagedBuffer<M>) -> Self {
        let usd_zero = zero_decimal(WAD_PRECISION);
        ProtocolState {
            name,
            total_value_locked_usd: usd_zero.clone(),
            total_deposit_balance_usd: usd_zero.clone(),
            total_borrow_balance_usd: usd_zero.clone(),
            cumulative_deposit_usd: usd_zero.clone(),
            cumulative_borrow_usd: usd_zero.clone(),
            cumulative_liquidate_usd: usd_zero.clone(),
            cumulative_total_revenue_usd: usd_zero.clone(),
            cumulative_supply_side_revenue_usd: usd_zero.clone(),
            cumulative_protocol_side_revenue_usd: usd_zero,
            cumulative_unique_users: 0,
            cumulative_unique_depositors: 0,
            cumulative_unique_borrowers: 0,
            cumulative_unique_liquidators: 0,
            cumulative_unique_liquidatees: 0,
            cumulative_position_count: 0,
            open_position_count: 0,
            total_pool_count: 0,
            deposit_count: 0,
            withdraw_count: 0,
            borrow_count: 0,
            repay_count: 0,
            liquidation_count: 0,
        }
    }
}

/// Per-period market activity plus the market totals at the last write.
///
/// Shared by daily and hourly buckets. Native volumes use the asset decimals.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct MarketSnapshot<M: ManagedTypeApi> {
    pub bucket: u64,
    pub block_number: u64,
    pub timestamp: u64,
    pub price_usd: ManagedDecimal<M, NumDecimals>,
    pub total_value_locked_usd: ManagedDecimal<M, NumDecimals>,
    pub total_deposit_balance_usd: ManagedDecimal<M, NumDecimals>,
    pub total_borrow_balance_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_deposit_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_borrow_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_liquidate_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_total_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_supply_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_protocol_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub deposit_usd: ManagedDecimal<M, NumDecimals>,
    pub withdraw_usd: ManagedDecimal<M, NumDecimals>,
    pub borrow_usd: ManagedDecimal<M, NumDecimals>,
    pub repay_usd: ManagedDecimal<M, NumDecimals>,
    pub liquidate_usd: ManagedDecimal<M, NumDecimals>,
    pub total_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub supply_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub protocol_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub native_deposit: ManagedDecimal<M, NumDecimals>,
    pub native_withdraw: ManagedDecimal<M, NumDecimals>,
    pub native_borrow: ManagedDecimal<M, NumDecimals>,
    pub native_repay: ManagedDecimal<M, NumDecimals>,
    pub native_liquidate: ManagedDecimal<M, NumDecimals>,
    pub pool_supply_rate: ManagedDecimal<M, NumDecimals>,
    pub pool_borrow_rate: ManagedDecimal<M, NumDecimals>,
    pub p2p_supply_rate: ManagedDecimal<M, NumDecimals>,
    pub p2p_borrow_rate: ManagedDecimal<M, NumDecimals>,
    pub open_position_count: u64,
    pub closed_position_count: u64,
    pub lending_position_count: u64,
    pub borrowing_position_count: u64,
}

impl<M: ManagedTypeApi> MarketSnapshot<M> {
    pub fn new(bucket: u64, asset_decimals: NumDecimals, index_precision: NumDecimals) -> Self {
        let usd_zero = zero_decimal(WAD_PRECISION);
        let amount_zero = zero_decimal(asset_decimals);
        let rate_zero = zero_decimal(index_precision);
        MarketSnapshot {
            bucket,
            block_number: 0,
            timestamp: 0,
            price_usd: usd_zero.clone(),
            total_value_locked_usd: usd_zero.clone(),
            total_deposit_balance_usd: usd_zero.clone(),
            total_borrow_balance_usd: usd_zero.clone(),
            cumulative_deposit_usd: usd_zero.clone(),
            cumulative_borrow_usd: usd_zero.clone(),
            cumulative_liquidate_usd: usd_zero.clone(),
            cumulative_total_revenue_usd: usd_zero.clone(),
            cumulative_supply_side_revenue_usd: usd_zero.clone(),
            cumulative_protocol_side_revenue_usd: usd_zero.clone(),
            deposit_usd: usd_zero.clone(),
            withdraw_usd: usd_zero.clone(),
            borrow_usd: usd_zero.clone(),
            repay_usd: usd_zero.clone(),
            liquidate_usd: usd_zero.clone(),
            total_revenue_usd: usd_zero.clone(),
            supply_side_revenue_usd: usd_zero.clone(),
            protocol_side_revenue_usd: usd_zero,
            native_deposit: amount_zero.clone(),
            native_withdraw: amount_zero.clone(),
            native_borrow: amount_zero.clone(),
            native_repay: amount_zero.clone(),
            native_liquidate: amount_zero,
            pool_supply_rate: rate_zero.clone(),
            pool_borrow_rate: rate_zero.clone(),
            p2p_supply_rate: rate_zero.clone(),
            p2p_borrow_rate: rate_zero,
            open_position_count: 0,
            closed_position_count: 0,
            lending_position_count: 0,
            borrowing_position_count: 0,
        }
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct FinancialsSnapshot<M: ManagedTypeApi> {
    pub day: u64,
    pub block_number: u64,
    pub timestamp: u64,
    pub total_value_locked_usd: ManagedDecimal<M, NumDecimals>,
    pub total_deposit_balance_usd: ManagedDecimal<M, NumDecimals>,
    pub total_borrow_balance_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_deposit_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_borrow_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_liquidate_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_total_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_supply_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub cumulative_protocol_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub daily_deposit_usd: ManagedDecimal<M, NumDecimals>,
    pub daily_withdraw_usd: ManagedDecimal<M, NumDecimals>,
    pub daily_borrow_usd: ManagedDecimal<M, NumDecimals>,
    pub daily_repay_usd: ManagedDecimal<M, NumDecimals>,
    pub daily_liquidate_usd: ManagedDecimal<M, NumDecimals>,
    pub daily_total_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub daily_supply_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
    pub daily_protocol_side_revenue_usd: ManagedDecimal<M, NumDecimals>,
}

impl<M: ManagedTypeApi> FinancialsSnapshot<M> {
    pub fn new(day: u64) -> Self {
        let usd_zero = zero_decimal(WAD_PRECISION);
        FinancialsSnapshot {
            day,
            block_number: 0,
            timestamp: 0,
            total_value_locked_usd: usd_zero.clone(),
            total_deposit_balance_usd: usd_zero.clone(),
            total_borrow_balance_usd: usd_zero.clone(),
            cumulative_deposit_usd: usd_zero.clone(),
            cumulative_borrow_usd: usd_zero.clone(),
            cumulative_liquidate_usd: usd_zero.clone(),
            cumulative_total_revenue_usd: usd_zero.clone(),
            cumulative_supply_side_revenue_usd: usd_zero.clone(),
            cumulative_protocol_side_revenue_usd: usd_zero.clone(),
            daily_deposit_usd: usd_zero.clone(),
            daily_withdraw_usd: usd_zero.clone(),
            daily_borrow_usd: usd_zero.clone(),
            daily_repay_usd: usd_zero.clone(),
            daily_liquidate_usd: usd_zero.clone(),
            daily_total_revenue_usd: usd_zero.clone(),
            daily_supply_side_revenue_usd: usd_zero.clone(),
            daily_protocol_side_revenue_usd: usd_zero,
        }
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct UsageSnapshot {
    pub bucket: u64,
    pub block_number: u64,
    pub timestamp: u64,
    pub active_users: u64,
    pub transaction_count: u64,
    pub deposit_count: u64,
    pub withdraw_count: u64,
    pub borrow_count: u64,
    pub repay_count: u64,
    pub liquidate_count: u64,
    pub active_depositors: u64,
    pub active_borrowers: u64,
    pub active_liquidators: u64,
    pub active_liquidatees: u64,
    pub cumulative_unique_users: u64,
    pub open_position_count: u64,
    pub cumulative_position_count: u64,
    pub total_pool_count: u64,
}

/// Successful outcome of a reconciliation step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Updated {
    Market,
    PositionOpened,
    PositionChanged,
    PositionClosed,
    /// Consumed without touching any state.
    Unchanged,
}

/// The entity a reconciliation step expected but could not load.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotFound {
    Market,
    Account,
    PositionCounter,
    Position,
}

pub fn zero_decimal<M: ManagedTypeApi>(precision: NumDecimals) -> ManagedDecimal<M, NumDecimals> {
    ManagedDecimal::from_raw_units(BigUint::zero(), precision)
}
