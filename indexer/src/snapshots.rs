use common_structs::{
    ActivityTag, EventKind, EventMeta, FinancialsSnapshot, MarketSnapshot, MarketState, Period,
    ProtocolState, UsageSnapshot,
};

use crate::storage;

multiversx_sc::imports!();

const PERIODS: [Period; 2] = [Period::Daily, Period::Hourly];

/// Daily and hourly aggregates of markets, protocol financials and usage.
///
/// Buckets are `timestamp / 86400` and `timestamp / 3600`. Every write refreshes
/// the totals of the bucket with the latest state, period volumes accumulate.
#[multiversx_sc::module]
pub trait SnapshotModule: storage::Storage + common_math::SharedMathModule {
    fn load_market_snapshot(
        &self,
        period: Period,
        market: &MarketState<Self::Api>,
        event: &EventMeta<Self::Api>,
    ) -> MarketSnapshot<Self::Api> {
        let bucket = period.bucket(event.timestamp);
        let mapper = self.market_snapshot(period, &market.market, bucket);
        if mapper.is_empty() {
            return MarketSnapshot::new(bucket, market.asset_decimals, market.index_precision());
        }

        mapper.get()
    }

    fn store_market_snapshot(
        &self,
        period: Period,
        market: &MarketState<Self::Api>,
        event: &EventMeta<Self::Api>,
        mut snapshot: MarketSnapshot<Self::Api>,
    ) {
        snapshot.block_number = event.block_number;
        snapshot.timestamp = event.timestamp;
        snapshot.price_usd = market.price_usd.clone();
        snapshot.total_value_locked_usd = market.total_deposit_balance_usd.clone();
        snapshot.total_deposit_balance_usd = market.total_deposit_balance_usd.clone();
        snapshot.total_borrow_balance_usd = market.total_borrow_balance_usd.clone();
        snapshot.cumulative_deposit_usd = market.cumulative_deposit_usd.clone();
        snapshot.cumulative_borrow_usd = market.cumulative_borrow_usd.clone();
        snapshot.cumulative_liquidate_usd = market.cumulative_liquidate_usd.clone();
        snapshot.cumulative_total_revenue_usd = market.cumulative_total_revenue_usd.clone();
        snapshot.cumulative_supply_side_revenue_usd =
            market.cumulative_supply_side_revenue_usd.clone();
        snapshot.cumulative_protocol_side_revenue_usd =
            market.cumulative_protocol_side_revenue_usd.clone();
        snapshot.pool_supply_rate = market.pool_supply_rate.clone();
        snapshot.pool_borrow_rate = market.pool_borrow_rate.clone();
        snapshot.p2p_supply_rate = market.p2p_supply_rate.clone();
        snapshot.p2p_borrow_rate = market.p2p_borrow_rate.clone();
        snapshot.open_position_count = market.counters.open_position_count;
        snapshot.closed_position_count = market.counters.closed_position_count;
        snapshot.lending_position_count = market.counters.lending_position_count;
        snapshot.borrowing_position_count = market.counters.borrowing_position_count;

        self.market_snapshot(period, &market.market, snapshot.bucket)
            .set(&snapshot);
    }

    fn refresh_market_snapshots(
        &self,
        market: &MarketState<Self::Api>,
        event: &EventMeta<Self::Api>,
    ) {
        for period in PERIODS {
            let snapshot = self.load_market_snapshot(period, market, event);
            self.store_market_snapshot(period, market, event, snapshot);
        }
    }

    fn record_market_volume(
        &self,
        market: &MarketState<Self::Api>,
        event: &EventMeta<Self::Api>,
        kind: EventKind,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        amount_usd: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        for period in PERIODS {
            let mut snapshot = self.load_market_snapshot(period, market, event);
            match kind {
                EventKind::Deposit => {
                    snapshot.native_deposit += amount;
                    snapshot.deposit_usd += amount_usd;
                },
                EventKind::Withdraw => {
                    snapshot.native_withdraw += amount;
                    snapshot.withdraw_usd += amount_usd;
                },
                EventKind::Borrow => {
                    snapshot.native_borrow += amount;
                    snapshot.borrow_usd += amount_usd;
                },
                EventKind::Repay => {
                    snapshot.native_repay += amount;
                    snapshot.repay_usd += amount_usd;
                },
                EventKind::Liquidator => {
                    snapshot.native_liquidate += amount;
                    snapshot.liquidate_usd += amount_usd;
                },
                _ => {},
            }
            self.store_market_snapshot(period, market, event, snapshot);
        }
    }

    fn record_market_revenue(
        &self,
        market: &MarketState<Self::Api>,
        event: &EventMeta<Self::Api>,
        total_usd: &ManagedDecimal<Self::Api, NumDecimals>,
        supply_side_usd: &ManagedDecimal<Self::Api, NumDecimals>,
        protocol_side_usd: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        for period in PERIODS {
            let mut snapshot = self.load_market_snapshot(period, market, event);
            snapshot.total_revenue_usd += total_usd;
            snapshot.supply_side_revenue_usd += supply_side_usd;
            snapshot.protocol_side_revenue_usd += protocol_side_usd;
            self.store_market_snapshot(period, market, event, snapshot);
        }
    }

    fn load_financials_snapshot(&self, event: &EventMeta<Self::Api>) -> FinancialsSnapshot<Self::Api> {
        let day = Period::Daily.bucket(event.timestamp);
        let mapper = self.financials_snapshot(day);
        if mapper.is_empty() {
            return FinancialsSnapshot::new(day);
        }

        mapper.get()
    }

    fn store_financials_snapshot(
        &self,
        protocol: &ProtocolState<Self::Api>,
        event: &EventMeta<Self::Api>,
        mut snapshot: FinancialsSnapshot<Self::Api>,
    ) {
        snapshot.block_number = event.block_number;
        snapshot.timestamp = event.timestamp;
        snapshot.total_value_locked_usd = protocol.total_value_locked_usd.clone();
        snapshot.total_deposit_balance_usd = protocol.total_deposit_balance_usd.clone();
        snapshot.total_borrow_balance_usd = protocol.total_borrow_balance_usd.clone();
        snapshot.cumulative_deposit_usd = protocol.cumulative_deposit_usd.clone();
        snapshot.cumulative_borrow_usd = protocol.cumulative_borrow_usd.clone();
        snapshot.cumulative_liquidate_usd = protocol.cumulative_liquidate_usd.clone();
        snapshot.cumulative_total_revenue_usd = protocol.cumulative_total_revenue_usd.clone();
        snapshot.cumulative_supply_side_revenue_usd =
            protocol.cumulative_supply_side_revenue_usd.clone();
        snapshot.cumulative_protocol_side_revenue_usd =
            protocol.cumulative_protocol_side_revenue_usd.clone();

        self.financials_snapshot(snapshot.day).set(&snapshot);
    }

    fn refresh_financials_snapshot(
        &self,
        protocol: &ProtocolState<Self::Api>,
        event: &EventMeta<Self::Api>,
    ) {
        let snapshot = self.load_financials_snapshot(event);
        self.store_financials_snapshot(protocol, event, snapshot);
    }

    fn record_financials_volume(
        &self,
        protocol: &ProtocolState<Self::Api>,
        event: &EventMeta<Self::Api>,
        kind: EventKind,
        amount_usd: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let mut snapshot = self.load_financials_snapshot(event);
        match kind {
            EventKind::Deposit => snapshot.daily_deposit_usd += amount_usd,
            EventKind::Withdraw => snapshot.daily_withdraw_usd += amount_usd,
            EventKind::Borrow => snapshot.daily_borrow_usd += amount_usd,
            EventKind::Repay => snapshot.daily_repay_usd += amount_usd,
            EventKind::Liquidator => snapshot.daily_liquidate_usd += amount_usd,
            _ => {},
        }
        self.store_financials_snapshot(protocol, event, snapshot);
    }

    fn record_financials_revenue(
        &self,
        protocol: &ProtocolState<Self::Api>,
        event: &EventMeta<Self::Api>,
        total_usd: &ManagedDecimal<Self::Api, NumDecimals>,
        supply_side_usd: &ManagedDecimal<Self::Api, NumDecimals>,
        protocol_side_usd: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let mut snapshot = self.load_financials_snapshot(event);
        snapshot.daily_total_revenue_usd += total_usd;
        snapshot.daily_supply_side_revenue_usd += supply_side_usd;
        snapshot.daily_protocol_side_revenue_usd += protocol_side_usd;
        self.store_financials_snapshot(protocol, event, snapshot);
    }

    fn load_usage_snapshot(&self, period: Period, event: &EventMeta<Self::Api>) -> UsageSnapshot {
        let bucket = period.bucket(event.timestamp);
        let mapper = self.usage_snapshot(period, bucket);
        if mapper.is_empty() {
            return UsageSnapshot {
                bucket,
                ..UsageSnapshot::default()
            };
        }

        mapper.get()
    }

    /// Counts one user transaction of `kind` initiated by `account`.
    fn record_usage(
        &self,
        protocol: &ProtocolState<Self::Api>,
        event: &EventMeta<Self::Api>,
        kind: EventKind,
        account: &ManagedAddress,
    ) {
        for period in PERIODS {
            let mut snapshot = self.load_usage_snapshot(period, event);
            snapshot.transaction_count += 1;
            match kind {
                EventKind::Deposit => snapshot.deposit_count += 1,
                EventKind::Withdraw => snapshot.withdraw_count += 1,
                EventKind::Borrow => snapshot.borrow_count += 1,
                EventKind::Repay => snapshot.repay_count += 1,
                EventKind::Liquidator => snapshot.liquidate_count += 1,
                _ => {},
            }
            self.mark_active(period, &mut snapshot, ActivityTag::User, account);
            self.mark_active(period, &mut snapshot, ActivityTag::Actor(kind), account);
            self.store_usage_snapshot(period, protocol, event, snapshot);
        }
    }

    /// Counts `account` as active in `kind` without a separate transaction.
    fn record_passive_usage(
        &self,
        protocol: &ProtocolState<Self::Api>,
        event: &EventMeta<Self::Api>,
        kind: EventKind,
        account: &ManagedAddress,
    ) {
        for period in PERIODS {
            let mut snapshot = self.load_usage_snapshot(period, event);
            self.mark_active(period, &mut snapshot, ActivityTag::User, account);
            self.mark_active(period, &mut snapshot, ActivityTag::Actor(kind), account);
            self.store_usage_snapshot(period, protocol, event, snapshot);
        }
    }

    fn mark_active(
        &self,
        period: Period,
        snapshot: &mut UsageSnapshot,
        tag: ActivityTag,
        account: &ManagedAddress,
    ) {
        if !self
            .active_accounts(period, snapshot.bucket, tag)
            .insert(account.clone())
        {
            return;
        }

        match tag {
            ActivityTag::User => snapshot.active_users += 1,
            ActivityTag::Actor(EventKind::Deposit) => snapshot.active_depositors += 1,
            ActivityTag::Actor(EventKind::Borrow) => snapshot.active_borrowers += 1,
            ActivityTag::Actor(EventKind::Liquidator) => snapshot.active_liquidators += 1,
            ActivityTag::Actor(EventKind::Liquidatee) => snapshot.active_liquidatees += 1,
            _ => {},
        }
    }

    fn store_usage_snapshot(
        &self,
        period: Period,
        protocol: &ProtocolState<Self::Api>,
        event: &EventMeta<Self::Api>,
        mut snapshot: UsageSnapshot,
    ) {
        snapshot.block_number = event.block_number;
        snapshot.timestamp = event.timestamp;
        snapshot.cumulative_unique_users = protocol.cumulative_unique_users;
        snapshot.open_position_count = protocol.open_position_count;
        snapshot.cumulative_position_count = protocol.cumulative_position_count;
        snapshot.total_pool_count = protocol.total_pool_count;

        self.usage_snapshot(period, snapshot.bucket).set(snapshot);
    }
}
