use common_structs::{
    AccountState, ActorRole, EventKind, EventMeta, MarketState, NotFound, Position, PositionSide,
    PositionSnapshot, Updated,
};

use crate::{
    accrual,
    cache::{Cache, MarketCache},
    helpers, snapshots, storage,
};

use super::account;

multiversx_sc::imports!();

/// Position lifecycle shared by every balance-moving event.
///
/// Positions are keyed by `(account, market, side, counter)`. The counter only
/// moves when a position closes, so a closed position is never written again
/// and the next event on the same side opens a fresh one.
#[multiversx_sc::module]
pub trait PositionUpdateModule:
    storage::Storage
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + helpers::LedgerMathModule
    + snapshots::SnapshotModule
    + accrual::MarketSyncModule
    + account::PositionAccountModule
{
    /// Open position of `(account, market, side)`.
    ///
    /// # Errors
    /// - `NotFound::PositionCounter` if the account never held a position there.
    /// - `NotFound::Position` if the current counter points at nothing.
    fn find_open_position(
        &self,
        account: &ManagedAddress,
        market: &ManagedAddress,
        side: PositionSide,
    ) -> Result<Position<Self::Api>, NotFound> {
        let counter_mapper = self.position_counter(account, market, side);
        if counter_mapper.is_empty() {
            return Err(NotFound::PositionCounter);
        }

        let counter = counter_mapper.get();
        let position_mapper = self.position(account, market, side, counter.next_count);
        if position_mapper.is_empty() {
            return Err(NotFound::Position);
        }

        let position = position_mapper.get();
        if !position.is_open() {
            return Err(NotFound::Position);
        }

        Ok(position)
    }

    /// Loads the open position of `(account, market, side)` or opens a new one.
    ///
    /// Opening moves the position counts of the account, the market and the
    /// protocol. Lending and borrowing counts, as well as unique depositors and
    /// borrowers, only move for positions opened by a deposit or a borrow.
    fn open_or_load_position(
        &self,
        cache: &mut Cache<Self>,
        market: &mut MarketState<Self::Api>,
        account_state: &mut AccountState,
        account: &ManagedAddress,
        side: PositionSide,
        kind: EventKind,
    ) -> (Position<Self::Api>, Updated) {
        let counter_mapper = self.position_counter(account, &market.market, side);
        let mut counter = if counter_mapper.is_empty() {
            Default::default()
        } else {
            counter_mapper.get()
        };

        let position_mapper = self.position(account, &market.market, side, counter.next_count);
        if !position_mapper.is_empty() {
            let mut position = position_mapper.get();
            self.bump_position_event_count(&mut position, kind);
            return (position, Updated::PositionChanged);
        }

        let mut position = Position::new(
            account.clone(),
            market.market.clone(),
            side,
            counter.next_count,
            market.asset_decimals,
            cache.event.stamp(),
        );
        self.bump_position_event_count(&mut position, kind);

        counter.last_timestamp = cache.timestamp();
        counter_mapper.set(counter);

        account_state.position_count += 1;
        account_state.open_position_count += 1;

        market.counters.position_count += 1;
        market.counters.open_position_count += 1;

        cache.protocol.cumulative_position_count += 1;
        cache.protocol.open_position_count += 1;

        match kind {
            EventKind::Deposit => {
                market.counters.lending_position_count += 1;
                self.record_unique_actor(cache, ActorRole::Depositor, account);
            },
            EventKind::Borrow => {
                market.counters.borrowing_position_count += 1;
                self.record_unique_actor(cache, ActorRole::Borrower, account);
            },
            _ => {},
        }

        (position, Updated::PositionOpened)
    }

    fn bump_position_event_count(&self, position: &mut Position<Self::Api>, kind: EventKind) {
        match kind {
            EventKind::Deposit => position.deposit_count += 1,
            EventKind::Withdraw => position.withdraw_count += 1,
            EventKind::Borrow => position.borrow_count += 1,
            EventKind::Repay => position.repay_count += 1,
            EventKind::Liquidatee => position.liquidation_count += 1,
            _ => {},
        }
    }

    /// Replaces the scaled balances of a position and moves the market
    /// aggregates of its side by the difference.
    ///
    /// The underlying balance is recomputed at the market's last pool index and
    /// current P2P index of the side.
    fn apply_balances(
        &self,
        market: &mut MarketState<Self::Api>,
        position: &mut Position<Self::Api>,
        on_pool: ManagedDecimal<Self::Api, NumDecimals>,
        in_p2p: ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let side = position.side;
        let decimals = market.asset_decimals;
        let pool_index = market.last_pool_index(side).clone();
        let p2p_index = market.p2p_index(side).clone();

        let virtual_p2p = self.compute_virtual_p2p(&in_p2p, &p2p_index, &pool_index, decimals);
        let balance = self.scaled_to_underlying(&on_pool, &pool_index, decimals)
            + self.scaled_to_underlying(&in_p2p, &p2p_index, decimals);

        let (total_on_pool, total_in_p2p, total_virtual) = market.scaled_aggregates_mut(side);
        *total_on_pool = self.saturating_sub(&*total_on_pool, &position.balance_on_pool) + on_pool.clone();
        *total_in_p2p = self.saturating_sub(&*total_in_p2p, &position.balance_in_p2p) + in_p2p.clone();
        *total_virtual = self.saturating_sub(&*total_virtual, &position.virtual_p2p) + virtual_p2p.clone();

        position.balance_on_pool = on_pool;
        position.balance_in_p2p = in_p2p;
        position.virtual_p2p = virtual_p2p;
        position.balance = balance;
    }

    /// Closes a position whose balance reached zero and advances its counter.
    fn close_position(
        &self,
        cache: &mut Cache<Self>,
        market: &mut MarketState<Self::Api>,
        account_state: &mut AccountState,
        position: &mut Position<Self::Api>,
    ) {
        let zero = market.zero_amount();
        self.apply_balances(market, position, zero.clone(), zero);

        let stamp = cache.event.stamp();
        position.closed = Some(stamp.clone());

        let counter_mapper = self.position_counter(&position.account, &position.market, position.side);
        let mut counter = counter_mapper.get();
        counter.next_count += 1;
        counter.last_timestamp = stamp.timestamp;
        counter_mapper.set(counter);

        account_state.open_position_count = account_state.open_position_count.saturating_sub(1);
        account_state.closed_position_count += 1;

        market.counters.open_position_count = market.counters.open_position_count.saturating_sub(1);
        market.counters.closed_position_count += 1;

        cache.protocol.open_position_count = cache.protocol.open_position_count.saturating_sub(1);

        self.position_closed_event(
            &position.account,
            &position.market,
            position.side,
            position.counter,
            &stamp,
        );
    }

    fn store_position(&self, position: &Position<Self::Api>) {
        self.position(&position.account, &position.market, position.side, position.counter)
            .set(position);
    }

    fn take_position_snapshot(
        &self,
        event: &EventMeta<Self::Api>,
        market: &MarketState<Self::Api>,
        position: &Position<Self::Api>,
    ) {
        let snapshot = PositionSnapshot {
            stamp: event.stamp(),
            log_index: event.log_index,
            balance: position.balance.clone(),
            balance_usd: self.to_usd(&position.balance, &market.price_usd),
            balance_on_pool: position.balance_on_pool.clone(),
            balance_in_p2p: position.balance_in_p2p.clone(),
        };

        self.position_snapshots(&position.account, &position.market, position.side, position.counter)
            .push(&snapshot);
    }

    /// Books the USD volume and event counts of `kind` on the market and the
    /// protocol, returning the USD value of `amount`.
    fn record_volume(
        &self,
        cache: &mut Cache<Self>,
        market: &mut MarketState<Self::Api>,
        kind: EventKind,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let amount_usd = self.to_usd(amount, &market.price_usd);
        let protocol = &mut cache.protocol;
        match kind {
            EventKind::Deposit => {
                market.cumulative_deposit_usd += &amount_usd;
                market.counters.deposit_count += 1;
                protocol.cumulative_deposit_usd += &amount_usd;
                protocol.deposit_count += 1;
            },
            EventKind::Withdraw => {
                market.counters.withdraw_count += 1;
                protocol.withdraw_count += 1;
            },
            EventKind::Borrow => {
                market.cumulative_borrow_usd += &amount_usd;
                market.counters.borrow_count += 1;
                protocol.cumulative_borrow_usd += &amount_usd;
                protocol.borrow_count += 1;
            },
            EventKind::Repay => {
                market.counters.repay_count += 1;
                protocol.repay_count += 1;
            },
            _ => {},
        }

        amount_usd
    }

    /// Volume, totals, snapshots and usage of a user-initiated balance event.
    #[allow(clippy::too_many_arguments)]
    fn commit_position_event(
        &self,
        cache: &mut Cache<Self>,
        market: &mut MarketState<Self::Api>,
        account: &ManagedAddress,
        account_state: &AccountState,
        position: &Position<Self::Api>,
        kind: EventKind,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let amount_usd = self.record_volume(cache, market, kind, amount);
        self.finalize_market(cache, market);
        self.record_market_volume(market, &cache.event, kind, amount, &amount_usd);
        self.record_financials_volume(&cache.protocol, &cache.event, kind, &amount_usd);
        self.record_usage(&cache.protocol, &cache.event, kind, account);

        self.store_account(account, account_state);
        self.store_position(position);
        self.take_position_snapshot(&cache.event, market, position);
        self.position_update_event(kind, amount, position);
    }

    /// Supplied and Borrowed: opens or grows the position of the side of `kind`.
    #[allow(clippy::too_many_arguments)]
    fn increase_position(
        &self,
        cache: &mut Cache<Self>,
        kind: EventKind,
        side: PositionSide,
        market: &ManagedAddress,
        account: &ManagedAddress,
        amount: &BigUint,
        balance_on_pool: &BigUint,
        balance_in_p2p: &BigUint,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, market)?;
        let decimals = market.asset_decimals;

        let mut account_state = self.get_or_create_account(cache, account);
        let (mut position, outcome) =
            self.open_or_load_position(cache, &mut market, &mut account_state, account, side, kind);

        self.apply_balances(
            &mut market,
            &mut position,
            self.to_decimal(balance_on_pool.clone(), decimals),
            self.to_decimal(balance_in_p2p.clone(), decimals),
        );

        match kind {
            EventKind::Deposit => account_state.deposit_count += 1,
            EventKind::Borrow => account_state.borrow_count += 1,
            _ => {},
        }

        let amount = self.to_decimal(amount.clone(), decimals);
        self.commit_position_event(
            cache,
            &mut market,
            account,
            &account_state,
            &position,
            kind,
            &amount,
        );

        Ok(outcome)
    }

    /// Withdrawn and Repaid: shrinks the open position of the side of `kind`,
    /// closing it when the underlying balance reaches exactly zero.
    ///
    /// Nothing is written unless both the market and the open position exist.
    #[allow(clippy::too_many_arguments)]
    fn decrease_position(
        &self,
        cache: &mut Cache<Self>,
        kind: EventKind,
        side: PositionSide,
        market: &ManagedAddress,
        account: &ManagedAddress,
        amount: &BigUint,
        balance_on_pool: &BigUint,
        balance_in_p2p: &BigUint,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, market)?;
        let mut position = self.find_open_position(account, &market.market, side)?;
        let decimals = market.asset_decimals;

        let mut account_state = self.get_or_create_account(cache, account);
        self.apply_balances(
            &mut market,
            &mut position,
            self.to_decimal(balance_on_pool.clone(), decimals),
            self.to_decimal(balance_in_p2p.clone(), decimals),
        );

        self.bump_position_event_count(&mut position, kind);
        match kind {
            EventKind::Withdraw => account_state.withdraw_count += 1,
            EventKind::Repay => account_state.repay_count += 1,
            _ => {},
        }

        let outcome = if self.is_zero(&position.balance) {
            self.close_position(cache, &mut market, &mut account_state, &mut position);
            Updated::PositionClosed
        } else {
            Updated::PositionChanged
        };

        let amount = self.to_decimal(amount.clone(), decimals);
        self.commit_position_event(
            cache,
            &mut market,
            account,
            &account_state,
            &position,
            kind,
            &amount,
        );

        Ok(outcome)
    }

    /// SupplierPositionUpdated and BorrowerPositionUpdated: the P2P protocol
    /// re-matched an account, only its scaled balances move.
    ///
    /// The account must already be known. A position is opened only for non-zero
    /// balances; an open position brought to zero stays open until the
    /// Withdrawn or Repaid event that follows the re-match closes it.
    fn sync_position(
        &self,
        cache: &mut Cache<Self>,
        kind: EventKind,
        side: PositionSide,
        market: &ManagedAddress,
        account: &ManagedAddress,
        balance_on_pool: &BigUint,
        balance_in_p2p: &BigUint,
    ) -> Result<Updated, NotFound> {
        let mut market = MarketCache::load(self, market)?;
        let mut account_state = self.require_account(account)?;
        let decimals = market.asset_decimals;

        let is_empty = balance_on_pool == &BigUint::zero() && balance_in_p2p == &BigUint::zero();
        if is_empty && self.find_open_position(account, &market.market, side).is_err() {
            return Ok(Updated::Unchanged);
        }

        let (mut position, outcome) =
            self.open_or_load_position(cache, &mut market, &mut account_state, account, side, kind);
        self.apply_balances(
            &mut market,
            &mut position,
            self.to_decimal(balance_on_pool.clone(), decimals),
            self.to_decimal(balance_in_p2p.clone(), decimals),
        );

        self.finalize_market(cache, &mut market);
        self.store_account(account, &account_state);
        self.store_position(&position);
        self.take_position_snapshot(&cache.event, &market, &position);
        self.position_update_event(kind, &market.zero_amount(), &position);

        Ok(outcome)
    }
}
