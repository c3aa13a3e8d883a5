use multiversx_sc::types::{BigUint, ManagedAddress};
use multiversx_sc_scenario::DebugApi;

pub mod constants;
pub mod setup;
use constants::*;
use setup::*;

use indexer::{positions::update::PositionUpdateModule, storage::Storage, PositionSide};

/// Tests the first supply of an account.
///
/// Covers:
/// - Position opened with counter 0 and its balances
/// - Account, market and protocol position counts
/// - Unique user and depositor counts
/// - Cumulative deposit volume in USD
#[test]
fn supply_opens_position_and_moves_counts() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(1_000), usdc(600), usdc(400));

    state.open_position(ALICE, USDC_MARKET, PositionSide::Collateral, |position| {
        assert_eq!(position.counter, 0);
        assert!(position.is_open());
        assert!(position.is_collateral);
        assert_eq!(position.deposit_count, 1);
        assert_raw(&position.balance, usdc(1_000), "balance");
        assert_raw(&position.balance_on_pool, usdc(600), "on pool");
        assert_raw(&position.balance_in_p2p, usdc(400), "in p2p");
        assert_raw(&position.virtual_p2p, usdc(400), "virtual p2p");
    });

    let account = state.account_state(ALICE);
    assert_eq!(account.position_count, 1);
    assert_eq!(account.open_position_count, 1);
    assert_eq!(account.deposit_count, 1);

    let counters = state.market_counters(USDC_MARKET);
    assert_eq!(counters.position_count, 1);
    assert_eq!(counters.open_position_count, 1);
    assert_eq!(counters.lending_position_count, 1);
    assert_eq!(counters.deposit_count, 1);

    assert_eq!(state.protocol_counts(), (1, 1, 1));
    state.check_protocol(|protocol| {
        assert_eq!(protocol.cumulative_unique_depositors, 1);
        assert_eq!(protocol.deposit_count, 1);
        assert_raw(&protocol.cumulative_deposit_usd, 1_000 * WAD, "cumulative deposit usd");
        assert_raw(&protocol.total_value_locked_usd, 1_000 * WAD, "tvl");
    });

    state.check_market(USDC_MARKET, |market| {
        assert_raw(&market.scaled_supply_on_pool, usdc(600), "scaled on pool");
        assert_raw(&market.scaled_supply_in_p2p, usdc(400), "scaled in p2p");
        assert_raw(&market.virtual_scaled_supply, usdc(400), "virtual supply");
        assert_raw(&market.total_deposit_balance_usd, 1_000 * WAD, "deposit usd");
    });
}

/// Tests that a second supply grows the same position instead of opening one.
#[test]
fn supply_twice_reuses_open_position() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(100), usdc(100), 0);
    state.supplied(ALICE, USDC_MARKET, usdc(50), usdc(150), 0);

    state.open_position(ALICE, USDC_MARKET, PositionSide::Collateral, |position| {
        assert_eq!(position.counter, 0);
        assert_eq!(position.deposit_count, 2);
        assert_raw(&position.balance, usdc(150), "balance");
    });

    let counters = state.market_counters(USDC_MARKET);
    assert_eq!(counters.position_count, 1);
    assert_eq!(counters.deposit_count, 2);
    assert_eq!(state.protocol_counts(), (1, 1, 1));

    state.check_market(USDC_MARKET, |market| {
        assert_raw(&market.scaled_supply_on_pool, usdc(150), "scaled on pool");
        assert_raw(&market.cumulative_deposit_usd, 150 * WAD, "cumulative deposit usd");
    });
}

/// Tests a partial withdrawal: the position stays open with the new balances.
#[test]
fn withdraw_partial_keeps_position_open() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(1_000), usdc(1_000), 0);
    state.withdrawn(ALICE, USDC_MARKET, usdc(400), usdc(600), 0);

    state.open_position(ALICE, USDC_MARKET, PositionSide::Collateral, |position| {
        assert!(position.is_open());
        assert_eq!(position.withdraw_count, 1);
        assert_raw(&position.balance, usdc(600), "balance");
    });

    let account = state.account_state(ALICE);
    assert_eq!(account.withdraw_count, 1);
    assert_eq!(account.open_position_count, 1);

    state.check_market(USDC_MARKET, |market| {
        assert_eq!(market.counters.withdraw_count, 1);
        assert_raw(&market.total_supply_on_pool, usdc(600), "supply on pool");
        // withdrawals do not move cumulative deposits
        assert_raw(&market.cumulative_deposit_usd, 1_000 * WAD, "cumulative deposit usd");
    });
}

/// Tests the full withdrawal path.
///
/// Covers:
/// - Position closed exactly when its balance reaches zero
/// - Counter advanced so the next supply opens a fresh position
/// - Open and closed counts of account, market and protocol
#[test]
fn withdraw_all_closes_position_and_next_supply_reopens() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(1_000), usdc(1_000), 0);
    state.withdrawn(ALICE, USDC_MARKET, usdc(1_000), 0, 0);

    let counter = state.position_counter(ALICE, USDC_MARKET, PositionSide::Collateral);
    assert_eq!(counter.next_count, 1);
    assert_eq!(counter.last_timestamp, state.timestamp);

    state.check_contract(|sc| {
        let account: ManagedAddress<DebugApi> = ALICE.to_managed_address();
        let market: ManagedAddress<DebugApi> = USDC_MARKET.to_managed_address();
        assert!(sc
            .find_open_position(&account, &market, PositionSide::Collateral)
            .is_err());

        let closed = sc.position(&account, &market, PositionSide::Collateral, 0).get();
        assert!(closed.closed.is_some());
        assert_eq!(closed.withdraw_count, 1);
        assert_eq!(closed.balance.into_raw_units(), &BigUint::zero());
    });

    let account = state.account_state(ALICE);
    assert_eq!(account.open_position_count, 0);
    assert_eq!(account.closed_position_count, 1);

    let counters = state.market_counters(USDC_MARKET);
    assert_eq!(counters.open_position_count, 0);
    assert_eq!(counters.closed_position_count, 1);
    assert_eq!(state.protocol_counts(), (0, 1, 1));

    state.advance_time(60);
    state.supplied(ALICE, USDC_MARKET, usdc(10), usdc(10), 0);

    state.open_position(ALICE, USDC_MARKET, PositionSide::Collateral, |position| {
        assert_eq!(position.counter, 1);
        assert_eq!(position.deposit_count, 1);
        assert_eq!(position.withdraw_count, 0);
        assert_raw(&position.balance, usdc(10), "balance");
    });

    let counters = state.market_counters(USDC_MARKET);
    assert_eq!(counters.position_count, 2);
    assert_eq!(counters.open_position_count, 1);
    // same account, no new unique user
    assert_eq!(state.protocol_counts(), (1, 2, 1));
}

/// Tests that a dust balance keeps the position open.
#[test]
fn withdraw_leaving_dust_keeps_position_open() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(1), usdc(1), 0);
    state.withdrawn(ALICE, USDC_MARKET, usdc(1) - 1, 1, 0);

    state.open_position(ALICE, USDC_MARKET, PositionSide::Collateral, |position| {
        assert!(position.is_open());
        assert_raw(&position.balance, 1, "dust balance");
    });
    assert_eq!(state.protocol_counts().0, 1);
}

/// Tests the borrow side: borrow opens, full repay closes.
#[test]
fn borrow_then_repay_all_closes_borrow_position() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(1_000), usdc(1_000), 0);
    state.borrowed(CAROL, USDC_MARKET, usdc(250), usdc(100), usdc(150));

    state.open_position(CAROL, USDC_MARKET, PositionSide::Borrower, |position| {
        assert!(!position.is_collateral);
        assert_eq!(position.borrow_count, 1);
        assert_raw(&position.balance, usdc(250), "debt");
    });

    state.check_protocol(|protocol| {
        assert_eq!(protocol.cumulative_unique_borrowers, 1);
        assert_raw(&protocol.cumulative_borrow_usd, 250 * WAD, "cumulative borrow usd");
        assert_raw(&protocol.total_borrow_balance_usd, 250 * WAD, "borrow balance usd");
    });

    state.repaid(CAROL, USDC_MARKET, usdc(250), 0, 0);

    assert_eq!(
        state
            .position_counter(CAROL, USDC_MARKET, PositionSide::Borrower)
            .next_count,
        1
    );
    let account = state.account_state(CAROL);
    assert_eq!(account.borrow_count, 1);
    assert_eq!(account.repay_count, 1);
    assert_eq!(account.closed_position_count, 1);

    state.check_market(USDC_MARKET, |market| {
        assert_eq!(market.counters.borrowing_position_count, 1);
        assert_eq!(market.counters.repay_count, 1);
        assert_raw(&market.scaled_borrow_on_pool, 0, "scaled borrow on pool");
        assert_raw(&market.scaled_borrow_in_p2p, 0, "scaled borrow in p2p");
        assert_raw(&market.virtual_scaled_borrow, 0, "virtual borrow");
        assert_raw(&market.total_borrow_balance_usd, 0, "borrow usd");
    });
}

/// Tests that balances are valued at the stored indexes after a reserve update.
#[test]
fn supply_after_reserve_update_values_balances_at_new_indexes() {
    let mut state = IndexerTestState::with_usdc_market();

    state.advance_time(3_600);
    state.reserve_update(USDC_MARKET, WAD + WAD / 100, WAD + WAD / 50, 0, 0);

    // 1010 underlying on pool and 1014.5 underlying in P2P
    state.supplied(ALICE, USDC_MARKET, usdc(2_024) + 500_000, usdc(1_000), usdc(1_000));

    state.open_position(ALICE, USDC_MARKET, PositionSide::Collateral, |position| {
        assert_raw(&position.balance, 2_024_500_000, "balance");
        // 1000 * 1.0145 / 1.01, rounded half up
        assert_raw(&position.virtual_p2p, 1_004_455_446, "virtual p2p");
    });
}

/// Tests that the market aggregates stay equal to the sum of the open
/// positions across interleaved accounts, sides and index moves.
#[test]
fn market_aggregates_match_sum_of_positions() {
    let mut state = IndexerTestState::with_usdc_market();
    let suppliers = [ALICE, BOB, CAROL];

    state.supplied(ALICE, USDC_MARKET, usdc(1_000), usdc(700), usdc(300));
    state.supplied(BOB, USDC_MARKET, usdc(200), usdc(200), 0);
    state.borrowed(DAVE, USDC_MARKET, usdc(300), usdc(100), usdc(200));

    state.advance_time(3_600);
    state.reserve_update(USDC_MARKET, WAD + WAD / 100, WAD + WAD / 50, 0, 0);

    state.supplied(CAROL, USDC_MARKET, usdc(50), 0, usdc(49));
    state.supplier_position_updated(ALICE, USDC_MARKET, usdc(500), usdc(497));
    state.withdrawn(BOB, USDC_MARKET, usdc(202), 0, 0);

    state.advance_time(3_600);
    state.reserve_update(USDC_MARKET, WAD + WAD / 50, WAD + WAD / 25, 0, 0);

    state.supplied(BOB, USDC_MARKET, usdc(30), usdc(29), 0);
    state.repaid(DAVE, USDC_MARKET, usdc(100), usdc(40), usdc(160));
    state.withdrawn(CAROL, USDC_MARKET, usdc(10), 0, usdc(39));

    state.check_contract(|sc| {
        let market: ManagedAddress<DebugApi> = USDC_MARKET.to_managed_address();
        let stored = sc.market(&market).get();

        let mut on_pool = BigUint::<DebugApi>::zero();
        let mut in_p2p = BigUint::<DebugApi>::zero();
        let mut virtual_p2p = BigUint::<DebugApi>::zero();
        for supplier in suppliers {
            let account: ManagedAddress<DebugApi> = supplier.to_managed_address();
            if let Ok(position) = sc.find_open_position(&account, &market, PositionSide::Collateral) {
                on_pool += position.balance_on_pool.into_raw_units();
                in_p2p += position.balance_in_p2p.into_raw_units();
                virtual_p2p += position.virtual_p2p.into_raw_units();
            }
        }

        assert_eq!(stored.scaled_supply_on_pool.into_raw_units(), &on_pool);
        assert_eq!(stored.scaled_supply_in_p2p.into_raw_units(), &in_p2p);
        assert_eq!(stored.virtual_scaled_supply.into_raw_units(), &virtual_p2p);

        let dave: ManagedAddress<DebugApi> = DAVE.to_managed_address();
        let debt = sc
            .find_open_position(&dave, &market, PositionSide::Borrower)
            .unwrap();
        assert_eq!(stored.scaled_borrow_on_pool, debt.balance_on_pool);
        assert_eq!(stored.scaled_borrow_in_p2p, debt.balance_in_p2p);
        assert_eq!(stored.virtual_scaled_borrow, debt.virtual_p2p);
    });

    // bob reopened after closing, carol and alice never closed
    let counters = state.market_counters(USDC_MARKET);
    assert_eq!(counters.position_count, 5);
    assert_eq!(counters.open_position_count, 4);
    assert_eq!(counters.closed_position_count, 1);
}

/// Tests a re-match of a known account: balances move, no volume is booked.
#[test]
fn supplier_position_updated_moves_balances_only() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(1_000), usdc(1_000), 0);
    state.supplier_position_updated(ALICE, USDC_MARKET, usdc(400), usdc(600));

    state.open_position(ALICE, USDC_MARKET, PositionSide::Collateral, |position| {
        assert_eq!(position.deposit_count, 1);
        assert_raw(&position.balance_on_pool, usdc(400), "on pool");
        assert_raw(&position.balance_in_p2p, usdc(600), "in p2p");
        assert_raw(&position.balance, usdc(1_000), "balance");
    });

    state.check_market(USDC_MARKET, |market| {
        assert_eq!(market.counters.deposit_count, 1);
        assert_raw(&market.scaled_supply_on_pool, usdc(400), "scaled on pool");
        assert_raw(&market.scaled_supply_in_p2p, usdc(600), "scaled in p2p");
        assert_raw(&market.cumulative_deposit_usd, 1_000 * WAD, "cumulative deposit usd");
    });
    assert_eq!(state.account_state(ALICE).deposit_count, 1);
}

/// Tests a borrower re-match for an account that only supplied so far: the
/// borrow position is opened without counting as a borrowing position.
#[test]
fn borrower_position_updated_opens_position_for_known_account() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(1_000), usdc(1_000), 0);

    state.borrower_position_updated(ALICE, USDC_MARKET, usdc(20), usdc(30));

    state.open_position(ALICE, USDC_MARKET, PositionSide::Borrower, |position| {
        assert_eq!(position.counter, 0);
        assert_eq!(position.borrow_count, 0);
        assert_raw(&position.balance, usdc(50), "debt");
    });

    let counters = state.market_counters(USDC_MARKET);
    assert_eq!(counters.open_position_count, 2);
    assert_eq!(counters.borrowing_position_count, 0);
    assert_eq!(state.account_state(ALICE).open_position_count, 2);

    state.check_protocol(|protocol| {
        assert_eq!(protocol.cumulative_unique_borrowers, 0);
        assert_eq!(protocol.cumulative_unique_users, 1);
    });
}

/// Tests a zero-balance re-match on a side without an open position: nothing
/// is opened.
#[test]
fn empty_position_update_does_not_open_position() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(1_000), usdc(1_000), 0);
    state.borrower_position_updated(ALICE, USDC_MARKET, 0, 0);

    assert_eq!(state.protocol_counts(), (1, 1, 1));
    let counters = state.market_counters(USDC_MARKET);
    assert_eq!(counters.position_count, 1);
    assert_eq!(counters.open_position_count, 1);
    assert_eq!(state.account_state(ALICE).open_position_count, 1);

    state.check_contract(|sc| {
        let alice: ManagedAddress<DebugApi> = ALICE.to_managed_address();
        let market: ManagedAddress<DebugApi> = USDC_MARKET.to_managed_address();
        assert!(sc
            .position_counter(&alice, &market, PositionSide::Borrower)
            .is_empty());
    });
}

/// Tests a re-match bringing an open position to zero: it stays open until
/// the Withdrawn event that follows closes it.
#[test]
fn position_update_to_zero_is_closed_by_following_withdrawal() {
    let mut state = IndexerTestState::with_usdc_market();

    state.supplied(ALICE, USDC_MARKET, usdc(1_000), usdc(1_000), 0);
    state.supplier_position_updated(ALICE, USDC_MARKET, 0, 0);

    state.open_position(ALICE, USDC_MARKET, PositionSide::Collateral, |position| {
        assert_eq!(position.counter, 0);
        assert_raw(&position.balance, 0, "balance");
    });

    state.withdrawn(ALICE, USDC_MARKET, usdc(1_000), 0, 0);

    assert_eq!(state.position_counter(ALICE, USDC_MARKET, PositionSide::Collateral).next_count, 1);
    assert_eq!(state.protocol_counts(), (0, 1, 1));
    state.check_market(USDC_MARKET, |market| {
        assert_eq!(market.counters.withdraw_count, 1);
        assert_eq!(market.counters.closed_position_count, 1);
        assert_raw(&market.scaled_supply_on_pool, 0, "scaled on pool");
    });
}
