use common_constants::{BPS, BPS_PRECISION, MAX_ASSET_DECIMALS};
use common_errors::{
    ERROR_EMPTY_TX_HASH, ERROR_EVENT_OUT_OF_ORDER, ERROR_INVALID_ASSET_DECIMALS,
    ERROR_INVALID_P2P_INDEX_CURSOR, ERROR_INVALID_POOL_INDEX, ERROR_INVALID_RESERVE_FACTOR,
};
use common_structs::{EventMeta, NotFound, Updated};

use crate::storage;

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait ValidationModule:
    storage::Storage + common_events::EventsModule + common_math::SharedMathModule
{
    /// Events are consumed strictly once, in `(block, log index)` order.
    fn require_event_in_order(&self, event: &EventMeta<Self::Api>) {
        require!(!event.tx_hash.is_empty(), ERROR_EMPTY_TX_HASH);

        let cursor = self.last_event_cursor().get();
        require!(
            cursor.is_before(event.block_number, event.log_index),
            ERROR_EVENT_OUT_OF_ORDER
        );
    }

    fn require_positive_index(&self, index: &BigUint) {
        require!(index > &BigUint::zero(), ERROR_INVALID_POOL_INDEX);
    }

    fn require_asset_decimals(&self, asset_decimals: NumDecimals) {
        require!(
            asset_decimals <= MAX_ASSET_DECIMALS,
            ERROR_INVALID_ASSET_DECIMALS
        );
    }

    fn validate_reserve_factor(&self, reserve_factor: &BigUint) -> ManagedDecimal<Self::Api, NumDecimals> {
        require!(
            reserve_factor <= &BigUint::from(BPS as u64),
            ERROR_INVALID_RESERVE_FACTOR
        );
        self.to_decimal(reserve_factor.clone(), BPS_PRECISION)
    }

    fn validate_p2p_index_cursor(&self, cursor: &BigUint) -> ManagedDecimal<Self::Api, NumDecimals> {
        require!(cursor <= &BigUint::from(BPS as u64), ERROR_INVALID_P2P_INDEX_CURSOR);
        self.to_decimal(cursor.clone(), BPS_PRECISION)
    }

    /// Turns a missing entity into an `anomaly` log. Nothing else is written for
    /// the event apart from the consumed cursor.
    fn report_outcome(
        &self,
        outcome: Result<Updated, NotFound>,
        event: &EventMeta<Self::Api>,
        market: &ManagedAddress,
        account: &ManagedAddress,
    ) {
        if let Err(kind) = outcome {
            self.anomaly_event(kind, market, account, &event.tx_hash, event.log_index);
        }
    }
}
