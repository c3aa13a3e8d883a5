#![no_std]

multiversx_sc::imports!();
multiversx_sc::derive_imports!();
pub use common_structs::*;

#[multiversx_sc::module]
pub trait EventsModule {
    #[event("market_created")]
    fn market_created_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] underlying: &ManagedAddress,
        #[indexed] flavor: IndexFlavor,
        #[indexed] asset_decimals: NumDecimals,
        #[indexed] pool_supply_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] pool_borrow_index: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("market_params_updated")]
    fn market_params_updated_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] reserve_factor: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] p2p_index_cursor: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("market_flags_updated")]
    fn market_flags_updated_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] flag: MarketFlag,
        #[indexed] value: bool,
    );

    #[event("price_updated")]
    fn price_updated_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] price_usd: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("reserve_update")]
    fn reserve_update_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] pool_supply_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] pool_borrow_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] pool_supply_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] pool_borrow_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] timestamp: u64,
    );

    #[event("p2p_indexes_updated")]
    fn p2p_indexes_updated_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] p2p_supply_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] p2p_borrow_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] last_pool_supply_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] last_pool_borrow_index: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("p2p_rates_updated")]
    fn p2p_rates_updated_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] p2p_supply_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] p2p_borrow_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("p2p_delta_updated")]
    fn p2p_delta_updated_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] side: PositionSide,
        #[indexed] p2p_delta: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("p2p_amounts_updated")]
    fn p2p_amounts_updated_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] p2p_supply_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] p2p_borrow_amount: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("idle_supply_updated")]
    fn idle_supply_updated_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] idle_supply: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    // Revenue accrued over one index sync, all values in USD (WAD).
    #[event("revenue")]
    fn revenue_event(
        &self,
        #[indexed] market: &ManagedAddress,
        #[indexed] total_revenue_usd: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] supply_side_revenue_usd: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] protocol_side_revenue_usd: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    // `amount` is the underlying moved by the event; zero for scaled-balance syncs
    #[event("position_update")]
    fn position_update_event(
        &self,
        #[indexed] kind: EventKind,
        #[indexed] amount: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] position: &Position<Self::Api>,
    );

    #[event("position_closed")]
    fn position_closed_event(
        &self,
        #[indexed] account: &ManagedAddress,
        #[indexed] market: &ManagedAddress,
        #[indexed] side: PositionSide,
        #[indexed] counter: u64,
        #[indexed] closed: &BlockStamp<Self::Api>,
    );

    #[event("liquidation")]
    fn liquidation_event(
        &self,
        #[indexed] collateral_market: &ManagedAddress,
        #[indexed] debt_market: &ManagedAddress,
        #[indexed] liquidator: &ManagedAddress,
        #[indexed] borrower: &ManagedAddress,
        #[indexed] amount_usd: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] profit_usd: &BigInt,
    );

    // A relayed event referenced an entity the ledger does not hold; nothing was mutated.
    #[event("anomaly")]
    fn anomaly_event(
        &self,
        #[indexed] kind: NotFound,
        #[indexed] market: &ManagedAddress,
        #[indexed] account: &ManagedAddress,
        #[indexed] tx_hash: &ManagedBuffer,
        #[indexed] log_index: u64,
    );
}
