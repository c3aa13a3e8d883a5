use common_structs::{
    AccountState, ActivityTag, ActorRole, EventCursor, FinancialsSnapshot, MarketSnapshot,
    MarketState, Period, Position, PositionCounter, PositionSide, PositionSnapshot,
    ProtocolState, TokenMetadata, UsageSnapshot,
};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait Storage {
    /// Protocol-wide aggregates, created at deployment.
    #[view(getProtocol)]
    #[storage_mapper("protocol")]
    fn protocol(&self) -> SingleValueMapper<ProtocolState<Self::Api>>;

    /// Pool-token addresses of every tracked market.
    #[view(getMarkets)]
    #[storage_mapper("markets")]
    fn markets(&self) -> UnorderedSetMapper<ManagedAddress>;

    #[view(getMarket)]
    #[storage_mapper("market")]
    fn market(&self, market: &ManagedAddress) -> SingleValueMapper<MarketState<Self::Api>>;

    /// Name, symbol and decimals of an underlying token, as supplied at market creation.
    #[view(getTokenMetadata)]
    #[storage_mapper("token_metadata")]
    fn token_metadata(
        &self,
        underlying: &ManagedAddress,
    ) -> SingleValueMapper<TokenMetadata<Self::Api>>;

    #[view(getAccount)]
    #[storage_mapper("account")]
    fn account(&self, account: &ManagedAddress) -> SingleValueMapper<AccountState>;

    /// Suffix of the next position id for `(account, market, side)`.
    #[view(getPositionCounter)]
    #[storage_mapper("position_counter")]
    fn position_counter(
        &self,
        account: &ManagedAddress,
        market: &ManagedAddress,
        side: PositionSide,
    ) -> SingleValueMapper<PositionCounter>;

    #[view(getPosition)]
    #[storage_mapper("position")]
    fn position(
        &self,
        account: &ManagedAddress,
        market: &ManagedAddress,
        side: PositionSide,
        counter: u64,
    ) -> SingleValueMapper<Position<Self::Api>>;

    /// One entry per event that touched the position.
    #[view(getPositionSnapshots)]
    #[storage_mapper("position_snapshots")]
    fn position_snapshots(
        &self,
        account: &ManagedAddress,
        market: &ManagedAddress,
        side: PositionSide,
        counter: u64,
    ) -> VecMapper<PositionSnapshot<Self::Api>>;

    /// Addresses that ever acted in the given role.
    #[storage_mapper("actors")]
    fn actors(&self, role: ActorRole) -> UnorderedSetMapper<ManagedAddress>;

    /// Addresses active in a usage bucket, per activity.
    #[storage_mapper("active_accounts")]
    fn active_accounts(
        &self,
        period: Period,
        bucket: u64,
        tag: ActivityTag,
    ) -> UnorderedSetMapper<ManagedAddress>;

    #[storage_mapper("market_snapshot")]
    fn market_snapshot(
        &self,
        period: Period,
        market: &ManagedAddress,
        bucket: u64,
    ) -> SingleValueMapper<MarketSnapshot<Self::Api>>;

    #[view(getFinancialsSnapshot)]
    #[storage_mapper("financials_snapshot")]
    fn financials_snapshot(&self, day: u64) -> SingleValueMapper<FinancialsSnapshot<Self::Api>>;

    #[storage_mapper("usage_snapshot")]
    fn usage_snapshot(&self, period: Period, bucket: u64) -> SingleValueMapper<UsageSnapshot>;

    /// `(block, log index)` of the last consumed event.
    #[view(getLastEventCursor)]
    #[storage_mapper("last_event_cursor")]
    fn last_event_cursor(&self) -> SingleValueMapper<EventCursor>;
}
