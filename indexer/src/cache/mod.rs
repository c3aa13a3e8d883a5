use core::ops::{Deref, DerefMut};

use common_structs::{EventCursor, EventMeta, MarketState, NotFound, ProtocolState};

multiversx_sc::imports!();
multiversx_sc::derive_imports!();

/// Protocol state and the event being processed, loaded once per relayed event.
///
/// Committed on drop together with the event cursor, so an event that ends in an
/// anomaly is still marked as consumed.
pub struct Cache<'a, C>
where
    C: crate::storage::Storage,
{
    sc_ref: &'a C,
    pub protocol: ProtocolState<C::Api>,
    pub event: EventMeta<C::Api>,
}

impl<'a, C> Cache<'a, C>
where
    C: crate::storage::Storage,
{
    pub fn new(sc_ref: &'a C, event: EventMeta<C::Api>) -> Self {
        Cache {
            protocol: sc_ref.protocol().get(),
            event,
            sc_ref,
        }
    }

    pub fn timestamp(&self) -> u64 {
        self.event.timestamp
    }
}

impl<C> Drop for Cache<'_, C>
where
    C: crate::storage::Storage,
{
    fn drop(&mut self) {
        self.sc_ref.protocol().set(&self.protocol);
        self.sc_ref.last_event_cursor().set(EventCursor {
            block_number: self.event.block_number,
            log_index: self.event.log_index,
        });
    }
}

/// In-memory view of one market, written back when dropped.
pub struct MarketCache<'a, C>
where
    C: crate::storage::Storage,
{
    sc_ref: &'a C,
    state: MarketState<C::Api>,
}

impl<'a, C> MarketCache<'a, C>
where
    C: crate::storage::Storage,
{
    pub fn load(sc_ref: &'a C, market: &ManagedAddress<C::Api>) -> Result<Self, NotFound> {
        let mapper = sc_ref.market(market);
        if mapper.is_empty() {
            return Err(NotFound::Market);
        }

        Ok(MarketCache {
            state: mapper.get(),
            sc_ref,
        })
    }
}

impl<C> Deref for MarketCache<'_, C>
where
    C: crate::storage::Storage,
{
    type Target = MarketState<C::Api>;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl<C> DerefMut for MarketCache<'_, C>
where
    C: crate::storage::Storage,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl<C> Drop for MarketCache<'_, C>
where
    C: crate::storage::Storage,
{
    fn drop(&mut self) {
        self.sc_ref.market(&self.state.market).set(&self.state);
    }
}
