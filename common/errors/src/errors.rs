#![no_std]

pub static ERROR_MARKET_ALREADY_EXISTS: &[u8] = b"Market already exists.";

pub static ERROR_MARKET_NOT_FOUND: &[u8] = b"Market not found.";

pub static ERROR_INVALID_POOL_INDEX: &[u8] = b"Pool index must be greater than zero.";

pub static ERROR_INVALID_RESERVE_FACTOR: &[u8] = b"Reserve factor cannot exceed 100%.";

pub static ERROR_INVALID_P2P_INDEX_CURSOR: &[u8] = b"P2P index cursor cannot exceed 100%.";

pub static ERROR_INVALID_ASSET_DECIMALS: &[u8] = b"Asset decimals exceed the supported maximum.";

pub static ERROR_EVENT_OUT_OF_ORDER: &[u8] =
    b"Event must come after the last processed block and log index.";

pub static ERROR_EMPTY_TX_HASH: &[u8] = b"Event transaction hash cannot be empty.";

pub static ERROR_INVALID_PRICE: &[u8] = b"Price must be greater than zero.";

pub static ERROR_INVALID_PROTOCOL_NAME: &[u8] = b"Protocol name cannot be empty.";
