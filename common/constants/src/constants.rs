#![no_std]

pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;
pub const HALF_RAY: u128 = 500_000_000_000_000_000_000_000_000;
pub const RAY_PRECISION: usize = 27;

/// Index scale of Compound-style markets, also the USD precision of the ledger
pub const WAD: u128 = 1_000_000_000_000_000_000;
pub const HALF_WAD: u128 = 500_000_000_000_000_000;
pub const WAD_PRECISION: usize = 18;

pub const BPS: usize = 10_000; // 100%
pub const HALF_BPS: usize = 5_000;
pub const BPS_PRECISION: usize = 4;

/// Largest accepted reserve factor / P2P index cursor (100%)
pub const MAX_PERCENTAGE_BPS: usize = BPS;

pub const SECONDS_PER_HOUR: u64 = 3_600;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Largest accepted token decimals for a market's underlying
pub const MAX_ASSET_DECIMALS: usize = 36;
