#![allow(dead_code)]

use multiversx_sc::types::{TestAddress, TestSCAddress};
use multiversx_sc_scenario::imports::MxscPath;

pub const INDEXER_ADDRESS: TestSCAddress = TestSCAddress::new("indexer");
pub const INDEXER_PATH: MxscPath = MxscPath::new("output/indexer.mxsc.json");

pub const OWNER_ADDRESS: TestAddress = TestAddress::new("owner");
pub const RELAYER_ADDRESS: TestAddress = TestAddress::new("relayer");
pub const STRANGER_ADDRESS: TestAddress = TestAddress::new("stranger");

pub const PROTOCOL_NAME: &[u8] = b"p2p-lending";

// Markets are identified by their pool-token address
pub const USDC_MARKET: TestAddress = TestAddress::new("pool-usdc");
pub const USDC_UNDERLYING: TestAddress = TestAddress::new("usdc");
pub const USDC_DECIMALS: usize = 6;

pub const DAI_MARKET: TestAddress = TestAddress::new("pool-dai");
pub const DAI_UNDERLYING: TestAddress = TestAddress::new("dai");
pub const DAI_DECIMALS: usize = 18;

pub const ALICE: TestAddress = TestAddress::new("alice");
pub const BOB: TestAddress = TestAddress::new("bob");
pub const CAROL: TestAddress = TestAddress::new("carol");
pub const DAVE: TestAddress = TestAddress::new("dave");
pub const LIQUIDATOR: TestAddress = TestAddress::new("liquidator");

pub const WAD: u128 = 1_000_000_000_000_000_000;
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Reserve factor 10%, cursor 50%.
pub const RESERVE_FACTOR_BPS: u64 = 1_000;
pub const P2P_INDEX_CURSOR_BPS: u64 = 5_000;

/// 2023-11-14 22:13:20 UTC, day bucket 19_675.
pub const START_TIMESTAMP: u64 = 1_700_000_000;
pub const START_DAY: u64 = 19_675;
pub const START_HOUR: u64 = 472_222;

pub fn usdc(amount: u128) -> u128 {
    amount * 1_000_000
}

pub fn dai(amount: u128) -> u128 {
    amount * WAD
}
