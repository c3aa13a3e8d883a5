pub mod account;
pub mod borrow;
pub mod liquidation;
pub mod repay;
pub mod supply;
pub mod update;
pub mod withdraw;
