//! Events emitted by the exchange and its LP token
use odra::prelude::*;
use odra::casper_types::{U256, U512};
use odra::Address;

/// Liquidity was deposited into the pool
#[odra::event]
pub struct LiquidityAdded {
    /// Depositor
    pub provider: Address,
    /// Native amount deposited
    pub native_amount: U512,
    /// Token amount deposited
    pub token_amount: U256,
    /// LP tokens minted
    pub liquidity: U256,
}

/// Liquidity was withdrawn from the pool
#[odra::event]
pub struct LiquidityRemoved {
    /// Withdrawer
    pub provider: Address,
    /// Native amount paid out
    pub native_amount: U512,
    /// Token amount paid out
    pub token_amount: U256,
    /// LP tokens burned
    pub liquidity: U256,
}

/// Native currency was swapped for tokens
#[odra::event]
pub struct TokensPurchased {
    pub buyer: Address,
    pub native_sold: U512,
    pub tokens_bought: U256,
}

/// Tokens were swapped for native currency
#[odra::event]
pub struct NativePurchased {
    pub buyer: Address,
    pub tokens_sold: U256,
    pub native_bought: U512,
}

/// CEP-18 transfer
#[odra::event]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// CEP-18 approval
#[odra::event]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
}
