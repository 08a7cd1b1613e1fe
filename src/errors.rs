//! Error definitions for the exchange contract
use odra::prelude::*;
use odra::OdraError;

/// Custom errors for the exchange contract
#[derive(OdraError, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// Pool reserves are empty for the requested operation
    #[odra_error(code = 1)]
    InsufficientLiquidity,

    /// Swap or deposit input amount is zero
    #[odra_error(code = 2)]
    InsufficientInputAmount,

    /// Swap output is below the caller's minimum
    #[odra_error(code = 3)]
    InsufficientOutputAmount,

    /// Required token deposit exceeds the caller's maximum
    #[odra_error(code = 4)]
    InsufficientTokenAmount,

    /// Caller holds fewer LP tokens than requested to burn
    #[odra_error(code = 5)]
    InsufficientBalance,

    /// Token transfer returned failure
    #[odra_error(code = 6)]
    TransferFailed,

    /// Overflow error
    #[odra_error(code = 7)]
    Overflow,

    /// Underflow error
    #[odra_error(code = 8)]
    Underflow,

    /// Division by zero
    #[odra_error(code = 9)]
    DivisionByZero,

    /// No LP tokens would be minted for the deposit
    #[odra_error(code = 10)]
    InsufficientLiquidityMinted,
}
