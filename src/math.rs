//! Pricing and liquidity math for the constant-product pool
//!
//! All formulas use integer arithmetic with truncating division so that the
//! amounts computed off chain by previews match the amounts the deployed
//! contract settles on chain.
use odra::casper_types::{U256, U512};

use crate::errors::ExchangeError;

/// Swap fee taken from the input amount: 1%
pub const FEE_NUMERATOR: u64 = 99;
/// Fee scale
pub const FEE_DENOMINATOR: u64 = 100;

/// Checked arithmetic over `U256`, mapping failures onto [`ExchangeError`]
pub struct SafeMath;

impl SafeMath {
    pub fn add(a: U256, b: U256) -> Result<U256, ExchangeError> {
        a.checked_add(b).ok_or(ExchangeError::Overflow)
    }

    pub fn sub(a: U256, b: U256) -> Result<U256, ExchangeError> {
        a.checked_sub(b).ok_or(ExchangeError::Underflow)
    }

    pub fn mul(a: U256, b: U256) -> Result<U256, ExchangeError> {
        a.checked_mul(b).ok_or(ExchangeError::Overflow)
    }

    pub fn div(a: U256, b: U256) -> Result<U256, ExchangeError> {
        if b.is_zero() {
            return Err(ExchangeError::DivisionByZero);
        }
        Ok(a / b)
    }

    pub fn sub_u512(a: U512, b: U512) -> Result<U512, ExchangeError> {
        a.checked_sub(b).ok_or(ExchangeError::Underflow)
    }

    /// Narrows a native amount into the token/LP domain.
    pub fn to_u256(value: U512) -> Result<U256, ExchangeError> {
        if value > U512::from(u128::MAX) {
            return Err(ExchangeError::Overflow);
        }
        Ok(U256::from(value.as_u128()))
    }

    /// Widens a token/LP amount into the native domain.
    pub fn to_u512(value: U256) -> Result<U512, ExchangeError> {
        if value > U256::from(u128::MAX) {
            return Err(ExchangeError::Overflow);
        }
        Ok(U512::from(value.as_u128()))
    }
}

/// Constant-product formulas shared by the exchange entry points
pub struct AmmMath;

impl AmmMath {
    /// Amount of the other asset that keeps the reserve ratio for a deposit
    /// of `amount` against `reserve`.
    ///
    /// The reserve being deposited into must already be funded; the empty
    /// pool is the initial-liquidity case where both amounts are free.
    pub fn quote(
        amount: U256,
        reserve: U256,
        other_reserve: U256,
    ) -> Result<U256, ExchangeError> {
        if reserve.is_zero() {
            return Err(ExchangeError::InsufficientLiquidity);
        }
        SafeMath::div(SafeMath::mul(amount, other_reserve)?, reserve)
    }

    /// LP tokens minted for a native deposit against the current supply.
    pub fn liquidity_minted(
        deposit: U256,
        native_reserve: U256,
        total_supply: U256,
    ) -> Result<U256, ExchangeError> {
        if native_reserve.is_zero() {
            return Err(ExchangeError::InsufficientLiquidity);
        }
        SafeMath::div(SafeMath::mul(deposit, total_supply)?, native_reserve)
    }

    /// Native and token amounts released for burning `liquidity` LP tokens.
    pub fn burn_amounts(
        liquidity: U256,
        native_reserve: U256,
        token_reserve: U256,
        total_supply: U256,
    ) -> Result<(U256, U256), ExchangeError> {
        if total_supply.is_zero() {
            return Err(ExchangeError::InsufficientLiquidity);
        }
        if liquidity > total_supply {
            return Err(ExchangeError::InsufficientBalance);
        }
        let native_amount = SafeMath::div(
            SafeMath::mul(liquidity, native_reserve)?,
            total_supply,
        )?;
        let token_amount = SafeMath::div(
            SafeMath::mul(liquidity, token_reserve)?,
            total_supply,
        )?;
        Ok((native_amount, token_amount))
    }

    /// Swap output for `amount_in`, with the fee taken from the input:
    /// `out = in_fee * reserve_out / (reserve_in * 100 + in_fee)` where
    /// `in_fee = in * 99`.
    pub fn get_amount_out(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256, ExchangeError> {
        if amount_in.is_zero() {
            return Err(ExchangeError::InsufficientInputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(ExchangeError::InsufficientLiquidity);
        }

        let amount_in_with_fee = SafeMath::mul(amount_in, U256::from(FEE_NUMERATOR))?;
        let numerator = SafeMath::mul(amount_in_with_fee, reserve_out)?;
        let denominator = SafeMath::add(
            SafeMath::mul(reserve_in, U256::from(FEE_DENOMINATOR))?,
            amount_in_with_fee,
        )?;
        SafeMath::div(numerator, denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u256(value: u64) -> U256 {
        U256::from(value)
    }

    #[test]
    fn test_quote_matches_reserve_ratio() {
        // 250 native against reserves of 1000 native / 4000 tokens
        let required = AmmMath::quote(u256(250), u256(1000), u256(4000)).unwrap();
        assert_eq!(required, u256(1000));

        // Truncating division: 333 * 4000 / 1000 = 1332
        let required = AmmMath::quote(u256(333), u256(1000), u256(4000)).unwrap();
        assert_eq!(required, u256(1332));
    }

    #[test]
    fn test_quote_empty_reserve_fails() {
        let result = AmmMath::quote(u256(250), U256::zero(), u256(4000));
        assert_eq!(result, Err(ExchangeError::InsufficientLiquidity));
    }

    #[test]
    fn test_liquidity_minted_is_proportional() {
        // Deposit half the native reserve, get half the supply
        let minted = AmmMath::liquidity_minted(u256(500), u256(1000), u256(100)).unwrap();
        assert_eq!(minted, u256(50));
    }

    #[test]
    fn test_burn_amounts_floor() {
        let (native, tokens) =
            AmmMath::burn_amounts(u256(33), u256(1000), u256(4000), u256(100)).unwrap();
        assert_eq!(native, u256(330));
        assert_eq!(tokens, u256(1320));
    }

    #[test]
    fn test_burn_full_supply_drains_reserves() {
        let (native, tokens) =
            AmmMath::burn_amounts(u256(100), u256(1000), u256(4000), u256(100)).unwrap();
        assert_eq!(native, u256(1000));
        assert_eq!(tokens, u256(4000));
    }

    #[test]
    fn test_burn_more_than_supply_fails() {
        let result = AmmMath::burn_amounts(u256(101), u256(1000), u256(4000), u256(100));
        assert_eq!(result, Err(ExchangeError::InsufficientBalance));

        let result = AmmMath::burn_amounts(u256(1), u256(1000), u256(4000), U256::zero());
        assert_eq!(result, Err(ExchangeError::InsufficientLiquidity));
    }

    #[test]
    fn test_amount_out_exact_figures() {
        // in_fee = 99_000, out = 99_000 * 10_000 / (1_000_000 + 99_000) = 900
        let out = AmmMath::get_amount_out(u256(1000), u256(10_000), u256(10_000)).unwrap();
        assert_eq!(out, u256(900));
    }

    #[test]
    fn test_amount_out_below_proportional() {
        let reserve_in = u256(10_000);
        let reserve_out = u256(10_000);
        let amount_in = u256(1000);

        let out = AmmMath::get_amount_out(amount_in, reserve_in, reserve_out).unwrap();
        // Fee-free proportional output: in * r_out / (r_in + in) = 909
        let proportional = amount_in * reserve_out / (reserve_in + amount_in);
        assert!(out < proportional);
    }

    #[test]
    fn test_amount_out_monotonic_in_input() {
        let reserve_in = u256(10_000);
        let reserve_out = u256(10_000);

        let mut previous = U256::zero();
        for input in [100u64, 500, 1000, 2000, 5000, 10_000] {
            let out = AmmMath::get_amount_out(u256(input), reserve_in, reserve_out).unwrap();
            assert!(out > previous, "output must grow with input");
            previous = out;
        }
    }

    #[test]
    fn test_amount_out_never_decreases_product() {
        let reserve_in = u256(10_000);
        let reserve_out = u256(10_000);
        let amount_in = u256(1000);

        let out = AmmMath::get_amount_out(amount_in, reserve_in, reserve_out).unwrap();
        let k_before = reserve_in * reserve_out;
        let k_after = (reserve_in + amount_in) * (reserve_out - out);
        assert!(k_after >= k_before);
    }

    #[test]
    fn test_amount_out_rejects_empty_pool() {
        let result = AmmMath::get_amount_out(u256(1000), U256::zero(), u256(10_000));
        assert_eq!(result, Err(ExchangeError::InsufficientLiquidity));

        let result = AmmMath::get_amount_out(U256::zero(), u256(10_000), u256(10_000));
        assert_eq!(result, Err(ExchangeError::InsufficientInputAmount));
    }

    #[test]
    fn test_u512_conversions_round_trip() {
        let value = U256::from(1_000_000_000u64);
        let widened = SafeMath::to_u512(value).unwrap();
        assert_eq!(SafeMath::to_u256(widened).unwrap(), value);

        let too_big = U512::from(u128::MAX) + U512::from(1u64);
        assert_eq!(SafeMath::to_u256(too_big), Err(ExchangeError::Overflow));
    }
}
