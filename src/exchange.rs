//! Exchange contract: a single constant-product pool trading the native
//! currency against a CEP-18 token
//!
//! The contract's own balance is the native reserve and its CEP-18 balance
//! is the token reserve. The exchange doubles as the LP token for the pool,
//! so liquidity shares are minted and burned on the contract itself.
use odra::prelude::*;
use odra::casper_types::{U256, U512};
use odra::{Address, SubModule, Var};

use crate::errors::ExchangeError;
use crate::events::{LiquidityAdded, LiquidityRemoved, NativePurchased, TokensPurchased};
use crate::math::{AmmMath, SafeMath};
use crate::token::{Cep18TokenContractRef, LpToken};

/// Exchange contract
#[odra::module]
pub struct Exchange {
    /// LP token for the pool
    lp_token: SubModule<LpToken>,
    /// Address of the traded CEP-18 token
    token: Var<Address>,
}

#[odra::module]
impl Exchange {
    /// Initialize the exchange with the traded token address
    pub fn init(&mut self, token: Address) {
        self.token.set(token);

        let name = String::from("Crypto Dev LP Token");
        let symbol = String::from("CD-LP");
        self.lp_token.init(name, symbol);
    }

    // ============ View Functions ============

    /// Get the traded token address
    pub fn token_address(&self) -> Address {
        self.token.get_or_revert()
    }

    /// Get the token reserve (the exchange's CEP-18 balance)
    pub fn token_reserve(&self) -> U256 {
        let token = Cep18TokenContractRef::new(self.env(), self.token_address());
        token.balance_of(self.env().self_address())
    }

    /// Get the native reserve (the exchange's own balance)
    pub fn native_reserve(&self) -> U512 {
        self.env().self_balance()
    }

    /// Get LP token total supply
    pub fn total_supply(&self) -> U256 {
        self.lp_token.total_supply()
    }

    /// Get LP token balance of an address
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.lp_token.balance_of(owner)
    }

    /// Get LP token allowance for a spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.lp_token.allowance(owner, spender)
    }

    /// Transfer LP tokens
    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        self.lp_token.transfer(to, amount)
    }

    /// Approve LP token spending
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        self.lp_token.approve(spender, amount)
    }

    /// Transfer LP tokens from another address
    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        self.lp_token.transfer_from(from, to, amount)
    }

    /// Swap output for a given input amount and pair of reserves.
    /// The same formula the swap entry points settle with, exposed so
    /// clients can preview a trade.
    pub fn get_amount_of_tokens(
        &self,
        input_amount: U256,
        input_reserve: U256,
        output_reserve: U256,
    ) -> Result<U256, ExchangeError> {
        AmmMath::get_amount_out(input_amount, input_reserve, output_reserve)
    }

    /// Preview the amounts released for burning LP tokens. Returns zero
    /// amounts instead of failing when the pool holds nothing.
    pub fn remove_liquidity_quote(&self, amount: U256) -> (U512, U256) {
        let total_supply = self.lp_token.total_supply();
        let native_reserve = match SafeMath::to_u256(self.env().self_balance()) {
            Ok(value) => value,
            Err(_) => return (U512::zero(), U256::zero()),
        };

        match AmmMath::burn_amounts(amount, native_reserve, self.token_reserve(), total_supply) {
            Ok((native_amount, token_amount)) => match SafeMath::to_u512(native_amount) {
                Ok(native_out) => (native_out, token_amount),
                Err(_) => (U512::zero(), U256::zero()),
            },
            Err(_) => (U512::zero(), U256::zero()),
        }
    }

    // ============ Liquidity Functions ============

    /// Add liquidity to the pool, with the native deposit attached to the
    /// call. Returns the amount of LP tokens minted.
    ///
    /// On the first deposit the caller sets the ratio: exactly `max_tokens`
    /// is pulled in. Afterwards the token amount follows the reserve ratio
    /// and `max_tokens` only bounds it.
    #[odra(payable)]
    pub fn add_liquidity(&mut self, max_tokens: U256) -> Result<U256, ExchangeError> {
        let attached = self.env().attached_value();
        if attached.is_zero() {
            return Err(ExchangeError::InsufficientInputAmount);
        }

        let caller = self.env().caller();
        let token_reserve = self.token_reserve();
        let total_supply = self.lp_token.total_supply();

        let (token_amount, liquidity) = if token_reserve.is_zero() {
            if max_tokens.is_zero() {
                return Err(ExchangeError::InsufficientTokenAmount);
            }
            self.pull_tokens(caller, max_tokens)?;

            // First deposit: shares equal the pool's native balance
            let liquidity = SafeMath::to_u256(self.env().self_balance())?;
            (max_tokens, liquidity)
        } else {
            // Attached value is already part of the balance; price against
            // the reserve as it stood before this deposit
            let native_reserve = SafeMath::to_u256(SafeMath::sub_u512(
                self.env().self_balance(),
                attached,
            )?)?;
            let deposit = SafeMath::to_u256(attached)?;

            let token_amount = AmmMath::quote(deposit, native_reserve, token_reserve)?;
            if token_amount > max_tokens {
                return Err(ExchangeError::InsufficientTokenAmount);
            }
            self.pull_tokens(caller, token_amount)?;

            let liquidity = AmmMath::liquidity_minted(deposit, native_reserve, total_supply)?;
            (token_amount, liquidity)
        };

        if liquidity.is_zero() {
            return Err(ExchangeError::InsufficientLiquidityMinted);
        }
        self.lp_token.mint(caller, liquidity);

        self.env().emit_event(LiquidityAdded {
            provider: caller,
            native_amount: attached,
            token_amount,
            liquidity,
        });

        Ok(liquidity)
    }

    /// Burn LP tokens and withdraw the proportional share of both reserves.
    /// Returns the native and token amounts paid out.
    pub fn remove_liquidity(&mut self, amount: U256) -> Result<(U512, U256), ExchangeError> {
        if amount.is_zero() {
            return Err(ExchangeError::InsufficientInputAmount);
        }

        let caller = self.env().caller();
        if self.lp_token.balance_of(caller) < amount {
            return Err(ExchangeError::InsufficientBalance);
        }

        let total_supply = self.lp_token.total_supply();
        let native_reserve = SafeMath::to_u256(self.env().self_balance())?;
        let token_reserve = self.token_reserve();

        let (native_amount, token_amount) =
            AmmMath::burn_amounts(amount, native_reserve, token_reserve, total_supply)?;

        self.lp_token.burn(caller, amount);

        let native_out = SafeMath::to_u512(native_amount)?;
        self.env().transfer_tokens(&caller, &native_out);
        self.push_tokens(caller, token_amount)?;

        self.env().emit_event(LiquidityRemoved {
            provider: caller,
            native_amount: native_out,
            token_amount,
            liquidity: amount,
        });

        Ok((native_out, token_amount))
    }

    // ============ Swap Functions ============

    /// Swap the attached native amount for tokens. Returns the tokens bought.
    #[odra(payable)]
    pub fn swap_native_for_tokens(&mut self, min_tokens: U256) -> Result<U256, ExchangeError> {
        let attached = self.env().attached_value();
        if attached.is_zero() {
            return Err(ExchangeError::InsufficientInputAmount);
        }

        let caller = self.env().caller();
        let token_reserve = self.token_reserve();
        let native_reserve = SafeMath::to_u256(SafeMath::sub_u512(
            self.env().self_balance(),
            attached,
        )?)?;

        let tokens_bought = AmmMath::get_amount_out(
            SafeMath::to_u256(attached)?,
            native_reserve,
            token_reserve,
        )?;
        if tokens_bought < min_tokens {
            return Err(ExchangeError::InsufficientOutputAmount);
        }

        self.push_tokens(caller, tokens_bought)?;

        self.env().emit_event(TokensPurchased {
            buyer: caller,
            native_sold: attached,
            tokens_bought,
        });

        Ok(tokens_bought)
    }

    /// Swap `tokens_sold` tokens for native currency. Returns the native
    /// amount bought.
    pub fn swap_tokens_for_native(
        &mut self,
        tokens_sold: U256,
        min_native: U512,
    ) -> Result<U512, ExchangeError> {
        if tokens_sold.is_zero() {
            return Err(ExchangeError::InsufficientInputAmount);
        }

        let caller = self.env().caller();
        let token_reserve = self.token_reserve();
        let native_reserve = SafeMath::to_u256(self.env().self_balance())?;

        let native_bought =
            AmmMath::get_amount_out(tokens_sold, token_reserve, native_reserve)?;
        let native_out = SafeMath::to_u512(native_bought)?;
        if native_out < min_native {
            return Err(ExchangeError::InsufficientOutputAmount);
        }

        self.pull_tokens(caller, tokens_sold)?;
        self.env().transfer_tokens(&caller, &native_out);

        self.env().emit_event(NativePurchased {
            buyer: caller,
            tokens_sold,
            native_bought: native_out,
        });

        Ok(native_out)
    }

    // ============ Internal Functions ============

    /// Pull tokens from an address into the exchange
    fn pull_tokens(&self, from: Address, amount: U256) -> Result<(), ExchangeError> {
        let mut token = Cep18TokenContractRef::new(self.env(), self.token_address());
        let success = token.transfer_from(from, self.env().self_address(), amount);
        if !success {
            return Err(ExchangeError::TransferFailed);
        }
        Ok(())
    }

    /// Send tokens from the exchange to an address
    fn push_tokens(&self, to: Address, amount: U256) -> Result<(), ExchangeError> {
        let mut token = Cep18TokenContractRef::new(self.env(), self.token_address());
        let success = token.transfer(to, amount);
        if !success {
            return Err(ExchangeError::TransferFailed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, NoArgs};
    use crate::token::CryptoDevToken;

    #[test]
    fn test_exchange_deploys_against_token() {
        let env = odra_test::env();
        let token = CryptoDevToken::deploy(&env, NoArgs);

        let init_args = ExchangeInitArgs {
            token: token.address(),
        };
        let exchange = Exchange::deploy(&env, init_args);

        assert_eq!(exchange.token_address(), token.address());
        assert_eq!(exchange.token_reserve(), U256::zero());
        assert_eq!(exchange.native_reserve(), U512::zero());
        assert_eq!(exchange.total_supply(), U256::zero());
    }
}
