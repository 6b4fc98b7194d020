use alloy_primitives::{address, Address, U256};
use alloy_sol_types::sol;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use super::celo_rpc::CeloRpc;
use super::AprSource;
use crate::aggregate::Aprs;

pub const REGISTRY_ADDRESS: Address = address!("0x000000000000000000000000000000000000ce10");
pub const STCELO_ADDRESS: &str = "0xc668583dcbdc9ae6fa3ce46462758188adfdfc24";

sol! {
    interface IRegistry {
        function getAddressForString(string identifier) external view returns (address);
    }

    interface IEpochRewards {
        function getRewardsMultiplier() external view returns (uint256);
        function getTargetVotingYieldParameters()
            external
            view
            returns (uint256 target, uint256 max, uint256 adjustmentFactor);
    }
}

/// EpochRewards uses Fixidity numbers with 24 decimal digits.
const FIXIDITY_DECIMALS: u64 = 24;
const DAYS_PER_YEAR: u64 = 365;

pub struct StakedCelo {
    rpc: CeloRpc,
}

impl StakedCelo {
    pub fn new(rpc: CeloRpc) -> Self {
        Self { rpc }
    }

    async fn epoch_rewards_address(&self) -> Result<Address> {
        let call = IRegistry::getAddressForStringCall { identifier: "EpochRewards".to_string() };
        let address = self.rpc.read(REGISTRY_ADDRESS, call).await?;
        if address == Address::ZERO {
            bail!("EpochRewards is not registered");
        }
        Ok(address)
    }
}

/// Annualised staking yield in percent, rounded half-up to two decimals.
///
/// `target_voting_yield` is the daily target yield and `rewards_multiplier`
/// the protocol adjustment, both as Fixidity fractions. The whole product is
/// kept in integer hundredths of a percent so nothing is lost before rounding.
pub fn annual_percentage(target_voting_yield: U256, rewards_multiplier: U256) -> Result<f64> {
    let overflow = || anyhow!("apr computation overflowed");
    let scale = U256::from(10u64).pow(U256::from(FIXIDITY_DECIMALS));
    let denominator = scale.checked_mul(scale).ok_or_else(overflow)?;

    let numerator = target_voting_yield
        .checked_mul(U256::from(DAYS_PER_YEAR))
        .and_then(|v| v.checked_mul(rewards_multiplier))
        // percent, then hundredths of a percent
        .and_then(|v| v.checked_mul(U256::from(100u64 * 100)))
        .ok_or_else(overflow)?;

    let hundredths = numerator
        .checked_add(denominator / U256::from(2u64))
        .ok_or_else(overflow)?
        / denominator;
    let hundredths = u64::try_from(hundredths)
        .map_err(|_| anyhow!("apr of {} hundredths is out of range", hundredths))?;
    Ok(hundredths as f64 / 100.0)
}

#[async_trait]
impl AprSource for StakedCelo {
    fn name(&self) -> &str {
        "stcelo"
    }

    async fn fetch(&self) -> Result<Aprs> {
        let epoch_rewards = self.epoch_rewards_address().await?;

        let rewards_multiplier = self
            .rpc
            .read(epoch_rewards, IEpochRewards::getRewardsMultiplierCall {})
            .await?;
        let params = self
            .rpc
            .read(epoch_rewards, IEpochRewards::getTargetVotingYieldParametersCall {})
            .await?;

        let apr = annual_percentage(params.target, rewards_multiplier)?;
        Ok(Aprs::from([(STCELO_ADDRESS.to_string(), apr)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::{SolCall, SolValue};

    fn fixidity(units: u64, exp: u64) -> U256 {
        U256::from(units) * U256::from(10u64).pow(U256::from(exp))
    }

    #[test]
    fn unit_multiplier_rounds_half_up() {
        // 0.00013 daily * 365 * 100 = 4.745
        let target = fixidity(13, 19);
        let multiplier = fixidity(1, 24);
        assert_eq!(annual_percentage(target, multiplier).unwrap(), 4.75);
    }

    #[test]
    fn multiplier_scales_the_yield() {
        // 0.0002 daily * 365 * 0.5 * 100 = 3.65
        let target = fixidity(2, 20);
        let multiplier = fixidity(5, 23);
        assert_eq!(annual_percentage(target, multiplier).unwrap(), 3.65);
    }

    #[test]
    fn zero_yield_is_zero() {
        assert_eq!(annual_percentage(U256::ZERO, fixidity(1, 24)).unwrap(), 0.0);
    }

    #[test]
    fn overflow_is_an_error() {
        assert!(annual_percentage(U256::MAX, U256::MAX).is_err());
    }

    #[test]
    fn epoch_rewards_calls_match_contract_selectors() {
        assert_eq!(IRegistry::getAddressForStringCall::SELECTOR, [0x85, 0x3d, 0xb3, 0x23]);
        assert_eq!(IEpochRewards::getRewardsMultiplierCall::SELECTOR, [0x02, 0x03, 0xab, 0x24]);
        assert_eq!(IEpochRewards::getTargetVotingYieldParametersCall::SELECTOR, [0x17, 0x1a, 0xf9, 0x0f]);
    }

    #[test]
    fn yield_parameters_decode_first_word_as_target() {
        let ret = (fixidity(13, 19), fixidity(3, 24), fixidity(1, 22)).abi_encode_params();
        let params = IEpochRewards::getTargetVotingYieldParametersCall::abi_decode_returns(&ret).unwrap();
        assert_eq!(params.target, fixidity(13, 19));
        assert!(IEpochRewards::getRewardsMultiplierCall::abi_decode_returns(&ret[..16]).is_err());
    }
}
