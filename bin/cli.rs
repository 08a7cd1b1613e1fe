
use exchange_contracts::exchange::{Exchange, ExchangeInitArgs};
use exchange_contracts::token::CryptoDevToken;
use odra::prelude::Addressable;
use odra::casper_types::{U256, U512};
use odra::host::{HostEnv, Deployer, HostRef, NoArgs};
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};
use std::fs::File;
use std::io::Write;
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Deploys the demo token, then the exchange with the token address as its
/// only constructor argument.
pub struct DeployExchangeScript;

impl DeployScript for DeployExchangeScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        println!("==> Deploying Crypto Dev Token");
        let token = CryptoDevToken::load_or_deploy(
            &env,
            NoArgs,
            container,
            600_000_000_000
        )?;
        println!("CD token deployed at: {:?}", token.address());

        println!("==> Deploying Exchange");
        let exchange = Exchange::load_or_deploy(
            &env,
            ExchangeInitArgs {
                token: token.address(),
            },
            container,
            600_000_000_000
        )?;
        println!("Exchange deployed at: {:?}", exchange.address());

        generate_env_file(container);

        Ok(())
    }
}

/// Scenario to approve the exchange and deposit liquidity.
pub struct SeedLiquidityScenario;

impl Scenario for SeedLiquidityScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "native_amount",
                "Native amount to deposit, in motes",
                NamedCLType::U512,
            ),
            CommandArg::new(
                "token_amount",
                "Token amount to deposit (a cap once the pool is funded)",
                NamedCLType::U256,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut token = container.contract_ref::<CryptoDevToken>(env)?;
        let exchange = container.contract_ref::<Exchange>(env)?;
        let native_amount = args.get_single::<U512>("native_amount")?;
        let token_amount = args.get_single::<U256>("token_amount")?;

        env.set_gas(10_000_000_000);
        token.try_approve(exchange.address(), token_amount)?;

        env.set_gas(300_000_000_000);
        let minted = exchange
            .with_tokens(native_amount)
            .try_add_liquidity(token_amount)?;

        println!("Liquidity added, {} LP tokens minted", minted);
        Ok(())
    }
}

impl ScenarioMetadata for SeedLiquidityScenario {
    const NAME: &'static str = "seed-liquidity";
    const DESCRIPTION: &'static str = "Approves the exchange and deposits liquidity into the pool";
}

/// Scenario to swap native currency for tokens.
pub struct SwapNativeScenario;

impl Scenario for SwapNativeScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "native_amount",
                "Native amount to sell, in motes",
                NamedCLType::U512,
            ),
            CommandArg::new(
                "min_tokens",
                "Minimum token amount to accept",
                NamedCLType::U256,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let exchange = container.contract_ref::<Exchange>(env)?;
        let native_amount = args.get_single::<U512>("native_amount")?;
        let min_tokens = args.get_single::<U256>("min_tokens")?;

        env.set_gas(300_000_000_000);
        let bought = exchange
            .with_tokens(native_amount)
            .try_swap_native_for_tokens(min_tokens)?;

        println!("Swapped, {} tokens bought", bought);
        Ok(())
    }
}

impl ScenarioMetadata for SwapNativeScenario {
    const NAME: &'static str = "swap-native";
    const DESCRIPTION: &'static str = "Swaps native currency for tokens through the pool";
}

/// Confirmation polls before trusting a deploy: none on a local network.
fn confirmations_for(chain_name: &str) -> u32 {
    if chain_name == "casper-net-1" {
        0
    } else {
        6
    }
}

fn generate_env_file(container: &DeployedContractsContainer) {
    println!("==> Generating scripts/deploy.out.env");
    let node_address = std::env::var("ODRA_CASPER_LIVENET_NODE_ADDRESS")
        .or_else(|_| std::env::var("NODE_ADDRESS"))
        .expect("NODE_ADDRESS not set");
    let chain_name = std::env::var("ODRA_CASPER_LIVENET_CHAIN_NAME")
        .or_else(|_| std::env::var("CHAIN_NAME"))
        .unwrap_or_else(|_| "casper-test".to_string());
    let confirmations = confirmations_for(&chain_name);

    let mut file = File::create("scripts/deploy.out.env").expect("Unable to create file");

    writeln!(file, "NODE_ADDRESS={}", node_address).unwrap();
    writeln!(file, "CHAIN_NAME={}", chain_name).unwrap();
    writeln!(file, "").unwrap();

    let mappings = vec![
        ("CryptoDevToken", "TOKEN"),
        ("Exchange", "EXCHANGE"),
    ];

    for (contract_name, env_prefix) in mappings {
        if let Some(address) = container.address_by_name(contract_name) {
            let addr_str = address.to_string();
            // format: Contract(ContractPackageHash(hex))
            let hex_part = addr_str
                .replace("Contract(ContractPackageHash(", "")
                .replace("))", "");
            let formatted_pkg_hash = format!("hash-{}", hex_part);

            writeln!(file, "{}_PACKAGE_HASH={}", env_prefix, formatted_pkg_hash).unwrap();

            let contract_hash =
                await_contract_hash(&node_address, &formatted_pkg_hash, confirmations);
            writeln!(file, "{}_CONTRACT_HASH={}", env_prefix, contract_hash).unwrap();
        }
    }
}

/// Polls the node once per confirmation round until the contract hash is
/// visible. A local network resolves on the first query.
fn await_contract_hash(node_address: &str, package_hash: &str, confirmations: u32) -> String {
    let mut contract_hash = query_contract_hash(node_address, package_hash);
    for _ in 0..confirmations {
        if contract_hash != "NOT_FOUND" {
            break;
        }
        thread::sleep(Duration::from_secs(10));
        contract_hash = query_contract_hash(node_address, package_hash);
    }
    contract_hash
}

fn query_contract_hash(node_address: &str, package_hash: &str) -> String {
    let output = Command::new("casper-client")
        .arg("query-global-state")
        .arg("--node-address")
        .arg(node_address)
        .arg("--key")
        .arg(package_hash)
        .output();

    match output {
        Ok(out) => {
            let output_str = String::from_utf8_lossy(&out.stdout);
            // Take the last "contract_hash": "contract-..." in the response
            let mut last_hash = String::from("NOT_FOUND");
            for line in output_str.lines() {
                if line.contains("contract_hash") {
                    if let Some(start) = line.find("contract-") {
                        let end = line[start..].find('"').unwrap_or(line[start..].len());
                        last_hash = line[start..start + end].to_string();
                    }
                }
            }
            last_hash
        }
        Err(_) => String::from("ERROR_CALLING_CLIENT"),
    }
}

pub fn main() {
    OdraCli::new()
        .about("CLI tool for the native/CD token exchange contracts")
        // Deploy scripts
        .deploy(DeployExchangeScript)
        // Contract references
        .contract::<CryptoDevToken>()
        .contract::<Exchange>()
        // Scenarios
        .scenario(SeedLiquidityScenario)
        .scenario(SwapNativeScenario)
        .build()
        .run();
}
