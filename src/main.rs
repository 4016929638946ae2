extern crate covault_core;

use clap::Parser;
use covault_core::utils::current_time;
use covault_core::{Address, Amount, TreasuryEngine, TreasuryError, TreasuryId};
use env_logger::Builder;
use log::{info, LevelFilter};

#[derive(Parser)]
#[clap(author, version, about)]
/// Walks one treasury through its full lifecycle: funding, a quorum-gated
/// spend, advisory category policies, a freeze and an emergency withdrawal.
struct Cli {
    /// Number of primary signers on the treasury
    #[clap(short, long, default_value = "3")]
    signers: usize,

    /// Signatures required to execute a proposal
    #[clap(short, long, default_value = "2")]
    threshold: usize,

    /// Time lock on the demo proposal, in seconds
    #[clap(long, default_value = "0")]
    time_lock: u64,

    /// Cooldown between emergency withdrawals, in seconds
    #[clap(long, default_value = "3600")]
    cooldown: u64,

    /// Initial deposit, in base units
    #[clap(short, long, default_value = "1000")]
    deposit: Amount,

    /// Amount the demo proposal spends
    #[clap(long, default_value = "400")]
    spend: Amount,

    /// Log level for output
    #[clap(short, long, default_value = "info")]
    log_level: String,
}

fn setup_logging(level: &str) {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();
}

// Create and fund the demo treasury
fn build_treasury(engine: &TreasuryEngine, cli: &Cli) -> (TreasuryId, Vec<Address>, Vec<Address>) {
    info!("Setting up the treasury...");

    let signers: Vec<Address> = (0..cli.signers).map(|_| Address::random()).collect();
    let emergency_signers: Vec<Address> = (0..2).map(|_| Address::random()).collect();
    let creator = signers.first().copied().unwrap_or_else(Address::random);

    let treasury_id = engine
        .create_treasury(
            creator,
            "operations".to_string(),
            "USDC".to_string(),
            signers.clone(),
            cli.threshold,
            emergency_signers.clone(),
        )
        .expect("treasury parameters rejected");
    let balance = engine
        .deposit(treasury_id, cli.deposit)
        .expect("deposit rejected");

    println!(
        "{} funded with {} ({} signers, threshold {})",
        treasury_id, balance, cli.signers, cli.threshold
    );
    (treasury_id, signers, emergency_signers)
}

// Propose a spend, gather the quorum and execute it
fn run_proposal_flow(
    engine: &TreasuryEngine,
    cli: &Cli,
    treasury_id: TreasuryId,
    signers: &[Address],
    recipient: Address,
) {
    info!("Running the proposal flow...");

    let proposal_id = engine
        .create_proposal(
            signers[0],
            treasury_id,
            "engineering".to_string(),
            recipient,
            cli.spend,
            cli.time_lock,
            "demo spend".to_string(),
            current_time(),
        )
        .expect("proposal rejected");
    println!("{} created for {} base units", proposal_id, cli.spend);

    for signer in signers.iter().take(cli.threshold) {
        let count = engine
            .sign_proposal(*signer, treasury_id, proposal_id)
            .expect("signing failed");
        println!("  signature {}/{} collected", count, cli.threshold);
    }

    match engine.execute_proposal(signers[0], treasury_id, proposal_id, current_time()) {
        Ok(released) => println!("  executed, releasing {}", released),
        Err(TreasuryError::TimeLockActive) => {
            // The execution clock is an input, so the demo can jump past
            // the lock instead of sleeping through it.
            println!("  time lock still active, evaluating {}s later", cli.time_lock);
            let after_lock = current_time().saturating_add(cli.time_lock);
            match engine.execute_proposal(signers[0], treasury_id, proposal_id, after_lock) {
                Ok(released) => println!("  executed after the lock, releasing {}", released),
                Err(err) => println!("  execution failed: {}", err),
            }
        }
        Err(err) => println!("  execution failed: {}", err),
    }

    let treasury = engine.treasury(treasury_id).expect("treasury lookup failed");
    println!(
        "  balance {} after spending {} in total",
        treasury.balance, treasury.total_spent
    );
}

// Store category policies and show their advisory verdicts
fn run_policy_flow(engine: &TreasuryEngine, treasury_id: TreasuryId, recipient: Address) {
    info!("Storing category policies...");

    let manager_id = engine
        .create_policy_manager(treasury_id)
        .expect("policy manager creation failed");
    engine
        .add_spending_limit(manager_id, "engineering".to_string(), 500, 2_000, 5_000, 450)
        .expect("spending limit rejected");
    engine
        .add_whitelist(manager_id, "engineering".to_string(), vec![recipient])
        .expect("whitelist rejected");

    let manager = engine
        .policy_manager(manager_id)
        .expect("policy manager lookup failed");
    let now = current_time();
    let probes = [
        (400, recipient),
        (9_000, recipient),
        (100, Address::random()),
    ];
    for (amount, to) in probes {
        match manager.evaluate_spend("engineering", &to, amount, now) {
            Ok(()) => println!("  spend of {} to {} passes the stored policies", amount, to),
            Err(verdict) => println!("  spend of {} to {} is flagged: {}", amount, to, verdict),
        }
    }
    println!("  verdicts are advisory; the execution above never consulted them");
}

// Freeze the treasury, then withdraw through the emergency path anyway
fn run_emergency_flow(
    engine: &TreasuryEngine,
    cli: &Cli,
    treasury_id: TreasuryId,
    emergency_signers: &[Address],
    primary: Address,
) {
    info!("Exercising the freeze and the emergency path...");

    engine
        .freeze(emergency_signers[0], treasury_id)
        .expect("freeze rejected");
    match engine.deposit(treasury_id, 1) {
        Err(TreasuryError::Frozen) => println!("  deposits are rejected while frozen"),
        other => println!("  unexpected deposit outcome: {:?}", other),
    }

    let module_id = engine
        .create_emergency_module(treasury_id, emergency_signers.to_vec(), cli.cooldown)
        .expect("emergency module creation failed");
    let released = engine
        .emergency_withdraw(emergency_signers[0], treasury_id, module_id, 50, current_time())
        .expect("emergency withdrawal failed");
    println!("  emergency path released {} while frozen", released);

    let retry = engine.emergency_withdraw(
        emergency_signers[1],
        treasury_id,
        module_id,
        10,
        current_time(),
    );
    match retry {
        Err(TreasuryError::CooldownActive) => {
            println!("  second attempt inside the {}s cooldown is rejected", cli.cooldown)
        }
        Ok(amount) => println!("  cooldown of {}s allowed another {} out", cli.cooldown, amount),
        Err(err) => println!("  second attempt failed: {}", err),
    }

    engine.unfreeze(primary, treasury_id).expect("unfreeze rejected");
    println!("  treasury unfrozen by a primary signer");
}

fn dump_events(engine: &TreasuryEngine) {
    let events = engine.events();
    println!("\nEvent log ({} records):", events.len());
    let json = serde_json::to_string_pretty(&events).expect("event log serializes");
    println!("{}", json);
}

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    info!("Starting the covault demo scenario...");

    let engine = TreasuryEngine::new();
    let recipient = Address::random();

    let (treasury_id, signers, emergency_signers) = build_treasury(&engine, &cli);
    run_proposal_flow(&engine, &cli, treasury_id, &signers, recipient);
    run_policy_flow(&engine, treasury_id, recipient);
    run_emergency_flow(&engine, &cli, treasury_id, &emergency_signers, signers[0]);
    dump_events(&engine);

    info!("Demo scenario complete");
}
