use covault_core::{Address, PolicyManager, SpendingLimitPolicy, TreasuryEngine, TreasuryId};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn benchmark_proposal_pipeline(c: &mut Criterion) {
    let signers = [
        Address::new([1; 32]),
        Address::new([2; 32]),
        Address::new([3; 32]),
    ];
    let recipient = Address::new([9; 32]);

    c.bench_function("proposal_pipeline", |b| {
        b.iter(|| {
            let engine = TreasuryEngine::new();
            let treasury_id = engine
                .create_treasury(
                    signers[0],
                    "bench".to_string(),
                    "USDC".to_string(),
                    signers.to_vec(),
                    2,
                    Vec::new(),
                )
                .unwrap();
            engine.deposit(treasury_id, 1_000).unwrap();
            let proposal_id = engine
                .create_proposal(
                    signers[0],
                    treasury_id,
                    "bench".to_string(),
                    recipient,
                    black_box(400),
                    0,
                    "bench spend".to_string(),
                    0,
                )
                .unwrap();
            engine
                .sign_proposal(signers[0], treasury_id, proposal_id)
                .unwrap();
            engine
                .sign_proposal(signers[1], treasury_id, proposal_id)
                .unwrap();
            engine
                .execute_proposal(signers[2], treasury_id, proposal_id, 0)
                .unwrap()
        })
    });
}

pub fn benchmark_policy_evaluation(c: &mut Criterion) {
    let manager = build_test_policies();
    let recipient = Address::new([7; 32]);

    c.bench_function("policy_evaluation", |b| {
        b.iter(|| {
            manager.evaluate_spend(
                black_box("engineering"),
                &recipient,
                black_box(250),
                86_500,
            )
        })
    });
}

// Helper function to build a policy manager with one recorded spend
fn build_test_policies() -> PolicyManager {
    let mut manager = PolicyManager::new(TreasuryId(1));
    manager.add_spending_limit(
        "engineering".to_string(),
        SpendingLimitPolicy {
            daily_limit: 1_000,
            weekly_limit: 5_000,
            monthly_limit: 20_000,
            per_transaction_limit: 500,
        },
    );
    manager.add_whitelist("engineering".to_string(), vec![Address::new([7; 32])]);
    manager.record_spend("engineering", 300, 86_500);
    manager
}

criterion_group!(
    benches,
    benchmark_proposal_pipeline,
    benchmark_policy_evaluation
);
criterion_main!(benches);
