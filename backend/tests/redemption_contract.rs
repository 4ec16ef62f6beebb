//! Contract tests for the redemption engine over the in-memory store.
//!
//! These exercise the real service logic end to end: at-most-once
//! consumption, the ledger coupling for `points` vouchers, and batch
//! generation uniqueness.

use std::collections::HashSet;
use std::sync::Arc;

use foodflow_backend::domain::ports::{
    FixtureVoucherRepository, VoucherAdmin as _, VoucherRedemption as _,
};
use foodflow_backend::domain::{
    ErrorCode, VoucherBatchRequest, VoucherService, VoucherType, CODE_PREFIX,
    REDEMPTION_DESCRIPTION,
};
use rstest::rstest;
use uuid::Uuid;

fn service_over(
    repository: Arc<FixtureVoucherRepository>,
) -> VoucherService<FixtureVoucherRepository> {
    VoucherService::new(repository)
}

#[rstest]
#[tokio::test]
async fn points_redemption_credits_the_ledger_exactly_once() {
    let repository = Arc::new(FixtureVoucherRepository::new());
    repository.seed_voucher("FF-POINTS", VoucherType::Points, 75);
    let service = service_over(repository.clone());
    let user = Uuid::new_v4();

    let outcome = service
        .redeem(user, "FF-POINTS")
        .await
        .expect("redemption succeeds");

    assert_eq!(outcome.voucher_type, VoucherType::Points);
    assert_eq!(outcome.value, 75);
    assert_eq!(repository.balance_of(user), 75);
    let history = repository.history_of(user);
    assert_eq!(history.len(), 1);
    assert_eq!(
        history.first().expect("one entry").description,
        REDEMPTION_DESCRIPTION
    );
}

#[rstest]
#[tokio::test]
async fn discount_redemption_grants_no_points() {
    let repository = Arc::new(FixtureVoucherRepository::new());
    repository.seed_voucher("FF-DISC10", VoucherType::Discount, 10);
    let service = service_over(repository.clone());
    let user = Uuid::new_v4();

    let outcome = service
        .redeem(user, "FF-DISC10")
        .await
        .expect("redemption succeeds");

    assert_eq!(outcome.voucher_type, VoucherType::Discount);
    assert_eq!(repository.balance_of(user), 0);
    assert!(repository.history_of(user).is_empty());
}

#[rstest]
#[tokio::test]
async fn reused_and_unknown_codes_share_the_canonical_rejection() {
    let repository = Arc::new(FixtureVoucherRepository::new());
    repository.seed_voucher("FF-ONCE01", VoucherType::Points, 50);
    let service = service_over(repository.clone());
    let user = Uuid::new_v4();

    service
        .redeem(user, "FF-ONCE01")
        .await
        .expect("first redemption succeeds");

    for code in ["FF-ONCE01", "FF-NEVER9"] {
        let err = service
            .redeem(user, code)
            .await
            .expect_err("rejected redemption");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Invalid or used voucher");
    }
    assert_eq!(repository.balance_of(user), 50);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_attempts_consume_the_voucher_exactly_once() {
    let repository = Arc::new(FixtureVoucherRepository::new());
    repository.seed_voucher("FF-RACE01", VoucherType::Points, 30);
    let service = Arc::new(service_over(repository.clone()));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let user = Uuid::new_v4();
        tasks.push(tokio::spawn(async move {
            (user, service.redeem(user, "FF-RACE01").await)
        }));
    }

    let mut successes = 0;
    let mut winner = None;
    for task in tasks {
        let (user, result) = task.await.expect("task completes");
        if result.is_ok() {
            successes += 1;
            winner = Some(user);
        }
    }

    assert_eq!(successes, 1);
    let winner = winner.expect("one winner");
    assert_eq!(repository.balance_of(winner), 30);
    assert_eq!(repository.history_of(winner).len(), 1);
}

#[rstest]
#[tokio::test]
async fn generated_batches_are_unique_prefixed_and_listed() {
    let repository = Arc::new(FixtureVoucherRepository::new());
    let service = service_over(repository);
    let request = VoucherBatchRequest::try_new("discount", 15, 20, "KopiKita", None)
        .expect("valid batch request");

    let codes = service.generate(request).await.expect("batch generated");

    assert_eq!(codes.len(), 20);
    let distinct: HashSet<&String> = codes.iter().collect();
    assert_eq!(distinct.len(), 20);
    for code in &codes {
        assert!(code.starts_with(CODE_PREFIX), "unexpected code: {code}");
    }

    let listed = service.list().await.expect("listing succeeds");
    assert_eq!(listed.len(), 20);
    assert!(listed.iter().all(|voucher| !voucher.used));
}
