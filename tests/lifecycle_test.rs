use jobmarket::application::Marketplace;
use jobmarket::config::EngineConfig;
use jobmarket::domain::bid::BidStatus;
use jobmarket::domain::job::{JobStatus, NewJob};
use jobmarket::domain::money::Balance;
use jobmarket::domain::payment::{PaymentMethod, PaymentStatus};
use jobmarket::domain::user::{NewUser, Principal};
use jobmarket::error::RejectionKind;
use jobmarket::infrastructure::in_memory::InMemoryStore;
use jobmarket::infrastructure::notifier::OutboxNotifier;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

async fn register(market: &Marketplace, username: &str, worker: bool) -> Principal {
    let user = market
        .register_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            is_worker: worker,
            is_customer: !worker,
        })
        .await
        .unwrap();
    if worker {
        market.approve_worker(user.id).await.unwrap();
    }
    Principal::new(user.id)
}

fn job(budget: Decimal) -> NewJob {
    NewJob {
        title: "Rewire living room".to_string(),
        description: "Replace old wiring and two sockets".to_string(),
        location: "Chittagong".to_string(),
        budget,
        urgency: 2,
    }
}

#[tokio::test]
async fn test_lifecycle_with_random_bids() {
    let mut rng = rand::thread_rng();
    let outbox = OutboxNotifier::new();
    let market = Marketplace::new(
        Box::new(InMemoryStore::new()),
        Box::new(outbox.clone()),
        EngineConfig::default(),
    );

    let customer = register(&market, "customer", false).await;
    let mut workers = Vec::new();
    for i in 0..10 {
        workers.push(register(&market, &format!("worker{i}"), true).await);
    }

    let posted = market.post_job(&customer, job(dec!(500))).await.unwrap();

    let mut bids = Vec::new();
    for worker in &workers {
        let cents: i64 = rng.gen_range(1..=50_000);
        let bid = market
            .submit_bid(worker, posted.id, Decimal::new(cents, 2))
            .await
            .unwrap();
        bids.push(bid);
    }

    let winner = &bids[rng.gen_range(0..bids.len())];
    let assigned = market.assign_bid(&customer, winner.id).await.unwrap();
    assert_eq!(assigned.status, JobStatus::InProgress);
    assert_eq!(assigned.assigned_worker, Some(winner.worker));
    assert_eq!(assigned.budget.value(), dec!(500));

    let settled = market.bids(posted.id).await.unwrap();
    assert_eq!(settled.len(), workers.len());
    let selected: Vec<_> = settled
        .iter()
        .filter(|bid| bid.status == BidStatus::Selected)
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, winner.id);
    assert!(
        settled
            .iter()
            .filter(|bid| bid.id != winner.id)
            .all(|bid| bid.status == BidStatus::Ignored)
    );
    assert_eq!(outbox.sent().await.len(), 1);

    let payment = market
        .create_payment(
            &customer,
            posted.id,
            winner.amount.value(),
            PaymentMethod::Bkash,
        )
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    let released = market.release_payment(&customer, payment.id).await.unwrap();
    assert_eq!(released.status, PaymentStatus::Completed);
    assert_eq!(
        market.job(posted.id).await.unwrap().status,
        JobStatus::Completed
    );
    assert_eq!(
        market.wallet(winner.worker).await.unwrap().balance,
        Balance(winner.amount.value())
    );

    let worker = Principal::new(winner.worker);
    market
        .review_worker(&customer, posted.id, 5, "Careful work".to_string())
        .await
        .unwrap();
    market
        .review_customer(&worker, posted.id, 4, String::new())
        .await
        .unwrap();
    let err = market
        .review_worker(&customer, posted.id, 3, String::new())
        .await
        .unwrap_err();
    assert_eq!(err.rejection(), Some(RejectionKind::Duplicate));
    assert_eq!(market.reviews(posted.id).await.unwrap().len(), 2);

    let summaries = market.into_results().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].payment, Some(PaymentStatus::Completed));
}

#[tokio::test]
async fn test_concurrent_assignments_select_one_bid() {
    let market = Arc::new(Marketplace::new(
        Box::new(InMemoryStore::new()),
        Box::new(OutboxNotifier::new()),
        EngineConfig::default(),
    ));

    let customer = register(&market, "customer", false).await;
    let posted = market.post_job(&customer, job(dec!(200))).await.unwrap();

    let mut bid_ids = Vec::new();
    for i in 0..8 {
        let worker = register(&market, &format!("worker{i}"), true).await;
        let bid = market
            .submit_bid(&worker, posted.id, dec!(150) + Decimal::from(i))
            .await
            .unwrap();
        bid_ids.push(bid.id);
    }

    let handles: Vec<_> = bid_ids
        .into_iter()
        .map(|bid_id| {
            let market = Arc::clone(&market);
            tokio::spawn(async move { market.assign_bid(&customer, bid_id).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => assert_eq!(e.rejection(), Some(RejectionKind::InvalidState)),
        }
    }
    assert_eq!(accepted, 1);

    let bids = market.bids(posted.id).await.unwrap();
    assert_eq!(
        bids.iter()
            .filter(|bid| bid.status == BidStatus::Selected)
            .count(),
        1
    );
}
