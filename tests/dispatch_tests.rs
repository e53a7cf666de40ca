mod common;

use common::*;
use payrail::domain::event::PayrollEvent;
use payrail::domain::payment::{DeferReason, DispatchOutcome};
use payrail::domain::value::{Address, DestinationId};
use payrail::error::PayrollError;

#[tokio::test]
async fn test_zero_allowance_defers_and_rescans() {
    let s = setup(config());
    let owner = company(&s, "acme", 0).await;
    let id = employee(&s, &owner, "0x1", DestinationId(0), 10).await;
    s.clock.advance(INTERVAL).unwrap();

    let token = s.engine.scan().await.unwrap().unwrap();
    let outcome = s.engine.dispatch(&token).await.unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Deferred {
            employee_id: id,
            reason: DeferReason::InsufficientAllowance
        }
    );
    assert_eq!(s.engine.employee(id).await.unwrap().next_pay_date, INTERVAL);
    assert_eq!(s.engine.scan().await.unwrap().unwrap().employee_id, id);

    let events = s.engine.events().await.unwrap();
    assert!(matches!(
        events.last().unwrap().event,
        PayrollEvent::PaymentDeferred { amount: 0, .. }
    ));
}

#[tokio::test]
async fn test_destination_removed_between_scan_and_dispatch() {
    let s = setup(config());
    let owner = company(&s, "acme", 100).await;
    let id = employee(&s, &owner, "0xfar", REMOTE, 10).await;
    s.clock.advance(INTERVAL).unwrap();

    let token = s.engine.scan().await.unwrap().unwrap();
    s.engine
        .disallow_destination(&Address::new("admin"), REMOTE)
        .await
        .unwrap();

    assert!(matches!(
        s.engine.dispatch(&token).await,
        Err(PayrollError::ChainNotAllowed(DestinationId(30)))
    ));
    assert_eq!(balance(&s, "acme").await, 100);
    assert_eq!(s.engine.employee(id).await.unwrap().next_pay_date, INTERVAL);
}

#[tokio::test]
async fn test_bridge_failure_leaves_funds_in_escrow() {
    let s = setup(config());
    let owner = company(&s, "acme", 100).await;
    let id = employee(&s, &owner, "0xfar", REMOTE, 40).await;
    s.clock.advance(INTERVAL).unwrap();
    s.bridge.fail_next_submission();

    assert!(matches!(
        s.engine.run_once().await,
        Err(PayrollError::BridgeSubmit(_))
    ));
    assert_eq!(balance(&s, "orchestrator").await, 40);
    assert_eq!(balance(&s, "acme").await, 60);
    assert_eq!(s.engine.employee(id).await.unwrap().next_pay_date, INTERVAL);

    let events = s.engine.events().await.unwrap();
    assert!(
        events
            .iter()
            .any(|r| matches!(r.event, PayrollEvent::EscrowStranded { amount: 40, .. }))
    );
    assert!(
        !events
            .iter()
            .any(|r| matches!(r.event, PayrollEvent::BridgeSubmitted { .. }))
    );

    // Automation leaves the held employee alone; nothing is escrowed twice.
    assert!(s.engine.employee(id).await.unwrap().held);
    assert!(s.engine.scan().await.unwrap().is_none());
    assert!(s.engine.run_once().await.unwrap().is_none());
    assert_eq!(balance(&s, "acme").await, 60);

    // The owner's manual payment releases the hold.
    let outcome = s.engine.pay_now(&owner, id, 0).await.unwrap();
    assert!(outcome.is_settled());
    let paid = s.engine.employee(id).await.unwrap();
    assert!(!paid.held);
    assert_eq!(paid.next_pay_date, INTERVAL * 2);
    assert_eq!(balance(&s, "acme").await, 20);
    assert_eq!(balance(&s, "orchestrator").await, 40);
}

#[tokio::test]
async fn test_cross_chain_submission_burns_escrowed_funds() {
    let s = setup(config());
    let owner = company(&s, "acme", 100).await;
    let id = employee(&s, &owner, "0xfar", REMOTE, 40).await;
    s.clock.advance(INTERVAL).unwrap();

    let outcome = s.engine.run_once().await.unwrap().unwrap();
    assert!(matches!(outcome, DispatchOutcome::BridgeSubmitted { employee_id, .. } if employee_id == id));
    assert_eq!(balance(&s, "orchestrator").await, 0);
    assert_eq!(s.ledger.total_supply().await, 60);
    assert_eq!(s.bridge.accepted().await.len(), 1);
    assert_eq!(s.engine.employee(id).await.unwrap().next_pay_date, INTERVAL * 2);
}

#[tokio::test]
async fn test_manual_payment_brings_bridge_fee() {
    let mut config = config();
    config.bridge_fee = 5;
    let s = setup(config);
    let owner = company(&s, "acme", 100).await;
    let id = employee(&s, &owner, "0xfar", REMOTE, 40).await;
    s.clock.advance(INTERVAL).unwrap();

    // Automation supplies no fee, so the payment waits.
    let outcome = s.engine.run_once().await.unwrap().unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Deferred {
            employee_id: id,
            reason: DeferReason::BridgeFeeUnavailable
        }
    );
    assert_eq!(balance(&s, "acme").await, 100);

    assert!(matches!(
        s.engine.pay_now(&owner, id, 1).await,
        Err(PayrollError::InsufficientFee { required: 5, supplied: 1 })
    ));
    let outcome = s.engine.pay_now(&owner, id, 5).await.unwrap();
    assert!(outcome.is_settled());
    assert_eq!(s.engine.employee(id).await.unwrap().next_pay_date, INTERVAL * 2);
}

#[tokio::test]
async fn test_inactive_company_is_not_paid() {
    let s = setup(config());
    let owner = company(&s, "acme", 100).await;
    employee(&s, &owner, "0x1", DestinationId(0), 10).await;
    s.engine
        .set_company_active(&Address::new("admin"), 1, false)
        .await
        .unwrap();
    s.clock.advance(INTERVAL).unwrap();

    assert!(s.engine.run_once().await.unwrap().is_none());
    assert_eq!(balance(&s, "0x1").await, 0);
}
