mod common;

use std::sync::Arc;
use std::time::Duration;

use threat_detection_service::config::{SecurityConfig, StoreFailurePolicy};
use threat_detection_service::engine::{Outcome, Request, ThreatDecisionEngine};
use threat_detection_service::store::CounterStore;

use common::{
    credentials, engine_with_memory_store, random_ip, request, FixedAuthenticator,
    UnavailableStore,
};

fn login_request(addr: &str) -> Request {
    Request::new(common::identity(addr), "POST", "/login")
}

// Failures 1-4 return Unauthorized with the remaining-attempts count;
// the 5th crosses the threshold and blocks.
#[test_log::test(tokio::test)]
async fn fifth_failure_blocks_the_identity() {
    let (engine, _) = engine_with_memory_store(SecurityConfig::default());
    let authenticator = FixedAuthenticator::new("admin", "securePass123!");
    let addr = random_ip();
    let wrong = credentials("admin", "wrong-password");

    for attempt in 1..=4u32 {
        let decision = engine
            .decide_auth(&login_request(&addr), &wrong, &authenticator)
            .await;
        assert_eq!(decision.http_status, 401, "attempt {attempt}");
        assert_eq!(
            decision.outcome,
            Outcome::Unauthorized {
                remaining_attempts: 5 - attempt
            }
        );
    }

    let decision = engine
        .decide_auth(&login_request(&addr), &wrong, &authenticator)
        .await;
    assert_eq!(decision.outcome, Outcome::Blocked);
    assert_eq!(decision.http_status, 403);
}

// Once blocked, correct credentials still do not get through until the
// block TTL expires.
#[tokio::test]
async fn block_takes_precedence_over_valid_credentials() {
    let config = SecurityConfig {
        max_failed_attempts: 2,
        block_ttl_seconds: 1,
        ..SecurityConfig::default()
    };
    let (engine, _) = engine_with_memory_store(config);
    let authenticator = FixedAuthenticator::new("admin", "securePass123!");
    let addr = random_ip();

    let wrong = credentials("admin", "wrong-password");
    for _ in 0..2 {
        engine
            .decide_auth(&login_request(&addr), &wrong, &authenticator)
            .await;
    }

    let right = credentials("admin", "securePass123!");
    let decision = engine
        .decide_auth(&login_request(&addr), &right, &authenticator)
        .await;
    assert_eq!(decision.outcome, Outcome::Blocked);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let decision = engine
        .decide_auth(&login_request(&addr), &right, &authenticator)
        .await;
    assert_eq!(decision.outcome, Outcome::Allow);
}

// Four wrong passwords then the right one: [401, 401, 401, 401, 200],
// and the failure counter is deleted after the success.
#[tokio::test]
async fn successful_login_clears_failure_history() {
    let (engine, store) = engine_with_memory_store(SecurityConfig::default());
    let authenticator = FixedAuthenticator::new("admin", "securePass123!");
    let addr = "10.0.0.5";

    let mut statuses = Vec::new();
    let wrong = credentials("admin", "wrong-password");
    for _ in 0..4 {
        statuses.push(
            engine
                .decide_auth(&login_request(addr), &wrong, &authenticator)
                .await
                .http_status,
        );
    }
    let right = credentials("admin", "securePass123!");
    statuses.push(
        engine
            .decide_auth(&login_request(addr), &right, &authenticator)
            .await
            .http_status,
    );

    assert_eq!(statuses, vec![401, 401, 401, 401, 200]);
    assert!(!store.exists("failed:10.0.0.5").await.unwrap());
}

// Twenty requests inside one window with threshold 15: the 16th crosses
// the anomaly threshold and gets 429, the rest are rejected by the block
// pre-check. Once the block TTL lapses, the still-hot window re-escalates.
#[tokio::test]
async fn burst_crosses_threshold_and_stays_blocked() {
    let config = SecurityConfig {
        anomaly_threshold: 15,
        rate_window_seconds: 60,
        block_ttl_seconds: 1,
        ..SecurityConfig::default()
    };
    let (engine, _) = engine_with_memory_store(config);
    let addr = "10.0.0.9";

    let mut statuses = Vec::new();
    for _ in 0..20 {
        statuses.push(engine.decide(&request(addr, "/api/data")).await.http_status);
    }

    let mut expected = vec![200u16; 15];
    expected.push(429);
    expected.extend([403, 403, 403, 403]);
    assert_eq!(statuses, expected);

    // Block expired, but the window is still over threshold
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let decision = engine.decide(&request(addr, "/api/data")).await;
    assert_eq!(decision.outcome, Outcome::RateLimited);
    assert_eq!(decision.http_status, 429);
}

// With the store down, fail-open lets requests through and fail-closed
// rejects them.
#[test_log::test(tokio::test)]
async fn store_outage_resolves_through_the_configured_policy() {
    let open_engine = ThreatDecisionEngine::new(
        Arc::new(UnavailableStore) as Arc<dyn CounterStore>,
        SecurityConfig {
            store_failure_policy: StoreFailurePolicy::FailOpen,
            ..SecurityConfig::default()
        },
    );
    let decision = open_engine.decide(&request(&random_ip(), "/api/data")).await;
    assert_eq!(decision.outcome, Outcome::Allow);

    let closed_engine = ThreatDecisionEngine::new(
        Arc::new(UnavailableStore) as Arc<dyn CounterStore>,
        SecurityConfig {
            store_failure_policy: StoreFailurePolicy::FailClosed,
            ..SecurityConfig::default()
        },
    );
    let decision = closed_engine
        .decide(&request(&random_ip(), "/api/data"))
        .await;
    assert_eq!(decision.outcome, Outcome::Blocked);
    assert_eq!(decision.http_status, 403);
}

// Store outage during an auth attempt: fail-open returns Unauthorized
// without escalating, since the failure history is unknown.
#[tokio::test]
async fn auth_failure_during_outage_does_not_block_under_fail_open() {
    let engine = ThreatDecisionEngine::new(
        Arc::new(UnavailableStore) as Arc<dyn CounterStore>,
        SecurityConfig {
            store_failure_policy: StoreFailurePolicy::FailOpen,
            ..SecurityConfig::default()
        },
    );
    let authenticator = FixedAuthenticator::new("admin", "securePass123!");

    let decision = engine
        .decide_auth(
            &login_request(&random_ip()),
            &credentials("admin", "wrong-password"),
            &authenticator,
        )
        .await;
    assert_eq!(decision.http_status, 401);
    assert_eq!(
        decision.outcome,
        Outcome::Unauthorized {
            remaining_attempts: 5
        }
    );
}
