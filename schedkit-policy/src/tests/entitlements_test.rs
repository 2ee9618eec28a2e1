use crate::entitlements::{
    ActionCapability, Entitlement, EntitlementAdapter, EntitlementEngine, LimitedBy,
};
use crate::error::BoxError;
use crate::limits::{Availability, Limit};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use schedkit_time::{CalendarUnit, Interval, WindowSpec, EPOCH_MS, FAR_FUTURE_MS};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn utc_ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap().timestamp_millis()
}

fn monthly(limit: u32) -> Entitlement {
    Entitlement {
        limit: Limit::Count(limit),
        window: Some(WindowSpec::Calendar {
            unit: CalendarUnit::Month,
            zone: None,
        }),
    }
}

type UsageCalls = Arc<Mutex<Vec<(Box<str>, Interval)>>>;

struct MockStore {
    entitlements: HashMap<Box<str>, Entitlement>,
    used: HashMap<Box<str>, u32>,
    calls: UsageCalls,
    fail: bool,
}

impl MockStore {
    fn new(entitlements: HashMap<Box<str>, Entitlement>, used: HashMap<Box<str>, u32>) -> Self {
        MockStore {
            entitlements,
            used,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }
}

#[async_trait]
impl EntitlementAdapter for MockStore {
    async fn entitlements(
        &self,
        _actor_id: &str,
    ) -> Result<HashMap<Box<str>, Entitlement>, BoxError> {
        if self.fail {
            return Err("store offline".into());
        }
        Ok(self.entitlements.clone())
    }

    async fn usage(
        &self,
        _actor_id: &str,
        action: &str,
        interval: &Interval,
    ) -> Result<u32, BoxError> {
        self.calls.lock().unwrap().push((action.into(), *interval));
        Ok(self.used.get(action).copied().unwrap_or(0))
    }
}

#[tokio::test]
async fn check_counts_usage_over_the_exact_monthly_interval() {
    let store = MockStore::new(
        HashMap::from([(Box::from("export"), monthly(100))]),
        HashMap::from([(Box::from("export"), 50)]),
    );
    let calls = Arc::clone(&store.calls);
    let engine = EntitlementEngine::new(store);

    let at = utc_ms(2024, 1, 15, 12, 34);
    let decision = engine.check("acme", "export", 1, Some(at)).await.unwrap();

    assert!(decision.outcome.allowed);
    assert_eq!(decision.obligations.len(), 1);
    assert_eq!(&*decision.obligations[0].kind, "consume");
    assert_eq!(decision.obligations[0].params["amount"], 1);
    assert!(decision.reasons[0].explanation.contains("49"));

    // The store was asked for exactly the January calendar-month interval.
    let recorded = calls.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(&*recorded[0].0, "export");
    assert_eq!(
        recorded[0].1,
        Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 2, 1, 0, 0))
    );
}

#[tokio::test]
async fn check_without_an_entitlement_denies_but_keeps_the_trace() {
    let store = MockStore::new(HashMap::from([(Box::from("export"), monthly(10))]), HashMap::new());
    let engine = EntitlementEngine::new(store);

    let decision = engine
        .check("acme", "import", 1, Some(utc_ms(2024, 1, 15, 0, 0)))
        .await
        .unwrap();
    assert!(!decision.outcome.allowed);
    assert_eq!(&*decision.reasons[0].explanation, "No entitlement defined");
    assert!(decision.obligations.is_empty());
    // The loaded entitlements map still rides along in the trace.
    assert!(decision.trace.facts["entitlements"].get("export").is_some());
    assert!(decision.trace.facts["usage"].is_null());
}

#[tokio::test]
async fn check_refuses_once_the_window_is_spent() {
    let store = MockStore::new(
        HashMap::from([(Box::from("export"), monthly(50))]),
        HashMap::from([(Box::from("export"), 50)]),
    );
    let engine = EntitlementEngine::new(store);
    let decision = engine
        .check("acme", "export", 1, Some(utc_ms(2024, 1, 15, 0, 0)))
        .await
        .unwrap();
    assert!(!decision.outcome.allowed);
    assert!(decision.reasons[0].explanation.contains("50"));
}

#[tokio::test]
async fn windowless_entitlements_count_usage_over_the_lifetime() {
    let store = MockStore::new(
        HashMap::from([(
            Box::from("export"),
            Entitlement {
                limit: Limit::Count(10),
                window: None,
            },
        )]),
        HashMap::from([(Box::from("export"), 3)]),
    );
    let calls = Arc::clone(&store.calls);
    let engine = EntitlementEngine::new(store);
    engine
        .check("acme", "export", 1, Some(utc_ms(2024, 1, 15, 0, 0)))
        .await
        .unwrap();
    let recorded = calls.lock().unwrap();
    assert_eq!(recorded[0].1, Interval::new(EPOCH_MS, FAR_FUTURE_MS));
}

#[tokio::test]
async fn capabilities_buckets_every_action() {
    let store = MockStore::new(
        HashMap::from([
            (
                Box::from("browse"),
                Entitlement {
                    limit: Limit::Unlimited,
                    window: None,
                },
            ),
            (Box::from("export"), monthly(10)),
            (Box::from("publish"), monthly(5)),
        ]),
        HashMap::from([(Box::from("export"), 3), (Box::from("publish"), 5)]),
    );
    let engine = EntitlementEngine::new(store);

    let at = utc_ms(2024, 1, 15, 0, 0);
    let capabilities = engine
        .capabilities("acme", &["browse", "export", "publish", "ghost"], Some(at))
        .await
        .unwrap();

    let as_strs = |names: &[Box<str>]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
    assert_eq!(as_strs(&capabilities.available), vec!["browse", "export"]);
    assert_eq!(as_strs(&capabilities.exhausted), vec!["publish"]);
    assert_eq!(as_strs(&capabilities.unavailable), vec!["ghost"]);

    match &capabilities.actions["browse"] {
        ActionCapability::Available { quota, obligation } => {
            assert!(quota.is_none());
            assert_eq!(&*obligation.kind, "consume");
        }
        other => panic!("browse should be available, got {:?}", other),
    }
    match &capabilities.actions["export"] {
        ActionCapability::Available { quota, .. } => {
            let quota = quota.as_ref().unwrap();
            assert_eq!(quota.used, 3);
            assert_eq!(quota.remaining, Limit::Count(7));
        }
        other => panic!("export should be available, got {:?}", other),
    }
    match &capabilities.actions["publish"] {
        ActionCapability::Exhausted {
            quota,
            available_at,
            ..
        } => {
            assert_eq!(quota.remaining, Limit::Count(0));
            assert_eq!(*available_at, Some(utc_ms(2024, 2, 1, 0, 0)));
        }
        other => panic!("publish should be exhausted, got {:?}", other),
    }
    assert!(matches!(
        capabilities.actions["ghost"],
        ActionCapability::Unavailable { .. }
    ));
}

#[tokio::test]
async fn available_at_reports_the_window_reset() {
    let store = MockStore::new(
        HashMap::from([(Box::from("export"), monthly(5))]),
        HashMap::from([(Box::from("export"), 5)]),
    );
    let engine = EntitlementEngine::new(store);
    let at = utc_ms(2024, 1, 15, 0, 0);
    match engine.available_at("acme", "export", Some(at)).await.unwrap() {
        Availability::At { at: opens, .. } => assert_eq!(opens, utc_ms(2024, 2, 1, 0, 0)),
        other => panic!("expected At, got {:?}", other),
    }
    // Unknown actions are never available.
    assert!(matches!(
        engine.available_at("acme", "ghost", Some(at)).await.unwrap(),
        Availability::Never { .. }
    ));
}

#[tokio::test]
async fn remaining_uses_covers_all_three_shapes() {
    let store = MockStore::new(
        HashMap::from([
            (
                Box::from("browse"),
                Entitlement {
                    limit: Limit::Unlimited,
                    window: None,
                },
            ),
            (Box::from("export"), monthly(10)),
        ]),
        HashMap::from([(Box::from("export"), 4)]),
    );
    let engine = EntitlementEngine::new(store);
    let at = Some(utc_ms(2024, 1, 15, 0, 0));

    let browse = engine.remaining_uses("acme", "browse", at).await.unwrap();
    assert_eq!(browse.uses, Limit::Unlimited);
    assert_eq!(browse.limited_by, LimitedBy::None);

    let export = engine.remaining_uses("acme", "export", at).await.unwrap();
    assert_eq!(export.uses, Limit::Count(6));
    assert_eq!(export.limited_by, LimitedBy::Entitlement);

    let ghost = engine.remaining_uses("acme", "ghost", at).await.unwrap();
    assert_eq!(ghost.uses, Limit::Count(0));
    assert_eq!(ghost.limited_by, LimitedBy::NoEntitlement);
}

#[tokio::test]
async fn dashboard_projects_every_entitlement_in_name_order() {
    let store = MockStore::new(
        HashMap::from([
            (Box::from("export"), monthly(100)),
            (
                Box::from("browse"),
                Entitlement {
                    limit: Limit::Unlimited,
                    window: None,
                },
            ),
        ]),
        HashMap::from([(Box::from("export"), 50)]),
    );
    let engine = EntitlementEngine::new(store);
    let at = utc_ms(2024, 1, 15, 0, 0);
    let dashboard = engine.dashboard("acme", Some(at)).await.unwrap();

    let actions: Vec<&str> = dashboard.keys().map(|k| &**k).collect();
    assert_eq!(actions, vec!["browse", "export"]);

    let export = &dashboard["export"];
    assert_eq!(export.used, 50);
    assert_eq!(export.remaining, Limit::Count(50));
    assert_eq!(export.resets_at, Some(utc_ms(2024, 2, 1, 0, 0)));
    assert_eq!(
        export.interval,
        Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 2, 1, 0, 0))
    );

    let browse = &dashboard["browse"];
    assert_eq!(browse.remaining, Limit::Unlimited);
    assert_eq!(browse.resets_at, None);
}

#[tokio::test]
async fn store_failures_propagate_as_errors() {
    let mut store = MockStore::new(HashMap::new(), HashMap::new());
    store.fail = true;
    let engine = EntitlementEngine::new(store);
    assert!(engine.check("acme", "export", 1, None).await.is_err());
    assert!(engine.capabilities("acme", &["export"], None).await.is_err());
    assert!(engine.dashboard("acme", None).await.is_err());
}
