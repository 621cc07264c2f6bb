// Shared wiring so tests can `use helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;

use basalt::{Basalt, BasaltBuilder, Event, EventSource};
use basalt_mock::{MockAccess, MockDirectory, MockStore, PUMP_DAY_STREAM};
use serde_json::Value;

/// Subject owning the pump-day fixture.
pub const ALICE: &str = "alice";
/// Subject granted access to `ALICE`.
pub const CARER: &str = "carer";
/// Subject with no grants and no uploads.
pub const MALLORY: &str = "mallory";
/// Subject whose stream breaks after one event.
pub const BROKEN: &str = "broken";
/// Subject whose stream fails to open.
pub const FAILING: &str = "failing";
/// Subject with an empty stream.
pub const EMPTY: &str = "empty";

pub fn directory() -> MockDirectory {
    MockDirectory::new()
        .with(ALICE, PUMP_DAY_STREAM)
        .with(BROKEN, "BROKEN")
        .with(FAILING, "FAIL")
        .with(EMPTY, "upload-empty")
}

pub fn access() -> MockAccess {
    MockAccess::new().grant(CARER, ALICE)
}

pub fn builder_with(source: Arc<dyn EventSource>) -> BasaltBuilder {
    Basalt::builder()
        .with_source(source)
        .with_directory(Arc::new(directory()))
        .with_access(Arc::new(access()))
}

pub fn fixture_service() -> Basalt {
    builder_with(Arc::new(MockStore::with_fixtures()))
        .build()
        .expect("valid service")
}

pub fn ev(v: Value) -> Event {
    Event::from_value(v).expect("event object")
}

/// `_id` labels of the normalized pump-day fixture, in output order.
pub const PUMP_DAY_IDS: &[&str] = &[
    "sched-0000",
    "cbg-0300",
    "sched-0600",
    "cbg-0700",
    "bolus-0705",
    "cbg-1200",
    "temp-1400",
    "cbg-1800",
    "sched-2200",
];
