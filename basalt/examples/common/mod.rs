#![allow(dead_code)]

use std::sync::Arc;

use basalt::{Basalt, BasaltError};
use basalt_mock::{MockAccess, MockDirectory, MockStore, PUMP_DAY_STREAM};

/// Subject owning the demo upload stream.
pub const ALICE: &str = "alice";
/// Subject allowed to view `ALICE`.
pub const CARER: &str = "carer";

/// Service backed by the in-memory pump-day fixture.
pub fn demo_service() -> Result<Basalt, BasaltError> {
    Basalt::builder()
        .with_source(Arc::new(MockStore::with_fixtures()))
        .with_directory(Arc::new(MockDirectory::new().with(ALICE, PUMP_DAY_STREAM)))
        .with_access(Arc::new(MockAccess::new().grant(CARER, ALICE)))
        .https_port(8443)
        .build()
}
