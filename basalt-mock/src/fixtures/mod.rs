//! Deterministic device data used by the mock store.

mod pump_day;

pub use pump_day::pump_day;
