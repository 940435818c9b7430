//! Shared testing utilities: in-memory mock repositories and entity builders.
//!
//! The mocks honor the same atomicity contracts as the SQLite
//! implementations (batch all-or-none, attendance + tenure in one step,
//! settlement marking), so engine tests exercise the real invariants
//! without a database.

pub mod builders;
pub mod mocks;

pub use builders::{JobBuilder, WorkerBuilder};
pub use mocks::{
    MockAllocationRepository, MockAttendanceRepository, MockJobRepository,
    MockPasscodeNotifier, MockPasscodeRepository, MockWageRepository, MockWorkerRepository,
};
