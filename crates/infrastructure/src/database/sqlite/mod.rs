mod sqlite_allocation_repository;
mod sqlite_attendance_repository;
mod sqlite_job_repository;
mod sqlite_passcode_repository;
mod sqlite_wage_repository;
mod sqlite_worker_repository;

pub use sqlite_allocation_repository::SqliteAllocationRepository;
pub use sqlite_attendance_repository::SqliteAttendanceRepository;
pub use sqlite_job_repository::SqliteJobRepository;
pub use sqlite_passcode_repository::SqlitePasscodeRepository;
pub use sqlite_wage_repository::SqliteWageRepository;
pub use sqlite_worker_repository::SqliteWorkerRepository;
