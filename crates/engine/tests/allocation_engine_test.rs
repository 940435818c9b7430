use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use rozgar_domain::entities::{JobStatus, WorkerResponse};
use rozgar_engine::{AllocationEngine, TenureDecayRanking};
use rozgar_errors::RozgarError;
use rozgar_testing_utils::{
    JobBuilder, MockAllocationRepository, MockJobRepository, MockWorkerRepository, WorkerBuilder,
};

fn engine_with(
    workers: MockWorkerRepository,
    jobs: MockJobRepository,
    allocations: MockAllocationRepository,
) -> AllocationEngine {
    AllocationEngine::new(
        Arc::new(jobs),
        Arc::new(workers),
        Arc::new(allocations),
        Arc::new(TenureDecayRanking::new()),
    )
}

fn registered(seq: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap() + Duration::minutes(seq)
}

#[tokio::test]
async fn test_allocates_by_priority_with_waitlist() {
    // W1 (工龄10, 残障)=240, W2 (工龄10)=140, W3 (工龄200)=0; 需求2人
    let workers = MockWorkerRepository::with_workers(vec![
        WorkerBuilder::new("WOR0001")
            .district("District-D")
            .days_worked(10)
            .disabled(true)
            .registered_at(registered(1))
            .build(),
        WorkerBuilder::new("WOR0002")
            .district("District-D")
            .days_worked(10)
            .registered_at(registered(2))
            .build(),
        WorkerBuilder::new("WOR0003")
            .district("District-D")
            .days_worked(200)
            .registered_at(registered(3))
            .build(),
    ]);
    let jobs = MockJobRepository::with_jobs(vec![JobBuilder::new("JOB0001")
        .district("District-D")
        .workers_required(2)
        .build()]);
    let allocations = MockAllocationRepository::new();
    let engine = engine_with(workers, jobs, allocations);

    let outcome = engine.allocate_workers("JOB0001").await.unwrap();

    let allocated: Vec<&str> = outcome
        .allocated
        .iter()
        .map(|a| a.worker_id.as_str())
        .collect();
    let waiting: Vec<&str> = outcome
        .waiting
        .iter()
        .map(|a| a.worker_id.as_str())
        .collect();
    assert_eq!(allocated, vec!["WOR0001", "WOR0002"]);
    assert_eq!(waiting, vec!["WOR0003"]);

    assert_eq!(outcome.allocated[0].priority_score, 240);
    assert_eq!(outcome.allocated[1].priority_score, 140);
    assert_eq!(outcome.waiting[0].priority_score, 0);
}

#[tokio::test]
async fn test_capacity_bounds_and_totals() {
    // |Allocated| = min(required, n), |Allocated| + |Waiting| = n
    let workers = MockWorkerRepository::with_workers(
        (1..=5)
            .map(|i| {
                WorkerBuilder::new(&format!("WOR{i:04}"))
                    .district("District-D")
                    .days_worked(i * 10)
                    .registered_at(registered(i))
                    .build()
            })
            .collect(),
    );
    let jobs = MockJobRepository::with_jobs(vec![JobBuilder::new("JOB0001")
        .district("District-D")
        .workers_required(3)
        .build()]);
    let engine = engine_with(workers, jobs, MockAllocationRepository::new());

    let outcome = engine.allocate_workers("JOB0001").await.unwrap();
    assert_eq!(outcome.allocated.len(), 3);
    assert_eq!(outcome.waiting.len(), 2);
}

#[tokio::test]
async fn test_required_exceeding_pool_allocates_everyone() {
    let workers = MockWorkerRepository::with_workers(vec![
        WorkerBuilder::new("WOR0001")
            .district("District-D")
            .registered_at(registered(1))
            .build(),
        WorkerBuilder::new("WOR0002")
            .district("District-D")
            .registered_at(registered(2))
            .build(),
    ]);
    let jobs = MockJobRepository::with_jobs(vec![JobBuilder::new("JOB0001")
        .district("District-D")
        .workers_required(10)
        .build()]);
    let engine = engine_with(workers, jobs, MockAllocationRepository::new());

    let outcome = engine.allocate_workers("JOB0001").await.unwrap();
    assert_eq!(outcome.allocated.len(), 2);
    assert!(outcome.waiting.is_empty());
}

#[tokio::test]
async fn test_empty_district_is_noop() {
    let workers = MockWorkerRepository::with_workers(vec![WorkerBuilder::new("WOR0001")
        .district("District-X")
        .build()]);
    let jobs = MockJobRepository::with_jobs(vec![JobBuilder::new("JOB0001")
        .district("District-D")
        .build()]);
    let allocations = MockAllocationRepository::new();
    let engine = engine_with(workers, jobs, allocations.clone());

    let outcome = engine.allocate_workers("JOB0001").await.unwrap();
    assert!(outcome.allocated.is_empty());
    assert!(outcome.waiting.is_empty());
    assert_eq!(allocations.count(), 0);
}

#[tokio::test]
async fn test_unknown_job_fails_with_not_found() {
    let engine = engine_with(
        MockWorkerRepository::new(),
        MockJobRepository::new(),
        MockAllocationRepository::new(),
    );
    let result = engine.allocate_workers("JOB9999").await;
    assert!(matches!(result, Err(RozgarError::JobNotFound { ref id }) if id == "JOB9999"));
}

#[tokio::test]
async fn test_closed_job_is_rejected() {
    let jobs = MockJobRepository::with_jobs(vec![JobBuilder::new("JOB0001")
        .district("District-D")
        .status(JobStatus::Closed)
        .build()]);
    let engine = engine_with(
        MockWorkerRepository::new(),
        jobs,
        MockAllocationRepository::new(),
    );
    let result = engine.allocate_workers("JOB0001").await;
    assert!(matches!(result, Err(RozgarError::ValidationError(_))));
}

#[tokio::test]
async fn test_reinvocation_does_not_duplicate() {
    let workers = MockWorkerRepository::with_workers(vec![
        WorkerBuilder::new("WOR0001")
            .district("District-D")
            .registered_at(registered(1))
            .build(),
        WorkerBuilder::new("WOR0002")
            .district("District-D")
            .registered_at(registered(2))
            .build(),
        WorkerBuilder::new("WOR0003")
            .district("District-D")
            .registered_at(registered(3))
            .build(),
    ]);
    let jobs = MockJobRepository::with_jobs(vec![JobBuilder::new("JOB0001")
        .district("District-D")
        .workers_required(2)
        .build()]);
    let allocations = MockAllocationRepository::new();
    let engine = engine_with(workers.clone(), jobs, allocations.clone());

    let first = engine.allocate_workers("JOB0001").await.unwrap();
    assert_eq!(first.allocated.len(), 2);
    assert_eq!(first.waiting.len(), 1);
    assert_eq!(allocations.count(), 3);

    // 重复调用: 所有工人都已有记录，不再产生新分配
    let second = engine.allocate_workers("JOB0001").await.unwrap();
    assert!(second.allocated.is_empty());
    assert!(second.waiting.is_empty());
    assert_eq!(allocations.count(), 3);
}

#[tokio::test]
async fn test_reinvocation_fills_remaining_capacity_for_new_workers() {
    let workers = MockWorkerRepository::with_workers(vec![WorkerBuilder::new("WOR0001")
        .district("District-D")
        .registered_at(registered(1))
        .build()]);
    let jobs = MockJobRepository::with_jobs(vec![JobBuilder::new("JOB0001")
        .district("District-D")
        .workers_required(2)
        .build()]);
    let allocations = MockAllocationRepository::new();
    let engine = engine_with(workers.clone(), jobs, allocations.clone());

    let first = engine.allocate_workers("JOB0001").await.unwrap();
    assert_eq!(first.allocated.len(), 1);

    // 新工人注册后再次运行，只补足剩余1个名额
    workers.insert(
        WorkerBuilder::new("WOR0002")
            .district("District-D")
            .registered_at(registered(2))
            .build(),
    );
    workers.insert(
        WorkerBuilder::new("WOR0003")
            .district("District-D")
            .registered_at(registered(3))
            .build(),
    );
    let second = engine.allocate_workers("JOB0001").await.unwrap();
    assert_eq!(second.allocated.len(), 1);
    assert_eq!(second.allocated[0].worker_id, "WOR0002");
    assert_eq!(second.waiting.len(), 1);
    assert_eq!(second.waiting[0].worker_id, "WOR0003");
}

#[tokio::test]
async fn test_deterministic_order_across_runs_on_identical_input() {
    let build_engine = || {
        let workers = MockWorkerRepository::with_workers(
            (1..=4)
                .map(|i| {
                    // 全部同分
                    WorkerBuilder::new(&format!("WOR{i:04}"))
                        .district("District-D")
                        .days_worked(10)
                        .registered_at(registered(i))
                        .build()
                })
                .collect(),
        );
        let jobs = MockJobRepository::with_jobs(vec![JobBuilder::new("JOB0001")
            .district("District-D")
            .workers_required(2)
            .build()]);
        engine_with(workers, jobs, MockAllocationRepository::new())
    };

    let mut previous: Option<(Vec<String>, Vec<String>)> = None;
    for _ in 0..5 {
        let outcome = build_engine().allocate_workers("JOB0001").await.unwrap();
        let allocated: Vec<String> = outcome.allocated.iter().map(|a| a.worker_id.clone()).collect();
        let waiting: Vec<String> = outcome.waiting.iter().map(|a| a.worker_id.clone()).collect();
        assert_eq!(allocated, vec!["WOR0001", "WOR0002"]);
        if let Some((prev_a, prev_w)) = &previous {
            assert_eq!(&allocated, prev_a);
            assert_eq!(&waiting, prev_w);
        }
        previous = Some((allocated, waiting));
    }
}

#[tokio::test]
async fn test_respond_accepts_pending_allocation() {
    let workers = MockWorkerRepository::with_workers(vec![WorkerBuilder::new("WOR0001")
        .district("District-D")
        .build()]);
    let jobs = MockJobRepository::with_jobs(vec![JobBuilder::new("JOB0001")
        .district("District-D")
        .build()]);
    let allocations = MockAllocationRepository::new();
    let engine = engine_with(workers, jobs, allocations);

    let outcome = engine.allocate_workers("JOB0001").await.unwrap();
    let alloc_id = outcome.allocated[0].id.clone();

    let updated = engine
        .respond(&alloc_id, WorkerResponse::Accepted)
        .await
        .unwrap();
    assert_eq!(updated.response, WorkerResponse::Accepted);

    // 已回复的分配不允许再次回复
    let again = engine.respond(&alloc_id, WorkerResponse::Declined).await;
    assert!(matches!(again, Err(RozgarError::ValidationError(_))));

    // 回复不能设回 PENDING
    let pending = engine.respond(&alloc_id, WorkerResponse::Pending).await;
    assert!(matches!(pending, Err(RozgarError::ValidationError(_))));
}
