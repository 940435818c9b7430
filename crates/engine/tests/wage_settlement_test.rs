use std::sync::Arc;

use chrono::NaiveDate;

use rozgar_domain::entities::PaymentStatus;
use rozgar_domain::repositories::WageRepository;
use rozgar_engine::{AttendanceRecorder, WageSettlement};
use rozgar_testing_utils::{
    JobBuilder, MockAttendanceRepository, MockJobRepository, MockWageRepository,
    MockWorkerRepository, WorkerBuilder,
};

struct Fixture {
    recorder: AttendanceRecorder,
    settlement: WageSettlement,
    wages: MockWageRepository,
}

fn setup() -> Fixture {
    let workers = MockWorkerRepository::with_workers(vec![
        WorkerBuilder::new("WOR0001")
            .phone("9000000001")
            .district("District-D")
            .build(),
        WorkerBuilder::new("WOR0002")
            .phone("9000000002")
            .district("District-D")
            .build(),
    ]);
    let jobs = MockJobRepository::with_jobs(vec![
        JobBuilder::new("JOB0001")
            .district("District-D")
            .daily_wage(350.0)
            .build(),
        JobBuilder::new("JOB0002")
            .district("District-D")
            .daily_wage(275.0)
            .build(),
    ]);
    let attendance = MockAttendanceRepository::new(workers.clone());
    let wages = MockWageRepository::new(attendance.clone());
    let recorder = AttendanceRecorder::new(
        Arc::new(workers),
        Arc::new(jobs.clone()),
        Arc::new(attendance.clone()),
    );
    let settlement = WageSettlement::new(
        Arc::new(attendance),
        Arc::new(jobs),
        Arc::new(wages.clone()),
    );
    Fixture {
        recorder,
        settlement,
        wages,
    }
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

#[tokio::test]
async fn test_settlement_aggregates_per_worker_job() {
    let fixture = setup();

    // WOR0001: JOB0001 × 3天, JOB0002 × 1天; WOR0002: JOB0001 × 2天
    for d in 1..=3 {
        fixture
            .recorder
            .mark_attendance("9000000001", "JOB0001", "SUP0001", date(d))
            .await
            .unwrap();
    }
    fixture
        .recorder
        .mark_attendance("9000000001", "JOB0002", "SUP0001", date(1))
        .await
        .unwrap();
    for d in 1..=2 {
        fixture
            .recorder
            .mark_attendance("9000000002", "JOB0001", "SUP0001", date(d))
            .await
            .unwrap();
    }

    let records = fixture.settlement.settle_wages().await.unwrap();
    assert_eq!(records.len(), 3);

    let find = |worker: &str, job: &str| {
        records
            .iter()
            .find(|w| w.worker_id == worker && w.job_id == job)
            .unwrap()
    };
    // total_wage = days_present × daily_wage，精确相等
    let w1j1 = find("WOR0001", "JOB0001");
    assert_eq!(w1j1.days_present, 3);
    assert_eq!(w1j1.daily_wage, 350.0);
    assert_eq!(w1j1.total_wage, 1050.0);
    assert_eq!(w1j1.payment_status, PaymentStatus::Pending);

    let w1j2 = find("WOR0001", "JOB0002");
    assert_eq!(w1j2.days_present, 1);
    assert_eq!(w1j2.total_wage, 275.0);

    let w2j1 = find("WOR0002", "JOB0001");
    assert_eq!(w2j1.days_present, 2);
    assert_eq!(w2j1.total_wage, 700.0);
}

#[tokio::test]
async fn test_rerun_does_not_double_settle() {
    let fixture = setup();

    for d in 1..=3 {
        fixture
            .recorder
            .mark_attendance("9000000001", "JOB0001", "SUP0001", date(d))
            .await
            .unwrap();
    }

    let first = fixture.settlement.settle_wages().await.unwrap();
    assert_eq!(first.len(), 1);
    let total_after_first = fixture.wages.total_settled().await.unwrap();

    // 相同出勤数据上的第二次运行不产生任何新记录
    let second = fixture.settlement.settle_wages().await.unwrap();
    assert!(second.is_empty());
    assert_eq!(fixture.wages.count(), 1);
    assert_eq!(fixture.wages.total_settled().await.unwrap(), total_after_first);
}

#[tokio::test]
async fn test_new_attendance_after_settlement_settles_separately() {
    let fixture = setup();

    fixture
        .recorder
        .mark_attendance("9000000001", "JOB0001", "SUP0001", date(1))
        .await
        .unwrap();
    let first = fixture.settlement.settle_wages().await.unwrap();
    assert_eq!(first[0].total_wage, 350.0);

    fixture
        .recorder
        .mark_attendance("9000000001", "JOB0001", "SUP0001", date(2))
        .await
        .unwrap();
    let second = fixture.settlement.settle_wages().await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].days_present, 1);
    assert_eq!(second[0].total_wage, 350.0);

    // 两轮合计 = 2天 × 350
    assert_eq!(fixture.wages.total_settled().await.unwrap(), 700.0);
}

#[tokio::test]
async fn test_attendance_with_dangling_job_is_skipped() {
    let workers = MockWorkerRepository::with_workers(vec![WorkerBuilder::new("WOR0001")
        .phone("9000000001")
        .district("District-D")
        .build()]);
    let jobs = MockJobRepository::new();
    let attendance = MockAttendanceRepository::new(workers.clone());
    let wages = MockWageRepository::new(attendance.clone());

    // 作业引用悬空的出勤记录（作业表为空）
    use rozgar_domain::entities::AttendanceRecord;
    use rozgar_domain::repositories::AttendanceRepository;
    attendance
        .record_present(&AttendanceRecord::new(
            "JOB9999".to_string(),
            "WOR0001".to_string(),
            "SUP0001".to_string(),
            date(1),
        ))
        .await
        .unwrap();

    let settlement = WageSettlement::new(
        Arc::new(attendance.clone()),
        Arc::new(jobs),
        Arc::new(wages.clone()),
    );
    let records = settlement.settle_wages().await.unwrap();
    assert!(records.is_empty());
    assert_eq!(wages.count(), 0);
    // 未结算记录保留，待人工处理
    assert_eq!(attendance.find_unsettled_present().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_attendance_is_noop() {
    let fixture = setup();
    let records = fixture.settlement.settle_wages().await.unwrap();
    assert!(records.is_empty());
    assert_eq!(fixture.wages.count(), 0);
}

#[tokio::test]
async fn test_payment_status_transition() {
    let fixture = setup();
    fixture
        .recorder
        .mark_attendance("9000000001", "JOB0001", "SUP0001", date(1))
        .await
        .unwrap();
    let records = fixture.settlement.settle_wages().await.unwrap();

    let paid = fixture
        .wages
        .update_payment_status(&records[0].id, PaymentStatus::Paid)
        .await
        .unwrap();
    assert!(paid.is_paid());
}
