//! 端到端场景测试: 嵌入式启动，走完整的
//! 注册 → 建作业 → 分配 → 验证码 → 考勤 → 结算流程。

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tempfile::TempDir;

use rozgar_config::AppConfig;
use rozgar_domain::entities::{
    JobPosting, PasscodeToken, PaymentStatus, WorkerRegistration, WorkerResponse,
};
use rozgar_domain::repositories::PasscodeRepository;
use rozgar_errors::RozgarError;
use rozgar_infrastructure::SqlitePasscodeRepository;
use rozgar_testing_utils::MockPasscodeNotifier;

use crate::Application;

struct TestApp {
    app: Application,
    notifier: MockPasscodeNotifier,
    _temp_dir: TempDir,
}

async fn start() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_rozgar.db");
    let mut config = AppConfig::embedded_default();
    config.database.url = format!("sqlite:{}", db_path.display());

    let notifier = MockPasscodeNotifier::new();
    let app = Application::with_notifier(config, Arc::new(notifier.clone()))
        .await
        .unwrap();
    TestApp {
        app,
        notifier,
        _temp_dir: temp_dir,
    }
}

fn registration(name: &str, phone: &str, district: &str, disabled: bool) -> WorkerRegistration {
    WorkerRegistration {
        name: name.to_string(),
        email: format!("{phone}@example.com"),
        phone: phone.to_string(),
        district: district.to_string(),
        disabled,
    }
}

fn posting(district: &str, required: i64, wage: f64) -> JobPosting {
    JobPosting {
        district: district.to_string(),
        work_category: "irrigation".to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        duration_days: 30,
        workers_required: required,
        daily_wage: wage,
    }
}

async fn set_days_worked(app: &Application, worker_id: &str, days: i64) {
    // 测试夹具: 直接调整累计出勤，模拟既有工龄
    sqlx::query("UPDATE workers SET days_worked = ?1 WHERE id = ?2")
        .bind(days)
        .bind(worker_id)
        .execute(app.pool())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_priority_allocation_with_waitlist() {
    let fixture = start().await;
    let app = &fixture.app;

    // 区县D: W1 (工龄10, 残障), W2 (工龄10), W3 (工龄200); 作业需2人
    let w1 = app
        .register_worker(registration("W1", "9000000001", "District-D", true))
        .await
        .unwrap();
    let w2 = app
        .register_worker(registration("W2", "9000000002", "District-D", false))
        .await
        .unwrap();
    let w3 = app
        .register_worker(registration("W3", "9000000003", "District-D", false))
        .await
        .unwrap();
    set_days_worked(app, &w1.id, 10).await;
    set_days_worked(app, &w2.id, 10).await;
    set_days_worked(app, &w3.id, 200).await;

    let job = app
        .create_job(posting("District-D", 2, 300.0), "GOV0001")
        .await
        .unwrap();
    assert_eq!(job.id, "JOB0001");

    let outcome = app.allocate_workers(&job.id).await.unwrap();

    // 期望得分: W1=240, W2=140, W3=0; 在岗=[W1, W2], 候补=[W3]
    assert_eq!(outcome.allocated.len(), 2);
    assert_eq!(outcome.allocated[0].worker_id, w1.id);
    assert_eq!(outcome.allocated[0].priority_score, 240);
    assert_eq!(outcome.allocated[1].worker_id, w2.id);
    assert_eq!(outcome.allocated[1].priority_score, 140);
    assert_eq!(outcome.waiting.len(), 1);
    assert_eq!(outcome.waiting[0].worker_id, w3.id);
    assert_eq!(outcome.waiting[0].priority_score, 0);

    // 分配标识符格式
    assert_eq!(outcome.allocated[0].id, "ALLOC00001");

    // 重复分配不产生新记录
    let rerun = app.allocate_workers(&job.id).await.unwrap();
    assert!(rerun.allocated.is_empty());
    assert!(rerun.waiting.is_empty());
    assert_eq!(app.job_allocations(&job.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_passcode_gated_attendance_flow() {
    let fixture = start().await;
    let app = &fixture.app;

    let worker = app
        .register_worker(registration("Asha", "9999999999", "District-D", false))
        .await
        .unwrap();
    let job = app
        .create_job(posting("District-D", 1, 350.0), "GOV0001")
        .await
        .unwrap();
    app.allocate_workers(&job.id).await.unwrap();

    // 错误验证码被拒绝
    let denied = app
        .verify_and_mark_attendance("9999999999", "000000", &job.id, "SUP0001")
        .await;
    assert!(matches!(denied, Err(RozgarError::InvalidPasscode)));

    // 签发验证码，经下发通道出站
    app.issue_passcode("9999999999").await.unwrap();
    let code = fixture.notifier.last_code_for("9999999999").unwrap();

    let record = app
        .verify_and_mark_attendance("9999999999", &code, &job.id, "SUP0001")
        .await
        .unwrap();
    assert_eq!(record.worker_id, worker.id);
    assert_eq!(record.id, "ATT00001");

    // 已消费的验证码不能再次通过
    let replay = app
        .verify_and_mark_attendance("9999999999", &code, &job.id, "SUP0001")
        .await;
    assert!(matches!(replay, Err(RozgarError::InvalidPasscode)));

    // 新验证码通过，但当日考勤已存在
    app.issue_passcode("9999999999").await.unwrap();
    let fresh = fixture.notifier.last_code_for("9999999999").unwrap();
    let duplicate = app
        .verify_and_mark_attendance("9999999999", &fresh, &job.id, "SUP0001")
        .await;
    assert!(matches!(duplicate, Err(RozgarError::AlreadyMarked { .. })));

    // 工龄恰好递增一次
    let reloaded: i64 = sqlx::query_scalar("SELECT days_worked FROM workers WHERE id = ?1")
        .bind(&worker.id)
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(reloaded, 1);
}

#[tokio::test]
async fn test_expired_passcode_is_rejected() {
    let fixture = start().await;
    let app = &fixture.app;

    app.register_worker(registration("Asha", "9999999999", "District-D", false))
        .await
        .unwrap();
    let job = app
        .create_job(posting("District-D", 1, 350.0), "GOV0001")
        .await
        .unwrap();

    // 11分钟前签发的验证码
    let passcodes = SqlitePasscodeRepository::new(app.pool().clone());
    let mut stale = PasscodeToken::new("9999999999".to_string(), "654321".to_string());
    stale.issued_at = Utc::now() - Duration::minutes(11);
    passcodes.create(&stale).await.unwrap();

    let expired = app
        .verify_and_mark_attendance("9999999999", "654321", &job.id, "SUP0001")
        .await;
    assert!(matches!(expired, Err(RozgarError::InvalidPasscode)));

    // 新签发的验证码在1分钟内提交恰好成功一次
    app.issue_passcode("9999999999").await.unwrap();
    let code = fixture.notifier.last_code_for("9999999999").unwrap();
    assert!(app
        .verify_and_mark_attendance("9999999999", &code, &job.id, "SUP0001")
        .await
        .is_ok());
    let replay = app
        .verify_and_mark_attendance("9999999999", &code, &job.id, "SUP0001")
        .await;
    assert!(matches!(replay, Err(RozgarError::InvalidPasscode)));
}

#[tokio::test]
async fn test_settlement_end_to_end() {
    let fixture = start().await;
    let app = &fixture.app;

    let w1 = app
        .register_worker(registration("W1", "9000000001", "District-D", false))
        .await
        .unwrap();
    let w2 = app
        .register_worker(registration("W2", "9000000002", "District-D", false))
        .await
        .unwrap();
    let job = app
        .create_job(posting("District-D", 2, 350.0), "GOV0001")
        .await
        .unwrap();
    app.allocate_workers(&job.id).await.unwrap();

    // W1 出勤3天, W2 出勤2天
    for d in 1..=3 {
        app.mark_attendance(
            "9000000001",
            &job.id,
            "SUP0001",
            NaiveDate::from_ymd_opt(2025, 6, d).unwrap(),
        )
        .await
        .unwrap();
    }
    for d in 1..=2 {
        app.mark_attendance(
            "9000000002",
            &job.id,
            "SUP0001",
            NaiveDate::from_ymd_opt(2025, 6, d).unwrap(),
        )
        .await
        .unwrap();
    }

    assert_eq!(app.worker_attendance(&w1.id).await.unwrap().len(), 3);

    let records = app.settle_wages().await.unwrap();
    assert_eq!(records.len(), 2);

    let w1_wages = app.worker_wages(&w1.id).await.unwrap();
    assert_eq!(w1_wages.len(), 1);
    assert_eq!(w1_wages[0].days_present, 3);
    assert_eq!(w1_wages[0].total_wage, 1050.0);
    assert_eq!(w1_wages[0].payment_status, PaymentStatus::Pending);

    let w2_wages = app.worker_wages(&w2.id).await.unwrap();
    assert_eq!(w2_wages[0].total_wage, 700.0);

    // 相同出勤数据上的第二次结算不产生新记录，应付总额不变
    let rerun = app.settle_wages().await.unwrap();
    assert!(rerun.is_empty());
    let stats = app.dashboard_stats().await.unwrap();
    assert_eq!(stats.wages_settled, 1750.0);

    // 支付状态流转
    let paid = app.mark_wage_paid(&w1_wages[0].id).await.unwrap();
    assert!(paid.is_paid());
}

#[tokio::test]
async fn test_dashboard_stats_projection() {
    let fixture = start().await;
    let app = &fixture.app;

    app.register_worker(registration("W1", "9000000001", "District-D", true))
        .await
        .unwrap();
    app.register_worker(registration("W2", "9000000002", "District-D", false))
        .await
        .unwrap();
    let job = app
        .create_job(posting("District-D", 1, 300.0), "GOV0001")
        .await
        .unwrap();
    let closed = app
        .create_job(posting("District-E", 1, 300.0), "GOV0001")
        .await
        .unwrap();
    app.close_job(&closed.id).await.unwrap();
    app.allocate_workers(&job.id).await.unwrap();

    let stats = app.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_workers, 2);
    assert_eq!(stats.disabled_workers, 1);
    assert_eq!(stats.active_jobs, 1);
    assert_eq!(stats.workers_allocated, 1);
    assert_eq!(stats.wages_settled, 0.0);
}

#[tokio::test]
async fn test_worker_response_relay() {
    let fixture = start().await;
    let app = &fixture.app;

    let worker = app
        .register_worker(registration("W1", "9000000001", "District-D", false))
        .await
        .unwrap();
    let job = app
        .create_job(posting("District-D", 1, 300.0), "GOV0001")
        .await
        .unwrap();
    let outcome = app.allocate_workers(&job.id).await.unwrap();
    let allocation_id = outcome.allocated[0].id.clone();

    let accepted = app
        .respond_to_allocation(&allocation_id, WorkerResponse::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.response, WorkerResponse::Accepted);

    let mine = app.worker_allocations(&worker.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].response, WorkerResponse::Accepted);
}

#[tokio::test]
async fn test_closed_job_cannot_be_allocated() {
    let fixture = start().await;
    let app = &fixture.app;

    app.register_worker(registration("W1", "9000000001", "District-D", false))
        .await
        .unwrap();
    let job = app
        .create_job(posting("District-D", 1, 300.0), "GOV0001")
        .await
        .unwrap();
    app.close_job(&job.id).await.unwrap();

    let result = app.allocate_workers(&job.id).await;
    assert!(matches!(result, Err(RozgarError::ValidationError(_))));
}

#[tokio::test]
async fn test_invalid_posting_is_rejected() {
    let fixture = start().await;
    let app = &fixture.app;

    let zero_workers = app
        .create_job(posting("District-D", 0, 300.0), "GOV0001")
        .await;
    assert!(matches!(zero_workers, Err(RozgarError::ValidationError(_))));

    let negative_wage = app
        .create_job(posting("District-D", 2, -1.0), "GOV0001")
        .await;
    assert!(matches!(negative_wage, Err(RozgarError::ValidationError(_))));

    let missing_job = app.allocate_workers("JOB9999").await;
    assert!(matches!(missing_job, Err(RozgarError::JobNotFound { .. })));
}
