pub mod sqlite;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use rozgar_config::DatabaseConfig;
use rozgar_errors::{RozgarError, RozgarResult};

/// 创建SQLite连接池，启用外键约束和WAL模式
pub async fn create_pool(config: &DatabaseConfig) -> RozgarResult<SqlitePool> {
    let connect_options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| RozgarError::config_error(format!("解析数据库URL失败: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(5))
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_with(connect_options)
        .await?;

    debug!(url = %config.url, "数据库连接池创建完成");
    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> RozgarResult<()> {
    debug!("运行SQLite数据库迁移");

    // 工人表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL UNIQUE,
            district TEXT NOT NULL,
            disabled INTEGER NOT NULL DEFAULT 0,
            days_worked INTEGER NOT NULL DEFAULT 0,
            registered_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 作业表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            district TEXT NOT NULL,
            work_category TEXT NOT NULL,
            start_date DATE NOT NULL,
            duration_days INTEGER NOT NULL,
            workers_required INTEGER NOT NULL,
            daily_wage REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            created_by TEXT NOT NULL,
            created_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 分配表，(job, worker) 唯一
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS allocations (
            id TEXT PRIMARY KEY,
            job_id TEXT NOT NULL REFERENCES jobs(id),
            worker_id TEXT NOT NULL REFERENCES workers(id),
            status TEXT NOT NULL,
            response TEXT NOT NULL DEFAULT 'PENDING',
            priority_score INTEGER NOT NULL,
            allocated_at DATETIME NOT NULL,
            UNIQUE (job_id, worker_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 考勤表，(worker, job, date) 唯一
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id TEXT PRIMARY KEY,
            job_id TEXT NOT NULL REFERENCES jobs(id),
            worker_id TEXT NOT NULL REFERENCES workers(id),
            supervisor_id TEXT NOT NULL,
            work_date DATE NOT NULL,
            status TEXT NOT NULL DEFAULT 'PRESENT',
            settled INTEGER NOT NULL DEFAULT 0,
            marked_at DATETIME NOT NULL,
            UNIQUE (worker_id, job_id, work_date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 工资表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wages (
            id TEXT PRIMARY KEY,
            worker_id TEXT NOT NULL REFERENCES workers(id),
            job_id TEXT NOT NULL REFERENCES jobs(id),
            days_present INTEGER NOT NULL,
            daily_wage REAL NOT NULL,
            total_wage REAL NOT NULL,
            payment_status TEXT NOT NULL DEFAULT 'PENDING',
            computed_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 验证码令牌表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS passcode_tokens (
            id TEXT PRIMARY KEY,
            contact TEXT NOT NULL,
            code TEXT NOT NULL,
            issued_at DATETIME NOT NULL,
            used INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 标识符序列表，单行原子取号
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS id_sequences (
            name TEXT PRIMARY KEY,
            next_value INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO id_sequences (name, next_value) VALUES
            ('worker', 0),
            ('job', 0),
            ('allocation', 0),
            ('attendance', 0),
            ('wage', 0)
        "#,
    )
    .execute(pool)
    .await?;

    // 创建索引
    let indexes = vec![
        "CREATE INDEX IF NOT EXISTS idx_workers_district ON workers(district)",
        "CREATE INDEX IF NOT EXISTS idx_jobs_district ON jobs(district)",
        "CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status)",
        "CREATE INDEX IF NOT EXISTS idx_allocations_job_id ON allocations(job_id)",
        "CREATE INDEX IF NOT EXISTS idx_allocations_worker_id ON allocations(worker_id)",
        "CREATE INDEX IF NOT EXISTS idx_attendance_worker_id ON attendance(worker_id)",
        "CREATE INDEX IF NOT EXISTS idx_attendance_settled ON attendance(settled)",
        "CREATE INDEX IF NOT EXISTS idx_wages_worker_id ON wages(worker_id)",
        "CREATE INDEX IF NOT EXISTS idx_passcode_lookup ON passcode_tokens(contact, code, used)",
    ];

    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("SQLite数据库迁移完成");
    Ok(())
}
