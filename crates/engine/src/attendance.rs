use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use rozgar_domain::entities::AttendanceRecord;
use rozgar_domain::repositories::{AttendanceRepository, JobRepository, WorkerRepository};
use rozgar_errors::{RozgarError, RozgarResult};

/// 考勤记录器
///
/// 只应在验证码校验通过后调用。出勤记录与工人累计出勤天数的
/// 递增由仓储在同一事务提交。
pub struct AttendanceRecorder {
    pub worker_repo: Arc<dyn WorkerRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub attendance_repo: Arc<dyn AttendanceRepository>,
}

impl AttendanceRecorder {
    pub fn new(
        worker_repo: Arc<dyn WorkerRepository>,
        job_repo: Arc<dyn JobRepository>,
        attendance_repo: Arc<dyn AttendanceRepository>,
    ) -> Self {
        Self {
            worker_repo,
            job_repo,
            attendance_repo,
        }
    }

    pub async fn mark_attendance(
        &self,
        contact: &str,
        job_id: &str,
        supervisor_id: &str,
        date: NaiveDate,
    ) -> RozgarResult<AttendanceRecord> {
        let worker = self
            .worker_repo
            .find_by_contact(contact)
            .await?
            .ok_or_else(|| RozgarError::worker_not_found(contact))?;
        self.job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| RozgarError::job_not_found(job_id))?;

        // 每个 (工人, 作业, 日期) 至多一条；先查后插，唯一索引兜底并发
        if self
            .attendance_repo
            .find_by_worker_job_date(&worker.id, job_id, date)
            .await?
            .is_some()
        {
            return Err(RozgarError::AlreadyMarked {
                worker_id: worker.id,
                job_id: job_id.to_string(),
                date: date.to_string(),
            });
        }

        let record = AttendanceRecord::new(
            job_id.to_string(),
            worker.id.clone(),
            supervisor_id.to_string(),
            date,
        );
        let created = self.attendance_repo.record_present(&record).await?;
        info!(
            attendance_id = %created.id,
            worker_id = %created.worker_id,
            job_id = %created.job_id,
            date = %created.work_date,
            "考勤已记录"
        );
        Ok(created)
    }

    /// 记录今日考勤
    pub async fn mark_today(
        &self,
        contact: &str,
        job_id: &str,
        supervisor_id: &str,
    ) -> RozgarResult<AttendanceRecord> {
        self.mark_attendance(contact, job_id, supervisor_id, Utc::now().date_naive())
            .await
    }
}
