use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use rozgar_domain::entities::WageRecord;
use rozgar_domain::repositories::{AttendanceRepository, JobRepository, WageRepository};
use rozgar_errors::RozgarResult;

/// 工资结算
///
/// 把尚未结算的出勤按 (工人, 作业) 聚合成工资记录。工资写入与
/// 出勤的已结算标记在同一事务提交，重复运行不会产生新记录。
pub struct WageSettlement {
    pub attendance_repo: Arc<dyn AttendanceRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub wage_repo: Arc<dyn WageRepository>,
}

impl WageSettlement {
    pub fn new(
        attendance_repo: Arc<dyn AttendanceRepository>,
        job_repo: Arc<dyn JobRepository>,
        wage_repo: Arc<dyn WageRepository>,
    ) -> Self {
        Self {
            attendance_repo,
            job_repo,
            wage_repo,
        }
    }

    pub async fn settle_wages(&self) -> RozgarResult<Vec<WageRecord>> {
        let unsettled = self.attendance_repo.find_unsettled_present().await?;
        if unsettled.is_empty() {
            debug!("没有待结算的出勤记录");
            return Ok(Vec::new());
        }

        // BTreeMap保证结算顺序稳定
        let mut groups: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
        for record in &unsettled {
            groups
                .entry((record.worker_id.clone(), record.job_id.clone()))
                .or_default()
                .push(record.id.clone());
        }

        let mut wages = Vec::new();
        let mut consumed = Vec::new();
        for ((worker_id, job_id), attendance_ids) in groups {
            let Some(job) = self.job_repo.find_by_id(&job_id).await? else {
                // 作业引用悬空的出勤跳过，留待人工处理
                warn!(worker_id = %worker_id, job_id = %job_id, "出勤记录引用的作业不存在，跳过结算");
                continue;
            };
            let days_present = attendance_ids.len() as i64;
            wages.push(WageRecord::new(
                worker_id,
                job_id,
                days_present,
                job.daily_wage,
            ));
            consumed.extend(attendance_ids);
        }

        if wages.is_empty() {
            return Ok(Vec::new());
        }

        let created = self.wage_repo.create_settlement(&wages, &consumed).await?;
        info!(
            wage_records = created.len(),
            attendance_consumed = consumed.len(),
            "工资结算完成"
        );
        Ok(created)
    }
}
