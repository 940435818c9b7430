use rozgar_domain::entities::{Job, Worker};

/// 工人优先级评分策略
///
/// 纯函数，无副作用；相同输入必须产生相同得分。
pub trait RankingStrategy: Send + Sync {
    fn score(&self, worker: &Worker, job: &Job) -> i64;
    fn name(&self) -> &str;
}

/// 默认策略: 残障加分 + 低工龄加分 + 工龄衰减
///
/// 累计出勤越少得分越高，100天封顶后衰减项归零。
pub struct TenureDecayRanking;

impl TenureDecayRanking {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TenureDecayRanking {
    fn default() -> Self {
        Self::new()
    }
}

impl RankingStrategy for TenureDecayRanking {
    fn score(&self, worker: &Worker, _job: &Job) -> i64 {
        let mut score = 0;
        if worker.disabled {
            score += 100;
        }
        if worker.days_worked < 50 {
            score += 50;
        }
        score += 100 - worker.days_worked.min(100);
        score
    }

    fn name(&self) -> &str {
        "TenureDecay"
    }
}

/// 对候选工人评分并排序
///
/// 得分降序；同分按注册顺序（注册时间，再按标识符）保证
/// 多次运行结果一致。
pub fn rank_workers<'a>(
    strategy: &dyn RankingStrategy,
    job: &Job,
    workers: &'a [Worker],
) -> Vec<(&'a Worker, i64)> {
    let mut scored: Vec<(&Worker, i64)> = workers
        .iter()
        .map(|w| (w, strategy.score(w, job)))
        .collect();
    scored.sort_by(|(a, sa), (b, sb)| {
        sb.cmp(sa)
            .then_with(|| a.registered_at.cmp(&b.registered_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    scored
}
