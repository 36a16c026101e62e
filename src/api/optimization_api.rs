// ==========================================
// 预测性维护排程系统 - 舰队优化 API
// ==========================================
// 职责: 优化提案生成 / 查询 / 应用 / 驳回
// 红线: optimize 只产出提案;应用走乐观并发重校验
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::optimization::{ObjectiveWeights, OptimizationConstraints, OptimizationRun};
use crate::domain::types::DateRange;
use crate::engine::fleet::{ApplyOutcome, FleetOptimizer};
use crate::repository::optimization_repo::OptimizationRunRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// 请求 DTO
// ==========================================

/// 优化请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    /// 优化窗口
    pub period: DateRange,
    /// 目标权重
    #[serde(default)]
    pub objectives: ObjectiveWeights,
    /// 约束
    #[serde(default)]
    pub constraints: OptimizationConstraints,
    /// 操作人
    #[serde(default = "default_operator")]
    pub operator: String,
}

fn default_operator() -> String {
    "system".to_string()
}

// ==========================================
// OptimizationApi - 舰队优化 API
// ==========================================
pub struct OptimizationApi {
    fleet: Arc<FleetOptimizer>,
    run_repo: Arc<OptimizationRunRepository>,
}

impl OptimizationApi {
    /// 创建新的 OptimizationApi 实例
    pub fn new(fleet: Arc<FleetOptimizer>, run_repo: Arc<OptimizationRunRepository>) -> Self {
        Self { fleet, run_repo }
    }

    /// 生成优化提案
    ///
    /// # 返回
    /// OptimizationRun (status=PROPOSED);排程存储不被改写
    pub async fn optimize(&self, request: OptimizeRequest) -> ApiResult<OptimizationRun> {
        if request.period.from > request.period.to {
            return Err(ApiError::Validation(format!(
                "非法优化窗口: from={} > to={}",
                request.period.from, request.period.to
            )));
        }
        let weight_total = request.objectives.total();
        if weight_total <= 0.0 || !weight_total.is_finite() {
            return Err(ApiError::Validation(
                "目标权重总和必须为正数".to_string(),
            ));
        }

        let run = self
            .fleet
            .optimize(
                request.period,
                request.objectives,
                request.constraints,
                &request.operator,
            )
            .await?;
        Ok(run)
    }

    /// 查询提案
    pub fn get_run(&self, run_id: &str) -> ApiResult<OptimizationRun> {
        if run_id.trim().is_empty() {
            return Err(ApiError::Validation("提案ID不能为空".to_string()));
        }
        Ok(self.run_repo.find_by_id(run_id)?)
    }

    /// 应用提案 (乐观并发重校验;快照过期返回 CONFLICT_ERROR)
    pub async fn apply(&self, run_id: &str, operator: &str) -> ApiResult<ApplyOutcome> {
        if run_id.trim().is_empty() {
            return Err(ApiError::Validation("提案ID不能为空".to_string()));
        }
        Ok(self.fleet.apply(run_id, operator).await?)
    }

    /// 驳回提案
    pub async fn reject(&self, run_id: &str, operator: &str) -> ApiResult<()> {
        if run_id.trim().is_empty() {
            return Err(ApiError::Validation("提案ID不能为空".to_string()));
        }
        Ok(self.fleet.reject(run_id, operator).await?)
    }
}
