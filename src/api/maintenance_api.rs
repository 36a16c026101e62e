// ==========================================
// 预测性维护排程系统 - 维护排程 API
// ==========================================
// 职责: 失效预测 / 批量建排程 / 排程查询 / 状态流转
// 架构: API 层 → Engine 层 (ScheduleBuilder) → Repository 层
// 红线: 所有入参先校验;批量失败分别上报,绝不整体中止
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::prediction::FailurePrediction;
use crate::domain::schedule::MaintenanceSchedule;
use crate::domain::types::{DateRange, ScheduleStatus};
use crate::engine::builder::{ScheduleBuilder, ScheduleFailure, ScheduleOptions};
use crate::engine::repositories::EngineRepositories;
use crate::repository::contracts::{
    call_with_retry, call_with_timeout, AuditEvent, AuditEventType,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

// ==========================================
// 响应 DTO
// ==========================================

/// 批量摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// 请求数
    pub requested: u32,
    /// 成功数
    pub succeeded: u32,
    /// 失败数
    pub failed: u32,
    /// 失败明细 (按输入顺序)
    pub failures: Vec<ScheduleFailure>,
}

/// 失效预测响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictFailuresResponse {
    /// 预测结果 (按输入顺序,失败的设备不在其中)
    pub predictions: Vec<FailurePrediction>,
    /// 批量摘要
    pub summary: BatchSummary,
}

/// 批量建排程响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSchedulesResponse {
    /// 成功创建的排程 (按输入顺序)
    pub schedules: Vec<MaintenanceSchedule>,
    /// 批量摘要
    pub summary: BatchSummary,
}

/// 排程查询请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetSchedulesRequest {
    /// 设备ID过滤 (None 表示全部)
    #[serde(default)]
    pub equipment_ids: Option<Vec<String>>,
    /// 日期窗口过滤
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// 是否附带实时预测
    #[serde(default)]
    pub include_predictions: bool,
}

/// 排程查询摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleQuerySummary {
    /// 总数
    pub total: u32,
    /// 按状态计数
    pub by_status: BTreeMap<String, u32>,
    /// 总成本估算
    pub total_cost: f64,
}

/// 排程查询响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSchedulesResponse {
    /// 排程列表 (按日期/ID升序)
    pub schedules: Vec<MaintenanceSchedule>,
    /// 实时预测 (include_predictions=true 时)
    pub predictions: Option<Vec<FailurePrediction>>,
    /// 摘要
    pub summary: ScheduleQuerySummary,
}

// ==========================================
// MaintenanceApi - 维护排程 API
// ==========================================
pub struct MaintenanceApi {
    builder: Arc<ScheduleBuilder>,
    repos: EngineRepositories,
    dependency_timeout_ms: u64,
    retry_backoff_ms: u64,
}

impl MaintenanceApi {
    /// 创建新的 MaintenanceApi 实例
    ///
    /// # 参数
    /// - builder: 排程构建编排器
    /// - repos: 仓储集合
    /// - dependency_timeout_ms: 外部依赖超时
    /// - retry_backoff_ms: 瞬态重试退避
    pub fn new(
        builder: Arc<ScheduleBuilder>,
        repos: EngineRepositories,
        dependency_timeout_ms: u64,
        retry_backoff_ms: u64,
    ) -> Self {
        Self {
            builder,
            repos,
            dependency_timeout_ms,
            retry_backoff_ms,
        }
    }

    // ==========================================
    // 失效预测
    // ==========================================

    /// 批量失效预测
    ///
    /// # 参数
    /// - equipment_ids: 设备ID列表 (非空)
    /// - today: 基准日期
    ///
    /// # 返回
    /// 预测列表 + 批量摘要;单台失败不阻断其他设备
    pub async fn predict_failures(
        &self,
        equipment_ids: &[String],
        today: NaiveDate,
    ) -> ApiResult<PredictFailuresResponse> {
        if equipment_ids.is_empty() {
            return Err(ApiError::Validation("设备ID列表不能为空".to_string()));
        }

        let mut predictions = Vec::new();
        let mut failures = Vec::new();

        for equipment_id in equipment_ids {
            if equipment_id.trim().is_empty() {
                failures.push(ScheduleFailure {
                    equipment_id: equipment_id.clone(),
                    kind: "VALIDATION_ERROR".to_string(),
                    message: "设备ID不能为空".to_string(),
                });
                continue;
            }

            let registry = &self.repos.equipment_registry;
            let fetched = call_with_retry("equipment-registry", self.retry_backoff_ms, || {
                call_with_timeout(
                    "equipment-registry",
                    self.dependency_timeout_ms,
                    registry.get_equipment(equipment_id),
                )
            })
            .await;

            match fetched {
                Ok(equipment) => match self.builder.predictor().predict(&equipment, today) {
                    Ok(prediction) => predictions.push(prediction),
                    Err(err) => {
                        let api_err: ApiError = err.into();
                        failures.push(ScheduleFailure {
                            equipment_id: equipment_id.clone(),
                            kind: api_err.kind().to_string(),
                            message: api_err.to_string(),
                        });
                    }
                },
                Err(err) => {
                    let api_err: ApiError = err.into();
                    failures.push(ScheduleFailure {
                        equipment_id: equipment_id.clone(),
                        kind: api_err.kind().to_string(),
                        message: api_err.to_string(),
                    });
                }
            }
        }

        let summary = BatchSummary {
            requested: equipment_ids.len() as u32,
            succeeded: predictions.len() as u32,
            failed: failures.len() as u32,
            failures,
        };

        Ok(PredictFailuresResponse {
            predictions,
            summary,
        })
    }

    // ==========================================
    // 批量建排程
    // ==========================================

    /// 批量创建维护排程 (以当天为基准日期)
    pub async fn create_schedules(
        &self,
        equipment_ids: &[String],
        options: &ScheduleOptions,
    ) -> ApiResult<CreateSchedulesResponse> {
        self.create_schedules_at(equipment_ids, options, chrono::Local::now().date_naive())
            .await
    }

    /// 批量创建维护排程 (显式基准日期,保证可复现)
    ///
    /// # 参数
    /// - equipment_ids: 设备ID列表 (非空)
    /// - options: 排程选项
    /// - today: 基准日期
    pub async fn create_schedules_at(
        &self,
        equipment_ids: &[String],
        options: &ScheduleOptions,
        today: NaiveDate,
    ) -> ApiResult<CreateSchedulesResponse> {
        if equipment_ids.is_empty() {
            return Err(ApiError::Validation("设备ID列表不能为空".to_string()));
        }

        let outcome = self.builder.build_batch(equipment_ids, options, today).await;

        let summary = BatchSummary {
            requested: equipment_ids.len() as u32,
            succeeded: outcome.schedules.len() as u32,
            failed: outcome.failures.len() as u32,
            failures: outcome.failures,
        };

        info!(
            requested = summary.requested,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "批量建排程请求完成"
        );

        Ok(CreateSchedulesResponse {
            schedules: outcome.schedules,
            summary,
        })
    }

    // ==========================================
    // 排程查询
    // ==========================================

    /// 查询排程 (可选附带实时预测)
    pub async fn get_schedules(
        &self,
        request: &GetSchedulesRequest,
        today: NaiveDate,
    ) -> ApiResult<GetSchedulesResponse> {
        if let Some(ids) = &request.equipment_ids {
            if ids.is_empty() {
                return Err(ApiError::Validation(
                    "设备ID过滤列表不能为空 (不过滤请传 None)".to_string(),
                ));
            }
        }

        let schedules = self
            .repos
            .schedule_repo
            .list(request.equipment_ids.as_deref(), request.date_range)?;

        let mut by_status: BTreeMap<String, u32> = BTreeMap::new();
        let mut total_cost = 0.0;
        for s in &schedules {
            *by_status.entry(s.status.to_string()).or_insert(0) += 1;
            total_cost += s.cost_analysis.total_cost_estimate;
        }

        // 实时预测: 对结果中的设备去重后重算
        let predictions = if request.include_predictions {
            let mut distinct: Vec<String> = schedules
                .iter()
                .map(|s| s.equipment_id.clone())
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .collect();
            distinct.sort();

            if distinct.is_empty() {
                Some(vec![])
            } else {
                let response = self.predict_failures(&distinct, today).await?;
                Some(response.predictions)
            }
        } else {
            None
        };

        Ok(GetSchedulesResponse {
            summary: ScheduleQuerySummary {
                total: schedules.len() as u32,
                by_status,
                total_cost,
            },
            schedules,
            predictions,
        })
    }

    // ==========================================
    // 状态流转
    // ==========================================

    /// 排程状态流转 (乐观锁)
    ///
    /// # 参数
    /// - schedule_id: 排程ID
    /// - target: 目标状态
    /// - expected_revision: 期望修订号
    /// - operator: 操作人
    pub async fn update_schedule_status(
        &self,
        schedule_id: &str,
        target: ScheduleStatus,
        expected_revision: i32,
        operator: &str,
    ) -> ApiResult<MaintenanceSchedule> {
        if schedule_id.trim().is_empty() {
            return Err(ApiError::Validation("排程ID不能为空".to_string()));
        }

        let updated =
            self.repos
                .schedule_repo
                .update_status(schedule_id, target, expected_revision)?;

        self.repos
            .audit_sink
            .append(AuditEvent::new(
                AuditEventType::ScheduleStatusChanged,
                schedule_id,
                operator,
                Some(format!(r#"{{"target":"{}"}}"#, target)),
            ))
            .await?;

        Ok(updated)
    }
}
