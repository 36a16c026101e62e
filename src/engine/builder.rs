// ==========================================
// 预测性维护排程系统 - 排程构建编排器
// ==========================================
// 用途: 协调预测/定时/任务/分派/影响/成本六大引擎,
//       为单台设备产出一条 MaintenanceSchedule
// ==========================================
// 红线:
// - 单台设备失败只中止该工作单元;批量继续执行并分别上报
// - 批量为有界并行 (worker pool),按设备ID留结果槽位
// - 外部依赖调用带请求级超时,瞬态失败重试一次
// ==========================================

use crate::config::catalog::TaskCatalog;
use crate::config::params::EngineConfig;
use crate::domain::equipment::Equipment;
use crate::domain::schedule::{AutomationTrigger, MaintenanceSchedule, SchedulingConstraints};
use crate::domain::sop::SopProcedure;
use crate::domain::task::Technician;
use crate::domain::types::{MaintenanceStrategy, PriorityLevel, ScheduleStatus, TriggerKind};
use crate::engine::assignment::AssignmentResolver;
use crate::engine::cost::CostEstimator;
use crate::engine::error::EngineError;
use crate::engine::predictor::{FailurePredictor, HeuristicPredictor};
use crate::engine::repositories::EngineRepositories;
use crate::engine::sop_impact::SopImpactAnalyzer;
use crate::engine::task_catalog::TaskCatalogEngine;
use crate::engine::timing::TimingOptimizer;
use crate::repository::contracts::{
    call_with_retry, call_with_timeout, AuditEvent, AuditEventType,
};
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

// ==========================================
// BuildError - 构建错误
// ==========================================
/// 排程构建错误
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl BuildError {
    /// 稳定的机器可读错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            BuildError::Repository(err) => match err {
                RepositoryError::NotFound { .. } => "NOT_FOUND",
                RepositoryError::ValidationError(_) => "VALIDATION_ERROR",
                RepositoryError::DependencyUnavailable { .. }
                | RepositoryError::DependencyTimeout { .. } => "DEPENDENCY_ERROR",
                RepositoryError::OptimisticLockFailure { .. }
                | RepositoryError::VersionConflict { .. } => "CONFLICT_ERROR",
                _ => "INTERNAL_ERROR",
            },
            BuildError::Engine(err) => match err {
                EngineError::Computation { .. } => "COMPUTATION_ERROR",
                EngineError::InvalidInput(_) => "VALIDATION_ERROR",
            },
        }
    }
}

// ==========================================
// ScheduleOptions - 排程选项
// ==========================================
/// 排程选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOptions {
    /// 维护策略 (缺省混合策略)
    #[serde(default)]
    pub strategy: MaintenanceStrategy,
    /// 规划视界 (天, 0 表示不限)
    #[serde(default)]
    pub horizon_days: i64,
    /// 排程约束
    #[serde(default)]
    pub constraints: SchedulingConstraints,
    /// 操作人 (审计用)
    #[serde(default = "default_operator")]
    pub operator: String,
}

fn default_operator() -> String {
    "system".to_string()
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            strategy: MaintenanceStrategy::default(),
            horizon_days: 0,
            constraints: SchedulingConstraints::default(),
            operator: default_operator(),
        }
    }
}

// ==========================================
// 批量结果 (per-id 槽位)
// ==========================================

/// 单台设备的失败条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleFailure {
    /// 设备ID
    pub equipment_id: String,
    /// 稳定错误类别
    pub kind: String,
    /// 可读错误消息
    pub message: String,
}

/// 批量排程结果
///
/// 成功与失败分开上报,批量绝不整体中止
#[derive(Debug, Clone)]
pub struct BatchScheduleOutcome {
    /// 成功的排程 (按输入顺序)
    pub schedules: Vec<MaintenanceSchedule>,
    /// 失败条目 (按输入顺序)
    pub failures: Vec<ScheduleFailure>,
}

// ==========================================
// ScheduleBuilder - 排程构建编排器
// ==========================================
pub struct ScheduleBuilder {
    repos: EngineRepositories,
    predictor: Arc<dyn FailurePredictor>,
    timing: TimingOptimizer,
    task_engine: TaskCatalogEngine,
    resolver: AssignmentResolver,
    sop_analyzer: SopImpactAnalyzer,
    cost_estimator: CostEstimator,
    config: EngineConfig,
}

impl ScheduleBuilder {
    /// 创建编排器 (使用启发式预测器)
    ///
    /// # 参数
    /// - repos: 仓储集合
    /// - config: 引擎配置
    /// - catalog: 任务目录
    pub fn new(repos: EngineRepositories, config: EngineConfig, catalog: TaskCatalog) -> Self {
        let predictor = Arc::new(HeuristicPredictor::new(config.predictor.clone()));
        Self::with_predictor(repos, config, catalog, predictor)
    }

    /// 创建编排器并替换预测器实现 (模型化预测器接入口)
    pub fn with_predictor(
        repos: EngineRepositories,
        config: EngineConfig,
        catalog: TaskCatalog,
        predictor: Arc<dyn FailurePredictor>,
    ) -> Self {
        Self {
            predictor,
            timing: TimingOptimizer::new(config.timing.clone()),
            task_engine: TaskCatalogEngine::new(catalog, config.catalog.clone()),
            resolver: AssignmentResolver::new(),
            sop_analyzer: SopImpactAnalyzer::new(config.sop.clone()),
            cost_estimator: CostEstimator::new(config.cost.clone()),
            repos,
            config,
        }
    }

    /// 预测器只读访问 (predict_failures 入口复用)
    pub fn predictor(&self) -> &Arc<dyn FailurePredictor> {
        &self.predictor
    }

    // ==========================================
    // 外部依赖读取 (超时 + 一次重试)
    // ==========================================

    async fn fetch_equipment(&self, equipment_id: &str) -> Result<Equipment, BuildError> {
        let timeout = self.config.batch.dependency_timeout_ms;
        let backoff = self.config.batch.retry_backoff_ms;
        let registry = &self.repos.equipment_registry;
        Ok(call_with_retry("equipment-registry", backoff, || {
            call_with_timeout("equipment-registry", timeout, registry.get_equipment(equipment_id))
        })
        .await?)
    }

    async fn fetch_technicians(&self) -> Result<Vec<Technician>, BuildError> {
        let timeout = self.config.batch.dependency_timeout_ms;
        let backoff = self.config.batch.retry_backoff_ms;
        let directory = &self.repos.technician_directory;
        Ok(call_with_retry("technician-directory", backoff, || {
            call_with_timeout(
                "technician-directory",
                timeout,
                directory.list_active_technicians(),
            )
        })
        .await?)
    }

    async fn fetch_procedures(&self, equipment_id: &str) -> Result<Vec<SopProcedure>, BuildError> {
        let timeout = self.config.batch.dependency_timeout_ms;
        let backoff = self.config.batch.retry_backoff_ms;
        let registry = &self.repos.sop_registry;
        Ok(call_with_retry("sop-registry", backoff, || {
            call_with_timeout(
                "sop-registry",
                timeout,
                registry.find_procedures_for_equipment(equipment_id),
            )
        })
        .await?)
    }

    // ==========================================
    // 单台设备构建
    // ==========================================

    /// 为单台设备构建并持久化一条维护排程
    ///
    /// # 参数
    /// - equipment_id: 设备ID
    /// - options: 排程选项
    /// - today: 基准日期
    ///
    /// # 返回
    /// - Ok(MaintenanceSchedule): 已持久化 (status=SCHEDULED)
    /// - Err(BuildError): 该工作单元的失败 (不影响批量其他设备)
    pub async fn build_one(
        &self,
        equipment_id: &str,
        options: &ScheduleOptions,
        today: NaiveDate,
    ) -> Result<MaintenanceSchedule, BuildError> {
        if equipment_id.trim().is_empty() {
            return Err(RepositoryError::ValidationError("设备ID不能为空".to_string()).into());
        }

        info!(equipment_id = equipment_id, strategy = options.strategy.as_str(), "开始构建维护排程");

        // 步骤1: 读取设备台账
        debug!("步骤1: 读取设备台账");
        let equipment = self.fetch_equipment(equipment_id).await?;

        // 步骤2: 失效预测
        debug!("步骤2: 失效预测");
        let prediction = self
            .predictor
            .predict(&equipment, today)
            .map_err(|e| self.log_computation_failure(equipment_id, e))?;

        // 步骤3: 定时决策
        debug!("步骤3: 定时决策");
        let timing = self.timing.plan(
            &equipment,
            &prediction,
            options.strategy,
            options.horizon_days,
            today,
        );

        // 步骤4: 任务目录生成
        debug!("步骤4: 任务目录生成");
        let tasks = self
            .task_engine
            .generate(&equipment.category, &prediction)
            .map_err(|e| self.log_computation_failure(equipment_id, e))?;

        // 步骤5: 技师分派
        debug!("步骤5: 技师分派");
        let technicians = self.fetch_technicians().await?;
        let assignments = self.resolver.resolve(&tasks, &technicians);

        // 步骤6: SOP 影响评估
        debug!("步骤6: SOP 影响评估");
        let procedures = self.fetch_procedures(equipment_id).await?;
        let sop_impact = self.sop_analyzer.analyze(
            equipment_id,
            &procedures,
            timing.scheduled_date,
            timing.estimated_duration_hours,
        );

        // 步骤7: 成本核算
        debug!("步骤7: 成本核算");
        let cost_analysis = self
            .cost_estimator
            .estimate(&tasks, &assignments, &technicians, &sop_impact)
            .map_err(|e| self.log_computation_failure(equipment_id, e))?;

        // 步骤8: 组装并持久化
        debug!("步骤8: 组装并持久化");
        let now = chrono::Utc::now().naive_utc();
        let automation_trigger = Self::trigger_for(
            prediction.probability_of_failure,
            prediction.remaining_useful_life_days,
            self.config.timing.cadence_days,
        );
        let schedule = MaintenanceSchedule {
            schedule_id: Uuid::new_v4().to_string(),
            equipment_id: equipment.equipment_id.clone(),
            equipment_name: equipment.name.clone(),
            equipment_category: equipment.category.clone(),
            status: ScheduleStatus::Scheduled,
            // 红线: 优先级只能由失效概率推导
            priority_level: PriorityLevel::from_probability(prediction.probability_of_failure),
            strategy: options.strategy,
            scheduled_date: timing.scheduled_date,
            estimated_duration_hours: timing.estimated_duration_hours,
            timing_reason: timing.reason.clone(),
            prediction,
            tasks,
            assignments,
            sop_impact,
            cost_analysis,
            constraints: options.constraints.clone(),
            automation_trigger,
            created_at: now,
            updated_at: now,
            revision: 0,
        };

        self.repos.schedule_repo.insert(&schedule)?;

        self.repos
            .audit_sink
            .append(AuditEvent::new(
                AuditEventType::ScheduleCreated,
                &schedule.schedule_id,
                &options.operator,
                Some(format!(
                    r#"{{"equipment_id":"{}","scheduled_date":"{}","priority":"{}"}}"#,
                    schedule.equipment_id, schedule.scheduled_date, schedule.priority_level
                )),
            ))
            .await?;

        info!(
            equipment_id = equipment_id,
            schedule_id = %schedule.schedule_id,
            scheduled_date = %schedule.scheduled_date,
            priority = %schedule.priority_level,
            total_cost = schedule.cost_analysis.total_cost_estimate,
            "维护排程构建完成"
        );

        Ok(schedule)
    }

    /// 自动化触发器推导
    fn trigger_for(probability: f64, rul_days: i64, cadence_days: i64) -> AutomationTrigger {
        if probability > 0.6 {
            AutomationTrigger {
                trigger_kind: TriggerKind::ProbabilityThreshold,
                threshold: 0.6,
                armed: false,
            }
        } else if rul_days < 90 {
            AutomationTrigger {
                trigger_kind: TriggerKind::RulThreshold,
                threshold: 90.0,
                armed: false,
            }
        } else {
            AutomationTrigger {
                trigger_kind: TriggerKind::Calendar,
                threshold: cadence_days as f64,
                armed: true,
            }
        }
    }

    /// 计算错误带完整输入上下文落日志后上抛
    fn log_computation_failure(&self, equipment_id: &str, err: EngineError) -> BuildError {
        error!(
            equipment_id = equipment_id,
            error = %err,
            "引擎计算失败,该工作单元中止"
        );
        err.into()
    }

    // ==========================================
    // 批量构建 (有界并行)
    // ==========================================

    /// 批量构建维护排程
    ///
    /// # 参数
    /// - equipment_ids: 设备ID列表
    /// - options: 排程选项 (整批共用)
    /// - today: 基准日期
    ///
    /// # 返回
    /// BatchScheduleOutcome: 单台失败不阻断其他设备,
    /// 成功/失败按输入顺序分别上报
    pub async fn build_batch(
        &self,
        equipment_ids: &[String],
        options: &ScheduleOptions,
        today: NaiveDate,
    ) -> BatchScheduleOutcome {
        let max_parallel = self.config.batch.max_parallel.max(1);

        info!(
            requested = equipment_ids.len(),
            max_parallel = max_parallel,
            "开始批量排程"
        );

        // 每台设备一个结果槽位 (按输入下标),有界并行填充
        let mut slots: Vec<(usize, Result<MaintenanceSchedule, ScheduleFailure>)> =
            stream::iter(equipment_ids.iter().enumerate())
                .map(|(idx, equipment_id)| async move {
                    let result = self
                        .build_one(equipment_id, options, today)
                        .await
                        .map_err(|err| ScheduleFailure {
                            equipment_id: equipment_id.clone(),
                            kind: err.kind().to_string(),
                            message: err.to_string(),
                        });
                    (idx, result)
                })
                .buffer_unordered(max_parallel)
                .collect()
                .await;

        slots.sort_by_key(|(idx, _)| *idx);

        let mut schedules = Vec::new();
        let mut failures = Vec::new();
        for (_, result) in slots {
            match result {
                Ok(schedule) => schedules.push(schedule),
                Err(failure) => failures.push(failure),
            }
        }

        info!(
            succeeded = schedules.len(),
            failed = failures.len(),
            "批量排程完成"
        );

        BatchScheduleOutcome { schedules, failures }
    }
}
