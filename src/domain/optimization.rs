// ==========================================
// 预测性维护排程系统 - 舰队优化实体
// ==========================================
// 职责: 优化目标/约束/提案快照结构
// 红线: OptimizationRun 基于不可变快照;快照过期的提案不可应用
// ==========================================

use crate::domain::schedule::MaintenanceSchedule;
use crate::domain::types::{
    BottleneckKind, DateRange, OptimizationRunStatus, RecommendationKind,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// 优化目标权重 (Objective Weights)
// ==========================================
/// 优化目标权重 (0~1,引擎内部按总和归一)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    /// 最小化成本
    #[serde(default = "default_weight")]
    pub minimize_cost: f64,
    /// 最大化设备可用性
    #[serde(default = "default_weight")]
    pub maximize_availability: f64,
    /// 最小化停机
    #[serde(default = "default_weight")]
    pub minimize_downtime: f64,
    /// 均衡技师负载
    #[serde(default = "default_weight")]
    pub balance_workload: f64,
    /// 保证合规
    #[serde(default = "default_weight")]
    pub ensure_compliance: f64,
    /// 优化资源利用
    #[serde(default = "default_weight")]
    pub optimize_resources: f64,
}

fn default_weight() -> f64 {
    0.5
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            minimize_cost: 0.5,
            maximize_availability: 0.5,
            minimize_downtime: 0.5,
            balance_workload: 0.5,
            ensure_compliance: 0.5,
            optimize_resources: 0.5,
        }
    }
}

impl ObjectiveWeights {
    /// 权重总和 (用于归一)
    pub fn total(&self) -> f64 {
        self.minimize_cost
            + self.maximize_availability
            + self.minimize_downtime
            + self.balance_workload
            + self.ensure_compliance
            + self.optimize_resources
    }
}

// ==========================================
// 优化约束 (Optimization Constraints)
// ==========================================
/// 优化约束
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConstraints {
    /// 单日最大排程数
    #[serde(default = "default_max_daily")]
    pub max_daily_schedules: u32,
    /// 可接受的净成本增幅上限
    #[serde(default = "default_max_cost_increase")]
    pub max_net_cost_increase: f64,
    /// 技师单日总工时上限
    #[serde(default = "default_daily_hours")]
    pub max_technician_hours_per_day: f64,
    /// 是否允许外协建议
    #[serde(default = "default_true")]
    pub allow_outsourcing: bool,
}

fn default_max_daily() -> u32 {
    3
}

fn default_max_cost_increase() -> f64 {
    0.0
}

fn default_daily_hours() -> f64 {
    8.0
}

fn default_true() -> bool {
    true
}

impl Default for OptimizationConstraints {
    fn default() -> Self {
        Self {
            max_daily_schedules: default_max_daily(),
            max_net_cost_increase: default_max_cost_increase(),
            max_technician_hours_per_day: default_daily_hours(),
            allow_outsourcing: true,
        }
    }
}

// ==========================================
// 现状分析 (Current State Analysis)
// ==========================================

/// 技师负载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianLoad {
    /// 技师ID
    pub technician_id: String,
    /// 窗口内累计分派工时
    pub assigned_hours: f64,
    /// 涉及排程数
    pub schedule_count: u32,
}

/// 单日负载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLoad {
    /// 日期
    pub date: NaiveDate,
    /// 当日排程数
    pub schedule_count: u32,
    /// 当日预计总工时
    pub total_hours: f64,
}

/// 瓶颈点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bottleneck {
    /// 瓶颈类型
    pub kind: BottleneckKind,
    /// 说明 (必须可解释)
    pub description: String,
    /// 涉及的排程ID
    pub affected_schedule_ids: Vec<String>,
}

/// 窗口现状分析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentStateAnalysis {
    /// 窗口内排程数
    pub schedule_count: u32,
    /// 窗口总成本估算
    pub total_cost: f64,
    /// 窗口总停机成本
    pub total_downtime_cost: f64,
    /// 技师负载分布
    pub technician_loads: Vec<TechnicianLoad>,
    /// 单日负载分布
    pub daily_loads: Vec<DailyLoad>,
    /// 识别出的瓶颈
    pub bottlenecks: Vec<Bottleneck>,
}

// ==========================================
// 优化建议 (Optimization Recommendation)
// ==========================================
/// 优化建议
///
/// 每条建议必须附带预期收益增量与所需审批
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRecommendation {
    /// 建议序号 (按加权得分排名,1 为最优)
    pub rank: u32,
    /// 建议类型
    pub kind: RecommendationKind,
    /// 标题
    pub title: String,
    /// 说明 (可解释原因)
    pub description: String,
    /// 涉及排程ID
    pub affected_schedule_ids: Vec<String>,
    /// 预期成本增量 (负数为节约)
    pub expected_cost_delta: f64,
    /// 预期可用性增量 (百分点)
    pub expected_availability_delta_pct: f64,
    /// 预期停机增量 (小时,负数为减少)
    pub expected_downtime_delta_hours: f64,
    /// 所需审批
    pub required_approvals: Vec<String>,
    /// 加权目标得分 (排序依据)
    pub score: f64,
}

// ==========================================
// 变更摘要与校验 (Change Summary / Validation)
// ==========================================

/// 排程集合变更摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSummary {
    /// 日期被调整的排程数
    pub changed_count: u32,
    /// 新增排程数
    pub added_count: u32,
    /// 移除排程数
    pub removed_count: u32,
    /// 净成本增量
    pub net_cost_delta: f64,
    /// 可用性影响 (百分点)
    pub availability_impact_pct: f64,
}

/// 提案校验结果
///
/// 四项全部通过提案才可发布
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalValidation {
    /// 约束合规
    pub constraint_compliance: bool,
    /// 资源可行
    pub resource_feasibility: bool,
    /// 业务影响可接受
    pub business_impact_acceptable: bool,
    /// 风险水平可接受
    pub risk_level_acceptable: bool,
    /// 未通过项的原因
    pub violations: Vec<String>,
}

impl ProposalValidation {
    /// 是否可发布
    pub fn is_publishable(&self) -> bool {
        self.constraint_compliance
            && self.resource_feasibility
            && self.business_impact_acceptable
            && self.risk_level_acceptable
    }
}

// ==========================================
// 上线计划 (Rollout Plan)
// ==========================================

/// 上线阶段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutPhase {
    /// 阶段序号
    pub phase_no: u32,
    /// 阶段标题
    pub title: String,
    /// 本阶段应用的排程ID
    pub schedule_ids: Vec<String>,
    /// 阶段时长 (天)
    pub duration_days: u32,
}

/// 分阶段上线/回滚/监控计划
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutPlan {
    /// 上线阶段
    pub phases: Vec<RolloutPhase>,
    /// 回滚步骤
    pub rollback_steps: Vec<String>,
    /// 监控项
    pub monitoring_items: Vec<String>,
}

// ==========================================
// OptimizationRun - 优化提案 (追加式审计记录)
// ==========================================
/// 优化提案
///
/// 基于窗口内排程集合的不可变快照计算;
/// snapshot_fingerprint 记录快照指纹,应用时必须重新校验。
/// 提案本身绝不直接改写排程存储。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRun {
    /// 提案ID
    pub run_id: String,
    /// 优化窗口
    pub period: DateRange,
    /// 目标权重
    pub objectives: ObjectiveWeights,
    /// 约束
    pub constraints: OptimizationConstraints,
    /// 快照指纹 (排程ID+修订号的有序散列)
    pub snapshot_fingerprint: String,
    /// 快照中的排程ID与修订号 (回滚依据)
    pub snapshot_revisions: Vec<(String, i32)>,
    /// 现状分析
    pub analysis: CurrentStateAnalysis,
    /// 排名后的优化建议
    pub recommendations: Vec<OptimizationRecommendation>,
    /// 优化后的排程集合 (提案,未落库)
    pub optimized_schedules: Vec<MaintenanceSchedule>,
    /// 变更摘要
    pub change_summary: ChangeSummary,
    /// 校验结果
    pub validation: ProposalValidation,
    /// 上线计划
    pub rollout_plan: RolloutPlan,
    /// 提案状态
    pub status: OptimizationRunStatus,
    /// 创建时间
    pub created_at: NaiveDateTime,
    /// 创建人
    pub created_by: String,
}
