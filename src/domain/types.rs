// ==========================================
// 预测性维护排程系统 - 领域类型定义
// ==========================================
// 红线: 优先级是失效概率的纯函数,不允许独立设置
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 优先级 (Priority Level)
// ==========================================
// 红线: 由失效概率唯一决定 (>0.8 critical, >0.6 high, >0.3 medium)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    Low,      // 正常
    Medium,   // 关注
    High,     // 紧急
    Critical, // 红线
}

impl PriorityLevel {
    /// 从失效概率推导优先级 (唯一入口)
    ///
    /// # 参数
    /// - probability: 失效概率 [0,1]
    ///
    /// # 返回
    /// 优先级 (>0.8 Critical, >0.6 High, >0.3 Medium, 其余 Low)
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.8 {
            PriorityLevel::Critical
        } else if probability > 0.6 {
            PriorityLevel::High
        } else if probability > 0.3 {
            PriorityLevel::Medium
        } else {
            PriorityLevel::Low
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PriorityLevel::Low => "LOW",
            PriorityLevel::Medium => "MEDIUM",
            PriorityLevel::High => "HIGH",
            PriorityLevel::Critical => "CRITICAL",
        }
    }

    /// 从字符串解析优先级
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CRITICAL" => PriorityLevel::Critical,
            "HIGH" => PriorityLevel::High,
            "MEDIUM" => PriorityLevel::Medium,
            _ => PriorityLevel::Low,
        }
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 劣化趋势 (Degradation Trend)
// ==========================================
// 注: Critical 档位预留给模型化预测器,启发式公式不会产出
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegradationTrend {
    Stable,       // 平稳
    SlowDecline,  // 缓慢劣化
    RapidDecline, // 快速劣化
    Critical,     // 临界 (模型化预测器专用)
}

impl fmt::Display for DegradationTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradationTrend::Stable => write!(f, "STABLE"),
            DegradationTrend::SlowDecline => write!(f, "SLOW_DECLINE"),
            DegradationTrend::RapidDecline => write!(f, "RAPID_DECLINE"),
            DegradationTrend::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// 维护策略 (Maintenance Strategy)
// ==========================================
// 用途: 定时策略入口,保证同一策略参数下结果可复现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStrategy {
    ConditionBased,
    TimeBased,
    Hybrid,
}

impl MaintenanceStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStrategy::ConditionBased => "condition_based",
            MaintenanceStrategy::TimeBased => "time_based",
            MaintenanceStrategy::Hybrid => "hybrid",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            MaintenanceStrategy::ConditionBased => "状态驱动",
            MaintenanceStrategy::TimeBased => "定期保养",
            MaintenanceStrategy::Hybrid => "混合策略",
        }
    }
}

impl Default for MaintenanceStrategy {
    fn default() -> Self {
        MaintenanceStrategy::Hybrid
    }
}

impl std::str::FromStr for MaintenanceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "condition_based" | "condition-based" => Ok(MaintenanceStrategy::ConditionBased),
            "time_based" | "time-based" => Ok(MaintenanceStrategy::TimeBased),
            "hybrid" => Ok(MaintenanceStrategy::Hybrid),
            other => Err(format!("未知维护策略: {}", other)),
        }
    }
}

// ==========================================
// 排程状态 (Schedule Status)
// ==========================================
// 生命周期: SCHEDULED → IN_PROGRESS → {COMPLETED, CANCELLED}
//           SCHEDULED → {CANCELLED, RESCHEDULED}
//           RESCHEDULED → {SCHEDULED, CANCELLED}
// COMPLETED / CANCELLED 为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Scheduled,   // 已排程
    InProgress,  // 执行中
    Completed,   // 已完成
    Cancelled,   // 已取消
    Rescheduled, // 已改期
}

impl ScheduleStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScheduleStatus::Completed | ScheduleStatus::Cancelled)
    }

    /// 状态转换是否合法
    pub fn can_transition_to(&self, target: ScheduleStatus) -> bool {
        use ScheduleStatus::*;
        matches!(
            (self, target),
            (Scheduled, InProgress)
                | (Scheduled, Cancelled)
                | (Scheduled, Rescheduled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (Rescheduled, Scheduled)
                | (Rescheduled, Cancelled)
        )
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "SCHEDULED",
            ScheduleStatus::InProgress => "IN_PROGRESS",
            ScheduleStatus::Completed => "COMPLETED",
            ScheduleStatus::Cancelled => "CANCELLED",
            ScheduleStatus::Rescheduled => "RESCHEDULED",
        }
    }

    /// 从字符串解析状态
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SCHEDULED" => Some(ScheduleStatus::Scheduled),
            "IN_PROGRESS" => Some(ScheduleStatus::InProgress),
            "COMPLETED" => Some(ScheduleStatus::Completed),
            "CANCELLED" => Some(ScheduleStatus::Cancelled),
            "RESCHEDULED" => Some(ScheduleStatus::Rescheduled),
            _ => None,
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// SOP 依赖临界度 (SOP Criticality)
// ==========================================
// 顺序: Minimal < Moderate < Critical (用于影响分单调性)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SopCriticality {
    Minimal,  // 可忽略
    Moderate, // 中度依赖
    Critical, // 关键依赖
}

impl SopCriticality {
    /// 影响分权重 (critical=10, moderate=5, minimal=1)
    pub fn impact_weight(&self) -> f64 {
        match self {
            SopCriticality::Critical => 10.0,
            SopCriticality::Moderate => 5.0,
            SopCriticality::Minimal => 1.0,
        }
    }

    /// 停机影响系数 (critical=1.0, moderate=0.5, minimal=0)
    pub fn downtime_factor(&self) -> f64 {
        match self {
            SopCriticality::Critical => 1.0,
            SopCriticality::Moderate => 0.5,
            SopCriticality::Minimal => 0.0,
        }
    }
}

impl fmt::Display for SopCriticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SopCriticality::Minimal => write!(f, "MINIMAL"),
            SopCriticality::Moderate => write!(f, "MODERATE"),
            SopCriticality::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// 维护类型 (Maintenance Kind)
// ==========================================
// 用途: 历史维护记录分类,驱动分析引擎的计划/应急比
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceKind {
    Preventive, // 预防性
    Predictive, // 预测性
    Corrective, // 纠正性
    Emergency,  // 应急抢修
}

impl MaintenanceKind {
    /// 是否属于计划内维护
    pub fn is_planned(&self) -> bool {
        matches!(self, MaintenanceKind::Preventive | MaintenanceKind::Predictive)
    }
}

impl fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceKind::Preventive => write!(f, "PREVENTIVE"),
            MaintenanceKind::Predictive => write!(f, "PREDICTIVE"),
            MaintenanceKind::Corrective => write!(f, "CORRECTIVE"),
            MaintenanceKind::Emergency => write!(f, "EMERGENCY"),
        }
    }
}

// ==========================================
// 安全要求 (Safety Requirement)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyRequirement {
    Ppe,                 // 个人防护装备
    LockoutTagout,       // 上锁挂牌
    HotWorkPermit,       // 动火作业许可
    ConfinedSpacePermit, // 受限空间许可
    ElectricalIsolation, // 电气隔离
}

impl fmt::Display for SafetyRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyRequirement::Ppe => write!(f, "PPE"),
            SafetyRequirement::LockoutTagout => write!(f, "LOCKOUT_TAGOUT"),
            SafetyRequirement::HotWorkPermit => write!(f, "HOT_WORK_PERMIT"),
            SafetyRequirement::ConfinedSpacePermit => write!(f, "CONFINED_SPACE_PERMIT"),
            SafetyRequirement::ElectricalIsolation => write!(f, "ELECTRICAL_ISOLATION"),
        }
    }
}

// ==========================================
// 自动化触发类型 (Automation Trigger Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    ProbabilityThreshold, // 失效概率阈值
    RulThreshold,         // 剩余寿命阈值
    Calendar,             // 日历周期
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::ProbabilityThreshold => write!(f, "PROBABILITY_THRESHOLD"),
            TriggerKind::RulThreshold => write!(f, "RUL_THRESHOLD"),
            TriggerKind::Calendar => write!(f, "CALENDAR"),
        }
    }
}

// ==========================================
// 优化提案状态 (Optimization Run Status)
// ==========================================
// 红线: OptimizationRun 为追加式审计记录,仅状态列可变
//       且只允许 PROPOSED → {APPLIED, REJECTED, STALE}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationRunStatus {
    Proposed, // 提案待审
    Applied,  // 已应用
    Rejected, // 已驳回
    Stale,    // 快照过期
}

impl OptimizationRunStatus {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OptimizationRunStatus::Proposed => "PROPOSED",
            OptimizationRunStatus::Applied => "APPLIED",
            OptimizationRunStatus::Rejected => "REJECTED",
            OptimizationRunStatus::Stale => "STALE",
        }
    }

    /// 从字符串解析状态
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PROPOSED" => Some(OptimizationRunStatus::Proposed),
            "APPLIED" => Some(OptimizationRunStatus::Applied),
            "REJECTED" => Some(OptimizationRunStatus::Rejected),
            "STALE" => Some(OptimizationRunStatus::Stale),
            _ => None,
        }
    }
}

impl fmt::Display for OptimizationRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 优化建议类型 (Recommendation Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationKind {
    ScheduleAdjustment,     // 排程日期调整
    ResourceReallocation,   // 资源重分配
    TaskConsolidation,      // 任务合并
    PreventiveToPredictive, // 预防性转预测性
    Batching,               // 同类批处理
    Outsourcing,            // 外协
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationKind::ScheduleAdjustment => write!(f, "SCHEDULE_ADJUSTMENT"),
            RecommendationKind::ResourceReallocation => write!(f, "RESOURCE_REALLOCATION"),
            RecommendationKind::TaskConsolidation => write!(f, "TASK_CONSOLIDATION"),
            RecommendationKind::PreventiveToPredictive => write!(f, "PREVENTIVE_TO_PREDICTIVE"),
            RecommendationKind::Batching => write!(f, "BATCHING"),
            RecommendationKind::Outsourcing => write!(f, "OUTSOURCING"),
        }
    }
}

// ==========================================
// 瓶颈类型 (Bottleneck Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BottleneckKind {
    TechnicianAvailability, // 技师可用性不足
    PartsAvailability,      // 备件供应压力
    TimeConflict,           // 时间/设备冲突
}

impl fmt::Display for BottleneckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BottleneckKind::TechnicianAvailability => write!(f, "TECHNICIAN_AVAILABILITY"),
            BottleneckKind::PartsAvailability => write!(f, "PARTS_AVAILABILITY"),
            BottleneckKind::TimeConflict => write!(f, "TIME_CONFLICT"),
        }
    }
}

// ==========================================
// 日期区间 (Date Range)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: chrono::NaiveDate,
    pub to: chrono::NaiveDate,
}

impl DateRange {
    /// 构造日期区间 (from > to 视为非法)
    pub fn new(from: chrono::NaiveDate, to: chrono::NaiveDate) -> Result<Self, String> {
        if from > to {
            return Err(format!("非法日期区间: from={} > to={}", from, to));
        }
        Ok(Self { from, to })
    }

    /// 日期是否落在区间内 (闭区间)
    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}
