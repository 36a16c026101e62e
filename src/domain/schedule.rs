// ==========================================
// 预测性维护排程系统 - 维护排程聚合
// ==========================================
// 职责: 单台设备的维护排程聚合根 (预测/任务/分派/影响/成本)
// 红线: total_cost_estimate 必须精确等于四项成本之和
// 红线: priority_level 由失效概率唯一决定,不允许独立设置
// ==========================================

use crate::domain::prediction::FailurePrediction;
use crate::domain::sop::SopImpact;
use crate::domain::task::{MaintenanceTask, TechnicianAssignment};
use crate::domain::types::{
    MaintenanceStrategy, PriorityLevel, ScheduleStatus, TriggerKind,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// CostAnalysis - 成本分析
// ==========================================
/// 成本分析
///
/// 不变量: total_cost_estimate == parts + labor + operational + downtime (精确)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAnalysis {
    /// 备件成本
    pub parts_cost: f64,
    /// 人工成本
    pub labor_cost: f64,
    /// 运营附加成本 ((备件+人工) × 管理费率)
    pub operational_cost: f64,
    /// 停机成本 (取 SOP 收入影响估算)
    pub downtime_cost: f64,
    /// 总成本估算
    pub total_cost_estimate: f64,
    /// 相对被动维修的节约 (total × 被动倍率 − total)
    pub cost_savings_vs_reactive: f64,
}

impl CostAnalysis {
    /// 校验四项成本与总额的精确对账
    pub fn reconciles(&self) -> bool {
        self.total_cost_estimate
            == self.parts_cost + self.labor_cost + self.operational_cost + self.downtime_cost
    }
}

// ==========================================
// SchedulingConstraints - 排程约束
// ==========================================
/// 排程约束
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulingConstraints {
    /// 最早开工日期
    #[serde(default)]
    pub earliest_date: Option<NaiveDate>,
    /// 最晚完工日期
    #[serde(default)]
    pub latest_date: Option<NaiveDate>,
    /// 单日最大并行维护数
    #[serde(default)]
    pub max_parallel_per_day: Option<u32>,
    /// 可投入技师上限
    #[serde(default)]
    pub max_technicians: Option<u32>,
}

// ==========================================
// AutomationTrigger - 自动化触发器
// ==========================================
/// 自动化触发器
///
/// 记录本排程由何种条件触发生成,用于审计与自动化回溯
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationTrigger {
    /// 触发类型
    pub trigger_kind: TriggerKind,
    /// 触发阈值 (概率阈值 / RUL 天数 / 周期天数)
    pub threshold: f64,
    /// 是否继续武装 (false 表示一次性触发)
    pub armed: bool,
}

// ==========================================
// MaintenanceSchedule - 维护排程聚合根
// ==========================================
/// 维护排程
///
/// 一条排程严格对应一台设备,持有 0..N 个维护任务。
/// revision 为乐观锁修订号,任何更新必须携带期望修订号。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    /// 排程ID
    pub schedule_id: String,
    /// 设备ID
    pub equipment_id: String,
    /// 设备名称 (冗余,便于展示)
    pub equipment_name: String,
    /// 设备类别
    pub equipment_category: String,
    /// 排程状态
    pub status: ScheduleStatus,
    /// 优先级 (由失效概率推导)
    pub priority_level: PriorityLevel,
    /// 使用的维护策略
    pub strategy: MaintenanceStrategy,
    /// 计划日期
    pub scheduled_date: NaiveDate,
    /// 预计时长 (小时)
    pub estimated_duration_hours: f64,
    /// 定时决策原因
    pub timing_reason: String,
    /// 失效预测快照
    pub prediction: FailurePrediction,
    /// 维护任务列表
    pub tasks: Vec<MaintenanceTask>,
    /// 技师分派
    pub assignments: Vec<TechnicianAssignment>,
    /// SOP 影响评估
    pub sop_impact: SopImpact,
    /// 成本分析
    pub cost_analysis: CostAnalysis,
    /// 排程约束
    pub constraints: SchedulingConstraints,
    /// 自动化触发器
    pub automation_trigger: AutomationTrigger,
    /// 创建时间
    pub created_at: NaiveDateTime,
    /// 更新时间
    pub updated_at: NaiveDateTime,
    /// 乐观锁修订号
    pub revision: i32,
}

impl MaintenanceSchedule {
    /// 任务ID是否在排程内唯一
    pub fn task_ids_unique(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.tasks.iter().all(|t| seen.insert(t.task_id.as_str()))
    }

    /// 排程的语义指纹 (用于确定性对比,不含ID与时间戳)
    ///
    /// 同一输入快照两次构建的排程,语义指纹必须一致
    pub fn semantic_key(&self) -> String {
        let task_part: Vec<String> = self
            .tasks
            .iter()
            .map(|t| format!("{}:{}:{}", t.task_id, t.name, t.estimated_minutes))
            .collect();
        let assign_part: Vec<String> = self
            .assignments
            .iter()
            .map(|a| format!("{}:{:.1}", a.technician_id, a.estimated_hours))
            .collect();
        format!(
            "{}|{}|{}|{}|{:.6}|{}|{:.2}|{:.2}|[{}]|[{}]",
            self.equipment_id,
            self.status,
            self.priority_level,
            self.scheduled_date,
            self.prediction.probability_of_failure,
            self.prediction.remaining_useful_life_days,
            self.estimated_duration_hours,
            self.cost_analysis.total_cost_estimate,
            task_part.join(","),
            assign_part.join(","),
        )
    }
}
