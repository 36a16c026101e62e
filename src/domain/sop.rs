// ==========================================
// 预测性维护排程系统 - SOP 依赖实体
// ==========================================
// 职责: 标准作业程序 (SOP) 依赖、影响评估与改期建议结构
// 红线: operational_impact_score 对停机时长和依赖临界度均单调不减
// ==========================================

use crate::domain::types::SopCriticality;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// SopProcedure / SopDependency - SOP 主数据 (外部登记表提供)
// ==========================================

/// SOP 对设备的依赖声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopDependency {
    /// 被依赖的设备ID
    pub equipment_id: String,
    /// 依赖临界度
    pub criticality: SopCriticality,
}

/// 标准作业程序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopProcedure {
    /// 程序ID
    pub procedure_id: String,
    /// 程序标题
    pub title: String,
    /// 是否生效
    pub active: bool,
    /// 设备依赖列表
    pub dependencies: Vec<SopDependency>,
}

impl SopProcedure {
    /// 查询对指定设备的依赖临界度
    pub fn criticality_for(&self, equipment_id: &str) -> Option<SopCriticality> {
        self.dependencies
            .iter()
            .find(|d| d.equipment_id == equipment_id)
            .map(|d| d.criticality)
    }
}

// ==========================================
// 改期建议 (Reschedule Recommendation)
// ==========================================

/// 改期动作
///
/// 当前仅有 USE_ALTERNATIVE (改用备选时段); 枚举保留扩展位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RescheduleAction {
    UseAlternative, // 改用备选时段
}

impl fmt::Display for RescheduleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RescheduleAction::UseAlternative => write!(f, "USE_ALTERNATIVE"),
        }
    }
}

/// 改期建议 (仅对 CRITICAL 依赖生成)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRecommendation {
    /// 受影响程序ID
    pub procedure_id: String,
    /// 建议动作
    pub action: RescheduleAction,
    /// 备选时段 (维护窗口后 24h / 48h 两档)
    pub alternative_dates: Vec<NaiveDate>,
    /// 建议原因
    pub reason: String,
}

// ==========================================
// SopImpact - 影响评估结果
// ==========================================

/// 受影响程序明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectedProcedure {
    /// 程序ID
    pub procedure_id: String,
    /// 程序标题
    pub title: String,
    /// 依赖临界度
    pub criticality: SopCriticality,
    /// 预计停机影响 (小时)
    pub estimated_downtime_impact_hours: f64,
}

/// SOP 影响评估
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopImpact {
    /// 受影响程序列表
    pub affected_procedures: Vec<AffectedProcedure>,
    /// 运营影响分 = Σ(停机影响 × 临界度权重)
    pub operational_impact_score: f64,
    /// 收入影响估算 = 影响分 × 每分美元系数 (配置)
    pub revenue_impact_estimate: f64,
    /// 改期建议 (仅 CRITICAL 依赖)
    pub reschedule_recommendations: Vec<RescheduleRecommendation>,
}

impl SopImpact {
    /// 空影响 (无 SOP 依赖设备)
    pub fn empty() -> Self {
        Self {
            affected_procedures: vec![],
            operational_impact_score: 0.0,
            revenue_impact_estimate: 0.0,
            reschedule_recommendations: vec![],
        }
    }
}
