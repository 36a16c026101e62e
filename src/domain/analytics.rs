// ==========================================
// 预测性维护排程系统 - 分析报表实体
// ==========================================
// 职责: 历史排程/维护记录的聚合报表结构
// 红线: 报表为追加式审计记录;未测量指标使用配置基线,禁止随机数
// ==========================================

use crate::domain::types::DateRange;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// 设备绩效 (Equipment Performance)
// ==========================================
/// 单台设备绩效指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentPerformance {
    /// 设备ID
    pub equipment_id: String,
    /// 可用率 (0~1)
    pub availability: f64,
    /// 平均故障间隔 (天)
    pub mtbf_days: f64,
    /// 平均修复时间 (小时)
    pub mttr_hours: f64,
    /// 综合设备效率 OEE = 可用率 × 表现率 × 质量率
    pub oee: f64,
    /// 可靠性评分 (0~1, 成功维护占比)
    pub reliability_score: f64,
    /// 每运行小时维护成本
    pub cost_per_operating_hour: f64,
}

// ==========================================
// 维护有效性 (Maintenance Effectiveness)
// ==========================================

/// 月度成本点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCost {
    /// 月份 (YYYY-MM)
    pub month: String,
    /// 当月维护总成本
    pub total_cost: f64,
}

/// 维护有效性汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceEffectiveness {
    /// 窗口内排程总数
    pub total_schedules: u32,
    /// 完成数
    pub completed: u32,
    /// 取消数
    pub cancelled: u32,
    /// 成功率 (完成/总数)
    pub success_rate: f64,
    /// 月度成本趋势 (按月升序)
    pub monthly_cost_trend: Vec<MonthlyCost>,
    /// 计划内维护占比 (预防性+预测性)
    pub planned_ratio: f64,
}

// ==========================================
// 预测模型表现 (Model Performance)
// ==========================================
/// 预测模型表现
///
/// 由预测-结果配对计算;样本不足时使用配置基线并置 baseline_applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPerformance {
    /// 配对样本数
    pub sample_count: u32,
    /// 准确率
    pub accuracy: f64,
    /// 误报率 (预测高风险但未失效)
    pub false_positive_rate: f64,
    /// 漏报率 (未预测但失效)
    pub false_negative_rate: f64,
    /// 是否触发漂移告警 (准确率低于阈值)
    pub drift_detected: bool,
    /// 是否使用了基线值 (样本不足)
    pub baseline_applied: bool,
}

// ==========================================
// 资源利用 (Resource Utilization)
// ==========================================

/// 技师利用统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianUtilization {
    /// 技师ID
    pub technician_id: String,
    /// 分派工时
    pub assigned_hours: f64,
    /// 效率 (完成排程数 / 分派排程数)
    pub efficiency: f64,
}

/// 资源利用汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUtilization {
    /// 技师利用分布
    pub technician_stats: Vec<TechnicianUtilization>,
    /// 备件周转 (窗口内备件消耗金额 / 月数)
    pub parts_turnover_per_month: f64,
    /// 外协比例
    pub outsourcing_ratio: f64,
}

// ==========================================
// SOP 集成指标 (SOP Integration Metrics)
// ==========================================
/// SOP 集成指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopIntegrationMetrics {
    /// 受影响程序数 (去重)
    pub procedures_impacted: u32,
    /// 施加的总停机影响 (小时)
    pub total_downtime_hours: f64,
    /// 发出的改期建议数
    pub reschedule_recommendations_issued: u32,
}

// ==========================================
// 成本收益 (Cost Benefit)
// ==========================================
/// 成本收益分析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBenefit {
    /// 窗口内维护总投入
    pub total_invested: f64,
    /// 估算避免的被动维修成本
    pub avoided_reactive_cost: f64,
    /// 投资回报率 (avoided / invested)
    pub roi: f64,
    /// 回收期 (月)
    pub payback_period_months: f64,
}

// ==========================================
// 改进机会与对标 (Opportunities / Benchmarks)
// ==========================================

/// 改进机会
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementOpportunity {
    /// 排名 (1 为最优先)
    pub rank: u32,
    /// 标题
    pub title: String,
    /// 说明
    pub description: String,
    /// 预期收益描述
    pub expected_benefit: String,
}

/// 对标差距
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkGap {
    /// 指标名
    pub metric: String,
    /// 实际值
    pub actual: f64,
    /// 行业基准值 (配置)
    pub benchmark: f64,
    /// 差距 (actual − benchmark)
    pub gap: f64,
}

// ==========================================
// MaintenanceAnalyticsReport - 分析报表聚合根
// ==========================================
/// 维护分析报表 (追加式审计记录)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceAnalyticsReport {
    /// 报表ID
    pub report_id: String,
    /// 统计窗口
    pub period: DateRange,
    /// 设备绩效 (按设备ID升序)
    pub equipment_performance: Vec<EquipmentPerformance>,
    /// 维护有效性
    pub effectiveness: MaintenanceEffectiveness,
    /// 预测模型表现
    pub model_performance: ModelPerformance,
    /// 资源利用
    pub resource_utilization: ResourceUtilization,
    /// SOP 集成指标
    pub sop_integration: SopIntegrationMetrics,
    /// 成本收益
    pub cost_benefit: CostBenefit,
    /// 改进机会 (按排名)
    pub improvement_opportunities: Vec<ImprovementOpportunity>,
    /// 对标差距
    pub benchmark_gaps: Vec<BenchmarkGap>,
    /// 生成时间
    pub generated_at: NaiveDateTime,
}
