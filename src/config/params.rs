// ==========================================
// 预测性维护排程系统 - 引擎参数配置
// ==========================================
// 职责: 引擎层所有可调参数,注入式配置,禁止硬编码全局量
// 说明: 所有字段带 serde 缺省值,可从 JSON 覆写
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// 预测参数 (Predictor Params)
// ==========================================
/// 启发式预测器参数
///
/// 公式: probability = (age·0.4 + usage·0.4 + maintenance·0.2) × 0.8
/// 该公式是训练模型上线前的占位实现,参数集中于此便于替换
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorParams {
    /// 设备年龄缺省值 (年)
    #[serde(default = "d_default_age_years")]
    pub default_age_years: f64,
    /// 运行小时缺省值
    #[serde(default = "d_default_usage_hours")]
    pub default_usage_hours: f64,
    /// 维护次数缺省值
    #[serde(default = "d_default_event_count")]
    pub default_event_count: usize,
    /// 年龄归一分母 (年)
    #[serde(default = "d_age_divisor")]
    pub age_divisor_years: f64,
    /// 运行小时归一分母
    #[serde(default = "d_usage_divisor")]
    pub usage_divisor_hours: f64,
    /// 维护次数归一分母
    #[serde(default = "d_events_divisor")]
    pub events_divisor: f64,
    /// 年龄因子权重
    #[serde(default = "d_age_weight")]
    pub age_weight: f64,
    /// 使用因子权重
    #[serde(default = "d_usage_weight")]
    pub usage_weight: f64,
    /// 维护因子权重
    #[serde(default = "d_maintenance_weight")]
    pub maintenance_weight: f64,
    /// 阻尼系数 (概率上限 = 阻尼系数)
    #[serde(default = "d_damping")]
    pub damping: f64,
    /// RUL 满额天数 (概率为 0 时的寿命)
    #[serde(default = "d_rul_full_days")]
    pub rul_full_days: f64,
    /// RUL 下限 (天)
    #[serde(default = "d_rul_floor_days")]
    pub rul_floor_days: i64,
    /// 快速劣化阈值
    #[serde(default = "d_rapid_threshold")]
    pub rapid_decline_threshold: f64,
    /// 缓慢劣化阈值
    #[serde(default = "d_slow_threshold")]
    pub slow_decline_threshold: f64,
    /// 启发式置信度固定基线 (训练模型接入前)
    #[serde(default = "d_confidence")]
    pub confidence_baseline: f64,
}

fn d_default_age_years() -> f64 { 5.0 }
fn d_default_usage_hours() -> f64 { 8760.0 }
fn d_default_event_count() -> usize { 4 }
fn d_age_divisor() -> f64 { 10.0 }
fn d_usage_divisor() -> f64 { 20000.0 }
fn d_events_divisor() -> f64 { 12.0 }
fn d_age_weight() -> f64 { 0.4 }
fn d_usage_weight() -> f64 { 0.4 }
fn d_maintenance_weight() -> f64 { 0.2 }
fn d_damping() -> f64 { 0.8 }
fn d_rul_full_days() -> f64 { 730.0 }
fn d_rul_floor_days() -> i64 { 30 }
fn d_rapid_threshold() -> f64 { 0.7 }
fn d_slow_threshold() -> f64 { 0.4 }
fn d_confidence() -> f64 { 0.7 }

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            default_age_years: d_default_age_years(),
            default_usage_hours: d_default_usage_hours(),
            default_event_count: d_default_event_count(),
            age_divisor_years: d_age_divisor(),
            usage_divisor_hours: d_usage_divisor(),
            events_divisor: d_events_divisor(),
            age_weight: d_age_weight(),
            usage_weight: d_usage_weight(),
            maintenance_weight: d_maintenance_weight(),
            damping: d_damping(),
            rul_full_days: d_rul_full_days(),
            rul_floor_days: d_rul_floor_days(),
            rapid_decline_threshold: d_rapid_threshold(),
            slow_decline_threshold: d_slow_threshold(),
            confidence_baseline: d_confidence(),
        }
    }
}

// ==========================================
// 定时参数 (Timing Params)
// ==========================================
/// 维护定时参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingParams {
    /// 最短提前期 (天) — 计划日期不得早于 today + 该值
    #[serde(default = "d_min_lead_days")]
    pub min_lead_days: i64,
    /// 定期保养周期 (天)
    #[serde(default = "d_cadence_days")]
    pub cadence_days: i64,
    /// 状态驱动: RUL 折算系数
    #[serde(default = "d_rul_factor")]
    pub condition_rul_factor: f64,
    /// 状态驱动: 高概率工时阈值
    #[serde(default = "d_cond_prob")]
    pub condition_prob_threshold: f64,
    /// 混合策略: 概率权重
    #[serde(default = "d_hybrid_prob_weight")]
    pub hybrid_prob_weight: f64,
    /// 混合策略: 周期权重
    #[serde(default = "d_hybrid_cadence_weight")]
    pub hybrid_cadence_weight: f64,
    /// 混合策略: 高分工时阈值
    #[serde(default = "d_hybrid_high")]
    pub hybrid_high_score: f64,
    /// 混合策略: 中分工时阈值
    #[serde(default = "d_hybrid_mid")]
    pub hybrid_mid_score: f64,
}

fn d_min_lead_days() -> i64 { 7 }
fn d_cadence_days() -> i64 { 90 }
fn d_rul_factor() -> f64 { 0.7 }
fn d_cond_prob() -> f64 { 0.5 }
fn d_hybrid_prob_weight() -> f64 { 0.7 }
fn d_hybrid_cadence_weight() -> f64 { 0.3 }
fn d_hybrid_high() -> f64 { 0.6 }
fn d_hybrid_mid() -> f64 { 0.3 }

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            min_lead_days: d_min_lead_days(),
            cadence_days: d_cadence_days(),
            condition_rul_factor: d_rul_factor(),
            condition_prob_threshold: d_cond_prob(),
            hybrid_prob_weight: d_hybrid_prob_weight(),
            hybrid_cadence_weight: d_hybrid_cadence_weight(),
            hybrid_high_score: d_hybrid_high(),
            hybrid_mid_score: d_hybrid_mid(),
        }
    }
}

// ==========================================
// 任务目录参数 (Catalog Params)
// ==========================================
/// 任务目录参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogParams {
    /// 追加关键部件更换任务的概率阈值
    #[serde(default = "d_critical_task_prob")]
    pub critical_task_probability_threshold: f64,
}

fn d_critical_task_prob() -> f64 { 0.6 }

impl Default for CatalogParams {
    fn default() -> Self {
        Self {
            critical_task_probability_threshold: d_critical_task_prob(),
        }
    }
}

// ==========================================
// SOP 影响参数 (SOP Params)
// ==========================================
/// SOP 影响评估参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopParams {
    /// 每影响分的美元系数 (收入影响估算)
    #[serde(default = "d_dollar_per_point")]
    pub dollar_per_impact_point: f64,
    /// 备选时段档位 (维护窗口后的天数)
    #[serde(default = "d_alt_offsets")]
    pub alternative_slot_offsets_days: Vec<i64>,
}

fn d_dollar_per_point() -> f64 { 50.0 }
fn d_alt_offsets() -> Vec<i64> { vec![1, 2] }

impl Default for SopParams {
    fn default() -> Self {
        Self {
            dollar_per_impact_point: d_dollar_per_point(),
            alternative_slot_offsets_days: d_alt_offsets(),
        }
    }
}

// ==========================================
// 成本参数 (Cost Params)
// ==========================================
/// 成本估算参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostParams {
    /// 缺省小时费率 (技师未覆写时)
    #[serde(default = "d_hourly_rate")]
    pub default_hourly_rate: f64,
    /// 管理费率 (运营附加 = (备件+人工) × 该值)
    #[serde(default = "d_overhead")]
    pub overhead_ratio: f64,
    /// 被动维修成本倍率
    #[serde(default = "d_reactive")]
    pub reactive_cost_multiplier: f64,
}

fn d_hourly_rate() -> f64 { 75.0 }
fn d_overhead() -> f64 { 0.15 }
fn d_reactive() -> f64 { 3.5 }

impl Default for CostParams {
    fn default() -> Self {
        Self {
            default_hourly_rate: d_hourly_rate(),
            overhead_ratio: d_overhead(),
            reactive_cost_multiplier: d_reactive(),
        }
    }
}

// ==========================================
// 批处理参数 (Batch Params)
// ==========================================
/// 批量排程参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchParams {
    /// 有界并行度 (worker 数)
    #[serde(default = "d_max_parallel")]
    pub max_parallel: usize,
    /// 外部依赖调用超时 (毫秒)
    #[serde(default = "d_dependency_timeout")]
    pub dependency_timeout_ms: u64,
    /// 瞬态失败重试退避 (毫秒,仅重试一次)
    #[serde(default = "d_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn d_max_parallel() -> usize { 4 }
fn d_dependency_timeout() -> u64 { 5_000 }
fn d_retry_backoff() -> u64 { 200 }

impl Default for BatchParams {
    fn default() -> Self {
        Self {
            max_parallel: d_max_parallel(),
            dependency_timeout_ms: d_dependency_timeout(),
            retry_backoff_ms: d_retry_backoff(),
        }
    }
}

// ==========================================
// 分析基线 (Analytics Baselines)
// ==========================================
/// 分析基线
///
/// 未测量指标的固定基线 (替代源系统的随机占位),接入真实测点后删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsBaselines {
    /// OEE 表现率基线
    #[serde(default = "d_performance")]
    pub performance_rate: f64,
    /// OEE 质量率基线
    #[serde(default = "d_quality")]
    pub quality_rate: f64,
    /// 模型准确率基线 (样本不足时)
    #[serde(default = "d_model_accuracy")]
    pub model_accuracy_baseline: f64,
    /// 漂移告警准确率阈值
    #[serde(default = "d_drift")]
    pub drift_accuracy_threshold: f64,
    /// 行业对标: 可用率
    #[serde(default = "d_bm_availability")]
    pub benchmark_availability: f64,
    /// 行业对标: 计划内维护占比
    #[serde(default = "d_bm_planned")]
    pub benchmark_planned_ratio: f64,
    /// 行业对标: OEE
    #[serde(default = "d_bm_oee")]
    pub benchmark_oee: f64,
}

fn d_performance() -> f64 { 0.95 }
fn d_quality() -> f64 { 0.98 }
fn d_model_accuracy() -> f64 { 0.75 }
fn d_drift() -> f64 { 0.6 }
fn d_bm_availability() -> f64 { 0.9 }
fn d_bm_planned() -> f64 { 0.8 }
fn d_bm_oee() -> f64 { 0.85 }

impl Default for AnalyticsBaselines {
    fn default() -> Self {
        Self {
            performance_rate: d_performance(),
            quality_rate: d_quality(),
            model_accuracy_baseline: d_model_accuracy(),
            drift_accuracy_threshold: d_drift(),
            benchmark_availability: d_bm_availability(),
            benchmark_planned_ratio: d_bm_planned(),
            benchmark_oee: d_bm_oee(),
        }
    }
}

// ==========================================
// EngineConfig - 引擎配置聚合
// ==========================================
/// 引擎配置聚合
///
/// 一次加载,注入到各引擎;保证同一配置快照下结果可复现
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub predictor: PredictorParams,
    #[serde(default)]
    pub timing: TimingParams,
    #[serde(default)]
    pub catalog: CatalogParams,
    #[serde(default)]
    pub sop: SopParams,
    #[serde(default)]
    pub cost: CostParams,
    #[serde(default)]
    pub batch: BatchParams,
    #[serde(default)]
    pub analytics: AnalyticsBaselines,
}

impl EngineConfig {
    /// 从 JSON 字符串加载 (缺失字段使用缺省值)
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// 导出配置快照 JSON (记录在提案/版本中,保证可复现)
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.predictor.default_age_years, 5.0);
        assert_eq!(cfg.predictor.default_usage_hours, 8760.0);
        assert_eq!(cfg.predictor.default_event_count, 4);
        assert_eq!(cfg.predictor.damping, 0.8);
        assert_eq!(cfg.timing.min_lead_days, 7);
        assert_eq!(cfg.timing.cadence_days, 90);
        assert_eq!(cfg.sop.dollar_per_impact_point, 50.0);
        assert_eq!(cfg.cost.overhead_ratio, 0.15);
        assert_eq!(cfg.cost.reactive_cost_multiplier, 3.5);
        assert_eq!(cfg.batch.max_parallel, 4);
    }

    #[test]
    fn test_from_json_partial_override() {
        let cfg = EngineConfig::from_json(
            r#"{"cost": {"default_hourly_rate": 120.0}, "batch": {"max_parallel": 8}}"#,
        )
        .unwrap();

        assert_eq!(cfg.cost.default_hourly_rate, 120.0);
        // 未覆写字段保持缺省
        assert_eq!(cfg.cost.overhead_ratio, 0.15);
        assert_eq!(cfg.batch.max_parallel, 8);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let cfg = EngineConfig::default();
        let snapshot = cfg.snapshot_json().unwrap();
        let restored = EngineConfig::from_json(&snapshot).unwrap();
        assert_eq!(restored.sop.dollar_per_impact_point, cfg.sop.dollar_per_impact_point);
    }
}
