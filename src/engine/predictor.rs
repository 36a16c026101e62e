// ==========================================
// 预测性维护排程系统 - 失效预测引擎
// ==========================================
// 职责: 失效概率 / 剩余寿命 / 劣化趋势估计
// 输入: 设备年龄 + 累计运行小时 + 历史维护次数 (缺失用缺省值,不报错)
// 输出: FailurePrediction
// ==========================================
// 红线: 概率对任一风险因子单调不减;RUL 下限 30 天
// 说明: 启发式公式是训练模型上线前的占位实现,
//       下游只依赖 FailurePredictor 契约,模型可整体替换
// ==========================================

use crate::config::params::PredictorParams;
use crate::domain::equipment::Equipment;
use crate::domain::prediction::{FailurePrediction, WarningSignal};
use crate::domain::types::DegradationTrend;
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use tracing::debug;

// ==========================================
// FailurePredictor - 预测能力契约
// ==========================================
/// 失效预测能力契约
///
/// 替换实现 (如训练模型推理) 时下游组件零改动
pub trait FailurePredictor: Send + Sync {
    /// 对单台设备生成失效预测
    ///
    /// # 参数
    /// - equipment: 设备主数据 (字段可缺失)
    /// - today: 基准日期
    fn predict(&self, equipment: &Equipment, today: NaiveDate) -> EngineResult<FailurePrediction>;
}

// ==========================================
// HeuristicPredictor - 启发式预测器
// ==========================================
/// 启发式失效预测器
///
/// 公式:
/// - age_factor = min(age_years/10, 1)
/// - usage_factor = min(usage_hours/20000, 1)
/// - maintenance_factor = max(0, 1 − events/12)
/// - probability = (age×0.4 + usage×0.4 + maintenance×0.2) × 0.8
/// - RUL = max(30, (1−probability) × 730)
pub struct HeuristicPredictor {
    params: PredictorParams,
}

impl HeuristicPredictor {
    /// 构造函数
    pub fn new(params: PredictorParams) -> Self {
        Self { params }
    }

    // ==========================================
    // 因子计算
    // ==========================================

    /// 年龄因子 [0,1]
    fn age_factor(&self, age_years: f64) -> f64 {
        (age_years / self.params.age_divisor_years).min(1.0).max(0.0)
    }

    /// 使用因子 [0,1]
    fn usage_factor(&self, usage_hours: f64) -> f64 {
        (usage_hours / self.params.usage_divisor_hours).min(1.0).max(0.0)
    }

    /// 维护因子 [0,1] — 维护越多因子越低
    fn maintenance_factor(&self, event_count: usize) -> f64 {
        (1.0 - event_count as f64 / self.params.events_divisor).max(0.0)
    }

    /// 劣化趋势判定
    fn trend_for(&self, probability: f64) -> DegradationTrend {
        if probability > self.params.rapid_decline_threshold {
            DegradationTrend::RapidDecline
        } else if probability > self.params.slow_decline_threshold {
            DegradationTrend::SlowDecline
        } else {
            DegradationTrend::Stable
        }
    }

    /// 预警信号生成 (每条信号必须可解释)
    fn warning_signals(
        &self,
        age_years: f64,
        usage_hours: f64,
        event_count: usize,
        probability: f64,
    ) -> Vec<WarningSignal> {
        let mut signals = Vec::new();

        if age_years > self.params.age_divisor_years * 0.7 {
            signals.push(WarningSignal::new(
                "AGED_EQUIPMENT",
                format!("设备服役 {:.1} 年,接近设计寿命", age_years),
            ));
        }
        if usage_hours > self.params.usage_divisor_hours * 0.75 {
            signals.push(WarningSignal::new(
                "HEAVY_USAGE",
                format!("累计运行 {:.0} 小时,负荷偏高", usage_hours),
            ));
        }
        if (event_count as f64) < self.params.events_divisor / 4.0 {
            signals.push(WarningSignal::new(
                "SPARSE_MAINTENANCE",
                format!("历史维护仅 {} 次,保养不足", event_count),
            ));
        }
        if probability > 0.6 {
            signals.push(WarningSignal::new(
                "ELEVATED_FAILURE_RISK",
                format!("失效概率 {:.2},建议提前介入", probability),
            ));
        }

        signals
    }
}

impl FailurePredictor for HeuristicPredictor {
    fn predict(&self, equipment: &Equipment, today: NaiveDate) -> EngineResult<FailurePrediction> {
        // 1. 输入取值 (缺失字段应用缺省值,不报错)
        let age_years = equipment
            .age_years(today)
            .unwrap_or(self.params.default_age_years);
        let usage_hours = equipment
            .usage_hours
            .unwrap_or(self.params.default_usage_hours);
        let event_count = if equipment.maintenance_history.is_empty()
            && equipment.usage_hours.is_none()
            && equipment.install_date.is_none()
        {
            // 台账完全缺失时使用缺省维护次数
            self.params.default_event_count
        } else {
            equipment.maintenance_event_count()
        };

        // 2. 因子与概率
        let age_f = self.age_factor(age_years);
        let usage_f = self.usage_factor(usage_hours);
        let maint_f = self.maintenance_factor(event_count);
        let probability = (age_f * self.params.age_weight
            + usage_f * self.params.usage_weight
            + maint_f * self.params.maintenance_weight)
            * self.params.damping;

        // 3. 不变量守卫: 概率必须落在 [0,1]
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(EngineError::computation(
                format!("失效概率越界: {}", probability),
                format!(
                    "equipment_id={}, age_years={}, usage_hours={}, event_count={}",
                    equipment.equipment_id, age_years, usage_hours, event_count
                ),
            ));
        }

        // 4. RUL (下限 30 天)
        let rul_days = ((1.0 - probability) * self.params.rul_full_days) as i64;
        let rul_days = rul_days.max(self.params.rul_floor_days);

        let prediction = FailurePrediction {
            equipment_id: equipment.equipment_id.clone(),
            probability_of_failure: probability,
            remaining_useful_life_days: rul_days,
            trend: self.trend_for(probability),
            warning_signals: self.warning_signals(age_years, usage_hours, event_count, probability),
            confidence: self.params.confidence_baseline,
            generated_at: chrono::Utc::now().naive_utc(),
        };

        // 5. 出口校验
        prediction.validate().map_err(|reason| {
            EngineError::computation(
                reason,
                format!(
                    "equipment_id={}, age_years={}, usage_hours={}, event_count={}",
                    equipment.equipment_id, age_years, usage_hours, event_count
                ),
            )
        })?;

        debug!(
            equipment_id = %equipment.equipment_id,
            probability = probability,
            rul_days = rul_days,
            trend = %prediction.trend,
            "失效预测完成"
        );

        Ok(prediction)
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::equipment::MaintenanceRecord;
    use crate::domain::types::MaintenanceKind;

    fn predictor() -> HeuristicPredictor {
        HeuristicPredictor::new(PredictorParams::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn equipment(age_years: f64, usage_hours: f64, events: usize) -> Equipment {
        let install = today() - chrono::Duration::days((age_years * 365.25) as i64);
        let mut history = Vec::new();
        for i in 0..events {
            history.push(MaintenanceRecord {
                record_id: format!("R{}", i),
                equipment_id: "EQ-T".to_string(),
                maintenance_kind: MaintenanceKind::Preventive,
                performed_date: today() - chrono::Duration::days(30 * (i as i64 + 1)),
                duration_hours: 2.0,
                cost: 400.0,
                success: true,
                technician_id: None,
                notes: None,
            });
        }
        Equipment {
            equipment_id: "EQ-T".to_string(),
            name: "测试设备".to_string(),
            category: "PUMP".to_string(),
            install_date: Some(install),
            usage_hours: Some(usage_hours),
            location: None,
            maintenance_history: history,
            updated_at: None,
        }
    }

    #[test]
    fn test_probability_bounds_and_rul_floor() {
        let p = predictor();
        for (age, usage, events) in [
            (0.0, 0.0, 0usize),
            (3.0, 5000.0, 2),
            (12.0, 25000.0, 1),
            (50.0, 100000.0, 0),
            (1.0, 100.0, 20),
        ] {
            let pred = p.predict(&equipment(age, usage, events), today()).unwrap();
            assert!((0.0..=1.0).contains(&pred.probability_of_failure));
            assert!(pred.remaining_useful_life_days >= 30);
        }
    }

    #[test]
    fn test_worn_out_equipment_near_ceiling() {
        // 年龄/使用均饱和、维护稀疏: 概率逼近 0.8 上限,快速劣化
        let pred = predictor()
            .predict(&equipment(12.0, 25000.0, 1), today())
            .unwrap();

        // (1.0*0.4 + 1.0*0.4 + (1-1/12)*0.2) * 0.8 = 0.78666...
        assert!((pred.probability_of_failure - 0.78667).abs() < 0.001);
        assert_eq!(pred.trend, DegradationTrend::RapidDecline);
        assert_eq!(pred.remaining_useful_life_days, 155);
        assert!(pred
            .warning_signals
            .iter()
            .any(|s| s.code == "ELEVATED_FAILURE_RISK"));
    }

    #[test]
    fn test_new_equipment_low_probability() {
        let pred = predictor()
            .predict(&equipment(0.0, 0.0, 4), today())
            .unwrap();

        // (0*0.4 + 0*0.4 + (1-4/12)*0.2) * 0.8 = 0.10666...
        assert!(pred.probability_of_failure < 0.15);
        assert_eq!(pred.trend, DegradationTrend::Stable);
        assert!(pred.remaining_useful_life_days > 600);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let bare = Equipment {
            equipment_id: "EQ-BARE".to_string(),
            name: "无台账设备".to_string(),
            category: "UNKNOWN".to_string(),
            install_date: None,
            usage_hours: None,
            location: None,
            maintenance_history: vec![],
            updated_at: None,
        };
        let pred = predictor().predict(&bare, today()).unwrap();

        // 缺省: 5年/8760h/4次 → (0.5*0.4 + 0.438*0.4 + 0.6667*0.2) * 0.8 = 0.4068
        assert!((pred.probability_of_failure - 0.4068).abs() < 0.01);
        assert_eq!(pred.trend, DegradationTrend::SlowDecline);
    }

    #[test]
    fn test_monotonic_in_each_factor() {
        let p = predictor();

        // 年龄递增,概率单调不减
        let mut last = -1.0;
        for age in [0.0, 2.0, 5.0, 8.0, 10.0, 15.0] {
            let pred = p.predict(&equipment(age, 8000.0, 4), today()).unwrap();
            assert!(pred.probability_of_failure >= last);
            last = pred.probability_of_failure;
        }

        // 使用小时递增,概率单调不减
        last = -1.0;
        for usage in [0.0, 4000.0, 10000.0, 20000.0, 30000.0] {
            let pred = p.predict(&equipment(5.0, usage, 4), today()).unwrap();
            assert!(pred.probability_of_failure >= last);
            last = pred.probability_of_failure;
        }

        // 维护次数递减 (风险因子递增),概率单调不减
        last = -1.0;
        for events in [12usize, 8, 6, 4, 2, 0] {
            let pred = p.predict(&equipment(5.0, 8000.0, events), today()).unwrap();
            assert!(pred.probability_of_failure >= last);
            last = pred.probability_of_failure;
        }
    }

    #[test]
    fn test_heuristic_never_emits_critical_trend() {
        let p = predictor();
        // 概率上限 0.8 < 1.0,Critical 趋势不可达
        for (age, usage, events) in [(50.0, 100000.0, 0usize), (12.0, 25000.0, 1)] {
            let pred = p.predict(&equipment(age, usage, events), today()).unwrap();
            assert_ne!(pred.trend, DegradationTrend::Critical);
        }
    }
}
