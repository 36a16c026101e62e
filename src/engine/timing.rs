// ==========================================
// 预测性维护排程系统 - 维护定时引擎
// ==========================================
// 职责: 按策略计算计划日期与预计工时
// 输入: 设备 + 失效预测 + 策略 + 规划视界
// 输出: TimingPlan (计划日期 / 工时 / 原因)
// ==========================================
// 红线: 计划日期 ≥ today + 7 天,绝不排入过去
// ==========================================

use crate::config::params::TimingParams;
use crate::domain::equipment::Equipment;
use crate::domain::prediction::FailurePrediction;
use crate::domain::types::MaintenanceStrategy;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ==========================================
// TimingPlan - 定时决策结果
// ==========================================
/// 定时决策结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingPlan {
    /// 计划日期
    pub scheduled_date: NaiveDate,
    /// 预计工时 (小时)
    pub estimated_duration_hours: f64,
    /// 距今天数
    pub days_until: i64,
    /// 决策原因 (可解释)
    pub reason: String,
}

// ==========================================
// TimingOptimizer - 定时引擎
// ==========================================
/// 维护定时引擎 (无状态)
pub struct TimingOptimizer {
    params: TimingParams,
}

impl TimingOptimizer {
    /// 构造函数
    pub fn new(params: TimingParams) -> Self {
        Self { params }
    }

    /// 计算维护时点
    ///
    /// # 参数
    /// - equipment: 设备主数据 (取上次维护日期)
    /// - prediction: 失效预测
    /// - strategy: 维护策略
    /// - horizon_days: 规划视界 (天, 0 表示不限)
    /// - today: 基准日期
    ///
    /// # 返回
    /// TimingPlan,计划日期保证 ≥ today + 最短提前期
    pub fn plan(
        &self,
        equipment: &Equipment,
        prediction: &FailurePrediction,
        strategy: MaintenanceStrategy,
        horizon_days: i64,
        today: NaiveDate,
    ) -> TimingPlan {
        let (raw_days, duration, reason) = match strategy {
            MaintenanceStrategy::ConditionBased => self.plan_condition_based(prediction),
            MaintenanceStrategy::TimeBased => self.plan_time_based(equipment, today),
            MaintenanceStrategy::Hybrid => self.plan_hybrid(equipment, prediction, today),
        };

        // 提前期下限: 绝不早于 today + min_lead_days
        let mut days_until = raw_days.max(self.params.min_lead_days);

        // 规划视界上限 (不得低于提前期下限)
        if horizon_days > 0 {
            days_until = days_until.min(horizon_days.max(self.params.min_lead_days));
        }

        let plan = TimingPlan {
            scheduled_date: today + Duration::days(days_until),
            estimated_duration_hours: duration,
            days_until,
            reason,
        };

        debug!(
            equipment_id = %equipment.equipment_id,
            strategy = strategy.as_str(),
            days_until = days_until,
            duration_hours = duration,
            "定时决策完成"
        );

        plan
    }

    // ==========================================
    // 策略实现
    // ==========================================

    /// 状态驱动: days_until = max(7, RUL×0.7)
    fn plan_condition_based(&self, prediction: &FailurePrediction) -> (i64, f64, String) {
        let days =
            (prediction.remaining_useful_life_days as f64 * self.params.condition_rul_factor) as i64;
        let duration = if prediction.probability_of_failure > self.params.condition_prob_threshold {
            4.0
        } else {
            2.0
        };
        (
            days,
            duration,
            format!(
                "状态驱动: RUL {} 天 × {:.1} = {} 天后",
                prediction.remaining_useful_life_days, self.params.condition_rul_factor, days
            ),
        )
    }

    /// 定期保养: 距上次维护固定 90 天周期 (无历史按 90 天前计)
    fn plan_time_based(&self, equipment: &Equipment, today: NaiveDate) -> (i64, f64, String) {
        let days_since_last = equipment
            .days_since_last_maintenance(today)
            .unwrap_or(self.params.cadence_days);
        let days = self.params.cadence_days - days_since_last;
        (
            days,
            3.0,
            format!(
                "定期保养: 距上次维护 {} 天,周期 {} 天",
                days_since_last, self.params.cadence_days
            ),
        )
    }

    /// 混合策略: score = p×0.7 + (距上次/90)×0.3; days = max(7, (1−score)×90)
    fn plan_hybrid(
        &self,
        equipment: &Equipment,
        prediction: &FailurePrediction,
        today: NaiveDate,
    ) -> (i64, f64, String) {
        let days_since_last = equipment
            .days_since_last_maintenance(today)
            .unwrap_or(self.params.cadence_days);
        let score = prediction.probability_of_failure * self.params.hybrid_prob_weight
            + (days_since_last as f64 / self.params.cadence_days as f64)
                * self.params.hybrid_cadence_weight;

        let days = ((1.0 - score) * self.params.cadence_days as f64) as i64;
        let duration = if score > self.params.hybrid_high_score {
            5.0
        } else if score > self.params.hybrid_mid_score {
            3.0
        } else {
            2.0
        };
        (
            days,
            duration,
            format!(
                "混合策略: score={:.3} (概率 {:.2} × {:.1} + 周期比 {:.2} × {:.1})",
                score,
                prediction.probability_of_failure,
                self.params.hybrid_prob_weight,
                days_since_last as f64 / self.params.cadence_days as f64,
                self.params.hybrid_cadence_weight
            ),
        )
    }
}
