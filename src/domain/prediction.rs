// ==========================================
// 预测性维护排程系统 - 失效预测实体
// ==========================================
// 职责: 失效预测输出结构
// 红线: 预测结果按请求重算,可缓存,但绝不是数据源头
// ==========================================

use crate::domain::types::DegradationTrend;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// WarningSignal - 预警信号
// ==========================================
/// 预警信号
///
/// 每条信号必须带可解释的 code + message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningSignal {
    /// 信号代码 (如 AGED_EQUIPMENT / HEAVY_USAGE)
    pub code: String,
    /// 可读说明
    pub message: String,
}

impl WarningSignal {
    pub fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
        }
    }
}

// ==========================================
// FailurePrediction - 失效预测
// ==========================================
/// 失效预测结果
///
/// 不变量:
/// - probability_of_failure ∈ [0,1]
/// - remaining_useful_life_days >= 30 (下限强制)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailurePrediction {
    /// 设备ID
    pub equipment_id: String,
    /// 失效概率 [0,1]
    pub probability_of_failure: f64,
    /// 剩余使用寿命 (天, >=30)
    pub remaining_useful_life_days: i64,
    /// 劣化趋势
    pub trend: DegradationTrend,
    /// 预警信号
    pub warning_signals: Vec<WarningSignal>,
    /// 置信度 [0,1] (启发式预测器使用固定基线,见配置)
    pub confidence: f64,
    /// 生成时间
    pub generated_at: NaiveDateTime,
}

impl FailurePrediction {
    /// 校验预测结果的不变量
    ///
    /// # 返回
    /// - Ok(()): 满足所有不变量
    /// - Err(reason): 违反的第一条不变量
    pub fn validate(&self) -> Result<(), String> {
        if !self.probability_of_failure.is_finite()
            || self.probability_of_failure < 0.0
            || self.probability_of_failure > 1.0
        {
            return Err(format!(
                "失效概率越界: equipment_id={}, probability={}",
                self.equipment_id, self.probability_of_failure
            ));
        }
        if self.remaining_useful_life_days < 30 {
            return Err(format!(
                "剩余寿命低于下限: equipment_id={}, rul_days={}",
                self.equipment_id, self.remaining_useful_life_days
            ));
        }
        if !self.confidence.is_finite() || self.confidence < 0.0 || self.confidence > 1.0 {
            return Err(format!(
                "置信度越界: equipment_id={}, confidence={}",
                self.equipment_id, self.confidence
            ));
        }
        Ok(())
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base_prediction() -> FailurePrediction {
        FailurePrediction {
            equipment_id: "EQ-001".to_string(),
            probability_of_failure: 0.42,
            remaining_useful_life_days: 423,
            trend: DegradationTrend::SlowDecline,
            warning_signals: vec![],
            confidence: 0.7,
            generated_at: NaiveDate::from_ymd_opt(2026, 3, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(base_prediction().validate().is_ok());
    }

    #[test]
    fn test_validate_probability_out_of_range() {
        let mut p = base_prediction();
        p.probability_of_failure = 1.2;
        assert!(p.validate().is_err());

        p.probability_of_failure = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_rul_floor() {
        let mut p = base_prediction();
        p.remaining_useful_life_days = 29;
        assert!(p.validate().is_err());

        p.remaining_useful_life_days = 30;
        assert!(p.validate().is_ok());
    }
}
