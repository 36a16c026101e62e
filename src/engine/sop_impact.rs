// ==========================================
// 预测性维护排程系统 - SOP 依赖影响引擎
// ==========================================
// 职责: 评估维护窗口对依赖程序的影响并给出改期建议
// 输入: 设备ID + 生效程序列表 + 维护窗口 (日期/时长)
// 输出: SopImpact
// ==========================================
// 红线: operational_impact_score 对停机时长与依赖临界度单调不减
// 规则: 仅 CRITICAL 依赖生成改期建议 (USE_ALTERNATIVE, +24h/+48h 两档)
// ==========================================

use crate::config::params::SopParams;
use crate::domain::sop::{
    AffectedProcedure, RescheduleAction, RescheduleRecommendation, SopImpact, SopProcedure,
};
use crate::domain::types::SopCriticality;
use chrono::{Duration, NaiveDate};
use tracing::debug;

// ==========================================
// SopImpactAnalyzer - SOP 影响引擎
// ==========================================
/// SOP 依赖影响引擎 (无状态)
pub struct SopImpactAnalyzer {
    params: SopParams,
}

impl SopImpactAnalyzer {
    /// 构造函数
    pub fn new(params: SopParams) -> Self {
        Self { params }
    }

    /// 评估维护窗口的 SOP 影响
    ///
    /// # 参数
    /// - equipment_id: 被维护设备
    /// - procedures: 程序列表 (非生效程序被忽略)
    /// - scheduled_date: 维护日期
    /// - duration_hours: 维护时长 (小时)
    ///
    /// # 返回
    /// SopImpact:
    /// - 停机影响 = 时长 × 临界度系数 (critical 1.0 / moderate 0.5 / minimal 0)
    /// - 影响分 = Σ(停机影响 × 临界度权重 10/5/1)
    /// - 收入影响 = 影响分 × 每分美元系数
    pub fn analyze(
        &self,
        equipment_id: &str,
        procedures: &[SopProcedure],
        scheduled_date: NaiveDate,
        duration_hours: f64,
    ) -> SopImpact {
        let mut affected = Vec::new();
        let mut score = 0.0;
        let mut recommendations = Vec::new();

        for procedure in procedures {
            if !procedure.active {
                continue;
            }
            let Some(criticality) = procedure.criticality_for(equipment_id) else {
                continue;
            };

            let downtime_impact = duration_hours * criticality.downtime_factor();
            score += downtime_impact * criticality.impact_weight();

            affected.push(AffectedProcedure {
                procedure_id: procedure.procedure_id.clone(),
                title: procedure.title.clone(),
                criticality,
                estimated_downtime_impact_hours: downtime_impact,
            });

            // 仅关键依赖给改期建议
            if criticality == SopCriticality::Critical {
                recommendations.push(RescheduleRecommendation {
                    procedure_id: procedure.procedure_id.clone(),
                    action: RescheduleAction::UseAlternative,
                    alternative_dates: self
                        .params
                        .alternative_slot_offsets_days
                        .iter()
                        .map(|offset| scheduled_date + Duration::days(*offset))
                        .collect(),
                    reason: format!(
                        "程序 {} 关键依赖设备 {},维护窗口 {} 预计停机 {:.1} 小时",
                        procedure.procedure_id, equipment_id, scheduled_date, downtime_impact
                    ),
                });
            }
        }

        let impact = SopImpact {
            affected_procedures: affected,
            operational_impact_score: score,
            revenue_impact_estimate: score * self.params.dollar_per_impact_point,
            reschedule_recommendations: recommendations,
        };

        debug!(
            equipment_id = equipment_id,
            affected_count = impact.affected_procedures.len(),
            impact_score = impact.operational_impact_score,
            revenue_impact = impact.revenue_impact_estimate,
            "SOP 影响评估完成"
        );

        impact
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sop::SopDependency;

    fn analyzer() -> SopImpactAnalyzer {
        SopImpactAnalyzer::new(SopParams::default())
    }

    fn procedure(id: &str, active: bool, criticality: SopCriticality) -> SopProcedure {
        SopProcedure {
            procedure_id: id.to_string(),
            title: format!("程序{}", id),
            active,
            dependencies: vec![SopDependency {
                equipment_id: "EQ-001".to_string(),
                criticality,
            }],
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    #[test]
    fn test_impact_by_criticality() {
        let procedures = vec![
            procedure("SOP-C", true, SopCriticality::Critical),
            procedure("SOP-M", true, SopCriticality::Moderate),
            procedure("SOP-N", true, SopCriticality::Minimal),
        ];

        let impact = analyzer().analyze("EQ-001", &procedures, date(), 4.0);

        assert_eq!(impact.affected_procedures.len(), 3);
        // critical: 4.0h, moderate: 2.0h, minimal: 0h
        assert_eq!(impact.affected_procedures[0].estimated_downtime_impact_hours, 4.0);
        assert_eq!(impact.affected_procedures[1].estimated_downtime_impact_hours, 2.0);
        assert_eq!(impact.affected_procedures[2].estimated_downtime_impact_hours, 0.0);

        // score = 4×10 + 2×5 + 0×1 = 50; 收入影响 = 50 × 50 = 2500
        assert_eq!(impact.operational_impact_score, 50.0);
        assert_eq!(impact.revenue_impact_estimate, 2500.0);
    }

    #[test]
    fn test_only_critical_gets_reschedule_recommendation() {
        let procedures = vec![
            procedure("SOP-C", true, SopCriticality::Critical),
            procedure("SOP-M", true, SopCriticality::Moderate),
        ];

        let impact = analyzer().analyze("EQ-001", &procedures, date(), 4.0);

        assert_eq!(impact.reschedule_recommendations.len(), 1);
        let rec = &impact.reschedule_recommendations[0];
        assert_eq!(rec.procedure_id, "SOP-C");
        assert_eq!(rec.action, RescheduleAction::UseAlternative);
        // +24h / +48h 两档备选
        assert_eq!(
            rec.alternative_dates,
            vec![date() + Duration::days(1), date() + Duration::days(2)]
        );
    }

    #[test]
    fn test_inactive_procedure_ignored() {
        let procedures = vec![procedure("SOP-X", false, SopCriticality::Critical)];
        let impact = analyzer().analyze("EQ-001", &procedures, date(), 4.0);

        assert!(impact.affected_procedures.is_empty());
        assert_eq!(impact.operational_impact_score, 0.0);
    }

    #[test]
    fn test_unrelated_procedure_ignored() {
        let other = SopProcedure {
            procedure_id: "SOP-O".to_string(),
            title: "无关程序".to_string(),
            active: true,
            dependencies: vec![SopDependency {
                equipment_id: "EQ-999".to_string(),
                criticality: SopCriticality::Critical,
            }],
        };
        let impact = analyzer().analyze("EQ-001", &[other], date(), 4.0);
        assert!(impact.affected_procedures.is_empty());
    }

    #[test]
    fn test_score_monotonic_in_duration() {
        let procedures = vec![
            procedure("SOP-C", true, SopCriticality::Critical),
            procedure("SOP-M", true, SopCriticality::Moderate),
        ];

        let mut last = -1.0;
        for hours in [0.0, 1.0, 2.0, 4.0, 8.0] {
            let impact = analyzer().analyze("EQ-001", &procedures, date(), hours);
            assert!(impact.operational_impact_score >= last);
            last = impact.operational_impact_score;
        }
    }

    #[test]
    fn test_score_monotonic_in_criticality() {
        // 同一时长下,临界度提升影响分不降
        let mut last = -1.0;
        for criticality in [
            SopCriticality::Minimal,
            SopCriticality::Moderate,
            SopCriticality::Critical,
        ] {
            let impact = analyzer().analyze(
                "EQ-001",
                &[procedure("SOP-1", true, criticality)],
                date(),
                4.0,
            );
            assert!(impact.operational_impact_score >= last);
            last = impact.operational_impact_score;
        }
    }
}
