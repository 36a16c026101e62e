// ==========================================
// 预测性维护排程系统 - 成本估算引擎
// ==========================================
// 职责: 备件/人工/运营/停机四项成本核算与被动维修对比
// 输入: 任务 + 分派 + 技师费率 + SOP 影响
// 输出: CostAnalysis
// ==========================================
// 红线: total_cost_estimate 必须精确等于四项之和,
//       对账失败是计算错误,绝不回退成缺省值
// ==========================================

use crate::config::params::CostParams;
use crate::domain::schedule::CostAnalysis;
use crate::domain::sop::SopImpact;
use crate::domain::task::{MaintenanceTask, Technician, TechnicianAssignment};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// CostEstimator - 成本估算引擎
// ==========================================
/// 成本估算引擎 (无状态)
pub struct CostEstimator {
    params: CostParams,
}

impl CostEstimator {
    /// 构造函数
    pub fn new(params: CostParams) -> Self {
        Self { params }
    }

    /// 估算排程成本
    ///
    /// # 参数
    /// - tasks: 维护任务 (备件成本来源)
    /// - assignments: 技师分派 (人工成本来源)
    /// - technicians: 技师列表 (费率覆写查表)
    /// - sop_impact: SOP 影响 (停机成本 = 收入影响估算)
    ///
    /// # 返回
    /// CostAnalysis:
    /// - parts = Σ(单价×数量)
    /// - labor = Σ(分派工时×费率)
    /// - operational = (parts+labor) × 管理费率
    /// - downtime = SOP 收入影响
    /// - total = 四项精确和
    /// - savings = total × 被动倍率 − total
    pub fn estimate(
        &self,
        tasks: &[MaintenanceTask],
        assignments: &[TechnicianAssignment],
        technicians: &[Technician],
        sop_impact: &SopImpact,
    ) -> EngineResult<CostAnalysis> {
        let rate_overrides: HashMap<&str, f64> = technicians
            .iter()
            .filter_map(|t| t.hourly_rate.map(|r| (t.technician_id.as_str(), r)))
            .collect();

        let parts_cost: f64 = tasks.iter().map(|t| t.parts_cost()).sum();

        let labor_cost: f64 = assignments
            .iter()
            .map(|a| {
                let rate = rate_overrides
                    .get(a.technician_id.as_str())
                    .copied()
                    .unwrap_or(self.params.default_hourly_rate);
                a.estimated_hours * rate
            })
            .sum();

        let operational_cost = (parts_cost + labor_cost) * self.params.overhead_ratio;
        let downtime_cost = sop_impact.revenue_impact_estimate;
        let total_cost_estimate = parts_cost + labor_cost + operational_cost + downtime_cost;
        let cost_savings_vs_reactive =
            total_cost_estimate * self.params.reactive_cost_multiplier - total_cost_estimate;

        let analysis = CostAnalysis {
            parts_cost,
            labor_cost,
            operational_cost,
            downtime_cost,
            total_cost_estimate,
            cost_savings_vs_reactive,
        };

        // 对账守卫: 四项之和必须精确等于总额
        if !analysis.reconciles() || !total_cost_estimate.is_finite() || total_cost_estimate < 0.0 {
            return Err(EngineError::computation(
                "成本对账失败",
                format!(
                    "parts={}, labor={}, operational={}, downtime={}, total={}",
                    parts_cost, labor_cost, operational_cost, downtime_cost, total_cost_estimate
                ),
            ));
        }

        debug!(
            parts_cost = parts_cost,
            labor_cost = labor_cost,
            operational_cost = operational_cost,
            downtime_cost = downtime_cost,
            total = total_cost_estimate,
            "成本估算完成"
        );

        Ok(analysis)
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::SparePart;

    fn estimator() -> CostEstimator {
        CostEstimator::new(CostParams::default())
    }

    fn task_with_parts(parts: Vec<SparePart>) -> MaintenanceTask {
        MaintenanceTask {
            task_id: "T01".to_string(),
            name: "任务".to_string(),
            description: String::new(),
            estimated_minutes: 60,
            required_skills: vec!["mechanical".to_string()],
            tools: vec![],
            parts,
            safety_requirements: vec![],
        }
    }

    fn assignment(technician_id: &str, hours: f64) -> TechnicianAssignment {
        TechnicianAssignment {
            technician_id: technician_id.to_string(),
            technician_name: format!("技师{}", technician_id),
            matched_task_ids: vec!["T01".to_string()],
            estimated_hours: hours,
        }
    }

    fn technician(id: &str, rate: Option<f64>) -> Technician {
        Technician {
            technician_id: id.to_string(),
            name: format!("技师{}", id),
            active: true,
            specializations: vec!["mechanical".to_string()],
            hourly_rate: rate,
            max_hours_per_day: 8.0,
        }
    }

    fn impact(revenue: f64) -> SopImpact {
        SopImpact {
            affected_procedures: vec![],
            operational_impact_score: revenue / 50.0,
            revenue_impact_estimate: revenue,
            reschedule_recommendations: vec![],
        }
    }

    #[test]
    fn test_cost_breakdown_and_reconciliation() {
        let tasks = vec![task_with_parts(vec![SparePart {
            part_no: "P1".to_string(),
            name: "备件".to_string(),
            unit_cost: 50.0,
            quantity: 2,
        }])];
        let assignments = vec![assignment("TECH-1", 2.0)];
        let technicians = vec![technician("TECH-1", None)];

        let analysis = estimator()
            .estimate(&tasks, &assignments, &technicians, &impact(400.0))
            .unwrap();

        assert_eq!(analysis.parts_cost, 100.0);
        // 2.0h × 缺省费率 75 = 150
        assert_eq!(analysis.labor_cost, 150.0);
        // (100+150) × 0.15 = 37.5
        assert_eq!(analysis.operational_cost, 37.5);
        assert_eq!(analysis.downtime_cost, 400.0);
        assert_eq!(analysis.total_cost_estimate, 687.5);
        assert!(analysis.reconciles());
        // 687.5 × 3.5 − 687.5 = 1718.75
        assert_eq!(analysis.cost_savings_vs_reactive, 1718.75);
    }

    #[test]
    fn test_hourly_rate_override() {
        let tasks = vec![task_with_parts(vec![])];
        let assignments = vec![assignment("TECH-1", 3.0), assignment("TECH-2", 1.0)];
        let technicians = vec![technician("TECH-1", Some(100.0)), technician("TECH-2", None)];

        let analysis = estimator()
            .estimate(&tasks, &assignments, &technicians, &impact(0.0))
            .unwrap();

        // 3×100 + 1×75 = 375
        assert_eq!(analysis.labor_cost, 375.0);
    }

    #[test]
    fn test_zero_cost_schedule_reconciles() {
        let analysis = estimator()
            .estimate(&[], &[], &[], &impact(0.0))
            .unwrap();
        assert_eq!(analysis.total_cost_estimate, 0.0);
        assert!(analysis.reconciles());
        assert_eq!(analysis.cost_savings_vs_reactive, 0.0);
    }
}
