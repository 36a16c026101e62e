// ==========================================
// 预测性维护排程系统 - 分析聚合引擎
// ==========================================
// 职责: 对窗口内历史排程与维护记录做只读聚合
// 输入: 统计窗口 + 排程集合 + 设备集合 (含维护历史)
// 输出: MaintenanceAnalyticsReport
// ==========================================
// 红线: 未测量指标使用配置基线并显式标记,禁止随机数;
//       有真实记录的指标 (MTBF/MTTR/成本趋势) 必须按历史计算
// ==========================================

use crate::config::params::AnalyticsBaselines;
use crate::domain::analytics::{
    BenchmarkGap, CostBenefit, EquipmentPerformance, ImprovementOpportunity,
    MaintenanceAnalyticsReport, MaintenanceEffectiveness, ModelPerformance, MonthlyCost,
    ResourceUtilization, SopIntegrationMetrics, TechnicianUtilization,
};
use crate::domain::equipment::{Equipment, MaintenanceRecord};
use crate::domain::schedule::MaintenanceSchedule;
use crate::domain::types::{DateRange, MaintenanceKind, ScheduleStatus};
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};
use uuid::Uuid;

/// 模型表现评估的最小配对样本数,不足则使用基线
const MIN_MODEL_SAMPLES: u32 = 5;

// ==========================================
// AnalyticsEngine - 分析聚合引擎
// ==========================================
/// 分析聚合引擎 (无状态)
pub struct AnalyticsEngine {
    baselines: AnalyticsBaselines,
}

impl AnalyticsEngine {
    /// 构造函数
    pub fn new(baselines: AnalyticsBaselines) -> Self {
        Self { baselines }
    }

    /// 生成分析报表
    ///
    /// # 参数
    /// - period: 统计窗口
    /// - schedules: 窗口内排程集合
    /// - equipment: 设备集合 (含维护历史)
    ///
    /// # 返回
    /// MaintenanceAnalyticsReport (未持久化,由调用方落库)
    pub fn generate(
        &self,
        period: DateRange,
        schedules: &[MaintenanceSchedule],
        equipment: &[Equipment],
    ) -> MaintenanceAnalyticsReport {
        info!(
            period_from = %period.from,
            period_to = %period.to,
            schedule_count = schedules.len(),
            equipment_count = equipment.len(),
            "开始生成分析报表"
        );

        let window_days = (period.to - period.from).num_days() + 1;
        let window_months = (window_days as f64 / 30.44).max(1.0 / 30.44);

        let equipment_performance =
            self.equipment_performance(period, window_days, equipment);
        let effectiveness = self.effectiveness(period, schedules, equipment);
        let model_performance = self.model_performance(period, schedules, equipment);
        let resource_utilization =
            self.resource_utilization(schedules, window_months);
        let sop_integration = self.sop_integration(schedules);
        let cost_benefit = self.cost_benefit(schedules, window_months);
        let improvement_opportunities = self.improvement_opportunities(
            &equipment_performance,
            &effectiveness,
            &model_performance,
        );
        let benchmark_gaps = self.benchmark_gaps(&equipment_performance, &effectiveness);

        let report = MaintenanceAnalyticsReport {
            report_id: Uuid::new_v4().to_string(),
            period,
            equipment_performance,
            effectiveness,
            model_performance,
            resource_utilization,
            sop_integration,
            cost_benefit,
            improvement_opportunities,
            benchmark_gaps,
            generated_at: chrono::Utc::now().naive_utc(),
        };

        debug!(report_id = %report.report_id, "分析报表生成完成");
        report
    }

    // ==========================================
    // 设备绩效
    // ==========================================

    fn equipment_performance(
        &self,
        period: DateRange,
        window_days: i64,
        equipment: &[Equipment],
    ) -> Vec<EquipmentPerformance> {
        let mut sorted: Vec<&Equipment> = equipment.iter().collect();
        sorted.sort_by(|a, b| a.equipment_id.cmp(&b.equipment_id));

        sorted
            .iter()
            .map(|eq| {
                let records: Vec<&MaintenanceRecord> = eq
                    .maintenance_history
                    .iter()
                    .filter(|r| period.contains(r.performed_date))
                    .collect();

                let window_hours = window_days as f64 * 24.0;
                let downtime_hours: f64 = records.iter().map(|r| r.duration_hours).sum();
                let availability =
                    ((window_hours - downtime_hours) / window_hours).clamp(0.0, 1.0);

                // 故障 = 纠正性/应急记录
                let failures: Vec<&&MaintenanceRecord> = records
                    .iter()
                    .filter(|r| !r.maintenance_kind.is_planned())
                    .collect();
                let mtbf_days = if failures.is_empty() {
                    // 窗口内零故障: 以窗口长度作保守下界
                    window_days as f64
                } else {
                    window_days as f64 / failures.len() as f64
                };
                let mttr_hours = if failures.is_empty() {
                    0.0
                } else {
                    failures.iter().map(|r| r.duration_hours).sum::<f64>()
                        / failures.len() as f64
                };

                // 表现率/质量率尚无测点,用配置基线
                let oee = availability
                    * self.baselines.performance_rate
                    * self.baselines.quality_rate;

                let reliability_score = if records.is_empty() {
                    1.0
                } else {
                    records.iter().filter(|r| r.success).count() as f64 / records.len() as f64
                };

                let total_cost: f64 = records.iter().map(|r| r.cost).sum();
                let operating_hours = (window_hours - downtime_hours).max(0.0);
                let cost_per_operating_hour = if operating_hours > 0.0 {
                    total_cost / operating_hours
                } else {
                    0.0
                };

                EquipmentPerformance {
                    equipment_id: eq.equipment_id.clone(),
                    availability,
                    mtbf_days,
                    mttr_hours,
                    oee,
                    reliability_score,
                    cost_per_operating_hour,
                }
            })
            .collect()
    }

    // ==========================================
    // 维护有效性
    // ==========================================

    fn effectiveness(
        &self,
        period: DateRange,
        schedules: &[MaintenanceSchedule],
        equipment: &[Equipment],
    ) -> MaintenanceEffectiveness {
        let total = schedules.len() as u32;
        let completed = schedules
            .iter()
            .filter(|s| s.status == ScheduleStatus::Completed)
            .count() as u32;
        let cancelled = schedules
            .iter()
            .filter(|s| s.status == ScheduleStatus::Cancelled)
            .count() as u32;
        let success_rate = if total > 0 {
            completed as f64 / total as f64
        } else {
            0.0
        };

        // 月度成本趋势 (BTreeMap 保证按月升序)
        let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
        for s in schedules {
            let month = format!(
                "{:04}-{:02}",
                s.scheduled_date.year(),
                s.scheduled_date.month()
            );
            *by_month.entry(month).or_insert(0.0) += s.cost_analysis.total_cost_estimate;
        }

        // 计划内占比按真实维护记录计算
        let records: Vec<&MaintenanceRecord> = equipment
            .iter()
            .flat_map(|e| e.maintenance_history.iter())
            .filter(|r| period.contains(r.performed_date))
            .collect();
        let planned_ratio = if records.is_empty() {
            0.0
        } else {
            records
                .iter()
                .filter(|r| r.maintenance_kind.is_planned())
                .count() as f64
                / records.len() as f64
        };

        MaintenanceEffectiveness {
            total_schedules: total,
            completed,
            cancelled,
            success_rate,
            monthly_cost_trend: by_month
                .into_iter()
                .map(|(month, total_cost)| MonthlyCost { month, total_cost })
                .collect(),
            planned_ratio,
        }
    }

    // ==========================================
    // 预测模型表现
    // ==========================================

    /// 预测-结果配对:
    /// - 预测高风险 = 概率 > 0.5
    /// - 实际失效 = 该设备在排程日期之后的窗口内出现非计划维护记录
    fn model_performance(
        &self,
        period: DateRange,
        schedules: &[MaintenanceSchedule],
        equipment: &[Equipment],
    ) -> ModelPerformance {
        let failures_by_equipment: BTreeMap<&str, Vec<&MaintenanceRecord>> = equipment
            .iter()
            .map(|e| {
                (
                    e.equipment_id.as_str(),
                    e.maintenance_history
                        .iter()
                        .filter(|r| !r.maintenance_kind.is_planned())
                        .filter(|r| period.contains(r.performed_date))
                        .collect(),
                )
            })
            .collect();

        let mut tp = 0u32;
        let mut tn = 0u32;
        let mut fp = 0u32;
        let mut fn_ = 0u32;

        for s in schedules {
            let predicted_high = s.prediction.probability_of_failure > 0.5;
            let actually_failed = failures_by_equipment
                .get(s.equipment_id.as_str())
                .map(|records| {
                    records
                        .iter()
                        .any(|r| r.performed_date >= s.scheduled_date)
                })
                .unwrap_or(false);

            match (predicted_high, actually_failed) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
            }
        }

        let sample_count = tp + tn + fp + fn_;
        if sample_count < MIN_MODEL_SAMPLES {
            // 样本不足: 使用基线并显式标记
            let accuracy = self.baselines.model_accuracy_baseline;
            return ModelPerformance {
                sample_count,
                accuracy,
                false_positive_rate: (1.0 - accuracy) / 2.0,
                false_negative_rate: (1.0 - accuracy) / 2.0,
                drift_detected: accuracy < self.baselines.drift_accuracy_threshold,
                baseline_applied: true,
            };
        }

        let accuracy = (tp + tn) as f64 / sample_count as f64;
        let false_positive_rate = if fp + tn > 0 {
            fp as f64 / (fp + tn) as f64
        } else {
            0.0
        };
        let false_negative_rate = if fn_ + tp > 0 {
            fn_ as f64 / (fn_ + tp) as f64
        } else {
            0.0
        };

        ModelPerformance {
            sample_count,
            accuracy,
            false_positive_rate,
            false_negative_rate,
            drift_detected: accuracy < self.baselines.drift_accuracy_threshold,
            baseline_applied: false,
        }
    }

    // ==========================================
    // 资源利用
    // ==========================================

    fn resource_utilization(
        &self,
        schedules: &[MaintenanceSchedule],
        window_months: f64,
    ) -> ResourceUtilization {
        // 技师: 分派工时 + 效率 (完成数/分派数)
        let mut by_tech: BTreeMap<String, (f64, u32, u32)> = BTreeMap::new();
        for s in schedules {
            for a in &s.assignments {
                let entry = by_tech.entry(a.technician_id.clone()).or_insert((0.0, 0, 0));
                entry.0 += a.estimated_hours;
                entry.1 += 1;
                if s.status == ScheduleStatus::Completed {
                    entry.2 += 1;
                }
            }
        }

        let technician_stats = by_tech
            .into_iter()
            .map(|(technician_id, (assigned_hours, assigned, completed))| {
                TechnicianUtilization {
                    technician_id,
                    assigned_hours,
                    efficiency: if assigned > 0 {
                        completed as f64 / assigned as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect();

        let total_parts: f64 = schedules.iter().map(|s| s.cost_analysis.parts_cost).sum();

        ResourceUtilization {
            technician_stats,
            parts_turnover_per_month: total_parts / window_months,
            // 外协执行数据尚未接入,比例恒为 0 (基线)
            outsourcing_ratio: 0.0,
        }
    }

    // ==========================================
    // SOP 集成指标
    // ==========================================

    fn sop_integration(&self, schedules: &[MaintenanceSchedule]) -> SopIntegrationMetrics {
        let mut procedures: BTreeSet<&str> = BTreeSet::new();
        let mut total_downtime = 0.0;
        let mut recommendations = 0u32;

        for s in schedules {
            for p in &s.sop_impact.affected_procedures {
                procedures.insert(p.procedure_id.as_str());
                total_downtime += p.estimated_downtime_impact_hours;
            }
            recommendations += s.sop_impact.reschedule_recommendations.len() as u32;
        }

        SopIntegrationMetrics {
            procedures_impacted: procedures.len() as u32,
            total_downtime_hours: total_downtime,
            reschedule_recommendations_issued: recommendations,
        }
    }

    // ==========================================
    // 成本收益
    // ==========================================

    fn cost_benefit(&self, schedules: &[MaintenanceSchedule], window_months: f64) -> CostBenefit {
        let total_invested: f64 = schedules
            .iter()
            .map(|s| s.cost_analysis.total_cost_estimate)
            .sum();
        let avoided_reactive_cost: f64 = schedules
            .iter()
            .map(|s| s.cost_analysis.cost_savings_vs_reactive)
            .sum();

        let roi = if total_invested > 0.0 {
            avoided_reactive_cost / total_invested
        } else {
            0.0
        };
        // 回收期: 投入 / (月均避免成本)
        let payback_period_months = if avoided_reactive_cost > 0.0 {
            total_invested / (avoided_reactive_cost / window_months)
        } else {
            0.0
        };

        CostBenefit {
            total_invested,
            avoided_reactive_cost,
            roi,
            payback_period_months,
        }
    }

    // ==========================================
    // 改进机会与对标
    // ==========================================

    fn improvement_opportunities(
        &self,
        performance: &[EquipmentPerformance],
        effectiveness: &MaintenanceEffectiveness,
        model: &ModelPerformance,
    ) -> Vec<ImprovementOpportunity> {
        let mut opportunities = Vec::new();

        // 低可用率设备
        let mut weak: Vec<&EquipmentPerformance> = performance
            .iter()
            .filter(|p| p.availability < self.baselines.benchmark_availability)
            .collect();
        weak.sort_by(|a, b| {
            a.availability
                .partial_cmp(&b.availability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(worst) = weak.first() {
            opportunities.push(ImprovementOpportunity {
                rank: 0,
                title: format!("提升设备 {} 可用率", worst.equipment_id),
                description: format!(
                    "可用率 {:.1}% 低于对标 {:.1}%,建议缩短维修响应并核查备件就位",
                    worst.availability * 100.0,
                    self.baselines.benchmark_availability * 100.0
                ),
                expected_benefit: "可用率提升 2~5 个百分点".to_string(),
            });
        }

        // 计划内占比不足
        if effectiveness.planned_ratio < self.baselines.benchmark_planned_ratio {
            opportunities.push(ImprovementOpportunity {
                rank: 0,
                title: "提高计划内维护占比".to_string(),
                description: format!(
                    "计划内维护占比 {:.1}% 低于对标 {:.1}%,应急维修偏多",
                    effectiveness.planned_ratio * 100.0,
                    self.baselines.benchmark_planned_ratio * 100.0
                ),
                expected_benefit: "降低应急维修成本约 20%".to_string(),
            });
        }

        // 排程完成率不足
        if effectiveness.total_schedules > 0 && effectiveness.success_rate < 0.9 {
            opportunities.push(ImprovementOpportunity {
                rank: 0,
                title: "提升排程执行完成率".to_string(),
                description: format!(
                    "窗口内排程完成率 {:.1}%,存在取消或积压",
                    effectiveness.success_rate * 100.0
                ),
                expected_benefit: "减少改期带来的 SOP 二次影响".to_string(),
            });
        }

        // 模型漂移
        if model.drift_detected {
            opportunities.push(ImprovementOpportunity {
                rank: 0,
                title: "重训失效预测模型".to_string(),
                description: format!(
                    "模型准确率 {:.1}% 低于漂移阈值 {:.1}%",
                    model.accuracy * 100.0,
                    self.baselines.drift_accuracy_threshold * 100.0
                ),
                expected_benefit: "降低误报带来的过度维护".to_string(),
            });
        }

        for (i, op) in opportunities.iter_mut().enumerate() {
            op.rank = (i + 1) as u32;
        }
        opportunities
    }

    fn benchmark_gaps(
        &self,
        performance: &[EquipmentPerformance],
        effectiveness: &MaintenanceEffectiveness,
    ) -> Vec<BenchmarkGap> {
        let avg_availability = if performance.is_empty() {
            0.0
        } else {
            performance.iter().map(|p| p.availability).sum::<f64>() / performance.len() as f64
        };
        let avg_oee = if performance.is_empty() {
            0.0
        } else {
            performance.iter().map(|p| p.oee).sum::<f64>() / performance.len() as f64
        };

        vec![
            BenchmarkGap {
                metric: "availability".to_string(),
                actual: avg_availability,
                benchmark: self.baselines.benchmark_availability,
                gap: avg_availability - self.baselines.benchmark_availability,
            },
            BenchmarkGap {
                metric: "oee".to_string(),
                actual: avg_oee,
                benchmark: self.baselines.benchmark_oee,
                gap: avg_oee - self.baselines.benchmark_oee,
            },
            BenchmarkGap {
                metric: "planned_ratio".to_string(),
                actual: effectiveness.planned_ratio,
                benchmark: self.baselines.benchmark_planned_ratio,
                gap: effectiveness.planned_ratio - self.baselines.benchmark_planned_ratio,
            },
        ]
    }
}
