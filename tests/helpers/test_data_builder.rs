// ==========================================
// 集成测试辅助 - 测试数据构造
// ==========================================

use chrono::NaiveDate;
use uuid::Uuid;

use predictive_maint::domain::prediction::FailurePrediction;
use predictive_maint::domain::schedule::{AutomationTrigger, CostAnalysis};
use predictive_maint::domain::sop::{SopDependency, SopImpact};
use predictive_maint::domain::task::TechnicianAssignment;
use predictive_maint::domain::types::{
    DegradationTrend, MaintenanceKind, MaintenanceStrategy, PriorityLevel, ScheduleStatus,
    SopCriticality, TriggerKind,
};
use predictive_maint::domain::{
    Equipment, MaintenanceRecord, MaintenanceSchedule, SchedulingConstraints, SopProcedure,
    Technician,
};

/// 测试基准日期
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

/// 构造设备 (按年龄/使用小时/维护次数)
pub fn equipment(
    equipment_id: &str,
    category: &str,
    age_years: f64,
    usage_hours: f64,
    event_count: usize,
) -> Equipment {
    let install = base_date() - chrono::Duration::days((age_years * 365.25) as i64);
    let history = (0..event_count)
        .map(|i| MaintenanceRecord {
            record_id: format!("{}-R{}", equipment_id, i),
            equipment_id: equipment_id.to_string(),
            maintenance_kind: MaintenanceKind::Preventive,
            performed_date: base_date() - chrono::Duration::days(45 * (i as i64 + 1)),
            duration_hours: 3.0,
            cost: 600.0,
            success: true,
            technician_id: Some("TECH-1".to_string()),
            notes: None,
        })
        .collect();

    Equipment {
        equipment_id: equipment_id.to_string(),
        name: format!("设备{}", equipment_id),
        category: category.to_string(),
        install_date: Some(install),
        usage_hours: Some(usage_hours),
        location: Some("A车间".to_string()),
        maintenance_history: history,
        updated_at: None,
    }
}

/// 构造技师
pub fn technician(technician_id: &str, specs: &[&str]) -> Technician {
    Technician {
        technician_id: technician_id.to_string(),
        name: format!("技师{}", technician_id),
        active: true,
        specializations: specs.iter().map(|s| s.to_string()).collect(),
        hourly_rate: None,
        max_hours_per_day: 8.0,
    }
}

/// 构造依赖单台设备的 SOP
pub fn procedure(
    procedure_id: &str,
    equipment_id: &str,
    criticality: SopCriticality,
) -> SopProcedure {
    SopProcedure {
        procedure_id: procedure_id.to_string(),
        title: format!("程序{}", procedure_id),
        active: true,
        dependencies: vec![SopDependency {
            equipment_id: equipment_id.to_string(),
            criticality,
        }],
    }
}

/// 手工构造排程 (舰队优化场景专用)
///
/// 注意: priority 由 probability 推导,保持红线不变量
pub fn schedule(
    equipment_id: &str,
    category: &str,
    scheduled_date: NaiveDate,
    probability: f64,
    technician_id: &str,
    hours: f64,
) -> MaintenanceSchedule {
    let labor_cost = hours * 75.0;
    let parts_cost = 100.0;
    let operational_cost = (parts_cost + labor_cost) * 0.15;
    let downtime_cost = 200.0;
    let total = parts_cost + labor_cost + operational_cost + downtime_cost;
    let now = base_date().and_hms_opt(8, 0, 0).unwrap();

    MaintenanceSchedule {
        schedule_id: Uuid::new_v4().to_string(),
        equipment_id: equipment_id.to_string(),
        equipment_name: format!("设备{}", equipment_id),
        equipment_category: category.to_string(),
        status: ScheduleStatus::Scheduled,
        priority_level: PriorityLevel::from_probability(probability),
        strategy: MaintenanceStrategy::Hybrid,
        scheduled_date,
        estimated_duration_hours: hours,
        timing_reason: "测试构造".to_string(),
        prediction: FailurePrediction {
            equipment_id: equipment_id.to_string(),
            probability_of_failure: probability,
            remaining_useful_life_days: ((1.0 - probability) * 730.0).max(30.0) as i64,
            trend: DegradationTrend::Stable,
            warning_signals: vec![],
            confidence: 0.7,
            generated_at: now,
        },
        tasks: vec![],
        assignments: vec![TechnicianAssignment {
            technician_id: technician_id.to_string(),
            technician_name: format!("技师{}", technician_id),
            matched_task_ids: vec![],
            estimated_hours: hours,
        }],
        sop_impact: SopImpact::empty(),
        cost_analysis: CostAnalysis {
            parts_cost,
            labor_cost,
            operational_cost,
            downtime_cost,
            total_cost_estimate: total,
            cost_savings_vs_reactive: total * 3.5 - total,
        },
        constraints: SchedulingConstraints::default(),
        automation_trigger: AutomationTrigger {
            trigger_kind: TriggerKind::Calendar,
            threshold: 90.0,
            armed: true,
        },
        created_at: now,
        updated_at: now,
        revision: 0,
    }
}
