// ==========================================
// ScheduleBuilder 排程构建集成测试
// ==========================================
// 测试目标: 单台构建管线 / 批量部分失败隔离 / 确定性
// ==========================================

mod helpers;

use helpers::test_data_builder as data;
use helpers::ApiTestEnv;

use predictive_maint::domain::types::{
    MaintenanceStrategy, PriorityLevel, SafetyRequirement, ScheduleStatus, SopCriticality,
};
use predictive_maint::engine::ScheduleOptions;

/// 标准测试环境: 三台设备 + 两名技师 + 一条关键 SOP
fn seeded_env() -> ApiTestEnv {
    let env = ApiTestEnv::setup();

    env.equipment_registry
        .put(data::equipment("EQ-001", "PUMP", 12.0, 25000.0, 1));
    env.equipment_registry
        .put(data::equipment("EQ-002", "MOTOR", 2.0, 3000.0, 4));
    env.equipment_registry
        .put(data::equipment("EQ-003", "HVAC", 5.0, 8000.0, 3));

    env.technician_directory
        .put(data::technician("TECH-1", &["mechanical"]));
    env.technician_directory
        .put(data::technician("TECH-2", &["electrical", "hvac"]));

    env.sop_registry
        .put(data::procedure("SOP-001", "EQ-001", SopCriticality::Critical));
    env.sop_registry
        .put(data::procedure("SOP-002", "EQ-001", SopCriticality::Moderate));

    env
}

#[tokio::test]
async fn test_create_schedule_full_pipeline() {
    let env = seeded_env();
    let options = ScheduleOptions::default();

    let response = env
        .maintenance_api
        .create_schedules_at(&["EQ-001".to_string()], &options, data::base_date())
        .await
        .unwrap();

    assert_eq!(response.summary.succeeded, 1);
    let schedule = &response.schedules[0];

    // 状态与策略
    assert_eq!(schedule.status, ScheduleStatus::Scheduled);
    assert_eq!(schedule.strategy, MaintenanceStrategy::Hybrid);

    // 优先级红线: 由失效概率唯一推导
    assert_eq!(
        schedule.priority_level,
        PriorityLevel::from_probability(schedule.prediction.probability_of_failure)
    );
    // 老旧高负荷设备: 概率逼近 0.8 上限 → HIGH
    assert!(schedule.prediction.probability_of_failure > 0.75);
    assert_eq!(schedule.priority_level, PriorityLevel::High);

    // 提前期红线
    assert!(schedule.scheduled_date >= data::base_date() + chrono::Duration::days(7));

    // 高概率追加关键部件更换任务
    let last_task = schedule.tasks.last().unwrap();
    assert_eq!(last_task.name, "关键部件更换");
    assert!(last_task.parts_cost() > 0.0);
    assert!(last_task
        .safety_requirements
        .contains(&SafetyRequirement::LockoutTagout));
    assert!(schedule.task_ids_unique());

    // 技师分派: 机械技师匹配泵类任务
    assert!(schedule
        .assignments
        .iter()
        .any(|a| a.technician_id == "TECH-1"));

    // SOP 影响: 关键依赖产生改期建议
    assert_eq!(schedule.sop_impact.reschedule_recommendations.len(), 1);
    assert!(schedule.sop_impact.operational_impact_score > 0.0);

    // 成本精确对账
    let cost = &schedule.cost_analysis;
    assert_eq!(
        cost.total_cost_estimate,
        cost.parts_cost + cost.labor_cost + cost.operational_cost + cost.downtime_cost
    );
    assert_eq!(cost.downtime_cost, schedule.sop_impact.revenue_impact_estimate);

    // 已持久化
    let persisted = env.schedule_repo.find_by_id(&schedule.schedule_id).unwrap();
    assert_eq!(persisted.equipment_id, "EQ-001");
    assert_eq!(persisted.revision, 0);

    // 审计事件已落
    let events = env.audit_log.list_recent(10).unwrap();
    assert!(!events.is_empty());
}

#[tokio::test]
async fn test_batch_partial_failure_isolation() {
    let env = seeded_env();
    let ids = vec![
        "EQ-001".to_string(),
        "EQ-MISSING".to_string(),
        "EQ-002".to_string(),
    ];

    let response = env
        .maintenance_api
        .create_schedules_at(&ids, &ScheduleOptions::default(), data::base_date())
        .await
        .unwrap();

    // 批量绝不整体中止: 两成一败
    assert_eq!(response.summary.requested, 3);
    assert_eq!(response.summary.succeeded, 2);
    assert_eq!(response.summary.failed, 1);

    let equipment_ids: Vec<&str> = response
        .schedules
        .iter()
        .map(|s| s.equipment_id.as_str())
        .collect();
    assert_eq!(equipment_ids, vec!["EQ-001", "EQ-002"]);

    let failure = &response.summary.failures[0];
    assert_eq!(failure.equipment_id, "EQ-MISSING");
    assert_eq!(failure.kind, "NOT_FOUND");
    assert!(failure.message.contains("EQ-MISSING"));
}

#[tokio::test]
async fn test_deterministic_rebuild_same_inputs() {
    let env = seeded_env();
    let ids = vec!["EQ-001".to_string(), "EQ-002".to_string()];
    let options = ScheduleOptions::default();

    let first = env
        .maintenance_api
        .create_schedules_at(&ids, &options, data::base_date())
        .await
        .unwrap();
    let second = env
        .maintenance_api
        .create_schedules_at(&ids, &options, data::base_date())
        .await
        .unwrap();

    // 同一输入快照两次构建: 语义内容 (日期/任务/成本/优先级) 完全一致
    assert_eq!(first.schedules.len(), second.schedules.len());
    for (a, b) in first.schedules.iter().zip(second.schedules.iter()) {
        assert_eq!(a.semantic_key(), b.semantic_key());
    }
}

#[tokio::test]
async fn test_all_strategies_respect_min_lead() {
    let env = seeded_env();

    for strategy in [
        MaintenanceStrategy::ConditionBased,
        MaintenanceStrategy::TimeBased,
        MaintenanceStrategy::Hybrid,
    ] {
        let options = ScheduleOptions {
            strategy,
            ..Default::default()
        };
        let response = env
            .maintenance_api
            .create_schedules_at(
                &["EQ-001".to_string(), "EQ-002".to_string(), "EQ-003".to_string()],
                &options,
                data::base_date(),
            )
            .await
            .unwrap();

        assert_eq!(response.summary.failed, 0);
        for schedule in &response.schedules {
            assert!(
                schedule.scheduled_date >= data::base_date() + chrono::Duration::days(7),
                "策略 {:?} 的排程 {} 违反 7 天提前期",
                strategy,
                schedule.schedule_id
            );
            assert!(schedule.prediction.remaining_useful_life_days >= 30);
            assert!((0.0..=1.0).contains(&schedule.prediction.probability_of_failure));
        }
    }
}

#[tokio::test]
async fn test_transient_registry_failure_recovers_via_retry() {
    let env = seeded_env();

    // 注入一次瞬态故障: 重试一次后应成功
    env.equipment_registry.fail_next_call_transiently();

    let response = env
        .maintenance_api
        .create_schedules_at(
            &["EQ-002".to_string()],
            &ScheduleOptions::default(),
            data::base_date(),
        )
        .await
        .unwrap();

    assert_eq!(response.summary.succeeded, 1);
    assert_eq!(response.summary.failed, 0);
}

#[tokio::test]
async fn test_unknown_category_falls_back_to_generic_tasks() {
    let env = seeded_env();
    env.equipment_registry
        .put(data::equipment("EQ-X", "SIEVE_SHAKER", 3.0, 2000.0, 4));

    let response = env
        .maintenance_api
        .create_schedules_at(
            &["EQ-X".to_string()],
            &ScheduleOptions::default(),
            data::base_date(),
        )
        .await
        .unwrap();

    let schedule = &response.schedules[0];
    // 低风险未知类别: 兜底两件套 {点检, 清洁}
    assert_eq!(schedule.tasks.len(), 2);
    assert_eq!(schedule.tasks[0].name, "设备点检");
}
