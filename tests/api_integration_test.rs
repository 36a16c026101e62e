// ==========================================
// API 层集成测试
// ==========================================
// 测试目标: 入参校验 / 稳定错误类别 / 状态流转 / 乐观锁 / 查询
// ==========================================

mod helpers;

use helpers::test_data_builder as data;
use helpers::ApiTestEnv;

use chrono::NaiveDate;
use predictive_maint::api::GetSchedulesRequest;
use predictive_maint::domain::types::{DateRange, PriorityLevel, ScheduleStatus};
use predictive_maint::engine::ScheduleOptions;

fn seeded_env() -> ApiTestEnv {
    let env = ApiTestEnv::setup();
    env.equipment_registry
        .put(data::equipment("EQ-001", "PUMP", 12.0, 25000.0, 1));
    env.equipment_registry
        .put(data::equipment("EQ-002", "MOTOR", 1.0, 500.0, 4));
    env.technician_directory
        .put(data::technician("TECH-1", &["mechanical"]));
    env
}

// ==========================================
// 失效预测接口
// ==========================================

#[tokio::test]
async fn test_predict_failures_envelope() {
    let env = seeded_env();

    let response = env
        .maintenance_api
        .predict_failures(
            &[
                "EQ-001".to_string(),
                "EQ-404".to_string(),
                "EQ-002".to_string(),
            ],
            data::base_date(),
        )
        .await
        .unwrap();

    assert_eq!(response.summary.requested, 3);
    assert_eq!(response.summary.succeeded, 2);
    assert_eq!(response.summary.failed, 1);
    assert_eq!(response.summary.failures[0].kind, "NOT_FOUND");

    // 老旧设备: 概率逼近 0.8 上限,快速劣化
    let worn = &response.predictions[0];
    assert!((worn.probability_of_failure - 0.7867).abs() < 0.001);
    assert_eq!(worn.trend.to_string(), "RAPID_DECLINE");
    assert_eq!(
        PriorityLevel::from_probability(worn.probability_of_failure),
        PriorityLevel::High
    );

    // 新设备: 概率接近 0,RUL 远高于 30 天下限
    let fresh = &response.predictions[1];
    assert!(fresh.probability_of_failure < 0.15);
    assert!(fresh.remaining_useful_life_days > 600);
    assert_eq!(
        PriorityLevel::from_probability(fresh.probability_of_failure),
        PriorityLevel::Low
    );
}

#[tokio::test]
async fn test_predict_failures_empty_input_rejected() {
    let env = seeded_env();
    let err = env
        .maintenance_api
        .predict_failures(&[], data::base_date())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "VALIDATION_ERROR");
    let envelope = err.to_envelope();
    assert_eq!(envelope.kind, "VALIDATION_ERROR");
    assert!(!envelope.message.is_empty());
}

#[tokio::test]
async fn test_create_schedules_empty_input_rejected() {
    let env = seeded_env();
    let err = env
        .maintenance_api
        .create_schedules_at(&[], &ScheduleOptions::default(), data::base_date())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_ERROR");
}

// ==========================================
// 查询接口
// ==========================================

#[tokio::test]
async fn test_get_schedules_with_filters_and_predictions() {
    let env = seeded_env();
    env.maintenance_api
        .create_schedules_at(
            &["EQ-001".to_string(), "EQ-002".to_string()],
            &ScheduleOptions::default(),
            data::base_date(),
        )
        .await
        .unwrap();

    // 按设备过滤
    let response = env
        .maintenance_api
        .get_schedules(
            &GetSchedulesRequest {
                equipment_ids: Some(vec!["EQ-001".to_string()]),
                date_range: None,
                include_predictions: true,
            },
            data::base_date(),
        )
        .await
        .unwrap();

    assert_eq!(response.summary.total, 1);
    assert_eq!(response.schedules[0].equipment_id, "EQ-001");
    assert_eq!(response.summary.by_status.get("SCHEDULED"), Some(&1));
    assert!(response.summary.total_cost > 0.0);

    let predictions = response.predictions.unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].equipment_id, "EQ-001");

    // 日期窗口过滤: 排程日期落在 [today+7, today+97] 内
    let range = DateRange::new(
        data::base_date(),
        data::base_date() + chrono::Duration::days(120),
    )
    .unwrap();
    let windowed = env
        .maintenance_api
        .get_schedules(
            &GetSchedulesRequest {
                equipment_ids: None,
                date_range: Some(range),
                include_predictions: false,
            },
            data::base_date(),
        )
        .await
        .unwrap();
    assert_eq!(windowed.summary.total, 2);
    assert!(windowed.predictions.is_none());

    // 空过滤列表是入参错误 (不过滤请传 None)
    let err = env
        .maintenance_api
        .get_schedules(
            &GetSchedulesRequest {
                equipment_ids: Some(vec![]),
                date_range: None,
                include_predictions: false,
            },
            data::base_date(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_ERROR");
}

// ==========================================
// 状态流转与乐观锁
// ==========================================

#[tokio::test]
async fn test_status_workflow_and_optimistic_lock() {
    let env = seeded_env();
    let created = env
        .maintenance_api
        .create_schedules_at(
            &["EQ-002".to_string()],
            &ScheduleOptions::default(),
            data::base_date(),
        )
        .await
        .unwrap();
    let schedule_id = created.schedules[0].schedule_id.clone();

    // SCHEDULED → IN_PROGRESS
    let in_progress = env
        .maintenance_api
        .update_schedule_status(&schedule_id, ScheduleStatus::InProgress, 0, "operator")
        .await
        .unwrap();
    assert_eq!(in_progress.status, ScheduleStatus::InProgress);
    assert_eq!(in_progress.revision, 1);

    // 过期修订号 → 乐观锁冲突
    let err = env
        .maintenance_api
        .update_schedule_status(&schedule_id, ScheduleStatus::Completed, 0, "operator")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "CONFLICT_ERROR");

    // 非法转换: IN_PROGRESS → RESCHEDULED
    let err = env
        .maintenance_api
        .update_schedule_status(&schedule_id, ScheduleStatus::Rescheduled, 1, "operator")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "CONFLICT_ERROR");

    // IN_PROGRESS → COMPLETED (终态)
    let completed = env
        .maintenance_api
        .update_schedule_status(&schedule_id, ScheduleStatus::Completed, 1, "operator")
        .await
        .unwrap();
    assert_eq!(completed.status, ScheduleStatus::Completed);
    assert_eq!(completed.revision, 2);

    // 终态不可再转换
    let err = env
        .maintenance_api
        .update_schedule_status(&schedule_id, ScheduleStatus::Scheduled, 2, "operator")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "CONFLICT_ERROR");

    // 不存在的排程
    let err = env
        .maintenance_api
        .update_schedule_status("SCH-404", ScheduleStatus::Cancelled, 0, "operator")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}

// ==========================================
// 成本不变量 (全量排程)
// ==========================================

#[tokio::test]
async fn test_every_schedule_reconciles_costs_exactly() {
    let env = seeded_env();
    env.sop_registry.put(data::procedure(
        "SOP-001",
        "EQ-001",
        predictive_maint::domain::types::SopCriticality::Critical,
    ));

    let created = env
        .maintenance_api
        .create_schedules_at(
            &["EQ-001".to_string(), "EQ-002".to_string()],
            &ScheduleOptions::default(),
            data::base_date(),
        )
        .await
        .unwrap();

    for schedule in &created.schedules {
        let c = &schedule.cost_analysis;
        assert_eq!(
            c.total_cost_estimate,
            c.parts_cost + c.labor_cost + c.operational_cost + c.downtime_cost,
            "排程 {} 成本对账失败",
            schedule.schedule_id
        );
        assert_eq!(
            c.cost_savings_vs_reactive,
            c.total_cost_estimate * 3.5 - c.total_cost_estimate
        );
    }
}
