// ==========================================
// 预测性维护排程系统 - 分析报表 API
// ==========================================
// 职责: 生成/查询维护分析报表
// 红线: 报表只读聚合 + 追加式落库,不回写任何业务数据
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::analytics::MaintenanceAnalyticsReport;
use crate::domain::types::DateRange;
use crate::engine::analytics::AnalyticsEngine;
use crate::engine::repositories::EngineRepositories;
use crate::repository::analytics_repo::AnalyticsReportRepository;
use crate::repository::contracts::{
    call_with_retry, call_with_timeout, AuditEvent, AuditEventType,
};
use std::sync::Arc;
use tracing::info;

// ==========================================
// AnalyticsApi - 分析报表 API
// ==========================================
pub struct AnalyticsApi {
    engine: AnalyticsEngine,
    repos: EngineRepositories,
    report_repo: Arc<AnalyticsReportRepository>,
    dependency_timeout_ms: u64,
    retry_backoff_ms: u64,
}

impl AnalyticsApi {
    /// 创建新的 AnalyticsApi 实例
    pub fn new(
        engine: AnalyticsEngine,
        repos: EngineRepositories,
        report_repo: Arc<AnalyticsReportRepository>,
        dependency_timeout_ms: u64,
        retry_backoff_ms: u64,
    ) -> Self {
        Self {
            engine,
            repos,
            report_repo,
            dependency_timeout_ms,
            retry_backoff_ms,
        }
    }

    /// 生成分析报表并落库 (追加)
    ///
    /// # 参数
    /// - period: 统计窗口
    /// - operator: 操作人
    pub async fn generate_analytics(
        &self,
        period: DateRange,
        operator: &str,
    ) -> ApiResult<MaintenanceAnalyticsReport> {
        if period.from > period.to {
            return Err(ApiError::Validation(format!(
                "非法统计窗口: from={} > to={}",
                period.from, period.to
            )));
        }

        // 调用时点取数: 排程走自有仓储,设备走台账契约
        let schedules = self.repos.schedule_repo.list_in_window(period)?;
        let registry = &self.repos.equipment_registry;
        let equipment = call_with_retry("equipment-registry", self.retry_backoff_ms, || {
            call_with_timeout(
                "equipment-registry",
                self.dependency_timeout_ms,
                registry.list_equipment(),
            )
        })
        .await?;

        let report = self.engine.generate(period, &schedules, &equipment);

        self.report_repo.insert(&report)?;
        self.repos
            .audit_sink
            .append(AuditEvent::new(
                AuditEventType::AnalyticsReportGenerated,
                &report.report_id,
                operator,
                Some(format!(
                    r#"{{"period_from":"{}","period_to":"{}"}}"#,
                    period.from, period.to
                )),
            ))
            .await?;

        info!(
            report_id = %report.report_id,
            schedule_count = schedules.len(),
            equipment_count = equipment.len(),
            "分析报表已生成并落库"
        );

        Ok(report)
    }

    /// 按ID查询报表
    pub fn get_report(&self, report_id: &str) -> ApiResult<MaintenanceAnalyticsReport> {
        if report_id.trim().is_empty() {
            return Err(ApiError::Validation("报表ID不能为空".to_string()));
        }
        Ok(self.report_repo.find_by_id(report_id)?)
    }

    /// 查询窗口重叠的历史报表
    pub fn list_reports(&self, period: DateRange) -> ApiResult<Vec<MaintenanceAnalyticsReport>> {
        Ok(self.report_repo.list_overlapping(period)?)
    }
}
