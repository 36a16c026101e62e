// ==========================================
// 预测性维护排程系统 - 外部协作方契约
// ==========================================
// 职责: 定义资产台账/技师名录/SOP登记表/审计落点的抽象契约
// 说明: 引擎层只依赖契约,实现方 (真实系统或测试桩) 注入
// 红线: 瞬态失败只重试一次,永久失败立即上抛,绝不静默吞掉
// ==========================================

use crate::domain::equipment::Equipment;
use crate::domain::sop::SopProcedure;
use crate::domain::task::Technician;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::warn;

// ==========================================
// 设备台账 (Equipment Registry)
// ==========================================
/// 设备台账契约 (外部系统拥有设备数据)
#[async_trait]
pub trait EquipmentRegistry: Send + Sync {
    /// 按ID读取设备 (含维护历史)
    async fn get_equipment(&self, equipment_id: &str) -> RepositoryResult<Equipment>;

    /// 读取全部设备
    async fn list_equipment(&self) -> RepositoryResult<Vec<Equipment>>;
}

// ==========================================
// 技师名录 (Technician Directory)
// ==========================================
/// 技师名录契约
#[async_trait]
pub trait TechnicianDirectory: Send + Sync {
    /// 读取在岗技师及其技能
    async fn list_active_technicians(&self) -> RepositoryResult<Vec<Technician>>;
}

// ==========================================
// SOP 登记表 (SOP Registry)
// ==========================================
/// SOP 登记表契约
#[async_trait]
pub trait SopRegistry: Send + Sync {
    /// 读取依赖指定设备的生效程序
    async fn find_procedures_for_equipment(
        &self,
        equipment_id: &str,
    ) -> RepositoryResult<Vec<SopProcedure>>;
}

// ==========================================
// 审计事件与落点 (Audit Event / Sink)
// ==========================================

/// 审计事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    ScheduleCreated,          // 排程创建
    ScheduleStatusChanged,    // 排程状态变更
    OptimizationProposed,     // 优化提案生成
    OptimizationApplied,      // 优化提案应用
    OptimizationRejected,     // 优化提案驳回
    AnalyticsReportGenerated, // 分析报表生成
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEventType::ScheduleCreated => write!(f, "SCHEDULE_CREATED"),
            AuditEventType::ScheduleStatusChanged => write!(f, "SCHEDULE_STATUS_CHANGED"),
            AuditEventType::OptimizationProposed => write!(f, "OPTIMIZATION_PROPOSED"),
            AuditEventType::OptimizationApplied => write!(f, "OPTIMIZATION_APPLIED"),
            AuditEventType::OptimizationRejected => write!(f, "OPTIMIZATION_REJECTED"),
            AuditEventType::AnalyticsReportGenerated => write!(f, "ANALYTICS_REPORT_GENERATED"),
        }
    }
}

/// 审计事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// 事件ID
    pub event_id: String,
    /// 事件类型
    pub event_type: AuditEventType,
    /// 关联实体ID (排程/提案/报表)
    pub entity_id: String,
    /// 操作人
    pub operator: String,
    /// 明细 (JSON)
    pub detail_json: Option<String>,
    /// 发生时间
    pub occurred_at: NaiveDateTime,
}

impl AuditEvent {
    /// 构造审计事件
    pub fn new(
        event_type: AuditEventType,
        entity_id: &str,
        operator: &str,
        detail_json: Option<String>,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            event_type,
            entity_id: entity_id.to_string(),
            operator: operator.to_string(),
            detail_json,
            occurred_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// 审计落点契约 (仅追加)
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// 追加一条审计事件
    async fn append(&self, event: AuditEvent) -> RepositoryResult<()>;
}

// ==========================================
// 瞬态失败重试 (一次, 带退避)
// ==========================================

/// 调用外部依赖,瞬态失败退避后重试一次
///
/// # 参数
/// - collaborator: 协作方名称 (日志/错误上下文)
/// - backoff_ms: 重试前退避毫秒数
/// - call: 调用工厂 (每次产生新 Future)
///
/// # 返回
/// - 首次成功或重试成功的结果
/// - 永久错误立即上抛,不重试
pub async fn call_with_retry<T, F, Fut>(
    collaborator: &str,
    backoff_ms: u64,
    call: F,
) -> RepositoryResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = RepositoryResult<T>>,
{
    match call().await {
        Ok(value) => Ok(value),
        Err(err) if err.is_transient() => {
            warn!(
                collaborator = collaborator,
                backoff_ms = backoff_ms,
                error = %err,
                "外部依赖瞬态失败,退避后重试一次"
            );
            tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
            call().await
        }
        Err(err) => Err(err),
    }
}

/// 带超时调用外部依赖
///
/// 超时折算为 DependencyTimeout (瞬态,可被 call_with_retry 重试)
pub async fn call_with_timeout<T, Fut>(
    collaborator: &str,
    timeout_ms: u64,
    fut: Fut,
) -> RepositoryResult<T>
where
    Fut: Future<Output = RepositoryResult<T>>,
{
    match tokio::time::timeout(std::time::Duration::from_millis(timeout_ms), fut).await {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::DependencyTimeout {
            collaborator: collaborator.to_string(),
            timeout_ms,
        }),
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_once_on_transient() {
        let calls = AtomicU32::new(0);

        let result: RepositoryResult<u32> = call_with_retry("asset-registry", 1, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(RepositoryError::DependencyTimeout {
                        collaborator: "asset-registry".to_string(),
                        timeout_ms: 10,
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry_on_permanent() {
        let calls = AtomicU32::new(0);

        let result: RepositoryResult<u32> = call_with_retry("asset-registry", 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Err(RepositoryError::NotFound {
                    entity: "Equipment".to_string(),
                    id: "EQ-X".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(RepositoryError::NotFound { .. })
        ));
        // 永久错误不重试
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_surfaces_after_second_attempt() {
        let result: RepositoryResult<u32> = call_with_retry("sop-registry", 1, || async {
            Err(RepositoryError::DependencyUnavailable {
                collaborator: "sop-registry".to_string(),
                message: "connection refused".to_string(),
            })
        })
        .await;

        assert!(matches!(
            result,
            Err(RepositoryError::DependencyUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_call_with_timeout() {
        let result: RepositoryResult<u32> = call_with_timeout("directory", 10, async {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Ok(1)
        })
        .await;

        assert!(matches!(
            result,
            Err(RepositoryError::DependencyTimeout { timeout_ms: 10, .. })
        ));
    }
}
