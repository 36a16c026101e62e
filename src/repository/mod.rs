// ==========================================
// 预测性维护排程系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 组成: 外部协作方契约 (async trait) + 自有聚合的 SQLite 仓储
// ==========================================

pub mod analytics_repo;
pub mod audit_log;
pub mod contracts;
pub mod error;
pub mod optimization_repo;
pub mod schedule_repo;

pub use analytics_repo::AnalyticsReportRepository;
pub use audit_log::SqliteAuditLog;
pub use contracts::{
    call_with_retry, call_with_timeout, AuditEvent, AuditEventType, AuditSink, EquipmentRegistry,
    SopRegistry, TechnicianDirectory,
};
pub use error::{RepositoryError, RepositoryResult};
pub use optimization_repo::OptimizationRunRepository;
pub use schedule_repo::ScheduleRepository;
