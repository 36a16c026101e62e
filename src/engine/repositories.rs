// ==========================================
// 预测性维护排程系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合排程引擎所需的协作方契约与自有仓储
// 目标: 减少 ScheduleBuilder 的构造函数参数数量
// ==========================================

use std::sync::Arc;

use crate::repository::contracts::{AuditSink, EquipmentRegistry, SopRegistry, TechnicianDirectory};
use crate::repository::schedule_repo::ScheduleRepository;

/// 排程引擎仓储集合
///
/// 外部协作方以契约注入 (真实系统或测试桩均可),
/// 自有聚合走 SQLite 仓储。
#[derive(Clone)]
pub struct EngineRepositories {
    /// 设备台账
    pub equipment_registry: Arc<dyn EquipmentRegistry>,
    /// 技师名录
    pub technician_directory: Arc<dyn TechnicianDirectory>,
    /// SOP 登记表
    pub sop_registry: Arc<dyn SopRegistry>,
    /// 排程仓储
    pub schedule_repo: Arc<ScheduleRepository>,
    /// 审计落点
    pub audit_sink: Arc<dyn AuditSink>,
}

impl EngineRepositories {
    /// 创建新的仓储集合
    pub fn new(
        equipment_registry: Arc<dyn EquipmentRegistry>,
        technician_directory: Arc<dyn TechnicianDirectory>,
        sop_registry: Arc<dyn SopRegistry>,
        schedule_repo: Arc<ScheduleRepository>,
        audit_sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            equipment_registry,
            technician_directory,
            sop_registry,
            schedule_repo,
            audit_sink,
        }
    }
}

// 注: 聚合结构体的正确性由 ScheduleBuilder 的集成测试覆盖。
