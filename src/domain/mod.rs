// ==========================================
// 预测性维护排程系统 - 领域层
// ==========================================
// 职责: 实体与类型定义,不含业务规则计算
// ==========================================

pub mod analytics;
pub mod equipment;
pub mod optimization;
pub mod prediction;
pub mod schedule;
pub mod sop;
pub mod task;
pub mod types;

// 重导出常用实体
pub use analytics::MaintenanceAnalyticsReport;
pub use equipment::{Equipment, MaintenanceRecord};
pub use optimization::{
    ObjectiveWeights, OptimizationConstraints, OptimizationRecommendation, OptimizationRun,
    ProposalValidation,
};
pub use prediction::{FailurePrediction, WarningSignal};
pub use schedule::{
    AutomationTrigger, CostAnalysis, MaintenanceSchedule, SchedulingConstraints,
};
pub use sop::{SopImpact, SopProcedure};
pub use task::{MaintenanceTask, SparePart, Technician, TechnicianAssignment};
