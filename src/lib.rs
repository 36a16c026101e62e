// ==========================================
// 预测性维护排程系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (人工最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 注入式配置
pub mod config;

// 数据仓储层 - 数据访问与协作方契约
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// API 层 - 业务接口
pub mod api;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BottleneckKind, DateRange, DegradationTrend, MaintenanceKind, MaintenanceStrategy,
    OptimizationRunStatus, PriorityLevel, RecommendationKind, SafetyRequirement, ScheduleStatus,
    SopCriticality, TriggerKind,
};

// 领域实体
pub use domain::{
    CostAnalysis, Equipment, FailurePrediction, MaintenanceAnalyticsReport, MaintenanceRecord,
    MaintenanceSchedule, MaintenanceTask, ObjectiveWeights, OptimizationConstraints,
    OptimizationRun, SchedulingConstraints, SopImpact, SopProcedure, SparePart, Technician,
    TechnicianAssignment,
};

// 配置
pub use config::{EngineConfig, TaskCatalog};

// 引擎
pub use engine::{
    AnalyticsEngine, AssignmentResolver, CostEstimator, EngineRepositories, FailurePredictor,
    FleetOptimizer, HeuristicPredictor, ScheduleBuilder, ScheduleOptions, SopImpactAnalyzer,
    TaskCatalogEngine, TimingOptimizer,
};

// API
pub use api::{AnalyticsApi, ApiError, ApiResult, MaintenanceApi, OptimizationApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "预测性维护排程系统";

// ==========================================
// 预编译检查
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
