// ==========================================
// 预测性维护排程系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod analytics;
pub mod assignment;
pub mod builder;
pub mod cost;
pub mod error;
pub mod fleet;
pub mod predictor;
pub mod repositories;
pub mod sop_impact;
pub mod task_catalog;
pub mod timing;

// 重导出核心引擎
pub use analytics::AnalyticsEngine;
pub use assignment::AssignmentResolver;
pub use builder::{
    BatchScheduleOutcome, BuildError, ScheduleBuilder, ScheduleFailure, ScheduleOptions,
};
pub use cost::CostEstimator;
pub use error::{EngineError, EngineResult};
pub use fleet::{snapshot_fingerprint, ApplyOutcome, FleetOptimizer};
pub use predictor::{FailurePredictor, HeuristicPredictor};
pub use repositories::EngineRepositories;
pub use sop_impact::SopImpactAnalyzer;
pub use task_catalog::TaskCatalogEngine;
pub use timing::{TimingOptimizer, TimingPlan};
