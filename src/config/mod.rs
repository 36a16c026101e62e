// ==========================================
// 预测性维护排程系统 - 配置层
// ==========================================
// 职责: 注入式配置 (引擎参数 + 任务目录)
// ==========================================

pub mod catalog;
pub mod params;

pub use catalog::{TaskCatalog, TaskTemplate};
pub use params::{
    AnalyticsBaselines, BatchParams, CatalogParams, CostParams, EngineConfig, PredictorParams,
    SopParams, TimingParams,
};
