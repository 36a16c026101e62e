// ==========================================
// 预测性维护排程系统 - API 层
// ==========================================
// 职责: 对外业务接口 (入参校验 / 错误信封 / DTO)
// ==========================================

pub mod analytics_api;
pub mod error;
pub mod maintenance_api;
pub mod optimization_api;

pub use analytics_api::AnalyticsApi;
pub use error::{ApiError, ApiResult, ErrorEnvelope};
pub use maintenance_api::{
    BatchSummary, CreateSchedulesResponse, GetSchedulesRequest, GetSchedulesResponse,
    MaintenanceApi, PredictFailuresResponse, ScheduleQuerySummary,
};
pub use optimization_api::{OptimizationApi, OptimizeRequest};
