// ==========================================
// 预测性维护排程系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换底层错误为稳定的机器可读类别
// 红线: 对外只暴露 kind + message,内部堆栈不越过边界
// ==========================================

use crate::engine::builder::BuildError;
use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
///
/// 每个变体对应一个稳定的机器可读 kind
#[derive(Error, Debug)]
pub enum ApiError {
    /// 入参非法 / 为空
    #[error("无效输入: {0}")]
    Validation(String),

    /// 设备/技师/SOP/排程等引用不存在
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 外部协作方不可用或超时
    #[error("外部依赖失败: {0}")]
    Dependency(String),

    /// 管线中段不变量被破坏
    #[error("计算错误: {0}")]
    Computation(String),

    /// 乐观并发冲突 (快照过期 / 修订号不匹配)
    #[error("并发冲突: {0}")]
    Conflict(String),

    /// 其他内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 稳定的机器可读错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Dependency(_) => "DEPENDENCY_ERROR",
            ApiError::Computation(_) => "COMPUTATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 转换为对外信封
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            kind: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// 对外错误信封 (kind 稳定,message 可读)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub kind: String,
    pub message: String,
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::Validation(msg),
            RepositoryError::DependencyUnavailable { collaborator, message } => {
                ApiError::Dependency(format!("{}: {}", collaborator, message))
            }
            RepositoryError::DependencyTimeout { collaborator, timeout_ms } => {
                ApiError::Dependency(format!("{} 超时 ({}ms)", collaborator, timeout_ms))
            }
            RepositoryError::OptimisticLockFailure {
                entity_id,
                expected,
                actual,
            } => ApiError::Conflict(format!(
                "{} 已被其他操作修改 (期望 revision={},实际 revision={})",
                entity_id, expected, actual
            )),
            RepositoryError::VersionConflict { message } => ApiError::Conflict(message),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::Conflict(format!("非法状态转换: {} → {}", from, to))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// ==========================================
// 从 EngineError / BuildError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Computation { .. } => ApiError::Computation(err.to_string()),
            EngineError::InvalidInput(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Repository(e) => e.into(),
            BuildError::Engine(e) => e.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ApiError::Validation("x".into()).kind(), "VALIDATION_ERROR");
        assert_eq!(ApiError::NotFound("x".into()).kind(), "NOT_FOUND");
        assert_eq!(ApiError::Dependency("x".into()).kind(), "DEPENDENCY_ERROR");
        assert_eq!(ApiError::Computation("x".into()).kind(), "COMPUTATION_ERROR");
        assert_eq!(ApiError::Conflict("x".into()).kind(), "CONFLICT_ERROR");
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "Equipment".to_string(),
            id: "EQ-404".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "NOT_FOUND");
        assert!(err.to_string().contains("EQ-404"));

        let err: ApiError = RepositoryError::VersionConflict {
            message: "快照过期".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "CONFLICT_ERROR");

        let err: ApiError = RepositoryError::DependencyTimeout {
            collaborator: "sop-registry".to_string(),
            timeout_ms: 5000,
        }
        .into();
        assert_eq!(err.kind(), "DEPENDENCY_ERROR");
    }

    #[test]
    fn test_envelope_has_no_internal_details() {
        let err = ApiError::Internal("rusqlite::Error at row 17".to_string());
        let envelope = err.to_envelope();
        assert_eq!(envelope.kind, "INTERNAL_ERROR");
        assert!(!envelope.kind.contains("rusqlite"));
    }
}
