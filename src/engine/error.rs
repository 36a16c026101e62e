// ==========================================
// 预测性维护排程系统 - 引擎层错误类型
// ==========================================
// 红线: 计算错误 (管线中段不变量被破坏) 对该工作单元致命,
//       必须带完整输入上下文记录日志,绝不回退成缺省值
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 计算不变量被破坏 (如负 RUL、成本对账失败)
    #[error("计算错误: {message} (context: {context})")]
    Computation { message: String, context: String },

    /// 引擎输入非法
    #[error("引擎输入非法: {0}")]
    InvalidInput(String),
}

impl EngineError {
    /// 构造计算错误 (context 携带完整输入快照)
    pub fn computation(message: impl Into<String>, context: impl Into<String>) -> Self {
        EngineError::Computation {
            message: message.into(),
            context: context.into(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
