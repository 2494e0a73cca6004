use thiserror::Error;

/// 汇总服务错误
///
/// 计算本身不会失败, 这里只覆盖存储读写、会话查找和输入校验。
#[derive(Debug, Error)]
pub enum RecapError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("work {0} not found")]
    WorkNotFound(i64),
    #[error("no recap session loaded for work {0}")]
    SessionNotFound(i64),
    #[error("subwork {subwork_id} does not belong to work {work_id}")]
    SubworkNotFound { work_id: i64, subwork_id: i64 },
    #[error("tax entry {0} not found")]
    TaxNotFound(i64),
    #[error("tax entry {0} already exists")]
    DuplicateTax(i64),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

pub type RecapResult<T> = Result<T, RecapError>;

impl RecapError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RecapError::WorkNotFound(_)
                | RecapError::SessionNotFound(_)
                | RecapError::SubworkNotFound { .. }
                | RecapError::TaxNotFound(_)
        )
    }

    /// 调用方输入有误 (非存储故障)
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RecapError::DuplicateTax(_))
    }
}
