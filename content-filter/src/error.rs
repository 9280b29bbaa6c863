use thiserror::Error;

/// 筛选模块的结果类型
pub type Result<T> = std::result::Result<T, FilterError>;

/// 目录加载与筛选过程中可能出现的错误
#[derive(Error, Debug)]
pub enum FilterError {
    /// 数据源没有任何条目，页面应显示空状态
    #[error("目录为空: 数据源没有任何条目")]
    CatalogEmpty,

    /// 分类不在当前分类索引中
    #[error("未知分类: {0}")]
    UnknownCategory(String),

    /// 不支持的排序方式
    #[error("未知排序方式: {0}")]
    UnknownSortMode(String),

    /// 同一目录中出现重复ID
    #[error("重复的内容ID: {0}")]
    DuplicateId(String),

    /// 条目字段不合法
    #[error("无效条目 {id}: {reason}")]
    InvalidItem { id: String, reason: String },

    /// 已有一次目录加载尚未完成
    #[error("已有目录加载正在进行")]
    LoadInFlight,

    /// 加载凭据不是当前等待中的那一次
    #[error("目录加载凭据已过期")]
    StaleReload,

    #[error("配置无效: {0}")]
    Config(String),

    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("目录包解析失败: {0}")]
    Bundle(#[from] std::io::Error),
}

impl FilterError {
    pub(crate) fn invalid_item(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidItem {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
