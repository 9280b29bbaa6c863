use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::models::{FeaturedPolicy, SortMode, ALL_CATEGORIES};

/// 页面级筛选配置，由页面以JSON传入，所有字段都有默认值
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// "全部分类"的保留标签
    #[serde(default = "default_all_label")]
    pub all_label: String,
    /// 初始排序方式
    #[serde(default)]
    pub default_sort: SortMode,
    /// 推荐内容的展示策略
    #[serde(default)]
    pub featured: FeaturedPolicy,
    /// 分页 - 默认每页条数
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            all_label: default_all_label(),
            default_sort: SortMode::default(),
            featured: FeaturedPolicy::default(),
            page_size: default_page_size(),
        }
    }
}

impl FilterConfig {
    /// 解析页面传入的配置；空字符串视为默认配置
    pub fn from_json(json: &str) -> Result<Self> {
        let config = if json.trim().is_empty() {
            Self::default()
        } else {
            serde_json::from_str(json)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.all_label.trim().is_empty() {
            return Err(FilterError::Config("all_label 不能为空".to_string()));
        }
        if self.page_size == 0 {
            return Err(FilterError::Config("page_size 必须大于0".to_string()));
        }
        Ok(())
    }
}

fn default_all_label() -> String {
    ALL_CATEGORIES.to_string()
}

/// 默认每页条数
fn default_page_size() -> usize {
    12
}
