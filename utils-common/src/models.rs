use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 内容记录 - 页面提供的原始内容条目（博客文章、作品案例或服务项目）
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContentRecord {
    /// 内容唯一标识符
    pub id: String,
    /// 展示标题
    pub title: String,
    /// 摘要或描述
    #[serde(default, alias = "excerpt", alias = "description")]
    pub summary: String,
    /// 所属分类（每条内容只属于一个分类）
    pub category: String,
    /// 自由标签，仅用于搜索
    #[serde(default)]
    pub tags: Vec<String>,
    /// 发布日期，用于"最新"排序
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// 热度（点赞数等），用于"最热"排序
    #[serde(default, alias = "likes")]
    pub popularity: f64,
    /// 是否为推荐内容
    #[serde(default)]
    pub featured: bool,
    /// 内容链接
    #[serde(default)]
    pub url: Option<String>,
}

impl ContentRecord {
    /// 创建只包含必填字段的记录
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: String::new(),
            category: category.into(),
            tags: Vec::new(),
            date: None,
            popularity: 0.0,
            featured: false,
            url: None,
        }
    }
}

/// 目录元数据 - 记录打包时的基本信息
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CatalogMetadata {
    /// 目录名称（通常是页面名，如 blog）
    pub name: String,
    /// 条目数量
    pub item_count: usize,
    /// 分类数量
    pub category_count: usize,
    /// 打包时间
    pub created_at: DateTime<Utc>,
    /// 格式版本
    pub version: String,
}

/// 目录包 - 写入 .catalog.bin 文件的完整内容
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CatalogBundle {
    pub metadata: CatalogMetadata,
    pub records: Vec<ContentRecord>,
}
