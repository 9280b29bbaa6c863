use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utils_common::models::ContentRecord;

use crate::error::FilterError;

/// "全部分类"的默认标签
pub const ALL_CATEGORIES: &str = "all";

/// 内容条目 - 目录中的一条可展示内容，附带预先计算的搜索文本
#[derive(Clone, Debug, PartialEq)]
pub struct ContentItem {
    record: ContentRecord,
    /// 标题 + 摘要 + 标签的小写拼接
    searchable_text: String,
}

/// 对外只输出原始记录的字段，保持普通结构体形式
impl Serialize for ContentItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}

impl ContentItem {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn summary(&self) -> &str {
        &self.record.summary
    }

    pub fn category(&self) -> &str {
        &self.record.category
    }

    pub fn tags(&self) -> &[String] {
        &self.record.tags
    }

    pub fn sortable_date(&self) -> Option<DateTime<Utc>> {
        self.record.date
    }

    pub fn popularity_score(&self) -> f64 {
        self.record.popularity
    }

    pub fn featured(&self) -> bool {
        self.record.featured
    }

    pub fn url(&self) -> Option<&str> {
        self.record.url.as_deref()
    }

    pub fn searchable_text(&self) -> &str {
        &self.searchable_text
    }

    pub fn record(&self) -> &ContentRecord {
        &self.record
    }

    /// `query` 必须已经转为小写
    pub(crate) fn matches_query(&self, query: &str) -> bool {
        self.searchable_text.contains(query)
    }
}

impl From<ContentRecord> for ContentItem {
    fn from(mut record: ContentRecord) -> Self {
        // -0.0 与 0.0 在排序中必须视为相等
        if record.popularity == 0.0 {
            record.popularity = 0.0;
        }

        let mut searchable_text = String::with_capacity(record.title.len() + record.summary.len() + 32);
        searchable_text.push_str(&record.title);
        searchable_text.push(' ');
        searchable_text.push_str(&record.summary);
        for tag in &record.tags {
            searchable_text.push(' ');
            searchable_text.push_str(tag);
        }

        Self {
            searchable_text: searchable_text.to_lowercase(),
            record,
        }
    }
}

/// 分类筛选条件
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// 不按分类筛选
    #[default]
    All,
    /// 只保留该分类（区分大小写）
    Named(String),
}

impl CategoryFilter {
    /// 把页面传来的标签解析为筛选条件，`all_label` 为"全部"的保留值
    pub fn parse(label: &str, all_label: &str) -> Self {
        if label == all_label {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(label.to_string())
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => name == category,
        }
    }

    pub fn label<'a>(&'a self, all_label: &'a str) -> &'a str {
        match self {
            CategoryFilter::All => all_label,
            CategoryFilter::Named(name) => name,
        }
    }
}

/// 排序方式
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// 按日期从新到旧，无日期的排在最后
    #[default]
    #[serde(alias = "newest")]
    Latest,
    /// 按热度从高到低
    Popular,
    /// 按日期从旧到新，无日期的排在最后
    Oldest,
    /// 按标题字母顺序
    #[serde(alias = "title_asc")]
    Title,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Latest => "latest",
            SortMode::Popular => "popular",
            SortMode::Oldest => "oldest",
            SortMode::Title => "title",
        }
    }
}

impl FromStr for SortMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" | "newest" => Ok(SortMode::Latest),
            "popular" => Ok(SortMode::Popular),
            "oldest" => Ok(SortMode::Oldest),
            "title" | "title_asc" => Ok(SortMode::Title),
            other => Err(FilterError::UnknownSortMode(other.to_string())),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 推荐内容的展示策略，由页面决定
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeaturedPolicy {
    /// 推荐内容与普通内容一起出现在列表中
    #[default]
    Inline,
    /// 推荐内容单独展示，不进入普通列表
    Separate,
}

impl FeaturedPolicy {
    pub(crate) fn admits(&self, item: &ContentItem) -> bool {
        match self {
            FeaturedPolicy::Inline => true,
            FeaturedPolicy::Separate => !item.featured(),
        }
    }
}

/// 筛选状态 - 当前选中的分类、搜索词和排序方式
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FilterState {
    pub active_category: CategoryFilter,
    pub search_query: String,
    pub sort_mode: SortMode,
}

impl FilterState {
    pub fn new(sort_mode: SortMode) -> Self {
        Self {
            active_category: CategoryFilter::All,
            search_query: String::new(),
            sort_mode,
        }
    }
}

/// 分类分面 - 用于渲染分类按钮
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CategoryFacet {
    /// 分类名，或"全部"的保留值
    pub label: String,
    /// 该分类下的条目数
    pub count: usize,
    /// 是否为"全部"分面
    pub all: bool,
}

/// 标签计数 - 用于渲染话题云
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// 分页结果 - 对当前结果列表的一页切片
#[derive(Serialize, Clone, Debug)]
pub struct ResultPage {
    /// 当前页的条目
    pub items: Vec<ContentItem>,
    /// 结果总数
    pub total: usize,
    /// 当前页码（从1开始）
    pub page: usize,
    /// 每页条数
    pub limit: usize,
    /// 总页数
    pub total_pages: usize,
}

impl ResultPage {
    /// 对结果切片分页，页码被限制在有效范围内
    pub fn paginate(results: &[ContentItem], page: usize, limit: usize) -> Self {
        let limit = limit.max(1);
        let total = results.len();
        let total_pages = total.div_ceil(limit);
        let page = page.max(1).min(total_pages.max(1));

        let start = (page - 1) * limit;
        let end = (start + limit).min(total);

        let items = if start < total {
            results[start..end].to_vec()
        } else {
            Vec::new()
        };

        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}
