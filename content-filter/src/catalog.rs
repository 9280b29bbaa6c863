use std::collections::HashSet;
use std::marker::PhantomData;

use utils_common::compression::from_compressed;
use utils_common::models::{CatalogBundle, ContentRecord};

use crate::error::{FilterError, Result};
use crate::models::{ContentItem, ALL_CATEGORIES};
use crate::pages::PageRecord;

/// 目录数据源 - 页面提供内容记录的方式
pub trait CatalogSource {
    /// 读取全部记录，保持源顺序
    fn records(&self) -> Result<Vec<ContentRecord>>;
}

/// 内存中的静态记录（页面字面量）
pub struct StaticSource(pub Vec<ContentRecord>);

impl CatalogSource for StaticSource {
    fn records(&self) -> Result<Vec<ContentRecord>> {
        Ok(self.0.clone())
    }
}

/// JSON数组形式的记录
pub struct JsonSource<'a>(pub &'a str);

impl CatalogSource for JsonSource<'_> {
    fn records(&self) -> Result<Vec<ContentRecord>> {
        Ok(serde_json::from_str(self.0)?)
    }
}

/// catalog-builder 生成的压缩目录包
pub struct BundleSource<'a>(pub &'a [u8]);

impl CatalogSource for BundleSource<'_> {
    fn records(&self) -> Result<Vec<ContentRecord>> {
        let bundle: CatalogBundle = from_compressed(self.0)?;
        log::debug!(
            "读取目录包 {} (版本 {}, {} 条)",
            bundle.metadata.name,
            bundle.metadata.version,
            bundle.records.len()
        );
        Ok(bundle.records)
    }
}

/// 页面专用结构的JSON数组，通过 [`PageRecord`] 映射为通用记录
pub struct PageSource<'a, P> {
    json: &'a str,
    _page: PhantomData<P>,
}

impl<'a, P: PageRecord> PageSource<'a, P> {
    pub fn new(json: &'a str) -> Self {
        Self {
            json,
            _page: PhantomData,
        }
    }
}

impl<P: PageRecord> CatalogSource for PageSource<'_, P> {
    fn records(&self) -> Result<Vec<ContentRecord>> {
        let entries: Vec<P> = serde_json::from_str(self.json)?;
        entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| entry.into_record(position))
            .collect()
    }
}

/// 目录 - 页面生命周期内不可变的有序内容列表
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<ContentItem>,
}

impl Catalog {
    /// 从数据源加载目录
    pub fn load(source: &impl CatalogSource) -> Result<Self> {
        Self::from_records(source.records()?)
    }

    /// 校验记录并构建目录：不能为空，标题不能为空，ID不能重复，
    /// 分类不能占用保留的"全部"标签
    pub fn from_records(records: Vec<ContentRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(FilterError::CatalogEmpty);
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if record.id.trim().is_empty() {
                return Err(FilterError::invalid_item(&record.title, "ID为空"));
            }
            if record.title.trim().is_empty() {
                return Err(FilterError::invalid_item(&record.id, "标题为空"));
            }
            if record.category == ALL_CATEGORIES {
                return Err(FilterError::invalid_item(&record.id, "分类名与\"全部\"标签冲突"));
            }
            if !record.popularity.is_finite() {
                return Err(FilterError::invalid_item(&record.id, "热度不是有效数字"));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(FilterError::DuplicateId(record.id.clone()));
            }
        }

        let items: Vec<ContentItem> = records.into_iter().map(ContentItem::from).collect();
        log::debug!("目录加载完成，条目数量: {}", items.len());

        Ok(Self { items })
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 已加载的目录不会为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ContentItem;
    type IntoIter = std::slice::Iter<'a, ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
