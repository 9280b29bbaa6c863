use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use utils_common::compression::{to_compressed, CURRENT_VERSION};
use utils_common::models::{CatalogBundle, CatalogMetadata, ContentRecord};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::facets::build_facets;

/// 目录包构建器 - 校验记录并写出压缩目录包
pub struct CatalogBuilder {
    name: String,
    records: Vec<ContentRecord>,
}

impl CatalogBuilder {
    /// 创建新的目录包构建器，`name` 通常是页面名
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// 添加记录到构建器
    pub fn add_record(&mut self, record: ContentRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ContentRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 按目录规则校验后构建目录
    pub fn build_catalog(&self) -> Result<Catalog> {
        Catalog::from_records(self.records.clone())
    }

    /// 构建目录包
    pub fn build_bundle(&self) -> Result<CatalogBundle> {
        let catalog = self.build_catalog()?;
        // 第一个分面是"全部"
        let category_count = build_facets(catalog.items()).len() - 1;

        log::info!(
            "目录 {} 构建完成，条目数量: {}, 分类数量: {}",
            self.name,
            catalog.len(),
            category_count
        );

        Ok(CatalogBundle {
            metadata: CatalogMetadata {
                name: self.name.clone(),
                item_count: catalog.len(),
                category_count,
                created_at: Utc::now(),
                version: format!("{}.{}", CURRENT_VERSION[0], CURRENT_VERSION[1]),
            },
            records: self.records.clone(),
        })
    }

    /// 构建并压缩目录包
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let bundle = self.build_bundle()?;
        Ok(to_compressed(&bundle, CURRENT_VERSION)?)
    }

    /// 保存目录包到文件，返回写入的字节数
    pub fn save_bundle(&self, path: &Path) -> Result<usize> {
        let bytes = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&bytes)?;

        log::info!("目录包已写入 {}，大小: {} 字节", path.display(), bytes.len());
        Ok(bytes.len())
    }
}
