use std::collections::HashMap;

use crate::models::{CategoryFacet, ContentItem, TagCount, ALL_CATEGORIES};

/// 构建分类分面，"全部"分面使用默认标签
pub fn build_facets(items: &[ContentItem]) -> Vec<CategoryFacet> {
    build_facets_with_label(items, ALL_CATEGORIES)
}

/// 构建分类分面
///
/// 第一个分面总是"全部"，计数为条目总数；其后每个分类一个分面，
/// 按在目录中首次出现的顺序排列（不按字母排序）。
pub fn build_facets_with_label(items: &[ContentItem], all_label: &str) -> Vec<CategoryFacet> {
    let mut facets = vec![CategoryFacet {
        label: all_label.to_string(),
        count: items.len(),
        all: true,
    }];

    // 分类名 -> facets 中的下标
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for item in items {
        match positions.get(item.category()) {
            Some(&index) => facets[index].count += 1,
            None => {
                positions.insert(item.category(), facets.len());
                facets.push(CategoryFacet {
                    label: item.category().to_string(),
                    count: 1,
                    all: false,
                });
            }
        }
    }

    facets
}

/// 统计所有标签的出现次数，按首次出现顺序排列
pub fn build_tag_cloud(items: &[ContentItem]) -> Vec<TagCount> {
    let mut tags: Vec<TagCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for item in items {
        for tag in item.tags() {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            match positions.get(tag) {
                Some(&index) => tags[index].count += 1,
                None => {
                    positions.insert(tag, tags.len());
                    tags.push(TagCount {
                        tag: tag.to_string(),
                        count: 1,
                    });
                }
            }
        }
    }

    tags
}
