use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::{ContentItem, FeaturedPolicy, FilterState, SortMode};

/// 按筛选状态筛选并排序，推荐内容留在列表中
pub fn filter_and_sort(items: &[ContentItem], state: &FilterState) -> Vec<ContentItem> {
    filter_and_sort_with(items, state, FeaturedPolicy::Inline)
}

/// 按筛选状态筛选并排序
///
/// 依次执行：推荐策略 → 分类 → 搜索 → 排序。输入不会被修改，
/// 相同输入总是得到相同顺序的新列表。
pub fn filter_and_sort_with(
    items: &[ContentItem],
    state: &FilterState,
    featured: FeaturedPolicy,
) -> Vec<ContentItem> {
    let query = normalize_query(&state.search_query);

    let mut filtered: Vec<ContentItem> = items
        .iter()
        .filter(|item| featured.admits(item))
        .filter(|item| state.active_category.matches(item.category()))
        .filter(|item| query.as_deref().map_or(true, |q| item.matches_query(q)))
        .cloned()
        .collect();

    apply_sorting(&mut filtered, state.sort_mode);
    filtered
}

/// 空白查询返回 None，表示跳过搜索阶段；否则只转小写，首尾空格参与匹配
fn normalize_query(query: &str) -> Option<String> {
    if query.trim().is_empty() {
        None
    } else {
        Some(query.to_lowercase())
    }
}

// 所有排序都必须是稳定排序，相同键的条目保持输入顺序
fn apply_sorting(items: &mut [ContentItem], mode: SortMode) {
    match mode {
        SortMode::Latest => {
            items.sort_by(|a, b| by_date(a.sortable_date(), b.sortable_date(), true));
        }
        SortMode::Oldest => {
            items.sort_by(|a, b| by_date(a.sortable_date(), b.sortable_date(), false));
        }
        SortMode::Popular => {
            items.sort_by(|a, b| b.popularity_score().total_cmp(&a.popularity_score()));
        }
        SortMode::Title => {
            items.sort_by_cached_key(|item| item.title().to_lowercase());
        }
    }
}

/// 无日期的条目始终排在有日期的条目之后
fn by_date(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>, newest_first: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if newest_first => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
