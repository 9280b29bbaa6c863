use std::cell::Cell;

use once_cell::unsync::OnceCell;

use crate::catalog::Catalog;
use crate::config::FilterConfig;
use crate::engine;
use crate::error::{FilterError, Result};
use crate::facets::{build_facets_with_label, build_tag_cloud};
use crate::models::{
    CategoryFacet, CategoryFilter, ContentItem, FilterState, ResultPage, SortMode, TagCount,
};

/// 目录重新加载的凭据，由 [`FilterController::begin_reload`] 发放
#[derive(Debug, PartialEq, Eq)]
pub struct ReloadTicket(u64);

/// 筛选控制器 - 持有一份筛选状态，并在状态变化后重新推导可见列表
///
/// 结果在首次读取时计算并缓存，直到下一次状态变更。
pub struct FilterController {
    catalog: Catalog,
    config: FilterConfig,
    facets: Vec<CategoryFacet>,
    tag_cloud: Vec<TagCount>,
    state: FilterState,
    results: OnceCell<Vec<ContentItem>>,
    derivations: Cell<u64>,
    pending_reload: Option<u64>,
    reload_seq: u64,
}

impl FilterController {
    /// 使用默认配置创建控制器
    pub fn new(catalog: Catalog) -> Self {
        Self::build(catalog, FilterConfig::default())
    }

    pub fn with_config(catalog: Catalog, config: FilterConfig) -> Result<Self> {
        config.validate()?;
        check_all_label(&catalog, &config.all_label)?;
        Ok(Self::build(catalog, config))
    }

    fn build(catalog: Catalog, config: FilterConfig) -> Self {
        let facets = build_facets_with_label(catalog.items(), &config.all_label);
        let tag_cloud = build_tag_cloud(catalog.items());
        let state = FilterState::new(config.default_sort);

        Self {
            catalog,
            config,
            facets,
            tag_cloud,
            state,
            results: OnceCell::new(),
            derivations: Cell::new(0),
            pending_reload: None,
            reload_seq: 0,
        }
    }

    /// 切换分类；分类不在分类索引中时返回错误，状态保持不变
    pub fn set_category(&mut self, label: &str) -> Result<()> {
        let filter = CategoryFilter::parse(label, &self.config.all_label);
        if let CategoryFilter::Named(name) = &filter {
            if !self.has_category(name) {
                log::warn!("忽略未知分类: {}", label);
                return Err(FilterError::UnknownCategory(label.to_string()));
            }
        }

        self.update(|state| state.active_category = filter);
        Ok(())
    }

    /// 设置搜索词，空字符串表示清除搜索
    pub fn set_search_query(&mut self, text: &str) {
        self.update(|state| state.search_query = text.to_string());
    }

    /// 按名称设置排序方式
    pub fn set_sort_mode(&mut self, mode: &str) -> Result<()> {
        let parsed = mode.parse::<SortMode>().map_err(|e| {
            log::warn!("忽略未知排序方式: {}", mode);
            e
        })?;
        self.set_sort(parsed);
        Ok(())
    }

    pub fn set_sort(&mut self, mode: SortMode) {
        self.update(|state| state.sort_mode = mode);
    }

    /// 恢复初始状态
    pub fn reset(&mut self) {
        let initial = FilterState::new(self.config.default_sort);
        self.update(|state| *state = initial);
    }

    /// 当前筛选结果，状态变更后的首次读取时重新计算
    pub fn current_results(&self) -> &[ContentItem] {
        self.results.get_or_init(|| {
            self.derivations.set(self.derivations.get() + 1);
            let results = engine::filter_and_sort_with(
                self.catalog.items(),
                &self.state,
                self.config.featured,
            );
            log::debug!(
                "重新筛选: 分类={} 搜索={:?} 排序={} -> {} 条",
                self.state.active_category.label(&self.config.all_label),
                self.state.search_query,
                self.state.sort_mode,
                results.len()
            );
            results
        })
    }

    /// 当前结果的一页，`limit` 为空时使用配置中的每页条数
    pub fn page(&self, page: usize, limit: Option<usize>) -> ResultPage {
        let limit = limit.unwrap_or(self.config.page_size);
        ResultPage::paginate(self.current_results(), page, limit)
    }

    /// 推荐内容，按目录顺序
    pub fn featured(&self) -> Vec<&ContentItem> {
        self.catalog.iter().filter(|item| item.featured()).collect()
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn facets(&self) -> &[CategoryFacet] {
        &self.facets
    }

    pub fn tag_cloud(&self) -> &[TagCount] {
        &self.tag_cloud
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// 结果被重新计算的次数
    pub fn derivations(&self) -> u64 {
        self.derivations.get()
    }

    /// 开始一次目录重新加载；同一时间只允许一次
    pub fn begin_reload(&mut self) -> Result<ReloadTicket> {
        if self.pending_reload.is_some() {
            log::warn!("拒绝重新加载: 上一次加载尚未完成");
            return Err(FilterError::LoadInFlight);
        }

        self.reload_seq += 1;
        self.pending_reload = Some(self.reload_seq);
        Ok(ReloadTicket(self.reload_seq))
    }

    /// 完成重新加载
    ///
    /// 成功时整体替换目录和分类索引（不合并）；失败时保留原目录并返回加载错误。
    pub fn complete_reload(&mut self, ticket: ReloadTicket, loaded: Result<Catalog>) -> Result<()> {
        if self.pending_reload != Some(ticket.0) {
            return Err(FilterError::StaleReload);
        }
        self.pending_reload = None;

        match loaded.and_then(|catalog| {
            check_all_label(&catalog, &self.config.all_label)?;
            Ok(catalog)
        }) {
            Ok(catalog) => {
                self.replace_catalog(catalog);
                Ok(())
            }
            Err(e) => {
                log::warn!("目录重新加载失败，保留当前目录: {}", e);
                Err(e)
            }
        }
    }

    pub fn reload_in_flight(&self) -> bool {
        self.pending_reload.is_some()
    }

    fn replace_catalog(&mut self, catalog: Catalog) {
        self.facets = build_facets_with_label(catalog.items(), &self.config.all_label);
        self.tag_cloud = build_tag_cloud(catalog.items());
        self.catalog = catalog;

        let missing = match &self.state.active_category {
            CategoryFilter::Named(name) => !self.has_category(name),
            CategoryFilter::All => false,
        };
        if missing {
            log::info!("当前分类已不在新目录中，切换为全部");
            self.state.active_category = CategoryFilter::All;
        }

        self.results = OnceCell::new();
        log::debug!("目录已替换，条目数量: {}", self.catalog.len());
    }

    fn has_category(&self, name: &str) -> bool {
        self.facets.iter().any(|facet| !facet.all && facet.label == name)
    }

    fn update(&mut self, mutate: impl FnOnce(&mut FilterState)) {
        let mut next = self.state.clone();
        mutate(&mut next);
        if next != self.state {
            self.state = next;
            self.results = OnceCell::new();
        }
    }
}

/// 分类名等于"全部"标签时无法被选中
fn check_all_label(catalog: &Catalog, all_label: &str) -> Result<()> {
    match catalog.iter().find(|item| item.category() == all_label) {
        Some(item) => Err(FilterError::Config(format!(
            "条目 {} 的分类与\"全部\"标签 {} 冲突",
            item.id(),
            all_label
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticSource;
    use crate::models::FeaturedPolicy;
    use utils_common::models::ContentRecord;

    fn record(id: &str, title: &str, category: &str, popularity: f64) -> ContentRecord {
        let mut record = ContentRecord::new(id, title, category);
        record.popularity = popularity;
        record
    }

    fn sample_catalog() -> Catalog {
        Catalog::load(&StaticSource(vec![
            record("a", "Keyword research basics", "SEO", 10.0),
            record("b", "Generative AI for ads", "AI", 50.0),
            record("c", "Link building in practice", "SEO", 30.0),
        ]))
        .unwrap()
    }

    fn ids(controller: &FilterController) -> Vec<String> {
        controller
            .current_results()
            .iter()
            .map(|item| item.id().to_string())
            .collect()
    }

    #[test]
    fn starts_in_initial_state() {
        let controller = FilterController::new(sample_catalog());
        assert_eq!(controller.state(), &FilterState::new(SortMode::Latest));
        assert_eq!(controller.current_results().len(), 3);
    }

    #[test]
    fn results_are_memoized_until_state_changes() {
        let mut controller = FilterController::new(sample_catalog());
        controller.current_results();
        controller.current_results();
        assert_eq!(controller.derivations(), 1);

        controller.set_search_query("link");
        assert_eq!(controller.derivations(), 1);
        assert_eq!(ids(&controller), vec!["c"]);
        controller.current_results();
        assert_eq!(controller.derivations(), 2);
    }

    #[test]
    fn unchanged_state_keeps_cache() {
        let mut controller = FilterController::new(sample_catalog());
        controller.current_results();
        controller.set_category("all").unwrap();
        controller.set_sort(SortMode::Latest);
        controller.current_results();
        assert_eq!(controller.derivations(), 1);
    }

    #[test]
    fn unknown_sort_mode_keeps_state() {
        let mut controller = FilterController::new(sample_catalog());
        controller.set_sort_mode("popular").unwrap();
        let before = controller.state().clone();

        assert!(matches!(
            controller.set_sort_mode("random"),
            Err(FilterError::UnknownSortMode(_))
        ));
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn reset_restores_configured_defaults() {
        let config = FilterConfig {
            default_sort: SortMode::Popular,
            ..FilterConfig::default()
        };
        let mut controller = FilterController::with_config(sample_catalog(), config).unwrap();
        controller.set_category("SEO").unwrap();
        controller.set_search_query("link");
        controller.set_sort(SortMode::Title);

        controller.reset();
        assert_eq!(controller.state(), &FilterState::new(SortMode::Popular));
        assert_eq!(ids(&controller), vec!["b", "c", "a"]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = FilterConfig {
            all_label: String::new(),
            ..FilterConfig::default()
        };
        assert!(matches!(
            FilterController::with_config(sample_catalog(), config),
            Err(FilterError::Config(_))
        ));
    }

    #[test]
    fn separate_featured_policy() {
        let mut featured = record("f", "Featured story", "SEO", 99.0);
        featured.featured = true;
        let catalog = Catalog::load(&StaticSource(vec![featured, record("a", "Plain", "SEO", 1.0)])).unwrap();
        let config = FilterConfig {
            featured: FeaturedPolicy::Separate,
            ..FilterConfig::default()
        };

        let controller = FilterController::with_config(catalog, config).unwrap();
        assert_eq!(ids(&controller), vec!["a"]);
        let featured: Vec<_> = controller.featured().iter().map(|item| item.id()).collect();
        assert_eq!(featured, vec!["f"]);
        // 分面仍然统计全部条目
        assert_eq!(controller.facets()[0].count, 2);
    }

    #[test]
    fn page_uses_configured_size() {
        let config = FilterConfig {
            page_size: 2,
            ..FilterConfig::default()
        };
        let controller = FilterController::with_config(sample_catalog(), config).unwrap();

        let first = controller.page(1, None);
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total_pages, 2);

        let all = controller.page(1, Some(10));
        assert_eq!(all.items.len(), 3);
        assert_eq!(all.total_pages, 1);
    }

    #[test]
    fn second_reload_is_rejected_while_in_flight() {
        let mut controller = FilterController::new(sample_catalog());
        let ticket = controller.begin_reload().unwrap();
        assert!(controller.reload_in_flight());
        assert!(matches!(controller.begin_reload(), Err(FilterError::LoadInFlight)));

        controller.complete_reload(ticket, Ok(sample_catalog())).unwrap();
        assert!(!controller.reload_in_flight());
        assert!(controller.begin_reload().is_ok());
    }

    #[test]
    fn reload_replaces_catalog_and_facets() {
        let mut controller = FilterController::new(sample_catalog());
        controller.set_category("AI").unwrap();
        assert_eq!(ids(&controller), vec!["b"]);

        let replacement = Catalog::load(&StaticSource(vec![
            record("x", "Video trends", "Video", 5.0),
            record("y", "On-page SEO", "SEO", 7.0),
        ]))
        .unwrap();
        let ticket = controller.begin_reload().unwrap();
        controller.complete_reload(ticket, Ok(replacement)).unwrap();

        assert_eq!(controller.state().active_category, CategoryFilter::All);
        let labels: Vec<_> = controller.facets().iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["all", "Video", "SEO"]);
        assert_eq!(ids(&controller), vec!["x", "y"]);
        assert!(matches!(
            controller.set_category("AI"),
            Err(FilterError::UnknownCategory(_))
        ));
    }

    #[test]
    fn failed_reload_keeps_current_catalog() {
        let mut controller = FilterController::new(sample_catalog());
        controller.set_category("SEO").unwrap();
        let before = ids(&controller);

        let ticket = controller.begin_reload().unwrap();
        let failed = Catalog::load(&StaticSource(Vec::new()));
        assert!(matches!(
            controller.complete_reload(ticket, failed),
            Err(FilterError::CatalogEmpty)
        ));

        assert_eq!(ids(&controller), before);
        assert_eq!(controller.catalog().len(), 3);
        assert!(!controller.reload_in_flight());
    }

    #[test]
    fn ticket_from_another_controller_is_stale() {
        let mut issuer = FilterController::new(sample_catalog());
        let ticket = issuer.begin_reload().unwrap();

        let mut other = FilterController::new(sample_catalog());
        assert!(matches!(
            other.complete_reload(ticket, Ok(sample_catalog())),
            Err(FilterError::StaleReload)
        ));
        assert!(issuer.reload_in_flight());
    }

    #[test]
    fn custom_all_label_must_not_shadow_a_category() {
        let catalog = Catalog::load(&StaticSource(vec![
            record("a", "Keyword research basics", "SEO", 10.0),
            record("e", "Everything about ads", "everything", 5.0),
        ]))
        .unwrap();
        let config = FilterConfig {
            all_label: "everything".to_string(),
            ..FilterConfig::default()
        };
        assert!(matches!(
            FilterController::with_config(catalog, config),
            Err(FilterError::Config(_))
        ));
    }

    #[test]
    fn reload_with_shadowing_category_keeps_current_catalog() {
        let config = FilterConfig {
            all_label: "everything".to_string(),
            ..FilterConfig::default()
        };
        let mut controller = FilterController::with_config(sample_catalog(), config).unwrap();
        let before = ids(&controller);

        let ticket = controller.begin_reload().unwrap();
        let shadowing = Catalog::load(&StaticSource(vec![record("e", "Everything", "everything", 1.0)]));
        assert!(matches!(
            controller.complete_reload(ticket, shadowing),
            Err(FilterError::Config(_))
        ));
        assert_eq!(ids(&controller), before);
        assert!(!controller.reload_in_flight());
    }
}
