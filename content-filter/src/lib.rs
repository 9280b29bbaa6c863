//! 内容列表页的筛选引擎
//!
//! 博客、作品集和服务页面都从一份固定的内容目录中，按分类、搜索词和排序方式
//! 推导出当前可见的列表。本模块把这套逻辑收拢为一个纯函数加一个状态控制器，
//! 并通过 `wasm-bindgen` 暴露给页面脚本。
//!
//! 数据流：目录 → 分类索引（加载时计算一次）；目录 + 筛选状态 → 查询引擎 → 结果列表。

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod builder;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod facets;
pub mod logger;
pub mod models;
pub mod pages;

pub use catalog::{BundleSource, Catalog, CatalogSource, JsonSource, PageSource, StaticSource};
pub use config::FilterConfig;
pub use controller::{FilterController, ReloadTicket};
pub use engine::{filter_and_sort, filter_and_sort_with};
pub use error::{FilterError, Result};
pub use facets::{build_facets, build_facets_with_label, build_tag_cloud};
pub use models::{
    CategoryFacet, CategoryFilter, ContentItem, FeaturedPolicy, FilterState, ResultPage, SortMode,
    TagCount, ALL_CATEGORIES,
};
pub use pages::PageKind;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理和控制台日志
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logger::init(log::Level::Info);
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// 传给页面的筛选状态
#[derive(Serialize)]
struct StateView<'a> {
    category: &'a str,
    query: &'a str,
    sort: &'static str,
}

/// 映射输出为普通对象而不是 `Map`，页面按属性名读取字段
fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
}

fn js_error(e: FilterError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// 内容筛选器JS接口 - 每个页面视图持有一个实例
#[wasm_bindgen]
pub struct ContentFilterJS {
    controller: FilterController,
}

impl ContentFilterJS {
    fn create(catalog: Result<Catalog>, config_json: &str) -> std::result::Result<ContentFilterJS, JsValue> {
        let config = FilterConfig::from_json(config_json).map_err(js_error)?;
        let catalog = catalog.map_err(|e| {
            log::error!("加载目录失败: {}", e);
            js_error(e)
        })?;
        let controller = FilterController::with_config(catalog, config).map_err(js_error)?;
        Ok(ContentFilterJS { controller })
    }
}

#[wasm_bindgen]
impl ContentFilterJS {
    /// 从通用记录JSON创建筛选器
    #[wasm_bindgen(js_name = fromRecords)]
    pub fn from_records(records_json: &str, config_json: &str) -> std::result::Result<ContentFilterJS, JsValue> {
        Self::create(Catalog::load(&JsonSource(records_json)), config_json)
    }

    /// 从页面专用数据创建筛选器，`kind` 为 blog / portfolio / services / records
    #[wasm_bindgen(js_name = fromPage)]
    pub fn from_page(kind: &str, page_json: &str, config_json: &str) -> std::result::Result<ContentFilterJS, JsValue> {
        let kind: PageKind = kind.parse().map_err(|e: String| JsValue::from_str(&e))?;
        Self::create(kind.load_catalog(page_json), config_json)
    }

    /// 从 catalog-builder 生成的目录包创建筛选器
    #[wasm_bindgen(js_name = fromBundle)]
    pub fn from_bundle(bundle: &[u8], config_json: &str) -> std::result::Result<ContentFilterJS, JsValue> {
        Self::create(Catalog::load(&BundleSource(bundle)), config_json)
    }

    #[wasm_bindgen(js_name = setCategory)]
    pub fn set_category(&mut self, label: &str) -> std::result::Result<(), JsValue> {
        self.controller.set_category(label).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setSearchQuery)]
    pub fn set_search_query(&mut self, text: &str) {
        self.controller.set_search_query(text);
    }

    #[wasm_bindgen(js_name = setSortMode)]
    pub fn set_sort_mode(&mut self, mode: &str) -> std::result::Result<(), JsValue> {
        self.controller.set_sort_mode(mode).map_err(js_error)
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// 当前筛选结果
    pub fn results(&self) -> std::result::Result<JsValue, JsValue> {
        let start = js_sys::Date::now();
        let results = self.controller.current_results();
        log::debug!("筛选耗时: {}ms", js_sys::Date::now() - start);
        to_js(&results)
    }

    /// 当前结果的一页，`limit` 省略时使用配置的每页条数
    pub fn page(&self, page: usize, limit: Option<usize>) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.controller.page(page, limit))
    }

    pub fn facets(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.controller.facets())
    }

    pub fn tags(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.controller.tag_cloud())
    }

    pub fn featured(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.controller.featured())
    }

    pub fn state(&self) -> std::result::Result<JsValue, JsValue> {
        let state = self.controller.state();
        to_js(&StateView {
            category: state.active_category.label(&self.controller.config().all_label),
            query: &state.search_query,
            sort: state.sort_mode.as_str(),
        })
    }
}
