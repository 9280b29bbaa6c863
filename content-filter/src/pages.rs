//! 页面数据适配
//!
//! 博客、作品集和服务页面各自维护一份结构不同的数据数组。每种结构实现
//! [`PageRecord`]，把自己的字段映射为通用的 [`ContentRecord`]，之后统一交给
//! 同一个筛选引擎处理。

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;
use utils_common::models::ContentRecord;

use crate::catalog::{Catalog, JsonSource, PageSource};
use crate::error::{FilterError, Result};

/// 页面专用结构到通用记录的映射
pub trait PageRecord: DeserializeOwned {
    /// `position` 为该条目在页面数组中的下标
    fn into_record(self, position: usize) -> Result<ContentRecord>;
}

/// 博客文章
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    #[serde(default)]
    pub author: String,
    /// 形如 "Mar 15, 2024"
    pub date: String,
    #[serde(default)]
    pub read_time: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub likes: Option<f64>,
    #[serde(default)]
    pub comments: Option<u32>,
}

impl PageRecord for BlogPost {
    fn into_record(self, _position: usize) -> Result<ContentRecord> {
        let date = parse_site_date(&self.date)
            .ok_or_else(|| FilterError::invalid_item(&self.id, format!("无法解析日期: {}", self.date)))?;

        Ok(ContentRecord {
            url: Some(format!("/blog/{}", self.id)),
            id: self.id,
            title: self.title,
            summary: self.excerpt,
            category: self.category,
            tags: self.tags,
            date: Some(date),
            popularity: self.likes.unwrap_or(0.0),
            featured: self.featured,
        })
    }
}

/// 作品集项目，源数据没有ID
#[derive(Deserialize, Debug, Clone)]
pub struct PortfolioProject {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
}

impl PageRecord for PortfolioProject {
    fn into_record(self, position: usize) -> Result<ContentRecord> {
        let id = slug_or_position(&self.title, position);

        let date = match self.year.as_deref() {
            Some(year) => Some(
                parse_site_date(year)
                    .ok_or_else(|| FilterError::invalid_item(&id, format!("无法解析年份: {}", year)))?,
            ),
            None => None,
        };

        Ok(ContentRecord {
            id,
            title: self.title,
            summary: self.description.unwrap_or_default(),
            category: self.category,
            tags: self.client.into_iter().collect(),
            date,
            popularity: 0.0,
            featured: false,
            url: None,
        })
    }
}

/// 服务项目
#[derive(Deserialize, Debug, Clone)]
pub struct ServiceOffering {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub category: String,
}

impl PageRecord for ServiceOffering {
    fn into_record(self, position: usize) -> Result<ContentRecord> {
        Ok(ContentRecord {
            id: slug_or_position(&self.title, position),
            title: self.title,
            summary: self.description,
            category: self.category,
            tags: self.features,
            date: None,
            popularity: 0.0,
            featured: false,
            url: None,
        })
    }
}

/// 页面类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Blog,
    Portfolio,
    Services,
    /// 已经是通用记录格式
    Records,
}

impl PageKind {
    /// 根据文件名推断页面类型，无法识别时按通用记录处理
    pub fn from_stem(stem: &str) -> Self {
        stem.parse().unwrap_or(PageKind::Records)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Blog => "blog",
            PageKind::Portfolio => "portfolio",
            PageKind::Services => "services",
            PageKind::Records => "records",
        }
    }

    /// 按页面类型解析JSON并加载目录
    pub fn load_catalog(&self, json: &str) -> Result<Catalog> {
        match self {
            PageKind::Blog => Catalog::load(&PageSource::<BlogPost>::new(json)),
            PageKind::Portfolio => Catalog::load(&PageSource::<PortfolioProject>::new(json)),
            PageKind::Services => Catalog::load(&PageSource::<ServiceOffering>::new(json)),
            PageKind::Records => Catalog::load(&JsonSource(json)),
        }
    }
}

impl FromStr for PageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blog" => Ok(PageKind::Blog),
            "portfolio" => Ok(PageKind::Portfolio),
            "services" => Ok(PageKind::Services),
            "records" => Ok(PageKind::Records),
            other => Err(format!("未知页面类型: {}", other)),
        }
    }
}

/// 解析页面上出现的几种日期写法
///
/// 支持 RFC 3339、"Mar 15, 2024"、"2024-03-15" 和单独的年份 "2024"（取1月1日）。
pub fn parse_site_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(text, "%b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            text.parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        })?;

    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

/// 把标题转为URL友好的ID：小写ASCII字母数字，其余字符折叠为单个 "-"
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn slug_or_position(title: &str, position: usize) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("item-{}", position + 1)
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_site_date_formats() {
        let blog = parse_site_date("Mar 15, 2024").unwrap();
        assert_eq!((blog.year(), blog.month(), blog.day()), (2024, 3, 15));

        let iso = parse_site_date("2024-02-22").unwrap();
        assert_eq!((iso.month(), iso.day()), (2, 22));

        let year = parse_site_date("2023").unwrap();
        assert_eq!((year.year(), year.month(), year.day()), (2023, 1, 1));

        assert!(parse_site_date("2024-03-15T10:00:00+02:00").is_some());
        assert!(parse_site_date("someday").is_none());
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Urban Fuel – Brand Campaign"), "urban-fuel-brand-campaign");
        assert_eq!(slugify("SEO & SEM"), "seo-sem");
        assert_eq!(slugify("  --  "), "");
    }

    #[test]
    fn blog_post_maps_likes_and_date() {
        let json = r#"[{
            "id": "ai-in-advertising",
            "title": "How AI is Revolutionizing Digital Advertising",
            "excerpt": "Explore the ways artificial intelligence is transforming ad targeting.",
            "author": "Robert Taylor",
            "date": "Feb 25, 2024",
            "readTime": "7 min read",
            "category": "AI",
            "tags": ["AI", "advertising"],
            "likes": 423
        }]"#;
        let catalog = PageKind::Blog.load_catalog(json).unwrap();
        let item = &catalog.items()[0];
        assert_eq!(item.popularity_score(), 423.0);
        assert_eq!(item.url(), Some("/blog/ai-in-advertising"));
        assert_eq!(item.sortable_date().unwrap().day(), 25);
    }

    #[test]
    fn blog_post_with_bad_date_is_invalid() {
        let json = r#"[{"id": "x", "title": "X", "excerpt": "", "date": "soon", "category": "AI"}]"#;
        assert!(matches!(
            PageKind::Blog.load_catalog(json),
            Err(FilterError::InvalidItem { id, .. }) if id == "x"
        ));
    }

    #[test]
    fn portfolio_project_gets_slug_id_and_client_tag() {
        let json = r#"[{"title": "FitX – Social Media Launch", "category": "Social",
                        "description": "Viral campaign", "year": "2023", "client": "FitX"}]"#;
        let catalog = PageKind::Portfolio.load_catalog(json).unwrap();
        let item = &catalog.items()[0];
        assert_eq!(item.id(), "fitx-social-media-launch");
        assert_eq!(item.tags(), ["FitX".to_string()]);
        assert_eq!(item.sortable_date().unwrap().year(), 2023);
    }

    #[test]
    fn service_features_become_tags() {
        let json = r#"[{"title": "SEO & SEM", "description": "Search visibility",
                        "features": ["Keyword Research", "Link Building"], "category": "marketing"}]"#;
        let catalog = PageKind::Services.load_catalog(json).unwrap();
        let item = &catalog.items()[0];
        assert_eq!(item.id(), "seo-sem");
        assert!(item.searchable_text().contains("link building"));
        assert!(item.sortable_date().is_none());
    }

    #[test]
    fn page_kind_from_stem_falls_back_to_records() {
        assert_eq!(PageKind::from_stem("Blog"), PageKind::Blog);
        assert_eq!(PageKind::from_stem("case-studies"), PageKind::Records);
    }
}
