use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, Command};
use walkdir::WalkDir;

use content_filter::builder::CatalogBuilder;
use content_filter::PageKind;

// 主函数
fn main() {
    let matches = Command::new("目录包生成器")
        .version(env!("CARGO_PKG_VERSION"))
        .about("把页面内容数据打包为筛选引擎使用的目录包")
        .arg(Arg::new("source")
            .short('s')
            .long("source")
            .value_name("SOURCE_DIR")
            .help("页面数据目录（*.json）")
            .required(true))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("OUTPUT_DIR")
            .help("目录包输出目录")
            .required(true))
        .arg(Arg::new("kind")
            .short('k')
            .long("kind")
            .value_name("KIND")
            .help("页面类型: auto | blog | portfolio | services | records")
            .default_value("auto"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
        .get_matches();

    let verbose = matches.get_flag("verbose");
    init_logging(verbose);

    // 三个参数都是必填或带默认值
    let source_dir = PathBuf::from(matches.get_one::<String>("source").map(String::as_str).unwrap_or_default());
    let output_dir = PathBuf::from(matches.get_one::<String>("output").map(String::as_str).unwrap_or_default());
    let kind = matches.get_one::<String>("kind").map(String::as_str).unwrap_or("auto");

    println!("开始生成目录包...");
    println!("源目录: {}", source_dir.display());
    println!("输出目录: {}", output_dir.display());

    match parse_kind(kind).and_then(|kind| generate_catalogs(&source_dir, &output_dir, kind)) {
        Ok(written) => println!("目录包生成成功！共 {} 个", written.len()),
        Err(e) => {
            eprintln!("错误: 目录包生成失败: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// `auto` 表示按文件名推断
fn parse_kind(kind: &str) -> Result<Option<PageKind>> {
    if kind == "auto" {
        return Ok(None);
    }
    kind.parse::<PageKind>()
        .map(Some)
        .map_err(anyhow::Error::msg)
}

// 生成所有目录包，返回写出的文件路径
fn generate_catalogs(source_dir: &Path, output_dir: &Path, kind: Option<PageKind>) -> Result<Vec<PathBuf>> {
    if !source_dir.is_dir() {
        bail!("源目录不存在或不是有效目录 '{}'", source_dir.display());
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("无法创建输出目录 '{}'", output_dir.display()))?;

    let start_time = std::time::Instant::now();
    let sources = scan_json_files(source_dir)?;
    log::info!("扫描完成，找到 {} 个数据文件", sources.len());

    let mut written = Vec::new();
    let mut failed = 0;

    for path in &sources {
        match build_one(path, output_dir, kind) {
            Ok(target) => written.push(target),
            Err(e) => {
                failed += 1;
                log::warn!("跳过 {}: {:#}", path.display(), e);
            }
        }
    }

    if written.is_empty() {
        bail!("没有生成任何目录包（{} 个文件失败）", failed);
    }

    log::info!(
        "生成 {} 个目录包，失败 {} 个，耗时: {:.2}秒",
        written.len(),
        failed,
        start_time.elapsed().as_secs_f32()
    );
    Ok(written)
}

// 扫描目录下的JSON文件，按路径排序保证输出稳定
fn scan_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.context("遍历目录时出错")?;
        let is_json = entry.path().extension().map_or(false, |ext| ext == "json");
        if entry.file_type().is_file() && is_json {
            log::debug!("发现数据文件: {}", entry.path().display());
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

// 处理单个数据文件
fn build_one(path: &Path, output_dir: &Path, kind: Option<PageKind>) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("无效文件名 {}", path.display()))?;
    let kind = kind.unwrap_or_else(|| PageKind::from_stem(stem));

    let json = fs::read_to_string(path)
        .with_context(|| format!("无法读取文件 {}", path.display()))?;
    let catalog = kind
        .load_catalog(&json)
        .with_context(|| format!("按 {} 格式解析 {} 失败", kind.as_str(), path.display()))?;

    let mut builder = CatalogBuilder::new(stem);
    builder.extend(catalog.iter().map(|item| item.record().clone()));

    let target = output_dir.join(format!("{}.catalog.bin", stem));
    let size = builder.save_bundle(&target)?;
    println!("{} -> {} ({} 条, {} 字节)", path.display(), target.display(), catalog.len(), size);

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_filter::{BundleSource, Catalog};

    const BLOG: &str = include_str!("../../content/blog.json");
    const SERVICES: &str = include_str!("../../content/services.json");

    #[test]
    fn builds_one_bundle_per_page_file() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(source.path().join("blog.json"), BLOG).unwrap();
        fs::write(source.path().join("services.json"), SERVICES).unwrap();

        let written = generate_catalogs(source.path(), output.path(), None).unwrap();
        assert_eq!(written.len(), 2);

        let bytes = fs::read(output.path().join("blog.catalog.bin")).unwrap();
        let catalog = Catalog::load(&BundleSource(&bytes)).unwrap();
        assert_eq!(catalog.len(), 9);
        assert!(catalog.get("ai-in-advertising").is_some());
    }

    #[test]
    fn bad_files_are_skipped() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(source.path().join("blog.json"), BLOG).unwrap();
        fs::write(source.path().join("empty.json"), "[]").unwrap();
        fs::write(source.path().join("notes.txt"), "ignored").unwrap();

        let written = generate_catalogs(source.path(), output.path(), None).unwrap();
        assert_eq!(written, vec![output.path().join("blog.catalog.bin")]);
    }

    #[test]
    fn fails_when_nothing_was_built() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(source.path().join("empty.json"), "[]").unwrap();

        assert!(generate_catalogs(source.path(), output.path(), None).is_err());
    }

    #[test]
    fn explicit_kind_overrides_file_name() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(source.path().join("offerings.json"), SERVICES).unwrap();

        assert!(generate_catalogs(source.path(), output.path(), None).is_err());
        let written = generate_catalogs(source.path(), output.path(), Some(PageKind::Services)).unwrap();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn missing_source_dir_is_an_error() {
        let output = tempfile::tempdir().unwrap();
        let missing = output.path().join("does-not-exist");
        assert!(generate_catalogs(&missing, output.path(), None).is_err());
    }

    #[test]
    fn parse_kind_accepts_auto() {
        assert_eq!(parse_kind("auto").unwrap(), None);
        assert_eq!(parse_kind("portfolio").unwrap(), Some(PageKind::Portfolio));
        assert!(parse_kind("landing").is_err());
    }
}
