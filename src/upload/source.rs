use glob::{MatchOptions, Pattern};
use std::path::{is_separator, Path, PathBuf};

use crate::oss::ObjectStoreError;

const GLOB_META: [char; 3] = ['*', '?', '['];

/// 解析后的上传源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// 计算对象名时的基准目录，按字面量处理
    ///
    /// 目录与单文件模式下为输入中的目录本身；glob 模式下为目录部分中
    /// 第一个通配符之前的组件。
    pub base_dir: PathBuf,
    /// 待上传的普通文件，按 glob 顺序排列
    pub files: Vec<PathBuf>,
}

/// 将源描述解析为待上传文件列表
///
/// - 目录：`recursive` 为 false 时只取直接子文件，否则取全部后代文件；
///   目录名按字面量匹配，隐藏文件也会被包含
/// - 其他：视为 glob 模式；`recursive` 为 true 时改写为 `目录/**/文件名`，
///   在目录名之下任意深度匹配文件名
///
/// 非普通文件（目录、设备文件等）一律跳过。
pub fn resolve_source(source_spec: &str, recursive: bool) -> Result<ResolvedSource, ObjectStoreError> {
    if Path::new(source_spec).is_dir() {
        let base_dir = trim_trailing_separators(source_spec);
        let escaped = Pattern::escape(base_dir);
        let pattern = if recursive {
            join_pattern(&escaped, "**/*")
        } else {
            join_pattern(&escaped, "*")
        };

        let files = glob_files(&pattern, false)?;
        return Ok(ResolvedSource {
            base_dir: PathBuf::from(base_dir),
            files,
        });
    }

    let (base_dir, file_pattern) = split_spec(source_spec);

    // 文件名里可能含有通配符字符，已存在的文件按字面量处理
    if !recursive && Path::new(source_spec).is_file() {
        return Ok(ResolvedSource {
            base_dir: PathBuf::from(base_dir),
            files: vec![PathBuf::from(source_spec)],
        });
    }

    let pattern = if recursive {
        join_pattern(base_dir, &format!("**/{}", file_pattern))
    } else {
        source_spec.to_string()
    };

    let files = glob_files(&pattern, true)?;
    Ok(ResolvedSource {
        base_dir: literal_root(base_dir),
        files,
    })
}

fn literal_root(dir: &str) -> PathBuf {
    Path::new(dir)
        .components()
        .take_while(|c| !c.as_os_str().to_string_lossy().contains(GLOB_META))
        .collect()
}

fn glob_files(pattern: &str, literal_leading_dot: bool) -> Result<Vec<PathBuf>, ObjectStoreError> {
    log::debug!("expanding pattern {}", pattern);

    let options = MatchOptions {
        require_literal_leading_dot: literal_leading_dot,
        ..MatchOptions::new()
    };

    let mut files = Vec::new();
    for entry in glob::glob_with(pattern, options)? {
        let path = entry?;
        if !path.is_file() {
            log::debug!("skipping {}: not a regular file", path.display());
            continue;
        }
        files.push(path);
    }

    Ok(files)
}

fn trim_trailing_separators(spec: &str) -> &str {
    let trimmed = spec.trim_end_matches(is_separator);
    if trimmed.is_empty() {
        // 根目录
        &spec[..spec.len().min(1)]
    } else {
        trimmed
    }
}

/// 拆分为目录部分与文件名部分，目录部分末尾不带分隔符（根目录除外）
fn split_spec(spec: &str) -> (&str, &str) {
    match spec.rfind(is_separator) {
        Some(idx) => {
            let head = &spec[..=idx];
            let dir = head.trim_end_matches(is_separator);
            if dir.is_empty() {
                (&head[..1], &spec[idx + 1..])
            } else {
                (dir, &spec[idx + 1..])
            }
        }
        None => ("", spec),
    }
}

fn join_pattern(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        rest.to_string()
    } else if dir.ends_with(is_separator) {
        format!("{}{}", dir, rest)
    } else {
        format!("{}/{}", dir, rest)
    }
}
