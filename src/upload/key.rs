use std::path::{Component, Path, PathBuf};

/// 计算本地文件对应的对象名
///
/// - `squash` 为 true 时只保留文件名
/// - 否则为相对 `base_dir` 的路径，分隔符保持原样
/// - 设置了 `prefix` 时结果为 `prefix/key`，`prefix` 末尾的 `/` 会被去掉
///
/// `base_dir` 按字面量处理，比较前两边开头的 `./` 都会被忽略；
/// 文件不在 `base_dir` 之下时使用完整路径。
pub fn derive_key(base_dir: &Path, file_path: &Path, squash: bool, prefix: Option<&str>) -> String {
    let key = if squash {
        file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        relative_path(base_dir, file_path)
            .to_string_lossy()
            .into_owned()
    };

    match prefix {
        Some(prefix) if !prefix.is_empty() => {
            format!("{}/{}", prefix.trim_end_matches('/'), key)
        }
        _ => key,
    }
}

fn relative_path(base_dir: &Path, file_path: &Path) -> PathBuf {
    let base_dir = without_cur_dir(base_dir);
    let file_path = without_cur_dir(file_path);

    match file_path.strip_prefix(&base_dir) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => file_path,
    }
}

/// glob 返回的路径不带开头的 `./`，用户输入的目录可能带
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
