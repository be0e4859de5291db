use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::error::{ResError, Result};

pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// 读取文本文件，文件不存在时返回 `None`。
pub async fn read_optional_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(ResError::io(path, err)),
    }
}

/// hash token 会被拼进本地路径（可能带一级分片目录，如 `ab/abcd_ef`），
/// 只允许普通的相对路径分量。
pub fn hash_relative_path(hash: &str) -> Result<&Path> {
    let path = Path::new(hash);
    let mut components = path.components().peekable();
    if components.peek().is_none() {
        return Err(ResError::MalformedHashToken(hash.to_string()));
    }
    if components.all(|c| matches!(c, Component::Normal(_))) {
        Ok(path)
    } else {
        Err(ResError::MalformedHashToken(hash.to_string()))
    }
}

/// 与目标文件同目录的临时文件路径，写完后再 rename 到目标位置。
pub fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(target.file_name().unwrap_or(OsStr::new("resource")));
    name.push(format!(".{}.part", uuid::Uuid::new_v4().simple()));
    target.with_file_name(name)
}

pub async fn discard_partial(partial: &Path) {
    if let Err(err) = fs::remove_file(partial).await {
        if err.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %partial.display(), error = %err, "failed to remove partial file");
        }
    }
}

/// 把临时文件落盘并替换目标文件。
pub async fn commit_partial(partial: &Path, target: &Path) -> Result<()> {
    if let Err(err) = fs::rename(partial, target).await {
        discard_partial(partial).await;
        return Err(ResError::write_failed(target, err));
    }
    Ok(())
}

/// 复制文件，目标要么是完整内容，要么保持原样。
pub async fn copy_atomic(src: &Path, target: &Path) -> Result<u64> {
    let partial = partial_path(target);
    let copied = match copy_and_sync(src, &partial).await {
        Ok(n) => n,
        Err(err) => {
            discard_partial(&partial).await;
            return Err(ResError::write_failed(target, err));
        }
    };
    commit_partial(&partial, target).await?;
    Ok(copied)
}

/// 复制后 fsync，rename 之前内容必须已经落盘。
async fn copy_and_sync(src: &Path, partial: &Path) -> io::Result<u64> {
    let copied = fs::copy(src, partial).await?;
    fs::OpenOptions::new()
        .write(true)
        .open(partial)
        .await?
        .sync_all()
        .await?;
    Ok(copied)
}
