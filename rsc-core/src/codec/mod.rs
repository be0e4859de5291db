//! 资源索引文本（`resfileindex.txt` / `eveonline_{build}.txt`）与 `start.ini` 的解析。

mod collate;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{ResError, Result};

pub use collate::locale_cmp;

/// 索引行至少需要的字段数：路径、hash、（未使用）、大小。
const MIN_INDEX_FIELDS: usize = 4;
const SIZE_FIELD: usize = 3;
/// hash token 中 FNV-1a 部分前面的固定前缀长度。
const HASH_PREFIX_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIndexEntry {
    pub resource_path: String,
    pub hash_token: String,
    pub size: u64,
}

impl ResourceIndexEntry {
    pub fn hash_parts(&self) -> Result<HashParts<'_>> {
        decompose_hash(&self.hash_token)
    }

    /// 重新序列化为索引行，第三个字段留空。
    pub fn to_index_line(&self) -> String {
        format!("{},{},,{}", self.resource_path, self.hash_token, self.size)
    }

    pub fn view(&self) -> ResourceView<'_> {
        let path = self.resource_path.as_str();
        let prefix = path.split_once(":/").map(|(p, _)| p).unwrap_or(path);
        let (dir, name) = match path.rfind('/') {
            Some(i) => (&path[..i], &path[i + 1..]),
            None => (".", path),
        };
        let ext = match name.rfind('.') {
            Some(i) if i > 0 => &name[i..],
            _ => "",
        };
        let (fnv1a64, md5) = match decompose_hash(&self.hash_token) {
            Ok(parts) => (Some(parts.fnv1a64), Some(parts.md5)),
            Err(_) => (None, None),
        };
        ResourceView {
            res_path: path,
            hash: &self.hash_token,
            size: self.size,
            prefix,
            dir,
            name,
            ext,
            fnv1a64,
            md5,
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        locale_cmp(&self.resource_path, &other.resource_path)
            .then_with(|| self.hash_token.cmp(&other.hash_token))
            .then_with(|| self.size.cmp(&other.size))
    }
}

/// 从索引条目派生出的展示信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceView<'a> {
    pub res_path: &'a str,
    pub hash: &'a str,
    pub size: u64,
    /// `res:/ui/a.png` 中的 `res`
    pub prefix: &'a str,
    pub dir: &'a str,
    pub name: &'a str,
    /// 包含点号，例如 `.png`；没有扩展名时为空串
    pub ext: &'a str,
    pub fnv1a64: Option<&'a str>,
    pub md5: Option<&'a str>,
}

/// hash token 拆出的两部分摘要（十六进制文本）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParts<'a> {
    pub fnv1a64: &'a str,
    pub md5: &'a str,
}

/// 按 `resource_path` 升序排列的索引。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceIndex {
    entries: Vec<ResourceIndexEntry>,
}

impl ResourceIndex {
    pub fn from_entries(mut entries: Vec<ResourceIndexEntry>) -> Self {
        entries.sort_by(ResourceIndexEntry::order);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceIndexEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[ResourceIndexEntry] {
        &self.entries
    }

    /// 按资源路径查找（输入大小写不敏感）。
    pub fn find(&self, resource_path: &str) -> Option<&ResourceIndexEntry> {
        let wanted = resource_path.to_lowercase();
        let start = self
            .entries
            .partition_point(|e| locale_cmp(&e.resource_path, &wanted) == Ordering::Less);
        self.entries[start..]
            .iter()
            .take_while(|e| locale_cmp(&e.resource_path, &wanted) == Ordering::Equal)
            .find(|e| e.resource_path == wanted)
    }
}

impl<'a> IntoIterator for &'a ResourceIndex {
    type Item = &'a ResourceIndexEntry;
    type IntoIter = std::slice::Iter<'a, ResourceIndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// 解析索引文本。
///
/// 每行以逗号分隔：字段 0 为资源路径（转小写），字段 1 为 hash token，字段 3 为大小，
/// 字段 2 不使用。空行会被丢弃。大小不是非负整数时返回 `MalformedIndexLine`。
pub fn parse_index(text: &str) -> Result<ResourceIndex> {
    let mut entries = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        entries.push(parse_index_line(line_no + 1, line)?);
    }
    Ok(ResourceIndex::from_entries(entries))
}

fn parse_index_line(line_no: usize, line: &str) -> Result<ResourceIndexEntry> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_INDEX_FIELDS {
        return Err(ResError::MalformedIndexLine {
            line: line_no,
            reason: format!(
                "expected at least {MIN_INDEX_FIELDS} fields, got {}",
                fields.len()
            ),
        });
    }

    let raw_size = fields[SIZE_FIELD].trim();
    let size = raw_size
        .parse::<u64>()
        .map_err(|_| ResError::MalformedIndexLine {
            line: line_no,
            reason: format!("size {raw_size:?} is not a non-negative integer"),
        })?;

    Ok(ResourceIndexEntry {
        resource_path: fields[0].to_lowercase(),
        hash_token: fields[1].to_string(),
        size,
    })
}

/// 拆分 hash token：第一个 `_` 之后是 MD5，之前去掉两个前缀字符是 FNV-1a 64。
pub fn decompose_hash(hash_token: &str) -> Result<HashParts<'_>> {
    let (head, md5) = hash_token
        .split_once('_')
        .ok_or_else(|| ResError::MalformedHashToken(hash_token.to_string()))?;
    let fnv1a64 = head
        .char_indices()
        .nth(HASH_PREFIX_CHARS)
        .map(|(i, _)| &head[i..])
        .unwrap_or("");
    Ok(HashParts { fnv1a64, md5 })
}

/// `start.ini` 一类文件中的值，看起来像数字的会被转成数字。
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    Number(f64),
    Text(String),
}

impl KeyValue {
    fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if !trimmed.is_empty() && n.is_finite() => Self::Number(n),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// 非负整数时返回 `Some`。
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64 => {
                Some(*n as u64)
            }
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

pub type KeyValues = BTreeMap<String, KeyValue>;

/// 解析 `key=value` 文本：丢弃空行，每行只按第一个 `=` 切分，key 去除首尾空白。
pub fn parse_key_value_text(text: &str) -> KeyValues {
    text.lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (key, value) = line.split_once('=').unwrap_or((line, ""));
            (key.trim().to_string(), KeyValue::coerce(value))
        })
        .collect()
}
