use anyhow::{bail, Context, Result};
use mdsearch_core::Record;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// Files decide: `.zip` is a markdown archive, `.json`/`.jsonl` are
    /// records, directories are markdown trees.
    #[default]
    Auto,
    Markdown,
    Zip,
    Records,
}

pub fn load(path: &Path, kind: InputKind) -> Result<Vec<Record>> {
    if !path.exists() {
        bail!("input path {} does not exist", path.display());
    }
    let records = match kind {
        InputKind::Markdown => load_markdown_dir(path)?,
        InputKind::Zip => load_markdown_zip(path)?,
        InputKind::Records => load_records(path)?,
        InputKind::Auto if path.is_dir() => load_markdown_dir(path)?,
        InputKind::Auto if path.extension().and_then(|s| s.to_str()) == Some("zip") => load_markdown_zip(path)?,
        InputKind::Auto => load_records(path)?,
    };
    tracing::info!(input = %path.display(), num_docs = records.len(), "loaded documents");
    Ok(records)
}

fn is_markdown(p: &Path) -> bool {
    matches!(p.extension().and_then(|s| s.to_str()), Some("md" | "mdx"))
}

/// Path of `p` below `root`, `/`-separated. The root itself is dropped, the
/// way an archive's top-level directory is.
fn relative_name(root: &Path, p: &Path) -> String {
    let rel = p.strip_prefix(root).unwrap_or(p);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every `.md` / `.mdx` file under `root`, in path order.
pub fn load_markdown_dir(root: &Path) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() || !is_markdown(p) {
            continue;
        }
        let bytes = fs::read(p).with_context(|| format!("reading {}", p.display()))?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let name = relative_name(root, p);
        records.push(Record::new(name.clone()).with_field("filename", name).with_field("content", content));
    }
    Ok(records)
}

/// Archive entry name without its top-level directory. Single-component
/// names are kept as they are.
fn strip_first_component(name: &str) -> String {
    let parts: Vec<&str> = name.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() > 1 {
        parts[1..].join("/")
    } else {
        name.to_string()
    }
}

/// Every `.md` / `.mdx` entry of a zip archive, in entry-name order, read
/// without unpacking.
pub fn load_markdown_zip(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).with_context(|| format!("{}: not a zip archive", path.display()))?;

    let mut entries: Vec<(String, usize)> = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_file() && is_markdown(Path::new(entry.name())) {
            entries.push((entry.name().to_string(), i));
        }
    }
    entries.sort();

    let mut records = Vec::with_capacity(entries.len());
    for (name, i) in entries {
        let mut entry = archive.by_index(i)?;
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("{}: reading {name}", path.display()))?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let name = strip_first_component(&name);
        records.push(Record::new(name.clone()).with_field("filename", name).with_field("content", content));
    }
    Ok(records)
}

/// Records from a `.json` / `.jsonl` file, or from every such file in a directory.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(path.to_path_buf());
    }

    let mut records = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            load_jsonl(&file, &mut records)?;
        } else {
            load_json(&file, &mut records)?;
        }
    }
    Ok(records)
}

fn load_jsonl(file: &Path, records: &mut Vec<Record>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid JSON", file.display(), lineno + 1))?;
        records.push(parse_record(value).with_context(|| format!("{}:{}", file.display(), lineno + 1))?);
    }
    Ok(())
}

fn load_json(file: &Path, records: &mut Vec<Record>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: Value = serde_json::from_reader(reader).with_context(|| format!("{}: invalid JSON", file.display()))?;
    match json {
        Value::Array(arr) => {
            for v in arr {
                records.push(parse_record(v)?);
            }
        }
        Value::Object(_) => records.push(parse_record(json)?),
        _ => bail!("{}: expected a record or an array of records", file.display()),
    }
    Ok(())
}

/// Accepts `{"identifier", "fields": {..}}` or a flat object whose `id` is
/// the identifier and whose other string members are fields.
pub fn parse_record(value: Value) -> Result<Record> {
    let Value::Object(mut obj) = value else {
        bail!("record must be a JSON object");
    };
    if obj.get("fields").is_some_and(Value::is_object) {
        return Ok(serde_json::from_value(Value::Object(obj))?);
    }

    let identifier = match obj.remove("identifier").or_else(|| obj.remove("id")) {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => bail!("record identifier must be a string or number, got {other}"),
        None => bail!("record has no identifier or id"),
    };
    let mut record = Record::new(identifier);
    for (name, v) in obj {
        match v {
            Value::String(s) => {
                record.fields.insert(name, s);
            }
            Value::Null => {}
            _ => tracing::debug!(field = %name, "skipping non-string member"),
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_record_shape() {
        let r = parse_record(json!({"identifier": "a.md", "fields": {"content": "x", "filename": "a.md"}})).unwrap();
        assert_eq!(r.identifier, "a.md");
        assert_eq!(r.fields["content"], "x");
    }

    #[test]
    fn flat_record_shape() {
        let r = parse_record(json!({"id": 7, "content": "body", "views": 3, "section": "guides"})).unwrap();
        assert_eq!(r.identifier, "7");
        assert_eq!(r.fields.len(), 2);
        assert_eq!(r.fields["section"], "guides");
    }

    #[test]
    fn record_needs_identifier() {
        assert!(parse_record(json!({"content": "body"})).is_err());
        assert!(parse_record(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn archive_names_lose_their_top_directory() {
        assert_eq!(strip_first_component("fastmcp-main/docs/intro.mdx"), "docs/intro.mdx");
        assert_eq!(strip_first_component("fastmcp-main/README.md"), "README.md");
        assert_eq!(strip_first_component("README.md"), "README.md");
    }

    #[test]
    fn relative_names_use_forward_slashes() {
        let root = Path::new("/tmp/fastmcp-main");
        assert_eq!(relative_name(root, &root.join("docs").join("intro.mdx")), "docs/intro.mdx");
    }
}
