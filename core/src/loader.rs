use crate::model::{Asset, NewAsset};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read assets from a `.json` file (array or single object), a `.jsonl`
/// file, or a directory containing either. Directory entries are visited in
/// path order so ingestion order is stable between runs.
pub fn load_assets<P: AsRef<Path>>(path: P) -> Result<Vec<Asset>> {
    let input_path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_record_file(p) {
                files.push(p.to_path_buf());
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        anyhow::bail!("asset input {} does not exist", input_path.display());
    }

    let mut assets = Vec::new();
    for file in files {
        let before = assets.len();
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut assets)?;
        } else {
            read_json(&file, &mut assets)?;
        }
        tracing::debug!(file = %file.display(), count = assets.len() - before, "loaded asset file");
    }
    Ok(assets)
}

fn is_record_file(p: &Path) -> bool {
    matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl"))
}

fn read_jsonl(file: &Path, out: &mut Vec<Asset>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let new: NewAsset = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid asset record", file.display(), lineno + 1))?;
        out.push(Asset::from_new(new));
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<Asset>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("{}: invalid json", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let new: NewAsset = serde_json::from_value(v)
                    .with_context(|| format!("{}: invalid asset record", file.display()))?;
                out.push(Asset::from_new(new));
            }
        }
        serde_json::Value::Object(_) => {
            let new: NewAsset = serde_json::from_value(json)
                .with_context(|| format!("{}: invalid asset record", file.display()))?;
            out.push(Asset::from_new(new));
        }
        _ => anyhow::bail!("{}: expected an object or an array of objects", file.display()),
    }
    Ok(())
}
