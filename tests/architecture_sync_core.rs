use std::fs;
use std::path::{Path, PathBuf};

/// Modules that make up the synchronous scoring core
const CORE_DIRS: &[&str] = &[
    "src/domain",
    "src/features",
    "src/scoring",
    "src/provider",
    "src/selection.rs",
    "src/rationale.rs",
    "src/validation.rs",
];

const FORBIDDEN: &[&str] = &["axum::", "tokio::", "tower_http::", ".await"];

fn collect_rust_files(root: &Path, out: &mut Vec<PathBuf>) {
    if root.is_file() {
        out.push(root.to_path_buf());
        return;
    }
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, out);
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

#[test]
fn scoring_core_stays_free_of_async_runtime() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    for dir in CORE_DIRS {
        collect_rust_files(&repo_root.join(dir), &mut files);
    }
    assert!(!files.is_empty());

    let mut offenders = Vec::new();
    for file in files {
        let rel = file
            .strip_prefix(repo_root)
            .unwrap_or(&file)
            .to_string_lossy()
            .replace('\\', "/");
        let content = fs::read_to_string(&file).unwrap_or_default();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }
            if FORBIDDEN.iter().any(|needle| trimmed.contains(needle)) {
                offenders.push(format!("{}:{}: {}", rel, idx + 1, trimmed));
            }
        }
    }

    assert!(
        offenders.is_empty(),
        "async runtime usage found in the synchronous core:\n{}",
        offenders.join("\n")
    );
}
