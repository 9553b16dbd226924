//! Compile Adapter
//!
//! Lambda executes handlers on Linux, so a `.go` source input is handed to
//! `go build` pinned to the linux/amd64 target before packaging. The rest
//! of the caller's environment passes through untouched so credentials and
//! proxy settings keep working.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;

const TARGET_OS: (&str, &str) = ("GOOS", "linux");
const TARGET_ARCH: (&str, &str) = ("GOARCH", "amd64");

/// Suffix that marks the input as source rather than a built binary.
const SOURCE_EXTENSION: &str = "go";

/// Whether `path` is a source file that needs compiling first. This is a
/// suffix check only; file contents are never inspected.
pub fn is_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Effective environment for the external build: `base` with only the two
/// target entries replaced.
pub fn cross_compile_env<I>(base: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: Vec<(String, String)> = base
        .into_iter()
        .filter(|(key, _)| key != TARGET_OS.0 && key != TARGET_ARCH.0)
        .collect();
    env.push((TARGET_OS.0.to_string(), TARGET_OS.1.to_string()));
    env.push((TARGET_ARCH.0.to_string(), TARGET_ARCH.1.to_string()));
    env
}

/// Compile `source` into the current working directory and return the path
/// of the produced executable. The caller removes the intermediate once
/// packaging is done.
pub async fn build_source(source: &Path) -> Result<PathBuf> {
    let base = source
        .file_name()
        .context("source path has no file name")?
        .to_string_lossy();
    let output = PathBuf::from(format!("{}.exe", base));

    // Compiler diagnostics go straight to the terminal.
    let status = Command::new("go")
        .arg("build")
        .arg("-o")
        .arg(&output)
        .arg(source)
        .env_clear()
        .envs(cross_compile_env(std::env::vars()))
        .status()
        .await
        .context("failed to start go build")?;

    if !status.success() {
        bail!("go build {} exited with {}", source.display(), status);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_detection_is_suffix_only() {
        assert!(is_source(Path::new("handler.go")));
        assert!(is_source(Path::new("cmd/worker/main.go")));
        assert!(!is_source(Path::new("handler")));
        assert!(!is_source(Path::new("handler.go.bak")));
        assert!(!is_source(Path::new("go")));
    }

    #[test]
    fn env_override_replaces_only_the_target_entries() {
        let base = vec![
            ("PATH".to_string(), "/usr/bin".to_string()),
            ("GOOS".to_string(), "darwin".to_string()),
            ("GOARCH".to_string(), "arm64".to_string()),
            ("HTTPS_PROXY".to_string(), "http://proxy:3128".to_string()),
        ];

        let env = cross_compile_env(base);

        let lookup = |key: &str| -> Vec<&str> {
            env.iter()
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .collect()
        };
        assert_eq!(lookup("GOOS"), vec!["linux"]);
        assert_eq!(lookup("GOARCH"), vec!["amd64"]);
        assert_eq!(lookup("PATH"), vec!["/usr/bin"]);
        assert_eq!(lookup("HTTPS_PROXY"), vec!["http://proxy:3128"]);
    }

    #[test]
    fn env_override_appends_targets_when_absent() {
        let env = cross_compile_env(vec![("HOME".to_string(), "/root".to_string())]);
        assert_eq!(env.len(), 3);
        assert!(env.contains(&("GOOS".to_string(), "linux".to_string())));
        assert!(env.contains(&("GOARCH".to_string(), "amd64".to_string())));
    }
}
