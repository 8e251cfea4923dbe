use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::report::{report, Settings};

/// Directory scanned by the file test mode when none is given.
pub const DEFAULT_DIR: &str = "examples";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub unreadable: usize,
}

impl Summary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.unreadable == 0
    }
}

/// Parses every `*.txt` file in `dir`, in file-name order. A missing
/// directory is reported and yields an empty summary.
pub fn run<W: Write>(dir: &Path, out: &mut W, settings: &Settings) -> io::Result<Summary> {
    writeln!(out, "--- kparse file test mode ({}) ---", dir.display())?;

    if !dir.is_dir() {
        writeln!(
            out,
            "Directory '{}' does not exist. Create it to test files.",
            dir.display()
        )?;
        return Ok(Summary::default());
    }

    let files = match text_files(dir) {
        Ok(files) => files,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "failed to list directory");
            writeln!(out, "Could not list directory '{}': {}", dir.display(), err)?;
            return Ok(Summary::default());
        }
    };

    let summary = check(&files, out, settings)?;
    info!(
        passed = summary.passed,
        failed = summary.failed,
        unreadable = summary.unreadable,
        "file test mode finished"
    );
    Ok(summary)
}

/// Parses the given files, echoing each one's contents first.
pub fn check<W: Write>(paths: &[PathBuf], out: &mut W, settings: &Settings) -> io::Result<Summary> {
    let mut summary = Summary::default();

    for path in paths {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        writeln!(out, "\nParsing file: {}", name)?;
        info!(file = %path.display(), "parsing file");

        let source = match fs::read_to_string(path) {
            Ok(source) => universal_newlines(&source),
            Err(err) => {
                warn!(file = %path.display(), error = %err, "failed to read file");
                writeln!(out, "Could not read file {}: {}", name, err)?;
                summary.unreadable += 1;
                continue;
            }
        };

        writeln!(out, "--- Contents ---")?;
        writeln!(out, "{}", source)?;
        writeln!(out, "----------------")?;

        if report(out, &source, settings)? {
            summary.passed += 1;
        } else {
            summary.failed += 1;
        }
    }

    writeln!(
        out,
        "\n{} passed, {} failed, {} unreadable",
        summary.passed, summary.failed, summary.unreadable
    )?;
    Ok(summary)
}

/// Files are read in text mode: `\r\n` and lone `\r` both become `\n`.
fn universal_newlines(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

fn text_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kparse-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_directory() {
        let dir = std::env::temp_dir().join("kparse-does-not-exist");
        let mut out = Vec::new();
        let summary = run(&dir, &mut out, &Settings::default()).unwrap();
        assert_eq!(summary, Summary::default());
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("does not exist"));
    }

    #[test]
    fn test_only_txt_files_in_name_order() {
        let dir = scratch_dir("order");
        fs::write(dir.join("b.txt"), "if (x > 5 { y = 1 }").unwrap();
        fs::write(dir.join("a.txt"), "val x = 10;\nprintln(\"hi\")").unwrap();
        fs::write(dir.join("notes.md"), "not kotlin").unwrap();

        let mut out = Vec::new();
        let summary = run(&dir, &mut out, &Settings::default()).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(
            summary,
            Summary {
                passed: 1,
                failed: 1,
                unreadable: 0
            }
        );
        let a = out.find("Parsing file: a.txt").unwrap();
        let b = out.find("Parsing file: b.txt").unwrap();
        assert!(a < b);
        assert!(!out.contains("notes.md"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_crlf_files() {
        let dir = scratch_dir("crlf");
        fs::write(dir.join("windows.txt"), "val x = 1;\r\nif (x > 0) {\r\n  x = 2\r\n}\r\n").unwrap();

        let mut out = Vec::new();
        let summary = run(&dir, &mut out, &Settings::default()).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(summary.passed, 1);
        assert!(!out.contains("Illegal character"));
        assert!(!out.contains('\r'));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_newline_normalisation() {
        assert_eq!(universal_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_unreadable_file_does_not_stop_others() {
        let dir = scratch_dir("unreadable");
        fs::create_dir(dir.join("folder.txt")).unwrap();
        fs::write(dir.join("ok.txt"), "a = 1").unwrap();

        let mut out = Vec::new();
        let summary = run(&dir, &mut out, &Settings::default()).unwrap();
        assert_eq!(summary.unreadable, 1);
        assert_eq!(summary.passed, 1);
        assert!(!summary.all_passed());
        fs::remove_dir_all(&dir).unwrap();
    }
}
