//! Dataset acquisition: wipe the dataset root, fetch the remote resource into
//! it and unpack every `.tar.gz` found directly inside.
//!
//! This is destructive. Anything already in the root directory is deleted
//! before the fetch starts, and nothing is restored on failure.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::read::GzDecoder;
use log::{debug, info};

use crate::error::{Error, Result};

/// Places the remote dataset resource into a directory.
pub trait Fetch {
    /// Populate `dest` (existing and empty) with the contents found at `url`.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Fetches by shallow-cloning a git repository with the `git` executable.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    program: PathBuf,
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl GitFetcher {
    /// Use a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Fetch for GitFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        info!("cloning {url} into {}", dest.display());
        let output = Command::new(&self.program)
            .args(["clone", "--depth", "1", "--quiet", url])
            .arg(dest)
            .output()
            .map_err(|e| Error::Fetch {
                url: url.to_string(),
                reason: format!("running {}: {e}", self.program.display()),
            })?;

        if !output.status.success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                reason: format!(
                    "git exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

/// Recreate `root` from scratch, fetch `url` into it and unpack its archives.
///
/// `root` must be absolute. The process working directory is never changed.
pub fn download(root: &Path, url: &str, fetcher: &dyn Fetch) -> Result<()> {
    if !root.is_absolute() {
        return Err(Error::Config(format!(
            "dataset directory must be absolute, got {}",
            root.display()
        )));
    }
    if root.exists() {
        info!("removing existing dataset directory {}", root.display());
        std::fs::remove_dir_all(root)?;
    }
    std::fs::create_dir_all(root)?;

    fetcher.fetch(url, root)?;

    let unpacked = unpack_archives(root)?;
    info!("dataset ready in {} ({unpacked} archives unpacked)", root.display());
    Ok(())
}

/// Extract every `*.tar.gz` directly inside `dir` into `dir`, in name order.
/// Returns the number of archives extracted.
pub fn unpack_archives(dir: &Path) -> Result<usize> {
    let mut archives = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_tar_gz = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".tar.gz"));
        if is_tar_gz && entry.file_type()?.is_file() {
            archives.push(path);
        }
    }
    archives.sort();

    for path in &archives {
        debug!("unpacking {}", path.display());
        unpack_tar_gz(path, dir).map_err(|source| Error::Archive {
            path: path.clone(),
            source,
        })?;
    }
    Ok(archives.len())
}

fn unpack_tar_gz(path: &Path, dest: &Path) -> std::io::Result<()> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    tar::Archive::new(decoder).unpack(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("muct-acquire-{}-{name}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    /// Drops a single archive into the destination.
    struct ArchiveFetcher;

    impl Fetch for ArchiveFetcher {
        fn fetch(&self, _url: &str, dest: &Path) -> Result<()> {
            write_tar_gz(
                &dest.join("muct-landmarks-v1.tar.gz"),
                &[("muct-landmarks/muct76-opencv.csv", &b"name,tag\n"[..])],
            );
            Ok(())
        }
    }

    struct FailingFetcher;

    impl Fetch for FailingFetcher {
        fn fetch(&self, url: &str, _dest: &Path) -> Result<()> {
            Err(Error::Fetch {
                url: url.to_string(),
                reason: "offline".into(),
            })
        }
    }

    #[test]
    fn download_replaces_old_contents() {
        let root = scratch_dir("replace");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("stale.txt"), "old").unwrap();

        download(&root, "unused", &ArchiveFetcher).unwrap();

        assert!(!root.join("stale.txt").exists());
        assert!(root.join("muct-landmarks/muct76-opencv.csv").is_file());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn fetch_failure_propagates() {
        let root = scratch_dir("fail");
        let err = download(&root, "https://example.invalid/x.git", &FailingFetcher).unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn relative_root_is_rejected() {
        let err = download(Path::new("data/muct"), "unused", &ArchiveFetcher).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn only_top_level_archives_are_unpacked() {
        let root = scratch_dir("toplevel");
        std::fs::create_dir_all(root.join("nested")).unwrap();
        write_tar_gz(&root.join("a.tar.gz"), &[("a.txt", &b"a"[..])]);
        write_tar_gz(&root.join("nested/b.tar.gz"), &[("b.txt", &b"b"[..])]);
        std::fs::write(root.join("notes.gz"), "not an archive").unwrap();

        assert_eq!(unpack_archives(&root).unwrap(), 1);
        assert!(root.join("a.txt").is_file());
        assert!(!root.join("b.txt").exists());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let root = scratch_dir("corrupt");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("bad.tar.gz"), "definitely not gzip").unwrap();

        assert!(matches!(unpack_archives(&root), Err(Error::Archive { .. })));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_git_executable_is_a_fetch_error() {
        let root = scratch_dir("no-git");
        let fetcher = GitFetcher::with_program("/nonexistent/git");
        match download(&root, "https://example.invalid/x.git", &fetcher) {
            Err(Error::Fetch { url, reason }) => {
                assert_eq!(url, "https://example.invalid/x.git");
                assert!(reason.contains("/nonexistent/git"));
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
        std::fs::remove_dir_all(&root).ok();
    }

    #[cfg(unix)]
    #[test]
    fn failing_clone_is_a_fetch_error() {
        let root = scratch_dir("git-fails");
        let err = download(&root, "unused", &GitFetcher::with_program("false")).unwrap_err();
        match err {
            Error::Fetch { reason, .. } => assert!(reason.starts_with("git exited with")),
            other => panic!("expected fetch error, got {other:?}"),
        }
        std::fs::remove_dir_all(&root).ok();
    }

    #[cfg(unix)]
    #[test]
    fn clean_git_exit_is_accepted() {
        let root = scratch_dir("git-ok");
        download(&root, "unused", &GitFetcher::with_program("true")).unwrap();
        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
        std::fs::remove_dir_all(&root).ok();
    }
}
