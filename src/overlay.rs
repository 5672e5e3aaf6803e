//! Filesystem overlay of the built documentation onto a publishing worktree.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Digest over a directory tree: stable across runs for identical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDigest {
    pub sha256: String,
    pub files: usize,
}

/// Copy every file under `src` into `dest`, preserving the directory
/// structure and overwriting what is already there. `.git` directories are
/// never traversed. Returns the number of files copied.
pub fn copy_tree(src: &Path, dest: &Path) -> io::Result<usize> {
    fn visit(dir: &Path, src_root: &Path, dest_root: &Path, copied: &mut usize) -> io::Result<()> {
        for entry_res in fs::read_dir(dir)? {
            let entry = entry_res?;
            let path = entry.path();
            if path.is_dir() {
                let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if file_name == ".git" {
                    debug!(path = %path.display(), "Skipping directory");
                    continue;
                }
                visit(&path, src_root, dest_root, copied)?;
            } else if path.is_file() {
                let rel = path
                    .strip_prefix(src_root)
                    .expect("walked path is under the walk root");
                let target = dest_root.join(rel);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                match fs::copy(&path, &target) {
                    Ok(_) => {
                        debug!(file = %rel.display(), "Copied file");
                        *copied += 1;
                    }
                    Err(e) => {
                        error!(error = ?e, file = %rel.display(), "Failed to copy file into worktree");
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }

    let mut copied = 0;
    visit(src, src, dest, &mut copied)?;
    info!(
        copied = copied,
        src = %src.display(),
        dest = %dest.display(),
        "Overlaid built documentation onto worktree"
    );
    Ok(copied)
}

/// Remove files from `worktree` that no longer exist under `built`, leaving
/// the `.git` directory untouched. Returns the number of files removed.
pub fn clean_stale(worktree: &Path, built: &Path) -> io::Result<usize> {
    fn visit(dir: &Path, tree_root: &Path, built_root: &Path, removed: &mut usize) -> io::Result<()> {
        for entry_res in fs::read_dir(dir)? {
            let entry = entry_res?;
            let path = entry.path();
            if path.is_dir() {
                let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if file_name == ".git" {
                    continue;
                }
                visit(&path, tree_root, built_root, removed)?;
            } else if path.is_file() {
                let rel = path
                    .strip_prefix(tree_root)
                    .expect("walked path is under the walk root");
                if !built_root.join(rel).is_file() {
                    match fs::remove_file(&path) {
                        Ok(()) => {
                            debug!(file = %rel.display(), "Removed stale file");
                            *removed += 1;
                        }
                        Err(e) => {
                            error!(error = ?e, file = %rel.display(), "Failed to remove stale file");
                            return Err(e);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    let mut removed = 0;
    visit(worktree, worktree, built, &mut removed)?;
    if removed > 0 {
        info!(removed = removed, "Cleaned stale files from worktree");
    }
    Ok(removed)
}

/// Compute a deterministic SHA-256 digest over a directory tree.
///
/// Files are visited in sorted relative-path order; each contributes its
/// path, a separator, and its contents, so both renames and edits change the
/// digest. `.git` directories are excluded.
pub fn tree_digest(root: &Path) -> io::Result<TreeDigest> {
    fn collect(dir: &Path, root: &Path, out: &mut Vec<(String, PathBuf)>) -> io::Result<()> {
        for entry_res in fs::read_dir(dir)? {
            let entry = entry_res?;
            let path = entry.path();
            if path.is_dir() {
                let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if file_name == ".git" {
                    continue;
                }
                collect(&path, root, out)?;
            } else if path.is_file() {
                let rel = path
                    .strip_prefix(root)
                    .expect("walked path is under the walk root");
                out.push((rel.to_string_lossy().into_owned(), path));
            }
        }
        Ok(())
    }

    let mut files = Vec::new();
    collect(root, root, &mut files)?;
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (rel, path) in &files {
        hasher.update(rel.as_bytes());
        hasher.update([0u8]);
        hasher.update(fs::read(path)?);
        hasher.update([0u8]);
    }
    let digest = TreeDigest {
        sha256: format!("{:x}", hasher.finalize()),
        files: files.len(),
    };
    debug!(files = digest.files, sha256 = %digest.sha256, root = %root.display(), "Computed tree digest");
    Ok(digest)
}
