//! Directory tree building.
//!
//! Walks a folder into an owned [`TreeNode`] hierarchy. Unreadable entries are
//! skipped and reported in [`BuildReport::skipped`] instead of aborting the walk.
//! Symlinks are never followed, so the walk cannot loop.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, warn};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One filesystem entry and, for directories, its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub is_dir: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            children: Vec::new(),
        }
    }

    pub fn dir(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            children,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// An entry left out of the tree because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

/// The built tree plus everything that was skipped on the way.
#[derive(Debug)]
pub struct BuildReport {
    pub root: TreeNode,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Directories at this depth are listed without children (root is depth 0).
    pub max_depth: Option<usize>,
    pub show_hidden: bool,
    pub respect_gitignore: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            show_hidden: false,
            respect_gitignore: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to read directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Builds the tree rooted at `root`.
pub fn build_tree(root: &Path, options: &TreeOptions) -> Result<BuildReport, TreeError> {
    let meta = fs::metadata(root).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => TreeError::NotFound(root.to_path_buf()),
        _ => TreeError::Unreadable {
            path: root.to_path_buf(),
            source: err,
        },
    })?;
    if !meta.is_dir() {
        return Err(TreeError::NotADirectory(root.to_path_buf()));
    }

    debug!("Building file tree for directory: {}", root.display());

    let mut walker = Walker {
        options,
        gitignore: load_gitignore(root, options),
        skipped: Vec::new(),
    };

    // The root itself must be listable; failures below it are skipped.
    let entries = fs::read_dir(root).map_err(|source| TreeError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;
    let children = walker.collect_children(entries, root, 0);

    Ok(BuildReport {
        root: TreeNode::dir(root_name(root), children),
        skipped: walker.skipped,
    })
}

struct Walker<'a> {
    options: &'a TreeOptions,
    gitignore: Option<Gitignore>,
    skipped: Vec<SkippedEntry>,
}

/// A directory entry that passed the filters, not yet turned into a node.
struct Listed {
    name: OsString,
    path: PathBuf,
    file_type: fs::FileType,
}

impl Walker<'_> {
    fn collect_children(
        &mut self,
        entries: fs::ReadDir,
        dir: &Path,
        depth: usize,
    ) -> Vec<TreeNode> {
        if self.at_depth_limit(depth) {
            debug!("Depth limit reached at {}", dir.display());
            return Vec::new();
        }
        let listed = self.list(entries, dir);
        self.build_nodes(listed, depth)
    }

    fn at_depth_limit(&self, depth: usize) -> bool {
        self.options.max_depth.is_some_and(|max| depth >= max)
    }

    /// Filters and sorts the entries of one directory.
    fn list(&mut self, entries: fs::ReadDir, dir: &Path) -> Vec<Listed> {
        let mut listed = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.skip(dir.to_path_buf(), &err);
                    continue;
                }
            };
            // DirEntry::file_type does not traverse symlinks.
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(err) => {
                    self.skip(entry.path(), &err);
                    continue;
                }
            };
            let name = entry.file_name();
            let path = entry.path();
            if self.is_excluded(&name, &path, file_type.is_dir()) {
                continue;
            }
            listed.push(Listed {
                name,
                path,
                file_type,
            });
        }

        listed.sort_by(|a, b| a.name.cmp(&b.name));
        listed
    }

    /// Turns listed entries of a directory at `depth` into nodes, descending
    /// into subdirectories.
    fn build_nodes(&mut self, listed: Vec<Listed>, depth: usize) -> Vec<TreeNode> {
        let mut children = Vec::with_capacity(listed.len());
        for Listed {
            name,
            path,
            file_type,
        } in listed
        {
            let name = name.to_string_lossy().into_owned();
            if !file_type.is_dir() {
                children.push(TreeNode::file(name));
                continue;
            }

            // Directories at the limit are never opened.
            if self.at_depth_limit(depth + 1) {
                children.push(TreeNode::dir(name, Vec::new()));
                continue;
            }

            match fs::read_dir(&path) {
                Ok(sub_entries) => {
                    let grandchildren = self.collect_children(sub_entries, &path, depth + 1);
                    children.push(TreeNode::dir(name, grandchildren));
                }
                Err(err) => self.skip(path, &err),
            }
        }
        children
    }

    fn is_excluded(&self, name: &OsStr, path: &Path, is_dir: bool) -> bool {
        if !self.options.show_hidden && is_hidden(name) {
            return true;
        }
        self.gitignore
            .as_ref()
            .is_some_and(|ig| ig.matched(path, is_dir).is_ignore())
    }

    fn skip(&mut self, path: PathBuf, err: &io::Error) {
        warn!("Skipping {}: {err}", path.display());
        self.skipped.push(SkippedEntry {
            path,
            reason: err.to_string(),
        });
    }
}

/// Determines if a file/folder is hidden (starts with a dot)
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

fn load_gitignore(root: &Path, options: &TreeOptions) -> Option<Gitignore> {
    if !options.respect_gitignore {
        return None;
    }
    let path = root.join(".gitignore");
    if !path.is_file() {
        return None;
    }

    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(&path) {
        warn!("Ignoring malformed {}: {err}", path.display());
        return None;
    }
    match builder.build() {
        Ok(ig) => Some(ig),
        Err(err) => {
            warn!("Ignoring malformed {}: {err}", path.display());
            None
        }
    }
}

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            root.canonicalize()
                .ok()?
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| root.display().to_string())
}
