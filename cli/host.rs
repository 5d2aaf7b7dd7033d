//! Filesystem host: directories are folders, regular files are leaves, and
//! a symlink to a directory stands for a nested project.

use formatall_core::{AppError, DocumentHost, ExecutionError, ProjectNode, Selection};
use log;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Placeholder replaced by the file path inside a command.
pub const FILE_PLACEHOLDER: &str = "{file}";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsNode {
    path: PathBuf,
    /// Canonical link targets already entered on the way to this node.
    linked: Vec<PathBuf>,
}

impl FsNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            linked: Vec::new(),
        }
    }

    fn child(&self, path: PathBuf) -> Self {
        Self {
            path,
            linked: self.linked.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_symlinked_dir(&self) -> bool {
        self.path.is_symlink() && self.path.is_dir()
    }
}

impl ProjectNode for FsNode {
    type Error = AppError;

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    fn children(&self) -> Result<Option<Vec<Self>>, Self::Error> {
        if !self.path.is_dir() || self.is_symlinked_dir() {
            return Ok(None);
        }
        let mut children = Vec::new();
        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| AppError::WalkDir(e.to_string()))?;
            children.push(self.child(entry.into_path()));
        }
        log::trace!("{}: {} entries", self.path.display(), children.len());
        Ok(Some(children))
    }

    fn nested_project(&self) -> Result<Option<Self>, Self::Error> {
        if !self.is_symlinked_dir() {
            return Ok(None);
        }
        let canonical = |path: &Path| {
            fs::canonicalize(path).map_err(|e| AppError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })
        };
        let target = canonical(&self.path)?;
        let location = match self.path.parent() {
            Some(parent) => canonical(parent)?,
            None => PathBuf::new(),
        };
        if location.starts_with(&target) || self.linked.iter().any(|dir| dir.starts_with(&target)) {
            log::warn!(
                "Not following {}: it links back to {}",
                self.path.display(),
                target.display()
            );
            return Ok(None);
        }

        log::trace!("{} links to {}", self.path.display(), target.display());
        let mut nested = self.child(target.clone());
        nested.linked.push(target);
        Ok(Some(nested))
    }

    fn is_physical_file(&self) -> bool {
        self.path.is_file()
    }
}

/// Classifies command-line paths into a host selection.
pub fn selection_from_paths(paths: &[PathBuf], solution: bool) -> Vec<Selection<FsNode>> {
    paths
        .iter()
        .map(|path| {
            let node = FsNode::new(path);
            if path.is_dir() {
                if solution {
                    Selection::Solution(node)
                } else {
                    Selection::Project(node)
                }
            } else {
                Selection::Item(node)
            }
        })
        .collect()
}

/// Runs each command as an external process on the file.
///
/// A document counts as "open" once its contents were checked to be text;
/// the batch closes it again after the commands ran. Tools rewrite files in
/// place, so saving is a no-op.
#[derive(Debug, Default)]
pub struct ProcessHost {
    root: Option<PathBuf>,
    open: HashSet<PathBuf>,
    dry_run: bool,
    pub executed: Vec<String>,
}

impl ProcessHost {
    pub fn new(root: Option<PathBuf>, dry_run: bool) -> Self {
        Self {
            root,
            dry_run,
            ..Self::default()
        }
    }

    fn command_line(command: &str, path: &Path) -> String {
        let quoted = shell_quote(&path.to_string_lossy());
        if command.contains(FILE_PLACEHOLDER) {
            command.replace(FILE_PLACEHOLDER, &quoted)
        } else {
            format!("{} {}", command, quoted)
        }
    }
}

impl DocumentHost for ProcessHost {
    type Document = FsNode;

    fn display_name(&self, document: &FsNode) -> String {
        self.root
            .as_ref()
            .and_then(|root| pathdiff::diff_paths(document.path(), root))
            .unwrap_or_else(|| document.path().to_path_buf())
            .to_string_lossy()
            .into_owned()
    }

    fn is_open(&self, document: &FsNode) -> bool {
        self.open.contains(document.path())
    }

    fn open(&mut self, document: &FsNode) -> Result<(), ExecutionError> {
        let bytes = fs::read(document.path()).map_err(|e| {
            ExecutionError::Failed(format!("cannot read {}: {}", document.path().display(), e))
        })?;
        if std::str::from_utf8(&bytes).is_err() {
            return Err(ExecutionError::Skipped("not a text file".to_string()));
        }
        self.open.insert(document.path().to_path_buf());
        Ok(())
    }

    fn activate(&mut self, document: &FsNode) -> Result<(), ExecutionError> {
        if !document.path().is_file() {
            return Err(ExecutionError::Failed(format!(
                "{} no longer exists",
                document.path().display()
            )));
        }
        Ok(())
    }

    fn execute(&mut self, document: &FsNode, command: &str) -> Result<(), ExecutionError> {
        let line = Self::command_line(command, document.path());
        log::debug!("Running: {}", line);
        if self.dry_run {
            self.executed.push(line);
            return Ok(());
        }

        let output = shell(&line)
            .current_dir(self.root.as_deref().unwrap_or_else(|| Path::new(".")))
            .output()
            .map_err(|e| ExecutionError::Failed(format!("cannot start '{}': {}", line, e)))?;
        self.executed.push(line);
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ExecutionError::Failed(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }

    fn save(&mut self, _document: &FsNode) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn close(&mut self, document: &FsNode, _save: bool) -> Result<(), ExecutionError> {
        self.open.remove(document.path());
        Ok(())
    }
}

#[cfg(windows)]
fn shell(line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(line);
    command
}

#[cfg(not(windows))]
fn shell(line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(line);
    command
}

#[cfg(windows)]
fn shell_quote(s: &str) -> String {
    format!("\"{}\"", s)
}

#[cfg(not(windows))]
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formatall_core::{BatchRunner, FileFilter, HierarchyFilter, LogProgress, SelectionPipeline};

    fn touch(path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn names(nodes: &[FsNode]) -> Vec<String> {
        nodes.iter().map(ProjectNode::name).collect()
    }

    #[test]
    fn test_children_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.cs"), b"");
        touch(&dir.path().join("a.cs"), b"");
        fs::create_dir(dir.path().join("sub")).unwrap();

        let root = FsNode::new(dir.path());
        let children = root.children().unwrap().unwrap();
        assert_eq!(names(&children), ["a.cs", "b.cs", "sub"]);
        assert!(FsNode::new(dir.path().join("a.cs")).children().unwrap().is_none());
        assert!(children[0].is_physical_file());
        assert!(!children[2].is_physical_file());
    }

    #[test]
    fn test_directory_selection() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.cs"), b"class A {}");
        touch(&dir.path().join("notes.txt"), b"notes");
        touch(&dir.path().join("Models/user.cs"), b"class U {}");
        touch(&dir.path().join("View.tt/View.cs"), b"class V {}");

        let pipeline = SelectionPipeline::new(HierarchyFilter::new(true), FileFilter::new("*.cs", ""));
        let selection = selection_from_paths(&[dir.path().to_path_buf()], false);
        let selected = pipeline.select(selection).unwrap();
        assert_eq!(names(&selected), ["a.cs", "user.cs"]);
    }

    #[test]
    fn test_solution_selection_uses_subdirectories_as_projects() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("top.cs"), b"");
        touch(&dir.path().join("Core/core.cs"), b"");
        touch(&dir.path().join("Web/site.cs"), b"");

        let selection = selection_from_paths(&[dir.path().to_path_buf()], true);
        assert!(matches!(selection[0], Selection::Solution(_)));
        let selected = SelectionPipeline::default().select(selection).unwrap();
        // The solution's own files are roots too: every direct entry is a project.
        assert_eq!(names(&selected), ["top.cs", "core.cs", "site.cs"]);
    }

    #[test]
    fn test_multiple_paths_select_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.cs"), b"");
        let paths = vec![dir.path().join("a.cs"), dir.path().join("a.cs")];
        let selected = SelectionPipeline::default()
            .select(selection_from_paths(&paths, false))
            .unwrap();
        assert!(selected.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_a_nested_project() {
        let dir = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        touch(&shared.path().join("util.cs"), b"");
        touch(&dir.path().join("app/main.cs"), b"");
        std::os::unix::fs::symlink(shared.path(), dir.path().join("app/shared")).unwrap();

        let link = FsNode::new(dir.path().join("app/shared"));
        assert!(link.children().unwrap().is_none());
        assert!(link.nested_project().unwrap().is_some());

        let selected = SelectionPipeline::default()
            .select(selection_from_paths(&[dir.path().join("app")], false))
            .unwrap();
        assert_eq!(names(&selected), ["main.cs", "util.cs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_link_to_ancestor_is_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        touch(&app.join("main.cs"), b"");
        std::os::unix::fs::symlink(&app, app.join("loop")).unwrap();

        assert!(FsNode::new(app.join("loop")).nested_project().unwrap().is_none());
        let visited = SelectionPipeline::default()
            .candidates(selection_from_paths(&[app.clone()], false))
            .unwrap()
            .take(500)
            .count();
        assert!(visited < 500);
        let selected = SelectionPipeline::default()
            .select(selection_from_paths(&[app], false))
            .unwrap();
        assert_eq!(names(&selected), ["main.cs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_links_pointing_at_each_other_terminate() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        touch(&a.join("one.cs"), b"");
        touch(&b.join("two.cs"), b"");
        std::os::unix::fs::symlink(&b, a.join("to_b")).unwrap();
        std::os::unix::fs::symlink(&a, b.join("to_a")).unwrap();

        let selected = SelectionPipeline::default()
            .select(selection_from_paths(&[a], false))
            .unwrap();
        // b is entered once through a/to_b, a once more through b/to_a.
        assert_eq!(names(&selected), ["one.cs", "two.cs", "one.cs"]);
    }

    #[test]
    fn test_command_line_substitution() {
        let path = Path::new("src/main.rs");
        let with_placeholder = ProcessHost::command_line("rustfmt {file} --check", path);
        let appended = ProcessHost::command_line("rustfmt", path);
        #[cfg(not(windows))]
        {
            assert_eq!(with_placeholder, "rustfmt 'src/main.rs' --check");
            assert_eq!(appended, "rustfmt 'src/main.rs'");
            assert_eq!(shell_quote("it's"), r"'it'\''s'");
        }
        #[cfg(windows)]
        {
            assert_eq!(with_placeholder, "rustfmt \"src/main.rs\" --check");
            assert_eq!(appended, "rustfmt \"src/main.rs\"");
        }
    }

    #[test]
    fn test_dry_run_batch_skips_binary_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.cs"), b"class A {}");
        touch(&dir.path().join("logo.png"), &[0x89, 0x50, 0xff, 0xfe, 0x00]);

        let candidates = vec![
            FsNode::new(dir.path().join("a.cs")),
            FsNode::new(dir.path().join("logo.png")),
        ];
        let mut host = ProcessHost::new(Some(dir.path().to_path_buf()), true);
        let summary = BatchRunner::from_command_list("fmt;lint {file}").run(
            &mut host,
            &candidates,
            &mut LogProgress,
        );

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.items[0].name, "a.cs");
        assert_eq!(host.executed.len(), 2);
        assert!(host.executed[0].starts_with("fmt "));
        assert!(host.executed[1].starts_with("lint "));
        assert!(!host.is_open(&candidates[0]));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_process_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.cs"), b"class A {}");
        let candidates = vec![FsNode::new(dir.path().join("a.cs"))];
        let mut host = ProcessHost::new(Some(dir.path().to_path_buf()), false);

        let summary =
            BatchRunner::from_command_list("true;false").run(&mut host, &candidates, &mut LogProgress);

        assert_eq!(summary.failed, 1);
        assert_eq!(host.executed.len(), 2);
    }
}
