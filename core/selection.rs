use crate::filters::{FileFilter, HierarchyFilter};
use crate::recursive::RecursiveExt;
use log;
use serde::{Deserialize, Serialize};

/// An item of the host's project model: a solution, project, folder, file,
/// or a nested sub-project.
///
/// Handles are expected to be cheap to clone. The pipeline never caches
/// what these methods return, so they may be called repeatedly.
pub trait ProjectNode: Clone {
    type Error;

    fn name(&self) -> String;

    /// Direct children in display order. `None` when the node exposes no
    /// child collection at all.
    fn children(&self) -> Result<Option<Vec<Self>>, Self::Error>;

    /// The sub-project this node stands for, when the host models a folder
    /// or project reference as a project of its own.
    fn nested_project(&self) -> Result<Option<Self>, Self::Error>;

    /// True when the node is a physical file that commands can run on.
    fn is_physical_file(&self) -> bool;
}

/// A selected item, classified by what it represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<N> {
    /// Expands to its immediate projects.
    Solution(N),
    Project(N),
    Item(N),
}

impl<N> Selection<N> {
    pub fn node(&self) -> &N {
        match self {
            Selection::Solution(node) | Selection::Project(node) | Selection::Item(node) => node,
        }
    }
}

/// Whether the hierarchy filter also gates descent through a nested
/// sub-project, or only through a real child collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubProjectDescent {
    #[default]
    Filtered,
    Always,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionPipeline {
    hierarchy_filter: HierarchyFilter,
    file_filter: FileFilter,
    sub_project_descent: SubProjectDescent,
}

impl SelectionPipeline {
    pub fn new(hierarchy_filter: HierarchyFilter, file_filter: FileFilter) -> Self {
        Self {
            hierarchy_filter,
            file_filter,
            sub_project_descent: SubProjectDescent::default(),
        }
    }

    pub fn with_sub_project_descent(mut self, sub_project_descent: SubProjectDescent) -> Self {
        self.sub_project_descent = sub_project_descent;
        self
    }

    pub fn hierarchy_filter(&self) -> &HierarchyFilter {
        &self.hierarchy_filter
    }

    pub fn file_filter(&self) -> &FileFilter {
        &self.file_filter
    }

    pub fn sub_project_descent(&self) -> SubProjectDescent {
        self.sub_project_descent
    }

    /// Resolves the traversal roots. Anything but exactly one selected item
    /// yields no roots.
    pub fn roots<N: ProjectNode>(&self, selection: Vec<Selection<N>>) -> Result<Vec<N>, N::Error> {
        if selection.len() != 1 {
            log::debug!(
                "Selection holds {} items; only a single selection is processed.",
                selection.len()
            );
            return Ok(Vec::new());
        }

        match selection.into_iter().next() {
            Some(Selection::Solution(solution)) => {
                let projects = solution.children()?.unwrap_or_default();
                log::debug!(
                    "Solution '{}' expands to {} project(s).",
                    solution.name(),
                    projects.len()
                );
                Ok(projects)
            }
            Some(Selection::Project(node)) | Some(Selection::Item(node)) => {
                log::debug!("Traversal root: {}", node.name());
                Ok(vec![node])
            }
            None => Ok(Vec::new()),
        }
    }

    /// Children to visit below `node`, after applying the hierarchy filter.
    pub fn child_policy<N: ProjectNode>(&self, node: &N) -> Result<Vec<N>, N::Error> {
        let name = node.name();
        let accepted = self.hierarchy_filter.accepts(&name);
        if !accepted && self.sub_project_descent == SubProjectDescent::Filtered {
            log::debug!("Hierarchy filter stops descent into: {}", name);
            return Ok(Vec::new());
        }

        let direct = node.children()?.unwrap_or_default();
        if !direct.is_empty() {
            if accepted {
                log::trace!("Descending into {} ({} children)", name, direct.len());
                return Ok(direct);
            }
            log::debug!("Hierarchy filter stops descent into: {}", name);
            return Ok(Vec::new());
        }

        match node.nested_project()? {
            Some(nested) => {
                let items = nested.children()?.unwrap_or_default();
                log::trace!(
                    "Descending into nested project of {} ({} items)",
                    name,
                    items.len()
                );
                Ok(items)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Leaves that pass both filters, in breadth-first discovery order.
    ///
    /// Host errors are yielded in place; traversal continues afterwards.
    pub fn candidates<'a, N>(
        &'a self,
        selection: Vec<Selection<N>>,
    ) -> Result<impl Iterator<Item = Result<N, N::Error>> + 'a, N::Error>
    where
        N: ProjectNode + 'a,
        N::Error: 'a,
    {
        let roots = self.roots(selection)?;
        Ok(roots
            .into_iter()
            .try_breadth_first(move |node: &N| self.child_policy(node))
            .filter(move |visited| match visited {
                Ok(node) => self.is_candidate(node),
                Err(_) => true,
            }))
    }

    /// Collects the candidate list, stopping at the first host error.
    pub fn select<N: ProjectNode>(&self, selection: Vec<Selection<N>>) -> Result<Vec<N>, N::Error> {
        let candidates = self.candidates(selection)?.collect::<Result<Vec<_>, _>>()?;
        log::info!("Selected {} candidate file(s).", candidates.len());
        Ok(candidates)
    }

    fn is_candidate<N: ProjectNode>(&self, node: &N) -> bool {
        node.is_physical_file() && self.file_filter.accepts(&node.name())
    }
}
