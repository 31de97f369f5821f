//! Assembling loaded routers into one mount tree.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::error::CollisionError;
use super::loader::LoadedModule;
use super::path::MountPath;
use crate::router::Router;

/// One node of the mount tree.
///
/// Intermediate nodes created for nested paths carry no router of their own.
#[derive(Debug)]
pub struct MountNode {
    path: MountPath,
    router: Option<Router>,
    source: Option<PathBuf>,
    order: usize,
    children: Vec<MountNode>,
}

impl MountNode {
    fn new(path: MountPath) -> Self {
        Self {
            path,
            router: None,
            source: None,
            order: 0,
            children: Vec::new(),
        }
    }

    pub fn path(&self) -> &MountPath {
        &self.path
    }

    pub fn router(&self) -> Option<&Router> {
        self.router.as_ref()
    }

    /// Source module of the attached router, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Children in the order they were first reached during the scan.
    pub fn children(&self) -> &[MountNode] {
        &self.children
    }

    fn segment(&self) -> Option<&str> {
        self.path.segments().last().map(String::as_str)
    }

    fn child_mut(&mut self, segment: &str) -> &mut MountNode {
        let position = self
            .children
            .iter()
            .position(|child| child.segment() == Some(segment));

        let index = match position {
            Some(index) => index,
            None => {
                let mut segments = self.path.segments().to_vec();
                segments.push(segment.to_string());
                self.children.push(MountNode::new(MountPath::from_segments(segments)));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    fn take_routers(&mut self, out: &mut Vec<(usize, MountPath, Router)>) {
        if let Some(router) = self.router.take() {
            out.push((self.order, self.path.clone(), router));
        }
        for child in &mut self.children {
            child.take_routers(out);
        }
    }
}

/// A router attached during composition, listed in attach order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mount {
    pub path: MountPath,
    pub source: PathBuf,
}

/// Builds a [`MountTree`] from `(MountPath, LoadedModule)` pairs.
pub struct Composer {
    root: MountNode,
    mounts: Vec<Mount>,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            root: MountNode::new(MountPath::root()),
            mounts: Vec::new(),
        }
    }

    /// Returns the source already attached at `path`, if any.
    pub fn claimed_by(&self, path: &MountPath) -> Option<&Path> {
        let mut node = &self.root;
        for segment in path.segments() {
            node = node
                .children
                .iter()
                .find(|child| child.segment() == Some(segment.as_str()))?;
        }
        node.source()
    }

    /// Attaches `module` at `path`, creating intermediate nodes as needed.
    pub fn attach(&mut self, path: MountPath, module: LoadedModule) -> Result<(), CollisionError> {
        let order = self.mounts.len();

        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.child_mut(segment);
        }

        if let Some(first) = &node.source {
            return Err(CollisionError::new(
                path,
                first.clone(),
                module.source_path().to_path_buf(),
            ));
        }

        let source = module.source_path().to_path_buf();
        node.source = Some(source.clone());
        node.router = Some(module.into_router());
        node.order = order;

        self.mounts.push(Mount { path, source });
        Ok(())
    }

    pub fn finish(self) -> MountTree {
        MountTree {
            root: self.root,
            mounts: self.mounts,
        }
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of a successful composition pass.
#[derive(Debug)]
pub struct MountTree {
    root: MountNode,
    mounts: Vec<Mount>,
}

impl MountTree {
    pub fn root(&self) -> &MountNode {
        &self.root
    }

    /// Every attached router's path and source, in attach order.
    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Flattens the tree into one router.
    ///
    /// Routers are mounted in attach order rather than tree order, so route
    /// matching priority follows the scan. A root `index.rs` keeps its place
    /// among its siblings instead of jumping ahead of them.
    pub fn into_router(mut self) -> Router {
        let mut attached = Vec::with_capacity(self.mounts.len());
        self.root.take_routers(&mut attached);
        attached.sort_by_key(|(order, _, _)| *order);

        attached
            .into_iter()
            .fold(Router::new(), |composed, (_, path, router)| {
                composed.mount(&path.to_pattern(), router)
            })
    }
}
