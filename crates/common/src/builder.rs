use futures::future::BoxFuture;

use crate::blob::{BlobError, EncryptedBlobs, LinkWriter};
use crate::entrypoint::{Directory, Reference, DIR_MIME_TYPE};

#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("empty path")]
    EmptyPath,
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("no such entry: {0}")]
    NotFound(String),
    #[error(transparent)]
    Blob(#[from] BlobError),
}

#[derive(Debug, Clone)]
enum Node {
    Entry(Reference),
    Dir(Vec<(String, Node)>),
}

impl Node {
    fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self {
            Node::Dir(children) => children
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, node)| node),
            Node::Entry(_) => None,
        }
    }
}

/// In-memory tree of pending directory changes over [`EncryptedBlobs`].
///
/// File content is written immediately; directory blobs are only written by
/// [`TreeBuilder::flush`]. Entries keep the order in which they were first
/// added.
#[derive(Debug)]
pub struct TreeBuilder {
    blobs: EncryptedBlobs,
    root: Node,
}

impl TreeBuilder {
    pub fn new(blobs: EncryptedBlobs) -> Self {
        Self {
            blobs,
            root: Node::Dir(Vec::new()),
        }
    }

    pub fn blobs(&self) -> &EncryptedBlobs {
        &self.blobs
    }

    /// Store `data` as a static blob and place it at `path`, creating parent
    /// directories as needed.
    pub async fn add_file(
        &mut self,
        path: &[&str],
        data: &[u8],
        mime_type: &str,
    ) -> Result<Reference, BuilderError> {
        let (name, key) = self.blobs.create_static(data).await?;
        let reference = Reference::new(&name, &key).with_mime_type(mime_type);
        self.set_entry(path, reference.clone())?;
        Ok(reference)
    }

    /// Place an existing reference at `path`, replacing whatever was there.
    pub fn set_entry(&mut self, path: &[&str], reference: Reference) -> Result<(), BuilderError> {
        *self.slot(path)? = Node::Entry(reference);
        Ok(())
    }

    /// Replace the entry at `path` with a dynamic link pointing at it.
    ///
    /// The new directory entry keeps the target's MIME type. Returns the
    /// reference the link points at and the writer needed to update it.
    pub async fn inject_link(
        &mut self,
        path: &[&str],
    ) -> Result<(Reference, LinkWriter), BuilderError> {
        if path.is_empty() {
            return Err(BuilderError::EmptyPath);
        }
        let blobs = self.blobs.clone();
        let slot = self.existing(path)?;
        let target = flush_node(&blobs, slot).await?;

        let (name, key, writer) = blobs.create_link(&target.to_bytes()).await?;
        *slot = Node::Entry(Reference::new(&name, &key).with_mime_type(target.mime_type()));
        Ok((target, writer))
    }

    /// Write every pending directory blob and return the root reference.
    pub async fn flush(&mut self) -> Result<Reference, BuilderError> {
        let root = flush_node(&self.blobs, &self.root).await?;
        tracing::debug!(mime_type = root.mime_type(), "flushed tree");
        Ok(root)
    }

    fn existing(&mut self, path: &[&str]) -> Result<&mut Node, BuilderError> {
        let mut node = &mut self.root;
        for (i, part) in path.iter().enumerate() {
            node = node
                .child_mut(part)
                .ok_or_else(|| BuilderError::NotFound(path[..=i].join("/")))?;
        }
        Ok(node)
    }

    fn slot(&mut self, path: &[&str]) -> Result<&mut Node, BuilderError> {
        let (last, parents) = path.split_last().ok_or(BuilderError::EmptyPath)?;

        let mut node = &mut self.root;
        for (i, part) in parents.iter().enumerate() {
            let Node::Dir(children) = node else {
                return Err(BuilderError::NotADirectory(path[..i].join("/")));
            };
            let pos = match children.iter().position(|(n, _)| n == part) {
                Some(pos) => pos,
                None => {
                    children.push((part.to_string(), Node::Dir(Vec::new())));
                    children.len() - 1
                }
            };
            node = &mut children[pos].1;
        }

        let Node::Dir(children) = node else {
            return Err(BuilderError::NotADirectory(parents.join("/")));
        };
        let pos = match children.iter().position(|(n, _)| n == last) {
            Some(pos) => pos,
            None => {
                children.push((last.to_string(), Node::Dir(Vec::new())));
                children.len() - 1
            }
        };
        Ok(&mut children[pos].1)
    }
}

fn flush_node<'a>(
    blobs: &'a EncryptedBlobs,
    node: &'a Node,
) -> BoxFuture<'a, Result<Reference, BuilderError>> {
    Box::pin(async move {
        match node {
            Node::Entry(reference) => Ok(reference.clone()),
            Node::Dir(children) => {
                let mut dir = Directory::new();
                for (name, child) in children {
                    dir.push(name.clone(), flush_node(blobs, child).await?);
                }
                let (name, key) = blobs.create_static(&dir.to_bytes()).await?;
                Ok(Reference::new(&name, &key).with_mime_type(DIR_MIME_TYPE))
            }
        }
    })
}
