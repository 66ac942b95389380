use super::definition::{Block, BlockKind, Connection, EndpointTag, Thread};
use ahash::AHashMap;
use tracing::{debug, warn};

/// Index of a block inside a `ThreadGraph` arena.
pub type BlockIdx = usize;

/// An id-indexed view over a thread's blocks and their outgoing connections.
///
/// Outgoing connections keep their input order, so "first match" lookups are
/// stable across runs.
pub struct ThreadGraph<'a> {
    thread: &'a Thread,
    index: AHashMap<&'a str, BlockIdx>,
    outgoing: Vec<Vec<&'a Connection>>,
}

impl<'a> ThreadGraph<'a> {
    pub fn new(thread: &'a Thread) -> Self {
        let blocks = thread.blocks();
        let index: AHashMap<&'a str, BlockIdx> = blocks
            .iter()
            .enumerate()
            .map(|(idx, block)| (block.id.as_str(), idx))
            .collect();

        let mut outgoing = vec![Vec::new(); blocks.len()];
        for connection in thread.connections() {
            match index.get(connection.source.as_str()) {
                Some(&source) => outgoing[source].push(connection),
                None => warn!(
                    thread = thread.id(),
                    source = %connection.source,
                    "Ignoring connection from unknown block"
                ),
            }
        }

        Self {
            thread,
            index,
            outgoing,
        }
    }

    pub fn thread_id(&self) -> &'a str {
        self.thread.id()
    }

    pub fn block(&self, idx: BlockIdx) -> &'a Block {
        &self.thread.blocks()[idx]
    }

    pub fn lookup(&self, id: &str) -> Option<BlockIdx> {
        self.index.get(id).copied()
    }

    /// The first `start` block of the thread, if there is one.
    pub fn start(&self) -> Option<BlockIdx> {
        self.thread
            .blocks()
            .iter()
            .position(|b| matches!(b.kind, BlockKind::Start))
    }

    /// Follows the first outgoing connection of a non-decision block.
    pub fn next(&self, idx: BlockIdx) -> Option<BlockIdx> {
        let outgoing = &self.outgoing[idx];
        if outgoing.len() > 1 {
            debug!(
                thread = self.thread_id(),
                block = %self.block(idx).id,
                candidates = outgoing.len(),
                "Block has several outgoing connections, following the first"
            );
        }
        outgoing.first().and_then(|c| self.resolve(c))
    }

    /// Follows the first outgoing connection carrying `tag`.
    pub fn branch(&self, idx: BlockIdx, tag: EndpointTag) -> Option<BlockIdx> {
        self.outgoing[idx]
            .iter()
            .find(|c| c.tag == tag)
            .and_then(|c| self.resolve(c))
    }

    fn resolve(&self, connection: &Connection) -> Option<BlockIdx> {
        let target = self.lookup(&connection.target);
        if target.is_none() {
            warn!(
                thread = self.thread_id(),
                source = %connection.source,
                target = %connection.target,
                "Connection points at an unknown block"
            );
        }
        target
    }
}
