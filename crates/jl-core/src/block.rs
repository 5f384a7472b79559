//! Outline block tree.
//!
//! Journals are tab-indented outlines where each `- ` line opens a block and
//! any other line belongs to the most recently opened block:
//!
//! ```text
//! - Standup notes
//!   reviewed yesterday's work
//! 	- LATER ABC-123: Fix login redirect
//! 	  time:: 30m
//! ```
//!
//! Blocks live in an arena ([`BlockTree`]) and refer to each other by
//! [`BlockId`], so the parent back-reference needs no shared ownership.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::journal::Problem;
use crate::logbook::LogEntryError;
use crate::task::TaskData;

/// Indent of the root block, shallower than any real line.
pub const ROOT_INDENT: i32 = -1;

/// List marker that opens a new block.
pub const BLOCK_MARKER: char = '-';

/// Exact prefix a task line must open with.
const TASK_MARKER: &str = "- ";

/// Suffix of the first token of a `key:: value` property line.
pub const PROPERTY_MARKER: &str = "::";

/// Content marker designating the switching-cost catch-all task.
pub const CATCH_ALL_MARKER: &str = "[CATCH-ALL]";

/// Handle to a block within a [`BlockTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BlockId(usize);

impl BlockId {
    /// The root block of every tree.
    pub const ROOT: Self = Self(0);
}

/// Recoverable problems with a single line of block content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    /// A property key appeared twice on the same block.
    #[error("duplicate property {key:?} for block {block:?}")]
    DuplicateProperty { key: String, block: String },

    /// A timer line could not be decoded.
    #[error(transparent)]
    Timer(#[from] LogEntryError),
}

/// Rejected catch-all designations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatchAllError {
    /// A different block is already the catch-all.
    #[error("only a single catch-all block is supported per journal; keeping {existing:?}, ignoring {rejected:?}")]
    AlreadySet { existing: String, rejected: String },

    /// The marked block is not a task and cannot hold logged time.
    #[error("catch-all marker on non-task block {0:?} ignored")]
    NotATask(String),
}

/// Kind-specific block data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Plain,
    Task(TaskData),
}

/// A node of the outline tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    indent: i32,
    content: String,
    properties: IndexMap<String, String>,
    continuation_lines: Vec<String>,
    parent: Option<BlockId>,
    children: Vec<BlockId>,
    kind: BlockKind,
}

impl Block {
    fn new(indent: i32, content: &str, kind: BlockKind) -> Self {
        Self {
            indent,
            content: content.to_string(),
            properties: IndexMap::new(),
            continuation_lines: Vec::new(),
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    pub const fn indent(&self) -> i32 {
        self.indent
    }

    /// Text of the line that opened the block, without the list marker.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub(crate) fn remove_property(&mut self, key: &str) -> Option<String> {
        self.properties.shift_remove(key)
    }

    /// Plain lines belonging to the block, blank lines included.
    pub fn continuation_lines(&self) -> &[String] {
        &self.continuation_lines
    }

    pub const fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    pub fn children(&self) -> &[BlockId] {
        &self.children
    }

    pub const fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub const fn task(&self) -> Option<&TaskData> {
        match &self.kind {
            BlockKind::Task(task) => Some(task),
            BlockKind::Plain => None,
        }
    }

    pub(crate) const fn task_mut(&mut self) -> Option<&mut TaskData> {
        match &mut self.kind {
            BlockKind::Task(task) => Some(task),
            BlockKind::Plain => None,
        }
    }

    pub const fn is_task(&self) -> bool {
        matches!(self.kind, BlockKind::Task(_))
    }

    /// Ingest a line that continues this block rather than opening a new one.
    ///
    /// Property lines populate [`Block::properties`]; task blocks additionally
    /// consume logbook sentinels and timer lines. Anything else is kept as a
    /// continuation line. A line that errors is dropped.
    pub fn ingest_line(&mut self, content: &str) -> Result<(), LineError> {
        let content = content.trim();

        let Some(content) = self.take_property(content)? else {
            return Ok(());
        };

        let remaining = match &mut self.kind {
            BlockKind::Plain => Some(content),
            BlockKind::Task(task) => task.take_logbook_line(content)?,
        };

        if let Some(line) = remaining {
            self.continuation_lines.push(line.to_string());
        }
        Ok(())
    }

    /// Record `content` as a property if it is one, returning it otherwise.
    fn take_property<'a>(&mut self, content: &'a str) -> Result<Option<&'a str>, LineError> {
        let is_property = content
            .split_whitespace()
            .next()
            .is_some_and(|token| token.ends_with(PROPERTY_MARKER));

        let Some((key, value)) = content
            .split_once(PROPERTY_MARKER)
            .filter(|_| is_property)
        else {
            return Ok(Some(content));
        };

        let key = key.trim();
        if self.properties.contains_key(key) {
            return Err(LineError::DuplicateProperty {
                key: key.to_string(),
                block: self.content.clone(),
            });
        }

        self.properties
            .insert(key.to_string(), value.trim().to_string());
        Ok(None)
    }
}

/// Arena holding every block of one outline. Index 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTree {
    blocks: Vec<Block>,
}

impl Default for BlockTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTree {
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::new(ROOT_INDENT, "", BlockKind::Plain)],
        }
    }

    pub fn root(&self) -> &Block {
        self.get(BlockId::ROOT)
    }

    pub fn get(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    /// Number of blocks, root included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1
    }

    fn push_child(&mut self, parent: BlockId, mut block: Block) -> BlockId {
        let id = BlockId(self.blocks.len());
        block.parent = Some(parent);
        self.blocks.push(block);
        self.get_mut(parent).children.push(id);
        id
    }

    /// Strict ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        std::iter::successors(self.get(id).parent, |&current| self.get(current).parent)
    }

    /// All blocks below `id` in depth-first, parent-before-children order.
    pub fn descendants(&self, id: BlockId) -> Vec<BlockId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: BlockId, out: &mut Vec<BlockId>) {
        for &child in self.get(id).children() {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }
}

/// A built outline: the block tree plus what was learned while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    pub tree: BlockTree,
    pub catch_all: Option<BlockId>,
    pub problems: Vec<Problem>,
}

impl Outline {
    /// Designate `id` as the switching-cost catch-all.
    ///
    /// Re-designating the same block is a no-op. The existing designation is
    /// kept when a different block is offered.
    pub fn set_catch_all(&mut self, id: BlockId) -> Result<(), CatchAllError> {
        let block = self.tree.get(id);
        if !block.is_task() {
            return Err(CatchAllError::NotATask(block.content().to_string()));
        }

        match self.catch_all {
            Some(existing) if existing != id => Err(CatchAllError::AlreadySet {
                existing: self.tree.get(existing).content().to_string(),
                rejected: block.content().to_string(),
            }),
            _ => {
                self.catch_all = Some(id);
                Ok(())
            }
        }
    }
}

/// Builds an [`Outline`] one raw line at a time.
#[derive(Debug)]
pub struct OutlineBuilder {
    outline: Outline,
    current: BlockId,
}

impl Default for OutlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self {
            outline: Outline::default(),
            current: BlockId::ROOT,
        }
    }

    /// Feed one raw line of the journal file.
    pub fn push_line(&mut self, line: &str) {
        let indent = leading_tabs(line);
        let content = line.trim();

        let Some(block_content) = content.strip_prefix(BLOCK_MARKER) else {
            let block = self.outline.tree.get_mut(self.current);
            if let Err(err) = block.ingest_line(content) {
                tracing::trace!(error = %err, "dropping line");
                self.outline.problems.push(Problem::warning(err.to_string()));
            }
            return;
        };
        // Any `-` opens a block, but only `- NOW ` and `- LATER ` open a task.
        let kind = content
            .strip_prefix(TASK_MARKER)
            .and_then(TaskData::from_content)
            .map_or(BlockKind::Plain, BlockKind::Task);
        let content = block_content.trim();

        // Deeper lines nest under the cursor; anything else walks back up to
        // the nearest strictly shallower block.
        let mut parent = self.current;
        while indent <= self.outline.tree.get(parent).indent() {
            parent = self.outline.tree.get(parent).parent().unwrap_or(BlockId::ROOT);
        }

        let id = self
            .outline
            .tree
            .push_child(parent, Block::new(indent, content, kind));
        self.current = id;
        tracing::trace!(?id, ?parent, indent, "opened block");

        if content.contains(CATCH_ALL_MARKER) {
            if let Err(err) = self.outline.set_catch_all(id) {
                self.outline.problems.push(Problem::warning(err.to_string()));
            }
        }
    }

    pub fn finish(self) -> Outline {
        self.outline
    }
}

/// Build an outline from a complete set of lines.
pub fn build_outline<'a>(lines: impl IntoIterator<Item = &'a str>) -> Outline {
    let mut builder = OutlineBuilder::new();
    for line in lines {
        builder.push_line(line);
    }
    builder.finish()
}

fn leading_tabs(line: &str) -> i32 {
    let count = line.chars().take_while(|&c| c == '\t').count();
    i32::try_from(count).unwrap_or(i32::MAX)
}
