// src/core/tree.rs

//! Arena-backed instruction tree.
//!
//! Blocks live in a flat `Vec` and refer to their parent by index, so nesting
//! queries never need a back-pointer into an owning structure.

use std::fmt;
use std::sync::Arc;

/// Index of a block inside a [`Script`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

impl BlockId {
    /// The root block of every script.
    pub const ROOT: Self = Self(0);
}

/// One command invocation, as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-based number of the first physical line.
    pub number: usize,
    /// The logical line with its indentation stripped.
    pub text: String,
}

/// An entry in a block: either a command line or a nested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Line(ScriptLine),
    Block(BlockId),
}

/// An ordered sequence of instructions at one indentation depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub items: Vec<Instruction>,
    pub parent: Option<BlockId>,
    /// Literal count of indentation characters of the block's lines.
    pub indent: usize,
}

/// A parsed script: the arena of blocks, with the root at [`BlockId::ROOT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    blocks: Vec<Block>,
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl Script {
    /// Creates a script holding only an empty root block at depth 0.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block {
                items: Vec::new(),
                parent: None,
                indent: 0,
            }],
        }
    }

    /// Returns the block with the given id.
    ///
    /// Ids are only minted by this arena, so a lookup never misses for ids
    /// obtained from the same script.
    pub fn block(&self, id: BlockId) -> &Block {
        self.blocks
            .get(id.0)
            .unwrap_or_else(|| unreachable!("block id {} outside of its arena", id.0))
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block {
        self.blocks
            .get_mut(id.0)
            .unwrap_or_else(|| unreachable!("block id {} outside of its arena", id.0))
    }

    /// Allocates a new, empty child block and appends it to `parent`'s items.
    pub(crate) fn open_child(&mut self, parent: BlockId, indent: usize) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block {
            items: Vec::new(),
            parent: Some(parent),
            indent,
        });
        self.block_mut(parent).items.push(Instruction::Block(id));
        id
    }

    /// Distance from the root block. The root is level 0.
    pub fn nesting_level(&self, id: BlockId) -> usize {
        let mut level = 0;
        let mut current = self.block(id).parent;
        while let Some(parent) = current {
            level += 1;
            current = self.block(parent).parent;
        }
        level
    }

    /// Number of blocks in the arena, root included.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of command lines across all blocks.
    pub fn line_count(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|block| &block.items)
            .filter(|item| matches!(item, Instruction::Line(_)))
            .count()
    }

    /// The number of the first source line inside a block, if it has any.
    pub fn first_line_number(&self, id: BlockId) -> Option<usize> {
        self.block(id).items.iter().find_map(|item| match item {
            Instruction::Line(line) => Some(line.number),
            Instruction::Block(child) => self.first_line_number(*child),
        })
    }

    fn render_block(&self, id: BlockId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "    ".repeat(self.nesting_level(id));
        for item in &self.block(id).items {
            match item {
                Instruction::Line(line) => writeln!(f, "{}{}", indent, line.text)?,
                Instruction::Block(child) => self.render_block(*child, f)?,
            }
        }
        Ok(())
    }
}

/// Re-prints the script with four spaces per nesting level.
impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render_block(BlockId::ROOT, f)
    }
}

/// A block together with the script that owns it.
///
/// This is what block-consuming commands capture: cheap to clone and valid
/// for as many child engines as they care to build.
#[derive(Debug, Clone)]
pub struct ScriptBlock {
    pub script: Arc<Script>,
    pub id: BlockId,
}

impl ScriptBlock {
    pub fn new(script: Arc<Script>, id: BlockId) -> Self {
        Self { script, id }
    }

    /// The root block of a script.
    pub fn root(script: Arc<Script>) -> Self {
        Self::new(script, BlockId::ROOT)
    }

    pub fn block(&self) -> &Block {
        self.script.block(self.id)
    }
}
