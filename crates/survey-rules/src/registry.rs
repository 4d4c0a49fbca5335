use std::collections::HashMap;

use crate::block::InstructionBlock;

/// Flat, ordered collection of instruction blocks.
///
/// Built once by concatenating per-section collections and then treated as
/// read-only. Declaration order is significant: it is the final tie-breaker
/// for ordering and variant selection.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: Vec<InstructionBlock>,
    /// First declaration index of each block id.
    index: HashMap<String, usize>,
}

impl BlockRegistry {
    pub fn new(blocks: Vec<InstructionBlock>) -> Self {
        let mut index = HashMap::with_capacity(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            index.entry(block.id.clone()).or_insert(i);
        }
        Self { blocks, index }
    }

    /// Concatenate section collections in the order given.
    pub fn from_sections<I>(sections: I) -> Self
    where
        I: IntoIterator<Item = Vec<InstructionBlock>>,
    {
        Self::new(sections.into_iter().flatten().collect())
    }

    pub fn blocks(&self) -> &[InstructionBlock] {
        &self.blocks
    }

    pub fn block(&self, id: &str) -> Option<&InstructionBlock> {
        self.index.get(id).map(|&i| &self.blocks[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Distinct section labels in declaration order.
    pub fn sections(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for block in &self.blocks {
            if !seen.contains(&block.section.as_str()) {
                seen.push(block.section.as_str());
            }
        }
        seen
    }

    pub fn in_section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a InstructionBlock> {
        self.blocks.iter().filter(move |b| b.section == section)
    }
}
