// Copyright 2020-2024 Shin Yoshida
//
// "LGPL-3.0-or-later OR Apache-2.0"
//
// This is part of free-block-tree
//
//  free-block-tree is free software: you can redistribute it and/or modify
//  it under the terms of the GNU Lesser General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  free-block-tree is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU Lesser General Public License for more details.
//
//  You should have received a copy of the GNU Lesser General Public License
//  along with free-block-tree.  If not, see <http://www.gnu.org/licenses/>.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Owning, safe index of free blocks keyed by size.

use crate::block::Block;
use crate::rb_tree::{Bucket, Iter, Link, RBTree, Violation};
use crate::{Error, Result};
use log::{debug, error, trace, warn};
use std::fmt::{self, Write};
use std::ptr::NonNull;

/// Names a block indexed by a `FreeTree`.
///
/// A handle is never dereferenced. `FreeTree` resolves it by looking for the same
/// address among its own blocks, so a stale or foreign handle is simply not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle {
    ptr: NonNull<Block>,
    size: usize,
}

impl BlockHandle {
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Size-ordered red-black index of free blocks.
///
/// The tree owns the blocks it indexes. `remove` and `take` hand ownership back
/// to the caller, and dropping the tree frees whatever is still indexed.
pub struct FreeTree {
    tree: RBTree<Block>,
    len: usize,
}

// Every block linked into `tree` is owned by this `FreeTree` alone, and shared
// access never writes.
unsafe impl Send for FreeTree {}
unsafe impl Sync for FreeTree {}

impl FreeTree {
    pub const fn new() -> Self {
        Self {
            tree: RBTree::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Indexes `block`, taking ownership of it.
    pub fn insert(&mut self, block: Box<Block>) -> BlockHandle {
        let size = block.size();
        let ptr = NonNull::from(Box::leak(block));

        // The block was just leaked from its box, so no tree links to it yet.
        unsafe { self.tree.insert(ptr) };
        self.len += 1;
        trace!("indexed free block of size {} ({} in tree)", size, self.len);
        self.verify();

        BlockHandle { ptr, size }
    }

    /// Allocates a block of `size` and indexes it.
    pub fn insert_size(&mut self, size: usize) -> Result<BlockHandle> {
        match Block::try_new(size) {
            Ok(block) => Ok(self.insert(block)),
            Err(err) => {
                error!("cannot index a free block of size {}: {}", size, err);
                Err(err)
            }
        }
    }

    /// Returns a block of exactly `size`, if one is indexed.
    pub fn find(&self, size: usize) -> Option<BlockHandle> {
        self.tree.find(&size).map(|ptr| BlockHandle { ptr, size })
    }

    pub fn get(&self, handle: BlockHandle) -> Option<&Block> {
        self.locate(handle).map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    pub fn contains(&self, handle: BlockHandle) -> bool {
        self.locate(handle).is_some()
    }

    /// Unlinks the block named by `handle` and gives it back to the caller.
    pub fn remove(&mut self, handle: BlockHandle) -> Result<Box<Block>> {
        let ptr = match self.locate(handle) {
            Some(ptr) => ptr,
            None => {
                warn!(
                    "refusing to remove a block of size {} this tree does not hold",
                    handle.size
                );
                return Err(Error::NotInTree { size: handle.size });
            }
        };

        unsafe { self.tree.remove(ptr) };
        self.len -= 1;
        trace!("removed free block of size {} ({} in tree)", handle.size, self.len);
        self.verify();

        // Leaked by `insert` and now unlinked, so this is the only owner.
        Ok(unsafe { Box::from_raw(ptr.as_ptr()) })
    }

    /// Removes and returns a block of exactly `size`, if one is indexed.
    pub fn take(&mut self, size: usize) -> Option<Box<Block>> {
        match self.find(size) {
            None => {
                debug!("no free block of size {}", size);
                None
            }
            Some(handle) => self.remove(handle).ok(),
        }
    }

    pub fn root(&self) -> Option<&Block> {
        self.tree.root().map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns the smallest block.
    pub fn minimum(&self) -> Option<&Block> {
        self.tree.first().map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Blocks in size order, equal sizes in insertion order.
    pub fn iter(&self) -> Iter<'_, Block> {
        self.tree.iter()
    }

    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(Block::size)
    }

    /// Number of black blocks on any path from the root down to an empty leaf.
    pub fn black_height(&self) -> usize {
        let mut height = 0;
        let mut it = self.tree.root();
        while let Some(block) = it.map(|ptr| unsafe { &*ptr.as_ptr() }) {
            height += usize::from(!block.is_red());
            it = block.left();
        }
        height
    }

    /// Runs the full invariant check; see `RBTree::check`.
    pub fn check(&self) -> std::result::Result<usize, Violation> {
        self.tree.check()
    }

    /// Renders the tree in Graphviz dot: red and black node groups, then the edges.
    pub fn to_dot(&self) -> String {
        let mut red = String::new();
        let mut black = String::new();
        let mut edges = String::new();

        let mut next_id = 1;
        let mut stack: Vec<(NonNull<Block>, usize)> =
            self.tree.root().map(|root| (root, 0)).into_iter().collect();

        while let Some((ptr, id)) = stack.pop() {
            let block = unsafe { ptr.as_ref() };
            let nodes = if block.is_red() { &mut red } else { &mut black };
            let _ = writeln!(nodes, "    n{} [label=\"{}\"]", id, block.size());

            for child in [block.right(), block.left()].into_iter().flatten() {
                let _ = writeln!(edges, "  n{} -> n{}", id, next_id);
                stack.push((child, next_id));
                next_id += 1;
            }
        }

        let mut dot = String::from("digraph G {\n");
        dot.push_str("  subgraph red {\n");
        dot.push_str("    node [color=\"red\", style=\"filled\", group=\"red\"]\n");
        dot.push_str(&red);
        dot.push_str("  }\n");
        dot.push_str("  subgraph black {\n");
        dot.push_str(
            "    node [color=\"black\", style=\"filled\", group=\"black\", fontcolor=\"white\"]\n",
        );
        dot.push_str(&black);
        dot.push_str("  }\n");
        dot.push_str(&edges);
        dot.push_str("}\n");
        dot
    }

    /// Finds the block `handle` names without dereferencing the handle.
    ///
    /// Equal sizes may sit on both sides of each other after rotations, so every
    /// node of the handle's size is visited.
    fn locate(&self, handle: BlockHandle) -> Link<Block> {
        let mut stack: Vec<NonNull<Block>> = self.tree.root().into_iter().collect();

        while let Some(ptr) = stack.pop() {
            let block = unsafe { ptr.as_ref() };
            match block.size().cmp(&handle.size) {
                std::cmp::Ordering::Less => stack.extend(block.right()),
                std::cmp::Ordering::Greater => stack.extend(block.left()),
                std::cmp::Ordering::Equal => {
                    if ptr == handle.ptr {
                        return Some(ptr);
                    }
                    stack.extend(block.left());
                    stack.extend(block.right());
                }
            }
        }

        None
    }

    #[cfg(feature = "paranoid")]
    fn verify(&self) {
        if let Err(violation) = self.tree.check() {
            panic!("free tree corrupted: {}", violation);
        }
    }

    #[cfg(not(feature = "paranoid"))]
    #[inline]
    fn verify(&self) {}
}

impl Default for FreeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FreeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreeTree")
            .field("len", &self.len)
            .field("sizes", &self.sizes().collect::<Vec<_>>())
            .finish()
    }
}

impl Drop for FreeTree {
    fn drop(&mut self) {
        let mut stack: Vec<NonNull<Block>> = self.tree.root().into_iter().collect();

        while let Some(ptr) = stack.pop() {
            unsafe {
                stack.extend(ptr.as_ref().left());
                stack.extend(ptr.as_ref().right());
                drop(Box::from_raw(ptr.as_ptr()));
            }
        }
    }
}
