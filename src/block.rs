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


//! The free block record indexed by `FreeTree`.

use crate::rb_tree::{Bucket, Color, Direction, Link};
use crate::{Error, Result};
use std::alloc::{self, Layout};
use std::cmp::Ordering;
use std::fmt;
use std::ptr::NonNull;

/// A free memory block, keyed by its size.
///
/// Only the size is tracked; the links make it a tree node.
pub struct Block {
    size: usize,
    left: Link<Self>,
    right: Link<Self>,
    parent: Link<Self>,
    color: Color,
}

impl Block {
    /// Allocates a detached red block.
    ///
    /// Unlike `Box::new`, running out of memory is reported as `Error::AllocFailed`
    /// instead of aborting the process.
    pub fn try_new(size: usize) -> Result<Box<Self>> {
        let layout = Layout::new::<Self>();

        unsafe {
            let ptr = NonNull::new(alloc::alloc(layout).cast::<Self>()).ok_or(
                Error::AllocFailed {
                    size: layout.size(),
                },
            )?;

            ptr.as_ptr().write(Self {
                size,
                left: None,
                right: None,
                parent: None,
                color: Color::Red,
            });

            // `Box` frees with the global allocator and `Layout::new::<Self>()`,
            // which is exactly how the memory was obtained.
            Ok(Box::from_raw(ptr.as_ptr()))
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_red(&self) -> bool {
        self.color == Color::Red
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("size", &self.size)
            .field("color", &self.color)
            .finish()
    }
}

impl Bucket for Block {
    fn child(&self, direction: Direction) -> Link<Self> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    fn set_child(&mut self, child: Link<Self>, direction: Direction) {
        match direction {
            Direction::Left => self.left = child,
            Direction::Right => self.right = child,
        }
    }

    fn parent(&self) -> Link<Self> {
        self.parent
    }

    fn set_parent(&mut self, parent: Link<Self>) {
        self.parent = parent
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color
    }
}

// Blocks compare by size only. Two distinct blocks of one size are "equal",
// and the tree keeps them in insertion order.

impl PartialEq<Self> for Block {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
    }
}

impl Eq for Block {}

impl PartialEq<usize> for Block {
    fn eq(&self, other: &usize) -> bool {
        self.size == *other
    }
}

impl PartialOrd<Self> for Block {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Block {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size.cmp(&other.size)
    }
}

impl PartialOrd<usize> for Block {
    fn partial_cmp(&self, other: &usize) -> Option<Ordering> {
        self.size.partial_cmp(other)
    }
}
