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


use super::{Bucket, Color, Link, RBTree};
use std::ptr::NonNull;
use thiserror::Error;

/// A red-black or search tree property that does not hold.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    #[error("the root is red")]
    RedRoot,
    #[error("a red node has a red child at depth {depth}")]
    RedRed { depth: usize },
    #[error("black height differs between paths: {expected} and {found}")]
    BlackHeight { expected: usize, found: usize },
    #[error("in-order traversal is not sorted")]
    Order,
    #[error("a parent link does not mirror the child link at depth {depth}")]
    BrokenParent { depth: usize },
}

impl<B> RBTree<B>
where
    B: Bucket + Ord,
{
    /// Verifies every red-black property and the search order.
    ///
    /// On success, returns the number of black nodes on every path from the root
    /// down to an empty leaf, the root included.
    pub fn check(&self) -> Result<usize, Violation> {
        let root = match self.root {
            None => return Ok(0),
            Some(root) => root,
        };

        unsafe {
            if root.as_ref().parent().is_some() {
                return Err(Violation::BrokenParent { depth: 0 });
            }
            if root.as_ref().color() == Color::Red {
                return Err(Violation::RedRoot);
            }

            let height = check_links(root, true)?;
            check_order(self.root)?;
            Ok(height)
        }
    }
}

/// Walks the subtree with an explicit stack, so the depth of the tree does not
/// matter. Verifies parent links, and with `colored` the red and black rules.
pub(crate) unsafe fn check_links<B: Bucket>(
    root: NonNull<B>,
    colored: bool,
) -> Result<usize, Violation> {
    let mut black_height: Option<usize> = None;
    let mut stack: Vec<(NonNull<B>, usize, usize)> = vec![(root, 0, 0)];

    while let Some((node, depth, blacks_above)) = stack.pop() {
        let bucket = node.as_ref();
        let is_red = bucket.color() == Color::Red;
        let blacks = blacks_above + usize::from(!is_red);

        for child in [bucket.left(), bucket.right()] {
            match child {
                None => {
                    if !colored {
                        continue;
                    }
                    match black_height {
                        None => black_height = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(Violation::BlackHeight {
                                expected,
                                found: blacks,
                            });
                        }
                        Some(_) => (),
                    }
                }
                Some(child) => {
                    if child.as_ref().parent() != Some(node) {
                        return Err(Violation::BrokenParent { depth: depth + 1 });
                    }
                    if colored && is_red && child.as_ref().color() == Color::Red {
                        return Err(Violation::RedRed { depth: depth + 1 });
                    }
                    stack.push((child, depth + 1, blacks));
                }
            }
        }
    }

    Ok(black_height.unwrap_or(0))
}

/// In-order traversal must never step down. Parent links must be sound already.
pub(crate) unsafe fn check_order<B: Bucket + Ord>(root: Link<B>) -> Result<(), Violation> {
    let mut it = root.map(|root| super::minimum(root));
    let mut prev: Option<NonNull<B>> = None;

    while let Some(node) = it {
        if let Some(prev) = prev {
            if node.as_ref() < prev.as_ref() {
                return Err(Violation::Order);
            }
        }
        prev = Some(node);
        it = super::successor(node);
    }

    Ok(())
}
