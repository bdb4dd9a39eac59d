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


//! Unbalanced binary search tree over the same `Bucket` nodes as `RBTree`.
//!
//! Colors are left untouched. Every walk is a loop, so a degenerate (sorted)
//! insertion order costs time but never stack.

use crate::rb_tree::{self, Bucket, Direction, Iter, Link, Violation};
use std::cmp::Ordering;
use std::ptr::NonNull;

pub struct PlainTree<B> {
    root: Link<B>,
}

impl<B> PlainTree<B> {
    pub const fn new() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Link<B> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

impl<B> Default for PlainTree<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> PlainTree<B>
where
    B: Bucket,
{
    pub fn find<K>(&self, key: &K) -> Link<B>
    where
        B: PartialOrd<K>,
    {
        let mut it = self.root;

        while let Some(bucket) = it.map(|ptr| unsafe { ptr.as_ref() }) {
            match bucket.partial_cmp(key) {
                Some(Ordering::Less) => it = bucket.right(),
                Some(Ordering::Equal) => return it,
                Some(Ordering::Greater) => it = bucket.left(),
                None => return None,
            }
        }

        None
    }

    pub fn first(&self) -> Link<B> {
        self.root.map(|root| unsafe { rb_tree::minimum(root) })
    }

    pub fn iter(&self) -> Iter<'_, B> {
        Iter::starting_at(self.first())
    }

    /// Number of nodes on the longest path from the root.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NonNull<B>, usize)> =
            self.root.map(|root| (root, 1)).into_iter().collect();

        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            let bucket = unsafe { node.as_ref() };
            for child in [bucket.left(), bucket.right()].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }

        height
    }

    /// Verifies parent links and the search order.
    pub fn check(&self) -> Result<(), Violation>
    where
        B: Ord,
    {
        let root = match self.root {
            None => return Ok(()),
            Some(root) => root,
        };

        unsafe {
            if root.as_ref().parent().is_some() {
                return Err(Violation::BrokenParent { depth: 0 });
            }
            rb_tree::check::check_links(root, false)?;
            rb_tree::check::check_order(self.root)
        }
    }

    /// Links `bucket` as a leaf. Equal buckets go to the right.
    ///
    /// # Safety
    ///
    /// `bucket` must not belong to any tree, and it must stay alive and unmoved
    /// until it is removed again.
    pub unsafe fn insert(&mut self, bucket: NonNull<B>)
    where
        B: Ord,
    {
        (*bucket.as_ptr()).init();

        let mut parent = None;
        let mut d = Direction::Left;
        let mut it = self.root;

        while let Some(node) = it {
            parent = Some(node);
            d = if bucket.as_ref() < node.as_ref() {
                Direction::Left
            } else {
                Direction::Right
            };
            it = node.as_ref().child(d);
        }

        rb_tree::link_parent(bucket, parent);
        match parent {
            None => self.root = Some(bucket),
            Some(parent) => rb_tree::link_child(parent, Some(bucket), d),
        }
    }

    /// Unlinks `bucket`. With two children it is replaced by its in-order predecessor.
    ///
    /// # Safety
    ///
    /// `bucket` must currently belong to this tree.
    pub unsafe fn remove(&mut self, bucket: NonNull<B>) {
        let z = bucket;

        match (z.as_ref().left(), z.as_ref().right()) {
            (None, right) => rb_tree::transplant(&mut self.root, z, right),
            (left, None) => rb_tree::transplant(&mut self.root, z, left),
            (Some(left), Some(right)) => {
                let y = rb_tree::maximum(left);

                if y != left {
                    rb_tree::transplant(&mut self.root, y, y.as_ref().left());
                    rb_tree::link_child(y, Some(left), Direction::Left);
                    rb_tree::link_parent(left, Some(y));
                }

                rb_tree::transplant(&mut self.root, z, Some(y));
                rb_tree::link_child(y, Some(right), Direction::Right);
                rb_tree::link_parent(right, Some(y));
            }
        }

        (*z.as_ptr()).init();
    }
}
