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


//! Intrusive red-black tree.
//!
//! The tree never allocates. Each node embeds its own links (`Bucket`), so the
//! memory of a node belongs to whoever inserted it; the tree only rewires links.

pub(crate) mod check;

pub use check::Violation;

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ptr::NonNull;

pub type Link<B> = Option<NonNull<B>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Node of `RBTree` and `PlainTree`.
///
/// `parent` is a back reference only. It must mirror the child links, and it
/// never owns anything.
pub trait Bucket {
    fn init(&mut self) {
        self.set_left(None);
        self.set_right(None);
        self.set_parent(None);
        self.set_color(Color::Red);
    }

    fn child(&self, direction: Direction) -> Link<Self>;
    fn set_child(&mut self, child: Link<Self>, direction: Direction);

    fn parent(&self) -> Link<Self>;
    fn set_parent(&mut self, parent: Link<Self>);

    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);

    fn left(&self) -> Link<Self> {
        self.child(Direction::Left)
    }
    fn set_left(&mut self, child: Link<Self>) {
        self.set_child(child, Direction::Left)
    }

    fn right(&self) -> Link<Self> {
        self.child(Direction::Right)
    }
    fn set_right(&mut self, child: Link<Self>) {
        self.set_child(child, Direction::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn alter(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

// Raw link surgery. Every function below requires that the pointers passed in
// are live nodes of one well formed tree.

#[inline]
unsafe fn color_of<B: Bucket>(link: Link<B>) -> Color {
    link.map_or(Color::Black, |ptr| ptr.as_ref().color())
}

#[inline]
unsafe fn paint<B: Bucket>(node: NonNull<B>, color: Color) {
    (*node.as_ptr()).set_color(color);
}

#[inline]
pub(crate) unsafe fn link_child<B: Bucket>(node: NonNull<B>, child: Link<B>, direction: Direction) {
    (*node.as_ptr()).set_child(child, direction);
}

#[inline]
pub(crate) unsafe fn link_parent<B: Bucket>(node: NonNull<B>, parent: Link<B>) {
    (*node.as_ptr()).set_parent(parent);
}

/// Which side of `parent` holds `child`. `child` may be `None` for an empty slot.
#[inline]
unsafe fn side<B: Bucket>(parent: NonNull<B>, child: Link<B>) -> Direction {
    if parent.as_ref().left() == child {
        Direction::Left
    } else {
        Direction::Right
    }
}

/// The child of `parent` opposite to `direction`.
///
/// While a black node is missing below `parent` on the `direction` side, the
/// other side is at least one black node high, so it cannot be empty.
#[inline]
unsafe fn brother_of<B: Bucket>(parent: NonNull<B>, direction: Direction) -> NonNull<B> {
    match parent.as_ref().child(direction.alter()) {
        Some(brother) => brother,
        None => panic!("red-black tree: black height broken, no sibling to borrow from"),
    }
}

/// Points the slot that holds `old` (in `parent`, or `root` if `parent` is `None`) at `new`.
pub(crate) unsafe fn replace_child<B: Bucket>(
    root: &mut Link<B>,
    parent: Link<B>,
    old: NonNull<B>,
    new: Link<B>,
) {
    match parent {
        None => *root = new,
        Some(parent) => {
            let d = side(parent, Some(old));
            link_child(parent, new, d);
        }
    }
}

/// Replaces the subtree rooted at `u` with the one rooted at `v`.
///
/// `u` keeps its own links; the caller detaches or reuses it.
pub(crate) unsafe fn transplant<B: Bucket>(root: &mut Link<B>, u: NonNull<B>, v: Link<B>) {
    let parent = u.as_ref().parent();
    replace_child(root, parent, u, v);
    if let Some(v) = v {
        link_parent(v, parent);
    }
}

/// Returns the leftmost node of the subtree rooted at `node`.
///
/// # Safety
///
/// `node` must be a live node of a well formed tree.
pub unsafe fn minimum<B: Bucket>(mut node: NonNull<B>) -> NonNull<B> {
    while let Some(left) = node.as_ref().left() {
        node = left;
    }
    node
}

/// Returns the rightmost node of the subtree rooted at `node`.
///
/// # Safety
///
/// `node` must be a live node of a well formed tree.
pub unsafe fn maximum<B: Bucket>(mut node: NonNull<B>) -> NonNull<B> {
    while let Some(right) = node.as_ref().right() {
        node = right;
    }
    node
}

/// Returns the in-order successor of `node`, walking parent links when needed.
///
/// # Safety
///
/// `node` must be a live node of a well formed tree.
pub unsafe fn successor<B: Bucket>(node: NonNull<B>) -> Link<B> {
    if let Some(right) = node.as_ref().right() {
        return Some(minimum(right));
    }

    let mut child = node;
    while let Some(parent) = child.as_ref().parent() {
        if parent.as_ref().left() == Some(child) {
            return Some(parent);
        }
        child = parent;
    }

    None
}

pub struct RBTree<B> {
    root: Link<B>,
}

impl<B> RBTree<B> {
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

impl<B> Default for RBTree<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> RBTree<B>
where
    B: Bucket,
{
    /// Returns the first bucket equal to `key` met on the way down, if any.
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

    /// Returns the smallest bucket.
    pub fn first(&self) -> Link<B> {
        self.root.map(|root| unsafe { minimum(root) })
    }

    /// Iterates the buckets in order. Equal buckets come in insertion order.
    pub fn iter(&self) -> Iter<'_, B> {
        Iter::starting_at(self.first())
    }

    /// Links `bucket` into the tree and rebalances.
    ///
    /// Equal buckets go to the right, so they keep insertion order.
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

        link_parent(bucket, parent);
        match parent {
            None => self.root = Some(bucket),
            Some(parent) => link_child(parent, Some(bucket), d),
        }

        self.insert_fixup(bucket);
    }

    unsafe fn insert_fixup(&mut self, mut z: NonNull<B>) {
        while let Some(mut parent) = z.as_ref().parent() {
            if parent.as_ref().color() == Color::Black {
                break;
            }

            // A red node is never the root, so the grandparent exists.
            let g_parent = match parent.as_ref().parent() {
                Some(g) => g,
                None => break,
            };
            let d = side(g_parent, Some(parent));
            let uncle = g_parent.as_ref().child(d.alter());

            if color_of(uncle) == Color::Red {
                paint(parent, Color::Black);
                if let Some(uncle) = uncle {
                    paint(uncle, Color::Black);
                }
                paint(g_parent, Color::Red);
                z = g_parent;
                continue;
            }

            // Zig-zag: turn the inner grandchild into an outer one.
            if side(parent, Some(z)) != d {
                self.rotate(parent, d);
                std::mem::swap(&mut z, &mut parent);
            }

            paint(parent, Color::Black);
            paint(g_parent, Color::Red);
            self.rotate(g_parent, d.alter());
            break;
        }

        if let Some(root) = self.root {
            paint(root, Color::Black);
        }
    }

    /// Unlinks `bucket` from the tree and rebalances.
    ///
    /// The links of `bucket` are cleared afterwards; its memory is left to the caller.
    ///
    /// # Safety
    ///
    /// `bucket` must currently belong to this tree.
    pub unsafe fn remove(&mut self, bucket: NonNull<B>) {
        let z = bucket;
        let mut removed_color = z.as_ref().color();

        // `x` takes the place of the node actually spliced out. It may be
        // empty, so its parent is tracked on the side.
        let x: Link<B>;
        let x_parent: Link<B>;

        match (z.as_ref().left(), z.as_ref().right()) {
            (None, right) => {
                x = right;
                x_parent = z.as_ref().parent();
                transplant(&mut self.root, z, right);
            }
            (left, None) => {
                x = left;
                x_parent = z.as_ref().parent();
                transplant(&mut self.root, z, left);
            }
            (Some(left), Some(right)) => {
                let y = minimum(right);
                removed_color = y.as_ref().color();
                x = y.as_ref().right();

                if y.as_ref().parent() == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = y.as_ref().parent();
                    transplant(&mut self.root, y, x);
                    link_child(y, Some(right), Direction::Right);
                    link_parent(right, Some(y));
                }

                transplant(&mut self.root, z, Some(y));
                link_child(y, Some(left), Direction::Left);
                link_parent(left, Some(y));
                paint(y, z.as_ref().color());
            }
        }

        (*z.as_ptr()).init();

        if removed_color == Color::Black {
            self.remove_fixup(x, x_parent);
        }
    }

    /// Restores the black height after a black node left the path through `x`.
    ///
    /// `x` may be empty; then only its position (`parent` and the empty slot) is used.
    unsafe fn remove_fixup(&mut self, mut x: Link<B>, mut parent: Link<B>) {
        while let Some(p) = parent {
            if color_of(x) == Color::Red {
                break;
            }

            let d = side(p, x);
            let mut brother = brother_of(p, d);

            if brother.as_ref().color() == Color::Red {
                paint(brother, Color::Black);
                paint(p, Color::Red);
                self.rotate(p, d);
                brother = brother_of(p, d);
            }

            let near_nephew = brother.as_ref().child(d);
            let far_nephew = brother.as_ref().child(d.alter());

            if color_of(near_nephew) == Color::Black && color_of(far_nephew) == Color::Black {
                paint(brother, Color::Red);
                x = Some(p);
                parent = p.as_ref().parent();
                continue;
            }

            if color_of(far_nephew) == Color::Black {
                if let Some(nephew) = near_nephew {
                    paint(nephew, Color::Black);
                }
                paint(brother, Color::Red);
                self.rotate(brother, d.alter());
                brother = brother_of(p, d);
            }

            paint(brother, p.as_ref().color());
            paint(p, Color::Black);
            if let Some(nephew) = brother.as_ref().child(d.alter()) {
                paint(nephew, Color::Black);
            }
            self.rotate(p, d);

            x = self.root;
            break;
        }

        if let Some(x) = x {
            paint(x, Color::Black);
        }
    }

    /// Promotes the right child of `x` into its place. Colors are not touched.
    ///
    /// # Safety
    ///
    /// `x` must belong to this tree.
    ///
    /// # Panics
    ///
    /// Panics if `x` has no right child.
    pub unsafe fn rotate_left(&mut self, x: NonNull<B>) {
        self.rotate(x, Direction::Left);
    }

    /// Mirror of `rotate_left`: promotes the left child of `x`.
    ///
    /// # Safety
    ///
    /// `x` must belong to this tree.
    ///
    /// # Panics
    ///
    /// Panics if `x` has no left child.
    pub unsafe fn rotate_right(&mut self, x: NonNull<B>) {
        self.rotate(x, Direction::Right);
    }

    /// Moves `x` down toward `direction`; its child on the other side takes its place.
    unsafe fn rotate(&mut self, x: NonNull<B>, direction: Direction) {
        let y = match x.as_ref().child(direction.alter()) {
            Some(y) => y,
            None => panic!("red-black tree: rotating {:?} without a child to promote", direction),
        };

        let inner = y.as_ref().child(direction);
        link_child(x, inner, direction.alter());
        if let Some(inner) = inner {
            link_parent(inner, Some(x));
        }

        let parent = x.as_ref().parent();
        link_parent(y, parent);
        replace_child(&mut self.root, parent, x, Some(y));

        link_child(y, Some(x), direction);
        link_parent(x, Some(y));
    }
}

pub struct Iter<'a, B> {
    next: Link<B>,
    _marker: PhantomData<&'a B>,
}

impl<B> Iter<'_, B> {
    pub(crate) fn starting_at(first: Link<B>) -> Self {
        Self {
            next: first,
            _marker: PhantomData,
        }
    }
}

impl<'a, B> Iterator for Iter<'a, B>
where
    B: Bucket,
{
    type Item = &'a B;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        unsafe {
            self.next = successor(current);
            Some(&*current.as_ptr())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct B {
        left_: Link<Self>,
        right_: Link<Self>,
        parent_: Link<Self>,
        color_: Color,
        v: usize,
        id: usize,
    }

    impl B {
        fn build(n: usize) -> Vec<B> {
            Self::build_with(n, |i| i)
        }

        fn build_with<F: Fn(usize) -> usize>(n: usize, f: F) -> Vec<B> {
            (0..n)
                .map(|i| B {
                    left_: None,
                    right_: None,
                    parent_: None,
                    color_: Color::Red,
                    v: f(i),
                    id: i,
                })
                .collect()
        }
    }

    impl Bucket for B {
        fn child(&self, direction: Direction) -> Link<Self> {
            match direction {
                Direction::Left => self.left_,
                Direction::Right => self.right_,
            }
        }
        fn set_child(&mut self, child: Link<Self>, direction: Direction) {
            match direction {
                Direction::Left => self.left_ = child,
                Direction::Right => self.right_ = child,
            }
        }

        fn parent(&self) -> Link<Self> {
            self.parent_
        }
        fn set_parent(&mut self, parent: Link<Self>) {
            self.parent_ = parent
        }

        fn color(&self) -> Color {
            self.color_
        }
        fn set_color(&mut self, color: Color) {
            self.color_ = color
        }
    }

    impl PartialEq<B> for B {
        fn eq(&self, other: &B) -> bool {
            self.v == other.v
        }
    }

    impl Eq for B {}

    impl PartialOrd<B> for B {
        fn partial_cmp(&self, other: &B) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for B {
        fn cmp(&self, other: &Self) -> Ordering {
            self.v.cmp(&other.v)
        }
    }

    impl PartialEq<usize> for B {
        fn eq(&self, other: &usize) -> bool {
            self.v == *other
        }
    }

    impl PartialOrd<usize> for B {
        fn partial_cmp(&self, other: &usize) -> Option<Ordering> {
            self.v.partial_cmp(other)
        }
    }

    fn ptr(buckets: &mut [B], i: usize) -> NonNull<B> {
        NonNull::from(&mut buckets[i])
    }

    fn check_tree(tree: &RBTree<B>) {
        if let Err(violation) = tree.check() {
            panic!("{}", violation);
        }
    }

    fn values(tree: &RBTree<B>) -> Vec<usize> {
        tree.iter().map(|b| b.v).collect()
    }

    fn remove_value(tree: &mut RBTree<B>, buckets: &mut [B], i: usize) {
        let found = tree.find(&i);
        assert_eq!(found, Some(ptr(buckets, i)));

        unsafe { tree.remove(ptr(buckets, i)) };
        assert!(tree.find(&i).is_none());
        check_tree(tree);
    }

    fn permutation_next(val: &mut [usize]) -> bool {
        for i in (1..val.len()).rev() {
            if val[i - 1] < val[i] {
                let j = (i..val.len()).rev().find(|&j| val[i - 1] < val[j]).unwrap();
                val.swap(i - 1, j);
                val[i..].reverse();
                return true;
            }
        }

        false
    }

    fn alternate_order(len: usize) -> Vec<usize> {
        let mut ret = Vec::with_capacity(len);
        let (mut a, mut b) = (0, len);
        while a < b {
            ret.push(a);
            a += 1;
            if a < b {
                b -= 1;
                ret.push(b);
            }
        }
        ret
    }

    #[test]
    fn new() {
        let tree = RBTree::<B>::new();
        assert!(tree.is_empty());
        assert!(tree.find(&0).is_none());
        assert!(tree.first().is_none());
        assert_eq!(tree.check(), Ok(0));
    }

    #[test]
    fn test_permutation_next() {
        let mut order = vec![0, 1, 2];
        let mut seen = vec![order.clone()];
        while permutation_next(&mut order) {
            seen.push(order.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0]
            ]
        );
    }

    #[test]
    fn test_ascending_three_rotates() {
        let mut buckets = B::build_with(3, |i| (i + 1) * 10);
        let mut tree = RBTree::new();
        for i in 0..3 {
            unsafe { tree.insert(ptr(&mut buckets, i)) };
        }

        let root = unsafe { tree.root().unwrap().as_ref() };
        assert_eq!(root.v, 20);
        assert_eq!(root.color(), Color::Black);
        assert!(root.parent().is_none());

        let left = unsafe { root.left().unwrap().as_ref() };
        let right = unsafe { root.right().unwrap().as_ref() };
        assert_eq!((left.v, left.color()), (10, Color::Red));
        assert_eq!((right.v, right.color()), (30, Color::Red));
        assert_eq!(left.parent(), tree.root());
        assert_eq!(right.parent(), tree.root());
    }

    #[test]
    fn test_rotate_keeps_order_and_links() {
        let mut buckets = B::build(7);
        let mut tree = RBTree::new();
        for i in [3, 1, 5, 0, 2, 4, 6] {
            unsafe { tree.insert(ptr(&mut buckets, i)) };
        }
        let before = values(&tree);

        unsafe {
            let root = tree.root().unwrap();
            tree.rotate_left(root);
            assert_eq!(tree.root().unwrap().as_ref().v, 5);
            assert!(tree.root().unwrap().as_ref().parent().is_none());
            assert_eq!(values(&tree), before);

            let root = tree.root().unwrap();
            tree.rotate_right(root);
            assert_eq!(tree.root().unwrap().as_ref().v, 3);
            assert_eq!(values(&tree), before);
        }

        check_tree(&tree);
    }

    #[test]
    #[should_panic]
    fn test_rotate_without_child_panics() {
        let mut buckets = B::build(1);
        let mut tree = RBTree::new();
        unsafe {
            tree.insert(ptr(&mut buckets, 0));
            let root = tree.root().unwrap();
            tree.rotate_left(root);
        }
    }

    #[test]
    fn test_insert_permutation() {
        const LEN: usize = 8;
        let mut order: Vec<usize> = (0..LEN).collect();

        while {
            let mut tree = RBTree::new();
            let mut buckets = B::build(LEN);

            for &i in order.iter() {
                unsafe { tree.insert(ptr(&mut buckets, i)) };
                check_tree(&tree);
            }
            assert_eq!(values(&tree), (0..LEN).collect::<Vec<_>>());

            permutation_next(&mut order)
        } {}
    }

    #[test]
    fn test_insert_in_order() {
        const LEN: usize = 128;

        let mut tree = RBTree::new();
        let mut buckets = B::build(LEN);

        for i in 0..LEN {
            unsafe { tree.insert(ptr(&mut buckets, i)) };
            check_tree(&tree);
        }
    }

    #[test]
    fn test_insert_rev_order() {
        const LEN: usize = 128;

        let mut tree = RBTree::new();
        let mut buckets = B::build(LEN);

        for i in (0..LEN).rev() {
            unsafe { tree.insert(ptr(&mut buckets, i)) };
            check_tree(&tree);
        }
    }

    #[test]
    fn test_insert_alternate_order() {
        const LEN: usize = 128;

        let mut tree = RBTree::new();
        let mut buckets = B::build(LEN);

        for i in alternate_order(LEN) {
            unsafe { tree.insert(ptr(&mut buckets, i)) };
            check_tree(&tree);
        }
    }

    #[test]
    fn test_duplicates_keep_insertion_order() {
        const LEN: usize = 64;

        let mut tree = RBTree::new();
        let mut buckets = B::build_with(LEN, |i| i % 4);

        for i in 0..LEN {
            unsafe { tree.insert(ptr(&mut buckets, i)) };
            check_tree(&tree);
        }

        let ids: Vec<(usize, usize)> = tree.iter().map(|b| (b.v, b.id)).collect();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(ids, expected);

        // Remove every other duplicate; the rest must keep their relative order.
        for i in (0..LEN).step_by(2) {
            unsafe { tree.remove(ptr(&mut buckets, i)) };
            check_tree(&tree);
        }
        let ids: Vec<(usize, usize)> = tree.iter().map(|b| (b.v, b.id)).collect();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(ids, expected);
        assert_eq!(ids.len(), LEN / 2);
    }

    #[test]
    fn test_remove_permutation() {
        const LEN: usize = 5;
        let mut insert_order: Vec<usize> = (0..LEN).collect();

        while {
            let mut remove_order: Vec<usize> = (0..LEN).collect();

            while {
                let mut tree = RBTree::new();
                let mut buckets = B::build(LEN);
                for &i in insert_order.iter() {
                    unsafe { tree.insert(ptr(&mut buckets, i)) };
                }

                for &i in remove_order.iter() {
                    remove_value(&mut tree, &mut buckets, i);
                }
                assert!(tree.is_empty());

                permutation_next(&mut remove_order)
            } {}

            permutation_next(&mut insert_order)
        } {}
    }

    #[test]
    fn test_insert_remove_orders() {
        const LEN: usize = 128;

        let orders: Vec<Vec<usize>> = vec![
            (0..LEN).collect(),
            (0..LEN).rev().collect(),
            alternate_order(LEN),
        ];

        for insert_order in orders.iter() {
            for remove_order in orders.iter() {
                let mut tree = RBTree::new();
                let mut buckets = B::build(LEN);
                for &i in insert_order.iter() {
                    unsafe { tree.insert(ptr(&mut buckets, i)) };
                }

                for &i in remove_order.iter() {
                    remove_value(&mut tree, &mut buckets, i);
                }

                assert!(tree.is_empty());
                assert!(tree.root().is_none());
            }
        }
    }

    #[test]
    fn test_remove_clears_links() {
        let mut buckets = B::build(3);
        let mut tree = RBTree::new();
        for i in 0..3 {
            unsafe { tree.insert(ptr(&mut buckets, i)) };
        }

        unsafe { tree.remove(ptr(&mut buckets, 1)) };
        check_tree(&tree);

        let removed = &buckets[1];
        assert!(removed.left().is_none());
        assert!(removed.right().is_none());
        assert!(removed.parent().is_none());
    }

    #[test]
    fn test_remove_only_node() {
        let mut buckets = B::build_with(1, |_| 10);
        let mut tree = RBTree::new();

        unsafe {
            tree.insert(ptr(&mut buckets, 0));
            tree.remove(ptr(&mut buckets, 0));
        }

        assert!(tree.is_empty());
        assert_eq!(tree.check(), Ok(0));
    }

    #[test]
    fn test_remove_two_children() {
        let sizes = [50, 30, 70, 20, 40, 60, 80];
        let mut buckets = B::build_with(sizes.len(), |i| sizes[i]);
        let mut tree = RBTree::new();
        for i in 0..sizes.len() {
            unsafe { tree.insert(ptr(&mut buckets, i)) };
        }

        let target = tree.find(&30).unwrap();
        unsafe {
            assert!(target.as_ref().left().is_some());
            assert!(target.as_ref().right().is_some());
            tree.remove(target);
        }

        assert_eq!(values(&tree), vec![20, 40, 50, 60, 70, 80]);
        check_tree(&tree);
    }

    #[test]
    fn test_find_permutation() {
        const LEN: usize = 8;
        let mut order: Vec<usize> = (0..LEN).collect();

        while {
            let mut tree = RBTree::new();
            let mut buckets = B::build(LEN);
            for &i in order.iter() {
                unsafe { tree.insert(ptr(&mut buckets, i)) };
            }

            for i in 0..LEN {
                assert_eq!(tree.find(&i), Some(ptr(&mut buckets, i)));
            }
            assert!(tree.find(&LEN).is_none());

            permutation_next(&mut order)
        } {}
    }

    #[test]
    fn test_minimum_and_successor() {
        const LEN: usize = 32;

        let mut tree = RBTree::new();
        let mut buckets = B::build(LEN);
        for i in alternate_order(LEN) {
            unsafe { tree.insert(ptr(&mut buckets, i)) };
        }

        assert_eq!(tree.first(), Some(ptr(&mut buckets, 0)));

        unsafe {
            let root = tree.root().unwrap();
            assert_eq!(maximum(root).as_ref().v, LEN - 1);
            assert!(successor(maximum(root)).is_none());

            // The minimum of a right subtree is the in-order successor.
            let right = root.as_ref().right().unwrap();
            assert_eq!(Some(minimum(right)), successor(root));
        }
    }
}
