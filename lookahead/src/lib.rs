#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! Iterator adapter that can look arbitrarily far ahead without consuming
//! items, and that counts how many items have been consumed so far.
//!
//! Used by the `minipy` lexer to look ahead over graphemes and by its parser
//! to disambiguate statements with two tokens of lookahead.

use std::collections::VecDeque;

/// Adds [`WithLookahead::lookahead`] to every [`Iterator`].
pub trait WithLookahead: Iterator {
    /// Wraps this iterator in a [`Lookahead`].
    fn lookahead(self) -> Lookahead<Self>
    where
        Self: Sized,
    {
        Lookahead::new(self)
    }
}

impl<I> WithLookahead for I where I: Iterator {}

/// An iterator whose upcoming items can be inspected before they are consumed.
pub struct Lookahead<I>
where
    I: Iterator,
{
    iter: I,
    buffer: VecDeque<I::Item>,
    consumed: usize,
}

impl<I> Iterator for Lookahead<I>
where
    I: Iterator,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.pop_front().or_else(|| self.iter.next());

        if item.is_some() {
            self.consumed += 1;
        }

        item
    }
}

impl<I> Lookahead<I>
where
    I: Iterator,
{
    /// Creates a new [`Lookahead`] around `iter`.
    pub fn new(iter: I) -> Self {
        Lookahead {
            iter,
            buffer: VecDeque::new(),
            consumed: 0,
        }
    }

    /// Number of items returned by [`Iterator::next`] so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    fn fill(&mut self, amount: usize) {
        while self.buffer.len() < amount {
            match self.iter.next() {
                Some(item) => self.buffer.push_back(item),
                None => break,
            }
        }
    }

    /// Peeks at the next item.
    pub fn peek(&mut self) -> Option<&I::Item> {
        self.peek_nth(0)
    }

    /// Peeks at the item `n` positions ahead, `0` being the next item.
    pub fn peek_nth(&mut self, n: usize) -> Option<&I::Item> {
        self.fill(n + 1);
        self.buffer.get(n)
    }

    /// Returns up to `amount` upcoming items. The slice is shorter when the
    /// underlying iterator runs out.
    pub fn peek_slice(&mut self, amount: usize) -> &[I::Item] {
        self.fill(amount);
        let len = amount.min(self.buffer.len());

        &self.buffer.make_contiguous()[..len]
    }

    /// Consumes the next item only if it satisfies `predicate`.
    pub fn next_if<P>(&mut self, predicate: P) -> Option<I::Item>
    where
        P: FnOnce(&I::Item) -> bool,
    {
        if self.peek().map_or(false, predicate) {
            self.next()
        } else {
            None
        }
    }

    /// Returns the offset of the first upcoming item satisfying `predicate`,
    /// without consuming anything.
    pub fn find_ahead<P>(&mut self, predicate: P) -> Option<usize>
    where
        P: Fn(&I::Item) -> bool,
    {
        let mut offset = 0;

        loop {
            match self.peek_nth(offset) {
                None => return None,
                Some(item) if predicate(item) => return Some(offset),
                Some(_) => offset += 1,
            }
        }
    }
}
