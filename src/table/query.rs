use crate::{codec::WireItem, errors::ReadError, traits::Record};
use std::{marker::PhantomData, vec};

/// Records returned by a prefix query.
///
/// Items are decoded one at a time as the iterator is advanced, so a malformed item only
/// fails its own step. The iterator is finite and cannot be restarted.
#[derive(Debug)]
pub struct Records<R> {
    items: vec::IntoIter<WireItem>,
    __record: PhantomData<fn() -> R>,
}

impl<R> Records<R> {
    pub(crate) fn new(items: Vec<WireItem>) -> Self {
        Self {
            items: items.into_iter(),
            __record: PhantomData,
        }
    }
}

impl<R: Record> Iterator for Records<R> {
    type Item = Result<R, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|item| R::from_wire_item(Some(item)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<R: Record> ExactSizeIterator for Records<R> {}
