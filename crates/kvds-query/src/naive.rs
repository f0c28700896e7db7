use crate::entry::Entry;
use crate::filter::Filter;
use crate::key::normalize_prefix;
use crate::order::{Order, sort_entries};
use crate::query::Query;

/// Apply `query` to an arbitrary result source, in memory.
///
/// Steps run in this order: prefix (when non-empty), filters, orders,
/// offset, limit. Ordering needs every entry, so the source is drained on
/// the first pull when `query.orders` is non-empty; otherwise entries
/// stream through one at a time.
///
/// An error from the source is passed on and ends the output.
pub fn naive_query_apply<I, E>(query: &Query, source: I) -> NaiveResults<I>
where
    I: Iterator<Item = Result<Entry, E>>,
{
    let mut filters = Vec::with_capacity(query.filters.len() + 1);
    if !query.prefix.is_empty() {
        filters.push(Filter::KeyPrefix(normalize_prefix(&query.prefix)));
    }
    filters.extend(query.filters.iter().cloned());

    NaiveResults {
        source,
        filters,
        orders: query.orders.clone(),
        offset: query.offset,
        limit: query.limit,
        skipped: 0,
        sent: 0,
        sorted: None,
        done: false,
    }
}

pub struct NaiveResults<I> {
    source: I,
    filters: Vec<Filter>,
    orders: Vec<Order>,
    offset: usize,
    limit: usize,
    skipped: usize,
    sent: usize,
    sorted: Option<std::vec::IntoIter<Entry>>,
    done: bool,
}

impl<I, E> NaiveResults<I>
where
    I: Iterator<Item = Result<Entry, E>>,
{
    fn admits(&self, entry: &Entry) -> bool {
        self.filters.iter().all(|f| f.matches(entry))
    }

    /// Next entry that passed the filters, in final order.
    fn pull(&mut self) -> Option<Result<Entry, E>> {
        if self.orders.is_empty() {
            loop {
                match self.source.next()? {
                    Ok(entry) if !self.admits(&entry) => continue,
                    other => return Some(other),
                }
            }
        }

        if self.sorted.is_none() {
            let mut entries = Vec::new();
            while let Some(item) = self.source.next() {
                match item {
                    Ok(entry) if self.admits(&entry) => entries.push(entry),
                    Ok(_) => {}
                    Err(e) => {
                        self.sorted = Some(Vec::new().into_iter());
                        return Some(Err(e));
                    }
                }
            }
            sort_entries(&self.orders, &mut entries);
            self.sorted = Some(entries.into_iter());
        }
        self.sorted.as_mut()?.next().map(Ok)
    }
}

impl<I, E> Iterator for NaiveResults<I>
where
    I: Iterator<Item = Result<Entry, E>>,
{
    type Item = Result<Entry, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.limit > 0 && self.sent >= self.limit {
                self.done = true;
                return None;
            }
            let entry = match self.pull() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return None;
                }
            };
            if self.skipped < self.offset {
                self.skipped += 1;
                continue;
            }
            self.sent += 1;
            return Some(Ok(entry));
        }
    }
}
