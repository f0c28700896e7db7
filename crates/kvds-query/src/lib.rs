mod entry;
mod filter;
mod key;
mod naive;
mod order;
mod query;

pub use entry::Entry;
pub use filter::{Filter, FilterFn, Op};
pub use key::{Key, normalize_prefix};
pub use naive::{NaiveResults, naive_query_apply};
pub use order::{Order, OrderFn, compare_entries, sort_entries};
pub use query::Query;
