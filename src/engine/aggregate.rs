//! Daily grouping of evaluated rows.

use std::collections::BTreeMap;

use super::types::{AggregateGroup, EvaluatedRow, GroupKey};

/// Sums evaluated rows per `(date, entity)`.
///
/// The returned map iterates in ascending date, then ascending entity order
/// (`None` first), which is the order records are emitted in.
pub fn aggregate<'a, I>(rows: I) -> BTreeMap<GroupKey, AggregateGroup>
where
    I: IntoIterator<Item = &'a EvaluatedRow>,
{
    let mut groups: BTreeMap<GroupKey, AggregateGroup> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.row.date(), row.entity_id.clone()))
            .or_default()
            .add(row);
    }
    groups
}
