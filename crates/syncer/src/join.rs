//! Sample-and-hold candidate selection.
//!
//! Pure function over a channel buffer's oldest-first timestamp view, kept
//! apart from buffer mutation so the join rule is testable in isolation.

/// Length of the leading run of timestamps at or before `t`.
///
/// The view must be ordered oldest-first. The last entry of this prefix is the
/// channel's sample-and-hold candidate for reference time `t`; earlier entries
/// are superseded, since future reference times are always >= `t`. Ties
/// (`timestamp == t`) belong to the prefix and are consumed, never left for a
/// later join.
pub(crate) fn hold_prefix_len<I>(timestamps: I, t: i64) -> usize
where
    I: IntoIterator<Item = i64>,
{
    timestamps.into_iter().take_while(|&ts| ts <= t).count()
}
