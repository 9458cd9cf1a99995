use super::{Window, WindowShape};
use crate::catalog::PhotoTable;

/// A full window around `row` exists and stays inside one participant.
///
/// Participants are contiguous, so it is enough that both ends of the
/// window share `row`'s participant.
pub(super) fn is_valid(table: &PhotoTable, shape: WindowShape, row: usize) -> bool {
    let Some(first) = row.checked_sub(shape.active_offset()) else {
        return false;
    };
    let last = row + shape.right_count();
    let id = table.participant_id(row);
    id.is_some() && table.participant_id(first) == id && table.participant_id(last) == id
}

pub(super) fn window(row: usize, shape: WindowShape) -> Window {
    Window {
        start: row - shape.active_offset(),
        width: shape.width(),
        active_offset: shape.active_offset(),
        right_count: shape.right_count(),
    }
}

/// Last row whose full window still fits before the end of the table.
fn last_candidate(table: &PhotoTable, shape: WindowShape) -> Option<usize> {
    table.len().checked_sub(shape.right_count() + 1)
}

pub(super) fn first_valid_at_or_after(
    table: &PhotoTable,
    shape: WindowShape,
    from: usize,
) -> Option<usize> {
    let last = last_candidate(table, shape)?;
    (from.max(shape.active_offset())..=last).find(|&row| is_valid(table, shape, row))
}

pub(super) fn next_valid(table: &PhotoTable, shape: WindowShape, row: usize) -> Option<usize> {
    first_valid_at_or_after(table, shape, row + 1)
}

pub(super) fn prev_valid(table: &PhotoTable, shape: WindowShape, row: usize) -> Option<usize> {
    (shape.active_offset()..row)
        .rev()
        .find(|&candidate| is_valid(table, shape, candidate))
}
