use super::{ParticipantSpan, Window, WindowShape};

/// Window for `row` under the clamped policy.
///
/// Rules are tried in order and the first match wins:
/// 1. the participant fits in the window: show all of their photos;
/// 2. near the start of the table: slide the active photo left;
/// 3. near the end of the table: slide the active photo right;
/// 4. near the participant's first photo: start the window there;
/// 5. near the participant's last photo: end the window there;
/// 6. otherwise the configured layout.
pub(super) fn window(
    row: usize,
    participant: ParticipantSpan,
    table_len: usize,
    shape: WindowShape,
) -> Window {
    let width = shape.width();
    let default_active = shape.active_offset();
    let default_right = shape.right_count();
    let into_participant = row - participant.start;

    let (width, active_offset, right_count) = if participant.count <= width {
        let active = into_participant;
        (participant.count, active, participant.count - active - 1)
    } else if row < default_active {
        (width, row, width - row - 1)
    } else if row + default_right >= table_len {
        let right = table_len - row - 1;
        (width, width - right - 1, right)
    } else if into_participant < default_active {
        (width, into_participant, width - into_participant - 1)
    } else if into_participant + default_right >= participant.count {
        let right = participant.count - into_participant - 1;
        (width, width - right - 1, right)
    } else {
        (width, default_active, default_right)
    };

    Window {
        start: row - active_offset,
        width,
        active_offset,
        right_count,
    }
}
