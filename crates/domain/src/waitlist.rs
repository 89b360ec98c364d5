// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Waitlist numbering for a single class.

use crate::booking::WaitlistEntry;

/// Returns the position a new entry receives: one past the current maximum.
#[must_use]
pub fn next_position(entries: &[WaitlistEntry]) -> u32 {
    entries
        .iter()
        .map(|e| e.position)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Computes the new positions after the entry at `removed_position` leaves.
///
/// Every later entry moves up by one. The result is ordered by ascending
/// position so that rewriting rows in order never collides with the
/// `(class_id, position)` uniqueness constraint.
///
/// # Returns
///
/// `(waitlist_id, new_position)` pairs for the entries that move.
#[must_use]
pub fn renumber_after_removal(entries: &[WaitlistEntry], removed_position: u32) -> Vec<(i64, u32)> {
    let mut later: Vec<&WaitlistEntry> = entries
        .iter()
        .filter(|e| e.position > removed_position)
        .collect();
    later.sort_by_key(|e| e.position);
    later
        .into_iter()
        .map(|e| (e.waitlist_id, e.position - 1))
        .collect()
}

/// Returns whether positions are exactly `1..=N` with no gaps or duplicates.
#[must_use]
pub fn is_contiguous(entries: &[WaitlistEntry]) -> bool {
    let mut positions: Vec<u32> = entries.iter().map(|e| e.position).collect();
    positions.sort_unstable();
    positions
        .iter()
        .zip(1_u32..)
        .all(|(position, expected)| *position == expected)
}
