//! Slot derivation.
//!
//! Given a doctor's availability window for a weekday and the times already
//! held by active appointments, produce the bookable half-hour start times in
//! chronological order. This is a pure function so the policy is testable
//! without a store.

use chrono::{Duration, NaiveTime};

use crate::models::DayWindow;

/// Fixed slot stride. Slots are generated at this interval regardless of any
/// individual appointment's configured duration: a booked appointment blocks
/// only the slot matching its start time, not the slots it overlaps.
pub const SLOT_STRIDE_MINUTES: i64 = 30;

/// Derives the bookable slots for one day.
///
/// Rules:
/// - a day not marked available yields no slots (not an error);
/// - slots run from `start` up to, and excluding, `end`;
/// - a zero-length or inverted window yields no slots;
/// - any generated time exactly matching a booked time is removed.
pub fn derive_slots(window: &DayWindow, booked: &[NaiveTime]) -> Vec<NaiveTime> {
    if !window.available {
        return Vec::new();
    }
    let (Some(start), Some(end)) = (window.start, window.end) else {
        return Vec::new();
    };

    let stride = Duration::minutes(SLOT_STRIDE_MINUTES);
    let mut slots = Vec::new();
    let mut current = start;

    while current < end {
        if !booked.contains(&current) {
            slots.push(current);
        }
        let (next, wrapped_days) = current.overflowing_add_signed(stride);
        if wrapped_days != 0 {
            // Stepped past midnight; the window is over.
            break;
        }
        current = next;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn window(start: NaiveTime, end: NaiveTime) -> DayWindow {
        DayWindow {
            available: true,
            start: Some(start),
            end: Some(end),
        }
    }

    #[test]
    fn unavailable_day_yields_nothing() {
        let w = DayWindow {
            available: false,
            start: Some(t(9, 0)),
            end: Some(t(17, 0)),
        };
        assert!(derive_slots(&w, &[]).is_empty());
    }

    #[test]
    fn nine_to_five_yields_sixteen_slots() {
        let slots = derive_slots(&window(t(9, 0), t(17, 0)), &[]);
        assert_eq!(slots.len(), 16);
        assert_eq!(slots.first(), Some(&t(9, 0)));
        assert_eq!(slots.last(), Some(&t(16, 30)));
        // Chronological, half-hour stride throughout.
        for pair in slots.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::minutes(30));
        }
    }

    #[test]
    fn end_time_is_exclusive() {
        let slots = derive_slots(&window(t(9, 0), t(10, 0)), &[]);
        assert_eq!(slots, vec![t(9, 0), t(9, 30)]);
    }

    #[test]
    fn booked_times_are_removed() {
        let slots = derive_slots(&window(t(9, 0), t(11, 0)), &[t(9, 30), t(10, 30)]);
        assert_eq!(slots, vec![t(9, 0), t(10, 0)]);
    }

    #[test]
    fn booking_blocks_only_its_start_time() {
        // A 60-minute appointment at 09:00 still leaves 09:30 bookable.
        let slots = derive_slots(&window(t(9, 0), t(10, 30)), &[t(9, 0)]);
        assert_eq!(slots, vec![t(9, 30), t(10, 0)]);
    }

    #[test]
    fn inverted_window_yields_nothing() {
        assert!(derive_slots(&window(t(17, 0), t(9, 0)), &[]).is_empty());
    }

    #[test]
    fn zero_length_window_yields_nothing() {
        assert!(derive_slots(&window(t(9, 0), t(9, 0)), &[]).is_empty());
    }

    #[test]
    fn missing_window_bounds_yield_nothing() {
        let w = DayWindow {
            available: true,
            start: None,
            end: None,
        };
        assert!(derive_slots(&w, &[]).is_empty());
    }

    #[test]
    fn window_touching_midnight_terminates() {
        let slots = derive_slots(&window(t(23, 0), t(23, 59)), &[]);
        assert_eq!(slots, vec![t(23, 0), t(23, 30)]);
    }
}
