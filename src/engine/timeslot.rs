// Meeting-slot parsing and interval conflict detection.
//
// Bulletin slots look like "ث خ 08:30 09:30": one or more weekday letters
// followed by two clock times. Digits may be Arabic-Indic. The university
// prints afternoon hours 01..07 without AM/PM markers, so those fold to
// 13..19.

use crate::models::Section;

/// Weekday letters in bulletin order, Sunday first.
const DAY_SYMBOLS: [char; 7] = ['ح', 'ن', 'ث', 'ر', 'خ', 'ج', 'س'];

/// A meeting interval on one weekday, in minutes from midnight.
/// `end` is exclusive: touching intervals do not conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub weekday: u8,
    pub start: u16,
    pub end: u16,
}

/// True when both intervals fall on the same weekday and genuinely overlap.
pub fn conflicts(a: Interval, b: Interval) -> bool {
    a.weekday == b.weekday && a.start < b.end && b.start < a.end
}

fn weekday_index(c: char) -> Option<u8> {
    DAY_SYMBOLS.iter().position(|&d| d == c).map(|i| i as u8)
}

/// Folds Arabic-Indic digits to ASCII; every other character passes through.
pub(crate) fn normalize_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '٠'..='٩' => char::from(b'0' + (c as u32 - '٠' as u32) as u8),
            other => other,
        })
        .collect()
}

/// Hours 1..=7 carry no AM/PM marker and mean afternoon, so they fold to
/// 13..=19. Everything else is taken as written.
fn to_24h_minutes(hour: u32, minute: u32) -> u16 {
    let h = if (1..=7).contains(&hour) { hour + 12 } else { hour };
    (h * 60 + minute) as u16
}

/// Scans for `H:MM` / `HH:MM` tokens and returns the (hour, minute) pairs in
/// order of appearance.
fn find_times(s: &str) -> Vec<(u32, u32)> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let run_len = i - run_start;
        if run_len > 2 || i >= chars.len() || chars[i] != ':' {
            continue;
        }
        let m1 = chars.get(i + 1).copied().unwrap_or(' ');
        let m2 = chars.get(i + 2).copied().unwrap_or(' ');
        if !m1.is_ascii_digit() || !m2.is_ascii_digit() {
            i += 1;
            continue;
        }
        let hour: u32 = chars[run_start..i].iter().collect::<String>().parse().unwrap_or(0);
        let minute = m1.to_digit(10).unwrap_or(0) * 10 + m2.to_digit(10).unwrap_or(0);
        out.push((hour, minute));
        i += 3;
    }
    out
}

/// Parses one slot string into one interval per weekday letter found.
///
/// Malformed slots (no weekday letter, fewer than two times) yield no
/// intervals; the slot is dropped silently rather than reported.
pub fn slot_to_intervals(slot: &str) -> Vec<Interval> {
    let s = normalize_digits(slot);
    let days: Vec<u8> = s.chars().filter_map(weekday_index).collect();
    let times = find_times(&s);
    if days.is_empty() || times.len() < 2 {
        return Vec::new();
    }
    let start = to_24h_minutes(times[0].0, times[0].1);
    let mut end = to_24h_minutes(times[1].0, times[1].1);
    if end <= start {
        // Slot crosses the noon fold; extend within the same day.
        end += 12 * 60;
    }
    days.into_iter()
        .map(|weekday| Interval { weekday, start, end })
        .collect()
}

/// All intervals of a section across its slot strings. A section whose slots
/// are all unparseable comes back empty and is treated as untimed: it can
/// never conflict with anything.
pub fn section_intervals(section: &Section) -> Vec<Interval> {
    section
        .times
        .iter()
        .flat_map(|slot| slot_to_intervals(slot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_day_slot() {
        let ivals = slot_to_intervals("ث 10:00 11:00");
        assert_eq!(
            ivals,
            vec![Interval { weekday: 2, start: 600, end: 660 }]
        );
    }

    #[test]
    fn parses_multi_day_slot() {
        let ivals = slot_to_intervals("ث خ 08:30 09:30");
        assert_eq!(ivals.len(), 2);
        assert_eq!(ivals[0], Interval { weekday: 2, start: 510, end: 570 });
        assert_eq!(ivals[1], Interval { weekday: 4, start: 510, end: 570 });
    }

    #[test]
    fn folds_arabic_indic_digits() {
        let ivals = slot_to_intervals("ث ١٠:٠٠ ١١:٠٠");
        assert_eq!(
            ivals,
            vec![Interval { weekday: 2, start: 600, end: 660 }]
        );
    }

    #[test]
    fn low_hours_are_afternoon() {
        assert_eq!(to_24h_minutes(2, 0), 14 * 60);
        assert_eq!(to_24h_minutes(7, 30), 19 * 60 + 30);
        assert_eq!(to_24h_minutes(9, 0), 9 * 60);
        assert_eq!(to_24h_minutes(12, 15), 12 * 60 + 15);
    }

    #[test]
    fn end_before_start_extends_twelve_hours() {
        // 11:00 -> 660, 09:00 -> 540; end <= start so the end extends.
        let ivals = slot_to_intervals("ح 11:00 09:00");
        assert_eq!(
            ivals,
            vec![Interval { weekday: 0, start: 660, end: 540 + 720 }]
        );
    }

    #[test]
    fn malformed_slots_yield_nothing() {
        assert!(slot_to_intervals("").is_empty());
        assert!(slot_to_intervals("10:00 11:00").is_empty()); // no weekday
        assert!(slot_to_intervals("ث 10:00").is_empty()); // single time
        assert!(slot_to_intervals("قاعة 101").is_empty());
    }

    #[test]
    fn conflict_requires_same_weekday() {
        let a = Interval { weekday: 2, start: 600, end: 660 };
        let b = Interval { weekday: 3, start: 600, end: 660 };
        assert!(!conflicts(a, b));
    }

    #[test]
    fn conflict_is_symmetric() {
        let a = Interval { weekday: 2, start: 540, end: 600 };
        let b = Interval { weekday: 2, start: 570, end: 630 };
        assert!(conflicts(a, b));
        assert!(conflicts(b, a));
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        let a = Interval { weekday: 2, start: 540, end: 600 };
        let b = Interval { weekday: 2, start: 600, end: 660 };
        assert!(!conflicts(a, b));
        assert!(!conflicts(b, a));
    }

    #[test]
    fn untimed_section_has_no_intervals() {
        let sec = Section {
            instructor: String::new(),
            status: String::new(),
            times: vec!["بدون وقت".to_string()],
        };
        assert!(section_intervals(&sec).is_empty());
    }
}
