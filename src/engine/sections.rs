// Ordered first-fit section assignment.
//
// The same walk is used both to test feasibility while scoring candidates
// and to produce the final reported assignment, so the reported schedule is
// always the one that was scored. There is deliberately no backtracking and
// no reordering: a candidate that fails here may be assignable under a
// different course or section order, and that order sensitivity is part of
// the documented policy. Do not swap in a backtracking scheduler without
// upgrading both roles together.

use std::collections::HashMap;

use crate::engine::timeslot::{Interval, conflicts, section_intervals};
use crate::models::{OfferedCourse, Offering, Section};

/// First section of `course`, in its given order, whose intervals collide
/// with none of the committed ones. A section with no parseable intervals is
/// untimed and therefore always fits.
pub fn first_fit_section<'a>(
    course: &'a OfferedCourse,
    committed: &[Interval],
) -> Option<(&'a Section, Vec<Interval>)> {
    for sec in &course.sections {
        let ivals = section_intervals(sec);
        let clash = ivals
            .iter()
            .any(|i| committed.iter().any(|u| conflicts(*i, *u)));
        if !clash {
            return Some((sec, ivals));
        }
    }
    None
}

/// Walks the courses in the given order, committing the first conflict-free
/// section of each. Returns `None` as soon as any course (including one
/// absent from the offering, or offered with no sections) cannot be placed.
pub fn assign_sections<'a>(
    course_order: &[String],
    offered: &'a Offering,
) -> Option<HashMap<String, &'a Section>> {
    let mut committed: Vec<Interval> = Vec::new();
    let mut chosen: HashMap<String, &Section> = HashMap::new();
    for name in course_order {
        let course = offered.get(name)?;
        let (sec, ivals) = first_fit_section(course, &committed)?;
        committed.extend(ivals);
        chosen.insert(name.clone(), sec);
    }
    Some(chosen)
}
