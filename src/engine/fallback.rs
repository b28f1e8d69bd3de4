// Deterministic planners used when the genetic search comes back empty.

use std::collections::HashMap;

use crate::engine::RequestContext;
use crate::engine::sections::first_fit_section;
use crate::engine::timeslot::Interval;
use crate::models::Category;

/// Sort key shared by both planners: category priority rank, then the
/// heavier course, then the name as a tiebreaker.
fn priority(name: &str, hours: u32, category: Option<Category>) -> (u8, std::cmp::Reverse<u32>, String) {
    let rank = category.map(|c| c.rank()).unwrap_or(9);
    (rank, std::cmp::Reverse(hours), name.to_string())
}

/// Single-pass greedy admission over the live offering. A course is admitted
/// iff the running total stays within the cap, its prerequisites are all
/// taken, its minimum-hours floor is met, its category (taken plus running
/// hours) stays under the ceiling, and one of its sections first-fits
/// against the sections already committed. Deterministic: identical inputs
/// produce identical outputs.
pub fn greedy(ctx: &RequestContext) -> (Vec<String>, u32) {
    let mut candidates = ctx.eligible_pool();
    candidates.sort_by_key(|name| {
        priority(
            name,
            ctx.effective_hours(name),
            ctx.plan.get(name).and_then(|c| c.category),
        )
    });

    let mut picked: Vec<String> = Vec::new();
    let mut committed: Vec<Interval> = Vec::new();
    let mut category_used: HashMap<Category, u32> = HashMap::new();
    let mut sum = 0u32;

    for name in candidates {
        let Some(info) = ctx.plan.get(&name) else { continue };
        let hours = ctx.effective_hours(&name);
        if hours == 0 || sum + hours > ctx.max_hours {
            continue;
        }
        if info.prerequisites.iter().any(|p| !ctx.taken.contains_key(p)) {
            continue;
        }
        if let Some(required) = ctx.effective_min_hours(&name) {
            if ctx.completed_hours() < required {
                continue;
            }
        }
        if let Some(cat) = info.category {
            let used = category_used.get(&cat).copied().unwrap_or(0);
            if ctx.taken_category_hours(cat) + used + hours > cat.ceiling() {
                continue;
            }
        }
        let Some(course) = ctx.offered.get(&name) else { continue };
        let Some((_, intervals)) = first_fit_section(course, &committed) else {
            continue;
        };

        committed.extend(intervals);
        if let Some(cat) = info.category {
            *category_used.entry(cat).or_insert(0) += hours;
        }
        sum += hours;
        picked.push(name);
        if sum >= ctx.max_hours {
            break;
        }
    }
    (picked, sum)
}

/// Plan-only baseline: the same ordering walked over the plan itself,
/// ignoring sections, prerequisites, floors and category ceilings. Used only
/// when the offering carries no meeting data at all.
pub fn baseline(ctx: &RequestContext) -> (Vec<String>, u32) {
    let mut pool: Vec<&String> = ctx
        .plan
        .keys()
        .filter(|n| !ctx.taken.contains_key(*n))
        .collect();
    pool.sort_by_key(|name| {
        let info = &ctx.plan[*name];
        priority(name, info.hours, info.category)
    });

    let mut picked: Vec<String> = Vec::new();
    let mut sum = 0u32;
    for name in pool {
        let hours = ctx.plan[name].hours;
        if sum + hours <= ctx.max_hours {
            picked.push(name.clone());
            sum += hours;
        }
        if sum >= ctx.max_hours {
            break;
        }
    }
    (picked, sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::fixtures::{ctx_with, open_course, plan_course, section, timed_course};
    use crate::models::Category;

    #[test]
    fn greedy_prefers_major_required_courses() {
        let plan = vec![
            plan_course("اختيارية", 3, Some(Category::ElectiveRequirements), &[], None),
            plan_course("تخصص", 3, Some(Category::MajorRequired), &[], None),
            plan_course("كلية", 3, Some(Category::CollegeRequired), &[], None),
        ];
        let offered = vec![
            open_course("اختيارية", 3),
            open_course("تخصص", 3),
            open_course("كلية", 3),
        ];
        let ctx = ctx_with(plan, offered, &[], 6);
        let (picked, sum) = greedy(&ctx);
        assert_eq!(picked, vec!["تخصص".to_string(), "كلية".to_string()]);
        assert_eq!(sum, 6);
    }

    #[test]
    fn greedy_never_admits_missing_prerequisites() {
        let plan = vec![
            plan_course("برمجة 2", 3, Some(Category::MajorRequired), &["برمجة 1"], None),
            plan_course("برمجة 1", 3, Some(Category::MajorRequired), &[], None),
        ];
        let offered = vec![open_course("برمجة 2", 3), open_course("برمجة 1", 3)];
        let ctx = ctx_with(plan, offered, &[], 18);
        let (picked, _) = greedy(&ctx);
        assert!(!picked.contains(&"برمجة 2".to_string()));
        assert!(picked.contains(&"برمجة 1".to_string()));
    }

    #[test]
    fn greedy_respects_cap_and_stops_early() {
        let plan = vec![
            plan_course("أ", 3, Some(Category::MajorRequired), &[], None),
            plan_course("ب", 3, Some(Category::MajorRequired), &[], None),
            plan_course("ج", 3, Some(Category::MajorRequired), &[], None),
        ];
        let offered = vec![
            open_course("أ", 3),
            open_course("ب", 3),
            open_course("ج", 3),
        ];
        let ctx = ctx_with(plan, offered, &[], 6);
        let (picked, sum) = greedy(&ctx);
        assert_eq!(picked.len(), 2);
        assert_eq!(sum, 6);
    }

    #[test]
    fn greedy_skips_conflicting_sections() {
        let plan = vec![
            plan_course("أ", 3, Some(Category::MajorRequired), &[], None),
            plan_course("ب", 3, Some(Category::MajorRequired), &[], None),
        ];
        let offered = vec![
            timed_course("أ", 3, &[section(&["ث 09:00 10:00"])]),
            timed_course("ب", 3, &[section(&["ث 09:30 10:30"])]),
        ];
        let ctx = ctx_with(plan, offered, &[], 18);
        let (picked, sum) = greedy(&ctx);
        assert_eq!(picked, vec!["أ".to_string()]);
        assert_eq!(sum, 3);
    }

    #[test]
    fn greedy_counts_taken_hours_against_category_ceiling() {
        // Elective ceiling 9 with 9 hours already taken: nothing fits.
        let plan = vec![
            plan_course("خ1", 9, Some(Category::ElectiveRequirements), &[], None),
            plan_course("خ2", 3, Some(Category::ElectiveRequirements), &[], None),
        ];
        let offered = vec![open_course("خ2", 3)];
        let ctx = ctx_with(plan, offered, &["خ1"], 18);
        let (picked, sum) = greedy(&ctx);
        assert!(picked.is_empty());
        assert_eq!(sum, 0);
    }

    #[test]
    fn greedy_enforces_minimum_hours_floor() {
        let plan = vec![
            plan_course("مشروع", 3, Some(Category::MajorRequired), &[], Some(90)),
            plan_course("عادية", 3, Some(Category::MajorRequired), &[], None),
        ];
        let offered = vec![open_course("مشروع", 3), open_course("عادية", 3)];
        let ctx = ctx_with(plan, offered, &[], 18);
        let (picked, _) = greedy(&ctx);
        assert_eq!(picked, vec!["عادية".to_string()]);
    }

    #[test]
    fn greedy_is_idempotent() {
        let plan = vec![
            plan_course("أ", 3, Some(Category::MajorRequired), &[], None),
            plan_course("ب", 4, Some(Category::CollegeRequired), &[], None),
            plan_course("ج", 3, None, &[], None),
        ];
        let offered = vec![
            timed_course("أ", 3, &[section(&["ح 08:00 09:00"])]),
            timed_course("ب", 4, &[section(&["ن 08:00 10:00"])]),
            timed_course("ج", 3, &[section(&["ث 08:00 09:00"])]),
        ];
        let ctx = ctx_with(plan, offered, &[], 18);
        let first = greedy(&ctx);
        for _ in 0..5 {
            assert_eq!(greedy(&ctx), first);
        }
    }

    #[test]
    fn baseline_ignores_prerequisites_and_sections() {
        let plan = vec![
            plan_course("متقدمة", 3, Some(Category::MajorRequired), &["مفقودة"], None),
            plan_course("مفقودة", 3, Some(Category::MajorRequired), &[], None),
        ];
        let ctx = ctx_with(plan, vec![], &[], 18);
        let (picked, sum) = baseline(&ctx);
        assert_eq!(picked.len(), 2);
        assert_eq!(sum, 6);
    }

    #[test]
    fn baseline_skips_taken_and_respects_cap() {
        let plan = vec![
            plan_course("أ", 3, Some(Category::MajorRequired), &[], None),
            plan_course("ب", 3, Some(Category::MajorRequired), &[], None),
            plan_course("ج", 3, Some(Category::MajorRequired), &[], None),
        ];
        let ctx = ctx_with(plan, vec![], &["أ"], 3);
        let (picked, sum) = baseline(&ctx);
        assert_eq!(picked.len(), 1);
        assert_eq!(sum, 3);
        assert!(!picked.contains(&"أ".to_string()));
    }

    #[test]
    fn baseline_is_idempotent() {
        let plan = vec![
            plan_course("أ", 3, Some(Category::MajorRequired), &[], None),
            plan_course("ب", 4, Some(Category::UniversityRequired), &[], None),
            plan_course("ج", 2, None, &[], None),
        ];
        let ctx = ctx_with(plan, vec![], &[], 9);
        let first = baseline(&ctx);
        for _ in 0..5 {
            assert_eq!(baseline(&ctx), first);
        }
    }
}
