// Recommendation engine: constraint model, genetic search and deterministic
// fallbacks. Everything here is synchronous and works on a request-scoped
// snapshot; no engine function touches shared mutable state.

pub mod constraints;
pub mod fallback;
pub mod genetic;
pub mod sections;
pub mod timeslot;

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use crate::models::{Category, Offering, Plan, Section};

/// Per-code minimum completed-hours floors published by the university on
/// top of whatever the plan sheet says. The effective floor is the larger of
/// the two.
fn min_hours_for_code(code: &str) -> Option<u32> {
    match code {
        "ELE5467" => Some(115),
        "ELE5455" => Some(120),
        "ELE5512" | "ELE5527" | "ELE5552" | "ELE5553" | "ELE5555" | "ELE5556" | "ELE5557"
        | "ELE5558" | "ELE5559" | "ELE5560" | "ELE5561" | "ELE5562" | "ELE5565"
        | "ELE5666" => Some(90),
        _ => None,
    }
}

/// Read-only snapshot of everything one recommendation request needs. Built
/// once per request from the shared plan and the last-known-good offering,
/// so concurrent refreshes can never be observed mid-computation.
pub struct RequestContext {
    pub plan: Arc<Plan>,
    /// Offering keyed by plan name (already reconciled).
    pub offered: Offering,
    /// Taken course name -> hours counted toward completion. Names unknown
    /// to the plan are ignored rather than rejected.
    pub taken: HashMap<String, u32>,
    /// Global credit-hour cap, already clamped by the caller.
    pub max_hours: u32,
    completed_hours: u32,
    taken_category_hours: HashMap<Category, u32>,
}

impl RequestContext {
    pub fn new(plan: Arc<Plan>, offered: Offering, taken_names: &[String], max_hours: u32) -> Self {
        let mut taken = HashMap::new();
        let mut completed_hours = 0u32;
        let mut taken_category_hours: HashMap<Category, u32> = HashMap::new();
        for name in taken_names {
            let Some(info) = plan.get(name) else { continue };
            if taken.insert(name.clone(), info.hours).is_none() {
                completed_hours += info.hours;
                if let Some(cat) = info.category {
                    *taken_category_hours.entry(cat).or_insert(0) += info.hours;
                }
            }
        }
        RequestContext {
            plan,
            offered,
            taken,
            max_hours,
            completed_hours,
            taken_category_hours,
        }
    }

    /// Hours a course costs this term: the offering override when present,
    /// otherwise the plan hours.
    pub fn effective_hours(&self, name: &str) -> u32 {
        if let Some(offered) = self.offered.get(name) {
            if offered.hours > 0 {
                return offered.hours;
            }
        }
        self.plan.get(name).map(|c| c.hours).unwrap_or(0)
    }

    /// Effective minimum-hours floor: the larger of the plan floor and the
    /// per-code floor attached to the offered bulletin code.
    pub fn effective_min_hours(&self, name: &str) -> Option<u32> {
        let base = self.plan.get(name).and_then(|c| c.min_hours);
        let by_code = self
            .offered
            .get(name)
            .and_then(|c| c.code.as_deref())
            .and_then(min_hours_for_code);
        match (base, by_code) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Hours completed across all taken courses.
    pub fn completed_hours(&self) -> u32 {
        self.completed_hours
    }

    /// Hours already consumed in a category by taken courses. Computed once
    /// per request and combined with candidate contributions.
    pub fn taken_category_hours(&self, category: Category) -> u32 {
        self.taken_category_hours.get(&category).copied().unwrap_or(0)
    }

    /// Courses that are offered, in the plan and not yet taken, sorted by
    /// name so stochastic callers are reproducible under a fixed seed.
    pub fn eligible_pool(&self) -> Vec<String> {
        let mut pool: Vec<String> = self
            .offered
            .keys()
            .filter(|n| self.plan.contains_key(*n) && !self.taken.contains_key(*n))
            .cloned()
            .collect();
        pool.sort();
        pool
    }

    /// False when the snapshot carries no meeting data at all, in which case
    /// only the plan-only baseline can produce anything.
    pub fn has_section_data(&self) -> bool {
        self.offered.values().any(|c| !c.sections.is_empty())
    }
}

/// Total effective hours of a course list.
pub fn total_hours(courses: &[String], ctx: &RequestContext) -> u32 {
    courses.iter().map(|n| ctx.effective_hours(n)).sum()
}

/// Which planner produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerKind {
    Genetic,
    Greedy,
    Baseline,
}

/// A recommended course set with its concrete section assignment, when the
/// offering carries sections.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub courses: Vec<String>,
    pub total_hours: u32,
    pub assignment: Option<HashMap<String, Section>>,
    pub planner: PlannerKind,
}

impl Recommendation {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() || self.total_hours == 0
    }
}

/// Runs the full planner cascade: genetic search first, the deterministic
/// greedy planner when the search comes back empty or zero-hour, and the
/// plan-only baseline when the offering carries no meeting data at all.
pub fn recommend<R: Rng>(ctx: &RequestContext, rng: &mut R) -> Recommendation {
    let (courses, assignment) = genetic::run(ctx, rng);
    let hours = total_hours(&courses, ctx);
    if !courses.is_empty() && hours > 0 {
        return Recommendation {
            courses,
            total_hours: hours,
            assignment,
            planner: PlannerKind::Genetic,
        };
    }

    let (picked, hours) = fallback::greedy(ctx);
    if !picked.is_empty() && hours > 0 {
        let assignment = sections::assign_sections(&picked, &ctx.offered)
            .map(|m| m.into_iter().map(|(k, v)| (k, v.clone())).collect());
        return Recommendation {
            courses: picked,
            total_hours: hours,
            assignment,
            planner: PlannerKind::Greedy,
        };
    }

    if !ctx.has_section_data() {
        let (picked, hours) = fallback::baseline(ctx);
        return Recommendation {
            courses: picked,
            total_hours: hours,
            assignment: None,
            planner: PlannerKind::Baseline,
        };
    }

    Recommendation {
        courses: Vec::new(),
        total_hours: 0,
        assignment: None,
        planner: PlannerKind::Greedy,
    }
}
