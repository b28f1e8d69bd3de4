// Hard-constraint evaluation and candidate scoring.

use serde::Serialize;

use crate::engine::RequestContext;
use crate::engine::sections::assign_sections;
use crate::models::Category;

/// Finite sentinel used when ranking infeasible candidates. Infeasible
/// individuals stay orderable among themselves but are never selected over a
/// feasible one.
pub const INFEASIBLE_SCORE: f64 = -1e6;

/// Why a whole candidate failed evaluation. Checks short-circuit, so the
/// reason names the first violated constraint only.
#[derive(Debug, Clone, PartialEq)]
pub enum InfeasibleReason {
    /// No single-section-per-course assignment exists for this ordering.
    SectionConflict,
    MissingPrerequisite { course: String, missing: String },
    BelowMinimumHours { course: String, required: u32 },
    OverHourCap { total: u32 },
    CategoryOverCeiling { category: Category },
}

/// Outcome of evaluating one candidate. Feasibility is tagged explicitly so
/// diagnostics stay decoupled from the ranking sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Feasibility {
    Feasible { score: f64 },
    Infeasible { reason: InfeasibleReason },
}

impl Feasibility {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Feasibility::Feasible { .. })
    }

    /// Ranking value: the score when feasible, the sentinel otherwise.
    pub fn score(&self) -> f64 {
        match self {
            Feasibility::Feasible { score } => *score,
            Feasibility::Infeasible { .. } => INFEASIBLE_SCORE,
        }
    }
}

/// Evaluates the hard constraints in order, short-circuiting on the first
/// failure:
///
/// 1. a conflict-free section assignment exists for the candidate order;
/// 2. every course's prerequisites are within the taken set;
/// 3. every course's minimum-hours floor is at or below completed hours;
/// 4. total candidate hours fit the global cap;
/// 5. per category, taken plus candidate hours stay within the ceiling.
///
/// A feasible candidate scores 10 per course plus its total hours, with a
/// bonus of 20 when the total lands within 2 credit hours of the cap.
pub fn evaluate(candidate: &[String], ctx: &RequestContext) -> Feasibility {
    if assign_sections(candidate, &ctx.offered).is_none() {
        return Feasibility::Infeasible { reason: InfeasibleReason::SectionConflict };
    }

    for name in candidate {
        if let Some(info) = ctx.plan.get(name) {
            for prereq in &info.prerequisites {
                if !ctx.taken.contains_key(prereq) {
                    return Feasibility::Infeasible {
                        reason: InfeasibleReason::MissingPrerequisite {
                            course: name.clone(),
                            missing: prereq.clone(),
                        },
                    };
                }
            }
        }
    }

    for name in candidate {
        if let Some(required) = ctx.effective_min_hours(name) {
            if ctx.completed_hours() < required {
                return Feasibility::Infeasible {
                    reason: InfeasibleReason::BelowMinimumHours {
                        course: name.clone(),
                        required,
                    },
                };
            }
        }
    }

    let total: u32 = candidate.iter().map(|n| ctx.effective_hours(n)).sum();
    if total > ctx.max_hours {
        return Feasibility::Infeasible { reason: InfeasibleReason::OverHourCap { total } };
    }

    for category in crate::models::ALL_CATEGORIES {
        let candidate_hours: u32 = candidate
            .iter()
            .filter(|n| ctx.plan.get(*n).and_then(|c| c.category) == Some(category))
            .map(|n| ctx.effective_hours(n))
            .sum();
        if ctx.taken_category_hours(category) + candidate_hours > category.ceiling() {
            return Feasibility::Infeasible {
                reason: InfeasibleReason::CategoryOverCeiling { category },
            };
        }
    }

    let mut score = 10.0 * candidate.len() as f64 + f64::from(total);
    if total + 2 >= ctx.max_hours {
        score += 20.0;
    }
    Feasibility::Feasible { score }
}

/// Why a single course can never appear in a feasible candidate for this
/// request. Reported alongside an empty recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    AlreadyTaken,
    NotInPlan,
    MissingPrerequisite,
    BelowMinimumHours,
    NoValidSections,
}

/// Per-course diagnostic for infeasible requests: each offered course that
/// could never be admitted, with the first reason that disqualifies it.
/// Courses that are individually admissible are not listed.
pub fn rejection_report(ctx: &RequestContext) -> Vec<(String, RejectionReason)> {
    let mut names: Vec<&String> = ctx.offered.keys().collect();
    names.sort();

    let mut out = Vec::new();
    for name in names {
        if ctx.taken.contains_key(name) {
            out.push((name.clone(), RejectionReason::AlreadyTaken));
            continue;
        }
        let Some(info) = ctx.plan.get(name) else {
            out.push((name.clone(), RejectionReason::NotInPlan));
            continue;
        };
        if info.prerequisites.iter().any(|p| !ctx.taken.contains_key(p)) {
            out.push((name.clone(), RejectionReason::MissingPrerequisite));
            continue;
        }
        if let Some(required) = ctx.effective_min_hours(name) {
            if ctx.completed_hours() < required {
                out.push((name.clone(), RejectionReason::BelowMinimumHours));
                continue;
            }
        }
        if assign_sections(std::slice::from_ref(name), &ctx.offered).is_none() {
            out.push((name.clone(), RejectionReason::NoValidSections));
        }
    }
    out
}
