// Genetic search over candidate course sets.
//
// Stochastic local search with no convergence guarantee, run once per
// request. The branching factor (eligible courses per term) is
// small, so the fixed population and generation counts are enough in
// practice; the deterministic planners in `fallback` cover the misses.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::constraints::{INFEASIBLE_SCORE, evaluate};
use crate::engine::sections::assign_sections;
use crate::engine::{RequestContext, total_hours};
use crate::models::Section;

pub const POPULATION_SIZE: usize = 120;
pub const GENERATIONS: usize = 120;
pub const ELITE_SIZE: usize = 12;
pub const MUTATION_RATE: f64 = 0.3;

/// Random-size random subset of the pool, in random order. Candidate order
/// matters downstream: it is the order the first-fit scheduler walks.
fn random_individual<R: Rng>(pool: &[String], max_hours: u32, rng: &mut R) -> Vec<String> {
    let max_courses = ((max_hours / 2).max(1) as usize).min(pool.len());
    let size = rng.random_range(1..=max_courses);
    let mut deck = pool.to_vec();
    deck.shuffle(rng);
    deck.truncate(size);
    deck
}

/// First half of parent A followed by the second half of parent B,
/// deduplicated preserving first occurrence.
fn crossover(a: &[String], b: &[String]) -> Vec<String> {
    let mut child: Vec<String> = Vec::with_capacity(a.len() / 2 + b.len() - b.len() / 2);
    for name in a[..a.len() / 2].iter().chain(b[b.len() / 2..].iter()) {
        if !child.contains(name) {
            child.push(name.clone());
        }
    }
    child
}

/// Replaces one randomly chosen gene with a random eligible course not
/// already present. Empty individuals are left untouched.
fn mutate<R: Rng>(individual: &mut [String], pool: &[String], rng: &mut R) {
    if individual.is_empty() {
        return;
    }
    let replacements: Vec<&String> = pool.iter().filter(|n| !individual.contains(n)).collect();
    if replacements.is_empty() {
        return;
    }
    let slot = rng.random_range(0..individual.len());
    individual[slot] = replacements[rng.random_range(0..replacements.len())].clone();
}

/// Evolves candidates for a fixed number of generations and returns the best
/// feasible course set found together with its section assignment. An empty
/// eligible pool, or a best individual that is still infeasible after the
/// final cap trim, yields an empty result so the fallback planners engage.
pub fn run<R: Rng>(
    ctx: &RequestContext,
    rng: &mut R,
) -> (Vec<String>, Option<HashMap<String, Section>>) {
    let pool = ctx.eligible_pool();
    if pool.is_empty() {
        return (Vec::new(), None);
    }

    let mut population: Vec<Vec<String>> = (0..POPULATION_SIZE)
        .map(|_| random_individual(&pool, ctx.max_hours, rng))
        .collect();

    let mut best: Vec<String> = Vec::new();
    let mut best_score = f64::NEG_INFINITY;

    for _ in 0..GENERATIONS {
        let mut scored: Vec<(Vec<String>, f64)> = population
            .drain(..)
            .map(|ind| {
                let score = evaluate(&ind, ctx).score();
                (ind, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        if scored[0].1 > best_score {
            best = scored[0].0.clone();
            best_score = scored[0].1;
        }

        let elites: Vec<Vec<String>> = scored
            .into_iter()
            .take(ELITE_SIZE)
            .map(|(ind, _)| ind)
            .collect();

        // Elites survive unchanged; the rest of the fixed-size population is
        // refilled with children of sampled elite pairs.
        let mut next = elites.clone();
        while next.len() < POPULATION_SIZE {
            let i = rng.random_range(0..elites.len());
            let mut j = rng.random_range(0..elites.len());
            if elites.len() > 1 {
                while j == i {
                    j = rng.random_range(0..elites.len());
                }
            }
            let mut child = crossover(&elites[i], &elites[j]);
            if rng.random_range(0.0..1.0) < MUTATION_RATE {
                mutate(&mut child, &pool, rng);
            }
            next.push(child);
        }
        population = next;
    }

    for ind in &population {
        let score = evaluate(ind, ctx).score();
        if score > best_score {
            best = ind.clone();
            best_score = score;
        }
    }

    // Trim trailing courses until the total fits the cap, then insist the
    // survivor is genuinely feasible before reporting it.
    while !best.is_empty() && total_hours(&best, ctx) > ctx.max_hours {
        best.pop();
    }
    if best.is_empty() || best_score <= INFEASIBLE_SCORE || !evaluate(&best, ctx).is_feasible() {
        return (Vec::new(), None);
    }

    let assignment = assign_sections(&best, &ctx.offered)
        .map(|m| m.into_iter().map(|(k, v)| (k, v.clone())).collect());
    (best, assignment)
}
