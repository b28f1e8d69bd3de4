//! Reconciling bulletin course names with plan course names.
//!
//! The bulletin and the plan sheets are maintained by different offices, so
//! the same course shows up with different spacing, punctuation, diacritics
//! and digit scripts. Matching runs in stages from strict to fuzzy; a
//! bulletin course that survives no stage is dropped rather than guessed.

use std::collections::HashMap;

use strsim::jaro_winkler;

use crate::engine::timeslot::normalize_digits;
use crate::models::{OfferedCourse, Offering, Plan, ScrapedCourse};

const FUZZY_THRESHOLD: f64 = 0.9;

/// Canonical form used for all name comparisons: Arabic-Indic digits folded
/// to ASCII, tatweel and diacritics stripped, dashes unified, punctuation
/// turned into spaces, whitespace collapsed.
pub fn normalize_arabic(s: &str) -> String {
    let folded = normalize_digits(s);
    let mut out = String::with_capacity(folded.len());
    for ch in folded.chars() {
        match ch {
            'ـ' => {}
            '\u{064B}'..='\u{0652}' => {}
            '–' | '—' => out.push('-'),
            '(' | ')' | '[' | ']' | '{' | '}' | '،' | ',' | ':' | ';' | '|' => out.push(' '),
            c => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn token_overlap(a: &str, b: &str) -> usize {
    let b_tokens: Vec<&str> = b.split_whitespace().collect();
    a.split_whitespace()
        .filter(|t| t.chars().count() > 1 && b_tokens.contains(t))
        .count()
}

fn match_plan_name<'a>(
    scraped_norm: &str,
    normalized_plan: &'a [(String, String)],
) -> Option<&'a str> {
    // Stage 1: exact normalized equality.
    for (name, norm) in normalized_plan {
        if norm == scraped_norm {
            return Some(name.as_str());
        }
    }

    // Stage 2: containment, accepted only when exactly one plan course
    // matches. "تفاضل وتكامل" inside "تفاضل وتكامل 1" is ambiguous against a
    // plan that also has "تفاضل وتكامل 2".
    let contained: Vec<&(String, String)> = normalized_plan
        .iter()
        .filter(|(_, norm)| norm.contains(scraped_norm) || scraped_norm.contains(norm.as_str()))
        .collect();
    if let [only] = contained.as_slice() {
        return Some(only.0.as_str());
    }

    // Stage 3: shared tokens, a strictly best overlap of at least two. A tie
    // between plan courses is ambiguous and falls through.
    let mut overlaps: Vec<(&str, usize)> = normalized_plan
        .iter()
        .map(|(name, norm)| (name.as_str(), token_overlap(scraped_norm, norm)))
        .collect();
    overlaps.sort_by(|a, b| b.1.cmp(&a.1));
    match overlaps.as_slice() {
        [(name, best), rest @ ..] if *best >= 2 && rest.iter().all(|(_, o)| o < best) => {
            return Some(*name);
        }
        _ => {}
    }

    // Stage 4: fuzzy similarity, same uniqueness rule.
    let mut scores: Vec<(&str, f64)> = normalized_plan
        .iter()
        .map(|(name, norm)| (name.as_str(), jaro_winkler(norm, scraped_norm)))
        .collect();
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    match scores.as_slice() {
        [(name, best), rest @ ..]
            if *best >= FUZZY_THRESHOLD && rest.iter().all(|(_, s)| s < best) =>
        {
            Some(*name)
        }
        _ => None,
    }
}

/// Maps a scraped bulletin (keyed by bulletin code) onto the plan (keyed by
/// course name). The first bulletin course to claim a plan name keeps it;
/// codes are iterated in sorted order so the outcome is deterministic.
pub fn map_offered_to_plan(scraped: &HashMap<String, ScrapedCourse>, plan: &Plan) -> Offering {
    let normalized_plan: Vec<(String, String)> = plan
        .keys()
        .map(|name| (name.clone(), normalize_arabic(name)))
        .collect();

    let mut codes: Vec<&String> = scraped.keys().collect();
    codes.sort();

    let mut offering: Offering = HashMap::new();
    for code in codes {
        let course = &scraped[code];
        let norm = normalize_arabic(&course.name);
        if norm.is_empty() {
            continue;
        }
        let Some(plan_name) = match_plan_name(&norm, &normalized_plan) else {
            continue;
        };
        offering
            .entry(plan_name.to_string())
            .or_insert_with(|| OfferedCourse {
                code: Some(code.clone()),
                hours: course.hours,
                sections: course.sections.clone(),
            });
    }
    offering
}
