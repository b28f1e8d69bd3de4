//! Study-plan workbook ingestion.
//!
//! The plan sheet is a single worksheet with Arabic headers; the loader finds
//! the header row by its column names, so leading banner rows and column
//! reordering are both tolerated.

mod io;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::engine::timeslot::normalize_digits;
use crate::models::{Category, Plan, PlanCourse};

pub use io::cell_to_string;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("plan workbook has no sheets")]
    NoSheets,
    #[error("no header row with a course-name column was found")]
    MissingHeader,
    #[error("plan sheet contains no courses")]
    Empty,
}

const NAME_HEADER: &str = "اسم المادة";
const HOURS_HEADER: &str = "عدد الساعات";
const CATEGORY_HEADER: &str = "تصنيف المادة";
const PREREQ_HEADER: &str = "متطلب لاختيار الماده";
const NOTES_HEADER: &str = "ملاحظات";

const DEFAULT_HOURS: u32 = 3;

struct Columns {
    name: usize,
    hours: Option<usize>,
    category: Option<usize>,
    prereq: Option<usize>,
    notes: Option<usize>,
}

fn find_header(rows: &[Vec<String>]) -> Option<(usize, Columns)> {
    for (idx, row) in rows.iter().enumerate() {
        let Some(name) = row.iter().position(|c| c.contains(NAME_HEADER)) else {
            continue;
        };
        let locate = |needle: &str| row.iter().position(|c| c.contains(needle));
        return Some((
            idx,
            Columns {
                name,
                hours: locate(HOURS_HEADER).or_else(|| locate("الساعات")),
                category: locate(CATEGORY_HEADER).or_else(|| locate("تصنيف")),
                prereq: locate(PREREQ_HEADER).or_else(|| locate("متطلب")),
                notes: locate(NOTES_HEADER),
            },
        ));
    }
    None
}

/// Maps the sheet's category text to a requirement category. Exact labels
/// first, then keyword pairs, since the sheets are hand-maintained and the
/// wording drifts between plan years.
fn guess_category(text: &str) -> Option<Category> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    const EXACT: [(&str, Category); 6] = [
        ("متطلبات الجامعة الاجبارية", Category::UniversityRequired),
        ("متطلبات الجامعة الاختيارية", Category::ElectiveRequirements),
        ("متطلبات الكلية", Category::CollegeRequired),
        ("متطلبات التخصص الاجبارية", Category::MajorRequired),
        ("متطلبات التخصص الاختيارية", Category::MajorOptional),
        ("مواد استدراكية", Category::Remedial),
    ];
    for (label, cat) in EXACT {
        if text.contains(label) {
            return Some(cat);
        }
    }
    if text.contains("استدراك") {
        return Some(Category::Remedial);
    }
    if text.contains("تخصص") {
        return Some(if text.contains("اختيار") {
            Category::MajorOptional
        } else {
            Category::MajorRequired
        });
    }
    if text.contains("كلية") {
        return Some(Category::CollegeRequired);
    }
    if text.contains("جامعة") {
        return Some(if text.contains("اختيار") {
            Category::ElectiveRequirements
        } else {
            Category::UniversityRequired
        });
    }
    None
}

/// Pulls a completed-hours floor out of free text: the last number that
/// appears before a mention of hours ("ساعة"/"ساعه"). Arabic-Indic digits
/// are folded first.
fn extract_min_hours(text: &str) -> Option<u32> {
    let text = normalize_digits(text);
    let mut last_number: Option<u32> = None;
    for word in text.split_whitespace() {
        let digits: String = word.chars().filter(|c| c.is_ascii_digit()).collect();
        if word.contains("ساع") {
            if let Some(n) = digits.parse().ok().or(last_number) {
                return Some(n);
            }
        }
        if !digits.is_empty() && digits.len() == word.chars().count() {
            last_number = word.parse().ok();
        }
    }
    None
}

fn parse_hours(cell: &str) -> u32 {
    normalize_digits(cell)
        .trim()
        .parse()
        .ok()
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_HOURS)
}

/// Parses already-extracted sheet rows into a plan. Split from the file read
/// so the parsing rules are testable without a workbook on disk.
pub fn parse_plan_rows(rows: &[Vec<String>]) -> Result<Plan, PlanError> {
    let (header_idx, cols) = find_header(rows).ok_or(PlanError::MissingHeader)?;
    let cell = |row: &Vec<String>, col: Option<usize>| -> String {
        col.and_then(|i| row.get(i)).cloned().unwrap_or_default()
    };

    // First pass: names and scalar fields. Prerequisite text is kept raw so
    // the second pass can resolve it against the full name set.
    let mut courses: Vec<(PlanCourse, String)> = Vec::new();
    for row in &rows[header_idx + 1..] {
        let name = match row.get(cols.name) {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => continue,
        };
        let prereq_text = cell(row, cols.prereq);
        let notes_text = cell(row, cols.notes);
        let min_hours = extract_min_hours(&prereq_text).or_else(|| extract_min_hours(&notes_text));
        courses.push((
            PlanCourse {
                name,
                hours: parse_hours(&cell(row, cols.hours)),
                category: guess_category(&cell(row, cols.category)),
                prerequisites: Vec::new(),
                min_hours,
            },
            prereq_text,
        ));
    }
    if courses.is_empty() {
        return Err(PlanError::Empty);
    }

    // Second pass: a prerequisite is any other plan course whose name appears
    // verbatim in the prerequisite text.
    let names: Vec<String> = courses.iter().map(|(c, _)| c.name.clone()).collect();
    let mut plan: Plan = HashMap::new();
    for (mut course, prereq_text) in courses {
        course.prerequisites = names
            .iter()
            .filter(|n| **n != course.name && prereq_text.contains(n.as_str()))
            .cloned()
            .collect();
        course.prerequisites.sort();
        plan.insert(course.name.clone(), course);
    }
    Ok(plan)
}

/// Loads the study plan from a workbook.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<Plan, PlanError> {
    let rows = io::read_sheet(path)?;
    parse_plan_rows(&rows)
}

/// Loads the plan, falling back to a small built-in one when the workbook is
/// missing or unreadable so the service still starts.
pub fn load_plan_or_fallback<P: AsRef<Path>>(path: P) -> Plan {
    match load_plan(&path) {
        Ok(plan) => plan,
        Err(err) => {
            tracing::warn!(
                path = %path.as_ref().display(),
                error = %err,
                "plan workbook unavailable, using built-in fallback plan"
            );
            fallback_plan()
        }
    }
}

fn fallback_plan() -> Plan {
    let course = |name: &str, hours: u32, category: Category, prereqs: &[&str]| PlanCourse {
        name: name.to_string(),
        hours,
        category: Some(category),
        prerequisites: prereqs.iter().map(|s| s.to_string()).collect(),
        min_hours: None,
    };
    [
        course("التربية الوطنية", 3, Category::UniversityRequired, &[]),
        course("مهارات الحاسوب", 3, Category::UniversityRequired, &[]),
        course("تفاضل وتكامل 1", 3, Category::CollegeRequired, &[]),
        course("برمجة 1", 3, Category::MajorRequired, &[]),
        course("برمجة 2", 3, Category::MajorRequired, &["برمجة 1"]),
    ]
    .into_iter()
    .map(|c| (c.name.clone(), c))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample_rows() -> Vec<Vec<String>> {
        rows(&[
            &["الخطة الدراسية لقسم الهندسة"],
            &["اسم المادة", "عدد الساعات", "تصنيف المادة", "متطلب لاختيار الماده", "ملاحظات"],
            &["برمجة 1", "3", "متطلبات التخصص الاجبارية", "", ""],
            &["برمجة 2", "3", "متطلبات التخصص الاجبارية", "برمجة 1", ""],
            &["التربية الوطنية", "3", "متطلبات الجامعة الاجبارية", "", ""],
            &["مشروع التخرج", "3", "متطلبات التخصص الاجبارية", "انهاء 120 ساعة", ""],
        ])
    }

    #[test]
    fn header_row_is_found_past_banner_rows() {
        let plan = parse_plan_rows(&sample_rows()).unwrap();
        assert_eq!(plan.len(), 4);
        assert!(plan.contains_key("برمجة 1"));
    }

    #[test]
    fn prerequisites_link_to_other_plan_courses() {
        let plan = parse_plan_rows(&sample_rows()).unwrap();
        assert_eq!(plan["برمجة 2"].prerequisites, vec!["برمجة 1".to_string()]);
        assert!(plan["برمجة 1"].prerequisites.is_empty());
    }

    #[test]
    fn hours_floor_is_read_from_prerequisite_text() {
        let plan = parse_plan_rows(&sample_rows()).unwrap();
        assert_eq!(plan["مشروع التخرج"].min_hours, Some(120));
        assert!(plan["مشروع التخرج"].prerequisites.is_empty());
    }

    #[test]
    fn hours_floor_reads_arabic_indic_digits() {
        assert_eq!(extract_min_hours("انهاء ٩٠ ساعة"), Some(90));
        assert_eq!(extract_min_hours("بدون شرط"), None);
    }

    #[test]
    fn missing_hours_default_to_three() {
        let data = rows(&[
            &["اسم المادة", "عدد الساعات", "تصنيف المادة"],
            &["مادة بلا ساعات", "", "متطلبات الكلية"],
        ]);
        let plan = parse_plan_rows(&data).unwrap();
        assert_eq!(plan["مادة بلا ساعات"].hours, 3);
        assert_eq!(plan["مادة بلا ساعات"].category, Some(Category::CollegeRequired));
    }

    #[test]
    fn category_labels_and_keywords_are_recognized() {
        assert_eq!(
            guess_category("متطلبات الجامعة الاختيارية"),
            Some(Category::ElectiveRequirements)
        );
        assert_eq!(
            guess_category("متطلبات تخصص اختيارية"),
            Some(Category::MajorOptional)
        );
        assert_eq!(guess_category("مواد استدراكية"), Some(Category::Remedial));
        assert_eq!(guess_category("تصنيف غامض"), None);
        assert_eq!(guess_category(""), None);
    }

    #[test]
    fn missing_header_is_an_error() {
        let data = rows(&[&["عمود", "آخر"], &["قيمة", "قيمة"]]);
        assert!(matches!(parse_plan_rows(&data), Err(PlanError::MissingHeader)));
    }

    #[test]
    fn fallback_plan_is_well_formed() {
        let plan = fallback_plan();
        assert_eq!(plan.len(), 5);
        assert_eq!(plan["برمجة 2"].prerequisites, vec!["برمجة 1".to_string()]);
        for course in plan.values() {
            assert!(course.hours > 0);
            assert!(course.category.is_some());
        }
    }
}
