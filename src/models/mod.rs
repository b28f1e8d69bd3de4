// Core data structures shared by the engine, the ingestion layer and the API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Degree-requirement bucket. The set is fixed by the university plan; each
/// bucket carries a cumulative hour ceiling within the degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "university_required")]
    UniversityRequired,
    #[serde(rename = "elective_requirements")]
    ElectiveRequirements,
    #[serde(rename = "college_required")]
    CollegeRequired,
    #[serde(rename = "major_required")]
    MajorRequired,
    #[serde(rename = "major_optional")]
    MajorOptional,
    #[serde(rename = "Remedial materials")]
    Remedial,
}

pub const ALL_CATEGORIES: [Category; 6] = [
    Category::UniversityRequired,
    Category::ElectiveRequirements,
    Category::CollegeRequired,
    Category::MajorRequired,
    Category::MajorOptional,
    Category::Remedial,
];

impl Category {
    /// Cumulative hour ceiling for this bucket within the degree.
    pub fn ceiling(self) -> u32 {
        match self {
            Category::UniversityRequired => 18,
            Category::ElectiveRequirements => 9,
            Category::CollegeRequired => 32,
            Category::MajorRequired => 93,
            Category::MajorOptional => 9,
            Category::Remedial => 9,
        }
    }

    /// Priority rank used by the deterministic planners. Lower ranks are
    /// admitted first.
    pub fn rank(self) -> u8 {
        match self {
            Category::MajorRequired => 0,
            Category::CollegeRequired => 1,
            Category::UniversityRequired => 2,
            Category::MajorOptional => 3,
            Category::ElectiveRequirements => 4,
            Category::Remedial => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::UniversityRequired => "university_required",
            Category::ElectiveRequirements => "elective_requirements",
            Category::CollegeRequired => "college_required",
            Category::MajorRequired => "major_required",
            Category::MajorOptional => "major_optional",
            Category::Remedial => "Remedial materials",
        }
    }
}

/// One course of the degree plan. The Arabic course name is the identity:
/// plan names are unique and the offering is reconciled onto them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCourse {
    pub name: String,
    pub hours: u32,
    /// None when the plan text did not map to a known bucket; such courses
    /// are exempt from category ceilings.
    pub category: Option<Category>,
    /// Names of plan courses that must be passed first.
    pub prerequisites: Vec<String>,
    /// Minimum cumulative completed hours required before enrolling.
    pub min_hours: Option<u32>,
}

/// One scheduled section of an offered course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub instructor: String,
    pub status: String,
    /// Raw meeting-slot strings as scraped, e.g. "ث خ 08:30 09:30".
    pub times: Vec<String>,
}

/// A course as currently offered, keyed in the offering map by plan name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferedCourse {
    /// Bulletin code, when the scraper provided one.
    pub code: Option<String>,
    /// Effective hours for this term; zero means "use the plan hours".
    pub hours: u32,
    pub sections: Vec<Section>,
}

/// A course as returned by the bulletin scraper, keyed by bulletin code and
/// not yet reconciled with plan names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedCourse {
    pub name: String,
    pub hours: u32,
    pub sections: Vec<Section>,
}

pub type Plan = HashMap<String, PlanCourse>;
pub type Offering = HashMap<String, OfferedCourse>;
