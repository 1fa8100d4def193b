//! Label normalization between the request vocabulary and the two stored vocabularies.
//!
//! Grading requests carry internal codes (`elementary_1_2`, `high`, ...). Rubric records and
//! example records were uploaded with different Korean vocabularies for the same concept
//! (`초등학교` vs `초등`), so every lookup is translated twice.

pub mod error;
pub mod table;


pub use error::{LabelError, LabelResult};
pub use table::{GradeLabels, LabelTable, NormalizedLabels};

/// Grade-level codes accepted from grading requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeLevel {
    Elementary12,
    Elementary34,
    Elementary56,
    Middle,
    High,
}

impl GradeLevel {
    /// Every known code, in ascending order.
    pub const ALL: [GradeLevel; 5] = [
        GradeLevel::Elementary12,
        GradeLevel::Elementary34,
        GradeLevel::Elementary56,
        GradeLevel::Middle,
        GradeLevel::High,
    ];

    #[inline]
    pub fn as_code(&self) -> &'static str {
        match self {
            GradeLevel::Elementary12 => "elementary_1_2",
            GradeLevel::Elementary34 => "elementary_3_4",
            GradeLevel::Elementary56 => "elementary_5_6",
            GradeLevel::Middle => "middle",
            GradeLevel::High => "high",
        }
    }

    #[inline]
    pub fn is_elementary(&self) -> bool {
        matches!(
            self,
            GradeLevel::Elementary12 | GradeLevel::Elementary34 | GradeLevel::Elementary56
        )
    }
}

impl std::fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Target proficiency tier of an exemplar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProficiencyLevel {
    High,
    Mid,
    Low,
}

impl ProficiencyLevel {
    pub const ALL: [ProficiencyLevel; 3] = [
        ProficiencyLevel::High,
        ProficiencyLevel::Mid,
        ProficiencyLevel::Low,
    ];

    #[inline]
    pub fn as_code(&self) -> &'static str {
        match self {
            ProficiencyLevel::High => "high",
            ProficiencyLevel::Mid => "mid",
            ProficiencyLevel::Low => "low",
        }
    }
}

impl std::fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Canonical form of a request code: trimmed, lower-cased, `-` folded into `_`.
pub fn canonical_code(code: &str) -> String {
    code.trim().to_lowercase().replace('-', "_")
}
