//! The label table: configuration data with guaranteed default entries.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::{LabelError, LabelResult};
use super::{GradeLevel, ProficiencyLevel, canonical_code};

/// Labels for one grade-level code, in both stored vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeLabels {
    /// Education stage as written on rubric records (e.g. `초등학교`).
    pub rubric_stage: String,
    /// Grade band as written on rubric records (e.g. `1-2학년`).
    pub grade_band: String,
    /// Education stage as written on example records (e.g. `초등`).
    pub example_stage: String,
}

impl GradeLabels {
    fn new(rubric_stage: &str, grade_band: &str, example_stage: &str) -> Self {
        Self {
            rubric_stage: rubric_stage.to_string(),
            grade_band: grade_band.to_string(),
            example_stage: example_stage.to_string(),
        }
    }
}

/// Output of [`LabelTable::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedLabels {
    pub rubric_stage: String,
    pub grade_band: String,
    pub example_stage: String,
    /// Proficiency in the example collection's native vocabulary (`상`/`중`/`하`).
    pub proficiency: String,
}

#[derive(Debug, Deserialize)]
struct LabelTableFile {
    default_grade: String,
    default_proficiency: String,
    grades: BTreeMap<String, GradeLabels>,
    proficiency: BTreeMap<String, String>,
}

/// Total mapping from request codes to stored labels.
///
/// Lookups never fail: an unknown code resolves to the default entry and logs a warning.
#[derive(Debug, Clone)]
pub struct LabelTable {
    grades: BTreeMap<String, GradeLabels>,
    proficiency: BTreeMap<String, String>,
    default_grade: String,
    default_proficiency: String,
}

impl LabelTable {
    /// The table matching the data currently stored in the knowledge base.
    pub fn builtin() -> Self {
        let mut grades = BTreeMap::new();
        for level in GradeLevel::ALL {
            let labels = match level {
                GradeLevel::Elementary12 => GradeLabels::new("초등학교", "1-2학년", "초등"),
                GradeLevel::Elementary34 => GradeLabels::new("초등학교", "3-4학년", "초등"),
                GradeLevel::Elementary56 => GradeLabels::new("초등학교", "5-6학년", "초등"),
                GradeLevel::Middle => GradeLabels::new("중학교", "1-3학년", "중등"),
                GradeLevel::High => GradeLabels::new("고등학교", "1-3학년", "고등"),
            };
            grades.insert(level.as_code().to_string(), labels);
        }

        let mut proficiency = BTreeMap::new();
        for level in ProficiencyLevel::ALL {
            let label = match level {
                ProficiencyLevel::High => "상",
                ProficiencyLevel::Mid => "중",
                ProficiencyLevel::Low => "하",
            };
            proficiency.insert(level.as_code().to_string(), label.to_string());
        }
        proficiency.insert("medium".to_string(), "중".to_string());

        Self {
            grades,
            proficiency,
            default_grade: GradeLevel::Elementary12.as_code().to_string(),
            default_proficiency: ProficiencyLevel::Mid.as_code().to_string(),
        }
    }

    /// Parses a YAML table. Keys are canonicalized and both defaults must be present.
    pub fn from_yaml_str(yaml: &str) -> LabelResult<Self> {
        let file: LabelTableFile = serde_yaml::from_str(yaml)?;

        let grades: BTreeMap<String, GradeLabels> = file
            .grades
            .into_iter()
            .map(|(code, labels)| (canonical_code(&code), labels))
            .collect();
        let proficiency: BTreeMap<String, String> = file
            .proficiency
            .into_iter()
            .map(|(code, label)| (canonical_code(&code), label))
            .collect();

        let table = Self {
            grades,
            proficiency,
            default_grade: canonical_code(&file.default_grade),
            default_proficiency: canonical_code(&file.default_proficiency),
        };
        table.validate()?;
        Ok(table)
    }

    /// Loads a YAML table from disk.
    pub fn load(path: &Path) -> LabelResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    fn validate(&self) -> LabelResult<()> {
        if !self.grades.contains_key(&self.default_grade) {
            return Err(LabelError::MissingDefaultGrade {
                code: self.default_grade.clone(),
            });
        }
        if !self.proficiency.contains_key(&self.default_proficiency) {
            return Err(LabelError::MissingDefaultProficiency {
                code: self.default_proficiency.clone(),
            });
        }

        for (code, labels) in &self.grades {
            for (field, value) in [
                ("rubric_stage", &labels.rubric_stage),
                ("grade_band", &labels.grade_band),
                ("example_stage", &labels.example_stage),
            ] {
                if value.trim().is_empty() {
                    return Err(LabelError::EmptyLabel {
                        code: code.clone(),
                        field,
                    });
                }
            }
        }
        for (code, label) in &self.proficiency {
            if label.trim().is_empty() {
                return Err(LabelError::EmptyLabel {
                    code: code.clone(),
                    field: "proficiency",
                });
            }
        }

        Ok(())
    }

    /// Returns `true` if `code` has its own entry (no fallback needed).
    pub fn knows_grade(&self, code: &str) -> bool {
        self.grades.contains_key(&canonical_code(code))
    }

    /// Returns `true` if `code` has its own proficiency entry.
    pub fn knows_proficiency(&self, code: &str) -> bool {
        self.proficiency.contains_key(&canonical_code(code))
    }

    /// Labels for a grade-level code, falling back to the default entry.
    pub fn grade(&self, code: &str) -> GradeLabels {
        let key = canonical_code(code);
        if let Some(labels) = self.grades.get(&key) {
            return labels.clone();
        }

        warn!(
            code = code,
            default = %self.default_grade,
            "unmapped grade level code, using default labels"
        );
        self.default_grade_labels().clone()
    }

    /// Native-language proficiency label, falling back to the default tier.
    pub fn proficiency(&self, code: &str) -> String {
        let key = canonical_code(code);
        if let Some(label) = self.proficiency.get(&key) {
            return label.clone();
        }

        warn!(
            code = code,
            default = %self.default_proficiency,
            "unmapped proficiency code, using default label"
        );
        self.default_proficiency_label().to_string()
    }

    pub fn normalize(&self, grade_code: &str, proficiency_code: &str) -> NormalizedLabels {
        let grade = self.grade(grade_code);
        NormalizedLabels {
            rubric_stage: grade.rubric_stage,
            grade_band: grade.grade_band,
            example_stage: grade.example_stage,
            proficiency: self.proficiency(proficiency_code),
        }
    }

    pub fn default_grade_labels(&self) -> &GradeLabels {
        // validate() guarantees presence for every constructed table
        &self.grades[&self.default_grade]
    }

    pub fn default_proficiency_label(&self) -> &str {
        &self.proficiency[&self.default_proficiency]
    }

    /// Known grade-level codes, canonical form.
    pub fn grade_codes(&self) -> impl Iterator<Item = &str> {
        self.grades.keys().map(String::as_str)
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::builtin()
    }
}
