//! Tag catalog
//!
//! The fixed vocabulary of tags the survey can produce, grouped by
//! question. This table is the single source of truth for validation
//! and must stay byte-exact with the tag names the Kit account expects;
//! a tag accepted here but unknown downstream is a silent integration
//! failure, not a local bug.

/// Suffix marking an "other" sentinel tag. The sentinel signals that a
/// free-text answer exists; the free text itself stays local and the
/// sentinel is excluded from export.
pub const OTHER_SUFFIX: &str = "_other";

/// Practice setting (single-select)
pub const SETTING_TAGS: &[&str] = &[
    "set_private_practice",
    "set_group_practice",
    "set_hospital",
    "set_community_mental_health",
    "set_school",
    "set_telehealth",
];

/// Profession / role (single-select, has an "other" sentinel)
pub const PROFESSION_TAGS: &[&str] = &[
    "prof_therapist",
    "prof_counselor",
    "prof_psychologist",
    "prof_social_worker",
    "prof_coach",
    "prof_student",
    "prof_other",
];

/// Client populations served (multi-select)
pub const POPULATION_TAGS: &[&str] = &[
    "pop_children",
    "pop_teens",
    "pop_adults",
    "pop_couples",
    "pop_families",
    "pop_groups",
    "pop_older_adults",
];

/// Content interests (multi-select)
pub const INTEREST_TAGS: &[&str] = &[
    "int_worksheets",
    "int_assessments",
    "int_treatment_planning",
    "int_client_education",
    "int_ce_courses",
    "int_practice_tools",
];

/// Usage frequency (single-select)
pub const FREQUENCY_TAGS: &[&str] = &[
    "freq_daily",
    "freq_weekly",
    "freq_monthly",
    "freq_occasionally",
];

/// Treatment modalities (multi-select, has an "other" sentinel)
pub const MODALITY_TAGS: &[&str] = &[
    "mod_cbt",
    "mod_dbt",
    "mod_act",
    "mod_emdr",
    "mod_ifs",
    "mod_psychodynamic",
    "mod_other",
];

/// The six survey questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    Setting,
    Profession,
    Populations,
    Interests,
    Frequency,
    Modalities,
}

impl Question {
    /// All questions, in survey order
    pub const ALL: [Question; 6] = [
        Question::Setting,
        Question::Profession,
        Question::Populations,
        Question::Interests,
        Question::Frequency,
        Question::Modalities,
    ];

    /// Wire-format field name under `surveyData`
    pub fn field(&self) -> &'static str {
        match self {
            Question::Setting => "setting",
            Question::Profession => "profession",
            Question::Populations => "populations",
            Question::Interests => "interests",
            Question::Frequency => "frequency",
            Question::Modalities => "modalities",
        }
    }

    /// Allowed tag values for this question
    pub fn allowed(&self) -> &'static [&'static str] {
        match self {
            Question::Setting => SETTING_TAGS,
            Question::Profession => PROFESSION_TAGS,
            Question::Populations => POPULATION_TAGS,
            Question::Interests => INTEREST_TAGS,
            Question::Frequency => FREQUENCY_TAGS,
            Question::Modalities => MODALITY_TAGS,
        }
    }

    /// Whether this question accepts multiple answers
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            Question::Populations | Question::Interests | Question::Modalities
        )
    }

    /// Whether `value` is allowed for this question
    pub fn contains(&self, value: &str) -> bool {
        self.allowed().contains(&value)
    }
}

/// Whether `tag` appears in the union of all per-question allowed sets.
/// Used to validate the caller-supplied flattened tag list.
pub fn tag_union_contains(tag: &str) -> bool {
    Question::ALL.iter().any(|q| q.contains(tag))
}

/// Whether `tag` is an "other" sentinel (carries a free-text answer)
pub fn is_other_sentinel(tag: &str) -> bool {
    tag.ends_with(OTHER_SUFFIX)
}
