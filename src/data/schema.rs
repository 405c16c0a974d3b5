// ---------------------------------------------------------------------------
// Column – statically declared survey schema
// ---------------------------------------------------------------------------

/// Whether a column holds free-form categories or numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

/// Every survey field the dashboards read.
///
/// The CSV must carry a header for each variant; a missing header is a
/// load-time error rather than a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    // Location
    District,
    Upazilla,
    Union,
    Village,
    // Person
    Name,
    Age,
    FatherName,
    MotherName,
    Gender,
    DisabilityCard,
    Skilled,
    // Education
    GoesToSchool,
    Qualification,
    SchoolType,
    EducationStipend,
    // Income
    FamilyIncome,
    FamilyOccupation,
    FamilyMembers,
    PersonIncome,
    PersonOccupation,
    AgeForOccupation,
    // Allowances and services
    DisabilityAllowance,
    HealthServices,
    TrainingService,
    RehabilitationAllowance,
    RehabilitationService,
    AssistiveDevices,
    Therapy,
    Operation,
    DeviceAndTherapy,
}

impl Column {
    pub const COUNT: usize = 30;

    /// All columns in declaration order. `Column as usize` indexes this array.
    pub const ALL: [Column; Column::COUNT] = [
        Column::District,
        Column::Upazilla,
        Column::Union,
        Column::Village,
        Column::Name,
        Column::Age,
        Column::FatherName,
        Column::MotherName,
        Column::Gender,
        Column::DisabilityCard,
        Column::Skilled,
        Column::GoesToSchool,
        Column::Qualification,
        Column::SchoolType,
        Column::EducationStipend,
        Column::FamilyIncome,
        Column::FamilyOccupation,
        Column::FamilyMembers,
        Column::PersonIncome,
        Column::PersonOccupation,
        Column::AgeForOccupation,
        Column::DisabilityAllowance,
        Column::HealthServices,
        Column::TrainingService,
        Column::RehabilitationAllowance,
        Column::RehabilitationService,
        Column::AssistiveDevices,
        Column::Therapy,
        Column::Operation,
        Column::DeviceAndTherapy,
    ];

    /// District → Upazilla → Union → Village.
    pub const LOCATION: [Column; 4] = [
        Column::District,
        Column::Upazilla,
        Column::Union,
        Column::Village,
    ];

    /// Yes/No allowance and service questions.
    pub const SERVICES: [Column; 10] = [
        Column::DisabilityAllowance,
        Column::EducationStipend,
        Column::HealthServices,
        Column::TrainingService,
        Column::RehabilitationAllowance,
        Column::RehabilitationService,
        Column::AssistiveDevices,
        Column::Therapy,
        Column::Operation,
        Column::DeviceAndTherapy,
    ];

    /// Position of this column inside a record.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header text as it appears in the survey export.
    pub fn header(self) -> &'static str {
        match self {
            Column::District => "District",
            Column::Upazilla => "Upazilla",
            Column::Union => "Union",
            Column::Village => "Name of the village",
            Column::Name => "Name of child / person",
            Column::Age => "Age",
            Column::FatherName => "Father's name of the child / person",
            Column::MotherName => "Mother name of the child / person",
            Column::Gender => "Gender",
            Column::DisabilityCard => "Have a disability golden citizen card?",
            Column::Skilled => "Is the person Skilled?",
            Column::GoesToSchool => "Does the child / person go to school / study?",
            Column::Qualification => {
                "Educational Qualification of the child / individual (Enter the class he / she is passing at last):"
            }
            Column::SchoolType => "If yes, what kind of school do you go to?",
            Column::EducationStipend => "Has the Children/Person get Education stipend ",
            Column::FamilyIncome => "Family monthly income?",
            Column::FamilyOccupation => "Specify the main occupation of the family",
            Column::FamilyMembers => "Total number of family members",
            Column::PersonIncome => "Person's monthly income?",
            Column::PersonOccupation => "Person's occupation?",
            Column::AgeForOccupation => "Age for Occ",
            Column::DisabilityAllowance => "Has the Children/Person get Disability/Other Allowens",
            Column::HealthServices => "Has the Children/Person get Health sevices ( Govt./ Non- Govt. )",
            Column::TrainingService => "Has the Children/Person get Training service",
            Column::RehabilitationAllowance => "Has the Children/Person get Rehabilitation allowance ",
            Column::RehabilitationService => {
                "Has the Children/Person get Rehabilition Service (Govt. or Private)"
            }
            Column::AssistiveDevices => "In health rehabilitation service did you get Asisstive devices?",
            Column::Therapy => "In health rehabilitation service did you get Therapy",
            Column::Operation => "In health rehabilitation service did you get Operation",
            Column::DeviceAndTherapy => {
                "In health rehabilitation service did you get Both (Asisstive device and Therapy) "
            }
        }
    }

    /// Short human label for widgets and table headers.
    pub fn label(self) -> &'static str {
        match self {
            Column::Village => "Village",
            Column::Name => "Name",
            Column::FatherName => "Father's name",
            Column::MotherName => "Mother's name",
            Column::DisabilityCard => "Disability card",
            Column::Skilled => "Skilled",
            Column::GoesToSchool => "Goes to school",
            Column::Qualification => "Qualification",
            Column::SchoolType => "School type",
            Column::EducationStipend => "Education stipend",
            Column::FamilyIncome => "Family income",
            Column::FamilyOccupation => "Family occupation",
            Column::FamilyMembers => "Family members",
            Column::PersonIncome => "Income category",
            Column::PersonOccupation => "Occupation",
            Column::AgeForOccupation => "Age for occupation",
            other => other.header().trim(),
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Age | Column::FamilyMembers => ColumnKind::Numeric,
            _ => ColumnKind::Categorical,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.kind() == ColumnKind::Numeric
    }

    /// Find the column whose header matches `header`, ignoring surrounding whitespace.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.header().trim() == header)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
