use serde::Serialize;

/// What a data-quality warning is about.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    #[display("period {_0}")]
    Period(usize),

    /// Device segment by its position in the device report.
    #[display("segment #{_0}")]
    Segment(usize),
}

/// Problem with a single field of a loosely-typed payload.
#[derive(Clone, Debug, PartialEq, Serialize, derive_more::Display)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum FieldIssue {
    #[display("unrecognized field `{field}`")]
    Unrecognized { field: String },

    #[display("conflicting fields for `{concept}`: {}", fields.join(", "))]
    Conflicting { concept: &'static str, fields: Vec<String> },

    #[display("invalid value of `{field}`")]
    Invalid { field: String },

    #[display("negative `{field}` ({value}) is clamped to zero")]
    Negative { field: &'static str, value: f64 },
}

/// Data-quality warning: surfaced next to the result, never blocking it.
#[derive(Clone, Debug, PartialEq, Serialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    #[display("{subject}: {issue}")]
    Field { subject: Subject, issue: FieldIssue },

    #[display("segments #{first} and #{second} overlap, #{second} takes precedence")]
    OverlappingSegments { first: u8, second: u8 },
}

/// Result accompanied by the data-quality warnings collected while producing it.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct Reported<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Reported<T> {
    pub const fn new(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    /// Move the warnings into the specified collector and return the bare value.
    pub fn drain_into(self, warnings: &mut Vec<Warning>) -> T {
        warnings.extend(self.warnings);
        self.value
    }
}
