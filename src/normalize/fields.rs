use serde_json::{Map, Value};

use crate::{
    core::{FieldIssue, Subject, Warning},
    normalize::aliases::Concept,
    quantity::Quantity,
};

/// Resolves concepts from a loosely-typed object, collecting the data-quality warnings.
pub struct Fields<'a> {
    object: &'a Map<String, Value>,
    subject: Subject,
    warnings: Vec<Warning>,
}

impl<'a> Fields<'a> {
    pub const fn new(object: &'a Map<String, Value>, subject: Subject) -> Self {
        Self { object, subject, warnings: Vec::new() }
    }

    /// Re-attribute the subsequent warnings, for example once the period is known.
    pub const fn set_subject(&mut self, subject: Subject) {
        self.subject = subject;
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    pub fn warn(&mut self, issue: FieldIssue) {
        self.warnings.push(Warning::Field { subject: self.subject, issue });
    }

    /// Warn about every field which is not a name of the known concepts.
    pub fn check_unrecognized(&mut self, concepts: &[Concept], ignored: &[&str]) {
        let unrecognized: Vec<_> = self
            .object
            .keys()
            .filter(|key| {
                !ignored.contains(&key.as_str())
                    && !concepts.iter().any(|concept| concept.names().any(|name| name == *key))
            })
            .cloned()
            .collect();
        for field in unrecognized {
            self.warn(FieldIssue::Unrecognized { field });
        }
    }

    /// Find the value of the concept.
    ///
    /// The canonical field always wins. Without it, the legacy aliases are only used
    /// when they agree: ambiguity resolves to nothing rather than to a guess.
    pub fn lookup(&mut self, concept: Concept) -> Option<(&'static str, &'a Value)> {
        let object = self.object;
        let present = |name: &&'static str| object.get(*name).filter(|value| !value.is_null());
        let candidates: Vec<_> = concept
            .aliases
            .iter()
            .filter_map(|name| present(name).map(|value| (*name, value)))
            .collect();

        if let Some(value) = present(&concept.canonical) {
            let conflicting: Vec<_> = candidates
                .iter()
                .filter(|(_, alias_value)| !same_value(value, alias_value))
                .map(|(name, _)| (*name).to_owned())
                .collect();
            if !conflicting.is_empty() {
                let fields =
                    std::iter::once(concept.canonical.to_owned()).chain(conflicting).collect();
                self.warn(FieldIssue::Conflicting { concept: concept.canonical, fields });
            }
            return Some((concept.canonical, value));
        }

        let (first_name, first_value) = *candidates.first()?;
        if candidates.iter().all(|(_, value)| same_value(first_value, value)) {
            Some((first_name, first_value))
        } else {
            let fields = candidates.iter().map(|(name, _)| (*name).to_owned()).collect();
            self.warn(FieldIssue::Conflicting { concept: concept.canonical, fields });
            None
        }
    }

    /// Finite number of the concept, accepting numeric strings.
    pub fn number(&mut self, concept: Concept) -> Option<f64> {
        let (field, value) = self.lookup(concept)?;
        let number = parse_number(value).filter(|number| number.is_finite());
        if number.is_none() {
            self.warn(FieldIssue::Invalid { field: field.to_owned() });
        }
        number
    }

    pub fn quantity<const POWER: isize, const TIME: isize, const COST: isize>(
        &mut self,
        concept: Concept,
    ) -> Option<Quantity<f64, POWER, TIME, COST>> {
        self.number(concept).map(Quantity)
    }

    /// Energy flow which cannot be negative.
    pub fn flow<const POWER: isize, const TIME: isize, const COST: isize>(
        &mut self,
        concept: Concept,
    ) -> Option<Quantity<f64, POWER, TIME, COST>> {
        let value = self.number(concept)?;
        if value < 0.0 {
            self.warn(FieldIssue::Negative { field: concept.canonical, value });
            Some(Quantity(0.0))
        } else {
            Some(Quantity(value))
        }
    }

    pub fn text(&mut self, concept: Concept) -> Option<&'a str> {
        let (field, value) = self.lookup(concept)?;
        if let Value::String(text) = value {
            Some(text.trim()).filter(|text| !text.is_empty())
        } else {
            self.warn(FieldIssue::Invalid { field: field.to_owned() });
            None
        }
    }

    /// Boolean flag, also accepting `0`/`1` as some inverters report it.
    pub fn flag(&mut self, concept: Concept) -> Option<bool> {
        let (field, value) = self.lookup(concept)?;
        let flag = match value {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Some(true),
                "false" | "0" | "off" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        };
        if flag.is_none() {
            self.warn(FieldIssue::Invalid { field: field.to_owned() });
        }
        flag
    }
}

pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Compare the values numerically when both are numbers, so that `1` and `"1.0"` agree.
fn same_value(lhs: &Value, rhs: &Value) -> bool {
    match (parse_number(lhs), parse_number(rhs)) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        _ => lhs == rhs,
    }
}
