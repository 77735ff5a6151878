use std::str::FromStr;

use crate::core::error::MatchError;
use crate::core::normalize::{normalize, normalized_set};
use crate::models::Profile;

/// Profile attribute a caller can filter the candidate pool on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Name,
    Major,
    Department,
    Role,
    Status,
    Availability,
    University,
    Skill,
    Interest,
}

impl FromStr for FilterField {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "name" => Ok(FilterField::Name),
            "major" => Ok(FilterField::Major),
            "department" => Ok(FilterField::Department),
            "role" => Ok(FilterField::Role),
            "status" => Ok(FilterField::Status),
            "availability" => Ok(FilterField::Availability),
            "university" => Ok(FilterField::University),
            "skill" | "skills" => Ok(FilterField::Skill),
            "interest" | "interests" => Ok(FilterField::Interest),
            other => Err(MatchError::InvalidInput(format!("unknown filter field '{}'", other))),
        }
    }
}

/// One validated `field = value` criterion, stored normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriterion {
    pub field: FilterField,
    pub value: String,
}

impl FilterCriterion {
    /// Text fields match on substring, set fields on an exact element.
    pub fn matches(&self, profile: &Profile) -> bool {
        let text = match self.field {
            FilterField::Name => &profile.name,
            FilterField::Major => &profile.major,
            FilterField::Department => &profile.department,
            FilterField::Role => &profile.role,
            FilterField::Status => &profile.status,
            FilterField::Availability => &profile.availability,
            FilterField::University => &profile.university,
            FilterField::Skill => return normalized_set(&profile.skills).contains(&self.value),
            FilterField::Interest => return normalized_set(&profile.interests).contains(&self.value),
        };

        normalize(text).contains(&self.value)
    }
}

/// Attribute filters applied to the pool before scoring
///
/// All criteria must hold. Filters only narrow the pool, they never
/// change a candidate's score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilters {
    criteria: Vec<FilterCriterion>,
}

impl MatchFilters {
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse `field -> value` pairs, rejecting unknown fields and blank values
    pub fn parse<'a, I>(pairs: I) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = Vec::new();

        for (field, value) in pairs {
            let field = field.parse::<FilterField>()?;
            let value = normalize(value);
            if value.is_empty() {
                return Err(MatchError::InvalidInput(format!(
                    "filter '{:?}' has an empty value",
                    field
                )));
            }
            criteria.push(FilterCriterion { field, value });
        }

        Ok(Self { criteria })
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    #[inline]
    pub fn matches(&self, profile: &Profile) -> bool {
        self.criteria.iter().all(|criterion| criterion.matches(profile))
    }
}

/// Whether two profiles belong to the same person (same id or same email)
#[inline]
pub fn is_same_person(a: &Profile, b: &Profile) -> bool {
    if a.id == b.id {
        return true;
    }

    let a_email = normalize(&a.email);
    !a_email.is_empty() && a_email == normalize(&b.email)
}

/// Self-matches and administrators are never candidates
#[inline]
pub fn is_eligible_candidate(subject: &Profile, candidate: &Profile) -> bool {
    !candidate.is_admin && !is_same_person(subject, candidate)
}
