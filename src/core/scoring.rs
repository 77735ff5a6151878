use crate::core::filters::is_eligible_candidate;
use crate::core::normalize::{eq_ignore_case_non_empty, is_filled, normalized_set};
use crate::models::{Profile, ScoreBreakdown, ScoringWeights};

/// Number of profile fields counted by the completeness bonus, per side
const COMPLETENESS_FIELDS: u8 = 5;

/// Calculate a compatibility score (0-100) of `candidate` for `subject`
///
/// Scoring formula (default weights):
/// score = (
///     skill_complementarity   # 35 both ways, 15 one way
///   + interest_overlap        # 25 for one shared interest or more
///   + availability_match      # 15
///   + education_match         # 10
///   + completeness_bonus      # up to 15
/// ) rounded and clamped to 0..=100
pub fn calculate_match_score(
    subject: &Profile,
    candidate: &Profile,
    weights: &ScoringWeights,
) -> u8 {
    score_breakdown(subject, candidate, weights).total
}

/// Per-component points for a pair; all zero for self or admin candidates
pub fn score_breakdown(
    subject: &Profile,
    candidate: &Profile,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    if !is_eligible_candidate(subject, candidate) {
        return ScoreBreakdown::default();
    }

    let skills = skill_complementarity(&subject.skills, &candidate.skills, weights);
    let interests = interest_overlap(&subject.interests, &candidate.interests, weights.interests);
    let availability = if eq_ignore_case_non_empty(&subject.availability, &candidate.availability) {
        weights.availability
    } else {
        0.0
    };
    let education = if eq_ignore_case_non_empty(&subject.university, &candidate.university) {
        weights.education
    } else {
        0.0
    };
    let completeness = completeness_bonus(subject, candidate, weights.completeness);

    let raw = skills + interests + availability + education + completeness;

    ScoreBreakdown {
        skills,
        interests,
        availability,
        education,
        completeness,
        total: clamp_score(raw),
    }
}

/// Reward skills each side has that the other lacks
///
/// Overlapping skills earn nothing. Either list empty means no points.
pub fn skill_complementarity(
    subject_skills: &[String],
    candidate_skills: &[String],
    weights: &ScoringWeights,
) -> f64 {
    let mine = normalized_set(subject_skills);
    let theirs = normalized_set(candidate_skills);

    if mine.is_empty() || theirs.is_empty() {
        return 0.0;
    }

    let i_bring = mine.difference(&theirs).next().is_some();
    let they_bring = theirs.difference(&mine).next().is_some();

    match (i_bring, they_bring) {
        (true, true) => weights.skills,
        (true, false) | (false, true) => weights.skills_partial,
        (false, false) => 0.0,
    }
}

/// Shared interests, saturating after the first one
#[inline]
pub fn interest_overlap(subject_interests: &[String], candidate_interests: &[String], weight: f64) -> f64 {
    let mine = normalized_set(subject_interests);
    let theirs = normalized_set(candidate_interests);
    let shared = mine.intersection(&theirs).count();

    (shared as f64 * weight).min(weight)
}

/// Count of filled fields among name, skills, interests, availability, university
pub fn filled_field_count(profile: &Profile) -> u8 {
    [
        is_filled(&profile.name),
        !normalized_set(&profile.skills).is_empty(),
        !normalized_set(&profile.interests).is_empty(),
        is_filled(&profile.availability),
        is_filled(&profile.university),
    ]
    .into_iter()
    .filter(|filled| *filled)
    .count() as u8
}

/// Bonus for well-filled profiles on both sides, out of `weight`
#[inline]
pub fn completeness_bonus(subject: &Profile, candidate: &Profile, weight: f64) -> f64 {
    let filled = (filled_field_count(subject) + filled_field_count(candidate)) as f64;
    let max_fields = (COMPLETENESS_FIELDS * 2) as f64;

    filled * weight / max_fields
}

#[inline]
fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}
