use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::geo::{haversine_km, GeoPoint};
use crate::storage::{Job, JobStore, SkillId, StorageResult, UserId};
use crate::validation::ValidationError;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Worker eligible for a job, as loaded from storage
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub skill_ids: Vec<SkillId>,
    pub location: Option<GeoPoint>,
}

/// Worker ranked against a job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMatch {
    pub user_id: UserId,
    pub user_name: String,
    pub matching_skills: usize,
    pub required_skills: usize,
    /// Distance between the job and the worker's address, when both are known
    pub distance_km: Option<f64>,
}

impl JobMatch {
    /// Share of the required skills the worker holds. Jobs without
    /// requirements report one required skill and score by the number of
    /// skills the worker has.
    fn coverage(&self) -> f64 {
        self.matching_skills as f64 / self.required_skills as f64
    }
}

/// Validated `limit`/`offset` window over a ranked listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT as usize,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, ValidationError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ValidationError::new(
                "limit",
                format!("must be between 1 and {}", MAX_PAGE_LIMIT),
            ));
        }

        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(ValidationError::new("offset", "must be greater than or equal to 0"));
        }

        Ok(Self {
            limit: limit as usize,
            offset: offset as usize,
        })
    }
}

/// Rank candidates by skill coverage (descending), then distance (ascending,
/// unknown last). Equal keys keep the candidates' incoming order.
pub fn rank_candidates(
    required: &[SkillId],
    origin: Option<GeoPoint>,
    candidates: Vec<MatchCandidate>,
) -> Vec<JobMatch> {
    let required: BTreeSet<SkillId> = required.iter().copied().collect();
    let required_skills = required.len().max(1);

    let mut matches: Vec<JobMatch> = candidates
        .into_iter()
        .map(|candidate| {
            let held: BTreeSet<SkillId> = candidate.skill_ids.iter().copied().collect();
            let matching_skills = if required.is_empty() {
                held.len()
            } else {
                required.intersection(&held).count()
            };
            let distance_km = origin
                .zip(candidate.location)
                .map(|(from, to)| haversine_km(from, to));

            JobMatch {
                user_id: candidate.user_id,
                user_name: candidate.name,
                matching_skills,
                required_skills,
                distance_km,
            }
        })
        .collect();

    // sort_by is stable
    matches.sort_by(|a, b| {
        b.coverage()
            .total_cmp(&a.coverage())
            .then_with(|| compare_distance(a.distance_km, b.distance_km))
    });
    matches
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ranked workers for `job`, restricted to `page`
pub async fn list_job_matches(
    store: &dyn JobStore,
    job: &Job,
    page: Page,
) -> StorageResult<Vec<JobMatch>> {
    let required: Vec<SkillId> = store
        .job_skills(job.id)
        .await?
        .into_iter()
        .map(|skill| skill.id)
        .collect();
    let candidates = store.match_candidates(job).await?;
    let origin = GeoPoint::from_parts(job.latitude, job.longitude);

    Ok(rank_candidates(&required, origin, candidates)
        .into_iter()
        .skip(page.offset)
        .take(page.limit)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(user_id: UserId, skill_ids: &[SkillId], location: Option<(f64, f64)>) -> MatchCandidate {
        MatchCandidate {
            user_id,
            name: format!("worker-{}", user_id),
            created_at: Utc::now(),
            skill_ids: skill_ids.to_vec(),
            location: location.map(|(lat, lng)| GeoPoint::new(lat, lng)),
        }
    }

    fn ids(matches: &[JobMatch]) -> Vec<UserId> {
        matches.iter().map(|m| m.user_id).collect()
    }

    #[test]
    fn test_coverage_beats_distance() {
        let origin = Some(GeoPoint::new(0.0, 0.0));
        let ranked = rank_candidates(
            &[1, 2],
            origin,
            vec![
                candidate(10, &[1], Some((0.0, 0.01))),
                candidate(11, &[1, 2], Some((0.0, 5.0))),
            ],
        );

        assert_eq!(ids(&ranked), vec![11, 10]);
        assert_eq!(ranked[0].matching_skills, 2);
        assert_eq!(ranked[1].matching_skills, 1);
        assert!(ranked.iter().all(|m| m.required_skills == 2));
    }

    #[test]
    fn test_nearer_first_and_unknown_distance_last() {
        let origin = Some(GeoPoint::new(0.0, 0.0));
        let ranked = rank_candidates(
            &[1],
            origin,
            vec![
                candidate(1, &[1], None),
                candidate(2, &[1], Some((0.0, 2.0))),
                candidate(3, &[1], Some((0.0, 1.0))),
            ],
        );

        assert_eq!(ids(&ranked), vec![3, 2, 1]);
        assert_eq!(ranked[0].distance_km, Some(111.19));
        assert_eq!(ranked[2].distance_km, None);
    }

    #[test]
    fn test_job_without_location_keeps_candidate_order() {
        let ranked = rank_candidates(
            &[1],
            None,
            vec![
                candidate(5, &[1], Some((0.0, 1.0))),
                candidate(4, &[1], Some((0.0, 0.5))),
            ],
        );

        assert_eq!(ids(&ranked), vec![5, 4]);
        assert!(ranked.iter().all(|m| m.distance_km.is_none()));
    }

    #[test]
    fn test_no_required_skills_ranks_by_skill_count() {
        let ranked = rank_candidates(
            &[],
            None,
            vec![candidate(1, &[7], None), candidate(2, &[7, 8, 9], None)],
        );

        assert_eq!(ids(&ranked), vec![2, 1]);
        assert_eq!(ranked[0].matching_skills, 3);
        assert!(ranked.iter().all(|m| m.required_skills == 1));
    }

    #[test]
    fn test_duplicate_skill_ids_count_once() {
        let ranked = rank_candidates(&[1, 1, 2], None, vec![candidate(1, &[1, 1], None)]);

        assert_eq!(ranked[0].matching_skills, 1);
        assert_eq!(ranked[0].required_skills, 2);
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(Page::new(None, None).unwrap(), Page::default());
        assert_eq!(
            Page::new(Some(100), Some(20)).unwrap(),
            Page {
                limit: 100,
                offset: 20
            }
        );
        assert_eq!(Page::new(Some(0), None).unwrap_err().field, "limit");
        assert_eq!(Page::new(Some(101), None).unwrap_err().field, "limit");
        assert_eq!(Page::new(None, Some(-1)).unwrap_err().field, "offset");
    }
}
