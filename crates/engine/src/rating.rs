//! Vote upsert and aggregate recomputation.

use vitrine_core::{DomainError, UserId};
use vitrine_model::{Project, Rating, RatingDraft, ScoreVector};
use vitrine_store::Store;

use crate::error::EngineError;

/// Apply one user's vote to a project.
///
/// Enforces the at-most-one-vote-per-(user, project) rule: a resubmission
/// updates the existing rating row in place (same id), a first vote creates
/// a new row. Either way the project's aggregate is recomputed from the
/// full current rating set before returning.
pub async fn submit_rating(
    store: &dyn Store,
    voter_id: &UserId,
    project: &Project,
    scores: ScoreVector,
) -> Result<Rating, EngineError> {
    scores.validate()?;

    if store.user(voter_id).await?.is_none() {
        return Err(DomainError::unknown_voter(voter_id.to_string()).into());
    }

    let rating = match store
        .rating_by_owner_and_project(voter_id, project.id)
        .await?
    {
        Some(mut existing) => {
            tracing::info!(
                voter = %voter_id,
                rating = %existing.id,
                project = %project.id,
                "updating existing vote"
            );
            existing.scores = scores;
            store.update_rating(&existing).await?;
            existing
        }
        None => {
            let created = store
                .create_rating(&RatingDraft {
                    owner_id: voter_id.clone(),
                    project_id: project.id,
                    scores,
                })
                .await?;
            tracing::info!(
                voter = %voter_id,
                rating = %created.id,
                project = %project.id,
                "recorded new vote"
            );
            created
        }
    };

    recalculate_project_rating(store, project).await?;
    Ok(rating)
}

/// Recompute a project's aggregate from its full current rating set.
///
/// An empty set leaves the stored aggregate untouched. Otherwise the
/// componentwise truncated mean and the refreshed contributing-rating id
/// set are persisted onto the project row.
///
/// The read-then-write here is not atomic against concurrent voters; a
/// same-project race can lose one recomputation, and the next vote repairs
/// the aggregate from the full set.
pub async fn recalculate_project_rating(
    store: &dyn Store,
    project: &Project,
) -> Result<(), EngineError> {
    let ratings = store.ratings_for_project(project.id).await?;

    let scores: Vec<ScoreVector> = ratings.iter().map(|r| r.scores).collect();
    let Some(mean) = ScoreVector::truncated_mean(&scores) else {
        return Ok(());
    };

    let mut row = project.clone();
    row.rating = mean;
    row.rating_ids = ratings.iter().map(|r| r.id).collect();
    store.update_project(&row).await?;

    tracing::debug!(project = %project.id, ratings = ratings.len(), "aggregate recomputed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use vitrine_model::{IdentityProfile, ProjectDraft};
    use vitrine_store::MemoryStore;

    use super::*;

    fn profile(id: &str) -> IdentityProfile {
        IdentityProfile {
            id: UserId::new(id),
            username: format!("user-{id}"),
            avatar: String::new(),
            discriminator: "0001".to_string(),
            email: None,
        }
    }

    fn draft() -> ProjectDraft {
        ProjectDraft {
            link: "https://example.com".to_string(),
            github: "owner/app".to_string(),
            description: "demo".to_string(),
            flags: String::new(),
            picture: String::new(),
            team: vec![],
            theme: 0,
        }
    }

    async fn seeded_project(store: &MemoryStore) -> Project {
        let owner = store.create_user_if_absent(&profile("owner")).await.unwrap();
        store.create_project(&owner.id, &draft()).await.unwrap()
    }

    fn flat(value: i64) -> ScoreVector {
        ScoreVector::new(value, value, value, value, value)
    }

    #[tokio::test]
    async fn resubmission_updates_the_same_row() {
        let store = MemoryStore::new();
        let project = seeded_project(&store).await;
        let voter = store.create_user_if_absent(&profile("voter")).await.unwrap();

        let first = submit_rating(&store, &voter.id, &project, flat(100)).await.unwrap();
        let second = submit_rating(&store, &voter.id, &project, flat(0)).await.unwrap();

        assert_eq!(first.id, second.id);
        let rows = store.ratings_for_project(project.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].scores, flat(0));

        let project = store.project(project.id).await.unwrap().unwrap();
        assert_eq!(project.rating, flat(0));
        assert_eq!(project.rating_ids, vec![first.id]);
    }

    #[tokio::test]
    async fn submitting_twice_with_identical_arguments_is_idempotent() {
        let store = MemoryStore::new();
        let project = seeded_project(&store).await;
        let voter = store.create_user_if_absent(&profile("voter")).await.unwrap();

        submit_rating(&store, &voter.id, &project, flat(75)).await.unwrap();
        submit_rating(&store, &voter.id, &project, flat(75)).await.unwrap();

        let rows = store.ratings_for_project(project.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        let project = store.project(project.id).await.unwrap().unwrap();
        assert_eq!(project.rating, flat(75));
    }

    #[tokio::test]
    async fn aggregate_uses_integer_truncation() {
        let store = MemoryStore::new();
        let project = seeded_project(&store).await;

        for (name, value) in [("a", 0), ("b", 25)] {
            let voter = store.create_user_if_absent(&profile(name)).await.unwrap();
            submit_rating(&store, &voter.id, &project, flat(value)).await.unwrap();
        }

        // (0 + 25) / 2 truncates to 12.
        let stored = store.project(project.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, flat(12));

        let voter = store.create_user_if_absent(&profile("c")).await.unwrap();
        submit_rating(&store, &voter.id, &project, flat(50)).await.unwrap();

        // (0 + 25 + 50) / 3 truncates to 25.
        let stored = store.project(project.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, flat(25));
        assert_eq!(stored.rating_ids.len(), 3);
    }

    #[tokio::test]
    async fn out_of_domain_component_fails_before_any_store_mutation() {
        let store = MemoryStore::new();
        let project = seeded_project(&store).await;
        let voter = store.create_user_if_absent(&profile("voter")).await.unwrap();

        let err = submit_rating(&store, &voter.id, &project, ScoreVector::new(0, 10, 50, 75, 100))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            EngineError::Domain(DomainError::InvalidScoreComponent(10))
        );
        assert!(store.ratings_for_project(project.id).await.unwrap().is_empty());
        let untouched = store.project(project.id).await.unwrap().unwrap();
        assert_eq!(untouched.rating, ScoreVector::zero());
    }

    #[tokio::test]
    async fn votes_from_unknown_users_are_rejected() {
        let store = MemoryStore::new();
        let project = seeded_project(&store).await;

        let err = submit_rating(&store, &UserId::new("ghost"), &project, flat(50))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Domain(DomainError::UnknownVoter(_))));
        assert!(store.ratings_for_project(project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recompute_with_no_ratings_leaves_the_aggregate_untouched() {
        let store = MemoryStore::new();
        let mut project = seeded_project(&store).await;
        project.rating = flat(75);
        store.update_project(&project).await.unwrap();

        recalculate_project_rating(&store, &project).await.unwrap();

        let stored = store.project(project.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, flat(75));
    }

    #[tokio::test]
    async fn full_voting_scenario() {
        let store = MemoryStore::new();
        let project = seeded_project(&store).await;
        let voter = store.create_user_if_absent(&profile("b")).await.unwrap();

        submit_rating(&store, &voter.id, &project, flat(100)).await.unwrap();
        let stored = store.project(project.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, flat(100));
        assert_eq!(stored.rating_ids.len(), 1);

        submit_rating(&store, &voter.id, &project, flat(0)).await.unwrap();
        let stored = store.project(project.id).await.unwrap().unwrap();
        assert_eq!(store.ratings_for_project(project.id).await.unwrap().len(), 1);
        assert_eq!(stored.rating, flat(0));
    }

    mod aggregate_properties {
        use proptest::prelude::*;
        use vitrine_model::score::SCORE_DOMAIN;

        use super::*;

        fn in_domain_score() -> impl Strategy<Value = ScoreVector> {
            prop::array::uniform5(prop::sample::select(SCORE_DOMAIN.to_vec()))
                .prop_map(ScoreVector::from_components)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: the truncated mean of any non-empty in-domain
            /// rating set is bounded by the set's componentwise min and max
            /// (so it can never leave the 0..=100 range).
            #[test]
            fn truncated_mean_is_bounded_by_its_inputs(
                scores in prop::collection::vec(in_domain_score(), 1..20)
            ) {
                let mean = ScoreVector::truncated_mean(&scores).unwrap();

                for i in 0..5 {
                    let column: Vec<i64> = scores.iter().map(|s| s.components()[i]).collect();
                    let min = *column.iter().min().unwrap();
                    let max = *column.iter().max().unwrap();
                    let value = mean.components()[i];

                    // Truncation may land below an exact mean but never
                    // below the smallest contributing component.
                    prop_assert!(value >= min.min(max));
                    prop_assert!(value <= max);
                }
            }
        }
    }
}
