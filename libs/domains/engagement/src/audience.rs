//! Audience resolution: coarse target tags into concrete recipient sets.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::error::EngagementResult;
use crate::models::{AudienceCounts, AudienceTarget, ResolvedAudience, VisitorContact};
use crate::repository::DirectoryRepository;

/// Resolves audience targets against the membership directory.
pub struct AudienceResolver {
    directory: Arc<dyn DirectoryRepository>,
}

impl AudienceResolver {
    pub fn new(directory: Arc<dyn DirectoryRepository>) -> Self {
        Self { directory }
    }

    /// Union the targets into a deduplicated audience. A profile or
    /// visitor reachable by two overlapping targets appears once; an
    /// empty target list resolves to an empty audience.
    #[instrument(skip(self), fields(targets = targets.len()))]
    pub async fn resolve(
        &self,
        church_id: Uuid,
        targets: &[AudienceTarget],
    ) -> EngagementResult<ResolvedAudience> {
        let mut profile_ids: HashSet<Uuid> = HashSet::new();
        let mut seen_phones: HashSet<String> = HashSet::new();
        let mut visitors: Vec<VisitorContact> = Vec::new();

        for target in targets {
            match target {
                AudienceTarget::AllMembers => {
                    profile_ids.extend(self.directory.active_profile_ids(church_id).await?);
                }
                AudienceTarget::Role { role } => {
                    profile_ids
                        .extend(self.directory.profile_ids_by_role(church_id, *role).await?);
                }
                AudienceTarget::Group { id } => {
                    profile_ids.extend(self.directory.group_member_ids(*id).await?);
                }
                AudienceTarget::Ministry { id } => {
                    profile_ids.extend(self.directory.ministry_member_ids(*id).await?);
                }
                AudienceTarget::OpenVisitors => {
                    for contact in self.directory.open_visitors(church_id).await? {
                        if seen_phones.insert(contact.phone.clone()) {
                            visitors.push(contact);
                        }
                    }
                }
            }
        }

        Ok(ResolvedAudience {
            profile_ids: profile_ids.into_iter().collect(),
            visitors,
        })
    }

    /// Size preview. A single target is answered with COUNT queries; a
    /// multi-target preview resolves and deduplicates so the numbers
    /// match what a broadcast to the same targets would reach.
    pub async fn count(
        &self,
        church_id: Uuid,
        targets: &[AudienceTarget],
    ) -> EngagementResult<AudienceCounts> {
        if let [target] = targets {
            let (profile_count, visitor_count) = match target {
                AudienceTarget::AllMembers => {
                    (self.directory.count_active_profiles(church_id).await?, 0)
                }
                AudienceTarget::Role { role } => (
                    self.directory
                        .count_profiles_by_role(church_id, *role)
                        .await?,
                    0,
                ),
                AudienceTarget::Group { id } => {
                    (self.directory.count_group_members(*id).await?, 0)
                }
                AudienceTarget::Ministry { id } => {
                    (self.directory.count_ministry_members(*id).await?, 0)
                }
                AudienceTarget::OpenVisitors => {
                    (0, self.directory.count_open_visitors(church_id).await?)
                }
            };
            return Ok(AudienceCounts {
                profile_count,
                visitor_count,
                total: profile_count + visitor_count,
            });
        }

        let audience = self.resolve(church_id, targets).await?;
        Ok(AudienceCounts {
            profile_count: audience.profile_ids.len() as u64,
            visitor_count: audience.visitors.len() as u64,
            total: audience.total() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;
    use crate::repository::MockDirectoryRepository;

    #[tokio::test]
    async fn test_overlapping_targets_deduplicate() {
        let church_id = Uuid::now_v7();
        let group_id = Uuid::now_v7();
        let shared = Uuid::now_v7();
        let leader_only = Uuid::now_v7();
        let group_only = Uuid::now_v7();

        let mut directory = MockDirectoryRepository::new();
        directory
            .expect_profile_ids_by_role()
            .returning(move |_, _| Ok(vec![shared, leader_only]));
        directory
            .expect_group_member_ids()
            .returning(move |_| Ok(vec![shared, group_only]));

        let resolver = AudienceResolver::new(Arc::new(directory));
        let audience = resolver
            .resolve(
                church_id,
                &[
                    AudienceTarget::Role {
                        role: MemberRole::Leader,
                    },
                    AudienceTarget::Group { id: group_id },
                ],
            )
            .await
            .unwrap();

        assert_eq!(audience.profile_ids.len(), 3);
        assert!(audience.profile_ids.contains(&shared));
    }

    #[tokio::test]
    async fn test_visitor_phones_deduplicate() {
        let church_id = Uuid::now_v7();

        let mut directory = MockDirectoryRepository::new();
        directory.expect_open_visitors().returning(|_| {
            Ok(vec![
                VisitorContact {
                    id: Uuid::now_v7(),
                    phone: "+201000000001".to_string(),
                },
                VisitorContact {
                    id: Uuid::now_v7(),
                    phone: "+201000000001".to_string(),
                },
                VisitorContact {
                    id: Uuid::now_v7(),
                    phone: "+201000000002".to_string(),
                },
            ])
        });

        let resolver = AudienceResolver::new(Arc::new(directory));
        let audience = resolver
            .resolve(church_id, &[AudienceTarget::OpenVisitors])
            .await
            .unwrap();

        assert_eq!(audience.visitors.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_targets_resolve_to_empty_audience() {
        let directory = MockDirectoryRepository::new();
        let resolver = AudienceResolver::new(Arc::new(directory));

        let audience = resolver.resolve(Uuid::now_v7(), &[]).await.unwrap();
        assert!(audience.is_empty());
    }

    #[tokio::test]
    async fn test_single_target_preview_uses_counts() {
        let mut directory = MockDirectoryRepository::new();
        directory
            .expect_count_active_profiles()
            .times(1)
            .returning(|_| Ok(42));
        directory.expect_active_profile_ids().never();

        let resolver = AudienceResolver::new(Arc::new(directory));
        let counts = resolver
            .count(Uuid::now_v7(), &[AudienceTarget::AllMembers])
            .await
            .unwrap();

        assert_eq!(
            counts,
            AudienceCounts {
                profile_count: 42,
                visitor_count: 0,
                total: 42
            }
        );
    }
}
