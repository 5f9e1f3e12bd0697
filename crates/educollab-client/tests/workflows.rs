//! End-to-end workflows against the embedded SQLite store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use educollab_client::commands::milestones::{MilestonePatch, NewMilestone};
use educollab_client::commands::projects::NewProject;
use educollab_client::commands::session::NewUser;
use educollab_client::{
    ClientError, FanoutOutcome, Platform, ProjectSummary, QueryKey, RatingOutcome,
    SessionContext, StatusFilter,
};
use educollab_shared::{
    Collection, EntityId, InviteStatus, MilestoneStatus, NotificationKind, ProjectStatus,
    UserRole, ValidationError,
};
use educollab_store::{
    Filter, Milestone, Notification, ResourceStore, SqliteStore, StoreError, TeamInvite, User,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Store wrapper that fails every notification write.
struct NoNotifications {
    inner: SqliteStore,
    rejected: AtomicUsize,
}

#[async_trait]
impl ResourceStore for NoNotifications {
    async fn list(&self, c: Collection, f: &Filter) -> educollab_store::Result<Vec<Value>> {
        self.inner.list(c, f).await
    }

    async fn get(&self, c: Collection, id: &EntityId) -> educollab_store::Result<Value> {
        self.inner.get(c, id).await
    }

    async fn create(&self, c: Collection, record: Value) -> educollab_store::Result<Value> {
        if c == Collection::Notifications {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Status {
                status: 503,
                body: "notifications offline".into(),
            });
        }
        self.inner.create(c, record).await
    }

    async fn update(
        &self,
        c: Collection,
        id: &EntityId,
        patch: Value,
    ) -> educollab_store::Result<Value> {
        self.inner.update(c, id, patch).await
    }

    async fn delete(&self, c: Collection, id: &EntityId) -> educollab_store::Result<()> {
        self.inner.delete(c, id).await
    }
}

fn platform() -> Platform {
    let store = SqliteStore::open_in_memory().unwrap();
    Platform::new(Arc::new(store), SessionContext::ephemeral())
}

async fn seed_user(platform: &Platform, id: &str, email: &str) -> User {
    let user = User {
        id: EntityId::from(id),
        email: email.into(),
        name: id.into(),
        role: UserRole::Student,
        bio: None,
        avatar: None,
        created_at: None,
    };
    platform.resources().create(&user).await.unwrap()
}

fn sign_in(platform: &Platform, user: &User) {
    platform.session().set(user.clone()).unwrap();
}

fn open_project(title: &str) -> NewProject {
    NewProject {
        title: title.into(),
        looking_for_members: true,
        ..Default::default()
    }
}

fn summaries(value: Option<Value>) -> Vec<ProjectSummary> {
    serde_json::from_value(value.unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

#[tokio::test]
async fn join_refreshes_team_views_and_notifies_owner() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;

    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("Robot arm")).await.unwrap();
    assert_eq!(platform.team_members(&p1.id).await.unwrap().len(), 1);

    // Views currently on screen.
    let _list = platform.cache().subscribe(&QueryKey::Projects);
    let _detail = platform.cache().subscribe(&QueryKey::Project(p1.id.clone()));
    assert_eq!(platform.projects().await.unwrap()[0].team_size, 1);
    assert_eq!(platform.project(&p1.id).await.unwrap().team_size, 1);

    sign_in(&platform, &u2);
    let joined = platform.join_project(&p1.id).await.unwrap();
    assert_eq!(joined.value.user_id, u2.id);
    assert!(matches!(joined.fanout, FanoutOutcome::Delivered(_)));

    // Observed views were refetched, not just marked stale.
    let cache = platform.cache();
    assert!(!cache.is_stale(&QueryKey::Projects));
    assert_eq!(summaries(cache.peek(&QueryKey::Projects))[0].team_size, 2);
    let detail: ProjectSummary =
        serde_json::from_value(cache.peek(&QueryKey::Project(p1.id.clone())).unwrap()).unwrap();
    assert_eq!(detail.team_size, 2);
    assert_eq!(platform.team_members(&p1.id).await.unwrap().len(), 2);

    let access = platform.access(&p1.id).await.unwrap();
    assert!(access.is_team_member && access.can_manage && !access.is_owner);

    sign_in(&platform, &u1);
    let inbox = platform.notifications().await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::System);
    assert_eq!(inbox[0].related_id.as_ref(), Some(&p1.id));
}

#[tokio::test]
async fn joining_twice_is_a_conflict() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    sign_in(&platform, &u2);
    platform.join_project(&p1.id).await.unwrap();
    let err = platform.join_project(&p1.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Conflict(_)));
    assert_eq!(platform.team_members(&p1.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn full_or_closed_teams_refuse_joins() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;
    let u3 = seed_user(&platform, "U3", "u3@school.edu").await;

    sign_in(&platform, &u1);
    let small = platform
        .create_project(NewProject {
            max_team_size: Some(2),
            ..open_project("Small")
        })
        .await
        .unwrap();
    let closed = platform
        .create_project(NewProject {
            looking_for_members: false,
            ..open_project("Closed")
        })
        .await
        .unwrap();

    sign_in(&platform, &u2);
    platform.join_project(&small.id).await.unwrap();
    assert!(matches!(
        platform.join_project(&closed.id).await,
        Err(ClientError::Unauthorized(_))
    ));

    sign_in(&platform, &u3);
    assert!(matches!(
        platform.join_project(&small.id).await,
        Err(ClientError::Validation(ValidationError::TeamFull(2)))
    ));
}

#[tokio::test]
async fn notification_outage_does_not_fail_the_join() {
    let store = Arc::new(NoNotifications {
        inner: SqliteStore::open_in_memory().unwrap(),
        rejected: AtomicUsize::new(0),
    });
    let platform = Platform::new(store.clone(), SessionContext::ephemeral());
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;

    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    sign_in(&platform, &u2);
    let joined = platform.join_project(&p1.id).await.unwrap();
    assert!(matches!(joined.fanout, FanoutOutcome::Failed(_)));
    assert_eq!(store.rejected.load(Ordering::SeqCst), 1);
    assert_eq!(platform.team_members(&p1.id).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Invites
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invite_to_unknown_email_is_pending_without_notification() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    let created = platform.create_invite(&p1.id, " X@Y.com ").await.unwrap();
    assert_eq!(created.value.status, InviteStatus::Pending);
    assert_eq!(created.value.invitee_email, "x@y.com");
    assert_eq!(created.fanout, FanoutOutcome::Skipped);

    let all: Vec<Notification> = platform.resources().list(&Filter::all()).await.unwrap();
    assert!(all.is_empty());

    assert!(matches!(
        platform.create_invite(&p1.id, "x@y.com").await,
        Err(ClientError::Conflict(_))
    ));
}

#[tokio::test]
async fn accepted_invite_joins_and_closes() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;

    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();
    let invite = platform.create_invite(&p1.id, "u2@school.edu").await.unwrap();
    assert!(matches!(invite.fanout, FanoutOutcome::Delivered(ref n) if n.user_id == u2.id));

    // Closing the project does not lock out holders of an invite.
    platform
        .update_project(
            &p1.id,
            educollab_client::commands::projects::ProjectPatch {
                looking_for_members: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    sign_in(&platform, &u2);
    let _inbox = platform.cache().subscribe(&QueryKey::TeamInvites("u2@school.edu".into()));
    assert!(platform.pending_invite_for(&p1.id).await.unwrap().is_some());
    assert_eq!(platform.unread_count().await.unwrap(), 1);

    let accepted = platform.accept_invite(&invite.value.id).await.unwrap();
    assert_eq!(accepted.status, InviteStatus::Accepted);
    assert!(platform.pending_invite_for(&p1.id).await.unwrap().is_none());
    assert!(platform.access(&p1.id).await.unwrap().is_team_member);

    assert!(matches!(
        platform.decline_invite(&invite.value.id).await,
        Err(ClientError::Validation(ValidationError::InviteClosed(_)))
    ));
}

#[tokio::test]
async fn declined_invite_writes_only_the_status() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;

    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();
    let invite = platform.create_invite(&p1.id, "u2@school.edu").await.unwrap().value;

    sign_in(&platform, &u1);
    assert!(matches!(
        platform.decline_invite(&invite.id).await,
        Err(ClientError::Unauthorized(_))
    ));

    sign_in(&platform, &u2);
    let declined = platform.decline_invite(&invite.id).await.unwrap();
    assert_eq!(declined.status, InviteStatus::Rejected);
    assert_eq!(platform.team_members(&p1.id).await.unwrap().len(), 1);

    let stored: TeamInvite = platform.resources().get(&invite.id).await.unwrap();
    assert_eq!(stored.status, InviteStatus::Rejected);
}

#[tokio::test]
async fn only_owners_invite() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;

    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    sign_in(&platform, &u2);
    platform.join_project(&p1.id).await.unwrap();
    assert!(matches!(
        platform.create_invite(&p1.id, "z@school.edu").await,
        Err(ClientError::Unauthorized(_))
    ));
}

// ---------------------------------------------------------------------------
// Milestones and progress
// ---------------------------------------------------------------------------

#[tokio::test]
async fn three_of_five_milestones_is_sixty_percent() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();
    assert_eq!(platform.progress(&p1.id).await.unwrap().percentage, 0);

    let _list = platform.cache().subscribe(&QueryKey::Projects);
    platform.projects().await.unwrap();

    for i in 0..5 {
        let status = if i < 3 {
            MilestoneStatus::Completed
        } else {
            MilestoneStatus::Pending
        };
        platform
            .create_milestone(
                &p1.id,
                NewMilestone {
                    title: format!("step {i}"),
                    status,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let progress = platform.progress(&p1.id).await.unwrap();
    assert_eq!((progress.completed, progress.total, progress.percentage), (3, 5, 60));
    assert_eq!(
        summaries(platform.cache().peek(&QueryKey::Projects))[0]
            .milestone_progress
            .percentage,
        60
    );
}

#[tokio::test]
async fn completed_at_follows_status() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();
    let m = platform
        .create_milestone(
            &p1.id,
            NewMilestone {
                title: "Prototype".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(m.completed_at.is_none());

    platform
        .set_milestone_status(&m.id, MilestoneStatus::Completed)
        .await
        .unwrap();
    let done: Milestone = platform.resources().get(&m.id).await.unwrap();
    assert!(done.completed_at.is_some());

    platform
        .set_milestone_status(&m.id, MilestoneStatus::Pending)
        .await
        .unwrap();
    let reopened: Milestone = platform.resources().get(&m.id).await.unwrap();
    assert_eq!(reopened.status, MilestoneStatus::Pending);
    assert!(reopened.completed_at.is_none());
}

#[tokio::test]
async fn project_detail_follows_milestones_and_ratings() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    let before = platform.project(&p1.id).await.unwrap();
    assert_eq!(before.milestone_progress.percentage, 0);
    assert_eq!(before.rating.count, 0);

    platform
        .create_milestone(
            &p1.id,
            NewMilestone {
                title: "Ship".into(),
                status: MilestoneStatus::Completed,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        platform.project(&p1.id).await.unwrap().milestone_progress.percentage,
        100
    );

    sign_in(&platform, &u2);
    platform.add_rating(&p1.id, 5).await.unwrap();
    let after = platform.project(&p1.id).await.unwrap();
    assert_eq!(after.rating.count, 1);
    assert_eq!(after.rating.display(), "5.0");
}

#[tokio::test]
async fn update_milestone_merges_and_stamps() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();
    let m = platform
        .create_milestone(
            &p1.id,
            NewMilestone {
                title: "Draft".into(),
                description: "first pass".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let key = QueryKey::Milestones(p1.id.clone());
    let _view = platform.cache().subscribe(&key);
    platform.milestones(&p1.id).await.unwrap();

    assert!(matches!(
        platform
            .update_milestone(
                &m.id,
                MilestonePatch {
                    title: Some("  ".into()),
                    ..Default::default()
                },
            )
            .await,
        Err(ClientError::Validation(ValidationError::EmptyField("title")))
    ));

    let updated = platform
        .update_milestone(
            &m.id,
            MilestonePatch {
                title: Some("  Final  ".into()),
                due_date: Some("2025-06-01".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.description, "first pass");
    assert_eq!(updated.due_date.as_deref(), Some("2025-06-01"));
    assert_eq!(updated.status, MilestoneStatus::Pending);
    assert!(updated.updated_at > m.updated_at);

    // The observed list was refetched with the edit.
    assert!(!platform.cache().is_stale(&key));
    let listed: Vec<Milestone> =
        serde_json::from_value(platform.cache().peek(&key).unwrap()).unwrap();
    assert_eq!(listed[0].title, "Final");
}

#[tokio::test]
async fn failed_mutation_leaves_cache_untouched() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    let key = QueryKey::Milestones(p1.id.clone());
    let _view = platform.cache().subscribe(&key);
    platform.milestones(&p1.id).await.unwrap();

    let err = platform
        .set_milestone_status(&EntityId::from("missing"), MilestoneStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(!platform.cache().is_stale(&key));

    let err = platform
        .create_milestone(&p1.id, NewMilestone::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(ValidationError::EmptyField("title"))));
    assert!(platform.cache().pending().is_empty());
}

#[tokio::test]
async fn guests_and_outsiders_cannot_manage() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();
    let form = || NewMilestone {
        title: "x".into(),
        ..Default::default()
    };

    sign_in(&platform, &u2);
    assert!(matches!(
        platform.create_milestone(&p1.id, form()).await,
        Err(ClientError::Unauthorized(_))
    ));
    assert!(matches!(
        platform.delete_project(&p1.id).await,
        Err(ClientError::Unauthorized(_))
    ));

    platform.logout().unwrap();
    assert!(platform.access(&p1.id).await.unwrap().is_guest());
    assert!(matches!(
        platform.create_milestone(&p1.id, form()).await,
        Err(ClientError::Unauthorized(_))
    ));
}

// ---------------------------------------------------------------------------
// Team management and projects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_removes_members_but_not_themself() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    sign_in(&platform, &u2);
    let member = platform.join_project(&p1.id).await.unwrap().value;

    sign_in(&platform, &u1);
    let team = platform.team_members(&p1.id).await.unwrap();
    let owner_record = team.iter().find(|m| m.user_id == u1.id).unwrap();
    assert!(matches!(
        platform.remove_team_member(&owner_record.id).await,
        Err(ClientError::Unauthorized(_))
    ));

    platform.remove_team_member(&member.id).await.unwrap();
    assert_eq!(platform.team_members(&p1.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn project_edits_and_cascade_delete() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();
    let _p2 = platform
        .create_project(NewProject {
            status: ProjectStatus::Completed,
            ..open_project("Done")
        })
        .await
        .unwrap();

    assert!(matches!(
        platform
            .create_project(NewProject {
                max_team_size: Some(0),
                ..open_project("Nobody")
            })
            .await,
        Err(ClientError::Validation(ValidationError::InvalidTeamSize(0)))
    ));

    let progressed = platform.update_project_progress(&p1.id, 140).await.unwrap();
    assert_eq!(progressed.progress, 100);

    let completed = platform
        .projects_with_status(StatusFilter::Only(ProjectStatus::Completed))
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].project.title, "Done");

    platform
        .create_milestone(
            &p1.id,
            NewMilestone {
                title: "m".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(platform.project(&p1.id).await.unwrap().project.id, p1.id);
    platform.delete_project(&p1.id).await.unwrap();
    assert!(matches!(
        platform.project(&p1.id).await,
        Err(ClientError::NotFound(_))
    ));

    let orphans: Vec<Milestone> = platform
        .resources()
        .list(&Filter::all().eq("projectId", &p1.id))
        .await
        .unwrap();
    assert!(orphans.is_empty());
    assert_eq!(platform.projects().await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Ratings, notifications, comments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_rating_returns_the_first() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    sign_in(&platform, &u2);
    assert!(matches!(
        platform.add_rating(&p1.id, 6).await,
        Err(ClientError::Validation(ValidationError::RatingOutOfRange(6)))
    ));

    let first = platform.add_rating(&p1.id, 4).await.unwrap();
    assert!(matches!(first, RatingOutcome::Created(_)));
    let second = platform.add_rating(&p1.id, 2).await.unwrap();
    assert!(matches!(second, RatingOutcome::Existing(ref r) if r.rating == 4));
    assert_eq!(platform.ratings(&p1.id).await.unwrap().len(), 1);

    platform.update_rating(&first.rating().id, 2).await.unwrap();
    let summary = platform.rating_summary(&p1.id).await.unwrap();
    assert_eq!(summary.display(), "2.0");
    assert_eq!(summary.stars(), "★★☆☆☆");

    sign_in(&platform, &u1);
    assert!(matches!(
        platform.update_rating(&first.rating().id, 5).await,
        Err(ClientError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn mark_all_read_clears_unread_count() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    let u2 = seed_user(&platform, "U2", "u2@school.edu").await;
    let u3 = seed_user(&platform, "U3", "u3@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    for user in [&u2, &u3] {
        sign_in(&platform, user);
        platform.join_project(&p1.id).await.unwrap();
    }

    sign_in(&platform, &u1);
    let _inbox = platform.cache().subscribe(&QueryKey::Notifications(u1.id.clone()));
    let inbox = platform.notifications().await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert!(inbox[0].created_at >= inbox[1].created_at);

    platform.mark_notification_read(&inbox[0].id).await.unwrap();
    assert_eq!(platform.unread_count().await.unwrap(), 1);
    assert_eq!(platform.mark_all_notifications_read().await.unwrap(), 1);
    assert_eq!(platform.unread_count().await.unwrap(), 0);
}

#[tokio::test]
async fn comments_need_content() {
    let platform = platform();
    let u1 = seed_user(&platform, "U1", "u1@school.edu").await;
    sign_in(&platform, &u1);
    let p1 = platform.create_project(open_project("P")).await.unwrap();

    assert!(matches!(
        platform.create_comment(&p1.id, "   ").await,
        Err(ClientError::Validation(ValidationError::EmptyField("content")))
    ));
    let c = platform.create_comment(&p1.id, "  Looks great ").await.unwrap();
    assert_eq!(c.content, "Looks great");
    assert_eq!(platform.comments(&p1.id).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_login_logout() {
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");
    let store: Arc<dyn ResourceStore> = Arc::new(SqliteStore::open_in_memory().unwrap());

    let platform = Platform::new(store.clone(), SessionContext::init(&session_path));
    let user = platform
        .register(NewUser {
            email: " Ada@School.edu ".into(),
            name: "Ada".into(),
            role: UserRole::Student,
            bio: None,
        })
        .await
        .unwrap();
    assert_eq!(user.email, "ada@school.edu");
    assert_eq!(platform.users().await.unwrap().len(), 1);

    // An observed user list picks up later registrations.
    let _directory = platform.cache().subscribe(&QueryKey::Users);
    platform
        .register(NewUser {
            email: "grace@school.edu".into(),
            name: "Grace".into(),
            role: UserRole::Teacher,
            bio: None,
        })
        .await
        .unwrap();
    let directory: Vec<User> =
        serde_json::from_value(platform.cache().peek(&QueryKey::Users).unwrap()).unwrap();
    assert_eq!(directory.len(), 2);
    platform.login("ada@school.edu", "pw").await.unwrap();

    // A restart picks the session back up.
    let restarted = Platform::new(store.clone(), SessionContext::init(&session_path));
    assert_eq!(restarted.current_user(), Some(user.clone()));

    assert!(matches!(
        restarted
            .register(NewUser {
                email: "ada@school.edu".into(),
                name: "Other".into(),
                role: UserRole::Mentor,
                bio: None,
            })
            .await,
        Err(ClientError::Conflict(_))
    ));

    restarted.logout().unwrap();
    assert!(restarted.current_user().is_none());
    assert!(matches!(
        restarted.login("nobody@school.edu", "pw").await,
        Err(ClientError::NotFound(_))
    ));
    let back = restarted.login("ADA@school.edu", "anything").await.unwrap();
    assert_eq!(back.id, user.id);
}
