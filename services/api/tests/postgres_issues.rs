//! Issue repository against a live PostgreSQL database.

use civic_api::{
    models::{IssueCategory, IssueFilter, IssueStatus, IssueUpdate, NewIssue, Reporter},
    repositories::{IssueRepository, IssueStore, MIGRATOR},
};
use civic_common::{database::init_pool, settings::AppSettings};

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a disposable database"]
async fn issue_repository_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let settings = AppSettings::from_env()?;
    let db_config = settings
        .database_config()
        .ok_or("DATABASE_URL must be set for this test")?;
    let pool = init_pool(&db_config)?;
    MIGRATOR.run(&pool).await?;

    let store = IssueRepository::new(pool);
    let created = store
        .create(&NewIssue {
            title: "Streetlight out".into(),
            details: "Dark corner".into(),
            category: IssueCategory::Electricity,
            photo_url: None,
            reporter: Reporter {
                username: "ab1".into(),
                email: "ab1@x.com".into(),
                phone: "9876543210".into(),
            },
            location: None,
        })
        .await?;

    assert!(created.issue_id.starts_with("CIV-"));
    assert_eq!(created.issue_id.len(), 10);
    assert_eq!(created.status, IssueStatus::New);

    let updated = store
        .apply_updates(
            &created.issue_id,
            &[
                IssueUpdate::SetStatus(IssueStatus::InProgress),
                IssueUpdate::SetAssigned(true),
            ],
        )
        .await?
        .ok_or("issue vanished")?;
    assert_eq!(updated.status, IssueStatus::InProgress);
    assert!(updated.assigned);
    assert!(updated.updated_at >= created.updated_at);

    let filter = IssueFilter {
        status: Some(IssueStatus::InProgress),
        category: Some(IssueCategory::Electricity),
    };
    let listed = store.list(&filter, 200).await?;
    assert!(listed.iter().any(|issue| issue.issue_id == created.issue_id));
    assert!(store.count(&filter).await? >= 1);

    Ok(())
}
