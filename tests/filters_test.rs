//! Integration tests for owner-scoped list queries: enum filters with
//! sentinels, the shared search/location disjunction, sort allow-lists,
//! and the bounded-result caps.

use prospectord::query::{FollowupQuery, ProspectQuery};
use prospectord::storage::{NewFollowup, NewProspect, ProspectPatch, Storage};
use tempfile::TempDir;

async fn setup() -> (TempDir, Storage, String) {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    let user = storage
        .create_user("owner@crm.example", "Owner", "USER")
        .await
        .unwrap();
    (dir, storage, user.id)
}

fn prospect(name: &str, status: &str) -> NewProspect {
    NewProspect {
        name: name.to_string(),
        status: status.to_string(),
        ..NewProspect::default()
    }
}

#[tokio::test]
async fn status_filter_matches_exactly_and_sentinels_disable_it() {
    let (_dir, storage, owner) = setup().await;
    storage.create_prospect(&owner, &prospect("A", "NEW")).await.unwrap();
    storage
        .create_prospect(&owner, &prospect("B", "CONTACTED"))
        .await
        .unwrap();
    storage
        .create_prospect(&owner, &prospect("C", "QUALIFIED"))
        .await
        .unwrap();

    let contacted = storage
        .list_prospects(
            &owner,
            &ProspectQuery {
                status: Some("CONTACTED".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(contacted.len(), 1);
    assert_eq!(contacted[0].name, "B");

    for sentinel in [None, Some("ALL".to_string()), Some("TODOS".to_string())] {
        let all = storage
            .list_prospects(
                &owner,
                &ProspectQuery {
                    status: sentinel.clone(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 3, "sentinel {sentinel:?} should return everything");
    }
}

#[tokio::test]
async fn search_and_location_are_one_disjunction() {
    let (_dir, storage, owner) = setup().await;
    storage
        .create_prospect(
            &owner,
            &NewProspect {
                name: "Acme Corp".to_string(),
                city: "Madrid".to_string(),
                ..NewProspect::default()
            },
        )
        .await
        .unwrap();
    storage
        .create_prospect(
            &owner,
            &NewProspect {
                name: "Globex".to_string(),
                city: "Lisbon".to_string(),
                ..NewProspect::default()
            },
        )
        .await
        .unwrap();

    let by_search = storage
        .list_prospects(
            &owner,
            &ProspectQuery {
                search: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].name, "Acme Corp");

    let by_location = storage
        .list_prospects(
            &owner,
            &ProspectQuery {
                location: Some("Madrid".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_location.len(), 1);
    assert_eq!(by_location[0].name, "Acme Corp");

    // Both supplied: the location hit alone is enough, even though the
    // search term matches nothing.
    let either = storage
        .list_prospects(
            &owner,
            &ProspectQuery {
                search: Some("zzz-no-match".to_string()),
                location: Some("Madrid".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(either.len(), 1);
    assert_eq!(either[0].name, "Acme Corp");
}

#[tokio::test]
async fn prospect_list_is_capped_at_100_newest_first() {
    let (_dir, storage, owner) = setup().await;
    for i in 0..150 {
        storage
            .create_prospect(&owner, &prospect(&format!("p{i:03}"), "NEW"))
            .await
            .unwrap();
    }

    let rows = storage
        .list_prospects(&owner, &ProspectQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 100);
    assert_eq!(rows[0].name, "p149", "newest record comes first");
    assert!(
        rows.iter().all(|r| r.name != "p000"),
        "oldest records fall off the capped page"
    );
    for pair in rows.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn sort_allow_list_with_silent_fallback() {
    let (_dir, storage, owner) = setup().await;
    storage.create_prospect(&owner, &prospect("Beta", "NEW")).await.unwrap();
    storage.create_prospect(&owner, &prospect("Alpha", "NEW")).await.unwrap();

    let by_name = storage
        .list_prospects(
            &owner,
            &ProspectQuery {
                order_by: Some("name".to_string()),
                order_dir: Some("asc".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_name[0].name, "Alpha");

    // Unknown key: creation-time descending wins, requested direction ignored.
    let fallback = storage
        .list_prospects(
            &owner,
            &ProspectQuery {
                order_by: Some("api_token".to_string()),
                order_dir: Some("asc".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(fallback[0].name, "Alpha", "created last, listed first");
}

#[tokio::test]
async fn followup_list_is_capped_at_50_soonest_first() {
    let (_dir, storage, owner) = setup().await;
    let prospect = storage
        .create_prospect(&owner, &prospect("Anchor", "NEW"))
        .await
        .unwrap();

    for i in 0..60 {
        storage
            .create_followup(
                &owner,
                &NewFollowup {
                    prospect_id: prospect.id.clone(),
                    title: format!("task {i:02}"),
                    scheduled_at: format!("2024-05-01T00:{:02}:00+00:00", 59 - i),
                    ..NewFollowup::default()
                },
            )
            .await
            .unwrap();
    }

    let rows = storage
        .list_followups(&owner, &FollowupQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 50);
    for pair in rows.windows(2) {
        assert!(pair[0].scheduled_at <= pair[1].scheduled_at);
    }
}

#[tokio::test]
async fn queries_never_cross_owners() {
    let (_dir, storage, owner_a) = setup().await;
    let user_b = storage
        .create_user("second@crm.example", "Second", "USER")
        .await
        .unwrap();

    let secret = storage
        .create_prospect(&owner_a, &prospect("Private", "NEW"))
        .await
        .unwrap();

    let b_list = storage
        .list_prospects(&user_b.id, &ProspectQuery::default())
        .await
        .unwrap();
    assert!(b_list.is_empty());

    // Reads, updates, and deletes against someone else's record all behave
    // as if it did not exist.
    assert!(storage.get_prospect(&user_b.id, &secret.id).await.unwrap().is_none());
    let patch = ProspectPatch {
        status: Some("LOST".to_string()),
        ..Default::default()
    };
    assert!(storage
        .update_prospect(&user_b.id, &secret.id, &patch)
        .await
        .unwrap()
        .is_none());
    assert!(!storage.delete_prospect(&user_b.id, &secret.id).await.unwrap());

    // The rightful owner still sees it, untouched.
    let row = storage.get_prospect(&owner_a, &secret.id).await.unwrap().unwrap();
    assert_eq!(row.status, "NEW");
}
