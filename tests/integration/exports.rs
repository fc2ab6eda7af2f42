//! Integration tests for profile export artifacts

use chrono::{Duration, Utc};
use gramscope::analytics;
use gramscope::classify::ProfileTags;
use gramscope::output::{export_comparison, export_profile, ProfileSummary};
use gramscope::{
    CollectionStatus, ContentKind, PostRecord, ProfileDataset, ProfileMeta,
};

fn dataset(username: &str) -> ProfileDataset {
    let posts = (0..5u32)
        .map(|i| PostRecord {
            index: i + 1,
            shortcode: format!("{username}_{i}"),
            taken_at: Utc::now() - Duration::days(i as i64),
            likes: 100 + i as u64,
            comments: 10,
            content: if i % 2 == 0 {
                ContentKind::Photo
            } else {
                ContentKind::Video
            },
            video_views: (i % 2 == 1).then_some(2000),
            caption: format!("post {i} #daily @studio"),
            hashtags: vec!["daily".into()],
            mentions: vec!["studio".into()],
            is_brand_collab: i == 0,
        })
        .collect();

    ProfileDataset {
        meta: ProfileMeta {
            user_id: "77".into(),
            username: username.into(),
            full_name: "Export Test".into(),
            biography: "making things".into(),
            followers: 10_000,
            following: 300,
            media_count: 250,
            is_private: false,
            is_verified: true,
            followed_by_viewer: false,
        },
        posts,
        followers: vec!["fan1".into(), "fan2".into()],
        following: vec!["peer".into()],
        status: CollectionStatus::Complete,
        requests_made: 9,
        pages_failed: 0,
        fetched_at: Utc::now(),
    }
}

#[test]
fn test_export_profile_writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let data = dataset("maker");
    let report = analytics::analyze(&data);
    let tags = ProfileTags {
        category: "Photography".into(),
        location: "Pune, India".into(),
    };

    let written = export_profile(dir.path(), &data, &report, &tags).unwrap();
    assert_eq!(written.len(), 7);
    for path in &written {
        assert!(path.exists(), "missing export: {}", path.display());
    }

    let summary = ProfileSummary::build(&data, &report, &tags);
    assert_eq!(summary.brand_collabs, report.stats.brand_collabs);
    assert_eq!(summary.brand_collabs, 1);

    let posts_csv =
        std::fs::read_to_string(dir.path().join("maker/maker_posts.csv")).unwrap();
    // Header plus one row per post.
    assert_eq!(posts_csv.lines().count(), 6);
    assert!(posts_csv.contains("maker_0"));

    let followers =
        std::fs::read_to_string(dir.path().join("maker/maker_followers.jsonl")).unwrap();
    assert_eq!(followers.lines().count(), 2);

    let interactions: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("maker/maker_interactions_summary.json"))
            .unwrap(),
    )
    .unwrap();
    assert_eq!(interactions["username"], "maker");
    assert_eq!(interactions["total_requests"], 9);

    let summary: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("maker/maker_profile_summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary[0]["category"], "Photography");
    assert_eq!(summary[0]["followers"], 10_000);
}

#[test]
fn test_comparison_tables_cover_every_profile() {
    let dir = tempfile::tempdir().unwrap();
    let tags = ProfileTags::unknown();

    let summaries: Vec<ProfileSummary> = ["alpha", "beta"]
        .iter()
        .map(|name| {
            let data = dataset(name);
            let report = analytics::analyze(&data);
            ProfileSummary::build(&data, &report, &tags)
        })
        .collect();

    let written = export_comparison(dir.path(), &summaries).unwrap();
    assert_eq!(written.len(), 2);

    let csv = std::fs::read_to_string(dir.path().join("profiles_comparison.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("alpha"));
    assert!(csv.contains("beta"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("profiles_comparison.json")).unwrap())
            .unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
}
