use dashboard_search::config::Config;
use dashboard_search::model::types::Dashboard;
use dashboard_search::search::query::{SearchError, SearchQuery};
use dashboard_search::service::SearchService;
use dashboard_search::storage::sqlite::SqliteStorage;

fn seeded_storage() -> (tempfile::TempDir, SqliteStorage) {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut storage = SqliteStorage::open(&tmp.path().join("dash.db")).expect("open");

    let fixtures = [
        Dashboard::new("u1", "cpu usage")
            .with_folder("infra")
            .with_tags(["prod"])
            .with_views(40)
            .with_updated_at(3_000),
        Dashboard::new("u2", "Billing")
            .with_folder("finance")
            .with_views(7)
            .with_updated_at(1_000),
        Dashboard::new("u3", "API latency")
            .with_folder("infra")
            .with_tags(["prod", "api"])
            .with_views(120)
            .with_updated_at(2_000),
        Dashboard::new("u4", "Billing")
            .with_folder("finance")
            .with_views(7)
            .with_updated_at(4_000),
    ];
    for dash in &fixtures {
        storage.insert_dashboard(dash).unwrap();
    }
    (tmp, storage)
}

fn uids(hits: &[dashboard_search::search::query::SearchHit]) -> Vec<&str> {
    hits.iter().map(|h| h.uid.as_str()).collect()
}

fn query(sort: &str) -> SearchQuery {
    SearchQuery {
        sort: Some(sort.to_string()),
        ..SearchQuery::default()
    }
}

#[test]
fn default_sort_is_alphabetical_case_insensitive() {
    let (_tmp, storage) = seeded_storage();
    let service = SearchService::from_config(Config::default());

    let hits = service.search(&storage, &SearchQuery::default()).unwrap();
    assert_eq!(uids(&hits), ["u3", "u2", "u4", "u1"]);
    assert!(hits.iter().all(|h| h.sort_meta.is_none()));
}

#[test]
fn alpha_desc_reverses_titles_and_breaks_ties_by_id() {
    let (_tmp, storage) = seeded_storage();
    let service = SearchService::from_config(Config::default());

    let hits = service.search(&storage, &query("alpha-desc")).unwrap();
    assert_eq!(uids(&hits), ["u1", "u2", "u4", "u3"]);
}

#[test]
fn views_desc_reports_view_counts() {
    let (_tmp, storage) = seeded_storage();
    let service = SearchService::from_config(Config::default());

    let hits = service.search(&storage, &query("views-desc")).unwrap();
    assert_eq!(uids(&hits), ["u3", "u1", "u2", "u4"]);
    assert_eq!(hits[0].sort_meta, Some(120));
    assert_eq!(hits[0].sort_meta_name.as_deref(), Some("total views"));
}

#[test]
fn updated_asc_orders_by_update_time() {
    let (_tmp, storage) = seeded_storage();
    let service = SearchService::from_config(Config::default());

    let hits = service.search(&storage, &query("updated-asc")).unwrap();
    assert_eq!(uids(&hits), ["u2", "u3", "u1", "u4"]);
}

#[test]
fn filters_combine_with_sorting() {
    let (_tmp, storage) = seeded_storage();
    let service = SearchService::from_config(Config::default());

    let q = SearchQuery {
        folder: Some("infra".into()),
        tags: vec!["prod".into()],
        ..query("views-asc")
    };
    let hits = service.search(&storage, &q).unwrap();
    assert_eq!(uids(&hits), ["u1", "u3"]);
    assert_eq!(hits[1].tags, ["api", "prod"]);

    let q = SearchQuery {
        query: "LAT".into(),
        ..SearchQuery::default()
    };
    assert_eq!(uids(&service.search(&storage, &q).unwrap()), ["u3"]);
}

#[test]
fn paging_walks_the_ordered_listing() {
    let (_tmp, storage) = seeded_storage();
    let service = SearchService::from_config(Config::default());

    let page = |n| SearchQuery {
        limit: 3,
        page: n,
        ..SearchQuery::default()
    };
    assert_eq!(uids(&service.search(&storage, &page(1)).unwrap()), ["u3", "u2", "u4"]);
    assert_eq!(uids(&service.search(&storage, &page(2)).unwrap()), ["u1"]);
}

#[test]
fn usage_options_absent_when_extension_disabled() {
    let (_tmp, storage) = seeded_storage();
    let mut config = Config::default();
    config.extensions.usage_insights = false;
    let service = SearchService::from_config(config);

    let err = service.search(&storage, &query("views-desc")).unwrap_err();
    assert_eq!(
        err.downcast_ref::<SearchError>(),
        Some(&SearchError::UnknownSortOption("views-desc".into()))
    );
}

#[test]
fn configured_default_sort_is_used() {
    let (_tmp, storage) = seeded_storage();
    let mut config = Config::default();
    config.search.default_sort = "updated-desc".into();
    let service = SearchService::from_config(config);

    let hits = service.search(&storage, &SearchQuery::default()).unwrap();
    assert_eq!(uids(&hits), ["u4", "u1", "u3", "u2"]);
    assert_eq!(hits[0].sort_meta, Some(4_000));
}
