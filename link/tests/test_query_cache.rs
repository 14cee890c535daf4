//! Query cache: de-duplication, per-argument entries, tag invalidation and
//! the keep-unused window.

mod common;

use common::{blog, doctor, envelope, harness, harness_with, list_envelope};
use medisite_link::endpoints::{banners, BLOGS, DOCTORS};
use medisite_link::models::{Blog, BlogInput, GalleryPageBanner};
use medisite_link::{CacheConfig, ListParams};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_concurrent_identical_queries_share_one_request() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/doctors"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_envelope(json!([doctor(1, "Dr. Alam")]), 1, 10, 1))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let params = ListParams::default();
    let endpoint = DOCTORS.list();
    let (a, b) = tokio::join!(h.api.query(&endpoint, &params), h.api.query(&endpoint, &params));

    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn test_fresh_entry_is_served_from_cache() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(doctor(1, "Dr. Alam"))))
        .expect(1)
        .mount(&h.server)
        .await;

    DOCTORS.fetch(&h.api, 1).await.unwrap();
    let again = DOCTORS.fetch(&h.api, 1).await.unwrap();
    assert_eq!(again.name, "Dr. Alam");
}

#[tokio::test]
async fn test_distinct_arguments_are_cached_separately() {
    let h = harness().await;
    for page in 1..=2u64 {
        Mock::given(method("GET"))
            .and(path("/api/blogs"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_envelope(
                json!([blog(page as i64, &format!("Post {}", page))]),
                12,
                10,
                page,
            )))
            .expect(1)
            .mount(&h.server)
            .await;
    }

    let first = BLOGS.fetch_list(&h.api, &ListParams::page(1)).await.unwrap();
    let second = BLOGS.fetch_list(&h.api, &ListParams::page(2)).await.unwrap();
    BLOGS.fetch_list(&h.api, &ListParams::page(1)).await.unwrap();

    assert_eq!(first.items[0].title, "Post 1");
    assert_eq!(second.items[0].title, "Post 2");
    assert_eq!(h.api.cached_len(), 2);
}

#[tokio::test]
async fn test_mutation_refetches_mounted_queries_only_for_its_tags() {
    let h = harness().await;

    // First load returns the old list, every later load the new one
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_envelope(json!([blog(1, "Old post")]), 1, 10, 1)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_envelope(
            json!([blog(2, "New post"), blog(1, "Old post")]),
            2,
            10,
            1,
        )))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_envelope(json!([]), 0, 10, 1)))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(blog(2, "New post"))))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut blogs = h.api.subscribe(&BLOGS.list(), &ListParams::default()).unwrap();
    let mut doctors = h.api.subscribe(&DOCTORS.list(), &ListParams::default()).unwrap();
    blogs.loaded().await.unwrap();
    doctors.loaded().await.unwrap();
    assert_eq!(blogs.page::<Blog>().unwrap().unwrap().items.len(), 1);

    BLOGS
        .create_record(&h.api, BlogInput::new("New post", "..."))
        .await
        .unwrap();

    // The refetch has completed by the time the mutation returns
    let page = blogs.page::<Blog>().unwrap().unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].title, "New post");
    assert!(!blogs.current().is_fetching);
}

#[tokio::test]
async fn test_mutation_during_first_load_refetches_mounted_query() {
    let h = harness().await;

    // The initial load is slow and answers with the list as it was before
    // the mutation
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_envelope(json!([blog(1, "Old post")]), 1, 10, 1))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_envelope(
            json!([blog(2, "New post"), blog(1, "Old post")]),
            2,
            10,
            1,
        )))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(blog(2, "New post"))))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut blogs = h.api.subscribe(&BLOGS.list(), &ListParams::default()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    BLOGS
        .create_record(&h.api, BlogInput::new("New post", "..."))
        .await
        .unwrap();

    assert_eq!(blogs.page::<Blog>().unwrap().unwrap().items.len(), 2);

    // The slow pre-mutation response lands afterwards and is dropped
    blogs.loaded().await.unwrap();
    assert_eq!(blogs.page::<Blog>().unwrap().unwrap().items.len(), 2);

    let later = BLOGS.fetch_list(&h.api, &ListParams::default()).await.unwrap();
    assert_eq!(later.items.len(), 2);

    let gets = h
        .server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.method.as_str() == "GET")
        .count();
    assert_eq!(gets, 2);
}

#[tokio::test]
async fn test_invalidated_unmounted_query_is_evicted_not_refetched() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(blog(5, "Before"))))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/blogs/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .expect(1)
        .mount(&h.server)
        .await;

    BLOGS.fetch(&h.api, 5).await.unwrap();
    BLOGS.delete_record(&h.api, 5).await.unwrap();
    assert!(h.api.cached(&BLOGS.get(), &5).is_none());

    // Next read goes back to the server
    BLOGS.fetch(&h.api, 5).await.unwrap();
}

#[tokio::test]
async fn test_subscribers_observe_refetched_data() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(blog(7, "Draft"))))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blogs/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(blog(7, "Published"))))
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/blogs/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(blog(7, "Published"))))
        .mount(&h.server)
        .await;

    let mut post = h.api.subscribe(&BLOGS.get(), &7).unwrap();
    let first = post.loaded().await.unwrap();
    assert_eq!(first.data["title"], "Draft");

    BLOGS
        .update_record(&h.api, 7, BlogInput::new("Published", "..."))
        .await
        .unwrap();

    let current: Blog = post.data().unwrap().unwrap();
    assert_eq!(current.title, "Published");
    // The snapshot held before the mutation is untouched
    assert_eq!(first.data["title"], "Draft");
}

#[tokio::test]
async fn test_keep_unused_window_retains_entry_after_unmount() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(doctor(3, "Dr. Karim"))))
        .expect(1)
        .mount(&h.server)
        .await;

    {
        let mut sub = h.api.subscribe(&DOCTORS.get(), &3).unwrap();
        sub.loaded().await.unwrap();
    }
    // Back-navigation inside the window does not refetch
    DOCTORS.fetch(&h.api, 3).await.unwrap();
}

#[tokio::test]
async fn test_expired_unused_entry_is_refetched() {
    let h = harness_with(CacheConfig::default().with_keep_unused_data_for(Duration::ZERO)).await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(doctor(3, "Dr. Karim"))))
        .expect(2)
        .mount(&h.server)
        .await;

    {
        let mut sub = h.api.subscribe(&DOCTORS.get(), &3).unwrap();
        sub.loaded().await.unwrap();
    }
    DOCTORS.fetch(&h.api, 3).await.unwrap();
}

#[tokio::test]
async fn test_failed_fetch_reaches_every_waiter() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/careers"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"message": "Server Error"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let endpoint = medisite_link::endpoints::CAREERS.list();
    let params = ListParams::default();
    let (a, b) = tokio::join!(h.api.query(&endpoint, &params), h.api.query(&endpoint, &params));
    assert_eq!(a.unwrap_err().status_code(), Some(500));
    assert_eq!(b.unwrap_err().status_code(), Some(500));
}

#[tokio::test]
async fn test_gallery_banner_is_exposed_as_single_record() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/gallery-page-banner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{
            "id": 1,
            "title": "Our Gallery",
            "image": "banners/gallery.jpg",
            "status": "active"
        }]))))
        .mount(&h.server)
        .await;

    let banner: GalleryPageBanner = banners::fetch_gallery_banner(&h.api)
        .await
        .unwrap()
        .expect("banner should be present");
    assert_eq!(banner.id, 1);
    assert_eq!(banner.title.as_deref(), Some("Our Gallery"));
}

#[tokio::test]
async fn test_reset_drops_everything() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(doctor(1, "Dr. Alam"))))
        .expect(2)
        .mount(&h.server)
        .await;

    DOCTORS.fetch(&h.api, 1).await.unwrap();
    h.api.reset();
    assert_eq!(h.api.cached_len(), 0);
    DOCTORS.fetch(&h.api, 1).await.unwrap();
}
