//! Media API integration tests.
//!
//! Run with: `cargo test -p khmedia-api --test media_api_test`

mod helpers;

use axum::http::StatusCode;
use helpers::fixtures::{create_test_jpeg, media_form};
use helpers::{admin_path, bearer, setup_test_app, LOCAL_IP};
use serde_json::Value;

#[tokio::test]
async fn test_health() {
    let app = setup_test_app(false, "local").await;
    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["remote_storage"], false);
}

#[tokio::test]
async fn test_upload_to_remote_is_optimized_and_resolved() {
    let app = setup_test_app(true, "local").await;
    let client = app.client();

    let gallery = client
        .post(&admin_path("media"))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .multipart(media_form(&[("kind", "gallery"), ("title", "Annual Day")], None))
        .await;
    assert_eq!(gallery.status_code(), StatusCode::CREATED);
    let gallery_id = gallery.json::<Value>()["media"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = client
        .post(&admin_path("media"))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .multipart(media_form(
            &[
                ("kind", "gallery_image"),
                ("parent_id", &gallery_id),
                ("title", "Stage"),
            ],
            Some(("Stage Photo.JPG", create_test_jpeg(2400, 1600))),
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    let url = body["media"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with(
        "https://abc.supabase.co/storage/v1/object/public/gallery-images/stage-photo-"
    ));
    assert!(url.ends_with(".jpg"));
    assert!(body.get("warning").is_none());

    let uploads = app.remote.as_ref().unwrap().uploaded();
    assert_eq!(uploads.len(), 1);
    let stored = image::load_from_memory(&uploads[0].2).unwrap();
    assert!(stored.width() <= 1200 && stored.height() <= 800);

    let id = body["media"]["id"].as_str().unwrap();
    let fetched: Value = client.get(&format!("/media/{}", id)).await.json();
    assert_eq!(fetched["url"], url.as_str());

    // The gallery has no image of its own and shows its first photo
    let gallery: Value = client.get(&format!("/media/{}", gallery_id)).await.json();
    assert_eq!(gallery["url"], url.as_str());
}

#[tokio::test]
async fn test_remote_failure_saves_record_without_image() {
    let app = setup_test_app(true, "local").await;
    app.remote.as_ref().unwrap().set_failing(true);

    let response = app
        .client()
        .post(&admin_path("media"))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .multipart(media_form(
            &[("kind", "carousel_image"), ("title", "Welcome")],
            Some(("slide.jpg", create_test_jpeg(20, 10))),
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert!(body["media"]["url"].is_null());
    assert!(body["warning"].is_string());
    assert_eq!(app.state.media.repository().len().await, 1);
}

#[tokio::test]
async fn test_local_upload_and_delete_cleanup() {
    let app = setup_test_app(false, "local").await;
    let client = app.client();

    let response = client
        .post(&admin_path("media"))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .multipart(media_form(
            &[("kind", "branch_photo"), ("title", "Kadi Campus")],
            Some(("kadi.jpg", create_test_jpeg(20, 20))),
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    let url = body["media"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/branch_photos/kadi-"));
    let relative = url.trim_start_matches("/media/").to_string();
    assert!(app.local.exists(&relative).await);

    let id = body["media"]["id"].as_str().unwrap();
    let deleted = client
        .delete(&admin_path(&format!("media/{}", id)))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    let summary: Value = deleted.json();
    assert_eq!(summary["local_deleted"], 1);
    assert_eq!(summary["remote_deleted"], 0);

    assert!(!app.local.exists(&relative).await);
    assert_eq!(
        client.get(&format!("/media/{}", id)).await.status_code(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_delete_remote_record_removes_object_once() {
    let app = setup_test_app(true, "local").await;
    let client = app.client();

    let created: Value = client
        .post(&admin_path("media"))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .multipart(media_form(
            &[("kind", "carousel_image"), ("title", "Sports")],
            Some(("sports.jpg", create_test_jpeg(40, 20))),
        ))
        .await
        .json();
    let id = created["media"]["id"].as_str().unwrap();
    let (_, path, _) = app.remote.as_ref().unwrap().uploaded()[0].clone();

    let response = client
        .delete(&admin_path(&format!("media/{}", id)))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    assert_eq!(
        app.remote.as_ref().unwrap().deleted(),
        vec![("carousel-images".to_string(), path)]
    );
}

#[tokio::test]
async fn test_replace_image_removes_previous_object() {
    let app = setup_test_app(true, "remote").await;
    let client = app.client();

    let created: Value = client
        .post(&admin_path("media"))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .multipart(media_form(
            &[("kind", "celebration"), ("title", "Diwali")],
            Some(("diwali.jpg", create_test_jpeg(30, 30))),
        ))
        .await
        .json();
    let id = created["media"]["id"].as_str().unwrap();
    let old_url = created["media"]["url"].as_str().unwrap().to_string();

    let replaced = client
        .put(&admin_path(&format!("media/{}/image", id)))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .multipart(media_form(&[], Some(("lamps.jpg", create_test_jpeg(30, 30)))))
        .await;
    assert_eq!(replaced.status_code(), StatusCode::OK);

    let new_url = replaced.json::<Value>()["media"]["url"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(new_url, old_url);
    assert!(new_url.contains("/celebration-images/lamps-"));

    let deleted = app.remote.as_ref().unwrap().deleted();
    assert_eq!(deleted.len(), 1);
    assert!(old_url.ends_with(&deleted[0].1));
}

#[tokio::test]
async fn test_list_in_display_order() {
    let app = setup_test_app(false, "local").await;
    let client = app.client();

    for (title, order) in [("Third", "5"), ("First", "0"), ("Second", "2")] {
        let response = client
            .post(&admin_path("media"))
            .add_header("authorization", bearer())
            .add_header("x-forwarded-for", LOCAL_IP)
            .multipart(media_form(
                &[("kind", "carousel_image"), ("title", title), ("order", order)],
                None,
            ))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let items: Value = client.get("/media?kind=carousel_image").await.json();
    let titles: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn test_public_listing_filters() {
    let app = setup_test_app(false, "local").await;
    let client = app.client();

    let forms: [&[(&str, &str)]; 5] = [
        &[("kind", "carousel_image"), ("title", "Live"), ("active", "on")],
        &[("kind", "carousel_image"), ("title", "Draft"), ("active", "off")],
        &[("kind", "gallery"), ("title", "Sports Day"), ("category", "sports"), ("featured", "true")],
        &[("kind", "gallery"), ("title", "Science Fair"), ("category", "academic")],
        &[("kind", "celebration"), ("title", "Holi"), ("date", "2024-03-25")],
    ];
    for fields in forms {
        let response = client
            .post(&admin_path("media"))
            .add_header("authorization", bearer())
            .add_header("x-forwarded-for", LOCAL_IP)
            .multipart(media_form(fields, None))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let titles = |items: Value| -> Vec<String> {
        items
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["title"].as_str().unwrap().to_string())
            .collect()
    };

    let slides: Value = client.get("/media?kind=carousel_image").await.json();
    assert_eq!(titles(slides), vec!["Live"]);

    let featured: Value = client
        .get("/media?kind=gallery&featured=true&limit=3")
        .await
        .json();
    let featured = featured.as_array().unwrap().clone();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0]["title"], "Sports Day");
    assert_eq!(featured[0]["item_count"], 0);

    let academic: Value = client
        .get("/media?kind=gallery&category=academic")
        .await
        .json();
    assert_eq!(titles(academic), vec!["Science Fair"]);

    let all: Value = client.get("/media?kind=gallery&category=all").await.json();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let holi: Value = client.get("/media?kind=celebration").await.json();
    assert_eq!(holi[0]["date"], "2024-03-25T00:00:00Z");
    assert_eq!(holi[0]["category"], "festival");

    let response = client.get("/media?category=music").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_requests() {
    let app = setup_test_app(false, "local").await;
    let client = app.client();

    let response = client.get("/media?kind=poster").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = client
        .get(&format!("/media/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = client
        .post(&admin_path("media"))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .multipart(media_form(&[("kind", "gallery_image"), ("title", "Orphan")], None))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = client
        .post(&admin_path("media"))
        .add_header("authorization", bearer())
        .add_header("x-forwarded-for", LOCAL_IP)
        .multipart(media_form(
            &[("kind", "branch_photo"), ("title", "Doc")],
            Some(("notes.pdf", b"%PDF-1.4".to_vec())),
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
