mod common;

use std::io::Cursor;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::json;

use common::{data, error, TestApp};

fn jpeg_bytes() -> Result<Vec<u8>> {
    let img = image::RgbImage::from_pixel(10, 10, image::Rgb([120, 80, 40]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg)?;
    Ok(buf.into_inner())
}

async fn upload(app: &TestApp, token: &str, id: i64, bytes: Vec<u8>) -> Result<reqwest::Response> {
    let form = Form::new().part("image", Part::bytes(bytes).file_name("upload.jpg"));
    Ok(app
        .client
        .post(app.url(&format!("/recipe/recipes/{}/upload-image", id)))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await?)
}

#[tokio::test]
async fn upload_image_to_recipe() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("test@example.com").await?;
    let id = app.create_recipe(&token, json!({})).await?["id"].as_i64().unwrap_or_default();

    let bytes = jpeg_bytes()?;
    let res = upload(&app, &token, id, bytes.clone()).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = data(res).await?;
    assert_eq!(body["id"], id);
    let image = body["image"].as_str().unwrap_or_default().to_string();
    assert!(image.starts_with("/media/uploads/recipe/"), "{}", image);
    assert!(image.ends_with(".jpg"), "{}", image);

    // Written under the media root and served back
    let relative = image.trim_start_matches("/media/");
    assert!(app.media.path().join(relative).exists());

    let res = app.client.get(app.url(&image)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.bytes().await?.to_vec(), bytes);

    // Detail view carries the reference
    let detail = data(app.get(&token, &format!("/recipe/recipes/{}", id)).await?).await?;
    assert_eq!(detail["image"], image.as_str());
    Ok(())
}

#[tokio::test]
async fn upload_image_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("test@example.com").await?;
    let id = app.create_recipe(&token, json!({})).await?["id"].as_i64().unwrap_or_default();

    let res = upload(&app, &token, id, b"notimage".to_vec()).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = error(res).await?;
    assert_eq!(
        body["field_errors"]["image"],
        "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
    );

    // Missing field
    let form = Form::new().text("title", "no image here");
    let res = app
        .client
        .post(app.url(&format!("/recipe/recipes/{}/upload-image", id)))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(error(res).await?["field_errors"]["image"].is_string());
    Ok(())
}

#[tokio::test]
async fn replacing_and_deleting_remove_old_files() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("test@example.com").await?;
    let id = app.create_recipe(&token, json!({})).await?["id"].as_i64().unwrap_or_default();

    let first = data(upload(&app, &token, id, jpeg_bytes()?).await?).await?;
    let first_path = app
        .media
        .path()
        .join(first["image"].as_str().unwrap_or_default().trim_start_matches("/media/"));
    assert!(first_path.exists());

    let second = data(upload(&app, &token, id, jpeg_bytes()?).await?).await?;
    let second_path = app
        .media
        .path()
        .join(second["image"].as_str().unwrap_or_default().trim_start_matches("/media/"));
    assert!(!first_path.exists());
    assert!(second_path.exists());

    let res = app.delete(&token, &format!("/recipe/recipes/{}", id)).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(!second_path.exists());
    Ok(())
}

#[tokio::test]
async fn upload_to_other_users_recipe_is_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.login("owner@example.com").await?;
    let intruder = app.login("intruder@example.com").await?;
    let id = app.create_recipe(&owner, json!({})).await?["id"].as_i64().unwrap_or_default();

    let res = upload(&app, &intruder, id, jpeg_bytes()?).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn concurrent_uploads_leave_one_file() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("test@example.com").await?;
    let id = app.create_recipe(&token, json!({})).await?["id"].as_i64().unwrap_or_default();
    let bytes = jpeg_bytes()?;

    for _ in 0..20 {
        let (a, b, c, d) = tokio::join!(
            upload(&app, &token, id, bytes.clone()),
            upload(&app, &token, id, bytes.clone()),
            upload(&app, &token, id, bytes.clone()),
            upload(&app, &token, id, bytes.clone()),
        );
        for res in [a?, b?, c?, d?] {
            assert_eq!(res.status(), StatusCode::OK);
        }

        let stored: Vec<_> = std::fs::read_dir(app.media.path().join("uploads/recipe"))?
            .collect::<std::io::Result<_>>()?;
        assert_eq!(stored.len(), 1);

        let detail = data(app.get(&token, &format!("/recipe/recipes/{}", id)).await?).await?;
        let image = detail["image"].as_str().unwrap_or_default();
        assert!(app.media.path().join(image.trim_start_matches("/media/")).exists());
    }
    Ok(())
}
