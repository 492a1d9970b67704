use httpmock::prelude::*;
use rust_xlsxwriter::{Format, Workbook};
use sku_image_etl::adapters::sheet::{decode_sheet, SheetFormat};
use sku_image_etl::domain::model::Cell;
use sku_image_etl::{
    CloudinaryUploader, Credentials, DeliveryUrlBuilder, EnrichPipeline, EtlEngine, HttpImageFetcher,
    LocalStorage, Settings,
};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const TRANSFORM: &str = "c_pad,w_800,h_800,b_white,f_auto,q_auto,dpr_auto";

fn engine(
    dir: &Path,
    server: &MockServer,
    settings: Settings,
) -> EtlEngine<EnrichPipeline<LocalStorage, HttpImageFetcher, CloudinaryUploader>> {
    let credentials = Credentials::new("demo", "123456", "abcd");
    let fetcher = HttpImageFetcher::new(Duration::from_secs(5)).unwrap();
    let delivery = DeliveryUrlBuilder::new(
        &settings.delivery_base_url,
        &credentials.cloud_name,
        &settings.transform,
    );
    let uploader = CloudinaryUploader::new(
        credentials,
        &server.base_url(),
        settings.folder.clone(),
        Duration::from_secs(5),
    )
    .unwrap();

    EtlEngine::new(EnrichPipeline::new(
        LocalStorage::new(dir),
        fetcher,
        uploader,
        delivery,
        settings,
    ))
}

fn settings(input: &str, output: &str) -> Settings {
    Settings {
        input_path: input.to_string(),
        output_path: output.to_string(),
        throttle: Duration::ZERO,
        ..Settings::default()
    }
}

#[tokio::test]
async fn test_end_to_end_csv_to_xlsx() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let shoe = server.mock(|when, then| {
        when.method(GET)
            .path("/img/shoe.jpg")
            .header("Referer", "https://shop.example.com/shoe");
        then.status(200)
            .header("Content-Type", "image/jpeg")
            .body(vec![0xFF, 0xD8, 0xFF, 0xE0]);
    });
    let missing = server.mock(|when, then| {
        when.method(GET).path("/img/gone.jpg");
        then.status(404);
    });
    let upload = server.mock(|when, then| {
        when.method(POST)
            .path("/v1_1/demo/image/upload")
            .body_contains("public_id=red-shoe")
            .body_contains("file=data%3Aimage%2Fjpeg%3Bbase64%2C");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "public_id": "red-shoe",
                "version": 1712345678,
                "format": "jpg",
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1712345678/red-shoe.jpg"
            }));
    });

    let csv = format!(
        "SKU,Image,Image Alt Text,Product Name,Starting Url\n\
         501,{},Red Shoe,Shoe,https://shop.example.com/shoe\n\
         502,{},,Gone Part,\n",
        server.url("/img/shoe.jpg"),
        server.url("/img/gone.jpg"),
    );
    std::fs::write(temp_dir.path().join("source.csv"), csv).unwrap();

    let report = engine(temp_dir.path(), &server, settings("source.csv", "final_output.xlsx"))
        .run()
        .await
        .unwrap();

    shoe.assert();
    missing.assert();
    upload.assert_hits(1);
    assert_eq!(report.summary.attempted, 2);
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.output_path, "final_output.xlsx");

    let data = std::fs::read(temp_dir.path().join("final_output.xlsx")).unwrap();
    let out = decode_sheet(&data, SheetFormat::Workbook, Some("Sheet1")).unwrap();

    assert_eq!(out.rows.len(), 2);
    assert_eq!(
        &*out.columns,
        [
            "SKU",
            "Image",
            "Image Alt Text",
            "Product Name",
            "Starting Url",
            "Variant SKU",
            "Image Src"
        ]
        .map(String::from)
        .as_slice()
    );
    let src = out.rows[0].get("Image Src").unwrap();
    assert!(src.contains(TRANSFORM));
    assert!(src.contains("red-shoe"));
    assert_eq!(out.rows[0].get("Variant SKU"), Some("501"));
    assert_eq!(out.rows[1].get("Image Src"), Some(""));
    assert_eq!(out.rows[1].get("Variant SKU"), Some("502"));
}

#[tokio::test]
async fn test_upload_rejection_keeps_row_and_continues() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path_contains("/img/");
        then.status(200).header("Content-Type", "image/png").body("png");
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1_1/demo/image/upload")
            .body_contains("public_id=bad-part");
        then.status(400)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"error": {"message": "Invalid image file"}}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1_1/demo/image/upload")
            .body_contains("public_id=good-part");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"public_id": "catalog/good-part", "version": 3, "format": "png"}));
    });

    let csv = format!(
        "SKU,Image,Product Name\nB-1,{},Bad Part\nG-1,{},Good Part\n",
        server.url("/img/bad.png"),
        server.url("/img/good.png"),
    );
    std::fs::write(temp_dir.path().join("parts.csv"), csv).unwrap();

    let settings = Settings {
        failure_marker: Some("UPLOAD FAILED".to_string()),
        ..settings("parts.csv", "out/parts_out.csv")
    };
    let report = engine(temp_dir.path(), &server, settings).run().await.unwrap();

    assert_eq!(report.summary.attempted, 2);
    assert_eq!(report.summary.succeeded, 1);

    let data = std::fs::read(temp_dir.path().join("out/parts_out.csv")).unwrap();
    let out = decode_sheet(&data, SheetFormat::Csv, None).unwrap();
    assert_eq!(out.rows[0].get("Image Src"), Some("UPLOAD FAILED"));
    assert_eq!(
        out.rows[1].get("Image Src"),
        Some(format!("https://res.cloudinary.com/demo/image/upload/{}/v3/catalog/good-part.png", TRANSFORM).as_str())
    );
}

#[tokio::test]
async fn test_workbook_cell_types_survive_run() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/img/saw.jpg");
        then.status(200).header("Content-Type", "image/jpeg").body("jpg");
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1_1/demo/image/upload");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"public_id": "chain-saw", "version": 5, "format": "jpg"}));
    });

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in ["SKU", "Image", "Product Name", "Launched", "In Stock", "Price"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    sheet.write_number(1, 0, 501.0).unwrap();
    sheet.write_string(1, 1, server.url("/img/saw.jpg")).unwrap();
    sheet.write_string(1, 2, "Chain Saw").unwrap();
    sheet
        .write_number_with_format(1, 3, 45366.0, &Format::new().set_num_format("yyyy-mm-dd"))
        .unwrap();
    sheet.write_boolean(1, 4, false).unwrap();
    sheet.write_number(1, 5, 349.95).unwrap();
    std::fs::write(temp_dir.path().join("source.xlsx"), workbook.save_to_buffer().unwrap()).unwrap();

    let report = engine(temp_dir.path(), &server, settings("source.xlsx", "final_output.xlsx"))
        .run()
        .await
        .unwrap();
    assert_eq!(report.summary.succeeded, 1);

    let data = std::fs::read(temp_dir.path().join("final_output.xlsx")).unwrap();
    let out = decode_sheet(&data, SheetFormat::Workbook, None).unwrap();
    let row = &out.rows[0];
    assert_eq!(row.cell("SKU"), Some(&Cell::Number(501.0)));
    assert_eq!(row.cell("Launched"), Some(&Cell::DateTime(45366.0)));
    assert_eq!(row.cell("In Stock"), Some(&Cell::Bool(false)));
    assert_eq!(row.cell("Price"), Some(&Cell::Number(349.95)));
    assert_eq!(row.cell("Variant SKU"), Some(&Cell::Number(501.0)));
    assert_eq!(
        row.get("Image Src"),
        Some(format!("https://res.cloudinary.com/demo/image/upload/{}/v5/chain-saw.jpg", TRANSFORM).as_str())
    );
}

#[tokio::test]
async fn test_missing_input_file_fails_run() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let result = engine(temp_dir.path(), &server, settings("absent.xlsx", "out.xlsx"))
        .run()
        .await;

    assert!(result.is_err());
    assert!(!temp_dir.path().join("out.xlsx").exists());
}

#[test]
fn test_binary_aborts_without_credentials() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("source.csv"), "SKU,Image\n1,http://127.0.0.1:1/a.jpg\n")?;

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_sku-image-etl"))
        .current_dir(temp_dir.path())
        .args(["--input", "source.csv", "--output", "out.csv"])
        .env_remove("CLOUD_NAME")
        .env_remove("CLOUD_API_KEY")
        .env_remove("CLOUD_API_SECRET")
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    for var in ["CLOUD_NAME", "CLOUD_API_KEY", "CLOUD_API_SECRET"] {
        assert!(stderr.contains(var), "stderr should name {var}: {stderr}");
    }
    assert!(!temp_dir.path().join("out.csv").exists());
    Ok(())
}
