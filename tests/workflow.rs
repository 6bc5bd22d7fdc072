use std::io::{Cursor, Read};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageBuffer, Rgb};
use image_compressor_lib::commands;
use image_compressor_lib::{AppConfig, AppState, CompressOutcome, DirectorySink};
use zip::ZipArchive;

fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, ((x ^ y) & 0xff) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, 100);
    DynamicImage::ImageRgb8(img).write_with_encoder(encoder).unwrap();
    buffer.into_inner()
}

fn write_inputs(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let first = dir.join("first.jpg");
    let second = dir.join("second.jpg");
    std::fs::write(&first, gradient_jpeg(160, 120)).unwrap();
    std::fs::write(&second, gradient_jpeg(90, 200)).unwrap();
    vec![first, second]
}

#[tokio::test]
async fn drop_compress_and_save_each_file() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(input_dir.path());

    let state = AppState::new(AppConfig::default());
    assert!(commands::on_drop(&state, &inputs).await);
    assert!(commands::on_quality_change(&state, 60).await);

    let outcome = commands::on_compress(&state).await;
    let summary = match outcome {
        CompressOutcome::Completed(summary) => summary,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(summary.image_count, 2);
    assert!(summary.total_output_bytes <= summary.total_input_bytes);

    let compressed = state.compressed().await;
    assert_eq!(compressed[0].name(), "first.jpg");
    assert_eq!(compressed[1].name(), "second.jpg");

    let sink = DirectorySink::new(output_dir.path());
    for index in 0..compressed.len() {
        let path = commands::on_download_file(&state, index, &sink).await.unwrap();
        let saved = std::fs::read(&path).unwrap();
        assert_eq!(saved, compressed[index].bytes());
        assert!(image::load_from_memory(&saved).is_ok());
    }
}

#[tokio::test]
async fn bundle_contains_every_compressed_file() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(input_dir.path());

    let state = AppState::new(AppConfig::default());
    assert!(commands::on_files_selected(&state, &inputs).await);
    assert!(matches!(commands::on_compress(&state).await, CompressOutcome::Completed(_)));

    let sink = DirectorySink::new(output_dir.path());
    let path = commands::on_download_all(&state, &sink).await.unwrap();
    assert_eq!(path, output_dir.path().join("compressed-images.zip"));

    let compressed = state.compressed().await;
    let mut archive = ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);

    for file in &compressed {
        let mut entry = archive.by_name(file.name()).unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, file.bytes());
    }
}

#[tokio::test]
async fn corrupt_image_fails_the_whole_run() {
    let input_dir = tempfile::tempdir().unwrap();
    let mut inputs = write_inputs(input_dir.path());
    let broken = input_dir.path().join("broken.png");
    std::fs::write(&broken, b"not a png at all").unwrap();
    inputs.push(broken);

    let state = AppState::new(AppConfig::default());
    assert!(commands::on_drop(&state, &inputs).await);

    let outcome = commands::on_compress(&state).await;
    assert!(matches!(outcome, CompressOutcome::Failed(_)));
    assert!(state.compressed().await.is_empty());
    assert!(!state.is_processing());
    assert_eq!(state.pending().await.len(), 3);
}
