use async_compression::tokio::write::GzipEncoder;
use defect_ingest::{
    ingest_path, ingest_reader, DefectIngestError, DefectSession, IngestOptions, SourceFormat,
    SourceMeta,
};
use std::{fs::File, io::Write};
use tokio::io::AsyncWriteExt;

const HEADER: &str = "Bug Title,Description,Steps To Reproduce,Actual Result,Expected Result,Feature,Found In,Test Case";

#[tokio::test]
async fn parses_gzip_csv_and_counts_records() -> anyhow::Result<()> {
    let mut csv = String::new();
    csv.push_str(HEADER);
    csv.push('\n');
    for i in 0..1_000 {
        csv.push_str(&format!(
            "Defect {i},\"Fails, sometimes\",\"1. open\n2. save\",Error,Saved,Auth,Prod,TC-{i}\n"
        ));
    }
    // trailing junk row
    csv.push_str("stray\n");

    let mut encoder = GzipEncoder::new(Vec::new());
    encoder.write_all(csv.as_bytes()).await?;
    encoder.shutdown().await?;
    let gz = encoder.into_inner();

    let dir = tempfile::tempdir()?;
    let gz_path = dir.path().join("defects.csv.gz");
    File::create(&gz_path)?.write_all(&gz)?;

    let ingested = ingest_path(&gz_path, &IngestOptions::default()).await?;

    assert_eq!(ingested.summary.format, SourceFormat::Csv);
    assert_eq!(ingested.summary.data_rows, 1_001);
    assert_eq!(ingested.summary.skipped, 1);
    assert_eq!(ingested.records.len(), 1_000);
    assert_eq!(ingested.records[0].description, "Fails, sometimes");
    assert_eq!(ingested.records[0].steps_to_reproduce, "1. open\n2. save");
    assert_eq!(ingested.records[999].id, "BUG-1000");
    assert_eq!(ingested.records[999].test_case_id, "TC-999");
    Ok(())
}

#[tokio::test]
async fn label_file_routes_to_block_parser() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("defects.txt");
    let mut f = File::create(&path)?;
    writeln!(f, "Subject: Login crash")?;
    writeln!(f, "Description: App crashes on login")?;
    writeln!(f, "Steps to reproduce: Open app, login")?;
    writeln!(f, "Actual result: Crash")?;
    writeln!(f, "Expected result: No crash")?;
    writeln!(f, "Feature: Auth")?;
    writeln!(f, "Origin: Prod")?;
    writeln!(f, "Test case: TC-9")?;
    writeln!(f, "-----")?;
    writeln!(f, "Subject: Slow search")?;
    writeln!(f, "Origin: QA")?;
    drop(f);

    let ingested = ingest_path(&path, &IngestOptions::default()).await?;

    assert_eq!(ingested.summary.format, SourceFormat::LabelBlocks);
    assert_eq!(ingested.records.len(), 2);
    assert_eq!(ingested.records[0].feature_tag, "Auth");
    assert_eq!(ingested.records[1].id, "BUG-2");
    assert_eq!(ingested.records[1].feature_tag, "Untagged");
    assert_eq!(ingested.records[1].bug_origin, "QA");
    Ok(())
}

#[tokio::test]
async fn crlf_upload_from_memory() -> anyhow::Result<()> {
    let raw: &'static [u8] = b"Title,Module,Env\r\nCrash,Auth,Prod\r\n\r\nHang,,\r\n";
    let ingested = ingest_reader(raw, SourceMeta::named("upload.csv"), &IngestOptions::default())
        .await?;

    assert_eq!(ingested.records.len(), 1);
    assert_eq!(ingested.summary.skipped, 1);
    assert_eq!(ingested.records[0].bug_origin, "Prod");
    Ok(())
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ingest_path(&dir.path().join("nope.csv"), &IngestOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DefectIngestError::Io(_)));
}

#[tokio::test]
async fn session_survives_a_bad_reupload() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let good = dir.path().join("good.csv");
    std::fs::write(&good, "Summary,Area\nCrash,Auth\nLeak,Core\n")?;
    let headers_only = dir.path().join("headers.csv");
    std::fs::write(&headers_only, "Summary,Area\n")?;

    let options = IngestOptions::default();
    let mut session = DefectSession::new();
    session.ingest_path(&good, &options).await?;
    assert_eq!(session.records().len(), 2);

    let err = session.ingest_path(&headers_only, &options).await.unwrap_err();
    assert!(matches!(err, DefectIngestError::EmptyFile));
    assert_eq!(session.records().len(), 2);
    assert_eq!(session.records()[1].subject, "Leak");
    Ok(())
}
