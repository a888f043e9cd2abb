mod support;

use std::sync::Arc;

use claimflow_core::ClaimflowError;
use claimflow_pipeline::{DocumentPipeline, StageModels};
use claimflow_runner::LocalRunner;
use support::ScriptedInvoker;

fn runner() -> LocalRunner {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .reply("u", "understood")
            .reply("e", "{\"policy_number\": \"P-1\"}")
            .reply("s", "short summary"),
    );
    let models = StageModels {
        understanding: "u".to_string(),
        extraction: "e".to_string(),
        summary: "s".to_string(),
    };
    LocalRunner::new(DocumentPipeline::new(invoker, models).expect("pipeline"))
}

#[tokio::test]
async fn writes_indented_json_with_source_details() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("claim.txt");
    let output = dir.path().join("claim.json");
    tokio::fs::write(&input, "Policy P-1 — théft").await.expect("write input");

    let processed = runner()
        .run(&input, Some(&output))
        .await
        .expect("run");
    assert_eq!(processed.source_document.size, "Policy P-1 — théft".chars().count());
    assert_eq!(processed.result.summary, "short summary");

    let written = tokio::fs::read_to_string(&output).await.expect("output");
    assert!(written.contains("\n  \""), "expected indented JSON: {written}");
    let json: serde_json::Value = serde_json::from_str(&written).expect("json");
    assert_eq!(json["source_document"]["path"], input.display().to_string());
    assert_eq!(json["document_understanding"], "understood");
    assert_eq!(json["extracted_information"]["policy_number"], "P-1");
    assert_eq!(json["processing_metadata"]["models_used"]["summary"], "s");
}

#[tokio::test]
async fn without_output_path_nothing_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("claim.txt");
    tokio::fs::write(&input, "text").await.expect("write input");

    let processed = runner().run(&input, None).await.expect("run");
    let json = processed.to_pretty_json().expect("json");
    assert!(json.contains("\"summary\": \"short summary\""));

    let mut entries = tokio::fs::read_dir(dir.path()).await.expect("read dir");
    let mut count = 0;
    while entries.next_entry().await.expect("entry").is_some() {
        count += 1;
    }
    assert_eq!(count, 1);
}

#[tokio::test]
async fn non_utf8_input_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("claim.bin");
    tokio::fs::write(&input, [0xff_u8, 0xfe, 0x00]).await.expect("write input");

    let err = runner().run(&input, None).await.unwrap_err();
    assert!(matches!(err, ClaimflowError::InvalidDocument(_)));
}

#[tokio::test]
async fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = runner()
        .run(&dir.path().join("absent.txt"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimflowError::Io(_)));
}
