use claimflow_core::ClaimflowError;
use claimflow_llm::BedrockClient;

#[test]
fn builder_defaults_to_regional_endpoint() {
    let client = BedrockClient::builder().build().unwrap();
    assert_eq!(
        client.base_url(),
        "https://bedrock-runtime.us-east-1.amazonaws.com/"
    );

    let client = BedrockClient::builder().region("eu-west-1").build().unwrap();
    assert_eq!(
        client.base_url(),
        "https://bedrock-runtime.eu-west-1.amazonaws.com/"
    );
}

#[test]
fn builder_rejects_empty_region_and_endpoint() {
    let err = BedrockClient::builder().region("  ").build().unwrap_err();
    assert!(matches!(err, ClaimflowError::InvalidConfig(_)));

    let err = BedrockClient::builder().endpoint("").build().unwrap_err();
    assert!(matches!(err, ClaimflowError::InvalidConfig(_)));

    let err = BedrockClient::builder()
        .endpoint("not a url")
        .build()
        .unwrap_err();
    assert!(matches!(err, ClaimflowError::InvalidConfig(_)));
}

#[test]
fn debug_output_redacts_token() {
    let builder = BedrockClient::builder().bearer_token("super-secret");
    assert!(!format!("{builder:?}").contains("super-secret"));

    let client = builder.build().unwrap();
    let debug = format!("{client:?}");
    assert!(debug.contains("<redacted>"));
    assert!(!debug.contains("super-secret"));
}

#[test]
fn whitespace_token_is_treated_as_missing() {
    let client = BedrockClient::builder()
        .bearer_token(" \t ")
        .build()
        .unwrap();
    assert!(format!("{client:?}").contains("<none>"));
}
