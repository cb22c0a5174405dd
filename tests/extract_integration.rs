//! Integration tests for extraction into per-kind NDJSON files

use eyre::Result;
use fhir_loader::cli::extract_resources;
use fhir_loader::storage::NdjsonReader;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_search_bundle_fans_out_by_type() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/Patient"))
        .and(query_param("_include", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "1"}},
                {"resource": {"resourceType": "Organization", "id": "org"}},
                {"resource": {"resourceType": "Patient", "id": "2"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let out = temp.path().join("resources");
    let base = format!("{}/fhir", server.uri());

    let count = extract_resources(&out, &base, "Patient?_include=*").await?;
    assert_eq!(count, 3);

    let patients = NdjsonReader::new(out.join("Patient.ndjson")).read()?;
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[0]["id"], "1");
    let orgs = NdjsonReader::new(out.join("Organization.ndjson")).read()?;
    assert_eq!(orgs, vec![json!({"resourceType": "Organization", "id": "org"})]);
    Ok(())
}

#[tokio::test]
async fn test_single_resource_written_to_its_type_file() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "CapabilityStatement",
            "status": "active"
        })))
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let base = format!("{}/fhir", server.uri());

    assert_eq!(extract_resources(temp.path(), &base, "metadata").await?, 1);
    assert!(temp.path().join("CapabilityStatement.ndjson").exists());

    // Reads carry no upload headers
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("x-upsert-extistence-check").is_none());
    assert!(requests[0].headers.get("content-type").is_none());
    Ok(())
}

#[tokio::test]
async fn test_empty_bundle_writes_nothing() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"resourceType": "Bundle", "type": "searchset", "total": 0})),
        )
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let out = temp.path().join("resources");
    let base = format!("{}/fhir", server.uri());

    assert_eq!(extract_resources(&out, &base, "Questionnaire").await?, 0);
    assert!(!out.exists());
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_reported() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Unknown resource type"))
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let base = format!("{}/fhir", server.uri());

    let err = extract_resources(temp.path(), &base, "Nope").await.unwrap_err();
    assert!(err.to_string().contains("404"));
    Ok(())
}
