//! Create-to-update rewriting for bundle entries
//!
//! A bundle entry whose resource already carries an id but whose request is a
//! create (`POST`) would produce a duplicate on every reload. Rewriting it to
//! an update (`PUT {url}/{id}`) makes replaying the same file converge on the
//! same server state.

use crate::etl::Transformer;
use eyre::Result;
use serde_json::{Value, json};

/// Returns the rewritten entry when it needs to become an update
///
/// Pure: the input entry is never modified. Entries without a request, with a
/// non-create method, or whose resource has no non-empty string id yield
/// `None`.
pub fn rewrite_entry(entry: &Value) -> Option<Value> {
    let id = entry
        .pointer("/resource/id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())?;
    let request = entry.get("request")?;
    let method = request.get("method").and_then(Value::as_str)?;
    if !method.eq_ignore_ascii_case("POST") {
        return None;
    }

    let url = request.get("url").and_then(Value::as_str).unwrap_or_default();
    let target = format!("{}/{}", url.trim_end_matches('/'), id);

    let mut rewritten = entry.clone();
    rewritten["request"]["method"] = json!("PUT");
    rewritten["request"]["url"] = json!(target);
    Some(rewritten)
}

/// Transformer that rewrites every qualifying entry of a bundle
///
/// # Example
/// ```
/// use fhir_loader::transform::UpsertRewriter;
/// use fhir_loader::etl::Transformer;
/// use serde_json::json;
///
/// let bundle = json!({
///     "resourceType": "Bundle",
///     "entry": [{
///         "resource": {"resourceType": "Patient", "id": "42"},
///         "request": {"method": "POST", "url": "Patient"}
///     }]
/// });
///
/// let output = UpsertRewriter.transform(bundle).unwrap();
/// assert_eq!(output.rewritten, 1);
/// assert_eq!(output.bundle["entry"][0]["request"]["method"], "PUT");
/// assert_eq!(output.bundle["entry"][0]["request"]["url"], "Patient/42");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct UpsertRewriter;

/// A bundle after the upsert rewrite
#[derive(Clone, Debug, PartialEq)]
pub struct RewrittenBundle {
    pub bundle: Value,
    /// Entries turned from create into update
    pub rewritten: usize,
}

impl UpsertRewriter {
    /// Rewrite entries in place, returning how many changed
    pub fn rewrite_bundle(&self, bundle: &mut Value) -> usize {
        let Some(entries) = bundle.get_mut("entry").and_then(Value::as_array_mut) else {
            return 0;
        };

        let mut rewritten = 0;
        for entry in entries.iter_mut() {
            if let Some(updated) = rewrite_entry(entry) {
                *entry = updated;
                rewritten += 1;
            }
        }
        rewritten
    }
}

impl Transformer for UpsertRewriter {
    type Input = Value;
    type Output = RewrittenBundle;

    fn transform(&self, mut bundle: Self::Input) -> Result<Self::Output> {
        let rewritten = self.rewrite_bundle(&mut bundle);
        Ok(RewrittenBundle { bundle, rewritten })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: Option<&str>, method: &str) -> Value {
        let mut resource = json!({"resourceType": "Patient"});
        if let Some(id) = id {
            resource["id"] = json!(id);
        }
        json!({
            "fullUrl": "urn:uuid:1",
            "resource": resource,
            "request": {"method": method, "url": "Patient"}
        })
    }

    #[test]
    fn test_create_with_id_becomes_update() {
        let output = rewrite_entry(&entry(Some("42"), "POST")).unwrap();
        assert_eq!(output["request"]["method"], "PUT");
        assert_eq!(output["request"]["url"], "Patient/42");
        assert_eq!(output["fullUrl"], "urn:uuid:1");
        assert_eq!(output["resource"]["id"], "42");
    }

    #[test]
    fn test_create_without_id_unchanged() {
        assert!(rewrite_entry(&entry(None, "POST")).is_none());
        assert!(rewrite_entry(&entry(Some(""), "POST")).is_none());
    }

    #[test]
    fn test_other_methods_unchanged() {
        assert!(rewrite_entry(&entry(Some("42"), "PUT")).is_none());
        assert!(rewrite_entry(&entry(Some("42"), "DELETE")).is_none());
    }

    #[test]
    fn test_lowercase_post_rewritten() {
        let output = rewrite_entry(&entry(Some("7"), "post")).unwrap();
        assert_eq!(output["request"]["method"], "PUT");
        assert_eq!(output["request"]["url"], "Patient/7");
    }

    #[test]
    fn test_entry_without_request_unchanged() {
        let entry = json!({"resource": {"resourceType": "Patient", "id": "1"}});
        assert!(rewrite_entry(&entry).is_none());
    }

    #[test]
    fn test_rewrite_bundle_counts_changes() {
        let mut bundle = json!({
            "resourceType": "Bundle",
            "type": "transaction",
            "entry": [entry(Some("1"), "POST"), entry(None, "POST"), entry(Some("3"), "PUT")]
        });

        assert_eq!(UpsertRewriter.rewrite_bundle(&mut bundle), 1);
        assert_eq!(bundle["entry"][0]["request"]["url"], "Patient/1");
        assert_eq!(bundle["entry"][1]["request"]["method"], "POST");
        assert_eq!(bundle["entry"][2]["request"]["url"], "Patient");
    }

    #[test]
    fn test_bundle_without_entries() {
        let mut bundle = json!({"resourceType": "Bundle", "type": "transaction"});
        assert_eq!(UpsertRewriter.rewrite_bundle(&mut bundle), 0);
        let output = UpsertRewriter.transform(bundle.clone()).unwrap();
        assert_eq!(output.rewritten, 0);
        assert_eq!(output.bundle, bundle);
    }

    #[test]
    fn test_rewrite_keeps_decimals_and_key_order() {
        let raw = r#"{"resourceType":"Bundle","entry":[{"resource":{"resourceType":"Observation","id":"o1","valueQuantity":{"value":1.50}},"request":{"method":"POST","url":"Observation"}}]}"#;
        let bundle: Value = serde_json::from_str(raw).unwrap();

        let output = UpsertRewriter.transform(bundle).unwrap();
        assert_eq!(output.rewritten, 1);
        assert_eq!(
            serde_json::to_string(&output.bundle).unwrap(),
            raw.replace(r#""method":"POST","url":"Observation""#, r#""method":"PUT","url":"Observation/o1""#)
        );
    }
}
