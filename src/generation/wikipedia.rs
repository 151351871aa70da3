//! Introductory extracts from Wikipedia, used to ground topic prompts.

use reqwest::Client;
use serde_json::Value;

const ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Fetch the plain-text introduction of the article titled `topic`.
///
/// Returns `Ok(None)` when the article does not exist or has no extract.
pub async fn fetch_intro(http: &Client, topic: &str) -> Result<Option<String>, reqwest::Error> {
    let body: Value = http
        .get(ENDPOINT)
        .query(&[
            ("action", "query"),
            ("format", "json"),
            ("prop", "extracts"),
            ("exintro", "1"),
            ("explaintext", "1"),
            ("redirects", "1"),
            ("titles", topic),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(first_extract(&body))
}

/// The first non-empty page extract in a `query` API response.
pub fn first_extract(body: &Value) -> Option<String> {
    body.get("query")?
        .get("pages")?
        .as_object()?
        .values()
        .filter_map(|page| page.get("extract")?.as_str())
        .map(str::trim)
        .find(|extract| !extract.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_first_extract() {
        let body = json!({
            "batchcomplete": "",
            "query": {
                "pages": {
                    "23862": {
                        "pageid": 23862,
                        "title": "Rust (programming language)",
                        "extract": "Rust is a general-purpose programming language.\n"
                    }
                }
            }
        });
        assert_eq!(
            first_extract(&body).as_deref(),
            Some("Rust is a general-purpose programming language.")
        );
    }

    #[test]
    fn test_missing_page() {
        let body = json!({
            "query": { "pages": { "-1": { "ns": 0, "title": "Qwzxy", "missing": "" } } }
        });
        assert!(first_extract(&body).is_none());
        assert!(first_extract(&json!({})).is_none());
    }
}
