//! Listing commands.

use crate::Format;
use serde::Serialize;
use vellum_core::VersionStore;

/// Version listing for one document.
#[derive(Debug, Serialize)]
pub struct HistoryResult {
    /// Document id.
    pub doc: String,
    /// Version keys in sorted order.
    pub versions: Vec<String>,
}

/// Prints every document id.
pub async fn docs(store: &VersionStore, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let docs: Vec<String> = store
        .docs()
        .await?
        .into_iter()
        .map(|doc| doc.into_string())
        .collect();

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&docs)?),
        Format::Text => docs.iter().for_each(|doc| println!("{doc}")),
    }
    Ok(())
}

/// Prints the version keys of `doc`.
pub async fn history(
    store: &VersionStore,
    doc: String,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let versions = store
        .history(doc.as_str())
        .await?
        .into_iter()
        .map(|key| key.into_string())
        .collect();
    let result = HistoryResult { doc, versions };

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text => print_text_output(&result),
    }
    Ok(())
}

fn print_text_output(result: &HistoryResult) {
    if result.versions.is_empty() {
        eprintln!("no versions for {}", result.doc);
    }
    for key in &result.versions {
        println!("{key}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_json_shape() {
        let result = HistoryResult {
            doc: "alpha".into(),
            versions: vec!["alpha@01".into(), "alpha@02^01".into()],
        };

        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["doc"], "alpha");
        assert_eq!(json["versions"][1], "alpha@02^01");
    }
}
