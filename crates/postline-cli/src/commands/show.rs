//! Show command - print a collection's requests.

use super::table;
use anyhow::Result;
use postline_core::config::load_collection;
use postline_core::Collection;
use std::path::Path;

pub async fn run(collection_file: &Path) -> Result<()> {
    let collection = load_collection(collection_file).await?;
    println!("{}", describe(&collection));
    Ok(())
}

/// Name, base URL and a requests table.
pub fn describe(collection: &Collection) -> String {
    let rows: Vec<Vec<String>> = collection
        .requests
        .iter()
        .map(|request| {
            let has_tests = request.tests.as_ref().is_some_and(|tests| !tests.is_empty());
            vec![
                request.name.clone(),
                request.method.to_string(),
                request.endpoint.clone(),
                if request.body.is_empty() { "No" } else { "Yes" }.to_string(),
                if has_tests { "Yes" } else { "No" }.to_string(),
            ]
        })
        .collect();

    format!(
        "{}\nBase URL: {}\n\nRequests\n{}",
        collection.name,
        collection.base_url,
        table(&["Name", "Method", "Endpoint", "Body", "Tests"], &rows)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use postline_core::{AssertionSet, Body, HttpMethod, RequestDefinition};
    use rstest::rstest;

    #[rstest]
    fn test_describe() {
        let collection = Collection::new(
            "Users API",
            "http://localhost:5000",
            vec![
                RequestDefinition::new("list", HttpMethod::Get, "/users").with_tests(AssertionSet {
                    status_code: Some(200),
                    ..AssertionSet::default()
                }),
                RequestDefinition::new("create", HttpMethod::Post, "/users")
                    .with_body(Body::Raw("{}".to_string())),
            ],
        )
        .unwrap();

        let text = describe(&collection);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Users API");
        assert_eq!(lines[1], "Base URL: http://localhost:5000");
        assert_eq!(lines[4], "Name    Method  Endpoint  Body  Tests");
        assert_eq!(lines[6], "list    GET     /users    No    Yes");
        assert_eq!(lines[7], "create  POST    /users    Yes   No");
    }
}
