use std::path::Path;

use serde::Serialize;

use crate::commands::common::open_store;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct TagItem {
    tag: String,
    count: usize,
}

pub async fn run_tags(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let store = open_store(db_path).await?;
    let tags = store.list_tags().await?;

    if as_json {
        let items = tags
            .into_iter()
            .map(|(tag, count)| TagItem { tag, count })
            .collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for (tag, count) in tags {
            println!("#{tag:<24} {count}");
        }
    }

    Ok(())
}
