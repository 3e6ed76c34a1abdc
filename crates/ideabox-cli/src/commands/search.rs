use std::path::Path;

use crate::commands::common::{
    format_idea_lines, idea_to_list_item, normalize_search_query, open_store, IdeaListItem,
};
use crate::error::CliError;

pub async fn run_search(
    query: &str,
    limit: usize,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let store = open_store(db_path).await?;
    let ideas = store.search(&normalized_query, limit).await?;

    if as_json {
        let json_items = ideas
            .iter()
            .map(idea_to_list_item)
            .collect::<Vec<IdeaListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_idea_lines(&ideas) {
            println!("{line}");
        }
    }

    Ok(())
}
