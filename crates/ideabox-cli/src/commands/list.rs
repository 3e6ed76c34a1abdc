use std::path::Path;

use crate::commands::common::{format_idea_lines, idea_to_list_item, open_store, IdeaListItem};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    tag: Option<&str>,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let store = open_store(db_path).await?;
    let ideas = match tag {
        Some(tag_name) => store.list_by_tag(tag_name, limit).await?,
        None => store.list_ideas(limit, 0).await?,
    };

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
