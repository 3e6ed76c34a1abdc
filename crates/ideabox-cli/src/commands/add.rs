use std::path::Path;

use ideabox_core::models::{extract_tags, MediaIdea, ProjectIdea};
use ideabox_core::util::normalize_text_option;
use ideabox_core::{Idea, LocalStore};

use crate::cli::AddCommands;
use crate::commands::common::{open_store, resolve_note_content};
use crate::error::CliError;

pub async fn run_add(kind: AddCommands, db_path: &Path) -> Result<(), CliError> {
    let idea = build_idea(kind)?;
    save_new_idea(&idea, db_path).await
}

pub async fn run_quick_note(content_parts: &[String], db_path: &Path) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    save_new_idea(&note_idea(&content, &[]), db_path).await
}

async fn save_new_idea(idea: &Idea, db_path: &Path) -> Result<(), CliError> {
    idea.validate()?;
    let store = open_store(db_path).await?;
    store.upsert_idea(idea).await?;

    println!("{}", idea.id);
    Ok(())
}

/// Note with explicit tags plus any #hashtags found in the text.
pub fn note_idea(content: &str, tags: &[String]) -> Idea {
    let mut all_tags = tags.to_vec();
    all_tags.extend(extract_tags(content));
    Idea::note(content).with_tags(all_tags)
}

pub fn build_idea(kind: AddCommands) -> Result<Idea, CliError> {
    let idea = match kind {
        AddCommands::Note { content, tags } => {
            let content = resolve_note_content(&content)?;
            note_idea(&content, &tags)
        }
        AddCommands::Media {
            title,
            media_type,
            recommender,
            reason,
            url,
            rating,
            status,
            tags,
        } => {
            let mut media = MediaIdea::new(title.trim(), media_type.into());
            media.recommender = normalize_text_option(recommender);
            media.reason = normalize_text_option(reason);
            media.url = normalize_text_option(url);
            media.rating = rating;
            media.status = status.into();
            Idea::media(media).with_tags(tags)
        }
        AddCommands::Project {
            title,
            interest,
            description,
            effort,
            deadline,
            resources,
            collaborators,
            tags,
        } => {
            let mut project = ProjectIdea::new(title.trim(), interest);
            project.description = normalize_text_option(description);
            project.effort = effort.map(Into::into);
            project.deadline = deadline;
            project.resources = non_empty(resources);
            project.collaborators = non_empty(collaborators);
            Idea::project(project).with_tags(tags)
        }
    };
    Ok(idea)
}

fn non_empty(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|value| normalize_text_option(Some(value)))
        .collect()
}
