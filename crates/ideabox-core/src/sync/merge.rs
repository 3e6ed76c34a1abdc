//! Last-write-wins merge of the local and remote datasets.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Idea, IdeaId};

/// Result of [`merge_ideas`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Local order first, then remote-only records in remote order.
    pub merged: Vec<Idea>,
    /// Ids where the local copy is strictly newer than the remote one.
    pub to_upload: Vec<IdeaId>,
}

/// Merge by id, keeping the copy with the later `updated_at`.
///
/// Records taken from the remote side are marked not pending. On a tie the
/// local copy is kept and nothing is queued.
#[must_use]
pub fn merge_ideas(local: Vec<Idea>, remote: Vec<Idea>) -> MergeOutcome {
    let mut remote_order = Vec::with_capacity(remote.len());
    let mut remote_by_id: HashMap<IdeaId, Idea> = HashMap::with_capacity(remote.len());
    for idea in remote {
        match remote_by_id.get(&idea.id) {
            Some(seen) if seen.updated_at >= idea.updated_at => {}
            Some(_) => {
                remote_by_id.insert(idea.id.clone(), idea);
            }
            None => {
                remote_order.push(idea.id.clone());
                remote_by_id.insert(idea.id.clone(), idea);
            }
        }
    }

    let mut outcome = MergeOutcome {
        merged: Vec::with_capacity(local.len() + remote_by_id.len()),
        to_upload: Vec::new(),
    };

    for local_idea in local {
        let Some(remote_idea) = remote_by_id.remove(&local_idea.id) else {
            outcome.merged.push(local_idea);
            continue;
        };
        match remote_idea.updated_at.cmp(&local_idea.updated_at) {
            Ordering::Greater => outcome.merged.push(adopt(remote_idea)),
            Ordering::Less => {
                outcome.to_upload.push(local_idea.id.clone());
                outcome.merged.push(local_idea);
            }
            Ordering::Equal => outcome.merged.push(local_idea),
        }
    }

    for id in remote_order {
        if let Some(remote_idea) = remote_by_id.remove(&id) {
            outcome.merged.push(adopt(remote_idea));
        }
    }

    outcome
}

fn adopt(mut idea: Idea) -> Idea {
    idea.pending_sync = false;
    idea
}
