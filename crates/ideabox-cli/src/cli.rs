use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use ideabox_core::models::{MediaStatus, MediaType, ProjectEffort};

#[derive(Parser)]
#[command(name = "ideabox")]
#[command(about = "Capture recommendations, project ideas and notes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Quick capture: ideabox "my thought here"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a new idea
    #[command(alias = "new")]
    Add {
        #[command(subcommand)]
        kind: AddCommands,
    },
    /// List recent ideas
    List {
        /// Number of ideas to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Filter ideas by tag name
        #[arg(long)]
        tag: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search ideas
    Search {
        /// Search query
        query: String,
        /// Number of ideas to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tags with usage counts
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an idea and its attachments
    Delete {
        /// Idea ID or unique ID prefix
        id: String,
    },
    /// Attach a file to an idea
    Attach {
        /// Idea ID or unique ID prefix
        id: String,
        /// File to attach
        file: PathBuf,
        /// MIME type (guessed from the file name when omitted)
        #[arg(long)]
        mime: Option<String>,
    },
    /// Sync ideas and attachments with the configured sync folders
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show sync providers and pending changes
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AddCommands {
    /// A freeform note; #hashtags in the text become tags
    Note {
        /// Note content (read from stdin when omitted)
        content: Vec<String>,
        /// Tag to apply (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// A book, movie, show or other recommendation
    Media {
        #[arg(long)]
        title: String,
        #[arg(long, value_enum)]
        media_type: MediaTypeArg,
        /// Who recommended it
        #[arg(long)]
        recommender: Option<String>,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// Rating from 1 to 5
        #[arg(long)]
        rating: Option<u8>,
        #[arg(long, value_enum, default_value_t = MediaStatusArg::Queued)]
        status: MediaStatusArg,
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Something to build or try
    Project {
        #[arg(long)]
        title: String,
        /// Interest from 1 to 5
        #[arg(long)]
        interest: u8,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        effort: Option<EffortArg>,
        /// Deadline as YYYY-MM-DD
        #[arg(long)]
        deadline: Option<NaiveDate>,
        /// Link or reference (repeatable)
        #[arg(long = "resource")]
        resources: Vec<String>,
        /// Collaborator name (repeatable)
        #[arg(long = "collaborator")]
        collaborators: Vec<String>,
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum MediaTypeArg {
    Book,
    Movie,
    Show,
    Podcast,
    Music,
    Game,
    Article,
    Other,
}

impl From<MediaTypeArg> for MediaType {
    fn from(value: MediaTypeArg) -> Self {
        match value {
            MediaTypeArg::Book => Self::Book,
            MediaTypeArg::Movie => Self::Movie,
            MediaTypeArg::Show => Self::Show,
            MediaTypeArg::Podcast => Self::Podcast,
            MediaTypeArg::Music => Self::Music,
            MediaTypeArg::Game => Self::Game,
            MediaTypeArg::Article => Self::Article,
            MediaTypeArg::Other => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum MediaStatusArg {
    Queued,
    InProgress,
    Finished,
    Abandoned,
}

impl From<MediaStatusArg> for MediaStatus {
    fn from(value: MediaStatusArg) -> Self {
        match value {
            MediaStatusArg::Queued => Self::Queued,
            MediaStatusArg::InProgress => Self::InProgress,
            MediaStatusArg::Finished => Self::Finished,
            MediaStatusArg::Abandoned => Self::Abandoned,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum EffortArg {
    Low,
    Medium,
    High,
}

impl From<EffortArg> for ProjectEffort {
    fn from(value: EffortArg) -> Self {
        match value {
            EffortArg::Low => Self::Low,
            EffortArg::Medium => Self::Medium,
            EffortArg::High => Self::High,
        }
    }
}
