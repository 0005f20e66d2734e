//! Profile commands

use a2p_proposals::NewMemory;
use a2p_storage::ProfileStore;
use a2p_types::{Did, SubProfile};
use clap::Subcommand;

use super::proposal::{MemoryTypeArg, SensitivityArg};
use crate::output::{self, OutputFormat};
use crate::Service;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create an empty profile
    Create {
        /// User DID
        user: Did,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Skip installing the default policies
        #[arg(long)]
        no_defaults: bool,
    },

    /// Print a profile snapshot
    Show {
        /// User DID
        user: Did,
    },

    /// List stored profiles
    List,

    /// Record a memory directly, without a proposal
    AddMemory {
        /// User DID
        user: Did,

        /// Memory content
        content: String,

        /// Category, e.g. a2p:preferences.food
        #[arg(short, long)]
        category: Option<String>,

        #[arg(long, value_enum)]
        memory_type: Option<MemoryTypeArg>,

        #[arg(long, value_enum)]
        sensitivity: Option<SensitivityArg>,

        /// Tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Add a named sub-profile such as "work"
    AddSubProfile {
        /// User DID
        user: Did,

        /// Sub-profile id
        id: String,

        /// Display name (defaults to the id)
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
}

fn new_memory(
    content: String,
    category: Option<String>,
    memory_type: Option<MemoryTypeArg>,
    sensitivity: Option<SensitivityArg>,
    tags: Vec<String>,
) -> NewMemory {
    let mut memory = NewMemory::new(content).tags(tags);
    if let Some(category) = category {
        memory = memory.category(category);
    }
    if let Some(memory_type) = memory_type {
        memory = memory.memory_type(memory_type.into());
    }
    if let Some(sensitivity) = sensitivity {
        memory = memory.sensitivity(sensitivity.into());
    }
    memory
}

pub async fn execute(
    command: ProfileCommands,
    service: &Service,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        ProfileCommands::Create {
            user,
            name,
            no_defaults,
        } => {
            let profile = service.create_profile(user, name, !no_defaults).await?;
            output::print(&profile, format)
        }
        ProfileCommands::Show { user } => {
            let profile = service.profile(&user).await?;
            output::print(&profile, format)
        }
        ProfileCommands::List => {
            let users = service.store().list_profiles().await?;
            output::print(&users, format)
        }
        ProfileCommands::AddMemory {
            user,
            content,
            category,
            memory_type,
            sensitivity,
            tags,
        } => {
            let memory = new_memory(content, category, memory_type, sensitivity, tags);
            let entry = service.add_memory(&user, memory).await?;
            output::print(&entry, format)
        }
        ProfileCommands::AddSubProfile {
            user,
            id,
            name,
            description,
        } => {
            let sub_profile = SubProfile {
                name: name.unwrap_or_else(|| id.clone()),
                id,
                description,
            };
            let profile = service.add_sub_profile(&user, sub_profile).await?;
            output::print(&profile.sub_profiles, format)
        }
    }
}
