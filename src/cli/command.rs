use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::DEFAULT_API_URL;

#[derive(Parser, Debug)]
#[command(name = "rolodex-web", version, about = "Contact book client for a contacts REST API")]
pub struct Cli {
    /// Base url of the contacts API
    #[arg(long, env = "ROLODEX_API_URL", default_value_t = String::from(DEFAULT_API_URL))]
    pub api_url: String,

    /// Where the login session is kept between runs
    #[arg(long, env = "ROLODEX_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommand and their flags
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with HTTP Basic credentials
    Login {
        #[arg(short, long)]
        username: String,

        /// Read from stdin when omitted
        #[arg(short, long, env = "ROLODEX_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the current session
    Logout,
    /// Show whether a session is live and when it expires
    Status,
    /// List contacts
    List {
        /// Sort ordering (default is server order)
        #[arg(long)]
        sort: Option<SortKey>,

        /// Reverse order
        #[arg(short, long)]
        reverse: bool,

        /// Only contacts whose name, email, phone, organization or title contain this text
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Show every field of one contact
    Show {
        #[arg(long)]
        id: String,
    },
    /// Add a new contact
    Add {
        /// Full name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        fields: ContactFields,
    },
    /// Edit an existing contact
    /// Fields that are not given keep their current value
    Edit {
        #[arg(long)]
        id: String,

        /// New full name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ContactFields,
    },
    /// Delete a contact
    Delete {
        #[arg(long)]
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Optional contact fields shared by add and edit
#[derive(Args, Debug, Default, Clone)]
pub struct ContactFields {
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub organization: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

/// Supported sort keys
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SortKey {
    Name,
    Organization,
}
