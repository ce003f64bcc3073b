//! [`Args`] definitions for the `jobboard` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use jobboard_auth::Role;
use jobboard_core::{ApplicationStatus, JobCategory, JobType};

/// Command-line front-end for the job board.
///
/// The session is persisted between invocations; output is JSON on stdout.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Backend API base URL (overrides JOBBOARD_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file (overrides JOBBOARD_SESSION_FILE).
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// jobseeker or recruiter.
        #[arg(long, default_value = "jobseeker")]
        role: Role,
    },
    /// Sign out and forget the persisted session.
    Logout,
    /// Show the current identity and its capabilities.
    Whoami,
    /// Show how the route gate decides a path.
    Navigate { path: String },
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Apply to a job.
    Apply {
        job_id: String,
        #[arg(long, default_value = "")]
        cover_letter: String,
        /// Resume file to upload.
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    #[command(subcommand)]
    Applications(ApplicationsCommand),
    #[command(subcommand)]
    Users(UsersCommand),
    /// Recruiter dashboard counts.
    Stats,
}

/// Job postings.
#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    List,
    Search {
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long = "type")]
        job_type: Option<JobType>,
        #[arg(long)]
        category: Option<JobCategory>,
    },
    Show {
        id: String,
    },
    /// Jobs posted by the signed-in recruiter.
    Mine,
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        requirements: String,
        #[arg(long, default_value = "")]
        salary: String,
        #[arg(long = "type", default_value = "Full-time")]
        job_type: JobType,
        #[arg(long, default_value = "IT")]
        category: JobCategory,
    },
    Delete {
        id: String,
    },
}

/// Job applications.
#[derive(Debug, Subcommand)]
pub enum ApplicationsCommand {
    /// The caller's own applications.
    Mine,
    /// Every application visible to a recruiter or admin.
    All,
    ForJob {
        job_id: String,
    },
    SetStatus {
        id: String,
        status: ApplicationStatus,
    },
    /// Whether the caller already applied to a job.
    Applied {
        job_id: String,
    },
}

/// Account administration.
#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    List,
    Delete { id: String },
    SetRole { id: String, role: Role },
}
