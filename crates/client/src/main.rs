mod args;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use serde_json::json;

use jobboard_client::{ClientConfig, FileStorage, JobBoard, Registration};
use jobboard_core::{ApplicationId, JobFilters, JobId, NewApplication, NewJob, Resume, UserId};

use crate::args::{ApplicationsCommand, Args, Command, JobsCommand, UsersCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(url) = &args.api_url {
        config = config.with_api_url(url).context("invalid --api-url")?;
    }
    if let Some(path) = &args.session_file {
        config = config.with_session_file(path);
    }

    jobboard_observability::init_with(config.log_format());

    let session_path = config
        .session_path()
        .context("failed to resolve session file path")?;
    tracing::debug!(api_url = config.api_url(), session = %session_path.display(), "starting");

    let board = JobBoard::start(&config, Arc::new(FileStorage::new(session_path)))
        .context("failed to initialize client")?;

    run(&board, args.command).await
}

async fn run(board: &JobBoard, command: Command) -> anyhow::Result<()> {
    let JobBoard { session, api, gate } = board;

    match command {
        Command::Login { email, password } => {
            let identity = session
                .login(&email, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.message()))?;
            print(&identity)
        }
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let registration = Registration::new(name, email, password, role);
            let identity = session
                .register(&registration)
                .await
                .map_err(|e| anyhow::anyhow!(e.message()))?;
            print(&identity)
        }
        Command::Logout => {
            session.logout();
            print(&json!({ "signed_in": false }))
        }
        Command::Whoami => match session.identity() {
            Some(identity) => print(&json!({
                "signed_in": true,
                "user": identity,
                "capabilities": identity.capabilities(),
            })),
            None => print(&json!({ "signed_in": false })),
        },
        Command::Navigate { path } => {
            session.wait_restored().await;
            print(&gate.explain(&path))
        }
        Command::Jobs(jobs) => run_jobs(board, jobs).await,
        Command::Apply {
            job_id,
            cover_letter,
            resume,
        } => {
            let mut application = NewApplication::new(JobId::new(job_id)?, cover_letter);
            if let Some(path) = resume {
                application = application.with_resume(read_resume(&path).await?);
            }
            print(&api.apply(&application).await?)
        }
        Command::Applications(applications) => run_applications(board, applications).await,
        Command::Users(users) => run_users(board, users).await,
        Command::Stats => {
            let identity = session.identity().context("not signed in")?;
            print(&api.recruiter_stats(&identity).await?)
        }
    }
}

async fn run_jobs(board: &JobBoard, command: JobsCommand) -> anyhow::Result<()> {
    let api = &board.api;

    match command {
        JobsCommand::List => print(&api.list_jobs().await?),
        JobsCommand::Search {
            keyword,
            location,
            job_type,
            category,
        } => {
            let filters = JobFilters {
                keyword,
                location,
                job_type,
                category,
            };
            print(&api.search_jobs(&filters).await?)
        }
        JobsCommand::Show { id } => print(&api.get_job(&JobId::new(id)?).await?),
        JobsCommand::Mine => {
            let identity = board.session.identity().context("not signed in")?;
            print(&api.my_jobs(&identity).await?)
        }
        JobsCommand::Post {
            title,
            company,
            location,
            description,
            requirements,
            salary,
            job_type,
            category,
        } => {
            let job = NewJob {
                requirements,
                salary,
                job_type,
                category,
                ..NewJob::new(title, company, location, description)
            };
            print(&api.post_job(&job).await?)
        }
        JobsCommand::Delete { id } => {
            let id = JobId::new(id)?;
            api.delete_job(&id).await?;
            print(&json!({ "deleted": id }))
        }
    }
}

async fn run_applications(board: &JobBoard, command: ApplicationsCommand) -> anyhow::Result<()> {
    let api = &board.api;

    match command {
        ApplicationsCommand::Mine => print(&api.my_applications().await?),
        ApplicationsCommand::All => print(&api.all_applications().await?),
        ApplicationsCommand::ForJob { job_id } => {
            let applications = api.applications_for_job(&JobId::new(job_id)?).await?;
            let rows: Vec<_> = applications
                .iter()
                .map(|a| json!({ "application": a, "resume_url": api.resume_url(a) }))
                .collect();
            print(&rows)
        }
        ApplicationsCommand::SetStatus { id, status } => {
            let id = ApplicationId::new(id)?;
            api.set_application_status(&id, status).await?;
            print(&json!({ "id": id, "status": status }))
        }
        ApplicationsCommand::Applied { job_id } => {
            let job_id = JobId::new(job_id)?;
            let applied = api.has_applied(&job_id).await?;
            print(&json!({ "job_id": job_id, "applied": applied }))
        }
    }
}

async fn run_users(board: &JobBoard, command: UsersCommand) -> anyhow::Result<()> {
    let api = &board.api;

    match command {
        UsersCommand::List => print(&api.list_users().await?),
        UsersCommand::Delete { id } => {
            let id = UserId::new(id)?;
            api.delete_user(&id).await?;
            print(&json!({ "deleted": id }))
        }
        UsersCommand::SetRole { id, role } => {
            let id = UserId::new(id)?;
            api.set_user_role(&id, role).await?;
            print(&json!({ "id": id, "role": role }))
        }
    }
}

async fn read_resume(path: &Path) -> anyhow::Result<Resume> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read resume at {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("resume path has no file name")?;
    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => Some("application/pdf"),
        Some(ext) if ext.eq_ignore_ascii_case("doc") => Some("application/msword"),
        Some(ext) if ext.eq_ignore_ascii_case("docx") => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        _ => None,
    };

    Ok(Resume {
        file_name,
        content_type: content_type.map(str::to_string),
        bytes,
    })
}

fn print<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
