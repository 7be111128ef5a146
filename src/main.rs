use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use feedback_desk::config::Config;
use feedback_desk::dashboard::{EmployeeDashboard, ManagerDashboard};
use feedback_desk::domain::models::{Credentials, OpaqueId, RegistrationProfile, Role, Sentiment};
use feedback_desk::domain::tags::join_tags;
use feedback_desk::{logging, AppContext, ClientError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "feedback-desk", version, about = "Employee feedback dashboards")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "employee")]
        role: Role,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "employee")]
        role: Role,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session role
    Whoami,
    #[command(subcommand)]
    Manager(ManagerCommand),
    #[command(subcommand)]
    Employee(EmployeeCommand),
}

#[derive(Subcommand)]
enum ManagerCommand {
    /// Team statistics and sentiment breakdown
    Overview,
    /// Feedback given so far
    History,
    /// Give new feedback
    Give {
        #[arg(long)]
        employee: String,
        #[arg(long, default_value = "")]
        strengths: String,
        #[arg(long, default_value = "")]
        improvements: String,
        #[arg(long, default_value = "neutral")]
        sentiment: Sentiment,
        /// Comma-separated
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Edit existing feedback; omitted fields keep their current value
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        strengths: Option<String>,
        #[arg(long)]
        improvements: Option<String>,
        #[arg(long)]
        sentiment: Option<Sentiment>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Save the history as manager_feedbacks.pdf
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum EmployeeCommand {
    /// Feedback addressed to me
    List,
    /// Mark feedback as seen
    Ack {
        #[arg(long)]
        id: String,
    },
    /// Comment on feedback, replacing any earlier comment
    Comment {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
    },
    /// Save my feedback as employee_feedbacks.pdf
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    logging::init();

    let cli = Cli::parse();
    let ctx = AppContext::from_config(config).context("failed to initialise client")?;

    match cli.command {
        Command::Login {
            username,
            password,
            role,
        } => {
            let credentials = Credentials { username, password };
            match ctx.login(&credentials, role).await {
                Ok(outcome) => println!(
                    "Logged in as {}; continue at {}",
                    outcome.session.role,
                    outcome.landing.path()
                ),
                Err(ClientError::AuthenticationFailure) => bail!("Invalid credentials"),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Register {
            username,
            email,
            password,
            role,
        } => {
            let profile = RegistrationProfile {
                username,
                email,
                password,
                role,
            };
            let next = ctx.register(&profile).await.context("Signup failed")?;
            println!("Account created; log in at {}", next.path());
        }
        Command::Logout => {
            ctx.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match ctx.session.get_session() {
            Some(session) => println!("{}", session.role),
            None => println!("not logged in"),
        },
        Command::Manager(cmd) => {
            let mut dashboard = ctx.open_manager().await?;
            run_manager(&ctx, &mut dashboard, cmd).await?;
        }
        Command::Employee(cmd) => {
            let mut dashboard = ctx.open_employee().await?;
            run_employee(&ctx, &mut dashboard, cmd).await?;
        }
    }
    Ok(())
}

async fn run_manager(ctx: &AppContext, dashboard: &mut ManagerDashboard, cmd: ManagerCommand) -> anyhow::Result<()> {
    match cmd {
        ManagerCommand::Overview => {
            if let Some(overview) = dashboard.overview() {
                println!("Employees: {}", overview.employees_count);
                println!("Total Feedbacks: {}", overview.total_feedbacks);
            }
            for slice in dashboard.chart() {
                println!("  {:<9} {:>4}  {}", slice.label, slice.value, slice.color);
            }
        }
        ManagerCommand::History => {
            for (fb, card) in dashboard.history().iter().zip(dashboard.cards()) {
                println!("[{}]", fb.id);
                println!("  Name: {}", card.name);
                println!("  Strengths: {}", card.strengths);
                println!("  Improvements: {}", card.improvements);
                println!("  Sentiment: {}", card.sentiment);
                println!("  Tags: {}", card.tags);
            }
        }
        ManagerCommand::Give {
            employee,
            strengths,
            improvements,
            sentiment,
            tags,
        } => {
            dashboard.select_employee(&employee);
            dashboard.compose.strengths = strengths;
            dashboard.compose.improvements = improvements;
            dashboard.compose.sentiment = sentiment;
            dashboard.compose.tags = tags;
            let created = dashboard.submit().await?;
            println!("Feedback {} submitted", created.id);
        }
        ManagerCommand::Edit {
            id,
            strengths,
            improvements,
            sentiment,
            tags,
        } => {
            dashboard.start_edit(&OpaqueId::from(id.as_str()))?;
            if let Some(buffer) = dashboard.edit_buffer_mut() {
                if let Some(strengths) = strengths {
                    buffer.strengths = strengths;
                }
                if let Some(improvements) = improvements {
                    buffer.improvements = improvements;
                }
                if let Some(sentiment) = sentiment {
                    buffer.sentiment = sentiment;
                }
                if let Some(tags) = tags {
                    buffer.tags = tags;
                }
            }
            let updated = dashboard.save_edit().await?;
            println!("Feedback {} updated (tags: {})", updated.id, join_tags(&updated.tags));
        }
        ManagerCommand::Export { dir } => {
            let dir = dir.unwrap_or_else(|| ctx.config.export_dir.clone());
            let path = dashboard.export_pdf(&dir)?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

async fn run_employee(ctx: &AppContext, dashboard: &mut EmployeeDashboard, cmd: EmployeeCommand) -> anyhow::Result<()> {
    match cmd {
        EmployeeCommand::List => {
            for (fb, card) in dashboard.feedbacks().iter().zip(dashboard.cards()) {
                println!("[{}] {}", fb.id, card.feedback);
                println!("  Sentiment: {}", card.sentiment);
                println!("  From: {}", card.from);
                println!("  Date: {}", card.date);
                if let Some(strengths) = &card.strengths {
                    println!("  Strengths: {strengths}");
                }
                if let Some(improvements) = &card.improvements {
                    println!("  Improvements: {improvements}");
                }
                if !card.tags.is_empty() {
                    println!("  Tags: {}", card.tags.join(" | "));
                }
                if let Some(comment) = &card.comment {
                    println!("  Your Comment: {comment}");
                }
                println!("  {}", card.status.label());
            }
        }
        EmployeeCommand::Ack { id } => {
            dashboard.acknowledge(&OpaqueId::from(id.as_str())).await?;
            println!("Acknowledged");
        }
        EmployeeCommand::Comment { id, text } => {
            let id = OpaqueId::from(id.as_str());
            dashboard.set_comment_draft(&id, &text);
            dashboard.add_comment(&id).await?;
            println!("Comment saved");
        }
        EmployeeCommand::Export { dir } => {
            let dir = dir.unwrap_or_else(|| ctx.config.export_dir.clone());
            let path = dashboard.export_pdf(&dir)?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}
