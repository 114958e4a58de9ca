use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use yoga_studio::config::{ClientConfig, ConfigError};
use yoga_studio::net::api::{ApiClient, TeacherApi};
use yoga_studio::net::types::ApiError;
use yoga_studio::pages::form::{FormError, LoginForm, RegisterForm, SessionForm};
use yoga_studio::pages::login::{self, LoginOutcome};
use yoga_studio::pages::me::{ACCOUNT_DELETED_MESSAGE, MeView};
use yoga_studio::pages::register::{self, RegisterOutcome};
use yoga_studio::pages::sessions::{DetailView, FormInit, FormMode, FormPage, ListView, SubmitError};
use yoga_studio::router::{Navigation, Route, Router};
use yoga_studio::state::session::SessionStore;
use yoga_studio::state::storage::FileStorage;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("redirected to {0}")]
    Redirected(String),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("invalid input: {0}")]
    InvalidForm(String),
}

impl From<Vec<FormError>> for CliError {
    fn from(errors: Vec<FormError>) -> Self {
        let joined = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
        Self::InvalidForm(joined)
    }
}

impl From<SubmitError> for CliError {
    fn from(error: SubmitError) -> Self {
        match error {
            SubmitError::Invalid(errors) => errors.into(),
            SubmitError::Api(e) => Self::Api(e),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "studio", about = "Yoga studio client")]
struct Cli {
    #[arg(long, env = "STUDIO_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "STUDIO_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the current account, or delete it.
    Me {
        #[command(subcommand)]
        action: Option<MeAction>,
    },
    Sessions(SessionsCommand),
    Teachers(TeachersCommand),
    /// Resolve an app path through the route guards.
    Navigate {
        path: String,
    },
}

#[derive(Subcommand, Debug)]
enum MeAction {
    Delete,
}

#[derive(Args, Debug)]
struct SessionsCommand {
    #[command(subcommand)]
    command: SessionsSubcommand,
}

#[derive(Args, Debug)]
struct SessionFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long, help = "YYYY-MM-DD")]
    date: Option<String>,
    #[arg(long)]
    teacher_id: Option<i64>,
    #[arg(long)]
    description: Option<String>,
}

impl SessionFields {
    fn apply(self, form: &mut SessionForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(date) = self.date {
            form.date = date;
        }
        if self.teacher_id.is_some() {
            form.teacher_id = self.teacher_id;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
    }
}

#[derive(Subcommand, Debug)]
enum SessionsSubcommand {
    List,
    Show {
        id: i64,
    },
    Create {
        #[command(flatten)]
        fields: SessionFields,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: SessionFields,
    },
    Delete {
        id: i64,
    },
    Participate {
        id: i64,
    },
    Unparticipate {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct TeachersCommand {
    #[command(subcommand)]
    command: TeachersSubcommand,
}

#[derive(Subcommand, Debug)]
enum TeachersSubcommand {
    List,
    Show { id: i64 },
}

struct CliContext {
    store: Arc<SessionStore>,
    api: ApiClient,
}

impl CliContext {
    /// Run `route` through the guards; a redirect aborts the command.
    fn guard(&self, route: &Route) -> Result<(), CliError> {
        match Router::new(&self.store).resolve(route) {
            Navigation::Allow(_) => Ok(()),
            Navigation::Redirect(to) => {
                eprintln!("redirect: {to}");
                Err(CliError::Redirected(to.path()))
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?.with_overrides(cli.api_url, cli.session_dir);
    tracing::debug!(api_url = %config.api_url, session_dir = %config.session_dir.display(), "client config");

    let store = Arc::new(SessionStore::new(Arc::new(FileStorage::new(config.session_dir.clone()))));
    let api = ApiClient::from_config(&config, Arc::clone(&store))?;
    let ctx = CliContext { store, api };

    let result = run(&ctx, cli.command).await;
    if let Err(CliError::Api(e)) = &result {
        if e.retryable() {
            eprintln!("hint: the server did not answer cleanly; the command can be retried");
        }
    }
    result
}

async fn run(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Register { email, first_name, last_name, password } => {
            ctx.guard(&Route::Register)?;
            let request = RegisterForm { email, first_name, last_name, password }.validate()?;
            match register::submit(&ctx.api, &request).await {
                RegisterOutcome::Registered { message, redirect } => {
                    println!("{message}");
                    println!("next: {redirect}");
                    Ok(())
                }
                RegisterOutcome::Failed(e) => Err(e.into()),
            }
        }
        Command::Login { email, password } => {
            ctx.guard(&Route::Login)?;
            let request = LoginForm { email, password }.validate()?;
            match login::submit(&ctx.api, &ctx.store, &request).await {
                LoginOutcome::LoggedIn { redirect } => {
                    print_json(&ctx.store.session_information())?;
                    println!("next: {redirect}");
                    Ok(())
                }
                LoginOutcome::Failed(e) => Err(e.into()),
            }
        }
        Command::Logout => {
            ctx.store.log_out();
            println!("logged out");
            Ok(())
        }
        Command::Me { action } => run_me(ctx, action).await,
        Command::Sessions(sessions) => run_sessions(ctx, sessions).await,
        Command::Teachers(teachers) => run_teachers(ctx, teachers).await,
        Command::Navigate { path } => {
            match Router::new(&ctx.store).navigate(&path) {
                Navigation::Allow(route) => println!("allow: {route}"),
                Navigation::Redirect(route) => println!("redirect: {route}"),
            }
            Ok(())
        }
    }
}

async fn run_me(ctx: &CliContext, action: Option<MeAction>) -> Result<(), CliError> {
    ctx.guard(&Route::Me)?;
    let view = MeView::load(&ctx.api, &ctx.store).await?;
    match action {
        None => {
            println!("{}", view.display_name());
            print_json(&view.user)
        }
        Some(MeAction::Delete) => {
            if !view.can_delete_account() {
                return Err(CliError::Forbidden("admin accounts cannot be deleted"));
            }
            let next = view.delete_account(&ctx.api, &ctx.store).await?;
            println!("{ACCOUNT_DELETED_MESSAGE}");
            println!("next: {next}");
            Ok(())
        }
    }
}

async fn run_sessions(ctx: &CliContext, sessions: SessionsCommand) -> Result<(), CliError> {
    let api = &ctx.api;
    match sessions.command {
        SessionsSubcommand::List => {
            ctx.guard(&Route::Sessions)?;
            let view = ListView::load(api, &ctx.store).await?;
            print_json(&view.sessions)
        }
        SessionsSubcommand::Show { id } => {
            ctx.guard(&Route::SessionDetail(id))?;
            let view = DetailView::load(api, api, &ctx.store, id).await?;
            print_json(&view.session)?;
            println!("teacher: {} {}", view.teacher.first_name, view.teacher.last_name.to_uppercase());
            println!("participating: {}", view.is_participate);
            Ok(())
        }
        SessionsSubcommand::Create { fields } => submit_form(ctx, FormMode::Create, fields).await,
        SessionsSubcommand::Update { id, fields } => submit_form(ctx, FormMode::Update(id), fields).await,
        SessionsSubcommand::Delete { id } => {
            ctx.guard(&Route::SessionDetail(id))?;
            let view = DetailView::load(api, api, &ctx.store, id).await?;
            if !view.is_admin {
                return Err(CliError::Forbidden("only admins can delete sessions"));
            }
            let (next, message) = view.delete(api).await?;
            println!("{message}");
            println!("next: {next}");
            Ok(())
        }
        SessionsSubcommand::Participate { id } => {
            ctx.guard(&Route::SessionDetail(id))?;
            let mut view = DetailView::load(api, api, &ctx.store, id).await?;
            view.participate(api, api).await?;
            print_json(&view.session)
        }
        SessionsSubcommand::Unparticipate { id } => {
            ctx.guard(&Route::SessionDetail(id))?;
            let mut view = DetailView::load(api, api, &ctx.store, id).await?;
            view.un_participate(api, api).await?;
            print_json(&view.session)
        }
    }
}

async fn submit_form(ctx: &CliContext, mode: FormMode, fields: SessionFields) -> Result<(), CliError> {
    let route = match mode {
        FormMode::Create => Route::SessionCreate,
        FormMode::Update(id) => Route::SessionUpdate(id),
    };
    ctx.guard(&route)?;
    let mut page = match FormPage::init(mode, &ctx.api, &ctx.api, &ctx.store).await? {
        FormInit::Ready(page) => page,
        FormInit::Redirect(to) => return Err(CliError::Redirected(to.path())),
    };
    fields.apply(&mut page.form);
    let (next, message) = page.submit(&ctx.api).await?;
    println!("{message}");
    println!("next: {next}");
    Ok(())
}

async fn run_teachers(ctx: &CliContext, teachers: TeachersCommand) -> Result<(), CliError> {
    ctx.guard(&Route::Sessions)?;
    match teachers.command {
        TeachersSubcommand::List => print_json(&TeacherApi::all(&ctx.api).await?),
        TeachersSubcommand::Show { id } => print_json(&TeacherApi::detail(&ctx.api, id).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
