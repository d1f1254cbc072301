use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use folio::config::{Config, ConfigError};
use folio::net::api::{ApiClient, GET_POST_FAILED};
use folio::net::error::ApiError;
use folio::net::http::Transport;
use folio::net::types::{Post, media_url};
use folio::pages::create_post::{CreatePostForm, media_from_file};
use folio::pages::home::{ALL_CATEGORIES, HomePage};
use folio::pages::login::LoginForm;
use folio::pages::profile::ProfilePage;
use folio::pages::show_post::{ShowPostPage, ShowPostView};
use folio::pages::sign_up::{ACCOUNT_CREATED, SignUpForm};
use folio::pages::{FieldErrors, Notification, SubmitError};
use folio::state::session::{Gate, SessionStore};
use folio::state::storage::FileStorage;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Failed(String),
    #[error("not logged in; run `folio login` first")]
    NotLoggedIn,
    #[error("comment text is empty")]
    EmptyComment,
    #[error("cannot read media file {path}: {source}")]
    Media {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    fn from_submit(error: SubmitError, fields: &FieldErrors) -> Self {
        match error {
            SubmitError::Invalid => {
                let lines: Vec<String> = fields.iter().map(|(field, message)| format!("{field}: {message}")).collect();
                Self::Invalid(lines.join("\n"))
            }
            SubmitError::LoginRequired(_) => Self::NotLoggedIn,
            SubmitError::Failed(notice) => Self::Failed(notice.message),
        }
    }
}

impl From<Notification> for CliError {
    fn from(notice: Notification) -> Self {
        Self::Failed(notice.message)
    }
}

#[derive(Parser, Debug)]
#[command(name = "folio", about = "Blog client: read, write and comment on posts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session for three days.
    Login {
        email: String,
        #[arg(long, env = "FOLIO_PASSWORD")]
        password: String,
    },
    /// Create an account.
    Register(RegisterArgs),
    /// Log out and forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Browse, publish and delete posts.
    Posts(PostsCommand),
    /// Comment on a post.
    Comment { post_id: i64, text: String },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "FOLIO_PASSWORD")]
    password: String,
    /// Log in right after the account is created.
    #[arg(long, default_value_t = false)]
    login: bool,
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    /// List posts, optionally filtered.
    List {
        #[arg(long, default_value = ALL_CATEGORIES)]
        category: String,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show a post with its comments.
    Show {
        id: i64,
    },
    /// Publish a post, with an optional image or video.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        media: Option<PathBuf>,
    },
    /// Delete one of your posts.
    Delete {
        id: i64,
    },
    /// Posts owned by the logged-in user.
    Mine,
}

struct CliContext {
    config: Config,
    session: SessionStore,
    api: ApiClient,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::from_env()?;
    let transport = Transport::from_config(&config)?;
    let storage = FileStorage::new(config.session_file.clone());
    tracing::debug!(session_file = %storage.path().display(), "using session file");
    let session = SessionStore::new(transport, Arc::new(storage));
    session.hydrate().await;
    let api = ApiClient::new(session.clone());
    tracing::debug!(api_url = %config.api_url, "folio starting");

    let ctx = CliContext { config, session, api };
    match cli.command {
        Command::Login { email, password } => run_login(&ctx, &email, &password).await,
        Command::Register(args) => run_register(&ctx, args).await,
        Command::Logout => {
            ctx.session.logout().await;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => run_whoami(&ctx).await,
        Command::Posts(posts) => run_posts(&ctx, posts).await,
        Command::Comment { post_id, text } => run_comment(&ctx, post_id, &text).await,
    }
}

async fn run_login(ctx: &CliContext, email: &str, password: &str) -> Result<(), CliError> {
    let mut form = LoginForm::new();
    form.set_email(email);
    form.set_password(password);
    let user = form.submit(&ctx.session).await.map_err(|e| CliError::from_submit(e, form.errors()))?;
    println!("logged in as {} <{}>", user.name, user.email);
    Ok(())
}

async fn run_register(ctx: &CliContext, args: RegisterArgs) -> Result<(), CliError> {
    let mut form = SignUpForm::new();
    form.set_name(&args.name);
    form.set_email(&args.email);
    form.set_password(&args.password);
    form.set_confirm_password(&args.password);
    let user = form.submit(&ctx.session, args.login).await.map_err(|e| CliError::from_submit(e, form.errors()))?;
    println!("{ACCOUNT_CREATED}");
    if let Some(user) = user {
        println!("logged in as {} <{}>", user.name, user.email);
    }
    Ok(())
}

async fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let snapshot = ctx.session.snapshot().await;
    let Gate::Authenticated(user) = snapshot.gate() else {
        return Err(CliError::NotLoggedIn);
    };
    println!("{} <{}> (@{})", user.name, user.email, user.handle());
    if let Some(credentials) = snapshot.credentials() {
        println!("session expires {}", credentials.expires_at.date());
    }
    Ok(())
}

async fn run_posts(ctx: &CliContext, posts: PostsCommand) -> Result<(), CliError> {
    match posts.command {
        PostsSubcommand::List { category, search } => {
            let mut page = HomePage::new();
            if let Some(notice) = page.load(&ctx.api).await {
                return Err(notice.into());
            }
            page.select_category(&category);
            page.set_search(&search);
            for post in page.filtered() {
                print_post_line(post);
            }
            Ok(())
        }
        PostsSubcommand::Show { id } => run_show(ctx, id).await,
        PostsSubcommand::Create { title, content, media } => {
            let mut form = CreatePostForm::new();
            form.set_title(&title);
            form.set_content(&content);
            if let Some(path) = media {
                let upload = media_from_file(&path).map_err(|source| CliError::Media { path, source })?;
                form.set_media(Some(upload));
            }
            let (post, notice) =
                form.submit(&ctx.api).await.map_err(|e| CliError::from_submit(e, form.errors()))?;
            println!("{}", notice.message);
            print_post_line(&post);
            Ok(())
        }
        PostsSubcommand::Delete { id } => {
            if !ctx.session.snapshot().await.is_authenticated() {
                return Err(CliError::NotLoggedIn);
            }
            let mut page = ProfilePage::new();
            let notice = page.delete(&ctx.api, id).await;
            if notice.is_error() {
                return Err(notice.into());
            }
            println!("{}", notice.message);
            Ok(())
        }
        PostsSubcommand::Mine => {
            if !ctx.session.snapshot().await.is_authenticated() {
                return Err(CliError::NotLoggedIn);
            }
            let mut page = ProfilePage::new();
            if let Some(notice) = page.load(&ctx.api).await {
                return Err(notice.into());
            }
            let now = time::OffsetDateTime::now_utc();
            println!("{} posts, {} this month", page.posts().len(), page.posts_this_month(now));
            for post in page.posts() {
                print_post_line(post);
            }
            Ok(())
        }
    }
}

async fn run_show(ctx: &CliContext, id: i64) -> Result<(), CliError> {
    let mut page = ShowPostPage::new(id);
    if let Some(notice) = page.load(&ctx.api).await {
        return Err(notice.into());
    }
    let snapshot = ctx.session.snapshot().await;
    let ShowPostView::Ready { post, comments } = page.view(&snapshot) else {
        return Err(CliError::Failed(GET_POST_FAILED.to_owned()));
    };

    println!("{}", post.title);
    println!("by {} on {}", post.author_name(), post.created_at.date());
    if let Some(category) = post.category_name() {
        println!("in {category}");
    }
    if let Some(url) = media_url(&ctx.config.storage_url, post.media.as_deref()) {
        println!("media: {url}");
    }
    println!();
    println!("{}", post.content);
    println!();
    println!("{} comments", comments.len());
    for comment in comments {
        let author = comment.user.as_ref().map_or("Anonymous", |u| u.display_name());
        println!("  {author}: {}", comment.content);
    }
    Ok(())
}

async fn run_comment(ctx: &CliContext, post_id: i64, text: &str) -> Result<(), CliError> {
    let mut page = ShowPostPage::new(post_id);
    page.set_draft(text);
    let notice = page.submit_comment(&ctx.api).await.ok_or(CliError::EmptyComment)?;
    if notice.is_error() {
        return Err(notice.into());
    }
    println!("{}", notice.message);
    Ok(())
}

fn print_post_line(post: &Post) {
    let category = post.category_name().unwrap_or("-");
    println!("#{:<5} {:<40} [{category}] by {} ({})", post.id, post.title, post.author_name(), post.created_at.date());
}
