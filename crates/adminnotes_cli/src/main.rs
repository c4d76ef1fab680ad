//! Command-line host for the administrator notes panel.
//!
//! # Responsibility
//! - Stand in for the admin backend: acting user, session and request URL
//!   come from flags, storage from the configured SQLite file.
//! - Print queued notices to stderr after every command.

use adminnotes_core::db::open_db;
use adminnotes_core::notice::text;
use adminnotes_core::panel::{
    dispatch, download_text, print_document, PanelRequest, PanelResponse, PanelUrls,
};
use adminnotes_core::{
    enable_module, init_logging, preflight, uninstall, Actor, CoreConfig, IdSet, InstallKind,
    MemoryRenderCache, ModuleId, ModuleRepository, NoteModule, NoticeLevel, NotesService,
    RenderCache, RequestContext, SqliteModuleRepository, SqliteSessionStore, SystemClock,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::info;
use rusqlite::Connection;
use std::path::PathBuf;
use uuid::Uuid;

const DEFAULT_PAGE_URL: &str = "/administrator/index.php";
const CLI_FORM_TOKEN: &str = "cli-token";

/// Administrator notes panel.
#[derive(Parser, Debug)]
#[command(name = "adminnotes")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database file (overrides ADMINNOTES_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Acting user id
    #[arg(long, global = true, default_value_t = 0)]
    user: i64,

    /// Acting user's group ids, comma separated
    #[arg(long, global = true, default_value = "")]
    groups: String,

    /// Resume an existing session instead of starting a new one
    #[arg(long, global = true)]
    session: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check host compatibility and publish the dashboard panel
    Install {
        /// Host platform version
        #[arg(long, default_value = "4.0")]
        host_version: String,
    },

    /// Remove every panel instance
    Uninstall,

    /// Print stored note content
    Show { id: String },

    /// Replace note content
    Save {
        id: String,

        /// New content
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,

        /// Read new content from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Report whether the acting user may edit an instance
    CanEdit { id: String },

    /// Render the panel as the dashboard would
    Render {
        id: String,

        /// Page URL the panel is rendered on
        #[arg(long, default_value = DEFAULT_PAGE_URL)]
        url: String,

        /// Request edit mode
        #[arg(long)]
        edit: bool,
    },

    /// Write note content as plain text
    Export {
        id: String,

        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print a standalone printable page
    Print { id: String },
}

fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let mut config = CoreConfig::from_env().context("invalid environment configuration")?;
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("failed to initialize logging")?;
    }
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        adminnotes_core::core_version()
    );

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    run(&cli, &config, &conn)
}

fn run(cli: &Cli, config: &CoreConfig, conn: &Connection) -> Result<()> {
    let repo = SqliteModuleRepository::new(conn);

    match &cli.command {
        Commands::Install { host_version } => {
            preflight(InstallKind::Install, host_version)?;
            let outcome = enable_module(&repo)?;
            info!(
                "event=cli_install module=cli status=ok module_id={}",
                outcome.module_id()
            );
            println!("{outcome:?}");
            return Ok(());
        }
        Commands::Uninstall => {
            preflight(InstallKind::Uninstall, "")?;
            let removed = uninstall(&repo)?;
            println!("removed {removed} instance(s)");
            return Ok(());
        }
        _ => {}
    }

    let actor = Actor::new(cli.user, IdSet::parse_list(&cli.groups)?.iter());
    let mut session = match cli.session {
        Some(session_id) => SqliteSessionStore::new(conn, session_id),
        None => SqliteSessionStore::start(conn),
    };
    let session_id = session.session_id();
    let clock = SystemClock;
    let mut service = NotesService::with_throttle(repo, MemoryRenderCache::new(), config.throttle);
    let mut ctx = RequestContext::new(actor, &mut session, &clock);

    let result = execute(&cli.command, &mut service, &mut ctx, config);
    if matches!(cli.command, Commands::Save { .. }) {
        println!("session={session_id}");
    }

    for notice in ctx.notices.take() {
        let label = match notice.level {
            NoticeLevel::Message => "message",
            NoticeLevel::Error => "error",
        };
        eprintln!("{label}: {}", notice.text);
    }
    result
}

fn execute<R: ModuleRepository, C: RenderCache>(
    command: &Commands,
    service: &mut NotesService<R, C>,
    ctx: &mut RequestContext<'_>,
    config: &CoreConfig,
) -> Result<()> {
    match command {
        Commands::Show { id } => {
            if let Some(content) = service.get_data(ctx, id) {
                println!("{content}");
            }
        }
        Commands::Save { id, content, file } => {
            let data = read_content(content.as_deref(), file.as_ref())?;
            let saved = save_note(service, ctx, id, &data)?;
            println!("saved={saved}");
        }
        Commands::CanEdit { id } => {
            let module = load_module(service, id)?;
            println!("{}", service.can_edit_module(ctx, &module));
        }
        Commands::Render { id, url, edit } => {
            let url = if *edit {
                PanelUrls::from_current(url).edit
            } else {
                url.clone()
            };
            match dispatch(service, ctx, id, &PanelRequest::get(&url, CLI_FORM_TOKEN)) {
                PanelResponse::Render { html, .. } => println!("{html}"),
                PanelResponse::Redirect(target) => println!("redirect {target}"),
                PanelResponse::Empty => {}
            }
        }
        Commands::Export { id, output } => {
            let plain = download_text(&service.get_data(ctx, id).unwrap_or_default());
            match output {
                Some(path) => std::fs::write(path, plain)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{plain}"),
            }
        }
        Commands::Print { id } => {
            let module = load_module(service, id)?;
            let content = service.get_data(ctx, id).unwrap_or_default();
            println!(
                "{}",
                print_document(&module.title, &config.site_name, &content)
            );
        }
        Commands::Install { .. } | Commands::Uninstall => {}
    }
    Ok(())
}

/// Saves through the panel flow so the access check applies. Refusals are
/// errors; throttled or failed saves return `false`.
fn save_note<R: ModuleRepository, C: RenderCache>(
    service: &mut NotesService<R, C>,
    ctx: &mut RequestContext<'_>,
    raw_id: &str,
    data: &str,
) -> Result<bool> {
    let request = PanelRequest::save(DEFAULT_PAGE_URL, CLI_FORM_TOKEN, data, true);
    match dispatch(service, ctx, raw_id, &request) {
        PanelResponse::Redirect(_) => Ok(true),
        PanelResponse::Render { view, .. } if !view.can_edit => {
            ctx.notices.error(text::NOT_PERMITTED);
            bail!(
                "user {} may not edit notes module {}",
                ctx.actor.id,
                view.module_id
            )
        }
        PanelResponse::Render { .. } | PanelResponse::Empty => Ok(false),
    }
}

fn load_module<R: ModuleRepository, C: RenderCache>(
    service: &NotesService<R, C>,
    raw_id: &str,
) -> Result<NoteModule> {
    let id = ModuleId::parse(raw_id)?;
    service
        .repo()
        .get_module(id)?
        .ok_or_else(|| anyhow!("notes module {id} not found"))
}

fn read_content(content: Option<&str>, file: Option<&PathBuf>) -> Result<String> {
    match (content, file) {
        (Some(content), _) => Ok(content.to_string()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        (None, None) => bail!("either --content or --file is required"),
    }
}

#[cfg(test)]
mod tests {
    use super::{save_note, Cli};
    use adminnotes_core::db::open_db_in_memory;
    use adminnotes_core::model::module::MODULE_NAME;
    use adminnotes_core::notice::text;
    use adminnotes_core::{
        Actor, IdSet, MemorySession, ModuleId, ModuleParams, ModuleRepository, NoopCache,
        NotesService, PublishSettings, RequestContext, SqliteModuleRepository, SystemClock,
    };
    use clap::CommandFactory;
    use rusqlite::Connection;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    fn seed_restricted(conn: &Connection) -> ModuleId {
        let repo = SqliteModuleRepository::new(conn);
        let id = repo.create_module(MODULE_NAME).unwrap();
        let params = ModuleParams {
            edit_user_groups: IdSet::parse_list("6").unwrap(),
            edit_users: IdSet::parse_list("42").unwrap(),
            ..ModuleParams::provisioning_defaults()
        };
        repo.publish_module(
            id,
            &PublishSettings {
                params,
                ..PublishSettings::dashboard()
            },
        )
        .unwrap();
        repo.set_content(id, "<p>restricted</p>").unwrap();
        id
    }

    #[test]
    fn save_is_refused_for_users_without_edit_rights() {
        let conn = open_db_in_memory().unwrap();
        let id = seed_restricted(&conn);
        let mut service = NotesService::new(SqliteModuleRepository::new(&conn), NoopCache);
        let mut session = MemorySession::new();
        let clock = SystemClock;
        let mut ctx = RequestContext::new(Actor::new(99, [2]), &mut session, &clock);

        let result = save_note(&mut service, &mut ctx, &id.to_string(), "<p>unauthorized</p>");

        assert!(result.is_err());
        assert!(ctx.notices.contains(text::NOT_PERMITTED));
        assert_eq!(
            service.repo().get_content(id).unwrap().as_deref(),
            Some("<p>restricted</p>")
        );
    }

    #[test]
    fn save_goes_through_for_listed_users() {
        let conn = open_db_in_memory().unwrap();
        let id = seed_restricted(&conn);
        let mut service = NotesService::new(SqliteModuleRepository::new(&conn), NoopCache);
        let mut session = MemorySession::new();
        let clock = SystemClock;
        let mut ctx = RequestContext::new(Actor::new(42, [2]), &mut session, &clock);

        let saved = save_note(&mut service, &mut ctx, &id.to_string(), "<p>updated</p>").unwrap();

        assert!(saved);
        assert!(ctx.notices.contains(text::SAVED));
        assert_eq!(
            service.repo().get_content(id).unwrap().as_deref(),
            Some("<p>updated</p>")
        );
    }
}
