use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    paging::is_allowed_page_size,
    sort::{SortOrder, TaskSort, TaskSortKey},
    ControllerOptions, HttpApi, ResourceApi, ResourceListController,
};
use shared::{
    domain::ResourceKind,
    protocol::{Company, Department, Employee, Position, Project, RegisterRequest, Task},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod table;
mod view;

use config::{load_settings, Settings};
use table::{footer, render_table, TableRow};
use view::{run_interactive, ListView};

#[derive(Parser, Debug)]
#[command(name = "teamsphere-admin", about = "Administer TeamSphere records")]
struct Cli {
    /// TOML settings file; defaults to ./teamsphere.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Status,
    Priority,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    List {
        resource: ResourceKind,
        /// One-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        query: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        #[arg(long)]
        desc: bool,
    },
    Get {
        resource: ResourceKind,
        id: i64,
    },
    Delete {
        resource: ResourceKind,
        id: i64,
    },
    Browse {
        resource: ResourceKind,
    },
}

/// Binds `$r` to the record type for `$kind` and evaluates `$body`.
macro_rules! with_resource {
    ($kind:expr, $r:ident => $body:expr) => {
        match $kind {
            ResourceKind::Company => {
                type $r = Company;
                $body
            }
            ResourceKind::Department => {
                type $r = Department;
                $body
            }
            ResourceKind::Employee => {
                type $r = Employee;
                $body
            }
            ResourceKind::Position => {
                type $r = Position;
                $body
            }
            ResourceKind::Project => {
                type $r = Project;
                $body
            }
            ResourceKind::Task => {
                type $r = Task;
                $body
            }
        }
    };
}

struct ListArgs {
    page: u32,
    size: u32,
    query: Option<String>,
    sort: Option<TaskSort>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }

    let filter =
        EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(rejected) = settings.normalize_page_size() {
        warn!(size = rejected, "unsupported default page size, using 10");
    }

    let http = HttpApi::new(&settings.api_url, settings.request_timeout())
        .with_context(|| format!("invalid api url '{}'", settings.api_url))?;
    if let Some(token) = settings.api_token.clone() {
        http.set_token(Some(token)).await;
    }
    info!(
        api_url = %settings.api_url,
        authenticated = http.token().await.is_some(),
        "using TeamSphere API"
    );

    match cli.command {
        Command::Login { email, password } => {
            let token = http.login(&email, &password).await.context("login failed")?;
            println!("{token}");
        }
        Command::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            let request = RegisterRequest {
                first_name,
                last_name,
                email,
                password,
            };
            let token = http.register(&request).await.context("registration failed")?;
            println!("{token}");
        }
        Command::List {
            resource,
            page,
            size,
            query,
            sort,
            desc,
        } => {
            let sort = sort.map(|key| {
                let key = match key {
                    SortArg::Status => TaskSortKey::Status,
                    SortArg::Priority => TaskSortKey::Priority,
                };
                let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
                TaskSort::new(key, order)
            });
            if sort.is_some() && resource != ResourceKind::Task {
                bail!("--sort is only available for tasks");
            }
            let args = ListArgs {
                page: page.max(1) - 1,
                size: size.unwrap_or(settings.default_page_size),
                query,
                sort,
            };
            with_resource!(resource, R => list_once::<R>(&http, &settings, args).await)?;
        }
        Command::Get { resource, id } => {
            with_resource!(resource, R => show_one::<R>(&http, id).await)?;
        }
        Command::Delete { resource, id } => {
            with_resource!(resource, R => delete_one::<R>(&http, id).await)?;
        }
        Command::Browse { resource } => {
            let options = controller_options(&settings);
            with_resource!(resource, R => {
                run_interactive(ListView::<R>::new(http.clone(), options)).await
            })?;
        }
    }

    Ok(())
}

fn controller_options(settings: &Settings) -> ControllerOptions {
    ControllerOptions {
        fetch_timeout: settings.request_timeout(),
        initial_page_size: settings.default_page_size,
    }
}

async fn list_once<R: TableRow>(http: &HttpApi, settings: &Settings, args: ListArgs) -> Result<()> {
    if !is_allowed_page_size(args.size) {
        bail!("page size {} is not one of 10, 30, 50", args.size);
    }
    let list = ResourceListController::<R>::new(
        Arc::new(http.clone()),
        ControllerOptions {
            initial_page_size: args.size,
            ..controller_options(settings)
        },
    );

    let result = match args.query {
        Some(query) => match list.set_query(Some(query)).await {
            Ok(_) if args.page > 0 => list.fetch_page(args.page, args.size).await,
            other => other,
        },
        None => list.fetch_page(args.page, args.size).await,
    };
    let snapshot = list.snapshot().await;
    list.close().await;

    if let Err(err) = result {
        println!("Error: {err}");
        return Ok(());
    }
    println!("{}", R::KIND.title());
    let shown = snapshot.items.len();
    if snapshot.items.is_empty() {
        println!("No records");
    } else {
        println!("{}", render_table(&R::arrange(snapshot.items, args.sort)));
    }
    println!("{}", footer(&snapshot.page, shown));
    Ok(())
}

async fn show_one<R: TableRow>(http: &HttpApi, id: i64) -> Result<()> {
    let record = ResourceApi::<R>::get(http, R::Id::from(id))
        .await
        .with_context(|| format!("failed to load {} {id}", R::KIND.path()))?;
    println!("{}", render_table(std::slice::from_ref(&record)));
    Ok(())
}

async fn delete_one<R: TableRow>(http: &HttpApi, id: i64) -> Result<()> {
    ResourceApi::<R>::remove(http, R::Id::from(id))
        .await
        .with_context(|| format!("failed to delete {} {id}", R::KIND.path()))?;
    println!("Deleted {} {id}", R::KIND.path());
    Ok(())
}
