//! `formflow` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`    — start the API server.
//! - `migrate`  — run pending database migrations.
//! - `validate` — validate a workflow definition file against a form catalog.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use api::AppState;
use catalog::{DefinitionRepository, FormCatalog};
use store::{MemorySubmissionStore, PgSubmissionStore, SubmissionStore};

#[derive(Parser)]
#[command(
    name = "formflow",
    about = "Guided form-filing workflow engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        /// Directory of workflow definition YAML files.
        #[arg(long, default_value = "config/workflows")]
        definitions: PathBuf,
        /// Form schema YAML file.
        #[arg(long, default_value = "config/forms.yaml")]
        forms: PathBuf,
        /// Postgres URL; omit to keep submissions in memory.
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
    /// Run pending database migrations.
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Validate a workflow definition YAML file.
    Validate {
        /// Path to the workflow YAML file.
        path: PathBuf,
        /// Form schema YAML file.
        #[arg(long, default_value = "config/forms.yaml")]
        forms: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            bind,
            definitions,
            forms,
            database_url,
        } => {
            info!("Starting API server on {bind}");
            let forms = Arc::new(
                FormCatalog::from_path(&forms).expect("failed to load form catalog"),
            );
            let repository = Arc::new(
                DefinitionRepository::open(definitions, forms.clone())
                    .expect("failed to load workflow definitions"),
            );

            let submissions: Arc<dyn SubmissionStore> = match database_url {
                Some(url) => {
                    let pool = store::pool::create_pool(&url, 10)
                        .await
                        .expect("failed to connect to database");
                    Arc::new(PgSubmissionStore::new(pool, forms))
                }
                None => {
                    info!("no DATABASE_URL set; keeping submissions in memory");
                    Arc::new(MemorySubmissionStore::new(forms))
                }
            };

            let state = AppState::new(repository, submissions);
            api::serve(&bind, state).await.expect("server failed");
        }
        Command::Migrate { database_url } => {
            info!("Running migrations");
            let pool = store::pool::create_pool(&database_url, 2)
                .await
                .expect("failed to connect to database");
            store::pool::run_migrations(&pool)
                .await
                .expect("migration failed");
            info!("Migrations applied successfully");
        }
        Command::Validate { path, forms } => {
            let forms = FormCatalog::from_path(&forms)
                .unwrap_or_else(|e| panic!("cannot load form catalog: {e}"));

            match catalog::load_definition_file(&path, &forms) {
                Ok(definition) => {
                    println!(
                        "✅ '{}' is valid — {} step(s):",
                        definition.id,
                        definition.total_steps()
                    );
                    for step in &definition.steps {
                        let required = if step.required { "required" } else { "optional" };
                        let mapped = if step.field_mappings.is_empty() {
                            String::new()
                        } else {
                            format!(", {} mapped field(s)", step.field_mappings.len())
                        };
                        println!("  {}. {} ({required}{mapped})", step.position, step.form_id);
                    }
                }
                Err(e) => {
                    eprintln!("❌ Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
