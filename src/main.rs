//! msgen CLI.
//!
//! Entry point for the `msgen` command-line tool.

use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use msgen::backend::{Backend, HttpBackend, HttpBackendConfig};
use msgen::config::ClientConfig;
use msgen::mock::MockService;
use msgen::poll::{FailureKind, JobPoller, PollerConfig};
use msgen::signal;
use msgen::statement::editor::StatementEditor;
use msgen::statement::export::build_export_payload;
use msgen::statement::MethodStatement;
use msgen_parser::{highlight_measurements, parse_step_content};
use msgen_protocol::{CreateJobRequest, ProjectDetails};

#[derive(Parser)]
#[command(name = "msgen")]
#[command(about = "Method statement generation client", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a method statement from a work description
    Generate(GenerateArgs),

    /// Cancel a running generation job
    Cancel {
        /// Job ID to cancel
        job_id: String,

        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Parse a step body and print its structured view
    Explain {
        /// Read the step body from this file (default: stdin)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// Human-readable output instead of JSON
        #[arg(long)]
        human: bool,

        /// Include measurement segmentation
        #[arg(long)]
        measurements: bool,
    },

    /// Build the PDF export payload from a statement JSON file
    Export {
        /// Statement JSON produced by `generate` (possibly edited)
        input: PathBuf,

        /// Write the payload here instead of calling the render service
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Check the generation service is reachable
    Health {
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Description of the installation work
    description: String,

    #[arg(long)]
    project_name: Option<String>,

    #[arg(long)]
    location: Option<String>,

    /// Kind of installation (domestic, commercial, industrial)
    #[arg(long)]
    work_type: Option<String>,

    /// Path to config file (default: ~/.config/msgen/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Write the statement JSON here instead of stdout
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Run against the in-process mock service
    #[arg(long)]
    dry_run: bool,

    /// Print every progress update
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Generate(args) => cmd_generate(args),
        Commands::Cancel { job_id, config } => cmd_cancel(&job_id, config.as_deref()),
        Commands::Explain {
            file,
            human,
            measurements,
        } => cmd_explain(file.as_deref(), human, measurements),
        Commands::Export { input, out, config } => {
            cmd_export(&input, out.as_deref(), config.as_deref())
        }
        Commands::Health { config } => cmd_health(config.as_deref()),
    };

    process::exit(code);
}

fn load_config(path: Option<&std::path::Path>) -> Result<ClientConfig, i32> {
    ClientConfig::load(path).map_err(|err| {
        eprintln!("Error: {}", err);
        2
    })
}

fn http_backend(config: &ClientConfig) -> HttpBackend {
    HttpBackend::new(HttpBackendConfig {
        base_url: config.base_url.clone(),
        request_timeout: config.request_timeout,
    })
}

fn cmd_generate(args: GenerateArgs) -> i32 {
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let backend: Arc<dyn Backend> = if args.dry_run {
        eprintln!("Dry-run: using the in-process mock service.");
        Arc::new(MockService::new())
    } else {
        Arc::new(http_backend(&config))
    };

    let cancel_flag = match signal::install() {
        Ok(flag) => flag,
        Err(err) => {
            eprintln!("Warning: cannot install Ctrl-C handler ({}); cancellation via signal disabled.", err);
            // unattached flag; the loop just never sees a signal
            signal::CancelFlag::new()
        }
    };

    let request = CreateJobRequest {
        query: args.description,
        project_details: ProjectDetails {
            project_name: args.project_name,
            location: args.location,
            work_type: args.work_type,
        },
        context: None,
    };

    let mut poller = JobPoller::with_config(
        backend,
        PollerConfig {
            poll_interval: config.poll_interval,
            overall_timeout: config.overall_timeout,
        },
    );

    eprintln!("Submitting generation job...");
    let mut last_stage = None;
    let result = poller.run(&request, cancel_flag.cancel_requested(), |job_id, progress| {
        let stage = progress.map(|p| p.stage);
        if args.verbose || stage != last_stage {
            match progress {
                Some(p) if p.message.is_empty() => eprintln!("  [{}] {}", job_id, p.stage),
                Some(p) => eprintln!("  [{}] {}: {}", job_id, p.stage, p.message),
                None => eprintln!("  [{}] waiting for the service...", job_id),
            }
        }
        last_stage = stage;
    });

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("Error: {}", err);
            return err.exit_code();
        }
    };

    eprintln!(
        "Job {} complete: {} step(s).",
        outcome.job_id,
        outcome.statement.steps.len()
    );

    let json = match outcome.statement.to_json() {
        Ok(json) => json,
        Err(err) => {
            eprintln!("Error: cannot serialize statement: {}", err);
            return FailureKind::Export as i32;
        }
    };

    match args.out.as_deref() {
        Some(path) => {
            if let Err(err) = std::fs::write(path, json) {
                eprintln!("Error: cannot write {}: {}", path.display(), err);
                return FailureKind::Export as i32;
            }
            eprintln!("Wrote: {}", path.display());
        }
        None => println!("{}", json),
    }

    0
}

fn cmd_cancel(job_id: &str, config_path: Option<&std::path::Path>) -> i32 {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let backend = http_backend(&config);

    match backend.cancel_job(job_id) {
        Ok(ack) if ack.cancelled => {
            eprintln!("Cancellation requested for job {}.", job_id);
            0
        }
        Ok(_) => {
            eprintln!("Service declined to cancel job {} (already finished?).", job_id);
            FailureKind::Cancelled as i32
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            FailureKind::Transport as i32
        }
    }
}

fn cmd_health(config_path: Option<&std::path::Path>) -> i32 {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let backend = http_backend(&config);

    match backend.health() {
        Ok(health) => {
            match &health.version {
                Some(version) => println!("{} ({})", health.status, version),
                None => println!("{}", health.status),
            }
            if health.is_healthy() {
                0
            } else {
                1
            }
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            FailureKind::Transport as i32
        }
    }
}

fn cmd_explain(file: Option<&std::path::Path>, human: bool, measurements: bool) -> i32 {
    let content = match file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("Error: cannot read {}: {}", path.display(), err);
                return 2;
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(err) = std::io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error: cannot read stdin: {}", err);
                return 2;
            }
            buffer
        }
    };

    let parsed = parse_step_content(&content);

    if human {
        if !parsed.overview.is_empty() {
            println!("Overview: {}", parsed.overview);
        }
        for sub in &parsed.sub_steps {
            println!("{}", sub.title);
            for item in &sub.items {
                println!("  - {}", item);
            }
        }
        if !parsed.regulations.is_empty() {
            println!("Regulations: {}", parsed.regulations.join(", "));
        }
        if measurements {
            let tokens: Vec<String> = highlight_measurements(&content)
                .iter()
                .filter(|s| s.is_measurement())
                .map(|s| s.text().to_string())
                .collect();
            if !tokens.is_empty() {
                println!("Measurements: {}", tokens.join(", "));
            }
        }
        return 0;
    }

    let output = if measurements {
        serde_json::json!({
            "parsed": parsed,
            "segments": highlight_measurements(&content),
        })
    } else {
        serde_json::json!({ "parsed": parsed })
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            2
        }
    }
}

fn cmd_export(
    input: &std::path::Path,
    out: Option<&std::path::Path>,
    config_path: Option<&std::path::Path>,
) -> i32 {
    let text = match std::fs::read_to_string(input) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("Error: cannot read {}: {}", input.display(), err);
            return FailureKind::Export as i32;
        }
    };

    let statement = match MethodStatement::from_json(&text) {
        Ok(statement) => statement,
        Err(err) => {
            eprintln!("Error: {} is not a statement JSON: {}", input.display(), err);
            return FailureKind::Export as i32;
        }
    };

    // re-establish dense numbering before projecting
    let statement = StatementEditor::new(statement).into_statement();
    let payload = build_export_payload(&statement, Utc::now());

    match out {
        Some(path) => {
            if let Err(err) = payload.write_to_file(path) {
                eprintln!("Error: cannot write {}: {}", path.display(), err);
                return FailureKind::Export as i32;
            }
            eprintln!("Wrote: {}", path.display());
            0
        }
        None => {
            let config = match load_config(config_path) {
                Ok(config) => config,
                Err(code) => return code,
            };
            let backend = http_backend(&config);

            match backend.render_pdf(&payload) {
                Ok(document) => {
                    println!("{}", document.public_url);
                    0
                }
                Err(err) => {
                    eprintln!("Error: {}", err);
                    FailureKind::Export as i32
                }
            }
        }
    }
}
