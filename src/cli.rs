use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use crate::{
    env::BuildEnv,
    locator::locate_artifact,
    model::{ApiToken, Project, UploadParameters},
    outputs::{BuildOutputs, LogOutputs, OutputFile},
    pipeline::Pipeline,
    progress::{LogObserver, UploadEvent, UploadObserver},
    projects::{GlobalConfig, list_projects},
};

#[derive(Parser, Debug)]
#[command(name = "sonic-upload", version, about = "Upload ipa/apk build packages to Sonic", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find the newest package, upload it and register it with a project
    Upload {
        /// Sonic server URL, may contain ${VAR} placeholders
        #[arg(long, env = "SONIC_HOST")]
        host: String,
        /// Sonic API token
        #[arg(long, env = "SONIC_API_KEY", hide_env_values = true)]
        api_key: String,
        /// Directory searched recursively for ipa/apk files
        #[arg(short, long, env = "SONIC_SCAN_DIR", default_value = ".")]
        scan_dir: String,
        /// Numeric Sonic project ID
        #[arg(short, long, env = "SONIC_PROJECT_ID", default_value = "")]
        project_id: String,
        /// File receiving `appURL=<url>` for later build steps
        #[arg(long, env = "GITHUB_OUTPUT")]
        output_file: Option<PathBuf>,
        /// Log progress instead of drawing a progress bar
        #[arg(long)]
        no_progress: bool,
    },
    /// List Sonic projects
    Projects {
        /// Sonic server URL
        #[arg(long)]
        host: Option<String>,
        /// Pick a project interactively and print its ID
        #[arg(long)]
        pick: bool,
    },
    /// Print the package an upload would pick
    Find {
        /// Directory searched recursively for ipa/apk files
        #[arg(short, long, default_value = ".")]
        scan_dir: PathBuf,
    },
}

pub async fn run_cli() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Upload {
            host,
            api_key,
            scan_dir,
            project_id,
            output_file,
            no_progress,
        } => {
            let params = UploadParameters {
                host,
                api_key: ApiToken::new(api_key),
                scan_dir,
                project_id,
            };
            upload_cmd(&params, output_file, no_progress).await
        }
        Commands::Projects { host, pick } => {
            let config = GlobalConfig::from_env().with_host(host);
            projects_cmd(&config, pick).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Find { scan_dir } => {
            find_cmd(&scan_dir)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "sonic_upload=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb
}

/// Draws upload progress as a percentage bar.
struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40}] {pos:>3}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl UploadObserver for BarObserver {
    fn on_event(&self, event: &UploadEvent) {
        match event {
            UploadEvent::Started { file_name, .. } => self.bar.set_message(file_name.clone()),
            UploadEvent::Progress { percent } => self.bar.set_position(u64::from(*percent)),
            UploadEvent::Finished => self.bar.finish_and_clear(),
            UploadEvent::Failed(reason) => self
                .bar
                .abandon_with_message(format!("upload exception: {}", reason)),
        }
    }
}

async fn upload_cmd(
    params: &UploadParameters,
    output_file: Option<PathBuf>,
    no_progress: bool,
) -> Result<ExitCode> {
    let env = BuildEnv::from_process();
    let mut file_outputs;
    let mut log_outputs = LogOutputs;
    let outputs: &mut dyn BuildOutputs = match output_file {
        Some(path) => {
            file_outputs = OutputFile::new(path);
            &mut file_outputs
        }
        None => &mut log_outputs,
    };
    let observer: Arc<dyn UploadObserver> = if no_progress {
        Arc::new(LogObserver)
    } else {
        Arc::new(BarObserver::new())
    };

    let ok = Pipeline::new(&env, outputs)
        .with_observer(observer)
        .run(params)
        .await;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn projects_cmd(config: &GlobalConfig, pick: bool) -> Result<()> {
    let pb = spinner("Loading projects...");
    let projects = list_projects(config).await;
    pb.finish_and_clear();
    let projects = projects.context("Failed to list Sonic projects")?;

    if projects.is_empty() {
        println!("No Sonic projects found");
        return Ok(());
    }

    if pick {
        let theme = ColorfulTheme::default();
        let items: Vec<String> = projects.iter().map(project_label).collect();
        let idx = Select::with_theme(&theme)
            .with_prompt("Select a project")
            .default(0)
            .items(&items)
            .interact()?;
        if let Some(project) = projects.get(idx) {
            println!("{}", project.id);
        }
        return Ok(());
    }

    for p in projects {
        println!("{}\t{}", p.id, p.project_name);
    }
    Ok(())
}

fn project_label(project: &Project) -> String {
    match project.project_des.as_deref() {
        Some(des) if !des.trim().is_empty() => format!("{} - {}", project.project_name, des),
        _ => project.project_name.clone(),
    }
}

fn find_cmd(scan_dir: &std::path::Path) -> Result<()> {
    let artifact = locate_artifact(scan_dir)
        .with_context(|| format!("No package found in {}", scan_dir.display()))?;
    println!("{}", artifact.path.display());
    Ok(())
}
