// qaops - Operational tooling for a SageMaker question-answering demo
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use qaops::config;
use qaops::deploy;
use qaops::predictor::SageMakerPredictor;
use qaops::server::{DemoConfig, DemoServer};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "qaops")]
#[command(about = "Deploy and serve a SageMaker question-answering demo", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Deploy the pretrained model to a managed endpoint and register autoscaling
    Deploy {
        /// Hub identifier of the model to host
        #[arg(long, default_value = "distilbert-base-uncased-distilled-squad")]
        model_id: String,

        /// Task the hosted model serves
        #[arg(long, default_value = "question-answering")]
        task: String,

        /// Instance type backing the endpoint
        #[arg(long, default_value = "ml.c5.large")]
        instance_type: String,

        /// Number of instances at creation time
        #[arg(long, default_value_t = 1)]
        instance_count: i32,
    },
    /// Serve the web demo form against an already-deployed endpoint
    Serve {
        /// Name of the deployed endpoint
        #[arg(long)]
        endpoint: String,

        /// Bind address
        #[arg(long, default_value = "0.0.0.0:80")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    match args.command {
        Command::Deploy {
            model_id,
            task,
            instance_type,
            instance_count,
        } => {
            run_deploy(model_id, task, instance_type, instance_count).await?;
        }
        Command::Serve { endpoint, bind } => {
            run_serve(endpoint, bind).await?;
        }
    }

    Ok(())
}

async fn run_deploy(
    model_id: String,
    task: String,
    instance_type: String,
    instance_count: i32,
) -> Result<()> {
    let settings = config::deploy_settings(model_id, task, instance_type, instance_count);

    println!("Deploying with profile '{}'...", settings.profile_name);

    let endpoint = deploy::run(settings).await?;

    println!("Endpoint deployed: {endpoint}");
    Ok(())
}

async fn run_serve(endpoint: String, bind: String) -> Result<()> {
    let predictor = Arc::new(SageMakerPredictor::connect(endpoint).await);
    let server = DemoServer::new(predictor, DemoConfig { bind_address: bind });

    server.serve().await
}

fn init_tracing() {
    // Default: INFO level, can be overridden with RUST_LOG env var
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
