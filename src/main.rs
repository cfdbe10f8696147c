use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use intake_rs::collaborators::{
    Classifier, HttpClassifier, LlmDecisionMaker, LlmDocumentChecker, LlmFieldParser,
    LlmResponseComposer,
};
use intake_rs::config::IntakeConfig;
use intake_rs::llm::{ChatModel, OllamaModel};
use intake_rs::workflow::stages::{
    EligibilityEvaluator, Extractor, ResponseGenerator, Validator,
};
use intake_rs::workflow::{
    DecisionAdapter, DocumentKind, Orchestrator, RunOutcome, WorkflowExecutor, WorkflowState,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one application through the workflow
    Run {
        /// Documents as kind=path pairs, e.g. application_form=form.txt
        #[arg(short, long, required = true, num_args = 1..)]
        documents: Vec<String>,
    },
    /// Serve the eligibility API over HTTP
    Serve {
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

fn build_executor(config: &IntakeConfig) -> anyhow::Result<WorkflowExecutor> {
    let model: Arc<dyn ChatModel> = Arc::new(OllamaModel::new(config)?);

    // The classifier is constructed once here and shared read-only
    let classifier: Option<Arc<dyn Classifier>> = match &config.classifier_url {
        Some(url) => {
            log::info!("using classifier at {}", url);
            Some(Arc::new(HttpClassifier::new(url.clone(), config.call_timeout)?))
        }
        None => {
            log::info!("no CLASSIFIER_URL set, eligibility uses the rule fallback");
            None
        }
    };

    let orchestrator = Orchestrator::new(
        DecisionAdapter::new(Arc::new(LlmDecisionMaker::new(model.clone()))),
        Arc::new(Extractor::new(Arc::new(LlmFieldParser::new(model.clone())))),
        Arc::new(Validator::new(Arc::new(LlmDocumentChecker::new(
            model.clone(),
        )))),
        Arc::new(EligibilityEvaluator::new(classifier)),
        Arc::new(ResponseGenerator::new(Arc::new(LlmResponseComposer::new(
            model,
        )))),
        config.max_iterations,
    );

    Ok(WorkflowExecutor::new(orchestrator))
}

fn load_documents(specs: &[String]) -> anyhow::Result<HashMap<DocumentKind, String>> {
    let mut documents = HashMap::new();
    for spec in specs {
        let Some((kind, path)) = spec.split_once('=') else {
            bail!("expected kind=path, got '{}'", spec);
        };
        let kind: DocumentKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {} from {}", kind, path))?;
        documents.insert(kind, text);
    }
    Ok(documents)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = IntakeConfig::from_env();

    match args.command {
        Commands::Run { documents } => {
            let executor = build_executor(&config)?;
            let state = WorkflowState::new(load_documents(&documents)?);

            match executor.run(state).await {
                Ok(RunOutcome::Completed(response)) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Ok(RunOutcome::Cancelled) => {
                    bail!("run cancelled");
                }
                Err(e) => {
                    bail!("run failed: {}", e);
                }
            }
        }
        Commands::Serve { port } => {
            let executor = Arc::new(build_executor(&config)?);
            intake_rs::server::serve(executor, port).await?;
        }
    }

    Ok(())
}
