use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use admin_gateway::client::{
    ApiClient, Environment, Error, FileTokenStore, QueryParams, RequestOptions, Session,
    SessionEvent, UploadFile, UploadOptions,
};
use admin_gateway::config::{self, GatewayConfig};
use admin_gateway::observability::logging;
use admin_gateway::services::auth;
use clap::{Args, Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the admin dashboard API", long_about = None)]
struct Cli {
    /// Gateway configuration file (TOML)
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Origin of a running gateway; requests go through its forwarder
    #[arg(long, env = "GATEWAY_ORIGIN")]
    proxy: Option<Url>,

    /// Token storage file (overrides `session.token_store`)
    #[arg(long)]
    token_store: Option<PathBuf>,

    /// Accept-Language sent with every request
    #[arg(long)]
    locale: Option<String>,

    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session tokens
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the target API and session state
    Status,
    /// GET an endpoint
    Get {
        endpoint: String,
        /// Query parameter (repeatable)
        #[arg(short, long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
    /// POST a JSON body
    Post(BodyArgs),
    /// PUT a JSON body
    Put(BodyArgs),
    /// PATCH a JSON body
    Patch(BodyArgs),
    /// DELETE an endpoint
    Delete(BodyArgs),
    /// Upload a file as multipart/form-data
    Upload {
        endpoint: String,
        file: PathBuf,
        /// Multipart field name of the file
        #[arg(long, default_value = "file")]
        field: String,
        /// Extra form field (repeatable)
        #[arg(short = 'f', long = "form", value_parser = parse_pair)]
        fields: Vec<(String, String)>,
        #[arg(long, default_value = "POST")]
        method: Method,
    },
}

#[derive(Args)]
struct BodyArgs {
    endpoint: String,
    /// JSON request body
    #[arg(short, long, value_parser = parse_json)]
    data: Option<Value>,
    /// Query parameter (repeatable)
    #[arg(short, long = "param", value_parser = parse_pair)]
    params: Vec<(String, String)>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

fn options(params: Vec<(String, String)>) -> RequestOptions {
    RequestOptions::new().params(params.into_iter().collect::<QueryParams>())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_cli(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(e.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn report(error: &(dyn std::error::Error + 'static)) {
    match error.downcast_ref::<Error>().and_then(Error::api) {
        Some(api) => {
            eprintln!("Error: API returned status {}: {}", api.status.as_u16(), api.message);
            if let Some(text) = api.body.as_text() {
                eprintln!("Response: {text}");
            }
        }
        None => eprintln!("Error: {error}"),
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load(cli.config.as_deref())?;
    let client = build_client(&cli, &config)?;

    let mut events = client.session().subscribe();
    let result = execute(&client, cli.command).await;

    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Expired { .. } = event {
            eprintln!("Session expired. Run `gateway-cli login` to sign in again.");
        }
    }
    result
}

fn build_client(cli: &Cli, config: &GatewayConfig) -> Result<ApiClient, Box<dyn std::error::Error>> {
    let store_path = cli
        .token_store
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.session.token_store));
    let session = Arc::new(Session::hydrate(Arc::new(FileTokenStore::new(store_path)))?);

    let environment = match &cli.proxy {
        Some(origin) => Environment::browser(origin.clone(), config),
        None => Environment::server(config)?,
    };

    let timeout = config.timeouts.upstream_secs.map(Duration::from_secs);
    let client = ApiClient::new(environment, session, timeout)?;
    client.set_locale(cli.locale.clone().or_else(|| config.session.locale.clone()));
    Ok(client)
}

async fn execute(client: &ApiClient, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Login { email, password } => {
            let response = auth::login(client, &email, &password).await?;
            println!(
                "Logged in{}",
                response
                    .role
                    .map(|role| format!(" as {role}"))
                    .unwrap_or_default()
            );
        }
        Commands::Logout => {
            auth::logout(client)?;
            println!("Logged out");
        }
        Commands::Status => {
            let mode = match client.environment() {
                Environment::Browser(_) => "forwarder",
                Environment::Server(_) => "direct",
            };
            println!("API:           {} ({mode})", client.base_url());
            println!("Authenticated: {}", client.session().is_authenticated());
        }
        Commands::Get { endpoint, params } => {
            let value: Value = client.get(&endpoint, &options(params)).await?;
            print_json(&value)?;
        }
        Commands::Post(args) => send(client, Method::POST, args).await?,
        Commands::Put(args) => send(client, Method::PUT, args).await?,
        Commands::Patch(args) => send(client, Method::PATCH, args).await?,
        Commands::Delete(args) => send(client, Method::DELETE, args).await?,
        Commands::Upload {
            endpoint,
            file,
            field,
            fields,
            method,
        } => {
            let file = UploadFile::from_path(&file).await?;
            let upload = fields
                .into_iter()
                .fold(UploadOptions::new().field_name(field).method(method), |opts, (k, v)| {
                    opts.field(k, v)
                });
            let value: Value = client.upload(&endpoint, file, upload).await?;
            print_json(&value)?;
        }
    }
    Ok(())
}

async fn send(client: &ApiClient, method: Method, args: BodyArgs) -> Result<(), Error> {
    let options = options(args.params);
    let body = args.data.as_ref();
    let value: Value = match method {
        Method::POST => client.post(&args.endpoint, body, &options).await?,
        Method::PUT => client.put(&args.endpoint, body, &options).await?,
        Method::PATCH => client.patch(&args.endpoint, body, &options).await?,
        _ => client.delete(&args.endpoint, body, &options).await?,
    };
    print_json(&value).map_err(Error::Encode)
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    match value {
        Value::Null => {}
        Value::String(text) => println!("{text}"),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}
