mod reasoner;
mod server;

use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use deduct_core::{Pipeline, Request, Response, Term, encode, n3, render, resolve};
use deduct_store::{Bundle, Config, bundle::load_ground};
use tokio_util::sync::CancellationToken;

use crate::reasoner::Gateway;

#[derive(Parser)]
#[command(name = "deduct", about = "Answer HTTP requests by reasoning over N3 rules")]
struct Cli {
    /// Config file (default: $DEDUCT_CONFIG, then ./deduct.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server until Ctrl+C
    Serve {
        /// Listen address, overriding the config
        #[arg(long)]
        addr: Option<SocketAddr>,
    },

    /// Push one request through the reasoner and print the response body
    Request {
        #[command(flatten)]
        request: RequestArgs,

        /// Print status and content type before the body
        #[arg(long)]
        header: bool,
    },

    /// Print the fact graph a request encodes to, without reasoning
    Encode {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Resolve the response for a request node in a saved closure
    Resolve {
        /// N3 file holding the closure
        closure: PathBuf,

        /// IRI of the request node
        request: String,
    },

    /// Render one hypertext node from an N3 file
    Render {
        /// N3 file holding the element tree
        file: PathBuf,

        /// IRI of the node to render
        node: String,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Request path, e.g. /hello
    path: String,

    /// HTTP method
    #[arg(long, default_value = "GET")]
    method: String,

    /// File to send as the request body
    #[arg(long)]
    body: Option<PathBuf>,

    /// Content type of the body (guessed from the extension if omitted)
    #[arg(long)]
    content_type: Option<String>,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve { addr } => cmd_serve(&cli, *addr).await.map(|()| ExitCode::SUCCESS),
        Commands::Request { request, header } => cmd_request(&cli, request, *header).await,
        Commands::Encode { request } => cmd_encode(&cli, request).map(|()| ExitCode::SUCCESS),
        Commands::Resolve { closure, request } => cmd_resolve(closure, request),
        Commands::Render { file, node } => cmd_render(file, node).map(|()| ExitCode::SUCCESS),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    Config::discover(cli.config.as_deref()).context("failed to load config")
}

fn build_pipeline(config: &Config) -> Result<Pipeline<Gateway>> {
    let bundle = Bundle::load(config).context("failed to load application bundle")?;
    let gateway = Gateway::from_config(&config.reasoner)?;
    Ok(Pipeline::new(gateway, &bundle.ground, bundle.rules))
}

fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ttl") => "text/turtle",
        Some("n3") => "text/n3",
        Some("nt") => "application/n-triples",
        Some("json") => "application/json",
        Some("html") => "text/html",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn build_request(config: &Config, args: &RequestArgs) -> Result<Request> {
    let origin = config
        .server
        .base_url
        .clone()
        .unwrap_or_else(|| format!("http://{}", config.server.addr));
    let path = if args.path.starts_with('/') {
        args.path.clone()
    } else {
        format!("/{}", args.path)
    };
    let href = format!("{}{path}", origin.trim_end_matches('/'));
    let mut request = Request::new(&args.method.to_ascii_uppercase(), &href);

    if let Some(file) = &args.body {
        let body = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
        let content_type = args
            .content_type
            .clone()
            .unwrap_or_else(|| guess_content_type(file).to_string());
        request = request.with_body(&content_type, body);
    } else if let Some(content_type) = &args.content_type {
        request.content_type = Some(content_type.clone());
    }
    Ok(request)
}

fn print_response(response: &Response, header: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if header {
        writeln!(out, "{} {}", response.status, response.content_type)?;
        writeln!(out)?;
    }
    out.write_all(response.body.as_bytes())?;
    if !response.body.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

fn exit_code(response: &Response) -> ExitCode {
    if (200..300).contains(&response.status) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn cmd_serve(cli: &Cli, addr: Option<SocketAddr>) -> Result<()> {
    let config = load_config(cli)?;
    let pipeline = build_pipeline(&config)?;
    let addr = addr.unwrap_or(config.server.addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;
    tracing::info!(
        addr = %local,
        ground = pipeline.ground_len(),
        rules = pipeline.rules().len(),
        "listening"
    );
    let shutdown = CancellationToken::new();
    watch_signals(shutdown.clone())?;

    println!("listening on http://{local}");
    std::io::stdout().flush()?;

    let state = server::AppState::new(pipeline, &config.server);
    server::serve(listener, state, shutdown)
        .await
        .context("server error")?;
    tracing::info!("server stopped");
    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM. Handlers are in place on return.
#[cfg(unix)]
fn watch_signals(token: CancellationToken) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt()).context("failed to register SIGINT handler")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("failed to register SIGTERM handler")?;
    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => {},
            _ = terminate.recv() => {},
        }
        tracing::info!("shutting down");
        token.cancel();
    });
    Ok(())
}

#[cfg(not(unix))]
fn watch_signals(token: CancellationToken) -> Result<()> {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("shutting down");
        token.cancel();
    });
    Ok(())
}

async fn cmd_request(cli: &Cli, args: &RequestArgs, header: bool) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let pipeline = build_pipeline(&config)?;
    let request = build_request(&config, args)?;

    let response = pipeline.respond(&request).await;
    print_response(&response, header)?;
    Ok(exit_code(&response))
}

fn cmd_encode(cli: &Cli, args: &RequestArgs) -> Result<()> {
    let config = load_config(cli)?;
    let request = build_request(&config, args)?;
    let encoded = encode(&request).context("failed to encode request")?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "# request {}", encoded.node)?;
    out.write_all(n3::serialize(&encoded.store).as_bytes())?;
    Ok(())
}

fn cmd_resolve(closure: &Path, request: &str) -> Result<ExitCode> {
    let text = std::fs::read_to_string(closure)
        .with_context(|| format!("failed to read {}", closure.display()))?;
    let store = n3::parse(&text).with_context(|| format!("failed to parse {}", closure.display()))?;
    let response = resolve(&store, &Term::iri(request)).context("failed to resolve response")?;
    print_response(&response, true)?;
    Ok(exit_code(&response))
}

fn cmd_render(file: &Path, node: &str) -> Result<()> {
    let store = load_ground(file).with_context(|| format!("failed to load {}", file.display()))?;
    let markup = render(&store, &Term::iri(node)).context("failed to render")?;
    println!("{markup}");
    Ok(())
}
