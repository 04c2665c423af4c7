use clap::Parser;
use token_keeper::{
    retry::ExponentialBackoff, ClientId, ClientSecret, HttpTokenTransport, OAuthConfig,
    TokenLifecycleManager,
};

#[derive(Debug, Parser)]
struct Opts {
    /// The issuing authority's token request URL
    #[arg(short, long, env)]
    token_url: String,

    /// The client ID of the client
    #[arg(short, long, env)]
    client_id: String,

    /// The client secret used to identify the client to the issuing authority
    #[arg(short = 's', long, env, hide_env_values = true)]
    client_secret: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let client = reqwest::Client::builder().https_only(true).build()?;

    let config = OAuthConfig::new(
        ClientId::new(opts.client_id),
        ClientSecret::new(opts.client_secret),
        opts.token_url,
    );
    let manager = TokenLifecycleManager::new(HttpTokenTransport::new(client), config)
        .with_retry_policy(ExponentialBackoff::default());

    let token = manager.get_valid_token().await?;
    tracing::info!(token = format_args!("{:?}", token), "first access token");

    let info = manager.expiration_info();
    println!("{}", serde_json::to_string_pretty(&info)?);

    // A second call should be served from the cache without another request.
    manager.get_valid_token().await?;

    Ok(())
}
