use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use ossia_session::telemetry::{self, TelemetryConfig};
use ossia_session::{
    ChannelNavigator, ClientConfig, CookieCredential, CredentialProvider, NavigationRequest,
    ReqwestClient, SessionStore, SharedCredential,
};
use reqwest::cookie::Jar;
use tracing::warn;
use url::Url;

#[derive(Parser)]
#[command(version, about = "Refresh an ossia session and print what the viewer sees", long_about = None)]
struct Args {
    /// Site origin, e.g. https://ossia.example
    #[arg(long, env = "OSSIA_BASE_URL")]
    base_url: Url,

    /// API path prefix under the origin
    #[arg(long, env = "OSSIA_API_ENDPOINT", default_value = "")]
    api_endpoint: String,

    /// Login entry point used when the token is rejected
    #[arg(long, env = "OSSIA_LOGIN_PATH", default_value = ClientConfig::DEFAULT_LOGIN_PATH)]
    login_path: String,

    /// Bearer token; omit to probe anonymously
    #[arg(long, env = "OSSIA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Browser-style cookie string (`name=value; other=value`), read for the
    /// token when --token is not given
    #[arg(long, env = "OSSIA_COOKIES", hide_env_values = true)]
    cookies: Option<String>,

    /// Name of the cookie holding the token
    #[arg(long, env = "OSSIA_CREDENTIAL_COOKIE", default_value = ClientConfig::DEFAULT_CREDENTIAL_COOKIE)]
    credential_cookie: String,

    /// Request timeout in seconds
    #[arg(long, env = "OSSIA_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_miette();
    telemetry::init(TelemetryConfig::from_env("session-probe"));

    let args = Args::parse();
    let config = ClientConfig::new(args.base_url)
        .with_api_endpoint(args.api_endpoint)
        .with_login_path(args.login_path)
        .with_credential_cookie(args.credential_cookie)
        .with_timeout(Duration::from_secs(args.timeout_secs));

    let client = ReqwestClient::new(&config)?;
    let credential: Arc<dyn CredentialProvider> = match (args.token, args.cookies) {
        (Some(token), _) => Arc::new(SharedCredential::with_token(token)),
        (None, Some(cookies)) => {
            let jar = Arc::new(Jar::default());
            let api_base = config.api_base().into_diagnostic()?;
            for pair in cookies.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                jar.add_cookie_str(pair, &api_base);
            }
            Arc::new(CookieCredential::from_config(jar, &config)?)
        }
        (None, None) => Arc::new(SharedCredential::new()),
    };
    let (navigator, mut navigation) = ChannelNavigator::channel();
    let login_url = config.login_url().into_diagnostic()?;

    let store = SessionStore::from_parts(client, config, credential, Arc::new(navigator));
    store.refresh_all().await;

    while let Ok(NavigationRequest::Login { path }) = navigation.try_recv() {
        warn!(%path, "session asked to navigate to login");
        println!("Token rejected, log in again at {login_url}");
    }

    let state = store.snapshot();
    match state.identity() {
        Some(identity) => {
            println!(
                "Signed in as @{} ({}), id {}",
                identity.username, identity.display_name, identity.id
            );
            if identity.has_avatar {
                println!("  avatar: yes");
            }
        }
        None => println!("Not signed in"),
    }

    match state.creators() {
        None => println!("Creators: not loaded"),
        Some([]) => println!("Creators: none"),
        Some(creators) => {
            println!("Creators:");
            for creator in creators {
                let name = if creator.display_name.is_empty() {
                    creator.url.as_str()
                } else {
                    creator.display_name.as_str()
                };
                println!("  {} -> {} ({})", creator.url, name, creator.id);
            }
        }
    }

    #[cfg(feature = "telemetry")]
    print!("{}", telemetry::render());

    Ok(())
}

fn init_miette() {
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }));
    miette::set_panic_hook();
}
