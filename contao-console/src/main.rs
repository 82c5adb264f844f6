// Copyright 2025 Contao Bridge Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Contao console
//!
//! Boots the framework from a TOML configuration and a request described on
//! the command line, then prints what the legacy runtime would see.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use contao_framework::request::{
    REFERER_ID_ATTRIBUTE, ROUTE_ATTRIBUTE, SCOPE_ATTRIBUTE, TOKEN_CHECK_ATTRIBUTE,
};
use contao_framework::{
    AttributeScopeMatcher, ContaoFramework, Container, FrameworkConfig, Request,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "contao-console")]
#[command(about = "Inspect the Contao framework bootstrap", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines on stderr
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize the framework and print the bootstrap markers
    #[command(name = "debug:framework")]
    Framework {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Initialize the framework and print the merged hook table
    #[command(name = "debug:hooks")]
    Hooks {
        #[command(flatten)]
        request: RequestArgs,
    },
}

impl Commands {
    fn request(&self) -> &RequestArgs {
        match self {
            Commands::Framework { request } | Commands::Hooks { request } => request,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct RequestArgs {
    /// Initialize without a request
    #[arg(long, conflicts_with_all = ["route", "scope"])]
    no_request: bool,

    /// Route name (`_route`)
    #[arg(long)]
    route: Option<String>,

    /// Request scope (`frontend` or `backend`)
    #[arg(long)]
    scope: Option<String>,

    /// HTTP method
    #[arg(long, default_value = "GET")]
    method: String,

    /// Request locale
    #[arg(long)]
    locale: Option<String>,

    /// Referer id (`_contao_referer_id`)
    #[arg(long)]
    referer_id: Option<String>,

    /// Enable the request token check (`_token_check`)
    #[arg(long)]
    token_check: bool,

    /// Request token sent in the request body
    #[arg(long)]
    token: Option<String>,

    /// Mark the request as XMLHttpRequest
    #[arg(long)]
    ajax: bool,

    /// Base path the application is served from
    #[arg(long, default_value = "")]
    base_path: String,
}

impl RequestArgs {
    fn to_request(&self, token_field: &str) -> Option<Request> {
        if self.no_request {
            return None;
        }

        let mut request = Request::new()
            .with_method(&self.method)
            .with_base_path(self.base_path.clone());

        if let Some(route) = &self.route {
            request = request.with_attribute(ROUTE_ATTRIBUTE, route.as_str());
        }
        if let Some(scope) = &self.scope {
            request = request.with_attribute(SCOPE_ATTRIBUTE, scope.as_str());
        }
        if let Some(referer_id) = &self.referer_id {
            request = request.with_attribute(REFERER_ID_ATTRIBUTE, referer_id.as_str());
        }
        if self.token_check {
            request = request.with_attribute(TOKEN_CHECK_ATTRIBUTE, true);
        }
        if let Some(token) = &self.token {
            request = request.with_body_param(token_field, token.clone());
        }
        if let Some(locale) = &self.locale {
            request = request.with_locale(locale.clone());
        }
        if self.ajax {
            request = request.with_header("X-Requested-With", "XMLHttpRequest");
        }

        Some(request)
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<FrameworkConfig> {
    let config = match path {
        Some(path) => FrameworkConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => FrameworkConfig::default(),
    };
    let config = config.apply_env()?;
    config.validate()?;
    Ok(config)
}

fn boot(config: &FrameworkConfig, args: &RequestArgs) -> Result<ContaoFramework> {
    let mut framework = ContaoFramework::from_config(config, Arc::new(AttributeScopeMatcher))?;
    framework.set_container(Arc::new(Container::new()));

    if let Some(request) = args.to_request(&config.token_field) {
        debug!(route = ?request.route(), method = %request.method(), "Attaching request");
        framework.set_request(request)?;
    }

    framework
        .initialize()
        .context("Failed to initialize the framework")?;
    info!(state = ?framework.state(), "Framework ready");
    Ok(framework)
}

fn run(cli: &Cli) -> Result<Value> {
    let config = load_config(cli.config.as_ref())?;
    let framework = boot(&config, cli.command.request())?;

    let output = match &cli.command {
        Commands::Framework { .. } => {
            let markers = framework
                .context()
                .map(|context| context.markers())
                .unwrap_or_default();
            json!({
                "state": format!("{:?}", framework.state()),
                "markers": markers,
            })
        }
        Commands::Hooks { .. } => serde_json::to_value(framework.hook_table().snapshot())?,
    };

    Ok(output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let output = run(&cli)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
root_dir = "/var/www/contao"

[settings]
complete = true

[routes]
contao_backend = "/contao"
contao_root = "/"

[hooks]
getPageLayout = [["legacy.listener", "onGetPageLayout"]]

[[listeners]]
hook = "getPageLayout"
priority = 10
service = "app.listener"
method = "onGetPageLayout"
"#;

    fn config_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();
        file
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("contao-console").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_request_conflicts_with_route() {
        let result = Cli::try_parse_from([
            "contao-console",
            "debug:framework",
            "--no-request",
            "--route",
            "contao_root",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_from_flags() {
        let cli = parse(&[
            "debug:framework",
            "--route",
            "contao_backend",
            "--scope",
            "backend",
            "--method",
            "post",
            "--token-check",
            "--token",
            "abc",
            "--ajax",
        ]);
        let request = cli.command.request().to_request("REQUEST_TOKEN").unwrap();

        assert_eq!(request.route(), Some("contao_backend"));
        assert_eq!(request.scope_attribute(), Some("backend"));
        assert_eq!(request.method(), "POST");
        assert!(request.token_check());
        assert_eq!(request.body_param("REQUEST_TOKEN"), Some("abc"));
        assert!(request.is_xml_http_request());
    }

    #[test]
    fn test_debug_framework_prints_markers() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        let cli = parse(&[
            "--config",
            path,
            "debug:framework",
            "--route",
            "contao_backend",
            "--scope",
            "backend",
            "--locale",
            "de",
        ]);

        let output = run(&cli).unwrap();
        assert_eq!(output["state"], json!("Initialized"));
        assert_eq!(output["markers"]["TL_ROOT"], json!("/var/www/contao"));
        assert_eq!(output["markers"]["TL_MODE"], json!("BE"));
        assert_eq!(output["markers"]["TL_SCRIPT"], json!("contao"));
        assert_eq!(output["markers"]["TL_LANGUAGE"], json!("de"));
    }

    #[test]
    fn test_debug_framework_without_request() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        let cli = parse(&["--config", path, "debug:framework", "--no-request"]);

        let output = run(&cli).unwrap();
        let markers = output["markers"].as_object().unwrap();
        assert!(markers.contains_key("TL_ROOT"));
        assert!(!markers.contains_key("TL_MODE"));
    }

    #[test]
    fn test_debug_hooks_prints_merged_table() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        let cli = parse(&["--config", path, "debug:hooks", "--route", "contao_root"]);

        let output = run(&cli).unwrap();
        assert_eq!(
            output["getPageLayout"],
            json!([
                ["app.listener", "onGetPageLayout"],
                ["legacy.listener", "onGetPageLayout"],
            ])
        );
    }

    #[test]
    fn test_invalid_token_fails() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        let cli = parse(&[
            "--config",
            path,
            "debug:framework",
            "--route",
            "contao_root",
            "--method",
            "POST",
            "--token-check",
            "--token",
            "forged",
        ]);

        let err = run(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("request token"));
    }
}
