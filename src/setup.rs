use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

pub const TOKEN_VARIABLE: &str = "MAPBOX_ACCESS_TOKEN";
pub const SAMPLE_TOKEN: &str = "pk.eyJ1IjoieW91cnVzZXJuYW1lIiwiYSI6ImNrdGVzdGluZyJ9.example";
const ENV_EXAMPLE_FILE: &str = ".env.example";
const PREVIEW_LENGTH: usize = 20;

/// Reads the access token from the env file at `env_path` and writes it to a configuration file
/// at `output_path`, which is picked up at startup. Returns the token.
#[instrument(fields(env_path = %env_path.display(), output_path = %output_path.display()))]
pub async fn generate(env_path: &Path, output_path: &Path) -> Result<String, SetupError> {
    info!("⚙️ Generating configuration...");

    let content = match fs::read_to_string(env_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let example = env_path.with_file_name(ENV_EXAMPLE_FILE);
            if fs::try_exists(&example).await.unwrap_or(false) {
                info!("💡 Create it from the example: cp {} {}", example.display(), env_path.display());
            }
            return Err(SetupError::MissingEnvFile {
                path: env_path.to_path_buf(),
            });
        }
        Err(e) => return Err(SetupError::io(e, env_path)),
    };

    let token = extract_token(&content).ok_or_else(|| SetupError::MissingToken {
        path: env_path.to_path_buf(),
    })?;

    if token == SAMPLE_TOKEN {
        warn!("⚠️ {} still contains the sample token, replace it with your own access token", env_path.display());
    }

    fs::write(output_path, render(&token)?).await.map_err(|e| SetupError::io(e, output_path))?;

    let preview: String = token.chars().take(PREVIEW_LENGTH).collect();
    info!(token = %format!("{}...", preview), "⚙️ Generating configuration... OK");
    Ok(token)
}

/// Returns the value of the first `MAPBOX_ACCESS_TOKEN=` line, skipping blank lines and comments.
/// One leading and one trailing quote are removed.
pub fn extract_token(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find_map(|line| line.strip_prefix(TOKEN_VARIABLE)?.strip_prefix('=').filter(|value| !value.is_empty()))
        .map(strip_quotes)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix(['"', '\'']).unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}

fn render(token: &str) -> Result<String, SetupError> {
    Ok(format!(
        "# This file is generated, do not edit it directly.\n\
         # Edit .env and run `{} setup` again.\n\
         \n\
         [mapbox]\n\
         access_token = {}\n",
        env!("CARGO_PKG_NAME"),
        serde_json::to_string(token)?
    ))
}

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("'{}' not found, create it with a {}=<token> line", path.display(), TOKEN_VARIABLE)]
    MissingEnvFile { path: PathBuf },
    #[error("{} not found in '{}', add a line like {}=pk.eyJ1Ijoi...", TOKEN_VARIABLE, path.display(), TOKEN_VARIABLE)]
    MissingToken { path: PathBuf },
    #[error("unable to access '{}': {source}", path.display())]
    Io { source: io::Error, path: PathBuf },
    #[error("unable to encode the token: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SetupError {
    fn io(source: io::Error, path: &Path) -> Self {
        SetupError::Io {
            source,
            path: path.to_path_buf(),
        }
    }
}
