// UI layer: a simple interactive menu using `dialoguer`.
// Each flow collects its inputs, calls the client and prints the outcome.
// Client errors are printed and the menu keeps going.

use crate::api::{ApiClient, ModelHeaders};
use crate::config::{persist_token, ClientConfig};
use anyhow::{Context, Result};
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Main interactive menu. Builds a client from `config` and runs a select
/// loop until the user chooses "Exit".
pub fn main_menu(mut config: ClientConfig) -> Result<()> {
    let mut api = ApiClient::new(&config)?;
    if config.token.is_empty() {
        println!("No token configured. Use \"Set token\" before calling the storage.");
    }
    loop {
        let items = vec![
            "Push model",
            "Get model",
            "Mark model as current",
            "Set token",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => handle_push(&api)?,
            1 => handle_get(&api)?,
            2 => handle_update_status(&api)?,
            3 => {
                let token: String = Password::new().with_prompt("Bearer token").interact()?;
                persist_token(&token)?;
                config.token = token;
                api = ApiClient::new(&config)?;
                println!("Token saved.");
            }
            4 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Read a model file and push it with optional ModelParams/Content-Type.
fn handle_push(api: &ApiClient) -> Result<()> {
    let group = prompt_service_group()?;
    let path: String = Input::new().with_prompt("Model file path").interact_text()?;
    let params: String = Input::new()
        .with_prompt("ModelParams (empty for none)")
        .allow_empty(true)
        .interact_text()?;
    let content_type: String = Input::new()
        .with_prompt("Content-Type (empty for none)")
        .allow_empty(true)
        .interact_text()?;

    let model = match std::fs::read(&path) {
        Ok(m) => m,
        Err(e) => {
            println!("Failed to read {}: {}", path, e);
            return Ok(());
        }
    };
    let headers = model_headers(&params, &content_type);

    let spinner = spinner("Pushing model...")?;
    let res = api.push_model(&group, &model, headers.as_ref());
    spinner.finish_and_clear();
    match res {
        Ok(()) => println!("Pushed {} bytes to {}", model.len(), group),
        Err(e) => println!("Push failed: {}", e),
    }
    Ok(())
}

/// Fetch a model and write it to a local file.
fn handle_get(api: &ApiClient) -> Result<()> {
    let group = prompt_service_group()?;
    let skip = prompt_skip()?;
    let out: String = Input::new().with_prompt("Output file path").interact_text()?;

    let spinner = spinner("Fetching model...")?;
    let res = api.get_model(&group, skip);
    spinner.finish_and_clear();
    match res {
        Ok(model) => {
            let out = PathBuf::from(out);
            std::fs::write(&out, &model)
                .with_context(|| format!("Failed to write model to {}", out.display()))?;
            println!("Saved {} bytes to {}", model.len(), out.display());
        }
        Err(e) => println!("Get failed: {}", e),
    }
    Ok(())
}

fn handle_update_status(api: &ApiClient) -> Result<()> {
    let group = prompt_service_group()?;
    let skip = prompt_skip()?;

    let spinner = spinner("Updating status...")?;
    let res = api.update_status_model(&group, skip);
    spinner.finish_and_clear();
    match res {
        Ok(()) => println!("Model {} of {} is now current", skip, group),
        Err(e) => println!("Update failed: {}", e),
    }
    Ok(())
}

fn prompt_service_group() -> Result<String> {
    Ok(Input::new().with_prompt("Service group").interact_text()?)
}

fn prompt_skip() -> Result<i64> {
    Ok(Input::new()
        .with_prompt("Skip")
        .default(0)
        .interact_text()?)
}

/// Headers for a push; `None` when both answers were left empty.
fn model_headers(params: &str, content_type: &str) -> Option<ModelHeaders> {
    if params.is_empty() && content_type.is_empty() {
        return None;
    }
    let mut headers = ModelHeaders::new();
    if !params.is_empty() {
        headers = headers.with_model_params(params.as_bytes());
    }
    if !content_type.is_empty() {
        headers = headers.with_content_type(content_type);
    }
    Some(headers)
}

fn spinner(msg: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}
