use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use procedure_gateway::datetime::{self, DateInput, RenderZone};
use procedure_gateway::{
    CallerIdentity, EndpointTag, ProcedureCall, ProcedureGatewayConfig, build_client, parse_call,
};
use serde_json::Number;

/// Identity reported to the service host.
#[derive(Args)]
pub struct IdentityArgs {
    /// User id sent as `userID`
    #[arg(long)]
    user: Option<String>,

    /// Plant code sent as `userPlant`
    #[arg(long)]
    plant: Option<String>,
}

impl IdentityArgs {
    fn identity(&self) -> CallerIdentity {
        CallerIdentity {
            user_id: self.user.clone(),
            user_plant: self.plant.clone(),
        }
    }
}

#[derive(Args)]
pub struct CallArgs {
    /// Stored procedure name
    procedure: String,

    /// List parameter, repeatable; sent as 'a'&del;'b'
    #[arg(short, long = "param")]
    params: Vec<String>,

    /// Send one bare string parameter instead of a list
    #[arg(long, conflicts_with_all = ["params", "number"])]
    text: Option<String>,

    /// Send one numeric parameter instead of a list
    #[arg(long, conflicts_with = "params")]
    number: Option<Number>,

    /// Endpoint selector (GENERAL, OUTPUT, OUTPUT_FRONT, GETDATE)
    #[arg(short, long, default_value = "GENERAL")]
    endpoint: String,

    #[arg(long, default_value = "")]
    event_type: String,

    #[arg(long, default_value = "")]
    event_name: String,

    /// Decode every result set
    #[arg(long)]
    multiple: bool,

    /// Do not decode the result
    #[arg(long)]
    void: bool,

    /// Return `returnUserMessage` as the result instead of failing
    #[arg(long)]
    message_as_value: bool,

    #[command(flatten)]
    identity: IdentityArgs,
}

impl CallArgs {
    fn into_call(self) -> ProcedureCall {
        let mut call = ProcedureCall::new(self.procedure)
            .endpoint(self.endpoint)
            .event(self.event_type, self.event_name);

        call = match (self.text, self.number) {
            (Some(text), _) => call.text_param(text),
            (None, Some(number)) => call.number_param(number),
            (None, None) => call.params(self.params),
        };
        if self.multiple {
            call = call.multiple();
        }
        if self.void {
            call = call.void();
        }
        if self.message_as_value {
            call = call.user_message_as_value();
        }
        call
    }
}

#[derive(Args)]
pub struct CallJsonArgs {
    /// JSON call description file, or `-` for stdin
    file: PathBuf,

    #[command(flatten)]
    identity: IdentityArgs,
}

pub async fn call(config: &ProcedureGatewayConfig, args: CallArgs) -> Result<()> {
    let identity = args.identity.identity();
    let client = build_client(config)?;
    let outcome = client.invoke(&identity, args.into_call()).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub async fn call_json(config: &ProcedureGatewayConfig, args: &CallJsonArgs) -> Result<()> {
    let text = if args.file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read call description from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.file)
            .with_context(|| format!("failed to read {}", args.file.display()))?
    };

    let call = parse_call(&text).context("invalid call description")?;
    let client = build_client(config)?;
    let outcome = client.invoke(&args.identity.identity(), call).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub async fn server_time(config: &ProcedureGatewayConfig, format: Option<&str>) -> Result<()> {
    let client = build_client(config)?;
    println!("{}", client.server_time(format).await?);
    Ok(())
}

pub async fn translations(
    config: &ProcedureGatewayConfig,
    language: &str,
    identity: &IdentityArgs,
) -> Result<()> {
    let client = build_client(config)?;
    match client.translations(&identity.identity(), language).await? {
        Some(dictionary) => println!("{}", serde_json::to_string_pretty(&dictionary)?),
        None => println!("no dictionary for language {language}"),
    }
    Ok(())
}

pub fn format_date(format: &str, input: &str, utc: bool) {
    let zone = if utc { RenderZone::Utc } else { RenderZone::Local };
    println!("{}", datetime::format_date(format, DateInput::Text(input), zone));
}

pub fn check(config: &ProcedureGatewayConfig) {
    tracing::info!("Checking configuration...");
    println!("Configuration is valid");
    for tag in EndpointTag::ALL {
        println!(
            "  {:<13} {}",
            tag.as_str(),
            config.endpoints.url_for(tag).unwrap_or("(not configured)")
        );
    }
    println!(
        "  {:<13} {}",
        "DICTIONARY",
        config
            .endpoints
            .dictionary_url()
            .unwrap_or("(not configured)")
    );
    println!("  network type  {}", config.network_type());
    println!(
        "  insecure http {}",
        if config.http.allow_insecure_http { "allowed" } else { "denied" }
    );
}
