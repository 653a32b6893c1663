use crate::server;
use clap::{Args, Parser, Subcommand};
use intake::config::AppConfig;
use intake::error::AppError;
use intake::telemetry;
use intake::workflows::admissions::{
    normalize_phone, NotificationSender, SendError, TwilioSender,
};

const TEST_MESSAGE: &str = "¡Hola! Este es un mensaje de prueba desde Twilio.";

#[derive(Parser, Debug)]
#[command(
    name = "intake-api",
    about = "Run the school pre-enrollment service or check the messaging provider",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Send one message through the configured provider and print its id
    SendTest(SendTestArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct SendTestArgs {
    /// Recipient phone number; numbers without `+` get the configured country code
    #[arg(long)]
    pub(crate) to: String,
    /// Message body
    #[arg(long, default_value = TEST_MESSAGE)]
    pub(crate) message: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::SendTest(args) => send_test(args).await,
    }
}

async fn send_test(args: SendTestArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let twilio = config.notifier.twilio.ok_or(SendError::NotConfigured)?;
    let recipient = normalize_phone(&args.to, &config.notifier.country_code);
    let receipt = TwilioSender::new(twilio)
        .send(&recipient, &args.message)
        .await?;

    println!("Mensaje enviado a {recipient} con SID: {}", receipt.message_id);
    Ok(())
}
