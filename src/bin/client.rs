use chaum_pedersen_auth::{GroupPreset, GroupSettings, ProverClient, Witness};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Chaum-Pedersen authentication client", long_about = None)]
#[command(version)]
struct Cli {
    /// Verifier endpoint
    #[arg(short, long, env = "ZKP_SERVER", default_value = "http://127.0.0.1:50051")]
    server: String,

    /// User id to register or log in as
    #[arg(short, long, env = "ZKP_USER", default_value = "alice@example.com")]
    user: String,

    /// Secret exponent x, in decimal
    #[arg(short = 'x', long, env = "ZKP_SECRET", default_value = "6", hide_env_values = true)]
    secret: String,

    #[command(flatten)]
    group: GroupArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Group selection; must match the server's.
#[derive(Args)]
struct GroupArgs {
    /// Named parameter set (toy, demo256, rfc5114)
    #[arg(long, env = "ZKP_GROUP__PRESET", default_value = "toy")]
    preset: GroupPreset,

    /// Explicit modulus p (requires q, g and h)
    #[arg(long, requires_all = ["q", "g", "h"])]
    p: Option<String>,

    /// Explicit subgroup order q
    #[arg(long)]
    q: Option<String>,

    /// Explicit first generator g
    #[arg(long)]
    g: Option<String>,

    /// Explicit second generator h
    #[arg(long)]
    h: Option<String>,
}

impl From<GroupArgs> for GroupSettings {
    fn from(args: GroupArgs) -> Self {
        GroupSettings {
            preset: args.preset,
            p: args.p,
            q: args.q,
            g: args.g,
            h: args.h,
        }
    }
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Register y1, y2 for the user
    Register,
    /// Log in with a previously registered secret
    Login,
    /// Register, then log in (default)
    Auth,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = GroupSettings::from(cli.group);
    let params = settings.build().inspect_err(|e| {
        error!("Invalid group parameters: {e}");
    })?;
    info!(group = %settings.describe(), q_bits = params.q().bits(), "group parameters validated");

    let witness = Witness::from_decimal(&cli.secret)?;
    let mut client = ProverClient::connect(cli.server.clone(), params, witness).await?;
    info!(server = %cli.server, "connected");

    let command = cli.command.unwrap_or(Commands::Auth);

    if matches!(command, Commands::Register | Commands::Auth) {
        client.register(&cli.user).await?;
        println!("Registered user '{}'", cli.user);
    }

    if matches!(command, Commands::Login | Commands::Auth) {
        let session_id = client.login(&cli.user).await?;
        println!("Login successful, session id: {session_id}");
    }

    Ok(())
}
