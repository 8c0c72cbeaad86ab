use clap::{ArgGroup, Parser, Subcommand};

/// Resa operator CLI.
#[derive(Parser, Debug)]
#[command(name = "resa", version, about = "Resa bootstrap and voucher administration")]
pub struct Cli {
    /// SQLite connection URL.
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// bcrypt cost for new password hashes.
    #[arg(long, global = true, env = "RESA_BCRYPT_COST")]
    pub bcrypt_cost: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reset the database and create the first admin and the default identity.
    ///
    /// Destroys every existing table.
    Init {
        /// Login of the first admin.
        #[arg(long)]
        admin_login: String,

        /// Password of the first admin. Prompted for when absent.
        #[arg(long, env = "RESA_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: Option<String>,

        /// Email of the default identity.
        #[arg(long, default_value = resa_core::bootstrap::DEFAULT_IDENTITY_EMAIL)]
        default_email: String,

        /// Password of the default identity. Defaults to the admin password.
        #[arg(long, env = "RESA_DEFAULT_PASSWORD", hide_env_values = true)]
        default_password: Option<String>,
    },

    /// Give an identity a voucher.
    #[command(group(ArgGroup::new("expiry").required(true).args(["expires", "hours"])))]
    AddVoucher {
        /// Voucher code.
        #[arg(long)]
        code: String,

        /// Id of the owning identity.
        #[arg(long)]
        owner: i64,

        /// Expiration as `YYYY-MM-DDTHH:MM` (UTC).
        #[arg(long)]
        expires: Option<String>,

        /// Expiration as a number of hours from now.
        #[arg(long)]
        hours: Option<i64>,
    },

    /// Disable every voucher of an identity.
    DisableVoucher {
        /// Id of the owning identity.
        #[arg(long)]
        owner: i64,
    },

    /// List identities with their sponsor and voucher.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print the version.
    Version,
}
