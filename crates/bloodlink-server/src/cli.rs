use bloodlink_auth::AuthConfig;
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::blood_request::{RequestStatus, Urgency};
use bloodlink_core::models::donor_response::ResponseKind;
use bloodlink_core::models::user::UserRole;
use bloodlink_db::DbConfig;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bloodlink")]
#[command(about = "Blood donation coordination", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct DbArgs {
    /// SurrealDB endpoint (ws://host:port, mem://, ...)
    #[arg(long, global = true, env = "BLOODLINK_DB_URL", default_value = "ws://127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, global = true, env = "BLOODLINK_DB_NAMESPACE", default_value = "bloodlink")]
    pub db_namespace: String,

    #[arg(long, global = true, env = "BLOODLINK_DB_DATABASE", default_value = "main")]
    pub db_database: String,

    #[arg(long, global = true, env = "BLOODLINK_DB_USERNAME", default_value = "root")]
    pub db_username: String,

    #[arg(long, global = true, env = "BLOODLINK_DB_PASSWORD", default_value = "root", hide_env_values = true)]
    pub db_password: String,
}

impl From<DbArgs> for DbConfig {
    fn from(args: DbArgs) -> Self {
        Self {
            url: args.db_url,
            namespace: args.db_namespace,
            database: args.db_database,
            username: args.db_username,
            password: args.db_password,
        }
    }
}

#[derive(Args)]
pub struct AuthArgs {
    /// Server-side pepper prepended to passwords before hashing
    #[arg(long, global = true, env = "BLOODLINK_PASSWORD_PEPPER", hide_env_values = true)]
    pub pepper: Option<String>,

    #[arg(long, global = true, env = "BLOODLINK_OTP_TTL_SECS", default_value = "600")]
    pub otp_ttl_secs: u64,

    #[arg(long, global = true, env = "BLOODLINK_RESET_TTL_SECS", default_value = "3600")]
    pub reset_ttl_secs: u64,

    /// Allow registration without verified email and phone codes
    #[arg(long, global = true, env = "BLOODLINK_SKIP_CONTACT_VERIFICATION")]
    pub skip_contact_verification: bool,

    #[arg(long, global = true, env = "BLOODLINK_RESET_LINK_BASE")]
    pub reset_link_base: Option<String>,
}

impl From<AuthArgs> for AuthConfig {
    fn from(args: AuthArgs) -> Self {
        let defaults = AuthConfig::default();
        Self {
            otp_ttl_secs: args.otp_ttl_secs,
            reset_token_ttl_secs: args.reset_ttl_secs,
            pepper: args.pepper,
            require_contact_verification: !args.skip_contact_verification,
            reset_link_base: args.reset_link_base.unwrap_or(defaults.reset_link_base.clone()),
            ..defaults
        }
    }
}

/// Credentials for commands acting on behalf of a user.
#[derive(Args)]
pub struct Login {
    #[arg(long, env = "BLOODLINK_USERNAME")]
    pub username: String,

    #[arg(long, env = "BLOODLINK_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, value_enum)]
    pub role: Role,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Role {
    Donor,
    Receiver,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Donor => UserRole::Donor,
            Role::Receiver => UserRole::Receiver,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ContactArg {
    Email,
    Phone,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, value_enum)]
        role: Role,
        #[arg(long)]
        blood_group: Option<BloodGroup>,
        #[arg(long)]
        age: Option<u32>,
    },

    /// Send a verification code to an email address or phone number
    SendOtp {
        #[arg(value_enum)]
        contact: ContactArg,
        address: String,
    },

    /// Check a verification code
    VerifyOtp {
        #[arg(value_enum)]
        contact: ContactArg,
        address: String,
        code: String,
    },

    /// Submit a blood request and notify compatible donors
    Request {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        blood_group: BloodGroup,
        /// Millilitres
        #[arg(long)]
        quantity: u32,
        #[arg(long, default_value = "Medium")]
        urgency: Urgency,
        /// YYYY-MM-DD
        #[arg(long)]
        required_date: NaiveDate,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        contact_info: String,
    },

    /// Accept or decline a blood request
    Respond {
        #[command(flatten)]
        login: Login,
        request_id: String,
        /// accept or decline
        kind: ResponseKind,
        #[arg(long, default_value = "0")]
        quantity: u32,
        #[arg(long)]
        message: Option<String>,
    },

    /// Pending requests the logged-in donor can serve
    Pending {
        #[command(flatten)]
        login: Login,
    },

    /// Responses to the logged-in user's requests, or a donor's own history
    Responses {
        #[command(flatten)]
        login: Login,
    },

    /// Change the status of one of your requests
    Status {
        #[command(flatten)]
        login: Login,
        request_id: String,
        /// pending, fulfilled or cancelled
        status: RequestStatus,
    },

    /// Record a donation
    Donate {
        #[command(flatten)]
        login: Login,
        /// Defaults to the donor's registered group
        #[arg(long)]
        blood_group: Option<BloodGroup>,
        #[arg(long)]
        quantity: u32,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        blood_bank: String,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List the logged-in donor's donations
    Donations {
        #[command(flatten)]
        login: Login,
    },

    /// Password reset
    Reset {
        #[command(subcommand)]
        step: ResetStep,
    },

    /// Change the password of the logged-in user
    ChangePassword {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: String,
    },

    /// Current blood inventory
    Inventory,

    /// Donation and request totals
    Stats,

    /// Notifications sent to an email address or phone number
    Notifications { address: String },

    /// Delete expired verification codes and reset tokens
    SweepCodes,
}

#[derive(Subcommand)]
pub enum ResetStep {
    /// Mail a reset token
    Initiate { email: String },

    /// Set a new password using a reset token
    Complete {
        email: String,
        token: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: String,
    },
}
