//! GoCart CLI - database migrations and marketplace management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! gocart migrate
//!
//! # Create a coupon for first-time customers
//! gocart coupon create --code NEW20 --discount 20 --expires-in-days 30 --new-user
//!
//! # Review store applications
//! gocart store approve <store-id>
//! gocart store reject <store-id>
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use gocart_core::StoreStatus;

mod commands;

use commands::coupon::CouponArgs;

#[derive(Parser)]
#[command(name = "gocart")]
#[command(author, version, about = "GoCart marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage coupons
    Coupon {
        #[command(subcommand)]
        action: CouponAction,
    },
    /// Review seller stores
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum CouponAction {
    /// Create a new coupon
    Create {
        /// Coupon code (case-insensitive, stored upper-case)
        #[arg(short, long)]
        code: String,

        /// Percentage off, greater than 0 and at most 100
        #[arg(short, long)]
        discount: Decimal,

        /// Days until the coupon expires
        #[arg(short, long)]
        expires_in_days: u32,

        /// Shown to customers
        #[arg(long, default_value = "")]
        description: String,

        /// Usable without signing in
        #[arg(long)]
        public: bool,

        /// Only for customers without prior orders
        #[arg(long)]
        new_user: bool,

        /// Only for members
        #[arg(long)]
        member: bool,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Approve and activate a store
    Approve {
        /// Store id
        store_id: String,
    },
    /// Reject and deactivate a store
    Reject {
        /// Store id
        store_id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Coupon { action } => match action {
            CouponAction::Create {
                code,
                discount,
                expires_in_days,
                description,
                public,
                new_user,
                member,
            } => {
                commands::coupon::create(CouponArgs {
                    code,
                    description,
                    discount,
                    expires_in_days,
                    is_public: public,
                    for_new_user: new_user,
                    for_member: member,
                })
                .await
            }
        },
        Commands::Store { action } => match action {
            StoreAction::Approve { store_id } => {
                commands::store::set_status(&store_id, StoreStatus::Approved).await
            }
            StoreAction::Reject { store_id } => {
                commands::store::set_status(&store_id, StoreStatus::Rejected).await
            }
        },
    }
}
