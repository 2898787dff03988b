//! CLI argument parsing using clap 4.x derive macros

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ubgrab::ubgrab_client::DEFAULT_BASE_URL;

/// Command-line client for the ubgrab courier service
///
/// Logs in once and keeps the session between runs, the same way the
/// mobile app does.
#[derive(Parser, Debug)]
#[command(name = "ubgrab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API root of the backend
    #[arg(long, global = true, env = "UBGRAB_API_BASE", default_value = DEFAULT_BASE_URL)]
    pub api_base: String,

    /// Directory holding the saved session (default: platform data dir)
    #[arg(long, global = true, env = "UBGRAB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Log in with phone and password
    Login {
        #[arg(long)]
        phone: String,

        #[arg(long, env = "UBGRAB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the saved session
    Logout,

    /// Show whether a session is saved
    Status,

    /// Show the logged-in account
    Profile,

    /// List couriers
    Couriers,

    /// List orders
    Orders,

    /// Place an order as the logged-in customer
    CreateOrder {
        /// Pickup address
        #[arg(long)]
        from: String,

        /// Delivery address
        #[arg(long)]
        to: String,

        #[arg(long)]
        price: f64,

        /// Delivery date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        /// Preferred courier id
        #[arg(long)]
        courier: Option<i64>,
    },

    /// Fill or wipe backend test data
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SeedAction {
    /// Insert test customers and couriers
    Fill,
    /// Delete every row from every table
    Clear,
}
