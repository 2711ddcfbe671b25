//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Reconcile declared access profiles against the grants an account holds.
#[derive(Parser, Debug)]
#[command(name = "grantplan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding one sub-directory per account (also: GRANTPLAN_STATE_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Budget for every remote query, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub query_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute and store a plan for an account
    Plan(PlanArgs),
    /// Show the latest stored plan for an account
    PrintPlan(PrintPlanArgs),
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Account to plan
    #[arg(long)]
    pub account: String,

    /// Plan only these roles (repeatable); all configured roles by default
    #[arg(long = "role", value_name = "ROLE")]
    pub roles: Vec<String>,

    /// Inventory the account again instead of planning from the cache
    #[arg(long, requires = "replay")]
    pub rescan: bool,

    /// Answer rescan queries from a recorded JSON file
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Run units one after another
    #[arg(long)]
    pub sequential: bool,

    /// Stop at the first failing role or user
    #[arg(long)]
    pub fail_fast: bool,

    /// Also plan role membership for configured users
    #[arg(long)]
    pub users: bool,

    /// Also list grants that are already in place
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct PrintPlanArgs {
    /// Account whose plan to show
    #[arg(long)]
    pub account: String,

    /// Also list grants that are already in place
    #[arg(short, long)]
    pub verbose: bool,
}
