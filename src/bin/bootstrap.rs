//! Bootstrap CLI - set up the Vulkan engine workspace
//!
//! Usage:
//!   bootstrap setup             Check dependencies, fetch what is missing, generate project files
//!   bootstrap fetch             Check dependencies and fetch what is missing
//!   bootstrap generate          Generate project files with the bundled generator
//!   bootstrap status            Show installation status of every dependency

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use vulkan_bootstrap::{catalog, generator, output, sdk, AcquireOutcome, VendorDir};

#[derive(Parser)]
#[command(name = "bootstrap")]
#[command(about = "Fetch third-party dependencies and generate project files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory third-party dependencies are installed into
    #[arg(long, global = true, default_value = "vendor")]
    vendor_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Check dependencies, fetch what is missing, and generate project files
    Setup {
        /// IDE project format passed to the generator
        #[arg(long, default_value = "vs2022")]
        ide: String,
    },

    /// Check dependencies and fetch what is missing
    Fetch,

    /// Generate project files with the bundled generator
    Generate {
        /// IDE project format passed to the generator
        #[arg(long, default_value = "vs2022")]
        ide: String,
    },

    /// Show installation status of every dependency
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Setup { ide } => {
            let failures = fetch_all(&cli.vendor_dir)?;
            if failures > 0 {
                bail!("{} of the dependency checks failed; fix the above and re-run", failures);
            }
            output::action("Generating project files");
            generator::run_generator(&cli.vendor_dir, &ide)?;
            output::success("Done! There should now be a solution file in the root directory");
        }

        Commands::Fetch => {
            let failures = fetch_all(&cli.vendor_dir)?;
            if failures > 0 {
                bail!("{} of the dependency checks failed; fix the above and re-run", failures);
            }
            output::success("Dependencies satisfied");
        }

        Commands::Generate { ide } => {
            output::action("Generating project files");
            generator::run_generator(&cli.vendor_dir, &ide)?;
            output::success("Done! There should now be a solution file in the root directory");
        }

        Commands::Status => {
            // Status is read-only: never create the vendor directory here.
            let vendor = VendorDir::at(&cli.vendor_dir);
            match sdk::check_sdk() {
                Ok(path) => output::list_item(
                    sdk::SDK_ENV_VAR,
                    &format!("found at {}", path.display()),
                    true,
                ),
                Err(_) => output::list_item(sdk::SDK_ENV_VAR, "not set", false),
            }
            for dep in catalog::default_catalog() {
                let installed = vendor.is_installed(&dep)?;
                let status = if installed { "installed" } else { "missing" };
                output::list_item(&format!("{}-{}", dep.name, dep.version), status, installed);
            }
        }
    }

    Ok(())
}

/// Run the sequential acquisition loop over the whole catalog.
///
/// Each entry is isolated: a failure is reported and the loop moves on.
/// Returns the number of failed checks (including the SDK probe).
fn fetch_all(vendor_dir: &PathBuf) -> Result<usize> {
    let vendor = VendorDir::ensure(vendor_dir)?;
    let deps = catalog::default_catalog();
    let total = deps.len() + 1;
    let mut failures = 0usize;

    output::action("Checking dependencies");

    output::action_numbered(1, total, &format!("Checking {}", sdk::SDK_ENV_VAR));
    match sdk::check_sdk() {
        Ok(_) => output::info("active Vulkan SDK install found, skipped"),
        Err(e) => {
            // The rest of the catalog is still worth fetching; the compile
            // will fail later without the SDK, so the run itself fails.
            output::warning(&e.to_string());
            failures += 1;
        }
    }

    for (i, dep) in deps.iter().enumerate() {
        output::action_numbered(i + 2, total, &format!("Checking {}", dep.name));
        match vendor.acquire(dep) {
            Ok(AcquireOutcome::AlreadySatisfied) => {
                output::skip(&format!("{} install found, skipped", dep.name));
            }
            Ok(AcquireOutcome::Installed) => {
                output::success(&format!("{}-{} installed", dep.name, dep.version));
            }
            Err(e) => {
                output::error(&format!("{}: {}", dep.name, e));
                failures += 1;
            }
        }
    }

    Ok(failures)
}
