//! Invocation of the external build-file generator.
//!
//! The generator (premake) is itself one of the vendored dependencies; once
//! acquisition succeeds it lives at a fixed path under the vendor root and is
//! run with a single argument selecting the IDE project format.

use std::path::Path;
use std::process::Command;

use crate::error::SetupError;

/// The build-file generator executable at the vendor root.
pub const GENERATOR_EXE: &str = "premake5.exe";

/// Run the generator to produce project files for `ide` (e.g. "vs2022").
///
/// A non-zero exit code is the pipeline's own failure signal; it is reported,
/// never retried.
pub fn run_generator(vendor_root: &Path, ide: &str) -> Result<(), SetupError> {
    let program = vendor_root.join(GENERATOR_EXE);

    let status = Command::new(&program)
        .arg(ide)
        .status()
        .map_err(|e| SetupError::ExternalProcess {
            program: program.display().to_string(),
            reason: format!("failed to run: {}", e),
        })?;

    if !status.success() {
        return Err(SetupError::ExternalProcess {
            program: program.display().to_string(),
            reason: format!(
                "exited with {}; project file generation failed",
                status.code().unwrap_or(-1)
            ),
        });
    }

    Ok(())
}
