//! Package manager errors

use super::TerrariumError;

fn join(packages: &[String]) -> String {
    packages.join(", ")
}

/// Creates a network failure error for an install batch
pub fn network_failed(packages: &[String], output: impl Into<String>) -> TerrariumError {
    TerrariumError::InstallNetworkFailed {
        packages: join(packages),
        output: output.into(),
    }
}

/// Creates an error for a package the registry does not know
pub fn not_in_registry(package: impl Into<String>, output: impl Into<String>) -> TerrariumError {
    TerrariumError::PackageNotInRegistry {
        package: package.into(),
        output: output.into(),
    }
}

/// Creates a generic install failure error
pub fn failed(packages: &[String], output: impl Into<String>) -> TerrariumError {
    TerrariumError::InstallFailed {
        packages: join(packages),
        output: output.into(),
    }
}

/// Creates an install timeout error
pub fn timed_out(packages: &[String], seconds: u64) -> TerrariumError {
    TerrariumError::InstallTimedOut {
        packages: join(packages),
        seconds,
    }
}

/// Creates an error for a package manager that could not be spawned
pub fn unavailable(program: impl Into<String>, reason: impl std::fmt::Display) -> TerrariumError {
    TerrariumError::PackageManagerUnavailable {
        program: program.into(),
        reason: reason.to_string(),
    }
}
