use gh_client::TransportError;
use heirloom_config::ConfigError;
use thiserror::Error;

/// The fetched hierarchy cannot be trusted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("Cycle in issue hierarchy: {}", format_cycle(.issues))]
    Cycle { issues: Vec<u64> },

    #[error("Issue #{number} was returned more than once")]
    DuplicateIssue { number: u64 },
}

fn format_cycle(issues: &[u64]) -> String {
    let mut parts: Vec<String> = issues.iter().map(|n| format!("#{}", n)).collect();
    if let Some(first) = issues.first() {
        parts.push(format!("#{}", first));
    }
    parts.join(" -> ")
}

/// Errors that abort a whole run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Failed to fetch issues for {repository}: {source}")]
    Fetch {
        repository: String,
        #[source]
        source: TransportError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_closes_the_loop() {
        let err = StructuralError::Cycle {
            issues: vec![1, 2, 3],
        };
        assert_eq!(
            err.to_string(),
            "Cycle in issue hierarchy: #1 -> #2 -> #3 -> #1"
        );
    }

    #[test]
    fn test_self_loop_display() {
        let err = StructuralError::Cycle { issues: vec![4] };
        assert_eq!(err.to_string(), "Cycle in issue hierarchy: #4 -> #4");
    }
}
