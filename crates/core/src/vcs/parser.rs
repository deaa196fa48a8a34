//! Parser for the textual status report.

use regex_lite::Regex;
use tracing::debug;

use crate::errors::DiscoveryError;

/// Extract conflicted paths from a status report, in report order.
///
/// A conflicted path is a line whose trimmed text is the `marker` token,
/// whitespace, then the path. Repeated paths are reported once.
pub fn parse_conflicted_paths(report: &str, marker: &str) -> Result<Vec<String>, DiscoveryError> {
    let marker = marker.trim();
    if marker.is_empty() {
        return Err(DiscoveryError::InvalidMarker(marker.to_string()));
    }
    let pattern = format!(r"^{}\s+(.+)$", regex_lite::escape(marker));
    let re = Regex::new(&pattern).map_err(|_| DiscoveryError::InvalidMarker(marker.to_string()))?;

    let mut paths: Vec<String> = Vec::new();
    for line in report.lines() {
        let Some(caps) = re.captures(line.trim()) else {
            continue;
        };
        let path = caps[1].trim().to_string();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    debug!(count = paths.len(), "parsed conflicted paths from status report");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JJ_STATUS: &str = "\
Working copy changes:
M force-app/main/default/classes/AccountService.cls
C force-app/main/default/classes/OrderService.cls
A scripts/deploy.sh
C force-app/main/default/triggers/OrderTrigger.trigger
Working copy : qpvuntsm 8f2c1a9e (conflict) merge feature into main
Parent commit: zsuskuln 1b2c3d4e main
";

    #[test]
    fn test_parse_conflicted_lines_in_order() {
        let paths = parse_conflicted_paths(JJ_STATUS, "C").unwrap();
        assert_eq!(
            paths,
            vec![
                "force-app/main/default/classes/OrderService.cls",
                "force-app/main/default/triggers/OrderTrigger.trigger",
            ]
        );
    }

    #[test]
    fn test_no_marker_lines_yields_empty() {
        let report = "Working copy changes:\nM src/lib.rs\nA README.md\n";
        assert!(parse_conflicted_paths(report, "C").unwrap().is_empty());
        assert!(parse_conflicted_paths("", "C").unwrap().is_empty());
    }

    #[test]
    fn test_marker_must_be_whole_token() {
        let report = "Conflicted paths below\nCC weird.txt\nC  spaced.txt\n";
        let paths = parse_conflicted_paths(report, "C").unwrap();
        assert_eq!(paths, vec!["spaced.txt"]);
    }

    #[test]
    fn test_leading_whitespace_and_duplicates() {
        let report = "   C a.cls\nC a.cls\n\tC b.cls  \n";
        let paths = parse_conflicted_paths(report, "C").unwrap();
        assert_eq!(paths, vec!["a.cls", "b.cls"]);
    }

    #[test]
    fn test_custom_marker_is_escaped() {
        let report = "U+ src/x.ts\nC src/y.ts\n";
        let paths = parse_conflicted_paths(report, "U+").unwrap();
        assert_eq!(paths, vec!["src/x.ts"]);
    }

    #[test]
    fn test_blank_marker_rejected() {
        let result = parse_conflicted_paths("C a", " ");
        assert!(matches!(result, Err(DiscoveryError::InvalidMarker(_))));
    }
}
