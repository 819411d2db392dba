//! Step content parser.
//!
//! Line-oriented scan over a step body. Each non-empty trimmed line is
//! classified in priority order:
//!
//! 1. A regulation citation anywhere in the line is recorded. This is
//!    independent of the other rules: a citation inside a bullet is still
//!    captured.
//! 2. A numbered heading (`1. Mark Positions`) closes the open sub-step and
//!    starts a new one.
//! 3. A bullet (`•`, `-`, `*`) while a sub-step is open becomes an item of
//!    that sub-step.
//! 4. Anything else before the first heading joins the overview, except
//!    `#`-prefixed markup lines.

use regex_lite::Regex;

use crate::result::{ParsedStepContent, SubStep};

/// Parse a step body into its structured parts.
///
/// Total over all inputs: empty or unstructured text yields an empty
/// result, never an error. Deterministic: identical input produces
/// identical output.
pub fn parse_step_content(content: &str) -> ParsedStepContent {
    // "BS 7671" may carry a trailing Section/Table/Regulation reference;
    // the whole span counts as one citation.
    let regulation_re = Regex::new(
        r"(?i)(BS\s*7671(?:\s+(?:Section|Table|Reg(?:ulation)?\.?)\s*\d+[A-Z0-9.]*)?|Reg(?:ulation)?\.?\s*\d+(?:\.\d+)*|Section\s+\d+(?:\.\d+)*|Table\s+\d+[A-Z]*\d*)",
    )
    .unwrap();
    let heading_re = Regex::new(r"^(\d+)\.\s+([A-Z].*)$").unwrap();
    let bullet_re = Regex::new(r"^[•\-\*]\s+(.*)$").unwrap();

    let mut parsed = ParsedStepContent::default();
    let mut overview_lines: Vec<&str> = Vec::new();
    let mut current: Option<SubStep> = None;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(found) = regulation_re.find(line) {
            let citation = found.as_str().to_string();
            if !parsed.regulations.contains(&citation) {
                parsed.regulations.push(citation);
            }
        }

        if let Some(caps) = heading_re.captures(line) {
            if let Some(sub) = current.take() {
                parsed.sub_steps.push(sub);
            }
            current = Some(SubStep {
                title: caps[2].trim().to_string(),
                items: Vec::new(),
            });
        } else if let Some(caps) = bullet_re.captures(line) {
            if let Some(sub) = current.as_mut() {
                sub.items.push(caps[1].trim().to_string());
            } else if parsed.sub_steps.is_empty() && !line.starts_with('#') {
                overview_lines.push(line);
            }
        } else if current.is_none() && parsed.sub_steps.is_empty() && !line.starts_with('#') {
            overview_lines.push(line);
        }
    }

    if let Some(sub) = current {
        parsed.sub_steps.push(sub);
    }
    parsed.overview = overview_lines.join(" ");
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let parsed = parse_step_content("");
        assert!(parsed.is_empty());
        assert_eq!(parsed.overview, "");
        assert!(parsed.sub_steps.is_empty());
        assert!(parsed.regulations.is_empty());
    }

    #[test]
    fn test_whitespace_only() {
        let parsed = parse_step_content("   \n\t\n  ");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_overview_and_sub_steps() {
        let parsed = parse_step_content(
            "Install the cable.\n1. Mark Positions\n• Use a pencil\n• Check level\nBS 7671 Section 522 applies.",
        );

        assert_eq!(parsed.overview, "Install the cable.");
        assert_eq!(parsed.sub_steps.len(), 1);
        assert_eq!(parsed.sub_steps[0].title, "Mark Positions");
        assert_eq!(parsed.sub_steps[0].items, vec!["Use a pencil", "Check level"]);
        assert!(parsed.regulations.iter().any(|r| r.contains("Section 522")));
    }

    #[test]
    fn test_multiple_sub_steps_flush() {
        let parsed = parse_step_content(
            "1. First Fix\n• Route cables\n2. Second Fix\n• Terminate accessories\n• Fit faceplates",
        );

        assert_eq!(parsed.sub_steps.len(), 2);
        assert_eq!(parsed.sub_steps[0].title, "First Fix");
        assert_eq!(parsed.sub_steps[0].items, vec!["Route cables"]);
        assert_eq!(parsed.sub_steps[1].title, "Second Fix");
        assert_eq!(parsed.sub_steps[1].items.len(), 2);
    }

    #[test]
    fn test_regulation_inside_bullet_is_both_item_and_citation() {
        let parsed = parse_step_content("1. Glanding\n• Torque per Table 4D5 of the standard");

        assert_eq!(parsed.sub_steps[0].items.len(), 1);
        assert!(parsed.regulations.iter().any(|r| r.contains("Table 4D5")));
    }

    #[test]
    fn test_regulation_forms() {
        let parsed = parse_step_content(
            "Comply with BS 7671.\nSee Reg 522.6.204 for buried cables.\nSection 701 covers bathrooms.",
        );

        assert_eq!(parsed.regulations.len(), 3);
        assert!(parsed.regulations.iter().any(|r| r.contains("BS 7671")));
        assert!(parsed.regulations.iter().any(|r| r.contains("522.6.204")));
        assert!(parsed.regulations.iter().any(|r| r.contains("Section 701")));
    }

    #[test]
    fn test_regulations_deduplicated() {
        let parsed = parse_step_content("BS 7671 applies.\nWork to BS 7671 at all times.");
        assert_eq!(parsed.regulations, vec!["BS 7671"]);
    }

    #[test]
    fn test_lowercase_numbered_line_is_not_a_heading() {
        let parsed = parse_step_content("1. install the back box first");
        assert!(parsed.sub_steps.is_empty());
        assert_eq!(parsed.overview, "1. install the back box first");
    }

    #[test]
    fn test_hash_lines_excluded_from_overview() {
        let parsed = parse_step_content("# Step notes\nIsolate the supply first.");
        assert_eq!(parsed.overview, "Isolate the supply first.");
    }

    #[test]
    fn test_prose_after_sub_steps_not_added_to_overview() {
        let parsed = parse_step_content("Intro line.\n1. Heading\nTrailing prose is dropped.");
        assert_eq!(parsed.overview, "Intro line.");
        assert_eq!(parsed.sub_steps.len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let input = "Overview.\n1. Heading\n• item one\nBS 7671 Section 522 applies.";
        assert_eq!(parse_step_content(input), parse_step_content(input));
    }
}
