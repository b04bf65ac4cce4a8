use std::collections::BTreeMap;

use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::{Finding, Severity};

use super::{rule, Check, CheckContext};

/// Structural rules for `EXT-X-SESSION-DATA` in a Master.
pub struct SessionDataCheck;

impl Check for SessionDataCheck {
    fn name(&self) -> &'static str {
        "SessionData"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Master
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let tags = ctx.attributes(Tag::SessionData);

        let mut missing_id = Vec::new();
        let mut value_and_uri = Vec::new();
        let mut non_json = Vec::new();
        let mut no_payload = Vec::new();
        let mut groups: BTreeMap<(&str, &str), Vec<u32>> = BTreeMap::new();

        for (line, attrs) in &tags {
            let uri = attrs.get("URI");
            let has_value = attrs.contains("VALUE");

            match (attrs.get("DATA-ID"), attrs.get("LANGUAGE")) {
                (Some(id), Some(language)) => {
                    groups.entry((id, language)).or_default().push(*line)
                }
                (Some(_), None) => {}
                (None, _) => missing_id.push(*line),
            }
            if has_value && uri.is_some() {
                value_and_uri.push(*line);
            }
            if !has_value && uri.is_none() {
                no_payload.push(*line);
            }
            if uri.is_some_and(|u| !u.contains(".json")) {
                non_json.push(*line);
            }
        }

        let mut duplicates: Vec<u32> = groups
            .into_values()
            .filter(|lines| lines.len() > 1)
            .flatten()
            .collect();
        duplicates.sort_unstable();

        vec![
            rule(
                self.name(),
                Severity::Error,
                missing_id,
                "every EXT-X-SESSION-DATA carries DATA-ID",
                "EXT-X-SESSION-DATA DATA-ID attribute missing",
            ),
            rule(
                self.name(),
                Severity::Error,
                value_and_uri,
                "no EXT-X-SESSION-DATA carries both VALUE and URI",
                "EXT-X-SESSION-DATA must not carry both VALUE and URI",
            ),
            rule(
                self.name(),
                Severity::Error,
                non_json,
                "every EXT-X-SESSION-DATA URI references JSON",
                "EXT-X-SESSION-DATA URI must reference a .json resource",
            ),
            rule(
                self.name(),
                Severity::Error,
                no_payload,
                "every EXT-X-SESSION-DATA carries VALUE or URI",
                "EXT-X-SESSION-DATA must carry either VALUE or URI",
            ),
            rule(
                self.name(),
                Severity::Error,
                duplicates,
                "EXT-X-SESSION-DATA DATA-ID and LANGUAGE pairs are unique",
                "EXT-X-SESSION-DATA tags share the same DATA-ID and LANGUAGE",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::checks::testing::run;

    fn failed_lines(findings: &[Finding]) -> Vec<Vec<u32>> {
        findings.iter().map(|f| f.lines.clone()).collect()
    }

    #[test]
    fn well_formed_session_data_passes() {
        let findings = run(
            &SessionDataCheck,
            NodeKind::Master,
            &[
                "#EXTM3U",
                "#EXT-X-SESSION-DATA:DATA-ID=\"com.example.title\",VALUE=\"Title\",LANGUAGE=\"en\"",
                "#EXT-X-SESSION-DATA:DATA-ID=\"com.example.title\",VALUE=\"Titre\",LANGUAGE=\"fr\"",
                "#EXT-X-SESSION-DATA:DATA-ID=\"com.example.meta\",URI=\"meta.json\"",
            ],
            0,
        );
        assert_eq!(findings.len(), 5);
        assert!(findings.iter().all(Finding::is_pass));
    }

    #[test]
    fn each_violation_has_its_own_finding() {
        let findings = run(
            &SessionDataCheck,
            NodeKind::Master,
            &[
                "#EXTM3U",
                "#EXT-X-SESSION-DATA:VALUE=\"orphan\"",
                "#EXT-X-SESSION-DATA:DATA-ID=\"a\",VALUE=\"x\",URI=\"a.json\"",
                "#EXT-X-SESSION-DATA:DATA-ID=\"b\",URI=\"b.xml\"",
                "#EXT-X-SESSION-DATA:DATA-ID=\"c\"",
            ],
            0,
        );
        assert_eq!(
            failed_lines(&findings),
            vec![vec![2], vec![3], vec![4], vec![5], vec![]]
        );
        assert!(findings[4].is_pass());
    }

    #[test]
    fn duplicate_id_and_language_reports_all_lines() {
        let findings = run(
            &SessionDataCheck,
            NodeKind::Master,
            &[
                "#EXTM3U",
                "#EXT-X-SESSION-DATA:DATA-ID=\"t\",VALUE=\"1\",LANGUAGE=\"en\"",
                "#EXT-X-SESSION-DATA:DATA-ID=\"t\",VALUE=\"2\",LANGUAGE=\"fr\"",
                "#EXT-X-SESSION-DATA:DATA-ID=\"t\",VALUE=\"3\",LANGUAGE=\"en\"",
            ],
            0,
        );
        assert_eq!(findings[4].severity, Severity::Error);
        assert_eq!(findings[4].lines, vec![2, 4]);
    }

    #[test]
    fn shared_id_without_language_is_not_a_duplicate() {
        let findings = run(
            &SessionDataCheck,
            NodeKind::Master,
            &[
                "#EXTM3U",
                "#EXT-X-SESSION-DATA:DATA-ID=\"t\",VALUE=\"1\"",
                "#EXT-X-SESSION-DATA:DATA-ID=\"t\",VALUE=\"2\"",
                "#EXT-X-SESSION-DATA:DATA-ID=\"t\",VALUE=\"3\",LANGUAGE=\"en\"",
            ],
            0,
        );
        assert_eq!(findings.len(), 5);
        assert!(findings.iter().all(Finding::is_pass));
    }

    #[test]
    fn quoted_values_may_contain_commas() {
        let findings = run(
            &SessionDataCheck,
            NodeKind::Master,
            &["#EXTM3U", "#EXT-X-SESSION-DATA:DATA-ID=\"t\",VALUE=\"a, URI=b\""],
            0,
        );
        assert!(findings.iter().all(Finding::is_pass));
    }
}
