use crate::ViolationSink;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fsmcheck_domain::{CategoryTally, Enforcement};
use fsmcheck_types::{ViolatingSymbol, ids};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Case {
    name: String,
    skipped: bool,
    failure: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Suite {
    name: String,
    cases: Vec<Case>,
}

impl Suite {
    fn tests(&self) -> usize {
        self.cases.len()
    }

    fn skipped(&self) -> usize {
        self.cases.iter().filter(|c| c.skipped).count()
    }

    fn failures(&self) -> usize {
        self.cases.iter().filter(|c| c.failure.is_some()).count()
    }
}

/// JUnit-style XML report, one `<testsuite>` per category.
///
/// Symbols of a category the level does not enforce are still emitted as failing cases,
/// additionally marked `<skipped/>`, and they count toward the root `failures` total.
/// The file is written on [`on_done`](ViolationSink::on_done) whatever the outcome.
#[derive(Clone, Debug)]
pub struct JunitSink {
    report_dir: Utf8PathBuf,
    suites: Vec<Suite>,
}

impl JunitSink {
    pub fn new(report_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
            suites: Vec::new(),
        }
    }

    /// `<report_dir>/fsmchecker-reports/TEST-complianceCheck.xml`
    pub fn report_path(&self) -> Utf8PathBuf {
        report_path(&self.report_dir)
    }

    pub fn render(&self) -> String {
        let tests: usize = self.suites.iter().map(Suite::tests).sum();
        let failures: usize = self.suites.iter().map(Suite::failures).sum();

        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!(
            "<testsuites tests=\"{tests}\" errors=\"0\" failures=\"{failures}\">\n"
        ));
        for suite in &self.suites {
            out.push_str(&format!(
                "  <testsuite name=\"{}\" tests=\"{}\" errors=\"0\" skipped=\"{}\" failures=\"{}\">\n",
                xml_escape(&suite.name),
                suite.tests(),
                suite.skipped(),
                suite.failures()
            ));
            for case in &suite.cases {
                let name = xml_escape(&case.name);
                if !case.skipped && case.failure.is_none() {
                    out.push_str(&format!("    <testcase name=\"{name}\"/>\n"));
                    continue;
                }
                out.push_str(&format!("    <testcase name=\"{name}\">\n"));
                if case.skipped {
                    out.push_str("      <skipped/>\n");
                }
                if let Some(message) = &case.failure {
                    out.push_str(&format!(
                        "      <failure message=\"{}\"/>\n",
                        xml_escape(message)
                    ));
                }
                out.push_str("    </testcase>\n");
            }
            out.push_str("  </testsuite>\n");
        }
        out.push_str("</testsuites>\n");
        out
    }
}

/// Location of the structured report below `report_dir`.
pub fn report_path(report_dir: &Utf8Path) -> Utf8PathBuf {
    report_dir.join(ids::REPORT_SUBDIR).join(ids::REPORT_FILE_NAME)
}

impl ViolationSink for JunitSink {
    fn handle_violations(
        &mut self,
        enforcement: &Enforcement,
        tally: &CategoryTally,
        symbols: &[ViolatingSymbol],
    ) {
        let name = match enforcement.owning_level(&tally.category) {
            Some(owner) => format!("{owner} | {}", tally.category),
            None => tally.category.to_string(),
        };
        let skipped = !enforcement.is_enforced(&tally.category);

        let cases = if symbols.is_empty() {
            vec![Case {
                name: ids::CASE_NO_VIOLATIONS.to_string(),
                skipped: false,
                failure: None,
            }]
        } else {
            symbols
                .iter()
                .map(|s| Case {
                    name: s.name.clone(),
                    skipped,
                    failure: Some(format!("{} usage(s)", s.number_of_usages)),
                })
                .collect()
        };

        self.suites.push(Suite { name, cases });
    }

    fn on_done(&mut self, _success: bool) -> anyhow::Result<()> {
        let path = self.report_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create report dir {parent}"))?;
        }
        std::fs::write(&path, self.render()).with_context(|| format!("write {path}"))?;
        Ok(())
    }
}

/// Escape for use in attribute values. Characters XML 1.0 cannot carry become U+FFFD.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => out.push('\u{fffd}'),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsmcheck_domain::{CategoryId, ComplianceLevel, LevelCatalog};
    use proptest::prelude::*;

    fn enforcement(level: &str) -> Enforcement {
        let catalog = LevelCatalog::new(vec![
            ComplianceLevel::new("MINIMAL", 0, vec!["A".into()]),
            ComplianceLevel::new("DEFAULT", 1, vec!["B".into()]),
        ])
        .expect("catalog");
        Enforcement::resolve(&catalog, level).expect("level")
    }

    fn tally(category: &str, count: u64) -> CategoryTally {
        CategoryTally {
            category: CategoryId::from(category),
            description: String::new(),
            count,
        }
    }

    fn symbols(names: &[(&str, u64)]) -> Vec<ViolatingSymbol> {
        names
            .iter()
            .map(|(n, u)| ViolatingSymbol {
                name: n.to_string(),
                number_of_usages: *u,
            })
            .collect()
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn renders_suites_cases_and_counters() {
        let enforcement = enforcement("MINIMAL");
        let mut sink = JunitSink::new("build");
        sink.handle_violations(&enforcement, &tally("A", 2), &symbols(&[("a.One", 3), ("a.Two", 1)]));
        sink.handle_violations(&enforcement, &tally("B", 0), &[]);

        let expected = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<testsuites tests=\"3\" errors=\"0\" failures=\"2\">
  <testsuite name=\"MINIMAL | A\" tests=\"2\" errors=\"0\" skipped=\"0\" failures=\"2\">
    <testcase name=\"a.One\">
      <failure message=\"3 usage(s)\"/>
    </testcase>
    <testcase name=\"a.Two\">
      <failure message=\"1 usage(s)\"/>
    </testcase>
  </testsuite>
  <testsuite name=\"DEFAULT | B\" tests=\"1\" errors=\"0\" skipped=\"0\" failures=\"0\">
    <testcase name=\"noViolations\"/>
  </testsuite>
</testsuites>
";
        assert_eq!(sink.render(), expected);
    }

    #[test]
    fn ignored_category_cases_are_skipped_and_still_counted_as_failures() {
        let enforcement = enforcement("MINIMAL");
        let mut sink = JunitSink::new("build");
        sink.handle_violations(&enforcement, &tally("B", 1), &symbols(&[("b.Legacy", 4)]));

        let xml = sink.render();
        assert!(xml.contains("skipped=\"1\" failures=\"1\""), "{xml}");
        assert!(xml.contains("<skipped/>\n      <failure message=\"4 usage(s)\"/>"), "{xml}");
        // Root failures include ignored symbols.
        assert!(xml.contains("<testsuites tests=\"1\" errors=\"0\" failures=\"1\">"), "{xml}");
    }

    #[test]
    fn unowned_category_uses_bare_name_and_escapes() {
        let enforcement = enforcement("DEFAULT");
        let mut sink = JunitSink::new("build");
        sink.handle_violations(
            &enforcement,
            &tally("NEW<&>", 1),
            &symbols(&[("Outer$\"Inner\"", 1)]),
        );

        let xml = sink.render();
        assert!(xml.contains("<testsuite name=\"NEW&lt;&amp;&gt;\""), "{xml}");
        assert!(xml.contains("<testcase name=\"Outer$&quot;Inner&quot;\">"), "{xml}");
    }

    #[test]
    fn control_characters_never_reach_the_xml() {
        let enforcement = enforcement("MINIMAL");
        let mut sink = JunitSink::new("build");
        sink.handle_violations(
            &enforcement,
            &tally("A", 1),
            &symbols(&[("bad\u{1}name\tx\u{ffff}", 1)]),
        );

        let xml = sink.render();
        assert!(
            xml.contains("<testcase name=\"bad\u{fffd}name&#9;x\u{fffd}\">"),
            "{xml}"
        );
        assert!(
            !xml.chars()
                .any(|c| (c < ' ' && c != '\n') || c == '\u{ffff}'),
            "{xml:?}"
        );
    }

    #[test]
    fn on_done_writes_report_even_on_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report_dir = Utf8PathBuf::from_path_buf(dir.path().join("out")).expect("utf8");
        let enforcement = enforcement("DEFAULT");
        let mut sink = JunitSink::new(report_dir.clone());
        sink.handle_violations(&enforcement, &tally("A", 1), &symbols(&[("a.X", 1)]));

        sink.on_done(false).expect("written");

        let path = report_dir.join("fsmchecker-reports/TEST-complianceCheck.xml");
        assert_eq!(sink.report_path(), path);
        let written = std::fs::read_to_string(&path).expect("read report");
        assert_eq!(written, sink.render());
    }

    #[test]
    fn empty_run_renders_empty_root() {
        let xml = JunitSink::new("build").render();
        assert!(xml.contains("<testsuites tests=\"0\" errors=\"0\" failures=\"0\">\n</testsuites>"));
    }

    proptest! {
        #[test]
        fn root_tests_match_suites_and_cases(
            categories in prop::collection::vec(
                (0usize..3, prop::collection::vec(1u64..50, 0..5)),
                0..6,
            ),
        ) {
            let enforcement = enforcement("MINIMAL");
            let mut sink = JunitSink::new("build");
            for (idx, (kind, usages)) in categories.iter().enumerate() {
                let category = match kind {
                    0 => "A".to_string(),
                    1 => "B".to_string(),
                    _ => format!("EXTRA_{idx}"),
                };
                let syms: Vec<ViolatingSymbol> = usages
                    .iter()
                    .enumerate()
                    .map(|(i, u)| ViolatingSymbol { name: format!("s{i}"), number_of_usages: *u })
                    .collect();
                sink.handle_violations(&enforcement, &tally(&category, syms.len() as u64), &syms);
            }

            let xml = sink.render();
            prop_assert_eq!(xml.clone(), sink.render());

            let cases = count(&xml, "<testcase ");
            let suite_tests: usize = sink.suites.iter().map(Suite::tests).sum();
            let root = format!("<testsuites tests=\"{cases}\" ");
            prop_assert_eq!(suite_tests, cases);
            prop_assert!(xml.contains(&root), "{}", xml);
            prop_assert_eq!(count(&xml, "<testsuite "), categories.len());
        }
    }
}
