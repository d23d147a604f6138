use crate::ViolationSink;
use fsmcheck_domain::{CategoryTally, Enforcement};
use fsmcheck_types::ViolatingSymbol;

/// Human-readable per-category summary; its final message becomes the verdict text.
#[derive(Clone, Debug)]
pub struct TextSink {
    level: String,
    lines: Vec<String>,
    message: Option<String>,
}

impl TextSink {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            lines: Vec::new(),
            message: None,
        }
    }

    /// Accumulated category blocks, one line per entry.
    pub fn report(&self) -> String {
        self.lines.join("\n")
    }

    /// Final message, available once the sink is done.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl ViolationSink for TextSink {
    fn handle_violations(
        &mut self,
        enforcement: &Enforcement,
        tally: &CategoryTally,
        symbols: &[ViolatingSymbol],
    ) {
        self.lines
            .push(format!("{} ({}):", tally.category, tally.description));

        if tally.count == 0 {
            self.lines.push("  0 violations!".to_string());
        } else if !enforcement.is_enforced(&tally.category) {
            self.lines.push(format!(
                "  {} violations ignored for ComplianceLevel '{}'",
                tally.count,
                enforcement.level()
            ));
        } else {
            self.lines
                .push(format!("{} violations need to be resolved", tally.count));
            for symbol in symbols {
                self.lines.push(format!(
                    "  {} ({} usages)",
                    symbol.name, symbol.number_of_usages
                ));
            }
        }
    }

    fn on_done(&mut self, success: bool) -> anyhow::Result<()> {
        self.message = Some(if success {
            format!("Isolation check passed! ComplianceLevel: '{}'", self.level)
        } else {
            self.report()
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsmcheck_domain::{CategoryId, ComplianceLevel, LevelCatalog};

    fn enforcement(level: &str) -> Enforcement {
        let catalog = LevelCatalog::new(vec![
            ComplianceLevel::new("MINIMAL", 0, vec!["IMPL_USAGE".into()]),
            ComplianceLevel::new("DEFAULT", 1, vec!["NON_ISOLATED_API".into()]),
        ])
        .expect("catalog");
        Enforcement::resolve(&catalog, level).expect("level")
    }

    fn tally(category: &str, description: &str, count: u64) -> CategoryTally {
        CategoryTally {
            category: CategoryId::from(category),
            description: description.to_string(),
            count,
        }
    }

    fn symbol(name: &str, usages: u64) -> ViolatingSymbol {
        ViolatingSymbol {
            name: name.to_string(),
            number_of_usages: usages,
        }
    }

    #[test]
    fn block_layout() {
        let enforcement = enforcement("MINIMAL");
        let mut sink = TextSink::new(enforcement.level());

        sink.handle_violations(
            &enforcement,
            &tally("IMPL_USAGE", "Usage of implementation classes", 2),
            &[symbol("de.espirit.impl.Foo", 3), symbol("de.espirit.impl.Bar", 1)],
        );
        sink.handle_violations(
            &enforcement,
            &tally("NON_ISOLATED_API", "Usage of non-isolated API", 5),
            &[symbol("de.espirit.api.Baz", 5)],
        );
        sink.handle_violations(&enforcement, &tally("DEPRECATED_API", "Deprecated", 0), &[]);
        sink.on_done(false).expect("done");

        insta::assert_snapshot!(sink.message().unwrap_or_default(), @r"
IMPL_USAGE (Usage of implementation classes):
2 violations need to be resolved
  de.espirit.impl.Foo (3 usages)
  de.espirit.impl.Bar (1 usages)
NON_ISOLATED_API (Usage of non-isolated API):
  5 violations ignored for ComplianceLevel 'MINIMAL'
DEPRECATED_API (Deprecated):
  0 violations!
");
    }

    #[test]
    fn success_message_names_level() {
        let enforcement = enforcement("default");
        let mut sink = TextSink::new(enforcement.level());
        sink.handle_violations(&enforcement, &tally("IMPL_USAGE", "impl", 0), &[]);
        assert_eq!(sink.message(), None);

        sink.on_done(true).expect("done");
        assert_eq!(
            sink.message(),
            Some("Isolation check passed! ComplianceLevel: 'DEFAULT'")
        );
        assert!(sink.report().contains("IMPL_USAGE (impl):"));
    }
}
