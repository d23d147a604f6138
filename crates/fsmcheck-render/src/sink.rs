use fsmcheck_domain::{CategoryTally, Enforcement};
use fsmcheck_types::ViolatingSymbol;

/// Consumer of per-category violation detail.
///
/// The verifier calls [`handle_violations`](Self::handle_violations) once per category in
/// taxonomy order, then [`on_done`](Self::on_done) exactly once. Each sink owns its own
/// accumulated state.
pub trait ViolationSink {
    fn handle_violations(
        &mut self,
        enforcement: &Enforcement,
        tally: &CategoryTally,
        symbols: &[ViolatingSymbol],
    );

    fn on_done(&mut self, success: bool) -> anyhow::Result<()>;
}
