//! Trigger turn-on curves: the jet pT spectrum of one trigger divided by the
//! spectrum of the sample trigger.

use jtrig_core::TrigError;
use jtrig_hist::{rebin_asymmetric, Hist1D};
use jtrig_select::{DataLevel, JetKind, Trigger, ANY_TRIGGER};

use crate::manager::{JetHistKey, ProjectionManager};

/// Ratio of `trigger_pt` over `any_pt` with uncorrelated errors. Bins where
/// `any_pt` is empty are zero.
pub fn turn_on(trigger_pt: &Hist1D, any_pt: &Hist1D) -> Result<Hist1D, TrigError> {
    let mut ratio = trigger_pt.renamed(format!("{}TurnOn", trigger_pt.name));
    ratio.divide(any_pt)?;
    Ok(ratio)
}

/// One turn-on curve and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOnCurve {
    /// Jet kind.
    pub kind: JetKind,
    /// Projection centrality bin.
    pub centrality: usize,
    /// Trigger in the numerator.
    pub trigger: Trigger,
    /// Efficiency per jet pT bin.
    pub curve: Hist1D,
}

impl TurnOnCurve {
    /// Storage name, e.g. `leadingJetTriggerTurnOnCaloJet80_C0`.
    pub fn name(&self) -> String {
        format!(
            "{}TriggerTurnOn{}_C{}",
            self.kind.name(),
            self.trigger.name(),
            self.centrality
        )
    }
}

/// Turn-on curves for every jet kind, loaded centrality bin and trigger at `level`.
///
/// With `edges` both spectra are rebinned before dividing. Keys whose spectra are
/// missing are skipped.
pub fn turn_on_curves(
    manager: &ProjectionManager,
    level: DataLevel,
    edges: Option<&[f64]>,
) -> Result<Vec<TurnOnCurve>, TrigError> {
    let mut curves = Vec::new();
    for kind in JetKind::ALL {
        for centrality in manager.first_centrality_bin()..=manager.last_centrality_bin() {
            let any_key = JetHistKey::new(kind, centrality, level, ANY_TRIGGER);
            let Some(any_pt) = manager.jet_pt(&any_key) else {
                log::debug!("no inclusive spectrum for {any_key:?}");
                continue;
            };
            let any_pt = match edges {
                Some(edges) => rebin_asymmetric(any_pt, edges),
                None => any_pt.clone(),
            };
            for trigger in Trigger::ALL {
                let key = JetHistKey::new(kind, centrality, level, trigger.index());
                let Some(trigger_pt) = manager.jet_pt(&key) else {
                    continue;
                };
                let trigger_pt = match edges {
                    Some(edges) => rebin_asymmetric(trigger_pt, edges),
                    None => trigger_pt.clone(),
                };
                let mut curve = TurnOnCurve {
                    kind,
                    centrality,
                    trigger,
                    curve: turn_on(&trigger_pt, &any_pt)?,
                };
                curve.curve.name = curve.name();
                curves.push(curve);
            }
        }
    }
    Ok(curves)
}
