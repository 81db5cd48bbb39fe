//! Weight curves applied to simulated events.
//!
//! The curves are polynomials fitted to data/simulation ratios. Real data and the
//! local test sample carry no curves, so every weight is one for them.

use serde::{Deserialize, Serialize};

use crate::tables::DataType;

const PP_MC_VERTEX: [f64; 7] = [
    0.973805,
    0.00339418,
    0.000757544,
    -1.37331e-06,
    -2.82953e-07,
    -3.06778e-10,
    3.48615e-09,
];

const PBPB_MC_VERTEX: [f64; 7] = [
    1.0082,
    -0.0190011,
    0.000779051,
    -2.15118e-05,
    -6.70894e-06,
    1.47181e-07,
    6.65274e-09,
];

const CENTRALITY_CENTRAL: [f64; 7] = [
    4.44918,
    -0.0544424,
    -0.0248668,
    0.00254486,
    -0.000117819,
    2.65985e-06,
    -2.35606e-08,
];

const CENTRALITY_PERIPHERAL: [f64; 7] = [
    3.41938,
    -0.0643178,
    -0.00186948,
    7.67356e-05,
    -1.06981e-06,
    7.04102e-09,
    -1.84554e-11,
];

const JET_SPECTRUM: [f64; 4] = [0.79572, 0.0021861, -6.35407e-06, 6.66435e-09];

/// hiBin below which the central centrality curve applies.
pub const CENTRAL_HI_BIN_LIMIT: i32 = 60;
/// hiBin from which no centrality weight is applied.
pub const PERIPHERAL_HI_BIN_LIMIT: i32 = 194;

/// Polynomial `c0 + c1 x + c2 x² + ...`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polynomial {
    coefficients: &'static [f64],
}

impl Polynomial {
    /// Wraps a coefficient list ordered from the constant term up.
    pub const fn new(coefficients: &'static [f64]) -> Self {
        Self { coefficients }
    }

    /// Evaluates the polynomial.
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, coefficient| acc * x + coefficient)
    }
}

/// Weight curves resolved for one data type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightTable {
    vertex: Option<Polynomial>,
    centrality: Option<(Polynomial, Polynomial)>,
    jet_spectrum: Option<Polynomial>,
}

impl WeightTable {
    /// Table for a data type.
    pub fn for_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::PpMc => Self {
                vertex: Some(Polynomial::new(&PP_MC_VERTEX)),
                centrality: None,
                jet_spectrum: Some(Polynomial::new(&JET_SPECTRUM)),
            },
            DataType::PbPbMc => Self {
                vertex: Some(Polynomial::new(&PBPB_MC_VERTEX)),
                centrality: Some((
                    Polynomial::new(&CENTRALITY_CENTRAL),
                    Polynomial::new(&CENTRALITY_PERIPHERAL),
                )),
                jet_spectrum: Some(Polynomial::new(&JET_SPECTRUM)),
            },
            DataType::Pp | DataType::PbPb | DataType::LocalTest => Self {
                vertex: None,
                centrality: None,
                jet_spectrum: None,
            },
        }
    }

    /// Vertex position weight.
    pub fn vertex_weight(&self, vz: f64) -> f64 {
        self.vertex.map_or(1.0, |curve| curve.eval(vz))
    }

    /// Centrality weight for a hiBin. Negative hiBins are read as 1.
    pub fn centrality_weight(&self, hi_bin: i32) -> f64 {
        let Some((central, peripheral)) = self.centrality else {
            return 1.0;
        };
        let hi_bin = if hi_bin < 0 { 1 } else { hi_bin };
        let x = f64::from(hi_bin) / 2.0;
        if hi_bin < CENTRAL_HI_BIN_LIMIT {
            central.eval(x)
        } else if hi_bin < PERIPHERAL_HI_BIN_LIMIT {
            peripheral.eval(x)
        } else {
            1.0
        }
    }

    /// Jet spectrum weight for a jet pT.
    pub fn jet_pt_weight(&self, pt: f64) -> f64 {
        self.jet_spectrum.map_or(1.0, |curve| curve.eval(pt))
    }
}

/// Per-event weight factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventWeights {
    /// Vertex position weight.
    pub vertex: f64,
    /// Centrality weight.
    pub centrality: f64,
    /// Generator cross-section weight.
    pub cross_section: f64,
}

impl EventWeights {
    /// Unit weights.
    pub const UNIT: EventWeights = EventWeights {
        vertex: 1.0,
        centrality: 1.0,
        cross_section: 1.0,
    };

    /// Product of all factors.
    pub fn total(&self) -> f64 {
        self.vertex * self.centrality * self.cross_section
    }
}

impl Default for EventWeights {
    fn default() -> Self {
        Self::UNIT
    }
}
