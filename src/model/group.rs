use crate::model::address::WellAddress;
use crate::stats::{mean, sample_stdev};

pub const WELLS_IN_A_PARALLEL: usize = 12;

/// Number of dilution steps generated beyond the initial dilution, one per
/// measurement well of a dose-response parallel.
const GENERATED_DILUTIONS: usize = 8;

/// How the twelve wells of one parallel are partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellScheme {
    /// 2 negative controls, 9 measurement wells, 1 viral control.
    DoseResponse,
    /// 2 controls, 10 measurement wells, no viral-control slot.
    Endpoint,
}

impl WellScheme {
    pub fn measurement_slots(&self) -> usize {
        match self {
            WellScheme::DoseResponse => 9,
            WellScheme::Endpoint => 10,
        }
    }

    pub fn has_viral_control(&self) -> bool {
        matches!(self, WellScheme::DoseResponse)
    }
}

/// One well's absorbance reading together with its plate coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Well {
    pub value: f64,
    pub address: WellAddress,
}

/// One physical replicate of twelve consecutive wells in loading order.
#[derive(Debug, Clone)]
pub struct Parallel {
    scheme: WellScheme,
    pub negative_controls: Vec<Well>,
    pub measurements: Vec<Well>,
    pub viral_control: Option<Well>,
}

impl Parallel {
    pub fn new(scheme: WellScheme) -> Self {
        Parallel {
            scheme,
            negative_controls: Vec::with_capacity(2),
            measurements: Vec::with_capacity(scheme.measurement_slots()),
            viral_control: None,
        }
    }

    pub fn scheme(&self) -> WellScheme {
        self.scheme
    }

    pub fn filled_well_count(&self) -> usize {
        self.negative_controls.len()
            + self.measurements.len()
            + usize::from(self.viral_control.is_some())
    }

    pub fn is_filled(&self) -> bool {
        self.negative_controls.len() == 2
            && self.measurements.len() == self.scheme.measurement_slots()
            && (self.viral_control.is_some() || !self.scheme.has_viral_control())
    }

    /// Assigns the next well by its position within the parallel: the first
    /// two slots are controls, the last slot of a dose-response parallel is
    /// the viral control, everything in between is a measurement well.
    pub fn push_well(&mut self, well: Well) {
        let slot = self.filled_well_count();
        match self.scheme {
            WellScheme::DoseResponse => {
                if slot < 2 {
                    self.negative_controls.push(well);
                } else if slot == WELLS_IN_A_PARALLEL - 1 {
                    self.viral_control = Some(well);
                } else {
                    self.measurements.push(well);
                }
            }
            WellScheme::Endpoint => {
                if slot < 2 {
                    self.negative_controls.push(well);
                } else {
                    self.measurements.push(well);
                }
            }
        }
    }

    /// All wells in slot order: controls, measurements, viral control.
    pub fn wells_in_order(&self) -> Vec<Well> {
        let mut wells = self.negative_controls.clone();
        wells.extend(self.measurements.iter().copied());
        wells.extend(self.viral_control);
        wells
    }

    pub fn control_values(&self) -> Vec<f64> {
        self.negative_controls.iter().map(|w| w.value).collect()
    }

    pub fn measurement_values(&self) -> Vec<f64> {
        self.measurements.iter().map(|w| w.value).collect()
    }

    pub fn normalized_measurements(&self, baseline: f64, topline: f64) -> Vec<f64> {
        self.measurements
            .iter()
            .map(|w| (w.value - baseline) / (topline - baseline))
            .collect()
    }
}

/// A named collection of parallels measuring one titration or tube.
#[derive(Debug, Clone)]
pub struct Sample {
    pub label: String,
    pub parallels: Vec<Parallel>,
}

impl Sample {
    pub fn new(label: impl Into<String>, parallels: usize, scheme: WellScheme) -> Self {
        Sample {
            label: label.into(),
            parallels: (0..parallels).map(|_| Parallel::new(scheme)).collect(),
        }
    }

    pub fn all_negative_control_values(&self) -> Vec<f64> {
        self.parallels
            .iter()
            .flat_map(|p| p.control_values())
            .collect()
    }

    pub fn all_viral_control_values(&self) -> Vec<f64> {
        self.parallels
            .iter()
            .filter_map(|p| p.viral_control.map(|w| w.value))
            .collect()
    }

    pub fn control_avg(&self) -> f64 {
        mean(&self.all_negative_control_values()).unwrap_or(0.0)
    }

    pub fn control_stdev(&self) -> f64 {
        sample_stdev(&self.all_negative_control_values())
    }

    /// Per-slot averages of the measurement wells across all parallels.
    pub fn measurement_col_avgs(&self) -> Vec<f64> {
        let slots = match self.parallels.first() {
            Some(p) => p.scheme().measurement_slots(),
            None => return Vec::new(),
        };
        let mut sums = vec![0.0; slots];
        let mut counts = vec![0usize; slots];
        for parallel in &self.parallels {
            for (i, value) in parallel.measurement_values().into_iter().enumerate() {
                sums[i] += value;
                counts[i] += 1;
            }
        }
        sums.iter()
            .zip(&counts)
            .map(|(sum, &count)| sum / count as f64)
            .collect()
    }

    pub fn normalized_col_avgs(&self, baseline: f64, topline: f64) -> Vec<f64> {
        let slots = match self.parallels.first() {
            Some(p) => p.scheme().measurement_slots(),
            None => return Vec::new(),
        };
        let mut sums = vec![0.0; slots];
        let mut counts = vec![0usize; slots];
        for parallel in &self.parallels {
            for (i, value) in parallel
                .normalized_measurements(baseline, topline)
                .into_iter()
                .enumerate()
            {
                sums[i] += value;
                counts[i] += 1;
            }
        }
        sums.iter()
            .zip(&counts)
            .map(|(sum, &count)| sum / count as f64)
            .collect()
    }

    /// Per-slot share of uninfected wells across all parallels, each well
    /// counted infected when its value exceeds half the control average.
    pub fn infection_avgs(&self) -> Vec<f64> {
        let avg_50 = self.control_avg() / 2.0;
        let mut sums = vec![0.0; WELLS_IN_A_PARALLEL];
        let mut counts = vec![0usize; WELLS_IN_A_PARALLEL];
        for parallel in &self.parallels {
            for (i, well) in parallel.wells_in_order().into_iter().enumerate() {
                sums[i] += if avg_50 < well.value { 0.0 } else { 1.0 };
                counts[i] += 1;
            }
        }
        sums.iter()
            .zip(&counts)
            .map(|(sum, &count)| if count == 0 { 0.0 } else { sum / count as f64 })
            .collect()
    }

    /// Sum of infection averages over the measurement slots, excluding the
    /// two control wells.
    pub fn infection_avgs_sum(&self) -> f64 {
        self.infection_avgs().iter().skip(2).sum()
    }
}

/// Top-level dose-response unit: a dilution series with its samples.
#[derive(Debug, Clone)]
pub struct Group {
    pub analysis_type: String,
    pub ordinal: usize,
    pub is_filler: bool,
    pub dil_series: Vec<f64>,
    pub samples: Vec<Sample>,
}

impl Group {
    pub fn new(analysis_type: impl Into<String>, ordinal: usize, is_filler: bool) -> Self {
        Group {
            analysis_type: analysis_type.into(),
            ordinal,
            is_filler,
            dil_series: Vec::new(),
            samples: Vec::new(),
        }
    }

    pub fn add_sample(&mut self, label: impl Into<String>, parallels: usize) {
        self.samples
            .push(Sample::new(label, parallels, WellScheme::DoseResponse));
    }

    /// Generates the nine-step dilution series from the initial dilution.
    /// A negative factor divides instead of multiplies.
    pub fn set_dil_series(&mut self, init_dil: f64, dil_factor: f64) {
        self.dil_series.clear();
        self.dil_series.push(init_dil);
        let mut last = init_dil;
        for _ in 0..GENERATED_DILUTIONS {
            last = if dil_factor < 0.0 {
                last / dil_factor.abs()
            } else {
                last * dil_factor
            };
            self.dil_series.push(last);
        }
    }

    pub fn all_negative_control_values(&self) -> Vec<f64> {
        self.samples
            .iter()
            .flat_map(|s| s.all_negative_control_values())
            .collect()
    }

    pub fn all_viral_control_values(&self) -> Vec<f64> {
        self.samples
            .iter()
            .flat_map(|s| s.all_viral_control_values())
            .collect()
    }

    pub fn neg_ctrl_avg(&self) -> Option<f64> {
        mean(&self.all_negative_control_values())
    }

    pub fn vir_ctrl_avg(&self) -> Option<f64> {
        mean(&self.all_viral_control_values())
    }

    pub fn neg_ctrl_avg_half(&self) -> Option<f64> {
        self.neg_ctrl_avg().map(|avg| avg * 0.5)
    }

    pub fn neg_ctrl_stdev(&self) -> f64 {
        sample_stdev(&self.all_negative_control_values())
    }

    pub fn vir_ctrl_stdev(&self) -> f64 {
        sample_stdev(&self.all_viral_control_values())
    }

    pub fn label(&self) -> String {
        if self.is_filler {
            format!("Excluded dataset {}", self.ordinal)
        } else {
            format!("Group {}", self.ordinal)
        }
    }
}

/// Top-level endpoint-dilution unit bundling tissue parameters with samples.
#[derive(Debug, Clone)]
pub struct Tissue {
    pub title: String,
    pub ordinal: usize,
    pub dil_rate: f64,
    pub first_dil: f64,
    pub working_vol: f64,
    pub samples: Vec<Sample>,
}

impl Tissue {
    pub fn new(
        title: impl Into<String>,
        ordinal: usize,
        dil_rate: f64,
        first_dil: f64,
        working_vol: f64,
    ) -> Self {
        Tissue {
            title: title.into(),
            ordinal,
            dil_rate,
            first_dil,
            working_vol,
            samples: Vec::new(),
        }
    }

    pub fn add_sample(&mut self, tube_label: impl Into<String>, parallels: usize) {
        self.samples
            .push(Sample::new(tube_label, parallels, WellScheme::Endpoint));
    }

    pub fn label(&self) -> String {
        format!("Tissue \"{}{}\"", self.title, self.ordinal)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/group.rs"]
mod tests;
