//! Turns the published series into chart traces and hands them to the
//! rendering collaborator.

use crate::types::{BlockNumber, Sample};
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    MaxWeight,
    Total,
    Normal,
    Operational,
    Mandatory,
}

impl TraceKind {
    /// Drawing order, the limit line first.
    pub const ALL: [TraceKind; 5] = [
        TraceKind::MaxWeight,
        TraceKind::Total,
        TraceKind::Normal,
        TraceKind::Operational,
        TraceKind::Mandatory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TraceKind::MaxWeight => "Max Weight",
            TraceKind::Total => "Total",
            TraceKind::Normal => "Normal",
            TraceKind::Operational => "Operational",
            TraceKind::Mandatory => "Mandatory",
        }
    }

    fn value(&self, sample: &Sample, max_weight: u64) -> u64 {
        match self {
            TraceKind::MaxWeight => max_weight,
            TraceKind::Total => sample.weight_total,
            TraceKind::Normal => sample.weight_normal,
            TraceKind::Operational => sample.weight_operational,
            TraceKind::Mandatory => sample.weight_mandatory,
        }
    }
}

/// One line of the chart: block numbers on x, weight on y, block time as
/// hover text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub kind: TraceKind,
    pub name: &'static str,
    pub x: Vec<BlockNumber>,
    pub y: Vec<u64>,
    pub text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Traces {
    pub max_weight: u64,
    pub traces: Vec<Trace>,
}

impl Traces {
    /// `samples` must already be sorted by block.
    pub fn build(samples: &[Sample], max_weight: u64) -> Self {
        let x: Vec<_> = samples.iter().map(|s| s.block).collect();
        let text: Vec<_> = samples.iter().map(|s| s.time.to_rfc3339()).collect();
        let traces = TraceKind::ALL
            .iter()
            .map(|kind| Trace {
                kind: *kind,
                name: kind.name(),
                x: x.clone(),
                y: samples.iter().map(|s| kind.value(s, max_weight)).collect(),
                text: text.clone(),
            })
            .collect();
        Self { max_weight, traces }
    }

    pub fn points(&self) -> usize {
        self.traces.first().map_or(0, |trace| trace.x.len())
    }

    pub fn get(&self, kind: TraceKind) -> Option<&Trace> {
        self.traces.iter().find(|trace| trace.kind == kind)
    }
}

/// Chart that always receives the complete, freshly sorted series.
pub trait Renderer: Send + Sync {
    /// Replace every trace currently drawn.
    fn replace_all(&self, traces: &Traces);

    /// Remove the chart entirely.
    fn clear(&self);
}

/// Renderer for sessions that nobody watches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn replace_all(&self, _traces: &Traces) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConsumedWeight;
    use pretty_assertions::assert_eq;

    fn sample(block: BlockNumber, normal: u64, operational: u64, mandatory: u64) -> Sample {
        let weight = ConsumedWeight {
            normal,
            operational,
            mandatory,
        };
        Sample::from_raw(block, weight, 1_600_000_000_000 + block * 6_000).unwrap()
    }

    #[test]
    fn builds_five_traces_in_drawing_order() {
        let samples = vec![sample(1, 10, 2, 3), sample(5, 20, 0, 3)];
        let traces = Traces::build(&samples, 1_000);

        let names: Vec<_> = traces.traces.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["Max Weight", "Total", "Normal", "Operational", "Mandatory"]
        );
        assert_eq!(traces.points(), 2);
        assert_eq!(traces.get(TraceKind::MaxWeight).unwrap().y, vec![1_000, 1_000]);
        assert_eq!(traces.get(TraceKind::Total).unwrap().y, vec![15, 23]);
        assert_eq!(traces.get(TraceKind::Operational).unwrap().y, vec![2, 0]);
        assert_eq!(traces.get(TraceKind::Mandatory).unwrap().x, vec![1, 5]);
        assert_eq!(
            traces.get(TraceKind::Normal).unwrap().text[0],
            "2020-09-13T12:26:46+00:00"
        );
    }

    #[test]
    fn serializes_for_the_chart() {
        let traces = Traces::build(&[sample(3, 1, 1, 1)], 9);
        let json = serde_json::to_value(&traces).unwrap();
        assert_eq!(json["max_weight"], 9);
        assert_eq!(json["traces"][0]["kind"], "max_weight");
        assert_eq!(json["traces"][1]["name"], "Total");
        assert_eq!(json["traces"][1]["y"][0], 3);
    }

    #[test]
    fn empty_series() {
        let traces = Traces::build(&[], 9);
        assert_eq!(traces.points(), 0);
        assert_eq!(traces.traces.len(), 5);
    }
}
