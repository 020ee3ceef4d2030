use foundation::color::Rgb;
use serde::{Deserialize, Serialize};

use crate::score::DemandScore;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityBand {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl SeverityBand {
    pub const ALL: [SeverityBand; 4] = [
        SeverityBand::Low,
        SeverityBand::Medium,
        SeverityBand::High,
        SeverityBand::VeryHigh,
    ];

    pub const fn color(self) -> Rgb {
        match self {
            SeverityBand::Low => Rgb(0x44, 0x44, 0xff),
            SeverityBand::Medium => Rgb(0x44, 0xaa, 0x44),
            SeverityBand::High => Rgb(0xff, 0x88, 0x00),
            SeverityBand::VeryHigh => Rgb(0xff, 0x44, 0x44),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SeverityBand::Low => "Low",
            SeverityBand::Medium => "Medium",
            SeverityBand::High => "High",
            SeverityBand::VeryHigh => "Very High",
        }
    }

    /// Legend caption, e.g. `40-50 (Medium)`.
    pub const fn legend_label(self) -> &'static str {
        match self {
            SeverityBand::Low => "30-40 (Low)",
            SeverityBand::Medium => "40-50 (Medium)",
            SeverityBand::High => "50-60 (High)",
            SeverityBand::VeryHigh => "60+ (Very High)",
        }
    }
}

/// Upper inclusive bounds for Low, Medium and High.
const LOW_MAX: i64 = 40;
const MEDIUM_MAX: i64 = 50;
const HIGH_MAX: i64 = 60;

pub fn classify(score: DemandScore) -> SeverityBand {
    match score.get() {
        s if s <= LOW_MAX => SeverityBand::Low,
        s if s <= MEDIUM_MAX => SeverityBand::Medium,
        s if s <= HIGH_MAX => SeverityBand::High,
        _ => SeverityBand::VeryHigh,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub band: SeverityBand,
    pub color: Rgb,
    pub label: &'static str,
}

/// Legend rows in ascending severity.
pub fn legend() -> Vec<LegendEntry> {
    SeverityBand::ALL
        .iter()
        .map(|&band| LegendEntry {
            band,
            color: band.color(),
            label: band.legend_label(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{SeverityBand, classify, legend};
    use crate::score::DemandScore;

    #[test]
    fn band_boundaries() {
        let cases = [
            (i64::MIN, SeverityBand::Low),
            (0, SeverityBand::Low),
            (40, SeverityBand::Low),
            (41, SeverityBand::Medium),
            (50, SeverityBand::Medium),
            (51, SeverityBand::High),
            (60, SeverityBand::High),
            (61, SeverityBand::VeryHigh),
            (i64::MAX, SeverityBand::VeryHigh),
        ];
        for (score, band) in cases {
            assert_eq!(classify(DemandScore(score)), band, "score {score}");
        }
    }

    #[test]
    fn band_colors() {
        assert_eq!(SeverityBand::Low.color().hex(), "#4444ff");
        assert_eq!(SeverityBand::Medium.color().hex(), "#44aa44");
        assert_eq!(SeverityBand::High.color().hex(), "#ff8800");
        assert_eq!(SeverityBand::VeryHigh.color().hex(), "#ff4444");
    }

    #[test]
    fn legend_is_ordered_by_severity() {
        let labels: Vec<&str> = legend().iter().map(|e| e.label).collect();
        assert_eq!(
            labels,
            vec!["30-40 (Low)", "40-50 (Medium)", "50-60 (High)", "60+ (Very High)"]
        );
    }
}
