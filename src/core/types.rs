use serde::{Deserialize, Serialize};

/// Genome build (reference assembly generation) a chromosome accession belongs to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum GenomeBuild {
    /// `GRCh37` / hg19
    #[serde(rename = "b37")]
    #[value(name = "b37", alias = "grch37", alias = "hg19")]
    B37,
    /// `GRCh38` / hg38
    #[serde(rename = "b38")]
    #[value(name = "b38", alias = "grch38", alias = "hg38")]
    B38,
}

impl GenomeBuild {
    /// Short build tag as written in generated definition files
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::B37 => "b37",
            Self::B38 => "b38",
        }
    }

    /// Parse a build tag (`b37`) or a `GRCh` assembly name (`GRCh38`, `GRCh38.p7`)
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let base = lower.split('.').next().unwrap_or_default();
        match base {
            "b37" | "grch37" | "hg19" => Some(Self::B37),
            "b38" | "grch38" | "hg38" => Some(Self::B38),
            _ => None,
        }
    }
}

impl std::fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Map a RefSeq chromosome number to a UCSC-style chromosome name.
///
/// 1-22 map to `chr1`..`chr22`, 23 to `chrX` and 24 to `chrY`.
/// Any other number has no name.
#[must_use]
pub fn chromosome_name(number: u32) -> Option<String> {
    match number {
        1..=22 => Some(format!("chr{number}")),
        23 => Some("chrX".to_string()),
        24 => Some("chrY".to_string()),
        _ => None,
    }
}
