//! Parse -> serialize -> read round trips over real table fixtures.

use std::path::Path;

use allele_def::serializer::{read_generated, write_generated};
use allele_def::{HaplotypeIdMap, ParserConfig, TableParser};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[test]
fn test_round_trip_preserves_definition() {
    let ids = HaplotypeIdMap::load_from_file(&fixture("haplotype_ids.json")).unwrap();
    let parser = TableParser::new(
        ParserConfig::default().with_version_tag("r1"),
        allele_def::AssemblyMap::embedded(),
        &ids,
    );
    let mut definition = parser
        .parse_file(&fixture("CYP2C19.allele.translation.tsv"))
        .unwrap();

    let text = write_generated(&definition);
    let read = read_generated(&text).unwrap();

    // population frequencies are not part of the generated format
    definition.populations.clear();
    for allele in &mut definition.named_alleles {
        allele.population_frequencies.clear();
    }
    assert_eq!(read, definition);
    assert_eq!(write_generated(&read), text);
}

#[test]
fn test_every_allele_aligned_with_variants() {
    let definition = TableParser::with_config(ParserConfig::default())
        .parse_file(&fixture("CYP2C19.allele.translation.tsv"))
        .unwrap();

    assert!(definition.find_width_mismatch().is_none());
    let text = write_generated(&definition);
    let width = 4 + definition.num_variants();
    for line in text.lines().filter(|l| l.starts_with("Allele\t")) {
        assert_eq!(line.split('\t').count(), width, "misaligned row: {line}");
    }
}
