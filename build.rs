use std::collections::HashSet;
use std::path::Path;

const ASSEMBLY_MAP: &str = "data/assembly_map.tsv";
const BUILD_TAGS: [&str; 2] = ["b37", "b38"];

fn main() {
    let map_path = Path::new(ASSEMBLY_MAP);
    validate_assembly_map_file(map_path);
    set_build_dependencies();
}

fn validate_assembly_map_file(map_path: &Path) {
    // Ensure the assembly map exists at build time
    assert!(
        map_path.exists(),
        "\n\nASSEMBLY MAP BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the assembly map before building.\n",
        map_path.display()
    );

    let contents = std::fs::read_to_string(map_path).unwrap_or_else(|e| {
        panic!(
            "\n\nASSEMBLY MAP BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            map_path.display()
        );
    });

    let entries = validate_rows(&contents);
    assert!(
        entries > 0,
        "\n\nASSEMBLY MAP BUILD ERROR: No entries found in {}\n",
        map_path.display()
    );

    println!("cargo:warning=Validated assembly map: {entries} accessions");
}

fn validate_rows(contents: &str) -> usize {
    let mut seen = HashSet::new();

    for (i, line) in contents.lines().enumerate() {
        let line_num = i + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        assert!(
            fields.len() == 3,
            "\n\nASSEMBLY MAP BUILD ERROR: Line {line_num} must have 3 tab-separated columns\n\
             Got: {line}\n"
        );

        let (accession, build, chromosome) = (fields[0], fields[1], fields[2]);
        validate_accession(accession, line_num);

        assert!(
            BUILD_TAGS.contains(&build),
            "\n\nASSEMBLY MAP BUILD ERROR: Line {line_num} has unknown build '{build}'\n\
             Expected one of: {}\n",
            BUILD_TAGS.join(", ")
        );
        assert!(
            chromosome.starts_with("chr"),
            "\n\nASSEMBLY MAP BUILD ERROR: Line {line_num} chromosome '{chromosome}' must start with 'chr'\n"
        );
        assert!(
            seen.insert(accession.to_string()),
            "\n\nASSEMBLY MAP BUILD ERROR: Duplicate accession '{accession}' at line {line_num}\n"
        );
    }

    seen.len()
}

fn validate_accession(accession: &str, line_num: usize) {
    // NC_000010.11: prefix, 6+ digit number, version
    let valid = accession
        .strip_prefix("NC_")
        .and_then(|rest| rest.split_once('.'))
        .is_some_and(|(number, version)| {
            number.len() >= 6
                && number.chars().all(|c| c.is_ascii_digit())
                && !version.is_empty()
                && version.chars().all(|c| c.is_ascii_digit())
        });
    assert!(
        valid,
        "\n\nASSEMBLY MAP BUILD ERROR: Line {line_num} has malformed accession '{accession}'\n\
         Expected e.g. NC_000010.11\n"
    );
}

fn set_build_dependencies() {
    // Tell cargo to rerun if the assembly map changes
    println!("cargo:rerun-if-changed={ASSEMBLY_MAP}");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
