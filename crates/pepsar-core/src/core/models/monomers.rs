use phf::phf_map;

/// The gap pseudo-monomer: an empty string marks "no monomer at this position".
pub const GAP: &str = "";

/// One-letter codes of the twenty standard amino acids.
pub static STANDARD_AMINO_ACIDS: phf::Map<&'static str, &'static str> = phf_map! {
    "A" => "Alanine",
    "R" => "Arginine",
    "N" => "Asparagine",
    "D" => "Aspartic Acid",
    "C" => "Cysteine",
    "E" => "Glutamic Acid",
    "Q" => "Glutamine",
    "G" => "Glycine",
    "H" => "Histidine",
    "I" => "Isoleucine",
    "L" => "Leucine",
    "K" => "Lysine",
    "M" => "Methionine",
    "F" => "Phenylalanine",
    "P" => "Proline",
    "S" => "Serine",
    "T" => "Threonine",
    "W" => "Tryptophan",
    "Y" => "Tyrosine",
    "V" => "Valine",
};

/// Whether `monomer` is one of the twenty standard one-letter amino acids.
///
/// Gaps and multi-character (e.g. HELM) monomers are not standard; datasets
/// carrying them still analyze normally, this only drives diagnostics.
pub fn is_standard(monomer: &str) -> bool {
    STANDARD_AMINO_ACIDS.contains_key(monomer)
}

pub fn full_name(monomer: &str) -> Option<&'static str> {
    STANDARD_AMINO_ACIDS.get(monomer).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_has_twenty_entries() {
        assert_eq!(STANDARD_AMINO_ACIDS.len(), 20);
    }

    #[test]
    fn standard_codes_resolve() {
        assert!(is_standard("A"));
        assert!(is_standard("W"));
        assert_eq!(full_name("K"), Some("Lysine"));
    }

    #[test]
    fn gaps_and_helm_monomers_are_not_standard() {
        assert!(!is_standard(GAP));
        assert!(!is_standard("meI"));
        assert!(!is_standard("a"));
    }
}
