use crate::domain::{CalculationType, ParsedDocument, StructuralCounts};

/// Classifies a document by its block structure. First match wins: several
/// partitions or any overlap means transfer, a single partition with
/// couplings means inelastic, anything else is elastic.
pub fn detect_calculation_type(counts: &StructuralCounts) -> CalculationType {
    if counts.partition > 1 || counts.overlap > 0 {
        CalculationType::Transfer
    } else if counts.partition == 1 && counts.coupling > 0 {
        CalculationType::Inelastic
    } else {
        CalculationType::Elastic
    }
}

pub fn detect_document_type(document: &ParsedDocument) -> CalculationType {
    detect_calculation_type(&document.counts)
}

#[cfg(test)]
mod tests {
    use super::detect_calculation_type;
    use crate::domain::{CalculationType, StructuralCounts};

    fn counts(partition: usize, coupling: usize, overlap: usize) -> StructuralCounts {
        StructuralCounts {
            partition,
            coupling,
            overlap,
            ..StructuralCounts::default()
        }
    }

    #[test]
    fn detection_rules_apply_in_priority_order() {
        let cases = [
            (counts(1, 0, 0), CalculationType::Elastic),
            (counts(1, 1, 0), CalculationType::Inelastic),
            (counts(2, 0, 1), CalculationType::Transfer),
            (counts(2, 0, 0), CalculationType::Transfer),
            (counts(1, 2, 1), CalculationType::Transfer),
            (counts(0, 1, 0), CalculationType::Elastic),
            (counts(0, 0, 0), CalculationType::Elastic),
        ];

        for (input, expected) in cases {
            assert_eq!(detect_calculation_type(&input), expected, "{input:?}");
        }
    }

    #[test]
    fn terminators_do_not_influence_detection() {
        let mut input = counts(1, 0, 0);
        input.terminators = 4;
        assert_eq!(detect_calculation_type(&input), CalculationType::Elastic);
    }
}
