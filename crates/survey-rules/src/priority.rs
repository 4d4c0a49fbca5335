//! Variant selection.
//!
//! Among a block's applicable variants exactly one wins, by a strict cascade:
//! tier (mandatory, recommended, reference), then normative document class,
//! then declaration order. Quantities are never consulted.

use survey_types::Tier;

use crate::block::InstructionVariant;

/// Pick the governing variant and its tier. Returns `None` for an empty slice.
///
/// `applicable` must be in declaration order; it is the final tiebreak.
pub fn select_best_variant<'a>(
    applicable: &[&'a InstructionVariant],
) -> Option<(&'a InstructionVariant, Tier)> {
    if let [only] = applicable {
        return Some((*only, only.tier));
    }

    applicable
        .iter()
        .copied()
        .enumerate()
        .min_by(|(ia, a), (ib, b)| {
            a.tier
                .cmp(&b.tier)
                .then(a.normative.class.cmp(&b.normative.class))
                .then(ia.cmp(ib))
        })
        .map(|(_, v)| (v, v.tier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_types::{DocumentClass, Normative};

    fn v(id: &str, tier: Tier, doc: &str) -> InstructionVariant {
        InstructionVariant::new(id, tier, Normative::new(doc, ""))
    }

    #[test]
    fn empty_yields_none() {
        assert!(select_best_variant(&[]).is_none());
    }

    #[test]
    fn single_variant_selected_unconditionally() {
        let only = v("ref", Tier::Reference, "ВСН 1-2");
        let (chosen, tier) = select_best_variant(&[&only]).unwrap();
        assert_eq!(chosen.id, "ref");
        assert_eq!(tier, Tier::Reference);
    }

    #[test]
    fn mandatory_beats_recommended_regardless_of_order() {
        let m = v("m", Tier::Mandatory, "ГОСТ 12071-2014");
        let r = v("r", Tier::Recommended, "СП 47.13330.2016");
        for list in [vec![&m, &r], vec![&r, &m]] {
            let (chosen, tier) = select_best_variant(&list).unwrap();
            assert_eq!(chosen.id, "m");
            assert_eq!(tier, Tier::Mandatory);
        }
    }

    #[test]
    fn recommended_beats_reference() {
        let r = v("r", Tier::Recommended, "ВСН 1-2");
        let x = v("x", Tier::Reference, "СП 47.13330.2016");
        let (chosen, _) = select_best_variant(&[&x, &r]).unwrap();
        assert_eq!(chosen.id, "r");
    }

    #[test]
    fn document_class_breaks_tier_ties_in_either_order() {
        let sp = v("sp", Tier::Mandatory, "СП 11-105-97");
        let gost = v("gost", Tier::Mandatory, "ГОСТ 25100-2020");
        assert_eq!(sp.normative.class, DocumentClass::Rules);
        assert_eq!(gost.normative.class, DocumentClass::NationalStandard);
        for list in [vec![&sp, &gost], vec![&gost, &sp]] {
            let (chosen, _) = select_best_variant(&list).unwrap();
            assert_eq!(chosen.id, "sp");
        }
    }

    #[test]
    fn full_tie_goes_to_first_declared() {
        let a = v("a", Tier::Recommended, "СП 22.13330.2016");
        let b = v("b", Tier::Recommended, "СП 47.13330.2016");
        assert_eq!(select_best_variant(&[&a, &b]).unwrap().0.id, "a");
        assert_eq!(select_best_variant(&[&b, &a]).unwrap().0.id, "b");
    }
}
