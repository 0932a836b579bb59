// vim: set ai et ts=4 sts=4 sw=4:
use std::collections::HashSet;
use super::LineStepper;

// the already-known squares of one line, as line-local cell indices
#[derive(Debug, Default, Clone)]
pub struct LineEvidence {
    pub filled:  HashSet<usize>,
    pub crossed: HashSet<usize>,
}
impl LineEvidence {
    pub fn new() -> Self {
        LineEvidence { filled: HashSet::new(), crossed: HashSet::new() }
    }
    pub fn is_empty(&self) -> bool {
        self.filled.is_empty() && self.crossed.is_empty()
    }
}

// cells filled in every evidence-consistent placement, and cells filled in
// none of them; both may repeat cells already known, so callers subtract the
// evidence before writing
#[derive(Debug, PartialEq)]
pub struct LineDeduction {
    pub filled:  HashSet<usize>,
    pub crossed: HashSet<usize>,
}

impl LineStepper {
    fn consistent_with(filled: &HashSet<usize>, evidence: &LineEvidence) -> bool {
        evidence.filled.iter().all(|cell| filled.contains(cell))
            && evidence.crossed.iter().all(|cell| !filled.contains(cell))
    }

    // None means not a single placement agrees with the evidence; the line's
    // known squares are contradictory and nothing may be derived from them
    pub fn deduce(&mut self, evidence: &LineEvidence) -> Option<LineDeduction> {
        let mut common_filled:  HashSet<usize> = (0..self.num_cells).collect();
        let mut common_crossed: HashSet<usize> = (0..self.num_cells).collect();
        let mut matched = 0usize;

        self.reset_to_leftmost();
        let mut more = true;
        while more {
            let filled = self.filled_cells();
            if Self::consistent_with(&filled, evidence) {
                common_filled.retain(|cell| filled.contains(cell));
                common_crossed.retain(|cell| !filled.contains(cell));
                matched += 1;
            }
            more = self.advance();
        }

        if matched == 0 {
            return None;
        }
        Some(LineDeduction { filled: common_filled, crossed: common_crossed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::super::util::Direction::*;

    fn stepper(lengths: &[usize], num_cells: usize) -> LineStepper {
        LineStepper::new(Horizontal, 0, lengths, num_cells, &HashSet::new()).unwrap()
    }

    fn set(cells: &[usize]) -> HashSet<usize> {
        cells.iter().cloned().collect()
    }

    #[test]
    fn full_line_is_forced_without_any_evidence() {
        let deduction = stepper(&[5], 5).deduce(&LineEvidence::new()).unwrap();
        assert_eq!(deduction.filled, set(&[0, 1, 2, 3, 4]));
        assert_eq!(deduction.crossed, set(&[]));
    }

    #[test]
    fn placements_agree_on_the_overlap_cell_only() {
        // [2,1] in 5 cells: (0,3), (0,4) and (1,4) only ever agree on cell 1
        let deduction = stepper(&[2, 1], 5).deduce(&LineEvidence::new()).unwrap();
        assert_eq!(deduction.filled, set(&[1]));
        assert_eq!(deduction.crossed, set(&[]));
    }

    #[test]
    fn filled_evidence_pins_the_matching_placement() {
        // [1,1] in 4 cells has (0,2), (0,3), (1,3); a filled cell 1 leaves (1,3)
        let mut evidence = LineEvidence::new();
        evidence.filled.insert(1);
        let deduction = stepper(&[1, 1], 4).deduce(&evidence).unwrap();
        assert_eq!(deduction.filled, set(&[1, 3]));
        assert_eq!(deduction.crossed, set(&[0, 2]));
    }

    #[test]
    fn crossed_evidence_discards_covering_placements() {
        let mut evidence = LineEvidence::new();
        evidence.crossed.insert(0);
        let mut s = stepper(&[2, 1], 5);
        s.remove_allowed(&evidence.crossed);
        // only (1,4) survives; the leftmost reset placements cover cell 0
        // and are discarded by the consistency filter
        let deduction = s.deduce(&evidence).unwrap();
        assert_eq!(deduction.filled, set(&[1, 2, 4]));
        assert_eq!(deduction.crossed, set(&[0, 3]));
    }

    #[test]
    fn zero_consistent_placements_is_a_contradiction() {
        // a single [1] cannot fill two cells at once
        let mut evidence = LineEvidence::new();
        evidence.filled.insert(0);
        evidence.filled.insert(2);
        assert_eq!(stepper(&[1], 3).deduce(&evidence), None);
    }

    #[test]
    fn zero_blocks_force_every_cell_empty() {
        let deduction = stepper(&[], 4).deduce(&LineEvidence::new()).unwrap();
        assert_eq!(deduction.filled, set(&[]));
        assert_eq!(deduction.crossed, set(&[0, 1, 2, 3]));

        // but a filled square on such a line contradicts it
        let mut evidence = LineEvidence::new();
        evidence.filled.insert(2);
        assert_eq!(stepper(&[], 4).deduce(&evidence), None);
    }

    #[test]
    fn deduction_repeats_after_a_reset() {
        let mut s = stepper(&[2, 1], 5);
        let first  = s.deduce(&LineEvidence::new()).unwrap();
        let second = s.deduce(&LineEvidence::new()).unwrap();
        assert_eq!(first, second);
    }
}
