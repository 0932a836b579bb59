// vim: set ai et ts=4 sw=4 sts=4:
pub mod solver;

use std::fmt;
use std::ops::Range;
use std::collections::HashSet;

use super::util::Direction;

#[derive(PartialEq, Debug)]
pub enum GeometryError {
    DoesNotFit      { direction: Direction, index: usize, needed: usize, available: usize },
    ZeroLengthBlock { direction: Direction, index: usize },
}
impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GeometryError: {}", match self {
            GeometryError::DoesNotFit { direction, index, needed, available } =>
                format!("blocks of {} line {} need {} cells but only {} are available",
                    direction, index, needed, available),
            GeometryError::ZeroLengthBlock { direction, index } =>
                format!("{} line {} contains a block of length 0", direction, index),
        })
    }
}

// one block of a line's clue, with its position while stepping through
// placements; min_left_pos is fixed at construction time, max_right_pos of
// every block but the last follows its successor's current position
#[derive(Debug, Clone)]
pub struct Block {
    pub length:    usize,
    min_left_pos:  usize,
    max_right_pos: usize,
    cur_pos:       usize,
    has_succ:      bool,
    allowed:       HashSet<usize>, // cells this block's span may still occupy
}
impl Block {
    fn new(pos: usize, length: usize) -> Block {
        Block {
            length,
            min_left_pos:  pos,
            max_right_pos: pos,
            cur_pos:       pos,
            has_succ:      true,
            allowed:       HashSet::new(),
        }
    }

    fn span(&self) -> Range<usize> {
        self.cur_pos .. self.cur_pos + self.length
    }
    fn span_fits_at(&self, start: usize) -> bool {
        (start .. start + self.length).all(|cell| self.allowed.contains(&cell))
    }

    // move to the nearest start to the right whose entire span is still allowed;
    // this can skip any number of starts at once
    fn step_right(&mut self) -> bool {
        let mut candidate = self.cur_pos + 1;
        while candidate <= self.max_right_pos && !self.span_fits_at(candidate) {
            candidate += 1;
        }
        if candidate <= self.max_right_pos {
            self.cur_pos = candidate;
            return true;
        }
        false
    }
    fn reset_left(&mut self) {
        self.cur_pos = self.min_left_pos;
        if self.has_succ {
            self.max_right_pos = self.min_left_pos;
        }
    }
}

// enumerates every placement of a line's blocks, leftmost-packed first
#[derive(Debug, Clone)]
pub struct LineStepper {
    pub direction: Direction,
    pub index:     usize,
    pub num_cells: usize,
    blocks:        Vec<Block>,
}

impl LineStepper {
    pub fn new(direction: Direction,
               index: usize,
               lengths: &[usize],
               num_cells: usize,
               locked: &HashSet<usize>) -> Result<LineStepper, GeometryError>
    {
        if lengths.iter().any(|&length| length == 0) {
            return Err(GeometryError::ZeroLengthBlock { direction, index });
        }
        let needed = lengths.iter().sum::<usize>() + lengths.len().saturating_sub(1);
        if needed > num_cells {
            return Err(GeometryError::DoesNotFit { direction, index, needed, available: num_cells });
        }

        // lay the blocks out leftmost; only the last block is free to move initially,
        // every other one is pinned in place until its successor has stepped away
        let mut blocks = Vec::with_capacity(lengths.len());
        let mut pos = 0;
        for &length in lengths {
            blocks.push(Block::new(pos, length));
            pos += length + 1;
        }
        if let Some(last) = blocks.last_mut() {
            last.max_right_pos = num_cells - last.length;
            last.has_succ = false;
        }

        let mut stepper = LineStepper { direction, index, num_cells, blocks };
        stepper.assign_allowed_windows(locked);
        Ok(stepper)
    }

    fn assign_allowed_windows(&mut self, locked: &HashSet<usize>) {
        // each block may occupy any cell between its leftmost-packed start and
        // the end of its rightmost-packed span, minus the locked cells
        let total: usize = self.blocks.iter().map(|b| b.length + 1).sum();
        let mut window_min = 0;
        let mut window_max = self.num_cells + 1 - total;
        for block in self.blocks.iter_mut() {
            block.allowed = (window_min .. window_max + block.length)
                                .filter(|cell| !locked.contains(cell))
                                .collect();
            window_min += block.length + 1;
            window_max += block.length + 1;
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn filled_cells(&self) -> HashSet<usize> {
        self.blocks.iter()
                   .flat_map(|block| block.span())
                   .collect()
    }

    // the enumeration after a reset is identical to the one after construction
    pub fn reset_to_leftmost(&mut self) {
        for block in self.blocks.iter_mut() {
            block.reset_left();
        }
    }

    // the lowest block that can still move steps right; every block before it
    // packs back to the left with its play rederived from its successor;
    // false once exhausted
    pub fn advance(&mut self) -> bool {
        for i in 0..self.blocks.len() {
            if self.blocks[i].step_right() {
                for j in 0..i {
                    self.blocks[j].reset_left();
                }
                for j in 0..i {
                    let succ_pos = self.blocks[j + 1].cur_pos;
                    let length   = self.blocks[j].length;
                    self.blocks[j].max_right_pos = succ_pos - length - 1;
                }
                return true;
            }
        }
        false
    }

    // allowed sets only ever shrink; geometry is never re-derived
    pub fn remove_allowed(&mut self, cells: &HashSet<usize>) {
        for block in self.blocks.iter_mut() {
            for cell in cells {
                block.allowed.remove(cell);
            }
        }
    }

    // C(q + k - 1, k) over k blocks with q = num_cells - k + 2 - total filled;
    // estimation and reporting only
    pub fn permutation_count(&self) -> u128 {
        let k = self.blocks.len();
        let filled: usize = self.blocks.iter().map(|b| b.length).sum();
        let q = self.num_cells + 2 - k - filled;
        if q <= 1 {
            return 1;
        }
        binomial((q + k - 1) as u128, k as u128)
    }

    // per-block overlap of the leftmost-packed and rightmost-packed layouts,
    // i.e. the cells forced filled by geometry alone
    pub fn overlap_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut tail = 0; // cells claimed by the blocks after the current one
        for block in self.blocks.iter().rev() {
            let max_start = self.num_cells - tail - block.length;
            let min_end   = block.min_left_pos + block.length;
            if max_start < min_end {
                ranges.push(max_start .. min_end);
            }
            tail += block.length + 1;
        }
        ranges.reverse();
        ranges
    }
}

fn binomial(n: u128, k: u128) -> u128 {
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 1..=k {
        result = match result.checked_mul(n - k + i) {
            Some(x) => x / i,
            None    => return u128::MAX, // close enough to "a lot"
        };
    }
    result
}
