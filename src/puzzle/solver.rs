// vim: set ai et ts=4 sts=4 sw=4:
use std::fmt;
use std::time::Instant;
use log::{debug, info, trace, warn};

use super::{Puzzle, Line, DirectionalSequence};
use super::super::grid::{Changes, Error, SquareStatus};
use super::super::line::LineStepper;
use super::super::util::{human_duration, Direction, Direction::*};

// passes alternate between rows and columns until a full alternation
// derives nothing new
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum SolveState {
    Init,
    ObviousPass,
    RowPass,
    ColPass,
    Solved,
    Stalled,
}
impl fmt::Display for SolveState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            SolveState::Init        => "init",
            SolveState::ObviousPass => "obvious-fields pass",
            SolveState::RowPass     => "row pass",
            SolveState::ColPass     => "column pass",
            SolveState::Solved      => "solved",
            SolveState::Stalled     => "stalled",
        })
    }
}

// what a single pass derived; contradictions lists the lines whose known
// squares admitted no placement at all
#[derive(Debug)]
pub struct PassReport {
    pub pass:           SolveState,
    pub changes:        Changes,
    pub contradictions: Vec<(Direction, usize)>,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Outcome {
    pub state:          SolveState,
    pub known:          usize,
    pub total:          usize,
    pub contradictions: Vec<(Direction, usize)>,
}
impl Outcome {
    pub fn fully_solved(&self) -> bool {
        // a grid completed in spite of a contradiction is not a solution
        self.state == SolveState::Solved && self.contradictions.is_empty()
    }
}

#[derive(Debug)]
pub struct Solver {
    pub puzzle:     Puzzle,
    pub iterations: usize,
    row_steppers:   Vec<LineStepper>,
    col_steppers:   Vec<LineStepper>,
    state:          SolveState,
    before_rows:    usize,
    contradictions: Vec<(Direction, usize)>,
}

impl Solver {
    pub fn new(puzzle: Puzzle) -> Result<Solver, Error> {
        let row_steppers = puzzle.rows.iter()
                                      .map(|line| line.stepper())
                                      .collect::<Result<Vec<_>, _>>()?;
        let col_steppers = puzzle.cols.iter()
                                      .map(|line| line.stepper())
                                      .collect::<Result<Vec<_>, _>>()?;

        for stepper in row_steppers.iter().chain(col_steppers.iter()) {
            trace!("{} line {} admits {} placements",
                   stepper.direction, stepper.index, stepper.permutation_count());
        }
        let row_perms = Self::placement_product(row_steppers.iter().map(|s| s.permutation_count()));
        let col_perms = Self::placement_product(col_steppers.iter().map(|s| s.permutation_count()));
        debug!("{}x{} puzzle admits {} row placement combinations, {} column ones",
               puzzle.width(), puzzle.height(), row_perms, col_perms);

        Ok(Solver {
            puzzle:         puzzle,
            iterations:     0,
            row_steppers:   row_steppers,
            col_steppers:   col_steppers,
            state:          SolveState::Init,
            before_rows:    0,
            contradictions: Vec::new(),
        })
    }

    fn placement_product(counts: impl Iterator<Item = u128>) -> u128 {
        counts.fold(1u128, |acc, count| acc.saturating_mul(count))
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    pub fn outcome(&self) -> Outcome {
        Outcome {
            state:          self.state,
            known:          self.puzzle.known_count(),
            total:          self.puzzle.cell_count(),
            contradictions: self.contradictions.clone(),
        }
    }

    pub fn solve(&mut self) -> Result<Outcome, Error> {
        let started = Instant::now();
        while let Some(step) = self.next() {
            step?;
        }
        let outcome = self.outcome();
        info!("{} after {} passes in {}: {}/{} squares known",
              outcome.state, self.iterations, human_duration(started.elapsed()),
              outcome.known, outcome.total);
        Ok(outcome)
    }

    fn mark_square(line: &Line, at: usize, status: SquareStatus,
                   changes: &mut Changes, rejected: &mut bool)
    {
        match line.get_square_mut(at).set_status(status) {
            Ok(Some(change)) => {
                debug!("{}", change);
                changes.push(change);
            },
            Ok(None) => { },
            Err(err) => {
                // a seeded square disagrees with forced geometry; keep the
                // seed untouched and report the line instead
                warn!("{}", err);
                *rejected = true;
            },
        }
    }

    // geometry only: fill each line's leftmost/rightmost overlap, and empty
    // out lines without any blocks
    fn obvious_pass(&self) -> (Changes, Vec<(Direction, usize)>) {
        let mut changes = Changes::new();
        let mut contradicted = Vec::new();
        let line_steppers = self.puzzle.rows.iter().zip(self.row_steppers.iter())
                                .chain(self.puzzle.cols.iter().zip(self.col_steppers.iter()));
        for (line, stepper) in line_steppers {
            let mut rejected = false;
            if line.clues.is_empty() {
                for at in 0..line.length {
                    Self::mark_square(line, at, SquareStatus::CrossedOut, &mut changes, &mut rejected);
                }
            } else {
                for range in stepper.overlap_ranges() {
                    for at in range {
                        Self::mark_square(line, at, SquareStatus::FilledIn, &mut changes, &mut rejected);
                    }
                }
            }
            if rejected {
                contradicted.push((line.direction, line.index));
            }
        }
        (changes, contradicted)
    }

    fn line_pass(&mut self, direction: Direction) -> Result<(Changes, Vec<(Direction, usize)>), Error> {
        let mut changes = Changes::new();
        let mut contradicted = Vec::new();

        let (lines, steppers) = match direction {
            Horizontal => (&self.puzzle.rows, &mut self.row_steppers),
            Vertical   => (&self.puzzle.cols, &mut self.col_steppers),
        };
        for (line, stepper) in lines.iter().zip(steppers.iter_mut()) {
            let evidence = line.evidence();
            if evidence.is_empty() && stepper.block_count() > 0 {
                // nothing is known about this line yet; beyond the obvious
                // overlaps, which are already placed, there is nothing to derive
                continue;
            }
            stepper.remove_allowed(&evidence.crossed);

            match stepper.deduce(&evidence) {
                None => {
                    warn!("{} line {}: no placement is consistent with its known squares",
                          line.direction, line.index);
                    contradicted.push((line.direction, line.index));
                },
                Some(deduction) => {
                    let mut new_filled: Vec<usize> = deduction.filled
                                                             .difference(&evidence.filled)
                                                             .cloned().collect();
                    let mut new_crossed: Vec<usize> = deduction.crossed
                                                              .difference(&evidence.crossed)
                                                              .cloned().collect();
                    new_filled.sort();
                    new_crossed.sort();
                    for at in new_filled {
                        if let Some(change) = line.get_square_mut(at).set_status(SquareStatus::FilledIn)? {
                            debug!("{}", change);
                            changes.push(change);
                        }
                    }
                    for at in new_crossed {
                        if let Some(change) = line.get_square_mut(at).set_status(SquareStatus::CrossedOut)? {
                            debug!("{}", change);
                            changes.push(change);
                        }
                    }
                },
            }
        }
        Ok((changes, contradicted))
    }
}

impl Iterator for Solver {
    type Item = Result<PassReport, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let (pass, result) = match self.state {
            SolveState::Solved | SolveState::Stalled => return None,
            SolveState::Init => {
                (SolveState::ObviousPass, Ok(self.obvious_pass()))
            },
            SolveState::ObviousPass | SolveState::ColPass => {
                self.before_rows = self.puzzle.known_count();
                (SolveState::RowPass, self.line_pass(Horizontal))
            },
            SolveState::RowPass => {
                (SolveState::ColPass, self.line_pass(Vertical))
            },
        };
        let (changes, contradicted) = match result {
            Ok(x) => x,
            Err(err) => {
                // no way to make progress from here on
                self.state = SolveState::Stalled;
                return Some(Err(err));
            },
        };

        self.iterations += 1;
        for entry in &contradicted {
            if !self.contradictions.contains(entry) {
                self.contradictions.push(*entry);
            }
        }

        let known = self.puzzle.known_count();
        self.state = if self.puzzle.is_complete() {
            SolveState::Solved
        } else if pass == SolveState::ColPass && known == self.before_rows {
            // a full row+column alternation brought nothing new
            SolveState::Stalled
        } else {
            pass
        };
        info!("{}: {} newly known squares, {}/{} total",
              pass, changes.len(), known, self.puzzle.cell_count());

        Some(Ok(PassReport { pass: pass, changes: changes, contradictions: contradicted }))
    }
}
