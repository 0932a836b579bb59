// vim: set ai et ts=4 sts=4:
use std::fmt;
use std::convert::From;
use std::rc::{Rc};
use std::cell::{RefCell};
use super::line::GeometryError;

pub trait HasGridLocation {
    fn get_row(&self) -> usize;
    fn get_col(&self) -> usize;
    fn fmt_location(&self) -> String {
        format!("(col={:-2}, row={:-2})", self.get_col(), self.get_row())
    }
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum SquareStatus {
    FilledIn,
    CrossedOut,
    Unknown,
}
impl fmt::Display for SquareStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match *self {
            SquareStatus::FilledIn   => "FilledIn",
            SquareStatus::CrossedOut => "CrossedOut",
            SquareStatus::Unknown    => "Unknown",
        })
    }
}

// ------------------------------------------------

#[derive(PartialEq, Debug, Clone)]
pub struct StatusChange {
    pub row: usize,
    pub col: usize,
    pub old: SquareStatus,
    pub new: SquareStatus,
}
impl StatusChange {
    pub fn new(row: usize, col: usize, old: SquareStatus, new: SquareStatus) -> Self {
        Self { row, col, old, new }
    }
}
impl HasGridLocation for StatusChange {
    fn get_row(&self) -> usize { self.row }
    fn get_col(&self) -> usize { self.col }
}
impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Change: in square {}, status was changed from {} to {}",
            self.fmt_location(),
            self.old,
            self.new)
    }
}
pub type Changes = Vec<StatusChange>;

// ------------------------------------------------

#[derive(PartialEq, Debug)]
pub enum StatusError {
    ChangeRejected(StatusChange, String),  // new status conflicts with existing (non-unknown) status
}
impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StatusError: {}", match self {
            StatusError::ChangeRejected(change, msg) =>
                format!("In {}, attempt to change status from {} to {} was rejected: {}",
                    change.fmt_location(), change.old, change.new, msg),
        })
    }
}

pub type StatusResult = Result<Option<StatusChange>, StatusError>; // if it worked: the change, if any; if it didn't, the change that was rejected

#[derive(PartialEq, Debug)]
pub enum Error {
    Status(StatusError),
    Geometry(GeometryError),
}
impl From<StatusError> for Error {
    fn from(other: StatusError) -> Self {
        Error::Status(other)
    }
}
impl From<GeometryError> for Error {
    fn from(other: GeometryError) -> Self {
        Error::Geometry(other)
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Error::Status(x)   => x.to_string(),
            Error::Geometry(x) => x.to_string(),
        })
    }
}

// ------------------------------------------------

#[derive(Debug, Clone)]
pub struct Square {
    row: usize,
    col: usize,
    status: SquareStatus,
}
impl Square {
    pub fn new(x: usize, y: usize) -> Square {
        Square {
            row: y,
            col: x,
            status: SquareStatus::Unknown,
        }
    }

    pub fn get_status(&self) -> SquareStatus { self.status }

    pub fn set_status(&mut self, new_status: SquareStatus) -> StatusResult {
        let cand_change = StatusChange::new(self.row, self.col, self.status, new_status);
        self.apply_status_change(cand_change)
    }

    pub fn apply_status_change(&mut self, cand_change: StatusChange)
        -> StatusResult
    {
        assert!(cand_change.row == self.row);
        assert!(cand_change.col == self.col);

        // if this square's status is already known, it can't be changed anymore,
        // that would be a conflict
        if self.status != SquareStatus::Unknown {
            if self.status != cand_change.new {
                return Err(StatusError::ChangeRejected(cand_change, "conflicting information".to_string()));
            }
        }
        if self.status != cand_change.new {
            self.status = cand_change.new;
            return Ok(Some(cand_change));
        }
        return Ok(None);
    }

    pub fn fmt_visual(&self) -> &str {
        match self.status {
            SquareStatus::CrossedOut => " ",
            SquareStatus::FilledIn   => "\u{25A0}",
            SquareStatus::Unknown    => ".",
        }
    }
}
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.fmt_visual())
    }
}
// ------------------------------------------------

#[derive(Clone)]
pub struct Grid {
    pub squares: Vec<Vec<Square>>,
}
impl Grid {
    pub fn new(width: usize, height: usize)
        -> Self
    {
        Grid {
            squares: (0..height).map(|y| (0..width).map(|x| Square::new(x, y))
                                                   .collect::<Vec<_>>())
                                .collect(),
        }
    }
    pub fn new_shared(width: usize, height: usize) -> Rc<RefCell<Grid>> {
        Rc::new(RefCell::new(Grid::new(width, height)))
    }

    pub fn width(&self) -> usize { self.squares[0].len() }
    pub fn height(&self) -> usize { self.squares.len() }
    pub fn get_square(&self, x: usize, y: usize) -> &Square {
        &self.squares[y][x]
    }
    pub fn get_square_mut(&mut self, x: usize, y: usize) -> &mut Square {
        &mut self.squares[y][x]
    }

    pub fn known_count(&self) -> usize {
        self.squares.iter()
                    .map(|row| row.iter().filter(|sq| sq.get_status() != SquareStatus::Unknown).count())
                    .sum()
    }
    pub fn is_complete(&self) -> bool {
        self.known_count() == self.width() * self.height()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid(w={}, h={})", self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::SquareStatus::*;

    #[test]
    fn set_status_reports_the_change_once() {
        let mut square = Square::new(2, 1);
        let change = square.set_status(FilledIn).unwrap();
        assert_eq!(change, Some(StatusChange::new(1, 2, Unknown, FilledIn)));
        // same status again is a no-op, not a change
        assert_eq!(square.set_status(FilledIn).unwrap(), None);
    }

    #[test]
    fn known_statuses_cannot_be_overwritten_or_retracted() {
        let mut square = Square::new(0, 0);
        square.set_status(CrossedOut).unwrap();
        assert!(square.set_status(FilledIn).is_err());
        assert!(square.set_status(Unknown).is_err());
        assert_eq!(square.get_status(), CrossedOut);
    }

    #[test]
    fn grid_counts_known_squares() {
        let grid = Grid::new_shared(3, 2);
        assert_eq!(grid.borrow().known_count(), 0);
        grid.borrow_mut().get_square_mut(0, 0).set_status(FilledIn).unwrap();
        grid.borrow_mut().get_square_mut(2, 1).set_status(CrossedOut).unwrap();
        assert_eq!(grid.borrow().known_count(), 2);
        assert!(!grid.borrow().is_complete());

        for (x, y) in vec![(1, 0), (2, 0), (0, 1), (1, 1)] {
            grid.borrow_mut().get_square_mut(x, y).set_status(CrossedOut).unwrap();
        }
        assert_eq!(grid.borrow().known_count(), 6);
        assert!(grid.borrow().is_complete());
    }
}
