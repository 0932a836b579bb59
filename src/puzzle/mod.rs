// vim: set ai et ts=4 sw=4 sts=4:
pub mod solver;

use std::fmt;
use std::rc::Rc;
use std::cell::{Ref, RefMut, RefCell};
use std::convert::TryFrom;
use yaml_rust::Yaml;
use ansi_term::{Colour, Style, ANSIString};

use super::grid::{Grid, Square, SquareStatus};
use super::util::{ralign, ralign_joined_coloreds, lalign_colored, Direction, Direction::*};
use super::line::{LineStepper, GeometryError};
use super::line::solver::LineEvidence;

pub trait DirectionalSequence
{
    fn get_row_index(&self) -> usize;
    fn get_direction(&self) -> Direction;
    fn get_grid(&self) -> &Rc<RefCell<Grid>>;

    fn square_index(&self, at: usize) -> (usize, usize) {
        match self.get_direction() {
            Horizontal => (at, self.get_row_index()),
            Vertical   => (self.get_row_index(), at),
        }
    }
    fn get_square(&self, index: usize) -> Ref<Square> {
        let grid = self.get_grid().borrow();
        let (x,y) = self.square_index(index);
        Ref::map(grid, |g| g.get_square(x, y))
    }
    fn get_square_mut(&self, index: usize) -> RefMut<Square> {
        let grid = self.get_grid().borrow_mut();
        let (x,y) = self.square_index(index);
        RefMut::map(grid, |g| g.get_square_mut(x, y))
    }
}

// one row or column: clue lengths plus a view onto the shared grid; the
// solving state for a line lives in its per-session LineStepper
#[derive(Debug)]
pub struct Line {
    pub direction: Direction,
    pub index:     usize,
    pub length:    usize,
    pub clues:     Vec<usize>,
    pub grid:      Rc<RefCell<Grid>>,
}

impl Line {
    pub fn new(grid: &Rc<RefCell<Grid>>,
               direction: Direction,
               index: usize,
               clues: &Vec<usize>) -> Self
    {
        let length = match direction {
            Horizontal => grid.borrow().width(),
            Vertical   => grid.borrow().height(),
        };
        Line {
            direction: direction,
            index:     index,
            length:    length,
            clues:     clues.clone(),
            grid:      Rc::clone(grid),
        }
    }

    pub fn stepper(&self) -> Result<LineStepper, GeometryError> {
        // squares already crossed out are locked from the start
        let locked = self.evidence().crossed;
        LineStepper::new(self.direction, self.index, &self.clues, self.length, &locked)
    }

    pub fn evidence(&self) -> LineEvidence {
        let mut evidence = LineEvidence::new();
        for at in 0..self.length {
            match self.get_square(at).get_status() {
                SquareStatus::FilledIn   => { evidence.filled.insert(at); },
                SquareStatus::CrossedOut => { evidence.crossed.insert(at); },
                SquareStatus::Unknown    => { },
            }
        }
        evidence
    }

    pub fn is_fully_known(&self) -> bool {
        (0..self.length).all(|at| self.get_square(at).get_status() != SquareStatus::Unknown)
    }

    pub fn clue_strings(&self) -> Vec<ANSIString> {
        let style = match self.is_fully_known() {
            true  => Style::new().fg(Colour::Fixed(241)),
            false => Style::default(),
        };
        self.clues.iter()
                  .map(|length| style.paint(length.to_string()))
                  .collect()
    }
}
impl DirectionalSequence for Line {
    fn get_row_index(&self) -> usize { self.index }
    fn get_direction(&self) -> Direction { self.direction }
    fn get_grid(&self)      -> &Rc<RefCell<Grid>> { &self.grid }
}

// ------------------------------------------------

#[derive(PartialEq, Debug)]
pub enum ParseError {
    MissingSection(&'static str),
    UnexpectedValue(String),
    PresetError(String),
}
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ParseError: {}", match self {
            ParseError::MissingSection(section) =>
                format!("section '{}' is missing or not a list", section),
            ParseError::UnexpectedValue(msg) => msg.clone(),
            ParseError::PresetError(msg)     => format!("bad presets: {}", msg),
        })
    }
}

// ------------------------------------------------

#[derive(Debug)]
pub struct Puzzle {
    pub rows: Vec<Line>,
    pub cols: Vec<Line>,
    pub grid: Rc<RefCell<Grid>>,
}

impl Puzzle {
    pub fn new(grid: &Rc<RefCell<Grid>>,
               row_clues: &Vec<Vec<usize>>,
               col_clues: &Vec<Vec<usize>>) -> Self
    {
        let rows = (0..grid.borrow().height()).map(|y| Line::new(grid, Horizontal, y, &row_clues[y]))
                                              .collect::<Vec<_>>();
        let cols = (0..grid.borrow().width()).map(|x| Line::new(grid, Vertical, x, &col_clues[x]))
                                             .collect::<Vec<_>>();
        Puzzle {
            rows: rows,
            cols: cols,
            grid: Rc::clone(grid),
        }
    }
    pub fn from_clues(row_clues: &Vec<Vec<usize>>,
                      col_clues: &Vec<Vec<usize>>) -> Self
    {
        let grid = Grid::new_shared(col_clues.len(), row_clues.len());
        Puzzle::new(&grid, row_clues, col_clues)
    }

    pub fn width(&self) -> usize  { self.grid.borrow().width() }
    pub fn height(&self) -> usize { self.grid.borrow().height() }
    pub fn cell_count(&self) -> usize { self.width() * self.height() }
    pub fn known_count(&self) -> usize { self.grid.borrow().known_count() }
    pub fn is_complete(&self) -> bool { self.grid.borrow().is_complete() }

    pub fn from_yaml(doc: &Yaml) -> Result<Puzzle, ParseError>
    {
        let row_clues = Self::parse_clue_lists(&doc["rows"], "rows")?;
        let col_clues = Self::parse_clue_lists(&doc["cols"], "cols")?;
        if row_clues.is_empty() || col_clues.is_empty() {
            return Err(ParseError::UnexpectedValue(
                "a puzzle needs at least one row and one column".to_string()));
        }
        let puzzle = Puzzle::from_clues(&row_clues, &col_clues);
        if !doc["presets"].is_badvalue() {
            puzzle.apply_presets(&doc["presets"])?;
        }
        Ok(puzzle)
    }

    fn parse_clue_lists(input: &Yaml, section: &'static str) -> Result<Vec<Vec<usize>>, ParseError> {
        let list: &Vec<Yaml> = match input.as_vec() {
            Some(list) => list,
            None       => return Err(ParseError::MissingSection(section)),
        };
        list.iter()
            .map(|yaml_val| Self::parse_clues(yaml_val))
            .collect()
    }

    fn parse_clues(input: &Yaml) -> Result<Vec<usize>, ParseError> {
        match input {
            Yaml::String(s)  => s.split_whitespace()
                                 .map(|part| part.trim().parse::<usize>().map_err(|_|
                                          ParseError::UnexpectedValue(format!("not a block length: '{}'", part))))
                                 .collect(),
            Yaml::Integer(i) => match usize::try_from(*i) {
                                    Ok(length) => Ok(vec![length]),
                                    Err(_)     => Err(ParseError::UnexpectedValue(
                                                      format!("negative block length: {}", i))),
                                },
            Yaml::Null       => Ok(vec![]),
            _ => Err(ParseError::UnexpectedValue(format!("unexpected clue entry: {:?}", input))),
        }
    }

    // user-placed marks carried in the puzzle file; '#' filled, 'x' crossed out,
    // '.' (or '_' or ' ') unknown
    fn apply_presets(&self, input: &Yaml) -> Result<(), ParseError> {
        let lines = match input.as_vec() {
            Some(lines) => lines,
            None        => return Err(ParseError::PresetError("expected a list of strings".to_string())),
        };
        if lines.len() != self.height() {
            return Err(ParseError::PresetError(
                format!("{} preset lines for {} rows", lines.len(), self.height())));
        }
        for (y, line) in lines.iter().enumerate() {
            let line: &str = match line.as_str() {
                Some(line) => line,
                None       => return Err(ParseError::PresetError(format!("line {} is not a string", y))),
            };
            if line.chars().count() != self.width() {
                return Err(ParseError::PresetError(
                    format!("line {} covers {} squares, the puzzle is {} wide",
                            y, line.chars().count(), self.width())));
            }
            for (x, mark) in line.chars().enumerate() {
                let status = match mark {
                    '#'             => SquareStatus::FilledIn,
                    'x' | 'X'       => SquareStatus::CrossedOut,
                    '.' | '_' | ' ' => continue,
                    other => return Err(ParseError::PresetError(
                                 format!("unexpected mark '{}' at (col={}, row={})", other, x, y))),
                };
                self.grid.borrow_mut()
                         .get_square_mut(x, y)
                         .set_status(status)
                         .map_err(|err| ParseError::PresetError(err.to_string()))?;
            }
        }
        Ok(())
    }
}

impl Puzzle {
    // helper functions for Puzzle::render
    fn fmt_line(prefix: &str,
                left_delim: &str,
                right_delim: &str,
                columnwise_separator: &str,
                content_parts: &Vec<String>,
                subdivision: Option<usize>) -> String
    {
        let mut out = format!("{} {}", prefix, left_delim);
        for (idx, part) in content_parts.iter().enumerate() {
            out.push_str(part);
            if let Some(n) = subdivision {
                if ((idx+1) % n == 0) && (idx < content_parts.len()-1) {
                    out.push_str(columnwise_separator);
                }
            }
        }
        out.push_str(right_delim);
        out.push('\n');
        out
    }

    fn fmt_header(line_idx: usize,
                  prefix_len: usize,
                  subdivision: Option<usize>,
                  emit_color: bool,
                  col_clue_parts: &Vec<Vec<ANSIString>>) -> String
    {
        let mut content_parts = Vec::<String>::new();
        for parts in col_clue_parts {
            let cell = match line_idx < parts.len() {
                true  => lalign_colored(&parts[parts.len()-1-line_idx], 2, emit_color),
                false => String::from("  "),
            };
            content_parts.push(format!(" {}", cell));
        }
        Self::fmt_line(&ralign("", prefix_len), " ", " ", " ", &content_parts, subdivision)
    }

    // box-drawing render with clue prefixes and headers; subdivision inserts
    // a visual separator every n squares
    pub fn render(&self, subdivision: Option<usize>, emit_color: bool) -> String {
        let subdivision = subdivision.filter(|&n| n > 0);

        let row_prefixes = self.rows.iter()
                                    .map(|row| row.clue_strings())
                                    .collect::<Vec<_>>();
        let col_clue_parts = self.cols.iter()
                                      .map(|col| col.clue_strings())
                                      .collect::<Vec<_>>();

        let prefix_len = row_prefixes.iter()
                                     .map(|parts| parts.iter().map(|p| p.len()).sum::<usize>()
                                                  + parts.len().saturating_sub(1))
                                     .max()
                                     .unwrap_or(0);
        let max_col_clues = col_clue_parts.iter()
                                          .map(|parts| parts.len())
                                          .max()
                                          .unwrap_or(0);

        let mut out = String::new();
        for i in (0..max_col_clues).rev() {
            out.push_str(&Self::fmt_header(i, prefix_len, subdivision, emit_color, &col_clue_parts));
        }

        // top board line
        out.push_str(&Self::fmt_line(&ralign("", prefix_len),
                                     "\u{2554}", "\u{2557}", "\u{2564}",
                                     &(0..self.width()).map(|_| String::from("\u{2550}\u{2550}\u{2550}"))
                                                       .collect::<Vec<_>>(),
                                     subdivision));

        let grid = self.grid.borrow();
        for y in 0..self.height() {
            // board content line
            out.push_str(&Self::fmt_line(&ralign_joined_coloreds(&row_prefixes[y], prefix_len, emit_color),
                                         "\u{2551}", "\u{2551}", "\u{2502}",
                                         &grid.squares[y].iter()
                                                         .map(|s| format!(" {:1} ", s))
                                                         .collect::<Vec<_>>(),
                                         subdivision));

            // horizontal board separator line
            if let Some(n) = subdivision {
                if ((y+1) % n == 0) && (y != self.height()-1) {
                    out.push_str(&Self::fmt_line(&ralign("", prefix_len),
                                                 "\u{255F}", "\u{2562}", "\u{253C}",
                                                 &(0..self.width()).map(|_| String::from("\u{2500}\u{2500}\u{2500}"))
                                                                   .collect::<Vec<_>>(),
                                                 subdivision));
                }
            }
        }
        // bottom board line
        out.push_str(&Self::fmt_line(&ralign("", prefix_len),
                                     "\u{255A}", "\u{255D}", "\u{2567}",
                                     &(0..self.width()).map(|_| String::from("\u{2550}\u{2550}\u{2550}"))
                                                       .collect::<Vec<_>>(),
                                     subdivision));
        out
    }
}
impl fmt::Display for Puzzle {
    fn fmt(&self,
           f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "{}", self.render(Some(5), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    fn load(source: &str) -> Yaml {
        YamlLoader::load_from_str(source).unwrap().remove(0)
    }

    #[test]
    fn parses_clues_from_strings_integers_and_nulls() {
        let doc = load("rows:\n  - 2 2\n  - 5\n  -\ncols:\n  - 1\n  - 1\n  - 1 1\n  - 1\n  - 1\n");
        let puzzle = Puzzle::from_yaml(&doc).unwrap();
        assert_eq!(puzzle.height(), 3);
        assert_eq!(puzzle.width(), 5);
        assert_eq!(puzzle.rows[0].clues, vec![2, 2]);
        assert_eq!(puzzle.rows[1].clues, vec![5]);
        assert!(puzzle.rows[2].clues.is_empty());
        assert_eq!(puzzle.cols[2].clues, vec![1, 1]);
        assert_eq!(puzzle.known_count(), 0);
    }

    #[test]
    fn reports_missing_sections_and_bad_clues() {
        let doc = load("rows:\n  - 1\n");
        assert_eq!(Puzzle::from_yaml(&doc).unwrap_err(), ParseError::MissingSection("cols"));

        let doc = load("rows:\n  - -3\ncols:\n  - 1\n");
        match Puzzle::from_yaml(&doc).unwrap_err() {
            ParseError::UnexpectedValue(_) => { },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn presets_seed_the_grid() {
        let doc = load("rows:\n  - 1\n  - 1\ncols:\n  - 1\n  - 1\npresets:\n  - \"#.\"\n  - \".x\"\n");
        let puzzle = Puzzle::from_yaml(&doc).unwrap();
        let grid = puzzle.grid.borrow();
        assert_eq!(grid.get_square(0, 0).get_status(), SquareStatus::FilledIn);
        assert_eq!(grid.get_square(1, 1).get_status(), SquareStatus::CrossedOut);
        assert_eq!(grid.get_square(1, 0).get_status(), SquareStatus::Unknown);
        assert_eq!(grid.known_count(), 2);
    }

    #[test]
    fn presets_must_match_the_grid() {
        let doc = load("rows:\n  - 1\n  - 1\ncols:\n  - 1\n  - 1\npresets:\n  - \"#.#\"\n  - \"...\"\n");
        match Puzzle::from_yaml(&doc).unwrap_err() {
            ParseError::PresetError(_) => { },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn lines_collect_their_evidence_from_the_grid() {
        let doc = load("rows:\n  - 1\n  - 1\ncols:\n  - 1\n  - 1\npresets:\n  - \"#x\"\n  - \"..\"\n");
        let puzzle = Puzzle::from_yaml(&doc).unwrap();
        let evidence = puzzle.rows[0].evidence();
        assert!(evidence.filled.contains(&0));
        assert!(evidence.crossed.contains(&1));
        // the same squares seen columnwise
        let evidence = puzzle.cols[1].evidence();
        assert!(evidence.crossed.contains(&0));
        assert!(puzzle.rows[1].evidence().is_empty());
    }

    #[test]
    fn render_lays_out_headers_board_and_separators() {
        let puzzle = Puzzle::from_clues(
            &vec![vec![1], vec![1], vec![5], vec![1], vec![1]],
            &vec![vec![1], vec![1], vec![5], vec![1], vec![1]],
        );
        let plain = puzzle.render(None, false);
        // 1 header line, top and bottom borders, 5 content lines
        assert_eq!(plain.lines().count(), 8);
        assert!(!plain.contains('\u{1b}'));
        assert!(plain.contains('\u{2554}'));

        let subdivided = puzzle.render(Some(2), false);
        // two extra separator lines, after rows 2 and 4
        assert_eq!(subdivided.lines().count(), 10);
        assert!(subdivided.contains('\u{253C}'));
    }
}
