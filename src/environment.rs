use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ndarray::Array2;
use thiserror::Error;

// Cell codes used by the maze file format and the live grid.
pub const WALL: char = 'X';
pub const CORRIDOR: char = '_';
pub const FOOD: char = 'o';
pub const ENTRANCE: char = 'E';
pub const EXIT: char = 'S';

#[derive(Error, Debug)]
pub enum MazeError {
    #[error("maze file not found: {path}: {source}")]
    MissingSourceFile {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed maze: {0}")]
    MalformedMaze(String),

    #[error("maze has no entrance cell 'E'")]
    MissingEntrance,

    #[error("invalid heading glyph '{0}'")]
    InvalidHeading(char),
}

pub type MazeResult<T> = Result<T, MazeError>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    pub fn offset(self, (dx, dy): (i32, i32)) -> Pos {
        Pos {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Heading {
    North,
    South,
    East,
    West,
}

impl Heading {
    // Fixed iteration order; also the tie-break order of the decision policy.
    pub const ALL: [Heading; 4] = [Heading::North, Heading::South, Heading::East, Heading::West];

    pub fn into_vector(self) -> (i32, i32) {
        match self {
            Heading::North => (0, -1),
            Heading::South => (0, 1),
            Heading::East => (1, 0),
            Heading::West => (-1, 0),
        }
    }

    /// The single-character mark this heading leaves on the grid.
    /// East and West keep the maze format's `L`/`O` glyphs.
    pub fn glyph(self) -> char {
        match self {
            Heading::North => 'N',
            Heading::South => 'S',
            Heading::East => 'L',
            Heading::West => 'O',
        }
    }

    pub fn from_glyph(c: char) -> MazeResult<Heading> {
        match c {
            'N' => Ok(Heading::North),
            'S' => Ok(Heading::South),
            'L' => Ok(Heading::East),
            'O' => Ok(Heading::West),
            other => Err(MazeError::InvalidHeading(other)),
        }
    }
}

/// The maze environment. Owns the authoritative grid and the agent's map
/// position; the agent only ever touches the grid through [`Maze::sense_window`]
/// and [`Maze::commit_move`] / [`Maze::set_glyph`].
#[derive(Debug)]
pub struct Maze {
    grid: Array2<char>,
    agent_pos: Pos,
    total_food: usize,
}

impl Maze {
    pub fn from_file<P: AsRef<Path>>(path: P) -> MazeResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| MazeError::MissingSourceFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&source)
    }

    /// Parses a rectangular grid of equal-width rows. The unique entrance
    /// cell `E` is consumed into a South heading glyph and recorded as the
    /// agent's start position.
    pub fn parse(source: &str) -> MazeResult<Self> {
        let rows: Vec<&str> = source
            .lines()
            .map(|line| line.trim_end())
            .filter(|line| !line.is_empty())
            .collect();

        if rows.is_empty() {
            return Err(MazeError::MalformedMaze("empty maze source".to_string()));
        }

        let width = rows[0].chars().count();
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row_width = row.chars().count();
            if row_width != width {
                return Err(MazeError::MalformedMaze(format!(
                    "row {} has width {}, expected {}",
                    y, row_width, width
                )));
            }
            cells.extend(row.chars());
        }

        let grid = Array2::from_shape_vec((height, width), cells)
            .map_err(|e| MazeError::MalformedMaze(e.to_string()))?;

        let mut maze = Maze {
            grid,
            agent_pos: Pos::new(0, 0),
            total_food: 0,
        };
        maze.total_food = maze.grid.iter().filter(|&&c| c == FOOD).count();
        maze.agent_pos = maze.consume_entrance()?;
        Ok(maze)
    }

    // The agent starts facing South, so the entrance becomes a South glyph.
    fn consume_entrance(&mut self) -> MazeResult<Pos> {
        for ((y, x), cell) in self.grid.indexed_iter_mut() {
            if *cell == ENTRANCE {
                *cell = Heading::South.glyph();
                return Ok(Pos::new(x as i32, y as i32));
            }
        }
        Err(MazeError::MissingEntrance)
    }

    pub fn width(&self) -> usize {
        self.grid.ncols()
    }

    pub fn height(&self) -> usize {
        self.grid.nrows()
    }

    pub fn agent_pos(&self) -> Pos {
        self.agent_pos
    }

    pub fn total_food(&self) -> usize {
        self.total_food
    }

    fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width()
            && (pos.y as usize) < self.height()
    }

    /// The cell code at `pos`, or `None` outside the grid.
    pub fn cell(&self, pos: Pos) -> Option<char> {
        if self.in_bounds(pos) {
            Some(self.grid[[pos.y as usize, pos.x as usize]])
        } else {
            None
        }
    }

    /// The 3x3 window of cell codes centered on `center`. Coordinates outside
    /// the grid always read as wall, never as unknown.
    pub fn sense_window(&self, center: Pos) -> Array2<char> {
        let mut window = Array2::from_elem((3, 3), WALL);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let pos = center.offset((dx, dy));
                if let Some(cell) = self.cell(pos) {
                    window[[(dy + 1) as usize, (dx + 1) as usize]] = cell;
                }
            }
        }
        window
    }

    /// Rewrites the glyph at the agent's current cell after a reorientation.
    /// Only ever called for the cell the agent occupies.
    pub fn set_glyph(&mut self, pos: Pos, heading: Heading) {
        if self.in_bounds(pos) {
            self.grid[[pos.y as usize, pos.x as usize]] = heading.glyph();
        }
    }

    /// Commits a move the agent has already validated against its memory.
    /// The vacated cell is downgraded to corridor unless it currently reads
    /// as an entrance or exit glyph; food consumption on the grid is exactly
    /// this downgrade. Never fails.
    pub fn commit_move(&mut self, from: Pos, to: Pos, heading: Heading) {
        if self.in_bounds(from) {
            let vacated = self.grid[[from.y as usize, from.x as usize]];
            if vacated != ENTRANCE && vacated != EXIT {
                self.grid[[from.y as usize, from.x as usize]] = CORRIDOR;
            }
        }
        if self.in_bounds(to) {
            self.grid[[to.y as usize, to.x as usize]] = heading.glyph();
        }
        self.agent_pos = to;
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for row in self.grid.rows() {
            for &cell in row {
                out.push(cell);
            }
            out.push('\n');
        }
        out
    }
}

/// Agent-side memory of the grid: what was last learned at each coordinate.
/// First observation wins; a remembered coordinate is never refreshed from
/// later sensor data, so it can go stale relative to the live grid. The one
/// exception is the agent's own food-consumption update.
pub type Memory = HashMap<Pos, char>;
