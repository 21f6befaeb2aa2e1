//! Consumer of a finished run: trajectory CSV export and frame-by-frame
//! replay rendering. Operates on the recorded trajectory and a fresh copy of
//! the initial grid only; nothing here can influence a simulation.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::environment::{Maze, Pos, CORRIDOR, ENTRANCE, EXIT, FOOD, WALL};

const CELL_SIZE: usize = 16;

// Palette, RGB.
const COLOR_WALL: [u8; 3] = [80, 80, 80];
const COLOR_CORRIDOR: [u8; 3] = [220, 220, 220];
const COLOR_FOOD: [u8; 3] = [255, 215, 0];
const COLOR_ENTRANCE: [u8; 3] = [0, 128, 0];
const COLOR_EXIT: [u8; 3] = [255, 0, 0];
const COLOR_AGENT: [u8; 3] = [0, 0, 255];
const COLOR_TRAIL: [u8; 3] = [150, 150, 200];

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("replay io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trajectory export error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes the trajectory as `tick,x,y` rows.
pub fn export_trajectory_csv<P: AsRef<Path>>(path: P, trajectory: &[Pos]) -> Result<(), ReplayError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["tick", "x", "y"])?;
    for (tick, pos) in trajectory.iter().enumerate() {
        writer.write_record([tick.to_string(), pos.x.to_string(), pos.y.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Replays the trajectory over the initial grid and writes one PPM frame per
/// recorded position into `dir`: the maze in its palette colors, a trail over
/// previously visited cells, a marker at the current position, and food
/// fading to corridor as the replay passes over it. Returns the frame count.
pub fn write_frames<P: AsRef<Path>>(
    dir: P,
    initial: &Maze,
    trajectory: &[Pos],
) -> Result<usize, ReplayError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let width = initial.width();
    let height = initial.height();
    let mut cells: Vec<Vec<char>> = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| initial.cell(Pos::new(x as i32, y as i32)).unwrap_or(WALL))
                .collect()
        })
        .collect();

    for (i, &pos) in trajectory.iter().enumerate() {
        let mut frame = FrameBuffer::new(width, height);
        for (y, row) in cells.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                frame.fill_cell(x, y, cell_color(cell));
            }
        }
        for visited in &trajectory[..i] {
            frame.fill_cell(visited.x as usize, visited.y as usize, COLOR_TRAIL);
        }
        frame.fill_marker(pos.x as usize, pos.y as usize, COLOR_AGENT);
        frame.write_ppm(&dir.join(format!("frame_{:05}.ppm", i)))?;

        // Food is consumed in replay exactly as the run consumed it.
        if cells[pos.y as usize][pos.x as usize] == FOOD {
            cells[pos.y as usize][pos.x as usize] = CORRIDOR;
        }
    }

    info!("wrote {} replay frames to {}", trajectory.len(), dir.display());
    Ok(trajectory.len())
}

fn cell_color(cell: char) -> [u8; 3] {
    match cell {
        WALL => COLOR_WALL,
        FOOD => COLOR_FOOD,
        ENTRANCE => COLOR_ENTRANCE,
        EXIT => COLOR_EXIT,
        // Heading glyphs and corridor all render as walkable ground.
        _ => COLOR_CORRIDOR,
    }
}

struct FrameBuffer {
    width_px: usize,
    height_px: usize,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    fn new(width_cells: usize, height_cells: usize) -> Self {
        let width_px = width_cells * CELL_SIZE;
        let height_px = height_cells * CELL_SIZE;
        FrameBuffer {
            width_px,
            height_px,
            pixels: vec![0; width_px * height_px * 3],
        }
    }

    fn fill_rect(&mut self, x0: usize, y0: usize, w: usize, h: usize, color: [u8; 3]) {
        for y in y0..(y0 + h).min(self.height_px) {
            for x in x0..(x0 + w).min(self.width_px) {
                let idx = (y * self.width_px + x) * 3;
                self.pixels[idx..idx + 3].copy_from_slice(&color);
            }
        }
    }

    fn fill_cell(&mut self, cell_x: usize, cell_y: usize, color: [u8; 3]) {
        self.fill_rect(cell_x * CELL_SIZE, cell_y * CELL_SIZE, CELL_SIZE, CELL_SIZE, color);
    }

    // Smaller centered square so the marker reads over the trail.
    fn fill_marker(&mut self, cell_x: usize, cell_y: usize, color: [u8; 3]) {
        let inset = CELL_SIZE / 4;
        self.fill_rect(
            cell_x * CELL_SIZE + inset,
            cell_y * CELL_SIZE + inset,
            CELL_SIZE - 2 * inset,
            CELL_SIZE - 2 * inset,
            color,
        );
    }

    fn write_ppm(&self, path: &Path) -> Result<(), ReplayError> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        write!(out, "P6\n{} {}\n255\n", self.width_px, self.height_px)?;
        out.write_all(&self.pixels)?;
        out.flush()?;
        Ok(())
    }
}
