//! The hanged man, drawn in up to ten strokes.

const WIDTH: usize = 9;
const HEIGHT: usize = 7;

/// Number of strokes in the finished drawing.
pub const PARTS: u32 = 10;

type Grid = [[char; WIDTH]; HEIGHT];

fn draw_part(grid: &mut Grid, part: u32) {
    match part {
        // base
        0 => grid[6].fill('='),
        // pole
        1 => (0..6).for_each(|row| grid[row][6] = '|'),
        // beam
        2 => grid[0][2..=6].copy_from_slice(&['+', '-', '-', '-', '+']),
        // rope
        3 => grid[1][2] = '|',
        4 => grid[2][2] = 'O',
        5 => grid[3][2] = '|',
        6 => grid[3][1] = '/',
        7 => grid[3][3] = '\\',
        8 => grid[4][1] = '/',
        9 => grid[4][3] = '\\',
        _ => {}
    }
}

/// Strokes shown after `wrong` of `max` allowed wrong guesses.
///
/// For `max <= PARTS` every count from 0 to `max` gets its own drawing.
pub fn parts_for(wrong: u32, max: u32) -> u32 {
    if max == 0 {
        return PARTS;
    }

    (wrong.min(max) * PARTS).div_ceil(max)
}

pub fn stage(wrong: u32, max: u32) -> String {
    let mut grid: Grid = [[' '; WIDTH]; HEIGHT];

    for part in 0..parts_for(wrong, max) {
        draw_part(&mut grid, part);
    }

    grid.iter()
        .map(|row| row.iter().collect::<String>().trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n")
}
