//! Board tensor codec.
//!
//! A board is encoded as 64 squares × 13 classes, squares ordered a8..h8,
//! a7..h7, …, a1..h1 and classes ordered empty, `PNBRQK`, `pnbrqk`. The
//! decoded form is the piece-placement field of a FEN string.

use crate::error::{Result, TrainError};

/// Class labels in tensor order. Index 0 is the empty square.
pub const SQUARE_CLASSES: [char; 13] = [
    '.', 'P', 'N', 'B', 'R', 'Q', 'K', 'p', 'n', 'b', 'r', 'q', 'k',
];

pub const BOARD_TENSOR_LEN: usize = 64 * SQUARE_CLASSES.len();

fn class_of(piece: char) -> Option<usize> {
    SQUARE_CLASSES.iter().skip(1).position(|&c| c == piece).map(|i| i + 1)
}

/// Encodes a FEN piece placement (`rnbqkbnr/pppppppp/8/...`) as a one-hot
/// board tensor. Anything after the first space is ignored, so full FEN
/// strings are accepted too.
pub fn encode_placement(fen: &str) -> Result<Vec<f64>> {
    let placement = fen.split_whitespace().next().unwrap_or("");
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(TrainError::dataset(format!(
            "FEN placement '{}' has {} ranks, expected 8", placement, rows.len()
        )));
    }

    let classes = SQUARE_CLASSES.len();
    let mut tensor = vec![0.0; BOARD_TENSOR_LEN];
    for (rank, row) in rows.iter().enumerate() {
        let mut file = 0usize;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10) {
                if skip == 0 || skip > 8 {
                    return Err(TrainError::dataset(format!("invalid empty-square count '{}' in '{}'", c, placement)));
                }
                for _ in 0..skip {
                    if file < 8 {
                        tensor[(rank * 8 + file) * classes] = 1.0;
                    }
                    file += 1;
                }
            } else {
                let class = class_of(c).ok_or_else(|| {
                    TrainError::dataset(format!("invalid piece '{}' in '{}'", c, placement))
                })?;
                if file < 8 {
                    tensor[(rank * 8 + file) * classes + class] = 1.0;
                }
                file += 1;
            }
        }
        if file != 8 {
            return Err(TrainError::dataset(format!(
                "rank {} of '{}' covers {} files, expected 8", 8 - rank, placement, file
            )));
        }
    }
    Ok(tensor)
}

/// Decodes a board tensor to its canonical FEN piece placement by taking
/// the most likely class of every square.
pub fn decode_placement(tensor: &[f64]) -> Result<String> {
    if tensor.len() != BOARD_TENSOR_LEN {
        return Err(TrainError::model(format!(
            "board tensor has {} values, expected {}", tensor.len(), BOARD_TENSOR_LEN
        )));
    }

    let mut placement = String::with_capacity(71);
    for (rank, rank_squares) in tensor.chunks_exact(8 * SQUARE_CLASSES.len()).enumerate() {
        if rank > 0 {
            placement.push('/');
        }
        let mut empty = 0u32;
        for square in rank_squares.chunks_exact(SQUARE_CLASSES.len()) {
            match argmax(square) {
                0 => empty += 1,
                class => {
                    if empty > 0 {
                        placement.push(char::from_digit(empty, 10).unwrap_or('8'));
                        empty = 0;
                    }
                    placement.push(SQUARE_CLASSES[class]);
                }
            }
        }
        if empty > 0 {
            placement.push(char::from_digit(empty, 10).unwrap_or('8'));
        }
    }
    Ok(placement)
}

/// First index of the maximum element; ties resolve to the lower class.
fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > v[best] {
            best = i;
        }
    }
    best
}

/// Turns a board tensor into its textual representation.
pub trait Decoder {
    fn decode(&self, tensor: &[f64]) -> Result<String>;
}

/// Decodes board tensors to FEN piece placements.
#[derive(Debug, Clone, Copy, Default)]
pub struct FenDecoder;

impl Decoder for FenDecoder {
    fn decode(&self, tensor: &[f64]) -> Result<String> {
        decode_placement(tensor)
    }
}
